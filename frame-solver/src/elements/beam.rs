//! Beam element - 3D Euler-Bernoulli frame element

use super::node::{Node, NodeContainer, NodeSlot};
use super::section::{Section, SectionId};
use crate::error::{FrameError, FrameResult};
use crate::math::{self, Mat12, Mat3, SparseMatrixBuilder, Vec3};

/// Stable element identifier, never reused
pub type ElementId = usize;

/// A straight beam between two structural nodes, oriented by a third
#[derive(Debug, Clone)]
pub struct Beam {
    id: ElementId,
    /// Start node (structural)
    node_a: NodeSlot,
    /// End node (structural)
    node_b: NodeSlot,
    /// Orientation reference; fixes the local x-y plane, carries no DOFs
    node_c: NodeSlot,
    section: SectionId,

    length: f64,
    local_stiffness: Mat12,
    /// Columns are local x, y, z in global coordinates
    axes: Mat3,
    /// `axes` tiled along the diagonal, local to global
    rotation: Mat12,
}

impl Beam {
    /// Build an element and derive its cached geometry and stiffness
    ///
    /// Fails when the endpoints coincide or the orientation node is
    /// colinear with the axis.
    pub fn new(
        id: ElementId,
        a: &Node,
        b: &Node,
        c: &Node,
        section_id: SectionId,
        section: &Section,
    ) -> FrameResult<Self> {
        let (length, axes) = math::local_axes(&a.position(), &b.position(), &c.position())?;
        Ok(Self {
            id,
            node_a: a.slot(),
            node_b: b.slot(),
            node_c: c.slot(),
            section: section_id,
            length,
            local_stiffness: Self::stiffness(section, length),
            axes,
            rotation: math::tile_rotation(&axes),
        })
    }

    fn stiffness(section: &Section, length: f64) -> Mat12 {
        math::beam_local_stiffness(
            section.modulus() * section.area(),
            section.shear_modulus() * section.torsion(),
            section.coefficients(),
            length,
        )
    }

    /// Geometry check for a prospective set of positions
    pub fn check_geometry(a: &Vec3, b: &Vec3, c: &Vec3) -> FrameResult<()> {
        math::local_axes(a, b, c).map(|_| ())
    }

    /// Re-derive length, stiffness and rotation from the current node
    /// positions and section properties
    pub fn recalculate(&mut self, nodes: &NodeContainer, section: &Section) -> FrameResult<()> {
        let [a, b, c] = self.positions(nodes)?;
        let (length, axes) = math::local_axes(&a, &b, &c)?;
        self.length = length;
        self.axes = axes;
        self.rotation = math::tile_rotation(&axes);
        self.local_stiffness = Self::stiffness(section, length);
        Ok(())
    }

    /// Current positions of A, B and C
    pub fn positions(&self, nodes: &NodeContainer) -> FrameResult<[Vec3; 3]> {
        let resolve = |slot: NodeSlot| {
            nodes
                .get(slot)
                .map(Node::position)
                .ok_or(FrameError::NodeNotFound(slot))
        };
        Ok([resolve(self.node_a)?, resolve(self.node_b)?, resolve(self.node_c)?])
    }

    /// Stiffness in global coordinates: R * K_local * R^T
    pub fn global_stiffness(&self) -> Mat12 {
        self.rotation * self.local_stiffness * self.rotation.transpose()
    }

    /// Append the global stiffness as triplets at the DOFs of the two
    /// equation blocks (start node block, end node block)
    pub fn contribute(&self, blocks: (usize, usize), sink: &mut SparseMatrixBuilder) {
        let k = self.global_stiffness();
        let offset = |local: usize| {
            if local < 6 {
                blocks.0 * 6 + local
            } else {
                blocks.1 * 6 + local - 6
            }
        };
        for row in 0..12 {
            for col in 0..12 {
                sink.add(offset(row), offset(col), k[(row, col)]);
            }
        }
    }

    pub fn id(&self) -> ElementId {
        self.id
    }

    /// Node slots [A, B, C]
    pub fn nodes(&self) -> [NodeSlot; 3] {
        [self.node_a, self.node_b, self.node_c]
    }

    /// Structural endpoints [A, B]
    pub fn endpoints(&self) -> [NodeSlot; 2] {
        [self.node_a, self.node_b]
    }

    pub fn orientation_node(&self) -> NodeSlot {
        self.node_c
    }

    /// True when `slot` is A, B or C
    pub fn references(&self, slot: NodeSlot) -> bool {
        self.nodes().contains(&slot)
    }

    pub fn section_id(&self) -> SectionId {
        self.section
    }

    pub fn length(&self) -> f64 {
        self.length
    }

    pub fn local_stiffness(&self) -> &Mat12 {
        &self.local_stiffness
    }

    pub fn axes(&self) -> &Mat3 {
        &self.axes
    }

    pub fn rotation(&self) -> &Mat12 {
        &self.rotation
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::elements::SectionProperties;
    use approx::assert_relative_eq;

    fn section() -> Section {
        Section::new(
            SectionProperties::new(0.01, 200e9, 77e9, 2e-5)
                .with_iyy(1e-5)
                .with_torsion(3e-6),
        )
        .unwrap()
    }

    #[test]
    fn test_beam_creation() {
        let mut nodes = NodeContainer::new();
        let a = nodes.insert(0.0, 0.0, 0.0);
        let b = nodes.insert(0.0, 3.0, 4.0);
        let c = nodes.insert(1.0, 0.0, 0.0);
        let beam = Beam::new(
            0,
            nodes.get(a).unwrap(),
            nodes.get(b).unwrap(),
            nodes.get(c).unwrap(),
            0,
            &section(),
        )
        .unwrap();

        assert_relative_eq!(beam.length(), 5.0);
        assert_eq!(beam.nodes(), [a, b, c]);
        assert!(beam.references(c));
        assert_relative_eq!(beam.axes().column(1).into_owned(), Vec3::x(), epsilon = 1e-12);
    }

    #[test]
    fn test_colinear_rejected() {
        let mut nodes = NodeContainer::new();
        let a = nodes.insert(0.0, 0.0, 0.0);
        let b = nodes.insert(2.0, 2.0, 2.0);
        let c = nodes.insert(5.0, 5.0, 5.0);
        let result = Beam::new(
            0,
            nodes.get(a).unwrap(),
            nodes.get(b).unwrap(),
            nodes.get(c).unwrap(),
            0,
            &section(),
        );
        assert!(matches!(result, Err(FrameError::InvalidGeometry(_))));
    }

    #[test]
    fn test_global_stiffness_axis_aligned() {
        // Along global X with y up: local and global frames coincide
        let mut nodes = NodeContainer::new();
        let a = nodes.insert(0.0, 0.0, 0.0);
        let b = nodes.insert(4.0, 0.0, 0.0);
        let c = nodes.insert(0.0, 1.0, 0.0);
        let beam = Beam::new(
            0,
            nodes.get(a).unwrap(),
            nodes.get(b).unwrap(),
            nodes.get(c).unwrap(),
            0,
            &section(),
        )
        .unwrap();
        assert_relative_eq!(beam.global_stiffness(), *beam.local_stiffness(), epsilon = 1e-6);
    }

    #[test]
    fn test_global_stiffness_rotated() {
        // Along global Y: local x = Y, local y = -X
        let mut nodes = NodeContainer::new();
        let a = nodes.insert(0.0, 0.0, 0.0);
        let b = nodes.insert(0.0, 4.0, 0.0);
        let c = nodes.insert(-1.0, 0.0, 0.0);
        let beam = Beam::new(
            0,
            nodes.get(a).unwrap(),
            nodes.get(b).unwrap(),
            nodes.get(c).unwrap(),
            0,
            &section(),
        )
        .unwrap();
        let kl = beam.local_stiffness();
        let kg = beam.global_stiffness();
        // global uy is local axial
        assert_relative_eq!(kg[(1, 1)], kl[(0, 0)], max_relative = 1e-12);
        // global ux is local -uy
        assert_relative_eq!(kg[(0, 0)], kl[(1, 1)], max_relative = 1e-12);
        assert_relative_eq!(kg[(0, 5)], -kl[(1, 5)], max_relative = 1e-12);
        // global rotation about Y is local torsion
        assert_relative_eq!(kg[(4, 10)], kl[(3, 9)], max_relative = 1e-12);
    }

    #[test]
    fn test_contribute_offsets() {
        let mut nodes = NodeContainer::new();
        let a = nodes.insert(0.0, 0.0, 0.0);
        let b = nodes.insert(4.0, 0.0, 0.0);
        let c = nodes.insert(0.0, 1.0, 0.0);
        let beam = Beam::new(
            0,
            nodes.get(a).unwrap(),
            nodes.get(b).unwrap(),
            nodes.get(c).unwrap(),
            0,
            &section(),
        )
        .unwrap();

        let mut sink = SparseMatrixBuilder::new(18);
        beam.contribute((2, 0), &mut sink);
        let dense = sink.to_dense();
        let kl = beam.local_stiffness();
        // start node lands in block 2, end node in block 0
        assert_relative_eq!(dense[(12, 12)], kl[(0, 0)], max_relative = 1e-12);
        assert_relative_eq!(dense[(12, 0)], kl[(0, 6)], max_relative = 1e-12);
        assert_relative_eq!(dense[(5, 5)], kl[(11, 11)], max_relative = 1e-12);
        assert_eq!(dense.rows(6, 6).amax(), 0.0);
    }

    #[test]
    fn test_recalculate_after_move() {
        let mut nodes = NodeContainer::new();
        let a = nodes.insert(0.0, 0.0, 0.0);
        let b = nodes.insert(4.0, 0.0, 0.0);
        let c = nodes.insert(0.0, 1.0, 0.0);
        let sec = section();
        let mut beam = Beam::new(
            0,
            nodes.get(a).unwrap(),
            nodes.get(b).unwrap(),
            nodes.get(c).unwrap(),
            0,
            &sec,
        )
        .unwrap();
        let before = beam.local_stiffness()[(0, 0)];

        nodes.set_position(b, 8.0, 0.0, 0.0).unwrap();
        beam.recalculate(&nodes, &sec).unwrap();
        assert_relative_eq!(beam.length(), 8.0);
        assert_relative_eq!(beam.local_stiffness()[(0, 0)], before / 2.0, max_relative = 1e-12);
    }
}
