//! Frame model - owns nodes, sections, elements, loads and supports

use std::collections::{BTreeMap, BTreeSet};

use log::{debug, info, warn};

use crate::analysis::{
    self, AnalysisState, ConstraintMap, DofNumbering, GlobalSystem, SolveOptions,
};
use crate::elements::{
    Beam, ElementId, Node, NodeContainer, NodeSlot, Section, SectionId, SectionProperties,
};
use crate::error::{FrameError, FrameResult};
use crate::loads::{LoadComponent, NodeLoad};
use crate::math::{SparseMatrixBuilder, Vec as FEVec, Vec3};
use crate::results::{NodeDisplacement, SolveSummary};

/// Reduced solution of the last successful solve
#[derive(Debug, Clone)]
struct Solution {
    displacements: FEVec,
    constraints: ConstraintMap,
    summary: SolveSummary,
}

impl Solution {
    fn displacement(&self, block: usize) -> NodeDisplacement {
        match self.constraints.reduce_block(block) {
            Some(reduced) => {
                let start = reduced * 6;
                let mut arr = [0.0; 6];
                for (i, value) in arr.iter_mut().enumerate() {
                    *value = self.displacements[start + i];
                }
                NodeDisplacement::from_array(arr)
            }
            None => NodeDisplacement::default(),
        }
    }
}

/// The 3D frame model
///
/// Every edit discards the previous solution. Displacement queries return
/// zero until the next successful [`Model::solve`].
#[derive(Debug, Clone, Default)]
pub struct Model {
    nodes: NodeContainer,
    sections: BTreeMap<SectionId, Section>,
    next_section_id: SectionId,
    /// Keyed by monotonically increasing id, so iteration is insertion order
    elements: BTreeMap<ElementId, Beam>,
    next_element_id: ElementId,
    forces: BTreeMap<NodeSlot, NodeLoad>,
    supports: BTreeSet<NodeSlot>,

    state: AnalysisState,
    solution: Option<Solution>,
}

impl Model {
    /// Create a new empty model
    pub fn new() -> Self {
        Self::default()
    }

    // ========================
    // Model Building Methods
    // ========================

    /// Add a node and return its slot
    pub fn add_node(&mut self, x: f64, y: f64, z: f64) -> NodeSlot {
        self.invalidate();
        self.nodes.insert(x, y, z)
    }

    /// Remove a node together with every element that references it, and
    /// any load or support recorded on it
    pub fn remove_node(&mut self, slot: NodeSlot) -> FrameResult<()> {
        self.nodes.live(slot)?;

        let doomed: Vec<ElementId> = self
            .elements
            .values()
            .filter(|element| element.references(slot))
            .map(Beam::id)
            .collect();
        for id in doomed {
            self.detach_element(id)?;
        }

        self.forces.remove(&slot);
        self.supports.remove(&slot);
        self.nodes.remove(slot)?;
        self.invalidate();
        debug!("Removed node {slot}");
        Ok(())
    }

    /// Move a node and recalculate every element that references it
    ///
    /// Rejected without change if any of those elements would degenerate.
    pub fn move_node(&mut self, slot: NodeSlot, x: f64, y: f64, z: f64) -> FrameResult<()> {
        self.nodes.live(slot)?;
        if ![x, y, z].iter().all(|v| v.is_finite()) {
            return Err(FrameError::InvalidGeometry(format!(
                "node {slot} cannot move to a non-finite position"
            )));
        }
        let target = Vec3::new(x, y, z);

        for element in self.elements.values().filter(|e| e.references(slot)) {
            let mut positions = element.positions(&self.nodes)?;
            for (position, node) in positions.iter_mut().zip(element.nodes()) {
                if node == slot {
                    *position = target;
                }
            }
            Beam::check_geometry(&positions[0], &positions[1], &positions[2])?;
        }

        self.nodes.set_position(slot, x, y, z)?;
        for element in self.elements.values_mut().filter(|e| e.references(slot)) {
            let section = self
                .sections
                .get(&element.section_id())
                .ok_or(FrameError::SectionNotFound(element.section_id()))?;
            element.recalculate(&self.nodes, section)?;
        }
        self.invalidate();
        Ok(())
    }

    /// Add a section and return its id
    pub fn add_section(&mut self, properties: SectionProperties) -> FrameResult<SectionId> {
        let section = Section::new(properties)?;
        let id = self.next_section_id;
        self.next_section_id += 1;
        self.sections.insert(id, section);
        self.invalidate();
        Ok(id)
    }

    /// Edit a section in place and recalculate every element using it
    pub fn modify_section(&mut self, id: SectionId, properties: SectionProperties) -> FrameResult<()> {
        let section = self
            .sections
            .get_mut(&id)
            .ok_or(FrameError::SectionNotFound(id))?;
        section.modify(properties)?;

        let section = &self.sections[&id];
        for owner in section.owners() {
            if let Some(element) = self.elements.get_mut(&owner) {
                element.recalculate(&self.nodes, section)?;
            }
        }
        self.invalidate();
        debug!("Modified section {id}");
        Ok(())
    }

    /// Add a beam from A to B, oriented by C
    pub fn add_element(
        &mut self,
        a: NodeSlot,
        b: NodeSlot,
        c: NodeSlot,
        section_id: SectionId,
    ) -> FrameResult<ElementId> {
        let section = self
            .sections
            .get(&section_id)
            .ok_or(FrameError::SectionNotFound(section_id))?;
        let id = self.next_element_id;
        let beam = Beam::new(
            id,
            self.nodes.live(a)?,
            self.nodes.live(b)?,
            self.nodes.live(c)?,
            section_id,
            section,
        )?;

        self.next_element_id += 1;
        self.nodes.add_owner(a, id)?;
        self.nodes.add_owner(b, id)?;
        if let Some(section) = self.sections.get_mut(&section_id) {
            section.add_owner(id);
        }
        self.elements.insert(id, beam);
        self.invalidate();
        Ok(id)
    }

    /// Remove an element, freeing nodes it alone was using
    pub fn remove_element(&mut self, id: ElementId) -> FrameResult<()> {
        self.detach_element(id)?;
        self.invalidate();
        Ok(())
    }

    fn detach_element(&mut self, id: ElementId) -> FrameResult<()> {
        let element = self
            .elements
            .remove(&id)
            .ok_or(FrameError::ElementNotFound(id))?;

        for slot in element.endpoints() {
            self.nodes.remove_owner(slot, id)?;
            let freed = self.nodes.get(slot).is_some_and(Node::is_free);
            if freed && self.supports.remove(&slot) {
                debug!("Dropped support on node {slot}, no element uses it");
            }
        }
        if let Some(section) = self.sections.get_mut(&element.section_id()) {
            section.remove_owner(id);
        }
        Ok(())
    }

    /// Set one component of the load on a node
    pub fn add_force(&mut self, slot: NodeSlot, component: LoadComponent, value: f64) -> FrameResult<()> {
        self.nodes.live(slot)?;
        if !value.is_finite() {
            return Err(FrameError::InvalidInput(format!(
                "{component:?} on node {slot} is not finite"
            )));
        }
        let load = self.forces.entry(slot).or_default();
        load.set_component(component, value);
        if load.is_zero() {
            self.forces.remove(&slot);
        }
        self.invalidate();
        Ok(())
    }

    /// Clear one component of the load on a node
    pub fn remove_force(&mut self, slot: NodeSlot, component: LoadComponent) -> FrameResult<()> {
        let load = self
            .forces
            .get_mut(&slot)
            .filter(|load| load.component(component) != 0.0)
            .ok_or(FrameError::ForceNotFound {
                node: slot,
                component,
            })?;
        load.set_component(component, 0.0);
        if load.is_zero() {
            self.forces.remove(&slot);
        }
        self.invalidate();
        Ok(())
    }

    /// Fix all six DOFs of a node used by at least one element
    pub fn add_support(&mut self, slot: NodeSlot) -> FrameResult<()> {
        if self.nodes.live(slot)?.is_free() {
            return Err(FrameError::SupportOnFreeNode(slot));
        }
        self.supports.insert(slot);
        self.invalidate();
        Ok(())
    }

    pub fn remove_support(&mut self, slot: NodeSlot) -> FrameResult<()> {
        if !self.supports.remove(&slot) {
            return Err(FrameError::SupportNotFound(slot));
        }
        self.invalidate();
        Ok(())
    }

    /// Remove everything; section and element ids keep counting up
    pub fn clear(&mut self) {
        self.nodes.clear();
        self.sections.clear();
        self.elements.clear();
        self.forces.clear();
        self.supports.clear();
        self.invalidate();
    }

    fn invalidate(&mut self) {
        if self.solution.take().is_some() {
            debug!("Discarding previous solution");
        }
        self.state = AnalysisState::Unsolved;
        self.nodes.clear_equation_blocks();
    }

    // ========================
    // Analysis Methods
    // ========================

    /// Run the linear static solve with default options
    pub fn solve(&mut self) -> FrameResult<SolveSummary> {
        self.solve_with(SolveOptions::default())
    }

    /// Run the linear static solve
    ///
    /// On failure the model stays unsolved and any previous solution is
    /// gone.
    pub fn solve_with(&mut self, options: SolveOptions) -> FrameResult<SolveSummary> {
        self.invalidate();
        self.state = AnalysisState::Solving;

        match self.run_solve(&options) {
            Ok(solution) => {
                let summary = solution.summary.clone();
                info!(
                    "Solved {} equations with {:?}; max displacement {:.6e}",
                    summary.reduced_dofs, summary.method, summary.max_displacement
                );
                self.solution = Some(solution);
                self.state = AnalysisState::Solved;
                Ok(summary)
            }
            Err(err) => {
                warn!("Solve failed: {err}");
                self.nodes.clear_equation_blocks();
                self.state = AnalysisState::Unsolved;
                Err(err)
            }
        }
    }

    fn run_solve(&mut self, options: &SolveOptions) -> FrameResult<Solution> {
        if self.supports.is_empty() {
            return Err(FrameError::NoSupports);
        }

        let numbering = self.number_dofs();
        for (block, slot) in numbering.order().iter().enumerate() {
            self.nodes.set_equation_block(*slot, block)?;
        }

        let full = self.assemble_stiffness(numbering.dof_count(), |slot| {
            self.nodes.get(slot).and_then(Node::equation_block)
        })?;

        let constraints = ConstraintMap::new(
            numbering.block_count(),
            self.supports.iter().filter_map(|slot| numbering.block(*slot)),
        );
        let stiffness = constraints.reduce_matrix(&full);
        let loads = self.reduced_loads(&constraints);
        debug!(
            "Assembled {} nodes ({} triplets, sparsity {:.3}); eliminated {} fixed blocks, {} equations remain",
            numbering.block_count(),
            full.nnz(),
            full.sparsity(),
            constraints.eliminated().len(),
            constraints.reduced_size()
        );

        let (displacements, method) = analysis::solve_reduced(&stiffness, &loads, options)?;

        let mut solution = Solution {
            summary: SolveSummary {
                method,
                used_nodes: numbering.block_count(),
                fixed_nodes: constraints.eliminated().len(),
                total_dofs: numbering.dof_count(),
                reduced_dofs: stiffness.size(),
                max_displacement: 0.0,
                max_disp_node: None,
            },
            displacements,
            constraints,
        };

        for (block, slot) in numbering.order().iter().enumerate() {
            let magnitude = solution.displacement(block).translation_magnitude();
            if magnitude > solution.summary.max_displacement {
                solution.summary.max_displacement = magnitude;
                solution.summary.max_disp_node = Some(*slot);
            }
        }

        Ok(solution)
    }

    fn number_dofs(&self) -> DofNumbering {
        DofNumbering::from_elements(self.elements.values())
    }

    fn assemble_stiffness(
        &self,
        dofs: usize,
        block_of: impl Fn(NodeSlot) -> Option<usize>,
    ) -> FrameResult<SparseMatrixBuilder> {
        let mut sink = SparseMatrixBuilder::new(dofs);
        for element in self.elements.values() {
            let [a, b] = element.endpoints();
            let blocks = (
                block_of(a).ok_or(FrameError::NodeNotFound(a))?,
                block_of(b).ok_or(FrameError::NodeNotFound(b))?,
            );
            element.contribute(blocks, &mut sink);
        }
        Ok(sink)
    }

    fn reduced_loads(&self, constraints: &ConstraintMap) -> FEVec {
        let mut loads = FEVec::zeros(constraints.reduced_size());
        for (slot, load) in &self.forces {
            // Loads on unused nodes or fixed nodes never reach the system
            let Some(block) = self.nodes.get(*slot).and_then(Node::equation_block) else {
                continue;
            };
            let Some(reduced) = constraints.reduce_block(block) else {
                continue;
            };
            for (i, value) in load.as_array().iter().enumerate() {
                loads[reduced * 6 + i] += value;
            }
        }
        loads
    }

    /// Build the unreduced global system without solving
    pub fn assemble(&self) -> FrameResult<GlobalSystem> {
        let numbering = self.number_dofs();
        let stiffness = self.assemble_stiffness(numbering.dof_count(), |slot| numbering.block(slot))?;

        let mut loads = FEVec::zeros(numbering.dof_count());
        for (slot, load) in &self.forces {
            if let Some(block) = numbering.block(*slot) {
                for (i, value) in load.as_array().iter().enumerate() {
                    loads[block * 6 + i] += value;
                }
            }
        }

        let fixed_blocks = self
            .supports
            .iter()
            .filter_map(|slot| numbering.block(*slot))
            .collect();

        Ok(GlobalSystem {
            stiffness,
            loads,
            order: numbering.order().to_vec(),
            fixed_blocks,
        })
    }

    // ========================
    // Result Access Methods
    // ========================

    pub fn state(&self) -> AnalysisState {
        self.state
    }

    pub fn is_solved(&self) -> bool {
        self.state == AnalysisState::Solved && self.solution.is_some()
    }

    /// Summary of the current solution
    pub fn summary(&self) -> Option<&SolveSummary> {
        self.solution.as_ref().map(|s| &s.summary)
    }

    /// Displacement of the node in an equation block
    ///
    /// Zero while unsolved, for fixed nodes and for unknown blocks.
    pub fn displacement(&self, block: usize) -> NodeDisplacement {
        match (&self.state, &self.solution) {
            (AnalysisState::Solved, Some(solution)) => solution.displacement(block),
            _ => NodeDisplacement::default(),
        }
    }

    /// Displacement of a node by slot; zero for free or removed nodes
    pub fn node_displacement(&self, slot: NodeSlot) -> NodeDisplacement {
        self.nodes
            .live(slot)
            .ok()
            .filter(|node| !node.is_free())
            .and_then(Node::equation_block)
            .map(|block| self.displacement(block))
            .unwrap_or_default()
    }

    // ========================
    // Collaborator Queries
    // ========================

    /// Live nodes in ascending slot order
    pub fn nodes(&self) -> impl Iterator<Item = &Node> + '_ {
        self.nodes.iter()
    }

    pub fn node(&self, slot: NodeSlot) -> FrameResult<&Node> {
        self.nodes.live(slot)
    }

    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    /// Elements in insertion order
    pub fn elements(&self) -> impl Iterator<Item = &Beam> + '_ {
        self.elements.values()
    }

    pub fn element(&self, id: ElementId) -> FrameResult<&Beam> {
        self.elements.get(&id).ok_or(FrameError::ElementNotFound(id))
    }

    pub fn element_count(&self) -> usize {
        self.elements.len()
    }

    pub fn sections(&self) -> impl Iterator<Item = (SectionId, &Section)> + '_ {
        self.sections.iter().map(|(id, section)| (*id, section))
    }

    pub fn section(&self, id: SectionId) -> FrameResult<&Section> {
        self.sections.get(&id).ok_or(FrameError::SectionNotFound(id))
    }

    pub fn forces(&self) -> impl Iterator<Item = (NodeSlot, &NodeLoad)> + '_ {
        self.forces.iter().map(|(slot, load)| (*slot, load))
    }

    pub fn force(&self, slot: NodeSlot) -> Option<&NodeLoad> {
        self.forces.get(&slot)
    }

    pub fn supports(&self) -> impl Iterator<Item = NodeSlot> + '_ {
        self.supports.iter().copied()
    }

    pub fn has_support(&self, slot: NodeSlot) -> bool {
        self.supports.contains(&slot)
    }
}
