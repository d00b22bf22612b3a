//! Equation block numbering

use std::collections::HashMap;

use crate::elements::{Beam, NodeSlot};

/// Equation blocks for the nodes used by elements
///
/// Blocks are handed out in element insertion order: the first time a
/// structural endpoint is met it takes the next block. Orientation nodes
/// never receive one.
#[derive(Debug, Clone, Default)]
pub struct DofNumbering {
    blocks: HashMap<NodeSlot, usize>,
    order: Vec<NodeSlot>,
}

impl DofNumbering {
    pub fn from_elements<'a>(elements: impl IntoIterator<Item = &'a Beam>) -> Self {
        let mut numbering = Self::default();
        for element in elements {
            for slot in element.endpoints() {
                if !numbering.blocks.contains_key(&slot) {
                    numbering.blocks.insert(slot, numbering.order.len());
                    numbering.order.push(slot);
                }
            }
        }
        numbering
    }

    pub fn block(&self, slot: NodeSlot) -> Option<usize> {
        self.blocks.get(&slot).copied()
    }

    /// Nodes in equation order
    pub fn order(&self) -> &[NodeSlot] {
        &self.order
    }

    pub fn block_count(&self) -> usize {
        self.order.len()
    }

    pub fn dof_count(&self) -> usize {
        self.order.len() * 6
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::elements::{NodeContainer, Section, SectionProperties};

    #[test]
    fn test_first_encounter_order() {
        let mut nodes = NodeContainer::new();
        let slots: Vec<NodeSlot> = (0..4).map(|i| nodes.insert(i as f64, 0.0, 0.0)).collect();
        let c = nodes.insert(0.0, 1.0, 0.0);
        let section = Section::new(SectionProperties::new(0.01, 200e9, 77e9, 1e-5)).unwrap();

        // node 2 is shared by both elements and numbered only once
        let beam = |id, a: NodeSlot, b: NodeSlot| {
            let node = |slot| nodes.get(slot).unwrap();
            Beam::new(id, node(a), node(b), node(c), 0, &section).unwrap()
        };
        let elements = [beam(0, slots[2], slots[3]), beam(1, slots[1], slots[2])];

        let numbering = DofNumbering::from_elements(elements.iter());
        assert_eq!(numbering.order(), &[slots[2], slots[3], slots[1]]);
        assert_eq!(numbering.block(slots[2]), Some(0));
        assert_eq!(numbering.block(slots[1]), Some(2));
        assert_eq!(numbering.block(slots[0]), None);
        assert_eq!(numbering.block(c), None);
        assert_eq!(numbering.dof_count(), 18);
    }
}
