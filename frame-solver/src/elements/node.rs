//! Nodes and the slot container that owns them

use std::collections::BTreeSet;

use crate::error::{FrameError, FrameResult};
use crate::math::Vec3;

/// Stable node slot index
pub type NodeSlot = usize;

/// A 3D point in the model plus solve bookkeeping
#[derive(Debug, Clone)]
pub struct Node {
    /// X coordinate
    pub x: f64,
    /// Y coordinate
    pub y: f64,
    /// Z coordinate
    pub z: f64,

    slot: NodeSlot,
    live: bool,
    /// Elements using this node as a structural endpoint
    owners: BTreeSet<usize>,
    /// Equation block assigned by the last DOF numbering pass
    equation_block: Option<usize>,
}

impl Node {
    fn new(slot: NodeSlot, x: f64, y: f64, z: f64) -> Self {
        Self {
            x,
            y,
            z,
            slot,
            live: true,
            owners: BTreeSet::new(),
            equation_block: None,
        }
    }

    pub fn slot(&self) -> NodeSlot {
        self.slot
    }

    /// Get the coordinates as an array
    pub fn coords(&self) -> [f64; 3] {
        [self.x, self.y, self.z]
    }

    pub fn position(&self) -> Vec3 {
        Vec3::new(self.x, self.y, self.z)
    }

    /// True when no element uses this node as an endpoint
    pub fn is_free(&self) -> bool {
        self.owners.is_empty()
    }

    pub fn is_live(&self) -> bool {
        self.live
    }

    pub fn owners(&self) -> impl Iterator<Item = usize> + '_ {
        self.owners.iter().copied()
    }

    /// Equation block from the last solve, `None` when unused or invalidated
    pub fn equation_block(&self) -> Option<usize> {
        self.equation_block
    }
}

/// Slot arena for nodes. Removal tombstones a slot; insertion reuses the
/// lowest tombstone before growing.
#[derive(Debug, Clone, Default)]
pub struct NodeContainer {
    nodes: Vec<Node>,
    tombstones: BTreeSet<NodeSlot>,
}

impl NodeContainer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a point and return its slot
    pub fn insert(&mut self, x: f64, y: f64, z: f64) -> NodeSlot {
        match self.tombstones.pop_first() {
            Some(slot) => {
                self.nodes[slot] = Node::new(slot, x, y, z);
                slot
            }
            None => {
                let slot = self.nodes.len();
                self.nodes.push(Node::new(slot, x, y, z));
                slot
            }
        }
    }

    /// Tombstone a live slot
    pub fn remove(&mut self, slot: NodeSlot) -> FrameResult<()> {
        let node = self.live_mut(slot)?;
        node.live = false;
        node.equation_block = None;
        self.tombstones.insert(slot);
        Ok(())
    }

    /// Number of live nodes
    pub fn len(&self) -> usize {
        self.nodes.len() - self.tombstones.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Live nodes in ascending slot order
    pub fn iter(&self) -> impl Iterator<Item = &Node> + '_ {
        self.nodes.iter().filter(|node| node.live)
    }

    /// Resolve a slot whether or not it is live
    pub fn get(&self, slot: NodeSlot) -> Option<&Node> {
        self.nodes.get(slot)
    }

    /// Resolve a live slot
    pub fn live(&self, slot: NodeSlot) -> FrameResult<&Node> {
        self.nodes
            .get(slot)
            .filter(|node| node.live)
            .ok_or(FrameError::NodeNotFound(slot))
    }

    pub fn contains(&self, slot: NodeSlot) -> bool {
        self.live(slot).is_ok()
    }

    fn live_mut(&mut self, slot: NodeSlot) -> FrameResult<&mut Node> {
        self.nodes
            .get_mut(slot)
            .filter(|node| node.live)
            .ok_or(FrameError::NodeNotFound(slot))
    }

    pub(crate) fn set_position(&mut self, slot: NodeSlot, x: f64, y: f64, z: f64) -> FrameResult<()> {
        let node = self.live_mut(slot)?;
        node.x = x;
        node.y = y;
        node.z = z;
        Ok(())
    }

    pub fn set_participation(&mut self, slot: NodeSlot, owners: BTreeSet<usize>) -> FrameResult<()> {
        self.live_mut(slot)?.owners = owners;
        Ok(())
    }

    pub fn add_owner(&mut self, slot: NodeSlot, element: usize) -> FrameResult<()> {
        self.live_mut(slot)?.owners.insert(element);
        Ok(())
    }

    /// Detach an element; works on tombstoned slots so cascading removals
    /// can finish after the node itself is gone
    pub fn remove_owner(&mut self, slot: NodeSlot, element: usize) -> FrameResult<()> {
        let node = self
            .nodes
            .get_mut(slot)
            .ok_or(FrameError::NodeNotFound(slot))?;
        node.owners.remove(&element);
        Ok(())
    }

    pub fn set_equation_block(&mut self, slot: NodeSlot, block: usize) -> FrameResult<()> {
        self.live_mut(slot)?.equation_block = Some(block);
        Ok(())
    }

    pub fn clear_equation_blocks(&mut self) {
        for node in &mut self.nodes {
            node.equation_block = None;
        }
    }

    pub fn clear(&mut self) {
        self.nodes.clear();
        self.tombstones.clear();
    }
}
