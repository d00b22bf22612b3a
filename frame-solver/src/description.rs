//! Plain-data description of a model
//!
//! Nodes and sections are listed by ordinal rather than slot or id, so a
//! description taken from a model with tombstones rebuilds into a compact one.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::elements::{NodeSlot, SectionId, SectionProperties};
use crate::error::{FrameError, FrameResult};
use crate::loads::LoadComponent;
use crate::model::Model;

/// A beam by node and section ordinals
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ElementDescription {
    /// Start, end and orientation node
    pub nodes: [usize; 3],
    pub section: usize,
}

/// One nonzero load component
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ForceDescription {
    pub node: usize,
    pub component: LoadComponent,
    pub value: f64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ModelDescription {
    pub nodes: Vec<[f64; 3]>,
    #[serde(default)]
    pub sections: Vec<SectionProperties>,
    #[serde(default)]
    pub elements: Vec<ElementDescription>,
    #[serde(default)]
    pub forces: Vec<ForceDescription>,
    /// Node ordinals carrying a fixed support
    #[serde(default)]
    pub supports: Vec<usize>,
}

impl ModelDescription {
    pub fn from_json(json: &str) -> FrameResult<Self> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn to_json(&self) -> FrameResult<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}

fn lookup<T: Copy>(table: &[T], ordinal: usize, what: &str) -> FrameResult<T> {
    table.get(ordinal).copied().ok_or_else(|| {
        FrameError::InvalidInput(format!(
            "{what} ordinal {ordinal} out of range (have {})",
            table.len()
        ))
    })
}

impl Model {
    /// Snapshot the model as a description
    pub fn describe(&self) -> ModelDescription {
        let node_ordinals: HashMap<NodeSlot, usize> = self
            .nodes()
            .enumerate()
            .map(|(ordinal, node)| (node.slot(), ordinal))
            .collect();
        let section_ordinals: HashMap<SectionId, usize> = self
            .sections()
            .enumerate()
            .map(|(ordinal, (id, _))| (id, ordinal))
            .collect();

        let elements = self
            .elements()
            .map(|element| ElementDescription {
                nodes: element.nodes().map(|slot| node_ordinals[&slot]),
                section: section_ordinals[&element.section_id()],
            })
            .collect();

        let forces = self
            .forces()
            .flat_map(|(slot, load)| {
                let node = node_ordinals[&slot];
                LoadComponent::ALL
                    .into_iter()
                    .filter(move |c| load.component(*c) != 0.0)
                    .map(move |component| ForceDescription {
                        node,
                        component,
                        value: load.component(component),
                    })
            })
            .collect();

        ModelDescription {
            nodes: self.nodes().map(|node| node.coords()).collect(),
            sections: self.sections().map(|(_, s)| *s.properties()).collect(),
            elements,
            forces,
            supports: self.supports().map(|slot| node_ordinals[&slot]).collect(),
        }
    }

    /// Build a fresh model through the public edit operations
    pub fn from_description(description: &ModelDescription) -> FrameResult<Self> {
        let mut model = Model::new();

        let slots: Vec<NodeSlot> = description
            .nodes
            .iter()
            .map(|[x, y, z]| model.add_node(*x, *y, *z))
            .collect();

        let sections = description
            .sections
            .iter()
            .map(|properties| model.add_section(*properties))
            .collect::<FrameResult<Vec<SectionId>>>()?;

        for element in &description.elements {
            let [a, b, c] = element.nodes;
            model.add_element(
                lookup(&slots, a, "node")?,
                lookup(&slots, b, "node")?,
                lookup(&slots, c, "node")?,
                lookup(&sections, element.section, "section")?,
            )?;
        }

        for force in &description.forces {
            model.add_force(lookup(&slots, force.node, "node")?, force.component, force.value)?;
        }

        for support in &description.supports {
            model.add_support(lookup(&slots, *support, "node")?)?;
        }

        Ok(model)
    }
}
