//! Structural elements module

mod beam;
mod material;
mod node;
mod section;

pub use beam::{Beam, ElementId};
pub use material::Material;
pub use node::{Node, NodeContainer, NodeSlot};
pub use section::{
    BendingCoefficients, Section, SectionId, SectionProperties, DEFAULT_TORSION_CONSTANT,
};
