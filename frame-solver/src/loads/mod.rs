//! Nodal load types

mod node_load;

pub use node_load::{LoadComponent, NodeLoad};
