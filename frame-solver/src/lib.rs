//! Frame Solver - linear static analysis of 3D beam frames
//!
//! Nodes live in a slot container whose removed slots are recycled.
//! Elements are Euler-Bernoulli beams oriented by a third reference node.
//! Fixed supports remove whole nodes from the system, which is then solved
//! with a sparse Cholesky factorization and, if that fails, a dense LU.
//!
//! ## Example
//! ```rust
//! use frame_solver::prelude::*;
//!
//! let mut model = Model::new();
//!
//! let section = model
//!     .add_section(SectionProperties::rectangular(Material::steel(), 0.3, 0.5))
//!     .unwrap();
//!
//! let n1 = model.add_node(0.0, 0.0, 0.0);
//! let n2 = model.add_node(10.0, 0.0, 0.0);
//! let up = model.add_node(0.0, 1.0, 0.0);
//!
//! model.add_element(n1, n2, up, section).unwrap();
//! model.add_support(n1).unwrap();
//! model.add_force(n2, LoadComponent::Fy, -10000.0).unwrap();
//!
//! model.solve().unwrap();
//!
//! let displacement = model.node_displacement(n2);
//! assert!(displacement.dy < 0.0);
//! ```

pub mod analysis;
pub mod description;
pub mod elements;
pub mod error;
pub mod loads;
pub mod math;
pub mod model;
pub mod results;

// Re-export common types
pub mod prelude {
    pub use crate::analysis::{AnalysisState, SolveMethod, SolveOptions};
    pub use crate::description::{ElementDescription, ForceDescription, ModelDescription};
    pub use crate::elements::{
        Beam, ElementId, Material, Node, NodeSlot, Section, SectionId, SectionProperties,
    };
    pub use crate::error::{FrameError, FrameResult};
    pub use crate::loads::{LoadComponent, NodeLoad};
    pub use crate::model::Model;
    pub use crate::results::{NodeDisplacement, SolveSummary};
}
