//! Error types for the frame solver

use thiserror::Error;

use crate::loads::LoadComponent;

/// Main error type for model edits and analysis
#[derive(Error, Debug)]
pub enum FrameError {
    #[error("Node slot {0} not found in model")]
    NodeNotFound(usize),

    #[error("Element {0} not found in model")]
    ElementNotFound(usize),

    #[error("Section {0} not found in model")]
    SectionNotFound(usize),

    #[error("No {component:?} force recorded on node {node}")]
    ForceNotFound {
        node: usize,
        component: LoadComponent,
    },

    #[error("No support recorded on node {0}")]
    SupportNotFound(usize),

    #[error("Node {0} is not used by any element and cannot carry a support")]
    SupportOnFreeNode(usize),

    #[error("Invalid section: {0}")]
    InvalidSection(String),

    #[error("Invalid geometry: {0}")]
    InvalidGeometry(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Model has no supports - add at least one fixed support before solving")]
    NoSupports,

    #[error("Singular stiffness matrix - model may be unstable or have insufficient supports")]
    SingularMatrix,

    #[error("Factorization failed: {0}")]
    Factorization(String),

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),
}

/// Result type for frame solver operations
pub type FrameResult<T> = Result<T, FrameError>;
