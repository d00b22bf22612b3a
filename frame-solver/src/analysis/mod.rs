//! Analysis state, options and the reduced-system solve

mod elimination;
mod numbering;

use log::{debug, warn};
use serde::{Deserialize, Serialize};

pub use elimination::ConstraintMap;
pub use numbering::DofNumbering;

use crate::elements::NodeSlot;
use crate::error::{FrameError, FrameResult};
use crate::math::{self, SkylineCholesky, SparseMatrixBuilder, Vec as FEVec};

/// Where the model stands relative to its last solve
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum AnalysisState {
    /// No valid solution; initial state and after any edit
    #[default]
    Unsolved,
    /// Inside `solve`
    Solving,
    /// Displacements are valid until the next edit
    Solved,
}

/// Direct solver that produced a solution
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SolveMethod {
    /// Skyline Cholesky on the sparse reduced matrix
    SparseCholesky,
    /// Dense LU fallback
    DenseLu,
}

/// Options for the linear solve
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SolveOptions {
    /// Retry with a dense LU when the sparse factorization fails
    pub dense_fallback: bool,
    /// Relative pivot threshold below which a factorization is rejected
    pub pivot_tolerance: f64,
    /// Largest relative residual accepted from the dense path
    pub residual_tolerance: f64,
}

impl Default for SolveOptions {
    fn default() -> Self {
        Self {
            dense_fallback: true,
            pivot_tolerance: 1e-12,
            residual_tolerance: 1e-8,
        }
    }
}

impl SolveOptions {
    /// Sparse path only
    pub fn without_dense_fallback(mut self) -> Self {
        self.dense_fallback = false;
        self
    }

    pub fn with_pivot_tolerance(mut self, tol: f64) -> Self {
        self.pivot_tolerance = tol;
        self
    }

    pub fn with_residual_tolerance(mut self, tol: f64) -> Self {
        self.residual_tolerance = tol;
        self
    }
}

/// The unreduced global system of a model
#[derive(Debug, Clone)]
pub struct GlobalSystem {
    /// Global stiffness triplets, duplicates not yet summed
    pub stiffness: SparseMatrixBuilder,
    /// Global load vector, six entries per equation block
    pub loads: FEVec,
    /// Node slots in equation block order
    pub order: Vec<NodeSlot>,
    /// Blocks of nodes carrying a fixed support
    pub fixed_blocks: Vec<usize>,
}

/// Solve the reduced system, falling back to a dense LU when the sparse
/// factorization fails and the options allow it
pub fn solve_reduced(
    stiffness: &SparseMatrixBuilder,
    loads: &FEVec,
    options: &SolveOptions,
) -> FrameResult<(FEVec, SolveMethod)> {
    let sparse = SkylineCholesky::factor(&stiffness.to_csr(), options.pivot_tolerance)
        .and_then(|chol| chol.solve(loads));

    match sparse {
        Ok(x) => Ok((x, SolveMethod::SparseCholesky)),
        Err(err) if options.dense_fallback => {
            warn!("Sparse factorization failed ({err}); retrying with dense LU");
            let x = math::solve_dense_lu(
                &stiffness.to_dense(),
                loads,
                options.pivot_tolerance,
                options.residual_tolerance,
            )
            .map_err(|dense_err| {
                warn!("Dense LU failed: {dense_err}");
                FrameError::SingularMatrix
            })?;
            debug!("Dense LU solved {} equations", loads.len());
            Ok((x, SolveMethod::DenseLu))
        }
        Err(err) => {
            warn!("Sparse factorization failed ({err}); dense fallback disabled");
            Err(FrameError::SingularMatrix)
        }
    }
}
