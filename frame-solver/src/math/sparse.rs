//! Sparse assembly and direct solvers
//!
//! Frame stiffness matrices are banded and mostly empty, so the global
//! system is accumulated as COO triplets, materialized through
//! `nalgebra-sparse` (which sums duplicate entries) and factorized in
//! skyline storage. A dense LU path is kept for systems the skyline
//! Cholesky rejects.

use nalgebra::{DMatrix, DVector};
use nalgebra_sparse::{CooMatrix, CsrMatrix};

use crate::error::{FrameError, FrameResult};

/// Sparse matrix builder using COO format
///
/// Entries are appended without deduplication; repeated (row, col) pairs
/// are summed when the matrix is materialized.
#[derive(Debug, Clone)]
pub struct SparseMatrixBuilder {
    size: usize,
    entries: Vec<(usize, usize, f64)>,
}

impl SparseMatrixBuilder {
    /// Create a new sparse matrix builder
    pub fn new(size: usize) -> Self {
        // Each node couples to a handful of neighbours: ~6 blocks of 36
        let estimated_nnz = size * 36;
        Self {
            size,
            entries: Vec::with_capacity(estimated_nnz),
        }
    }

    /// Add a value to the matrix (accumulates if already exists). Only exact
    /// zeros are skipped.
    #[inline]
    pub fn add(&mut self, row: usize, col: usize, value: f64) {
        if value != 0.0 {
            self.entries.push((row, col, value));
        }
    }

    pub fn size(&self) -> usize {
        self.size
    }

    /// Raw triplets in insertion order
    pub fn entries(&self) -> &[(usize, usize, f64)] {
        &self.entries
    }

    /// Convert to CSR format, summing duplicates
    pub fn to_csr(&self) -> CsrMatrix<f64> {
        let mut coo = CooMatrix::new(self.size, self.size);

        for &(row, col, val) in &self.entries {
            coo.push(row, col, val);
        }

        CsrMatrix::from(&coo)
    }

    /// Convert to dense matrix
    pub fn to_dense(&self) -> DMatrix<f64> {
        let mut mat = DMatrix::zeros(self.size, self.size);

        for &(row, col, val) in &self.entries {
            mat[(row, col)] += val;
        }

        mat
    }

    /// Number of stored triplets (before duplicates are summed)
    pub fn nnz(&self) -> usize {
        self.entries.len()
    }

    /// Get sparsity ratio
    pub fn sparsity(&self) -> f64 {
        let total = self.size * self.size;
        if total == 0 {
            return 1.0;
        }
        1.0 - (self.entries.len() as f64 / total as f64)
    }
}

/// Skyline Cholesky factorization for symmetric positive definite matrices
///
/// Only the lower triangle of the input is read.
#[derive(Debug, Clone)]
pub struct SkylineCholesky {
    size: usize,
    // For each row, values from the first non-zero column up to the diagonal
    skyline: Vec<Vec<f64>>,
    // Distance from the diagonal to the first non-zero column
    heights: Vec<usize>,
}

impl SkylineCholesky {
    /// Copy the lower triangle of `csr` into skyline storage and factorize.
    ///
    /// A pivot is rejected when it falls to `pivot_tolerance` times the
    /// original diagonal or below, which catches numerically singular
    /// systems rather than returning a meaningless solution.
    pub fn factor(csr: &CsrMatrix<f64>, pivot_tolerance: f64) -> FrameResult<Self> {
        if csr.nrows() != csr.ncols() {
            return Err(FrameError::Factorization(format!(
                "matrix is not square ({}x{})",
                csr.nrows(),
                csr.ncols()
            )));
        }
        let size = csr.nrows();

        // Compute row heights (skyline profile)
        let mut heights = vec![0usize; size];
        for (row, col, _val) in csr.triplet_iter() {
            if col < row {
                heights[row] = heights[row].max(row - col);
            }
        }

        let mut skyline: Vec<Vec<f64>> = heights.iter().map(|&h| vec![0.0; h + 1]).collect();

        for (row, col, &val) in csr.triplet_iter() {
            if col <= row {
                let start = row - heights[row];
                skyline[row][col - start] += val;
            }
        }

        let mut solver = Self {
            size,
            skyline,
            heights,
        };
        solver.factorize(pivot_tolerance)?;
        Ok(solver)
    }

    fn factorize(&mut self, pivot_tolerance: f64) -> FrameResult<()> {
        for i in 0..self.size {
            let hi = self.heights[i];
            let start_i = i - hi;

            // Compute L[i,j] for j < i
            for j in start_i..i {
                let start_j = j - self.heights[j];
                let start = start_i.max(start_j);

                let mut sum = 0.0;
                for k in start..j {
                    sum += self.get(i, k) * self.get(j, k);
                }

                let diag_j = self.get(j, j);
                let idx = j - start_i;
                self.skyline[i][idx] = (self.skyline[i][idx] - sum) / diag_j;
            }

            // Compute L[i,i] (diagonal)
            let mut sum = 0.0;
            for k in start_i..i {
                let val = self.get(i, k);
                sum += val * val;
            }

            let original = self.skyline[i][hi];
            let pivot = original - sum;
            if !pivot.is_finite() || pivot <= pivot_tolerance * original.abs() {
                return Err(FrameError::Factorization(format!(
                    "non-positive pivot {pivot:e} at row {i} (diagonal {original:e})"
                )));
            }
            self.skyline[i][hi] = pivot.sqrt();
        }

        Ok(())
    }

    /// Lower-triangle entry L[row, col] for col <= row
    #[inline]
    fn get(&self, row: usize, col: usize) -> f64 {
        let start = row - self.heights[row];
        if col < start {
            return 0.0;
        }
        self.skyline[row][col - start]
    }

    /// Solve L * L^T * x = b
    pub fn solve(&self, b: &DVector<f64>) -> FrameResult<DVector<f64>> {
        if b.len() != self.size {
            return Err(FrameError::InvalidInput(format!(
                "right-hand side has {} entries, system has {}",
                b.len(),
                self.size
            )));
        }
        let mut x = b.clone();

        // Forward substitution: L * y = b
        for i in 0..self.size {
            let start = i - self.heights[i];

            let mut sum = 0.0;
            for j in start..i {
                sum += self.get(i, j) * x[j];
            }

            x[i] = (x[i] - sum) / self.get(i, i);
        }

        // Backward substitution: L^T * x = y
        for i in (0..self.size).rev() {
            x[i] /= self.get(i, i);

            let start = i - self.heights[i];
            for j in start..i {
                x[j] -= self.get(i, j) * x[i];
            }
        }

        if x.iter().any(|v| !v.is_finite()) {
            return Err(FrameError::Factorization(
                "non-finite value in skyline solution".to_string(),
            ));
        }
        Ok(x)
    }
}

/// Dense LU solve with singularity checks
///
/// Rejects the system when a pivot of U is at most `pivot_tolerance` times
/// the largest entry of `a`, or when the relative residual of the result
/// exceeds `residual_tolerance`.
pub fn solve_dense_lu(
    a: &DMatrix<f64>,
    b: &DVector<f64>,
    pivot_tolerance: f64,
    residual_tolerance: f64,
) -> FrameResult<DVector<f64>> {
    let n = a.nrows();
    if n == 0 {
        return Ok(DVector::zeros(0));
    }

    let scale = a.amax();
    if !scale.is_finite() || scale == 0.0 {
        return Err(FrameError::Factorization(
            "matrix is empty or non-finite".to_string(),
        ));
    }

    let lu = a.clone().lu();
    let u = lu.u();
    for i in 0..n {
        let pivot = u[(i, i)].abs();
        if !(pivot > pivot_tolerance * scale) {
            return Err(FrameError::Factorization(format!(
                "LU pivot {pivot:e} at row {i} is below tolerance"
            )));
        }
    }

    let x = lu
        .solve(b)
        .ok_or_else(|| FrameError::Factorization("LU solve failed".to_string()))?;
    if x.iter().any(|v| !v.is_finite()) {
        return Err(FrameError::Factorization(
            "non-finite value in LU solution".to_string(),
        ));
    }

    let residual = (a * &x - b).norm();
    let bound = residual_tolerance * (a.norm() * x.norm() + b.norm());
    if residual > bound {
        return Err(FrameError::Factorization(format!(
            "LU residual {residual:e} exceeds {bound:e}"
        )));
    }

    Ok(x)
}
