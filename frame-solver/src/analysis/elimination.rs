//! Removal of fully fixed node blocks from the global system

use crate::math::SparseMatrixBuilder;

/// Index remap from the full system to the reduced one
///
/// Every fixed block is removed in one pass: a retained index moves down by
/// six for each eliminated block lying below it, and anything inside an
/// eliminated block is dropped.
#[derive(Debug, Clone, Default)]
pub struct ConstraintMap {
    /// Sorted, unique
    eliminated: Vec<usize>,
    block_count: usize,
}

impl ConstraintMap {
    pub fn new(block_count: usize, eliminated: impl IntoIterator<Item = usize>) -> Self {
        let mut eliminated: Vec<usize> = eliminated
            .into_iter()
            .filter(|block| *block < block_count)
            .collect();
        eliminated.sort_unstable();
        eliminated.dedup();
        Self {
            eliminated,
            block_count,
        }
    }

    pub fn is_eliminated(&self, block: usize) -> bool {
        self.eliminated.binary_search(&block).is_ok()
    }

    /// Eliminated blocks in ascending order
    pub fn eliminated(&self) -> &[usize] {
        &self.eliminated
    }

    pub fn block_count(&self) -> usize {
        self.block_count
    }

    /// Position of a block in the reduced system
    pub fn reduce_block(&self, block: usize) -> Option<usize> {
        if block >= self.block_count || self.is_eliminated(block) {
            return None;
        }
        let below = self.eliminated.partition_point(|b| *b < block);
        Some(block - below)
    }

    /// Position of a single DOF in the reduced system
    pub fn reduce_dof(&self, dof: usize) -> Option<usize> {
        self.reduce_block(dof / 6).map(|block| block * 6 + dof % 6)
    }

    pub fn reduced_size(&self) -> usize {
        (self.block_count - self.eliminated.len()) * 6
    }

    /// Remap every triplet of the full matrix; triplets touching an
    /// eliminated block are dropped
    pub fn reduce_matrix(&self, full: &SparseMatrixBuilder) -> SparseMatrixBuilder {
        let mut reduced = SparseMatrixBuilder::new(self.reduced_size());
        for &(row, col, value) in full.entries() {
            if let (Some(r), Some(c)) = (self.reduce_dof(row), self.reduce_dof(col)) {
                reduced.add(r, c, value);
            }
        }
        reduced
    }
}
