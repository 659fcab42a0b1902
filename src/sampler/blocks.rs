//! Random partitions of the free parameters into blocks, and the scaled
//! proposal factor of each block.
use crate::{
    sampler::errors::{SamplerError, SamplerResult},
    utils::to_dmatrix,
};
use nalgebra::{Cholesky, DMatrix};
use ndarray::{Array2, Axis};
use rand::{Rng, seq::SliceRandom};

/// Disjoint blocks of coordinate indices covering `0..dim`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BlockPartition {
    blocks: Vec<Vec<usize>>,
}

impl BlockPartition {
    /// Shuffle `0..dim` and cut it into `min(n_blocks, dim)` blocks whose
    /// sizes differ by at most one. Indices are sorted within each block.
    pub fn random<R: Rng + ?Sized>(dim: usize, n_blocks: usize, rng: &mut R) -> Self {
        let mut order: Vec<usize> = (0..dim).collect();
        order.shuffle(rng);
        Self::from_order(&order, n_blocks)
    }

    /// Contiguous blocks over `0..dim`; used when the order should not
    /// depend on the random stream.
    pub fn contiguous(dim: usize, n_blocks: usize) -> Self {
        let order: Vec<usize> = (0..dim).collect();
        Self::from_order(&order, n_blocks)
    }

    fn from_order(order: &[usize], n_blocks: usize) -> Self {
        let dim = order.len();
        let n_blocks = n_blocks.clamp(1, dim.max(1));
        let (base, extra) = (dim / n_blocks, dim % n_blocks);
        let mut blocks = Vec::with_capacity(n_blocks);
        let mut start = 0;
        for b in 0..n_blocks {
            let len = base + usize::from(b < extra);
            let mut block = order[start..start + len].to_vec();
            block.sort_unstable();
            blocks.push(block);
            start += len;
        }
        blocks.retain(|b| !b.is_empty());
        Self { blocks }
    }

    pub fn blocks(&self) -> &[Vec<usize>] {
        &self.blocks
    }

    pub fn len(&self) -> usize {
        self.blocks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.blocks.is_empty()
    }
}

/// `step_scale · chol(Σ_bb)` for every block `b`.
///
/// # Errors
/// `ProposalNotPositiveDefinite` naming the first block whose covariance
/// sub-block has no Cholesky factor.
pub fn proposal_factors(
    cov: &Array2<f64>, partition: &BlockPartition, step_scale: f64,
) -> SamplerResult<Vec<DMatrix<f64>>> {
    partition
        .blocks()
        .iter()
        .map(|block| {
            let sub = cov.select(Axis(0), block).select(Axis(1), block);
            Cholesky::new(to_dmatrix(&sub.view()))
                .map(|c| c.l() * step_scale)
                .ok_or_else(|| SamplerError::ProposalNotPositiveDefinite { block: block.clone() })
        })
        .collect()
}
