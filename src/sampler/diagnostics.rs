//! Acceptance bookkeeping.
use serde::{Deserialize, Serialize};

/// Proposal counts for one block position.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProposalStats {
    pub proposed: u64,
    pub accepted: u64,
    /// Proposals whose log density was `-∞`.
    pub rejected_invalid: u64,
}

impl ProposalStats {
    pub fn record(&mut self, accepted: bool, invalid: bool) {
        self.proposed += 1;
        self.accepted += u64::from(accepted);
        self.rejected_invalid += u64::from(invalid);
    }

    /// `NaN` before the first proposal.
    pub fn rate(&self) -> f64 {
        if self.proposed == 0 {
            return f64::NAN;
        }
        self.accepted as f64 / self.proposed as f64
    }
}

/// Per-chain acceptance statistics, burn-in included.
///
/// Blocks are tracked by position. With reshuffling, position `b` refers to
/// a different set of parameters in each sweep.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChainDiagnostics {
    pub chain_id: usize,
    pub blocks: Vec<ProposalStats>,
    pub sweeps: usize,
}

impl ChainDiagnostics {
    pub fn new(chain_id: usize, n_blocks: usize) -> Self {
        Self { chain_id, blocks: vec![ProposalStats::default(); n_blocks], sweeps: 0 }
    }

    pub fn block_rates(&self) -> Vec<f64> {
        self.blocks.iter().map(ProposalStats::rate).collect()
    }

    pub fn total(&self) -> ProposalStats {
        self.blocks.iter().fold(ProposalStats::default(), |acc, s| ProposalStats {
            proposed: acc.proposed + s.proposed,
            accepted: acc.accepted + s.accepted,
            rejected_invalid: acc.rejected_invalid + s.rejected_invalid,
        })
    }

    pub fn acceptance_rate(&self) -> f64 {
        self.total().rate()
    }
}
