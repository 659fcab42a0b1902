//! Sampler configuration.
use crate::sampler::errors::{SamplerError, SamplerResult};
use serde::{Deserialize, Serialize};

/// Blocked random-walk Metropolis–Hastings settings.
///
/// - `n_blocks`: number of parameter blocks, clamped to the number of free
///   parameters. Every sweep updates every block once.
/// - `n_simulations`: sweeps per chain, burn-in included.
/// - `n_burn`: leading sweeps that are run but not retained.
/// - `thin`: keep every `thin`-th sweep after burn-in.
/// - `step_scale`: multiplies the Cholesky factor of each block's proposal
///   covariance. It is fixed for the whole run.
/// - `seed`: chain `i` uses `seed + i`.
/// - `reshuffle_blocks`: draw a new random partition before every sweep.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SamplerOptions {
    pub n_blocks: usize,
    pub n_simulations: usize,
    pub n_burn: usize,
    pub thin: usize,
    pub step_scale: f64,
    pub seed: u64,
    pub n_chains: usize,
    pub reshuffle_blocks: bool,
}

impl SamplerOptions {
    /// Options with `thin = 1`, one chain, fixed blocks and the default
    /// step scale.
    ///
    /// # Errors
    /// See [`SamplerOptions::validate`].
    pub fn new(n_blocks: usize, n_simulations: usize, n_burn: usize, seed: u64) -> SamplerResult<Self> {
        let opts = Self { n_blocks, n_simulations, n_burn, seed, ..Self::default() };
        opts.validate()?;
        Ok(opts)
    }

    pub fn with_step_scale(mut self, step_scale: f64) -> Self {
        self.step_scale = step_scale;
        self
    }

    pub fn with_thin(mut self, thin: usize) -> Self {
        self.thin = thin;
        self
    }

    pub fn with_chains(mut self, n_chains: usize) -> Self {
        self.n_chains = n_chains;
        self
    }

    pub fn with_reshuffle(mut self, reshuffle_blocks: bool) -> Self {
        self.reshuffle_blocks = reshuffle_blocks;
        self
    }

    /// # Errors
    /// `InvalidOptions` unless `n_blocks`, `thin` and `n_chains` are
    /// positive, `n_burn < n_simulations`, and `step_scale` is finite and
    /// positive.
    pub fn validate(&self) -> SamplerResult<()> {
        let fail = |reason: String| Err(SamplerError::InvalidOptions { reason });
        if self.n_blocks == 0 {
            return fail("n_blocks must be at least 1".into());
        }
        if self.n_burn >= self.n_simulations {
            return fail(format!(
                "n_burn ({}) must be smaller than n_simulations ({})",
                self.n_burn, self.n_simulations
            ));
        }
        if self.thin == 0 {
            return fail("thin must be at least 1".into());
        }
        if self.n_chains == 0 {
            return fail("n_chains must be at least 1".into());
        }
        if !(self.step_scale.is_finite() && self.step_scale > 0.0) {
            return fail(format!("step_scale must be finite and positive, got {}", self.step_scale));
        }
        Ok(())
    }

    /// Retained draws per chain: `ceil((n_simulations - n_burn) / thin)`.
    pub fn n_retained(&self) -> usize {
        (self.n_simulations - self.n_burn).div_ceil(self.thin)
    }

    /// User-facing note on step-size tuning.
    pub fn tuning_notice(&self) -> String {
        format!(
            "Proposal step scale is fixed at {} for all {} sweeps; it is not adapted during the run. \
             Check the reported per-block acceptance rates and rerun with a different step scale if needed.",
            self.step_scale, self.n_simulations
        )
    }
}

impl Default for SamplerOptions {
    fn default() -> Self {
        Self {
            n_blocks: 1,
            n_simulations: 10_000,
            n_burn: 1_000,
            thin: 1,
            step_scale: 0.5,
            seed: 0,
            n_chains: 1,
            reshuffle_blocks: false,
        }
    }
}
