//! Blocked random-walk Metropolis–Hastings chain.
//!
//! One *sweep* visits every block once. For block `b` with indices `I_b`,
//! the candidate is `θ* = θ` except `θ*_{I_b} = θ_{I_b} + L_b z`, with
//! `z ~ N(0, I)` and `L_b` the scaled Cholesky factor of the proposal
//! covariance restricted to `I_b`. The proposal is symmetric, so the
//! candidate is accepted with probability `min(1, exp(ℓ(θ*) − ℓ(θ)))`.
//!
//! Phases run `Initializing → BurningIn → Sampling → Done`. A draw is
//! retained after sweep `k` (1-based) when `k > n_burn` and
//! `(k − n_burn − 1) % thin == 0`.
use crate::{
    draws::collection::{DrawCollection, DrawMeta, Provenance},
    sampler::{
        blocks::{BlockPartition, proposal_factors},
        diagnostics::ChainDiagnostics,
        errors::{SamplerError, SamplerResult},
        options::SamplerOptions,
        target::TargetDensity,
    },
};
use nalgebra::{DMatrix, DVector};
use ndarray::{Array1, Array2};
use rand::{Rng, SeedableRng, rngs::StdRng};
use rand_distr::StandardNormal;
use std::sync::atomic::{AtomicBool, Ordering};

/// `min(1, exp(candidate − current))`; zero when the candidate has zero
/// density.
pub fn acceptance_probability(current: f64, candidate: f64) -> f64 {
    if candidate == f64::NEG_INFINITY || candidate.is_nan() {
        return 0.0;
    }
    (candidate - current).exp().min(1.0)
}

/// Accept when `ln u < log_alpha` for `u ~ U[0, 1)`, which happens with
/// probability `min(1, exp(log_alpha))`.
pub fn accept(log_alpha: f64, u: f64) -> bool {
    u.ln() < log_alpha
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChainPhase {
    Initializing,
    BurningIn,
    Sampling,
    Done,
}

pub struct MhChain<'t, T: TargetDensity> {
    target: &'t T,
    opts: SamplerOptions,
    chain_id: usize,
    rng: StdRng,
    workspace: T::Workspace,
    proposal_cov: Array2<f64>,
    partition: BlockPartition,
    factors: Vec<DMatrix<f64>>,
    current: Array1<f64>,
    current_log_density: f64,
    phase: ChainPhase,
    sweeps_done: usize,
    diagnostics: ChainDiagnostics,
    rows: Vec<Array1<f64>>,
    accepted: Vec<bool>,
    log_posterior: Vec<f64>,
    iterations: Vec<usize>,
}

impl<'t, T: TargetDensity> MhChain<'t, T> {
    /// Set up a chain at `start` with seed `opts.seed + chain_id`.
    ///
    /// # Errors
    /// - `InvalidOptions` from [`SamplerOptions::validate`].
    /// - `DimensionMismatch` if `start` or `proposal_cov` disagree with
    ///   `target.dim()`.
    /// - `ProposalNotPositiveDefinite` for a block without a Cholesky
    ///   factor.
    /// - `NonFiniteStart` if the density at `start` is not finite.
    pub fn new(
        target: &'t T, start: Array1<f64>, proposal_cov: Array2<f64>, opts: &SamplerOptions,
        chain_id: usize,
    ) -> SamplerResult<Self> {
        opts.validate()?;
        let dim = target.dim();
        if start.len() != dim {
            return Err(SamplerError::DimensionMismatch {
                what: "start",
                expected: (dim, 1),
                found: (start.len(), 1),
            });
        }
        if proposal_cov.dim() != (dim, dim) {
            return Err(SamplerError::DimensionMismatch {
                what: "proposal covariance",
                expected: (dim, dim),
                found: proposal_cov.dim(),
            });
        }
        let mut rng = StdRng::seed_from_u64(opts.seed.wrapping_add(chain_id as u64));
        let partition = BlockPartition::random(dim, opts.n_blocks, &mut rng);
        let factors = proposal_factors(&proposal_cov, &partition, opts.step_scale)?;
        let mut workspace = target.workspace();
        let current_log_density = target
            .log_density(&start, &mut workspace)
            .map_err(|e| target_error(&start, &e))?;
        if !current_log_density.is_finite() {
            return Err(SamplerError::NonFiniteStart { value: current_log_density });
        }
        let capacity = opts.n_retained();
        let mut chain = Self {
            target,
            opts: opts.clone(),
            chain_id,
            rng,
            workspace,
            proposal_cov,
            diagnostics: ChainDiagnostics::new(chain_id, partition.len()),
            partition,
            factors,
            current: start,
            current_log_density,
            phase: ChainPhase::Initializing,
            sweeps_done: 0,
            rows: Vec::with_capacity(capacity),
            accepted: Vec::with_capacity(capacity),
            log_posterior: Vec::with_capacity(capacity),
            iterations: Vec::with_capacity(capacity),
        };
        tracing::info!(
            chain = chain_id,
            dim,
            blocks = chain.partition.len(),
            log_density = current_log_density,
            "chain initialized"
        );
        chain.set_phase(if opts.n_burn > 0 { ChainPhase::BurningIn } else { ChainPhase::Sampling });
        Ok(chain)
    }

    pub fn phase(&self) -> ChainPhase {
        self.phase
    }

    pub fn current(&self) -> &Array1<f64> {
        &self.current
    }

    pub fn current_log_density(&self) -> f64 {
        self.current_log_density
    }

    pub fn sweeps_done(&self) -> usize {
        self.sweeps_done
    }

    pub fn n_retained(&self) -> usize {
        self.rows.len()
    }

    pub fn partition(&self) -> &BlockPartition {
        &self.partition
    }

    pub fn diagnostics(&self) -> &ChainDiagnostics {
        &self.diagnostics
    }

    /// Evaluate `candidate` and accept it when `ln u` falls below the log
    /// acceptance ratio. Returns whether the chain moved.
    ///
    /// `step` calls this with `u ~ U[0, 1)`; tests can inject both the
    /// candidate and `u`.
    pub fn try_candidate(&mut self, candidate: Array1<f64>, u: f64) -> SamplerResult<bool> {
        self.try_candidate_in_block(None, candidate, u)
    }

    fn try_candidate_in_block(
        &mut self, block: Option<usize>, candidate: Array1<f64>, u: f64,
    ) -> SamplerResult<bool> {
        let candidate_ld = self
            .target
            .log_density(&candidate, &mut self.workspace)
            .map_err(|e| target_error(&candidate, &e))?;
        let invalid = candidate_ld == f64::NEG_INFINITY || candidate_ld.is_nan();
        let moved = !invalid && accept(candidate_ld - self.current_log_density, u);
        if moved {
            self.current = candidate;
            self.current_log_density = candidate_ld;
        }
        if let Some(stats) = block.and_then(|b| self.diagnostics.blocks.get_mut(b)) {
            stats.record(moved, invalid);
        }
        Ok(moved)
    }

    /// Run one sweep over all blocks and retain a draw if due.
    ///
    /// # Errors
    /// `Target` when the target fails fatally; `ProposalNotPositiveDefinite`
    /// if a reshuffled block has no Cholesky factor.
    pub fn step(&mut self) -> SamplerResult<ChainPhase> {
        if self.phase == ChainPhase::Done {
            return Ok(ChainPhase::Done);
        }
        if self.opts.reshuffle_blocks && self.sweeps_done > 0 {
            self.partition =
                BlockPartition::random(self.current.len(), self.opts.n_blocks, &mut self.rng);
            self.factors = proposal_factors(&self.proposal_cov, &self.partition, self.opts.step_scale)?;
        }

        let mut moved_any = false;
        for b in 0..self.partition.len() {
            let block = &self.partition.blocks()[b];
            let z = DVector::from_fn(block.len(), |_, _| self.rng.sample::<f64, _>(StandardNormal));
            let delta = &self.factors[b] * z;
            let mut candidate = self.current.clone();
            for (k, &i) in block.iter().enumerate() {
                candidate[i] += delta[k];
            }
            let u: f64 = self.rng.gen();
            moved_any |= self.try_candidate_in_block(Some(b), candidate, u)?;
        }
        self.sweeps_done += 1;
        self.diagnostics.sweeps = self.sweeps_done;

        let burn = self.opts.n_burn;
        if self.sweeps_done > burn && (self.sweeps_done - burn - 1) % self.opts.thin == 0 {
            let row = self
                .target
                .to_model_space(&self.current, &mut self.workspace)
                .map_err(|e| target_error(&self.current, &e))?;
            self.rows.push(row);
            self.accepted.push(moved_any);
            self.log_posterior.push(self.current_log_density);
            self.iterations.push(self.sweeps_done);
        }
        self.log_progress();

        if self.sweeps_done >= self.opts.n_simulations {
            self.set_phase(ChainPhase::Done);
        } else if self.sweeps_done >= burn && self.phase == ChainPhase::BurningIn {
            self.set_phase(ChainPhase::Sampling);
        }
        Ok(self.phase)
    }

    /// Sweep until `Done` or until `cancel` is raised between sweeps, then
    /// collect the retained draws. A cancelled run returns the draws made
    /// so far with `complete == false`.
    pub fn run(mut self, cancel: Option<&AtomicBool>) -> SamplerResult<DrawCollection> {
        while self.phase != ChainPhase::Done {
            if cancel.is_some_and(|c| c.load(Ordering::Relaxed)) {
                tracing::warn!(
                    chain = self.chain_id,
                    sweeps = self.sweeps_done,
                    retained = self.rows.len(),
                    "chain cancelled"
                );
                break;
            }
            self.step()?;
        }
        self.into_draws()
    }

    /// Collect the retained draws, complete or not, with the chain's
    /// per-block acceptance counts attached.
    pub fn into_draws(self) -> SamplerResult<DrawCollection> {
        let n_params = self.rows.first().map_or(self.target.dim(), Array1::len);
        let mut draws = Array2::zeros((self.rows.len(), n_params));
        for (mut dst, src) in draws.rows_mut().into_iter().zip(self.rows.iter()) {
            dst.assign(src);
        }
        let meta = DrawMeta {
            chain_id: self.chain_id,
            provenance: Provenance::Posterior,
            n_burn: self.opts.n_burn,
            thin: self.opts.thin,
            complete: self.phase == ChainPhase::Done,
        };
        Ok(DrawCollection::new(
            self.target.names(),
            draws,
            self.accepted,
            self.log_posterior,
            self.iterations,
            meta,
        )?
        .with_diagnostics(self.diagnostics))
    }

    fn set_phase(&mut self, phase: ChainPhase) {
        if phase == self.phase {
            return;
        }
        self.phase = phase;
        match phase {
            ChainPhase::BurningIn => {
                tracing::info!(chain = self.chain_id, n_burn = self.opts.n_burn, "burn-in started")
            }
            ChainPhase::Sampling => tracing::info!(
                chain = self.chain_id,
                sweeps = self.sweeps_done,
                acceptance = self.diagnostics.acceptance_rate(),
                "sampling started"
            ),
            ChainPhase::Done => tracing::info!(
                chain = self.chain_id,
                retained = self.rows.len(),
                acceptance = self.diagnostics.acceptance_rate(),
                block_acceptance = ?self.diagnostics.block_rates(),
                "chain done"
            ),
            ChainPhase::Initializing => {}
        }
    }

    fn log_progress(&self) {
        let every = (self.opts.n_simulations / 10).max(1);
        if self.sweeps_done % every == 0 {
            tracing::debug!(
                chain = self.chain_id,
                sweeps = self.sweeps_done,
                log_density = self.current_log_density,
                block_acceptance = ?self.diagnostics.block_rates(),
                "chain progress"
            );
        }
    }
}

fn target_error<E: std::error::Error>(theta: &Array1<f64>, err: &E) -> SamplerError {
    SamplerError::Target { theta: theta.to_vec(), text: err.to_string() }
}
