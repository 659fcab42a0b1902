//! Entry points: mode, then posterior sampling from the mode.
use crate::{
    draws::collection::DrawCollection,
    estimation::{
        config::EstimationConfig,
        errors::EstimationResult,
        mode::{ModeResult, find_mode},
        posterior::Posterior,
    },
    model::traits::DsgeModel,
    sampler::{chains::run_chains, options::SamplerOptions},
    state_space::data::ObservationTable,
};
use std::sync::atomic::AtomicBool;

#[derive(Debug, Clone, PartialEq)]
pub struct Estimation {
    pub mode: ModeResult,
    /// One collection per chain, in chain order.
    pub chains: Vec<DrawCollection>,
}

/// Sample the posterior with proposals scaled by the inverse Hessian at the
/// mode. Chains start at the mode.
pub fn sample_posterior<M: DsgeModel + ?Sized>(
    posterior: &Posterior<'_, M>, mode: &ModeResult, opts: &SamplerOptions,
    cancel: Option<&AtomicBool>,
) -> EstimationResult<Vec<DrawCollection>> {
    Ok(run_chains(posterior, &mode.theta_hat, &mode.proposal_cov, opts, cancel)?)
}

/// Find the mode, then sample. A mode-finding failure stops here; no chain
/// starts without a valid proposal covariance.
pub fn estimate<M: DsgeModel + ?Sized>(
    model: &M, table: &ObservationTable, config: &EstimationConfig, cancel: Option<&AtomicBool>,
) -> EstimationResult<Estimation> {
    let posterior = Posterior::new(model, table, config)?;
    let mode = find_mode(&posterior, &config.mode)?;
    let chains = sample_posterior(&posterior, &mode, &config.sampler, cancel)?;
    Ok(Estimation { mode, chains })
}
