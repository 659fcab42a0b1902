//! Independent chains in parallel.
//!
//! Chains share the target and the proposal covariance read-only. Each one
//! builds its own workspace and random stream (`seed + chain_id`), so the
//! draws of chain `i` do not depend on how many chains run beside it.
use crate::{
    draws::collection::DrawCollection,
    sampler::{errors::SamplerResult, mh::MhChain, options::SamplerOptions, target::TargetDensity},
};
use ndarray::{Array1, Array2};
use rayon::prelude::*;
use std::sync::atomic::AtomicBool;

/// Run `opts.n_chains` chains from the same start and return their draws in
/// chain order. Each collection carries its chain's per-block acceptance
/// counts.
///
/// `cancel` is checked between sweeps by every chain; cancelled chains
/// return partial collections.
///
/// # Errors
/// The first chain error, if any chain fails.
pub fn run_chains<T: TargetDensity>(
    target: &T, start: &Array1<f64>, proposal_cov: &Array2<f64>, opts: &SamplerOptions,
    cancel: Option<&AtomicBool>,
) -> SamplerResult<Vec<DrawCollection>> {
    opts.validate()?;
    tracing::info!(
        chains = opts.n_chains,
        sweeps = opts.n_simulations,
        n_burn = opts.n_burn,
        retained_per_chain = opts.n_retained(),
        "starting chains"
    );
    tracing::info!("{}", opts.tuning_notice());
    let draws = (0..opts.n_chains)
        .into_par_iter()
        .map(|chain_id| {
            MhChain::new(target, start.clone(), proposal_cov.clone(), opts, chain_id)?.run(cancel)
        })
        .collect::<SamplerResult<Vec<_>>>()?;
    tracing::info!(
        chains = draws.len(),
        acceptance = ?draws.iter().map(DrawCollection::acceptance_rate).collect::<Vec<_>>(),
        block_acceptance = ?draws.iter().map(DrawCollection::block_acceptance_rates).collect::<Vec<_>>(),
        "chains finished"
    );
    Ok(draws)
}
