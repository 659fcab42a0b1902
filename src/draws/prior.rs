//! Draws from the joint prior of the free parameters.
use crate::{
    draws::{
        collection::{DrawCollection, DrawMeta, Provenance},
        errors::DrawResult,
    },
    model::{errors::ModelError, parameters::ParameterRegistry},
};
use ndarray::Array2;
use rand::{SeedableRng, rngs::StdRng};

/// `n` independent draws of the free parameters from their priors.
///
/// `log_posterior` holds the joint log prior of each draw. Every draw
/// counts as accepted.
///
/// # Errors
/// `Model` if a free parameter has no prior or a prior cannot be sampled.
pub fn draw_prior(registry: &ParameterRegistry, n: usize, seed: u64) -> DrawResult<DrawCollection> {
    let mut rng = StdRng::seed_from_u64(seed);
    let priors = registry
        .free_params()
        .map(|p| {
            p.prior.ok_or_else(|| ModelError::InvalidPrior {
                dist: "none",
                reason: format!("free parameter '{}' has no prior", p.name),
            })
        })
        .collect::<Result<Vec<_>, _>>()?;

    let mut draws = Array2::zeros((n, priors.len()));
    let mut log_prior = Vec::with_capacity(n);
    for i in 0..n {
        let mut lp = 0.0;
        for (j, prior) in priors.iter().enumerate() {
            let x = prior.sample(&mut rng)?;
            draws[[i, j]] = x;
            lp += prior.ln_pdf(x);
        }
        log_prior.push(lp);
    }
    tracing::debug!(n, params = priors.len(), seed, "drew prior sample");
    DrawCollection::new(
        registry.free_names(),
        draws,
        vec![true; n],
        log_prior,
        (1..=n).collect(),
        DrawMeta { chain_id: 0, provenance: Provenance::Prior, n_burn: 0, thin: 1, complete: true },
    )
}
