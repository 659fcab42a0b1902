//! Posterior mode finder.
//!
//! Maximizes `log p(y | θ) + log p(θ)` over the free parameters in
//! unconstrained coordinates, so the optimizer never proposes an infeasible
//! value. The objective excludes the transform Jacobian.
//!
//! Evaluation failures are sorted with [`EstimationError::is_mode_penalty`]:
//! points without a determinate equilibrium (or outside the prior support)
//! get [`MODE_PENALTY`] so the line search backs off, while any other
//! failure stops the optimizer and is returned with the parameters that
//! triggered it.
use crate::{
    estimation::{
        config::ModeOptions,
        errors::{EstimationError, EstimationResult},
        hessian::{hessian_at_mode, proposal_covariance, standard_errors, to_model_space},
        posterior::Posterior,
    },
    model::{parameters::ParameterRegistry, traits::DsgeModel},
    optimization::{
        errors::{OptError, OptResult},
        maximizer::{FnEvalMap, LogObjective, OptimOutcome, OptimizerOptions, Theta, maximize},
    },
};
use ndarray::{Array1, Array2};
use std::cell::RefCell;

/// Objective value assigned to penalized points.
pub const MODE_PENALTY: f64 = -1e10;

const RESTART_SHRINK: f64 = 0.1;

/// Mode, curvature and the proposal covariance derived from it.
///
/// `theta_hat`, `hessian` and `proposal_cov` are in unconstrained
/// coordinates; `mode` and `std_errors` are in model space.
#[derive(Debug, Clone, PartialEq)]
pub struct ModeResult {
    pub names: Vec<String>,
    pub theta_hat: Array1<f64>,
    pub mode: Array1<f64>,
    pub log_posterior: f64,
    pub hessian: Array2<f64>,
    pub proposal_cov: Array2<f64>,
    pub std_errors: Array1<f64>,
    pub outcome: OptimOutcome,
}

/// Objective seen by the optimizer: `θ = origin + scale · u`. A restart
/// moves `origin` to the best point so far and shrinks `scale`, which
/// shortens the first L-BFGS step by `scale²`.
struct ModeObjective<'p, 'm, M: DsgeModel + ?Sized> {
    posterior: &'p Posterior<'m, M>,
    workspace: RefCell<ParameterRegistry>,
    fatal: RefCell<Option<EstimationError>>,
    origin: Theta,
    scale: f64,
}

impl<'p, 'm, M: DsgeModel + ?Sized> ModeObjective<'p, 'm, M> {
    fn to_theta(&self, u: &Theta) -> Theta {
        &self.origin + &(u * self.scale)
    }

    fn evaluate(&self, theta: &Theta) -> OptResult<f64> {
        let mut ws = self.workspace.borrow_mut();
        match self.posterior.log_posterior(theta, &mut ws) {
            Ok(v) if v.is_finite() => Ok(v),
            Ok(_) => Ok(MODE_PENALTY),
            Err(e) if e.is_mode_penalty() => Ok(MODE_PENALTY),
            Err(e) => {
                let text = e.to_string();
                self.fatal.borrow_mut().get_or_insert(e);
                Err(OptError::EvaluationFailed { theta: theta.to_vec(), text })
            }
        }
    }

    /// Prefer the structured error captured during evaluation over its
    /// string form inside `OptError`.
    fn lift(&self, err: OptError) -> EstimationError {
        match (self.fatal.borrow_mut().take(), err) {
            (Some(fatal), _) => fatal,
            (None, OptError::EvaluationFailed { theta, text }) => EstimationError::AtParameters {
                theta,
                source: Box::new(EstimationError::InvalidConfig { reason: text }),
            },
            (None, other) => EstimationError::Optimization(other),
        }
    }
}

impl<'p, 'm, M: DsgeModel + ?Sized> LogObjective for ModeObjective<'p, 'm, M> {
    type Data = ();

    fn value(&self, u: &Theta, _: &()) -> OptResult<f64> {
        self.evaluate(&self.to_theta(u))
    }

    /// The starting point must have positive posterior density.
    fn check(&self, u: &Theta, _: &()) -> OptResult<()> {
        let theta = self.to_theta(u);
        let v = self.evaluate(&theta)?;
        if v <= MODE_PENALTY {
            return Err(OptError::EvaluationFailed {
                theta: theta.to_vec(),
                text: "starting point has zero posterior density".into(),
            });
        }
        Ok(())
    }
}

/// Find the posterior mode starting from the model's current parameter
/// values, then compute the Hessian there.
///
/// A line search that stalls (typically on the [`MODE_PENALTY`] plateau
/// after an overlong first step) restarts from the best point found so far
/// with the step scaled down by ten. The gradient tolerance is scaled along,
/// so convergence always means the same thing in `θ`.
///
/// # Errors
/// - `ModeNotConverged` if the optimizer stops on its iteration cap, or
///   still stalls after `opts.max_restarts` restarts.
/// - `HessianNotPositiveDefinite` if the curvature is not usable as a
///   proposal covariance.
/// - Fatal evaluation errors, wrapped in `AtParameters`.
pub fn find_mode<M: DsgeModel + ?Sized>(
    posterior: &Posterior<'_, M>, opts: &ModeOptions,
) -> EstimationResult<ModeResult> {
    opts.validate()?;
    let registry = posterior.model().parameters();
    let mut objective = ModeObjective {
        posterior,
        workspace: RefCell::new(registry.clone()),
        fatal: RefCell::new(None),
        origin: registry.to_unconstrained(),
        scale: 1.0,
    };
    tracing::info!(params = objective.origin.len(), names = ?registry.free_names(), "mode search started");

    let mut iterations = 0;
    let mut fn_evals = FnEvalMap::new();
    let mut attempt = 0;
    let outcome = loop {
        let optimizer = scaled_tolerances(&opts.optimizer, objective.scale);
        let u0 = Theta::zeros(objective.origin.len());
        let mut outcome = maximize(&objective, u0, &(), &optimizer).map_err(|e| objective.lift(e))?;
        iterations += outcome.iterations;
        for (name, count) in &outcome.fn_evals {
            *fn_evals.entry(name.clone()).or_insert(0) += count;
        }
        outcome.theta_hat = objective.to_theta(&outcome.theta_hat);
        outcome.grad_norm = outcome.grad_norm.map(|g| g / objective.scale);

        if outcome.converged {
            outcome.iterations = iterations;
            outcome.fn_evals = fn_evals;
            break outcome;
        }
        if !outcome.stalled || attempt == opts.max_restarts {
            return Err(EstimationError::ModeNotConverged { iterations, status: outcome.status });
        }
        attempt += 1;
        tracing::warn!(
            attempt,
            log_posterior = outcome.value,
            status = %outcome.status,
            "mode search stalled, restarting with a shorter step"
        );
        objective.origin = outcome.theta_hat;
        objective.scale *= RESTART_SHRINK;
    };
    tracing::info!(
        iterations = outcome.iterations,
        log_posterior = outcome.value,
        status = %outcome.status,
        "mode search finished"
    );

    let neg = |theta: &Theta| objective.evaluate(theta).map(|v| -v);
    let hessian = hessian_at_mode(&neg, &outcome.theta_hat, opts.hessian_step)
        .map_err(|e| match e {
            EstimationError::Optimization(opt) => objective.lift(opt),
            other => other,
        })?;
    let proposal_cov = match proposal_covariance(&hessian) {
        Ok(cov) => cov,
        Err(e) => {
            tracing::warn!(error = %e, "Hessian at mode rejected");
            return Err(e);
        }
    };
    tracing::info!("Hessian at mode is positive definite");

    let mode = registry.model_values(&outcome.theta_hat)?;
    let std_errors = to_model_space(registry, &outcome.theta_hat, &standard_errors(&hessian));
    Ok(ModeResult {
        names: registry.free_names(),
        theta_hat: outcome.theta_hat.clone(),
        mode,
        log_posterior: outcome.value,
        hessian,
        proposal_cov,
        std_errors,
        outcome,
    })
}

/// `u`-space gradients are `scale` times the `θ` gradients.
fn scaled_tolerances(opts: &OptimizerOptions, scale: f64) -> OptimizerOptions {
    let mut scaled = opts.clone();
    scaled.tols.tol_grad = opts.tols.tol_grad.map(|g| g * scale);
    scaled
}
