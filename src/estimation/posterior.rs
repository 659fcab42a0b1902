//! Log posterior of a model given data.
//!
//! For a working copy of the parameter registry, one evaluation runs
//! `equilibrium_conditions → solve → measurement → filter` and adds the
//! joint log prior. In unconstrained coordinates the sampler also needs the
//! log-Jacobian of the transforms; the mode finder does not use it.
use crate::{
    estimation::{
        config::EstimationConfig,
        errors::{EstimationError, EstimationResult},
    },
    filter::{self, kalman::KalmanOutput, options::FilterOptions},
    model::{parameters::ParameterRegistry, traits::DsgeModel},
    sampler::target::TargetDensity,
    solver::{gensys, types::{SolverOptions, TransitionSystem}},
    state_space::{data::ObservationTable, measurement::MeasurementSystem},
};
use ndarray::{Array1, Array2};

pub struct Posterior<'m, M: DsgeModel + ?Sized> {
    model: &'m M,
    data: Array2<f64>,
    solver: SolverOptions,
    filter: FilterOptions,
}

impl<'m, M: DsgeModel + ?Sized> Posterior<'m, M> {
    /// Align `table` to the model's observables and apply the configured
    /// window.
    ///
    /// # Errors
    /// `Data` when an observable is missing or the window is invalid;
    /// `InvalidConfig` / layer errors from [`EstimationConfig::validate`].
    pub fn new(model: &'m M, table: &ObservationTable, config: &EstimationConfig) -> EstimationResult<Self> {
        config.validate()?;
        let mut aligned = table.align_to(model.spec())?;
        let mut filter = config.filter.clone();
        if let Some(window) = &config.window {
            aligned = aligned.window(window)?;
            filter.presample_periods = window.presample_periods();
        }
        if filter.presample_periods >= aligned.n_periods() {
            return Err(EstimationError::InvalidConfig {
                reason: format!(
                    "presample of {} periods leaves no main sample in {} periods",
                    filter.presample_periods,
                    aligned.n_periods()
                ),
            });
        }
        tracing::debug!(
            periods = aligned.n_periods(),
            presample = filter.presample_periods,
            missing = aligned.n_missing(),
            "posterior data prepared"
        );
        Ok(Self { model, data: aligned.values().clone(), solver: config.solver, filter })
    }

    pub fn model(&self) -> &'m M {
        self.model
    }

    /// Aligned, windowed data (rows are periods).
    pub fn data(&self) -> &Array2<f64> {
        &self.data
    }

    pub fn filter_options(&self) -> &FilterOptions {
        &self.filter
    }

    /// Solved transition and measurement systems at `params`.
    pub fn state_space(
        &self, params: &ParameterRegistry,
    ) -> EstimationResult<(TransitionSystem, MeasurementSystem)> {
        let structural = self.model.equilibrium_conditions(params)?;
        let transition = gensys::solve(&structural, &self.solver)?;
        let measurement = self.model.measurement(params, &transition, true)?;
        Ok((transition, measurement))
    }

    pub fn log_likelihood(&self, params: &ParameterRegistry) -> EstimationResult<f64> {
        let (transition, measurement) = self.state_space(params)?;
        Ok(filter::log_likelihood(&transition, &measurement, &self.data, &self.filter)?)
    }

    /// Filtered states and per-period likelihood at `params`.
    pub fn filter(&self, params: &ParameterRegistry) -> EstimationResult<KalmanOutput> {
        let (transition, measurement) = self.state_space(params)?;
        Ok(filter::filter(&transition, &measurement, &self.data, &self.filter)?)
    }

    /// Log likelihood plus log prior at the registry's current values.
    /// `-∞` without solving when a value is outside its prior support.
    pub fn log_posterior_at(&self, params: &ParameterRegistry) -> EstimationResult<f64> {
        let log_prior = params.log_prior();
        if log_prior == f64::NEG_INFINITY {
            return Ok(f64::NEG_INFINITY);
        }
        Ok(self.log_likelihood(params)? + log_prior)
    }

    /// Log posterior at unconstrained `theta`, written into `ws`.
    ///
    /// # Errors
    /// Any layer error, wrapped with the model-space parameters when it was
    /// raised by the model, solver or filter.
    pub fn log_posterior(&self, theta: &Array1<f64>, ws: &mut ParameterRegistry) -> EstimationResult<f64> {
        ws.set_from_unconstrained(theta)?;
        self.log_posterior_at(ws).map_err(|e| e.at(&ws.free_values().to_vec()))
    }

    /// [`Posterior::log_posterior`] plus the log-Jacobian of the transforms.
    pub fn log_posterior_unconstrained(
        &self, theta: &Array1<f64>, ws: &mut ParameterRegistry,
    ) -> EstimationResult<f64> {
        let lp = self.log_posterior(theta, ws)?;
        if lp == f64::NEG_INFINITY {
            return Ok(lp);
        }
        Ok(lp + ws.log_jacobian(theta)?)
    }
}

/// Unconstrained posterior as an MCMC target. Rejections become `-∞`;
/// anything else aborts the chain.
impl<'m, M: DsgeModel + ?Sized> TargetDensity for Posterior<'m, M> {
    type Workspace = ParameterRegistry;
    type Error = EstimationError;

    fn dim(&self) -> usize {
        self.model.parameters().n_free()
    }

    fn names(&self) -> Vec<String> {
        self.model.parameters().free_names()
    }

    fn workspace(&self) -> ParameterRegistry {
        self.model.parameters().clone()
    }

    fn log_density(&self, theta: &Array1<f64>, ws: &mut ParameterRegistry) -> EstimationResult<f64> {
        match self.log_posterior_unconstrained(theta, ws) {
            Ok(v) if v.is_nan() => Ok(f64::NEG_INFINITY),
            Ok(v) => Ok(v),
            Err(e) if e.is_rejection() => {
                tracing::trace!(error = %e, "proposal rejected");
                Ok(f64::NEG_INFINITY)
            }
            Err(e) => Err(e),
        }
    }

    fn to_model_space(&self, theta: &Array1<f64>, ws: &mut ParameterRegistry) -> EstimationResult<Array1<f64>> {
        Ok(ws.model_values(theta)?)
    }
}
