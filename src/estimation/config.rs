//! Typed estimation configuration.
//!
//! Everything the estimation entry points need is passed explicitly through
//! [`EstimationConfig`]; there is no process-wide settings store.
use crate::{
    estimation::errors::{EstimationError, EstimationResult},
    filter::options::FilterOptions,
    optimization::maximizer::{DEFAULT_HESSIAN_STEP, OptimizerOptions},
    sampler::options::SamplerOptions,
    solver::types::SolverOptions,
    state_space::data::DataWindow,
};

/// Mode-finder settings: the optimizer, the relative step of the
/// central-difference Hessian, and how many times a stalled search is
/// restarted with a ten times shorter step.
#[derive(Debug, Clone, PartialEq)]
pub struct ModeOptions {
    pub optimizer: OptimizerOptions,
    pub hessian_step: f64,
    pub max_restarts: usize,
}

/// Restarts allowed after a stalled line search.
pub const DEFAULT_MODE_RESTARTS: usize = 4;

impl ModeOptions {
    pub fn new(optimizer: OptimizerOptions, hessian_step: f64) -> EstimationResult<Self> {
        let opts = Self { optimizer, hessian_step, max_restarts: DEFAULT_MODE_RESTARTS };
        opts.validate()?;
        Ok(opts)
    }

    pub fn with_max_restarts(mut self, max_restarts: usize) -> Self {
        self.max_restarts = max_restarts;
        self
    }

    pub fn validate(&self) -> EstimationResult<()> {
        if !(self.hessian_step.is_finite() && self.hessian_step > 0.0) {
            return Err(EstimationError::InvalidConfig {
                reason: format!("hessian_step must be finite and positive, got {}", self.hessian_step),
            });
        }
        Ok(())
    }
}

impl Default for ModeOptions {
    fn default() -> Self {
        Self {
            optimizer: OptimizerOptions::default(),
            hessian_step: DEFAULT_HESSIAN_STEP,
            max_restarts: DEFAULT_MODE_RESTARTS,
        }
    }
}

/// All estimation settings.
///
/// `window` slices the observation table before anything else; its
/// presample length replaces `filter.presample_periods`. Without a window
/// the whole table is used as given.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct EstimationConfig {
    pub solver: SolverOptions,
    pub filter: FilterOptions,
    pub window: Option<DataWindow>,
    pub mode: ModeOptions,
    pub sampler: SamplerOptions,
}

impl EstimationConfig {
    pub fn with_window(mut self, window: DataWindow) -> Self {
        self.window = Some(window);
        self
    }

    pub fn with_sampler(mut self, sampler: SamplerOptions) -> Self {
        self.sampler = sampler;
        self
    }

    pub fn with_mode(mut self, mode: ModeOptions) -> Self {
        self.mode = mode;
        self
    }

    pub fn validate(&self) -> EstimationResult<()> {
        SolverOptions::new(self.solver.div, self.solver.realsmall)?;
        self.filter.validate()?;
        self.mode.validate()?;
        self.sampler.validate()?;
        Ok(())
    }
}
