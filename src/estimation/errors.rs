//! Estimation error surface.
//!
//! `EstimationError` wraps the layer errors met while evaluating the
//! posterior and adds the failures specific to mode finding. Two
//! predicates sort errors by how callers must react:
//!
//! - [`EstimationError::is_rejection`]: the sampler treats the point as
//!   having zero density (no equilibrium, degenerate filter, outside the
//!   support).
//! - [`EstimationError::is_mode_penalty`]: the mode finder penalizes the
//!   point. Numerical filter failures are *not* penalized there; a mode
//!   that cannot be evaluated cannot seed the proposal covariance.
//!
//! Everything else is fatal and, when raised at a specific parameter
//! vector, comes wrapped in [`EstimationError::AtParameters`].
use crate::{
    filter::errors::FilterError,
    model::errors::ModelError,
    optimization::errors::OptError,
    sampler::errors::SamplerError,
    solver::errors::SolveError,
    state_space::errors::DataError,
};

pub type EstimationResult<T> = Result<T, EstimationError>;

#[derive(Debug, Clone, PartialEq)]
pub enum EstimationError {
    Model(ModelError),
    Solve(SolveError),
    Filter(FilterError),
    Data(DataError),
    Optimization(OptError),
    Sampler(SamplerError),

    /// The optimizer stopped without meeting its tolerances.
    ModeNotConverged { iterations: usize, status: String },

    /// The Hessian of the negative log posterior at the mode has no
    /// Cholesky factor.
    HessianNotPositiveDefinite { min_eigenvalue: f64 },

    InvalidConfig { reason: String },

    /// A fatal error raised while evaluating the model-space parameter
    /// vector `theta`.
    AtParameters { theta: Vec<f64>, source: Box<EstimationError> },
}

impl EstimationError {
    pub fn is_rejection(&self) -> bool {
        match self {
            EstimationError::Solve(e) => e.is_parameter_dependent(),
            EstimationError::Filter(e) => e.is_numerical(),
            EstimationError::Model(ModelError::OutOfSupport { .. }) => true,
            EstimationError::AtParameters { source, .. } => source.is_rejection(),
            _ => false,
        }
    }

    pub fn is_mode_penalty(&self) -> bool {
        match self {
            EstimationError::Solve(e) => e.is_parameter_dependent(),
            EstimationError::Model(ModelError::OutOfSupport { .. }) => true,
            EstimationError::AtParameters { source, .. } => source.is_mode_penalty(),
            _ => false,
        }
    }

    /// Attach the parameter vector that triggered the error.
    pub fn at(self, theta: &[f64]) -> Self {
        match self {
            already @ EstimationError::AtParameters { .. } => already,
            other => EstimationError::AtParameters { theta: theta.to_vec(), source: Box::new(other) },
        }
    }
}

impl std::error::Error for EstimationError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            EstimationError::Model(e) => Some(e),
            EstimationError::Solve(e) => Some(e),
            EstimationError::Filter(e) => Some(e),
            EstimationError::Data(e) => Some(e),
            EstimationError::Optimization(e) => Some(e),
            EstimationError::Sampler(e) => Some(e),
            EstimationError::AtParameters { source, .. } => Some(source.as_ref()),
            _ => None,
        }
    }
}

impl std::fmt::Display for EstimationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            EstimationError::Model(e) => write!(f, "{e}"),
            EstimationError::Solve(e) => write!(f, "{e}"),
            EstimationError::Filter(e) => write!(f, "{e}"),
            EstimationError::Data(e) => write!(f, "{e}"),
            EstimationError::Optimization(e) => write!(f, "Optimization error: {e}"),
            EstimationError::Sampler(e) => write!(f, "Sampler error: {e}"),
            EstimationError::ModeNotConverged { iterations, status } => write!(
                f,
                "Optimization error: mode finder did not converge after {iterations} iterations ({status})"
            ),
            EstimationError::HessianNotPositiveDefinite { min_eigenvalue } => write!(
                f,
                "Optimization error: Hessian at the mode is not positive definite (min eigenvalue {min_eigenvalue:e})"
            ),
            EstimationError::InvalidConfig { reason } => write!(f, "Invalid configuration: {reason}"),
            EstimationError::AtParameters { theta, source } => {
                write!(f, "{source} (at parameters {theta:?})")
            }
        }
    }
}

impl From<ModelError> for EstimationError {
    fn from(e: ModelError) -> Self {
        EstimationError::Model(e)
    }
}

impl From<SolveError> for EstimationError {
    fn from(e: SolveError) -> Self {
        EstimationError::Solve(e)
    }
}

impl From<FilterError> for EstimationError {
    fn from(e: FilterError) -> Self {
        EstimationError::Filter(e)
    }
}

impl From<DataError> for EstimationError {
    fn from(e: DataError) -> Self {
        EstimationError::Data(e)
    }
}

impl From<OptError> for EstimationError {
    fn from(e: OptError) -> Self {
        EstimationError::Optimization(e)
    }
}

impl From<SamplerError> for EstimationError {
    fn from(e: SamplerError) -> Self {
        EstimationError::Sampler(e)
    }
}
