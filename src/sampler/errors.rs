//! Sampler error surface.
//!
//! Rejected proposals never show up here: a target reports them as a
//! log-density of `-∞`. What remains is configuration, a broken proposal
//! covariance, or a fatal target failure that aborts the chain.
use crate::draws::errors::DrawError;

pub type SamplerResult<T> = Result<T, SamplerError>;

#[derive(Debug, Clone, PartialEq)]
pub enum SamplerError {
    InvalidOptions { reason: String },

    /// Start vector or proposal covariance has the wrong size.
    DimensionMismatch { what: &'static str, expected: (usize, usize), found: (usize, usize) },

    /// The covariance sub-block of a parameter block has no Cholesky factor.
    ProposalNotPositiveDefinite { block: Vec<usize> },

    /// The chain cannot start where the target density is zero.
    NonFiniteStart { value: f64 },

    /// The target failed fatally at `theta`.
    Target { theta: Vec<f64>, text: String },

    /// Assembling the draw collection failed.
    Draws(DrawError),
}

impl std::error::Error for SamplerError {}

impl std::fmt::Display for SamplerError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SamplerError::InvalidOptions { reason } => write!(f, "Invalid sampler options: {reason}"),
            SamplerError::DimensionMismatch { what, expected, found } => {
                write!(f, "Sampler {what} has shape {found:?}, expected {expected:?}")
            }
            SamplerError::ProposalNotPositiveDefinite { block } => write!(
                f,
                "Proposal covariance is not positive definite on block {block:?}"
            ),
            SamplerError::NonFiniteStart { value } => {
                write!(f, "Log density at the starting point is {value}")
            }
            SamplerError::Target { theta, text } => {
                write!(f, "Target evaluation failed at theta = {theta:?}: {text}")
            }
            SamplerError::Draws(err) => write!(f, "{err}"),
        }
    }
}

impl From<DrawError> for SamplerError {
    fn from(err: DrawError) -> Self {
        SamplerError::Draws(err)
    }
}
