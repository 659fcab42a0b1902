//! Filter configuration.
use crate::filter::errors::{FilterError, FilterResult};
use ndarray::{Array1, Array2};
use serde::{Deserialize, Serialize};

/// Scale of the diffuse prior covariance `scale · I`.
pub const DEFAULT_DIFFUSE_SCALE: f64 = 1e6;

/// Smallest squared Cholesky pivot of the innovation covariance accepted as
/// positive definite.
pub const DEFAULT_PD_TOLERANCE: f64 = 1e-12;

/// How the state mean and covariance are initialized.
///
/// - `Stationary`: the unconditional distribution of `sₜ`. Falls back to a
///   diffuse prior with `diffuse_scale` when `T` is not mean reverting.
/// - `Diffuse`: zero mean, `scale · I` covariance.
/// - `Fixed`: caller-supplied mean and covariance.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum FilterInit {
    Stationary { diffuse_scale: f64 },
    Diffuse { scale: f64 },
    Fixed { mean: Array1<f64>, cov: Array2<f64> },
}

impl Default for FilterInit {
    fn default() -> Self {
        FilterInit::Stationary { diffuse_scale: DEFAULT_DIFFUSE_SCALE }
    }
}

/// Options for [`filter`](super::kalman::filter).
///
/// The first `presample_periods` rows run through the recursion but do not
/// enter the log-likelihood.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FilterOptions {
    pub init: FilterInit,
    pub presample_periods: usize,
    pub pd_tolerance: f64,
}

impl FilterOptions {
    /// # Errors
    /// `InvalidOptions` for a non-positive scale or tolerance, or a fixed
    /// covariance that is not square.
    pub fn new(init: FilterInit, presample_periods: usize, pd_tolerance: f64) -> FilterResult<Self> {
        let opts = Self { init, presample_periods, pd_tolerance };
        opts.validate()?;
        Ok(opts)
    }

    pub fn with_presample(mut self, presample_periods: usize) -> Self {
        self.presample_periods = presample_periods;
        self
    }

    pub fn validate(&self) -> FilterResult<()> {
        if !(self.pd_tolerance.is_finite() && self.pd_tolerance > 0.0) {
            return Err(FilterError::InvalidOptions {
                reason: format!("pd_tolerance must be positive, got {}", self.pd_tolerance),
            });
        }
        match &self.init {
            FilterInit::Stationary { diffuse_scale: scale } | FilterInit::Diffuse { scale } => {
                if !(scale.is_finite() && *scale > 0.0) {
                    return Err(FilterError::InvalidOptions {
                        reason: format!("diffuse scale must be positive, got {scale}"),
                    });
                }
            }
            FilterInit::Fixed { mean, cov } => {
                if cov.dim() != (mean.len(), mean.len()) {
                    return Err(FilterError::InvalidOptions {
                        reason: format!(
                            "fixed covariance has shape {:?} for a mean of length {}",
                            cov.dim(),
                            mean.len()
                        ),
                    });
                }
            }
        }
        Ok(())
    }
}

impl Default for FilterOptions {
    fn default() -> Self {
        Self { init: FilterInit::default(), presample_periods: 0, pd_tolerance: DEFAULT_PD_TOLERANCE }
    }
}
