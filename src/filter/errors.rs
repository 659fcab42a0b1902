//! Kalman filter error surface.
//!
//! Dimension and option errors are contract violations. The numerical
//! variants ([`FilterError::is_numerical`]) mean the candidate parameters
//! produced a degenerate state-space system.

pub type FilterResult<T> = Result<T, FilterError>;

#[derive(Debug, Clone, PartialEq)]
pub enum FilterError {
    /// Transition, measurement and data disagree in shape.
    DimensionMismatch { what: &'static str, expected: (usize, usize), found: (usize, usize) },

    /// No periods to filter.
    EmptyData,

    /// Filter options are invalid.
    InvalidOptions { reason: String },

    /// Innovation covariance is not positive definite within tolerance.
    NotPositiveDefinite { period: usize, min_pivot: f64 },

    /// A period's log-density is not finite.
    NonFiniteLikelihood { period: usize, value: f64 },

    /// Stationary covariance requested for a non-stationary system.
    NonStationary { spectral_radius: f64 },

    /// The Lyapunov doubling iteration did not settle.
    LyapunovNotConverged { iterations: usize },

    /// `I - T` is singular, so the unconditional mean does not exist.
    SingularMean,
}

impl FilterError {
    /// Whether the failure comes from the numbers rather than a malformed
    /// call.
    pub fn is_numerical(&self) -> bool {
        matches!(
            self,
            FilterError::NotPositiveDefinite { .. }
                | FilterError::NonFiniteLikelihood { .. }
                | FilterError::NonStationary { .. }
                | FilterError::LyapunovNotConverged { .. }
                | FilterError::SingularMean
        )
    }
}

impl std::error::Error for FilterError {}

impl std::fmt::Display for FilterError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            FilterError::DimensionMismatch { what, expected, found } => {
                write!(f, "Filter dimension error: {what} has shape {found:?}, expected {expected:?}")
            }
            FilterError::EmptyData => write!(f, "Filter received no periods"),
            FilterError::InvalidOptions { reason } => write!(f, "Invalid filter options: {reason}"),
            FilterError::NotPositiveDefinite { period, min_pivot } => write!(
                f,
                "Numerical error: innovation covariance not positive definite at period {period} (pivot {min_pivot:e})"
            ),
            FilterError::NonFiniteLikelihood { period, value } => {
                write!(f, "Numerical error: log-likelihood {value} at period {period}")
            }
            FilterError::NonStationary { spectral_radius } => write!(
                f,
                "Numerical error: stationary initialization needs spectral radius < 1, found {spectral_radius}"
            ),
            FilterError::LyapunovNotConverged { iterations } => {
                write!(f, "Numerical error: Lyapunov iteration did not converge in {iterations} steps")
            }
            FilterError::SingularMean => {
                write!(f, "Numerical error: I - T is singular, no unconditional mean")
            }
        }
    }
}
