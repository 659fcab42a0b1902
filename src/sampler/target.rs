//! The density a chain explores.
use ndarray::Array1;

/// Log density over an unconstrained vector.
///
/// Implementations return `Ok(f64::NEG_INFINITY)` for points the chain must
/// reject (outside the support, no equilibrium, degenerate likelihood) and
/// reserve `Err` for failures that should abort the chain.
///
/// Each chain owns one [`Workspace`](TargetDensity::Workspace), created by
/// [`workspace`](TargetDensity::workspace), so chains never share mutable
/// state; the target itself is shared read-only.
pub trait TargetDensity: Sync {
    type Workspace: Clone + Send;
    type Error: std::error::Error;

    fn dim(&self) -> usize;

    /// Labels of the coordinates, in order.
    fn names(&self) -> Vec<String>;

    fn workspace(&self) -> Self::Workspace;

    fn log_density(&self, theta: &Array1<f64>, ws: &mut Self::Workspace) -> Result<f64, Self::Error>;

    /// Map a point to the space draws are reported in. Defaults to the
    /// identity.
    fn to_model_space(&self, theta: &Array1<f64>, _ws: &mut Self::Workspace) -> Result<Array1<f64>, Self::Error> {
        Ok(theta.clone())
    }
}
