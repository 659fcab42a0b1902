//! Guarded scalar maps and the small tolerances shared across layers.
//!
//! - `model::transforms` builds every parameter transform and its
//!   log-Jacobian from the softplus and logistic helpers here.
//! - `filter::init` compares spectral radii against [`STATIONARITY_TOL`].
//! - `estimation::hessian` floors eigenvalues at [`EIGEN_EPS`].
//!
//! Everything here is pure and allocation free.

pub mod transformations;

pub use self::transformations::{
    EIGEN_EPS, LOGIT_EPS, STATIONARITY_TOL, log_logistic, safe_logistic, safe_logit,
    safe_softplus, safe_softplus_inv,
};

pub mod prelude {
    pub use super::transformations::{
        EIGEN_EPS, LOGIT_EPS, STATIONARITY_TOL, log_logistic, safe_logistic, safe_logit,
        safe_softplus, safe_softplus_inv,
    };
}
