//! optimization: numerical optimization layer used by mode finding.
//!
//! - [`maximizer`]: L-BFGS maximization of a log-objective plus
//!   finite-difference gradient and Hessian helpers.
//! - [`numerical_stability`]: overflow-safe softplus / logistic maps used by
//!   the parameter transforms.
//! - [`errors`]: the shared [`errors::OptError`] surface.
//!
//! Nothing here knows about DSGE models; the estimation layer supplies the
//! objective.

pub mod errors;
pub mod maximizer;
pub mod numerical_stability;

pub mod prelude {
    pub use super::errors::{OptError, OptResult};
    pub use super::maximizer::prelude::*;
    pub use super::numerical_stability::prelude::*;
}
