//! maximizer: Argmin-backed L-BFGS maximization of a scalar log-objective.
//!
//! Purpose
//! -------
//! Maximize a log-objective `ℓ(θ)` over an unconstrained parameter vector.
//! The posterior mode finder implements [`LogObjective`] for the
//! log-posterior and calls [`maximize`]; the Hessian step reuses
//! [`finite_diff::value_hessian`].
//!
//! Conventions
//! -----------
//! - The solver minimizes `c(θ) = -ℓ(θ)`; every public value is in terms of
//!   `ℓ`, including [`OptimOutcome::value`].
//! - Analytic gradients are optional. Without one, [`adapter::ArgMinAdapter`]
//!   differences the cost centrally and falls back to forward differences.
//! - An `OptError` raised inside the objective comes back out of
//!   [`maximize`] with its variant intact.

pub mod adapter;
pub mod api;
pub mod builders;
pub mod finite_diff;
pub mod run;
pub mod traits;
pub mod types;
pub mod validation;

pub use self::api::maximize;
pub use self::finite_diff::{DEFAULT_HESSIAN_STEP, value_hessian};
pub use self::traits::{LineSearcher, LogObjective, OptimOutcome, OptimizerOptions, Tolerances};
pub use self::types::{Cost, DEFAULT_LBFGS_MEM, FnEvalMap, Grad, Hessian, Theta};

pub mod prelude {
    pub use super::api::maximize;
    pub use super::traits::{LineSearcher, LogObjective, OptimOutcome, OptimizerOptions, Tolerances};
    pub use super::types::{Cost, Grad, Hessian, Theta};
}
