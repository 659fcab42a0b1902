//! estimation: posterior evaluation, mode finding and the path to MCMC.
//!
//! Purpose
//! -------
//! Glue the model, solver, measurement mapper and filter into a log
//! posterior, find its mode, and hand the mode and inverse Hessian to the
//! sampler.
//!
//! Key behaviors
//! -------------
//! - [`Posterior`] evaluates on a caller-owned registry copy; it is also the
//!   sampler's [`TargetDensity`](crate::sampler::TargetDensity).
//! - [`find_mode`] penalizes points without a determinate equilibrium and
//!   aborts on anything else, carrying the offending parameters.
//! - The Hessian must be positive definite before sampling can start.
//!
//! Conventions
//! -----------
//! - The optimizer and sampler work in unconstrained coordinates; reported
//!   modes, standard errors and draws are in model space.

pub mod config;
pub mod errors;
pub mod hessian;
pub mod mode;
pub mod pipeline;
pub mod posterior;

pub use self::config::{EstimationConfig, ModeOptions};
pub use self::errors::{EstimationError, EstimationResult};
pub use self::mode::{MODE_PENALTY, ModeResult, find_mode};
pub use self::pipeline::{Estimation, estimate, sample_posterior};
pub use self::posterior::Posterior;
