//! rust_dsge: linear rational-expectations (DSGE) models: solution,
//! Kalman filtering and Bayesian estimation.
//!
//! Purpose
//! -------
//! Turn a model's equilibrium conditions into a state-space system, score
//! it against data, and explore the posterior of its structural
//! parameters.
//!
//! Data flow
//! ---------
//! ```text
//! ParameterRegistry + ModelSpec
//!   → DsgeModel::equilibrium_conditions  (Γ0, Γ1, C, Ψ, Π)
//!   → solver::solve                      (T, R, C′)
//!   → DsgeModel::measurement             (Z, D, Q, E, M, combined)
//!   → filter::filter                     log-likelihood
//!   → estimation::find_mode              mode, Hessian
//!   → sampler::run_chains                DrawCollection
//!   → draws::DrawStore
//! ```
//!
//! Key behaviors
//! -------------
//! - Concrete models implement [`model::traits::DsgeModel`]; the core never
//!   inspects their equations.
//! - Solver existence and uniqueness failures are ordinary rejections
//!   during sampling and penalties during mode finding.
//! - Builder contract violations and numerical failures at the mode abort
//!   with the parameter vector that caused them.
//! - Logging goes through `tracing`; the crate installs no subscriber.

pub mod draws;
pub mod estimation;
pub mod filter;
pub mod model;
pub mod optimization;
pub mod sampler;
pub mod solver;
pub mod state_space;
pub mod utils;

pub mod prelude {
    pub use crate::draws::{DrawCollection, DrawStore, JsonDirStore, MemoryDrawStore, Provenance, draw_prior};
    pub use crate::estimation::{
        Estimation, EstimationConfig, EstimationError, ModeOptions, Posterior, estimate, find_mode,
        sample_posterior,
    };
    pub use crate::filter::{FilterInit, FilterOptions, filter};
    pub use crate::model::prelude::*;
    pub use crate::sampler::{SamplerOptions, run_chains};
    pub use crate::solver::{SolverOptions, StructuralSystem, TransitionSystem, solve};
    pub use crate::state_space::{DataWindow, MeasurementSystem, ObservationTable};
}
