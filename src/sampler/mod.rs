//! sampler: blocked random-walk Metropolis–Hastings.
//!
//! Purpose
//! -------
//! Draw from a [`TargetDensity`] using Gaussian random-walk proposals
//! scaled by a proposal covariance (the inverse Hessian at the posterior
//! mode for DSGE estimation).
//!
//! Key behaviors
//! -------------
//! - Free coordinates are split into random blocks; each sweep updates
//!   every block once with standard Metropolis acceptance.
//! - Points with `-∞` log density are ordinary rejections. Only target
//!   errors abort a chain.
//! - The step scale is fixed for the run ([`SamplerOptions::tuning_notice`]).
//! - Burn-in sweeps run like the others but are not retained.
//! - [`MhChain::step`] advances one sweep, and a cancel flag stops a run
//!   between sweeps with the partial draws kept.
//! - [`run_chains`] runs independent chains on the rayon pool.

pub mod blocks;
pub mod chains;
pub mod diagnostics;
pub mod errors;
pub mod mh;
pub mod options;
pub mod target;

pub use self::blocks::BlockPartition;
pub use self::chains::run_chains;
pub use self::diagnostics::{ChainDiagnostics, ProposalStats};
pub use self::errors::{SamplerError, SamplerResult};
pub use self::mh::{ChainPhase, MhChain, accept, acceptance_probability};
pub use self::options::SamplerOptions;
pub use self::target::TargetDensity;
