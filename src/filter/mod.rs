//! filter: exact Gaussian likelihood of a linear state-space system.
//!
//! Purpose
//! -------
//! Score a solved transition and measurement system against observed data.
//! The recursion is sequential in time; nothing here is parallel.
//!
//! Key behaviors
//! -------------
//! - Missing entries (`NaN`) drop out of that period's update.
//! - Initialization is stationary when `T` is mean reverting and diffuse
//!   otherwise, unless fixed by the caller ([`FilterInit`]).
//! - Presample periods run through the recursion but are not summed.
//! - A non-positive-definite innovation covariance is an error, never a
//!   silently wrong likelihood.

pub mod errors;
pub mod init;
pub mod kalman;
pub mod options;

pub use self::errors::{FilterError, FilterResult};
pub use self::init::{InitKind, spectral_radius, stationary_covariance};
pub use self::kalman::{KalmanOutput, filter, log_likelihood};
pub use self::options::{FilterInit, FilterOptions};
