//! state_space: measurement equation, observation data and simulation.
//!
//! - [`measurement`]: the Measurement Mapper output, validated against the
//!   model specification, with the combined covariance the filter uses.
//! - [`data`]: observation tables (rows are periods, `NaN` is missing) and
//!   sample windows.
//! - [`simulate`](simulate::simulate): synthetic data from a solved system.

pub mod data;
pub mod errors;
pub mod measurement;
pub mod simulate;

pub use self::data::{DataWindow, ObservationTable};
pub use self::errors::{DataError, DataResult};
pub use self::measurement::MeasurementSystem;
pub use self::simulate::{Simulated, simulate};
