//! model: everything a concrete DSGE model declares.
//!
//! - [`parameters`]: the Parameter Registry (priors, transforms, fixed/free).
//! - [`spec`]: the Model Specification (insertion-ordered symbol tables).
//! - [`traits::DsgeModel`]: the equation and measurement builders.
//!
//! A model is built once. Afterwards only parameter values change, always on
//! a working copy of the registry.

pub mod errors;
pub mod parameters;
pub mod priors;
pub mod spec;
pub mod traits;
pub mod transforms;

pub mod prelude {
    pub use super::errors::{ModelError, ModelResult};
    pub use super::parameters::{Parameter, ParameterRegistry};
    pub use super::priors::Prior;
    pub use super::spec::{ModelSpec, SymbolMap};
    pub use super::traits::DsgeModel;
    pub use super::transforms::Transform;
}
