//! The capability a concrete model supplies to the core.
//!
//! A model owns its [`ModelSpec`] and a template [`ParameterRegistry`], and
//! knows how to turn parameter values into the structural system and the
//! measurement equation. The core never inspects anything else about it.
use crate::{
    model::{errors::ModelResult, parameters::ParameterRegistry, spec::ModelSpec},
    solver::types::{StructuralSystem, TransitionSystem},
    state_space::measurement::MeasurementSystem,
};

/// Equation builder plus measurement builder.
///
/// Both builders read parameter values from the registry they are handed,
/// not from [`DsgeModel::parameters`]; the estimation layer passes a working
/// copy whose free values have been set to the point being evaluated.
///
/// `Sync` lets several chains share one model by reference.
pub trait DsgeModel: Sync {
    fn spec(&self) -> &ModelSpec;

    /// Parameters at their starting values.
    fn parameters(&self) -> &ParameterRegistry;

    /// `(Γ0, Γ1, C, Ψ, Π)` at the given parameter values.
    fn equilibrium_conditions(&self, params: &ParameterRegistry) -> ModelResult<StructuralSystem>;

    /// `(Z, D, Q, E, M)` and the combined covariance. With
    /// `with_shocks == false` the shock covariance `Q` is zero.
    fn measurement(
        &self, params: &ParameterRegistry, transition: &TransitionSystem, with_shocks: bool,
    ) -> ModelResult<MeasurementSystem>;
}
