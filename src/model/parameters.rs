//! Parameter registry: named structural parameters with priors, transforms
//! and a fixed/free flag.
//!
//! The registry is insertion ordered. The *free* parameters, in that order,
//! form the vector the mode finder optimizes and the sampler explores.
//! Fixed parameters keep their value across every evaluation and never
//! enter that vector, the joint log prior or the log-Jacobian.
//!
//! A registry is cheap to clone. Each chain and each objective evaluation
//! works on its own copy, so concurrent chains never share mutable state.
use crate::model::{
    errors::{ModelError, ModelResult},
    priors::Prior,
    transforms::Transform,
};
use indexmap::IndexMap;
use ndarray::Array1;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Parameter {
    pub name: String,
    pub value: f64,
    pub prior: Option<Prior>,
    pub transform: Transform,
    pub fixed: bool,
    pub description: Option<String>,
}

impl Parameter {
    /// Free parameter with a prior and an unbounded transform.
    pub fn free(name: &str, value: f64, prior: Prior) -> Self {
        Self {
            name: name.to_string(),
            value,
            prior: Some(prior),
            transform: Transform::Identity,
            fixed: false,
            description: None,
        }
    }

    /// Parameter held at `value` for every evaluation.
    pub fn fixed(name: &str, value: f64) -> Self {
        Self {
            name: name.to_string(),
            value,
            prior: None,
            transform: Transform::Identity,
            fixed: true,
            description: None,
        }
    }

    pub fn with_transform(mut self, transform: Transform) -> Self {
        self.transform = transform;
        self
    }

    pub fn with_description(mut self, description: &str) -> Self {
        self.description = Some(description.to_string());
        self
    }

    fn check_value(&self, value: f64) -> ModelResult<()> {
        if !value.is_finite() {
            return Err(ModelError::OutOfSupport {
                name: self.name.clone(),
                value,
                reason: "value must be finite",
            });
        }
        if !self.fixed && !self.transform.contains(value) {
            return Err(ModelError::OutOfSupport {
                name: self.name.clone(),
                value,
                reason: "value lies outside the transform's support",
            });
        }
        Ok(())
    }

    fn validate(&self) -> ModelResult<()> {
        self.transform.validate().map_err(|reason| ModelError::InvalidTransform {
            name: self.name.clone(),
            reason: reason.to_string(),
        })?;
        match (&self.prior, self.fixed) {
            (Some(prior), _) => prior.validate()?,
            (None, false) => {
                return Err(ModelError::InvalidPrior {
                    dist: "missing",
                    reason: format!("free parameter '{}' needs a prior", self.name),
                });
            }
            (None, true) => {}
        }
        self.check_value(self.value)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ParameterRegistry {
    params: IndexMap<String, Parameter>,
}

impl ParameterRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a parameter after validating its prior, transform and value.
    ///
    /// # Errors
    /// `DuplicateParameter`, `InvalidPrior`, `InvalidTransform` or
    /// `OutOfSupport`.
    pub fn add(&mut self, param: Parameter) -> ModelResult<()> {
        if self.params.contains_key(&param.name) {
            return Err(ModelError::DuplicateParameter { name: param.name });
        }
        param.validate()?;
        self.params.insert(param.name.clone(), param);
        Ok(())
    }

    /// Builder-style [`ParameterRegistry::add`].
    pub fn with(mut self, param: Parameter) -> ModelResult<Self> {
        self.add(param)?;
        Ok(self)
    }

    pub fn len(&self) -> usize {
        self.params.len()
    }

    pub fn is_empty(&self) -> bool {
        self.params.is_empty()
    }

    pub fn n_free(&self) -> usize {
        self.params.values().filter(|p| !p.fixed).count()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Parameter> {
        self.params.values()
    }

    pub fn free_params(&self) -> impl Iterator<Item = &Parameter> {
        self.params.values().filter(|p| !p.fixed)
    }

    pub fn names(&self) -> Vec<String> {
        self.params.keys().cloned().collect()
    }

    pub fn free_names(&self) -> Vec<String> {
        self.free_params().map(|p| p.name.clone()).collect()
    }

    pub fn param(&self, name: &str) -> ModelResult<&Parameter> {
        self.params
            .get(name)
            .ok_or_else(|| ModelError::UnknownParameter { name: name.to_string() })
    }

    /// Current model-space value of `name`.
    pub fn get(&self, name: &str) -> ModelResult<f64> {
        Ok(self.param(name)?.value)
    }

    /// Set the value of `name` (fixed parameters included).
    pub fn set(&mut self, name: &str, value: f64) -> ModelResult<()> {
        let param = self
            .params
            .get_mut(name)
            .ok_or_else(|| ModelError::UnknownParameter { name: name.to_string() })?;
        param.check_value(value)?;
        param.value = value;
        Ok(())
    }

    /// Mark `name` as fixed (`true`) or free (`false`).
    ///
    /// # Errors
    /// Freeing a parameter without a prior, or whose value lies outside its
    /// transform's support, fails.
    pub fn set_fixed(&mut self, name: &str, fixed: bool) -> ModelResult<()> {
        let param = self
            .params
            .get_mut(name)
            .ok_or_else(|| ModelError::UnknownParameter { name: name.to_string() })?;
        let mut candidate = param.clone();
        candidate.fixed = fixed;
        candidate.validate()?;
        *param = candidate;
        Ok(())
    }

    /// Free values in model space, in registry order.
    pub fn free_values(&self) -> Array1<f64> {
        self.free_params().map(|p| p.value).collect()
    }

    /// Overwrite the free values from a model-space vector.
    pub fn set_free_values(&mut self, values: &Array1<f64>) -> ModelResult<()> {
        self.check_free_len(values.len())?;
        for (param, &value) in self.params.values().filter(|p| !p.fixed).zip(values.iter()) {
            param.check_value(value)?;
        }
        for (param, &value) in self.params.values_mut().filter(|p| !p.fixed).zip(values.iter()) {
            param.value = value;
        }
        Ok(())
    }

    /// Free values mapped to unconstrained space.
    pub fn to_unconstrained(&self) -> Array1<f64> {
        self.free_params().map(|p| p.transform.to_unconstrained(p.value)).collect()
    }

    /// Map an unconstrained vector `θ` to model space and store it.
    ///
    /// # Errors
    /// `FreeLengthMismatch`, or `OutOfSupport` when `θ` is non-finite or a
    /// transform saturates onto its bound.
    pub fn set_from_unconstrained(&mut self, theta: &Array1<f64>) -> ModelResult<()> {
        self.check_free_len(theta.len())?;
        let values: Array1<f64> = self
            .free_params()
            .zip(theta.iter())
            .map(|(p, &u)| p.transform.to_model(u))
            .collect();
        self.set_free_values(&values)
    }

    /// Model-space image of `θ` without touching the registry.
    pub fn model_values(&self, theta: &Array1<f64>) -> ModelResult<Array1<f64>> {
        self.check_free_len(theta.len())?;
        Ok(self.free_params().zip(theta.iter()).map(|(p, &u)| p.transform.to_model(u)).collect())
    }

    /// Sum of free-parameter log prior densities at the current values.
    /// `-∞` when any value is outside its prior's support.
    pub fn log_prior(&self) -> f64 {
        self.free_params().map(|p| p.prior.map_or(0.0, |prior| prior.ln_pdf(p.value))).sum()
    }

    /// `Σ ln |dxᵢ/duᵢ|` at unconstrained `θ`.
    pub fn log_jacobian(&self, theta: &Array1<f64>) -> ModelResult<f64> {
        self.check_free_len(theta.len())?;
        Ok(self.free_params().zip(theta.iter()).map(|(p, &u)| p.transform.log_jacobian(u)).sum())
    }

    fn check_free_len(&self, found: usize) -> ModelResult<()> {
        let expected = self.n_free();
        if found != expected {
            return Err(ModelError::FreeLengthMismatch { expected, found });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use ndarray::array;

    fn registry() -> ParameterRegistry {
        ParameterRegistry::new()
            .with(Parameter::free("mu", 0.75, Prior::normal(0.0, 1.0).expect("prior")))
            .and_then(|r| r.with(Parameter::fixed("delta", 0.025)))
            .and_then(|r| {
                r.with(
                    Parameter::free("beta", 0.9, Prior::uniform(-1.0, 1.0).expect("prior"))
                        .with_transform(Transform::Bounded { lo: -1.0, hi: 1.0 }),
                )
            })
            .expect("registry")
    }

    #[test]
    // Purpose
    // -------
    // Fixed parameters never enter the free vector and keep their value.
    //
    // Given
    // -----
    // - Registry (mu free, delta fixed, beta free).
    //
    // Expect
    // ------
    // - Free names [mu, beta]; writing a free vector leaves delta unchanged.
    fn fixed_parameters_stay_out_of_free_vector() {
        // Arrange
        let mut reg = registry();

        // Act
        reg.set_free_values(&array![0.1, -0.5]).expect("set");

        // Assert
        assert_eq!(reg.free_names(), vec!["mu".to_string(), "beta".to_string()]);
        assert_eq!(reg.get("delta").expect("delta"), 0.025);
        assert_eq!(reg.get("beta").expect("beta"), -0.5);
        assert!(matches!(
            reg.set_free_values(&array![0.1]),
            Err(ModelError::FreeLengthMismatch { expected: 2, found: 1 })
        ));
    }

    #[test]
    // Purpose
    // -------
    // Unconstrained round trips land back on the same model values.
    //
    // Given
    // -----
    // - The registry's current values.
    //
    // Expect
    // ------
    // - `set_from_unconstrained(to_unconstrained())` is a no-op.
    fn unconstrained_round_trip_is_identity() {
        let mut reg = registry();
        let before = reg.free_values();
        let theta = reg.to_unconstrained();
        reg.set_from_unconstrained(&theta).expect("set");
        let after = reg.free_values();
        for (a, b) in before.iter().zip(after.iter()) {
            assert_relative_eq!(a, b, epsilon = 1e-12);
        }
    }

    #[test]
    // Purpose
    // -------
    // Values outside a transform's support are rejected with the name.
    //
    // Given
    // -----
    // - beta bounded in (−1, 1), set to 1.5.
    //
    // Expect
    // ------
    // - `OutOfSupport { name: "beta", .. }` and the old value retained.
    fn out_of_support_values_are_rejected() {
        let mut reg = registry();
        let err = reg.set("beta", 1.5).expect_err("must fail");
        assert!(matches!(err, ModelError::OutOfSupport { ref name, .. } if name == "beta"));
        assert_eq!(reg.get("beta").expect("beta"), 0.9);
    }

    #[test]
    // Purpose
    // -------
    // Joint log prior sums free densities only.
    //
    // Given
    // -----
    // - mu ~ N(0, 1) at 0.75 and beta ~ U(−1, 1).
    //
    // Expect
    // ------
    // - ln φ(0.75) + ln ½.
    fn log_prior_sums_free_parameters() {
        let reg = registry();
        let expected =
            -0.5 * (2.0 * std::f64::consts::PI).ln() - 0.5 * 0.75 * 0.75 + 0.5f64.ln();
        assert_relative_eq!(reg.log_prior(), expected, epsilon = 1e-12);
    }

    #[test]
    // Purpose
    // -------
    // Registration rejects duplicates and free parameters without priors.
    //
    // Given
    // -----
    // - A second "mu"; freeing "delta", which has no prior.
    //
    // Expect
    // ------
    // - `DuplicateParameter` and `InvalidPrior`.
    fn registration_guards() {
        let mut reg = registry();
        assert!(matches!(
            reg.add(Parameter::fixed("mu", 1.0)),
            Err(ModelError::DuplicateParameter { .. })
        ));
        assert!(matches!(reg.set_fixed("delta", false), Err(ModelError::InvalidPrior { .. })));
        assert!(reg.param("delta").expect("delta").fixed);
    }
}
