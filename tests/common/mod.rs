//! Toy models shared by the integration tests.
//!
//! - [`Ma1`]: `xₜ = μ + uₜ + β uₜ₋₁`, `uₜ ~ N(0, σ²)`, written in state
//!   space with states `(u_t, u_t1)`.
//! - [`ForwardLooking`]: `xₜ = a Eₜxₜ₊₁ + zₜ`, `zₜ = ρ zₜ₋₁ + εₜ`,
//!   determinate only for `|a| < 1`.
#![allow(dead_code)]

use ndarray::{Array1, Array2};
use rand::{SeedableRng, rngs::StdRng};
use rust_dsge::{
    model::prelude::*,
    solver::{SolverOptions, StructuralSystem, TransitionSystem, solve},
    state_space::{MeasurementSystem, ObservationTable, simulate},
};

pub struct Ma1 {
    spec: ModelSpec,
    params: ParameterRegistry,
}

impl Ma1 {
    pub fn new(mu: f64, beta: f64, sigma: f64) -> Self {
        let none: [&str; 0] = [];
        let spec = ModelSpec::new(&["u_t", "u_t1"], &["u"], &none, &["x_t"], &["eq_u", "eq_u1"])
            .expect("MA(1) spec");
        let params = ParameterRegistry::new()
            .with(
                Parameter::free("mu", mu, Prior::normal(0.0, 2.0).expect("prior"))
                    .with_description("mean of x"),
            )
            .and_then(|r| {
                r.with(
                    Parameter::free("beta", beta, Prior::uniform(-1.0, 1.0).expect("prior"))
                        .with_transform(Transform::Bounded { lo: -1.0, hi: 1.0 })
                        .with_description("MA coefficient"),
                )
            })
            .and_then(|r| {
                r.with(
                    Parameter::free("sigma", sigma, Prior::inverse_gamma(2.0, 0.5).expect("prior"))
                        .with_transform(Transform::LowerBounded { lo: 0.0 })
                        .with_description("shock standard deviation"),
                )
            })
            .expect("MA(1) parameters");
        Self { spec, params }
    }
}

impl DsgeModel for Ma1 {
    fn spec(&self) -> &ModelSpec {
        &self.spec
    }

    fn parameters(&self) -> &ParameterRegistry {
        &self.params
    }

    fn equilibrium_conditions(&self, _params: &ParameterRegistry) -> ModelResult<StructuralSystem> {
        let s = &self.spec;
        let mut sys = StructuralSystem::zeros(s.n_states(), s.n_shocks(), s.n_expectational_errors());
        let (u, u1) = (s.state("u_t")?, s.state("u_t1")?);
        let eps = s.shock("u")?;
        let (eq_u, eq_u1) = (s.equation("eq_u")?, s.equation("eq_u1")?);

        sys.gamma0[[eq_u, u]] = 1.0;
        sys.psi[[eq_u, eps]] = 1.0;

        sys.gamma0[[eq_u1, u1]] = 1.0;
        sys.gamma1[[eq_u1, u]] = 1.0;
        Ok(sys)
    }

    fn measurement(
        &self, params: &ParameterRegistry, transition: &TransitionSystem, with_shocks: bool,
    ) -> ModelResult<MeasurementSystem> {
        let s = &self.spec;
        let (n_obs, n, k) = (s.n_observables(), s.n_states(), s.n_shocks());
        let x = s.observable("x_t")?;
        let mut z = Array2::zeros((n_obs, n));
        z[[x, s.state("u_t")?]] = 1.0;
        z[[x, s.state("u_t1")?]] = params.get("beta")?;
        let mut d = Array1::zeros(n_obs);
        d[x] = params.get("mu")?;
        let mut q = Array2::zeros((k, k));
        if with_shocks {
            let eps = s.shock("u")?;
            q[[eps, eps]] = params.get("sigma")?.powi(2);
        }
        MeasurementSystem::new(
            s,
            transition,
            z,
            d,
            q,
            Array2::zeros((n_obs, n_obs)),
            Array2::zeros((n_obs, k)),
        )
    }
}

pub struct ForwardLooking {
    spec: ModelSpec,
    params: ParameterRegistry,
}

impl ForwardLooking {
    /// `a` is free on `(0, 2)`, so half of its prior mass is indeterminate.
    pub fn new(a: f64, rho: f64) -> Self {
        let spec = ModelSpec::new(
            &["x", "z", "Ex"],
            &["eps"],
            &["eta"],
            &["x_obs"],
            &["euler", "shock", "expectation"],
        )
        .expect("forward spec");
        let params = ParameterRegistry::new()
            .with(
                Parameter::free("a", a, Prior::uniform(0.0, 2.0).expect("prior"))
                    .with_transform(Transform::Bounded { lo: 0.0, hi: 2.0 }),
            )
            .and_then(|r| r.with(Parameter::fixed("rho", rho)))
            .and_then(|r| r.with(Parameter::fixed("sigma", 1.0)))
            .and_then(|r| r.with(Parameter::fixed("me", 0.1)))
            .expect("forward parameters");
        Self { spec, params }
    }
}

impl DsgeModel for ForwardLooking {
    fn spec(&self) -> &ModelSpec {
        &self.spec
    }

    fn parameters(&self) -> &ParameterRegistry {
        &self.params
    }

    fn equilibrium_conditions(&self, params: &ParameterRegistry) -> ModelResult<StructuralSystem> {
        let s = &self.spec;
        let mut sys = StructuralSystem::zeros(s.n_states(), s.n_shocks(), s.n_expectational_errors());
        let (x, z, ex) = (s.state("x")?, s.state("z")?, s.state("Ex")?);
        let (euler, shock, expectation) =
            (s.equation("euler")?, s.equation("shock")?, s.equation("expectation")?);

        sys.gamma0[[euler, x]] = 1.0;
        sys.gamma0[[euler, z]] = -1.0;
        sys.gamma0[[euler, ex]] = -params.get("a")?;

        sys.gamma0[[shock, z]] = 1.0;
        sys.gamma1[[shock, z]] = params.get("rho")?;
        sys.psi[[shock, s.shock("eps")?]] = 1.0;

        sys.gamma0[[expectation, x]] = 1.0;
        sys.gamma1[[expectation, ex]] = 1.0;
        sys.pi[[expectation, s.expectational_error("eta")?]] = 1.0;
        Ok(sys)
    }

    fn measurement(
        &self, params: &ParameterRegistry, transition: &TransitionSystem, with_shocks: bool,
    ) -> ModelResult<MeasurementSystem> {
        let s = &self.spec;
        let (n_obs, n, k) = (s.n_observables(), s.n_states(), s.n_shocks());
        let obs = s.observable("x_obs")?;
        let mut z = Array2::zeros((n_obs, n));
        z[[obs, s.state("x")?]] = 1.0;
        let mut q = Array2::zeros((k, k));
        if with_shocks {
            let eps = s.shock("eps")?;
            q[[eps, eps]] = params.get("sigma")?.powi(2);
        }
        let mut e = Array2::zeros((n_obs, n_obs));
        e[[obs, obs]] = params.get("me")?.powi(2);
        MeasurementSystem::new(s, transition, z, Array1::zeros(n_obs), q, e, Array2::zeros((n_obs, k)))
    }
}

/// Simulate `periods` observations at the model's current parameters.
pub fn simulate_table<M: DsgeModel>(model: &M, periods: usize, seed: u64) -> ObservationTable {
    let params = model.parameters();
    let structural = model.equilibrium_conditions(params).expect("structural system");
    let transition = solve(&structural, &SolverOptions::default()).expect("solution");
    let measurement = model.measurement(params, &transition, true).expect("measurement");
    let mut rng = StdRng::seed_from_u64(seed);
    let sim = simulate(&transition, &measurement, periods, 200, &mut rng).expect("simulation");
    let names = model.spec().observables.names().map(str::to_string).collect();
    ObservationTable::new(names, sim.observations).expect("table")
}
