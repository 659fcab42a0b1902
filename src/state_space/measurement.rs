//! Measurement system `yₜ = Z sₜ + D + vₜ` and the joint covariance of
//! `[R εₜ; vₜ]` used by the filter.
//!
//! The measurement noise is `vₜ = uₜ + M εₜ` with `Var(uₜ) = E`, so
//!
//! ```text
//! combined = [ R Q Rᵀ   R V         ]     V = Q Mᵀ
//!            [ Vᵀ Rᵀ    E + M Q Mᵀ  ]
//! ```
//!
//! [`MeasurementSystem::new`] is the only constructor. It checks every
//! matrix against the model specification before computing `combined`, so
//! a model builder that returns a wrong shape fails with `ShapeMismatch`.
use crate::{
    model::{
        errors::{ModelError, ModelResult},
        spec::ModelSpec,
    },
    solver::types::TransitionSystem,
    utils::{first_non_finite, max_asymmetry, min_eigenvalue},
};
use ndarray::{Array1, Array2, s};
use serde::{Deserialize, Serialize};

/// Relative tolerance for the symmetry and PSD checks on `Q` and `E`.
const COV_TOL: f64 = 1e-10;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MeasurementSystem {
    pub z: Array2<f64>,
    pub d: Array1<f64>,
    pub q: Array2<f64>,
    pub e: Array2<f64>,
    pub m: Array2<f64>,
    pub combined: Array2<f64>,
}

impl MeasurementSystem {
    /// Validate the pieces and build the combined covariance.
    ///
    /// Shapes: `Z` is `n_obs × n_states`, `D` has `n_obs` entries, `Q` is
    /// `n_shocks × n_shocks`, `E` is `n_obs × n_obs` and `M` is
    /// `n_obs × n_shocks`. `Q` and `E` must be symmetric PSD.
    ///
    /// # Errors
    /// `ShapeMismatch`, `NonFiniteEntry`, `NotSymmetric` or
    /// `NotPositiveSemiDefinite`.
    pub fn new(
        spec: &ModelSpec, transition: &TransitionSystem, z: Array2<f64>, d: Array1<f64>,
        q: Array2<f64>, e: Array2<f64>, m: Array2<f64>,
    ) -> ModelResult<Self> {
        let (n_obs, n, k) = (spec.n_observables(), spec.n_states(), spec.n_shocks());
        expect_shape("T", transition.t.dim(), (n, n))?;
        expect_shape("R", transition.r.dim(), (n, k))?;
        expect_shape("Z", z.dim(), (n_obs, n))?;
        expect_shape("D", (d.len(), 1), (n_obs, 1))?;
        expect_shape("Q", q.dim(), (k, k))?;
        expect_shape("E", e.dim(), (n_obs, n_obs))?;
        expect_shape("M", m.dim(), (n_obs, k))?;
        for (name, a) in [("Z", &z), ("Q", &q), ("E", &e), ("M", &m)] {
            if let Some((row, col, value)) = first_non_finite(a) {
                return Err(ModelError::NonFiniteEntry { matrix: name, row, col, value });
            }
        }
        if let Some(row) = d.iter().position(|v| !v.is_finite()) {
            return Err(ModelError::NonFiniteEntry { matrix: "D", row, col: 0, value: d[row] });
        }
        check_covariance("Q", &q)?;
        check_covariance("E", &e)?;

        let r = &transition.r;
        let v = q.dot(&m.t());
        let mut combined = Array2::zeros((n + n_obs, n + n_obs));
        combined.slice_mut(s![..n, ..n]).assign(&r.dot(&q).dot(&r.t()));
        let rv = r.dot(&v);
        combined.slice_mut(s![..n, n..]).assign(&rv);
        combined.slice_mut(s![n.., ..n]).assign(&rv.t());
        combined.slice_mut(s![n.., n..]).assign(&(&e + &m.dot(&q).dot(&m.t())));
        Ok(Self { z, d, q, e, m, combined })
    }

    pub fn n_observables(&self) -> usize {
        self.z.nrows()
    }

    pub fn n_states(&self) -> usize {
        self.z.ncols()
    }

    /// `R Q Rᵀ`.
    pub fn state_covariance(&self) -> Array2<f64> {
        let n = self.n_states();
        self.combined.slice(s![..n, ..n]).to_owned()
    }

    /// `E + M Q Mᵀ`.
    pub fn noise_covariance(&self) -> Array2<f64> {
        let n = self.n_states();
        self.combined.slice(s![n.., n..]).to_owned()
    }

    /// `R V`, the covariance of state innovations with measurement noise.
    pub fn cross_covariance(&self) -> Array2<f64> {
        let n = self.n_states();
        self.combined.slice(s![..n, n..]).to_owned()
    }
}

fn expect_shape(
    matrix: &'static str, found: (usize, usize), expected: (usize, usize),
) -> ModelResult<()> {
    if found != expected {
        return Err(ModelError::ShapeMismatch { matrix, expected, found });
    }
    Ok(())
}

fn check_covariance(matrix: &'static str, a: &Array2<f64>) -> ModelResult<()> {
    let scale = a.iter().fold(1.0f64, |acc, v| acc.max(v.abs()));
    let max_asym = max_asymmetry(a);
    if max_asym > COV_TOL * scale {
        return Err(ModelError::NotSymmetric { matrix, max_asym });
    }
    let min_eigenvalue = min_eigenvalue(a);
    if min_eigenvalue < -COV_TOL * scale {
        return Err(ModelError::NotPositiveSemiDefinite { matrix, min_eigenvalue });
    }
    Ok(())
}
