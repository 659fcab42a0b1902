//! Initial state mean and covariance.
//!
//! The stationary covariance solves `P = T P Tᵀ + R Q Rᵀ` by doubling:
//! `Pₖ₊₁ = Pₖ + Aₖ Pₖ Aₖᵀ`, `Aₖ₊₁ = Aₖ²`, which covers `2ᵏ` lags per step.
use crate::{
    filter::{
        errors::{FilterError, FilterResult},
        options::FilterInit,
    },
    optimization::numerical_stability::STATIONARITY_TOL,
    utils::{symmetrize, to_array2, to_dmatrix},
};
use nalgebra::{DMatrix, DVector, linalg::Schur};
use ndarray::Array2;
use serde::{Deserialize, Serialize};

const LYAPUNOV_MAX_DOUBLINGS: usize = 100;
const LYAPUNOV_TOL: f64 = 1e-12;
const SCHUR_MAX_ITER: usize = 10_000;

/// Which initialization the filter actually used.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum InitKind {
    Stationary,
    Diffuse,
    Fixed,
}

#[derive(Debug, Clone, PartialEq)]
pub(crate) struct InitialState {
    pub mean: DVector<f64>,
    pub cov: DMatrix<f64>,
    pub kind: InitKind,
}

/// Largest `|λ|` over the eigenvalues of `t`; `∞` if the Schur iteration
/// fails.
pub fn spectral_radius(t: &Array2<f64>) -> f64 {
    radius(&to_dmatrix(&t.view()))
}

/// Unconditional covariance of `sₜ = T sₜ₋₁ + wₜ`, `Var(wₜ) = state_cov`.
///
/// # Errors
/// `NonStationary` when the spectral radius of `T` is not below one;
/// `LyapunovNotConverged` if doubling does not settle.
pub fn stationary_covariance(t: &Array2<f64>, state_cov: &Array2<f64>) -> FilterResult<Array2<f64>> {
    let t = to_dmatrix(&t.view());
    let rho = radius(&t);
    if rho >= 1.0 - STATIONARITY_TOL {
        return Err(FilterError::NonStationary { spectral_radius: rho });
    }
    lyapunov(&t, &to_dmatrix(&state_cov.view())).map(|p| to_array2(&p))
}

pub(crate) fn initialize(
    t: &DMatrix<f64>, c: &DVector<f64>, state_cov: &DMatrix<f64>, init: &FilterInit,
) -> FilterResult<InitialState> {
    let n = t.nrows();
    match init {
        FilterInit::Diffuse { scale } => Ok(diffuse(n, *scale)),
        FilterInit::Fixed { mean, cov } => {
            if mean.len() != n {
                return Err(FilterError::DimensionMismatch {
                    what: "fixed initial mean",
                    expected: (n, 1),
                    found: (mean.len(), 1),
                });
            }
            Ok(InitialState {
                mean: DVector::from_iterator(n, mean.iter().copied()),
                cov: to_dmatrix(&cov.view()),
                kind: InitKind::Fixed,
            })
        }
        FilterInit::Stationary { diffuse_scale } => {
            let rho = radius(t);
            if rho >= 1.0 - STATIONARITY_TOL {
                tracing::debug!(spectral_radius = rho, "non-stationary transition, diffuse initialization");
                return Ok(diffuse(n, *diffuse_scale));
            }
            let mean = if c.iter().all(|v| *v == 0.0) {
                DVector::zeros(n)
            } else {
                (DMatrix::identity(n, n) - t).lu().solve(c).ok_or(FilterError::SingularMean)?
            };
            let cov = lyapunov(t, state_cov)?;
            Ok(InitialState { mean, cov, kind: InitKind::Stationary })
        }
    }
}

fn diffuse(n: usize, scale: f64) -> InitialState {
    InitialState {
        mean: DVector::zeros(n),
        cov: DMatrix::identity(n, n) * scale,
        kind: InitKind::Diffuse,
    }
}

fn radius(t: &DMatrix<f64>) -> f64 {
    if t.is_empty() {
        return 0.0;
    }
    if t.iter().any(|v| !v.is_finite()) {
        return f64::INFINITY;
    }
    match Schur::try_new(t.clone(), f64::EPSILON, SCHUR_MAX_ITER) {
        Some(schur) => schur.complex_eigenvalues().iter().map(|l| l.norm()).fold(0.0, f64::max),
        None => f64::INFINITY,
    }
}

fn lyapunov(t: &DMatrix<f64>, q: &DMatrix<f64>) -> FilterResult<DMatrix<f64>> {
    let mut p = q.clone();
    let mut a = t.clone();
    for _ in 0..LYAPUNOV_MAX_DOUBLINGS {
        let step = &a * &p * a.transpose();
        p += &step;
        a = &a * &a;
        if step.amax() <= LYAPUNOV_TOL * p.amax().max(1.0) {
            symmetrize(&mut p);
            return Ok(p);
        }
    }
    Err(FilterError::LyapunovNotConverged { iterations: LYAPUNOV_MAX_DOUBLINGS })
}
