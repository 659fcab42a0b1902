//! Curvature at the posterior mode.
//!
//! - [`hessian_at_mode`]: central second differences of the negative log
//!   posterior in unconstrained coordinates.
//! - [`proposal_covariance`]: `H⁻¹` through Cholesky. A failed
//!   factorization means a saddle point or a non-identified direction, and
//!   sampling must not proceed.
//! - [`standard_errors`]: `sqrt(diag(H⁺))` from the symmetric
//!   eigendecomposition, with eigenvalues at or below `EIGEN_EPS` dropped,
//!   then mapped to model space by the delta method.
use crate::{
    estimation::errors::{EstimationError, EstimationResult},
    model::parameters::ParameterRegistry,
    optimization::{
        errors::OptResult,
        maximizer::{Hessian, Theta, value_hessian},
        numerical_stability::EIGEN_EPS,
    },
    utils::{min_eigenvalue, symmetrize, to_array2, to_dmatrix},
};
use nalgebra::Cholesky;
use ndarray::{Array1, Array2};

/// Hessian of `neg_log_posterior` at `theta_hat`.
pub fn hessian_at_mode<F>(neg_log_posterior: &F, theta_hat: &Theta, rel_step: f64) -> EstimationResult<Hessian>
where
    F: Fn(&Theta) -> OptResult<f64>,
{
    Ok(value_hessian(neg_log_posterior, theta_hat, rel_step)?)
}

/// `H⁻¹` for a positive-definite `H`.
///
/// # Errors
/// `HessianNotPositiveDefinite` with the smallest eigenvalue of `H`.
pub fn proposal_covariance(hessian: &Array2<f64>) -> EstimationResult<Array2<f64>> {
    let mut h = to_dmatrix(&hessian.view());
    symmetrize(&mut h);
    let chol = Cholesky::new(h).ok_or_else(|| EstimationError::HessianNotPositiveDefinite {
        min_eigenvalue: min_eigenvalue(hessian),
    })?;
    let mut inv = chol.inverse();
    symmetrize(&mut inv);
    Ok(to_array2(&inv))
}

/// Standard errors in the coordinates of `hessian`.
///
/// `Var(θᵢ) = Σ_{k: λₖ > EIGEN_EPS} Q[i,k]² / λₖ` with `H = Q Λ Qᵀ`.
pub fn standard_errors(hessian: &Array2<f64>) -> Array1<f64> {
    let n = hessian.nrows();
    let mut h = to_dmatrix(&hessian.view());
    symmetrize(&mut h);
    let eigen = h.symmetric_eigen();
    let q = eigen.eigenvectors;
    Array1::from_shape_fn(n, |i| {
        eigen
            .eigenvalues
            .iter()
            .enumerate()
            .filter(|(_, lambda)| **lambda > EIGEN_EPS)
            .map(|(k, &lambda)| q[(i, k)] * q[(i, k)] / lambda)
            .sum::<f64>()
            .sqrt()
    })
}

/// Map unconstrained standard errors to model space:
/// `se(xᵢ) = |dxᵢ/duᵢ| · se(uᵢ)` at `theta_hat`.
pub fn to_model_space(
    registry: &ParameterRegistry, theta_hat: &Theta, se_unconstrained: &Array1<f64>,
) -> Array1<f64> {
    registry
        .free_params()
        .zip(theta_hat.iter().zip(se_unconstrained.iter()))
        .map(|(p, (&u, &se))| p.transform.log_jacobian(u).exp() * se)
        .collect()
}
