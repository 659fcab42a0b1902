//! maximizer::finite_diff: finite-difference gradient and Hessian helpers.
//!
//! Purpose
//! -------
//! Provide finite-difference derivatives of a scalar objective around a
//! parameter vector, together with validation and symmetry cleanup, so
//! that the optimizer and the curvature step at the posterior mode can
//! request derivatives without depending directly on the `finitediff` API.
//!
//! Key behaviors
//! -------------
//! - Compute forward-difference gradients with error capture and
//!   post-hoc validation via [`run_fd_diff`].
//! - Construct a Hessian from objective *values* alone with a central
//!   second-difference stencil via [`value_hessian`]. Nesting two
//!   first-difference passes at `√ε` steps would amplify round-off by
//!   `ε / h²`, so curvature uses its own, larger step.
//! - Enforce symmetry of Hessian matrices in-place using
//!   [`symmetrize_hess`].
//!
//! Invariants & assumptions
//! ------------------------
//! - Parameter vectors, gradients, and Hessians are all represented as
//!   `ndarray` containers over `f64` (`Theta`, `Grad`, `Hessian`).
//! - Any error raised by the objective during differencing is treated as a
//!   hard failure for the derivative being computed.
//! - Returned gradients and Hessians satisfy [`validate_grad`] and
//!   [`validate_hessian`].
//!
//! Conventions
//! -----------
//! - Differences are taken with respect to the unconstrained parameter
//!   vector `Theta`; any reparameterization is handled by higher layers.
//! - The Hessian step for coordinate `i` is `rel_step · max(|θᵢ|, 1)`.
//!
//! Testing notes
//! -------------
//! - Unit tests cover successful and failing gradient paths, exact
//!   recovery of a quadratic's Hessian, error propagation from the
//!   objective, and symmetrization.
use crate::optimization::{
    errors::{OptError, OptResult},
    maximizer::{
        Grad, Theta,
        types::Hessian,
        validation::{validate_grad, validate_hessian},
    },
};
use argmin::core::Error;
use finitediff::FiniteDiff;
use std::cell::RefCell;

/// Default relative step for [`value_hessian`] (≈ ε^{1/4}).
pub const DEFAULT_HESSIAN_STEP: f64 = 1e-4;

/// run_fd_diff: forward-difference gradient with error capture and validation.
///
/// Purpose
/// -------
/// Compute a forward-difference approximation to the gradient of a scalar
/// objective at `theta`, while capturing any error raised inside the
/// evaluation closure.
///
/// Parameters
/// ----------
/// - `theta`: point at which the gradient is approximated.
/// - `func`: objective closure; it must route evaluation errors into
///   `closure_err` and return `NaN` in that case.
/// - `closure_err`: shared cell, cleared on entry and inspected after the
///   finite-difference pass.
///
/// Errors
/// ------
/// - The captured error, converted via `From<Error> for OptError`.
/// - `OptError::GradientDimMismatch` / `OptError::InvalidGradient` from
///   [`validate_grad`].
pub fn run_fd_diff<G: Fn(&Theta) -> f64>(
    theta: &Theta, func: &G, closure_err: &RefCell<Option<Error>>,
) -> OptResult<Grad> {
    closure_err.replace(None);
    let fd_grad = theta.forward_diff(func);
    let dim = theta.len();
    if let Some(err) = closure_err.take() {
        return Err(err.into());
    }
    validate_grad(&fd_grad, dim)?;
    Ok(fd_grad)
}

/// value_hessian: central second-difference Hessian from objective values.
///
/// Purpose
/// -------
/// Approximate `∇²f(θ)` using only evaluations of `f`:
///
/// - diagonal: `(f(θ+hᵢeᵢ) − 2f(θ) + f(θ−hᵢeᵢ)) / hᵢ²`
/// - off-diagonal: `(f(++) − f(+−) − f(−+) + f(−−)) / (4 hᵢ hⱼ)`
///
/// Parameters
/// ----------
/// - `f`: fallible scalar objective.
/// - `theta`: evaluation point; its length fixes the Hessian dimension.
/// - `rel_step`: relative step; must be finite and strictly positive.
///
/// Returns
/// -------
/// A validated, symmetrized `dim × dim` Hessian.
///
/// Errors
/// ------
/// - Any error returned by `f` at a stencil point.
/// - `OptError::InvalidOption` for a non-positive or non-finite step.
/// - `OptError::InvalidHessian` if any entry is non-finite.
///
/// Notes
/// -----
/// - Costs `1 + 2n + 2n(n−1)` evaluations of `f`.
pub fn value_hessian<F>(f: &F, theta: &Theta, rel_step: f64) -> OptResult<Hessian>
where
    F: Fn(&Theta) -> OptResult<f64>,
{
    if !rel_step.is_finite() || rel_step <= 0.0 {
        return Err(OptError::InvalidOption {
            name: "hessian step",
            reason: format!("must be finite and positive, got {rel_step}"),
        });
    }
    let dim = theta.len();
    let steps: Vec<f64> = theta.iter().map(|x| rel_step * x.abs().max(1.0)).collect();
    let f0 = f(theta)?;
    let mut hess = Hessian::zeros((dim, dim));
    let mut point = theta.clone();

    for i in 0..dim {
        let hi = steps[i];
        point[i] = theta[i] + hi;
        let f_plus = f(&point)?;
        point[i] = theta[i] - hi;
        let f_minus = f(&point)?;
        point[i] = theta[i];
        hess[[i, i]] = (f_plus - 2.0 * f0 + f_minus) / (hi * hi);

        for j in 0..i {
            let hj = steps[j];
            let mut corner = |si: f64, sj: f64| -> OptResult<f64> {
                point[i] = theta[i] + si * hi;
                point[j] = theta[j] + sj * hj;
                let v = f(&point);
                point[i] = theta[i];
                point[j] = theta[j];
                v
            };
            let fpp = corner(1.0, 1.0)?;
            let fpm = corner(1.0, -1.0)?;
            let fmp = corner(-1.0, 1.0)?;
            let fmm = corner(-1.0, -1.0)?;
            let value = (fpp - fpm - fmp + fmm) / (4.0 * hi * hj);
            hess[[i, j]] = value;
            hess[[j, i]] = value;
        }
    }

    validate_hessian(&hess, dim)?;
    symmetrize_hess(&mut hess);
    Ok(hess)
}

// ---- Helper methods ----

/// Replace each off-diagonal pair with its average; the diagonal is left
/// untouched. Assumes a square matrix.
pub fn symmetrize_hess(hess: &mut Hessian) {
    for i in 0..hess.nrows() {
        for j in 0..i {
            let avg = 0.5 * (hess[[i, j]] + hess[[j, i]]);
            hess[[i, j]] = avg;
            hess[[j, i]] = avg;
        }
    }
}
