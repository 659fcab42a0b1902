//! Checks on optimizer settings and on what the objective and the solver
//! hand back.
use crate::optimization::{
    errors::{OptError, OptResult},
    maximizer::{Grad, Theta, types::Hessian},
};

/// `None` disables the stopping rule; `Some` must be finite and positive.
pub fn verify_tolerance(name: &'static str, tol: Option<f64>) -> OptResult<()> {
    match tol {
        Some(value) if !(value.is_finite() && value > 0.0) => {
            Err(OptError::InvalidTolerance { name, value })
        }
        _ => Ok(()),
    }
}

/// Length `dim` and finite entries.
pub fn validate_grad(grad: &Grad, dim: usize) -> OptResult<()> {
    if grad.len() != dim {
        return Err(OptError::GradientDimMismatch { expected: dim, found: grad.len() });
    }
    match grad.iter().position(|g| !g.is_finite()) {
        Some(index) => Err(OptError::InvalidGradient { index, value: grad[index] }),
        None => Ok(()),
    }
}

/// Unwrap the solver's best parameter vector, rejecting non-finite entries.
pub fn validate_theta_hat(theta_hat: Option<Theta>) -> OptResult<Theta> {
    let theta = theta_hat.ok_or(OptError::MissingThetaHat)?;
    if let Some(index) = theta.iter().position(|x| !x.is_finite()) {
        return Err(OptError::InvalidThetaHat { index, value: theta[index] });
    }
    Ok(theta)
}

pub fn validate_value(value: f64) -> OptResult<()> {
    if !value.is_finite() {
        return Err(OptError::NonFiniteCost { value });
    }
    Ok(())
}

/// `dim × dim` with finite entries; the first bad entry is reported in
/// row-major order.
pub fn validate_hessian(hessian: &Hessian, dim: usize) -> OptResult<()> {
    if hessian.dim() != (dim, dim) {
        return Err(OptError::HessianDimMismatch { expected: dim, found: hessian.dim() });
    }
    match hessian.indexed_iter().find(|(_, v)| !v.is_finite()) {
        Some(((row, col), &value)) => Err(OptError::InvalidHessian { row, col, value }),
        None => Ok(()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::array;

    #[test]
    // Purpose
    // -------
    // Gradient validation reports the first non-finite element and
    // dimension mismatches.
    //
    // Given
    // -----
    // - (1, NaN) against dim 2, and (1) against dim 2.
    //
    // Expect
    // ------
    // - `InvalidGradient { index: 1, .. }` and `GradientDimMismatch`.
    fn validate_grad_reports_first_bad_entry_and_shape() {
        assert!(matches!(
            validate_grad(&array![1.0, f64::NAN], 2),
            Err(OptError::InvalidGradient { index: 1, .. })
        ));
        assert_eq!(
            validate_grad(&array![1.0], 2),
            Err(OptError::GradientDimMismatch { expected: 2, found: 1 })
        );
    }

    #[test]
    // Purpose
    // -------
    // A missing or non-finite θ̂ is rejected.
    //
    // Given
    // -----
    // - `None` and `Some([inf])`.
    //
    // Expect
    // ------
    // - `MissingThetaHat` and `InvalidThetaHat`.
    fn validate_theta_hat_rejects_missing_and_non_finite() {
        assert_eq!(validate_theta_hat(None), Err(OptError::MissingThetaHat));
        assert!(matches!(
            validate_theta_hat(Some(array![f64::INFINITY])),
            Err(OptError::InvalidThetaHat { index: 0, .. })
        ));
    }

    #[test]
    // Purpose
    // -------
    // Tolerances are optional but must be usable when given.
    //
    // Given
    // -----
    // - None, Some(1e-6), Some(0), Some(NaN).
    //
    // Expect
    // ------
    // - The first two pass; the others name the offending tolerance.
    fn tolerance_check_accepts_none_and_positive() {
        assert!(verify_tolerance("tol_grad", None).is_ok());
        assert!(verify_tolerance("tol_grad", Some(1e-6)).is_ok());
        assert!(matches!(
            verify_tolerance("tol_cost", Some(0.0)),
            Err(OptError::InvalidTolerance { name: "tol_cost", .. })
        ));
        assert!(verify_tolerance("tol_grad", Some(f64::NAN)).is_err());
    }
}
