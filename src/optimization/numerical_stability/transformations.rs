//! Numerical stability utilities.
//!
//! Provides safe implementations of the scalar maps used to move parameters
//! between an unconstrained optimizer/sampler space and bounded model space.
//! The functions here follow guarded strategies similar to those in major
//! ML libraries (e.g. PyTorch, TensorFlow), using explicit cutoffs
//! (`x > 20.0`) to keep `f64` arithmetic in a well-conditioned regime.
//!
//! # Provided items
//! - [`LOGIT_EPS`]: clamp distance from 0 and 1 used by [`safe_logit`].
//! - [`EIGEN_EPS`]: eigenvalue floor shared by Hessian-based routines.
//! - [`STATIONARITY_TOL`]: spectral-radius slack below one that still counts
//!   as mean-reverting.
//! - [`safe_softplus(x)`]: stable version of `ln(1 + exp(x))`,
//!   mapping ℝ → (0, ∞) without overflow.
//! - [`safe_softplus_inv(x)`]: inverse of softplus, mapping
//!   (0, ∞) → ℝ without catastrophic cancellation.
//! - [`safe_logistic(x)`]: stable `1 / (1 + exp(-x))`, mapping ℝ → (0, 1).
//! - [`safe_logit(p)`]: inverse of the logistic map with clamping.
//! - [`log_logistic(x)`]: `ln σ(x)` computed as `-softplus(-x)`.
//!
//! # Rationale
//! These transforms are building blocks whenever parameters must be kept
//! strictly positive or inside an interval. Log-Jacobians of the transforms
//! are expressed through [`log_logistic`] so that tails never produce
//! `ln(0)`.

/// Distance from 0 and 1 at which [`safe_logit`] clamps its argument.
pub const LOGIT_EPS: f64 = 1e-12;

/// Eigenvalues at or below this magnitude are treated as numerically zero.
pub const EIGEN_EPS: f64 = 1e-10;

/// Spectral radii within this distance of one are treated as unit roots.
pub const STATIONARITY_TOL: f64 = 1e-9;

/// Numerically stable softplus: `softplus(x) = ln(1 + exp(x))`.
///
/// Computes softplus without overflow for large positive `x` and
/// with good precision for large negative `x`. This implementation
/// uses a simple piecewise guard:
///
/// - For sufficiently large `x`, `softplus(x) ≈ x + ln1p(exp(-x)) ≈ x`.
/// - Otherwise, it falls back to `ln1p(exp(x))`.
///
/// # Parameters
/// - `x`: real input
///
/// # Returns
/// - `softplus(x)` as `f64`.
pub fn safe_softplus(x: f64) -> f64 {
    if x > 20.0 { x } else { x.exp().ln_1p() }
}

/// Stable inverse of softplus on `(0, ∞)`: solves for `t` in
/// `softplus(t) = x`, returning `t = ln(exp(x) - 1)`.
///
/// - For sufficiently large `x`, `ln(exp(x) - 1) ≈ x`.
/// - Otherwise, it uses `ln(expm1(x))`.
///
/// # Parameters
/// - `x`: a positive real (the softplus output), must be finite and `> 0`.
///
/// # Returns
/// - `t` such that `softplus(t) = x`.
pub fn safe_softplus_inv(x: f64) -> f64 {
    if x > 20.0 { x } else { x.exp_m1().ln() }
}

/// Numerically stable logistic map `σ(x) = 1 / (1 + exp(-x))`.
///
/// Evaluates `exp` only on non-positive arguments, so neither branch can
/// overflow.
pub fn safe_logistic(x: f64) -> f64 {
    if x >= 0.0 {
        1.0 / (1.0 + (-x).exp())
    } else {
        let e = x.exp();
        e / (1.0 + e)
    }
}

/// Inverse of [`safe_logistic`]: `logit(p) = ln(p / (1 - p))`.
///
/// `p` is clamped to `[LOGIT_EPS, 1 - LOGIT_EPS]` so the result is always
/// finite. Callers that need to reject boundary values must check support
/// before calling.
pub fn safe_logit(p: f64) -> f64 {
    let p = p.clamp(LOGIT_EPS, 1.0 - LOGIT_EPS);
    p.ln() - (-p).ln_1p()
}

/// `ln σ(x)` without underflow in either tail.
pub fn log_logistic(x: f64) -> f64 {
    -safe_softplus(-x)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    // -------------------------------------------------------------------------
    // Scope
    // -----
    // These tests cover:
    // - Agreement of the guarded transforms with naïve formulas on a safe grid.
    // - Inverse pairs (softplus/softplus_inv, logistic/logit).
    // - Tail behavior of `log_logistic`.
    // -------------------------------------------------------------------------

    #[test]
    // Purpose
    // -------
    // Check that the guarded softplus pair agrees with the naïve formulas
    // and inverts itself on a moderate grid.
    //
    // Given
    // -----
    // - x ∈ {-10, -1, 0, 0.5, 3, 15}.
    //
    // Expect
    // ------
    // - softplus(x) ≈ ln(1 + eˣ) and softplus_inv(softplus(x)) ≈ x.
    fn softplus_matches_naive_and_inverts() {
        for &x in &[-10.0_f64, -1.0, 0.0, 0.5, 3.0, 15.0] {
            // Arrange
            let naive = (1.0 + x.exp()).ln();

            // Act
            let y = safe_softplus(x);

            // Assert
            assert_abs_diff_eq!(y, naive, epsilon = 1e-12);
            assert_abs_diff_eq!(safe_softplus_inv(y), x, epsilon = 1e-8);
        }
    }

    #[test]
    // Purpose
    // -------
    // Verify that logistic and logit are inverse maps away from the clamp.
    //
    // Given
    // -----
    // - x ∈ {-8, -0.3, 0, 2, 9}.
    //
    // Expect
    // ------
    // - logit(σ(x)) ≈ x and σ(x) ∈ (0, 1).
    fn logistic_and_logit_are_inverse() {
        for &x in &[-8.0_f64, -0.3, 0.0, 2.0, 9.0] {
            let p = safe_logistic(x);
            assert!(p > 0.0 && p < 1.0);
            assert_abs_diff_eq!(safe_logit(p), x, epsilon = 1e-8);
        }
    }

    #[test]
    // Purpose
    // -------
    // Ensure `log_logistic` stays finite deep in the negative tail where the
    // naïve `σ(x).ln()` would underflow to `-∞`.
    //
    // Given
    // -----
    // - x = -800.
    //
    // Expect
    // ------
    // - log_logistic(x) ≈ x (since ln σ(x) ≈ x for x → -∞).
    fn log_logistic_is_finite_in_tails() {
        let v = log_logistic(-800.0);
        assert!(v.is_finite());
        assert_abs_diff_eq!(v, -800.0, epsilon = 1e-9);
        assert_abs_diff_eq!(log_logistic(800.0), 0.0, epsilon = 1e-12);
    }
}
