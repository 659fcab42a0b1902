//! High-level entry point for maximizing a [`LogObjective`].
//!
//! This selects an L-BFGS solver with either Hager–Zhang or More–Thuente line
//! search, wraps the objective in an `ArgMinAdapter` (which *minimizes*
//! `-ℓ(θ)`), and delegates the run to `run_lbfgs`.
use crate::optimization::{
    errors::OptResult,
    maximizer::{
        OptimOutcome, Theta,
        adapter::ArgMinAdapter,
        builders::{build_optimizer_hager_zhang, build_optimizer_more_thuente},
        run::run_lbfgs,
        traits::{LineSearcher, LogObjective, OptimizerOptions},
    },
};

/// Maximize `ℓ(θ)` using L-BFGS with the chosen line search.
///
/// # Behavior
/// - Validates the initial guess via `f.check(theta0, data)`.
/// - Builds an L-BFGS solver with either **Hager–Zhang** or **More–Thuente**
///   line search based on `opts.line_searcher`.
/// - Calls `run_lbfgs`, which configures the executor (initial params,
///   max iters, optional observers) and returns an `OptimOutcome`.
///
/// # Errors
/// - Propagates any error from `f.check`.
/// - Propagates builder errors from `build_optimizer_*`.
/// - Propagates runtime errors from `run_lbfgs`, including fatal objective
///   errors raised mid-run (they keep their original `OptError` variant).
///
/// # Example
/// ```no_run
/// use ndarray::array;
/// use rust_dsge::optimization::errors::OptResult;
/// use rust_dsge::optimization::maximizer::{LogObjective, OptimizerOptions, Theta, maximize};
///
/// struct Bowl;
/// impl LogObjective for Bowl {
///     type Data = ();
///     fn value(&self, theta: &Theta, _: &()) -> OptResult<f64> {
///         Ok(-theta.dot(theta))
///     }
///     fn check(&self, _: &Theta, _: &()) -> OptResult<()> {
///         Ok(())
///     }
/// }
///
/// let out = maximize(&Bowl, array![0.1, -0.2, 0.3], &(), &OptimizerOptions::default())?;
/// println!("θ̂ = {:?}", out.theta_hat);
/// # Ok::<(), rust_dsge::optimization::errors::OptError>(())
/// ```
pub fn maximize<F: LogObjective>(
    f: &F, theta0: Theta, data: &F::Data, opts: &OptimizerOptions,
) -> OptResult<OptimOutcome> {
    f.check(&theta0, data)?;
    let problem = ArgMinAdapter::new(f, data);
    match opts.line_searcher {
        LineSearcher::MoreThuente => {
            let solver = build_optimizer_more_thuente(opts)?;
            run_lbfgs(theta0, opts, problem, solver)
        }
        LineSearcher::HagerZhang => {
            let solver = build_optimizer_hager_zhang(opts)?;
            run_lbfgs(theta0, opts, problem, solver)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::optimization::{
        errors::OptError,
        maximizer::{Cost, traits::Tolerances},
    };
    use approx::assert_abs_diff_eq;
    use ndarray::array;

    struct ShiftedBowl;

    impl LogObjective for ShiftedBowl {
        type Data = Theta;

        fn value(&self, theta: &Theta, center: &Theta) -> OptResult<Cost> {
            let d = theta - center;
            Ok(-d.dot(&d))
        }

        fn check(&self, theta: &Theta, center: &Theta) -> OptResult<()> {
            if theta.len() != center.len() {
                return Err(OptError::GradientDimMismatch {
                    expected: center.len(),
                    found: theta.len(),
                });
            }
            Ok(())
        }
    }

    #[test]
    // Purpose
    // -------
    // Both line searches locate the maximizer of a concave quadratic.
    //
    // Given
    // -----
    // - ℓ(θ) = −‖θ − c‖² with c = (1, −2), θ₀ = 0.
    //
    // Expect
    // ------
    // - θ̂ ≈ c, ℓ(θ̂) ≈ 0, converged.
    fn maximize_finds_center_with_both_line_searches() {
        for ls in [LineSearcher::MoreThuente, LineSearcher::HagerZhang] {
            // Arrange
            let center = array![1.0, -2.0];
            let tols = Tolerances::new(Some(1e-6), Some(1e-14), Some(200)).expect("tolerances");
            let opts = OptimizerOptions::new(tols, ls, None).expect("options");

            // Act
            let out = maximize(&ShiftedBowl, array![0.0, 0.0], &center, &opts).expect("maximize");

            // Assert
            assert!(out.converged, "{ls:?} should converge: {}", out.status);
            assert_abs_diff_eq!(out.theta_hat[0], 1.0, epsilon = 1e-5);
            assert_abs_diff_eq!(out.theta_hat[1], -2.0, epsilon = 1e-5);
            assert_abs_diff_eq!(out.value, 0.0, epsilon = 1e-8);
        }
    }

    #[test]
    // Purpose
    // -------
    // `check` runs before any solver work.
    //
    // Given
    // -----
    // - θ₀ of length 1 against a length-2 center.
    //
    // Expect
    // ------
    // - The `check` error is returned unchanged.
    fn maximize_runs_check_first() {
        let center = array![1.0, -2.0];
        let result = maximize(&ShiftedBowl, array![0.0], &center, &OptimizerOptions::default());
        assert!(matches!(result, Err(OptError::GradientDimMismatch { expected: 2, found: 1 })));
    }
}
