//! Rational-expectations solution of `Γ0 sₜ = Γ1 sₜ₋₁ + C + Ψ εₜ + Π ηₜ`.
//!
//! Method
//! ------
//! 1. Pick a shift `μ` with `Γ1 - μΓ0` well conditioned. If no trial shift
//!    works the pencil is singular.
//! 2. Complex Schur form of `M = (Γ1 - μΓ0)⁻¹ Γ0 = Z S Zᴴ`. Each diagonal
//!    entry `s` corresponds to the generalized root `λ = (1 + μs) / s`.
//!    Roots with `|λ| > div` (including `s = 0`, an infinite root) are
//!    reordered to the bottom-right.
//! 3. With `(Γ1 - μΓ0) Z = Q R`, the pair `A = R S`, `B = R (I + μS)`
//!    satisfies `Qᴴ Γ0 Z = A` and `Qᴴ Γ1 Z = B`. This is the generalized
//!    complex Schur (QZ) form of the pencil with the same ordering.
//! 4. Existence and uniqueness follow from SVD rank tests on `Q₂Π`, `Q₂Ψ`
//!    and `Q₁Π`. The solution is then assembled in the Schur basis and
//!    rotated back with `Z`.
//!
//! Classification
//! --------------
//! - more unstable roots than expectational errors, or shocks loading on
//!   unstable directions that `Π` cannot offset: `NoStableSolution`;
//! - expectational errors not pinned down by the unstable block:
//!   `Indeterminacy`.
use crate::solver::{
    errors::{SolveError, SolveResult},
    schur::{C64, CMatrix, complex_schur, reorder},
    types::{Solution, SolverOptions, StructuralSystem, TransitionSystem},
};
use nalgebra::{DVector, Dyn, linalg::LU};
use ndarray::{Array1, Array2};

const SHIFT_CANDIDATES: [(f64, f64); 6] = [
    (0.5197, 0.3411),
    (-0.7213, 0.2089),
    (1.3771, -0.6153),
    (0.1123, -1.4387),
    (-1.9042, -0.8825),
    (2.6183, 1.1971),
];

/// Pivot ratio below which `Γ1 - μΓ0` is treated as singular.
const PENCIL_RCOND: f64 = 1e-13;

const SVD_MAX_ITER: usize = 10_000;

type ShiftedLu = LU<C64, Dyn, Dyn>;

/// Solve for `(T, R, C′)`.
///
/// # Errors
/// - `DimensionMismatch` / `EmptySystem` / `NonFiniteInput` for malformed
///   input.
/// - `SingularPencil`, `NoStableSolution`, `Indeterminacy` or
///   `NumericalFailure` depending on the roots of the pencil.
pub fn solve(system: &StructuralSystem, opts: &SolverOptions) -> SolveResult<TransitionSystem> {
    solve_detailed(system, opts).map(|s| s.transition)
}

/// Like [`solve`], but also returns root diagnostics.
pub fn solve_detailed(system: &StructuralSystem, opts: &SolverOptions) -> SolveResult<Solution> {
    system.check()?;
    let n = system.n_states();
    let n_eta = system.n_eta();
    let g0 = to_complex(&system.gamma0);
    let g1 = to_complex(&system.gamma1);

    // ---- Ordered generalized Schur form ----
    let (mu, shifted) = pick_shift(&g0, &g1)?;
    let m = shifted
        .solve(&g0)
        .ok_or(SolveError::NumericalFailure { stage: "shift-invert solve" })?;
    let (mut z, mut s) = complex_schur(m)?;
    let div = opts.div;
    let one = C64::new(1.0, 0.0);
    let n_unstable = reorder(&mut s, &mut z, |x| (one + mu * x).norm() > div * x.norm());
    let root_moduli: Vec<f64> = (0..n).map(|i| root_modulus(mu, s[(i, i)])).collect();

    let qr = ((&g1 - &g0 * mu) * &z).qr();
    let (q_r, r) = (qr.q(), qr.r());
    let a = &r * &s;
    let b = &r * (CMatrix::identity(n, n) + &s * mu);
    let q = q_r.adjoint();

    let ns = n - n_unstable;
    let q1 = q.rows(0, ns).into_owned();
    let q2 = q.rows(ns, n_unstable).into_owned();
    let pi = to_complex(&system.pi);
    let psi = to_complex(&system.psi);
    let tol = opts.realsmall;

    // ---- Existence ----
    let (ueta, deta, veta) = truncated_svd(&(&q2 * &pi), tol)?;
    let (uz, _, _) = truncated_svd(&(&q2 * &psi), tol)?;
    let offsettable = if uz.ncols() == 0 {
        true
    } else {
        let resid = if ueta.ncols() == 0 { uz.clone() } else { &uz - &ueta * (ueta.adjoint() * &uz) };
        resid.norm() < tol * n as f64
    };
    if n_unstable > n_eta || !offsettable {
        return Err(SolveError::NoStableSolution { n_unstable, n_eta });
    }

    // ---- Uniqueness ----
    let (ueta1, deta1, veta1) = truncated_svd(&(&q1 * &pi), tol)?;
    if veta1.ncols() > 0 {
        let loose =
            if veta.ncols() == 0 { veta1.clone() } else { &veta1 - &veta * (veta.adjoint() * &veta1) };
        let (_, loose_sv, _) = truncated_svd(&loose, tol * n as f64)?;
        if !loose_sv.is_empty() {
            return Err(SolveError::Indeterminacy { n_unstable, n_eta });
        }
    }

    // ---- Assemble in the Schur basis ----
    let mut tmat = CMatrix::zeros(ns, n);
    tmat.view_mut((0, 0), (ns, ns)).fill_with_identity();
    if ns > 0 && n_unstable > 0 && !deta.is_empty() && !deta1.is_empty() {
        let deta_inv = CMatrix::from_diagonal(&DVector::from_iterator(
            deta.len(),
            deta.iter().map(|d| C64::new(1.0 / d, 0.0)),
        ));
        let deta1_diag = CMatrix::from_diagonal(&DVector::from_iterator(
            deta1.len(),
            deta1.iter().map(|d| C64::new(*d, 0.0)),
        ));
        let x = &ueta * deta_inv * veta.adjoint() * &veta1 * deta1_diag * ueta1.adjoint();
        tmat.view_mut((0, ns), (ns, n_unstable)).copy_from(&(-x.adjoint()));
    }

    let mut big_g0 = CMatrix::zeros(n, n);
    big_g0.rows_mut(0, ns).copy_from(&(&tmat * &a));
    big_g0.view_mut((ns, ns), (n_unstable, n_unstable)).fill_with_identity();
    let mut big_g1 = CMatrix::zeros(n, n);
    big_g1.rows_mut(0, ns).copy_from(&(&tmat * &b));
    let g0_lu = big_g0.lu();
    let big_g1 = g0_lu
        .solve(&big_g1)
        .ok_or(SolveError::NumericalFailure { stage: "inverting the stable block" })?;

    let qc = &q * CMatrix::from_iterator(n, 1, system.c.iter().map(|v| C64::new(*v, 0.0)));
    let mut c_stack = CMatrix::zeros(n, 1);
    c_stack.rows_mut(0, ns).copy_from(&(&tmat * &qc));
    if n_unstable > 0 {
        let unstable_gap = a.view((ns, ns), (n_unstable, n_unstable))
            - b.view((ns, ns), (n_unstable, n_unstable));
        let c_unstable = unstable_gap
            .lu()
            .solve(&qc.rows(ns, n_unstable).into_owned())
            .ok_or(SolveError::NumericalFailure { stage: "constant term of the unstable block" })?;
        c_stack.rows_mut(ns, n_unstable).copy_from(&c_unstable);
    }
    let c_schur = g0_lu
        .solve(&c_stack)
        .ok_or(SolveError::NumericalFailure { stage: "inverting the stable block" })?;

    let k = system.n_shocks();
    let mut impact_stack = CMatrix::zeros(n, k);
    if k > 0 {
        impact_stack.rows_mut(0, ns).copy_from(&(&tmat * &q * &psi));
    }
    let impact = if k > 0 {
        g0_lu
            .solve(&impact_stack)
            .ok_or(SolveError::NumericalFailure { stage: "inverting the stable block" })?
    } else {
        impact_stack
    };

    // ---- Back to the original basis ----
    let t = real_part(&(&z * big_g1 * z.adjoint()));
    let r_mat = real_part(&(&z * impact));
    let c_prime = real_vector(&(&z * c_schur));
    let transition = TransitionSystem { t, r: r_mat, c: c_prime };
    if transition.t.iter().chain(transition.r.iter()).chain(transition.c.iter()).any(|v| !v.is_finite())
    {
        return Err(SolveError::NumericalFailure { stage: "assembling the solution" });
    }
    Ok(Solution { transition, n_unstable, root_moduli })
}

// ---- Helpers ----

/// Shift with the best-conditioned LU of `Γ1 - μΓ0`, judged by the ratio of
/// smallest to largest pivot.
fn pick_shift(g0: &CMatrix, g1: &CMatrix) -> SolveResult<(C64, ShiftedLu)> {
    let mut best: Option<(f64, C64, ShiftedLu)> = None;
    for (re, im) in SHIFT_CANDIDATES {
        let mu = C64::new(re, im);
        let lu = (g1 - g0 * mu).lu();
        let pivots: Vec<f64> = lu.u().diagonal().iter().map(|p| p.norm()).collect();
        let largest = pivots.iter().copied().fold(0.0, f64::max);
        let smallest = pivots.iter().copied().fold(f64::INFINITY, f64::min);
        let ratio = if largest > 0.0 { smallest / largest } else { 0.0 };
        if best.as_ref().map_or(true, |(r, _, _)| ratio > *r) {
            best = Some((ratio, mu, lu));
        }
    }
    match best {
        Some((ratio, mu, lu)) if ratio > PENCIL_RCOND => Ok((mu, lu)),
        _ => Err(SolveError::SingularPencil),
    }
}

fn root_modulus(mu: C64, s: C64) -> f64 {
    if s.norm() == 0.0 {
        f64::INFINITY
    } else {
        ((C64::new(1.0, 0.0) + mu * s) / s).norm()
    }
}

/// SVD keeping singular values above `tol`: `(U_k, d_k, V_k)` with
/// `m ≈ U_k diag(d_k) V_kᴴ`. Empty inputs give empty factors.
fn truncated_svd(m: &CMatrix, tol: f64) -> SolveResult<(CMatrix, Vec<f64>, CMatrix)> {
    let (rows, cols) = m.shape();
    if rows == 0 || cols == 0 {
        return Ok((CMatrix::zeros(rows, 0), Vec::new(), CMatrix::zeros(cols, 0)));
    }
    let failure = SolveError::NumericalFailure { stage: "singular value decomposition" };
    let svd = m.clone().try_svd(true, true, f64::EPSILON, SVD_MAX_ITER).ok_or(failure.clone())?;
    let u = svd.u.ok_or(failure.clone())?;
    let v_t = svd.v_t.ok_or(failure)?;
    let keep: Vec<usize> = svd
        .singular_values
        .iter()
        .enumerate()
        .filter(|(_, sv)| **sv > tol)
        .map(|(i, _)| i)
        .collect();
    let d = keep.iter().map(|&i| svd.singular_values[i]).collect();
    Ok((u.select_columns(keep.iter()), d, v_t.select_rows(keep.iter()).adjoint()))
}

fn to_complex(a: &Array2<f64>) -> CMatrix {
    let (rows, cols) = a.dim();
    CMatrix::from_fn(rows, cols, |i, j| C64::new(a[[i, j]], 0.0))
}

fn real_part(m: &CMatrix) -> Array2<f64> {
    Array2::from_shape_fn((m.nrows(), m.ncols()), |(i, j)| m[(i, j)].re)
}

fn real_vector(m: &CMatrix) -> Array1<f64> {
    Array1::from_iter(m.column(0).iter().map(|z| z.re))
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;
    use ndarray::{Array2, array};

    /// `x = a E x' + z + c0`, `z = ρ z₋₁ + ε` with state `[x, z, E x']`.
    fn forward_looking(a: f64, rho: f64, c0: f64) -> StructuralSystem {
        StructuralSystem {
            gamma0: array![[1.0, -1.0, -a], [0.0, 1.0, 0.0], [1.0, 0.0, 0.0]],
            gamma1: array![[0.0, 0.0, 0.0], [0.0, rho, 0.0], [0.0, 0.0, 1.0]],
            c: array![c0, 0.0, 0.0],
            psi: array![[0.0], [1.0], [0.0]],
            pi: array![[0.0], [0.0], [1.0]],
        }
    }

    fn assert_matrix_eq(a: &Array2<f64>, b: &Array2<f64>, eps: f64) {
        assert_eq!(a.dim(), b.dim());
        for (x, y) in a.iter().zip(b.iter()) {
            assert_abs_diff_eq!(x, y, epsilon = eps);
        }
    }

    #[test]
    // Purpose
    // -------
    // A determinate forward-looking model matches its closed-form solution.
    //
    // Given
    // -----
    // - a = 0.5, ρ = 0.8 (one unstable root, one expectational error).
    //
    // Expect
    // ------
    // - x = z / (1 − aρ): T's z-column is (ρ/(1−aρ), ρ, ρ²/(1−aρ)) and
    //   R = (1/(1−aρ), 1, ρ/(1−aρ)).
    fn determinate_forward_model_matches_closed_form() {
        // Arrange
        let (a, rho) = (0.5, 0.8);
        let k = 1.0 / (1.0 - a * rho);

        // Act
        let sol = solve_detailed(&forward_looking(a, rho, 0.0), &SolverOptions::default())
            .expect("unique solution");

        // Assert
        let expected_t =
            array![[0.0, rho * k, 0.0], [0.0, rho, 0.0], [0.0, rho * rho * k, 0.0]];
        assert_matrix_eq(&sol.transition.t, &expected_t, 1e-9);
        assert_matrix_eq(&sol.transition.r, &array![[k], [1.0], [rho * k]], 1e-9);
        assert_eq!(sol.n_unstable, 1);
    }

    #[test]
    // Purpose
    // -------
    // The constant term reproduces the deterministic steady state.
    //
    // Given
    // -----
    // - a = 0.5, ρ = 0.8, c0 = 1, so x̄ = E x̄ = c0 / (1 − a) = 2, z̄ = 0.
    //
    // Expect
    // ------
    // - (I − T)⁻¹ C′ = (2, 0, 2).
    fn constant_term_gives_steady_state() {
        let tr = solve(&forward_looking(0.5, 0.8, 1.0), &SolverOptions::default()).expect("solve");
        let i_minus_t = crate::utils::to_dmatrix(&(Array2::<f64>::eye(3) - &tr.t).view());
        let steady = i_minus_t
            .lu()
            .solve(&crate::utils::to_dvector(&tr.c))
            .expect("I − T is invertible");
        assert_abs_diff_eq!(steady[0], 2.0, epsilon = 1e-9);
        assert_abs_diff_eq!(steady[1], 0.0, epsilon = 1e-9);
        assert_abs_diff_eq!(steady[2], 2.0, epsilon = 1e-9);
    }

    #[test]
    // Purpose
    // -------
    // Root counts drive the existence and uniqueness classification.
    //
    // Given
    // -----
    // - a = 2 (no unstable root, one expectational error);
    // - a = 0.5, ρ = 1.5 (two unstable roots, one expectational error).
    //
    // Expect
    // ------
    // - `Indeterminacy` and `NoStableSolution` respectively.
    fn root_counts_classify_failures() {
        let opts = SolverOptions::default();
        assert!(matches!(
            solve(&forward_looking(2.0, 0.8, 0.0), &opts),
            Err(SolveError::Indeterminacy { n_unstable: 0, n_eta: 1 })
        ));
        assert!(matches!(
            solve(&forward_looking(0.5, 1.5, 0.0), &opts),
            Err(SolveError::NoStableSolution { n_unstable: 2, n_eta: 1 })
        ));
    }

    #[test]
    // Purpose
    // -------
    // Backward-looking systems satisfy Γ0 T = Γ1 and Γ0 R = Ψ.
    //
    // Given
    // -----
    // - A 3-state system with non-diagonal Γ0, stable Γ1 and two shocks.
    //
    // Expect
    // ------
    // - Both identities to 1e-10; C′ = Γ0⁻¹ C.
    fn backward_system_satisfies_structural_identities() {
        // Arrange
        let system = StructuralSystem {
            gamma0: array![[1.0, 0.2, 0.0], [-0.3, 1.0, 0.1], [0.0, 0.4, 1.0]],
            gamma1: array![[0.5, 0.1, 0.0], [0.0, 0.3, -0.2], [0.1, 0.0, 0.6]],
            c: array![0.1, 0.0, -0.2],
            psi: array![[1.0, 0.0], [0.0, 1.0], [0.5, 0.5]],
            pi: Array2::zeros((3, 0)),
        };

        // Act
        let tr = solve(&system, &SolverOptions::default()).expect("solve");

        // Assert
        assert_matrix_eq(&system.gamma0.dot(&tr.t), &system.gamma1, 1e-10);
        assert_matrix_eq(&system.gamma0.dot(&tr.r), &system.psi, 1e-10);
        let g0c = system.gamma0.dot(&tr.c);
        for (x, y) in g0c.iter().zip(system.c.iter()) {
            assert_abs_diff_eq!(x, y, epsilon = 1e-10);
        }
    }

    #[test]
    // Purpose
    // -------
    // An exact unit root counts as stable under the default `div`.
    //
    // Given
    // -----
    // - Random walk sₜ = sₜ₋₁ + εₜ with no expectational errors.
    //
    // Expect
    // ------
    // - T = [[1]], R = [[1]], no unstable roots, root modulus 1.
    fn unit_root_is_classified_stable() {
        let system = StructuralSystem {
            gamma0: array![[1.0]],
            gamma1: array![[1.0]],
            c: array![0.0],
            psi: array![[1.0]],
            pi: Array2::zeros((1, 0)),
        };
        let sol = solve_detailed(&system, &SolverOptions::default()).expect("solve");
        assert_abs_diff_eq!(sol.transition.t[[0, 0]], 1.0, epsilon = 1e-12);
        assert_abs_diff_eq!(sol.transition.r[[0, 0]], 1.0, epsilon = 1e-12);
        assert_eq!(sol.n_unstable, 0);
        assert_abs_diff_eq!(sol.root_moduli[0], 1.0, epsilon = 1e-12);
    }

    #[test]
    // Purpose
    // -------
    // `div` alone decides on which side of the unit circle a near-unit root
    // falls, and the existence and uniqueness verdicts follow it.
    //
    // Given
    // -----
    // - λ = 1 + 5e-7: the backward system sₜ = λ sₜ₋₁ + εₜ (no
    //   expectational errors) and the forward model with a = 1/λ (one).
    // - The default `div = 1 + 1e-6` and `div = 1`.
    //
    // Expect
    // ------
    // - Default: the backward system solves with T = λ; the forward model
    //   is indeterminate.
    // - `div = 1`: the backward system has no stable solution; the forward
    //   model is determinate with x = z / (1 − aρ).
    fn unit_root_boundary_follows_div() {
        // Arrange
        let lambda = 1.0 + 5e-7;
        let backward = StructuralSystem {
            gamma0: array![[1.0]],
            gamma1: array![[lambda]],
            c: array![0.0],
            psi: array![[1.0]],
            pi: Array2::zeros((1, 0)),
        };
        let (a, rho) = (1.0 / lambda, 0.8);
        let forward = forward_looking(a, rho, 0.0);
        let loose = SolverOptions::default();
        let strict = SolverOptions::new(1.0, loose.realsmall).expect("options");

        // Act
        let backward_loose = solve_detailed(&backward, &loose);
        let backward_strict = solve_detailed(&backward, &strict);
        let forward_loose = solve_detailed(&forward, &loose);
        let forward_strict = solve_detailed(&forward, &strict);

        // Assert
        let sol = backward_loose.expect("near-unit root is stable under the default div");
        assert_eq!(sol.n_unstable, 0);
        assert_abs_diff_eq!(sol.transition.t[[0, 0]], lambda, epsilon = 1e-12);
        assert!(matches!(
            backward_strict,
            Err(SolveError::NoStableSolution { n_unstable: 1, n_eta: 0 })
        ));
        assert!(matches!(
            forward_loose,
            Err(SolveError::Indeterminacy { n_unstable: 0, n_eta: 1 })
        ));
        let sol = forward_strict.expect("near-unit root is unstable under div = 1");
        assert_eq!(sol.n_unstable, 1);
        assert_abs_diff_eq!(sol.transition.r[[0, 0]], 1.0 / (1.0 - a * rho), epsilon = 1e-8);
    }

    #[test]
    // Purpose
    // -------
    // Malformed and degenerate inputs fail before any factorization.
    //
    // Given
    // -----
    // - Ψ with the wrong number of rows; Γ0 = Γ1 = 0.
    //
    // Expect
    // ------
    // - `DimensionMismatch` naming Ψ; `SingularPencil`.
    fn malformed_and_singular_inputs() {
        let opts = SolverOptions::default();
        let mut bad = forward_looking(0.5, 0.8, 0.0);
        bad.psi = Array2::zeros((2, 1));
        assert!(matches!(solve(&bad, &opts), Err(SolveError::DimensionMismatch { matrix: "Ψ", .. })));

        let singular = StructuralSystem::zeros(2, 1, 0);
        assert!(matches!(solve(&singular, &opts), Err(SolveError::SingularPencil)));
    }
}
