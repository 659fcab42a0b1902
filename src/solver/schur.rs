//! Complex Schur form with eigenvalue reordering.
//!
//! The generalized decomposition of the pencil is built on the ordinary
//! complex Schur form of a shift-inverted matrix (see [`super::gensys`]).
//! This module supplies that Schur form in strictly upper-triangular shape
//! and the unitary adjacent swaps that move selected eigenvalues to the
//! bottom-right corner.
use crate::solver::errors::{SolveError, SolveResult};
use nalgebra::{Complex, DMatrix};

pub type C64 = Complex<f64>;
pub type CMatrix = DMatrix<C64>;

const SCHUR_MAX_ITER: usize = 10_000;

/// `m = u s uᴴ` with `u` unitary and `s` upper triangular.
///
/// # Errors
/// `NumericalFailure` if the QR iteration does not converge.
pub fn complex_schur(m: CMatrix) -> SolveResult<(CMatrix, CMatrix)> {
    let schur = m
        .try_schur(f64::EPSILON, SCHUR_MAX_ITER)
        .ok_or(SolveError::NumericalFailure { stage: "complex Schur decomposition" })?;
    let (mut u, mut s) = schur.unpack();
    triangularize(&mut s, &mut u);
    Ok((u, s))
}

/// Reorder `s` so every eigenvalue with `unstable(λ) == false` precedes
/// the unstable ones, updating `u` so `u s uᴴ` is unchanged. Returns the
/// number of unstable eigenvalues.
pub fn reorder<F>(s: &mut CMatrix, u: &mut CMatrix, unstable: F) -> usize
where
    F: Fn(C64) -> bool,
{
    let n = s.nrows();
    let mut next = 0;
    for i in 0..n {
        if !unstable(s[(i, i)]) {
            for k in (next..i).rev() {
                swap_adjacent(s, u, k);
            }
            next += 1;
        }
    }
    n - next
}

/// Exchange the diagonal entries `k` and `k + 1` of an upper-triangular `s`
/// by a unitary rotation (LAPACK `ztrexc` step).
pub fn swap_adjacent(s: &mut CMatrix, u: &mut CMatrix, k: usize) {
    let n = s.nrows();
    let t11 = s[(k, k)];
    let t22 = s[(k + 1, k + 1)];
    let (cs, sn) = givens(s[(k, k + 1)], t22 - t11);

    for j in (k + 2)..n {
        let (x, y) = rotate(s[(k, j)], s[(k + 1, j)], cs, sn);
        s[(k, j)] = x;
        s[(k + 1, j)] = y;
    }
    for i in 0..k {
        let (x, y) = rotate(s[(i, k)], s[(i, k + 1)], cs, sn.conj());
        s[(i, k)] = x;
        s[(i, k + 1)] = y;
    }
    s[(k, k)] = t22;
    s[(k + 1, k + 1)] = t11;
    for i in 0..n {
        let (x, y) = rotate(u[(i, k)], u[(i, k + 1)], cs, sn.conj());
        u[(i, k)] = x;
        u[(i, k + 1)] = y;
    }
}

/// Plane rotation `(c, s)` with real `c` such that `[c s; -s̄ c]·[f; g] = [r; 0]`.
fn givens(f: C64, g: C64) -> (f64, C64) {
    let zero = C64::new(0.0, 0.0);
    if g == zero {
        return (1.0, zero);
    }
    if f == zero {
        return (0.0, g.conj() / g.norm());
    }
    let (fa, ga) = (f.norm(), g.norm());
    let r = fa.hypot(ga);
    (fa / r, (f / fa) * g.conj() / r)
}

fn rotate(x: C64, y: C64, c: f64, s: C64) -> (C64, C64) {
    (x * c + s * y, y * c - s.conj() * x)
}

/// Remove any 2×2 bumps left below the diagonal by the QR iteration.
fn triangularize(s: &mut CMatrix, u: &mut CMatrix) {
    let n = s.nrows();
    let zero = C64::new(0.0, 0.0);
    for k in 0..n.saturating_sub(1) {
        let sub = s[(k + 1, k)];
        let scale = s[(k, k)].norm() + s[(k + 1, k + 1)].norm();
        if sub.norm() <= f64::EPSILON * scale {
            s[(k + 1, k)] = zero;
            continue;
        }
        let (a, b, c, d) = (s[(k, k)], s[(k, k + 1)], sub, s[(k + 1, k + 1)]);
        let half = (a - d) * 0.5;
        let lambda = (a + d) * 0.5 + (half * half + b * c).sqrt();
        let (v1, v2) = (lambda - d, c);
        let norm = (v1.norm_sqr() + v2.norm_sqr()).sqrt();
        let (g1, g2) = (v1 / norm, v2 / norm);

        // s ← Gᴴ s G and u ← u G with G = [g1 -ḡ2; g2 ḡ1].
        for j in 0..n {
            let (x, y) = (s[(k, j)], s[(k + 1, j)]);
            s[(k, j)] = g1.conj() * x + g2.conj() * y;
            s[(k + 1, j)] = -g2 * x + g1 * y;
        }
        for m in [&mut *s, &mut *u] {
            for i in 0..n {
                let (x, y) = (m[(i, k)], m[(i, k + 1)]);
                m[(i, k)] = x * g1 + y * g2;
                m[(i, k + 1)] = -x * g2.conj() + y * g1.conj();
            }
        }
        s[(k + 1, k)] = zero;
    }
    for j in 0..n {
        for i in (j + 1)..n {
            s[(i, j)] = zero;
        }
    }
}
