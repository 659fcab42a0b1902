//! Structural and solved systems plus solver options.
use crate::solver::errors::{SolveError, SolveResult};
use ndarray::{Array1, Array2};
use serde::{Deserialize, Serialize};

/// `Γ0 sₜ = Γ1 sₜ₋₁ + C + Ψ εₜ + Π ηₜ`.
#[derive(Debug, Clone, PartialEq)]
pub struct StructuralSystem {
    pub gamma0: Array2<f64>,
    pub gamma1: Array2<f64>,
    pub c: Array1<f64>,
    pub psi: Array2<f64>,
    pub pi: Array2<f64>,
}

impl StructuralSystem {
    /// Zero matrices sized for `n` states, `k` shocks and `m` expectational
    /// errors; builders fill entries in place.
    pub fn zeros(n: usize, k: usize, m: usize) -> Self {
        Self {
            gamma0: Array2::zeros((n, n)),
            gamma1: Array2::zeros((n, n)),
            c: Array1::zeros(n),
            psi: Array2::zeros((n, k)),
            pi: Array2::zeros((n, m)),
        }
    }

    pub fn n_states(&self) -> usize {
        self.gamma0.nrows()
    }

    pub fn n_shocks(&self) -> usize {
        self.psi.ncols()
    }

    pub fn n_eta(&self) -> usize {
        self.pi.ncols()
    }

    /// Check that every matrix agrees with `n = Γ0.nrows()` and that all
    /// entries are finite.
    pub fn check(&self) -> SolveResult<()> {
        let n = self.gamma0.nrows();
        if n == 0 {
            return Err(SolveError::EmptySystem);
        }
        let square = |matrix: &'static str, a: &Array2<f64>| {
            if a.dim() != (n, n) {
                return Err(SolveError::DimensionMismatch { matrix, expected: (n, n), found: a.dim() });
            }
            Ok(())
        };
        square("Γ0", &self.gamma0)?;
        square("Γ1", &self.gamma1)?;
        if self.c.len() != n {
            return Err(SolveError::DimensionMismatch {
                matrix: "C",
                expected: (n, 1),
                found: (self.c.len(), 1),
            });
        }
        if self.psi.nrows() != n {
            return Err(SolveError::DimensionMismatch {
                matrix: "Ψ",
                expected: (n, self.psi.ncols()),
                found: self.psi.dim(),
            });
        }
        if self.pi.nrows() != n {
            return Err(SolveError::DimensionMismatch {
                matrix: "Π",
                expected: (n, self.pi.ncols()),
                found: self.pi.dim(),
            });
        }
        let finite = |matrix: &'static str, ok: bool| {
            if ok { Ok(()) } else { Err(SolveError::NonFiniteInput { matrix }) }
        };
        finite("Γ0", self.gamma0.iter().all(|v| v.is_finite()))?;
        finite("Γ1", self.gamma1.iter().all(|v| v.is_finite()))?;
        finite("C", self.c.iter().all(|v| v.is_finite()))?;
        finite("Ψ", self.psi.iter().all(|v| v.is_finite()))?;
        finite("Π", self.pi.iter().all(|v| v.is_finite()))
    }
}

/// `sₜ = T sₜ₋₁ + R εₜ + C′`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TransitionSystem {
    pub t: Array2<f64>,
    pub r: Array2<f64>,
    pub c: Array1<f64>,
}

impl TransitionSystem {
    pub fn n_states(&self) -> usize {
        self.t.nrows()
    }

    pub fn n_shocks(&self) -> usize {
        self.r.ncols()
    }
}

/// Solution plus the root diagnostics behind it.
#[derive(Debug, Clone, PartialEq)]
pub struct Solution {
    pub transition: TransitionSystem,
    /// Number of roots classified unstable (`|λ| > div`).
    pub n_unstable: usize,
    /// `|λ|` of every generalized eigenvalue; `∞` for infinite roots.
    pub root_moduli: Vec<f64>,
}

/// Tuning of the rational-expectations solver.
///
/// - `div`: roots with `|λ| > div` are unstable. Exact unit roots therefore
///   count as stable; models whose roots sit within `div - 1` of the unit
///   circle are classified by this threshold alone.
/// - `realsmall`: singular values at or below this are treated as zero in
///   the existence and uniqueness rank tests.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SolverOptions {
    pub div: f64,
    pub realsmall: f64,
}

impl SolverOptions {
    pub fn new(div: f64, realsmall: f64) -> SolveResult<Self> {
        if !div.is_finite() || div < 1.0 {
            return Err(SolveError::InvalidOptions { reason: "div must be finite and at least 1" });
        }
        if !realsmall.is_finite() || realsmall <= 0.0 {
            return Err(SolveError::InvalidOptions {
                reason: "realsmall must be finite and positive",
            });
        }
        Ok(Self { div, realsmall })
    }
}

impl Default for SolverOptions {
    fn default() -> Self {
        Self { div: 1.0 + 1e-6, realsmall: f64::EPSILON.sqrt() * 10.0 }
    }
}
