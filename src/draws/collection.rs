//! Draw collections: one row per retained draw, in model space.
//!
//! Prior and posterior collections share this type and differ only in
//! [`Provenance`]. A collection is immutable once built; the sampler
//! creates it and hands ownership to whoever stores it.
use crate::{
    draws::errors::{DrawError, DrawResult},
    sampler::diagnostics::ChainDiagnostics,
};
use ndarray::{Array1, Array2, ArrayView1, Axis};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Provenance {
    Prior,
    Posterior,
}

/// Run-level metadata attached to a collection.
///
/// `complete` is false when the run was cancelled before its last sweep;
/// the rows present are still valid draws.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DrawMeta {
    pub chain_id: usize,
    pub provenance: Provenance,
    pub n_burn: usize,
    pub thin: usize,
    pub complete: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DrawCollection {
    names: Vec<String>,
    draws: Array2<f64>,
    accepted: Vec<bool>,
    log_posterior: Vec<f64>,
    iterations: Vec<usize>,
    meta: DrawMeta,
    /// Per-block proposal counts of the chain that produced the draws.
    #[serde(default)]
    diagnostics: Option<ChainDiagnostics>,
}

/// Marginal summary of one parameter.
#[derive(Debug, Clone, PartialEq)]
pub struct ParameterSummary {
    pub name: String,
    pub mean: f64,
    pub std: f64,
    pub q05: f64,
    pub q50: f64,
    pub q95: f64,
}

impl DrawCollection {
    /// # Errors
    /// `LengthMismatch` when `names` does not match the column count or a
    /// per-draw vector does not match the row count.
    pub fn new(
        names: Vec<String>, draws: Array2<f64>, accepted: Vec<bool>, log_posterior: Vec<f64>,
        iterations: Vec<usize>, meta: DrawMeta,
    ) -> DrawResult<Self> {
        let rows = draws.nrows();
        if names.len() != draws.ncols() {
            return Err(DrawError::LengthMismatch {
                what: "names",
                expected: draws.ncols(),
                found: names.len(),
            });
        }
        for (what, found) in [
            ("accepted", accepted.len()),
            ("log_posterior", log_posterior.len()),
            ("iterations", iterations.len()),
        ] {
            if found != rows {
                return Err(DrawError::LengthMismatch { what, expected: rows, found });
            }
        }
        Ok(Self { names, draws, accepted, log_posterior, iterations, meta, diagnostics: None })
    }

    pub fn with_diagnostics(mut self, diagnostics: ChainDiagnostics) -> Self {
        self.diagnostics = Some(diagnostics);
        self
    }

    /// Proposal counts per block, burn-in included. `None` for collections
    /// that did not come from a sampler chain.
    pub fn diagnostics(&self) -> Option<&ChainDiagnostics> {
        self.diagnostics.as_ref()
    }

    /// Acceptance rate of each block position; empty without diagnostics.
    pub fn block_acceptance_rates(&self) -> Vec<f64> {
        self.diagnostics.as_ref().map_or_else(Vec::new, ChainDiagnostics::block_rates)
    }

    pub fn names(&self) -> &[String] {
        &self.names
    }

    /// Rows are draws, columns follow [`DrawCollection::names`].
    pub fn draws(&self) -> &Array2<f64> {
        &self.draws
    }

    pub fn n_draws(&self) -> usize {
        self.draws.nrows()
    }

    pub fn n_params(&self) -> usize {
        self.draws.ncols()
    }

    /// Whether the chain moved during the sweep that produced each draw.
    pub fn accepted(&self) -> &[bool] {
        &self.accepted
    }

    pub fn log_posterior(&self) -> &[f64] {
        &self.log_posterior
    }

    /// 1-based sweep number of each draw.
    pub fn iterations(&self) -> &[usize] {
        &self.iterations
    }

    pub fn meta(&self) -> &DrawMeta {
        &self.meta
    }

    pub fn chain_id(&self) -> usize {
        self.meta.chain_id
    }

    pub fn provenance(&self) -> Provenance {
        self.meta.provenance
    }

    pub fn is_complete(&self) -> bool {
        self.meta.complete
    }

    /// Share of retained draws whose sweep moved the chain; `NaN` when
    /// empty.
    pub fn acceptance_rate(&self) -> f64 {
        if self.accepted.is_empty() {
            return f64::NAN;
        }
        self.accepted.iter().filter(|a| **a).count() as f64 / self.accepted.len() as f64
    }

    pub fn column(&self, name: &str) -> DrawResult<ArrayView1<'_, f64>> {
        let j = self
            .names
            .iter()
            .position(|n| n == name)
            .ok_or_else(|| DrawError::UnknownParameter { name: name.to_string() })?;
        Ok(self.draws.column(j))
    }

    /// Per-parameter mean, standard deviation and 5/50/95% quantiles.
    pub fn summary(&self) -> DrawResult<Vec<ParameterSummary>> {
        if self.n_draws() == 0 {
            return Err(DrawError::Empty);
        }
        let means = self.draws.mean_axis(Axis(0)).ok_or(DrawError::Empty)?;
        let ddof = if self.n_draws() > 1 { 1.0 } else { 0.0 };
        let stds = self.draws.std_axis(Axis(0), ddof);
        Ok(self
            .names
            .iter()
            .enumerate()
            .map(|(j, name)| {
                let sorted = sorted_column(self.draws.column(j));
                ParameterSummary {
                    name: name.clone(),
                    mean: means[j],
                    std: stds[j],
                    q05: quantile(&sorted, 0.05),
                    q50: quantile(&sorted, 0.50),
                    q95: quantile(&sorted, 0.95),
                }
            })
            .collect())
    }
}

fn sorted_column(col: ArrayView1<'_, f64>) -> Array1<f64> {
    let mut v = col.to_vec();
    v.sort_by(f64::total_cmp);
    Array1::from(v)
}

/// Linear interpolation between order statistics.
fn quantile(sorted: &Array1<f64>, p: f64) -> f64 {
    let h = (sorted.len() - 1) as f64 * p;
    let lo = h.floor() as usize;
    let hi = h.ceil() as usize;
    sorted[lo] + (h - lo as f64) * (sorted[hi] - sorted[lo])
}
