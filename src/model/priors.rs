//! Prior distributions over structural parameters.
//!
//! Each [`Prior`] evaluates its log-density through `statrs` and draws
//! through `rand_distr`. Hyperparameters are checked by [`Prior::validate`],
//! which every constructor and the registry call, so `ln_pdf` never sees an
//! invalid distribution.
use crate::model::errors::{ModelError, ModelResult};
use rand::Rng;
use rand_distr::Distribution;
use serde::{Deserialize, Serialize};
use statrs::distribution::{Beta, Continuous, Gamma, InverseGamma, Normal, Uniform};

/// Prior density over one scalar parameter in model space.
///
/// - `Gamma` is parameterized by shape and rate (mean `shape / rate`).
/// - `InverseGamma` is parameterized by shape and scale
///   (mean `scale / (shape - 1)` for `shape > 1`).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum Prior {
    Normal { mean: f64, std: f64 },
    Beta { alpha: f64, beta: f64 },
    Gamma { shape: f64, rate: f64 },
    InverseGamma { shape: f64, scale: f64 },
    Uniform { lo: f64, hi: f64 },
}

impl Prior {
    pub fn normal(mean: f64, std: f64) -> ModelResult<Self> {
        let prior = Prior::Normal { mean, std };
        prior.validate()?;
        Ok(prior)
    }

    pub fn beta(alpha: f64, beta: f64) -> ModelResult<Self> {
        let prior = Prior::Beta { alpha, beta };
        prior.validate()?;
        Ok(prior)
    }

    pub fn gamma(shape: f64, rate: f64) -> ModelResult<Self> {
        let prior = Prior::Gamma { shape, rate };
        prior.validate()?;
        Ok(prior)
    }

    pub fn inverse_gamma(shape: f64, scale: f64) -> ModelResult<Self> {
        let prior = Prior::InverseGamma { shape, scale };
        prior.validate()?;
        Ok(prior)
    }

    pub fn uniform(lo: f64, hi: f64) -> ModelResult<Self> {
        let prior = Prior::Uniform { lo, hi };
        prior.validate()?;
        Ok(prior)
    }

    /// Beta prior with the given mean and standard deviation.
    ///
    /// # Errors
    /// `InvalidPrior` unless `0 < mean < 1` and `std² < mean (1 - mean)`.
    pub fn beta_from_moments(mean: f64, std: f64) -> ModelResult<Self> {
        let var = std * std;
        if !(mean > 0.0 && mean < 1.0) || !(var > 0.0) || var >= mean * (1.0 - mean) {
            return Err(ModelError::InvalidPrior {
                dist: "Beta",
                reason: format!(
                    "moments (mean {mean}, std {std}) need 0 < mean < 1 and std² < mean·(1 - mean)"
                ),
            });
        }
        let k = mean * (1.0 - mean) / var - 1.0;
        Prior::beta(mean * k, (1.0 - mean) * k)
    }

    /// Gamma prior with the given mean and standard deviation.
    pub fn gamma_from_moments(mean: f64, std: f64) -> ModelResult<Self> {
        if !(mean > 0.0) || !(std > 0.0) || !mean.is_finite() || !std.is_finite() {
            return Err(ModelError::InvalidPrior {
                dist: "Gamma",
                reason: format!("moments (mean {mean}, std {std}) must be finite and positive"),
            });
        }
        let var = std * std;
        Prior::gamma(mean * mean / var, mean / var)
    }

    /// Check hyperparameters by building the `statrs` distribution.
    pub fn validate(&self) -> ModelResult<()> {
        let invalid = |dist: &'static str, e: String| ModelError::InvalidPrior { dist, reason: e };
        match *self {
            Prior::Normal { mean, std } => {
                Normal::new(mean, std).map_err(|e| invalid("Normal", e.to_string()))?;
            }
            Prior::Beta { alpha, beta } => {
                Beta::new(alpha, beta).map_err(|e| invalid("Beta", e.to_string()))?;
            }
            Prior::Gamma { shape, rate } => {
                Gamma::new(shape, rate).map_err(|e| invalid("Gamma", e.to_string()))?;
            }
            Prior::InverseGamma { shape, scale } => {
                InverseGamma::new(shape, scale)
                    .map_err(|e| invalid("InverseGamma", e.to_string()))?;
            }
            Prior::Uniform { lo, hi } => {
                Uniform::new(lo, hi).map_err(|e| invalid("Uniform", e.to_string()))?;
            }
        }
        Ok(())
    }

    /// Closed support `(lower, upper)` of the density.
    pub fn support(&self) -> (f64, f64) {
        match *self {
            Prior::Normal { .. } => (f64::NEG_INFINITY, f64::INFINITY),
            Prior::Beta { .. } => (0.0, 1.0),
            Prior::Gamma { .. } | Prior::InverseGamma { .. } => (0.0, f64::INFINITY),
            Prior::Uniform { lo, hi } => (lo, hi),
        }
    }

    pub fn contains(&self, x: f64) -> bool {
        let (lo, hi) = self.support();
        x.is_finite() && x >= lo && x <= hi
    }

    /// Prior mean, when it exists.
    pub fn mean(&self) -> Option<f64> {
        match *self {
            Prior::Normal { mean, .. } => Some(mean),
            Prior::Beta { alpha, beta } => Some(alpha / (alpha + beta)),
            Prior::Gamma { shape, rate } => Some(shape / rate),
            Prior::InverseGamma { shape, scale } => (shape > 1.0).then(|| scale / (shape - 1.0)),
            Prior::Uniform { lo, hi } => Some(0.5 * (lo + hi)),
        }
    }

    /// Log-density at `x`; `-∞` outside the support.
    pub fn ln_pdf(&self, x: f64) -> f64 {
        if !self.contains(x) {
            return f64::NEG_INFINITY;
        }
        let value = match *self {
            Prior::Normal { mean, std } => Normal::new(mean, std).map(|d| d.ln_pdf(x)),
            Prior::Beta { alpha, beta } => Beta::new(alpha, beta).map(|d| d.ln_pdf(x)),
            Prior::Gamma { shape, rate } => Gamma::new(shape, rate).map(|d| d.ln_pdf(x)),
            Prior::InverseGamma { shape, scale } => {
                InverseGamma::new(shape, scale).map(|d| d.ln_pdf(x))
            }
            Prior::Uniform { lo, hi } => Uniform::new(lo, hi).map(|d| d.ln_pdf(x)),
        };
        value.unwrap_or(f64::NEG_INFINITY)
    }

    /// Draw one value.
    ///
    /// # Errors
    /// `InvalidPrior` if the hyperparameters are rejected by `rand_distr`.
    pub fn sample<R: Rng + ?Sized>(&self, rng: &mut R) -> ModelResult<f64> {
        let invalid = |dist: &'static str, e: String| ModelError::InvalidPrior { dist, reason: e };
        match *self {
            Prior::Normal { mean, std } => Ok(rand_distr::Normal::new(mean, std)
                .map_err(|e| invalid("Normal", e.to_string()))?
                .sample(rng)),
            Prior::Beta { alpha, beta } => Ok(rand_distr::Beta::new(alpha, beta)
                .map_err(|e| invalid("Beta", e.to_string()))?
                .sample(rng)),
            Prior::Gamma { shape, rate } => Ok(rand_distr::Gamma::new(shape, 1.0 / rate)
                .map_err(|e| invalid("Gamma", e.to_string()))?
                .sample(rng)),
            Prior::InverseGamma { shape, scale } => {
                let g = rand_distr::Gamma::new(shape, 1.0)
                    .map_err(|e| invalid("InverseGamma", e.to_string()))?
                    .sample(rng);
                Ok(scale / g)
            }
            Prior::Uniform { lo, hi } => Ok(lo + (hi - lo) * rng.gen::<f64>()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use rand::{SeedableRng, rngs::StdRng};

    #[test]
    // Purpose
    // -------
    // Moment constructors hit the requested mean and standard deviation.
    //
    // Given
    // -----
    // - Beta(mean 0.6, std 0.2) and Gamma(mean 2, std 0.5).
    //
    // Expect
    // ------
    // - Closed-form mean and variance of the fitted laws match the inputs.
    fn moment_constructors_match_requested_moments() {
        // Arrange / Act
        let beta = Prior::beta_from_moments(0.6, 0.2).expect("beta");
        let gamma = Prior::gamma_from_moments(2.0, 0.5).expect("gamma");

        // Assert
        let Prior::Beta { alpha, beta: b } = beta else { panic!("expected Beta") };
        let var = alpha * b / ((alpha + b).powi(2) * (alpha + b + 1.0));
        assert_relative_eq!(alpha / (alpha + b), 0.6, epsilon = 1e-12);
        assert_relative_eq!(var, 0.04, epsilon = 1e-12);

        let Prior::Gamma { shape, rate } = gamma else { panic!("expected Gamma") };
        assert_relative_eq!(shape / rate, 2.0, epsilon = 1e-12);
        assert_relative_eq!(shape / (rate * rate), 0.25, epsilon = 1e-12);
    }

    #[test]
    // Purpose
    // -------
    // Impossible moments and bad hyperparameters are rejected.
    //
    // Given
    // -----
    // - Beta moments with std² ≥ mean(1 − mean); Normal with std = 0.
    //
    // Expect
    // ------
    // - `InvalidPrior` in both cases.
    fn invalid_hyperparameters_are_rejected() {
        assert!(matches!(
            Prior::beta_from_moments(0.5, 0.6),
            Err(ModelError::InvalidPrior { dist: "Beta", .. })
        ));
        assert!(matches!(Prior::normal(0.0, 0.0), Err(ModelError::InvalidPrior { .. })));
    }

    #[test]
    // Purpose
    // -------
    // Log-densities agree with closed forms and are −∞ off the support.
    //
    // Given
    // -----
    // - Normal(0, 1) at 0, Uniform(−1, 1) at 0.3, Gamma(2, 1) at −1.
    //
    // Expect
    // ------
    // - −½ ln 2π, ln ½, and −∞.
    fn ln_pdf_matches_closed_forms() {
        let normal = Prior::normal(0.0, 1.0).expect("normal");
        let uniform = Prior::uniform(-1.0, 1.0).expect("uniform");
        let gamma = Prior::gamma(2.0, 1.0).expect("gamma");

        assert_relative_eq!(
            normal.ln_pdf(0.0),
            -0.5 * (2.0 * std::f64::consts::PI).ln(),
            epsilon = 1e-12
        );
        assert_relative_eq!(uniform.ln_pdf(0.3), 0.5f64.ln(), epsilon = 1e-12);
        assert_eq!(gamma.ln_pdf(-1.0), f64::NEG_INFINITY);
    }

    #[test]
    // Purpose
    // -------
    // Sampling parameterizations agree with the density parameterizations.
    //
    // Given
    // -----
    // - Gamma(shape 3, rate 2) and InverseGamma(shape 4, scale 3), 20 000
    //   draws each from a seeded RNG.
    //
    // Expect
    // ------
    // - Sample means near 1.5 and 1.0.
    fn sample_means_match_prior_means() {
        // Arrange
        let mut rng = StdRng::seed_from_u64(7);
        let gamma = Prior::gamma(3.0, 2.0).expect("gamma");
        let inv = Prior::inverse_gamma(4.0, 3.0).expect("inverse gamma");
        let n = 20_000;

        // Act
        let g_mean: f64 =
            (0..n).map(|_| gamma.sample(&mut rng).expect("draw")).sum::<f64>() / n as f64;
        let ig_mean: f64 =
            (0..n).map(|_| inv.sample(&mut rng).expect("draw")).sum::<f64>() / n as f64;

        // Assert
        assert_relative_eq!(g_mean, 1.5, epsilon = 0.03);
        assert_relative_eq!(ig_mean, 1.0, epsilon = 0.03);
        assert_eq!(inv.mean(), Some(1.0));
    }
}
