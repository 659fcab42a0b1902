//! Maps between a parameter's model-space value and the unconstrained
//! value seen by the optimizer and the sampler.
//!
//! | Transform | model value `x(u)` | `ln |dx/du|` |
//! |---|---|---|
//! | `Identity` | `u` | `0` |
//! | `Bounded { lo, hi }` | `lo + (hi - lo) σ(u)` | `ln(hi - lo) + ln σ(u) + ln σ(-u)` |
//! | `LowerBounded { lo }` | `lo + softplus(u)` | `ln σ(u)` |
//! | `UpperBounded { hi }` | `hi - softplus(u)` | `ln σ(u)` |
//!
//! Supports are open intervals; boundary values have no finite preimage.
use crate::optimization::numerical_stability::{
    log_logistic, safe_logistic, safe_logit, safe_softplus, safe_softplus_inv,
};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub enum Transform {
    #[default]
    Identity,
    Bounded { lo: f64, hi: f64 },
    LowerBounded { lo: f64 },
    UpperBounded { hi: f64 },
}

impl Transform {
    /// `Err(reason)` if the bounds are not finite or `lo >= hi`.
    pub fn validate(&self) -> Result<(), &'static str> {
        match *self {
            Transform::Identity => Ok(()),
            Transform::Bounded { lo, hi } => {
                if !lo.is_finite() || !hi.is_finite() {
                    Err("bounds must be finite")
                } else if lo >= hi {
                    Err("lower bound must be below upper bound")
                } else {
                    Ok(())
                }
            }
            Transform::LowerBounded { lo: b } | Transform::UpperBounded { hi: b } => {
                if b.is_finite() { Ok(()) } else { Err("bound must be finite") }
            }
        }
    }

    /// Whether `x` lies strictly inside the support.
    pub fn contains(&self, x: f64) -> bool {
        if !x.is_finite() {
            return false;
        }
        match *self {
            Transform::Identity => true,
            Transform::Bounded { lo, hi } => x > lo && x < hi,
            Transform::LowerBounded { lo } => x > lo,
            Transform::UpperBounded { hi } => x < hi,
        }
    }

    /// Model value `x(u)`.
    pub fn to_model(&self, u: f64) -> f64 {
        match *self {
            Transform::Identity => u,
            Transform::Bounded { lo, hi } => lo + (hi - lo) * safe_logistic(u),
            Transform::LowerBounded { lo } => lo + safe_softplus(u),
            Transform::UpperBounded { hi } => hi - safe_softplus(u),
        }
    }

    /// Unconstrained value `u(x)`. Callers check [`Transform::contains`]
    /// first; values at a bound are clamped rather than mapped to `±∞`.
    pub fn to_unconstrained(&self, x: f64) -> f64 {
        match *self {
            Transform::Identity => x,
            Transform::Bounded { lo, hi } => safe_logit((x - lo) / (hi - lo)),
            Transform::LowerBounded { lo } => safe_softplus_inv((x - lo).max(f64::MIN_POSITIVE)),
            Transform::UpperBounded { hi } => safe_softplus_inv((hi - x).max(f64::MIN_POSITIVE)),
        }
    }

    /// `ln |dx/du|` at unconstrained `u`.
    pub fn log_jacobian(&self, u: f64) -> f64 {
        match *self {
            Transform::Identity => 0.0,
            Transform::Bounded { lo, hi } => (hi - lo).ln() + log_logistic(u) + log_logistic(-u),
            Transform::LowerBounded { .. } | Transform::UpperBounded { .. } => log_logistic(u),
        }
    }
}
