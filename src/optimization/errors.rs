//! Errors raised by the optimizer layer.
//!
//! Three groups: bad optimizer settings, bad numbers coming back from the
//! objective or its finite differences, and failures inside the argmin
//! backend. Fatal objective failures travel as [`OptError::EvaluationFailed`]
//! so the caller can recover the parameters they happened at.
use argmin::core::{ArgminError, Error};

pub type OptResult<T> = Result<T, OptError>;

#[derive(Debug, Clone, PartialEq)]
pub enum OptError {
    // ---- Settings ----
    /// A tolerance (`"tol_grad"` or `"tol_cost"`) is not finite and positive.
    InvalidTolerance { name: &'static str, value: f64 },
    /// No tolerance and no iteration cap: the run could never stop.
    NoStoppingRule,
    /// Any other rejected setting (iteration cap, L-BFGS memory, line
    /// search name, finite-difference step).
    InvalidOption { name: &'static str, reason: String },

    // ---- Objective output ----
    /// Sentinel: the objective has no analytic gradient.
    GradientNotImplemented,
    GradientDimMismatch { expected: usize, found: usize },
    InvalidGradient { index: usize, value: f64 },
    NonFiniteCost { value: f64 },
    MissingThetaHat,
    InvalidThetaHat { index: usize, value: f64 },
    HessianDimMismatch { expected: usize, found: (usize, usize) },
    InvalidHessian { row: usize, col: usize, value: f64 },

    /// The objective failed at `theta` for a reason no penalty covers.
    EvaluationFailed { theta: Vec<f64>, text: String },

    // ---- Backend ----
    /// An argmin error; `kind` names the argmin variant.
    Backend { kind: &'static str, text: String },
}

impl std::error::Error for OptError {}

impl std::fmt::Display for OptError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            OptError::InvalidTolerance { name, value } => {
                write!(f, "{name} must be finite and positive, got {value}")
            }
            OptError::NoStoppingRule => {
                write!(f, "At least one of tol_grad, tol_cost or max_iter must be set")
            }
            OptError::InvalidOption { name, reason } => write!(f, "Invalid {name}: {reason}"),
            OptError::GradientNotImplemented => write!(f, "No analytic gradient"),
            OptError::GradientDimMismatch { expected, found } => {
                write!(f, "Gradient has length {found}, expected {expected}")
            }
            OptError::InvalidGradient { index, value } => {
                write!(f, "Gradient entry {index} is not finite: {value}")
            }
            OptError::NonFiniteCost { value } => write!(f, "Objective is not finite: {value}"),
            OptError::MissingThetaHat => write!(f, "Optimizer returned no parameter vector"),
            OptError::InvalidThetaHat { index, value } => {
                write!(f, "Optimizer returned a non-finite parameter at index {index}: {value}")
            }
            OptError::HessianDimMismatch { expected, found } => {
                write!(f, "Hessian is {found:?}, expected ({expected}, {expected})")
            }
            OptError::InvalidHessian { row, col, value } => {
                write!(f, "Hessian entry ({row}, {col}) is not finite: {value}")
            }
            OptError::EvaluationFailed { theta, text } => {
                write!(f, "Objective failed at theta = {theta:?}: {text}")
            }
            OptError::Backend { kind, text } => write!(f, "argmin {kind}: {text}"),
        }
    }
}

/// Errors raised inside the objective are boxed by argmin; unbox them first
/// so callers see the original variant.
impl From<Error> for OptError {
    fn from(err: Error) -> Self {
        let err = match err.downcast::<OptError>() {
            Ok(opt) => return opt,
            Err(err) => err,
        };
        match err.downcast::<ArgminError>() {
            Ok(argmin_err) => {
                let (kind, text) = match argmin_err {
                    ArgminError::InvalidParameter { text } => ("invalid parameter", text),
                    ArgminError::NotImplemented { text } => ("not implemented", text),
                    ArgminError::NotInitialized { text } => ("not initialized", text),
                    ArgminError::ConditionViolated { text } => ("condition violated", text),
                    ArgminError::CheckpointNotFound { text } => ("checkpoint not found", text),
                    ArgminError::PotentialBug { text } => ("potential bug", text),
                    ArgminError::ImpossibleError { text } => ("impossible error", text),
                    other => ("error", other.to_string()),
                };
                OptError::Backend { kind, text }
            }
            Err(err) => OptError::Backend { kind: "error", text: err.to_string() },
        }
    }
}
