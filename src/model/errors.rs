//! Errors raised while defining a model or building its matrices.
//!
//! `ModelError` covers the parameter registry (unknown names, priors,
//! transforms, values outside their support), the model specification
//! (duplicate symbols) and contract violations of the model-supplied
//! builders (matrices of the wrong shape). `ModelResult<T>` is the alias.

/// Result alias for model-layer operations.
pub type ModelResult<T> = Result<T, ModelError>;

#[derive(Debug, Clone, PartialEq)]
pub enum ModelError {
    // ---- Registry ----
    /// No parameter with this name.
    UnknownParameter { name: String },

    /// A parameter with this name was already registered.
    DuplicateParameter { name: String },

    /// Prior hyperparameters are invalid.
    InvalidPrior { dist: &'static str, reason: String },

    /// Transform bounds are invalid.
    InvalidTransform { name: String, reason: String },

    /// Value lies outside the transform's or prior's support.
    OutOfSupport { name: String, value: f64, reason: &'static str },

    /// Free-parameter vector has the wrong length.
    FreeLengthMismatch { expected: usize, found: usize },

    // ---- Specification ----
    /// A symbol was registered twice within one mapping.
    DuplicateSymbol { kind: &'static str, name: String },

    /// Lookup of a symbol that is not part of the mapping.
    UnknownSymbol { kind: &'static str, name: String },

    // ---- Builder contract ----
    /// A builder produced a matrix whose shape disagrees with the specification.
    ShapeMismatch { matrix: &'static str, expected: (usize, usize), found: (usize, usize) },

    /// A covariance matrix is not symmetric.
    NotSymmetric { matrix: &'static str, max_asym: f64 },

    /// A covariance matrix has a negative eigenvalue.
    NotPositiveSemiDefinite { matrix: &'static str, min_eigenvalue: f64 },

    /// A builder produced a non-finite entry.
    NonFiniteEntry { matrix: &'static str, row: usize, col: usize, value: f64 },

    /// Model-specific failure reported by a builder.
    Builder { text: String },
}

impl std::error::Error for ModelError {}

impl std::fmt::Display for ModelError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            // ---- Registry ----
            ModelError::UnknownParameter { name } => write!(f, "Unknown parameter '{name}'"),
            ModelError::DuplicateParameter { name } => {
                write!(f, "Parameter '{name}' is already registered")
            }
            ModelError::InvalidPrior { dist, reason } => {
                write!(f, "Invalid {dist} prior: {reason}")
            }
            ModelError::InvalidTransform { name, reason } => {
                write!(f, "Invalid transform for '{name}': {reason}")
            }
            ModelError::OutOfSupport { name, value, reason } => {
                write!(f, "Value {value} for '{name}' is outside its support: {reason}")
            }
            ModelError::FreeLengthMismatch { expected, found } => {
                write!(f, "Free-parameter vector length mismatch: expected {expected}, found {found}")
            }

            // ---- Specification ----
            ModelError::DuplicateSymbol { kind, name } => {
                write!(f, "Duplicate {kind} symbol '{name}'")
            }
            ModelError::UnknownSymbol { kind, name } => write!(f, "Unknown {kind} symbol '{name}'"),

            // ---- Builder contract ----
            ModelError::ShapeMismatch { matrix, expected, found } => {
                write!(f, "Matrix {matrix} has shape {found:?}, expected {expected:?}")
            }
            ModelError::NotSymmetric { matrix, max_asym } => {
                write!(f, "Matrix {matrix} is not symmetric (max |a_ij - a_ji| = {max_asym})")
            }
            ModelError::NotPositiveSemiDefinite { matrix, min_eigenvalue } => {
                write!(f, "Matrix {matrix} is not positive semi-definite (min eigenvalue {min_eigenvalue})")
            }
            ModelError::NonFiniteEntry { matrix, row, col, value } => {
                write!(f, "Matrix {matrix} has non-finite entry {value} at ({row}, {col})")
            }
            ModelError::Builder { text } => write!(f, "Model builder failed: {text}"),
        }
    }
}
