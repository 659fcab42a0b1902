//! Errors for draw collections and draw stores.
use crate::model::errors::ModelError;

pub type DrawResult<T> = Result<T, DrawError>;

#[derive(Debug, Clone, PartialEq)]
pub enum DrawError {
    /// Metadata vectors disagree with the draw matrix.
    LengthMismatch { what: &'static str, expected: usize, found: usize },

    /// No column with this parameter name.
    UnknownParameter { name: String },

    /// Summaries need at least one draw.
    Empty,

    /// `store` would overwrite an existing collection.
    TagExists { tag: String },

    TagNotFound { tag: String },

    /// Tags become file names, so only `[A-Za-z0-9_.-]` is allowed.
    InvalidTag { tag: String, reason: &'static str },

    /// Filesystem failure in a persistent store.
    Io { path: String, text: String },

    /// A stored collection could not be encoded or decoded.
    Serialization { tag: String, text: String },

    /// Prior sampling failed.
    Model(ModelError),
}

impl std::error::Error for DrawError {}

impl std::fmt::Display for DrawError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            DrawError::LengthMismatch { what, expected, found } => {
                write!(f, "Draw collection {what} has length {found}, expected {expected}")
            }
            DrawError::UnknownParameter { name } => {
                write!(f, "Draw collection has no parameter '{name}'")
            }
            DrawError::Empty => write!(f, "Draw collection is empty"),
            DrawError::TagExists { tag } => write!(f, "Draw store already holds tag '{tag}'"),
            DrawError::TagNotFound { tag } => write!(f, "Draw store has no tag '{tag}'"),
            DrawError::InvalidTag { tag, reason } => write!(f, "Invalid tag '{tag}': {reason}"),
            DrawError::Io { path, text } => write!(f, "I/O error at {path}: {text}"),
            DrawError::Serialization { tag, text } => {
                write!(f, "Could not (de)serialize draws '{tag}': {text}")
            }
            DrawError::Model(err) => write!(f, "Prior sampling failed: {err}"),
        }
    }
}

impl From<ModelError> for DrawError {
    fn from(err: ModelError) -> Self {
        DrawError::Model(err)
    }
}
