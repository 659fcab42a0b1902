//! Errors for observation tables, data windows and simulation.

pub type DataResult<T> = Result<T, DataError>;

#[derive(Debug, Clone, PartialEq)]
pub enum DataError {
    /// Column labels and value matrix disagree.
    ShapeMismatch { what: &'static str, expected: (usize, usize), found: (usize, usize) },

    /// A column label appears twice.
    DuplicateObservable { name: String },

    /// The model needs an observable the table does not have.
    MissingObservable { name: String },

    /// Only `NaN` may mark a missing entry.
    InfiniteValue { row: usize, col: usize, value: f64 },

    /// Window boundaries are out of order or past the end of the table.
    InvalidWindow { presample_start: usize, mainsample_start: usize, mainsample_end: usize, n_periods: usize },

    /// Simulation inputs are inconsistent or degenerate.
    InvalidSimulation { reason: String },
}

impl std::error::Error for DataError {}

impl std::fmt::Display for DataError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            DataError::ShapeMismatch { what, expected, found } => {
                write!(f, "{what} has shape {found:?}, expected {expected:?}")
            }
            DataError::DuplicateObservable { name } => {
                write!(f, "Observable '{name}' appears more than once")
            }
            DataError::MissingObservable { name } => {
                write!(f, "Observation table has no column for observable '{name}'")
            }
            DataError::InfiniteValue { row, col, value } => {
                write!(f, "Infinite value {value} at ({row}, {col}); use NaN for missing entries")
            }
            DataError::InvalidWindow { presample_start, mainsample_start, mainsample_end, n_periods } => {
                write!(
                    f,
                    "Invalid data window: need {presample_start} <= {mainsample_start} < {mainsample_end} <= {n_periods}"
                )
            }
            DataError::InvalidSimulation { reason } => write!(f, "Invalid simulation: {reason}"),
        }
    }
}
