//! Solver error surface.
//!
//! Dimension problems are contract violations of the model's equation
//! builder. Existence and uniqueness failures depend on the parameter
//! vector and are expected during sampling. Numerical breakdowns of the
//! decomposition are treated like them.

pub type SolveResult<T> = Result<T, SolveError>;

#[derive(Debug, Clone, PartialEq)]
pub enum SolveError {
    /// Structural matrices disagree in shape.
    DimensionMismatch { matrix: &'static str, expected: (usize, usize), found: (usize, usize) },

    /// The system has no states.
    EmptySystem,

    /// A structural matrix has a non-finite entry.
    NonFiniteInput { matrix: &'static str },

    /// `Γ1 - μΓ0` is singular for every trial shift (coincident zeros).
    SingularPencil,

    /// Unstable roots cannot all be offset by the expectational errors.
    NoStableSolution { n_unstable: usize, n_eta: usize },

    /// Expectational errors are not pinned down by the unstable roots.
    Indeterminacy { n_unstable: usize, n_eta: usize },

    /// A factorization failed to converge or hit a singular block.
    NumericalFailure { stage: &'static str },

    /// Solver options are invalid.
    InvalidOptions { reason: &'static str },
}

impl SolveError {
    /// Whether the failure is a property of the parameter draw rather than
    /// a malformed model.
    pub fn is_parameter_dependent(&self) -> bool {
        matches!(
            self,
            SolveError::SingularPencil
                | SolveError::NoStableSolution { .. }
                | SolveError::Indeterminacy { .. }
                | SolveError::NumericalFailure { .. }
                | SolveError::NonFiniteInput { .. }
        )
    }
}

impl std::error::Error for SolveError {}

impl std::fmt::Display for SolveError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SolveError::DimensionMismatch { matrix, expected, found } => {
                write!(f, "Dimension error: {matrix} has shape {found:?}, expected {expected:?}")
            }
            SolveError::EmptySystem => write!(f, "Dimension error: system has no states"),
            SolveError::NonFiniteInput { matrix } => {
                write!(f, "Structural matrix {matrix} contains non-finite entries")
            }
            SolveError::SingularPencil => {
                write!(f, "Pencil (Γ0, Γ1) is singular: coincident zeros")
            }
            SolveError::NoStableSolution { n_unstable, n_eta } => write!(
                f,
                "No stable solution: {n_unstable} unstable roots cannot be offset by {n_eta} expectational errors"
            ),
            SolveError::Indeterminacy { n_unstable, n_eta } => write!(
                f,
                "Indeterminacy: {n_unstable} unstable roots leave {n_eta} expectational errors underdetermined"
            ),
            SolveError::NumericalFailure { stage } => {
                write!(f, "Numerical failure during {stage}")
            }
            SolveError::InvalidOptions { reason } => write!(f, "Invalid solver options: {reason}"),
        }
    }
}
