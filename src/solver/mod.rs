//! solver: rational-expectations solution of linear structural systems.
//!
//! Purpose
//! -------
//! Turn the structural matrices `(Γ0, Γ1, C, Ψ, Π)` produced by a model's
//! equation builder into the reduced-form transition `(T, R, C′)`, checking
//! existence and uniqueness of a stable solution on the way.
//!
//! Key behaviors
//! -------------
//! - [`gensys::solve`] is a pure function of its inputs.
//! - Roots are classified against [`SolverOptions::div`]; exact unit roots
//!   count as stable. Roots inside `(1, div]` are a documented edge case
//!   and are never re-examined.
//! - Parameter-dependent failures ([`SolveError::is_parameter_dependent`])
//!   are rejections for the sampler; dimension errors are contract
//!   violations.
//!
//! Testing notes
//! -------------
//! - Unit tests cover closed-form forward-looking solutions, steady states,
//!   root-count classification, structural identities and degenerate input.
//! - `tests/solver.rs` checks random backward systems and the MA(1) model.

pub mod errors;
pub mod gensys;
pub mod schur;
pub mod types;

pub use self::errors::{SolveError, SolveResult};
pub use self::gensys::{solve, solve_detailed};
pub use self::types::{Solution, SolverOptions, StructuralSystem, TransitionSystem};
