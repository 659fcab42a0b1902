//! maximizer::builders: L-BFGS solver construction helpers.
//!
//! Purpose
//! -------
//! Hide Argmin's generic wiring behind two builders, one per line search,
//! and apply crate-level options (tolerances, memory size). The initial
//! parameter vector and iteration cap are left to the runner.
//!
//! Testing notes
//! -------------
//! - Unit tests check both builders with default and explicit memory and
//!   the tolerance wiring in [`configure_lbfgs`].
use argmin::solver::quasinewton::LBFGS;

use crate::optimization::{
    errors::OptResult,
    maximizer::{
        traits::OptimizerOptions,
        types::{
            Cost, DEFAULT_LBFGS_MEM, Grad, HagerZhangLS, LbfgsHagerZhang, LbfgsMoreThuente,
            MoreThuenteLS, Theta,
        },
    },
};

/// L-BFGS with Hager–Zhang line search.
///
/// Uses `opts.lbfgs_mem` (or [`DEFAULT_LBFGS_MEM`]) as history size and wires
/// any gradient / cost tolerances through [`configure_lbfgs`].
pub fn build_optimizer_hager_zhang(opts: &OptimizerOptions) -> OptResult<LbfgsHagerZhang> {
    let mem = opts.lbfgs_mem.unwrap_or(DEFAULT_LBFGS_MEM);
    configure_lbfgs(LbfgsHagerZhang::new(HagerZhangLS::new(), mem), opts)
}

/// L-BFGS with More–Thuente line search. Same wiring as
/// [`build_optimizer_hager_zhang`].
pub fn build_optimizer_more_thuente(opts: &OptimizerOptions) -> OptResult<LbfgsMoreThuente> {
    let mem = opts.lbfgs_mem.unwrap_or(DEFAULT_LBFGS_MEM);
    configure_lbfgs(LbfgsMoreThuente::new(MoreThuenteLS::new(), mem), opts)
}

/// Apply the optional tolerances in `opts.tols` to an L-BFGS solver.
///
/// Absent tolerances leave Argmin's defaults in place. Argmin rejections of
/// a tolerance value surface as `OptError` through `From<argmin::core::Error>`.
pub fn configure_lbfgs<L>(
    mut solver: LBFGS<L, Theta, Grad, Cost>, opts: &OptimizerOptions,
) -> OptResult<LBFGS<L, Theta, Grad, Cost>> {
    if let Some(g) = opts.tols.tol_grad {
        solver = solver.with_tolerance_grad(g)?;
    }
    if let Some(c) = opts.tols.tol_cost {
        solver = solver.with_tolerance_cost(c)?;
    }
    Ok(solver)
}
