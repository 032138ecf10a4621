//! What an integration request returns, and the counters it accumulates.

use crate::{Float, status::Status};

/// Outcome of one integration request.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Advance {
    /// Time the returned state belongs to. Equals the target on
    /// [`Status::Success`], the root location on [`Status::RootReturn`], and the
    /// last completed step otherwise.
    pub t: Float,
    /// How the request ended.
    pub status: Status,
}

impl Advance {
    pub(crate) fn new(t: Float, status: Status) -> Self {
        Self { t, status }
    }
}

/// Cumulative solver counters since construction or the last reinitialization.
///
/// Reading them never changes solver behavior.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Stats {
    /// Accepted internal steps.
    pub steps: usize,
    /// Right-hand side evaluations by the integrator itself.
    pub rhs_evals: usize,
    /// Right-hand side evaluations spent on difference-quotient Jacobians or
    /// Jacobian-vector products.
    pub rhs_evals_jac: usize,
    /// Linear solver setups (iteration matrix factorizations).
    pub lin_setups: usize,
    /// Jacobian evaluations, analytic or by finite differences.
    pub jac_evals: usize,
    /// Local error test failures.
    pub err_test_fails: usize,
    /// Newton iterations.
    pub nonlin_iters: usize,
    /// Newton convergence failures.
    pub nonlin_conv_fails: usize,
    /// GMRES iterations of the matrix-free variant.
    pub linear_iters: usize,
    /// Root function evaluations.
    pub root_evals: usize,
    /// Order reductions triggered by stability limit detection.
    pub stab_lim_order_reductions: usize,
    /// Order of the last accepted step.
    pub last_order: usize,
    /// Order the next step will attempt.
    pub current_order: usize,
    /// Size of the last accepted step.
    pub last_step: Float,
    /// Size the next step will attempt.
    pub current_step: Float,
    /// Time reached by the integrator, which may lie past the last returned time.
    pub current_time: Float,
}
