//! Solver observer trait for progress reporting.

use crate::record::ConvergenceRecord;

/// Callbacks invoked by [`RsuetSolver::run`][crate::RsuetSolver::run] at key
/// points in the outer/inner loop.
///
/// All methods have default no-op implementations so implementors only
/// override what they care about.
pub trait ConvergenceObserver {
    /// Called at the start of each outer iteration, before column generation.
    fn on_outer_start(&mut self, _outer_iter: u32) {}

    /// Called after each inner MSA step, before the next one runs.
    fn on_inner_iteration(&mut self, _outer_iter: u32, _inner_iter: u32, _inner_gap: f64) {}

    /// Called once the inner loop has converged (or hit its iteration cap)
    /// and the outer convergence record for this iteration has been logged.
    fn on_outer_end(&mut self, _record: &ConvergenceRecord) {}

    /// Called once, after the outer loop terminates (`Converged` or
    /// `NonConvergence`).
    fn on_solve_end(&mut self, _history: &[ConvergenceRecord]) {}
}

/// A [`ConvergenceObserver`] that does nothing.
pub struct NoopObserver;

impl ConvergenceObserver for NoopObserver {}
