//! Bridges [`ConvergenceObserver`] callbacks to `tracing` events.

use rsuet_solver::{ConvergenceObserver, ConvergenceRecord};

/// Logs outer/inner progress through `tracing`. Outer-iteration starts and
/// ends are `info!`; individual inner MSA steps are `debug!` since a solve
/// can run hundreds of them per outer iteration.
pub struct TracingObserver;

impl ConvergenceObserver for TracingObserver {
    fn on_outer_start(&mut self, outer_iter: u32) {
        tracing::info!(outer_iter, "starting outer iteration");
    }

    fn on_inner_iteration(&mut self, outer_iter: u32, inner_iter: u32, inner_gap: f64) {
        tracing::debug!(outer_iter, inner_iter, inner_gap, "inner iteration");
    }

    fn on_outer_end(&mut self, record: &ConvergenceRecord) {
        tracing::info!(
            outer_iter = record.outer_iter,
            inner_iter = record.inner_iter,
            rel_gap_used = record.rel_gap_used,
            max_choice_set_size = record.max_choice_set_size,
            avg_choice_set_size = record.avg_choice_set_size,
            "outer iteration converged"
        );
    }

    fn on_solve_end(&mut self, history: &[ConvergenceRecord]) {
        tracing::info!(outer_iterations = history.len(), "solve finished");
    }
}
