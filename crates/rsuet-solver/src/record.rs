//! Convergence record and the solver's terminal outcome.

/// One row of the append-only convergence history: the state of the outer
/// loop at the end of one outer iteration's inner loop.
#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ConvergenceRecord {
    pub outer_iter: u32,
    pub inner_iter: u32,
    pub rel_gap_used: f64,
    pub max_choice_set_size: usize,
    pub avg_choice_set_size: f64,
}

/// How the outer loop terminated.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SolveStatus {
    /// `relGapUsed < epsilon` before `outerMax` was reached.
    Converged,
    /// `outerMax` was reached with `relGapUsed >= epsilon`. Not a failure:
    /// flows and probabilities are still valid and are returned as-is.
    NonConvergence,
}

/// The result of a full solve: how it ended, plus the full iteration
/// history for diagnostics.
#[derive(Clone, Debug)]
pub struct SolveOutcome {
    pub status: SolveStatus,
    pub history: Vec<ConvergenceRecord>,
}

impl SolveOutcome {
    pub fn last_record(&self) -> Option<&ConvergenceRecord> {
        self.history.last()
    }
}
