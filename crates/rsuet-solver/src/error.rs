use thiserror::Error;

use rsuet_core::RsuetError;

/// Errors that can abort a solve before it produces an outcome.
///
/// `NonConvergence` is deliberately absent here — per the spec it is a
/// terminal but non-fatal outcome, represented by
/// [`SolveStatus::NonConvergence`][crate::SolveStatus::NonConvergence]
/// rather than by this error type.
#[derive(Debug, Error)]
pub enum SolverError {
    #[error("solver configuration error: {0}")]
    Config(String),

    #[error(transparent)]
    Core(#[from] RsuetError),
}

pub type SolverResult<T> = Result<T, SolverError>;
