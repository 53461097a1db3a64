//! Error type for TNTP loading and CSV reporting.

use thiserror::Error;

use rsuet_core::RsuetError;

/// Errors that can occur reading TNTP input or writing the CSV report set.
#[derive(Debug, Error)]
pub enum IoError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    /// Missing required file, malformed header, or malformed row in a TNTP
    /// network/trip file.
    #[error("network read error: {0}")]
    NetworkRead(String),

    /// A parsed row was rejected while building the graph, e.g. negative
    /// demand after `demand_scale` is applied.
    #[error(transparent)]
    Graph(#[from] RsuetError),
}

/// Alias for `Result<T, IoError>`.
pub type IoResult<T> = Result<T, IoError>;
