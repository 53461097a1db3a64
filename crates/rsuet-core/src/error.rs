//! Framework error type.
//!
//! Sub-crates may define their own error enums and convert them into
//! `RsuetError` via `From` impls, or keep them separate and wrap `RsuetError`
//! as one variant. Both patterns are acceptable; prefer whichever keeps error
//! sites clean.

use thiserror::Error;

use crate::{NodeIdx, OdIdx};

/// The top-level error type shared by every `rsuet-*` crate.
///
/// Scoped to the graph/choice-set layer's own failure modes: TNTP parsing
/// (`rsuet-io::IoError`) and solver configuration (`rsuet-solver::SolverError`)
/// own their own variants rather than overloading this enum with kinds that
/// never arise here.
#[derive(Debug, Error)]
pub enum RsuetError {
    /// No edge exists between the given tail and head node.
    #[error("no edge from {0} to {1}")]
    NoSuchEdge(NodeIdx, NodeIdx),

    /// `od(o, d)` has positive demand but Dijkstra found no path.
    #[error("OD {od} (origin {origin}) has demand but no path exists")]
    DisconnectedDemand { od: OdIdx, origin: NodeIdx },

    /// NaN or infinite value produced by flow arithmetic.
    #[error("numeric failure: {0}")]
    NumericFailure(String),

    /// Rejected at construction: negative demand, ratio < 1, etc.
    #[error("invalid input: {0}")]
    InvalidInput(String),
}

/// Shorthand result type for all `rsuet-*` crates.
pub type RsuetResult<T> = Result<T, RsuetError>;
