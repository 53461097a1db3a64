//! `rsuet-core` — foundational types for the `rsuet` traffic-assignment framework.
//!
//! This crate is a dependency of every other `rsuet-*` crate.  It intentionally
//! has no `rsuet-*` dependencies and a minimal external one (`thiserror`, plus
//! optional `serde`).
//!
//! # What lives here
//!
//! | Module   | Contents                                                 |
//! |----------|-----------------------------------------------------------|
//! | [`ids`]  | `NodeIdx`, `EdgeIdx`, `OdIdx`, `PathIdx`                   |
//! | [`geo`]  | `Point`, planar node coordinates                           |
//! | [`error`]| `RsuetError`, `RsuetResult`                                |
//!
//! # Feature flags
//!
//! | Flag    | Effect                                                     |
//! |---------|-------------------------------------------------------------|
//! | `serde` | Adds `Serialize`/`Deserialize` to all public types.        |

pub mod error;
pub mod geo;
pub mod ids;

#[cfg(test)]
mod tests;

// ── Re-exports ────────────────────────────────────────────────────────────────

pub use error::{RsuetError, RsuetResult};
pub use geo::Point;
pub use ids::{EdgeIdx, NodeIdx, OdIdx, PathIdx};
