//! `rsuet-solver` — the RSUET outer/inner driver.
//!
//! # Crate layout
//!
//! | Module       | Contents                                                   |
//! |--------------|--------------------------------------------------------------|
//! | [`solver`]   | `RsuetSolver`, the outer state machine and inner MSA loop     |
//! | [`builder`]  | `RsuetSolverBuilder`                                          |
//! | [`observer`] | `ConvergenceObserver`, `NoopObserver`                          |
//! | [`record`]   | `ConvergenceRecord`, `SolveStatus`, `SolveOutcome`              |
//! | [`error`]    | `SolverError`, `SolverResult`                                  |
//!
//! # Feature flags
//!
//! | Flag    | Effect                                                       |
//! |---------|--------------------------------------------------------------|
//! | `serde` | Derives `Serialize`/`Deserialize` on public types.           |

pub mod builder;
pub mod error;
pub mod observer;
pub mod record;
pub mod solver;

pub use builder::RsuetSolverBuilder;
pub use error::{SolverError, SolverResult};
pub use observer::{ConvergenceObserver, NoopObserver};
pub use record::{ConvergenceRecord, SolveOutcome, SolveStatus};
pub use solver::RsuetSolver;
