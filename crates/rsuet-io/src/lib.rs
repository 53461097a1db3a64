//! `rsuet-io` — TNTP network loading and the semicolon-delimited CSV report
//! set.
//!
//! # Crate layout
//!
//! | Module   | Contents                                                      |
//! |----------|----------------------------------------------------------------|
//! | [`tntp`] | `load_network` — the `*_net`/`*_node`/`*_trips.tntp` reader     |
//! | [`report`] | `ReportWriter` — `flow.csv`, `parameters.csv`, `choice-sets.csv`, `choice-set-summary.csv`, `convergence.csv` |
//! | [`error`] | `IoError`, `IoResult`                                          |

pub mod error;
pub mod report;
pub mod tntp;

pub use error::{IoError, IoResult};
pub use report::ReportWriter;
pub use tntp::load_network;
