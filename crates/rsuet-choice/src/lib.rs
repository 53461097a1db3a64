//! `rsuet-choice` — path-level choice sets, random utility models, and
//! threshold pruning.
//!
//! # Crate layout
//!
//! | Module        | Contents                                                      |
//! |---------------|----------------------------------------------------------------|
//! | [`path`]      | `Path`                                                          |
//! | [`rum`]       | `RandomUtilityModel`, `ReferenceCost`                           |
//! | [`choice_set`]| `ChoiceSetManager`, `generate_universal_choice_set`             |
//!
//! # Feature flags
//!
//! | Flag    | Effect                                                       |
//! |---------|--------------------------------------------------------------|
//! | `serde` | Derives `Serialize`/`Deserialize` on public types.           |

pub mod choice_set;
pub mod path;
pub mod rum;

pub use choice_set::{generate_universal_choice_set, ChoiceSetManager};
pub use path::Path;
pub use rum::{RandomUtilityModel, ReferenceCost};
