//! Strongly typed, zero-cost identifier wrappers.
//!
//! All IDs are `Copy + Ord + Hash` so they can be used as map keys and sorted
//! collection elements without ceremony.  The inner integer is `pub` to allow
//! direct indexing into `Vec`s via `id.0 as usize`, but callers should prefer
//! the `.index()` helpers for clarity.
//!
//! Every id in this crate is backed by `u32`: none of node, edge, OD, or path
//! counts in a traffic network approach four billion, so there is no need for
//! the per-type width the inner integer type would otherwise have to carry.

use std::fmt;

/// Declare one or more `u32`-backed id newtypes in a single expansion.
///
/// Unlike a one-struct-per-invocation macro, this takes a comma-separated
/// batch so the full set of ids in this module is one macro call instead of
/// four.
macro_rules! ids {
    ($($doc:literal $name:ident),+ $(,)?) => {
        $(
            #[doc = $doc]
            #[derive(Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Debug)]
            #[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
            pub struct $name(pub u32);

            impl $name {
                /// Sentinel meaning "no valid index".
                pub const INVALID: Self = Self(u32::MAX);

                /// Build from a collection length or loop counter, truncating
                /// silently the same way `len() as u32` already does at every
                /// id-construction site in this workspace.
                #[inline(always)]
                pub fn from_index(n: usize) -> Self {
                    Self(n as u32)
                }

                /// Cast to `usize` for direct use as a `Vec` index.
                #[inline(always)]
                pub fn index(self) -> usize {
                    self.0 as usize
                }

                /// `true` unless this is the `INVALID` sentinel.
                #[inline(always)]
                pub fn is_valid(self) -> bool {
                    self.0 != u32::MAX
                }
            }

            impl Default for $name {
                /// Returns the `INVALID` sentinel so uninitialized ids are visibly invalid.
                #[inline(always)]
                fn default() -> Self {
                    Self::INVALID
                }
            }

            impl fmt::Display for $name {
                fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                    write!(f, "{}({})", stringify!($name), self.0)
                }
            }

            impl From<$name> for usize {
                #[inline(always)]
                fn from(id: $name) -> usize {
                    id.0 as usize
                }
            }

            impl TryFrom<usize> for $name {
                type Error = std::num::TryFromIntError;
                fn try_from(n: usize) -> Result<$name, Self::Error> {
                    u32::try_from(n).map($name)
                }
            }
        )+
    };
}

ids! {
    "Index of a node in the graph store (1..N in TNTP files, 0-based internally)." NodeIdx,
    "Index of a directed edge in the graph store. Assigned in file order." EdgeIdx,
    "Index of an origin-destination pair in the network's OD table." OdIdx,
    "Index of a path within an OD's restricted choice set." PathIdx,
}
