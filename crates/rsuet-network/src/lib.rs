//! `rsuet-network` — directed graph store, OD table, and the shortest-path
//! engine that RSUET's outer loop drives for column generation.
//!
//! # Crate layout
//!
//! | Module      | Contents                                                    |
//! |-------------|-------------------------------------------------------------|
//! | [`graph`]   | `Graph` (CSR + OD table), `GraphBuilder`, `Edge`, `Od`       |
//! | [`heap`]    | `IndexedHeap`, an O(log n) decrease-key binary heap          |
//! | [`dijkstra`]| `DijkstraWorkspace`, `ShortestPathTree`                      |
//!
//! # Feature flags
//!
//! | Flag    | Effect                                                       |
//! |---------|--------------------------------------------------------------|
//! | `serde` | Derives `Serialize`/`Deserialize` on public types.           |

pub mod dijkstra;
pub mod graph;
pub mod heap;

pub use dijkstra::{DijkstraWorkspace, ShortestPathTree};
pub use graph::{Edge, EdgeCostModel, Graph, GraphBuilder, Od};
pub use heap::IndexedHeap;
