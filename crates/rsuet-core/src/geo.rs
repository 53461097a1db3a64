//! Planar node coordinates.
//!
//! TNTP `*_node` files carry `(x, y)` pairs in an arbitrary planar projection
//! — not geographic lat/lon. They are not used in any cost computation; the
//! solver is indifferent to whether a network has coordinates at all. They
//! exist purely so that external drawing tools (out of scope for this crate)
//! have something to plot against.

/// A planar coordinate pair, `f64` to match the TNTP file's decimal fields
/// without truncation.
#[derive(Copy, Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    #[inline]
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    /// Origin, used when a network has no `*_node` file.
    pub const ORIGIN: Point = Point { x: 0.0, y: 0.0 };

    /// Euclidean distance. Diagnostic only — never used by the solver.
    pub fn distance(self, other: Point) -> f64 {
        let dx = self.x - other.x;
        let dy = self.y - other.y;
        (dx * dx + dy * dy).sqrt()
    }
}

impl Default for Point {
    fn default() -> Self {
        Self::ORIGIN
    }
}

impl std::fmt::Display for Point {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "({:.3}, {:.3})", self.x, self.y)
    }
}
