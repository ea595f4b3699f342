//! World tile coordinates.

use serde::{Deserialize, Serialize};

/// An integer world coordinate: column, row and plane (floor level).
///
/// Paths from the path provider are ordered lists of these; the walker
/// consumes them from the front as it advances.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Tile {
    pub x: i32,
    pub y: i32,
    pub plane: i32,
}

impl Tile {
    pub fn new(x: i32, y: i32, plane: i32) -> Self {
        Self { x, y, plane }
    }

    /// True if both axes are within `tolerance` tiles of `other`.
    /// Plane is ignored: a walk never crosses planes mid-path.
    pub fn within(&self, other: Tile, tolerance: i32) -> bool {
        (self.x - other.x).abs() <= tolerance && (self.y - other.y).abs() <= tolerance
    }

    /// True if this tile shares `other`'s x/y column and row.
    pub fn same_square(&self, other: Tile) -> bool {
        self.x == other.x && self.y == other.y
    }
}

impl std::fmt::Display for Tile {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "({}, {}, {})", self.x, self.y, self.plane)
    }
}
