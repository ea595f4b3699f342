//! Ochre core types
//!
//! Dependency-light value types shared by the vision layer and the engine:
//! screen-space geometry, world tiles and named HSV colour ranges.

pub mod colour;
pub mod geometry;
pub mod tile;

pub use colour::ColourRange;
pub use geometry::{Point, Rect};
pub use tile::Tile;
