//! Capture boundary and screen layout.
//!
//! The engine never captures pixels itself; it consumes a [`ScreenSource`]
//! that the host wires to whatever capture plumbing is in use. Window bounds
//! are re-queried on every use because the client window may move between
//! cycles.

use ochre_core::{Point, Rect};
use ochre_cv::Frame;

/// Provider of raw pixel captures for the client window.
pub trait ScreenSource: Send + Sync {
    /// The client area's current position and size in screen coordinates.
    fn window_bounds(&self) -> Rect;

    /// Captures the given screen-space rectangle.
    fn capture_rect(&self, rect: Rect) -> anyhow::Result<Frame>;

    /// Captures the whole client area.
    fn capture_window(&self) -> anyhow::Result<Frame> {
        self.capture_rect(self.window_bounds())
    }
}

/// Screen-space point -> window-local point.
pub fn to_client_point(window: Rect, p: Point) -> Point {
    Point::new(p.x - window.x, p.y - window.y)
}

/// Screen-space rect -> window-local rect.
pub fn to_client_rect(window: Rect, r: Rect) -> Rect {
    Rect::new(r.x - window.x, r.y - window.y, r.width, r.height)
}

/// Named screen regions, positioned relative to the current window bounds.
///
/// Offsets assume the fixed-size classic client layout with the coordinate
/// and compass overlays enabled and the minimap at default zoom. Build a
/// fresh `Zones` from `window_bounds()` at every use; holding one across
/// cycles would pin a stale window position.
#[derive(Debug, Clone, Copy)]
pub struct Zones {
    window: Rect,
}

impl Zones {
    pub fn new(window: Rect) -> Self {
        Self { window }
    }

    fn at(&self, x: i32, y: i32, w: i32, h: i32) -> Rect {
        Rect::new(self.window.x + x, self.window.y + y, w, h)
    }

    /// The 3D viewport where world objects and markers are drawn.
    pub fn game_view(&self) -> Rect {
        self.at(4, 4, 512, 334)
    }

    /// Overlay line showing the player's tile as `x,y,plane`.
    pub fn coordinate_readout(&self) -> Rect {
        self.at(8, 26, 120, 15)
    }

    /// Overlay line showing the camera yaw in degrees.
    pub fn compass_readout(&self) -> Rect {
        self.at(8, 42, 60, 15)
    }

    /// The circular minimap.
    pub fn minimap(&self) -> Rect {
        self.at(570, 9, 146, 151)
    }

    /// The 4x4 square at the minimap's centre where the player marker sits.
    pub fn player_marker(&self) -> Rect {
        let minimap = self.minimap();
        Rect::new(
            minimap.x + minimap.width / 2 - 2,
            minimap.y + minimap.height / 2 - 2,
            4,
            4,
        )
    }

    /// Top-left text naming whatever the cursor hovers over.
    pub fn mouse_over(&self) -> Rect {
        self.at(6, 6, 250, 16)
    }

    /// The most recent chatbox line.
    pub fn latest_chat_line(&self) -> Rect {
        self.at(10, 445, 480, 14)
    }

    pub fn hp_orb_text(&self) -> Rect {
        self.at(526, 57, 22, 13)
    }

    pub fn prayer_orb_text(&self) -> Rect {
        self.at(526, 91, 22, 13)
    }

    pub fn run_orb_text(&self) -> Rect {
        self.at(536, 123, 22, 13)
    }

    pub fn spec_orb_text(&self) -> Rect {
        self.at(546, 155, 22, 13)
    }

    /// The permanent XP counter beside the minimap.
    pub fn total_xp(&self) -> Rect {
        self.at(465, 8, 100, 15)
    }

    /// One of the 28 inventory slots, numbered row-major: slot 0 is the
    /// top-left of the 4x7 grid, slot 27 the bottom-right. The clickable
    /// rect is inset from the cell pitch so edge clicks cannot spill into a
    /// neighbouring slot.
    pub fn inventory_slot(&self, index: usize) -> Option<Rect> {
        if index >= 28 {
            return None;
        }
        let (col, row) = ((index % 4) as i32, (index / 4) as i32);
        Some(self.at(566 + col * 42, 213 + row * 36, 34, 30))
    }

    /// All 28 inventory slots in row-major order.
    pub fn inventory_slots(&self) -> Vec<Rect> {
        (0..28).map(|i| self.inventory_slot(i).unwrap()).collect()
    }
}
