//! Named HSV colour ranges.
//!
//! Bounds use the OpenCV convention (hue 0..180, saturation and value
//! 0..255) so ranges calibrated against client screenshots carry over
//! unchanged. Ranges are immutable and shared read-only; the catalogue below
//! covers the markers and text colours the engine recognises out of the box.

use serde::Serialize;

/// An inclusive (min, max) pair of HSV triples with a stable name.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ColourRange {
    pub name: &'static str,
    pub hsv_min: [u8; 3],
    pub hsv_max: [u8; 3],
}

impl ColourRange {
    pub const fn new(name: &'static str, hsv_min: [u8; 3], hsv_max: [u8; 3]) -> Self {
        Self {
            name,
            hsv_min,
            hsv_max,
        }
    }

    /// True if the HSV triple falls inside this range on every channel.
    pub fn contains(&self, h: u8, s: u8, v: u8) -> bool {
        h >= self.hsv_min[0]
            && h <= self.hsv_max[0]
            && s >= self.hsv_min[1]
            && s <= self.hsv_max[1]
            && v >= self.hsv_min[2]
            && v <= self.hsv_max[2]
    }
}

/// Object markers drawn over the game view by the marker overlay.
pub const PURPLE: ColourRange = ColourRange::new("Purple", [141, 160, 100], [155, 255, 255]);
pub const GREEN: ColourRange = ColourRange::new("Green", [50, 190, 100], [95, 255, 255]);
pub const CYAN: ColourRange = ColourRange::new("Cyan", [80, 180, 200], [100, 255, 255]);
pub const RED: ColourRange = ColourRange::new("Red", [0, 190, 190], [8, 255, 255]);

/// Client text colours (coordinate readout, chat, orbs).
pub const WHITE: ColourRange = ColourRange::new("White", [0, 0, 255], [0, 0, 255]);
pub const BLACK: ColourRange = ColourRange::new("Black", [0, 0, 0], [0, 0, 0]);
pub const CHAT_RED: ColourRange = ColourRange::new("ChatRed", [177, 229, 239], [179, 240, 240]);
pub const ORB_GREEN: ColourRange = ColourRange::new("OrbGreen", [0, 254, 254], [60, 255, 255]);

/// Mouse-over text colours; the combined mask over all of these captures the
/// whole zone regardless of which colour each word is rendered in.
pub const MOUSE_OVER_TEXT: [ColourRange; 6] = [
    ColourRange::new("TextCyan", [80, 180, 200], [100, 255, 255]),
    ColourRange::new("TextOffWhite", [0, 0, 190], [180, 30, 255]),
    ColourRange::new("TextOrange", [8, 140, 180], [22, 220, 255]),
    ColourRange::new("TextGreen", [50, 190, 100], [95, 255, 255]),
    ColourRange::new("TextYellow", [25, 130, 190], [35, 255, 255]),
    ColourRange::new("TextRed", [0, 190, 190], [8, 255, 255]),
];

const CATALOGUE: [&ColourRange; 8] = [
    &PURPLE, &GREEN, &CYAN, &RED, &WHITE, &BLACK, &CHAT_RED, &ORB_GREEN,
];

/// Looks up a catalogue colour by its stable name.
pub fn by_name(name: &str) -> Option<&'static ColourRange> {
    CATALOGUE.iter().copied().find(|c| c.name == name)
}
