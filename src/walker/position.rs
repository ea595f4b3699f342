//! Player position and camera heading.
//!
//! The client renders the player's tile and the camera yaw as plain text
//! overlays; reading them is a glyph-extraction pass over the fixed readout
//! zones. The seam is a trait so walk logic can be exercised against
//! scripted positions.

use std::sync::Arc;

use ochre_core::{Tile, colour};
use ochre_cv::ocr::{FontCache, extract_text};
use ochre_cv::segment::colour_mask;

use crate::error::{Error, Result};
use crate::screen::{ScreenSource, Zones};

/// Where the walker learns where the player is and which way the camera
/// points.
pub trait PositionSource: Send + Sync {
    /// The player's current tile.
    fn position(&self) -> Result<Tile>;

    /// Camera yaw in degrees, clockwise from north. Best-effort: an
    /// unreadable heading is 0 (north), not a failure.
    fn heading_degrees(&self) -> f64;
}

/// Reads position and heading from the on-screen overlays.
pub struct OcrPositionReader<S> {
    screen: Arc<S>,
    fonts: Arc<FontCache>,
    font: &'static str,
}

impl<S: ScreenSource> OcrPositionReader<S> {
    pub fn new(screen: Arc<S>, fonts: Arc<FontCache>) -> Self {
        Self {
            screen,
            fonts,
            font: "Plain 12",
        }
    }

    fn read_zone(&self, zone: ochre_core::Rect) -> Result<String> {
        let frame = self.screen.capture_rect(zone)?;
        let glyphs = self.fonts.get(self.font)?;
        let mask = colour_mask(&frame, &colour::WHITE);
        Ok(extract_text(&mask, &glyphs))
    }
}

impl<S: ScreenSource> PositionSource for OcrPositionReader<S> {
    fn position(&self) -> Result<Tile> {
        let zone = Zones::new(self.screen.window_bounds()).coordinate_readout();
        let text = self.read_zone(zone)?;
        parse_tile(&text).ok_or(Error::Readout {
            what: "position",
            text,
        })
    }

    fn heading_degrees(&self) -> f64 {
        let zone = Zones::new(self.screen.window_bounds()).compass_readout();
        match self.read_zone(zone) {
            Ok(text) => match text.parse::<f64>() {
                Ok(degrees) => degrees,
                Err(_) => {
                    log::warn!("unreadable compass readout `{text}`, assuming north");
                    0.0
                }
            },
            Err(e) => {
                log::warn!("compass read failed ({e}), assuming north");
                0.0
            }
        }
    }
}

/// Parses the `x,y,plane` coordinate readout.
pub fn parse_tile(text: &str) -> Option<Tile> {
    let mut parts = text.split(',');
    let x = parts.next()?.trim().parse().ok()?;
    let y = parts.next()?.trim().parse().ok()?;
    let plane = parts.next()?.trim().parse().ok()?;
    if parts.next().is_some() {
        return None;
    }
    Some(Tile::new(x, y, plane))
}
