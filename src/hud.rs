//! HUD readouts.
//!
//! Orb values (hitpoints, prayer, run energy, special attack), the
//! permanent XP counter and the mouse-over text are all small fixed zones of
//! client-rendered text, read with the same glyph extraction the walker
//! uses for coordinates. An empty orb reading is -1, mirroring how callers
//! treat "orb not visible".

use std::sync::Arc;

use ochre_core::{Rect, colour};
use ochre_cv::ocr::{FontCache, extract_text};
use ochre_cv::segment::{colour_mask, combined_mask};

use crate::error::{Error, Result};
use crate::screen::{ScreenSource, Zones};

const ORB_FONT: &str = "Plain 11";
const XP_FONT: &str = "Plain 12";
const MOUSE_OVER_FONT: &str = "Bold 12";

pub struct Hud<S> {
    screen: Arc<S>,
    fonts: Arc<FontCache>,
}

impl<S: ScreenSource> Hud<S> {
    pub fn new(screen: Arc<S>, fonts: Arc<FontCache>) -> Self {
        Self { screen, fonts }
    }

    pub fn hitpoints(&self) -> Result<i32> {
        self.orb_value(Zones::new(self.screen.window_bounds()).hp_orb_text(), "hp")
    }

    pub fn prayer(&self) -> Result<i32> {
        self.orb_value(
            Zones::new(self.screen.window_bounds()).prayer_orb_text(),
            "prayer",
        )
    }

    pub fn run_energy(&self) -> Result<i32> {
        self.orb_value(
            Zones::new(self.screen.window_bounds()).run_orb_text(),
            "run energy",
        )
    }

    pub fn special_attack(&self) -> Result<i32> {
        self.orb_value(
            Zones::new(self.screen.window_bounds()).spec_orb_text(),
            "special attack",
        )
    }

    /// The total XP counter beside the minimap. Thousands separators are
    /// stripped before parsing.
    pub fn total_xp(&self) -> Result<i64> {
        let zone = Zones::new(self.screen.window_bounds()).total_xp();
        let frame = self.screen.capture_rect(zone)?;
        let glyphs = self.fonts.get(XP_FONT)?;
        let text = extract_text(&colour_mask(&frame, &colour::WHITE), &glyphs);
        let digits = text.replace(',', "");
        digits.parse().map_err(|_| Error::Readout {
            what: "total xp",
            text,
        })
    }

    /// The text naming whatever the cursor currently hovers over, collated
    /// across all the colours the zone renders in. No spaces.
    pub fn mouse_over_text(&self) -> Result<String> {
        let zone = Zones::new(self.screen.window_bounds()).mouse_over();
        let frame = self.screen.capture_rect(zone)?;
        let glyphs = self.fonts.get(MOUSE_OVER_FONT)?;
        let mask = combined_mask(&frame, &colour::MOUSE_OVER_TEXT);
        Ok(extract_text(&mask, &glyphs))
    }

    fn orb_value(&self, zone: Rect, what: &'static str) -> Result<i32> {
        let frame = self.screen.capture_rect(zone)?;
        let glyphs = self.fonts.get(ORB_FONT)?;
        let text = extract_text(&colour_mask(&frame, &colour::ORB_GREEN), &glyphs);
        if text.is_empty() {
            return Ok(-1);
        }
        text.parse().map_err(|_| Error::Readout { what, text })
    }
}
