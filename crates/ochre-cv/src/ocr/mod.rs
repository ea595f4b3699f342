//! Glyph-based text extraction.
//!
//! Reads client-rendered text by correlating each font glyph against a
//! colour-isolated binary mask of the zone. Every peak at or above the
//! acceptance threshold becomes one character occurrence; matched pixels are
//! claimed (zeroed in the correlation map and masked out of the source) so
//! neither the same glyph nor a visually-similar later glyph can re-match
//! them. Matches are assembled in (row, column) order.
//!
//! The output contains no space characters: inter-character spacing is not
//! reconstructed. Callers comparing against expected phrases must tolerate
//! this; it is intentional, not a defect.

pub mod font;

pub use font::{FontCache, FontGlyphs};

use image::{GrayImage, Luma};
use ochre_core::Rect;
use serde::Serialize;

use crate::error::CvError;

/// A glyph occurrence accepted during extraction. Coordinates are local to
/// the searched mask.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct GlyphMatch {
    pub character: char,
    pub x: i32,
    pub y: i32,
    pub width: u32,
    pub height: u32,
}

/// Correlation scores at or above this accept a glyph occurrence. The masks
/// are binary, so genuine occurrences score essentially 1.0.
const ACCEPT_THRESHOLD: f32 = 0.99;

/// Extracts text from a colour-isolated binary mask. Returns the matched
/// characters in reading order, without spaces.
pub fn extract_text(mask: &GrayImage, glyphs: &FontGlyphs) -> String {
    match_glyphs(mask, glyphs)
        .iter()
        .map(|m| m.character)
        .collect()
}

/// Runs per-glyph correlation over the mask and returns all accepted
/// occurrences sorted by (row, column).
pub fn match_glyphs(mask: &GrayImage, glyphs: &FontGlyphs) -> Vec<GlyphMatch> {
    let mut source = mask.clone();
    let mut matches = Vec::new();

    for (&character, glyph) in glyphs.iter() {
        let (gw, gh) = glyph.dimensions();
        if gw > source.width() || gh > source.height() {
            continue;
        }

        let mut corr = zncc_map(&source, glyph);
        // Take the best remaining peak until it drops below the threshold.
        // The same correlation map serves the whole glyph; claimed regions
        // are zeroed so one letter occurrence cannot re-match, and the
        // source is masked so later glyphs cannot claim the same pixels.
        while let Some((px, py, score)) = peak(&corr) {
            if score < ACCEPT_THRESHOLD {
                break;
            }
            matches.push(GlyphMatch {
                character,
                x: px as i32,
                y: py as i32,
                width: gw,
                height: gh,
            });
            zero_region(&mut corr, px, py, gw, gh);
            mask_region(&mut source, px, py, gw, gh);
        }
    }

    matches.sort_by_key(|m| (m.y, m.x));
    matches
}

/// Renders the matched glyph positions of `expected` back into a
/// full-window binary mask, for callers that need to click recognised text
/// rather than merely read it.
///
/// Returns `Ok(None)` without building anything when the extracted string
/// differs from `expected`. `zone` is where the mask was captured on screen;
/// `window` is the full capture window the output mask spans.
pub fn text_location_mask(
    mask: &GrayImage,
    glyphs: &FontGlyphs,
    expected: &str,
    zone: Rect,
    window: Rect,
) -> Result<Option<GrayImage>, CvError> {
    if !window.encloses(zone) {
        return Err(CvError::ZoneOutsideWindow { zone, window });
    }

    let matches = match_glyphs(mask, glyphs);
    let text: String = matches.iter().map(|m| m.character).collect();
    if text != expected {
        return Ok(None);
    }

    let mut out = GrayImage::new(window.width as u32, window.height as u32);
    let (off_x, off_y) = (zone.x - window.x, zone.y - window.y);
    for m in &matches {
        for dy in 0..m.height as i32 {
            for dx in 0..m.width as i32 {
                let (x, y) = (off_x + m.x + dx, off_y + m.y + dy);
                if x >= 0 && y >= 0 && (x as u32) < out.width() && (y as u32) < out.height() {
                    out.put_pixel(x as u32, y as u32, Luma([255]));
                }
            }
        }
    }
    Ok(Some(out))
}

/// Zero-mean normalized cross-correlation of `tpl` slid over `image`.
/// The result has one score per valid placement, row-major.
fn zncc_map(image: &GrayImage, tpl: &GrayImage) -> Vec<Vec<f32>> {
    let (iw, ih) = image.dimensions();
    let (tw, th) = tpl.dimensions();
    let n = (tw * th) as f64;

    let tpl_mean: f64 = tpl.pixels().map(|p| p[0] as f64).sum::<f64>() / n;
    let centred: Vec<f64> = tpl.pixels().map(|p| p[0] as f64 - tpl_mean).collect();
    let tpl_var: f64 = centred.iter().map(|t| t * t).sum();

    let out_h = (ih - th + 1) as usize;
    let out_w = (iw - tw + 1) as usize;

    let score_row = |oy: usize| -> Vec<f32> {
        let mut row = vec![0.0f32; out_w];
        for (ox, slot) in row.iter_mut().enumerate() {
            let mut sum = 0.0f64;
            for ty in 0..th {
                for tx in 0..tw {
                    sum += image.get_pixel(ox as u32 + tx, oy as u32 + ty)[0] as f64;
                }
            }
            let win_mean = sum / n;

            let mut numerator = 0.0f64;
            let mut win_var = 0.0f64;
            for ty in 0..th {
                for tx in 0..tw {
                    let i = image.get_pixel(ox as u32 + tx, oy as u32 + ty)[0] as f64 - win_mean;
                    let t = centred[(ty * tw + tx) as usize];
                    numerator += i * t;
                    win_var += i * i;
                }
            }
            let denom = (tpl_var * win_var).sqrt();
            *slot = if denom > 1e-10 {
                (numerator / denom) as f32
            } else {
                0.0
            };
        }
        row
    };

    #[cfg(feature = "parallel")]
    let rows = {
        use rayon::prelude::*;
        (0..out_h).into_par_iter().map(score_row).collect()
    };
    #[cfg(not(feature = "parallel"))]
    let rows = (0..out_h).map(score_row).collect();

    rows
}

/// Global maximum of a correlation map with its location.
fn peak(corr: &[Vec<f32>]) -> Option<(u32, u32, f32)> {
    let mut best: Option<(u32, u32, f32)> = None;
    for (y, row) in corr.iter().enumerate() {
        for (x, &score) in row.iter().enumerate() {
            if best.map(|(_, _, b)| score > b).unwrap_or(true) {
                best = Some((x as u32, y as u32, score));
            }
        }
    }
    best
}

/// Zeroes a glyph-sized region of the correlation map so an accepted
/// occurrence cannot match again.
fn zero_region(corr: &mut [Vec<f32>], x: u32, y: u32, w: u32, h: u32) {
    for row in corr.iter_mut().skip(y as usize).take(h as usize) {
        for slot in row.iter_mut().skip(x as usize).take(w as usize) {
            *slot = 0.0;
        }
    }
}

/// Blacks out claimed source pixels so later glyphs cannot re-match them.
fn mask_region(source: &mut GrayImage, x: u32, y: u32, w: u32, h: u32) {
    for dy in 0..h {
        for dx in 0..w {
            let (px, py) = (x + dx, y + dy);
            if px < source.width() && py < source.height() {
                source.put_pixel(px, py, Luma([0]));
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeMap;

    /// Builds a 5x7 glyph from a 7-line pattern of '#' and '.'.
    fn glyph(pattern: [&str; 7]) -> GrayImage {
        let mut img = GrayImage::new(5, 7);
        for (y, line) in pattern.iter().enumerate() {
            for (x, c) in line.chars().enumerate() {
                if c == '#' {
                    img.put_pixel(x as u32, y as u32, Luma([255]));
                }
            }
        }
        img
    }

    /// A small synthetic digit font with visually distinct 5x7 bitmaps.
    fn digit_font() -> FontGlyphs {
        let mut glyphs = BTreeMap::new();
        glyphs.insert(
            '0',
            glyph([".###.", "#...#", "#...#", "#...#", "#...#", "#...#", ".###."]),
        );
        glyphs.insert(
            '1',
            glyph(["..#..", ".##..", "..#..", "..#..", "..#..", "..#..", ".###."]),
        );
        glyphs.insert(
            '2',
            glyph([".###.", "#...#", "....#", "...#.", "..#..", ".#...", "#####"]),
        );
        glyphs.insert(
            '3',
            glyph(["####.", "....#", "....#", ".###.", "....#", "....#", "####."]),
        );
        glyphs.insert(
            ',',
            glyph([".....", ".....", ".....", ".....", "..##.", "..##.", ".#..."]),
        );
        FontGlyphs::from_glyphs(glyphs)
    }

    /// Stamps `text` onto a mask left to right with 2px spacing.
    fn render(text: &str, font: &FontGlyphs, width: u32, height: u32) -> GrayImage {
        let mut mask = GrayImage::new(width, height);
        let mut cursor = 2u32;
        for c in text.chars() {
            if c == ' ' {
                cursor += 4;
                continue;
            }
            let g = font.get(c).expect("glyph not in font");
            for (x, y, p) in g.enumerate_pixels() {
                if p[0] > 0 {
                    mask.put_pixel(cursor + x, 2 + y, *p);
                }
            }
            cursor += g.width() + 2;
        }
        mask
    }

    #[test]
    fn test_round_trip_reproduces_string() {
        let font = digit_font();
        let mask = render("3200", &font, 40, 12);
        assert_eq!(extract_text(&mask, &font), "3200");
    }

    #[test]
    fn test_round_trip_drops_spaces() {
        let font = digit_font();
        let mask = render("32 01", &font, 48, 12);
        assert_eq!(extract_text(&mask, &font), "3201");
    }

    #[test]
    fn test_repeated_characters_all_found() {
        let font = digit_font();
        let mask = render("000", &font, 32, 12);
        assert_eq!(extract_text(&mask, &font), "000");
    }

    #[test]
    fn test_comma_separated_readout() {
        let font = digit_font();
        let mask = render("3201,12", &font, 64, 12);
        assert_eq!(extract_text(&mask, &font), "3201,12");
    }

    #[test]
    fn test_empty_mask_extracts_nothing() {
        let font = digit_font();
        let mask = GrayImage::new(30, 12);
        assert_eq!(extract_text(&mask, &font), "");
    }

    #[test]
    fn test_location_mask_marks_glyph_rects() {
        let font = digit_font();
        let zone = Rect::new(110, 60, 40, 12);
        let window = Rect::new(100, 50, 200, 100);
        let mask = render("30", &font, 40, 12);

        let out = text_location_mask(&mask, &font, "30", zone, window)
            .unwrap()
            .expect("expected a mask");
        assert_eq!(out.dimensions(), (200, 100));
        // First glyph was stamped at (2, 2) inside the zone; the zone sits
        // at (10, 10) inside the window.
        assert_eq!(out.get_pixel(12 + 2, 12 + 1)[0], 255);
        // Far corner stays black.
        assert_eq!(out.get_pixel(190, 90)[0], 0);
    }

    #[test]
    fn test_location_mask_early_exits_on_mismatch() {
        let font = digit_font();
        let zone = Rect::new(0, 0, 40, 12);
        let window = Rect::new(0, 0, 100, 50);
        let mask = render("30", &font, 40, 12);

        let out = text_location_mask(&mask, &font, "31", zone, window).unwrap();
        assert!(out.is_none());
    }

    #[test]
    fn test_location_mask_rejects_zone_outside_window() {
        let font = digit_font();
        let mask = GrayImage::new(40, 12);
        let zone = Rect::new(90, 0, 40, 12);
        let window = Rect::new(0, 0, 100, 50);

        match text_location_mask(&mask, &font, "", zone, window) {
            Err(CvError::ZoneOutsideWindow { .. }) => {}
            other => panic!("expected zone error, got {:?}", other.map(|_| ())),
        }
    }
}
