//! Alpha-aware template matching.
//!
//! Locates a reference image inside a captured frame with normalized squared
//! difference, weighted by the template's alpha channel so transparent
//! template pixels never contribute. Lower scores are better; a score of
//! zero is a pixel-perfect match over the opaque region.

use std::path::Path;

use image::RgbaImage;
use ochre_core::Rect;
use serde::Serialize;

use crate::error::CvError;
use crate::frame::Frame;

/// A named template with its alpha channel intact.
#[derive(Debug, Clone)]
pub struct Template {
    pub name: String,
    pub image: RgbaImage,
}

impl Template {
    pub fn from_image(name: impl Into<String>, image: RgbaImage) -> Self {
        Self {
            name: name.into(),
            image,
        }
    }

    /// Loads a template from disk, preserving transparency. A missing or
    /// unreadable file is a configuration error.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, CvError> {
        let path = path.as_ref();
        let image = image::open(path)
            .map_err(|source| CvError::AssetLoad {
                path: path.to_path_buf(),
                source,
            })?
            .to_rgba8();
        let name = path
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_default();
        Ok(Self { name, image })
    }

    pub fn width(&self) -> u32 {
        self.image.width()
    }

    pub fn height(&self) -> u32 {
        self.image.height()
    }
}

/// A successful match: where the template landed in screen space and how
/// strongly it matched (lower = better).
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct MatchResult {
    pub bounds: Rect,
    pub score: f64,
}

/// Searches `frame` for `template` and returns the best match if its
/// normalized squared-difference score is at or below `threshold`.
///
/// Fails with [`CvError::TemplateLargerThanFrame`] when the template exceeds
/// the frame in either dimension; that is a caller configuration error, not
/// a condition to retry.
pub fn match_template(
    template: &Template,
    frame: &Frame,
    threshold: f64,
) -> Result<Option<MatchResult>, CvError> {
    let (tw, th) = (template.width(), template.height());
    let (fw, fh) = (frame.width(), frame.height());
    if tw > fw || th > fh {
        return Err(CvError::TemplateLargerThanFrame {
            template_width: tw,
            template_height: th,
            frame_width: fw,
            frame_height: fh,
        });
    }

    // Weighted template norm is constant across placements.
    let tpl = &template.image;
    let mut tpl_norm = 0.0f64;
    for px in tpl.pixels() {
        let w = px[3] as f64 / 255.0;
        let w2 = w * w;
        for c in 0..3 {
            let t = px[c] as f64;
            tpl_norm += w2 * t * t;
        }
    }

    let base = frame.image();
    let mut best_score = f64::INFINITY;
    let mut best_pos = (0u32, 0u32);

    for oy in 0..=(fh - th) {
        for ox in 0..=(fw - tw) {
            let mut diff = 0.0f64;
            let mut base_norm = 0.0f64;
            for ty in 0..th {
                for tx in 0..tw {
                    let tp = tpl.get_pixel(tx, ty);
                    let w = tp[3] as f64 / 255.0;
                    if w == 0.0 {
                        continue;
                    }
                    let w2 = w * w;
                    let bp = base.get_pixel(ox + tx, oy + ty);
                    for c in 0..3 {
                        let t = tp[c] as f64;
                        let b = bp[c] as f64;
                        let d = t - b;
                        diff += w2 * d * d;
                        base_norm += w2 * b * b;
                    }
                }
            }
            let denom = (tpl_norm * base_norm).sqrt();
            let score = if denom > 0.0 { diff / denom } else { 1.0 };
            if score < best_score {
                best_score = score;
                best_pos = (ox, oy);
            }
        }
    }

    if best_score > threshold {
        log::warn!(
            "no match for `{}`: best score {:.4} above threshold {:.4}",
            template.name,
            best_score,
            threshold
        );
        return Ok(None);
    }

    let origin = frame.region().origin();
    Ok(Some(MatchResult {
        bounds: Rect::new(
            origin.x + best_pos.0 as i32,
            origin.y + best_pos.1 as i32,
            tw as i32,
            th as i32,
        ),
        score: best_score,
    }))
}
