//! Font glyph sets and the shared glyph cache.

use std::collections::{BTreeMap, HashMap};
use std::io::BufRead;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use image::GrayImage;

use crate::error::CvError;

/// Characters worth matching. Restricting the set bounds per-extraction cost;
/// extend when a zone legitimately contains something else.
const ALLOWED_CHARS: &str =
    "abcdefghijklmnopqrstuvwxyzABCDEFGHIJKLMNOPQRSTUVWXYZ0123456789()[],&-:/*'_\"?";

/// Vertical rows trimmed off the top of every glyph bitmap to discard the
/// font's baseline padding. Varies with how each font's bitmaps were sliced.
fn crop_offset(font: &str) -> u32 {
    if font == "Plain 12" { 2 } else { 1 }
}

/// One font's glyph bitmaps, keyed by character. Iteration order is fixed
/// (character order) so extraction is deterministic.
#[derive(Debug, Clone)]
pub struct FontGlyphs {
    glyphs: BTreeMap<char, GrayImage>,
}

impl FontGlyphs {
    /// Builds a glyph set directly from images, e.g. synthetic glyphs in
    /// tests. No cropping is applied.
    pub fn from_glyphs(glyphs: BTreeMap<char, GrayImage>) -> Self {
        Self { glyphs }
    }

    /// Loads a font directory: `<dir>/<font>.index` lists one bitmap file
    /// per line, named by the decimal codepoint it depicts (`97.bmp`).
    /// Characters outside the allow-list are skipped.
    pub fn load_dir(dir: &Path, font: &str) -> Result<Self, CvError> {
        let index_path = dir.join(format!("{font}.index"));
        let file = std::fs::File::open(&index_path).map_err(|source| CvError::FontIndex {
            path: index_path.clone(),
            source,
        })?;

        let crop = crop_offset(font);
        let mut glyphs = BTreeMap::new();
        for line in std::io::BufReader::new(file).lines() {
            let line = line.map_err(|source| CvError::FontIndex {
                path: index_path.clone(),
                source,
            })?;
            let name = line.trim();
            if name.is_empty() {
                continue;
            }
            let stem = name.rsplit_once('.').map(|(s, _)| s).unwrap_or(name);
            let Some(character) = stem.parse::<u32>().ok().and_then(char::from_u32) else {
                continue;
            };
            if !ALLOWED_CHARS.contains(character) {
                continue;
            }

            let glyph_path = dir.join(name);
            let img = image::open(&glyph_path)
                .map_err(|source| CvError::AssetLoad {
                    path: glyph_path,
                    source,
                })?
                .to_luma8();
            if img.height() <= crop {
                continue;
            }
            let cropped =
                image::imageops::crop_imm(&img, 0, crop, img.width(), img.height() - crop)
                    .to_image();
            glyphs.insert(character, cropped);
        }

        if glyphs.is_empty() {
            return Err(CvError::EmptyFont {
                font: font.to_string(),
            });
        }
        Ok(Self { glyphs })
    }

    pub fn iter(&self) -> impl Iterator<Item = (&char, &GrayImage)> {
        self.glyphs.iter()
    }

    pub fn get(&self, character: char) -> Option<&GrayImage> {
        self.glyphs.get(&character)
    }

    pub fn len(&self) -> usize {
        self.glyphs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.glyphs.is_empty()
    }
}

/// Lazily-populated, append-only cache of loaded fonts.
///
/// Owned by whoever assembles the engine and passed by reference into every
/// component that reads text; fonts load from disk once and are shared
/// read-only afterwards.
#[derive(Debug)]
pub struct FontCache {
    root: PathBuf,
    fonts: Mutex<HashMap<String, Arc<FontGlyphs>>>,
}

impl FontCache {
    /// `root` is the directory holding one subdirectory per font name.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            fonts: Mutex::new(HashMap::new()),
        }
    }

    /// Returns the font's glyphs, loading them on first use.
    pub fn get(&self, font: &str) -> Result<Arc<FontGlyphs>, CvError> {
        let mut fonts = self.fonts.lock().expect("font cache poisoned");
        if let Some(glyphs) = fonts.get(font) {
            return Ok(Arc::clone(glyphs));
        }
        let glyphs = Arc::new(FontGlyphs::load_dir(&self.root.join(font), font)?);
        fonts.insert(font.to_string(), Arc::clone(&glyphs));
        Ok(glyphs)
    }

    /// Seeds the cache with an already-built glyph set (used by tests and by
    /// embedded fonts).
    pub fn insert(&self, font: &str, glyphs: FontGlyphs) {
        self.fonts
            .lock()
            .expect("font cache poisoned")
            .insert(font.to_string(), Arc::new(glyphs));
    }
}
