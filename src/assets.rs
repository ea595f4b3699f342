//! Bundled reference assets.
//!
//! Colour ranges, font glyph sets and template sprites live in a static
//! asset directory and are addressed by string key. A missing or unreadable
//! asset is a configuration error and propagates immediately — these loads
//! are never retried.

use std::path::PathBuf;

use anyhow::Context;
use ochre_core::{ColourRange, colour};
use ochre_cv::{CvError, FontCache, Template};

/// Root handle over the asset directory: `images/` for template sprites and
/// `fonts/` for glyph sets. Owns the shared font cache.
#[derive(Debug)]
pub struct AssetStore {
    root: PathBuf,
    fonts: FontCache,
}

impl AssetStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        let root = root.into();
        let fonts = FontCache::new(root.join("fonts"));
        Self { root, fonts }
    }

    /// The lazily-populated font cache, shared by every text-reading
    /// component.
    pub fn fonts(&self) -> &FontCache {
        &self.fonts
    }

    /// Loads a template sprite by its path key, e.g.
    /// `"mouse_clicks/red_1.png"`.
    pub fn template(&self, key: &str) -> Result<Template, CvError> {
        Template::load(self.root.join("images").join(key))
    }

    /// Loads several sprites at once, failing on the first missing one.
    pub fn templates(&self, keys: &[&str]) -> Result<Vec<Template>, CvError> {
        keys.iter().map(|k| self.template(k)).collect()
    }

    /// Looks up a named colour range from the static catalogue.
    pub fn colour(&self, name: &str) -> anyhow::Result<&'static ColourRange> {
        colour::by_name(name).with_context(|| format!("unknown colour range `{name}`"))
    }
}
