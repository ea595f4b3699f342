//! Typed vision errors.
//!
//! Everything here is a configuration error: wrong asset, wrong geometry,
//! wrong call. Transient perception misses are not errors — they surface as
//! empty results from the individual operations.

use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum CvError {
    /// The template exceeds the searched frame in at least one dimension.
    /// A caller configuration error, never a runtime condition to retry.
    #[error("template is {template_width}x{template_height} but frame is only {frame_width}x{frame_height}")]
    TemplateLargerThanFrame {
        template_width: u32,
        template_height: u32,
        frame_width: u32,
        frame_height: u32,
    },

    #[error("failed to load image asset {path}")]
    AssetLoad {
        path: PathBuf,
        #[source]
        source: image::ImageError,
    },

    #[error("failed to read font index {path}")]
    FontIndex {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("font `{font}` contains no usable glyphs")]
    EmptyFont { font: String },

    /// An OCR zone that does not fit inside the window it is rendered into.
    #[error("zone {zone:?} lies outside window {window:?}")]
    ZoneOutsideWindow {
        zone: ochre_core::Rect,
        window: ochre_core::Rect,
    },
}
