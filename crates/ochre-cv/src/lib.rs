//! Ochre vision library
//!
//! Pixel-capture perception for the targeting engine: colour segmentation
//! into blobs, alpha-aware template matching, glyph-based text extraction and
//! human-plausible click point selection. All processing happens on plain
//! `image` buffers; frames arrive already captured and are never mutated.

pub mod error;
pub mod frame;
pub mod ocr;
pub mod point;
pub mod segment;
pub mod template;

// Re-export commonly used types
pub use error::CvError;
pub use frame::Frame;
pub use ocr::{FontCache, FontGlyphs, GlyphMatch};
pub use segment::Blob;
pub use template::{MatchResult, Template};

pub type Result<T, E = CvError> = std::result::Result<T, E>;
