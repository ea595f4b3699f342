//! Engine error taxonomy.
//!
//! Transient perception misses never appear here — they are `None`/`false`
//! results. Errors are reserved for cooperative cancellation, configuration
//! mistakes, unparseable client readouts and a path provider that ran out of
//! retries.

use thiserror::Error;

use crate::walker::provider::ProviderError;

#[derive(Debug, Error)]
pub enum Error {
    /// The global stop signal was observed during a wait. Not an application
    /// error: every pending loop unwinds promptly and quietly.
    #[error("stop requested")]
    Stopped,

    #[error(transparent)]
    Cv(#[from] ochre_cv::CvError),

    /// Path provider failure that survived the retry loop. Fatal to the
    /// walk: no path means the walker cannot proceed at all.
    #[error(transparent)]
    Provider(#[from] ProviderError),

    /// An on-screen readout that OCR'd into something unparseable.
    #[error("could not parse {what} readout `{text}`")]
    Readout { what: &'static str, text: String },

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl Error {
    /// True for the cancellation signal, which callers treat differently
    /// from real failures.
    pub fn is_stopped(&self) -> bool {
        matches!(self, Error::Stopped)
    }
}

pub type Result<T> = std::result::Result<T, Error>;
