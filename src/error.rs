//! Error types for extraction and preference storage.

use thiserror::Error;

/// Why a matched notification could not be decoded into a reading.
///
/// These never leave the extractor: the pipeline treats every variant as a
/// silent extraction failure and only logs it.
#[derive(Debug, Error, PartialEq)]
pub enum ExtractError {
    /// Neither the expanded nor the collapsed content view is present.
    #[error("notification has no content view")]
    MissingContentView,

    /// The view uses an instruction layout the decoder does not understand.
    #[error("unsupported instruction schema {found} (decoder expects {expected})")]
    UnsupportedSchema { found: u32, expected: u32 },

    /// A text-set instruction did not carry a character sequence.
    #[error("setText on view {view_id} has no character sequence parameter")]
    MissingText { view_id: i32 },

    /// The concatenated text is not of the form `<number> <unit>`.
    #[error("text {0:?} does not look like a reading")]
    PatternMismatch(String),

    /// The numeric part could not be parsed.
    #[error("invalid number {0:?}")]
    InvalidNumber(String),
}

/// Errors from the persisted preference store.
#[derive(Debug, Error)]
pub enum PrefsError {
    #[error("preference file I/O failed: {0}")]
    Io(#[from] std::io::Error),

    #[error("failed to parse preferences: {0}")]
    Parse(#[from] serde_json::Error),
}
