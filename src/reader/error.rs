//! Error types for the reading session

use thiserror::Error;

/// Failures reported back to the session by its collaborators
///
/// None of these are fatal: content errors keep the last good content on
/// screen, position load errors fall back to the start of the book, and
/// save errors are only logged.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ReaderError {
    /// The table of contents could not be fetched
    #[error("Failed to load table of contents: {0}")]
    TableOfContents(String),

    /// A chapter could not be fetched
    #[error("Failed to load chapter {}: {message}", .chapter + 1)]
    Chapter {
        /// Zero-based chapter index
        chapter: usize,
        /// Underlying failure
        message: String,
    },

    /// One of the chapters for continuous mode could not be fetched
    #[error("Failed to load book for continuous mode: {0}")]
    AllChapters(String),

    /// The saved reading position could not be fetched
    #[error("Failed to load reading position: {0}")]
    PositionLoad(String),

    /// The reading position could not be saved
    #[error("Failed to save reading position: {0}")]
    PositionSave(String),

    /// A bookmark operation failed
    #[error("Bookmark error: {0}")]
    Bookmark(String),
}

impl ReaderError {
    /// Whether this error is shown to the reader (as opposed to only logged)
    pub fn is_user_visible(&self) -> bool {
        matches!(
            self,
            ReaderError::TableOfContents(_)
                | ReaderError::Chapter { .. }
                | ReaderError::AllChapters(_)
        )
    }
}
