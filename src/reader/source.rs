//! Collaborators the reading session depends on
//!
//! The session never calls these directly. It returns [`Effect`]s and the
//! host executes them against implementations of these traits, feeding the
//! results back as messages.
//!
//! [`Effect`]: super::Effect

use std::future::Future;

use anyhow::Result;
use serde::{Deserialize, Serialize};

/// The document being read
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Document {
    /// Opaque identifier understood by the content source
    pub id: String,
    /// Display title
    pub title: String,
}

impl Document {
    pub fn new(id: impl Into<String>, title: impl Into<String>) -> Self {
        Self { id: id.into(), title: title.into() }
    }
}

/// One entry of a document's table of contents
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Chapter {
    /// Zero-based position in reading order
    pub index: usize,
    /// Source identifier of the chapter
    #[serde(default)]
    pub id: String,
    /// Chapter title (may be empty)
    #[serde(default)]
    pub title: String,
}

/// A persisted reading position
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SavedPosition {
    /// Chapter index
    pub chapter: usize,
    /// Offset within the chapter, `0.0..=1.0`
    pub fraction: f64,
}

/// A saved bookmark
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Bookmark {
    /// Unique bookmark id
    pub id: String,
    /// Document the bookmark belongs to
    pub book_id: String,
    /// Document title at the time the bookmark was made
    #[serde(default)]
    pub book_title: String,
    /// Chapter index
    pub chapter: usize,
    /// Chapter title at the time the bookmark was made
    #[serde(default)]
    pub chapter_title: String,
    /// Offset within the chapter, `0.0..=1.0`
    pub position: f64,
    /// Optional user label
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub note: String,
    /// Unix timestamp of creation
    #[serde(default)]
    pub created_at: i64,
}

/// Fields needed to create a bookmark; the store assigns id and timestamp
#[derive(Debug, Clone, PartialEq)]
pub struct NewBookmark {
    pub book_id: String,
    pub book_title: String,
    pub chapter: usize,
    pub chapter_title: String,
    pub position: f64,
    pub note: String,
}

/// Supplies chapter lists and chapter text
pub trait ContentSource: Send + Sync + 'static {
    /// Ordered chapter list for a document
    fn table_of_contents(
        &self,
        document_id: &str,
    ) -> impl Future<Output = Result<Vec<Chapter>>> + Send;

    /// Plain text of one chapter
    fn chapter_text(
        &self,
        document_id: &str,
        chapter: usize,
    ) -> impl Future<Output = Result<String>> + Send;
}

/// Persists one reading position per document
pub trait PositionStore: Send + Sync + 'static {
    /// Saved position, or `None` if the document was never opened
    fn load_position(
        &self,
        document_id: &str,
    ) -> impl Future<Output = Result<Option<SavedPosition>>> + Send;

    fn save_position(
        &self,
        document_id: &str,
        position: SavedPosition,
    ) -> impl Future<Output = Result<()>> + Send;
}

/// Persists bookmarks
pub trait BookmarkStore {
    /// Bookmarks for one document, oldest first
    fn list(&self, document_id: &str) -> Result<Vec<Bookmark>>;

    /// Store a bookmark and return its id
    fn add(&mut self, bookmark: NewBookmark) -> Result<String>;

    fn delete(&mut self, id: &str) -> Result<()>;
}
