//! Wire types for the webby server API

use serde::{Deserialize, Serialize};

use crate::reader::{Chapter, SavedPosition};

/// A book in the server library
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Book {
    pub id: String,
    pub title: String,
    #[serde(default)]
    pub author: String,
    #[serde(default)]
    pub series: Option<String>,
    #[serde(default)]
    pub series_index: Option<f64>,
    #[serde(default)]
    pub file_format: Option<String>,
}

/// Response of `GET /api/books`
#[derive(Debug, Clone, Deserialize)]
pub struct BooksResponse {
    #[serde(default)]
    pub books: Vec<Book>,
    #[serde(default)]
    pub total: usize,
}

/// One entry of a table of contents as sent by the server
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct TocEntry {
    pub index: usize,
    #[serde(default)]
    pub id: String,
    #[serde(default)]
    pub href: String,
    #[serde(default)]
    pub title: String,
}

impl From<TocEntry> for Chapter {
    fn from(entry: TocEntry) -> Self {
        Self { index: entry.index, id: entry.id, title: entry.title }
    }
}

/// Response of `GET /api/books/{id}/toc`
#[derive(Debug, Clone, Deserialize)]
pub struct TocResponse {
    #[serde(default)]
    pub chapters: Vec<TocEntry>,
}

/// Response of `GET /api/books/{id}/text/{chapter}`
#[derive(Debug, Clone, Deserialize)]
pub struct ChapterContent {
    #[serde(default)]
    pub chapter: usize,
    pub content: String,
}

/// Reading position as stored by the server.
///
/// The server keeps the chapter as a string.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReadingPosition {
    pub chapter: String,
    pub position: f64,
}

impl ReadingPosition {
    /// Convert to a saved position. `None` if the chapter is not a number.
    pub fn to_saved(&self) -> Option<SavedPosition> {
        let chapter = self.chapter.trim().parse().ok()?;
        let fraction = if self.position.is_finite() { self.position.clamp(0.0, 1.0) } else { 0.0 };
        Some(SavedPosition { chapter, fraction })
    }
}

impl From<SavedPosition> for ReadingPosition {
    fn from(position: SavedPosition) -> Self {
        Self { chapter: position.chapter.to_string(), position: position.fraction }
    }
}

/// Response of `GET /api/books/{id}/position`
#[derive(Debug, Clone, Deserialize)]
pub struct PositionResponse {
    pub position: Option<ReadingPosition>,
}

/// Error body returned with failing status codes
#[derive(Debug, Clone, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn toc_entries_become_chapters() {
        let toc: TocResponse = serde_json::from_str(
            r#"{"chapters":[{"index":0,"id":"c1","href":"c1.xhtml","title":"Start"}]}"#,
        )
        .unwrap();
        let chapters: Vec<Chapter> = toc.chapters.into_iter().map(Chapter::from).collect();
        assert_eq!(chapters, vec![Chapter { index: 0, id: "c1".into(), title: "Start".into() }]);
    }

    #[test]
    fn null_position_is_absent() {
        let resp: PositionResponse = serde_json::from_str(r#"{"position":null}"#).unwrap();
        assert!(resp.position.is_none());
    }

    #[test]
    fn position_chapter_is_parsed() {
        let resp: PositionResponse =
            serde_json::from_str(r#"{"position":{"chapter":"4","position":0.5}}"#).unwrap();
        let saved = resp.position.and_then(|p| p.to_saved());
        assert_eq!(saved, Some(SavedPosition { chapter: 4, fraction: 0.5 }));
    }

    #[test]
    fn non_numeric_chapter_is_ignored() {
        let pos = ReadingPosition { chapter: "intro".into(), position: 0.2 };
        assert_eq!(pos.to_saved(), None);
    }

    #[test]
    fn saved_position_serializes_chapter_as_string() {
        let body = ReadingPosition::from(SavedPosition { chapter: 3, fraction: 0.25 });
        assert_eq!(serde_json::to_string(&body).unwrap(), r#"{"chapter":"3","position":0.25}"#);
    }
}
