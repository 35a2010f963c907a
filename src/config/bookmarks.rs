//! Local bookmark persistence

use std::path::{Path, PathBuf};
use std::time::{SystemTime, UNIX_EPOCH};

use anyhow::{Context, Result, bail};
use serde::{Deserialize, Serialize};

use super::Config;
use crate::reader::{Bookmark, BookmarkStore, NewBookmark};

/// On-disk layout of bookmarks.json
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
struct BookmarkData {
    #[serde(default)]
    bookmarks: Vec<Bookmark>,
}

/// Bookmarks for every book, kept in one JSON file
#[derive(Debug, Clone)]
pub struct BookmarkFile {
    path: PathBuf,
    data: BookmarkData,
}

impl BookmarkFile {
    /// Open the bookmark file in the data directory
    pub fn open() -> Result<Self> {
        Self::open_at(Config::data_dir()?.join("bookmarks.json"))
    }

    /// Open the bookmark file at `path`. A missing file means no bookmarks.
    pub fn open_at(path: impl Into<PathBuf>) -> Result<Self> {
        let path = path.into();
        let data = if path.exists() {
            let contents = std::fs::read_to_string(&path)
                .with_context(|| format!("Failed to read bookmarks from {:?}", path))?;
            serde_json::from_str(&contents).with_context(|| "Failed to parse bookmarks.json")?
        } else {
            BookmarkData::default()
        };

        Ok(Self { path, data })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Every stored bookmark
    pub fn all(&self) -> &[Bookmark] {
        &self.data.bookmarks
    }

    fn save(&self) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create data directory {:?}", parent))?;
        }

        let contents = serde_json::to_string_pretty(&self.data)
            .with_context(|| "Failed to serialize bookmarks")?;

        std::fs::write(&self.path, contents)
            .with_context(|| format!("Failed to write bookmarks to {:?}", self.path))?;

        Ok(())
    }

    /// Time-based id, bumped past any id already in the file
    fn next_id(&self, now: &std::time::Duration) -> String {
        let mut micros = now.as_micros();
        while self.data.bookmarks.iter().any(|b| b.id == micros.to_string()) {
            micros += 1;
        }
        micros.to_string()
    }
}

impl BookmarkStore for BookmarkFile {
    fn list(&self, document_id: &str) -> Result<Vec<Bookmark>> {
        Ok(self.data.bookmarks.iter().filter(|b| b.book_id == document_id).cloned().collect())
    }

    fn add(&mut self, bookmark: NewBookmark) -> Result<String> {
        let now = SystemTime::now().duration_since(UNIX_EPOCH).unwrap_or_default();
        let id = self.next_id(&now);

        self.data.bookmarks.push(Bookmark {
            id: id.clone(),
            book_id: bookmark.book_id,
            book_title: bookmark.book_title,
            chapter: bookmark.chapter,
            chapter_title: bookmark.chapter_title,
            position: bookmark.position.clamp(0.0, 1.0),
            note: bookmark.note,
            created_at: now.as_secs() as i64,
        });
        self.save()?;
        Ok(id)
    }

    fn delete(&mut self, id: &str) -> Result<()> {
        let before = self.data.bookmarks.len();
        self.data.bookmarks.retain(|b| b.id != id);
        if self.data.bookmarks.len() == before {
            bail!("No bookmark with id {id}");
        }
        self.save()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn new_bookmark(book_id: &str, chapter: usize) -> NewBookmark {
        NewBookmark {
            book_id: book_id.into(),
            book_title: "Title".into(),
            chapter,
            chapter_title: format!("Chapter {chapter}"),
            position: 0.25,
            note: String::new(),
        }
    }

    #[test]
    fn missing_file_is_empty() {
        let dir = tempfile::tempdir().unwrap();
        let store = BookmarkFile::open_at(dir.path().join("bookmarks.json")).unwrap();
        assert!(store.all().is_empty());
        assert!(store.list("book").unwrap().is_empty());
    }

    #[test]
    fn add_persists_and_filters_by_book() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("data").join("bookmarks.json");

        let mut store = BookmarkFile::open_at(&path).unwrap();
        let first = store.add(new_bookmark("a", 1)).unwrap();
        let second = store.add(new_bookmark("a", 2)).unwrap();
        store.add(new_bookmark("b", 0)).unwrap();
        assert_ne!(first, second);

        let reopened = BookmarkFile::open_at(&path).unwrap();
        let chapters: Vec<_> = reopened.list("a").unwrap().iter().map(|b| b.chapter).collect();
        assert_eq!(chapters, vec![1, 2]);
        assert_eq!(reopened.list("b").unwrap().len(), 1);
        assert_eq!(reopened.list("a").unwrap()[0].chapter_title, "Chapter 1");
    }

    #[test]
    fn delete_removes_only_the_bookmark() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("bookmarks.json");

        let mut store = BookmarkFile::open_at(&path).unwrap();
        let keep = store.add(new_bookmark("a", 1)).unwrap();
        let gone = store.add(new_bookmark("a", 2)).unwrap();
        store.delete(&gone).unwrap();

        let reopened = BookmarkFile::open_at(&path).unwrap();
        let ids: Vec<_> = reopened.all().iter().map(|b| b.id.clone()).collect();
        assert_eq!(ids, vec![keep]);
    }

    #[test]
    fn deleting_unknown_id_fails() {
        let dir = tempfile::tempdir().unwrap();
        let mut store = BookmarkFile::open_at(dir.path().join("bookmarks.json")).unwrap();
        assert!(store.delete("nope").is_err());
    }

    #[test]
    fn reads_records_without_optional_fields() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("bookmarks.json");
        std::fs::write(
            &path,
            r#"{"bookmarks":[{"id":"1","book_id":"a","chapter":3,"position":0.5}]}"#,
        )
        .unwrap();

        let store = BookmarkFile::open_at(&path).unwrap();
        let marks = store.list("a").unwrap();
        assert_eq!(marks[0].chapter, 3);
        assert_eq!(marks[0].note, "");
    }
}
