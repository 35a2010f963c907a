//! Messages into and effects out of the reading session
//!
//! All input to the session, whether a key press or the completion of a
//! background fetch, arrives as a [`Msg`] through one queue. Everything the
//! session wants done outside itself is returned as an [`Effect`].

use super::error::ReaderError;
use super::key::Key;
use super::source::{Bookmark, Chapter, NewBookmark, SavedPosition};

/// Identifies one content request so stale completions can be dropped
pub type Ticket = u64;

/// Input to [`ReadingSession::update`](super::ReadingSession::update)
#[derive(Debug, Clone)]
pub enum Msg {
    /// A key was pressed
    KeyPressed(Key),
    /// The terminal was resized
    Resized { width: u16, height: u16 },
    /// Table of contents fetch completed
    TocLoaded(Result<Vec<Chapter>, ReaderError>),
    /// Saved position fetch completed
    PositionLoaded(Result<Option<SavedPosition>, ReaderError>),
    /// Single chapter fetch completed
    ChapterLoaded { ticket: Ticket, chapter: usize, result: Result<String, ReaderError> },
    /// Continuous-mode fetch of every chapter completed, texts in chapter order
    AllChaptersLoaded { ticket: Ticket, result: Result<Vec<String>, ReaderError> },
    /// Bookmark list for the document
    BookmarksLoaded(Result<Vec<Bookmark>, ReaderError>),
    /// Bookmark creation completed with the new id
    BookmarkAdded(Result<String, ReaderError>),
    /// Bookmark deletion completed
    BookmarkDeleted(Result<(), ReaderError>),
}

/// Work requested by the session
#[derive(Debug, Clone, PartialEq)]
pub enum Effect {
    FetchTableOfContents { document_id: String },
    LoadPosition { document_id: String },
    FetchChapter { ticket: Ticket, document_id: String, chapter: usize },
    FetchAllChapters { ticket: Ticket, document_id: String, chapter_count: usize },
    /// Fire-and-forget; failures are only logged
    SavePosition { document_id: String, position: SavedPosition },
    ListBookmarks { document_id: String },
    AddBookmark(NewBookmark),
    DeleteBookmark { id: String },
    /// Remember the text scale for the next session
    PersistTextScale(f64),
    /// The session has ended; the host should leave the reader
    Exit,
}
