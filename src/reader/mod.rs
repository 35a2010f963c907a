//! Document reader engine
//!
//! Everything here is free of terminal and network concerns. The
//! [`ReadingSession`] consumes [`Msg`]s and returns [`Effect`]s; the
//! application layer turns those effects into calls on the collaborator
//! traits in [`source`].

mod error;
mod key;
mod message;
pub mod position;
pub mod search;
mod session;
pub mod source;
pub mod stitch;
pub mod wrap;

pub use error::ReaderError;
pub use key::Key;
pub use message::{Effect, Msg, Ticket};
pub use search::{Match, SearchIndex};
pub use session::{
    CHROME_ROWS, HORIZONTAL_PADDING, HeaderMetrics, Highlight, InputMode, ReadingMode,
    ReadingSession, VisibleLine,
};
pub use source::{
    Bookmark, BookmarkStore, Chapter, ContentSource, Document, NewBookmark, PositionStore,
    SavedPosition,
};
pub use stitch::{ChapterText, StitchedDocument};
