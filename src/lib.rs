//! webby-reader - A terminal reader for books on a webby server
//!
//! Chapters are fetched from the server and shown either one at a time or
//! stitched into a single scrollable document. The reading position is kept
//! on the server; bookmarks are kept locally.

pub mod api;
pub mod app;
pub mod config;
pub mod reader;
pub mod theme;
pub mod ui;

pub use api::ApiClient;
pub use app::App;
pub use config::{BookmarkFile, Config};
pub use reader::{Document, ReadingSession};
pub use theme::Theme;
