//! The reading session
//!
//! Owns everything about one open document: the chapter list, the current
//! line sequence, the viewport, search, and pending loads. It performs no
//! I/O. Each call returns the [`Effect`]s the host must carry out, and the
//! host reports results back through [`ReadingSession::update`].

use tracing::{debug, info, warn};

use super::error::ReaderError;
use super::key::Key;
use super::message::{Effect, Msg, Ticket};
use super::position::{from_fraction, max_offset, to_fraction};
use super::search::{SearchIndex, follow_offset};
use super::source::{Bookmark, Chapter, Document, NewBookmark, SavedPosition};
use super::stitch::{ChapterText, StitchedDocument};
use super::wrap::{scaled_width, wrap};
use crate::config::{DEFAULT_TEXT_SCALE, MAX_TEXT_SCALE, MIN_TEXT_SCALE, TEXT_SCALE_STEP};

/// Rows used by the header, footer and margins
pub const CHROME_ROWS: u16 = 5;

/// Columns of padding around the text
pub const HORIZONTAL_PADDING: u16 = 4;

/// How chapters are presented
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ReadingMode {
    /// One chapter at a time
    #[default]
    Paged,
    /// Every chapter stitched into one scrollable sequence
    Continuous,
}

/// What key presses currently drive
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum InputMode {
    #[default]
    Normal,
    TableOfContents {
        cursor: usize,
    },
    BookmarkList {
        cursor: usize,
    },
    SearchInput {
        query: String,
    },
}

/// The content request whose completion the session is waiting for
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum PendingLoad {
    Chapter { ticket: Ticket, chapter: usize },
    AllChapters { ticket: Ticket },
}

/// A search hit on a visible line, in character offsets
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Highlight {
    pub start: usize,
    pub end: usize,
    /// Whether this is the selected match
    pub current: bool,
}

/// One line of the viewport
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VisibleLine<'a> {
    /// Index into the full line sequence
    pub index: usize,
    pub text: &'a str,
    pub highlights: Vec<Highlight>,
    /// Chapter title line in continuous mode
    pub is_banner: bool,
}

impl VisibleLine<'_> {
    pub fn is_highlighted(&self) -> bool {
        !self.highlights.is_empty()
    }

    pub fn has_current_match(&self) -> bool {
        self.highlights.iter().any(|h| h.current)
    }
}

/// Values shown in the reader header
#[derive(Debug, Clone, PartialEq)]
pub struct HeaderMetrics {
    pub document_title: String,
    pub chapter_title: String,
    /// Zero-based
    pub chapter_index: usize,
    pub chapter_count: usize,
    pub chapter_progress: f64,
    pub book_progress: f64,
}

/// State of one open document
#[derive(Debug)]
pub struct ReadingSession {
    document: Document,
    chapters: Vec<Chapter>,
    /// Current chapter. In continuous mode this follows the line at the top
    /// of the viewport as the reader scrolls.
    chapter: usize,
    mode: ReadingMode,
    input: InputMode,

    /// Raw text of the chapter shown in paged mode
    content: Option<String>,
    /// Wrapped `content`
    lines: Vec<String>,
    /// Present once continuous mode has loaded
    stitched: Option<StitchedDocument>,

    offset: usize,
    width: u16,
    height: u16,
    text_scale: f64,

    search: Option<SearchIndex>,
    pending_position: Option<f64>,
    pending_load: Option<PendingLoad>,
    next_ticket: Ticket,

    loading: bool,
    error: Option<ReaderError>,
    status: Option<String>,
    bookmarks: Vec<Bookmark>,

    toc_ready: bool,
    position_ready: bool,
    started: bool,
    closed: bool,
}

impl ReadingSession {
    /// Create a session for `document`. Call [`start`](Self::start) to begin loading.
    pub fn new(document: Document, text_scale: f64) -> Self {
        let text_scale = if (MIN_TEXT_SCALE..=MAX_TEXT_SCALE).contains(&text_scale) {
            text_scale
        } else {
            DEFAULT_TEXT_SCALE
        };

        Self {
            document,
            chapters: Vec::new(),
            chapter: 0,
            mode: ReadingMode::Paged,
            input: InputMode::Normal,
            content: None,
            lines: vec![String::new()],
            stitched: None,
            offset: 0,
            width: 80,
            height: 24,
            text_scale,
            search: None,
            pending_position: None,
            pending_load: None,
            next_ticket: 0,
            loading: false,
            error: None,
            status: None,
            bookmarks: Vec::new(),
            toc_ready: false,
            position_ready: false,
            started: false,
            closed: false,
        }
    }

    /// Request the table of contents and the saved position.
    ///
    /// The first chapter is requested once both have arrived.
    pub fn start(&mut self) -> Vec<Effect> {
        info!(document = %self.document.id, "Opening reading session");
        self.loading = true;
        self.error = None;
        self.toc_ready = false;
        self.position_ready = false;
        self.started = false;

        vec![
            Effect::FetchTableOfContents { document_id: self.document.id.clone() },
            Effect::LoadPosition { document_id: self.document.id.clone() },
        ]
    }

    /// Process one message
    pub fn update(&mut self, msg: Msg) -> Vec<Effect> {
        if self.closed {
            return Vec::new();
        }

        match msg {
            Msg::KeyPressed(key) => self.handle_key(key),
            Msg::Resized { width, height } => {
                self.set_viewport_size(width, height);
                Vec::new()
            }
            Msg::TocLoaded(result) => self.on_toc_loaded(result),
            Msg::PositionLoaded(result) => self.on_position_loaded(result),
            Msg::ChapterLoaded { ticket, chapter, result } => {
                self.on_chapter_loaded(ticket, chapter, result);
                Vec::new()
            }
            Msg::AllChaptersLoaded { ticket, result } => {
                self.on_all_chapters_loaded(ticket, result)
            }
            Msg::BookmarksLoaded(result) => {
                self.on_bookmarks_loaded(result);
                Vec::new()
            }
            Msg::BookmarkAdded(result) => {
                self.status = Some(match result {
                    Ok(_) => "Bookmark added".to_string(),
                    Err(err) => {
                        warn!(%err, "Failed to add bookmark");
                        "Failed to add bookmark".to_string()
                    }
                });
                Vec::new()
            }
            Msg::BookmarkDeleted(result) => match result {
                Ok(()) => Vec::new(),
                Err(err) => {
                    warn!(%err, "Failed to delete bookmark");
                    self.status = Some("Failed to delete bookmark".to_string());
                    vec![Effect::ListBookmarks { document_id: self.document.id.clone() }]
                }
            },
        }
    }

    /// Drive the state machine with one key press
    pub fn handle_key(&mut self, key: Key) -> Vec<Effect> {
        if self.closed {
            return Vec::new();
        }
        // Transient messages last until the next key
        self.status = None;

        match self.input {
            InputMode::Normal => self.handle_normal_key(key),
            InputMode::TableOfContents { .. } => self.handle_toc_key(key),
            InputMode::BookmarkList { .. } => self.handle_bookmark_key(key),
            InputMode::SearchInput { .. } => {
                self.handle_search_key(key);
                Vec::new()
            }
        }
    }

    /// Record the terminal size, rewrapping if the text width changes
    pub fn set_viewport_size(&mut self, width: u16, height: u16) {
        let old_wrap = self.wrap_width();
        self.width = width;
        self.height = height;

        if self.wrap_width() != old_wrap {
            self.rebuild_lines();
        } else {
            self.clamp_offset();
        }
    }

    /// End the session, saving the reading position.
    ///
    /// Only the first call has any effect.
    pub fn close(&mut self) -> Vec<Effect> {
        if self.closed {
            return Vec::new();
        }
        self.closed = true;

        let position = if self.has_content() {
            self.current_position()
        } else {
            SavedPosition {
                chapter: self.chapter,
                fraction: self.pending_position.unwrap_or(0.0),
            }
        };
        info!(
            document = %self.document.id,
            chapter = position.chapter,
            fraction = position.fraction,
            "Closing reading session"
        );

        vec![
            Effect::SavePosition { document_id: self.document.id.clone(), position },
            Effect::Exit,
        ]
    }

    // ----- accessors -----

    pub fn document(&self) -> &Document {
        &self.document
    }

    pub fn chapters(&self) -> &[Chapter] {
        &self.chapters
    }

    pub fn current_chapter(&self) -> usize {
        self.chapter
    }

    pub fn mode(&self) -> ReadingMode {
        self.mode
    }

    pub fn input_mode(&self) -> &InputMode {
        &self.input
    }

    /// Top line of the viewport
    pub fn offset(&self) -> usize {
        self.offset
    }

    pub fn text_scale(&self) -> f64 {
        self.text_scale
    }

    pub fn is_loading(&self) -> bool {
        self.loading
    }

    pub fn is_closed(&self) -> bool {
        self.closed
    }

    pub fn error(&self) -> Option<&ReaderError> {
        self.error.as_ref()
    }

    /// Transient status message, cleared by the next key
    pub fn status(&self) -> Option<&str> {
        self.status.as_deref()
    }

    pub fn search(&self) -> Option<&SearchIndex> {
        self.search.as_ref()
    }

    pub fn bookmarks(&self) -> &[Bookmark] {
        &self.bookmarks
    }

    /// The full current line sequence
    pub fn lines(&self) -> &[String] {
        match &self.stitched {
            Some(doc) => doc.lines(),
            None => &self.lines,
        }
    }

    /// Number of text rows in the viewport
    pub fn page_height(&self) -> usize {
        (self.height.saturating_sub(CHROME_ROWS) as usize).max(1)
    }

    /// Column width text is wrapped to
    pub fn wrap_width(&self) -> usize {
        scaled_width(self.width.saturating_sub(HORIZONTAL_PADDING) as usize, self.text_scale)
    }

    /// Lines in the viewport with their search highlights
    pub fn visible_lines(&self) -> Vec<VisibleLine<'_>> {
        let lines = self.lines();
        let end = (self.offset + self.page_height()).min(lines.len());
        let start = self.offset.min(end);

        (start..end)
            .map(|index| VisibleLine {
                index,
                text: &lines[index],
                highlights: self
                    .search
                    .as_ref()
                    .map(|search| {
                        search
                            .matches_on_line(index)
                            .map(|(m, current)| Highlight { start: m.start, end: m.end, current })
                            .collect()
                    })
                    .unwrap_or_default(),
                is_banner: self.stitched.as_ref().is_some_and(|doc| doc.is_banner(index)),
            })
            .collect()
    }

    /// Progress through the current chapter, `0.0..=1.0`
    pub fn chapter_progress(&self) -> f64 {
        if !self.has_content() {
            return 0.0;
        }
        let visible = self.page_height();

        match &self.stitched {
            Some(doc) => match doc.chapter_body(self.chapter) {
                Some((start, end)) => {
                    to_fraction(self.offset.saturating_sub(start), visible, end - start)
                }
                None => to_fraction(self.offset, visible, doc.lines().len()),
            },
            None => to_fraction(self.offset, visible, self.lines.len()),
        }
    }

    /// Progress through the whole book, every chapter weighted equally
    pub fn book_progress(&self) -> f64 {
        let count = self.chapters.len();
        if count == 0 {
            return 0.0;
        }
        ((self.chapter as f64 + self.chapter_progress()) / count as f64).min(1.0)
    }

    pub fn header_metrics(&self) -> HeaderMetrics {
        HeaderMetrics {
            document_title: self.document.title.clone(),
            chapter_title: self.chapter_title(self.chapter),
            chapter_index: self.chapter,
            chapter_count: self.chapters.len(),
            chapter_progress: self.chapter_progress(),
            book_progress: self.book_progress(),
        }
    }

    /// Position to persist for the current viewport
    pub fn current_position(&self) -> SavedPosition {
        SavedPosition { chapter: self.chapter, fraction: self.chapter_progress() }
    }

    // ----- completions -----

    fn on_toc_loaded(&mut self, result: Result<Vec<Chapter>, ReaderError>) -> Vec<Effect> {
        match result {
            Ok(chapters) => {
                debug!(count = chapters.len(), "Table of contents loaded");
                self.chapters = chapters;
                self.toc_ready = true;
                self.maybe_begin()
            }
            Err(err) => {
                warn!(%err, "Table of contents unavailable");
                self.loading = false;
                self.error = Some(err);
                Vec::new()
            }
        }
    }

    fn on_position_loaded(
        &mut self,
        result: Result<Option<SavedPosition>, ReaderError>,
    ) -> Vec<Effect> {
        self.position_ready = true;

        match result {
            Ok(Some(position)) => {
                if self.chapters.is_empty() || position.chapter < self.chapters.len() {
                    self.chapter = position.chapter;
                    self.pending_position = Some(position.fraction);
                } else {
                    warn!(chapter = position.chapter, "Saved position is past the last chapter");
                }
            }
            Ok(None) => debug!("No saved position"),
            Err(err) => warn!(%err, "Starting from the beginning"),
        }

        self.maybe_begin()
    }

    /// Load the opening chapter once the chapter list and saved position are known
    fn maybe_begin(&mut self) -> Vec<Effect> {
        if self.started || !self.toc_ready || !self.position_ready {
            return Vec::new();
        }
        self.started = true;

        if self.chapters.is_empty() {
            self.loading = false;
            return Vec::new();
        }
        if self.chapter >= self.chapters.len() {
            self.chapter = 0;
            self.pending_position = None;
        }
        vec![self.request_chapter(self.chapter)]
    }

    fn on_chapter_loaded(
        &mut self,
        ticket: Ticket,
        chapter: usize,
        result: Result<String, ReaderError>,
    ) {
        if self.pending_load != Some(PendingLoad::Chapter { ticket, chapter }) {
            debug!(ticket, chapter, "Discarding stale chapter load");
            return;
        }
        self.pending_load = None;
        self.loading = false;
        let pending = self.pending_position.take();

        match result {
            Ok(text) => {
                self.chapter = chapter;
                self.stitched = None;
                self.content = Some(text);
                self.rebuild_lines();
                self.offset = pending.map_or(0, |f| from_fraction(f, self.lines.len()));
                self.clamp_offset();
                self.error = None;
            }
            Err(err) => {
                warn!(%err, "Keeping previous content");
                self.error = Some(err);
            }
        }
    }

    fn on_all_chapters_loaded(
        &mut self,
        ticket: Ticket,
        result: Result<Vec<String>, ReaderError>,
    ) -> Vec<Effect> {
        if self.pending_load != Some(PendingLoad::AllChapters { ticket }) {
            debug!(ticket, "Discarding stale continuous load");
            return Vec::new();
        }
        self.pending_load = None;
        self.loading = false;

        match result {
            Ok(texts) => {
                let chapters: Vec<ChapterText> = texts
                    .into_iter()
                    .enumerate()
                    .map(|(index, content)| ChapterText {
                        index,
                        title: self.chapter_title(index),
                        content,
                    })
                    .collect();
                let doc = StitchedDocument::new(chapters, self.wrap_width());
                // A position restore still waiting for its chapter lands here instead
                self.offset = match (self.pending_position.take(), doc.chapter_body(self.chapter)) {
                    (Some(fraction), Some((start, end))) => {
                        start + from_fraction(fraction, end - start)
                    }
                    _ => doc.chapter_start(self.chapter).unwrap_or(0),
                };
                self.stitched = Some(doc);
                self.search = None;
                self.clamp_offset();
                self.error = None;
                Vec::new()
            }
            Err(err) => {
                warn!(%err, "Staying in paged mode");
                self.mode = ReadingMode::Paged;
                self.error = Some(err);
                if self.has_content() {
                    Vec::new()
                } else {
                    vec![self.request_chapter(self.chapter)]
                }
            }
        }
    }

    fn on_bookmarks_loaded(&mut self, result: Result<Vec<Bookmark>, ReaderError>) {
        match result {
            Ok(bookmarks) => {
                self.bookmarks = bookmarks;
                let count = self.bookmarks.len();
                if let InputMode::BookmarkList { cursor } = &mut self.input {
                    *cursor = (*cursor).min(count.saturating_sub(1));
                }
            }
            Err(err) => {
                warn!(%err, "Failed to load bookmarks");
                self.status = Some("Failed to load bookmarks".to_string());
            }
        }
    }

    // ----- key handling -----

    fn handle_normal_key(&mut self, key: Key) -> Vec<Effect> {
        let page = self.page_height() as isize;

        match key {
            Key::Char('j') | Key::Down => self.scroll_by(1),
            Key::Char('k') | Key::Up => self.scroll_by(-1),
            Key::Ctrl('d') | Key::PageDown => self.scroll_by((page / 2).max(1)),
            Key::Ctrl('u') | Key::PageUp => self.scroll_by(-(page / 2).max(1)),
            Key::Char(' ') => self.scroll_by((page - 2).max(1)),
            Key::Char('g') | Key::Home => self.scroll_to(0),
            Key::Char('G') | Key::End => self.scroll_to(usize::MAX),
            Key::Char('n') => {
                if self.search.as_ref().is_some_and(|s| !s.is_empty()) {
                    self.next_match();
                } else {
                    return self.next_chapter();
                }
            }
            Key::Char('N') => self.prev_match(),
            Key::Char('l') | Key::Right => return self.next_chapter(),
            Key::Char('h') | Key::Char('p') | Key::Left => return self.prev_chapter(),
            Key::Char('t') => self.open_table_of_contents(),
            Key::Char('b') => return self.open_bookmarks(),
            Key::Char('B') => return self.add_bookmark(),
            Key::Char('/') => self.input = InputMode::SearchInput { query: String::new() },
            Key::Esc => {
                if self.search.is_some() {
                    self.search = None;
                } else {
                    self.error = None;
                }
            }
            Key::Char('c') => return self.toggle_continuous(),
            Key::Char('+') | Key::Char('=') => {
                return self.set_text_scale(self.text_scale + TEXT_SCALE_STEP);
            }
            Key::Char('-') | Key::Char('_') => {
                return self.set_text_scale(self.text_scale - TEXT_SCALE_STEP);
            }
            Key::Char('0') => return self.set_text_scale(DEFAULT_TEXT_SCALE),
            Key::Char('r') => return self.retry(),
            Key::Char('q') | Key::Ctrl('c') => return self.close(),
            _ => {}
        }
        Vec::new()
    }

    fn handle_toc_key(&mut self, key: Key) -> Vec<Effect> {
        let count = self.chapters.len();
        let InputMode::TableOfContents { cursor } = &mut self.input else {
            return Vec::new();
        };

        match key {
            Key::Esc | Key::Char('t') | Key::Char('q') => self.input = InputMode::Normal,
            Key::Char('j') | Key::Down => {
                if *cursor + 1 < count {
                    *cursor += 1;
                }
            }
            Key::Char('k') | Key::Up => *cursor = cursor.saturating_sub(1),
            Key::Char('g') | Key::Home => *cursor = 0,
            Key::Char('G') | Key::End => *cursor = count.saturating_sub(1),
            Key::Enter => {
                let target = *cursor;
                self.input = InputMode::Normal;
                return self.go_to_chapter(target);
            }
            _ => {}
        }
        Vec::new()
    }

    fn handle_bookmark_key(&mut self, key: Key) -> Vec<Effect> {
        let count = self.bookmarks.len();
        let InputMode::BookmarkList { cursor } = &mut self.input else {
            return Vec::new();
        };

        match key {
            Key::Esc | Key::Char('b') | Key::Char('q') => self.input = InputMode::Normal,
            Key::Char('j') | Key::Down => {
                if *cursor + 1 < count {
                    *cursor += 1;
                }
            }
            Key::Char('k') | Key::Up => *cursor = cursor.saturating_sub(1),
            Key::Char('g') | Key::Home => *cursor = 0,
            Key::Char('G') | Key::End => *cursor = count.saturating_sub(1),
            Key::Enter => {
                let selected = *cursor;
                if let Some(bookmark) = self.bookmarks.get(selected).cloned() {
                    self.input = InputMode::Normal;
                    return self.jump_to_bookmark(&bookmark);
                }
            }
            Key::Char('d') | Key::Char('x') => {
                let selected = *cursor;
                return self.delete_bookmark(selected);
            }
            _ => {}
        }
        Vec::new()
    }

    fn handle_search_key(&mut self, key: Key) {
        let InputMode::SearchInput { query } = &mut self.input else {
            return;
        };

        match key {
            Key::Backspace => {
                query.pop();
            }
            Key::Ctrl('u') => query.clear(),
            Key::Char(c) if !c.is_control() => query.push(c),
            Key::Enter => {
                let submitted = std::mem::take(query);
                self.input = InputMode::Normal;
                self.submit_search(&submitted);
            }
            Key::Esc => self.input = InputMode::Normal,
            _ => {}
        }
    }

    // ----- navigation -----

    fn scroll_by(&mut self, delta: isize) {
        self.offset = self.offset.saturating_add_signed(delta);
        self.clamp_offset();
        self.sync_chapter();
    }

    fn scroll_to(&mut self, line: usize) {
        self.offset = line;
        self.clamp_offset();
        self.sync_chapter();
    }

    fn clamp_offset(&mut self) {
        self.offset = self.offset.min(max_offset(self.lines().len(), self.page_height()));
    }

    /// In continuous mode, make the current chapter the one at the top of the viewport
    fn sync_chapter(&mut self) {
        if let Some(doc) = &self.stitched {
            self.chapter = doc.chapter_at(self.offset);
        }
    }

    fn next_chapter(&mut self) -> Vec<Effect> {
        if self.chapter + 1 >= self.chapters.len() {
            return Vec::new();
        }
        self.go_to_chapter(self.chapter + 1)
    }

    fn prev_chapter(&mut self) -> Vec<Effect> {
        if self.chapter == 0 {
            return Vec::new();
        }
        self.go_to_chapter(self.chapter - 1)
    }

    fn go_to_chapter(&mut self, target: usize) -> Vec<Effect> {
        if target >= self.chapters.len() {
            return Vec::new();
        }

        if let Some(doc) = &self.stitched {
            if let Some(start) = doc.chapter_start(target) {
                self.chapter = target;
                self.offset = start;
                self.clamp_offset();
            }
            return Vec::new();
        }
        if self.mode == ReadingMode::Continuous {
            // Whole book still loading
            return Vec::new();
        }

        let mut effects = Vec::new();
        if self.has_content() {
            effects.push(Effect::SavePosition {
                document_id: self.document.id.clone(),
                position: self.current_position(),
            });
        }
        self.pending_position = None;
        effects.push(self.request_chapter(target));
        effects
    }

    fn request_chapter(&mut self, chapter: usize) -> Effect {
        let ticket = self.issue_ticket();
        self.pending_load = Some(PendingLoad::Chapter { ticket, chapter });
        self.loading = true;
        Effect::FetchChapter { ticket, document_id: self.document.id.clone(), chapter }
    }

    fn issue_ticket(&mut self) -> Ticket {
        self.next_ticket += 1;
        self.next_ticket
    }

    fn retry(&mut self) -> Vec<Effect> {
        let Some(error) = self.error.take() else {
            return Vec::new();
        };

        match error {
            ReaderError::TableOfContents(_) => self.start(),
            ReaderError::Chapter { chapter, .. } => vec![self.request_chapter(chapter)],
            ReaderError::AllChapters(_) => self.toggle_continuous(),
            other => {
                self.error = Some(other);
                Vec::new()
            }
        }
    }

    // ----- modes -----

    fn toggle_continuous(&mut self) -> Vec<Effect> {
        self.search = None;
        self.error = None;

        match self.mode {
            ReadingMode::Paged => {
                if self.chapters.is_empty() {
                    self.status = Some("No chapters to show".to_string());
                    return Vec::new();
                }
                self.mode = ReadingMode::Continuous;
                let ticket = self.issue_ticket();
                self.pending_load = Some(PendingLoad::AllChapters { ticket });
                self.loading = true;
                vec![Effect::FetchAllChapters {
                    ticket,
                    document_id: self.document.id.clone(),
                    chapter_count: self.chapters.len(),
                }]
            }
            ReadingMode::Continuous => {
                self.mode = ReadingMode::Paged;
                self.pending_load = None;
                self.loading = false;

                // Still loading: the paged chapter never left the screen,
                // unless it had not arrived yet either
                let Some(doc) = self.stitched.take() else {
                    if self.has_content() {
                        return Vec::new();
                    }
                    return vec![self.request_chapter(self.chapter)];
                };

                // `chapter` tracks the top of the viewport while scrolling
                let chapter = self.chapter;
                match doc.chapter_text(chapter) {
                    Some(text) => {
                        self.content = Some(text.to_string());
                        self.lines = wrap(text, self.wrap_width());
                        self.offset = 0;
                        Vec::new()
                    }
                    None => vec![self.request_chapter(chapter)],
                }
            }
        }
    }

    /// Change the text scale and rewrap. The raw line offset is kept.
    pub fn set_text_scale(&mut self, scale: f64) -> Vec<Effect> {
        let scale = (scale.clamp(MIN_TEXT_SCALE, MAX_TEXT_SCALE) * 10.0).round() / 10.0;
        if (scale - self.text_scale).abs() < f64::EPSILON {
            return Vec::new();
        }
        self.text_scale = scale;
        self.rebuild_lines();
        vec![Effect::PersistTextScale(scale)]
    }

    /// Rewrap the current content at the current width. Clears search.
    fn rebuild_lines(&mut self) {
        let width = self.wrap_width();
        self.search = None;

        if let Some(doc) = &mut self.stitched {
            doc.rewrap(width);
        } else if let Some(content) = &self.content {
            self.lines = wrap(content, width);
        }
        self.clamp_offset();
        self.sync_chapter();
    }

    /// Whether any chapter text has arrived
    pub fn has_content(&self) -> bool {
        self.content.is_some() || self.stitched.is_some()
    }

    fn chapter_title(&self, index: usize) -> String {
        self.chapters.get(index).map(|c| c.title.clone()).unwrap_or_default()
    }

    // ----- search -----

    fn submit_search(&mut self, query: &str) {
        if query.is_empty() {
            return;
        }
        let index = SearchIndex::build(self.lines(), query);
        debug!(query, matches = index.len(), "Search");
        let first = index.current();
        self.search = Some(index);
        if let Some(m) = first {
            self.follow(m.line);
        }
    }

    fn next_match(&mut self) {
        if let Some(m) = self.search.as_mut().and_then(|s| s.select_next()) {
            self.follow(m.line);
        }
    }

    fn prev_match(&mut self) {
        if let Some(m) = self.search.as_mut().and_then(|s| s.select_prev()) {
            self.follow(m.line);
        }
    }

    fn follow(&mut self, line: usize) {
        self.offset = follow_offset(self.offset, self.page_height(), line);
        self.clamp_offset();
        self.sync_chapter();
    }

    // ----- table of contents and bookmarks -----

    fn open_table_of_contents(&mut self) {
        let cursor = self.chapter.min(self.chapters.len().saturating_sub(1));
        self.input = InputMode::TableOfContents { cursor };
    }

    fn open_bookmarks(&mut self) -> Vec<Effect> {
        self.input = InputMode::BookmarkList { cursor: 0 };
        vec![Effect::ListBookmarks { document_id: self.document.id.clone() }]
    }

    fn add_bookmark(&mut self) -> Vec<Effect> {
        if !self.has_content() {
            self.status = Some("Nothing to bookmark yet".to_string());
            return Vec::new();
        }
        let position = self.current_position();

        vec![Effect::AddBookmark(NewBookmark {
            book_id: self.document.id.clone(),
            book_title: self.document.title.clone(),
            chapter: position.chapter,
            chapter_title: self.chapter_title(position.chapter),
            position: position.fraction,
            note: String::new(),
        })]
    }

    fn delete_bookmark(&mut self, selected: usize) -> Vec<Effect> {
        if selected >= self.bookmarks.len() {
            return Vec::new();
        }
        let removed = self.bookmarks.remove(selected);
        let remaining = self.bookmarks.len();
        if let InputMode::BookmarkList { cursor } = &mut self.input {
            *cursor = (*cursor).min(remaining.saturating_sub(1));
        }
        vec![Effect::DeleteBookmark { id: removed.id }]
    }

    fn jump_to_bookmark(&mut self, bookmark: &Bookmark) -> Vec<Effect> {
        if bookmark.chapter >= self.chapters.len() {
            self.status = Some("Bookmark is outside this book".to_string());
            return Vec::new();
        }

        if let Some(doc) = &self.stitched {
            if let Some((start, end)) = doc.chapter_body(bookmark.chapter) {
                self.chapter = bookmark.chapter;
                self.offset = start + from_fraction(bookmark.position, end - start);
                self.clamp_offset();
            }
            return Vec::new();
        }
        if self.mode == ReadingMode::Continuous {
            return Vec::new();
        }

        self.pending_position = Some(bookmark.position);
        vec![self.request_chapter(bookmark.chapter)]
    }
}
