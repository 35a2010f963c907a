//! Execution of reader effects
//!
//! Remote effects run as tokio tasks. Each task reports back by sending a
//! [`Msg`] into the session's channel, so completions are processed one at a
//! time on the UI loop. Bookmark effects are local file operations and run
//! inline, but still report through the channel.

use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use futures_util::{StreamExt, TryStreamExt, stream};
use tokio::sync::mpsc::UnboundedSender;
use tokio::task::JoinSet;
use tracing::{debug, warn};

use crate::reader::{
    BookmarkStore, ContentSource, Effect, Msg, PositionStore, ReaderError, ReadingSession,
    SavedPosition,
};

/// Chapter fetches in flight at once when loading a whole book
pub const MAX_CONCURRENT_FETCHES: usize = 4;

/// Runs effects against the content source and stores
pub struct EffectRunner<C, P, B> {
    source: Arc<C>,
    positions: Arc<P>,
    bookmarks: B,
    tx: UnboundedSender<Msg>,
    /// Position saves still running
    saves: JoinSet<()>,
}

impl<C, P, B> EffectRunner<C, P, B>
where
    C: ContentSource,
    P: PositionStore,
    B: BookmarkStore,
{
    pub fn new(source: Arc<C>, positions: Arc<P>, bookmarks: B, tx: UnboundedSender<Msg>) -> Self {
        Self { source, positions, bookmarks, tx, saves: JoinSet::new() }
    }

    /// Start an effect.
    ///
    /// `PersistTextScale` and `Exit` concern the host and are handed back.
    pub fn execute(&mut self, effect: Effect) -> Option<Effect> {
        while self.saves.try_join_next().is_some() {}

        match effect {
            Effect::FetchTableOfContents { document_id } => {
                let source = Arc::clone(&self.source);
                self.spawn(async move {
                    let result = source
                        .table_of_contents(&document_id)
                        .await
                        .map_err(|e| ReaderError::TableOfContents(format!("{e:#}")));
                    Msg::TocLoaded(result)
                });
            }
            Effect::LoadPosition { document_id } => {
                let positions = Arc::clone(&self.positions);
                self.spawn(async move {
                    let result = positions
                        .load_position(&document_id)
                        .await
                        .map_err(|e| ReaderError::PositionLoad(format!("{e:#}")));
                    Msg::PositionLoaded(result)
                });
            }
            Effect::FetchChapter { ticket, document_id, chapter } => {
                debug!(ticket, chapter, "Fetching chapter");
                let source = Arc::clone(&self.source);
                self.spawn(async move {
                    let result = source.chapter_text(&document_id, chapter).await.map_err(|e| {
                        ReaderError::Chapter { chapter, message: format!("{e:#}") }
                    });
                    Msg::ChapterLoaded { ticket, chapter, result }
                });
            }
            Effect::FetchAllChapters { ticket, document_id, chapter_count } => {
                debug!(ticket, chapter_count, "Fetching all chapters");
                let source = Arc::clone(&self.source);
                self.spawn(async move {
                    let result = fetch_all(source, document_id, chapter_count)
                        .await
                        .map_err(|e| ReaderError::AllChapters(format!("{e:#}")));
                    Msg::AllChaptersLoaded { ticket, result }
                });
            }
            Effect::SavePosition { document_id, position } => {
                let positions = Arc::clone(&self.positions);
                self.saves.spawn(save_position(positions, document_id, position));
            }
            Effect::ListBookmarks { document_id } => {
                let result = self.bookmarks.list(&document_id).map_err(bookmark_error);
                self.send(Msg::BookmarksLoaded(result));
            }
            Effect::AddBookmark(bookmark) => {
                let result = self.bookmarks.add(bookmark).map_err(bookmark_error);
                self.send(Msg::BookmarkAdded(result));
            }
            Effect::DeleteBookmark { id } => {
                let result = self.bookmarks.delete(&id).map_err(bookmark_error);
                self.send(Msg::BookmarkDeleted(result));
            }
            host @ (Effect::PersistTextScale(_) | Effect::Exit) => return Some(host),
        }
        None
    }

    /// Close `session` unless it already closed, then wait up to `grace`
    /// for its final save along with any others still running
    pub async fn shut_down(mut self, session: &mut ReadingSession, grace: Duration) {
        for effect in session.close() {
            self.execute(effect);
        }
        self.finish(grace).await;
    }

    /// Wait up to `grace` for position saves still in flight
    pub async fn finish(mut self, grace: Duration) {
        let pending = self.saves.len();
        if pending == 0 {
            return;
        }
        debug!(pending, "Waiting for position saves");

        let drain = async {
            while self.saves.join_next().await.is_some() {}
        };
        if tokio::time::timeout(grace, drain).await.is_err() {
            warn!("Gave up waiting for reading position to be saved");
        }
    }

    fn spawn<F>(&self, task: F)
    where
        F: Future<Output = Msg> + Send + 'static,
    {
        let tx = self.tx.clone();
        tokio::spawn(async move {
            // The receiver only goes away once the reader has closed
            let _ = tx.send(task.await);
        });
    }

    fn send(&self, msg: Msg) {
        if self.tx.send(msg).is_err() {
            debug!("Reader channel closed");
        }
    }
}

/// Fetch every chapter with bounded concurrency, keeping chapter order
async fn fetch_all<C: ContentSource>(
    source: Arc<C>,
    document_id: String,
    chapter_count: usize,
) -> anyhow::Result<Vec<String>> {
    stream::iter(0..chapter_count)
        .map(|chapter| {
            let source = Arc::clone(&source);
            let document_id = document_id.clone();
            async move {
                source
                    .chapter_text(&document_id, chapter)
                    .await
                    .with_context(|| format!("Chapter {} failed", chapter + 1))
            }
        })
        .buffered(MAX_CONCURRENT_FETCHES)
        .try_collect()
        .await
}

async fn save_position<P: PositionStore>(
    positions: Arc<P>,
    document_id: String,
    position: SavedPosition,
) {
    match positions.save_position(&document_id, position).await {
        Ok(()) => debug!(chapter = position.chapter, fraction = position.fraction, "Position saved"),
        Err(err) => warn!("{}", ReaderError::PositionSave(format!("{err:#}"))),
    }
}

fn bookmark_error(err: anyhow::Error) -> ReaderError {
    ReaderError::Bookmark(format!("{err:#}"))
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;
    use std::sync::Mutex;

    use anyhow::{Result, anyhow, bail};
    use pretty_assertions::assert_eq;
    use tokio::sync::mpsc::{self, UnboundedReceiver};

    use super::*;
    use crate::reader::{Bookmark, Chapter, Document, Key, NewBookmark};

    /// Chapters served from memory; earlier chapters answer more slowly
    #[derive(Default)]
    struct MemorySource {
        chapters: Vec<String>,
        failing: Option<usize>,
    }

    impl ContentSource for MemorySource {
        async fn table_of_contents(&self, _document_id: &str) -> Result<Vec<Chapter>> {
            Ok((0..self.chapters.len())
                .map(|index| Chapter { index, id: index.to_string(), title: String::new() })
                .collect())
        }

        async fn chapter_text(&self, _document_id: &str, chapter: usize) -> Result<String> {
            let delay = (self.chapters.len() - chapter.min(self.chapters.len())) as u64;
            tokio::time::sleep(Duration::from_millis(delay * 5)).await;
            if self.failing == Some(chapter) {
                bail!("server unavailable");
            }
            self.chapters.get(chapter).cloned().ok_or_else(|| anyhow!("no chapter {chapter}"))
        }
    }

    #[derive(Default)]
    struct MemoryPositions {
        saved: Mutex<HashMap<String, SavedPosition>>,
        writes: Mutex<usize>,
        broken: bool,
    }

    impl PositionStore for MemoryPositions {
        async fn load_position(&self, document_id: &str) -> Result<Option<SavedPosition>> {
            if self.broken {
                bail!("offline");
            }
            Ok(self.saved.lock().unwrap().get(document_id).copied())
        }

        async fn save_position(&self, document_id: &str, position: SavedPosition) -> Result<()> {
            self.saved.lock().unwrap().insert(document_id.to_string(), position);
            *self.writes.lock().unwrap() += 1;
            Ok(())
        }
    }

    #[derive(Default)]
    struct MemoryBookmarks {
        marks: Vec<Bookmark>,
    }

    impl BookmarkStore for MemoryBookmarks {
        fn list(&self, document_id: &str) -> Result<Vec<Bookmark>> {
            Ok(self.marks.iter().filter(|b| b.book_id == document_id).cloned().collect())
        }

        fn add(&mut self, bookmark: NewBookmark) -> Result<String> {
            let id = format!("bm-{}", self.marks.len());
            self.marks.push(Bookmark {
                id: id.clone(),
                book_id: bookmark.book_id,
                book_title: bookmark.book_title,
                chapter: bookmark.chapter,
                chapter_title: bookmark.chapter_title,
                position: bookmark.position,
                note: bookmark.note,
                created_at: 0,
            });
            Ok(id)
        }

        fn delete(&mut self, id: &str) -> Result<()> {
            self.marks.retain(|b| b.id != id);
            Ok(())
        }
    }

    type Runner = EffectRunner<MemorySource, MemoryPositions, MemoryBookmarks>;

    fn runner(source: MemorySource, positions: MemoryPositions) -> (Runner, UnboundedReceiver<Msg>) {
        let (tx, rx) = mpsc::unbounded_channel();
        let runner =
            EffectRunner::new(Arc::new(source), Arc::new(positions), MemoryBookmarks::default(), tx);
        (runner, rx)
    }

    fn three_chapters() -> MemorySource {
        MemorySource { chapters: vec!["one".into(), "two".into(), "three".into()], failing: None }
    }

    #[tokio::test]
    async fn chapter_fetch_reports_ticket() {
        let (mut runner, mut rx) = runner(three_chapters(), MemoryPositions::default());
        let effect = Effect::FetchChapter { ticket: 7, document_id: "b".into(), chapter: 1 };
        assert!(runner.execute(effect).is_none());

        match rx.recv().await {
            Some(Msg::ChapterLoaded { ticket, chapter, result }) => {
                assert_eq!((ticket, chapter), (7, 1));
                assert_eq!(result, Ok("two".to_string()));
            }
            other => panic!("unexpected message: {other:?}"),
        }
    }

    #[tokio::test]
    async fn all_chapters_arrive_in_order() {
        let (mut runner, mut rx) = runner(three_chapters(), MemoryPositions::default());
        runner.execute(Effect::FetchAllChapters {
            ticket: 1,
            document_id: "b".into(),
            chapter_count: 3,
        });

        match rx.recv().await {
            Some(Msg::AllChaptersLoaded { result, .. }) => {
                assert_eq!(result, Ok(vec!["one".into(), "two".into(), "three".into()]));
            }
            other => panic!("unexpected message: {other:?}"),
        }
    }

    #[tokio::test]
    async fn one_failed_chapter_fails_the_book() {
        let source = MemorySource { failing: Some(2), ..three_chapters() };
        let (mut runner, mut rx) = runner(source, MemoryPositions::default());
        runner.execute(Effect::FetchAllChapters {
            ticket: 1,
            document_id: "b".into(),
            chapter_count: 3,
        });

        match rx.recv().await {
            Some(Msg::AllChaptersLoaded { result: Err(ReaderError::AllChapters(message)), .. }) => {
                assert!(message.contains("Chapter 3"));
            }
            other => panic!("unexpected message: {other:?}"),
        }
    }

    #[tokio::test]
    async fn position_failures_are_tagged() {
        let positions = MemoryPositions { broken: true, ..MemoryPositions::default() };
        let (mut runner, mut rx) = runner(three_chapters(), positions);
        runner.execute(Effect::LoadPosition { document_id: "b".into() });

        assert!(matches!(
            rx.recv().await,
            Some(Msg::PositionLoaded(Err(ReaderError::PositionLoad(_))))
        ));
    }

    #[tokio::test]
    async fn finish_waits_for_saves() {
        let positions = Arc::new(MemoryPositions::default());
        let (tx, _rx) = mpsc::unbounded_channel();
        let mut runner = EffectRunner::new(
            Arc::new(three_chapters()),
            Arc::clone(&positions),
            MemoryBookmarks::default(),
            tx,
        );

        let position = SavedPosition { chapter: 2, fraction: 0.5 };
        runner.execute(Effect::SavePosition { document_id: "b".into(), position });
        runner.finish(Duration::from_secs(2)).await;

        assert_eq!(positions.saved.lock().unwrap().get("b"), Some(&position));
    }

    fn shared_positions() -> (Runner, Arc<MemoryPositions>) {
        let positions = Arc::new(MemoryPositions::default());
        let (tx, _rx) = mpsc::unbounded_channel();
        let runner = EffectRunner::new(
            Arc::new(three_chapters()),
            Arc::clone(&positions),
            MemoryBookmarks::default(),
            tx,
        );
        (runner, positions)
    }

    /// Session that knows its position but is still waiting for chapter text
    fn opening_session() -> ReadingSession {
        let mut session = ReadingSession::new(Document::new("b", "B"), 1.0);
        session.start();
        let chapters = (0..3)
            .map(|index| Chapter { index, id: index.to_string(), title: String::new() })
            .collect();
        session.update(Msg::TocLoaded(Ok(chapters)));
        session.update(Msg::PositionLoaded(Ok(Some(SavedPosition { chapter: 1, fraction: 0.4 }))));
        session
    }

    #[tokio::test]
    async fn shut_down_saves_a_session_left_open() {
        let (runner, positions) = shared_positions();
        let mut session = opening_session();

        runner.shut_down(&mut session, Duration::from_secs(2)).await;

        assert!(session.is_closed());
        let saved = positions.saved.lock().unwrap().get("b").copied();
        assert_eq!(saved, Some(SavedPosition { chapter: 1, fraction: 0.4 }));
        assert_eq!(*positions.writes.lock().unwrap(), 1);
    }

    #[tokio::test]
    async fn shut_down_after_quit_saves_once() {
        let (mut runner, positions) = shared_positions();
        let mut session = opening_session();
        for effect in session.handle_key(Key::Char('q')) {
            runner.execute(effect);
        }

        runner.shut_down(&mut session, Duration::from_secs(2)).await;

        assert_eq!(*positions.writes.lock().unwrap(), 1);
    }

    #[tokio::test]
    async fn bookmark_effects_report_inline() {
        let (mut runner, mut rx) = runner(three_chapters(), MemoryPositions::default());
        runner.execute(Effect::AddBookmark(NewBookmark {
            book_id: "b".into(),
            book_title: "Book".into(),
            chapter: 1,
            chapter_title: String::new(),
            position: 0.5,
            note: String::new(),
        }));
        runner.execute(Effect::ListBookmarks { document_id: "b".into() });

        assert!(matches!(rx.try_recv(), Ok(Msg::BookmarkAdded(Ok(id))) if id == "bm-0"));
        match rx.try_recv() {
            Ok(Msg::BookmarksLoaded(Ok(marks))) => assert_eq!(marks.len(), 1),
            other => panic!("unexpected message: {other:?}"),
        }
    }

    #[test]
    fn host_effects_are_returned() {
        let (tx, _rx) = mpsc::unbounded_channel();
        let mut runner: Runner = EffectRunner::new(
            Arc::new(MemorySource::default()),
            Arc::new(MemoryPositions::default()),
            MemoryBookmarks::default(),
            tx,
        );
        assert_eq!(runner.execute(Effect::Exit), Some(Effect::Exit));
        assert_eq!(
            runner.execute(Effect::PersistTextScale(1.2)),
            Some(Effect::PersistTextScale(1.2))
        );
    }
}
