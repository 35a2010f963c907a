//! Continuous-mode document assembly
//!
//! Every chapter is wrapped at the same width and laid end to end behind a
//! short title banner. The boundary table records where each chapter starts
//! so a line can be mapped back to its chapter and vice versa.

use super::wrap::wrap_into;

/// Lines before each chapter's text: blank, title, blank
const BANNER_LINES: usize = 3;

/// Raw text of one chapter, ready to be stitched
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChapterText {
    /// Chapter index in the table of contents
    pub index: usize,
    /// Chapter title (may be empty)
    pub title: String,
    /// Plain text content
    pub content: String,
}

/// Where a chapter begins in the stitched line sequence
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Boundary {
    /// Chapter index in the table of contents
    chapter: usize,
    /// First line of the chapter (its banner)
    first_line: usize,
}

/// All chapters of a document as one line sequence
#[derive(Debug, Clone, Default)]
pub struct StitchedDocument {
    chapters: Vec<ChapterText>,
    lines: Vec<String>,
    boundaries: Vec<Boundary>,
    width: usize,
}

impl StitchedDocument {
    /// Stitch `chapters`, in the order given, at `width`
    pub fn new(chapters: Vec<ChapterText>, width: usize) -> Self {
        let mut doc = Self { chapters, lines: Vec::new(), boundaries: Vec::new(), width };
        doc.rebuild();
        doc
    }

    /// Rewrap every chapter at a new width, recomputing boundaries
    pub fn rewrap(&mut self, width: usize) {
        self.width = width;
        self.rebuild();
    }

    fn rebuild(&mut self) {
        self.lines.clear();
        self.boundaries.clear();

        for chapter in &self.chapters {
            self.boundaries.push(Boundary { chapter: chapter.index, first_line: self.lines.len() });
            self.lines.push(String::new());
            self.lines.push(banner(chapter));
            self.lines.push(String::new());
            wrap_into(&mut self.lines, &chapter.content, self.width);
        }

        if self.lines.is_empty() {
            self.lines.push(String::new());
        }
    }

    pub fn lines(&self) -> &[String] {
        &self.lines
    }

    /// Chapter that owns `line`: the boundary with the greatest start at or before it
    pub fn chapter_at(&self, line: usize) -> usize {
        let after = self.boundaries.partition_point(|b| b.first_line <= line);
        match after.checked_sub(1) {
            Some(i) => self.boundaries[i].chapter,
            None => self.boundaries.first().map_or(0, |b| b.chapter),
        }
    }

    /// First line of `chapter`, if it is part of the document
    pub fn chapter_start(&self, chapter: usize) -> Option<usize> {
        self.boundaries.iter().find(|b| b.chapter == chapter).map(|b| b.first_line)
    }

    /// Raw text of a stitched chapter
    pub fn chapter_text(&self, chapter: usize) -> Option<&str> {
        self.chapters.iter().find(|c| c.index == chapter).map(|c| c.content.as_str())
    }

    /// Line range `[start, end)` of the chapter's own text, banner excluded
    pub fn chapter_body(&self, chapter: usize) -> Option<(usize, usize)> {
        let (start, end) = self.chapter_range(chapter)?;
        Some(((start + BANNER_LINES).min(end), end))
    }

    /// Whether `line` is a chapter title banner
    pub fn is_banner(&self, line: usize) -> bool {
        let after = self.boundaries.partition_point(|b| b.first_line < line);
        after
            .checked_sub(1)
            .is_some_and(|i| self.boundaries[i].first_line + 1 == line)
    }

    /// Line range `[start, end)` occupied by `chapter`, banner included
    pub fn chapter_range(&self, chapter: usize) -> Option<(usize, usize)> {
        let pos = self.boundaries.iter().position(|b| b.chapter == chapter)?;
        let start = self.boundaries[pos].first_line;
        let end = self.boundaries.get(pos + 1).map_or(self.lines.len(), |b| b.first_line);
        Some((start, end))
    }
}

/// Decorated title line that opens a chapter
fn banner(chapter: &ChapterText) -> String {
    let title = chapter.title.trim();
    if title.is_empty() {
        format!("━━━ Chapter {} ━━━", chapter.index + 1)
    } else {
        format!("━━━ {} ━━━", title)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use proptest::prelude::*;

    fn chapter(index: usize, title: &str, content: &str) -> ChapterText {
        ChapterText { index, title: title.into(), content: content.into() }
    }

    fn sample() -> StitchedDocument {
        StitchedDocument::new(
            vec![
                chapter(0, "Opening", "first chapter text"),
                chapter(1, "", "second\n\nchapter"),
                chapter(2, "Close", "end"),
            ],
            40,
        )
    }

    #[test]
    fn banners_precede_each_chapter() {
        let doc = sample();
        assert_eq!(
            doc.lines(),
            &[
                "",
                "━━━ Opening ━━━",
                "",
                "first chapter text",
                "",
                "━━━ Chapter 2 ━━━",
                "",
                "second",
                "",
                "chapter",
                "",
                "━━━ Close ━━━",
                "",
                "end",
            ]
        );
    }

    #[test]
    fn boundaries_start_at_zero_and_increase() {
        let doc = sample();
        let starts: Vec<_> = (0..3).map(|c| doc.chapter_start(c)).collect();
        assert_eq!(starts, vec![Some(0), Some(4), Some(10)]);
    }

    #[test]
    fn chapter_lookup_both_directions() {
        let doc = sample();
        assert_eq!(doc.chapter_at(0), 0);
        assert_eq!(doc.chapter_at(3), 0);
        assert_eq!(doc.chapter_at(4), 1);
        assert_eq!(doc.chapter_at(13), 2);
        assert_eq!(doc.chapter_at(500), 2);
        assert_eq!(doc.chapter_start(1), Some(4));
        assert_eq!(doc.chapter_start(9), None);
        assert_eq!(doc.chapter_range(1), Some((4, 10)));
        assert_eq!(doc.chapter_range(2), Some((10, 14)));
    }

    #[test]
    fn body_range_skips_the_banner() {
        let doc = sample();
        assert_eq!(doc.chapter_body(0), Some((3, 4)));
        assert_eq!(doc.chapter_body(1), Some((7, 10)));
        assert_eq!(doc.chapter_body(5), None);
    }

    #[test]
    fn banners_are_found_by_line() {
        let doc = StitchedDocument::new(
            vec![chapter(0, "A", "━━━ not a title"), chapter(1, "B", "text")],
            40,
        );
        let banners: Vec<usize> =
            (0..doc.lines().len()).filter(|&line| doc.is_banner(line)).collect();
        assert_eq!(banners, vec![1, 5]);
        assert!(doc.lines()[3].starts_with('━'));
    }

    #[test]
    fn raw_chapter_text_is_kept() {
        let doc = sample();
        assert_eq!(doc.chapter_text(1), Some("second\n\nchapter"));
        assert_eq!(doc.chapter_text(3), None);
    }

    #[test]
    fn rewrap_moves_boundaries() {
        let mut doc = StitchedDocument::new(
            vec![
                chapter(0, "A", "one two three four five six seven eight nine ten eleven"),
                chapter(1, "B", "tail"),
            ],
            80,
        );
        assert_eq!(doc.chapter_start(1), Some(4));
        doc.rewrap(20);
        assert!(doc.chapter_start(1).unwrap() > 4);
        assert_eq!(doc.chapter_at(doc.chapter_start(1).unwrap()), 1);
    }

    #[test]
    fn empty_document_still_has_a_line() {
        let doc = StitchedDocument::new(Vec::new(), 40);
        assert_eq!(doc.lines().len(), 1);
        assert_eq!(doc.chapter_at(0), 0);
    }

    proptest! {
        #[test]
        fn chapter_at_is_monotone_and_onto(
            a in "[a-z \n]{0,120}",
            b in "[a-z \n]{0,120}",
            c in "[a-z \n]{0,120}",
            width in 20usize..60,
        ) {
            let doc = StitchedDocument::new(
                vec![chapter(0, "A", &a), chapter(1, "B", &b), chapter(2, "C", &c)],
                width,
            );
            let owners: Vec<usize> = (0..doc.lines().len()).map(|l| doc.chapter_at(l)).collect();
            prop_assert!(owners.windows(2).all(|w| w[0] <= w[1]));
            for ch in 0..3 {
                prop_assert!(owners.contains(&ch));
            }
        }
    }
}
