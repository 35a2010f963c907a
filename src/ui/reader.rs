//! The reading view: header, text, and footer

use ratatui::{
    Frame,
    layout::{Alignment, Rect},
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::Paragraph,
};

use super::layout::{ReaderAreas, truncate};
use super::progress::{percent, progress_bar};
use crate::reader::{Highlight, InputMode, ReadingMode, ReadingSession, VisibleLine};
use crate::theme::Theme;

/// Width of each header progress bar
const BAR_WIDTH: usize = 10;

/// Draw the reader into `areas`
pub fn draw(frame: &mut Frame, areas: &ReaderAreas, session: &ReadingSession, theme: &Theme) {
    draw_header(frame, areas.header, session, theme);
    draw_rule(frame, areas.top_rule, theme);
    draw_content(frame, areas.content, session, theme);
    draw_rule(frame, areas.bottom_rule, theme);
    draw_message(frame, areas.message, session, theme);
    draw_footer(frame, areas.footer, session, theme);
}

fn draw_header(frame: &mut Frame, area: Rect, session: &ReadingSession, theme: &Theme) {
    let metrics = session.header_metrics();
    let muted = Style::default().fg(theme.muted);

    let title_width = (area.width as usize / 3).max(10);
    let title = truncate(&metrics.document_title, title_width);
    let chapter = if metrics.chapter_count == 0 {
        " Ch -/- ".to_string()
    } else {
        format!(
            " Ch {}/{}: {} ",
            metrics.chapter_index + 1,
            metrics.chapter_count,
            truncate(&metrics.chapter_title, 20)
        )
    };

    let mut left = vec![
        Span::styled(
            format!(" {} ", title),
            Style::default().fg(theme.primary).add_modifier(Modifier::BOLD),
        ),
        Span::styled(chapter, Style::default().fg(theme.secondary)),
    ];

    let chapter_bar = progress_bar(BAR_WIDTH, metrics.chapter_progress);
    let book_bar = progress_bar(BAR_WIDTH, metrics.book_progress);
    let right = vec![
        Span::styled("Ch:", muted),
        Span::styled(chapter_bar, Style::default().fg(theme.secondary)),
        Span::styled(" Book:", muted),
        Span::styled(book_bar, Style::default().fg(theme.primary)),
        Span::styled(
            format!(" {}% ", percent(metrics.book_progress)),
            Style::default().fg(theme.foreground).add_modifier(Modifier::BOLD),
        ),
    ];

    let used: usize = left.iter().chain(right.iter()).map(|s| s.width()).sum();
    let gap = (area.width as usize).saturating_sub(used);
    left.push(Span::raw(" ".repeat(gap)));
    left.extend(right);

    let header = Paragraph::new(Line::from(left)).style(Style::default().bg(theme.background));
    frame.render_widget(header, area);
}

fn draw_rule(frame: &mut Frame, area: Rect, theme: &Theme) {
    let rule = Line::from(Span::styled(
        "\u{2500}".repeat(area.width as usize), // ─ horizontal line
        Style::default().fg(theme.border),
    ));
    frame.render_widget(Paragraph::new(rule).style(Style::default().bg(theme.background)), area);
}

fn draw_content(frame: &mut Frame, area: Rect, session: &ReadingSession, theme: &Theme) {
    let base = Style::default().fg(theme.foreground).bg(theme.background);

    if !session.has_content() {
        let text = if session.is_loading() { "Loading…" } else { "Nothing to show" };
        let y = area.y + area.height / 2;
        let msg = Paragraph::new(text)
            .style(Style::default().fg(theme.muted).bg(theme.background))
            .alignment(Alignment::Center);
        frame.render_widget(msg, Rect { y, height: 1.min(area.height), ..area });
        return;
    }

    let lines: Vec<Line> = session
        .visible_lines()
        .iter()
        .map(|line| render_line(line, theme))
        .collect();

    frame.render_widget(Paragraph::new(lines).style(base), area);
}

/// One visible line with its search highlights
fn render_line<'a>(line: &VisibleLine<'a>, theme: &Theme) -> Line<'a> {
    if line.is_banner {
        return Line::from(Span::styled(
            line.text,
            Style::default().fg(theme.primary).add_modifier(Modifier::BOLD),
        ))
        .alignment(Alignment::Center);
    }
    if !line.is_highlighted() {
        return Line::from(line.text);
    }

    let spans = segments(line.text, &line.highlights)
        .into_iter()
        .map(|(text, kind)| match kind {
            Segment::Plain => Span::raw(text),
            Segment::Match => {
                Span::styled(text, Style::default().fg(theme.foreground).bg(theme.highlight))
            }
            Segment::Current => Span::styled(
                text,
                Style::default()
                    .fg(theme.background)
                    .bg(theme.highlight_current)
                    .add_modifier(Modifier::BOLD),
            ),
        })
        .collect::<Vec<_>>();
    Line::from(spans)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Segment {
    Plain,
    Match,
    Current,
}

/// Split `text` into runs by highlight kind.
///
/// Highlights are in characters and may overlap; the selected match wins.
fn segments(text: &str, highlights: &[Highlight]) -> Vec<(String, Segment)> {
    let kind_at = |i: usize| {
        let covering = highlights.iter().filter(|h| h.start <= i && i < h.end);
        let mut kind = Segment::Plain;
        for h in covering {
            if h.current {
                return Segment::Current;
            }
            kind = Segment::Match;
        }
        kind
    };

    let mut out: Vec<(String, Segment)> = Vec::new();
    for (i, c) in text.chars().enumerate() {
        let kind = kind_at(i);
        match out.last_mut() {
            Some((run, last)) if *last == kind => run.push(c),
            _ => out.push((c.to_string(), kind)),
        }
    }
    out
}

/// Error or status line under the text
fn draw_message(frame: &mut Frame, area: Rect, session: &ReadingSession, theme: &Theme) {
    let line = if let Some(err) = session.error().filter(|err| err.is_user_visible()) {
        Line::from(vec![
            Span::styled(format!(" {} ", err), Style::default().fg(theme.error)),
            Span::styled(" r", Style::default().fg(theme.secondary)),
            Span::styled(" retry  ", Style::default().fg(theme.muted)),
            Span::styled("esc", Style::default().fg(theme.secondary)),
            Span::styled(" dismiss", Style::default().fg(theme.muted)),
        ])
    } else if let Some(status) = session.status() {
        Line::from(Span::styled(format!(" {}", status), Style::default().fg(theme.success)))
    } else if session.is_loading() && session.has_content() {
        Line::from(Span::styled(" Loading…", Style::default().fg(theme.muted)))
    } else {
        Line::default()
    };

    frame.render_widget(Paragraph::new(line).style(Style::default().bg(theme.background)), area);
}

fn draw_footer(frame: &mut Frame, area: Rect, session: &ReadingSession, theme: &Theme) {
    let footer = Paragraph::new(Line::from(footer_spans(session, theme)))
        .style(Style::default().bg(theme.background));
    frame.render_widget(footer, area);
}

fn footer_spans(session: &ReadingSession, theme: &Theme) -> Vec<Span<'static>> {
    let key = Style::default().fg(theme.secondary);
    let help = Style::default().fg(theme.muted);
    let hint = |k: &str, text: String| {
        [Span::styled(k.to_string(), key), Span::styled(format!(" {}  ", text), help)]
    };

    if let InputMode::SearchInput { query } = session.input_mode() {
        let mut spans = vec![
            Span::styled("/", key),
            Span::styled(format!("{}_  ", query), Style::default().fg(theme.foreground)),
        ];
        spans.extend(hint("enter", "search".into()));
        spans.extend(hint("esc", "cancel".into()));
        return spans;
    }

    if let Some(search) = session.search() {
        let mut spans = vec![Span::styled(
            format!("/{}", search.query()),
            Style::default().fg(theme.foreground),
        )];
        match search.current_index() {
            Some(i) => spans.push(Span::styled(format!(" [{}/{}]  ", i + 1, search.len()), key)),
            None => spans.push(Span::styled(" [No matches]  ", Style::default().fg(theme.error))),
        }
        spans.extend(hint("n/N", "next/prev".into()));
        spans.extend(hint("esc", "clear".into()));
        return spans;
    }

    let mode = match session.mode() {
        ReadingMode::Paged => "paged",
        ReadingMode::Continuous => "scroll",
    };
    let scale = format!("{:.0}%", session.text_scale() * 100.0);

    [
        hint("j/k", "scroll".into()),
        hint("h/l", "chapter".into()),
        hint("t", "toc".into()),
        hint("/", "find".into()),
        hint("b/B", "marks".into()),
        hint("c", mode.into()),
        hint("+/-", scale),
        hint("q", "quit".into()),
    ]
    .into_iter()
    .flatten()
    .collect()
}
