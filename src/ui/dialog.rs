//! Table of contents and bookmark overlays

use std::time::{Duration, SystemTime, UNIX_EPOCH};

use ratatui::{
    Frame,
    layout::Rect,
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Paragraph},
};

use super::layout::{centered_rect, list_window, truncate};
use super::progress::percent;
use crate::reader::ReadingSession;
use crate::theme::Theme;

/// Draw the table of contents with the cursor on `cursor`
pub fn draw_table_of_contents(
    frame: &mut Frame,
    area: Rect,
    session: &ReadingSession,
    cursor: usize,
    theme: &Theme,
) {
    let help = " [j/k] move  [Enter] go  [Esc] close ";
    let inner = open_overlay(frame, area, " Contents ", help, theme);
    let chapters = session.chapters();

    if chapters.is_empty() {
        draw_empty_message(frame, inner, theme, "No chapters");
        return;
    }

    let width = inner.width as usize;
    let (start, end) = list_window(cursor, chapters.len(), inner.height as usize);
    let lines: Vec<Line> = chapters[start..end]
        .iter()
        .enumerate()
        .map(|(offset, chapter)| {
            let index = start + offset;
            let marker = if index == session.current_chapter() { "●" } else { " " };
            let title = if chapter.title.trim().is_empty() {
                format!("Chapter {}", index + 1)
            } else {
                chapter.title.trim().to_string()
            };
            let text = truncate(&format!(" {} {:>3}. {}", marker, index + 1, title), width);
            Line::from(Span::styled(text, row_style(index == cursor, theme)))
        })
        .collect();

    frame.render_widget(Paragraph::new(lines), inner);
}

/// Draw the bookmark list for the open document
pub fn draw_bookmarks(
    frame: &mut Frame,
    area: Rect,
    session: &ReadingSession,
    cursor: usize,
    theme: &Theme,
) {
    let inner = open_overlay(
        frame,
        area,
        " Bookmarks ",
        " [j/k] move  [Enter] jump  [d] delete  [Esc] close ",
        theme,
    );
    let bookmarks = session.bookmarks();

    if bookmarks.is_empty() {
        draw_empty_message(frame, inner, theme, "No bookmarks yet. Press B to add one.");
        return;
    }

    let width = inner.width as usize;
    let (start, end) = list_window(cursor, bookmarks.len(), inner.height as usize);
    let lines: Vec<Line> = bookmarks[start..end]
        .iter()
        .enumerate()
        .map(|(offset, mark)| {
            let index = start + offset;
            let selected = index == cursor;
            let detail = format!(
                "  {}%  {}",
                percent(mark.position),
                format_timestamp(mark.created_at)
            );
            let label = if mark.chapter_title.is_empty() {
                format!(" Ch {}", mark.chapter + 1)
            } else {
                format!(" Ch {}: {}", mark.chapter + 1, mark.chapter_title)
            };
            let label = truncate(&label, width.saturating_sub(detail.chars().count()));

            let detail_style =
                if selected { row_style(true, theme) } else { Style::default().fg(theme.muted) };
            Line::from(vec![
                Span::styled(label, row_style(selected, theme)),
                Span::styled(detail, detail_style),
            ])
        })
        .collect();

    frame.render_widget(Paragraph::new(lines), inner);
}

/// Clear a centered overlay, draw its frame, and return the inner area
fn open_overlay(frame: &mut Frame, area: Rect, title: &str, help: &str, theme: &Theme) -> Rect {
    let overlay_area = centered_rect(60, 70, area);
    frame.render_widget(Clear, overlay_area);

    let block = Block::default()
        .title(title.to_string())
        .title_bottom(Line::from(help.to_string()).centered())
        .borders(Borders::ALL)
        .border_style(Style::default().fg(theme.primary))
        .style(Style::default().bg(theme.background));

    let inner = block.inner(overlay_area);
    frame.render_widget(block, overlay_area);
    inner
}

fn row_style(selected: bool, theme: &Theme) -> Style {
    if selected {
        Style::default().fg(theme.selection_text).bg(theme.selection).add_modifier(Modifier::BOLD)
    } else {
        Style::default().fg(theme.foreground)
    }
}

/// Draw an empty message centered in the area
fn draw_empty_message(frame: &mut Frame, area: Rect, theme: &Theme, msg: &str) {
    let msg = Paragraph::new(msg.to_string()).style(Style::default().fg(theme.muted)).centered();
    let y = area.y + area.height / 2;
    frame.render_widget(msg, Rect { y, height: 1.min(area.height), ..area });
}

/// Format a Unix timestamp as a relative time
fn format_timestamp(timestamp: i64) -> String {
    if timestamp <= 0 {
        return String::new();
    }
    let created = UNIX_EPOCH + Duration::from_secs(timestamp as u64);
    let elapsed = SystemTime::now().duration_since(created).unwrap_or(Duration::ZERO).as_secs();

    match elapsed {
        0..60 => "just now".to_string(),
        60..3600 => format!("{}m ago", elapsed / 60),
        3600..86400 => format!("{}h ago", elapsed / 3600),
        _ => format!("{}d ago", elapsed / 86400),
    }
}
