//! Layout utilities and common components

use ratatui::layout::{Constraint, Layout, Rect};

use crate::reader::HORIZONTAL_PADDING;

/// Areas of the reader screen, top to bottom
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReaderAreas {
    pub header: Rect,
    pub top_rule: Rect,
    pub content: Rect,
    pub bottom_rule: Rect,
    pub message: Rect,
    pub footer: Rect,
}

/// Split the screen. Fixed rows add up to the session's chrome rows.
pub fn reader_areas(area: Rect) -> ReaderAreas {
    let [header, top_rule, content, bottom_rule, message, footer] = Layout::vertical([
        Constraint::Length(1),
        Constraint::Length(1),
        Constraint::Min(1),
        Constraint::Length(1),
        Constraint::Length(1),
        Constraint::Length(1),
    ])
    .areas(area);

    let pad = HORIZONTAL_PADDING / 2;
    let content = Rect {
        x: content.x + pad.min(content.width),
        width: content.width.saturating_sub(HORIZONTAL_PADDING),
        ..content
    };

    ReaderAreas { header, top_rule, content, bottom_rule, message, footer }
}

/// Create a centered rectangle with the given percentage of width and height
pub fn centered_rect(percent_x: u16, percent_y: u16, r: Rect) -> Rect {
    let popup_layout = Layout::vertical([
        Constraint::Percentage((100 - percent_y) / 2),
        Constraint::Percentage(percent_y),
        Constraint::Percentage((100 - percent_y) / 2),
    ])
    .split(r);

    Layout::horizontal([
        Constraint::Percentage((100 - percent_x) / 2),
        Constraint::Percentage(percent_x),
        Constraint::Percentage((100 - percent_x) / 2),
    ])
    .split(popup_layout[1])[1]
}

/// Truncate to `max_chars` characters, ending in an ellipsis when cut
pub fn truncate(s: &str, max_chars: usize) -> String {
    if s.chars().count() <= max_chars {
        return s.to_string();
    }
    if max_chars == 0 {
        return String::new();
    }
    let mut out: String = s.chars().take(max_chars - 1).collect();
    out.push('…');
    out
}

/// First and one-past-last rows of a list window of `height` rows that keeps `cursor` visible
pub fn list_window(cursor: usize, len: usize, height: usize) -> (usize, usize) {
    if len <= height {
        return (0, len);
    }
    let half = height / 2;
    let start = cursor.saturating_sub(half).min(len - height);
    (start, start + height)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::reader::CHROME_ROWS;

    #[test]
    fn fixed_rows_match_chrome() {
        let areas = reader_areas(Rect::new(0, 0, 80, 24));
        assert_eq!(areas.content.height, 24 - CHROME_ROWS);
        assert_eq!(areas.content.width, 76);
        assert_eq!(areas.content.x, 2);
        assert_eq!(areas.footer.y, 23);
    }

    #[test]
    fn truncate_short() {
        assert_eq!(truncate("hello", 10), "hello");
    }

    #[test]
    fn truncate_long_counts_chars() {
        assert_eq!(truncate("Ünïcödé title", 6), "Ünïcö…");
    }

    #[test]
    fn truncate_to_zero() {
        assert_eq!(truncate("abc", 0), "");
    }

    #[test]
    fn list_window_fits() {
        assert_eq!(list_window(3, 5, 10), (0, 5));
    }

    #[test]
    fn list_window_follows_cursor() {
        assert_eq!(list_window(0, 100, 10), (0, 10));
        assert_eq!(list_window(50, 100, 10), (45, 55));
        assert_eq!(list_window(99, 100, 10), (90, 100));
    }
}
