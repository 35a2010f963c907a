//! UI rendering components

pub mod dialog;
pub mod layout;
pub mod progress;
pub mod reader;

use ratatui::{Frame, style::Style, widgets::Block};

use crate::reader::{InputMode, ReadingSession};
use crate::theme::Theme;

/// Main draw function
pub fn draw(frame: &mut Frame, session: &ReadingSession, theme: &Theme) {
    let area = frame.area();
    frame.render_widget(Block::default().style(Style::default().bg(theme.background)), area);

    let areas = layout::reader_areas(area);
    reader::draw(frame, &areas, session, theme);

    match session.input_mode() {
        InputMode::TableOfContents { cursor } => {
            dialog::draw_table_of_contents(frame, area, session, *cursor, theme);
        }
        InputMode::BookmarkList { cursor } => {
            dialog::draw_bookmarks(frame, area, session, *cursor, theme);
        }
        InputMode::Normal | InputMode::SearchInput { .. } => {}
    }
}
