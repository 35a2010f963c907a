//! Conversion of terminal key events into reader keys

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

use crate::reader::Key;

/// Reader key for a crossterm key code (without modifiers)
pub fn key_code_to_key(code: KeyCode) -> Option<Key> {
    match code {
        KeyCode::Char(c) => Some(Key::Char(c)),
        KeyCode::Up => Some(Key::Up),
        KeyCode::Down => Some(Key::Down),
        KeyCode::Left => Some(Key::Left),
        KeyCode::Right => Some(Key::Right),
        KeyCode::PageUp => Some(Key::PageUp),
        KeyCode::PageDown => Some(Key::PageDown),
        KeyCode::Home => Some(Key::Home),
        KeyCode::End => Some(Key::End),
        KeyCode::Enter => Some(Key::Enter),
        KeyCode::Esc => Some(Key::Esc),
        KeyCode::Backspace => Some(Key::Backspace),
        KeyCode::Tab => Some(Key::Tab),
        _ => None,
    }
}

/// Key mapping with modifiers (for Ctrl combinations)
pub fn key_event_to_key(event: KeyEvent) -> Option<Key> {
    if event.modifiers.contains(KeyModifiers::CONTROL) {
        match event.code {
            KeyCode::Char(c) => Some(Key::Ctrl(c.to_ascii_lowercase())),
            _ => key_code_to_key(event.code),
        }
    } else {
        key_code_to_key(event.code)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn event(code: KeyCode, modifiers: KeyModifiers) -> KeyEvent {
        KeyEvent::new(code, modifiers)
    }

    #[test]
    fn plain_char_maps_to_char() {
        assert_eq!(key_code_to_key(KeyCode::Char('j')), Some(Key::Char('j')));
    }

    #[test]
    fn shifted_char_keeps_case() {
        assert_eq!(
            key_event_to_key(event(KeyCode::Char('G'), KeyModifiers::SHIFT)),
            Some(Key::Char('G'))
        );
    }

    #[test]
    fn ctrl_d_maps_to_ctrl() {
        assert_eq!(
            key_event_to_key(event(KeyCode::Char('d'), KeyModifiers::CONTROL)),
            Some(Key::Ctrl('d'))
        );
    }

    #[test]
    fn ctrl_with_shift_is_lowercased() {
        assert_eq!(
            key_event_to_key(event(
                KeyCode::Char('U'),
                KeyModifiers::CONTROL | KeyModifiers::SHIFT
            )),
            Some(Key::Ctrl('u'))
        );
    }

    #[test]
    fn ctrl_arrow_is_plain_arrow() {
        assert_eq!(key_event_to_key(event(KeyCode::Down, KeyModifiers::CONTROL)), Some(Key::Down));
    }

    #[test]
    fn function_keys_are_ignored() {
        assert_eq!(key_code_to_key(KeyCode::F(1)), None);
    }
}
