//! Greedy word wrapping of chapter text into display lines
//!
//! Paragraphs are separated by `\n`. Blank paragraphs become exactly one
//! empty line, so the blank-line structure of the source survives wrapping.
//! Words are never split: a word wider than the target width is placed on
//! its own line and overflows it.

use crate::config::MIN_WRAP_WIDTH;

/// Wrap `text` to lines of at most `width` characters.
///
/// Always returns at least one line.
pub fn wrap(text: &str, width: usize) -> Vec<String> {
    let mut lines = Vec::new();
    wrap_into(&mut lines, text, width);
    lines
}

/// Wrap `text` and append the resulting lines to `lines`
pub fn wrap_into(lines: &mut Vec<String>, text: &str, width: usize) {
    for paragraph in text.split('\n') {
        let mut current = String::new();
        let mut current_len = 0;

        for word in paragraph.split_whitespace() {
            let word_len = word.chars().count();
            if current_len == 0 {
                current.push_str(word);
                current_len = word_len;
            } else if current_len + 1 + word_len <= width {
                current.push(' ');
                current.push_str(word);
                current_len += 1 + word_len;
            } else {
                lines.push(std::mem::take(&mut current));
                current.push_str(word);
                current_len = word_len;
            }
        }

        // An all-whitespace paragraph falls through with an empty buffer
        // and still contributes its one blank line.
        lines.push(current);
    }
}

/// Width used for wrapping at the given text scale.
///
/// A larger scale gives narrower lines, simulating bigger text. The result
/// never exceeds `base_width` and never drops below [`MIN_WRAP_WIDTH`].
pub fn scaled_width(base_width: usize, scale: f64) -> usize {
    let scaled = if scale > 0.0 { (base_width as f64 / scale) as usize } else { base_width };
    scaled.max(MIN_WRAP_WIDTH).min(base_width.max(MIN_WRAP_WIDTH))
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use proptest::prelude::*;

    #[test]
    fn wraps_greedily_at_width() {
        assert_eq!(wrap("alpha beta gamma", 10), vec!["alpha beta", "gamma"]);
    }

    #[test]
    fn empty_text_yields_one_empty_line() {
        assert_eq!(wrap("", 40), vec![""]);
    }

    #[test]
    fn blank_paragraphs_are_preserved() {
        let lines = wrap("one\n\n\ntwo", 40);
        assert_eq!(lines, vec!["one", "", "", "two"]);
    }

    #[test]
    fn whitespace_only_paragraph_is_blank_line() {
        assert_eq!(wrap("a\n   \t \nb", 40), vec!["a", "", "b"]);
    }

    #[test]
    fn long_word_overflows_instead_of_splitting() {
        let word = "x".repeat(30);
        let text = format!("short {} tail", word);
        assert_eq!(wrap(&text, 20), vec!["short".to_string(), word, "tail".to_string()]);
    }

    #[test]
    fn collapses_runs_of_spaces() {
        assert_eq!(wrap("a    b  c", 40), vec!["a b c"]);
    }

    #[test]
    fn counts_characters_not_bytes() {
        // Each word is 5 chars but 10 bytes
        assert_eq!(wrap("ééééé ééééé", 11), vec!["ééééé ééééé"]);
    }

    #[test]
    fn wrap_into_appends() {
        let mut lines = vec!["header".to_string()];
        wrap_into(&mut lines, "body text", 40);
        assert_eq!(lines, vec!["header", "body text"]);
    }

    #[test]
    fn scaled_width_clamps() {
        assert_eq!(scaled_width(76, 1.0), 76);
        assert_eq!(scaled_width(76, 2.0), 38);
        // Smaller scale never widens past the base
        assert_eq!(scaled_width(76, 0.5), 76);
        assert_eq!(scaled_width(30, 2.0), MIN_WRAP_WIDTH);
        assert_eq!(scaled_width(10, 1.0), MIN_WRAP_WIDTH);
    }

    proptest! {
        #[test]
        fn lines_fit_width_unless_single_long_word(
            text in "[a-z \n]{0,300}",
            width in 20usize..80,
        ) {
            for line in wrap(&text, width) {
                let len = line.chars().count();
                prop_assert!(len <= width || !line.contains(' '));
            }
        }

        #[test]
        fn blank_line_count_matches_source(text in "[a-z \n]{0,300}", width in 20usize..80) {
            let source_blank = text.split('\n').filter(|p| p.trim().is_empty()).count();
            let output_blank = wrap(&text, width).iter().filter(|l| l.is_empty()).count();
            prop_assert_eq!(source_blank, output_blank);
        }

        #[test]
        fn wrapping_is_deterministic(text in "[a-z \n]{0,200}", width in 20usize..80) {
            prop_assert_eq!(wrap(&text, width), wrap(&text, width));
        }
    }
}
