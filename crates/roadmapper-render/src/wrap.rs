//! Greedy word wrapping by measured width.

use roadmapper_core::{TextMeasurer, TextStyle};

/// Split `text` into lines no wider than `max_width`.
///
/// Existing line breaks are kept. A single word wider than the limit gets a
/// line of its own rather than being broken.
pub fn wrap_text(
    text: &str,
    style: &TextStyle,
    max_width: f32,
    measurer: &dyn TextMeasurer,
) -> Vec<String> {
    let mut lines = Vec::new();
    for paragraph in text.lines() {
        let mut line = String::new();
        for word in paragraph.split_whitespace() {
            if line.is_empty() {
                line.push_str(word);
                continue;
            }
            let candidate = format!("{line} {word}");
            if measurer.width(&candidate, style) <= max_width {
                line = candidate;
            } else {
                lines.push(std::mem::take(&mut line));
                line.push_str(word);
            }
        }
        lines.push(line);
    }
    lines
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use roadmapper_core::TextMetrics;

    /// Every character is one unit wide.
    struct Mono;

    impl TextMeasurer for Mono {
        fn measure(&self, text: &str, _style: &TextStyle) -> TextMetrics {
            TextMetrics {
                width: text.chars().count() as f32,
                ascent: 1.0,
                descent: 0.0,
            }
        }
    }

    #[test]
    fn wraps_at_word_boundaries() {
        let lines = wrap_text("one two three four", &TextStyle::default(), 9.0, &Mono);
        assert_eq!(lines, vec!["one two", "three", "four"]);
    }

    #[test]
    fn long_words_keep_their_own_line() {
        let lines = wrap_text("a extraordinarily b", &TextStyle::default(), 5.0, &Mono);
        assert_eq!(lines, vec!["a", "extraordinarily", "b"]);
    }

    #[test]
    fn keeps_paragraph_breaks() {
        let lines = wrap_text("first\n\nsecond", &TextStyle::default(), 50.0, &Mono);
        assert_eq!(lines, vec!["first", "", "second"]);
    }
}
