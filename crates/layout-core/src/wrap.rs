//! Greedy word wrapping.
//!
//! Words are never split. A word wider than the limit is placed alone on
//! its own line and is allowed to overflow.

/// Pixel measurement of a run of text.
///
/// Implementations decide how emoji are measured; the wrapper only sees
/// the resulting widths.
pub trait TextMeasure {
    /// Rendered width of `text` in pixels.
    fn text_width(&self, text: &str) -> f32;

    /// Descent-inclusive height of `text`'s ink box, measured from the top
    /// of the draw origin. Depends on the actual glyphs in `text`.
    fn text_height(&self, text: &str) -> f32;
}

impl<M: TextMeasure + ?Sized> TextMeasure for &M {
    fn text_width(&self, text: &str) -> f32 {
        (**self).text_width(text)
    }

    fn text_height(&self, text: &str) -> f32 {
        (**self).text_height(text)
    }
}

/// A single output line of the wrapper.
#[derive(Debug, Clone, PartialEq)]
pub struct WrappedLine {
    pub text: String,

    /// Measured width in pixels.
    pub width: f32,

    /// Measured height in pixels; used as this line's vertical advance.
    pub height: f32,
}

/// Wrap `text` so no line is wider than `max_width`.
///
/// Paragraphs are separated by `\n` and words by single spaces. Each
/// paragraph is filled greedily: the next word joins the current line when
/// `line + " " + word` still fits, otherwise the line is closed and the word
/// starts the next one.
pub fn wrap_text<M: TextMeasure + ?Sized>(
    text: &str,
    measure: &M,
    max_width: f32,
) -> Vec<WrappedLine> {
    let mut lines = Vec::new();

    for paragraph in text.split('\n') {
        let mut line = String::new();

        for word in paragraph.split(' ') {
            let candidate = if line.is_empty() {
                word.to_string()
            } else {
                format!("{line} {word}")
            };

            if measure.text_width(&candidate) <= max_width {
                line = candidate;
            } else {
                if !line.is_empty() {
                    lines.push(measured_line(std::mem::take(&mut line), measure));
                }
                line = word.to_string();
            }
        }

        if !line.is_empty() {
            lines.push(measured_line(line, measure));
        }
    }

    lines
}

fn measured_line<M: TextMeasure + ?Sized>(text: String, measure: &M) -> WrappedLine {
    WrappedLine {
        width: measure.text_width(&text),
        height: measure.text_height(&text),
        text,
    }
}

/// Top edge of each line when stacked from `top`, each advancing by the
/// previous line's own height.
pub fn stack_lines(lines: &[WrappedLine], top: i32) -> Vec<i32> {
    let mut y = top as f32;
    lines
        .iter()
        .map(|line| {
            let current = y.floor() as i32;
            y += line.height;
            current
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Every char is 10px wide; lines containing 'g' are taller.
    struct Monospace;

    impl TextMeasure for Monospace {
        fn text_width(&self, text: &str) -> f32 {
            text.chars().count() as f32 * 10.0
        }

        fn text_height(&self, text: &str) -> f32 {
            if text.contains('g') {
                24.0
            } else {
                20.0
            }
        }
    }

    fn texts(lines: &[WrappedLine]) -> Vec<&str> {
        lines.iter().map(|l| l.text.as_str()).collect()
    }

    #[test]
    fn test_fits_on_one_line() {
        let lines = wrap_text("hello world", &Monospace, 110.0);
        assert_eq!(texts(&lines), vec!["hello world"]);
        assert_eq!(lines[0].width, 110.0);
    }

    #[test]
    fn test_breaks_between_words() {
        let lines = wrap_text("aaa bbb ccc ddd", &Monospace, 70.0);
        assert_eq!(texts(&lines), vec!["aaa bbb", "ccc ddd"]);
    }

    #[test]
    fn test_overlong_word_gets_own_line() {
        let lines = wrap_text("a verylongword b", &Monospace, 50.0);
        assert_eq!(texts(&lines), vec!["a", "verylongword", "b"]);
        assert!(lines[1].width > 50.0);
    }

    #[test]
    fn test_paragraph_breaks_are_kept() {
        let lines = wrap_text("one two\nthree", &Monospace, 1000.0);
        assert_eq!(texts(&lines), vec!["one two", "three"]);
    }

    #[test]
    fn test_empty_paragraphs_produce_no_lines() {
        let lines = wrap_text("one\n\ntwo", &Monospace, 1000.0);
        assert_eq!(texts(&lines), vec!["one", "two"]);
        assert!(wrap_text("", &Monospace, 100.0).is_empty());
    }

    #[test]
    fn test_height_is_per_line() {
        let lines = wrap_text("abc\ngig", &Monospace, 1000.0);
        assert_eq!(lines[0].height, 20.0);
        assert_eq!(lines[1].height, 24.0);
    }

    #[test]
    fn test_stack_lines_uses_each_height() {
        let lines = wrap_text("abc\ngig\nxyz", &Monospace, 1000.0);
        assert_eq!(stack_lines(&lines, 100), vec![100, 120, 144]);
    }
}
