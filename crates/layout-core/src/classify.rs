//! Emoji classification and codepoint keys.
//!
//! Classification is per `char`. Multi-codepoint sequences (flags, skin-tone
//! modifiers, ZWJ sequences) are not merged; every scalar value is looked up
//! on its own.

use unicode_general_category::{get_general_category, GeneralCategory};

/// First codepoint of the supplementary symbol planes treated as emoji
/// regardless of category.
const EMOJI_PLANE_START: u32 = 0x1F000;

/// Whether `c` is drawn as an emoji bitmap instead of a font glyph.
///
/// True for general category "Symbol, other" (`So`) or any scalar value at
/// or above U+1F000.
pub fn is_emoji(c: char) -> bool {
    c as u32 >= EMOJI_PLANE_START || get_general_category(c) == GeneralCategory::OtherSymbol
}

/// Cache/CDN key for `text`: lowercase hex of each scalar value, joined by `-`.
pub fn codepoint_key(text: &str) -> String {
    text.chars()
        .map(|c| format!("{:x}", c as u32))
        .collect::<Vec<_>>()
        .join("-")
}

/// Whether a run is plain text or a single emoji character.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunKind {
    Text,
    Emoji,
}

/// A slice of a line that is measured and drawn as one unit.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Run<'a> {
    pub kind: RunKind,
    pub text: &'a str,
}

/// Split `text` into runs: consecutive non-emoji characters form one
/// `Text` run; every emoji character is its own `Emoji` run.
pub fn split_runs(text: &str) -> Vec<Run<'_>> {
    let mut runs = Vec::new();
    let mut text_start: Option<usize> = None;

    for (idx, c) in text.char_indices() {
        if is_emoji(c) {
            if let Some(start) = text_start.take() {
                runs.push(Run {
                    kind: RunKind::Text,
                    text: &text[start..idx],
                });
            }
            runs.push(Run {
                kind: RunKind::Emoji,
                text: &text[idx..idx + c.len_utf8()],
            });
        } else if text_start.is_none() {
            text_start = Some(idx);
        }
    }

    if let Some(start) = text_start {
        runs.push(Run {
            kind: RunKind::Text,
            text: &text[start..],
        });
    }

    runs
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_is_emoji_by_plane() {
        assert!(is_emoji('😳'));
        assert!(is_emoji('💤'));
        assert!(is_emoji('📱'));
    }

    #[test]
    fn test_is_emoji_by_category() {
        // U+2764 HEAVY BLACK HEART and U+00A9 COPYRIGHT SIGN are `So`.
        assert!(is_emoji('\u{2764}'));
        assert!(is_emoji('©'));
    }

    #[test]
    fn test_plain_text_is_not_emoji() {
        for c in "Apagou a luz... e começou o pesadelo!\"@1".chars() {
            assert!(!is_emoji(c), "{c:?} should not be an emoji");
        }
        // Variation selector 16 is a nonspacing mark, not a symbol.
        assert!(!is_emoji('\u{FE0F}'));
    }

    #[test]
    fn test_codepoint_key() {
        assert_eq!(codepoint_key("😳"), "1f633");
        assert_eq!(codepoint_key("\u{2764}"), "2764");
        assert_eq!(codepoint_key("\u{2764}\u{FE0F}"), "2764-fe0f");
        assert_eq!(codepoint_key("a😳"), "61-1f633");
        assert_eq!(codepoint_key(""), "");
    }

    #[test]
    fn test_split_runs_groups_text_and_isolates_emoji() {
        let runs = split_runs("oi 😳💤 tchau");
        let kinds: Vec<_> = runs.iter().map(|r| (r.kind, r.text)).collect();
        assert_eq!(
            kinds,
            vec![
                (RunKind::Text, "oi "),
                (RunKind::Emoji, "😳"),
                (RunKind::Emoji, "💤"),
                (RunKind::Text, " tchau"),
            ]
        );
    }

    #[test]
    fn test_split_runs_empty() {
        assert!(split_runs("").is_empty());
    }
}
