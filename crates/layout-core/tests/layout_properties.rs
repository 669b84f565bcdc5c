use clipframe_layout_core::{split_runs, wrap_text, RunKind, Stage, TextMeasure};
use proptest::prelude::*;

/// Proportional-ish measurer: narrow and wide letters, emoji at a fixed
/// bitmap width, like a real font plus cached emoji bitmaps.
struct Proportional;

impl TextMeasure for Proportional {
    fn text_width(&self, text: &str) -> f32 {
        split_runs(text)
            .iter()
            .map(|run| match run.kind {
                RunKind::Emoji => 30.0,
                RunKind::Text => run
                    .text
                    .chars()
                    .map(|c| match c {
                        'i' | 'l' | ' ' => 5.0,
                        'm' | 'w' => 14.0,
                        _ => 9.0,
                    })
                    .sum(),
            })
            .sum()
    }

    fn text_height(&self, _text: &str) -> f32 {
        30.0
    }
}

fn word_strategy() -> impl Strategy<Value = String> {
    prop::collection::vec(
        prop_oneof![
            4 => prop::sample::select(vec!['a', 'e', 'i', 'l', 'm', 'w', 'z']),
            1 => prop::sample::select(vec!['😳', '💤', '📱', '©']),
        ],
        1..12,
    )
    .prop_map(|chars| chars.into_iter().collect())
}

proptest! {
    #[test]
    fn wrapped_lines_fit_unless_single_word(
        words in prop::collection::vec(word_strategy(), 1..30),
        max_width in 20.0f32..400.0,
    ) {
        let paragraph = words.join(" ");
        let lines = wrap_text(&paragraph, &Proportional, max_width);

        for line in &lines {
            let single_word = !line.text.contains(' ');
            prop_assert!(
                line.width <= max_width || single_word,
                "line {:?} is {} wide, limit {}",
                line.text, line.width, max_width
            );
        }
    }

    #[test]
    fn joining_lines_reconstructs_paragraph(
        words in prop::collection::vec(word_strategy(), 1..30),
        max_width in 20.0f32..400.0,
    ) {
        let paragraph = words.join(" ");
        let lines = wrap_text(&paragraph, &Proportional, max_width);
        let joined = lines
            .iter()
            .map(|l| l.text.as_str())
            .collect::<Vec<_>>()
            .join(" ");
        prop_assert_eq!(joined, paragraph);
    }

    #[test]
    fn stage_fit_stays_inside_band(
        src_w in 1u32..8000,
        src_h in 1u32..8000,
        canvas_w in 200u32..4000,
        canvas_h in 900u32..4000,
    ) {
        let stage = Stage {
            canvas_width: canvas_w,
            canvas_height: canvas_h,
            height: 850,
            vertical_offset: 30,
        };
        let placement = stage.fit(src_w, src_h).unwrap();

        prop_assert!(placement.width <= canvas_w);
        prop_assert!(placement.height <= 850);
        prop_assert!(placement.width == canvas_w || placement.height == 850);
    }
}

#[test]
fn tall_source_matches_stage_height() {
    let stage = Stage {
        canvas_width: 1080,
        canvas_height: 1920,
        height: 850,
        vertical_offset: 30,
    };
    let placement = stage.fit(720, 1280).unwrap();
    assert_eq!(placement.height, 850);
    assert!(placement.width <= 1080);
}

#[test]
fn wide_source_matches_stage_width() {
    let stage = Stage {
        canvas_width: 1080,
        canvas_height: 1920,
        height: 850,
        vertical_offset: 30,
    };
    let placement = stage.fit(3840, 1080).unwrap();
    assert_eq!(placement.width, 1080);
    assert!(placement.height <= 850);
}
