//! Mixed text/emoji runs: measuring, laying out, and drawing.
//!
//! Plain characters are grouped into runs and drawn with the font; each
//! emoji character is drawn as its bitmap. An emoji without a bitmap falls
//! back to the font so it is never dropped from the frame.

use clipframe_layout_core::{split_runs, RunKind, TextMeasure};
use image::{Rgba, RgbaImage};
use imageproc::drawing::draw_text_mut;

use crate::emoji::EmojiLookup;
use crate::font::FontFace;

/// What a segment draws.
#[derive(Debug, Clone)]
pub enum SegmentKind {
    /// Alpha-composited emoji bitmap.
    Emoji(RgbaImage),
    /// Text drawn with the font. Includes emoji that could not be resolved.
    Text(String),
}

/// One drawable piece of a line, positioned relative to the line origin.
#[derive(Debug, Clone)]
pub struct Segment {
    pub x: f32,
    pub width: f32,
    pub kind: SegmentKind,
}

impl Segment {
    pub fn is_emoji(&self) -> bool {
        matches!(self.kind, SegmentKind::Emoji(_))
    }
}

/// Lay out `text` into segments with emoji bitmaps `font.px_size()` tall.
pub fn layout_segments<E: EmojiLookup + ?Sized>(
    text: &str,
    font: &FontFace,
    emoji: &E,
) -> Vec<Segment> {
    let mut segments: Vec<Segment> = Vec::new();
    let mut caret = 0.0f32;

    for run in split_runs(text) {
        let bitmap = match run.kind {
            RunKind::Emoji => run
                .text
                .chars()
                .next()
                .and_then(|c| emoji.lookup(c, font.px_size())),
            RunKind::Text => None,
        };

        match bitmap {
            Some(bitmap) => {
                let width = bitmap.width() as f32;
                segments.push(Segment {
                    x: caret,
                    width,
                    kind: SegmentKind::Emoji(bitmap),
                });
                caret += width;
            }
            None => {
                // Unresolved emoji join the neighbouring text run.
                if let Some(Segment {
                    kind: SegmentKind::Text(prev),
                    x,
                    width,
                }) = segments.last_mut()
                {
                    prev.push_str(run.text);
                    *width = font.measure(prev).advance;
                    caret = *x + *width;
                } else {
                    let width = font.measure(run.text).advance;
                    segments.push(Segment {
                        x: caret,
                        width,
                        kind: SegmentKind::Text(run.text.to_string()),
                    });
                    caret += width;
                }
            }
        }
    }

    segments
}

/// Total width of laid-out segments.
pub fn segments_width(segments: &[Segment]) -> f32 {
    segments.last().map(|s| s.x + s.width).unwrap_or(0.0)
}

/// Draw `segments` with the line origin at `(x, y)`.
pub fn draw_segments(
    canvas: &mut RgbaImage,
    segments: &[Segment],
    origin: (i32, i32),
    font: &FontFace,
    color: Rgba<u8>,
) {
    let (x0, y0) = origin;
    for segment in segments {
        let x = x0 + segment.x.floor() as i32;
        match &segment.kind {
            SegmentKind::Emoji(bitmap) => {
                image::imageops::overlay(canvas, bitmap, x as i64, y0 as i64);
            }
            SegmentKind::Text(text) => {
                draw_text_mut(canvas, color, x, y0, font.scale(), font.font(), text);
            }
        }
    }
}

/// Measures lines the way they are drawn: emoji by bitmap width, the rest
/// by font advance. Heights always come from the font.
pub struct MixedMeasure<'a, E: EmojiLookup + ?Sized> {
    font: &'a FontFace,
    emoji: &'a E,
}

impl<'a, E: EmojiLookup + ?Sized> MixedMeasure<'a, E> {
    pub fn new(font: &'a FontFace, emoji: &'a E) -> Self {
        Self { font, emoji }
    }
}

impl<E: EmojiLookup + ?Sized> TextMeasure for MixedMeasure<'_, E> {
    fn text_width(&self, text: &str) -> f32 {
        segments_width(&layout_segments(text, self.font, self.emoji))
    }

    fn text_height(&self, text: &str) -> f32 {
        self.font.measure(text).bottom
    }
}
