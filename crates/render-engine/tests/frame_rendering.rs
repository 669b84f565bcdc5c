//! Frame composition against a real font.
//!
//! These tests need a TTF on disk. Set `CLIPFRAME_TEST_FONT` or install
//! DejaVu/Liberation; otherwise they are skipped.

use std::cell::Cell;
use std::io::Cursor;
use std::path::Path;
use std::sync::Arc;

use ab_glyph::FontVec;
use clipframe_common::config::{ratio_px, CaptionSpec, LayoutConfig};
use clipframe_common::error::ClipframeResult;
use clipframe_render_engine::font::{load_font, FontFace};
use clipframe_render_engine::text::{layout_segments, SegmentKind};
use clipframe_render_engine::{EmojiResolver, EmojiSource, FrameComposer};
use image::{Rgba, RgbaImage};

#[path = "../src/test_support.rs"]
mod test_support;

fn test_font() -> Option<Arc<FontVec>> {
    let path = test_support::system_font_path()?;
    Some(load_font(&path).expect("test font should load"))
}

/// Never has anything; counts how often it is asked.
#[derive(Default)]
struct OfflineSource {
    calls: Cell<usize>,
}

impl EmojiSource for OfflineSource {
    fn fetch(&self, _key: &str) -> ClipframeResult<Option<Vec<u8>>> {
        self.calls.set(self.calls.get() + 1);
        Ok(None)
    }
}

fn template() -> RgbaImage {
    RgbaImage::from_pixel(1080, 1920, Rgba([20, 20, 30, 255]))
}

fn seed_emoji(cache_dir: &Path, key: &str) {
    std::fs::create_dir_all(cache_dir).unwrap();
    let img = RgbaImage::from_fn(72, 72, |x, y| {
        if (x as i32 - 36).pow(2) + (y as i32 - 36).pow(2) < 30 * 30 {
            Rgba([255, 204, 77, 255])
        } else {
            Rgba([0, 0, 0, 0])
        }
    });
    let mut buf = Vec::new();
    img.write_to(&mut Cursor::new(&mut buf), image::ImageFormat::Png)
        .unwrap();
    std::fs::write(cache_dir.join(format!("{key}.png")), buf).unwrap();
}

#[test]
fn unresolved_emoji_still_drawn_as_glyph() {
    let Some(font) = test_font() else { return };
    let dir = tempfile::tempdir().unwrap();
    let resolver = EmojiResolver::new(dir.path(), OfflineSource::default());
    let face = FontFace::new(font, 76);

    let segments = layout_segments("oi 📱", &face, &resolver);
    assert_eq!(segments.len(), 1);
    match &segments[0].kind {
        SegmentKind::Text(text) => assert_eq!(text, "oi 📱"),
        SegmentKind::Emoji(_) => panic!("unresolved emoji must fall back to text"),
    }
}

#[test]
fn resolved_emoji_becomes_bitmap_segment() {
    let Some(font) = test_font() else { return };
    let dir = tempfile::tempdir().unwrap();
    seed_emoji(dir.path(), "1f633");
    let resolver = EmojiResolver::new(dir.path(), OfflineSource::default());
    let face = FontFace::new(font, 76);

    let segments = layout_segments("oi 😳!", &face, &resolver);
    assert_eq!(segments.len(), 3);
    assert!(segments[1].is_emoji());
    assert_eq!(segments[1].width, 76.0);
    assert_eq!(segments[2].x, segments[1].x + 76.0);
}

#[test]
fn composed_frame_matches_template_size() {
    let Some(font) = test_font() else { return };
    let dir = tempfile::tempdir().unwrap();
    let composer = FrameComposer::new(template(), font, LayoutConfig::default());
    let resolver = EmojiResolver::new(dir.path().join("twemoji"), OfflineSource::default());

    let frame = composer.compose(&CaptionSpec::default(), &resolver);
    let path = dir.path().join("out").join("clip_final_onlyimg.png");
    frame.save(&path).unwrap();

    let reloaded = image::open(&path).unwrap();
    assert_eq!((reloaded.width(), reloaded.height()), (1080, 1920));
}

#[test]
fn caption_lines_fit_and_banner_is_centered() {
    let Some(font) = test_font() else { return };
    let dir = tempfile::tempdir().unwrap();
    let composer = FrameComposer::new(template(), font, LayoutConfig::default());
    let resolver = EmojiResolver::new(dir.path(), OfflineSource::default());

    let caption = CaptionSpec {
        top_text: "uma legenda bem comprida que com certeza precisa quebrar em varias linhas"
            .to_string(),
        ..CaptionSpec::default()
    };
    let frame = composer.compose(&caption, &resolver);

    let max = ratio_px(1080, 0.90) as f32;
    assert!(frame.top_lines.len() > 1);
    for line in &frame.top_lines {
        assert!(line.width <= max, "{:?} wider than {max}", line.text);
    }

    let banner = frame.banner.rect;
    assert_eq!(banner.y, ratio_px(1920, 0.72) as i32);
    assert!(banner.x >= 0, "banner starts left of the canvas: {banner:?}");
    assert!(
        banner.x as u32 + banner.width <= 1080,
        "banner runs past the canvas: {banner:?}"
    );
    assert!((banner.x - (1080 - banner.width as i32) / 2).abs() <= 1);
    // Banner fill is visible just inside its left edge at mid height.
    let mid = (banner.y + banner.height as i32 / 2) as u32;
    assert_eq!(
        *frame.image.get_pixel(banner.x as u32 + 1, mid),
        Rgba([200, 40, 40, 255])
    );
}

#[test]
fn banner_text_ink_starts_at_padding() {
    let Some(font) = test_font() else { return };
    let dir = tempfile::tempdir().unwrap();
    let composer = FrameComposer::new(template(), font, LayoutConfig::default());
    let resolver = EmojiResolver::new(dir.path(), OfflineSource::default());

    let caption = CaptionSpec {
        top_text: String::new(),
        bottom_text: "Hx".to_string(),
        ..CaptionSpec::default()
    };
    let frame = composer.compose(&caption, &resolver);
    let geometry = frame.banner;
    let rect = geometry.rect;
    let fill = Rgba([200, 40, 40, 255]);

    // Bounding box of every non-fill pixel inside the banner.
    let (mut left, mut top) = (u32::MAX, u32::MAX);
    for y in rect.y as u32..rect.y as u32 + rect.height {
        for x in rect.x as u32..rect.x as u32 + rect.width {
            let inside_corner_square = (x < rect.x as u32 + geometry.radius
                || x >= rect.x as u32 + rect.width - geometry.radius)
                && (y < rect.y as u32 + geometry.radius
                    || y >= rect.y as u32 + rect.height - geometry.radius);
            if inside_corner_square {
                continue;
            }
            if *frame.image.get_pixel(x, y) != fill {
                left = left.min(x);
                top = top.min(y);
            }
        }
    }

    let pad_left = rect.x as u32 + geometry.pad_x;
    let pad_top = rect.y as u32 + geometry.pad_y;
    assert!(left.abs_diff(pad_left) <= 2, "ink left {left}, padding edge {pad_left}");
    assert!(top.abs_diff(pad_top) <= 2, "ink top {top}, padding edge {pad_top}");
}

#[test]
fn warm_cache_renders_identical_frames() {
    let Some(font) = test_font() else { return };
    let dir = tempfile::tempdir().unwrap();
    let cache = dir.path().join("twemoji");
    for key in ["1f633", "1f4a4", "1f4f1"] {
        seed_emoji(&cache, key);
    }

    let caption = CaptionSpec::default();
    let mut outputs = Vec::new();
    for run in 0..2 {
        let composer = FrameComposer::new(template(), font.clone(), LayoutConfig::default());
        let source = OfflineSource::default();
        let resolver = EmojiResolver::new(&cache, source);
        let path = dir.path().join(format!("frame_{run}.png"));
        composer.compose(&caption, &resolver).save(&path).unwrap();
        outputs.push(std::fs::read(&path).unwrap());
    }

    assert_eq!(outputs[0], outputs[1]);
}

#[test]
fn cached_emoji_issue_no_fetches() {
    let Some(font) = test_font() else { return };
    let dir = tempfile::tempdir().unwrap();
    for key in ["1f633", "1f4a4", "1f4f1"] {
        seed_emoji(dir.path(), key);
    }
    let resolver = EmojiResolver::new(dir.path(), OfflineSource::default());
    let composer = FrameComposer::new(template(), font, LayoutConfig::default());

    composer.compose(&CaptionSpec::default(), &resolver);

    // The default caption only carries the seeded emoji.
    assert_eq!(resolver.source().calls.get(), 0);
}
