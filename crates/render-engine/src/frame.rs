//! Frame composer: background template + wrapped top caption + banner.
//!
//! ```text
//! ┌──────────────────────┐
//! │                      │
//! │   top caption line   │  ← 12% of height, lines stacked by own height
//! │    wrapped line 2    │
//! │ ┌──────────────────┐ │
//! │ │      stage       │ │  ← video goes here (see `video`)
//! │ └──────────────────┘ │
//! │    ╭──────────╮      │  ← banner at 72% of height
//! │    │ @handle  │      │
//! │    ╰──────────╯      │
//! └──────────────────────┘
//! ```

use std::path::Path;
use std::sync::Arc;

use ab_glyph::FontVec;
use clipframe_common::config::{ratio_px, CaptionSpec, LayoutConfig, Rgb};
use clipframe_common::error::{ClipframeError, ClipframeResult};
use clipframe_layout_core::{
    center_offset, stack_lines, wrap_text, BannerGeometry, BannerSpec, WrappedLine,
};
use image::{Rgba, RgbaImage};
use imageproc::drawing::{draw_filled_circle_mut, draw_filled_rect_mut};
use imageproc::rect::Rect as PixelRect;

use crate::emoji::EmojiLookup;
use crate::font::{load_font, FontFace};
use crate::text::{draw_segments, layout_segments, segments_width, MixedMeasure};

/// The flattened frame plus the layout decisions that produced it.
#[derive(Debug, Clone)]
pub struct ComposedFrame {
    pub image: RgbaImage,
    pub top_lines: Vec<WrappedLine>,
    pub banner: BannerGeometry,
}

impl ComposedFrame {
    /// Save as PNG, creating the parent directory.
    pub fn save(&self, path: &Path) -> ClipframeResult<()> {
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }
        self.image
            .save_with_format(path, image::ImageFormat::Png)
            .map_err(|e| {
                ClipframeError::render(format!("Failed to save frame {}: {e}", path.display()))
            })
    }
}

/// Draws captions onto a fixed background template.
pub struct FrameComposer {
    background: RgbaImage,
    font: Arc<FontVec>,
    layout: LayoutConfig,
}

impl FrameComposer {
    pub fn new(background: RgbaImage, font: Arc<FontVec>, layout: LayoutConfig) -> Self {
        Self {
            background,
            font,
            layout,
        }
    }

    /// Load the background template and font from disk.
    pub fn load(background: &Path, font: &Path, layout: LayoutConfig) -> ClipframeResult<Self> {
        ClipframeError::require_file(background)?;
        let image = image::open(background)
            .map_err(|e| {
                ClipframeError::render(format!(
                    "Failed to load background {}: {e}",
                    background.display()
                ))
            })?
            .to_rgba8();
        let font = load_font(font)?;

        tracing::debug!(
            background = %background.display(),
            width = image.width(),
            height = image.height(),
            "Loaded frame template"
        );
        Ok(Self::new(image, font, layout))
    }

    /// Canvas (template) size.
    pub fn canvas_size(&self) -> (u32, u32) {
        self.background.dimensions()
    }

    /// Compose the caption onto a copy of the template.
    pub fn compose<E: EmojiLookup + ?Sized>(
        &self,
        caption: &CaptionSpec,
        emoji: &E,
    ) -> ComposedFrame {
        let (width, height) = self.canvas_size();
        let mut canvas = self.background.clone();

        let top_font = FontFace::new(self.font.clone(), self.layout.top_font_px(height));
        let top_lines = self.draw_top_caption(&mut canvas, caption, &top_font, emoji);

        let bottom_font = FontFace::new(self.font.clone(), self.layout.bottom_font_px(height));
        let banner = self.draw_bottom_caption(&mut canvas, caption, &bottom_font, emoji);

        tracing::debug!(
            width,
            height,
            top_lines = top_lines.len(),
            banner_width = banner.rect.width,
            banner_height = banner.rect.height,
            "Composed frame"
        );

        ComposedFrame {
            image: canvas,
            top_lines,
            banner,
        }
    }

    fn draw_top_caption<E: EmojiLookup + ?Sized>(
        &self,
        canvas: &mut RgbaImage,
        caption: &CaptionSpec,
        font: &FontFace,
        emoji: &E,
    ) -> Vec<WrappedLine> {
        let (width, height) = canvas.dimensions();
        let max_width = ratio_px(width, self.layout.max_width_ratio) as f32;
        let measure = MixedMeasure::new(font, emoji);

        let lines = wrap_text(&caption.top_text, &measure, max_width);
        let top = ratio_px(height, self.layout.top_offset_ratio) as i32;
        let color = rgba(caption.top_color);

        for (line, y) in lines.iter().zip(stack_lines(&lines, top)) {
            let segments = layout_segments(&line.text, font, emoji);
            let x = center_offset(width, segments_width(&segments));
            draw_segments(canvas, &segments, (x, y), font, color);
        }

        lines
    }

    fn draw_bottom_caption<E: EmojiLookup + ?Sized>(
        &self,
        canvas: &mut RgbaImage,
        caption: &CaptionSpec,
        font: &FontFace,
        emoji: &E,
    ) -> BannerGeometry {
        let (width, height) = canvas.dimensions();
        let segments = layout_segments(&caption.bottom_text, font, emoji);
        let extent = font.measure(&caption.bottom_text);

        let banner = BannerGeometry::around_text(
            width,
            segments_width(&segments).ceil() as u32,
            extent.ink_height().ceil() as u32,
            BannerSpec {
                pad_x: ratio_px(width, self.layout.banner_pad_x_ratio),
                pad_y: ratio_px(height, self.layout.banner_pad_y_ratio),
                top: ratio_px(height, self.layout.banner_top_ratio) as i32,
                radius_ratio: self.layout.banner_radius_ratio,
            },
        );

        draw_banner(
            canvas,
            &banner,
            rgba(caption.banner_color),
            self.layout.rounded_banner,
        );

        // Shift by the ink's bearings so the ink box starts at the padding.
        let (x, y) = banner.text_origin();
        let x = x - extent.left.floor() as i32;
        let y = y - extent.top.floor() as i32;
        draw_segments(canvas, &segments, (x, y), font, rgba(caption.bottom_color));

        banner
    }
}

/// Fill the banner, with rounded corners when `rounded` is set and the
/// geometry allows it; a plain rectangle otherwise.
pub fn draw_banner(canvas: &mut RgbaImage, banner: &BannerGeometry, color: Rgba<u8>, rounded: bool) {
    let rect = banner.rect;
    if rect.width == 0 || rect.height == 0 {
        return;
    }

    if !(rounded && banner.can_round()) {
        if rounded {
            tracing::debug!(radius = banner.radius, "Banner too small to round; drawing plain rectangle");
        }
        draw_filled_rect_mut(
            canvas,
            PixelRect::at(rect.x, rect.y).of_size(rect.width, rect.height),
            color,
        );
        return;
    }

    let r = banner.radius;
    let ri = r as i32;
    draw_filled_rect_mut(
        canvas,
        PixelRect::at(rect.x + ri, rect.y).of_size(rect.width - 2 * r, rect.height),
        color,
    );
    draw_filled_rect_mut(
        canvas,
        PixelRect::at(rect.x, rect.y + ri).of_size(rect.width, rect.height - 2 * r),
        color,
    );

    let left = rect.x + ri;
    let right = rect.x + rect.width as i32 - 1 - ri;
    let top = rect.y + ri;
    let bottom = rect.y + rect.height as i32 - 1 - ri;
    for center in [(left, top), (right, top), (left, bottom), (right, bottom)] {
        draw_filled_circle_mut(canvas, center, ri, color);
    }
}

fn rgba(color: Rgb) -> Rgba<u8> {
    Rgba([color[0], color[1], color[2], 255])
}
