//! Font loading and text metrics.

use std::path::Path;
use std::sync::Arc;

use ab_glyph::{point, Font, FontVec, GlyphId, PxScale, ScaleFont};
use clipframe_common::error::{ClipframeError, ClipframeResult};

/// Load a TTF/OTF font from disk.
pub fn load_font(path: &Path) -> ClipframeResult<Arc<FontVec>> {
    ClipframeError::require_file(path)?;
    let bytes = std::fs::read(path)?;
    let font = FontVec::try_from_vec(bytes).map_err(|e| {
        ClipframeError::font(format!("Invalid font {}: {e}", path.display()))
    })?;
    Ok(Arc::new(font))
}

/// Ink box and advance of a run of text laid out from origin `(0, 0)`,
/// where the origin is the top of the ascent line.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TextExtent {
    /// Caret position after the last glyph.
    pub advance: f32,
    pub left: f32,
    pub top: f32,
    pub right: f32,
    /// Lowest ink pixel; includes descenders.
    pub bottom: f32,
}

impl TextExtent {
    pub fn ink_height(&self) -> f32 {
        (self.bottom - self.top).max(0.0)
    }
}

/// `PxScale` for an em square `px_size` pixels tall.
///
/// `PxScale` is the ascent-to-descent height, not the em size, so it is
/// stretched by `height_unscaled / units_per_em`.
pub fn em_scale<F: Font>(font: &F, px_size: u32) -> PxScale {
    let em = px_size as f32;
    match font.units_per_em() {
        Some(units) if units > 0.0 => PxScale::from(em * font.height_unscaled() / units),
        _ => PxScale::from(em),
    }
}

/// A font at a fixed pixel size.
#[derive(Clone)]
pub struct FontFace {
    font: Arc<FontVec>,
    scale: PxScale,
    px_size: u32,
}

impl std::fmt::Debug for FontFace {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FontFace")
            .field("px_size", &self.px_size)
            .field("scale", &self.scale)
            .finish()
    }
}

impl FontFace {
    /// Use `font` at an em size of `px_size` pixels.
    pub fn new(font: Arc<FontVec>, px_size: u32) -> Self {
        let scale = em_scale(&*font, px_size);
        Self {
            font,
            scale,
            px_size,
        }
    }

    pub fn px_size(&self) -> u32 {
        self.px_size
    }

    pub fn scale(&self) -> PxScale {
        self.scale
    }

    pub fn font(&self) -> &FontVec {
        &self.font
    }

    /// Lay out `text` on one line and report its advance and ink box.
    ///
    /// Text without ink (empty or whitespace) reports a box spanning the
    /// font's full line height.
    pub fn measure(&self, text: &str) -> TextExtent {
        let scaled = self.font.as_scaled(self.scale);
        let mut caret = 0.0f32;
        let mut prev: Option<GlyphId> = None;
        let mut ink: Option<(f32, f32, f32, f32)> = None;

        for c in text.chars() {
            let id = scaled.glyph_id(c);
            if let Some(prev) = prev {
                caret += scaled.kern(prev, id);
            }

            let glyph = id.with_scale_and_position(self.scale, point(caret, scaled.ascent()));
            if let Some(outlined) = self.font.outline_glyph(glyph) {
                let bounds = outlined.px_bounds();
                ink = Some(match ink {
                    None => (bounds.min.x, bounds.min.y, bounds.max.x, bounds.max.y),
                    Some((l, t, r, b)) => (
                        l.min(bounds.min.x),
                        t.min(bounds.min.y),
                        r.max(bounds.max.x),
                        b.max(bounds.max.y),
                    ),
                });
            }

            caret += scaled.h_advance(id);
            prev = Some(id);
        }

        let (left, top, right, bottom) =
            ink.unwrap_or((0.0, 0.0, caret, scaled.ascent() - scaled.descent()));

        TextExtent {
            advance: caret,
            left,
            top,
            right,
            bottom,
        }
    }
}
