//! Canvas geometry: centering, the caption banner, and the video stage.
//!
//! Divisions follow floor semantics so oversize content yields negative
//! offsets instead of wrapping around.

use serde::{Deserialize, Serialize};

/// Left/top offset that centers `extent` inside `canvas`.
pub fn center_offset(canvas: u32, extent: f32) -> i32 {
    ((canvas as f32 - extent) / 2.0).floor() as i32
}

/// An axis-aligned pixel rectangle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Rect {
    pub x: i32,
    pub y: i32,
    pub width: u32,
    pub height: u32,
}

/// Banner layout inputs, already converted to pixels.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BannerSpec {
    pub pad_x: u32,
    pub pad_y: u32,
    /// Top edge of the banner.
    pub top: i32,
    /// Corner radius as a fraction of the banner height.
    pub radius_ratio: f64,
}

/// Resolved banner box around a single line of text.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BannerGeometry {
    pub rect: Rect,
    pub radius: u32,
    pub pad_x: u32,
    pub pad_y: u32,
}

impl BannerGeometry {
    /// Size the banner to the text ink box plus symmetric padding and
    /// center it horizontally on a canvas `canvas_width` wide.
    pub fn around_text(
        canvas_width: u32,
        text_width: u32,
        text_height: u32,
        params: BannerSpec,
    ) -> Self {
        let width = text_width + 2 * params.pad_x;
        let height = text_height + 2 * params.pad_y;
        let radius = (height as f64 * params.radius_ratio).floor().max(0.0) as u32;

        Self {
            rect: Rect {
                x: center_offset(canvas_width, width as f32),
                y: params.top,
                width,
                height,
            },
            radius,
            pad_x: params.pad_x,
            pad_y: params.pad_y,
        }
    }

    /// Whether the corners can be rounded: a positive radius that still
    /// leaves a straight edge on both axes.
    pub fn can_round(&self) -> bool {
        self.radius > 0
            && self.radius * 2 < self.rect.width
            && self.radius * 2 < self.rect.height
    }

    /// Top-left corner where text starts inside the padding.
    pub fn text_origin(&self) -> (i32, i32) {
        (
            self.rect.x + self.pad_x as i32,
            self.rect.y + self.pad_y as i32,
        )
    }
}

/// A fixed-height horizontal band spanning the full canvas width,
/// vertically centered on the canvas.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Stage {
    pub canvas_width: u32,
    pub canvas_height: u32,
    pub height: u32,
    /// Upward shift applied after centering the clip inside the band.
    pub vertical_offset: i32,
}

/// Scaled size and canvas position of a clip placed on the stage.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct StagePlacement {
    pub width: u32,
    pub height: u32,
    pub x: i64,
    pub y: i64,
}

impl Stage {
    /// Stage width (the canvas width).
    pub fn width(&self) -> u32 {
        self.canvas_width
    }

    /// Top edge of the band.
    pub fn top(&self) -> i64 {
        (self.canvas_height as i64 - self.height as i64).div_euclid(2)
    }

    /// Fit a `src_width` x `src_height` clip into the stage.
    ///
    /// A clip relatively taller than the stage is scaled to the stage height;
    /// otherwise it is scaled to the stage width. Aspect ratio is preserved and
    /// the free axis is rounded down. Returns `None` for zero-sized input.
    pub fn fit(&self, src_width: u32, src_height: u32) -> Option<StagePlacement> {
        if src_width == 0 || src_height == 0 || self.height == 0 || self.canvas_width == 0 {
            return None;
        }

        let (sw, sh) = (src_width as u64, src_height as u64);
        let (stage_w, stage_h) = (self.width() as u64, self.height as u64);

        // src_h / stage_h > src_w / stage_w, cross-multiplied.
        let taller = sh * stage_w > sw * stage_h;
        let (width, height) = if taller {
            ((sw * stage_h / sh).max(1) as u32, self.height)
        } else {
            (self.width(), (sh * stage_w / sw).max(1) as u32)
        };

        let x = (self.canvas_width as i64 - width as i64).div_euclid(2);
        let y = self.top() + (self.height as i64 - height as i64).div_euclid(2)
            - self.vertical_offset as i64;

        Some(StagePlacement {
            width,
            height,
            x,
            y,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn stage() -> Stage {
        Stage {
            canvas_width: 1080,
            canvas_height: 1920,
            height: 850,
            vertical_offset: 30,
        }
    }

    #[test]
    fn test_center_offset_floors() {
        assert_eq!(center_offset(1080, 100.0), 490);
        assert_eq!(center_offset(1080, 101.0), 489);
        assert_eq!(center_offset(100, 201.0), -51);
    }

    #[test]
    fn test_stage_top_is_centered() {
        assert_eq!(stage().top(), 535);
    }

    #[test]
    fn test_portrait_clip_fits_height() {
        let placement = stage().fit(1080, 1920).unwrap();
        assert_eq!(placement.height, 850);
        assert_eq!(placement.width, 478);
        assert_eq!(placement.x, 301);
        assert_eq!(placement.y, 535 - 30);
    }

    #[test]
    fn test_landscape_clip_fits_width() {
        let placement = stage().fit(1920, 1080).unwrap();
        assert_eq!(placement.width, 1080);
        assert_eq!(placement.height, 607);
        assert_eq!(placement.x, 0);
        assert_eq!(placement.y, 535 + 121 - 30);
    }

    #[test]
    fn test_exact_stage_aspect_fits_width() {
        let placement = stage().fit(1080 * 2, 850 * 2).unwrap();
        assert_eq!((placement.width, placement.height), (1080, 850));
    }

    #[test]
    fn test_zero_sized_clip_has_no_placement() {
        assert!(stage().fit(0, 100).is_none());
    }

    #[test]
    fn test_banner_geometry() {
        let banner = BannerGeometry::around_text(
            1080,
            400,
            60,
            BannerSpec {
                pad_x: 32,
                pad_y: 28,
                top: 1382,
                radius_ratio: 0.3,
            },
        );
        assert_eq!(banner.rect.width, 464);
        assert_eq!(banner.rect.height, 116);
        assert_eq!(banner.rect.x, 308);
        assert_eq!(banner.rect.y, 1382);
        assert_eq!(banner.radius, 34);
        assert!(banner.can_round());
        assert_eq!(banner.text_origin(), (340, 1410));
    }

    #[test]
    fn test_banner_without_radius_cannot_round() {
        let banner = BannerGeometry::around_text(
            1080,
            10,
            2,
            BannerSpec {
                pad_x: 0,
                pad_y: 0,
                top: 0,
                radius_ratio: 0.3,
            },
        );
        assert_eq!(banner.radius, 0);
        assert!(!banner.can_round());
    }
}
