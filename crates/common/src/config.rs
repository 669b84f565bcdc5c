//! Application configuration.
//!
//! Every value the pipeline needs (paths, caption text and colors, layout
//! ratios, stage geometry, encoder settings) lives here so renders can be
//! parameterized without touching code.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::error::{ClipframeError, ClipframeResult};

/// An RGB color triple.
pub type Rgb = [u8; 3];

/// Global application configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// Input, output, and asset locations.
    pub paths: PathsConfig,

    /// Caption text and colors.
    pub caption: CaptionSpec,

    /// Frame layout ratios.
    pub layout: LayoutConfig,

    /// Video stage geometry.
    pub stage: StageConfig,

    /// Emoji CDN settings.
    pub emoji: EmojiConfig,

    /// Encoder settings.
    pub encode: EncodeConfig,

    /// Batch behavior.
    pub batch: BatchConfig,

    /// Logging configuration.
    pub logging: LoggingConfig,
}

/// Filesystem locations.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PathsConfig {
    /// Background template image.
    pub background: PathBuf,

    /// TTF/OTF font used for both captions.
    pub font: PathBuf,

    /// Directory holding cached emoji PNGs.
    pub emoji_cache_dir: PathBuf,

    /// Directory scanned for source clips.
    pub input_dir: PathBuf,

    /// Extension (without dot) of source clips, matched case-insensitively.
    pub input_extension: String,

    /// Directory receiving rendered videos and intermediate frames.
    pub output_dir: PathBuf,
}

/// Caption content for one render.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CaptionSpec {
    /// Wrapped caption drawn near the top; may contain emoji and `\n`.
    pub top_text: String,

    /// Single-line caption drawn inside the banner.
    pub bottom_text: String,

    /// Top caption color.
    pub top_color: Rgb,

    /// Bottom caption color.
    pub bottom_color: Rgb,

    /// Banner fill color.
    pub banner_color: Rgb,
}

/// Frame layout, expressed as ratios of the canvas size.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LayoutConfig {
    /// Top caption font size as a fraction of canvas height.
    pub top_font_ratio: f64,

    /// Bottom caption font size as a fraction of canvas height.
    pub bottom_font_ratio: f64,

    /// Maximum top caption line width as a fraction of canvas width.
    pub max_width_ratio: f64,

    /// Top edge of the first caption line as a fraction of canvas height.
    pub top_offset_ratio: f64,

    /// Banner horizontal padding as a fraction of canvas width.
    pub banner_pad_x_ratio: f64,

    /// Banner vertical padding as a fraction of canvas height.
    pub banner_pad_y_ratio: f64,

    /// Banner top edge as a fraction of canvas height.
    pub banner_top_ratio: f64,

    /// Corner radius as a fraction of banner height.
    pub banner_radius_ratio: f64,

    /// Draw rounded banner corners. A plain rectangle is drawn otherwise.
    pub rounded_banner: bool,
}

/// The horizontal band the source clip is fitted into.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct StageConfig {
    /// Stage height in pixels; the stage spans the full canvas width.
    pub height: u32,

    /// Upward shift applied after centering the clip in the stage.
    pub vertical_offset: i32,
}

/// Emoji CDN configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct EmojiConfig {
    /// Base URL, without the `@version` suffix.
    pub cdn_base: String,

    /// Twemoji release to pull assets from.
    pub version: String,
}

/// Encoder configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct EncodeConfig {
    pub video_codec: String,
    pub audio_codec: String,

    /// Encoder worker threads.
    pub threads: u32,

    /// Appended to the input stem to name the output video.
    pub output_suffix: String,

    /// Appended to the output stem to name the intermediate frame.
    pub frame_suffix: String,
}

/// What the batch driver does when one clip fails.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FailurePolicy {
    /// Record the failure and move on to the next clip.
    #[default]
    Continue,
    /// Stop the batch at the first failure.
    Halt,
}

/// Batch configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct BatchConfig {
    pub failure_policy: FailurePolicy,
}

/// Logging configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Log level filter (e.g., "info", "debug", "clipframe=debug,warn").
    pub level: String,

    /// Whether to output structured JSON logs.
    pub json: bool,
}

impl Default for PathsConfig {
    fn default() -> Self {
        Self {
            background: PathBuf::from("templates/design_puro.png"),
            font: PathBuf::from("fonts/FjallaOne-Regular.ttf"),
            emoji_cache_dir: PathBuf::from("fonts/twemoji"),
            input_dir: PathBuf::from("videos"),
            input_extension: "mp4".to_string(),
            output_dir: PathBuf::from("output"),
        }
    }
}

impl Default for CaptionSpec {
    fn default() -> Self {
        Self {
            top_text: "\"Apagou a luz... e começou o pesadelo!\" 😳💤📱".to_string(),
            bottom_text: "@KwaiZadaBrabaOfc".to_string(),
            top_color: [173, 255, 47],
            bottom_color: [255, 255, 255],
            banner_color: [200, 40, 40],
        }
    }
}

impl Default for LayoutConfig {
    fn default() -> Self {
        Self {
            top_font_ratio: 0.04,
            bottom_font_ratio: 0.05,
            max_width_ratio: 0.90,
            top_offset_ratio: 0.12,
            banner_pad_x_ratio: 0.03,
            banner_pad_y_ratio: 0.015,
            banner_top_ratio: 0.72,
            banner_radius_ratio: 0.3,
            rounded_banner: true,
        }
    }
}

impl Default for StageConfig {
    fn default() -> Self {
        Self {
            height: 850,
            vertical_offset: 30,
        }
    }
}

impl Default for EmojiConfig {
    fn default() -> Self {
        Self {
            cdn_base: "https://cdn.jsdelivr.net/gh/twitter/twemoji".to_string(),
            version: "14.0.2".to_string(),
        }
    }
}

impl Default for EncodeConfig {
    fn default() -> Self {
        Self {
            video_codec: "libx264".to_string(),
            audio_codec: "aac".to_string(),
            threads: 4,
            output_suffix: "_final".to_string(),
            frame_suffix: "_onlyimg".to_string(),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            json: false,
        }
    }
}

impl LayoutConfig {
    /// Pixel size of the top caption font for a canvas of `height` pixels.
    pub fn top_font_px(&self, height: u32) -> u32 {
        ratio_px(height, self.top_font_ratio)
    }

    /// Pixel size of the bottom caption font for a canvas of `height` pixels.
    pub fn bottom_font_px(&self, height: u32) -> u32 {
        ratio_px(height, self.bottom_font_ratio)
    }
}

/// `floor(extent * ratio)`.
pub fn ratio_px(extent: u32, ratio: f64) -> u32 {
    (extent as f64 * ratio).floor().max(0.0) as u32
}

impl AppConfig {
    /// Load config from an explicit path. Missing fields take defaults.
    pub fn load_from(path: &Path) -> ClipframeResult<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            ClipframeError::config(format!("Failed to read config {}: {e}", path.display()))
        })?;
        serde_json::from_str(&content).map_err(|e| {
            ClipframeError::config(format!("Failed to parse config {}: {e}", path.display()))
        })
    }

    /// Load config from `path` if the file exists. `Ok(None)` when it doesn't.
    pub fn load_optional(path: &Path) -> ClipframeResult<Option<Self>> {
        if !path.exists() {
            return Ok(None);
        }
        Self::load_from(path).map(Some)
    }

    /// Serialize to pretty JSON.
    pub fn to_json(&self) -> ClipframeResult<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Save config to `path`, creating parent directories.
    pub fn save_to(&self, path: &Path) -> ClipframeResult<()> {
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }
        std::fs::write(path, self.to_json()?)?;
        Ok(())
    }
}

/// Standard config file location.
pub fn config_file_path() -> PathBuf {
    let base = std::env::var("XDG_CONFIG_HOME")
        .map(PathBuf::from)
        .unwrap_or_else(|_| {
            let home = std::env::var("HOME").unwrap_or_else(|_| "/tmp".to_string());
            PathBuf::from(home).join(".config")
        });
    base.join("clipframe").join("config.json")
}
