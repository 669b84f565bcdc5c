//! Per-clip pipeline: compose frame, save it, probe, fit, encode.

use std::path::{Path, PathBuf};

use clipframe_common::config::{AppConfig, CaptionSpec, EncodeConfig, StageConfig};
use clipframe_common::error::{ClipframeError, ClipframeResult};
use clipframe_layout_core::{Stage, StagePlacement};
use serde::Serialize;

use crate::emoji::{CdnEmojiSource, EmojiResolver, EmojiSource};
use crate::frame::{ComposedFrame, FrameComposer};
use crate::video::{CompositeJob, FfmpegBackend, ProgressCallback, VideoBackend, VideoInfo};

/// Files produced by one render and the placement used.
#[derive(Debug, Clone, Serialize)]
pub struct RenderOutput {
    pub video: PathBuf,
    pub frame: PathBuf,
    pub source: VideoInfo,
    pub placement: StagePlacement,
}

/// Renders clips against one loaded template, font, and emoji cache.
pub struct Renderer<B: VideoBackend, S: EmojiSource> {
    composer: FrameComposer,
    emoji: EmojiResolver<S>,
    backend: B,
    stage: StageConfig,
    encode: EncodeConfig,
}

impl Renderer<FfmpegBackend, CdnEmojiSource> {
    /// Production renderer: ffmpeg backend and the twemoji CDN.
    pub fn from_config(config: &AppConfig) -> ClipframeResult<Self> {
        let composer =
            FrameComposer::load(&config.paths.background, &config.paths.font, config.layout.clone())?;
        let emoji = EmojiResolver::new(
            config.paths.emoji_cache_dir.clone(),
            CdnEmojiSource::new(&config.emoji),
        );
        Ok(Self::new(
            composer,
            emoji,
            FfmpegBackend::new(),
            config.stage.clone(),
            config.encode.clone(),
        ))
    }
}

impl<B: VideoBackend, S: EmojiSource> Renderer<B, S> {
    pub fn new(
        composer: FrameComposer,
        emoji: EmojiResolver<S>,
        backend: B,
        stage: StageConfig,
        encode: EncodeConfig,
    ) -> Self {
        Self {
            composer,
            emoji,
            backend,
            stage,
            encode,
        }
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }

    /// Compose the still frame only.
    pub fn render_frame(&self, caption: &CaptionSpec) -> ComposedFrame {
        self.composer.compose(caption, &self.emoji)
    }

    /// The stage band for this renderer's template.
    pub fn stage(&self) -> Stage {
        let (canvas_width, canvas_height) = self.composer.canvas_size();
        Stage {
            canvas_width,
            canvas_height,
            height: self.stage.height,
            vertical_offset: self.stage.vertical_offset,
        }
    }

    /// Render `video` with `caption` into `output`. The intermediate frame is
    /// written next to `output`.
    pub fn render_one(
        &self,
        video: &Path,
        caption: &CaptionSpec,
        output: &Path,
        progress: Option<ProgressCallback<'_>>,
    ) -> ClipframeResult<RenderOutput> {
        ClipframeError::require_file(video)?;

        let frame = self.render_frame(caption);
        let frame_path = frame_path_for(output, &self.encode.frame_suffix);
        frame.save(&frame_path)?;
        tracing::debug!(frame = %frame_path.display(), "Saved composed frame");

        let source = self.backend.probe(video)?;
        let placement = self.stage().fit(source.width, source.height).ok_or_else(|| {
            ClipframeError::layout(format!(
                "Cannot fit {}x{} clip into a {}px stage",
                source.width, source.height, self.stage.height
            ))
        })?;

        tracing::info!(
            input = %video.display(),
            output = %output.display(),
            src_width = source.width,
            src_height = source.height,
            width = placement.width,
            height = placement.height,
            x = placement.x,
            y = placement.y,
            "Compositing clip"
        );

        let job = CompositeJob {
            frame_path: frame_path.clone(),
            video_path: video.to_path_buf(),
            output_path: output.to_path_buf(),
            canvas: frame.image.dimensions(),
            source,
            placement,
            encode: self.encode.clone(),
        };
        self.backend.composite(&job, progress)?;

        Ok(RenderOutput {
            video: output.to_path_buf(),
            frame: frame_path,
            source,
            placement,
        })
    }
}

/// `<dir>/<output stem><frame_suffix>.png`.
pub fn frame_path_for(output: &Path, frame_suffix: &str) -> PathBuf {
    let stem = output
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default();
    output.with_file_name(format!("{stem}{frame_suffix}.png"))
}
