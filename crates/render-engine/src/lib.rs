//! Clipframe Render Engine
//!
//! Composes captioned still frames and composites source clips onto them.
//!
//! # Pipeline Architecture
//!
//! ```text
//! template.png ──┐
//! caption ───────┼── Frame Composer ── <stem>_final_onlyimg.png
//! emoji cache ───┘  (wrap, emoji, banner)        │
//!                                                ├── ffmpeg overlay
//! clip.mp4 ── ffprobe ── Stage fit ──────────────┘        │
//!                                                         ▼
//!                                                 <stem>_final.mp4
//! ```

pub mod batch;
pub mod emoji;
pub mod font;
pub mod frame;
pub mod pipeline;
pub mod text;
pub mod video;

#[cfg(test)]
mod test_support;

pub use batch::{
    discover_inputs, output_path_for, run_batch, run_batch_on, BatchJob, BatchReport, ItemOutcome,
    ItemStatus,
};
pub use emoji::{CdnEmojiSource, EmojiLookup, EmojiResolver, EmojiSource};
pub use frame::{ComposedFrame, FrameComposer};
pub use pipeline::{frame_path_for, RenderOutput, Renderer};
pub use video::{
    command_exists, CompositeJob, EncodeProgress, EncodeStage, FfmpegBackend, FrameRate,
    VideoBackend, VideoInfo,
};
