//! Clipframe Layout Core
//!
//! Decides where things go on the composed frame:
//! - **Classification:** which characters render as emoji bitmaps, and their cache keys
//! - **Wrapping:** greedy word wrap against a pluggable text measurer
//! - **Geometry:** centering, caption banner box, and the video stage fit
//!
//! This crate is pure computation: no I/O, no image or font dependencies.
//! All inputs are data; all outputs are data.

pub mod classify;
pub mod geometry;
pub mod wrap;

pub use classify::{codepoint_key, is_emoji, split_runs, Run, RunKind};
pub use geometry::{center_offset, BannerGeometry, BannerSpec, Rect, Stage, StagePlacement};
pub use wrap::{stack_lines, wrap_text, TextMeasure, WrappedLine};
