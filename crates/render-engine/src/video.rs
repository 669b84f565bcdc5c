//! Video compositing: the composed frame as a static background with the
//! scaled source clip overlaid on the stage.

use std::fmt;
use std::io::{BufRead, BufReader, Read};
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};

use clipframe_common::config::EncodeConfig;
use clipframe_common::error::{ClipframeError, ClipframeResult};
use clipframe_layout_core::StagePlacement;
use serde::{Deserialize, Serialize};

/// An exact rational frame rate, as reported by ffprobe.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct FrameRate {
    pub num: u32,
    pub den: u32,
}

impl FrameRate {
    /// Parse `"30000/1001"` or `"25"`. Zero rates (`"0/0"`) are rejected.
    pub fn parse(raw: &str) -> Option<Self> {
        let raw = raw.trim();
        let (num, den) = match raw.split_once('/') {
            Some((n, d)) => (n.parse().ok()?, d.parse().ok()?),
            None => (raw.parse().ok()?, 1),
        };
        if num == 0 || den == 0 {
            return None;
        }
        Some(Self { num, den })
    }

    pub fn as_f64(&self) -> f64 {
        self.num as f64 / self.den as f64
    }
}

impl fmt::Display for FrameRate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.num, self.den)
    }
}

/// What the compositor needs to know about a source clip.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct VideoInfo {
    pub width: u32,
    pub height: u32,
    pub frame_rate: FrameRate,
    pub duration_secs: f64,
    pub has_audio: bool,
}

/// One compositing run.
#[derive(Debug, Clone)]
pub struct CompositeJob {
    /// Composed still frame (background layer).
    pub frame_path: PathBuf,
    /// Source clip (foreground layer and audio).
    pub video_path: PathBuf,
    pub output_path: PathBuf,
    /// Size of the composed frame.
    pub canvas: (u32, u32),
    pub source: VideoInfo,
    pub placement: StagePlacement,
    pub encode: EncodeConfig,
}

/// Encode progress report.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EncodeProgress {
    /// Current progress [0.0, 1.0].
    pub progress: f64,

    /// Output timestamp reached so far.
    pub out_time_secs: f64,

    /// Estimated time remaining in seconds.
    pub eta_secs: f64,

    pub stage: EncodeStage,
}

/// Stages of one compositing run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EncodeStage {
    Preparing,
    Encoding,
    Finalizing,
    Complete,
}

/// Progress callback for encoding.
pub type ProgressCallback<'a> = &'a dyn Fn(EncodeProgress);

/// Trait for video backends.
pub trait VideoBackend {
    /// Inspect a source clip.
    fn probe(&self, path: &Path) -> ClipframeResult<VideoInfo>;

    /// Render the composite described by `job`. Blocks until done.
    fn composite(
        &self,
        job: &CompositeJob,
        progress: Option<ProgressCallback<'_>>,
    ) -> ClipframeResult<()>;

    /// Check if this backend is available on the system.
    fn is_available(&self) -> bool;

    /// Backend name.
    fn name(&self) -> &str;
}

/// Backend driving the `ffmpeg` and `ffprobe` executables.
#[derive(Debug, Clone, Default)]
pub struct FfmpegBackend;

impl FfmpegBackend {
    pub fn new() -> Self {
        Self
    }
}

impl VideoBackend for FfmpegBackend {
    fn probe(&self, path: &Path) -> ClipframeResult<VideoInfo> {
        ClipframeError::require_file(path)?;
        let output = Command::new("ffprobe")
            .args([
                "-v",
                "error",
                "-show_entries",
                "stream=codec_type,width,height,avg_frame_rate,r_frame_rate:format=duration",
                "-of",
                "json",
            ])
            .arg(path)
            .output()
            .map_err(|e| ClipframeError::probe(format!("Failed to start ffprobe: {e}")))?;

        if !output.status.success() {
            return Err(ClipframeError::probe(format!(
                "ffprobe failed on {} (status {}): {}",
                path.display(),
                output.status,
                String::from_utf8_lossy(&output.stderr).trim()
            )));
        }

        let raw = String::from_utf8_lossy(&output.stdout);
        let info = parse_probe_output(&raw)
            .map_err(|e| ClipframeError::probe(format!("{}: {e}", path.display())))?;
        tracing::debug!(
            path = %path.display(),
            width = info.width,
            height = info.height,
            fps = %info.frame_rate,
            duration_secs = info.duration_secs,
            has_audio = info.has_audio,
            "Probed source clip"
        );
        Ok(info)
    }

    fn composite(
        &self,
        job: &CompositeJob,
        progress: Option<ProgressCallback<'_>>,
    ) -> ClipframeResult<()> {
        if let Some(parent) = job.output_path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }

        if let Some(cb) = progress {
            cb(EncodeProgress {
                progress: 0.0,
                out_time_secs: 0.0,
                eta_secs: 0.0,
                stage: EncodeStage::Preparing,
            });
        }

        let args = build_ffmpeg_args(job);
        run_ffmpeg(&args, job.source.duration_secs, progress)
    }

    fn is_available(&self) -> bool {
        command_exists("ffmpeg") && command_exists("ffprobe")
    }

    fn name(&self) -> &str {
        "ffmpeg"
    }
}

#[derive(Debug, Deserialize)]
struct ProbeOutput {
    #[serde(default)]
    streams: Vec<ProbeStream>,
    format: Option<ProbeFormat>,
}

#[derive(Debug, Deserialize)]
struct ProbeStream {
    codec_type: Option<String>,
    width: Option<u32>,
    height: Option<u32>,
    avg_frame_rate: Option<String>,
    r_frame_rate: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ProbeFormat {
    duration: Option<String>,
}

/// Extract `VideoInfo` from `ffprobe -of json` output.
fn parse_probe_output(raw: &str) -> ClipframeResult<VideoInfo> {
    let probe: ProbeOutput = serde_json::from_str(raw)?;

    let video = probe
        .streams
        .iter()
        .find(|s| s.codec_type.as_deref() == Some("video"))
        .ok_or_else(|| ClipframeError::probe("no video stream"))?;

    let (width, height) = match (video.width, video.height) {
        (Some(w), Some(h)) if w > 0 && h > 0 => (w, h),
        _ => return Err(ClipframeError::probe("video stream has no dimensions")),
    };

    let frame_rate = video
        .avg_frame_rate
        .as_deref()
        .and_then(FrameRate::parse)
        .or_else(|| video.r_frame_rate.as_deref().and_then(FrameRate::parse))
        .ok_or_else(|| ClipframeError::probe("video stream has no frame rate"))?;

    let duration_secs = probe
        .format
        .and_then(|f| f.duration)
        .and_then(|d| d.trim().parse::<f64>().ok())
        .filter(|d| *d > 0.0)
        .ok_or_else(|| ClipframeError::probe("container has no duration"))?;

    let has_audio = probe
        .streams
        .iter()
        .any(|s| s.codec_type.as_deref() == Some("audio"));

    Ok(VideoInfo {
        width,
        height,
        frame_rate,
        duration_secs,
        has_audio,
    })
}

/// Filter graph: scale the clip, overlay it on the looped frame, and trim
/// the canvas to even dimensions for yuv420p.
fn build_filter_graph(job: &CompositeJob) -> String {
    let (canvas_w, canvas_h) = job.canvas;
    let even_w = canvas_w & !1;
    let even_h = canvas_h & !1;

    let mut graph = format!(
        "[1:v]scale={w}:{h}:flags=lanczos,setsar=1[clip];[0:v][clip]overlay=x={x}:y={y}:eof_action=pass",
        w = job.placement.width,
        h = job.placement.height,
        x = job.placement.x,
        y = job.placement.y,
    );
    if even_w != canvas_w || even_h != canvas_h {
        graph.push_str(&format!(",crop={even_w}:{even_h}:0:0"));
    }
    graph.push_str(",format=yuv420p[vout]");
    graph
}

fn build_ffmpeg_args(job: &CompositeJob) -> Vec<String> {
    let fps = job.source.frame_rate.to_string();
    let mut args = vec![
        "-y".to_string(),
        "-hide_banner".to_string(),
        "-loglevel".to_string(),
        "error".to_string(),
        "-nostats".to_string(),
        "-progress".to_string(),
        "pipe:1".to_string(),
        "-loop".to_string(),
        "1".to_string(),
        "-framerate".to_string(),
        fps.clone(),
        "-i".to_string(),
        job.frame_path.display().to_string(),
        "-i".to_string(),
        job.video_path.display().to_string(),
        "-filter_complex".to_string(),
        build_filter_graph(job),
        "-map".to_string(),
        "[vout]".to_string(),
    ];

    if job.source.has_audio {
        args.push("-map".to_string());
        args.push("1:a:0".to_string());
    }

    args.extend([
        "-r".to_string(),
        fps,
        "-t".to_string(),
        format!("{:.6}", job.source.duration_secs),
        "-c:v".to_string(),
        job.encode.video_codec.clone(),
        "-pix_fmt".to_string(),
        "yuv420p".to_string(),
    ]);

    if job.source.has_audio {
        args.push("-c:a".to_string());
        args.push(job.encode.audio_codec.clone());
    }

    args.extend([
        "-threads".to_string(),
        job.encode.threads.max(1).to_string(),
        "-movflags".to_string(),
        "+faststart".to_string(),
        job.output_path.display().to_string(),
    ]);

    args
}

fn run_ffmpeg(
    args: &[String],
    expected_duration_secs: f64,
    progress: Option<ProgressCallback<'_>>,
) -> ClipframeResult<()> {
    tracing::debug!(?args, "Running ffmpeg");
    let mut cmd = Command::new("ffmpeg");
    cmd.args(args).stdout(Stdio::piped()).stderr(Stdio::piped());

    let start = std::time::Instant::now();
    let mut child = cmd
        .spawn()
        .map_err(|e| ClipframeError::encode(format!("Failed to start ffmpeg: {e}")))?;

    tracing::debug!(pid = child.id(), "ffmpeg process started");

    let stdout = child
        .stdout
        .take()
        .ok_or_else(|| ClipframeError::encode("Failed to capture ffmpeg stdout"))?;
    let stderr = child
        .stderr
        .take()
        .ok_or_else(|| ClipframeError::encode("Failed to capture ffmpeg stderr"))?;

    // Drain stderr concurrently to avoid ffmpeg blocking on a full stderr pipe.
    let stderr_task = std::thread::spawn(move || -> String {
        let mut reader = BufReader::new(stderr);
        let mut output = String::new();
        match reader.read_to_string(&mut output) {
            Ok(_) => output,
            Err(err) => format!("<failed to read ffmpeg stderr: {err}>"),
        }
    });

    let mut reader = BufReader::new(stdout);
    let mut line = String::new();
    let mut state = ProgressState::default();
    loop {
        line.clear();
        let bytes = reader
            .read_line(&mut line)
            .map_err(|e| ClipframeError::encode(format!("Failed reading ffmpeg progress: {e}")))?;
        if bytes == 0 {
            break;
        }

        if let Some((key, value)) = line.trim().split_once('=') {
            state.update(key, value);
            if key == "progress" {
                if let Some(cb) = progress {
                    cb(progress_report(
                        &state,
                        expected_duration_secs,
                        start.elapsed().as_secs_f64(),
                    ));
                }
            }
        }
    }

    let status = child
        .wait()
        .map_err(|e| ClipframeError::encode(format!("Failed to wait on ffmpeg: {e}")))?;

    let stderr_output = stderr_task
        .join()
        .unwrap_or_else(|_| "<failed to join stderr reader>".to_string());

    if !status.success() {
        return Err(ClipframeError::encode(format!(
            "ffmpeg failed (status {}): {}",
            status,
            stderr_output.trim()
        )));
    }

    if let Some(cb) = progress {
        cb(EncodeProgress {
            progress: 1.0,
            out_time_secs: expected_duration_secs,
            eta_secs: 0.0,
            stage: EncodeStage::Complete,
        });
    }

    Ok(())
}

/// Whether `binary` resolves on PATH.
pub fn command_exists(binary: &str) -> bool {
    Command::new("sh")
        .arg("-c")
        .arg(format!("command -v {binary} >/dev/null 2>&1"))
        .status()
        .map(|status| status.success())
        .unwrap_or(false)
}

#[derive(Debug, Default)]
struct ProgressState {
    out_time_secs: f64,
    complete: bool,
}

impl ProgressState {
    fn update(&mut self, key: &str, value: &str) {
        match key {
            // ffmpeg reports microseconds under both names.
            "out_time_ms" | "out_time_us" => {
                if let Ok(us) = value.parse::<f64>() {
                    self.out_time_secs = us / 1_000_000.0;
                }
            }
            "progress" => {
                self.complete = value == "end";
            }
            _ => {}
        }
    }
}

fn progress_report(
    state: &ProgressState,
    expected_duration_secs: f64,
    elapsed_secs: f64,
) -> EncodeProgress {
    let progress = if expected_duration_secs <= 0.0 {
        0.0
    } else {
        (state.out_time_secs / expected_duration_secs).clamp(0.0, 1.0)
    };

    let eta_secs = if progress > 0.0 {
        (elapsed_secs / progress) - elapsed_secs
    } else {
        0.0
    }
    .max(0.0);

    EncodeProgress {
        progress: if state.complete { 1.0 } else { progress },
        out_time_secs: state.out_time_secs,
        eta_secs,
        stage: if state.complete {
            EncodeStage::Finalizing
        } else {
            EncodeStage::Encoding
        },
    }
}
