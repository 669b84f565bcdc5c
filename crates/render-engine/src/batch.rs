//! Batch driver: discover clips, render each, collect a report.

use std::path::{Path, PathBuf};
use std::time::Instant;

use chrono::{DateTime, Utc};
use clipframe_common::config::{AppConfig, FailurePolicy};
use clipframe_common::error::{ClipframeError, ClipframeResult};
use serde::{Deserialize, Serialize};

/// Clips with extension `extension` (case-insensitive) in the top level of
/// `input_dir`, sorted by path.
pub fn discover_inputs(input_dir: &Path, extension: &str) -> ClipframeResult<Vec<PathBuf>> {
    if !input_dir.is_dir() {
        return Err(ClipframeError::FileNotFound {
            path: input_dir.to_path_buf(),
        });
    }

    let wanted = extension.trim_start_matches('.');
    let mut files: Vec<PathBuf> = std::fs::read_dir(input_dir)?
        .filter_map(|entry| {
            let path = entry.ok()?.path();
            if !path.is_file() {
                return None;
            }
            path.extension()
                .and_then(|ext| ext.to_str())
                .filter(|ext| ext.eq_ignore_ascii_case(wanted))
                .map(|_| path.clone())
        })
        .collect();

    files.sort();
    Ok(files)
}

/// `<output_dir>/<input stem><suffix>.mp4`.
pub fn output_path_for(input: &Path, output_dir: &Path, suffix: &str) -> PathBuf {
    let stem = input
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default();
    output_dir.join(format!("{stem}{suffix}.mp4"))
}

/// Where to read clips from and write results to.
#[derive(Debug, Clone)]
pub struct BatchJob {
    pub input_dir: PathBuf,
    pub extension: String,
    pub output_dir: PathBuf,
    pub output_suffix: String,
    pub policy: FailurePolicy,
}

impl BatchJob {
    pub fn from_config(config: &AppConfig) -> Self {
        Self {
            input_dir: config.paths.input_dir.clone(),
            extension: config.paths.input_extension.clone(),
            output_dir: config.paths.output_dir.clone(),
            output_suffix: config.encode.output_suffix.clone(),
            policy: config.batch.failure_policy,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ItemStatus {
    Succeeded,
    Failed,
}

/// Result of one clip.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ItemOutcome {
    pub input: PathBuf,
    pub output: PathBuf,
    pub status: ItemStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    pub elapsed_secs: f64,
}

/// Summary of a batch run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BatchReport {
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
    pub items: Vec<ItemOutcome>,
}

impl BatchReport {
    pub fn succeeded(&self) -> usize {
        self.items
            .iter()
            .filter(|i| i.status == ItemStatus::Succeeded)
            .count()
    }

    pub fn failed(&self) -> usize {
        self.items
            .iter()
            .filter(|i| i.status == ItemStatus::Failed)
            .count()
    }

    pub fn has_failures(&self) -> bool {
        self.failed() > 0
    }

    /// Write as pretty JSON, creating the parent directory.
    pub fn write_json(&self, path: &Path) -> ClipframeResult<()> {
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }
        std::fs::write(path, serde_json::to_string_pretty(self)?)?;
        Ok(())
    }
}

/// Discover the job's clips and render each with `render(input, output)`.
pub fn run_batch<F, P>(job: &BatchJob, render: F, on_item: P) -> ClipframeResult<BatchReport>
where
    F: FnMut(&Path, &Path) -> ClipframeResult<()>,
    P: FnMut(&ItemOutcome, usize, usize),
{
    let inputs = discover_inputs(&job.input_dir, &job.extension)?;
    run_batch_on(job, inputs, render, on_item)
}

/// Render `inputs` in order with `render(input, output)`.
///
/// `on_item` is called after each clip with the outcome, its index, and the
/// total. Under [`FailurePolicy::Halt`] the first failure is returned as the
/// error; under [`FailurePolicy::Continue`] it is recorded and the batch
/// moves on.
pub fn run_batch_on<F, P>(
    job: &BatchJob,
    inputs: Vec<PathBuf>,
    mut render: F,
    mut on_item: P,
) -> ClipframeResult<BatchReport>
where
    F: FnMut(&Path, &Path) -> ClipframeResult<()>,
    P: FnMut(&ItemOutcome, usize, usize),
{
    let started_at = Utc::now();

    if inputs.is_empty() {
        tracing::warn!(
            input_dir = %job.input_dir.display(),
            extension = %job.extension,
            "No input clips found"
        );
    } else {
        std::fs::create_dir_all(&job.output_dir)?;
        tracing::info!(count = inputs.len(), input_dir = %job.input_dir.display(), "Starting batch");
    }

    let total = inputs.len();
    let mut items = Vec::with_capacity(total);

    for (index, input) in inputs.into_iter().enumerate() {
        let output = output_path_for(&input, &job.output_dir, &job.output_suffix);
        let start = Instant::now();
        let result = render(&input, &output);
        let elapsed_secs = start.elapsed().as_secs_f64();

        let outcome = match &result {
            Ok(()) => {
                tracing::info!(input = %input.display(), output = %output.display(), elapsed_secs, "Rendered clip");
                ItemOutcome {
                    input,
                    output,
                    status: ItemStatus::Succeeded,
                    error: None,
                    elapsed_secs,
                }
            }
            Err(e) => {
                tracing::error!(input = %input.display(), error = %e, "Failed to render clip");
                ItemOutcome {
                    input,
                    output,
                    status: ItemStatus::Failed,
                    error: Some(e.to_string()),
                    elapsed_secs,
                }
            }
        };

        on_item(&outcome, index, total);

        if let Err(e) = result {
            if job.policy == FailurePolicy::Halt {
                return Err(ClipframeError::batch(format!(
                    "{} failed: {e}",
                    outcome.input.display()
                )));
            }
        }
        items.push(outcome);
    }

    Ok(BatchReport {
        started_at,
        finished_at: Utc::now(),
        items,
    })
}
