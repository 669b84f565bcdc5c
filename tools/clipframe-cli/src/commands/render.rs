//! Render every clip in the input directory.

use std::time::Duration;

use clipframe_common::config::{AppConfig, FailurePolicy};
use clipframe_render_engine::{
    discover_inputs, run_batch_on, BatchJob, EncodeProgress, ItemStatus, Renderer,
};
use indicatif::{ProgressBar, ProgressStyle};

use crate::RenderArgs;

pub fn run(mut config: AppConfig, args: RenderArgs) -> anyhow::Result<()> {
    if let Some(dir) = args.input_dir {
        config.paths.input_dir = dir;
    }
    if let Some(dir) = args.output_dir {
        config.paths.output_dir = dir;
    }
    if let Some(text) = args.top_text {
        config.caption.top_text = text;
    }
    if let Some(text) = args.bottom_text {
        config.caption.bottom_text = text;
    }
    if args.halt_on_error {
        config.batch.failure_policy = FailurePolicy::Halt;
    }

    let renderer = Renderer::from_config(&config)?;
    let job = BatchJob::from_config(&config);
    let caption = config.caption.clone();

    println!("Rendering clips from: {}", job.input_dir.display());
    println!("  Output: {}", job.output_dir.display());

    let inputs = discover_inputs(&job.input_dir, &job.extension)?;
    let bar = progress_bar(inputs.len() as u64)?;

    let report = run_batch_on(
        &job,
        inputs,
        |input, output| {
            let name = input
                .file_name()
                .map(|n| n.to_string_lossy().into_owned())
                .unwrap_or_default();
            bar.set_message(name.clone());
            let on_progress = |p: EncodeProgress| {
                bar.set_message(format!("{name} {:.0}%", p.progress * 100.0));
            };
            renderer
                .render_one(input, &caption, output, Some(&on_progress))
                .map(|_| ())
        },
        |outcome, _index, _total| {
            bar.inc(1);
            if outcome.status == ItemStatus::Failed {
                bar.println(format!(
                    "  FAILED {}: {}",
                    outcome.input.display(),
                    outcome.error.as_deref().unwrap_or("unknown error")
                ));
            }
        },
    );
    bar.finish_and_clear();
    let report = report?;

    if let Some(path) = &args.report {
        report.write_json(path)?;
        println!("  Report: {}", path.display());
    }

    println!(
        "Rendered {} of {} clips",
        report.succeeded(),
        report.items.len()
    );

    if report.has_failures() {
        anyhow::bail!("{} clip(s) failed", report.failed());
    }
    Ok(())
}

/// A bar sized to the whole batch, so the first clip already shows `0/total`.
fn progress_bar(total: u64) -> anyhow::Result<ProgressBar> {
    let bar = ProgressBar::new(total);
    bar.set_style(
        ProgressStyle::default_bar()
            .template("{spinner:.green} {msg} [{bar:40.cyan/blue}] {pos}/{len} ({eta})")?
            .progress_chars("█▓▒░ "),
    );
    bar.enable_steady_tick(Duration::from_millis(100));
    Ok(bar)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_progress_bar_knows_total_up_front() {
        let bar = progress_bar(3).unwrap();
        assert_eq!(bar.length(), Some(3));
        assert_eq!(bar.position(), 0);
        bar.finish_and_clear();
    }
}
