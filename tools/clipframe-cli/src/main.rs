//! clipframe CLI: batch-render captioned clips.
//!
//! Usage:
//!   clipframe render [OPTIONS]    Render every clip in the input directory
//!   clipframe check               Check ffmpeg and asset availability
//!   clipframe config              Print or write the default configuration

use std::path::{Path, PathBuf};

use clap::{Args, Parser, Subcommand};
use clipframe_common::config::{config_file_path, AppConfig, LoggingConfig};

mod commands;

#[derive(Parser)]
#[command(
    name = "clipframe",
    about = "Caption, frame, and encode short vertical videos in batch",
    version,
    author
)]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Render every matching clip in the input directory
    Render(RenderArgs),

    /// Check ffmpeg, ffprobe, template, and font availability
    Check {
        /// Configuration file (defaults to the XDG config location)
        #[arg(short, long)]
        config: Option<PathBuf>,
    },

    /// Print the default configuration, or write it to a file
    Config {
        /// Write to this path instead of stdout
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
}

#[derive(Args)]
pub struct RenderArgs {
    /// Configuration file (defaults to the XDG config location)
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Directory scanned for source clips
    #[arg(long)]
    pub input_dir: Option<PathBuf>,

    /// Directory receiving rendered videos
    #[arg(long)]
    pub output_dir: Option<PathBuf>,

    /// Caption drawn above the clip
    #[arg(long)]
    pub top_text: Option<String>,

    /// Caption drawn inside the banner
    #[arg(long)]
    pub bottom_text: Option<String>,

    /// Stop at the first clip that fails
    #[arg(long)]
    pub halt_on_error: bool,

    /// Write a JSON batch report to this path
    #[arg(long)]
    pub report: Option<PathBuf>,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Render(args) => {
            let config = load_config(args.config.as_deref(), cli.verbose)?;
            commands::render::run(config, args)
        }
        Commands::Check { config } => {
            let config = load_config(config.as_deref(), cli.verbose)?;
            commands::check::run(&config)
        }
        Commands::Config { output } => commands::config::run(output),
    }
}

/// Load the configuration, then install logging from it.
///
/// An explicit `--config` must load. The XDG file is optional, and an
/// unreadable one falls back to defaults with a warning once logging is up.
fn load_config(path: Option<&Path>, verbose: bool) -> anyhow::Result<AppConfig> {
    let (config, fallback) = match path {
        Some(path) => (AppConfig::load_from(path)?, None),
        None => match AppConfig::load_optional(&config_file_path()) {
            Ok(config) => (config.unwrap_or_default(), None),
            Err(e) => (AppConfig::default(), Some(e)),
        },
    };

    clipframe_common::logging::init_logging(&logging_for(&config, verbose));
    if let Some(e) = fallback {
        tracing::warn!(error = %e, "Using default configuration");
    }
    Ok(config)
}

/// The config's logging section, with `-v` forcing debug.
fn logging_for(config: &AppConfig, verbose: bool) -> LoggingConfig {
    let mut logging = config.logging.clone();
    if verbose {
        logging.level = "debug".to_string();
    }
    logging
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_logging_comes_from_config() {
        let mut config = AppConfig::default();
        config.logging.level = "clipframe_render_engine=trace".to_string();
        config.logging.json = true;

        let logging = logging_for(&config, false);
        assert_eq!(logging.level, "clipframe_render_engine=trace");
        assert!(logging.json);
    }

    #[test]
    fn test_verbose_forces_debug_and_keeps_format() {
        let mut config = AppConfig::default();
        config.logging.json = true;

        let logging = logging_for(&config, true);
        assert_eq!(logging.level, "debug");
        assert!(logging.json);
    }
}
