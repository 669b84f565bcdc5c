//! Check system capabilities and configured assets.

use clipframe_common::config::AppConfig;
use clipframe_render_engine::command_exists;

pub fn run(config: &AppConfig) -> anyhow::Result<()> {
    println!("clipframe System Check");
    println!("{}", "=".repeat(50));

    let mut ok = true;
    for binary in ["ffmpeg", "ffprobe"] {
        if command_exists(binary) {
            println!("[OK] {binary} found on PATH");
        } else {
            println!("[MISSING] {binary} not found on PATH");
            ok = false;
        }
    }

    for (label, path) in [
        ("Background template", &config.paths.background),
        ("Font", &config.paths.font),
    ] {
        if path.is_file() {
            println!("[OK] {label}: {}", path.display());
        } else {
            println!("[MISSING] {label}: {}", path.display());
            ok = false;
        }
    }

    let cached = std::fs::read_dir(&config.paths.emoji_cache_dir)
        .map(|entries| {
            entries
                .filter_map(Result::ok)
                .filter(|e| e.path().extension().is_some_and(|ext| ext == "png"))
                .count()
        })
        .unwrap_or(0);
    println!(
        "[OK] Emoji cache: {} ({cached} cached)",
        config.paths.emoji_cache_dir.display()
    );

    if config.paths.input_dir.is_dir() {
        println!("[OK] Input directory: {}", config.paths.input_dir.display());
    } else {
        println!(
            "[WARN] Input directory: {} does not exist",
            config.paths.input_dir.display()
        );
    }

    println!();
    if ok {
        println!("All required tools and assets are available. clipframe is ready.");
        Ok(())
    } else {
        anyhow::bail!("Some required tools or assets are missing. See above.")
    }
}
