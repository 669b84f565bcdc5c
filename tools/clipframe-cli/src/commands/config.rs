//! Print or write the default configuration.

use std::path::PathBuf;

use clipframe_common::config::AppConfig;

pub fn run(output: Option<PathBuf>) -> anyhow::Result<()> {
    let config = AppConfig::default();
    match output {
        Some(path) => {
            config.save_to(&path)?;
            println!("Wrote default configuration to {}", path.display());
        }
        None => println!("{}", config.to_json()?),
    }
    Ok(())
}
