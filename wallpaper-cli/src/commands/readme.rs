//! Readme command implementation.

use std::path::Path;

use anyhow::{Context, Result};
use chrono::Local;
use colored::Colorize;
use wallpaper_core::{load_all_archive, render_readme};

/// Execute the readme command.
pub fn execute(data_dir: &Path, output: &Path) -> Result<()> {
    let zh = load_all_archive(&data_dir.join("zh-CN_all.json"))?;
    let en = load_all_archive(&data_dir.join("en-US_all.json"))?;

    let generated_at = Local::now().format("%Y-%m-%d %H:%M:%S").to_string();
    let readme = render_readme(&zh, &en, &generated_at);

    std::fs::write(output, readme)
        .with_context(|| format!("Failed to write {}", output.display()))?;

    println!(
        "{} {} ({} days)",
        "Wrote".green().bold(),
        output.display(),
        zh.len().min(en.len())
    );
    Ok(())
}
