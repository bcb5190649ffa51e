//! Ingest command implementation.

use std::path::Path;

use anyhow::{Context, Result};
use colored::Colorize;
use tracing::info;
use wallpaper_core::{feed::read_feed_file, ingest_entries};

use super::{connect_store, print_report};

/// Execute the ingest command.
pub async fn execute(run_type: &str, data_dir: &Path) -> Result<()> {
    let path = data_dir.join(format!("{run_type}_temp.json"));
    let entries = read_feed_file(&path)
        .with_context(|| format!("Failed to read feed file: {}", path.display()))?;
    info!(path = %path.display(), entries = entries.len(), "Read feed file");

    let store = connect_store().await?;
    let report = ingest_entries(&store, &entries).await;

    println!(
        "{} {} ({} entries)",
        "Ingested".green().bold(),
        path.display(),
        report.total()
    );
    print_report(&report);
    Ok(())
}
