//! Subcommand implementations.

pub mod check;
pub mod fetch;
pub mod ingest;
pub mod migrate;
pub mod prune;
pub mod readme;

use anyhow::{Context, Result};
use colored::Colorize;
use tracing::info;
use wallpaper_core::{ImageStore, IngestReport, RedisImageStore, StoreConfig};

/// Build the store client from the environment and check that it answers.
pub(crate) async fn connect_store() -> Result<RedisImageStore> {
    let config = StoreConfig::from_env().context("Invalid image store configuration")?;
    info!(host = %config.host, port = config.port, key = %config.set_key, "Connecting to image store");

    let store = RedisImageStore::new(&config).context("Failed to create image store client")?;
    store
        .ping()
        .await
        .with_context(|| format!("Image store at {}:{} is unreachable", config.host, config.port))?;
    Ok(store)
}

/// Print an ingestion summary.
pub(crate) fn print_report(report: &IngestReport) {
    println!();
    println!("   {} {}", "Added:".dimmed(), report.added.to_string().green());
    println!("   {} {}", "Already present:".dimmed(), report.existing);
    let failed = report.failed.to_string();
    if report.failed > 0 {
        println!("   {} {}", "Failed:".dimmed(), failed.red());
    } else {
        println!("   {} {}", "Failed:".dimmed(), failed);
    }
}
