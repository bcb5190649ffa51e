//! Fetch command implementation.

use anyhow::{Context, Result};
use colored::Colorize;
use wallpaper_core::{ingest_entries, FeedClient, FeedEntry};

use super::{connect_store, print_report};

/// Execute the fetch command.
pub async fn execute(market: &str, count: u32) -> Result<()> {
    let client = FeedClient::new()?;
    let images = client
        .fetch(market, count)
        .await
        .with_context(|| format!("Failed to download the {market} daily feed"))?;

    let entries: Vec<FeedEntry> = images.into_iter().map(FeedEntry::from).collect();
    println!(
        "{} {} images for {}",
        "Fetched".green().bold(),
        entries.len(),
        market
    );

    let store = connect_store().await?;
    let report = ingest_entries(&store, &entries).await;
    print_report(&report);
    Ok(())
}
