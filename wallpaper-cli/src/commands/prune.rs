//! Prune command implementation.

use std::io::{self, BufRead, Write};
use std::path::PathBuf;

use anyhow::{Context, Result};
use colored::Colorize;
use wallpaper_core::archive::{self, list_backups, sample_files};
use wallpaper_core::{ArchiveError, PruneOptions};

use crate::exit_codes::UsageError;

const SAMPLE_LIMIT: usize = 5;

fn confirm(prompt: &str) -> Result<bool> {
    print!("{prompt} [y/N] ");
    io::stdout().flush().context("Failed to write prompt")?;

    let mut answer = String::new();
    io::stdin()
        .lock()
        .read_line(&mut answer)
        .context("Failed to read confirmation")?;
    Ok(matches!(answer.trim().to_lowercase().as_str(), "y" | "yes"))
}

/// Execute the prune command.
pub fn execute(date: &str, data_dir: PathBuf, backup_dir: Option<PathBuf>, yes: bool) -> Result<()> {
    let cutoff = archive::parse_cutoff(date)
        .ok_or_else(|| UsageError(format!("Invalid date '{date}', expected YYYY-MM-DD")))?;

    if !data_dir.is_dir() {
        return Err(ArchiveError::MissingDataDir(data_dir).into());
    }

    println!("{} {}", "Cutoff:".dimmed(), cutoff);
    println!("{} {}", "Data directory:".dimmed(), data_dir.display());
    match &backup_dir {
        Some(dir) => println!("{} {}", "Backups:".dimmed(), dir.display()),
        None => println!("{} {}", "Backups:".dimmed(), "disabled".yellow()),
    }

    if !yes {
        println!();
        println!("{}", "Sample files:".bold());
        for (name, detected) in sample_files(&data_dir, SAMPLE_LIMIT) {
            let detected = detected.map_or_else(|| "no date".to_string(), |d| d.to_string());
            println!("   {name} ({detected})");
        }
        println!();
        if !confirm("Remove records and files dated before the cutoff?")? {
            println!("{}", "Cancelled".yellow());
            return Ok(());
        }
    }

    let options = PruneOptions {
        cutoff,
        data_dir,
        backup_dir,
    };
    let summary = archive::prune_archives(&options)?;

    println!();
    println!("{}", "Pruning finished".green().bold());
    println!("   {} {}", "Files processed:".dimmed(), summary.processed);
    println!("   {} {}", "Files deleted:".dimmed(), summary.deleted);
    println!("   {} {}", "Files retained:".dimmed(), summary.retained);
    println!("   {} {}", "Records removed:".dimmed(), summary.records_removed);
    println!("   {} {}", "Failed:".dimmed(), summary.failed);
    println!("   {} {}", "Backups:".dimmed(), summary.backups);

    if let Some(dir) = &options.backup_dir {
        if summary.backups > 0 {
            println!();
            println!("{} {}", "Backup files in".bold(), dir.display());
            for (path, size) in list_backups(dir) {
                println!("   {} ({size} bytes)", path.display());
            }
        }
    }

    if summary.failed > 0 {
        anyhow::bail!("{} files could not be processed", summary.failed);
    }
    Ok(())
}
