//! Check command implementation.

use anyhow::{bail, Result};
use colored::Colorize;

use super::connect_store;
use super::migrate::{connect_postgres, MigrationConfig};

const VARIABLES: &[&str] = &[
    "REDIS_HOST",
    "REDIS_PORT",
    "REDIS_PASSWORD",
    "PASSWORD",
    "REDIS_SSL",
    "REDIS_SET_NAME",
    "PG_HOST",
    "PG_PORT",
    "PG_DATABASE",
    "PG_USER",
    "PG_PASSWORD",
    "PG_TABLE",
    "PG_COLUMN",
    "BATCH_SIZE",
];

/// Mask a secret as its first two and last two characters.
///
/// Values of four characters or fewer are fully masked.
pub fn mask_secret(value: &str) -> String {
    let chars: Vec<char> = value.chars().collect();
    if chars.len() <= 4 {
        return "***".to_string();
    }
    let head: String = chars[..2].iter().collect();
    let tail: String = chars[chars.len() - 2..].iter().collect();
    format!("{head}***{tail}")
}

fn display_value(name: &str, value: Option<String>) -> String {
    match value.filter(|v| !v.is_empty()) {
        Some(v) if name.contains("PASSWORD") => mask_secret(&v),
        Some(v) => v,
        None => "[not set]".dimmed().to_string(),
    }
}

/// Execute the check command.
pub async fn execute() -> Result<()> {
    println!("{}", "Configuration".bold());
    for name in VARIABLES {
        println!("   {:<16} {}", name, display_value(name, std::env::var(name).ok()));
    }
    println!();

    let mut failures = 0;

    match connect_store().await {
        Ok(_) => println!("   {} {}", "Image store:".dimmed(), "OK".green()),
        Err(e) => {
            failures += 1;
            println!("   {} {} ({e:#})", "Image store:".dimmed(), "FAILED".red());
        }
    }

    let postgres = async {
        let config = MigrationConfig::from_env()?;
        let pool = connect_postgres(&config).await?;
        pool.close().await;
        anyhow::Ok(())
    }
    .await;
    match postgres {
        Ok(()) => println!("   {} {}", "PostgreSQL:".dimmed(), "OK".green()),
        Err(e) => {
            failures += 1;
            println!("   {} {} ({e:#})", "PostgreSQL:".dimmed(), "FAILED".red());
        }
    }

    if failures > 0 {
        bail!("{failures} connection check(s) failed");
    }
    Ok(())
}
