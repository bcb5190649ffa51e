//! Migrate command implementation.
//!
//! Copies one column of a PostgreSQL table into the image set using pipelined
//! batches.

use anyhow::{bail, Context, Result};
use colored::Colorize;
use sqlx::postgres::{PgConnectOptions, PgPoolOptions};
use sqlx::PgPool;
use tracing::info;
use wallpaper_core::{insert_batched, ImageStore};

use super::connect_store;
use crate::exit_codes::UsageError;

/// Source table settings, read from `PG_*` variables and `BATCH_SIZE`.
#[derive(Clone)]
pub struct MigrationConfig {
    pub host: String,
    pub port: u16,
    pub database: String,
    pub user: String,
    pub password: Option<String>,
    pub table: String,
    pub column: String,
    pub batch_size: usize,
}

impl std::fmt::Debug for MigrationConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MigrationConfig")
            .field("host", &self.host)
            .field("port", &self.port)
            .field("database", &self.database)
            .field("user", &self.user)
            .field("password", &self.password.as_ref().map(|_| "<redacted>"))
            .field("table", &self.table)
            .field("column", &self.column)
            .field("batch_size", &self.batch_size)
            .finish()
    }
}

impl MigrationConfig {
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |name: &str, default: &str| {
            lookup(name)
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
                .unwrap_or_else(|| default.to_string())
        };

        let port = get("PG_PORT", "5432")
            .parse()
            .context("PG_PORT must be a port number")?;
        let batch_size = get("BATCH_SIZE", "100")
            .parse::<usize>()
            .context("BATCH_SIZE must be a positive integer")?
            .max(1);

        let config = Self {
            host: get("PG_HOST", "localhost"),
            port,
            database: get("PG_DATABASE", "postgres"),
            user: get("PG_USER", "postgres"),
            password: lookup("PG_PASSWORD").filter(|v| !v.is_empty()),
            table: get("PG_TABLE", "bing"),
            column: get("PG_COLUMN", "image"),
            batch_size,
        };

        for (name, value) in [("PG_TABLE", &config.table), ("PG_COLUMN", &config.column)] {
            if !is_identifier(value) {
                bail!(UsageError(format!(
                    "{name} must be a plain SQL identifier, got '{value}'"
                )));
            }
        }
        Ok(config)
    }

    pub fn connect_options(&self) -> PgConnectOptions {
        let options = PgConnectOptions::new()
            .host(&self.host)
            .port(self.port)
            .database(&self.database)
            .username(&self.user);
        match &self.password {
            Some(password) => options.password(password),
            None => options,
        }
    }

    /// Query selecting the source column as text.
    pub fn select_sql(&self) -> String {
        format!("SELECT {}::text FROM {}", self.column, self.table)
    }
}

/// `[A-Za-z_][A-Za-z0-9_]*`
fn is_identifier(value: &str) -> bool {
    let mut chars = value.chars();
    matches!(chars.next(), Some(c) if c.is_ascii_alphabetic() || c == '_')
        && chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
}

/// Open a small pool and run `SELECT 1`.
pub async fn connect_postgres(config: &MigrationConfig) -> Result<PgPool> {
    let pool = PgPoolOptions::new()
        .max_connections(2)
        .connect_with(config.connect_options())
        .await
        .with_context(|| format!("Failed to connect to PostgreSQL at {}:{}", config.host, config.port))?;

    sqlx::query("SELECT 1")
        .execute(&pool)
        .await
        .context("PostgreSQL health query failed")?;
    Ok(pool)
}

/// Execute the migrate command.
pub async fn execute() -> Result<()> {
    let config = MigrationConfig::from_env()?;
    info!(config = ?config, "Migration configured");

    let store = connect_store().await?;
    let pool = connect_postgres(&config).await?;
    println!("{} both connections", "Checked".green().bold());

    let rows: Vec<Option<String>> = sqlx::query_scalar(&config.select_sql())
        .fetch_all(&pool)
        .await
        .with_context(|| format!("Failed to read {}.{}", config.table, config.column))?;
    pool.close().await;

    let source_rows = rows.len();
    let records: Vec<String> = rows.into_iter().flatten().collect();
    let skipped = source_rows - records.len();
    info!(source_rows, skipped, "Loaded source rows");

    let report = insert_batched(&store, &records, config.batch_size).await;
    let set_size = store
        .cardinality()
        .await
        .context("Failed to read the image set size")?;

    println!();
    println!("   {} {}", "Source rows:".dimmed(), source_rows);
    println!("   {} {}", "Null values skipped:".dimmed(), skipped);
    println!("   {} {}", "Inserted:".dimmed(), report.added.to_string().green());
    println!("   {} {}", "Already present:".dimmed(), report.existing);
    println!("   {} {}", "Failed:".dimmed(), report.failed);
    println!("   {} {}", "Set size:".dimmed(), set_size);

    if report.failed > 0 {
        bail!("{} records could not be inserted", report.failed);
    }
    Ok(())
}
