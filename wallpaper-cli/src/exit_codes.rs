//! Exit codes following sysexits.h conventions.
//!
//! These codes provide semantic meaning for different failure modes,
//! enabling cron jobs and CI workflows to react appropriately.

use thiserror::Error;
use wallpaper_core::{ArchiveError, FeedError, StoreError};

/// Successful execution.
pub const SUCCESS: i32 = 0;

/// General error (catch-all).
pub const GENERAL_ERROR: i32 = 1;

/// Command line usage error (invalid arguments).
/// Maps to EX_USAGE from sysexits.h.
pub const USAGE_ERROR: i32 = 64;

/// Input data could not be parsed.
/// Maps to EX_DATAERR from sysexits.h.
pub const DATA_ERROR: i32 = 65;

/// Cannot open input file or directory.
/// Maps to EX_NOINPUT from sysexits.h.
pub const INPUT_ERROR: i32 = 66;

/// Service unavailable (image store, database, daily feed).
/// Maps to EX_UNAVAILABLE from sysexits.h.
pub const NETWORK_ERROR: i32 = 69;

/// I/O error (cannot write output file).
/// Maps to EX_IOERR from sysexits.h.
pub const IO_ERROR: i32 = 74;

/// Missing or invalid configuration.
/// Maps to EX_CONFIG from sysexits.h.
pub const CONFIG_ERROR: i32 = 78;

/// An argument that parsed but is not acceptable.
#[derive(Debug, Error)]
#[error("{0}")]
pub struct UsageError(pub String);

/// Represents an exit code with optional error context.
pub struct ExitCode {
    pub code: i32,
    pub message: Option<String>,
}

impl ExitCode {
    pub const fn success() -> Self {
        Self {
            code: SUCCESS,
            message: None,
        }
    }

    pub fn from_anyhow(err: &anyhow::Error) -> Self {
        let message = format!("{err:#}");
        Self {
            code: classify(err),
            message: Some(message),
        }
    }
}

fn classify(err: &anyhow::Error) -> i32 {
    for cause in err.chain() {
        if cause.is::<UsageError>() {
            return USAGE_ERROR;
        }
        if let Some(e) = cause.downcast_ref::<StoreError>() {
            return match e {
                StoreError::Config(_) => CONFIG_ERROR,
                _ => NETWORK_ERROR,
            };
        }
        if let Some(e) = cause.downcast_ref::<FeedError>() {
            return match e {
                FeedError::Io { .. } => INPUT_ERROR,
                FeedError::Parse(_) => DATA_ERROR,
                FeedError::Http(_) | FeedError::Status(_) => NETWORK_ERROR,
            };
        }
        if let Some(e) = cause.downcast_ref::<ArchiveError>() {
            return match e {
                ArchiveError::MissingDataDir(_) | ArchiveError::MissingInput(_) => INPUT_ERROR,
                ArchiveError::Json { .. } => DATA_ERROR,
                ArchiveError::Io { .. } => IO_ERROR,
            };
        }
        if cause.is::<sqlx::Error>() {
            return NETWORK_ERROR;
        }
        if cause.is::<std::io::Error>() {
            return IO_ERROR;
        }
    }
    GENERAL_ERROR
}
