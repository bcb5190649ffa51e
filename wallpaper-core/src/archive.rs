//! Pruning of on-disk feed archives by date.
//!
//! The data directory holds two kinds of JSON files:
//!
//! - Aggregate archives (`*_all.json`, `*_update.json`) whose embedded records
//!   are filtered against the cutoff and the file rewritten in place.
//! - Snapshot files such as `de-DE_2022-05-05_14-19-25.json`, deleted as a
//!   whole when the date in their name precedes the cutoff.
//!
//! Running the job twice with the same cutoff leaves the tree unchanged the
//! second time.

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::LazyLock;

use chrono::NaiveDate;
use regex::Regex;
use serde_json::{Map, Value};
use thiserror::Error;
use tracing::{error, info, warn};
use walkdir::WalkDir;

/// Suffixes identifying aggregate archives.
const AGGREGATE_SUFFIXES: &[&str] = &["_all.json", "_update.json"];

/// File name date patterns, tried in order. Each captures year, month, day.
static FILENAME_DATE_PATTERNS: LazyLock<Vec<Regex>> = LazyLock::new(|| {
    [
        r"^[a-z]{2}-[A-Z]{2}_(\d{4})-(\d{2})-(\d{2})_\d{2}-\d{2}-\d{2}\.json$",
        r"(\d{4})(\d{2})(\d{2})",
        r"(\d{4})-(\d{2})-(\d{2})",
        r"(\d{4})_(\d{2})_(\d{2})",
        r"(\d{4})\.(\d{2})\.(\d{2})",
    ]
    .iter()
    .map(|p| Regex::new(p).expect("file name date pattern is valid"))
    .collect()
});

/// Errors raised by the pruning job.
#[derive(Debug, Error)]
pub enum ArchiveError {
    /// The data directory does not exist
    #[error("Data directory does not exist: {0}")]
    MissingDataDir(PathBuf),

    /// A required input file does not exist
    #[error("Input file does not exist: {0}")]
    MissingInput(PathBuf),

    /// File system failure
    #[error("I/O error on {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// File content is not the expected JSON
    #[error("Invalid JSON in {path}: {reason}")]
    Json { path: PathBuf, reason: String },
}

impl ArchiveError {
    pub(crate) fn io(path: &Path, source: std::io::Error) -> Self {
        if source.kind() == std::io::ErrorKind::NotFound {
            return Self::MissingInput(path.to_path_buf());
        }
        Self::Io {
            path: path.to_path_buf(),
            source,
        }
    }
}

/// Which aggregate layout a file uses.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArchiveKind {
    /// `{"data": [...], "Total": n}` filtered on `enddate`
    All,
    /// `{"images": [...]}` filtered on `startdate`
    Update,
    /// Aggregate name but neither layout; left untouched
    Unknown,
}

impl ArchiveKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::All => "all",
            Self::Update => "update",
            Self::Unknown => "unknown",
        }
    }
}

/// What happened to one file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FileOutcome {
    /// Aggregate archive filtered (and rewritten when anything changed)
    Filtered {
        kind: ArchiveKind,
        before: usize,
        after: usize,
    },
    /// Snapshot file removed
    Deleted { date: NaiveDate },
    /// Snapshot file dated on or after the cutoff
    Retained { date: NaiveDate },
    /// Snapshot file without a recognisable date
    NoDate,
}

/// Settings for one pruning run.
#[derive(Debug, Clone)]
pub struct PruneOptions {
    /// Records and files dated strictly before this day are removed
    pub cutoff: NaiveDate,
    /// Root of the archive tree
    pub data_dir: PathBuf,
    /// Where to copy files before changing them; `None` disables backups
    pub backup_dir: Option<PathBuf>,
}

/// Totals for one pruning run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PruneSummary {
    pub processed: usize,
    pub deleted: usize,
    pub retained: usize,
    pub records_removed: usize,
    pub failed: usize,
    pub backups: usize,
}

/// Parse a `YYYY-MM-DD` cutoff date.
pub fn parse_cutoff(value: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(value.trim(), "%Y-%m-%d").ok()
}

/// Whether `name` follows the aggregate archive naming convention.
pub fn is_aggregate_archive(name: &str) -> bool {
    AGGREGATE_SUFFIXES.iter().any(|suffix| name.ends_with(suffix))
}

/// Extract a calendar date from a file name.
///
/// Patterns are tried in order; a pattern whose first match is not a real
/// date is skipped.
pub fn extract_date_from_filename(name: &str) -> Option<NaiveDate> {
    FILENAME_DATE_PATTERNS.iter().find_map(|pattern| {
        let caps = pattern.captures(name)?;
        let year = caps.get(1)?.as_str().parse().ok()?;
        let month = caps.get(2)?.as_str().parse().ok()?;
        let day = caps.get(3)?.as_str().parse().ok()?;
        NaiveDate::from_ymd_opt(year, month, day)
    })
}

/// Whether an archive record should survive the cutoff.
///
/// The date is the first eight characters (`YYYYMMDD`) of `field`. Records
/// without a usable date are kept.
pub fn record_is_current(record: &Value, field: &str, cutoff: NaiveDate) -> bool {
    let Some(raw) = record.get(field).and_then(Value::as_str) else {
        return true;
    };
    let digits: String = raw.chars().take(8).collect();
    if digits.chars().count() < 8 || !digits.chars().all(|c| c.is_ascii_digit()) {
        return true;
    }
    match NaiveDate::parse_from_str(&digits, "%Y%m%d") {
        Ok(date) => date >= cutoff,
        Err(e) => {
            warn!(date = raw, error = %e, "Unparsable record date, keeping record");
            true
        }
    }
}

/// Copy `path` to `<backup_dir>/<path relative to data_dir>.bak`.
pub fn backup_file(path: &Path, data_dir: &Path, backup_dir: &Path) -> Result<PathBuf, ArchiveError> {
    let relative = path
        .strip_prefix(data_dir)
        .map(Path::to_path_buf)
        .unwrap_or_else(|_| PathBuf::from(path.file_name().unwrap_or_default()));

    let mut target = backup_dir.join(relative).into_os_string();
    target.push(".bak");
    let target = PathBuf::from(target);

    if let Some(parent) = target.parent() {
        fs::create_dir_all(parent).map_err(|e| ArchiveError::io(parent, e))?;
    }
    fs::copy(path, &target).map_err(|e| ArchiveError::io(path, e))?;

    info!(backup = %target.display(), "Created backup");
    Ok(target)
}

fn filter_records(
    object: &mut Map<String, Value>,
    array_key: &str,
    date_field: &str,
    cutoff: NaiveDate,
) -> (usize, usize) {
    let Some(Value::Array(records)) = object.get_mut(array_key) else {
        return (0, 0);
    };
    let before = records.len();
    records.retain(|record| record_is_current(record, date_field, cutoff));
    (before, records.len())
}

fn write_pretty(path: &Path, value: &Value) -> Result<(), ArchiveError> {
    let mut out = Vec::new();
    let formatter = serde_json::ser::PrettyFormatter::with_indent(b"    ");
    let mut serializer = serde_json::Serializer::with_formatter(&mut out, formatter);
    serde::Serialize::serialize(value, &mut serializer).map_err(|e| ArchiveError::Json {
        path: path.to_path_buf(),
        reason: e.to_string(),
    })?;
    fs::write(path, out).map_err(|e| ArchiveError::io(path, e))
}

/// Backs up `path` when backups are enabled. Returns whether a copy was made.
fn maybe_backup(path: &Path, options: &PruneOptions) -> bool {
    let Some(backup_dir) = &options.backup_dir else {
        return false;
    };
    match backup_file(path, &options.data_dir, backup_dir) {
        Ok(_) => true,
        Err(e) => {
            error!(path = %path.display(), error = %e, "Backup failed, continuing");
            false
        }
    }
}

fn process_aggregate(path: &Path, options: &PruneOptions) -> Result<FileOutcome, ArchiveError> {
    let bytes = fs::read(path).map_err(|e| ArchiveError::io(path, e))?;
    let mut value: Value = serde_json::from_slice(&bytes).map_err(|e| ArchiveError::Json {
        path: path.to_path_buf(),
        reason: e.to_string(),
    })?;
    let object = value.as_object_mut().ok_or_else(|| ArchiveError::Json {
        path: path.to_path_buf(),
        reason: "top-level value is not an object".into(),
    })?;

    let (kind, before, after) = if object.contains_key("data") {
        let (before, after) = filter_records(object, "data", "enddate", options.cutoff);
        if object.contains_key("Total") {
            object.insert("Total".into(), Value::from(after));
        }
        (ArchiveKind::All, before, after)
    } else if object.contains_key("images") {
        let (before, after) = filter_records(object, "images", "startdate", options.cutoff);
        (ArchiveKind::Update, before, after)
    } else {
        (ArchiveKind::Unknown, 0, 0)
    };

    if before != after {
        write_pretty(path, &value)?;
    }

    info!(
        file = %path.display(),
        kind = kind.as_str(),
        before,
        after,
        removed = before - after,
        "Filtered archive"
    );
    Ok(FileOutcome::Filtered { kind, before, after })
}

fn process_snapshot(path: &Path, name: &str, options: &PruneOptions) -> Result<FileOutcome, ArchiveError> {
    let Some(date) = extract_date_from_filename(name) else {
        info!(file = name, "Retaining file (no date found)");
        return Ok(FileOutcome::NoDate);
    };

    if date < options.cutoff {
        fs::remove_file(path).map_err(|e| ArchiveError::io(path, e))?;
        info!(file = name, %date, "Deleted file");
        Ok(FileOutcome::Deleted { date })
    } else {
        info!(file = name, %date, "Retaining file");
        Ok(FileOutcome::Retained { date })
    }
}

/// Process a single JSON file. The boolean reports whether a backup was made.
///
/// With backups enabled the file is copied before it is inspected, whatever
/// the outcome.
pub fn process_file(path: &Path, options: &PruneOptions) -> Result<(FileOutcome, bool), ArchiveError> {
    let name = path
        .file_name()
        .and_then(|n| n.to_str())
        .unwrap_or_default();

    let backed_up = maybe_backup(path, options);
    let outcome = if is_aggregate_archive(name) {
        process_aggregate(path, options)?
    } else {
        process_snapshot(path, name, options)?
    };
    Ok((outcome, backed_up))
}

fn json_files(dir: &Path) -> impl Iterator<Item = PathBuf> {
    WalkDir::new(dir)
        .sort_by_file_name()
        .into_iter()
        .filter_map(|entry| match entry {
            Ok(entry) => Some(entry),
            Err(e) => {
                warn!(error = %e, "Skipping unreadable directory entry");
                None
            }
        })
        .filter(|entry| entry.file_type().is_file())
        .map(|entry| entry.into_path())
        .filter(|path| path.extension().is_some_and(|ext| ext == "json"))
}

/// Prune every JSON file under `options.data_dir`.
///
/// Per-file failures are logged and counted; only a missing data directory
/// aborts the run.
pub fn prune_archives(options: &PruneOptions) -> Result<PruneSummary, ArchiveError> {
    if !options.data_dir.is_dir() {
        return Err(ArchiveError::MissingDataDir(options.data_dir.clone()));
    }

    let mut summary = PruneSummary::default();

    for path in json_files(&options.data_dir) {
        match process_file(&path, options) {
            Ok((outcome, backed_up)) => {
                summary.processed += 1;
                if backed_up {
                    summary.backups += 1;
                }
                match outcome {
                    FileOutcome::Deleted { .. } => summary.deleted += 1,
                    FileOutcome::Retained { .. } | FileOutcome::NoDate => summary.retained += 1,
                    FileOutcome::Filtered { before, after, .. } => {
                        summary.records_removed += before - after
                    }
                }
            }
            Err(e) => {
                error!(file = %path.display(), error = %e, "Failed to process file");
                summary.failed += 1;
            }
        }
    }

    info!(
        processed = summary.processed,
        deleted = summary.deleted,
        retained = summary.retained,
        records_removed = summary.records_removed,
        failed = summary.failed,
        backups = summary.backups,
        cutoff = %options.cutoff,
        "Pruning finished"
    );
    Ok(summary)
}

/// Up to `limit` JSON files under `dir` with the date detected in their name.
pub fn sample_files(dir: &Path, limit: usize) -> Vec<(String, Option<NaiveDate>)> {
    json_files(dir)
        .take(limit)
        .filter_map(|path| {
            let name = path.file_name()?.to_str()?.to_string();
            let date = extract_date_from_filename(&name);
            Some((name, date))
        })
        .collect()
}

/// Backup files under `backup_dir` (relative path and size), sorted by path.
pub fn list_backups(backup_dir: &Path) -> Vec<(PathBuf, u64)> {
    let mut backups: Vec<(PathBuf, u64)> = WalkDir::new(backup_dir)
        .into_iter()
        .filter_map(Result::ok)
        .filter(|entry| entry.file_type().is_file())
        .filter(|entry| entry.path().extension().is_some_and(|ext| ext == "bak"))
        .filter_map(|entry| {
            let size = entry.metadata().ok()?.len();
            let relative = entry.path().strip_prefix(backup_dir).ok()?.to_path_buf();
            Some((relative, size))
        })
        .collect();
    backups.sort();
    backups
}
