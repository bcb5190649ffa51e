//! Picking a single image out of an ordered list.

use thiserror::Error;

/// A single image chosen from an ordered list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Selected {
    /// The stored record
    pub image: String,
    /// Zero-based index after normalisation
    pub position: usize,
    /// Length of the list it was chosen from
    pub total: usize,
}

/// Why a requested position could not be served.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PositionError {
    /// The path segment is not a signed integer
    #[error("Invalid position parameter: '{0}' is not an integer")]
    Invalid(String),

    /// The list is empty, so no position is valid
    #[error("No images found")]
    Empty,

    /// The position lies outside `[-total, total - 1]`
    #[error(
        "Position {requested} is out of range, valid range: 0-{max} (or -1 to -{total})",
        max = .total - 1
    )]
    OutOfRange { requested: i64, total: usize },
}

/// Parse a position path segment.
pub fn parse_position(raw: &str) -> Result<i64, PositionError> {
    raw.trim()
        .parse::<i64>()
        .map_err(|_| PositionError::Invalid(raw.to_string()))
}

/// Normalise `requested` against a list of `total` items.
///
/// Negative positions count from the end (`-1` is the last item).
pub fn resolve_position(requested: i64, total: usize) -> Result<usize, PositionError> {
    if total == 0 {
        return Err(PositionError::Empty);
    }
    let len = i64::try_from(total).unwrap_or(i64::MAX);
    let effective = if requested < 0 {
        requested.checked_add(len)
    } else {
        Some(requested)
    };
    match effective {
        Some(index) if (0..len).contains(&index) => Ok(index as usize),
        _ => Err(PositionError::OutOfRange { requested, total }),
    }
}

/// Select the image at `requested` from `images`.
pub fn select_position(images: &[String], requested: i64) -> Result<Selected, PositionError> {
    let position = resolve_position(requested, images.len())?;
    Ok(Selected {
        image: images[position].clone(),
        position,
        total: images.len(),
    })
}

/// Select the last image of the ordered list.
///
/// "Latest" means last after ordering; no timestamp is consulted.
pub fn select_latest(images: &[String]) -> Option<Selected> {
    images.last().map(|image| Selected {
        image: image.clone(),
        position: images.len() - 1,
        total: images.len(),
    })
}
