//! Ordering policies applied to a snapshot of the image set.

use std::fmt;

use rand::seq::SliceRandom;
use serde::{Deserialize, Serialize};

/// How a snapshot of the image set is ordered before selection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortOrder {
    /// Ascending byte-wise string order
    #[default]
    Alphabetical,
    /// Descending byte-wise string order
    Reverse,
    /// Fresh uniform shuffle on every call
    Random,
    /// Whatever order the store returned; callers must not rely on it
    None,
}

impl SortOrder {
    /// Parse a `sort` query value.
    ///
    /// Missing or empty values mean [`SortOrder::Alphabetical`]; unknown values
    /// fall back to [`SortOrder::None`].
    pub fn from_query(value: Option<&str>) -> Self {
        match value.map(str::trim) {
            None | Some("") => Self::Alphabetical,
            Some(v) => match v.to_ascii_lowercase().as_str() {
                "alphabetical" => Self::Alphabetical,
                "reverse" => Self::Reverse,
                "random" => Self::Random,
                _ => Self::None,
            },
        }
    }

    /// Canonical name, as echoed back in responses.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Alphabetical => "alphabetical",
            Self::Reverse => "reverse",
            Self::Random => "random",
            Self::None => "none",
        }
    }

    /// Reorder `records` in place.
    pub fn apply(&self, records: &mut [String]) {
        match self {
            Self::Alphabetical => records.sort_unstable(),
            Self::Reverse => records.sort_unstable_by(|a, b| b.cmp(a)),
            Self::Random => records.shuffle(&mut rand::rng()),
            Self::None => {}
        }
    }
}

impl fmt::Display for SortOrder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
