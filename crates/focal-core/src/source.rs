//! Provenance tags and the source priority table.
//!
//! Every mergeable field on a [`Record`](crate::models::Record) remembers
//! which source produced its current value. Conflicts between sources are
//! resolved by a fixed total order: a candidate from a lower-priority
//! source never replaces a value owned by a higher-priority one, and ties
//! keep the existing value.

use serde::{Deserialize, Serialize};

/// Provenance of a field value, ordered lowest to highest trust.
///
/// The derived `Ord` follows declaration order and is the single source
/// of truth for merge decisions; [`Provenance::priority`] exposes the same
/// ranking as a number for logging and diagnostics.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(rename_all = "lowercase")]
pub enum Provenance {
    /// Filler value guessed at indexing time (lowest trust).
    #[default]
    Estimated,
    /// Derived from the file name or path.
    Name,
    /// Embedded file metadata (Exif and friends).
    Meta,
    /// Automatic image classification.
    Auto,
    /// Manual user edit (highest trust).
    Manual,
}

impl Provenance {
    /// Numeric priority backing the total order.
    pub const fn priority(self) -> u8 {
        match self {
            Provenance::Estimated => 1,
            Provenance::Name => 2,
            Provenance::Meta => 4,
            Provenance::Auto => 8,
            Provenance::Manual => 16,
        }
    }

    /// Short wire tag for the source.
    pub const fn as_str(self) -> &'static str {
        match self {
            Provenance::Estimated => "estimate",
            Provenance::Name => "name",
            Provenance::Meta => "meta",
            Provenance::Auto => "auto",
            Provenance::Manual => "manual",
        }
    }
}

impl std::fmt::Display for Provenance {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for Provenance {
    type Err = crate::error::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "estimate" => Ok(Provenance::Estimated),
            "name" => Ok(Provenance::Name),
            "meta" => Ok(Provenance::Meta),
            "auto" => Ok(Provenance::Auto),
            "manual" => Ok(Provenance::Manual),
            other => Err(crate::error::Error::InvalidInput(format!(
                "unknown provenance tag: {}",
                other
            ))),
        }
    }
}
