//! Collaborator traits for the reconciliation engine.
//!
//! The engine itself is pure and synchronous; everything that may block
//! or fail (storage, label and keyword lookup, location resolution) is
//! behind these traits, enabling pluggable backends and testability.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::Result;
use crate::models::{Cell, Place, Record};

// =============================================================================
// RECORD REPOSITORY
// =============================================================================

/// Repository for record persistence.
#[async_trait]
pub trait RecordRepository: Send + Sync {
    /// Fetch a record by id.
    async fn find(&self, id: Uuid) -> Result<Record>;

    /// Persist a record. The record must carry an id.
    async fn save(&self, record: &Record) -> Result<()>;

    /// Permanently delete a record.
    async fn delete(&self, id: Uuid) -> Result<()>;
}

// =============================================================================
// LABEL / KEYWORD REPOSITORIES
// =============================================================================

/// A stored label, addressable for associations.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LabelEntity {
    pub id: Uuid,
    pub name: String,
    pub priority: i32,
    /// Deleted labels are skipped when attaching.
    pub deleted: bool,
}

/// A stored keyword, addressable for associations.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct KeywordEntity {
    pub id: Uuid,
    pub word: String,
    /// Stopword-like keywords flagged by the store are not indexed.
    pub skip: bool,
}

/// Repository for label lookup and creation, idempotent by normalized name.
#[async_trait]
pub trait LabelRepository: Send + Sync {
    /// Look up an existing label by name.
    async fn find(&self, name: &str) -> Result<Option<LabelEntity>>;

    /// Fetch or create a label by name.
    async fn find_or_create(&self, name: &str, priority: i32) -> Result<LabelEntity>;
}

/// Repository for keyword lookup and creation, idempotent by normalized word.
#[async_trait]
pub trait KeywordRepository: Send + Sync {
    /// Fetch or create a keyword.
    async fn find_or_create(&self, word: &str) -> Result<KeywordEntity>;
}

// =============================================================================
// LOCATION RESOLVER
// =============================================================================

/// Resolver for geodata lookups.
///
/// `Ok(None)` means the identifier maps to the unknown singleton.
#[async_trait]
pub trait LocationResolver: Send + Sync {
    /// Resolve a fine-grained location by cell id.
    async fn resolve_cell(&self, cell_id: &str) -> Result<Option<Cell>>;

    /// Resolve a coarse place by place id.
    async fn resolve_place(&self, place_id: &str) -> Result<Option<Place>>;
}

// =============================================================================
// QUALITY SCORER
// =============================================================================

/// Pure function of the resolved record to an integer quality score.
///
/// Invoked by the orchestrator whenever a field feeding the score changes;
/// field setters never touch the score themselves.
pub trait QualityScorer: Send + Sync {
    fn score(&self, record: &Record) -> i32;
}

/// Fixed-score scorer for tests and callers without a scoring model.
pub struct FixedQualityScorer(pub i32);

impl QualityScorer for FixedQualityScorer {
    fn score(&self, _record: &Record) -> i32 {
        self.0
    }
}
