//! Side-effect intents produced by a reconciliation pass.
//!
//! The orchestrator never talks to storage for derived associations or
//! counters; it returns these intents for the caller to apply
//! transactionally, batch, retry, or assert on in tests.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use focal_core::models::LabelSource;

/// Upsert a record↔label association.
///
/// Appliers keep the lower uncertainty when the association already
/// exists, and update the source alongside it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LabelAttach {
    pub label_id: Uuid,
    pub name: String,
    pub uncertainty: i32,
    pub source: LabelSource,
}

/// Remove stale label associations of one source: every association with
/// `source` whose label id is not in `keep` is detached.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LabelDetach {
    pub source: LabelSource,
    pub keep: Vec<Uuid>,
}

/// Upsert a record↔keyword association.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct KeywordAttach {
    pub keyword_id: Uuid,
    pub word: String,
}

/// Remove keyword associations not in `keep`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct KeywordDetach {
    pub keep: Vec<Uuid>,
}

/// Fire-and-forget counter adjustments.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "counter", content = "delta", rename_all = "lowercase")]
pub enum CounterDelta {
    /// Favorites count changed.
    Favorites(i64),
    /// Pending-review count changed.
    Review(i64),
}

/// All side effects of one reconciliation pass.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Intents {
    pub attach_labels: Vec<LabelAttach>,
    pub detach_labels: Option<LabelDetach>,
    pub attach_keywords: Vec<KeywordAttach>,
    pub detach_keywords: Option<KeywordDetach>,
    pub counters: Vec<CounterDelta>,
    /// Mark album memberships hidden (archiving detaches without removal).
    pub hide_albums: bool,
    /// Remove every derived association irreversibly (purge).
    pub purge_associations: bool,
}

impl Intents {
    /// True when the pass produced no side effects to apply.
    pub fn is_empty(&self) -> bool {
        self.attach_labels.is_empty()
            && self.detach_labels.is_none()
            && self.attach_keywords.is_empty()
            && self.detach_keywords.is_none()
            && self.counters.is_empty()
            && !self.hide_albums
            && !self.purge_associations
    }
}
