//! Structured logging schema and field name constants for focal.
//!
//! All crates use these constants for consistent structured logging fields,
//! so log aggregation tools can query by standardized field names across
//! every subsystem.
//!
//! ## Log Level Contract
//!
//! | Level | Usage |
//! |-------|-------|
//! | ERROR | Collaborator failure that leaves a derived artifact stale |
//! | WARN  | Recoverable issue, pass continues with best-effort fields |
//! | INFO  | Lifecycle events (archive, purge, approval) |
//! | DEBUG | Merge decisions, rejected candidates, title changes |
//! | TRACE | Per-keyword / per-label iteration |

// ─── Identity fields ───────────────────────────────────────────────────────

/// Record UUID being reconciled.
pub const RECORD_ID: &str = "record_id";

/// Component within the engine.
/// Values: "merge", "temporal", "title", "reconcile"
pub const COMPONENT: &str = "component";

/// Logical operation name.
/// Examples: "set_taken_at", "update_title", "apply_form"
pub const OPERATION: &str = "op";

// ─── Merge fields ──────────────────────────────────────────────────────────

/// Field a merge targeted ("title", "coordinates", "taken_at", ...).
pub const FIELD: &str = "field";

/// Provenance tag of the candidate value.
pub const SOURCE: &str = "source";

/// Provenance tag currently stored on the field.
pub const CURRENT_SOURCE: &str = "current_source";

// ─── Entity fields ─────────────────────────────────────────────────────────

/// Label name being attached or evaluated.
pub const LABEL: &str = "label";

/// Keyword being indexed.
pub const KEYWORD: &str = "keyword";

/// Resolved cell identifier.
pub const CELL_ID: &str = "cell_id";

/// IANA time zone name.
pub const ZONE: &str = "zone";

// ─── Measurement fields ────────────────────────────────────────────────────

/// Recomputed quality score.
pub const QUALITY: &str = "quality";

/// Number of keyword associations kept by a re-index.
pub const KEYWORD_COUNT: &str = "keyword_count";

/// Number of label associations produced by a pass.
pub const LABEL_COUNT: &str = "label_count";

// ─── Outcome fields ────────────────────────────────────────────────────────

/// Boolean success/failure indicator.
pub const SUCCESS: &str = "success";

/// Error message when a collaborator sub-step fails.
pub const ERROR_MSG: &str = "error";
