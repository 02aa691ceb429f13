//! # focal-reconcile
//!
//! The reconciliation orchestrator for focal: applies batches of new
//! signals (manual edits, extracted metadata, classification results,
//! geocode results) to a record through the focal-core engine, and
//! returns the updated record plus side-effect intents for the caller to
//! apply transactionally.

pub mod intents;
pub mod locks;
pub mod reconcile;

pub use intents::{
    CounterDelta, Intents, KeywordAttach, KeywordDetach, LabelAttach, LabelDetach,
};
pub use locks::RecordLocks;
pub use reconcile::{Outcome, Reconciler, SignalBatch};
