//! # focal-core
//!
//! Core types, merge rules, and reconciliation primitives for focal.
//!
//! This crate holds the pure part of the engine: the record model, the
//! source priority table, per-field merge setters, capture-time
//! normalization, title synthesis, and the collaborator traits the
//! orchestrator crate builds on.

pub mod error;
pub mod logging;
pub mod merge;
pub mod models;
pub mod source;
pub mod temporal;
pub mod text;
pub mod title;
pub mod traits;

// Re-export commonly used types at crate root
pub use error::{Error, Result};
pub use models::*;
pub use source::Provenance;
pub use temporal::{local_in_zone, utc_from_local, YEAR_MAX, YEAR_MIN};
pub use traits::*;
