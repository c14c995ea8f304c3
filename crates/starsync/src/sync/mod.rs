//! Reconciliation of a starred-repository snapshot against stored records.
//!
//! # Module Structure
//!
//! - [`types`] - `SyncPolicy`, `SyncPlan`, `RunReport`, write operations and constants
//! - [`progress`] - Progress reporting: `SyncProgress`, `ProgressCallback`, `emit()`
//! - [`engine`] - The engine: `plan()`, `reconcile()`, `sync_starred()`

pub mod engine;
mod error;
mod progress;
mod types;

pub use error::SyncError;

pub use types::{
    EnrichOutcome, FailureStage, ItemFailure, RunOutcome, RunReport, SyncPlan, SyncPolicy,
    WriteKind, WriteOp,
};

pub use types::{
    DEFAULT_CONCURRENCY, DEFAULT_TARGET_LANGUAGE, INITIAL_BACKOFF_MS, MAX_BACKOFF_MS, MAX_RETRIES,
};

pub use progress::{ProgressCallback, SyncProgress, emit};

pub use engine::{WritePlan, assemble_writes, plan, reconcile, sync_starred};
