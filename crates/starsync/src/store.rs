//! Sync target abstraction.
//!
//! The engine reads the existing records through [`RecordIndex`] and applies
//! its write plan through [`RecordWriter`]. [`DbStore`] implements both on top
//! of the SeaORM schema.

mod db_store;
mod errors;
mod types;

pub use db_store::DbStore;
pub use errors::{IndexError, WriteError};
pub use types::{RecordIndex, RecordWriter};
