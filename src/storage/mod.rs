//! Storage layer: the persistence adapter and its supporting pieces.
//!
//! This module provides the storage core:
//! - **Store**: the single shared database handle (in-memory `SQLite`
//!   instance + snapshot file)
//! - **Migrations**: additive-only schema upgrades keyed on schema metadata
//! - **Checkpoint**: periodic and shutdown snapshot cadence
//! - **Schema**: the teaching-materials application schema

// Allow significant_drop_tightening - guards are intentionally held for the
// whole operation; the single-handle model serializes access by design.
#![allow(clippy::significant_drop_tightening)]

pub mod checkpoint;
pub mod migrations;
pub mod schema;
pub mod sqlite;
pub mod store;

pub use checkpoint::{Checkpointer, DEFAULT_CHECKPOINT_INTERVAL, persist_on_shutdown};
pub use migrations::{MigrationReport, MigrationRunner, SchemaChange};
pub use schema::expected_changes;
pub use sqlite::{ExecuteOutcome, Row, Value};
pub use store::{Store, StoreOptions, TxScope};
