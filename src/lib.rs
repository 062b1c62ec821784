//! # Lessonbank
//!
//! Embedded storage core for AI-assisted teaching material services.
//!
//! Lessonbank holds the entire application state of a teaching-materials
//! service in a single in-memory `SQLite` instance, snapshots it to one file
//! on disk, and brings historical snapshot files up to the current schema
//! shape with a purely additive migration runner.
//!
//! ## Features
//!
//! - Single-file snapshot persistence (standard `SQLite` file format)
//! - Statement-oriented query interface with positional parameters
//! - Closed error taxonomy at the adapter boundary
//! - Scoped transactions with rollback on error
//! - Additive-only schema migrations keyed on schema metadata
//! - Background checkpointing and snapshot-on-shutdown
//!
//! ## Example
//!
//! ```rust,ignore
//! use lessonbank::{Store, StoreOptions, Value};
//!
//! let store = Store::open(&StoreOptions {
//!     db_path: "data/lessonbank.db".into(),
//!     bootstrap_ddl: "sql/bootstrap.sql".into(),
//! })?;
//! let outcome = store.execute(
//!     "INSERT INTO users (phone) VALUES (?1)",
//!     &[Value::from("13800000000")],
//! )?;
//! store.persist()?;
//! ```

#![deny(clippy::all)]
#![warn(clippy::pedantic)]
#![warn(clippy::nursery)]
#![warn(missing_docs)]
#![forbid(unsafe_code)]
// multiple_crate_versions is inherently crate-level (detects duplicate transitive dependencies).
#![allow(clippy::multiple_crate_versions)]

use thiserror::Error as ThisError;

// Module declarations
pub mod cli;
pub mod config;
pub mod observability;
pub mod storage;

// Re-exports for convenience
pub use config::LessonbankConfig;
pub use storage::{
    Checkpointer, ExecuteOutcome, MigrationReport, MigrationRunner, Row, SchemaChange, Store,
    StoreOptions, Value,
};

/// Error type for lessonbank operations.
///
/// Uses `thiserror` for automatic `Display` and `Error` trait implementations.
/// Engine errors are classified into this closed set at the adapter boundary
/// so callers can pattern-match instead of parsing message strings.
///
/// # Error Variant Triggers
///
/// | Variant | Raised When |
/// |---------|-------------|
/// | `Init` | Bootstrap DDL missing/invalid, unreadable snapshot file, logging init fails |
/// | `ConstraintViolation` | UNIQUE/NOT NULL/CHECK/foreign-key violations |
/// | `NotFound` | A query that must yield a row yields none |
/// | `IoFailure` | Disk full, permission denied, snapshot rename fails |
/// | `Schema` | Malformed SQL, unknown table/column, type mismatch, bad parameter count |
#[derive(Debug, ThisError)]
pub enum Error {
    /// Initialization failed.
    ///
    /// Raised when:
    /// - The bootstrap DDL script is missing or invalid on first creation
    /// - An existing snapshot file cannot be read or is not a database
    /// - Process-level setup (logging, signal handlers) fails
    ///
    /// Fatal: callers must not proceed serving requests after this.
    #[error("initialization failed: {cause}")]
    Init {
        /// The underlying cause.
        cause: String,
    },

    /// A statement violated a relational constraint.
    ///
    /// Raised when:
    /// - A UNIQUE or PRIMARY KEY constraint rejects an insert
    /// - A NOT NULL column receives NULL
    /// - A CHECK or foreign-key constraint fails
    #[error("constraint violation in '{operation}': {cause}")]
    ConstraintViolation {
        /// The operation that failed.
        operation: String,
        /// The engine's constraint message.
        cause: String,
    },

    /// A required row or object does not exist.
    #[error("not found: {0}")]
    NotFound(String),

    /// A filesystem or disk operation failed.
    ///
    /// Raised when:
    /// - The snapshot file cannot be written (disk full, permissions)
    /// - The atomic rename of a finished snapshot fails
    ///
    /// Persistence failures are not retried; the write path surfaces them.
    #[error("i/o failure in '{operation}': {cause}")]
    IoFailure {
        /// The operation that failed.
        operation: String,
        /// The underlying cause.
        cause: String,
    },

    /// A statement was rejected at the schema level.
    ///
    /// Raised when:
    /// - SQL fails to parse
    /// - A referenced table or column does not exist
    /// - A bound value's type does not match the column
    /// - The positional parameter count is wrong
    #[error("schema error in '{operation}': {cause}")]
    Schema {
        /// The operation that failed.
        operation: String,
        /// The engine's diagnostic.
        cause: String,
    },
}

impl Error {
    /// Classifies an engine error into the adapter's closed taxonomy.
    ///
    /// Constraint violations, I/O-class failures and missing rows get their
    /// own kinds; everything else the engine rejects is a schema error.
    pub(crate) fn from_sqlite(operation: impl Into<String>, e: rusqlite::Error) -> Self {
        use rusqlite::ErrorCode;

        let operation = operation.into();
        if matches!(e, rusqlite::Error::QueryReturnedNoRows) {
            return Self::NotFound(operation);
        }

        match e.sqlite_error_code() {
            Some(ErrorCode::ConstraintViolation) => Self::ConstraintViolation {
                operation,
                cause: e.to_string(),
            },
            Some(
                ErrorCode::DiskFull
                | ErrorCode::CannotOpen
                | ErrorCode::SystemIoFailure
                | ErrorCode::ReadOnly
                | ErrorCode::PermissionDenied
                | ErrorCode::DatabaseCorrupt
                | ErrorCode::NotADatabase,
            ) => Self::IoFailure {
                operation,
                cause: e.to_string(),
            },
            _ => Self::Schema {
                operation,
                cause: e.to_string(),
            },
        }
    }
}

/// Result type alias for lessonbank operations.
pub type Result<T> = std::result::Result<T, Error>;
