//! Additive schema migrations.
//!
//! Brings an existing snapshot up to the current expected schema shape
//! without destroying data. Runs once at startup, after the store has loaded
//! a handle.
//!
//! Every step is an existence check against schema metadata followed by an
//! additive statement: missing tables are created with their full DDL,
//! missing columns are added with a default. Nothing is ever dropped,
//! retyped or renamed; superseded fields accumulate as live columns, a
//! deliberate tradeoff favoring backward compatibility over schema
//! cleanliness.
//!
//! # Usage
//!
//! ```rust,ignore
//! use lessonbank::storage::{MigrationRunner, SchemaChange};
//!
//! const CHANGES: &[SchemaChange] = &[
//!     SchemaChange::AddColumn {
//!         table: "users",
//!         column: "role",
//!         definition: "TEXT NOT NULL DEFAULT 'user'",
//!     },
//! ];
//!
//! let report = MigrationRunner::new(&store).run(CHANGES);
//! ```

use super::sqlite::{Value, record_operation_metrics};
use super::store::Store;
use crate::Error;
use std::time::Instant;

/// A single additive schema change, applied only if not already present.
#[derive(Debug, Clone, Copy)]
pub enum SchemaChange {
    /// Create a table with its full DDL if it does not exist.
    CreateTable {
        /// Table name, checked against schema metadata.
        table: &'static str,
        /// Complete CREATE TABLE statement.
        ddl: &'static str,
    },
    /// Add a column to an existing table if it is not present.
    ///
    /// The definition carries the type and DEFAULT clause. The engine only
    /// accepts constant defaults here, and NOT NULL requires one.
    AddColumn {
        /// Table the column belongs to.
        table: &'static str,
        /// Column name, checked against table metadata.
        column: &'static str,
        /// Type and constraints, e.g. `"INTEGER NOT NULL DEFAULT 0"`.
        definition: &'static str,
    },
}

impl SchemaChange {
    /// Human-readable step description for logs.
    #[must_use]
    pub fn describe(&self) -> String {
        match self {
            Self::CreateTable { table, .. } => format!("create table {table}"),
            Self::AddColumn { table, column, .. } => format!("add column {table}.{column}"),
        }
    }
}

/// Outcome counts for one migration run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MigrationReport {
    /// Steps that issued a mutating statement.
    pub applied: usize,
    /// Steps whose target already existed.
    pub skipped: usize,
    /// Steps that errored and were skipped (logged, never aborting).
    pub failed: usize,
}

impl MigrationReport {
    /// Returns a one-line summary for CLI output.
    #[must_use]
    pub fn summary(&self) -> String {
        format!(
            "{} applied, {} already present, {} failed",
            self.applied, self.skipped, self.failed
        )
    }
}

/// What happened to a single step.
enum StepOutcome {
    Applied,
    AlreadyPresent,
}

/// Runs additive schema changes against a store.
pub struct MigrationRunner<'a> {
    store: &'a Store,
}

impl<'a> MigrationRunner<'a> {
    /// Creates a new migration runner.
    #[must_use]
    pub const fn new(store: &'a Store) -> Self {
        Self { store }
    }

    /// Applies every change that is not already present.
    ///
    /// Table-creation steps run before column-addition steps, since a column
    /// check against a nonexistent table has nothing to inspect. Column
    /// steps within a table are pairwise independent.
    ///
    /// A failing step is logged and skipped; the run never aborts. Running
    /// the same change set twice issues no mutating statement the second
    /// time.
    pub fn run(&self, changes: &[SchemaChange]) -> MigrationReport {
        let start = Instant::now();
        let mut report = MigrationReport::default();

        let creates = changes
            .iter()
            .filter(|c| matches!(c, SchemaChange::CreateTable { .. }));
        let columns = changes
            .iter()
            .filter(|c| matches!(c, SchemaChange::AddColumn { .. }));

        for change in creates.chain(columns) {
            match self.apply(change) {
                Ok(StepOutcome::Applied) => {
                    report.applied += 1;
                    tracing::info!(step = %change.describe(), "applied schema change");
                },
                Ok(StepOutcome::AlreadyPresent) => report.skipped += 1,
                Err(e) => {
                    report.failed += 1;
                    tracing::warn!(step = %change.describe(), error = %e, "schema change skipped");
                },
            }
        }

        record_operation_metrics("migrations", "run", start, "success");
        tracing::info!(
            applied = report.applied,
            already_present = report.skipped,
            failed = report.failed,
            "migration run finished"
        );
        report
    }

    fn apply(&self, change: &SchemaChange) -> crate::Result<StepOutcome> {
        match change {
            SchemaChange::CreateTable { table, ddl } => {
                if self.table_exists(table)? {
                    return Ok(StepOutcome::AlreadyPresent);
                }
                self.store.execute(ddl, &[])?;
                Ok(StepOutcome::Applied)
            },
            SchemaChange::AddColumn {
                table,
                column,
                definition,
            } => {
                if !self.table_exists(table)? {
                    return Err(Error::Schema {
                        operation: "add_column".to_string(),
                        cause: format!("table '{table}' does not exist"),
                    });
                }
                if self.column_exists(table, column)? {
                    return Ok(StepOutcome::AlreadyPresent);
                }

                // Identifiers cannot be bound as parameters; names come from
                // the compiled-in change set, never from callers.
                let sql = format!("ALTER TABLE {table} ADD COLUMN {column} {definition}");
                match self.store.execute(&sql, &[]) {
                    Ok(_) => Ok(StepOutcome::Applied),
                    // A concurrent earlier run may have added it between the
                    // check and the statement; same end state either way
                    Err(Error::Schema { cause, .. }) if cause.contains("duplicate column") => {
                        Ok(StepOutcome::AlreadyPresent)
                    },
                    Err(e) => Err(e),
                }
            },
        }
    }

    fn table_exists(&self, table: &str) -> crate::Result<bool> {
        let row = self.store.query_one(
            "SELECT COUNT(*) AS n FROM sqlite_master WHERE type = 'table' AND name = ?1",
            &[Value::from(table)],
        )?;
        Ok(row.integer("n").unwrap_or(0) > 0)
    }

    fn column_exists(&self, table: &str, column: &str) -> crate::Result<bool> {
        let row = self.store.query_one(
            "SELECT COUNT(*) AS n FROM pragma_table_info(?1) WHERE name = ?2",
            &[Value::from(table), Value::from(column)],
        )?;
        Ok(row.integer("n").unwrap_or(0) > 0)
    }
}
