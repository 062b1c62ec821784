//! The persistence adapter: an in-memory engine behind a snapshot file.
//!
//! [`Store`] owns the single live engine instance for the process. All state
//! lives in an in-memory `SQLite` database; durability comes from serializing
//! the whole database to one on-disk file (a standard `SQLite` database file)
//! on explicit [`Store::persist`] calls, on a checkpoint interval, and on
//! termination signals.
//!
//! # Concurrency Model
//!
//! One engine instance per process, protected by a `Mutex` with poison
//! recovery. Operations are synchronous and serialized; there is no isolation
//! between logically concurrent callers outside [`Store::with_transaction`].
//! A caller that reads then writes can have another caller's write interleave
//! between the two; last write wins.
//!
//! # Durability Model
//!
//! There is no write-ahead log spanning snapshots. A crash between a mutating
//! statement and the next `persist()` loses that mutation. Every snapshot
//! rewrites the entire file; cost scales with total database size.

use super::sqlite::{
    ExecuteOutcome, Row, Value, acquire_lock, configure_connection, read_rows,
    record_operation_metrics, run_statement,
};
use crate::{Error, Result};
use rusqlite::backup::Backup;
use rusqlite::{Connection, OpenFlags};
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use std::time::{Duration, Instant};
use tracing::instrument;

/// How the store finds its snapshot file and bootstrap DDL.
#[derive(Debug, Clone)]
pub struct StoreOptions {
    /// Path of the on-disk snapshot file.
    pub db_path: PathBuf,
    /// Path of the bootstrap DDL script, executed verbatim against a fresh
    /// empty database when no snapshot file exists yet.
    pub bootstrap_ddl: PathBuf,
}

/// The single shared database handle of the process.
///
/// Constructed once at startup with [`Store::open`] and passed by reference
/// (or `Arc`) to every component needing database access. Tests swap in
/// [`Store::in_memory`] instances.
#[derive(Debug)]
pub struct Store {
    /// The live in-memory engine instance.
    ///
    /// Protected by Mutex because `rusqlite::Connection` is not `Sync`.
    conn: Mutex<Connection>,
    /// Snapshot target (None for in-memory test stores).
    snapshot_path: Option<PathBuf>,
}

impl Store {
    /// Opens the store, loading the snapshot file or bootstrapping a new one.
    ///
    /// If `options.db_path` exists, its contents are restored into a fresh
    /// in-memory engine instance. Otherwise an empty instance is created, the
    /// bootstrap DDL script at `options.bootstrap_ddl` is executed verbatim,
    /// and an initial snapshot is written so the file exists from first run.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Init`] if the snapshot file cannot be read, or if the
    /// DDL script is missing or invalid on first creation. Both are fatal:
    /// callers must not proceed serving requests.
    pub fn open(options: &StoreOptions) -> Result<Self> {
        let mut conn = Connection::open_in_memory().map_err(|e| Error::Init {
            cause: format!("failed to create engine instance: {e}"),
        })?;
        configure_connection(&conn)?;

        if options.db_path.exists() {
            Self::restore_into(&mut conn, &options.db_path)?;
            tracing::info!(path = %options.db_path.display(), "loaded snapshot");

            Ok(Self {
                conn: Mutex::new(conn),
                snapshot_path: Some(options.db_path.clone()),
            })
        } else {
            let ddl =
                std::fs::read_to_string(&options.bootstrap_ddl).map_err(|e| Error::Init {
                    cause: format!(
                        "bootstrap DDL '{}' unreadable: {e}",
                        options.bootstrap_ddl.display()
                    ),
                })?;
            conn.execute_batch(&ddl).map_err(|e| Error::Init {
                cause: format!(
                    "bootstrap DDL '{}' invalid: {e}",
                    options.bootstrap_ddl.display()
                ),
            })?;
            tracing::info!(
                path = %options.db_path.display(),
                ddl = %options.bootstrap_ddl.display(),
                "bootstrapped new database"
            );

            let store = Self {
                conn: Mutex::new(conn),
                snapshot_path: Some(options.db_path.clone()),
            };
            // Write the initial snapshot so the file exists from first run
            store.persist()?;
            Ok(store)
        }
    }

    /// Creates a store with no snapshot target, bootstrapped from `ddl`.
    ///
    /// Useful for tests and embedders that manage durability themselves.
    /// [`Store::persist`] on such a store is a no-op.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Init`] if the DDL is invalid.
    pub fn in_memory(ddl: &str) -> Result<Self> {
        let conn = Connection::open_in_memory().map_err(|e| Error::Init {
            cause: format!("failed to create engine instance: {e}"),
        })?;
        configure_connection(&conn)?;
        conn.execute_batch(ddl).map_err(|e| Error::Init {
            cause: format!("bootstrap DDL invalid: {e}"),
        })?;

        Ok(Self {
            conn: Mutex::new(conn),
            snapshot_path: None,
        })
    }

    /// Returns the snapshot path (None for in-memory stores).
    #[must_use]
    pub fn snapshot_path(&self) -> Option<&Path> {
        self.snapshot_path.as_deref()
    }

    /// Runs a read statement and returns all result rows, column-keyed.
    ///
    /// Positional parameters bind to `?1`, `?2`, ... in order. No result-size
    /// limit is enforced; callers page with LIMIT/OFFSET.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Schema`] for malformed SQL, unknown tables/columns or
    /// a wrong parameter count.
    #[instrument(skip(self, params), fields(component = "store", operation = "query"))]
    pub fn query(&self, sql: &str, params: &[Value]) -> Result<Vec<Row>> {
        let start = Instant::now();
        let result = {
            let conn = acquire_lock(&self.conn);
            read_rows(&conn, sql, params)
        };

        let status = if result.is_ok() { "success" } else { "error" };
        record_operation_metrics("store", "query", start, status);
        result
    }

    /// Runs a read statement that must yield at least one row.
    ///
    /// # Errors
    ///
    /// Returns [`Error::NotFound`] if the statement yields no rows, plus
    /// everything [`Store::query`] returns.
    pub fn query_one(&self, sql: &str, params: &[Value]) -> Result<Row> {
        self.query(sql, params)?
            .into_iter()
            .next()
            .ok_or_else(|| Error::NotFound(sql.to_string()))
    }

    /// Runs a mutating statement.
    ///
    /// Returns the rowid of the most recent insert and the affected-row
    /// count, both read back from the engine after the statement runs.
    ///
    /// # Errors
    ///
    /// Returns [`Error::ConstraintViolation`] when the engine rejects the row
    /// and [`Error::Schema`] for statement-level problems. Statement failures
    /// do not abort the process; the caller decides the response.
    #[instrument(skip(self, params), fields(component = "store", operation = "execute"))]
    pub fn execute(&self, sql: &str, params: &[Value]) -> Result<ExecuteOutcome> {
        let start = Instant::now();
        let result = {
            let conn = acquire_lock(&self.conn);
            run_statement(&conn, sql, params)
        };

        let status = if result.is_ok() { "success" } else { "error" };
        record_operation_metrics("store", "execute", start, status);
        result
    }

    /// Runs `f` inside a single transaction.
    ///
    /// Statements issued through the [`TxScope`] are committed together when
    /// `f` returns `Ok`, and rolled back together when it returns `Err`. Use
    /// this for logically related statement groups (create-then-log
    /// sequences) instead of bare sequential [`Store::execute`] calls.
    ///
    /// The scope holds the connection lock for the duration of `f`; do not
    /// call back into the store from inside the closure.
    ///
    /// # Errors
    ///
    /// Returns the error from `f` after rolling back, or a statement error
    /// from BEGIN/COMMIT.
    pub fn with_transaction<T, F>(&self, f: F) -> Result<T>
    where
        F: FnOnce(&TxScope<'_>) -> Result<T>,
    {
        let start = Instant::now();
        let result = (|| {
            let conn = acquire_lock(&self.conn);
            conn.execute("BEGIN IMMEDIATE", [])
                .map_err(|e| Error::from_sqlite("begin_transaction", e))?;

            let scope = TxScope { conn: &*conn };
            match f(&scope) {
                Ok(value) => {
                    conn.execute("COMMIT", [])
                        .map_err(|e| Error::from_sqlite("commit_transaction", e))?;
                    Ok(value)
                },
                Err(e) => {
                    let _ = conn.execute("ROLLBACK", []);
                    Err(e)
                },
            }
        })();

        let status = if result.is_ok() { "success" } else { "error" };
        record_operation_metrics("store", "transaction", start, status);
        result
    }

    /// Serializes the entire in-memory database to the snapshot file.
    ///
    /// The snapshot is written to a sibling temp file and atomically renamed
    /// over the target, so readers of the file never observe a half-written
    /// snapshot. This is an O(database-size) whole-file rewrite; once started
    /// it always runs to completion. On a store with no snapshot path this is
    /// a no-op.
    ///
    /// # Errors
    ///
    /// Returns [`Error::IoFailure`] if the file cannot be written or renamed.
    /// Failures are not retried and there is no fallback location.
    #[instrument(skip(self), fields(component = "store", operation = "persist"))]
    pub fn persist(&self) -> Result<()> {
        let Some(path) = &self.snapshot_path else {
            tracing::trace!("persist skipped: store has no snapshot path");
            return Ok(());
        };

        let start = Instant::now();
        let result = {
            let conn = acquire_lock(&self.conn);
            Self::write_snapshot(&conn, path)
        };

        let status = if result.is_ok() { "success" } else { "error" };
        record_operation_metrics("store", "persist", start, status);

        match &result {
            Ok(()) => {
                tracing::debug!(path = %path.display(), elapsed_ms = start.elapsed().as_millis(), "snapshot written");
            },
            Err(e) => tracing::error!(path = %path.display(), error = %e, "snapshot failed"),
        }
        result
    }

    /// Persists, then closes the engine instance.
    ///
    /// # Errors
    ///
    /// Returns the error from the final [`Store::persist`], or a close error
    /// from the engine.
    pub fn close(self) -> Result<()> {
        self.persist()?;

        let conn = self
            .conn
            .into_inner()
            .unwrap_or_else(std::sync::PoisonError::into_inner);
        conn.close()
            .map_err(|(_, e)| Error::from_sqlite("close", e))
    }

    /// Restores the snapshot file at `path` into `conn`.
    fn restore_into(conn: &mut Connection, path: &Path) -> Result<()> {
        let src = Connection::open_with_flags(path, OpenFlags::SQLITE_OPEN_READ_ONLY).map_err(
            |e| Error::Init {
                cause: format!("snapshot '{}' unreadable: {e}", path.display()),
            },
        )?;

        let backup = Backup::new(&src, conn).map_err(|e| Error::Init {
            cause: format!("snapshot '{}' restore failed: {e}", path.display()),
        })?;
        backup
            .run_to_completion(256, Duration::ZERO, None)
            .map_err(|e| Error::Init {
                cause: format!("snapshot '{}' restore failed: {e}", path.display()),
            })
    }

    /// Writes the live database to `path` through a temp file.
    fn write_snapshot(conn: &Connection, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent()
            && !parent.as_os_str().is_empty()
        {
            std::fs::create_dir_all(parent).map_err(|e| Error::IoFailure {
                operation: "persist_create_dir".to_string(),
                cause: e.to_string(),
            })?;
        }

        let tmp = snapshot_tmp_path(path);
        // Stale temp from an interrupted earlier persist
        let _ = std::fs::remove_file(&tmp);

        {
            let mut dst = Connection::open(&tmp)
                .map_err(|e| Error::from_sqlite("persist_open_snapshot", e))?;
            let backup = Backup::new(conn, &mut dst)
                .map_err(|e| Error::from_sqlite("persist_backup", e))?;
            backup
                .run_to_completion(256, Duration::ZERO, None)
                .map_err(|e| Error::from_sqlite("persist_backup", e))?;
        }

        std::fs::rename(&tmp, path).map_err(|e| Error::IoFailure {
            operation: "persist_rename".to_string(),
            cause: e.to_string(),
        })
    }
}

/// Statement surface available inside [`Store::with_transaction`].
///
/// Mirrors the store's query/execute contract against the connection already
/// held by the transaction.
pub struct TxScope<'a> {
    conn: &'a Connection,
}

impl TxScope<'_> {
    /// Runs a read statement inside the transaction.
    ///
    /// # Errors
    ///
    /// Same contract as [`Store::query`].
    pub fn query(&self, sql: &str, params: &[Value]) -> Result<Vec<Row>> {
        read_rows(self.conn, sql, params)
    }

    /// Runs a mutating statement inside the transaction.
    ///
    /// # Errors
    ///
    /// Same contract as [`Store::execute`].
    pub fn execute(&self, sql: &str, params: &[Value]) -> Result<ExecuteOutcome> {
        run_statement(self.conn, sql, params)
    }
}

/// Sibling temp-file path used while a snapshot is being written.
fn snapshot_tmp_path(path: &Path) -> PathBuf {
    let mut name = path.file_name().map_or_else(
        || std::ffi::OsString::from("snapshot"),
        std::ffi::OsStr::to_os_string,
    );
    name.push(".tmp");
    path.with_file_name(name)
}

#[cfg(test)]
mod tests {
    use super::*;

    const TEST_DDL: &str = "
        CREATE TABLE users (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            phone TEXT NOT NULL UNIQUE
        );
    ";

    fn test_store() -> Store {
        Store::in_memory(TEST_DDL).unwrap()
    }

    #[test]
    fn test_insert_reports_id_and_count() {
        let store = test_store();

        let outcome = store
            .execute(
                "INSERT INTO users (phone) VALUES (?1)",
                &[Value::from("13800000000")],
            )
            .unwrap();

        assert_eq!(outcome.last_insert_id, 1);
        assert_eq!(outcome.rows_changed, 1);
    }

    #[test]
    fn test_query_returns_column_keyed_rows() {
        let store = test_store();
        store
            .execute(
                "INSERT INTO users (phone) VALUES (?1)",
                &[Value::from("13800000000")],
            )
            .unwrap();

        let rows = store
            .query("SELECT * FROM users WHERE id = ?1", &[Value::from(1)])
            .unwrap();

        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].text("phone"), Some("13800000000"));
    }

    #[test]
    fn test_query_one_missing_row_is_not_found() {
        let store = test_store();
        let err = store
            .query_one("SELECT * FROM users WHERE id = ?1", &[Value::from(99)])
            .unwrap_err();
        assert!(matches!(err, Error::NotFound(_)));
    }

    #[test]
    fn test_unique_violation_is_classified() {
        let store = test_store();
        store
            .execute("INSERT INTO users (phone) VALUES (?1)", &[Value::from("1")])
            .unwrap();

        let err = store
            .execute("INSERT INTO users (phone) VALUES (?1)", &[Value::from("1")])
            .unwrap_err();
        assert!(matches!(err, Error::ConstraintViolation { .. }));
    }

    #[test]
    fn test_unknown_table_is_schema_error() {
        let store = test_store();
        let err = store.query("SELECT * FROM nonexistent", &[]).unwrap_err();
        assert!(matches!(err, Error::Schema { .. }));
    }

    #[test]
    fn test_invalid_bootstrap_ddl_is_init_error() {
        let err = Store::in_memory("CREATE TABEL broken (x)").unwrap_err();
        assert!(matches!(err, Error::Init { .. }));
    }

    #[test]
    fn test_persist_without_path_is_noop() {
        let store = test_store();
        store.persist().unwrap();
    }

    #[test]
    fn test_transaction_commits_on_ok() {
        let store = test_store();

        store
            .with_transaction(|tx| {
                tx.execute("INSERT INTO users (phone) VALUES (?1)", &[Value::from("1")])?;
                tx.execute("INSERT INTO users (phone) VALUES (?1)", &[Value::from("2")])?;
                Ok(())
            })
            .unwrap();

        let rows = store.query("SELECT COUNT(*) AS n FROM users", &[]).unwrap();
        assert_eq!(rows[0].integer("n"), Some(2));
    }

    #[test]
    fn test_transaction_rolls_back_on_err() {
        let store = test_store();

        let result: Result<()> = store.with_transaction(|tx| {
            tx.execute("INSERT INTO users (phone) VALUES (?1)", &[Value::from("1")])?;
            // Duplicate phone: the constraint error aborts the whole group
            tx.execute("INSERT INTO users (phone) VALUES (?1)", &[Value::from("1")])?;
            Ok(())
        });
        assert!(matches!(
            result,
            Err(Error::ConstraintViolation { .. })
        ));

        let rows = store.query("SELECT COUNT(*) AS n FROM users", &[]).unwrap();
        assert_eq!(rows[0].integer("n"), Some(0));
    }

    #[test]
    fn test_transaction_reads_see_own_writes() {
        let store = test_store();

        let phone = store
            .with_transaction(|tx| {
                tx.execute("INSERT INTO users (phone) VALUES (?1)", &[Value::from("7")])?;
                let rows = tx.query("SELECT phone FROM users WHERE id = 1", &[])?;
                Ok(rows[0].text("phone").map(ToString::to_string))
            })
            .unwrap();

        assert_eq!(phone.as_deref(), Some("7"));
    }

    #[test]
    fn test_snapshot_tmp_path_is_sibling() {
        let tmp = snapshot_tmp_path(Path::new("/data/lessonbank.db"));
        assert_eq!(tmp, PathBuf::from("/data/lessonbank.db.tmp"));
    }
}
