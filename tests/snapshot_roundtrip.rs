//! Integration tests for snapshot round-trips.
//!
//! These exercise the full persist/reload cycle against real files: state
//! written before a snapshot is exactly the state a fresh handle loads.

// Tests use unwrap for simplicity - panics are acceptable in tests
#![allow(clippy::unwrap_used)]

use lessonbank::{Error, Store, StoreOptions, Value};
use std::sync::Arc;
use tempfile::TempDir;

const USERS_DDL: &str = "
    CREATE TABLE users (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        phone TEXT NOT NULL UNIQUE,
        balance INTEGER NOT NULL DEFAULT 0
    );
";

fn options_in(dir: &TempDir, ddl: &str) -> StoreOptions {
    let ddl_path = dir.path().join("bootstrap.sql");
    std::fs::write(&ddl_path, ddl).unwrap();
    StoreOptions {
        db_path: dir.path().join("lessonbank.db"),
        bootstrap_ddl: ddl_path,
    }
}

#[test]
fn persisted_state_survives_reload() {
    let dir = tempfile::tempdir().unwrap();
    let options = options_in(&dir, USERS_DDL);

    let store = Store::open(&options).unwrap();
    for phone in ["13800000000", "13900000001", "13700000002"] {
        store
            .execute(
                "INSERT INTO users (phone) VALUES (?1)",
                &[Value::from(phone)],
            )
            .unwrap();
    }
    store
        .execute(
            "UPDATE users SET balance = ?1 WHERE phone = ?2",
            &[Value::from(42), Value::from("13900000001")],
        )
        .unwrap();

    let before = store
        .query("SELECT id, phone, balance FROM users ORDER BY id", &[])
        .unwrap();
    store.persist().unwrap();
    store.close().unwrap();

    let reloaded = Store::open(&options).unwrap();
    let after = reloaded
        .query("SELECT id, phone, balance FROM users ORDER BY id", &[])
        .unwrap();

    assert_eq!(before, after);
    assert_eq!(after.len(), 3);
    assert_eq!(after[1].integer("balance"), Some(42));
}

#[test]
fn insert_reports_id_then_row_is_readable() {
    // Fresh users table, one insert, one lookup by generated id
    let dir = tempfile::tempdir().unwrap();
    let options = options_in(&dir, "CREATE TABLE users (id INTEGER PRIMARY KEY AUTOINCREMENT, phone TEXT);");

    let store = Store::open(&options).unwrap();
    let outcome = store
        .execute(
            "INSERT INTO users (phone) VALUES (?1)",
            &[Value::from("13800000000")],
        )
        .unwrap();
    assert_eq!(outcome.last_insert_id, 1);
    assert_eq!(outcome.rows_changed, 1);

    let rows = store
        .query("SELECT * FROM users WHERE id = ?1", &[Value::from(1)])
        .unwrap();
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0].text("phone"), Some("13800000000"));
}

#[test]
fn persist_without_mutations_yields_loadable_identical_file() {
    let dir = tempfile::tempdir().unwrap();
    let options = options_in(&dir, USERS_DDL);

    let store = Store::open(&options).unwrap();
    store
        .execute("INSERT INTO users (phone) VALUES ('1')", &[])
        .unwrap();
    store.persist().unwrap();
    store.close().unwrap();

    // Reload and snapshot again with zero pending mutations
    let store = Store::open(&options).unwrap();
    let loaded = store.query("SELECT * FROM users ORDER BY id", &[]).unwrap();
    store.persist().unwrap();
    store.close().unwrap();

    let reloaded = Store::open(&options).unwrap();
    let after = reloaded
        .query("SELECT * FROM users ORDER BY id", &[])
        .unwrap();
    assert_eq!(loaded, after);
}

#[test]
fn unpersisted_mutation_is_lost_on_reload() {
    // Documents the durability window: no write-ahead log spans snapshots
    let dir = tempfile::tempdir().unwrap();
    let options = options_in(&dir, USERS_DDL);

    let store = Store::open(&options).unwrap();
    store
        .execute("INSERT INTO users (phone) VALUES ('1')", &[])
        .unwrap();
    // Dropped without persist/close: the insert never reaches the file
    drop(store);

    let reloaded = Store::open(&options).unwrap();
    let rows = reloaded.query("SELECT * FROM users", &[]).unwrap();
    assert!(rows.is_empty());
}

#[test]
fn interleaved_write_is_silently_overwritten() {
    // Two callers share the handle with no isolation: caller A reads, caller
    // B updates the same row, A writes a value computed from its stale read.
    // A's write wins; B's update is silently lost. Documents the model, does
    // not prevent it.
    let dir = tempfile::tempdir().unwrap();
    let options = options_in(&dir, USERS_DDL);

    let store = Arc::new(Store::open(&options).unwrap());
    store
        .execute("INSERT INTO users (phone, balance) VALUES ('1', 10)", &[])
        .unwrap();

    let caller_a = Arc::clone(&store);
    let caller_b = Arc::clone(&store);

    // A: read-then-write sequence
    let seen_by_a = caller_a
        .query_one("SELECT balance FROM users WHERE id = 1", &[])
        .unwrap()
        .integer("balance")
        .unwrap();

    // B: interleaves between A's read and A's write
    caller_b
        .execute("UPDATE users SET balance = 99 WHERE id = 1", &[])
        .unwrap();

    caller_a
        .execute(
            "UPDATE users SET balance = ?1 WHERE id = 1",
            &[Value::from(seen_by_a + 1)],
        )
        .unwrap();

    let final_balance = store
        .query_one("SELECT balance FROM users WHERE id = 1", &[])
        .unwrap()
        .integer("balance");
    assert_eq!(final_balance, Some(11), "B's interleaved update was lost");
}

#[test]
fn missing_bootstrap_ddl_is_fatal_init_error() {
    let dir = tempfile::tempdir().unwrap();
    let options = StoreOptions {
        db_path: dir.path().join("lessonbank.db"),
        bootstrap_ddl: dir.path().join("does-not-exist.sql"),
    };

    let err = Store::open(&options).unwrap_err();
    assert!(matches!(err, Error::Init { .. }));
    assert!(!options.db_path.exists(), "no snapshot is left behind");
}

#[test]
fn corrupt_snapshot_is_fatal_init_error() {
    let dir = tempfile::tempdir().unwrap();
    let options = options_in(&dir, USERS_DDL);
    std::fs::write(&options.db_path, b"this is not a database").unwrap();

    let err = Store::open(&options).unwrap_err();
    assert!(matches!(err, Error::Init { .. }));
}

#[test]
fn snapshot_file_is_standard_sqlite_format() {
    let dir = tempfile::tempdir().unwrap();
    let options = options_in(&dir, USERS_DDL);

    let store = Store::open(&options).unwrap();
    store.close().unwrap();

    let bytes = std::fs::read(&options.db_path).unwrap();
    assert_eq!(&bytes[..16], b"SQLite format 3\0");
}
