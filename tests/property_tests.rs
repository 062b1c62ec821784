//! Property-based tests for the statement interface.
//!
//! Uses proptest to verify invariants across random inputs:
//! - Text values round-trip through insert and query unchanged
//! - Integer values round-trip across the full i64 range
//! - Blob values round-trip byte-exact
//! - NULL stays NULL

// Property tests use expect/unwrap for simplicity - panics are acceptable in tests
#![allow(clippy::expect_used, clippy::unwrap_used, clippy::cast_possible_wrap)]

use lessonbank::{Store, Value};
use proptest::prelude::*;

const DDL: &str = "CREATE TABLE kv (id INTEGER PRIMARY KEY AUTOINCREMENT, v);";

fn store() -> Store {
    Store::in_memory(DDL).unwrap()
}

proptest! {
    /// Property: arbitrary text survives bind/step unchanged, including
    /// quotes, newlines and SQL metacharacters.
    #[test]
    fn prop_text_round_trips(s in "\\PC{0,200}") {
        let store = store();
        store
            .execute("INSERT INTO kv (v) VALUES (?1)", &[Value::from(s.clone())])
            .unwrap();

        let row = store.query_one("SELECT v FROM kv WHERE id = 1", &[]).unwrap();
        prop_assert_eq!(row.text("v"), Some(s.as_str()));
    }

    /// Property: the full i64 range round-trips.
    #[test]
    fn prop_integer_round_trips(n in any::<i64>()) {
        let store = store();
        store
            .execute("INSERT INTO kv (v) VALUES (?1)", &[Value::from(n)])
            .unwrap();

        let row = store.query_one("SELECT v FROM kv WHERE id = 1", &[]).unwrap();
        prop_assert_eq!(row.integer("v"), Some(n));
    }

    /// Property: blobs round-trip byte-exact.
    #[test]
    fn prop_blob_round_trips(bytes in proptest::collection::vec(any::<u8>(), 0..256)) {
        let store = store();
        store
            .execute("INSERT INTO kv (v) VALUES (?1)", &[Value::from(bytes.clone())])
            .unwrap();

        let row = store.query_one("SELECT v FROM kv WHERE id = 1", &[]).unwrap();
        prop_assert_eq!(row.get("v"), Some(&Value::Blob(bytes)));
    }

    /// Property: a bound NULL reads back as NULL regardless of surrounding rows.
    #[test]
    fn prop_null_stays_null(before in 0usize..4) {
        let store = store();
        for i in 0..before {
            store
                .execute("INSERT INTO kv (v) VALUES (?1)", &[Value::from(i as i64)])
                .unwrap();
        }
        let outcome = store
            .execute("INSERT INTO kv (v) VALUES (?1)", &[Value::Null])
            .unwrap();

        let row = store
            .query_one(
                "SELECT v FROM kv WHERE id = ?1",
                &[Value::from(outcome.last_insert_id)],
            )
            .unwrap();
        prop_assert!(row.get("v").unwrap().is_null());
    }
}
