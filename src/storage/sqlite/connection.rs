//! Shared connection handling for the embedded engine.
//!
//! Provides utilities for managing the single `SQLite` connection with proper
//! mutex handling, poison recovery, and session configuration.

use crate::Result;
use rusqlite::Connection;
use std::sync::{Mutex, MutexGuard};

/// Helper to acquire the connection lock with poison recovery.
///
/// If the mutex is poisoned (due to a panic in a previous critical section),
/// we recover the inner value and log a warning. This prevents cascading
/// failures when one operation panics.
///
/// # Examples
///
/// ```ignore
/// use std::sync::Mutex;
/// use lessonbank::storage::sqlite::acquire_lock;
///
/// let mutex = Mutex::new(connection);
/// let guard = acquire_lock(&mutex);
/// // Use guard...
/// ```
pub fn acquire_lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    match mutex.lock() {
        Ok(guard) => guard,
        Err(poisoned) => {
            // Recover from poison - the connection state is still valid,
            // only the guard-holding thread panicked
            tracing::warn!("store mutex was poisoned, recovering");
            metrics::counter!("store_mutex_poison_recovery_total").increment(1);
            poisoned.into_inner()
        },
    }
}

/// Configures the in-memory engine session.
///
/// # Configuration Applied
///
/// - **`foreign_keys`**: Enforce referential integrity (off by default in `SQLite`)
/// - **`busy_timeout`**: Waits up to 5 seconds for internal locks instead of
///   failing immediately
///
/// WAL mode is deliberately not configured: the live database is an in-memory
/// instance (journal mode `memory`), and durability comes from whole-file
/// snapshots, not from the engine's own journal.
///
/// # Errors
///
/// Returns an error if pragma configuration fails.
pub fn configure_connection(conn: &Connection) -> Result<()> {
    let _ = conn.pragma_update(None, "foreign_keys", "ON");
    // Prevents SQLITE_BUSY surfacing from internal lock contention
    let _ = conn.pragma_update(None, "busy_timeout", "5000");

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::thread;

    #[test]
    fn test_acquire_lock_success() {
        let mutex = Mutex::new(42);
        let guard = acquire_lock(&mutex);
        assert_eq!(*guard, 42);
    }

    #[test]
    fn test_acquire_lock_concurrent() {
        let mutex = Arc::new(Mutex::new(0));
        let mut handles = vec![];

        for _ in 0..10 {
            let mutex_clone = Arc::clone(&mutex);
            let handle = thread::spawn(move || {
                let mut guard = acquire_lock(&mutex_clone);
                *guard += 1;
            });
            handles.push(handle);
        }

        for handle in handles {
            handle.join().unwrap();
        }

        let guard = acquire_lock(&mutex);
        assert_eq!(*guard, 10);
    }

    #[test]
    fn test_configure_connection() {
        let conn = Connection::open_in_memory().unwrap();
        let result = configure_connection(&conn);
        assert!(result.is_ok());

        let foreign_keys: i32 = conn
            .pragma_query_value(None, "foreign_keys", |row| row.get(0))
            .unwrap();
        assert_eq!(foreign_keys, 1, "Expected foreign_keys to be enabled");

        let busy_timeout: i32 = conn
            .pragma_query_value(None, "busy_timeout", |row| row.get(0))
            .unwrap();
        assert_eq!(busy_timeout, 5000);
    }
}
