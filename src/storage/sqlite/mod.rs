//! Shared `SQLite` infrastructure for the storage core.
//!
//! ## Module Structure
//!
//! - [`connection`]: Connection handling ([`Mutex<Connection>`](rusqlite::Connection), lock acquisition, session pragmas)
//! - [`value`]: Dynamically typed parameter/result values
//! - [`row`]: Column-keyed result records
//! - [`statement`]: Prepare/bind/step logic shared by the store and its transaction scope
//! - [`metrics`]: Shared metrics recording helpers
//!
//! ## Design Principles
//!
//! - **DRY**: Single source of truth for statement execution; the store and
//!   the transaction scope go through the same functions
//! - **Single handle**: One connection, one mutex, no pooling
//! - **Graceful Degradation**: Metrics are facade-only; a missing recorder is a no-op

mod connection;
mod metrics;
mod row;
mod statement;
mod value;

pub use connection::{acquire_lock, configure_connection};
pub use metrics::record_operation_metrics;
pub use row::Row;
pub use statement::ExecuteOutcome;
pub(crate) use statement::{read_rows, run_statement};
pub use value::Value;
