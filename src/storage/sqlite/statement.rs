//! Statement execution against a live connection.
//!
//! These free functions carry the actual prepare/bind/step logic so the
//! store and its transaction scope share one implementation.

use super::row::Row;
use super::value::Value;
use crate::{Error, Result};
use rusqlite::Connection;
use serde::Serialize;
use std::sync::Arc;

/// Result of a mutating statement.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ExecuteOutcome {
    /// Rowid of the most recent successful INSERT on this connection.
    pub last_insert_id: i64,
    /// Number of rows changed by the statement.
    pub rows_changed: usize,
}

/// Prepares `sql`, binds positional `params`, and collects all result rows.
///
/// No result-size limit is enforced here; callers page with LIMIT/OFFSET.
pub(crate) fn read_rows(conn: &Connection, sql: &str, params: &[Value]) -> Result<Vec<Row>> {
    let mut stmt = conn
        .prepare(sql)
        .map_err(|e| Error::from_sqlite("query", e))?;

    let columns: Arc<[String]> = stmt
        .column_names()
        .iter()
        .map(|c| (*c).to_string())
        .collect::<Vec<_>>()
        .into();

    let mut rows = stmt
        .query(rusqlite::params_from_iter(params.iter()))
        .map_err(|e| Error::from_sqlite("query", e))?;

    let mut out = Vec::new();
    while let Some(row) = rows.next().map_err(|e| Error::from_sqlite("query", e))? {
        let mut values = Vec::with_capacity(columns.len());
        for i in 0..columns.len() {
            let value = row
                .get_ref(i)
                .map_err(|e| Error::from_sqlite("query", e))?;
            values.push(Value::from_sql_ref(value));
        }
        out.push(Row::new(Arc::clone(&columns), values));
    }

    Ok(out)
}

/// Runs a mutating statement and reports last insert id and affected rows.
pub(crate) fn run_statement(
    conn: &Connection,
    sql: &str,
    params: &[Value],
) -> Result<ExecuteOutcome> {
    let rows_changed = conn
        .execute(sql, rusqlite::params_from_iter(params.iter()))
        .map_err(|e| Error::from_sqlite("execute", e))?;

    Ok(ExecuteOutcome {
        last_insert_id: conn.last_insert_rowid(),
        rows_changed,
    })
}
