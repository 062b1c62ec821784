//! Shared metrics recording for store operations.
//!
//! This module provides utilities for recording storage operation metrics
//! consistently across the adapter, the migration runner and the
//! checkpointer. No exporter is installed by this crate; emissions go to the
//! `metrics` facade and are a no-op until the embedding process installs a
//! recorder.

use std::time::Instant;

/// Records operation metrics for storage operations.
///
/// This function records two metrics for each operation:
/// 1. `storage_operations_total` - Counter for operation count by status
/// 2. `storage_operation_duration_ms` - Histogram for operation latency
///
/// # Arguments
///
/// * `component` - Component name (e.g., "store", "migrations", "checkpoint")
/// * `operation` - Operation name (e.g., "query", "execute", "persist")
/// * `start` - Operation start time from `Instant::now()`
/// * `status` - Operation status ("success" or "error")
///
/// # Examples
///
/// ```ignore
/// use std::time::Instant;
/// use lessonbank::storage::sqlite::record_operation_metrics;
///
/// let start = Instant::now();
/// // ... perform operation ...
/// let status = if result.is_ok() { "success" } else { "error" };
/// record_operation_metrics("store", "query", start, status);
/// ```
pub fn record_operation_metrics(
    component: &'static str,
    operation: &'static str,
    start: Instant,
    status: &'static str,
) {
    metrics::counter!(
        "storage_operations_total",
        "component" => component,
        "operation" => operation,
        "status" => status
    )
    .increment(1);
    metrics::histogram!(
        "storage_operation_duration_ms",
        "component" => component,
        "operation" => operation,
        "status" => status
    )
    .record(start.elapsed().as_secs_f64() * 1000.0);
}
