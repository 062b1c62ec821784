//! Snapshot cadence: periodic persistence and persistence on shutdown.
//!
//! The store itself persists only when asked. Cadence comes from three
//! places: write-handling callers persisting opportunistically, the
//! [`Checkpointer`] persisting on a fixed interval, and the termination
//! signal hook installed by [`persist_on_shutdown`].

use super::sqlite::record_operation_metrics;
use super::store::Store;
use crate::{Error, Result};
use std::sync::Arc;
use std::sync::mpsc::{self, RecvTimeoutError, Sender};
use std::thread::JoinHandle;
use std::time::{Duration, Instant};

/// Default interval between periodic snapshots.
pub const DEFAULT_CHECKPOINT_INTERVAL: Duration = Duration::from_secs(30);

/// Background thread persisting a store on a fixed interval.
///
/// Stopping (or dropping) the checkpointer performs one final persist before
/// the thread exits, so no mutation that predates the stop is lost to the
/// interval gap.
pub struct Checkpointer {
    stop_tx: Sender<()>,
    handle: Option<JoinHandle<()>>,
}

impl Checkpointer {
    /// Spawns the checkpoint thread.
    ///
    /// # Errors
    ///
    /// Returns [`Error::IoFailure`] if the thread cannot be spawned.
    pub fn spawn(store: Arc<Store>, interval: Duration) -> Result<Self> {
        let (stop_tx, stop_rx) = mpsc::channel();

        let handle = std::thread::Builder::new()
            .name("lessonbank-checkpoint".to_string())
            .spawn(move || {
                tracing::debug!(interval_secs = interval.as_secs(), "checkpointer started");
                loop {
                    match stop_rx.recv_timeout(interval) {
                        Err(RecvTimeoutError::Timeout) => {
                            let start = Instant::now();
                            let status = match store.persist() {
                                Ok(()) => "success",
                                Err(e) => {
                                    tracing::error!(error = %e, "periodic snapshot failed");
                                    "error"
                                },
                            };
                            record_operation_metrics("checkpoint", "persist", start, status);
                        },
                        // Stop requested or the handle was dropped
                        Ok(()) | Err(RecvTimeoutError::Disconnected) => break,
                    }
                }

                if let Err(e) = store.persist() {
                    tracing::error!(error = %e, "final snapshot on stop failed");
                }
                tracing::debug!("checkpointer stopped");
            })
            .map_err(|e| Error::IoFailure {
                operation: "spawn_checkpointer".to_string(),
                cause: e.to_string(),
            })?;

        Ok(Self {
            stop_tx,
            handle: Some(handle),
        })
    }

    /// Stops the checkpoint thread after one final persist.
    pub fn stop(mut self) {
        self.shutdown();
    }

    fn shutdown(&mut self) {
        let _ = self.stop_tx.send(());
        if let Some(handle) = self.handle.take() {
            let _ = handle.join();
        }
    }
}

impl Drop for Checkpointer {
    fn drop(&mut self) {
        self.shutdown();
    }
}

/// Installs a termination-signal handler that persists once and exits.
///
/// Mirrors the process-exit snapshot of the original design: SIGINT/SIGTERM
/// trigger a final whole-file snapshot before the process terminates.
///
/// # Errors
///
/// Returns [`Error::Init`] if a handler is already installed or installation
/// fails.
pub fn persist_on_shutdown(store: Arc<Store>) -> Result<()> {
    ctrlc::set_handler(move || {
        tracing::info!("termination signal received, persisting snapshot");
        if let Err(e) = store.persist() {
            tracing::error!(error = %e, "snapshot on shutdown failed");
            std::process::exit(1);
        }
        std::process::exit(0);
    })
    .map_err(|e| Error::Init {
        cause: format!("failed to install signal handler: {e}"),
    })
}
