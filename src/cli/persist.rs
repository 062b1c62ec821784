//! Persist command: load the snapshot and rewrite it.

use crate::config::LessonbankConfig;
use crate::storage::Store;

/// Loads the snapshot and immediately re-persists it.
///
/// Verifies that the file round-trips through the engine; the rewritten file
/// is logically identical to what was loaded.
///
/// # Errors
///
/// Returns an error if the snapshot cannot be loaded or written.
pub fn cmd_persist(config: &LessonbankConfig) -> Result<(), Box<dyn std::error::Error>> {
    let options = config.store_options();

    if !options.db_path.exists() {
        println!(
            "No snapshot at {} - run `lessonbank init` first",
            options.db_path.display()
        );
        return Ok(());
    }

    let store = Store::open(&options)?;
    store.persist()?;
    store.close()?;

    let metadata = std::fs::metadata(&options.db_path)?;
    println!(
        "Snapshot rewritten: {} ({} bytes)",
        options.db_path.display(),
        metadata.len()
    );

    Ok(())
}
