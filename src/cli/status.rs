//! Status command: inspect the snapshot.

use crate::config::LessonbankConfig;
use crate::storage::Store;
use chrono::{DateTime, Local};

/// Shows tables, row counts and snapshot file details.
///
/// # Errors
///
/// Returns an error if the snapshot cannot be loaded.
pub fn cmd_status(config: &LessonbankConfig) -> Result<(), Box<dyn std::error::Error>> {
    let options = config.store_options();

    if !options.db_path.exists() {
        println!(
            "No snapshot at {} - run `lessonbank init` first",
            options.db_path.display()
        );
        return Ok(());
    }

    let metadata = std::fs::metadata(&options.db_path)?;
    println!("Snapshot: {}", options.db_path.display());
    println!("  Size: {} bytes", metadata.len());
    if let Ok(modified) = metadata.modified() {
        let local: DateTime<Local> = modified.into();
        println!("  Last persisted: {}", local.format("%Y-%m-%d %H:%M:%S"));
    }
    println!();

    let store = Store::open(&options)?;
    let tables = store.query(
        "SELECT name FROM sqlite_master
         WHERE type = 'table' AND name NOT LIKE 'sqlite_%'
         ORDER BY name",
        &[],
    )?;

    println!("Tables:");
    for table in &tables {
        let Some(name) = table.text("name") else {
            continue;
        };
        // Table names come from schema metadata, not from user input
        let row = store.query_one(&format!("SELECT COUNT(*) AS n FROM \"{name}\""), &[])?;
        println!("  {name}: {} rows", row.integer("n").unwrap_or(0));
    }

    Ok(())
}
