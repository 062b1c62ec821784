//! Init command: create a fresh snapshot from the bootstrap DDL.

use crate::config::LessonbankConfig;
use crate::storage::Store;

/// Creates the snapshot file by bootstrapping an empty database.
///
/// Refuses to touch an existing snapshot unless `force` is set, in which
/// case the old file is removed first.
///
/// # Errors
///
/// Returns an error if the existing snapshot cannot be removed or the
/// bootstrap fails.
pub fn cmd_init(
    config: &LessonbankConfig,
    force: bool,
) -> Result<(), Box<dyn std::error::Error>> {
    let options = config.store_options();

    if options.db_path.exists() {
        if force {
            std::fs::remove_file(&options.db_path)?;
            println!("Removed existing snapshot: {}", options.db_path.display());
        } else {
            println!(
                "Snapshot already exists: {} (use --force to recreate)",
                options.db_path.display()
            );
            return Ok(());
        }
    }

    let store = Store::open(&options)?;
    store.close()?;

    println!("Created snapshot: {}", options.db_path.display());
    println!("Bootstrap DDL: {}", options.bootstrap_ddl.display());

    Ok(())
}
