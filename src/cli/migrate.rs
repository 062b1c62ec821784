//! Migrate command: apply additive schema changes to the snapshot.

use crate::config::LessonbankConfig;
use crate::storage::{MigrationRunner, Store, expected_changes};

/// Brings the snapshot's schema up to the current expected shape.
///
/// Safe to run repeatedly; a run against an up-to-date snapshot applies
/// nothing.
///
/// # Errors
///
/// Returns an error if the snapshot cannot be loaded or re-persisted. A
/// failing individual step does not fail the command; it is reported in the
/// summary.
pub fn cmd_migrate(config: &LessonbankConfig) -> Result<(), Box<dyn std::error::Error>> {
    let options = config.store_options();

    if !options.db_path.exists() {
        println!(
            "No snapshot at {} - run `lessonbank init` first",
            options.db_path.display()
        );
        return Ok(());
    }

    let store = Store::open(&options)?;
    let report = MigrationRunner::new(&store).run(expected_changes());
    store.close()?;

    println!("Migration complete: {}", report.summary());
    if report.failed > 0 {
        println!("Some steps were skipped; see the log for details.");
    }

    Ok(())
}
