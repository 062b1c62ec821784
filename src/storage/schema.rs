//! The teaching-materials application schema.
//!
//! The bootstrap DDL (shipped as `sql/bootstrap.sql`, executed verbatim on
//! first run) creates the base tables: `users`, `materials`, `favorites`.
//! [`expected_changes`] lists the additive steps that bring any historical
//! snapshot file to the current shape.

use super::migrations::SchemaChange;

/// Additive changes from the original base schema to the current one.
///
/// Order within this list does not matter for correctness; the runner
/// applies table creations before column additions regardless.
pub const EXPECTED_CHANGES: &[SchemaChange] = &[
    SchemaChange::CreateTable {
        table: "action_log",
        ddl: "CREATE TABLE action_log (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            user_id INTEGER,
            action TEXT NOT NULL,
            target_id INTEGER,
            created_at INTEGER NOT NULL DEFAULT (strftime('%s', 'now'))
        )",
    },
    SchemaChange::AddColumn {
        table: "users",
        column: "role",
        definition: "TEXT NOT NULL DEFAULT 'user'",
    },
    SchemaChange::AddColumn {
        table: "materials",
        column: "summary",
        definition: "TEXT",
    },
    SchemaChange::AddColumn {
        table: "materials",
        column: "views",
        definition: "INTEGER NOT NULL DEFAULT 0",
    },
    SchemaChange::AddColumn {
        table: "materials",
        column: "published_at",
        definition: "INTEGER",
    },
];

/// Returns the compiled-in expected schema changes.
#[must_use]
pub const fn expected_changes() -> &'static [SchemaChange] {
    EXPECTED_CHANGES
}
