//! Schema for the document store.
//!
//! All diary data lives in one `documents` table: one row per
//! `(collection, id)` with the document itself in a JSON `body` column.
//! Collections (`diary_entries`, `tags`) are not separate tables, so schema
//! changes after version 1 are expression indexes over `body` fields, each
//! scoped to one collection with a partial-index `WHERE` clause.
//!
//! | version | file | adds |
//! |---|---|---|
//! | 1 | `0001_documents.sql` | `documents` table, entry `created_at` index |
//! | 2 | `0002_tag_name_index.sql` | unique tag `name` index |
//!
//! # Invariants
//! - The applied version is `PRAGMA user_version`; 0 means an empty file.
//! - Pending steps run in one transaction, so a file is never left between
//!   two versions.

use crate::db::{DbError, DbResult};
use log::{debug, info};
use rusqlite::Connection;

#[derive(Debug, Clone, Copy)]
struct SchemaStep {
    version: u32,
    /// Short label used in `db_migrate` log events.
    label: &'static str,
    sql: &'static str,
}

const SCHEMA_STEPS: &[SchemaStep] = &[
    SchemaStep {
        version: 1,
        label: "documents",
        sql: include_str!("0001_documents.sql"),
    },
    SchemaStep {
        version: 2,
        label: "tag_name_index",
        sql: include_str!("0002_tag_name_index.sql"),
    },
];

/// Schema version a fully migrated document store reports.
pub fn latest_version() -> u32 {
    SCHEMA_STEPS.last().map_or(0, |step| step.version)
}

/// Brings the connection's schema up to `latest_version()`.
///
/// # Errors
/// - `UnsupportedSchemaVersion` when the file was written by a newer build.
/// - `Sqlite` when a step fails; nothing from the failed run is kept.
pub fn apply_migrations(conn: &mut Connection) -> DbResult<()> {
    let from_version = current_user_version(conn)?;
    let to_version = latest_version();
    if from_version > to_version {
        return Err(DbError::UnsupportedSchemaVersion {
            db_version: from_version,
            latest_supported: to_version,
        });
    }

    let pending = pending_steps(from_version);
    if pending.is_empty() {
        return Ok(());
    }

    let tx = conn.transaction()?;
    for step in pending {
        tx.execute_batch(step.sql)?;
        tx.pragma_update(None, "user_version", step.version)?;
        debug!(
            "event=db_migrate module=db status=step version={} label={}",
            step.version, step.label
        );
    }
    tx.commit()?;

    info!(
        "event=db_migrate module=db status=ok from_version={from_version} to_version={to_version} steps={}",
        pending.len()
    );
    Ok(())
}

/// Reads the applied schema version.
pub fn current_user_version(conn: &Connection) -> DbResult<u32> {
    let version = conn.pragma_query_value(None, "user_version", |row| row.get::<_, u32>(0))?;
    Ok(version)
}

fn pending_steps(from_version: u32) -> &'static [SchemaStep] {
    let applied = SCHEMA_STEPS
        .iter()
        .take_while(|step| step.version <= from_version)
        .count();
    &SCHEMA_STEPS[applied..]
}
