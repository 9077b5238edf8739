//! Database migrations
//!
//! Every store declares an ordered list of [`Migration`]s. The applied
//! version is tracked in a single-row `schema_version` table per file.

use crate::error::StorageError;
use crate::Result;
use rusqlite::Connection;

/// One schema step, applied once per database file.
#[derive(Debug, Clone, Copy)]
pub struct Migration {
    pub version: i32,
    pub description: &'static str,
    pub sql: &'static str,
}

impl Migration {
    pub const fn new(version: i32, description: &'static str, sql: &'static str) -> Self {
        Self {
            version,
            description,
            sql,
        }
    }
}

pub fn run_migrations(conn: &Connection, migrations: &[Migration]) -> Result<()> {
    let current_version = get_schema_version(conn)?;
    let mut applied = current_version;

    for migration in migrations.iter().filter(|m| m.version > current_version) {
        tracing::info!(
            version = migration.version,
            "Running migration v{}: {}",
            migration.version,
            migration.description
        );

        conn.execute_batch(migration.sql)
            .map_err(|e| StorageError::Migration {
                version: migration.version,
                reason: e.to_string(),
            })?;
        applied = applied.max(migration.version);
    }

    if applied != current_version {
        set_schema_version(conn, applied)?;
    }
    Ok(())
}

fn get_schema_version(conn: &Connection) -> Result<i32> {
    let result: std::result::Result<i32, _> =
        conn.query_row("SELECT version FROM schema_version LIMIT 1", [], |row| {
            row.get(0)
        });

    match result {
        Ok(v) => Ok(v),
        Err(rusqlite::Error::QueryReturnedNoRows) => Ok(0),
        Err(rusqlite::Error::SqliteFailure(_, _)) => {
            // Table doesn't exist yet
            conn.execute(
                "CREATE TABLE IF NOT EXISTS schema_version (version INTEGER NOT NULL)",
                [],
            )?;
            conn.execute("INSERT INTO schema_version (version) VALUES (0)", [])?;
            Ok(0)
        }
        Err(e) => Err(e.into()),
    }
}

fn set_schema_version(conn: &Connection, version: i32) -> Result<()> {
    conn.execute("DELETE FROM schema_version", [])?;
    conn.execute("INSERT INTO schema_version (version) VALUES (?1)", [version])?;
    Ok(())
}
