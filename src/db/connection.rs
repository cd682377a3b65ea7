//! Opening the SQLite file and applying the schema.

use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use log::info;
use rusqlite::Connection;

use crate::schema::Schema;

/// Open (or create) the database file, enable foreign keys, and apply every
/// table definition. `CREATE TABLE IF NOT EXISTS` keeps this idempotent across
/// restarts.
pub(crate) fn open_database(path: &Path, schema: &Schema) -> Result<Connection> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent).with_context(|| {
                format!("failed to create database directory {}", parent.display())
            })?;
        }
    }

    let conn = Connection::open(path)
        .with_context(|| format!("failed to open SQLite database at {}", path.display()))?;
    apply_schema(&conn, schema)?;
    info!("opened inventory database at {}", path.display());
    Ok(conn)
}

/// Same as [`open_database`] but backed by memory. Used by tests and dry runs.
pub(crate) fn open_in_memory(schema: &Schema) -> Result<Connection> {
    let conn = Connection::open_in_memory().context("failed to open in-memory database")?;
    apply_schema(&conn, schema)?;
    Ok(conn)
}

fn apply_schema(conn: &Connection, schema: &Schema) -> Result<()> {
    conn.execute("PRAGMA foreign_keys = ON", [])
        .context("failed to enable foreign keys")?;

    for table in schema.tables() {
        conn.execute(table.create_sql, [])
            .with_context(|| format!("failed to create {} table", table.name))?;
    }

    Ok(())
}
