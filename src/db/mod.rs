// src/db/mod.rs

//! SQLite adapter for the CMS tables
//!
//! Connection helpers plus the row models and [`SqliteStore`], which
//! implements the content, picture and media contracts of the migration
//! core on top of one connection.

pub mod models;
pub mod schema;
mod store;

pub use schema::{DEFAULT_TABLE_PREFIX, TablePrefix};
pub use store::SqliteStore;

use crate::error::{Error, Result};
use rusqlite::{Connection, Transaction};
use std::path::Path;
use std::time::Duration;
use tracing::{debug, info};

/// Open an existing database
pub fn open(db_path: &str) -> Result<Connection> {
    if !Path::new(db_path).exists() {
        return Err(Error::InitError(format!("Database not found at {db_path}")));
    }

    debug!("Opening database at {}", db_path);
    let conn = Connection::open(db_path)?;
    conn.execute("PRAGMA foreign_keys = ON", [])?;
    conn.busy_timeout(Duration::from_secs(5))?;
    Ok(conn)
}

/// Create a database with empty CMS tables under `prefix`
///
/// Existing tables are left alone, so this is safe on a populated file.
pub fn init(db_path: &str, prefix: &TablePrefix) -> Result<()> {
    if let Some(parent) = Path::new(db_path).parent()
        && !parent.as_os_str().is_empty()
    {
        std::fs::create_dir_all(parent)?;
    }

    info!("Initializing database at {}", db_path);
    let conn = Connection::open(db_path)?;
    schema::create_tables(&conn, prefix)?;
    Ok(())
}

/// Run `f` inside a transaction, committing on success
///
/// The connection must not already be inside a transaction.
pub fn transaction<T, F>(conn: &Connection, f: F) -> Result<T>
where
    F: FnOnce(&Transaction) -> Result<T>,
{
    let tx = conn.unchecked_transaction()?;
    let result = f(&tx)?;
    tx.commit()?;
    Ok(result)
}
