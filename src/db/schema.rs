// src/db/schema.rs

//! Table layout of the CMS database
//!
//! Only the columns the migration reads or writes are created. Table names
//! carry a configurable prefix, which is validated before it is ever
//! spliced into SQL.

use crate::error::{Error, Result};
use rusqlite::Connection;
use tracing::debug;

pub const DEFAULT_TABLE_PREFIX: &str = "wp_";

/// Validated table name prefix (`[A-Za-z0-9_]*`)
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TablePrefix(String);

impl TablePrefix {
    pub fn new(prefix: &str) -> Result<Self> {
        if !prefix
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '_')
        {
            return Err(Error::ConfigError(format!(
                "Invalid table prefix '{prefix}': only letters, digits and '_' are allowed"
            )));
        }
        Ok(Self(prefix.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn posts(&self) -> String {
        format!("{}posts", self.0)
    }

    pub fn postmeta(&self) -> String {
        format!("{}postmeta", self.0)
    }

    pub fn ngg_pictures(&self) -> String {
        format!("{}ngg_pictures", self.0)
    }

    pub fn ngg_gallery(&self) -> String {
        format!("{}ngg_gallery", self.0)
    }
}

impl Default for TablePrefix {
    fn default() -> Self {
        Self(DEFAULT_TABLE_PREFIX.to_string())
    }
}

impl std::fmt::Display for TablePrefix {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Create the four tables if they are missing
pub fn create_tables(conn: &Connection, prefix: &TablePrefix) -> Result<()> {
    debug!("Creating tables with prefix '{}'", prefix);

    conn.execute_batch(&format!(
        "CREATE TABLE IF NOT EXISTS {posts} (
            ID INTEGER PRIMARY KEY AUTOINCREMENT,
            post_author INTEGER NOT NULL DEFAULT 0,
            post_date TEXT NOT NULL DEFAULT CURRENT_TIMESTAMP,
            post_content TEXT NOT NULL DEFAULT '',
            post_title TEXT NOT NULL DEFAULT '',
            post_status TEXT NOT NULL DEFAULT 'publish',
            post_name TEXT NOT NULL DEFAULT '',
            post_modified TEXT NOT NULL DEFAULT CURRENT_TIMESTAMP,
            post_parent INTEGER NOT NULL DEFAULT 0,
            guid TEXT NOT NULL DEFAULT '',
            post_type TEXT NOT NULL DEFAULT 'post',
            post_mime_type TEXT NOT NULL DEFAULT ''
        );

        CREATE INDEX IF NOT EXISTS idx_{posts}_type ON {posts}(post_type);
        CREATE INDEX IF NOT EXISTS idx_{posts}_parent ON {posts}(post_parent);

        CREATE TABLE IF NOT EXISTS {postmeta} (
            meta_id INTEGER PRIMARY KEY AUTOINCREMENT,
            post_id INTEGER NOT NULL DEFAULT 0,
            meta_key TEXT,
            meta_value TEXT
        );

        CREATE INDEX IF NOT EXISTS idx_{postmeta}_post ON {postmeta}(post_id);

        CREATE TABLE IF NOT EXISTS {gallery} (
            gid INTEGER PRIMARY KEY AUTOINCREMENT,
            name TEXT NOT NULL DEFAULT '',
            slug TEXT NOT NULL DEFAULT '',
            path TEXT NOT NULL DEFAULT '',
            title TEXT NOT NULL DEFAULT ''
        );

        CREATE TABLE IF NOT EXISTS {pictures} (
            pid INTEGER PRIMARY KEY AUTOINCREMENT,
            galleryid INTEGER NOT NULL DEFAULT 0,
            filename TEXT NOT NULL DEFAULT '',
            alttext TEXT NOT NULL DEFAULT '',
            description TEXT NOT NULL DEFAULT '',
            imagedate TEXT NOT NULL DEFAULT CURRENT_TIMESTAMP
        );",
        posts = prefix.posts(),
        postmeta = prefix.postmeta(),
        gallery = prefix.ngg_gallery(),
        pictures = prefix.ngg_pictures(),
    ))?;

    Ok(())
}

/// Whether every table the migration touches exists
pub fn tables_exist(conn: &Connection, prefix: &TablePrefix) -> Result<bool> {
    let mut stmt =
        conn.prepare("SELECT COUNT(*) FROM sqlite_master WHERE type = 'table' AND name = ?1")?;

    for table in [
        prefix.posts(),
        prefix.postmeta(),
        prefix.ngg_pictures(),
        prefix.ngg_gallery(),
    ] {
        let count: i64 = stmt.query_row([&table], |row| row.get(0))?;
        if count == 0 {
            debug!("Table {} is missing", table);
            return Ok(false);
        }
    }
    Ok(true)
}
