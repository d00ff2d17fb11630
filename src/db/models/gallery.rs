// src/db/models/gallery.rs

//! Legacy gallery plugin rows (`<prefix>ngg_pictures`, `<prefix>ngg_gallery`)

use crate::db::TablePrefix;
use crate::error::Result;
use rusqlite::{Connection, OptionalExtension, Row, params};

/// A picture row: which gallery it lives in and its file name
#[derive(Debug, Clone)]
pub struct NggPicture {
    pub pid: Option<i64>,
    pub gallery_id: i64,
    pub filename: String,
}

impl NggPicture {
    pub fn new(gallery_id: i64, filename: impl Into<String>) -> Self {
        Self {
            pid: None,
            gallery_id,
            filename: filename.into(),
        }
    }

    pub fn insert(&mut self, conn: &Connection, prefix: &TablePrefix) -> Result<i64> {
        conn.execute(
            &format!(
                "INSERT INTO {} (galleryid, filename) VALUES (?1, ?2)",
                prefix.ngg_pictures()
            ),
            params![self.gallery_id, &self.filename],
        )?;

        let pid = conn.last_insert_rowid();
        self.pid = Some(pid);
        Ok(pid)
    }

    pub fn find_by_id(conn: &Connection, prefix: &TablePrefix, pid: i64) -> Result<Option<Self>> {
        let mut stmt = conn.prepare(&format!(
            "SELECT pid, galleryid, filename FROM {} WHERE pid = ?1",
            prefix.ngg_pictures()
        ))?;

        let picture = stmt.query_row([pid], Self::from_row).optional()?;
        Ok(picture)
    }

    fn from_row(row: &Row) -> rusqlite::Result<Self> {
        Ok(Self {
            pid: Some(row.get(0)?),
            gallery_id: row.get(1)?,
            filename: row.get(2)?,
        })
    }
}

/// A gallery row; `path` is relative to the site root
#[derive(Debug, Clone)]
pub struct NggGallery {
    pub gid: Option<i64>,
    pub path: String,
}

impl NggGallery {
    pub fn new(path: impl Into<String>) -> Self {
        Self {
            gid: None,
            path: path.into(),
        }
    }

    pub fn insert(&mut self, conn: &Connection, prefix: &TablePrefix) -> Result<i64> {
        conn.execute(
            &format!("INSERT INTO {} (path) VALUES (?1)", prefix.ngg_gallery()),
            [&self.path],
        )?;

        let gid = conn.last_insert_rowid();
        self.gid = Some(gid);
        Ok(gid)
    }

    pub fn find_by_id(conn: &Connection, prefix: &TablePrefix, gid: i64) -> Result<Option<Self>> {
        let mut stmt = conn.prepare(&format!(
            "SELECT gid, path FROM {} WHERE gid = ?1",
            prefix.ngg_gallery()
        ))?;

        let gallery = stmt
            .query_row([gid], |row| {
                Ok(Self {
                    gid: Some(row.get(0)?),
                    path: row.get(1)?,
                })
            })
            .optional()?;
        Ok(gallery)
    }
}
