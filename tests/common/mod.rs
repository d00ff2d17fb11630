// tests/common/mod.rs

//! Shared test utilities and helpers for integration tests.

#![allow(dead_code)]

use gallery_migrate::db::models::{NggGallery, NggPicture, Post};
use gallery_migrate::db::{self, SqliteStore, TablePrefix};
use gallery_migrate::migrate::MigrationContext;
use std::fs;
use std::path::PathBuf;
use tempfile::TempDir;

pub const SITE_URL: &str = "https://example.com";

/// A throwaway site: database, legacy gallery files on disk, uploads dir.
///
/// Keep the fixture alive for as long as the files are needed.
pub struct SiteFixture {
    pub dir: TempDir,
    pub db_path: String,
    pub storage_root: PathBuf,
    pub uploads_dir: PathBuf,
    pub prefix: TablePrefix,
}

impl SiteFixture {
    pub fn new() -> Self {
        let dir = tempfile::tempdir().unwrap();
        let db_path = dir.path().join("site.db").to_str().unwrap().to_string();
        let storage_root = dir.path().join("htdocs");
        let uploads_dir = storage_root.join("wp-content/uploads");
        fs::create_dir_all(&storage_root).unwrap();

        let prefix = TablePrefix::default();
        db::init(&db_path, &prefix).unwrap();

        Self {
            dir,
            db_path,
            storage_root,
            uploads_dir,
            prefix,
        }
    }

    pub fn add_gallery(&self, path: &str) -> i64 {
        let conn = db::open(&self.db_path).unwrap();
        NggGallery::new(path).insert(&conn, &self.prefix).unwrap()
    }

    /// Add a picture row; `contents` also writes the file under the storage root.
    pub fn add_picture(&self, gallery_id: i64, filename: &str, contents: Option<&[u8]>) -> i64 {
        let conn = db::open(&self.db_path).unwrap();
        let gallery = NggGallery::find_by_id(&conn, &self.prefix, gallery_id)
            .unwrap()
            .expect("gallery must exist before its pictures");

        if let Some(bytes) = contents {
            let dir = self.storage_root.join(&gallery.path);
            fs::create_dir_all(&dir).unwrap();
            fs::write(dir.join(filename), bytes).unwrap();
        }

        NggPicture::new(gallery_id, filename)
            .insert(&conn, &self.prefix)
            .unwrap()
    }

    pub fn add_post(&self, post_type: &str, content: &str) -> i64 {
        let conn = db::open(&self.db_path).unwrap();
        db::transaction(&conn, |tx| Post::new(post_type, content).insert(tx, &self.prefix)).unwrap()
    }

    pub fn content(&self, id: i64) -> String {
        let conn = db::open(&self.db_path).unwrap();
        Post::find_by_id(&conn, &self.prefix, id)
            .unwrap()
            .unwrap()
            .content
    }

    pub fn attachment_count(&self) -> i64 {
        let conn = db::open(&self.db_path).unwrap();
        conn.query_row(
            &format!(
                "SELECT COUNT(*) FROM {} WHERE post_type = 'attachment'",
                self.prefix.posts()
            ),
            [],
            |row| row.get(0),
        )
        .unwrap()
    }

    pub fn store(&self) -> SqliteStore {
        SqliteStore::open(&self.db_path, self.prefix.clone(), &self.uploads_dir, SITE_URL).unwrap()
    }

    /// Context reading legacy files from the fixture's storage root
    pub fn local_context(&self, limit_records: usize) -> MigrationContext {
        MigrationContext::new(limit_records, None, self.storage_root.clone())
    }
}
