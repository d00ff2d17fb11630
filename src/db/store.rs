// src/db/store.rs

//! [`SqliteStore`]: the migration contracts on top of a CMS database
//!
//! Uploaded files land in `uploads_dir/YYYY/MM/` next to an attachment row;
//! their public URL is `site_url/wp-content/uploads/<relative path>`.

use crate::db::models::{Attachment, NggGallery, NggPicture, Post};
use crate::db::{TablePrefix, schema};
use crate::error::{Error, Result};
use crate::migrate::{
    AssetRef, ContentRecord, ContentStore, GalleryEntry, LegacyPictureId, MediaStore,
    PictureEntry, PictureStore, RecordId, ShortcodeKind,
};
use rusqlite::Connection;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::debug;

/// URL path under the site root where uploads are served
const UPLOADS_URL_PATH: &str = "wp-content/uploads";

pub struct SqliteStore {
    conn: Connection,
    prefix: TablePrefix,
    uploads_dir: PathBuf,
    site_url: String,
}

impl SqliteStore {
    /// Wrap an open connection; fails when the CMS tables are missing.
    pub fn new(
        conn: Connection,
        prefix: TablePrefix,
        uploads_dir: impl Into<PathBuf>,
        site_url: &str,
    ) -> Result<Self> {
        if !schema::tables_exist(&conn, &prefix)? {
            return Err(Error::InitError(format!(
                "Database has no '{prefix}' CMS tables (posts, postmeta, ngg_pictures, ngg_gallery)"
            )));
        }

        Ok(Self {
            conn,
            prefix,
            uploads_dir: uploads_dir.into(),
            site_url: site_url.trim_end_matches('/').to_string(),
        })
    }

    /// Open the database at `db_path` and wrap it
    pub fn open(
        db_path: &str,
        prefix: TablePrefix,
        uploads_dir: impl Into<PathBuf>,
        site_url: &str,
    ) -> Result<Self> {
        let conn = crate::db::open(db_path)?;
        Self::new(conn, prefix, uploads_dir, site_url)
    }

    pub fn connection(&self) -> &Connection {
        &self.conn
    }

    pub fn prefix(&self) -> &TablePrefix {
        &self.prefix
    }

    fn upload_url(&self, relative: &str) -> String {
        format!("{}/{}/{}", self.site_url, UPLOADS_URL_PATH, relative)
    }

    /// Copy `source` into this month's upload directory under a free name.
    ///
    /// Returns the path relative to the uploads directory and the absolute
    /// destination.
    fn store_upload(&self, source: &Path, filename: &str) -> Result<(String, PathBuf)> {
        let subdir = chrono::Utc::now().format("%Y/%m").to_string();
        let dir = self.uploads_dir.join(&subdir);
        fs::create_dir_all(&dir).map_err(|e| {
            Error::StoreError(format!("Failed to create {}: {e}", dir.display()))
        })?;

        let name = unique_filename(&dir, filename);
        let dest = dir.join(&name);
        fs::copy(source, &dest).map_err(|e| {
            Error::StoreError(format!("Failed to write {}: {e}", dest.display()))
        })?;

        debug!("Stored upload at {}", dest.display());
        Ok((format!("{subdir}/{name}"), dest))
    }
}

impl ContentStore for SqliteStore {
    fn query_records_matching(
        &self,
        kind: ShortcodeKind,
        after: Option<RecordId>,
        limit: usize,
    ) -> Result<Vec<ContentRecord>> {
        Post::find_with_shortcode(
            &self.conn,
            &self.prefix,
            &kind.like_pattern(),
            after.map(|id| id.0),
            limit,
        )?
        .into_iter()
        .map(Post::into_record)
        .collect()
    }

    fn persist(&self, record: &ContentRecord) -> Result<()> {
        if !Post::update_content(&self.conn, &self.prefix, record.id.0, &record.body)? {
            return Err(Error::StoreError(format!(
                "record {} no longer exists",
                record.id
            )));
        }
        Ok(())
    }
}

impl PictureStore for SqliteStore {
    fn get_picture(&self, id: LegacyPictureId) -> Result<Option<PictureEntry>> {
        Ok(NggPicture::find_by_id(&self.conn, &self.prefix, id.0)?.map(|p| PictureEntry {
            gallery_id: p.gallery_id,
            filename: p.filename,
        }))
    }

    fn get_gallery(&self, gallery_id: i64) -> Result<Option<GalleryEntry>> {
        Ok(NggGallery::find_by_id(&self.conn, &self.prefix, gallery_id)?
            .map(|g| GalleryEntry { path: g.path }))
    }
}

impl MediaStore for SqliteStore {
    fn create_asset_from_file(
        &self,
        temp_path: &Path,
        original_filename: &str,
        owner: RecordId,
    ) -> Result<AssetRef> {
        // Never let a stored file name climb out of the upload directory.
        let filename = Path::new(original_filename)
            .file_name()
            .and_then(|n| n.to_str())
            .filter(|n| !n.is_empty())
            .ok_or_else(|| {
                Error::StoreError(format!("Unusable file name '{original_filename}'"))
            })?;

        let (relative, dest) = self.store_upload(temp_path, filename)?;
        let title = Path::new(filename)
            .file_stem()
            .and_then(|s| s.to_str())
            .unwrap_or(filename);

        let mut attachment = Attachment::new(
            owner.0,
            title,
            mime_type_for(filename),
            relative.as_str(),
            self.upload_url(&relative),
        );

        match crate::db::transaction(&self.conn, |tx| attachment.insert(tx, &self.prefix)) {
            Ok(id) => Ok(AssetRef(id)),
            Err(e) => {
                // Best effort: the row never made it, the file should not stay.
                let _ = fs::remove_file(&dest);
                Err(e)
            }
        }
    }

    fn asset_markup(&self, asset: AssetRef) -> Result<String> {
        let attachment = Attachment::find_by_id(&self.conn, &self.prefix, asset.0)?
            .ok_or_else(|| Error::StoreError(format!("attachment {asset} does not exist")))?;

        let url = escape_attr(&self.upload_url(&attachment.attached_file));
        Ok(format!(
            "<a href=\"{url}\"><img src=\"{url}\" alt=\"{}\" class=\"attachment-large size-large\" /></a>",
            escape_attr(&attachment.title)
        ))
    }
}

/// `name.ext`, then `name-1.ext`, `name-2.ext`, ... until one is free in `dir`
fn unique_filename(dir: &Path, filename: &str) -> String {
    if !dir.join(filename).exists() {
        return filename.to_string();
    }

    let path = Path::new(filename);
    let stem = path.file_stem().and_then(|s| s.to_str()).unwrap_or(filename);
    let ext = path.extension().and_then(|e| e.to_str());

    (1..)
        .map(|n| match ext {
            Some(ext) => format!("{stem}-{n}.{ext}"),
            None => format!("{stem}-{n}"),
        })
        .find(|candidate| !dir.join(candidate).exists())
        .unwrap_or_else(|| filename.to_string())
}

fn mime_type_for(filename: &str) -> &'static str {
    let ext = Path::new(filename)
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_ascii_lowercase());

    match ext.as_deref() {
        Some("jpg" | "jpeg" | "jpe") => "image/jpeg",
        Some("png") => "image/png",
        Some("gif") => "image/gif",
        Some("webp") => "image/webp",
        Some("bmp") => "image/bmp",
        Some("tif" | "tiff") => "image/tiff",
        Some("svg") => "image/svg+xml",
        _ => "application/octet-stream",
    }
}

fn escape_attr(value: &str) -> String {
    value
        .replace('&', "&amp;")
        .replace('"', "&quot;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
}
