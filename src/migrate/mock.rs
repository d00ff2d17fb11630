// src/migrate/mock.rs

//! In-memory collaborators for unit tests
//!
//! Every fake counts its calls so tests can check how often the core hit
//! each store.

use crate::error::{Error, Result};
use std::cell::{Cell, RefCell};
use std::collections::{BTreeMap, HashMap, HashSet};
use std::io::Write;
use std::path::Path;
use tempfile::NamedTempFile;

use super::shortcode::ShortcodeKind;
use super::traits::{ContentStore, MediaStore, PictureStore, RemoteFetch};
use super::types::{
    AssetRef, ContentRecord, GalleryEntry, LegacyPictureId, PictureEntry, RecordId,
};

/// Same selection as `post_content LIKE '%[singlepic%]%'`
fn like_matches(body: &str, kind: ShortcodeKind) -> bool {
    let opener = format!("[{}", kind.as_str());
    body.find(&opener)
        .is_some_and(|start| body[start + opener.len()..].contains(']'))
}

#[derive(Default)]
pub struct MockContentStore {
    records: RefCell<BTreeMap<RecordId, ContentRecord>>,
    queries: Cell<usize>,
    persisted: RefCell<Vec<RecordId>>,
    vanished: RefCell<HashSet<RecordId>>,
    fail_queries: Cell<bool>,
}

impl MockContentStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&self, record: ContentRecord) {
        self.records.borrow_mut().insert(record.id, record);
    }

    pub fn set_body(&self, id: RecordId, body: &str) {
        if let Some(record) = self.records.borrow_mut().get_mut(&id) {
            record.body = body.to_string();
        }
    }

    pub fn body(&self, id: RecordId) -> Option<String> {
        self.records.borrow().get(&id).map(|r| r.body.clone())
    }

    /// Make `persist` report the record as gone
    pub fn vanish_on_persist(&self, id: RecordId) {
        self.vanished.borrow_mut().insert(id);
    }

    pub fn fail_queries(&self) {
        self.fail_queries.set(true);
    }

    pub fn query_count(&self) -> usize {
        self.queries.get()
    }

    pub fn persisted(&self) -> Vec<RecordId> {
        self.persisted.borrow().clone()
    }
}

impl ContentStore for MockContentStore {
    fn query_records_matching(
        &self,
        kind: ShortcodeKind,
        after: Option<RecordId>,
        limit: usize,
    ) -> Result<Vec<ContentRecord>> {
        self.queries.set(self.queries.get() + 1);
        if self.fail_queries.get() {
            return Err(Error::Database(rusqlite::Error::InvalidQuery));
        }

        Ok(self
            .records
            .borrow()
            .values()
            .filter(|r| after.is_none_or(|a| r.id > a))
            .filter(|r| like_matches(&r.body, kind))
            .take(limit)
            .cloned()
            .collect())
    }

    fn persist(&self, record: &ContentRecord) -> Result<()> {
        if self.vanished.borrow().contains(&record.id) {
            return Err(Error::StoreError(format!("record {} no longer exists", record.id)));
        }
        let mut records = self.records.borrow_mut();
        let stored = records
            .get_mut(&record.id)
            .ok_or_else(|| Error::StoreError(format!("record {} no longer exists", record.id)))?;
        stored.body = record.body.clone();
        self.persisted.borrow_mut().push(record.id);
        Ok(())
    }
}

#[derive(Default)]
pub struct MockPictureStore {
    pictures: HashMap<LegacyPictureId, PictureEntry>,
    galleries: HashMap<i64, GalleryEntry>,
    picture_lookups: Cell<usize>,
    gallery_lookups: Cell<usize>,
    fail_lookups: Cell<bool>,
}

impl MockPictureStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_gallery(&mut self, id: i64, path: &str) {
        self.galleries.insert(
            id,
            GalleryEntry {
                path: path.to_string(),
            },
        );
    }

    pub fn add_picture(&mut self, id: i64, gallery_id: i64, filename: &str) {
        self.pictures.insert(
            LegacyPictureId(id),
            PictureEntry {
                gallery_id,
                filename: filename.to_string(),
            },
        );
    }

    /// Make every picture lookup fail the way a dropped connection would
    pub fn fail_lookups(&self) {
        self.fail_lookups.set(true);
    }

    pub fn picture_lookups(&self) -> usize {
        self.picture_lookups.get()
    }

    pub fn gallery_lookups(&self) -> usize {
        self.gallery_lookups.get()
    }
}

impl PictureStore for MockPictureStore {
    fn get_picture(&self, id: LegacyPictureId) -> Result<Option<PictureEntry>> {
        self.picture_lookups.set(self.picture_lookups.get() + 1);
        if self.fail_lookups.get() {
            return Err(Error::Database(rusqlite::Error::InvalidQuery));
        }
        Ok(self.pictures.get(&id).cloned())
    }

    fn get_gallery(&self, gallery_id: i64) -> Result<Option<GalleryEntry>> {
        self.gallery_lookups.set(self.gallery_lookups.get() + 1);
        Ok(self.galleries.get(&gallery_id).cloned())
    }
}

/// Asset registered with [`MockMediaStore`]
#[derive(Debug, Clone)]
pub struct CreatedAsset {
    pub asset: AssetRef,
    pub original_filename: String,
    pub owner: RecordId,
    pub contents: Vec<u8>,
}

/// Hands out asset ids starting at 100 and renders `<a>A<id></a>`
#[derive(Default)]
pub struct MockMediaStore {
    created: RefCell<Vec<CreatedAsset>>,
    fail_writes: Cell<bool>,
    fail_markup: Cell<bool>,
}

impl MockMediaStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn fail_writes(&self) {
        self.fail_writes.set(true);
    }

    /// Assets are still created but `asset_markup` fails
    pub fn fail_markup(&self) {
        self.fail_markup.set(true);
    }

    pub fn created(&self) -> Vec<CreatedAsset> {
        self.created.borrow().clone()
    }
}

impl MediaStore for MockMediaStore {
    fn create_asset_from_file(
        &self,
        temp_path: &Path,
        original_filename: &str,
        owner: RecordId,
    ) -> Result<AssetRef> {
        if self.fail_writes.get() {
            return Err(Error::StoreError("media library is read-only".to_string()));
        }
        let contents = std::fs::read(temp_path)?;
        let mut created = self.created.borrow_mut();
        let asset = AssetRef(100 + created.len() as i64);
        created.push(CreatedAsset {
            asset,
            original_filename: original_filename.to_string(),
            owner,
            contents,
        });
        Ok(asset)
    }

    fn asset_markup(&self, asset: AssetRef) -> Result<String> {
        if self.fail_markup.get() {
            return Err(Error::StoreError(format!("attachment {asset} has no file")));
        }
        Ok(format!("<a>A{asset}</a>"))
    }
}

#[derive(Default)]
pub struct MockFetcher {
    files: RefCell<HashMap<String, Vec<u8>>>,
    requested: RefCell<Vec<String>>,
}

impl MockFetcher {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn serve(&self, url: &str, body: &[u8]) {
        self.files.borrow_mut().insert(url.to_string(), body.to_vec());
    }

    pub fn requested(&self) -> Vec<String> {
        self.requested.borrow().clone()
    }
}

impl RemoteFetch for MockFetcher {
    fn download(&self, url: &str) -> Result<NamedTempFile> {
        self.requested.borrow_mut().push(url.to_string());
        let files = self.files.borrow();
        let body = files
            .get(url)
            .ok_or_else(|| Error::FetchError(format!("HTTP 404 Not Found from {url}")))?;

        let mut temp = NamedTempFile::new()?;
        temp.write_all(body)?;
        Ok(temp)
    }
}
