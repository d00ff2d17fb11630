// src/migrate/traits.rs

//! Collaborator interfaces the migration core depends on
//!
//! The driver, resolver and importer receive these as borrowed trait objects
//! at construction. `crate::db::SqliteStore` implements the three store
//! traits, `super::fetch::HttpFetcher` implements [`RemoteFetch`].

use crate::error::Result;
use std::path::Path;
use tempfile::NamedTempFile;

use super::shortcode::ShortcodeKind;
use super::types::{
    AssetRef, ContentRecord, GalleryEntry, LegacyPictureId, PictureEntry, RecordId,
};

/// Storage of the content records being rewritten
pub trait ContentStore {
    /// Records whose body may contain a `kind` marker, with id greater than
    /// `after`, ordered by id ascending, at most `limit` of them.
    fn query_records_matching(
        &self,
        kind: ShortcodeKind,
        after: Option<RecordId>,
        limit: usize,
    ) -> Result<Vec<ContentRecord>>;

    /// Overwrite the stored body of `record`.
    ///
    /// Returns `Error::StoreError` when the record no longer exists.
    fn persist(&self, record: &ContentRecord) -> Result<()>;
}

/// Read access to the legacy gallery tables
pub trait PictureStore {
    fn get_picture(&self, id: LegacyPictureId) -> Result<Option<PictureEntry>>;

    fn get_gallery(&self, gallery_id: i64) -> Result<Option<GalleryEntry>>;
}

/// Native media library
pub trait MediaStore {
    /// Register the file at `temp_path` as a new asset owned by `owner`.
    fn create_asset_from_file(
        &self,
        temp_path: &Path,
        original_filename: &str,
        owner: RecordId,
    ) -> Result<AssetRef>;

    /// Display markup that replaces a marker for `asset`
    fn asset_markup(&self, asset: AssetRef) -> Result<String>;
}

/// Remote file transport
pub trait RemoteFetch {
    /// Download `url` into a temporary file that is removed on drop.
    fn download(&self, url: &str) -> Result<NamedTempFile>;
}
