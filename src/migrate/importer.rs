// src/migrate/importer.rs

//! Media import: obtain a legacy picture file and register it as an asset
//!
//! Two strategies, chosen by the run's [`SourceLocation`]:
//! - remote: download `base_url/<path>`
//! - local: copy `root/<path>`
//!
//! Both land in a temporary file that is handed to the media store and
//! removed once the import returns.

use crate::error::{Error, Result};
use std::fs::File;
use std::io::{self, Read, Write};
use tempfile::NamedTempFile;
use tracing::debug;

use super::traits::{MediaStore, RemoteFetch};
use super::types::{AssetRef, LegacyPictureRef, MigrationContext, RecordId, SourceLocation};

/// Buffer size for copying local pictures (8 KB)
const COPY_BUFFER_SIZE: usize = 8192;

pub struct MediaImporter<'a> {
    media: &'a dyn MediaStore,
    fetcher: Option<&'a dyn RemoteFetch>,
}

impl<'a> MediaImporter<'a> {
    /// `fetcher` is only consulted for remote sources.
    pub fn new(media: &'a dyn MediaStore, fetcher: Option<&'a dyn RemoteFetch>) -> Self {
        Self { media, fetcher }
    }

    pub fn import(
        &self,
        picture: &LegacyPictureRef,
        owner: RecordId,
        context: &MigrationContext,
    ) -> Result<AssetRef> {
        let temp = match context.source() {
            SourceLocation::Remote { base_url } => self.fetch_remote(base_url, picture.path())?,
            SourceLocation::Local { root } => copy_local(&root.join(picture.path()))?,
        };

        self.media
            .create_asset_from_file(temp.path(), picture.filename(), owner)
    }

    /// Display markup for an imported asset
    pub fn markup(&self, asset: AssetRef) -> Result<String> {
        self.media.asset_markup(asset)
    }

    fn fetch_remote(&self, base_url: &str, path: &str) -> Result<NamedTempFile> {
        let fetcher = self.fetcher.ok_or_else(|| {
            Error::InitError("remote source configured without an HTTP fetcher".to_string())
        })?;
        let url = format!(
            "{}/{}",
            base_url.trim_end_matches('/'),
            path.trim_start_matches('/')
        );
        fetcher.download(&url)
    }
}

fn copy_local(source: &std::path::Path) -> Result<NamedTempFile> {
    debug!("Copying local picture {}", source.display());

    let mut input = File::open(source).map_err(|e| match e.kind() {
        io::ErrorKind::NotFound => Error::FileNotFoundError(source.display().to_string()),
        _ => Error::SourceReadError(format!("{}: {e}", source.display())),
    })?;

    let mut temp = NamedTempFile::new()
        .map_err(|e| Error::IoError(format!("Failed to create temp file: {e}")))?;

    // Read errors belong to the source picture, write errors to the temp file.
    let mut buffer = [0u8; COPY_BUFFER_SIZE];
    loop {
        let bytes_read = input
            .read(&mut buffer)
            .map_err(|e| Error::SourceReadError(format!("{}: {e}", source.display())))?;
        if bytes_read == 0 {
            break;
        }
        temp.write_all(&buffer[..bytes_read])
            .map_err(|e| Error::IoError(format!("Failed to write temp file: {e}")))?;
    }
    temp.flush()
        .map_err(|e| Error::IoError(format!("Failed to flush temp file: {e}")))?;

    Ok(temp)
}
