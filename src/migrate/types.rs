// src/migrate/types.rs

//! Typed values flowing through a migration run

use crate::error::{Error, Result};
use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;

use super::shortcode::ShortcodeKind;

/// Default number of records loaded per page
pub const DEFAULT_PAGE_SIZE: usize = 1000;

/// Identifier of a content record in the content store
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct RecordId(pub i64);

impl fmt::Display for RecordId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Identifier of a picture in the legacy gallery
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct LegacyPictureId(pub i64);

impl fmt::Display for LegacyPictureId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Identifier of a native media asset created by the media store
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct AssetRef(pub i64);

impl fmt::Display for AssetRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Kinds of content records eligible for migration
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecordKind {
    Post,
    Page,
}

impl RecordKind {
    pub const ALL: [RecordKind; 2] = [RecordKind::Post, RecordKind::Page];

    pub fn as_str(&self) -> &'static str {
        match self {
            RecordKind::Post => "post",
            RecordKind::Page => "page",
        }
    }
}

impl FromStr for RecordKind {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s {
            "post" => Ok(RecordKind::Post),
            "page" => Ok(RecordKind::Page),
            _ => Err(format!("Invalid record kind: {s}")),
        }
    }
}

/// In-memory copy of a content record for one processing cycle
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContentRecord {
    pub id: RecordId,
    pub kind: RecordKind,
    pub body: String,
}

impl ContentRecord {
    pub fn new(id: RecordId, kind: RecordKind, body: impl Into<String>) -> Self {
        Self {
            id,
            kind,
            body: body.into(),
        }
    }
}

/// Picture row as returned by the legacy picture store
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PictureEntry {
    pub gallery_id: i64,
    pub filename: String,
}

/// Gallery row as returned by the legacy picture store
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GalleryEntry {
    pub path: String,
}

/// A legacy picture resolved to a path relative to the storage root
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LegacyPictureRef {
    id: LegacyPictureId,
    path: String,
}

impl LegacyPictureRef {
    /// Join a gallery path and a file name.
    ///
    /// Fails when the file name is empty: such a row cannot point at a file.
    pub fn new(id: LegacyPictureId, gallery_path: &str, filename: &str) -> Result<Self> {
        let filename = filename.trim_start_matches('/');
        if filename.is_empty() {
            return Err(Error::NotFoundError(format!(
                "legacy picture {id} has no file name"
            )));
        }

        let prefix = gallery_path.trim_end_matches('/');
        let path = if prefix.is_empty() {
            filename.to_string()
        } else {
            format!("{prefix}/{filename}")
        };

        Ok(Self { id, path })
    }

    pub fn id(&self) -> LegacyPictureId {
        self.id
    }

    pub fn path(&self) -> &str {
        &self.path
    }

    /// Last path segment, used as the original file name of the new asset
    pub fn filename(&self) -> &str {
        self.path.rsplit('/').next().unwrap_or(&self.path)
    }
}

/// Where source files are read from
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SourceLocation {
    /// Download from `base_url/<path>`
    Remote { base_url: String },
    /// Copy from `root/<path>`
    Local { root: PathBuf },
}

/// Run-scoped settings, fixed once the run starts
#[derive(Debug, Clone)]
pub struct MigrationContext {
    limit_records: usize,
    source: SourceLocation,
    page_size: usize,
    kind: ShortcodeKind,
    dry_run: bool,
}

impl MigrationContext {
    /// Create a context. A base URL selects remote downloads, otherwise
    /// files are copied from `storage_root`.
    pub fn new(limit_records: usize, source_base_url: Option<String>, storage_root: PathBuf) -> Self {
        let source = match source_base_url {
            Some(base_url) if !base_url.trim().is_empty() => SourceLocation::Remote {
                base_url: base_url.trim_end_matches('/').to_string(),
            },
            _ => SourceLocation::Local { root: storage_root },
        };

        Self {
            limit_records,
            source,
            page_size: DEFAULT_PAGE_SIZE,
            kind: ShortcodeKind::SinglePic,
            dry_run: false,
        }
    }

    pub fn with_page_size(mut self, page_size: usize) -> Self {
        self.page_size = page_size.max(1);
        self
    }

    pub fn with_kind(mut self, kind: ShortcodeKind) -> Self {
        self.kind = kind;
        self
    }

    pub fn with_dry_run(mut self, dry_run: bool) -> Self {
        self.dry_run = dry_run;
        self
    }

    /// 0 means unlimited
    pub fn limit_records(&self) -> usize {
        self.limit_records
    }

    pub fn source(&self) -> &SourceLocation {
        &self.source
    }

    pub fn page_size(&self) -> usize {
        self.page_size
    }

    pub fn kind(&self) -> ShortcodeKind {
        self.kind
    }

    pub fn dry_run(&self) -> bool {
        self.dry_run
    }

    /// Whether `processed` records exhaust the configured limit
    pub fn limit_reached(&self, processed: usize) -> bool {
        self.limit_records > 0 && processed >= self.limit_records
    }
}
