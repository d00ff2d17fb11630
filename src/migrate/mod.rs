// src/migrate/mod.rs

//! Shortcode migration core
//!
//! Scans content records for legacy `[singlepic=<id> ...]` markers, imports
//! each referenced picture once into the media library, and replaces every
//! marker with the asset's display markup. Storage and network access go
//! through the traits in [`traits`], so the core runs unchanged against
//! SQLite, HTTP, or in-memory fakes.

mod cache;
mod driver;
mod fetch;
mod importer;
mod paginator;
mod resolver;
mod shortcode;
mod traits;
mod types;

#[cfg(test)]
pub(crate) mod mock;

pub use cache::{CacheEntry, ResolutionCache};
pub use driver::{Collaborators, DriverState, MigrationDriver, MigrationSummary};
pub use fetch::{DEFAULT_HTTP_TIMEOUT, HttpFetcher};
pub use importer::MediaImporter;
pub use paginator::RecordPaginator;
pub use resolver::PictureResolver;
pub use shortcode::{ShortcodeExtractor, ShortcodeKind};
pub use traits::{ContentStore, MediaStore, PictureStore, RemoteFetch};
pub use types::{
    AssetRef, ContentRecord, DEFAULT_PAGE_SIZE, GalleryEntry, LegacyPictureId, LegacyPictureRef,
    MigrationContext, PictureEntry, RecordId, RecordKind, SourceLocation,
};
