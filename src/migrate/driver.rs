// src/migrate/driver.rs

//! Migration driver: pulls records, resolves and imports pictures, rewrites
//! bodies and writes them back
//!
//! One record is processed completely before the next one is fetched:
//!
//! ```text
//! Init -> Fetching -> Processing -> Rewriting -> Persisting -> Fetching ... -> Done
//! ```
//!
//! Per-shortcode failures leave that marker in place, per-record persist
//! failures skip the record; both are logged and counted. Anything else
//! ends the run with an error.

use crate::error::{Error, Result};
use crate::progress::ProgressTracker;
use std::collections::HashMap;
use std::fmt;
use tracing::{debug, error, info, warn};

use super::cache::{CacheEntry, ResolutionCache};
use super::importer::MediaImporter;
use super::paginator::RecordPaginator;
use super::resolver::PictureResolver;
use super::shortcode::ShortcodeExtractor;
use super::traits::{ContentStore, MediaStore, PictureStore, RemoteFetch};
use super::types::{ContentRecord, LegacyPictureId, MigrationContext, RecordId, SourceLocation};

/// Where the driver is in its run
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DriverState {
    Init,
    Fetching,
    Processing,
    Rewriting,
    Persisting,
    Done,
}

/// External collaborators handed to the driver
#[derive(Clone, Copy)]
pub struct Collaborators<'a> {
    pub content: &'a dyn ContentStore,
    pub pictures: &'a dyn PictureStore,
    pub media: &'a dyn MediaStore,
    /// Required when the context selects a remote source
    pub fetcher: Option<&'a dyn RemoteFetch>,
}

/// Counts reported when a run finishes
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MigrationSummary {
    /// Records pulled from the paginator and processed
    pub records_processed: usize,
    /// Records written back (or that would be, in a dry run)
    pub records_updated: usize,
    /// Markers replaced across all records
    pub markers_replaced: usize,
    pub assets_imported: usize,
    /// Assets created whose markup could not be obtained; their markers
    /// stay in place and the attachment is left unreferenced
    pub orphaned_assets: usize,
    /// Marker occurrences left in place because their picture failed
    pub shortcode_failures: usize,
    /// Records whose rewritten body could not be stored
    pub persist_failures: usize,
    pub limit_reached: bool,
    pub dry_run: bool,
}

impl MigrationSummary {
    pub fn has_failures(&self) -> bool {
        self.shortcode_failures > 0 || self.persist_failures > 0 || self.orphaned_assets > 0
    }
}

impl fmt::Display for MigrationSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let verb = if self.dry_run { "would update" } else { "updated" };
        write!(
            f,
            "{} records processed, {} {}, {} markers replaced, {} assets imported, \
             {} orphaned assets, {} shortcode failures, {} persist failures",
            self.records_processed,
            verb,
            self.records_updated,
            self.markers_replaced,
            self.assets_imported,
            self.orphaned_assets,
            self.shortcode_failures,
            self.persist_failures
        )
    }
}

pub struct MigrationDriver<'a> {
    context: MigrationContext,
    extractor: ShortcodeExtractor,
    paginator: RecordPaginator<'a>,
    resolver: PictureResolver<'a>,
    importer: MediaImporter<'a>,
    content: &'a dyn ContentStore,
    progress: &'a dyn ProgressTracker,
    cache: ResolutionCache,
    state: DriverState,
    summary: MigrationSummary,
}

impl<'a> MigrationDriver<'a> {
    pub fn new(
        context: MigrationContext,
        collaborators: Collaborators<'a>,
        progress: &'a dyn ProgressTracker,
    ) -> Result<Self> {
        if matches!(context.source(), SourceLocation::Remote { .. })
            && collaborators.fetcher.is_none()
        {
            return Err(Error::InitError(
                "remote source configured without an HTTP fetcher".to_string(),
            ));
        }

        let extractor = ShortcodeExtractor::new(context.kind())?;
        let paginator =
            RecordPaginator::new(collaborators.content, context.kind(), context.page_size());
        let summary = MigrationSummary {
            dry_run: context.dry_run(),
            ..Default::default()
        };

        Ok(Self {
            extractor,
            paginator,
            resolver: PictureResolver::new(collaborators.pictures),
            importer: MediaImporter::new(collaborators.media, collaborators.fetcher),
            content: collaborators.content,
            progress,
            cache: ResolutionCache::new(),
            state: DriverState::Init,
            summary,
            context,
        })
    }

    pub fn state(&self) -> DriverState {
        self.state
    }

    pub fn cache(&self) -> &ResolutionCache {
        &self.cache
    }

    /// Run until the paginator is exhausted or the record limit is hit.
    pub fn run(&mut self) -> Result<MigrationSummary> {
        match self.run_loop() {
            Ok(()) => {
                self.state = DriverState::Done;
                debug!(
                    "{} pages fetched (offset {}), {} pictures imported",
                    self.paginator.pages_fetched(),
                    self.paginator.offset(),
                    self.cache.imported_count()
                );
                self.progress.finish_with_message("Done.");
                Ok(self.summary.clone())
            }
            Err(e) => {
                self.state = DriverState::Done;
                self.progress.finish_with_error(&e.to_string());
                Err(e)
            }
        }
    }

    fn run_loop(&mut self) -> Result<()> {
        loop {
            self.state = DriverState::Fetching;
            let Some(mut record) = self.paginator.next_record()? else {
                return Ok(());
            };

            self.state = DriverState::Processing;
            self.process_record(&mut record)?;

            self.summary.records_processed += 1;
            self.progress.increment(1);

            if self.context.limit_reached(self.summary.records_processed) {
                info!("Reached limit-records threshold. Halting.");
                self.summary.limit_reached = true;
                return Ok(());
            }
        }
    }

    fn process_record(&mut self, record: &mut ContentRecord) -> Result<()> {
        let ids = self.extractor.extract(&record.body);
        info!("Record {}: {} shortcode matches.", record.id, ids.len());
        self.progress.set_message(&format!("record {}", record.id));

        if ids.is_empty() {
            return Ok(());
        }

        let mut replacements = HashMap::new();
        for id in self.extractor.unique_ids(&record.body) {
            if let Some(markup) = self.markup_for(id, record.id)? {
                replacements.insert(id, markup);
            }
        }

        let failed = ids
            .iter()
            .filter(|id| matches!(self.cache.get(**id), Some(CacheEntry::Failed(_))))
            .count();
        self.summary.shortcode_failures += failed;

        if self.context.dry_run() {
            let planned = ids
                .iter()
                .filter(|id| matches!(self.cache.get(**id), Some(CacheEntry::Planned(_))))
                .count();
            if planned > 0 {
                info!("Record {}: would replace {} markers", record.id, planned);
                self.summary.markers_replaced += planned;
                self.summary.records_updated += 1;
            }
            return Ok(());
        }

        self.state = DriverState::Rewriting;
        let (body, replaced) = self.extractor.rewrite(&record.body, &replacements);
        if replaced == 0 {
            return Ok(());
        }

        self.state = DriverState::Persisting;
        record.body = body;
        match self.content.persist(record) {
            Ok(()) => {
                info!("Record {}: replaced {} markers", record.id, replaced);
                self.summary.markers_replaced += replaced;
                self.summary.records_updated += 1;
            }
            Err(e) if e.is_record_recoverable() => {
                warn!("Record {}: rewritten body not saved: {}", record.id, e);
                self.summary.persist_failures += 1;
            }
            Err(e) => {
                return Err(Error::RecordFailed {
                    record: record.id.0,
                    source: Box::new(e),
                });
            }
        }

        Ok(())
    }

    /// Markup replacing every marker for `id`, or `None` when the marker has
    /// to stay. Only the first request for an id reaches the resolver and
    /// importer.
    fn markup_for(&mut self, id: LegacyPictureId, owner: RecordId) -> Result<Option<String>> {
        if let Some(entry) = self.cache.get(id) {
            return Ok(match entry {
                CacheEntry::Imported { markup, .. } => Some(markup.clone()),
                CacheEntry::Planned(_) => None,
                CacheEntry::Failed(reason) => {
                    warn!(
                        "\tshortcode {} in record {}: left unchanged ({})",
                        id, owner, reason
                    );
                    None
                }
            });
        }

        let entry = match self.resolve_and_import(id, owner) {
            Ok(entry) => entry,
            Err(e) if e.is_shortcode_recoverable() => {
                warn!(
                    "\tshortcode {} in record {}: could not import picture: {}",
                    id, owner, e
                );
                CacheEntry::Failed(e.to_string())
            }
            Err(e) => {
                error!("\tshortcode {} in record {}: {}", id, owner, e);
                return Err(Error::ShortcodeFailed {
                    record: owner.0,
                    picture: id.0,
                    source: Box::new(e),
                });
            }
        };

        Ok(match self.cache.insert(id, entry) {
            CacheEntry::Imported { markup, .. } => Some(markup.clone()),
            _ => None,
        })
    }

    fn resolve_and_import(&mut self, id: LegacyPictureId, owner: RecordId) -> Result<CacheEntry> {
        let picture = self.resolver.resolve(id)?;

        if self.context.dry_run() {
            info!("\tshortcode {}; would import {}", id, picture.path());
            return Ok(CacheEntry::Planned(picture));
        }

        let asset = self.importer.import(&picture, owner, &self.context)?;
        let markup = match self.importer.markup(asset) {
            Ok(markup) => markup,
            Err(e) => {
                warn!(
                    "\tshortcode {}: asset {} was created but has no markup",
                    id, asset
                );
                self.summary.orphaned_assets += 1;
                return Err(e);
            }
        };

        self.summary.assets_imported += 1;
        info!("\tshortcode {}; attached: {}", id, asset);
        Ok(CacheEntry::Imported { asset, markup })
    }
}
