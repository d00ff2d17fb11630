// src/migrate/cache.rs

//! Run-scoped cache of resolved legacy pictures

use std::collections::HashMap;
use std::collections::hash_map::Entry;

use super::types::{AssetRef, LegacyPictureId, LegacyPictureRef};

/// Outcome recorded for a legacy picture id
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CacheEntry {
    /// Imported as `asset`; `markup` replaces every marker for this id
    Imported { asset: AssetRef, markup: String },
    /// Resolved but not imported (dry run)
    Planned(LegacyPictureRef),
    /// Resolution or import failed; the reason is kept for later warnings
    Failed(String),
}

/// Legacy picture id -> outcome, at most one entry per id.
///
/// Entries are never replaced, so every record referencing an id within a
/// run sees the same asset.
#[derive(Debug, Default)]
pub struct ResolutionCache {
    entries: HashMap<LegacyPictureId, CacheEntry>,
}

impl ResolutionCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, id: LegacyPictureId) -> Option<&CacheEntry> {
        self.entries.get(&id)
    }

    /// Store the outcome for `id` unless one exists; returns the stored entry.
    pub fn insert(&mut self, id: LegacyPictureId, entry: CacheEntry) -> &CacheEntry {
        match self.entries.entry(id) {
            Entry::Occupied(existing) => existing.into_mut(),
            Entry::Vacant(slot) => slot.insert(entry),
        }
    }

    pub fn imported_count(&self) -> usize {
        self.entries
            .values()
            .filter(|e| matches!(e, CacheEntry::Imported { .. }))
            .count()
    }
}
