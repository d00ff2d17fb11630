// src/migrate/paginator.rs

//! Paged scan over content records holding shortcode markers
//!
//! Pages are requested by keyset (`id > last id seen`, ascending), so
//! rewriting records that were already handed out never shifts the next
//! page: a record that stops matching after its rewrite is simply behind
//! the cursor.
//!
//! Each query asks for one row more than a page. The extra row is dropped
//! and only signals that another page exists, so K matching records at page
//! size P cost exactly ceil(K / P) queries.

use crate::error::Result;
use std::collections::VecDeque;
use tracing::info;

use super::shortcode::ShortcodeKind;
use super::traits::ContentStore;
use super::types::{ContentRecord, RecordId};

pub struct RecordPaginator<'a> {
    store: &'a dyn ContentStore,
    kind: ShortcodeKind,
    page_size: usize,
    buffer: VecDeque<ContentRecord>,
    /// Highest record id handed to the buffer so far
    last_id: Option<RecordId>,
    /// Advances by exactly one page size per fetch
    offset: usize,
    pages_fetched: usize,
    exhausted: bool,
}

impl<'a> RecordPaginator<'a> {
    pub fn new(store: &'a dyn ContentStore, kind: ShortcodeKind, page_size: usize) -> Self {
        Self {
            store,
            kind,
            page_size: page_size.max(1),
            buffer: VecDeque::new(),
            last_id: None,
            offset: 0,
            pages_fetched: 0,
            exhausted: false,
        }
    }

    /// Next record, or `None` once the store has no more matches.
    ///
    /// An empty buffer triggers at most one page fetch per call.
    pub fn next_record(&mut self) -> Result<Option<ContentRecord>> {
        if self.buffer.is_empty() && !self.exhausted {
            self.fetch_page()?;
        }
        Ok(self.buffer.pop_front())
    }

    pub fn pages_fetched(&self) -> usize {
        self.pages_fetched
    }

    pub fn offset(&self) -> usize {
        self.offset
    }

    fn fetch_page(&mut self) -> Result<()> {
        let mut page =
            self.store
                .query_records_matching(self.kind, self.last_id, self.page_size + 1)?;
        self.pages_fetched += 1;
        self.offset += self.page_size;

        if page.len() > self.page_size {
            page.truncate(self.page_size);
        } else {
            self.exhausted = true;
        }

        info!("Fetched {} records with shortcodes.", page.len());

        if let Some(last) = page.last() {
            self.last_id = Some(last.id);
        }
        self.buffer.extend(page);
        Ok(())
    }
}
