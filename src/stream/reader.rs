//! Pull-based record reader

use super::cache::Fetcher;
use super::types::Stream;
use crate::error::{Error, Result};
use crate::pagination::{NextPage, PaginationState};
use crate::partition::{SliceRouter, StreamSlice};
use crate::types::Record;
use std::collections::VecDeque;
use std::sync::Arc;
use tracing::{debug, warn};

/// Reads the records of one stream, one at a time
///
/// For each slice the reader paginates until the paginator reports `Done`,
/// then asks the router for the next slice. At most one page is buffered.
pub struct RecordReader {
    stream: Arc<dyn Stream>,
    fetcher: Fetcher,
    slices: Box<dyn SliceRouter>,
    current_slice: StreamSlice,
    state: PaginationState,
    buffer: VecDeque<Record>,
    slice_active: bool,
    exhausted: bool,
    records: u64,
    pages: u64,
}

impl RecordReader {
    /// Create a reader over `stream`, iterating the slices of `slices`
    pub fn new(stream: Arc<dyn Stream>, fetcher: Fetcher, slices: Box<dyn SliceRouter>) -> Self {
        Self {
            stream,
            fetcher,
            slices,
            current_slice: StreamSlice::Whole,
            state: PaginationState::new(),
            buffer: VecDeque::new(),
            slice_active: false,
            exhausted: false,
            records: 0,
            pages: 0,
        }
    }

    /// Name of the stream being read
    pub fn stream_name(&self) -> &str {
        self.stream.name()
    }

    /// Slice that produced the most recently returned record
    pub fn current_slice(&self) -> &StreamSlice {
        &self.current_slice
    }

    /// Records returned so far
    pub fn records(&self) -> u64 {
        self.records
    }

    /// Pages fetched so far
    pub fn pages(&self) -> u64 {
        self.pages
    }

    /// Next record, or `None` once every slice is drained
    ///
    /// Any error ends the iteration; subsequent calls return `None`.
    pub async fn next(&mut self) -> Result<Option<Record>> {
        loop {
            if let Some(record) = self.buffer.pop_front() {
                self.records += 1;
                return Ok(Some(record));
            }

            if self.exhausted {
                return Ok(None);
            }

            if !self.slice_active {
                match self.slices.next_slice().await {
                    Ok(Some(slice)) => {
                        self.current_slice = slice;
                        self.state = PaginationState::new();
                        self.slice_active = true;
                    }
                    Ok(None) => {
                        self.exhausted = true;
                        debug!(
                            "Stream '{}' done: {} records in {} pages",
                            self.stream.name(),
                            self.records,
                            self.pages
                        );
                        return Ok(None);
                    }
                    Err(e) => {
                        self.exhausted = true;
                        return Err(e);
                    }
                }
            }

            if let Err(e) = self.fetch_page().await {
                self.exhausted = true;
                return Err(e);
            }
        }
    }

    /// Fetch one page of the current slice into the buffer
    async fn fetch_page(&mut self) -> Result<()> {
        let request = self.stream.build_request(&self.current_slice, &self.state)?;
        let body = self.fetcher.fetch(&request, self.stream.use_cache()).await?;
        self.pages += 1;

        let (records, next) = self.stream.parse_page(&body, &mut self.state);
        debug!(
            "Stream '{}' page {}: {} records",
            self.stream.name(),
            self.state.pages,
            records.len()
        );

        match next {
            NextPage::Continue { .. } => {}
            NextPage::Done => self.slice_active = false,
            NextPage::Stalled { cursor } => {
                warn!(
                    "Stream '{}' returned cursor '{cursor}' twice",
                    self.stream.name()
                );
                return Err(Error::PaginationLoop {
                    stream: self.stream.name().to_string(),
                    cursor,
                });
            }
        }

        self.buffer.extend(records);
        Ok(())
    }
}

impl std::fmt::Debug for RecordReader {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RecordReader")
            .field("stream", &self.stream.name())
            .field("current_slice", &self.current_slice)
            .field("records", &self.records)
            .field("pages", &self.pages)
            .field("exhausted", &self.exhausted)
            .finish_non_exhaustive()
    }
}
