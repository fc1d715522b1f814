//! Execution engine module
//!
//! Main read loop and stream orchestration.
//!
//! # Overview
//!
//! The engine module provides:
//! - `SyncEngine` - Builds readers from stream definitions and drives them
//! - `SyncConfig` - Configuration for sync operations
//! - `SyncStats` - Counters for one run
//!
//! One engine is one sync run: it owns the HTTP client and the response
//! cache, both shared by every reader it builds.

mod types;

pub use types::{SyncConfig, SyncStats};

use crate::connector::{Message, MessageStream};
use crate::error::{Error, Result};
use crate::http::HttpClient;
use crate::partition::{PartitionConfig, SliceRouter, SubstreamSlicer, WholeSlicer};
use crate::stream::{Fetcher, HttpStream, RecordReader, ResponseCache, StreamDefinition};
use crate::types::{Record, SyncMode};
use serde_json::Value;
use std::collections::VecDeque;
use std::sync::Arc;
use std::time::Instant;
use tracing::{info, warn};

/// Sync engine for orchestrating data extraction
pub struct SyncEngine {
    /// Shared fetcher (client + per-run cache)
    fetcher: Fetcher,
    /// Stream definitions, in declaration order
    streams: Vec<StreamDefinition>,
    /// Values exposed to path templates as `config.*`
    template_values: Value,
    /// Sync configuration
    config: SyncConfig,
    /// Statistics
    stats: SyncStats,
}

/// A stream being read
struct StreamRun {
    name: String,
    reader: RecordReader,
    count: usize,
    requests_before: u64,
    started: Instant,
}

impl SyncEngine {
    /// Create a new sync engine
    pub fn new(client: HttpClient, streams: Vec<StreamDefinition>) -> Self {
        Self {
            fetcher: Fetcher::new(Arc::new(client)),
            streams,
            template_values: Value::Object(serde_json::Map::new()),
            config: SyncConfig::default(),
            stats: SyncStats::default(),
        }
    }

    /// Set sync configuration
    #[must_use]
    pub fn with_config(mut self, config: SyncConfig) -> Self {
        self.config = config;
        self
    }

    /// Set values exposed to path templates as `config.*`
    #[must_use]
    pub fn with_template_values(mut self, values: Value) -> Self {
        self.template_values = values;
        self
    }

    /// Get statistics
    pub fn stats(&self) -> &SyncStats {
        &self.stats
    }

    /// Reset statistics
    pub fn reset_stats(&mut self) {
        self.stats = SyncStats::default();
    }

    /// The per-run response cache
    pub fn cache(&self) -> &ResponseCache {
        self.fetcher.cache()
    }

    /// Stream definitions
    pub fn definitions(&self) -> &[StreamDefinition] {
        &self.streams
    }

    /// Look up a stream definition by name
    pub fn definition(&self, name: &str) -> Result<&StreamDefinition> {
        self.streams
            .iter()
            .find(|s| s.name == name)
            .ok_or_else(|| Error::stream_not_found(name))
    }

    /// Build a reader for `name`, recursively building parent readers
    ///
    /// Parents always run as full refresh. Only full refresh is supported,
    /// so an incremental request is read as full refresh with a warning.
    pub fn reader(&self, name: &str, mode: SyncMode) -> Result<RecordReader> {
        if mode == SyncMode::Incremental {
            warn!("Stream '{name}' does not support incremental sync; reading full refresh");
        }
        let mut chain = Vec::new();
        self.build_reader(name, &mut chain)
    }

    fn build_reader(&self, name: &str, chain: &mut Vec<String>) -> Result<RecordReader> {
        let definition = self.definition(name)?;

        if chain.iter().any(|n| n == name) {
            chain.push(name.to_string());
            return Err(Error::partition(
                name,
                format!("cyclic parent chain: {}", chain.join(" -> ")),
            ));
        }
        chain.push(name.to_string());

        let slices: Box<dyn SliceRouter> = match &definition.partition {
            PartitionConfig::None => Box::new(WholeSlicer::new()),
            PartitionConfig::Parent {
                parent_stream,
                parent_key,
            } => {
                if !self.streams.iter().any(|s| &s.name == parent_stream) {
                    return Err(Error::partition(
                        name,
                        format!("parent stream '{parent_stream}' is not defined"),
                    ));
                }
                let parent = self.build_reader(parent_stream, chain)?;
                Box::new(SubstreamSlicer::new(name, parent, parent_key))
            }
        };

        chain.pop();

        let stream =
            HttpStream::new(definition.clone()).with_config_values(self.template_values.clone());
        Ok(RecordReader::new(
            Arc::new(stream),
            self.fetcher.clone(),
            slices,
        ))
    }

    fn start(&self, name: &str, mode: SyncMode) -> Result<StreamRun> {
        let reader = self.reader(name, mode)?;
        Ok(StreamRun {
            name: name.to_string(),
            reader,
            count: 0,
            requests_before: self.fetcher.requests(),
            started: Instant::now(),
        })
    }

    async fn pull(&self, run: &mut StreamRun) -> Result<Option<Record>> {
        if self.config.limit_reached(run.count) {
            return Ok(None);
        }
        let record = run.reader.next().await?;
        if record.is_some() {
            run.count += 1;
        }
        Ok(record)
    }

    fn finish(&mut self, run: StreamRun) -> Message {
        let requests = self.fetcher.requests() - run.requests_before;
        self.stats.add_records(run.count);
        self.stats.add_requests(requests);
        self.stats.add_stream();
        self.stats.set_cache_hits(self.fetcher.cache().hits());
        self.stats
            .add_duration(run.started.elapsed().as_millis() as u64);

        info!(
            "Completed sync for {}: {} records, {} requests",
            run.name, run.count, requests
        );
        Message::info(format!(
            "Completed sync for {}: {} records in {} requests",
            run.name, run.count, requests
        ))
    }

    /// Sync a single stream, handing every message to `emit`
    ///
    /// Returns the number of records emitted.
    pub async fn sync_stream<F>(&mut self, name: &str, mode: SyncMode, mut emit: F) -> Result<usize>
    where
        F: FnMut(Message),
    {
        let mut run = match self.start(name, mode) {
            Ok(run) => run,
            Err(e) => {
                self.stats.add_error();
                return Err(e);
            }
        };
        emit(Message::info(format!("Starting sync for stream: {name}")));

        loop {
            match self.pull(&mut run).await {
                Ok(Some(record)) => emit(Message::record(name, record)),
                Ok(None) => break,
                Err(e) => {
                    self.stats.add_error();
                    return Err(e);
                }
            }
        }

        let count = run.count;
        emit(self.finish(run));
        Ok(count)
    }

    /// Read the given streams in order as a lazy message stream
    ///
    /// The first error is yielded and ends the stream.
    pub fn into_messages(self, streams: Vec<(String, SyncMode)>) -> MessageStream {
        let state = ReadState {
            engine: self,
            pending: streams.into(),
            active: None,
            queued: VecDeque::new(),
            failed: false,
        };

        Box::pin(futures::stream::unfold(state, |mut state| async move {
            let item = state.step().await?;
            Some((item, state))
        }))
    }
}

/// State behind `SyncEngine::into_messages`
struct ReadState {
    engine: SyncEngine,
    pending: VecDeque<(String, SyncMode)>,
    active: Option<StreamRun>,
    queued: VecDeque<Message>,
    failed: bool,
}

impl ReadState {
    async fn step(&mut self) -> Option<Result<Message>> {
        loop {
            if let Some(message) = self.queued.pop_front() {
                return Some(Ok(message));
            }
            if self.failed {
                return None;
            }

            let Some(run) = self.active.as_mut() else {
                let (name, mode) = self.pending.pop_front()?;
                match self.engine.start(&name, mode) {
                    Ok(run) => {
                        self.active = Some(run);
                        self.queued
                            .push_back(Message::info(format!("Starting sync for stream: {name}")));
                    }
                    Err(e) => return Some(self.fail(e)),
                }
                continue;
            };

            match self.engine.pull(run).await {
                Ok(Some(record)) => return Some(Ok(Message::record(&run.name, record))),
                Ok(None) => {
                    if let Some(run) = self.active.take() {
                        let done = self.engine.finish(run);
                        self.queued.push_back(done);
                    }
                }
                Err(e) => return Some(self.fail(e)),
            }
        }
    }

    fn fail(&mut self, error: Error) -> Result<Message> {
        self.failed = true;
        self.active = None;
        self.engine.stats.add_error();
        Err(error)
    }
}
