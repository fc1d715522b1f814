//! Slice router implementations
//!
//! Each router handles a specific slicing strategy.

use super::types::{SliceRouter, StreamSlice};
use crate::error::{Error, Result};
use crate::stream::RecordReader;
use async_trait::async_trait;
use serde_json::Value;
use tracing::debug;

// ============================================================================
// Whole Slicer
// ============================================================================

/// Yields a single `StreamSlice::Whole`
#[derive(Debug, Clone, Default)]
pub struct WholeSlicer {
    emitted: bool,
}

impl WholeSlicer {
    /// Create a new whole-stream router
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl SliceRouter for WholeSlicer {
    async fn next_slice(&mut self) -> Result<Option<StreamSlice>> {
        if self.emitted {
            return Ok(None);
        }
        self.emitted = true;
        Ok(Some(StreamSlice::Whole))
    }
}

// ============================================================================
// Substream Slicer
// ============================================================================

/// Parent stream-based slice router
///
/// Pulls the parent reader one record at a time and wraps each record,
/// together with the parent slice that produced it, into a child slice.
/// The parent always runs as a full refresh.
pub struct SubstreamSlicer {
    /// Name of the child stream (for errors)
    stream: String,
    /// Reader over the parent stream
    parent: RecordReader,
    /// Field every parent record must carry
    parent_key: String,
    /// Slices produced so far
    produced: u64,
}

impl SubstreamSlicer {
    /// Create a new substream router
    pub fn new(
        stream: impl Into<String>,
        parent: RecordReader,
        parent_key: impl Into<String>,
    ) -> Self {
        Self {
            stream: stream.into(),
            parent,
            parent_key: parent_key.into(),
            produced: 0,
        }
    }

    /// Number of slices produced so far
    pub fn produced(&self) -> u64 {
        self.produced
    }

    /// Check that a parent record carries a usable key
    fn check_key(&self, record: &Value) -> Result<()> {
        let mut current = record;
        for part in self.parent_key.split('.') {
            current = match current.get(part) {
                Some(v) => v,
                None => {
                    return Err(Error::partition(
                        &self.stream,
                        format!(
                            "parent record from '{}' has no '{}' field",
                            self.parent.stream_name(),
                            self.parent_key
                        ),
                    ))
                }
            };
        }

        match current {
            Value::String(s) if !s.is_empty() => Ok(()),
            Value::Number(_) => Ok(()),
            _ => Err(Error::partition(
                &self.stream,
                format!("parent key '{}' is not a string or number", self.parent_key),
            )),
        }
    }
}

#[async_trait]
impl SliceRouter for SubstreamSlicer {
    async fn next_slice(&mut self) -> Result<Option<StreamSlice>> {
        let Some(record) = self.parent.next().await? else {
            debug!(
                "Parent '{}' exhausted after {} slices for '{}'",
                self.parent.stream_name(),
                self.produced,
                self.stream
            );
            return Ok(None);
        };

        self.check_key(&record)?;
        self.produced += 1;

        let sub_parent = self.parent.current_slice().clone();
        Ok(Some(StreamSlice::parent(record, sub_parent)))
    }
}

impl std::fmt::Debug for SubstreamSlicer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SubstreamSlicer")
            .field("stream", &self.stream)
            .field("parent", &self.parent.stream_name())
            .field("parent_key", &self.parent_key)
            .field("produced", &self.produced)
            .finish()
    }
}
