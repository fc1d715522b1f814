//! Partition types and traits
//!
//! Defines the slice abstractions streams iterate over.

use crate::error::Result;
use crate::types::Record;
use async_trait::async_trait;
use serde_json::{json, Value};

/// One unit of addressable work within a stream
#[derive(Debug, Clone, Default, PartialEq)]
pub enum StreamSlice {
    /// The stream is not sliced; a single slice covers everything
    #[default]
    Whole,
    /// One parent record of a dependent stream
    Parent(ParentSlice),
}

/// Slice of a child stream: the parent record it was derived from and the
/// parent-stream slice that produced that record
#[derive(Debug, Clone, PartialEq)]
pub struct ParentSlice {
    /// Parent record
    pub parent: Record,
    /// Slice of the parent stream that emitted `parent`
    pub sub_parent: Box<StreamSlice>,
}

impl StreamSlice {
    /// Create a parent slice
    pub fn parent(parent: Record, sub_parent: StreamSlice) -> Self {
        Self::Parent(ParentSlice {
            parent,
            sub_parent: Box::new(sub_parent),
        })
    }

    /// The parent record, for child slices
    pub fn parent_record(&self) -> Option<&Record> {
        match self {
            Self::Whole => None,
            Self::Parent(p) => Some(&p.parent),
        }
    }

    /// JSON view used for template rendering and logging
    ///
    /// `Whole` is `{}`; a parent slice is `{"parent": .., "sub_parent": ..}`.
    pub fn to_json(&self) -> Value {
        match self {
            Self::Whole => json!({}),
            Self::Parent(p) => json!({
                "parent": p.parent,
                "sub_parent": p.sub_parent.to_json(),
            }),
        }
    }
}

/// How a stream derives its slices
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum PartitionConfig {
    /// No partitioning
    #[default]
    None,

    /// One slice per record of another stream
    Parent {
        /// Name of the parent stream
        parent_stream: String,
        /// Field every parent record must carry (e.g., "id")
        parent_key: String,
    },
}

impl PartitionConfig {
    /// Create parent-based partition config
    pub fn parent(parent_stream: impl Into<String>, parent_key: impl Into<String>) -> Self {
        Self::Parent {
            parent_stream: parent_stream.into(),
            parent_key: parent_key.into(),
        }
    }

    /// Name of the parent stream, if any
    pub fn parent_stream(&self) -> Option<&str> {
        match self {
            Self::None => None,
            Self::Parent { parent_stream, .. } => Some(parent_stream),
        }
    }
}

/// Pull-based source of slices
///
/// `next_slice` is the only suspension point between a child stream and its
/// parent: each call advances the parent by at most one record.
#[async_trait]
pub trait SliceRouter: Send {
    /// Produce the next slice, or `None` once exhausted
    async fn next_slice(&mut self) -> Result<Option<StreamSlice>>;
}
