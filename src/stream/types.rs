//! Stream types and traits

use crate::error::Result;
use crate::http::RequestConfig;
use crate::pagination::{NextPage, PaginationConfig, PaginationState};
use crate::partition::{PartitionConfig, StreamSlice};
use crate::types::Record;
use serde_json::Value;
use std::collections::BTreeMap;
use std::fmt;

// ============================================================================
// Stream Definition
// ============================================================================

/// Declarative description of one HTTP stream
#[derive(Debug, Clone, PartialEq)]
pub struct StreamDefinition {
    /// Stream name
    pub name: String,
    /// Request path, relative to the API base; may contain `{{ }}` templates
    pub path: String,
    /// Primary key fields
    pub primary_key: Vec<String>,
    /// Field holding the records; `None` takes the whole body
    pub data_field: Option<String>,
    /// Pagination strategy
    pub pagination: PaginationConfig,
    /// Slice derivation
    pub partition: PartitionConfig,
    /// Memoize responses for the rest of the run
    pub use_cache: bool,
}

impl StreamDefinition {
    /// Create an unpaginated, unsliced stream
    pub fn new(name: impl Into<String>, path: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            path: path.into(),
            primary_key: vec!["id".to_string()],
            data_field: None,
            pagination: PaginationConfig::None,
            partition: PartitionConfig::None,
            use_cache: false,
        }
    }

    /// Read records from a field of the body
    #[must_use]
    pub fn with_data_field(mut self, field: impl Into<String>) -> Self {
        self.data_field = Some(field.into());
        self
    }

    /// Set the pagination strategy
    #[must_use]
    pub fn with_pagination(mut self, pagination: PaginationConfig) -> Self {
        self.pagination = pagination;
        self
    }

    /// Derive one slice per record of `parent`
    #[must_use]
    pub fn child_of(mut self, parent: impl Into<String>, parent_key: impl Into<String>) -> Self {
        self.partition = PartitionConfig::parent(parent, parent_key);
        self
    }

    /// Opt into the per-run response cache
    #[must_use]
    pub fn cacheable(mut self) -> Self {
        self.use_cache = true;
        self
    }

    /// Name of the parent stream, if any
    pub fn parent(&self) -> Option<&str> {
        self.partition.parent_stream()
    }
}

// ============================================================================
// Request
// ============================================================================

/// A fully rendered GET request
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Request {
    /// Path relative to the API base
    pub path: String,
    /// Query parameters
    pub query: BTreeMap<String, String>,
}

impl Request {
    /// Create a request without query parameters
    pub fn new(path: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            query: BTreeMap::new(),
        }
    }

    /// Add query parameters
    #[must_use]
    pub fn with_query(mut self, query: BTreeMap<String, String>) -> Self {
        self.query.extend(query);
        self
    }

    /// Cache key for this request
    pub fn signature(&self) -> RequestSignature {
        let mut key = self.path.trim_start_matches('/').to_string();
        if !self.query.is_empty() {
            let query: Vec<String> = self.query.iter().map(|(k, v)| format!("{k}={v}")).collect();
            key.push('?');
            key.push_str(&query.join("&"));
        }
        RequestSignature(key)
    }

    /// Convert to a client request config
    pub fn to_request_config(&self) -> RequestConfig {
        RequestConfig {
            query: self.query.clone(),
            ..RequestConfig::default()
        }
    }
}

/// Identity of a request: path plus sorted query
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct RequestSignature(String);

impl RequestSignature {
    /// The signature as a string
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for RequestSignature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

// ============================================================================
// Stream Trait
// ============================================================================

/// Request-building and page-parsing capabilities of a stream
///
/// Readers call `build_request` before every fetch and `parse_page` after
/// it. Neither performs I/O.
pub trait Stream: Send + Sync {
    /// Stream name
    fn name(&self) -> &str;

    /// Whether responses go through the per-run cache
    fn use_cache(&self) -> bool {
        false
    }

    /// Build the request for the current slice and pagination state
    fn build_request(&self, slice: &StreamSlice, state: &PaginationState) -> Result<Request>;

    /// Decode a response body into records and decide whether to continue
    fn parse_page(&self, body: &Value, state: &mut PaginationState) -> (Vec<Record>, NextPage);
}
