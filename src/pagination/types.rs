//! Pagination types and traits
//!
//! Defines the core pagination abstractions used by all strategies.

use super::strategies::{CursorPaginator, NoPaginator};
use serde_json::Value;
use std::collections::{BTreeMap, HashSet};

/// Default `limit` for cursor pagination (Discord's maximum for guild lists)
pub const DEFAULT_PAGE_SIZE: u32 = 200;

/// Default bound on the number of pages a single reader will fetch
pub const DEFAULT_MAX_PAGES: u32 = 10_000;

/// Result of the next page computation
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NextPage {
    /// More pages available with these parameters
    Continue {
        /// Query parameters to merge into the next request
        query_params: BTreeMap<String, String>,
    },
    /// The computed cursor was already requested; following it would loop
    Stalled {
        /// The repeated cursor
        cursor: String,
    },
    /// No more pages
    Done,
}

impl NextPage {
    /// Create a continuation with a single parameter
    pub fn with_param(key: impl Into<String>, value: impl Into<String>) -> Self {
        let mut params = BTreeMap::new();
        params.insert(key.into(), value.into());
        Self::Continue {
            query_params: params,
        }
    }

    /// Check if this is a done result
    pub fn is_done(&self) -> bool {
        matches!(self, Self::Done)
    }

    /// Check if this is a continue result
    pub fn is_continue(&self) -> bool {
        matches!(self, Self::Continue { .. })
    }
}

/// Configuration for pagination behavior
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum PaginationConfig {
    /// Single request, no cursor
    #[default]
    None,

    /// Cursor derived from the last record of each page
    Cursor {
        /// Query parameter carrying the page size (e.g., "limit")
        limit_param: String,
        /// Page size
        limit: u32,
        /// Query parameter carrying the cursor (e.g., "after")
        cursor_param: String,
        /// Record field the cursor is read from (e.g., "id")
        cursor_field: String,
        /// Stop condition
        stop_condition: StopCondition,
        /// Upper bound on pages fetched by one reader
        max_pages: u32,
    },
}

impl PaginationConfig {
    /// Cursor pagination over `?limit=<limit>&after=<last id>`
    pub fn after_id(limit: u32) -> Self {
        Self::Cursor {
            limit_param: "limit".to_string(),
            limit,
            cursor_param: "after".to_string(),
            cursor_field: "id".to_string(),
            stop_condition: StopCondition::EmptyPage,
            max_pages: DEFAULT_MAX_PAGES,
        }
    }

    /// Replace the stop condition (no-op for `None`)
    #[must_use]
    pub fn with_stop_condition(mut self, condition: StopCondition) -> Self {
        if let Self::Cursor { stop_condition, .. } = &mut self {
            *stop_condition = condition;
        }
        self
    }

    /// Replace the page bound (no-op for `None`)
    #[must_use]
    pub fn with_max_pages(mut self, pages: u32) -> Self {
        if let Self::Cursor { max_pages, .. } = &mut self {
            *max_pages = pages;
        }
        self
    }

    /// Page size, if this config pages at all
    pub fn page_size(&self) -> Option<u32> {
        match self {
            Self::None => None,
            Self::Cursor { limit, .. } => Some(*limit),
        }
    }

    /// Build the paginator this config describes
    pub fn build(&self) -> Box<dyn Paginator> {
        match self {
            Self::None => Box::new(NoPaginator),
            Self::Cursor {
                limit_param,
                limit,
                cursor_param,
                cursor_field,
                stop_condition,
                max_pages,
            } => Box::new(
                CursorPaginator::new(limit_param, *limit, cursor_param, cursor_field)
                    .with_stop_condition(*stop_condition)
                    .with_max_pages(*max_pages),
            ),
        }
    }
}

/// Stop conditions for pagination
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum StopCondition {
    /// Stop only when a page has no records
    #[default]
    EmptyPage,

    /// Also stop when a page has fewer records than the requested limit
    ShortPage,
}

/// Tracks pagination state during iteration
#[derive(Debug, Clone, Default)]
pub struct PaginationState {
    /// Current cursor value
    pub cursor: Option<String>,
    /// Pages processed so far
    pub pages: u32,
    /// Total records fetched so far
    pub total_fetched: u64,
    /// Every cursor already handed out in this iteration
    pub seen_cursors: HashSet<String>,
    /// Is pagination complete?
    pub done: bool,
}

impl PaginationState {
    /// Create a new pagination state
    pub fn new() -> Self {
        Self::default()
    }

    /// Mark pagination as complete
    pub fn mark_done(&mut self) {
        self.done = true;
    }

    /// Count one processed page and its records
    pub fn add_page(&mut self, records: usize) {
        self.pages += 1;
        self.total_fetched += records as u64;
    }

    /// Set cursor; returns false if it was handed out before
    pub fn set_cursor(&mut self, cursor: String) -> bool {
        let fresh = self.seen_cursors.insert(cursor.clone());
        self.cursor = Some(cursor);
        fresh
    }
}

/// Core trait for pagination strategies
pub trait Paginator: Send + Sync {
    /// Query parameters for the next request, given the current state
    fn request_params(&self, state: &PaginationState) -> BTreeMap<String, String>;

    /// Process a decoded page and determine if there's a next page
    fn process_page(&self, records: &[Value], state: &mut PaginationState) -> NextPage;
}

/// Read a cursor value out of a record field
pub fn cursor_from_record(record: &Value, field: &str) -> Option<String> {
    match record.get(field)? {
        Value::String(s) if !s.is_empty() => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}
