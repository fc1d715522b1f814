//! Pagination strategy implementations
//!
//! Each strategy handles a specific pagination pattern.

use super::types::{
    cursor_from_record, NextPage, PaginationState, Paginator, StopCondition, DEFAULT_MAX_PAGES,
};
use serde_json::Value;
use std::collections::BTreeMap;
use tracing::warn;

// ============================================================================
// Cursor Pagination
// ============================================================================

/// Cursor pagination keyed on the last record of each page
///
/// Discord pages collections with `?limit=N&after=<snowflake>`, where the
/// snowflake is the `id` of the last record already seen.
#[derive(Debug, Clone)]
pub struct CursorPaginator {
    /// Query parameter name for page size
    pub limit_param: String,
    /// Page size
    pub limit: u32,
    /// Query parameter name for cursor
    pub cursor_param: String,
    /// Record field holding the cursor
    pub cursor_field: String,
    /// Stop condition
    pub stop_condition: StopCondition,
    /// Maximum pages before giving up
    pub max_pages: u32,
}

impl CursorPaginator {
    /// Create a new cursor paginator
    pub fn new(
        limit_param: impl Into<String>,
        limit: u32,
        cursor_param: impl Into<String>,
        cursor_field: impl Into<String>,
    ) -> Self {
        Self {
            limit_param: limit_param.into(),
            limit,
            cursor_param: cursor_param.into(),
            cursor_field: cursor_field.into(),
            stop_condition: StopCondition::EmptyPage,
            max_pages: DEFAULT_MAX_PAGES,
        }
    }

    /// Set stop condition
    #[must_use]
    pub fn with_stop_condition(mut self, condition: StopCondition) -> Self {
        self.stop_condition = condition;
        self
    }

    /// Set the page bound
    #[must_use]
    pub fn with_max_pages(mut self, max_pages: u32) -> Self {
        self.max_pages = max_pages;
        self
    }
}

impl Paginator for CursorPaginator {
    fn request_params(&self, state: &PaginationState) -> BTreeMap<String, String> {
        let mut params = BTreeMap::new();
        params.insert(self.limit_param.clone(), self.limit.to_string());
        if let Some(cursor) = &state.cursor {
            params.insert(self.cursor_param.clone(), cursor.clone());
        }
        params
    }

    fn process_page(&self, records: &[Value], state: &mut PaginationState) -> NextPage {
        state.add_page(records.len());

        let Some(last) = records.last() else {
            state.mark_done();
            return NextPage::Done;
        };

        if self.stop_condition == StopCondition::ShortPage && records.len() < self.limit as usize
        {
            state.mark_done();
            return NextPage::Done;
        }

        if state.pages >= self.max_pages {
            warn!(
                "Stopping pagination after {} pages (max_pages reached)",
                state.pages
            );
            state.mark_done();
            return NextPage::Done;
        }

        let Some(cursor) = cursor_from_record(last, &self.cursor_field) else {
            state.mark_done();
            return NextPage::Done;
        };

        if !state.set_cursor(cursor.clone()) {
            state.mark_done();
            return NextPage::Stalled { cursor };
        }

        NextPage::with_param(&self.cursor_param, cursor)
    }
}

// ============================================================================
// No Pagination
// ============================================================================

/// No pagination - single request
#[derive(Debug, Clone, Default)]
pub struct NoPaginator;

impl Paginator for NoPaginator {
    fn request_params(&self, _state: &PaginationState) -> BTreeMap<String, String> {
        BTreeMap::new()
    }

    fn process_page(&self, records: &[Value], state: &mut PaginationState) -> NextPage {
        state.add_page(records.len());
        state.mark_done();
        NextPage::Done
    }
}
