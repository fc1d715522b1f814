//! Pagination module
//!
//! Supports: cursor-after-last-record, single request
//!
//! # Overview
//!
//! A paginator computes the query parameters of each request and, after a
//! page has been decoded, whether another page exists. State lives in a
//! `PaginationState` owned by one reader and is discarded with it.
//!
//! Termination is guaranteed: an empty page ends iteration, a cursor that
//! repeats is reported as `NextPage::Stalled`, and `max_pages` bounds the
//! loop.

mod strategies;
mod types;

pub use strategies::{CursorPaginator, NoPaginator};
pub use types::{
    cursor_from_record, NextPage, PaginationConfig, PaginationState, Paginator, StopCondition,
    DEFAULT_MAX_PAGES, DEFAULT_PAGE_SIZE,
};
