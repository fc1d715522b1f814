//! Partition routing module
//!
//! Supports: whole stream, parent stream (fan-out join)
//!
//! # Overview
//!
//! A stream is read slice by slice. Unsliced streams have a single `Whole`
//! slice. A dependent stream derives one slice per record of its parent:
//! the slice owns the parent record (so the child can build its request
//! path from it) and the parent slice that produced the record.
//!
//! Slices are transient. They live only while the owning parent iteration
//! is in progress and are never persisted.

mod routers;
mod types;

pub use routers::{SubstreamSlicer, WholeSlicer};
pub use types::{ParentSlice, PartitionConfig, SliceRouter, StreamSlice};
