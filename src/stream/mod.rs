//! Stream module
//!
//! Streams are declared as `StreamDefinition` values and read through a
//! `RecordReader`, which combines:
//! - a `Stream` (request building and page parsing, no I/O)
//! - a `Fetcher` (HTTP client plus per-run `ResponseCache`)
//! - a `SliceRouter` (one `Whole` slice, or one slice per parent record)

mod cache;
mod http_stream;
mod reader;
mod types;

pub use cache::{Fetcher, ResponseCache};
pub use http_stream::HttpStream;
pub use reader::RecordReader;
pub use types::{Request, RequestSignature, Stream, StreamDefinition};

#[cfg(test)]
mod tests;
