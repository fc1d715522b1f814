//! Response decoder module
//!
//! Turns a JSON response body into a page of records. A stream either
//! designates a field holding its records or takes the whole body.
//!
//! A designated field that is missing decodes to an empty page rather than
//! an error, so a malformed page ends pagination instead of aborting the run.

mod decoders;

pub use decoders::{JsonDecoder, RecordDecoder};

#[cfg(test)]
mod tests;
