// Allow common clippy pedantic lints that aren't critical for this codebase
#![allow(clippy::cast_possible_truncation)]
#![allow(clippy::cast_sign_loss)]
#![allow(clippy::cast_lossless)]
#![allow(clippy::too_many_lines)]
#![allow(clippy::ref_option)]
#![allow(clippy::unused_self)]
#![allow(clippy::must_use_candidate)]
#![allow(clippy::items_after_statements)]
#![allow(clippy::unnecessary_wraps)]
#![allow(clippy::match_same_arms)]
#![allow(clippy::needless_pass_by_value)]
#![allow(clippy::unused_async)]

//! # source-discord
//!
//! A Discord source connector: reads the bot user, the guilds it belongs to
//! and the full guild objects as streams of JSON records.
//!
//! ## Streams
//!
//! - `current_user` - `GET users/@me`, one record
//! - `current_user_guilds` - `GET users/@me/guilds`, paginated with `limit`/`after`
//! - `guilds` - `GET guilds/{id}` for every record of `current_user_guilds`
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use futures::StreamExt;
//! use source_discord::{config::ConfiguredCatalog, connector::Connector, DiscordSource, Result};
//!
//! #[tokio::main]
//! async fn main() -> Result<()> {
//!     let source = DiscordSource::new();
//!     let config = serde_json::json!({ "token": "..." });
//!
//!     // Check connection
//!     let status = source.check(&config).await?;
//!
//!     // Discover available streams
//!     let catalog = source.discover(&config).await?;
//!
//!     // Read data
//!     let configured = ConfiguredCatalog::from_catalog(&catalog);
//!     let mut messages = source.read(&config, &configured).await?;
//!     while let Some(msg) = messages.next().await {
//!         // Process messages
//!     }
//!
//!     Ok(())
//! }
//! ```
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────┐
//! │                     Connector Interface                         │
//! │  spec() → ConnectorSpec  check() → CheckResult  discover()      │
//! │  read(config, catalog) → Stream<Message>                        │
//! └─────────────────────────────────────────────────────────────────┘
//!                                │
//! ┌──────────┬───────────┬───────┴───────┬───────────┬─────────────┐
//! │   Auth   │   HTTP    │   Paginate    │ Partition │   Stream    │
//! ├──────────┼───────────┼───────────────┼───────────┼─────────────┤
//! │ Bot      │ GET       │ Cursor (after)│ Whole     │ Reader      │
//! │ Bearer   │ Timeout   │ Single        │ Parent    │ Cache       │
//! └──────────┴───────────┴───────────────┴───────────┴─────────────┘
//! ```

#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::missing_panics_doc)]
#![allow(clippy::doc_markdown)]

// ============================================================================
// Module declarations
// ============================================================================

/// Error types
pub mod error;

/// Common types and type aliases
pub mod types;

/// Authentication
pub mod auth;

/// Authenticated HTTP client
pub mod http;

/// Pagination strategies
pub mod pagination;

/// Slices and slice routers
pub mod partition;

/// Response decoders
pub mod decode;

/// Stream definitions and readers
pub mod stream;

/// Main execution engine
pub mod engine;

/// Configuration and catalog types
pub mod config;

/// Connector trait and messages
pub mod connector;

/// The Discord source
pub mod source;

/// Template interpolation
pub mod template;

/// Command-line interface
pub mod cli;

// ============================================================================
// Re-exports
// ============================================================================

pub use error::{Error, Result};
pub use source::DiscordSource;
pub use types::*;

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Crate name
pub const NAME: &str = env!("CARGO_PKG_NAME");
