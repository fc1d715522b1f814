//! Authentication module
//!
//! Supports: static token headers (Discord `Bot` tokens, `Bearer` tokens)
//!
//! The credential is held for the lifetime of a sync run and shared
//! read-only by every stream through the HTTP client.

mod authenticator;
mod types;

pub use authenticator::Authenticator;
pub use types::{AuthConfig, BOT_SCHEME, DEFAULT_AUTH_HEADER};
