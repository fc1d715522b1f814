//! HTTP client module
//!
//! Provides the authenticated fetcher every stream issues its requests through.
//!
//! # Features
//!
//! - **Base URL joining**: streams address endpoints by relative path
//! - **Authentication**: integration with the auth module
//! - **Explicit timeouts**: per client, overridable per request

mod client;

pub use client::{
    HttpClient, HttpClientConfig, HttpClientConfigBuilder, RequestConfig, DEFAULT_BASE_URL,
};
