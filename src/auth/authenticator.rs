//! Authenticator implementation
//!
//! Handles applying authentication to requests.

use super::types::AuthConfig;
use reqwest::RequestBuilder;

/// Authenticator handles applying authentication to HTTP requests
#[derive(Debug, Clone, Default)]
pub struct Authenticator {
    /// Auth configuration
    config: AuthConfig,
}

impl Authenticator {
    /// Create a new authenticator with the given config
    pub fn new(config: AuthConfig) -> Self {
        Self { config }
    }

    /// The underlying configuration
    pub fn config(&self) -> &AuthConfig {
        &self.config
    }

    /// Header name and value this authenticator adds, if any
    pub fn auth_header(&self) -> Option<(String, String)> {
        match &self.config {
            AuthConfig::None => None,
            AuthConfig::Token {
                header,
                scheme,
                token,
            } => {
                let value = if scheme.is_empty() {
                    token.clone()
                } else {
                    format!("{scheme} {token}")
                };
                Some((header.clone(), value))
            }
        }
    }

    /// Apply authentication to a request builder
    pub fn apply(&self, req: RequestBuilder) -> RequestBuilder {
        match self.auth_header() {
            Some((name, value)) => req.header(name, value),
            None => req,
        }
    }
}
