//! Auth configuration types
//!
//! These types represent the runtime auth configuration after the
//! connector config has been loaded.

use std::fmt;

/// Header used for token authentication unless overridden
pub const DEFAULT_AUTH_HEADER: &str = "Authorization";

/// Scheme Discord expects for bot tokens
pub const BOT_SCHEME: &str = "Bot";

/// Authentication configuration
#[derive(Clone, Default)]
pub enum AuthConfig {
    /// No authentication required
    #[default]
    None,

    /// Static token sent as `<header>: <scheme> <token>` on every request
    Token {
        /// Header name
        header: String,
        /// Scheme placed before the token (e.g., "Bot", "Bearer")
        scheme: String,
        /// The token value
        token: String,
    },
}

impl AuthConfig {
    /// Discord bot token: `Authorization: Bot <token>`
    pub fn bot(token: impl Into<String>) -> Self {
        Self::Token {
            header: DEFAULT_AUTH_HEADER.to_string(),
            scheme: BOT_SCHEME.to_string(),
            token: token.into(),
        }
    }

    /// Whether any credential is configured
    pub fn is_none(&self) -> bool {
        matches!(self, Self::None)
    }
}

// Tokens must never reach logs.
impl fmt::Debug for AuthConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::None => f.write_str("None"),
            Self::Token { header, scheme, .. } => f
                .debug_struct("Token")
                .field("header", header)
                .field("scheme", scheme)
                .field("token", &"***")
                .finish(),
        }
    }
}

#[cfg(test)]
mod type_tests {
    use super::*;

    #[test]
    fn test_auth_config_default() {
        let config = AuthConfig::default();
        assert!(config.is_none());
    }

    #[test]
    fn test_bot_constructor() {
        match AuthConfig::bot("abc") {
            AuthConfig::Token {
                header,
                scheme,
                token,
            } => {
                assert_eq!(header, "Authorization");
                assert_eq!(scheme, "Bot");
                assert_eq!(token, "abc");
            }
            AuthConfig::None => panic!("Expected Token config"),
        }
    }

    #[test]
    fn test_debug_redacts_token() {
        let debug = format!("{:?}", AuthConfig::bot("super-secret"));
        assert!(!debug.contains("super-secret"));
        assert!(debug.contains("***"));
        assert!(debug.contains("Bot"));
    }
}
