//! Configuration types
//!
//! This module contains the user-supplied source configuration, the
//! configuration spec advertised by `spec`, and the catalog types used by
//! `discover` and `read`.

use crate::auth::AuthConfig;
use crate::error::{Error, Result, ResultExt};
use crate::http::{HttpClientConfig, DEFAULT_BASE_URL};
use crate::pagination::{StopCondition, DEFAULT_MAX_PAGES, DEFAULT_PAGE_SIZE};
use crate::types::{PropertyType, SyncMode};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::HashMap;
use std::path::Path;
use std::time::Duration;

/// Largest `limit` the guild list endpoint accepts
pub const MAX_PAGE_SIZE: u32 = 200;

// ============================================================================
// Source Config
// ============================================================================

/// Configuration for one sync run
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SourceConfig {
    /// Bot token sent as `Authorization: Bot <token>`
    #[serde(default)]
    pub token: String,

    /// API root
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// Per-request timeout in seconds
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,

    /// `limit` for paginated guild listing
    #[serde(default = "default_page_size")]
    pub page_size: u32,

    /// Also stop paginating on a page shorter than `page_size`
    #[serde(default)]
    pub stop_on_short_page: bool,

    /// Upper bound on pages per reader
    #[serde(default = "default_max_pages")]
    pub max_pages: u32,
}

fn default_base_url() -> String {
    DEFAULT_BASE_URL.to_string()
}

fn default_timeout_secs() -> u64 {
    30
}

fn default_page_size() -> u32 {
    DEFAULT_PAGE_SIZE
}

fn default_max_pages() -> u32 {
    DEFAULT_MAX_PAGES
}

impl Default for SourceConfig {
    fn default() -> Self {
        Self {
            token: String::new(),
            base_url: default_base_url(),
            timeout_secs: default_timeout_secs(),
            page_size: default_page_size(),
            stop_on_short_page: false,
            max_pages: default_max_pages(),
        }
    }
}

impl SourceConfig {
    /// Create a config with the given token and defaults elsewhere
    pub fn new(token: impl Into<String>) -> Self {
        Self {
            token: token.into(),
            ..Default::default()
        }
    }

    /// Parse and validate a config from a JSON value
    pub fn from_value(value: &Value) -> Result<Self> {
        let config: Self = serde_json::from_value(value.clone())?;
        config.validate()?;
        Ok(config)
    }

    /// Load and validate a config file (JSON, or YAML by extension)
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        Self::from_value(&Self::load_value(path)?)
    }

    /// Read a config file into a JSON value without validating it
    pub fn load_value<P: AsRef<Path>>(path: P) -> Result<Value> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file {}", path.display()))?;

        let is_yaml = path
            .extension()
            .and_then(|e| e.to_str())
            .is_some_and(|e| e.eq_ignore_ascii_case("yaml") || e.eq_ignore_ascii_case("yml"));

        if is_yaml {
            Ok(serde_yaml::from_str(&content)?)
        } else {
            Ok(serde_json::from_str(&content)?)
        }
    }

    /// Check field values
    pub fn validate(&self) -> Result<()> {
        if self.token.trim().is_empty() {
            return Err(Error::missing_field("token"));
        }
        if self.page_size == 0 || self.page_size > MAX_PAGE_SIZE {
            return Err(Error::invalid_value(
                "page_size",
                format!("must be between 1 and {MAX_PAGE_SIZE}, got {}", self.page_size),
            ));
        }
        if self.timeout_secs == 0 {
            return Err(Error::invalid_value("timeout_secs", "must be positive"));
        }
        if self.max_pages == 0 {
            return Err(Error::invalid_value("max_pages", "must be positive"));
        }
        url::Url::parse(&self.base_url)
            .map_err(|e| Error::invalid_value("base_url", e.to_string()))?;
        Ok(())
    }

    /// Request timeout
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    /// Credential for the HTTP client
    pub fn auth(&self) -> AuthConfig {
        AuthConfig::bot(&self.token)
    }

    /// HTTP client configuration
    pub fn http_config(&self) -> HttpClientConfig {
        HttpClientConfig::builder()
            .base_url(&self.base_url)
            .timeout(self.timeout())
            .build()
    }

    /// Pagination stop condition
    pub fn stop_condition(&self) -> StopCondition {
        if self.stop_on_short_page {
            StopCondition::ShortPage
        } else {
            StopCondition::EmptyPage
        }
    }

    /// Values exposed to path templates as `config.*`; the token is omitted
    pub fn template_values(&self) -> Value {
        serde_json::json!({
            "base_url": self.base_url,
            "page_size": self.page_size,
            "timeout_secs": self.timeout_secs,
        })
    }
}

impl std::fmt::Debug for SourceConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SourceConfig")
            .field("token", &"***")
            .field("base_url", &self.base_url)
            .field("timeout_secs", &self.timeout_secs)
            .field("page_size", &self.page_size)
            .field("stop_on_short_page", &self.stop_on_short_page)
            .field("max_pages", &self.max_pages)
            .finish()
    }
}

// ============================================================================
// Spec Config (for UI)
// ============================================================================

/// Configuration specification for connector setup
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SpecConfig {
    /// Configuration properties
    #[serde(default)]
    pub properties: HashMap<String, PropertyConfig>,
}

impl SpecConfig {
    /// Add a property
    #[must_use]
    pub fn property(mut self, name: impl Into<String>, property: PropertyConfig) -> Self {
        self.properties.insert(name.into(), property);
        self
    }

    /// Names of required properties, sorted
    pub fn required(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self
            .properties
            .iter()
            .filter(|(_, p)| p.required)
            .map(|(k, _)| k.as_str())
            .collect();
        names.sort_unstable();
        names
    }
}

/// Configuration property definition
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PropertyConfig {
    /// Property type
    #[serde(rename = "type", default)]
    pub property_type: PropertyType,

    /// Human-readable title
    #[serde(default)]
    pub title: Option<String>,

    /// Property description
    #[serde(default)]
    pub description: Option<String>,

    /// Whether this is a secret (should be masked)
    #[serde(default)]
    pub secret: bool,

    /// Whether this property is required
    #[serde(default)]
    pub required: bool,

    /// Default value
    #[serde(default)]
    pub default: Option<Value>,
}

impl PropertyConfig {
    /// Create a property of the given type
    pub fn new(property_type: PropertyType, title: impl Into<String>) -> Self {
        Self {
            property_type,
            title: Some(title.into()),
            ..Default::default()
        }
    }

    /// Set description
    #[must_use]
    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Mark as secret
    #[must_use]
    pub fn secret(mut self) -> Self {
        self.secret = true;
        self
    }

    /// Mark as required
    #[must_use]
    pub fn required(mut self) -> Self {
        self.required = true;
        self
    }

    /// Set default value
    #[must_use]
    pub fn default_value(mut self, value: impl Into<Value>) -> Self {
        self.default = Some(value.into());
        self
    }
}

// ============================================================================
// Catalog Types
// ============================================================================

/// Discovered catalog (available streams)
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Catalog {
    /// Available streams
    pub streams: Vec<CatalogStream>,
}

impl Catalog {
    /// Names of all streams, in catalog order
    pub fn stream_names(&self) -> Vec<&str> {
        self.streams.iter().map(|s| s.name.as_str()).collect()
    }
}

/// Stream in the catalog
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CatalogStream {
    /// Stream name
    pub name: String,

    /// JSON schema for the stream
    #[serde(default)]
    pub json_schema: Value,

    /// Supported sync modes
    #[serde(default)]
    pub supported_sync_modes: Vec<SyncMode>,

    /// Source-defined primary key
    #[serde(default)]
    pub source_defined_primary_key: Option<Vec<Vec<String>>>,
}

/// Configured catalog (selected streams for sync)
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ConfiguredCatalog {
    /// Selected streams
    pub streams: Vec<ConfiguredStream>,
}

impl ConfiguredCatalog {
    /// Select every stream of a catalog in full refresh mode
    pub fn from_catalog(catalog: &Catalog) -> Self {
        Self {
            streams: catalog
                .streams
                .iter()
                .map(|s| ConfiguredStream::full_refresh(s.clone()))
                .collect(),
        }
    }

    /// Keep only the named streams, preserving catalog order
    ///
    /// Fails on a name the catalog does not contain.
    pub fn select(catalog: &Catalog, names: &[String]) -> Result<Self> {
        if let Some(unknown) = names
            .iter()
            .find(|n| !catalog.streams.iter().any(|s| &s.name == *n))
        {
            return Err(Error::stream_not_found(unknown));
        }

        Ok(Self {
            streams: catalog
                .streams
                .iter()
                .filter(|s| names.contains(&s.name))
                .map(|s| ConfiguredStream::full_refresh(s.clone()))
                .collect(),
        })
    }
}

/// Configured stream for sync
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConfiguredStream {
    /// Stream reference
    pub stream: CatalogStream,

    /// Selected sync mode
    #[serde(default)]
    pub sync_mode: SyncMode,

    /// Primary key to use
    #[serde(default)]
    pub primary_key: Option<Vec<Vec<String>>>,
}

impl ConfiguredStream {
    /// Configure a stream for full refresh
    pub fn full_refresh(stream: CatalogStream) -> Self {
        Self {
            primary_key: stream.source_defined_primary_key.clone(),
            stream,
            sync_mode: SyncMode::FullRefresh,
        }
    }
}
