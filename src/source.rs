//! Discord source
//!
//! Three streams over the Discord REST API, authenticated with a bot token:
//!
//! | stream                | path                     | shape                     |
//! |-----------------------|--------------------------|---------------------------|
//! | `current_user`        | `users/@me`              | single object             |
//! | `current_user_guilds` | `users/@me/guilds`       | `limit`/`after` paginated |
//! | `guilds`              | `guilds/{{ parent.id }}` | one request per guild     |

use crate::config::{
    Catalog, CatalogStream, ConfiguredCatalog, PropertyConfig, SourceConfig, SpecConfig,
};
use crate::connector::{CheckResult, Connector, ConnectorSpec, MessageStream};
use crate::engine::{SyncConfig, SyncEngine};
use crate::error::Result;
use crate::http::HttpClient;
use crate::pagination::PaginationConfig;
use crate::stream::StreamDefinition;
use crate::types::{PropertyType, SyncMode};
use async_trait::async_trait;
use serde_json::{json, Value};
use tracing::{debug, info};

/// Stream emitting the authenticated user
pub const CURRENT_USER: &str = "current_user";

/// Stream emitting the guilds the user belongs to
pub const CURRENT_USER_GUILDS: &str = "current_user_guilds";

/// Stream emitting full guild objects, one per membership
pub const GUILDS: &str = "guilds";

/// Path used for the connectivity check
const CHECK_PATH: &str = "users/@me";

/// The Discord source connector
#[derive(Debug, Clone, Default)]
pub struct DiscordSource {
    sync_config: SyncConfig,
}

impl DiscordSource {
    /// Create a new source
    pub fn new() -> Self {
        Self::default()
    }

    /// Set sync configuration used by `read`
    #[must_use]
    pub fn with_sync_config(mut self, config: SyncConfig) -> Self {
        self.sync_config = config;
        self
    }

    /// Stream definitions for a validated config
    pub fn streams(config: &SourceConfig) -> Vec<StreamDefinition> {
        let guild_pagination = PaginationConfig::after_id(config.page_size)
            .with_stop_condition(config.stop_condition())
            .with_max_pages(config.max_pages);

        vec![
            StreamDefinition::new(CURRENT_USER, "users/@me"),
            StreamDefinition::new(CURRENT_USER_GUILDS, "users/@me/guilds")
                .with_pagination(guild_pagination)
                .cacheable(),
            StreamDefinition::new(GUILDS, "guilds/{{ parent.id }}")
                .child_of(CURRENT_USER_GUILDS, "id"),
        ]
    }

    /// Build a sync engine for one run
    pub fn engine(&self, config: &SourceConfig) -> Result<SyncEngine> {
        let client = HttpClient::with_auth(config.http_config(), config.auth())?;
        Ok(SyncEngine::new(client, Self::streams(config))
            .with_config(self.sync_config.clone())
            .with_template_values(config.template_values()))
    }

    /// Probe `users/@me` with the configured credential
    ///
    /// Any 2xx passes; the body is only read for the log line.
    async fn probe(config: &Value) -> Result<()> {
        let config = SourceConfig::from_value(config)?;
        let client = HttpClient::with_auth(config.http_config(), config.auth())?;
        let response = client.get(CHECK_PATH).await?;

        if let Ok(user) = response.json::<Value>().await {
            let username = user
                .get("username")
                .and_then(Value::as_str)
                .unwrap_or("<unknown>");
            debug!("Authenticated as {username}");
        }
        Ok(())
    }

    fn catalog_stream(definition: &StreamDefinition) -> CatalogStream {
        CatalogStream {
            name: definition.name.clone(),
            json_schema: json!({
                "$schema": "http://json-schema.org/draft-07/schema#",
                "type": "object",
                "additionalProperties": true,
                "properties": {
                    "id": { "type": "string" }
                }
            }),
            supported_sync_modes: vec![SyncMode::FullRefresh],
            source_defined_primary_key: Some(
                definition
                    .primary_key
                    .iter()
                    .map(|k| vec![k.clone()])
                    .collect(),
            ),
        }
    }
}

#[async_trait]
impl Connector for DiscordSource {
    fn spec(&self) -> ConnectorSpec {
        let spec = SpecConfig::default()
            .property(
                "token",
                PropertyConfig::new(PropertyType::String, "Bot Token")
                    .description("Discord bot token, sent as `Authorization: Bot <token>`")
                    .secret()
                    .required(),
            )
            .property(
                "base_url",
                PropertyConfig::new(PropertyType::String, "API Base URL")
                    .default_value(crate::http::DEFAULT_BASE_URL),
            )
            .property(
                "timeout_secs",
                PropertyConfig::new(PropertyType::Integer, "Request Timeout")
                    .description("Per-request timeout in seconds")
                    .default_value(30),
            )
            .property(
                "page_size",
                PropertyConfig::new(PropertyType::Integer, "Page Size")
                    .description("Guilds requested per page (1-200)")
                    .default_value(crate::pagination::DEFAULT_PAGE_SIZE),
            )
            .property(
                "stop_on_short_page",
                PropertyConfig::new(PropertyType::Boolean, "Stop On Short Page")
                    .description("Stop paging when a page has fewer records than the page size")
                    .default_value(false),
            )
            .property(
                "max_pages",
                PropertyConfig::new(PropertyType::Integer, "Max Pages")
                    .description("Upper bound on pages fetched per stream")
                    .default_value(crate::pagination::DEFAULT_MAX_PAGES),
            );

        ConnectorSpec {
            name: "source-discord".to_string(),
            title: "Discord".to_string(),
            description: Some(
                "Reads the bot user, its guild memberships and guild details".to_string(),
            ),
            spec,
            documentation_url: Some("https://discord.com/developers/docs/resources/user".to_string()),
        }
    }

    async fn check(&self, config: &Value) -> Result<CheckResult> {
        match Self::probe(config).await {
            Ok(()) => {
                info!("Connection check succeeded");
                Ok(CheckResult::success())
            }
            Err(e) if e.is_auth_failure() => {
                info!("Connection check rejected: {e}");
                Ok(CheckResult::failure(format!(
                    "Discord rejected the bot token: {e}"
                )))
            }
            Err(e) => {
                info!("Connection check failed: {e}");
                Ok(CheckResult::failure(e.to_string()))
            }
        }
    }

    async fn discover(&self, config: &Value) -> Result<Catalog> {
        let config = SourceConfig::from_value(config)?;
        let streams = Self::streams(&config)
            .iter()
            .map(Self::catalog_stream)
            .collect();
        Ok(Catalog { streams })
    }

    async fn read(&self, config: &Value, catalog: &ConfiguredCatalog) -> Result<MessageStream> {
        let config = SourceConfig::from_value(config)?;
        let engine = self.engine(&config)?;

        let selected: Vec<(String, SyncMode)> = catalog
            .streams
            .iter()
            .map(|s| (s.stream.name.clone(), s.sync_mode))
            .collect();

        // Unknown names fail here rather than mid-stream.
        for (name, _) in &selected {
            engine.definition(name)?;
        }

        Ok(engine.into_messages(selected))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::partition::PartitionConfig;

    #[test]
    fn test_stream_definitions() {
        let config = SourceConfig::new("t");
        let streams = DiscordSource::streams(&config);
        let names: Vec<&str> = streams.iter().map(|s| s.name.as_str()).collect();
        assert_eq!(names, vec![CURRENT_USER, CURRENT_USER_GUILDS, GUILDS]);

        assert_eq!(streams[0].path, "users/@me");
        assert_eq!(streams[0].pagination, PaginationConfig::None);
        assert!(!streams[0].use_cache);

        assert_eq!(streams[1].pagination.page_size(), Some(200));
        assert!(streams[1].use_cache);

        assert_eq!(
            streams[2].partition,
            PartitionConfig::parent(CURRENT_USER_GUILDS, "id")
        );
        assert_eq!(streams[2].path, "guilds/{{ parent.id }}");
    }

    #[test]
    fn test_stream_definitions_follow_config() {
        let mut config = SourceConfig::new("t");
        config.page_size = 2;
        config.stop_on_short_page = true;
        config.max_pages = 5;

        let streams = DiscordSource::streams(&config);
        assert_eq!(
            streams[1].pagination,
            PaginationConfig::after_id(2)
                .with_stop_condition(crate::pagination::StopCondition::ShortPage)
                .with_max_pages(5)
        );
    }

    #[test]
    fn test_spec() {
        let spec = DiscordSource::new().spec();
        assert_eq!(spec.name, "source-discord");
        assert_eq!(spec.spec.required(), vec!["token"]);
        assert!(spec.spec.properties["token"].secret);
    }

    #[tokio::test]
    async fn test_discover() {
        let catalog = DiscordSource::new()
            .discover(&json!({"token": "t"}))
            .await
            .unwrap();

        assert_eq!(
            catalog.stream_names(),
            vec!["current_user", "current_user_guilds", "guilds"]
        );
        for stream in &catalog.streams {
            assert_eq!(stream.supported_sync_modes, vec![SyncMode::FullRefresh]);
            assert_eq!(
                stream.source_defined_primary_key,
                Some(vec![vec!["id".to_string()]])
            );
        }
    }

    #[tokio::test]
    async fn test_discover_requires_token() {
        assert!(DiscordSource::new().discover(&json!({})).await.is_err());
    }

    #[tokio::test]
    async fn test_check_accepts_non_json_success() {
        use wiremock::matchers::{header, method, path};
        use wiremock::{Mock, MockServer, ResponseTemplate};

        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/users/@me"))
            .and(header("Authorization", "Bot t"))
            .respond_with(ResponseTemplate::new(200).set_body_string("ok"))
            .expect(1)
            .mount(&server)
            .await;

        let result = DiscordSource::new()
            .check(&json!({"token": "t", "base_url": server.uri()}))
            .await
            .unwrap();
        assert!(result.success);
        assert_eq!(result.message, None);
    }

    #[tokio::test]
    async fn test_check_without_token_is_failure() {
        let result = DiscordSource::new().check(&json!({})).await.unwrap();
        assert!(!result.success);
        assert!(result.message.unwrap().contains("token"));
    }
}
