//! CLI runner - executes commands

use crate::cli::commands::{parse_stream_list, Cli, Commands, OutputFormat};
use crate::config::{ConfiguredCatalog, SourceConfig};
use crate::connector::{Connector, Message};
use crate::engine::SyncConfig;
use crate::error::{Error, Result};
use crate::source::DiscordSource;
use futures::StreamExt;
use serde_json::{json, Value};
use std::collections::BTreeMap;
use std::time::Instant;

/// CLI runner
pub struct Runner {
    cli: Cli,
}

impl Runner {
    /// Create a new runner
    pub fn new(cli: Cli) -> Self {
        Self { cli }
    }

    /// Run the CLI command
    pub async fn run(&self) -> Result<()> {
        match &self.cli.command {
            Commands::Spec => self.spec(),
            Commands::Check => self.check().await,
            Commands::Discover => self.discover().await,
            Commands::Read {
                streams,
                max_records,
            } => self.read(streams.as_deref(), *max_records).await,
        }
    }

    /// Load the raw config value
    fn load_config(&self) -> Result<Value> {
        // Inline config takes precedence
        if let Some(json_str) = &self.cli.config_json {
            return serde_json::from_str(json_str)
                .map_err(|e| Error::config(format!("Invalid config JSON: {e}")));
        }

        if let Some(path) = &self.cli.config {
            return SourceConfig::load_value(path);
        }

        Err(Error::config("No config given; pass --config or --config-json"))
    }

    /// Show spec
    fn spec(&self) -> Result<()> {
        let spec = DiscordSource::new().spec();
        let properties: serde_json::Map<String, Value> = spec
            .spec
            .properties
            .iter()
            .map(|(name, prop)| {
                let mut value = json!({
                    "type": prop.property_type,
                    "title": prop.title,
                    "description": prop.description,
                });
                if prop.secret {
                    value["airbyte_secret"] = json!(true);
                }
                if let Some(default) = &prop.default {
                    value["default"] = default.clone();
                }
                (name.clone(), value)
            })
            .collect();

        self.output_message(&json!({
            "type": "SPEC",
            "spec": {
                "documentationUrl": spec.documentation_url,
                "connectionSpecification": {
                    "type": "object",
                    "title": spec.title,
                    "properties": properties,
                    "required": spec.spec.required()
                }
            }
        }));

        Ok(())
    }

    /// Check connection
    async fn check(&self) -> Result<()> {
        let config = self.load_config()?;

        self.output_message(&json!({
            "type": "LOG",
            "log": {
                "level": "INFO",
                "message": "Checking connection to Discord"
            }
        }));

        let result = DiscordSource::new().check(&config).await?;
        let status = if result.success { "SUCCEEDED" } else { "FAILED" };
        self.output_message(&json!({
            "type": "CONNECTION_STATUS",
            "connectionStatus": {
                "status": status,
                "message": result.message
            }
        }));

        Ok(())
    }

    /// Discover streams
    async fn discover(&self) -> Result<()> {
        let config = self.load_config()?;
        let catalog = DiscordSource::new().discover(&config).await?;

        self.output_message(&json!({
            "type": "CATALOG",
            "catalog": catalog
        }));

        Ok(())
    }

    /// Read streams
    async fn read(&self, streams: Option<&str>, max_records: Option<usize>) -> Result<()> {
        let sync_start = Instant::now();
        let config = self.load_config()?;

        let mut sync_config = SyncConfig::new();
        if let Some(max) = max_records {
            sync_config = sync_config.with_max_records(max);
        }
        let source = DiscordSource::new().with_sync_config(sync_config);

        let catalog = source.discover(&config).await?;
        let selected = streams.map(parse_stream_list).unwrap_or_default();
        let configured = if selected.is_empty() {
            ConfiguredCatalog::from_catalog(&catalog)
        } else {
            ConfiguredCatalog::select(&catalog, &selected)?
        };

        let mut messages = source.read(&config, &configured).await?;
        let mut counts: BTreeMap<String, usize> = BTreeMap::new();
        let mut total_records = 0usize;

        while let Some(message) = messages.next().await {
            let message = match message {
                Ok(m) => m,
                Err(e) => {
                    self.output_message(&message_to_json(&Message::error(format!(
                        "Sync failed: {e}"
                    ))));
                    return Err(e);
                }
            };

            if let Some((stream, _)) = message.as_record() {
                *counts.entry(stream.to_string()).or_default() += 1;
                total_records += 1;
            }
            self.output_message(&message_to_json(&message));
        }

        self.output_message(&json!({
            "type": "SYNC_SUMMARY",
            "summary": {
                "status": "SUCCEEDED",
                "connector": "source-discord",
                "total_records": total_records,
                "total_streams": configured.streams.len(),
                "records_per_stream": counts,
                "duration_ms": sync_start.elapsed().as_millis() as u64
            }
        }));

        Ok(())
    }

    /// Output a message
    fn output_message(&self, msg: &Value) {
        match self.cli.format {
            OutputFormat::Json => {
                println!("{}", serde_json::to_string(msg).unwrap_or_default());
            }
            OutputFormat::Pretty => {
                println!("{}", serde_json::to_string_pretty(msg).unwrap_or_default());
            }
        }
    }
}

/// Render a connector message in the wire shape the CLI prints
pub fn message_to_json(message: &Message) -> Value {
    match message {
        Message::Record {
            stream,
            data,
            emitted_at,
        } => json!({
            "type": "RECORD",
            "record": {
                "stream": stream,
                "data": data,
                "emitted_at": emitted_at.timestamp_millis()
            }
        }),
        Message::Log { level, message } => json!({
            "type": "LOG",
            "log": {
                "level": level,
                "message": message
            }
        }),
    }
}
