//! HTTP stream built from a `StreamDefinition`

use super::types::{Request, Stream, StreamDefinition};
use crate::decode::{JsonDecoder, RecordDecoder};
use crate::error::Result;
use crate::pagination::{NextPage, PaginationState, Paginator};
use crate::partition::StreamSlice;
use crate::template::{self, TemplateContext};
use crate::types::Record;
use serde_json::Value;

/// A stream whose requests are rendered from its definition
pub struct HttpStream {
    definition: StreamDefinition,
    decoder: JsonDecoder,
    paginator: Box<dyn Paginator>,
    context: TemplateContext,
}

impl HttpStream {
    /// Create a stream from its definition
    pub fn new(definition: StreamDefinition) -> Self {
        let decoder = match &definition.data_field {
            Some(field) => JsonDecoder::with_field(field),
            None => JsonDecoder::new(),
        };
        let paginator = definition.pagination.build();

        Self {
            definition,
            decoder,
            paginator,
            context: TemplateContext::new(),
        }
    }

    /// Expose configuration values to path templates as `config.*`
    #[must_use]
    pub fn with_config_values(mut self, config: Value) -> Self {
        self.context.set_config(config);
        self
    }

    /// The underlying definition
    pub fn definition(&self) -> &StreamDefinition {
        &self.definition
    }
}

impl Stream for HttpStream {
    fn name(&self) -> &str {
        &self.definition.name
    }

    fn use_cache(&self) -> bool {
        self.definition.use_cache
    }

    fn build_request(&self, slice: &StreamSlice, state: &PaginationState) -> Result<Request> {
        let path = if template::has_templates(&self.definition.path) {
            let mut ctx = self.context.clone();
            ctx.set_slice(slice.to_json());
            template::render(&self.definition.path, &ctx)?
        } else {
            self.definition.path.clone()
        };

        Ok(Request::new(path).with_query(self.paginator.request_params(state)))
    }

    fn parse_page(&self, body: &Value, state: &mut PaginationState) -> (Vec<Record>, NextPage) {
        let records = self.decoder.decode_value(body);
        let next = self.paginator.process_page(&records, state);
        (records, next)
    }
}

impl std::fmt::Debug for HttpStream {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HttpStream")
            .field("definition", &self.definition)
            .finish_non_exhaustive()
    }
}
