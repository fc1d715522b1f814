//! Decoder implementations

use serde_json::Value;

/// Trait for decoding parsed response bodies into records
pub trait RecordDecoder: Send + Sync {
    /// Extract the page of records from a parsed body
    fn decode_value(&self, body: &Value) -> Vec<Value>;
}

// ============================================================================
// JSON Decoder
// ============================================================================

/// JSON decoder with an optional data field
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct JsonDecoder {
    /// Dot-separated path to the field holding the records
    data_field: Option<String>,
}

impl JsonDecoder {
    /// Decoder that treats the whole body as the page
    pub fn new() -> Self {
        Self::default()
    }

    /// Decoder that reads records from `field` (e.g. `"data"` or `"data.items"`)
    pub fn with_field(field: impl Into<String>) -> Self {
        Self {
            data_field: Some(field.into()),
        }
    }

    /// The designated data field, if any
    pub fn data_field(&self) -> Option<&str> {
        self.data_field.as_deref()
    }
}

impl RecordDecoder for JsonDecoder {
    fn decode_value(&self, body: &Value) -> Vec<Value> {
        let target = match &self.data_field {
            Some(field) => match extract_simple_path(body, field) {
                Some(v) => v,
                None => return Vec::new(),
            },
            None => body,
        };

        match target {
            Value::Array(arr) => arr.clone(),
            Value::Null => Vec::new(),
            other => vec![other.clone()],
        }
    }
}

/// Walk a simple dot-notation path like `data.items`
fn extract_simple_path<'a>(value: &'a Value, path: &str) -> Option<&'a Value> {
    let path = path.strip_prefix("$.").unwrap_or(path);

    let mut current = value;
    for part in path.split('.').filter(|p| !p.is_empty()) {
        current = current.get(part)?;
    }

    Some(current)
}
