//! Per-run response cache and the fetcher that consults it

use super::types::{Request, RequestSignature};
use crate::error::Result;
use crate::http::HttpClient;
use serde_json::Value;
use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::debug;

/// Response bodies memoized by request signature
///
/// Lives for one sync run. Clones share the same table.
#[derive(Debug, Clone, Default)]
pub struct ResponseCache {
    entries: Arc<RwLock<HashMap<RequestSignature, Value>>>,
    hits: Arc<AtomicU64>,
    misses: Arc<AtomicU64>,
}

impl ResponseCache {
    /// Create an empty cache
    pub fn new() -> Self {
        Self::default()
    }

    /// Look up a response, counting the hit or miss
    pub async fn get(&self, signature: &RequestSignature) -> Option<Value> {
        let found = self.entries.read().await.get(signature).cloned();
        if found.is_some() {
            self.hits.fetch_add(1, Ordering::Relaxed);
        } else {
            self.misses.fetch_add(1, Ordering::Relaxed);
        }
        found
    }

    /// Store a response
    pub async fn insert(&self, signature: RequestSignature, body: Value) {
        self.entries.write().await.insert(signature, body);
    }

    /// Number of cached responses
    pub async fn len(&self) -> usize {
        self.entries.read().await.len()
    }

    /// Whether the cache is empty
    pub async fn is_empty(&self) -> bool {
        self.entries.read().await.is_empty()
    }

    /// Lookups answered from the cache
    pub fn hits(&self) -> u64 {
        self.hits.load(Ordering::Relaxed)
    }

    /// Lookups that went to the network
    pub fn misses(&self) -> u64 {
        self.misses.load(Ordering::Relaxed)
    }
}

/// Issues stream requests through the shared client and cache
#[derive(Debug, Clone)]
pub struct Fetcher {
    client: Arc<HttpClient>,
    cache: ResponseCache,
    requests: Arc<AtomicU64>,
}

impl Fetcher {
    /// Create a fetcher with its own empty cache
    pub fn new(client: Arc<HttpClient>) -> Self {
        Self::with_cache(client, ResponseCache::new())
    }

    /// Create a fetcher sharing an existing cache
    pub fn with_cache(client: Arc<HttpClient>, cache: ResponseCache) -> Self {
        Self {
            client,
            cache,
            requests: Arc::new(AtomicU64::new(0)),
        }
    }

    /// Fetch a response body, consulting the cache when `use_cache` is set
    pub async fn fetch(&self, request: &Request, use_cache: bool) -> Result<Value> {
        let signature = use_cache.then(|| request.signature());

        if let Some(sig) = &signature {
            if let Some(body) = self.cache.get(sig).await {
                debug!("Cache hit for {sig}");
                return Ok(body);
            }
        }

        self.requests.fetch_add(1, Ordering::Relaxed);
        let body: Value = self
            .client
            .get_json_with_config(&request.path, request.to_request_config())
            .await?;

        if let Some(sig) = signature {
            self.cache.insert(sig, body.clone()).await;
        }

        Ok(body)
    }

    /// Requests sent over the network so far
    pub fn requests(&self) -> u64 {
        self.requests.load(Ordering::Relaxed)
    }

    /// The shared cache
    pub fn cache(&self) -> &ResponseCache {
        &self.cache
    }

    /// The underlying client
    pub fn client(&self) -> &HttpClient {
        &self.client
    }
}
