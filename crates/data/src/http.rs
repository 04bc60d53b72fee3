//! JSON over HTTP, optionally through the cache.

use crate::cache::{CacheOptions, JsonCache};
use crate::error::DataError;
use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde_json::Value;
use std::sync::Arc;
use tracing::debug;

/// Source of JSON documents addressed by URL.
#[async_trait]
pub trait JsonSource: Send + Sync {
    /// Fetches and parses the document at `url`.
    ///
    /// # Errors
    /// Returns an error on transport failure, non-success status or invalid JSON.
    async fn get_json(&self, url: &str) -> Result<Value, DataError>;
}

/// [`JsonSource`] backed by `reqwest`.
#[derive(Debug, Clone, Default)]
pub struct HttpJsonSource {
    client: reqwest::Client,
}

impl HttpJsonSource {
    #[must_use]
    pub fn new(client: reqwest::Client) -> Self {
        Self { client }
    }
}

#[async_trait]
impl JsonSource for HttpJsonSource {
    async fn get_json(&self, url: &str) -> Result<Value, DataError> {
        debug!(url = %url, "GET");
        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|source| DataError::Transport {
                url: url.to_string(),
                source,
            })?;

        let status = response.status();
        if !status.is_success() {
            return Err(DataError::Http {
                status,
                url: url.to_string(),
            });
        }

        response.json().await.map_err(|source| DataError::Decode {
            url: url.to_string(),
            source,
        })
    }
}

/// Couples a [`JsonSource`] with a [`JsonCache`]; every GET is cached under its URL.
#[derive(Clone)]
pub struct CachedClient {
    source: Arc<dyn JsonSource>,
    cache: JsonCache,
}

impl CachedClient {
    pub fn new(source: Arc<dyn JsonSource>, cache: JsonCache) -> Self {
        Self { source, cache }
    }

    /// Cached GET returning raw JSON.
    ///
    /// # Errors
    /// Returns the upstream error when no cached payload can be served.
    pub async fn get_json(&self, url: &str, options: CacheOptions) -> Result<Value, DataError> {
        let source = self.source.clone();
        let target = url.to_string();
        self.cache
            .cached_fetch(
                url,
                move || async move { source.get_json(&target).await },
                options,
            )
            .await
    }

    /// Cached GET deserialized into `T`.
    ///
    /// # Errors
    /// Returns the upstream error, or [`DataError::Schema`] when the payload
    /// does not match `T`.
    pub async fn get<T: DeserializeOwned>(
        &self,
        url: &str,
        options: CacheOptions,
    ) -> Result<T, DataError> {
        let value = self.get_json(url, options).await?;
        serde_json::from_value(value).map_err(|source| DataError::Schema {
            url: url.to_string(),
            source,
        })
    }
}
