//! Error types for fetching and caching.

use thiserror::Error;

/// Failure while fetching upstream JSON.
#[derive(Debug, Error)]
pub enum DataError {
    /// The upstream answered with a non-success status.
    #[error("fetch failed {status} for {url}")]
    Http {
        status: reqwest::StatusCode,
        url: String,
    },
    /// The request never produced a response.
    #[error("request to {url} failed: {source}")]
    Transport {
        url: String,
        #[source]
        source: reqwest::Error,
    },
    /// The response body was not JSON.
    #[error("invalid JSON from {url}: {source}")]
    Decode {
        url: String,
        #[source]
        source: reqwest::Error,
    },
    /// The JSON did not match the expected shape.
    #[error("unexpected response shape from {url}: {source}")]
    Schema {
        url: String,
        #[source]
        source: serde_json::Error,
    },
    /// The URL could not be built.
    #[error("invalid url: {0}")]
    Url(#[from] url::ParseError),
    /// Cache keys must be non-empty.
    #[error("cache key must not be empty")]
    EmptyKey,
    /// Any other failure reported by a custom source.
    #[error("{0}")]
    Other(String),
}

/// Failure inside a key/value store. Never surfaced by the cache.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("storage I/O failed: {0}")]
    Io(#[from] std::io::Error),
    #[error("storage serialization failed: {0}")]
    Serialization(#[from] serde_json::Error),
    #[error("storage quota exceeded: {needed} bytes needed, {quota} allowed")]
    QuotaExceeded { needed: usize, quota: usize },
}
