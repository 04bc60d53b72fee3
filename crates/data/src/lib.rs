//! Data access for the XLMFISH market toolkit.
//!
//! This crate provides:
//! - A stale-while-revalidate JSON cache over pluggable key/value stores
//! - An HTTP JSON source built on `reqwest`
//! - Horizon and CoinGecko clients with typed, lenient response schemas

/// JSON cache and key/value stores.
pub mod cache;
/// Lenient numeric parsing.
pub mod coerce;
/// Error types.
pub mod error;
/// HTTP JSON sources.
pub mod http;
/// Upstream API clients.
pub mod providers;
/// Upstream response shapes.
pub mod schema;
/// Canned JSON source for tests.
#[cfg(any(test, feature = "test-util"))]
pub mod testing;

pub use cache::{CacheOptions, CacheSource, JsonCache};
pub use error::{DataError, StoreError};
pub use http::{CachedClient, HttpJsonSource, JsonSource};
pub use providers::{CacheTtls, CoinGeckoClient, HorizonClient};
