//! Clients for the upstream data sources.
//!
//! - Horizon: trade aggregations, liquidity pools and asset records.
//! - CoinGecko: USD spot prices.
//!
//! Every request goes through [`CachedClient`](crate::http::CachedClient),
//! keyed by its full URL.

mod coingecko;
mod horizon;

pub use coingecko::{COINGECKO_URL, CoinGeckoClient};
pub use horizon::{AggregationWindow, HORIZON_URL, HorizonClient, ONE_DAY_MS, ONE_HOUR_MS};

use std::time::Duration;

/// Per-endpoint cache lifetimes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CacheTtls {
    /// Latest daily trade aggregation (spot rate).
    pub price: Duration,
    /// Oracle USD price.
    pub oracle: Duration,
    /// Liquidity pool listing.
    pub pools: Duration,
    /// Hourly buckets used for 24h volume.
    pub volume: Duration,
    /// Asset record (issued amount).
    pub asset: Duration,
}

impl Default for CacheTtls {
    fn default() -> Self {
        Self {
            price: Duration::from_secs(60),
            oracle: Duration::from_secs(60),
            pools: Duration::from_secs(2 * 60),
            volume: Duration::from_secs(60),
            asset: Duration::from_secs(10 * 60),
        }
    }
}
