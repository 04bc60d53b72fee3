//! Market aggregation for the XLMFISH token.
//!
//! Combines Horizon trade aggregations, liquidity pools and asset records
//! with the CoinGecko XLM price into:
//! - A [`MarketSnapshot`](xlmfish_domain::market::MarketSnapshot) of price,
//!   24h volume and market cap
//! - A [`PoolOverview`] of pools, totals and a Top-N distribution dataset

/// Runtime configuration.
pub mod config;
/// Error types.
pub mod error;
/// Pool overview assembly.
pub mod overview;
/// Aggregation pipeline.
pub mod service;

pub use config::MarketConfig;
pub use error::MarketError;
pub use overview::{PoolOverview, PoolQuery};
pub use service::MarketService;
