//! Domain types for the XLMFISH market toolkit.
//!
//! Everything in this crate is pure: assets and pools as the tracked
//! asset sees them, USD price composition, the market snapshot, Top-N chart
//! datasets and value formatting. Fetching lives in `xlmfish-data`.

/// Stellar assets.
pub mod asset;
/// Top-N chart datasets.
pub mod chart;
/// Shared enums.
pub mod enums;
/// Error types.
pub mod error;
/// Display formatting.
pub mod format;
/// Market snapshot.
pub mod market;
/// Liquidity pools.
pub mod pool;
/// Prelude module for convenient imports.
pub mod prelude;
/// Price composition.
pub mod price;
