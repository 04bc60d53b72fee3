//! Prelude module for convenient imports.
//!
//! # Example
//!
//! ```rust
//! use xlmfish_domain::prelude::*;
//! ```

pub use crate::asset::{Asset, AssetType};
pub use crate::chart::{
    ChartMetric, DatasetOptions, DisplaySize, TopN, TopNDataset, build_pool_dataset, build_top_n,
};
pub use crate::enums::{PoolStatus, RunState};
pub use crate::error::DomainError;
pub use crate::market::{DEFAULT_TOTAL_SUPPLY, MarketSnapshot};
pub use crate::pool::{Pool, PoolSort, Reserve};
pub use crate::price::Quote;
