//! Pool overview assembly.

use rust_decimal::Decimal;
use serde::Serialize;
use xlmfish_domain::chart::{ChartMetric, DatasetOptions, TopNDataset, build_pool_dataset};
use xlmfish_domain::pool::{Pool, PoolSort, filter_by_name, sort_pools, top_by_liquidity, total_liquidity};

/// Number of pools in [`PoolOverview::top_pools`].
pub const TOP_POOLS: usize = 10;

/// What the pool table should show.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PoolQuery {
    pub sort: PoolSort,
    /// Case-insensitive name filter; blank shows everything.
    pub search: Option<String>,
    pub dataset: DatasetOptions,
}

/// Everything the liquidity-pool view renders.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PoolOverview {
    pub price_usd: Option<Decimal>,
    /// Pools after search and sort.
    pub pools: Vec<Pool>,
    /// Number of pools before the search filter.
    pub pool_count: usize,
    /// Tracked-asset liquidity across all pools.
    pub total_liquidity: Decimal,
    pub total_liquidity_usd: Option<Decimal>,
    pub top_pools: Vec<Pool>,
    pub metric: ChartMetric,
    pub dataset: TopNDataset,
    /// Order actually applied, after the no-price fallback.
    pub sort: PoolSort,
}

impl PoolOverview {
    /// Builds the overview from priced pools.
    ///
    /// Totals, the top list and the dataset cover every pool; search and sort
    /// only shape `pools`.
    #[must_use]
    pub fn build(pools: Vec<Pool>, price_usd: Option<Decimal>, query: &PoolQuery) -> Self {
        let total = total_liquidity(&pools);
        let top_pools = top_by_liquidity(&pools, TOP_POOLS);
        let (metric, dataset) = build_pool_dataset(&pools, &query.dataset);
        let pool_count = pools.len();

        let mut shown = match query.search.as_deref().map(str::trim) {
            Some(text) if !text.is_empty() => filter_by_name(&pools, text),
            _ => pools,
        };
        let price_known = price_usd.is_some();
        sort_pools(&mut shown, query.sort, price_known);

        Self {
            price_usd,
            pools: shown,
            pool_count,
            total_liquidity: total,
            total_liquidity_usd: price_usd.and_then(|p| total.checked_mul(p)),
            top_pools,
            metric,
            dataset,
            sort: query.sort.effective(price_known),
        }
    }
}
