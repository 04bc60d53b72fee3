//! Liquidity pools that hold the tracked asset.

use crate::asset::{Asset, short_code_of};
use crate::enums::PoolStatus;
use crate::error::DomainError;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::str::FromStr;

/// Name shown for pools whose listing has fewer than two reserves.
pub const UNNAMED_POOL: &str = "—";

/// One side of a pool as listed by Horizon.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Reserve {
    /// Canonical asset string (`native` or `CODE:ISSUER`).
    pub asset: String,
    /// Reserve amount in whole units.
    pub amount: Decimal,
}

impl Reserve {
    pub fn new(asset: impl Into<String>, amount: Decimal) -> Self {
        Self {
            asset: asset.into(),
            amount,
        }
    }
}

/// A liquidity pool viewed from the tracked asset's side.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Pool {
    pub id: String,
    /// `A/B` from the first two reserves.
    pub name: String,
    /// Reserve of the tracked asset in this pool.
    pub liquidity: Decimal,
    /// `liquidity * price`, unknown without a price.
    pub usd_value: Option<Decimal>,
    pub status: PoolStatus,
    pub reserves: Vec<Reserve>,
}

impl Pool {
    /// Builds a pool from a listing record.
    ///
    /// `tracked` selects the reserve reported as `liquidity`; pools without
    /// it report zero.
    pub fn from_reserves(
        id: impl Into<String>,
        reserves: Vec<Reserve>,
        total_shares: Decimal,
        tracked: &Asset,
    ) -> Self {
        let tracked = tracked.canonical();
        let liquidity = reserves
            .iter()
            .find(|r| r.asset == tracked)
            .map(|r| r.amount)
            .unwrap_or(Decimal::ZERO);
        let status = if total_shares > Decimal::ZERO {
            PoolStatus::Active
        } else {
            PoolStatus::Inactive
        };

        Self {
            id: id.into(),
            name: pool_name(&reserves),
            liquidity,
            usd_value: None,
            status,
            reserves,
        }
    }

    /// Sets `usd_value` from a price; an unknown price clears it.
    pub fn apply_price(&mut self, price_usd: Option<Decimal>) {
        self.usd_value = price_usd.map(|p| self.liquidity * p);
    }

    #[must_use]
    pub fn is_active(&self) -> bool {
        self.status == PoolStatus::Active
    }
}

/// `A/B` from the first two reserves, or [`UNNAMED_POOL`].
#[must_use]
pub fn pool_name(reserves: &[Reserve]) -> String {
    match reserves {
        [a, b, ..] => format!("{}/{}", short_code_of(&a.asset), short_code_of(&b.asset)),
        _ => UNNAMED_POOL.to_string(),
    }
}

/// Sum of tracked-asset liquidity across pools.
#[must_use]
pub fn total_liquidity(pools: &[Pool]) -> Decimal {
    pools.iter().map(|p| p.liquidity).sum()
}

/// The `n` pools with the most tracked-asset liquidity, ties kept in input order.
#[must_use]
pub fn top_by_liquidity(pools: &[Pool], n: usize) -> Vec<Pool> {
    let mut sorted = pools.to_vec();
    sorted.sort_by(|a, b| b.liquidity.cmp(&a.liquidity));
    sorted.truncate(n);
    sorted
}

/// Case-insensitive substring filter on pool names.
#[must_use]
pub fn filter_by_name(pools: &[Pool], query: &str) -> Vec<Pool> {
    let query = query.to_lowercase();
    pools
        .iter()
        .filter(|p| p.name.to_lowercase().contains(&query))
        .cloned()
        .collect()
}

/// Pool table orderings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum PoolSort {
    #[default]
    UsdDesc,
    UsdAsc,
    LiquidityDesc,
    LiquidityAsc,
    NameAsc,
    NameDesc,
}

impl PoolSort {
    pub const ALL: [PoolSort; 6] = [
        PoolSort::UsdDesc,
        PoolSort::UsdAsc,
        PoolSort::LiquidityDesc,
        PoolSort::LiquidityAsc,
        PoolSort::NameAsc,
        PoolSort::NameDesc,
    ];

    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            PoolSort::UsdDesc => "usd-desc",
            PoolSort::UsdAsc => "usd-asc",
            PoolSort::LiquidityDesc => "liquidity-desc",
            PoolSort::LiquidityAsc => "liquidity-asc",
            PoolSort::NameAsc => "name-asc",
            PoolSort::NameDesc => "name-desc",
        }
    }

    /// USD orders cannot be applied without a price and fall back to
    /// `LiquidityDesc`.
    #[must_use]
    pub fn effective(self, price_known: bool) -> Self {
        match self {
            PoolSort::UsdDesc | PoolSort::UsdAsc if !price_known => PoolSort::LiquidityDesc,
            other => other,
        }
    }
}

impl FromStr for PoolSort {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        PoolSort::ALL
            .into_iter()
            .find(|sort| sort.as_str() == s)
            .ok_or_else(|| DomainError::UnknownSortOrder(s.to_string()))
    }
}

/// Sorts pools in place. The sort is stable.
pub fn sort_pools(pools: &mut [Pool], sort: PoolSort, price_known: bool) {
    let usd = |p: &Pool| p.usd_value.unwrap_or(p.liquidity);
    match sort.effective(price_known) {
        PoolSort::UsdDesc => pools.sort_by(|a, b| usd(b).cmp(&usd(a))),
        PoolSort::UsdAsc => pools.sort_by(|a, b| usd(a).cmp(&usd(b))),
        PoolSort::LiquidityDesc => pools.sort_by(|a, b| b.liquidity.cmp(&a.liquidity)),
        PoolSort::LiquidityAsc => pools.sort_by(|a, b| a.liquidity.cmp(&b.liquidity)),
        PoolSort::NameAsc => pools.sort_by(|a, b| compare_names(&a.name, &b.name)),
        PoolSort::NameDesc => pools.sort_by(|a, b| compare_names(&b.name, &a.name)),
    }
}

fn compare_names(a: &str, b: &str) -> Ordering {
    a.to_lowercase()
        .cmp(&b.to_lowercase())
        .then_with(|| a.cmp(b))
}
