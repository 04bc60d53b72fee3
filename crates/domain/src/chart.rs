//! Top-N distribution datasets with an "Other" roll-up.

use crate::error::DomainError;
use crate::pool::Pool;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Label of the roll-up category.
pub const OTHER_LABEL: &str = "Other";
/// Label of the placeholder category used when there is nothing to chart.
pub const NO_DATA_LABEL: &str = "No data";

/// Default minimum share of the total the "Other" bucket must reach.
pub const DEFAULT_MIN_OTHER_PCT: Decimal = Decimal::from_parts(1, 0, 0, false, 2);

/// Which pool figure a dataset is built from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChartMetric {
    /// USD value of the tracked-asset reserve.
    Usd,
    /// Tracked-asset reserve.
    Liquidity,
}

impl ChartMetric {
    /// Value of `pool` under this metric. Unknown values count as zero.
    #[must_use]
    pub fn value_of(&self, pool: &Pool) -> Decimal {
        match self {
            ChartMetric::Usd => pool.usd_value.unwrap_or(Decimal::ZERO),
            ChartMetric::Liquidity => pool.liquidity,
        }
    }

    /// `Usd` if any pool has a positive USD value, otherwise `Liquidity`.
    #[must_use]
    pub fn auto(pools: &[Pool]) -> Self {
        if pools
            .iter()
            .any(|p| p.usd_value.is_some_and(|v| v > Decimal::ZERO))
        {
            ChartMetric::Usd
        } else {
            ChartMetric::Liquidity
        }
    }
}

impl fmt::Display for ChartMetric {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ChartMetric::Usd => f.write_str("usd"),
            ChartMetric::Liquidity => f.write_str("liquidity"),
        }
    }
}

impl FromStr for ChartMetric {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "usd" => Ok(ChartMetric::Usd),
            "liquidity" | "fish" => Ok(ChartMetric::Liquidity),
            other => Err(DomainError::UnknownMetric(other.to_string())),
        }
    }
}

/// Display width classes, replacing viewport media queries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DisplaySize {
    /// Narrower than 768 px.
    Small,
    /// 768 px up to 1279 px.
    Medium,
    /// 1280 px and wider.
    ExtraLarge,
}

impl DisplaySize {
    #[must_use]
    pub fn from_width(px: u32) -> Self {
        if px >= 1280 {
            DisplaySize::ExtraLarge
        } else if px >= 768 {
            DisplaySize::Medium
        } else {
            DisplaySize::Small
        }
    }

    /// Number of named categories shown at this size.
    #[must_use]
    pub fn top_n(&self) -> usize {
        match self {
            DisplaySize::Small => 5,
            DisplaySize::Medium => 7,
            DisplaySize::ExtraLarge => 8,
        }
    }
}

/// How many named categories to keep.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TopN {
    Explicit(usize),
    Auto(DisplaySize),
}

impl TopN {
    #[must_use]
    pub fn resolve(&self) -> usize {
        match self {
            TopN::Explicit(n) => *n,
            TopN::Auto(size) => size.top_n(),
        }
    }
}

impl Default for TopN {
    fn default() -> Self {
        TopN::Auto(DisplaySize::Small)
    }
}

/// Options for [`build_pool_dataset`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DatasetOptions {
    /// `None` picks a metric with [`ChartMetric::auto`].
    pub metric: Option<ChartMetric>,
    pub top_n: TopN,
    /// Fraction of the total (0.01 = 1%) below which "Other" is dropped.
    pub min_other_pct: Decimal,
}

impl Default for DatasetOptions {
    fn default() -> Self {
        Self {
            metric: None,
            top_n: TopN::default(),
            min_other_pct: DEFAULT_MIN_OTHER_PCT,
        }
    }
}

/// Chart-ready categories and magnitudes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TopNDataset {
    pub labels: Vec<String>,
    pub values: Vec<Decimal>,
    /// Sum of `values`, or 1 for the "No data" placeholder.
    pub total: Decimal,
    /// Sum of every input value, including a remainder too small to chart.
    /// Shares are taken against it.
    pub input_total: Decimal,
    /// Value of the "Other" category when it was emitted.
    pub other_bucket: Option<Decimal>,
}

impl TopNDataset {
    /// Single-category placeholder for empty or all-zero input.
    #[must_use]
    pub fn no_data() -> Self {
        Self {
            labels: vec![NO_DATA_LABEL.to_string()],
            values: vec![Decimal::ONE],
            total: Decimal::ONE,
            input_total: Decimal::ONE,
            other_bucket: None,
        }
    }

    #[must_use]
    pub fn is_placeholder(&self) -> bool {
        self.labels.len() == 1 && self.labels[0] == NO_DATA_LABEL && self.other_bucket.is_none()
    }

    /// Share of all input held by the category at `index`, in percent.
    #[must_use]
    pub fn percent_of_total(&self, index: usize) -> Option<Decimal> {
        let value = self.values.get(index)?;
        if self.input_total <= Decimal::ZERO {
            return Some(Decimal::ZERO);
        }
        Some(*value / self.input_total * Decimal::ONE_HUNDRED)
    }

    /// `(label, value)` pairs in display order.
    pub fn entries(&self) -> impl Iterator<Item = (&str, Decimal)> {
        self.labels
            .iter()
            .map(String::as_str)
            .zip(self.values.iter().copied())
    }
}

/// Builds a Top-N dataset from arbitrary weighted items.
///
/// Items are sorted by value, descending; equal values keep their input
/// order. The remainder beyond `top_n` becomes an "Other" category only if
/// it is positive and at least `min_other_pct` of the total.
pub fn build_top_n<T, L, V>(
    items: &[T],
    label: L,
    value: V,
    top_n: usize,
    min_other_pct: Decimal,
) -> TopNDataset
where
    L: Fn(&T) -> String,
    V: Fn(&T) -> Decimal,
{
    let mut weighted: Vec<(&T, Decimal)> = items.iter().map(|item| (item, value(item))).collect();
    weighted.sort_by(|a, b| b.1.cmp(&a.1));

    let input_total: Decimal = weighted.iter().map(|(_, v)| *v).sum();
    if weighted.is_empty() || input_total <= Decimal::ZERO {
        return TopNDataset::no_data();
    }

    let split = top_n.min(weighted.len());
    let (top, rest) = weighted.split_at(split);

    let mut labels: Vec<String> = top.iter().map(|(item, _)| label(*item)).collect();
    let mut values: Vec<Decimal> = top.iter().map(|(_, v)| *v).collect();

    let rest_sum: Decimal = rest.iter().map(|(_, v)| *v).sum();
    let other_bucket = if !rest.is_empty()
        && rest_sum > Decimal::ZERO
        && rest_sum / input_total >= min_other_pct
    {
        labels.push(OTHER_LABEL.to_string());
        values.push(rest_sum);
        Some(rest_sum)
    } else {
        None
    };

    TopNDataset {
        total: values.iter().copied().sum(),
        labels,
        values,
        input_total,
        other_bucket,
    }
}

/// Builds the pool distribution dataset. Returns the metric that was used.
#[must_use]
pub fn build_pool_dataset(pools: &[Pool], options: &DatasetOptions) -> (ChartMetric, TopNDataset) {
    let metric = options.metric.unwrap_or_else(|| ChartMetric::auto(pools));
    let dataset = build_top_n(
        pools,
        |p| p.name.clone(),
        |p| metric.value_of(p),
        options.top_n.resolve(),
        options.min_other_pct,
    );
    (metric, dataset)
}
