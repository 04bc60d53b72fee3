//! Terminal rendering of the market and pool views.

use prettytable::{Table, row};
use rust_decimal::Decimal;
use serde::Serialize;
use xlmfish_domain::asset::Asset;
use xlmfish_domain::chart::{ChartMetric, TopNDataset};
use xlmfish_domain::enums::RunState;
use xlmfish_domain::format::{self, UNKNOWN};
use xlmfish_domain::market::MarketSnapshot;
use xlmfish_market::PoolOverview;

pub const POOLS_ERROR: &str = "Error loading data from Horizon";

/// Decimals shown for the token price.
const PRICE_DP: u32 = 8;

/// JSON envelope of one run.
#[derive(Debug, Serialize)]
pub struct RunReport<'a, T: Serialize> {
    pub status: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<&'a T>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<&'a str>,
}

impl<'a, T: Serialize> RunReport<'a, T> {
    pub fn new(state: &'a RunState, data: Option<&'a T>) -> Self {
        let (status, error) = match state {
            RunState::Idle => ("idle", None),
            RunState::Fetching => ("fetching", None),
            RunState::Rendered => ("rendered", None),
            RunState::Failed(message) => ("failed", Some(message.as_str())),
        };
        Self { status, data, error }
    }
}

/// Market overview cards as a two-column table.
pub fn market_table(asset: &Asset, snapshot: &MarketSnapshot) -> Table {
    let code = asset.short_code();
    let mut table = Table::new();
    table.set_titles(row!["Metric", "Value"]);
    table.add_row(row!["Price", format::usd_price(snapshot.price_usd, PRICE_DP)]);
    table.add_row(row![
        "24h Volume",
        format!("{} {code}", format::amount(snapshot.volume_24h))
    ]);
    table.add_row(row!["24h Volume (USD)", format::usd(snapshot.volume_24h_usd)]);
    table.add_row(row![
        "Supply",
        format!("{} {code}", format::amount(snapshot.supply))
    ]);
    table.add_row(row!["Market Cap", format::usd(snapshot.market_cap_usd)]);
    table
}

/// Pool table after a failed run.
pub fn pools_placeholder() -> Table {
    let mut table = Table::new();
    table.set_titles(row!["Pool", "Liquidity", "USD Value", "Status", "ID"]);
    table.add_row(row![UNKNOWN, UNKNOWN, UNKNOWN, UNKNOWN, UNKNOWN]);
    table
}

/// Pool table in display order.
pub fn pools_table(asset: &Asset, overview: &PoolOverview) -> Table {
    let mut table = Table::new();
    table.set_titles(row![
        "Pool",
        format!("{} Liquidity", asset.short_code()),
        "USD Value",
        "Status",
        "ID"
    ]);
    for pool in &overview.pools {
        table.add_row(row![
            pool.name,
            format::amount(pool.liquidity),
            format::usd(pool.usd_value),
            pool.status,
            pool.id
        ]);
    }
    table
}

/// Top-N distribution with shares of the total.
pub fn dataset_table(metric: ChartMetric, dataset: &TopNDataset) -> Table {
    let mut table = Table::new();
    table.set_titles(row!["Category", metric_title(metric), "Share"]);
    if dataset.is_placeholder() {
        table.add_row(row![dataset.labels[0], UNKNOWN, UNKNOWN]);
        return table;
    }
    for (index, (label, value)) in dataset.entries().enumerate() {
        let share = dataset
            .percent_of_total(index)
            .map(format::percent)
            .unwrap_or_else(|| UNKNOWN.to_string());
        table.add_row(row![label, metric_value(metric, value), share]);
    }
    table
}

/// Summary lines above the pool table.
pub fn pool_summary(asset: &Asset, overview: &PoolOverview) -> Vec<String> {
    let code = asset.short_code();
    let mut lines = vec![
        format!("Price: {}", format::usd_price(overview.price_usd, PRICE_DP)),
        format!(
            "Total liquidity: {} {code} ({})",
            format::amount(overview.total_liquidity),
            format::usd(overview.total_liquidity_usd)
        ),
        format!(
            "Pools: {} shown of {} (sorted {})",
            overview.pools.len(),
            overview.pool_count,
            overview.sort.as_str()
        ),
    ];
    if !overview.top_pools.is_empty() {
        let names: Vec<&str> = overview.top_pools.iter().map(|p| p.name.as_str()).collect();
        lines.push(format!("Largest: {}", names.join(", ")));
    }
    lines
}

/// Summary lines after a failed run.
pub fn pool_summary_placeholder() -> Vec<String> {
    vec![
        format!("Price: {UNKNOWN}"),
        format!("Total liquidity: {UNKNOWN}"),
        POOLS_ERROR.to_string(),
    ]
}

fn metric_title(metric: ChartMetric) -> &'static str {
    match metric {
        ChartMetric::Usd => "USD Value",
        ChartMetric::Liquidity => "Liquidity",
    }
}

fn metric_value(metric: ChartMetric, value: Decimal) -> String {
    match metric {
        ChartMetric::Usd => format::usd(Some(value)),
        ChartMetric::Liquidity => format::amount(value),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;
    use xlmfish_domain::chart::build_top_n;
    use xlmfish_domain::market::DEFAULT_TOTAL_SUPPLY;

    fn fish() -> Asset {
        Asset::credit("XLMFISH", "GFISH")
    }

    #[test]
    fn test_market_table_unknown_price() {
        let snapshot = MarketSnapshot::compose(None, dec!(1234.5), None, DEFAULT_TOTAL_SUPPLY);
        let rendered = market_table(&fish(), &snapshot).to_string();

        assert!(rendered.contains("1,234.5 XLMFISH"));
        assert!(rendered.contains("1,000,000,000 XLMFISH"));
        assert!(rendered.contains(UNKNOWN));
        assert!(!rendered.contains("$0.00"));
        assert!(!rendered.contains("Error"));
    }

    #[test]
    fn test_market_table_with_price() {
        let snapshot =
            MarketSnapshot::compose(Some(dec!(0.0005)), dec!(2000), None, DEFAULT_TOTAL_SUPPLY);
        let rendered = market_table(&fish(), &snapshot).to_string();

        assert!(rendered.contains("$0.0005"));
        assert!(rendered.contains("$1.00"));
        assert!(rendered.contains("$500,000.00"));
    }

    #[test]
    fn test_dataset_table_shares() {
        let items = [("A", dec!(50)), ("B", dec!(30)), ("C", dec!(15)), ("D", dec!(5))];
        let dataset = build_top_n(&items, |i| i.0.to_string(), |i| i.1, 2, dec!(0.01));
        let rendered = dataset_table(ChartMetric::Liquidity, &dataset).to_string();

        assert!(rendered.contains("Other"));
        assert!(rendered.contains("50.0%"));
        assert!(rendered.contains("20.0%"));
    }

    #[test]
    fn test_dataset_placeholder() {
        let rendered = dataset_table(ChartMetric::Usd, &TopNDataset::no_data()).to_string();
        assert!(rendered.contains("No data"));
        assert!(!rendered.contains("100.0%"));
    }

    #[test]
    fn test_placeholders_show_unknown() {
        let rendered = pools_placeholder().to_string();
        assert!(rendered.contains(UNKNOWN));
        assert!(pool_summary_placeholder().contains(&POOLS_ERROR.to_string()));
    }

    #[test]
    fn test_unknown_price_report_is_not_an_error() {
        let mut state = RunState::default();
        state.start();
        state.succeed();
        let snapshot = MarketSnapshot::compose(None, dec!(10), None, DEFAULT_TOTAL_SUPPLY);

        let json = serde_json::to_value(RunReport::new(&state, Some(&snapshot))).unwrap();
        assert_eq!(json["status"], "rendered");
        assert!(json.get("error").is_none());
        assert!(json["data"]["price_usd"].is_null());
    }

    #[test]
    fn test_run_report() {
        let state = RunState::Failed(POOLS_ERROR.to_string());
        let json = serde_json::to_value(RunReport::<MarketSnapshot>::new(&state, None)).unwrap();
        assert_eq!(json["status"], "failed");
        assert_eq!(json["error"], POOLS_ERROR);
        assert!(json.get("data").is_none());
    }
}
