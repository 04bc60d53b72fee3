//! Response shapes of the upstream APIs.

use crate::coerce;
use rust_decimal::Decimal;
use serde::Deserialize;
use xlmfish_domain::asset::Asset;
use xlmfish_domain::pool::{Pool, Reserve};

/// Horizon collection page (`_embedded.records`).
#[derive(Debug, Clone, Deserialize)]
#[serde(bound(deserialize = "T: Deserialize<'de>"))]
pub struct Page<T> {
    #[serde(rename = "_embedded", default)]
    embedded: Option<Embedded<T>>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(bound(deserialize = "T: Deserialize<'de>"))]
struct Embedded<T> {
    #[serde(default = "Vec::new")]
    records: Vec<T>,
}

impl<T> Page<T> {
    /// Records of the page; empty when Horizon returned none.
    pub fn into_records(self) -> Vec<T> {
        self.embedded.map(|e| e.records).unwrap_or_default()
    }
}

/// One `/trade_aggregations` bucket.
#[derive(Debug, Clone, Deserialize)]
pub struct TradeAggregationRecord {
    /// Bucket start, epoch milliseconds.
    #[serde(default, deserialize_with = "coerce::decimal")]
    pub timestamp: Decimal,
    #[serde(default, deserialize_with = "coerce::decimal")]
    pub base_volume: Decimal,
    #[serde(default, deserialize_with = "coerce::decimal")]
    pub counter_volume: Decimal,
    #[serde(default, deserialize_with = "coerce::optional_decimal")]
    pub avg: Option<Decimal>,
    #[serde(default, deserialize_with = "coerce::optional_decimal")]
    pub close: Option<Decimal>,
}

/// One reserve entry of a liquidity pool.
#[derive(Debug, Clone, Deserialize)]
pub struct ReserveRecord {
    #[serde(default)]
    pub asset: String,
    #[serde(default, deserialize_with = "coerce::decimal")]
    pub amount: Decimal,
}

/// One `/liquidity_pools` record.
#[derive(Debug, Clone, Deserialize)]
pub struct LiquidityPoolRecord {
    #[serde(default)]
    pub id: String,
    #[serde(default, deserialize_with = "coerce::decimal")]
    pub total_shares: Decimal,
    #[serde(default)]
    pub reserves: Vec<ReserveRecord>,
}

impl LiquidityPoolRecord {
    /// Domain pool seen from `tracked`'s side; no USD value yet.
    #[must_use]
    pub fn to_pool(&self, tracked: &Asset) -> Pool {
        let reserves = self
            .reserves
            .iter()
            .map(|r| Reserve::new(r.asset.clone(), r.amount))
            .collect();
        Pool::from_reserves(self.id.clone(), reserves, self.total_shares, tracked)
    }
}

/// One `/assets` record.
#[derive(Debug, Clone, Deserialize)]
pub struct AssetRecord {
    #[serde(default)]
    pub asset_code: String,
    #[serde(default)]
    pub asset_issuer: String,
    /// Issued amount; absent on newer Horizon versions.
    #[serde(default, deserialize_with = "coerce::optional_decimal")]
    pub amount: Option<Decimal>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;
    use serde_json::json;
    use xlmfish_domain::enums::PoolStatus;

    const FISH: &str = "XLMFISH:GAX3YQC26LTS6NLW2QGRQC4MK24XKL5JLZ7KFHNERWPC3HKCT2ABTEMT";

    #[test]
    fn test_trade_aggregation_page() {
        let page: Page<TradeAggregationRecord> = serde_json::from_value(json!({
            "_embedded": {"records": [
                {"timestamp": 1700000000000i64, "base_volume": "1200.5000000", "counter_volume": "3.1", "avg": "0.0025", "close": "0.0026", "trade_count": "12"},
                {"timestamp": "1700003600000", "base_volume": "bogus"}
            ]}
        }))
        .unwrap();
        let records = page.into_records();

        assert_eq!(records.len(), 2);
        assert_eq!(records[0].base_volume, dec!(1200.5));
        assert_eq!(records[0].close, Some(dec!(0.0026)));
        assert_eq!(records[1].base_volume, Decimal::ZERO);
        assert_eq!(records[1].close, None);
        assert_eq!(records[1].avg, None);
    }

    #[test]
    fn test_missing_embedded_is_empty() {
        let page: Page<LiquidityPoolRecord> = serde_json::from_value(json!({})).unwrap();
        assert!(page.into_records().is_empty());

        let page: Page<LiquidityPoolRecord> =
            serde_json::from_value(json!({"_embedded": {}})).unwrap();
        assert!(page.into_records().is_empty());
    }

    #[test]
    fn test_pool_record_to_pool() {
        let record: LiquidityPoolRecord = serde_json::from_value(json!({
            "id": "pool-1",
            "fee_bp": 30,
            "total_shares": "0.0000000",
            "reserves": [
                {"asset": FISH, "amount": "1000.0000000"},
                {"asset": "native", "amount": "20.0000000"}
            ]
        }))
        .unwrap();
        let fish: Asset = FISH.parse().unwrap();
        let pool = record.to_pool(&fish);

        assert_eq!(pool.name, "XLMFISH/XLM");
        assert_eq!(pool.liquidity, dec!(1000));
        assert_eq!(pool.status, PoolStatus::Inactive);
    }

    #[test]
    fn test_asset_record() {
        let page: Page<AssetRecord> = serde_json::from_value(json!({
            "_embedded": {"records": [{"asset_code": "XLMFISH", "asset_issuer": "G...", "amount": "999999999.0000000"}]}
        }))
        .unwrap();
        let record = page.into_records().remove(0);
        assert_eq!(record.amount, Some(dec!(999999999)));
    }
}
