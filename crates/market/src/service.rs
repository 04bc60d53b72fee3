//! Aggregation pipeline over the Horizon and CoinGecko clients.

use crate::config::MarketConfig;
use crate::error::MarketError;
use crate::overview::{PoolOverview, PoolQuery};
use futures::future::join_all;
use rust_decimal::Decimal;
use std::collections::HashSet;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info, warn};
use xlmfish_data::cache::now_millis;
use xlmfish_data::providers::{AggregationWindow, ONE_DAY_MS};
use xlmfish_data::schema::LiquidityPoolRecord;
use xlmfish_data::{CachedClient, CoinGeckoClient, HorizonClient, HttpJsonSource, JsonCache, JsonSource};
use xlmfish_domain::prelude::{Asset, MarketSnapshot, Pool, Quote};
use xlmfish_domain::price::bucket_rate;

/// Hours summed into the trailing volume.
const VOLUME_HOURS: i64 = 24;

const USER_AGENT: &str = concat!("xlmfish/", env!("CARGO_PKG_VERSION"));
const HTTP_TIMEOUT: Duration = Duration::from_secs(30);

/// Market figures of the tracked asset, built from cached upstream queries.
#[derive(Clone)]
pub struct MarketService {
    horizon: HorizonClient,
    coingecko: CoinGeckoClient,
    cache: JsonCache,
    config: MarketConfig,
}

impl MarketService {
    pub fn new(config: MarketConfig, source: Arc<dyn JsonSource>, cache: JsonCache) -> Self {
        let client = CachedClient::new(source, cache.clone());
        Self {
            horizon: HorizonClient::new(&config.horizon_url, client.clone(), config.ttls),
            coingecko: CoinGeckoClient::new(&config.coingecko_url, client, config.ttls),
            cache,
            config,
        }
    }

    /// Service talking to the configured endpoints over HTTP.
    ///
    /// # Errors
    /// Returns an error if the HTTP client cannot be built.
    pub fn connect(config: MarketConfig, cache: JsonCache) -> Result<Self, MarketError> {
        let client = reqwest::Client::builder()
            .user_agent(USER_AGENT)
            .timeout(HTTP_TIMEOUT)
            .build()
            .map_err(|e| MarketError::Config(format!("http client: {e}")))?;
        Ok(Self::new(config, Arc::new(HttpJsonSource::new(client)), cache))
    }

    #[must_use]
    pub fn config(&self) -> &MarketConfig {
        &self.config
    }

    /// Waits until stale entries served so far have been refreshed.
    pub async fn settle(&self) {
        self.cache.settle().await;
    }

    /// Both legs of the USD price, fetched concurrently.
    ///
    /// A leg that fails to resolve is logged and left unknown.
    pub async fn quote(&self) -> Quote {
        let asset = &self.config.asset;
        let (bucket, oracle) = tokio::join!(
            self.horizon
                .latest_trade_aggregation(asset, &Asset::Native, ONE_DAY_MS),
            self.coingecko.usd_price(&self.config.oracle_coin),
        );

        let price_in_counter = match bucket {
            Ok(bucket) => bucket.and_then(|b| bucket_rate(b.close, b.avg)),
            Err(e) => {
                warn!(asset = %asset, error = %e, "Native rate unavailable");
                None
            }
        };
        let counter_usd = match oracle {
            Ok(usd) => usd,
            Err(e) => {
                warn!(coin = %self.config.oracle_coin, error = %e, "Oracle price unavailable");
                None
            }
        };

        Quote::new(price_in_counter, counter_usd)
    }

    /// USD price of the tracked asset; `None` unless both legs resolve.
    pub async fn price_usd(&self) -> Option<Decimal> {
        self.quote().await.price_usd()
    }

    async fn pool_records(&self) -> Result<Vec<LiquidityPoolRecord>, MarketError> {
        Ok(self.horizon.liquidity_pools(&self.config.asset).await?)
    }

    /// Pools holding the tracked asset, valued at `price_usd`.
    ///
    /// # Errors
    /// Returns an error if the pool listing cannot be fetched.
    pub async fn pools(&self, price_usd: Option<Decimal>) -> Result<Vec<Pool>, MarketError> {
        let records = self.pool_records().await?;
        Ok(records
            .iter()
            .map(|record| {
                let mut pool = record.to_pool(&self.config.asset);
                pool.apply_price(price_usd);
                pool
            })
            .collect())
    }

    /// Assets the tracked asset is paired with in liquidity pools.
    ///
    /// # Errors
    /// Returns an error if the pool listing cannot be fetched.
    pub async fn counter_assets(&self) -> Result<Vec<Asset>, MarketError> {
        let records = self.pool_records().await?;
        Ok(discover_counter_assets(&records, &self.config.asset))
    }

    /// Tracked-asset volume over the 24 hours before `now_ms`, summed across
    /// `counters`. Pairs whose query fails contribute zero.
    pub async fn volume_24h(&self, counters: &[Asset], now_ms: i64) -> Decimal {
        let window = AggregationWindow::trailing_hours(now_ms, VOLUME_HOURS);
        let asset = &self.config.asset;

        let volumes = join_all(counters.iter().map(|counter| async move {
            match self.horizon.trade_aggregations(asset, counter, &window).await {
                Ok(buckets) => buckets.iter().map(|b| b.base_volume).sum::<Decimal>(),
                Err(e) => {
                    warn!(counter = %counter, error = %e, "Skipping pair volume");
                    Decimal::ZERO
                }
            }
        }))
        .await;

        volumes.into_iter().sum()
    }

    /// Issued amount reported by Horizon, if any.
    ///
    /// # Errors
    /// Returns an error if the asset record cannot be fetched.
    pub async fn issued_amount(&self) -> Result<Option<Decimal>, MarketError> {
        let record = self.horizon.asset_record(&self.config.asset).await?;
        Ok(record.and_then(|r| r.amount))
    }

    /// Price, volume and market cap of the tracked asset.
    ///
    /// Every component degrades on failure: unknown price, zero volume,
    /// configured supply.
    pub async fn market_overview(&self) -> MarketSnapshot {
        info!(asset = %self.config.asset, "Loading market overview");

        let (price, counters, issued) = tokio::join!(
            self.price_usd(),
            self.counter_assets(),
            self.issued_amount(),
        );

        let counters = counters.unwrap_or_else(|e| {
            warn!(error = %e, "Counter discovery failed, volume reported as zero");
            Vec::new()
        });
        let issued = issued.unwrap_or_else(|e| {
            warn!(error = %e, "Asset record unavailable, using configured supply");
            None
        });
        debug!(counters = counters.len(), "Discovered counter assets");

        let volume = self.volume_24h(&counters, now_millis()).await;
        let snapshot = MarketSnapshot::compose(price, volume, issued, self.config.total_supply);

        info!(
            price_usd = ?snapshot.price_usd,
            volume_24h = %snapshot.volume_24h,
            "Market overview ready"
        );
        snapshot
    }

    /// Pools, totals and distribution dataset for the pool view.
    ///
    /// # Errors
    /// Returns an error if the pool listing cannot be fetched.
    pub async fn pool_overview(&self, query: &PoolQuery) -> Result<PoolOverview, MarketError> {
        info!(asset = %self.config.asset, sort = query.sort.as_str(), "Loading pool overview");

        let price = self.price_usd().await;
        let pools = self.pools(price).await?;
        let overview = PoolOverview::build(pools, price, query);

        info!(
            pools = overview.pool_count,
            metric = %overview.metric,
            "Pool overview ready"
        );
        Ok(overview)
    }
}

/// Reserve assets other than `tracked`, first occurrence kept.
///
/// Reserve strings that are not valid assets are skipped.
#[must_use]
pub fn discover_counter_assets(records: &[LiquidityPoolRecord], tracked: &Asset) -> Vec<Asset> {
    let tracked_key = tracked.dedup_key();
    let mut seen = HashSet::new();
    let mut counters = Vec::new();

    for reserve in records.iter().flat_map(|r| &r.reserves) {
        let asset: Asset = match reserve.asset.parse() {
            Ok(asset) => asset,
            Err(e) => {
                debug!(reserve = %reserve.asset, error = %e, "Ignoring reserve");
                continue;
            }
        };
        let key = asset.dedup_key();
        if key != tracked_key && seen.insert(key) {
            counters.push(asset);
        }
    }
    counters
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::DEFAULT_ASSET_ISSUER;
    use rust_decimal_macros::dec;
    use serde_json::{Value, json};
    use xlmfish_data::testing::FixtureSource;

    const PRICE: &str = "resolution=86400000";
    const ORACLE: &str = "simple/price";
    const POOLS: &str = "liquidity_pools";
    const ASSET: &str = "assets?";

    fn fish() -> String {
        format!("XLMFISH:{DEFAULT_ASSET_ISSUER}")
    }

    fn page(records: Value) -> Value {
        json!({"_embedded": {"records": records}})
    }

    fn pool_listing() -> Value {
        page(json!([
            {"id": "p1", "total_shares": "10", "reserves": [
                {"asset": fish(), "amount": "1000.0000000"},
                {"asset": "native", "amount": "50.0000000"}
            ]},
            {"id": "p2", "total_shares": "5", "reserves": [
                {"asset": "AQUA:GAQUA", "amount": "7.0000000"},
                {"asset": fish(), "amount": "3000.0000000"}
            ]},
            {"id": "p3", "total_shares": "0", "reserves": [
                {"asset": fish(), "amount": "0.0000000"},
                {"asset": "USDC:GUSDC", "amount": "0.0000000"}
            ]},
            {"id": "p4", "total_shares": "1", "reserves": [
                {"asset": fish(), "amount": "500.0000000"},
                {"asset": "AQUA:GAQUA", "amount": "1.0000000"}
            ]}
        ]))
    }

    fn service(source: Arc<FixtureSource>) -> MarketService {
        let config = MarketConfig {
            horizon_url: "https://horizon.test".to_string(),
            coingecko_url: "https://coingecko.test/api/v3".to_string(),
            ..MarketConfig::default()
        };
        MarketService::new(config, source, JsonCache::in_memory())
    }

    fn priced() -> FixtureSource {
        FixtureSource::new()
            .with_json(PRICE, page(json!([{"close": "0.002", "avg": "0.0019"}])))
            .with_json(ORACLE, json!({"stellar": {"usd": "0.25"}}))
    }

    #[test]
    fn test_discover_counter_assets_dedups_in_order() {
        let records: Vec<LiquidityPoolRecord> =
            serde_json::from_value(pool_listing()["_embedded"]["records"].clone()).unwrap();
        let fish: Asset = fish().parse().unwrap();

        let counters = discover_counter_assets(&records, &fish);
        assert_eq!(
            counters,
            vec![
                Asset::Native,
                Asset::credit("AQUA", "GAQUA"),
                Asset::credit("USDC", "GUSDC"),
            ]
        );
    }

    #[test]
    fn test_discover_skips_invalid_reserves() {
        let records: Vec<LiquidityPoolRecord> = serde_json::from_value(json!([
            {"id": "x", "total_shares": "1", "reserves": [
                {"asset": "garbage"},
                {"asset": "native", "amount": "1"}
            ]}
        ]))
        .unwrap();
        let counters = discover_counter_assets(&records, &Asset::credit("XLMFISH", "G"));
        assert_eq!(counters, vec![Asset::Native]);
    }

    #[tokio::test]
    async fn test_price_composes_both_legs() {
        let svc = service(Arc::new(priced()));
        assert_eq!(svc.price_usd().await, Some(dec!(0.0005)));
    }

    #[tokio::test]
    async fn test_price_falls_back_to_avg() {
        let source = FixtureSource::new()
            .with_json(PRICE, page(json!([{"close": "0", "avg": "0.004"}])))
            .with_json(ORACLE, json!({"stellar": {"usd": 0.5}}));
        let svc = service(Arc::new(source));
        assert_eq!(svc.price_usd().await, Some(dec!(0.002)));
    }

    #[tokio::test]
    async fn test_missing_component_is_unknown_not_zero() {
        // Oracle down.
        let source = FixtureSource::new()
            .with_json(PRICE, page(json!([{"close": "0.002"}])))
            .with_status(ORACLE, 500);
        assert_eq!(service(Arc::new(source)).price_usd().await, None);

        // No trades yet.
        let source = FixtureSource::new()
            .with_json(PRICE, page(json!([])))
            .with_json(ORACLE, json!({"stellar": {"usd": 0.25}}));
        assert_eq!(service(Arc::new(source)).price_usd().await, None);
    }

    #[tokio::test]
    async fn test_pools_are_valued_at_price() {
        let source = Arc::new(FixtureSource::new().with_json(POOLS, pool_listing()));
        let svc = service(source.clone());

        let pools = svc.pools(Some(dec!(0.001))).await.unwrap();
        assert_eq!(pools.len(), 4);
        assert_eq!(pools[0].name, "XLMFISH/XLM");
        assert_eq!(pools[0].usd_value, Some(dec!(1)));
        assert_eq!(pools[1].name, "AQUA/XLMFISH");
        assert_eq!(pools[1].liquidity, dec!(3000));
        assert!(!pools[2].is_active());

        let unpriced = svc.pools(None).await.unwrap();
        assert!(unpriced.iter().all(|p| p.usd_value.is_none()));
        assert_eq!(source.calls_matching(POOLS).await, 1);
    }

    #[tokio::test]
    async fn test_volume_skips_failing_pair() {
        let source = Arc::new(
            FixtureSource::new()
                .with_json(
                    "counter_asset_type=native&resolution=3600000",
                    page(json!([{"base_volume": "100"}, {"base_volume": "25.5"}])),
                )
                .with_json(
                    "counter_asset_code=AQUA",
                    page(json!([{"base_volume": "40"}])),
                )
                .with_status("counter_asset_code=USDC", 502),
        );
        let svc = service(source.clone());
        let counters = vec![
            Asset::Native,
            Asset::credit("AQUA", "GAQUA"),
            Asset::credit("USDC", "GUSDC"),
        ];

        let volume = svc.volume_24h(&counters, 1_700_000_123_456).await;
        assert_eq!(volume, dec!(165.5));
        assert_eq!(source.call_count().await, 3);
        assert!(
            source
                .requests()
                .await
                .iter()
                .all(|url| url.contains("start_time=1699912800000&end_time=1699999200000"))
        );
    }

    #[tokio::test]
    async fn test_market_overview() {
        let source = priced()
            .with_json(POOLS, pool_listing())
            .with_json(ASSET, page(json!([{"asset_code": "XLMFISH", "amount": "800000000.0000000"}])))
            .with_json("counter_asset_type=native&resolution=3600000", page(json!([{"base_volume": "1000"}])))
            .with_json("counter_asset_code=AQUA", page(json!([{"base_volume": "1000"}])))
            .with_json("counter_asset_code=USDC", page(json!([])));
        let snapshot = service(Arc::new(source)).market_overview().await;

        assert_eq!(snapshot.price_usd, Some(dec!(0.0005)));
        assert_eq!(snapshot.volume_24h, dec!(2000));
        assert_eq!(snapshot.volume_24h_usd, Some(dec!(1)));
        assert_eq!(snapshot.supply, dec!(800000000));
        assert_eq!(snapshot.market_cap_usd, Some(dec!(400000)));
    }

    #[tokio::test]
    async fn test_market_overview_degrades() {
        let source = FixtureSource::new()
            .with_status(PRICE, 503)
            .with_json(ORACLE, json!({"stellar": {"usd": 0.25}}))
            .with_status(POOLS, 503)
            .with_status(ASSET, 503);
        let snapshot = service(Arc::new(source)).market_overview().await;

        assert_eq!(snapshot.price_usd, None);
        assert_eq!(snapshot.volume_24h, Decimal::ZERO);
        assert_eq!(snapshot.market_cap_usd, None);
        assert_eq!(snapshot.supply, dec!(1000000000));
    }

    #[tokio::test]
    async fn test_pool_overview() {
        let source = Arc::new(priced().with_json(POOLS, pool_listing()));
        let svc = service(source.clone());

        let overview = svc.pool_overview(&PoolQuery::default()).await.unwrap();
        assert_eq!(overview.price_usd, Some(dec!(0.0005)));
        assert_eq!(overview.total_liquidity, dec!(4500));
        assert_eq!(overview.total_liquidity_usd, Some(dec!(2.25)));
        assert_eq!(overview.pools[0].id, "p2");
        assert_eq!(overview.top_pools.len(), 4);

        svc.pool_overview(&PoolQuery::default()).await.unwrap();
        assert_eq!(source.calls_matching(POOLS).await, 1);
    }

    #[tokio::test]
    async fn test_settle_refreshes_stale_price() {
        let source = Arc::new(priced());
        let cache = JsonCache::in_memory();
        let svc = MarketService::new(
            MarketConfig {
                horizon_url: "https://horizon.test".to_string(),
                coingecko_url: "https://coingecko.test/api/v3".to_string(),
                ..MarketConfig::default()
            },
            source.clone(),
            cache.clone(),
        );
        let oracle_url = svc.coingecko.simple_price_url("stellar").unwrap();
        cache
            .set(&oracle_url, &json!({"stellar": {"usd": 9}}), now_millis() - 600_000)
            .await;

        // Stale oracle entry is served, then rewritten in the background.
        assert_eq!(svc.price_usd().await, Some(dec!(0.018)));
        svc.settle().await;

        assert_eq!(source.calls_matching(ORACLE).await, 1);
        let entry = cache.get(&oracle_url).await.unwrap();
        assert_eq!(entry.data, json!({"stellar": {"usd": "0.25"}}));
        assert_eq!(svc.price_usd().await, Some(dec!(0.0005)));
    }

    #[tokio::test]
    async fn test_pool_overview_listing_failure_propagates() {
        let source = priced().with_status(POOLS, 500);
        let err = service(Arc::new(source))
            .pool_overview(&PoolQuery::default())
            .await
            .unwrap_err();
        assert!(matches!(err, MarketError::Data(_)));
    }
}
