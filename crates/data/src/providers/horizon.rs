//! Stellar Horizon client.

use super::CacheTtls;
use crate::cache::CacheOptions;
use crate::error::DataError;
use crate::http::CachedClient;
use crate::schema::{AssetRecord, LiquidityPoolRecord, Page, TradeAggregationRecord};
use serde::Serialize;
use url::Url;
use xlmfish_domain::asset::Asset;

/// Public Horizon instance.
pub const HORIZON_URL: &str = "https://horizon.stellar.org";

pub const ONE_HOUR_MS: i64 = 60 * 60 * 1000;
pub const ONE_DAY_MS: i64 = 24 * ONE_HOUR_MS;

/// Page size used for collection queries.
const PAGE_LIMIT: u32 = 200;

/// Time range and bucket size of a trade-aggregation query.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct AggregationWindow {
    pub start_ms: i64,
    pub end_ms: i64,
    pub resolution_ms: i64,
}

impl AggregationWindow {
    /// The last `hours` whole hours before `now_ms`, in hourly buckets.
    ///
    /// The end is `now_ms` rounded down to the hour so the URL, and with it
    /// the cache key, stays stable within an hour.
    #[must_use]
    pub fn trailing_hours(now_ms: i64, hours: i64) -> Self {
        let end_ms = now_ms.div_euclid(ONE_HOUR_MS) * ONE_HOUR_MS;
        Self {
            start_ms: end_ms - hours * ONE_HOUR_MS,
            end_ms,
            resolution_ms: ONE_HOUR_MS,
        }
    }
}

/// Read-only Horizon queries, cached per URL.
#[derive(Clone)]
pub struct HorizonClient {
    base_url: String,
    client: CachedClient,
    ttls: CacheTtls,
}

impl HorizonClient {
    pub fn new(base_url: impl Into<String>, client: CachedClient, ttls: CacheTtls) -> Self {
        Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            client,
            ttls,
        }
    }

    #[must_use]
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn endpoint(&self, path: &str) -> Result<Url, DataError> {
        Ok(Url::parse(&format!("{}/{path}", self.base_url))?)
    }

    /// URL of the most recent bucket of `resolution_ms` for `base`/`counter`.
    ///
    /// # Errors
    /// Returns an error if the base URL is invalid.
    pub fn latest_aggregation_url(
        &self,
        base: &Asset,
        counter: &Asset,
        resolution_ms: i64,
    ) -> Result<String, DataError> {
        let mut url = self.endpoint("trade_aggregations")?;
        {
            let mut query = url.query_pairs_mut();
            push_asset(&mut query, "base", base);
            push_asset(&mut query, "counter", counter);
            query
                .append_pair("resolution", &resolution_ms.to_string())
                .append_pair("limit", "1")
                .append_pair("order", "desc");
        }
        Ok(url.into())
    }

    /// URL of the buckets of `window` for `base`/`counter`, oldest first.
    ///
    /// # Errors
    /// Returns an error if the base URL is invalid.
    pub fn aggregations_url(
        &self,
        base: &Asset,
        counter: &Asset,
        window: &AggregationWindow,
    ) -> Result<String, DataError> {
        let mut url = self.endpoint("trade_aggregations")?;
        {
            let mut query = url.query_pairs_mut();
            push_asset(&mut query, "base", base);
            push_asset(&mut query, "counter", counter);
            query
                .append_pair("resolution", &window.resolution_ms.to_string())
                .append_pair("start_time", &window.start_ms.to_string())
                .append_pair("end_time", &window.end_ms.to_string())
                .append_pair("order", "asc")
                .append_pair("limit", &PAGE_LIMIT.to_string());
        }
        Ok(url.into())
    }

    /// URL of the pools holding `reserve`.
    ///
    /// # Errors
    /// Returns an error if the base URL is invalid.
    pub fn liquidity_pools_url(&self, reserve: &Asset) -> Result<String, DataError> {
        let mut url = self.endpoint("liquidity_pools")?;
        url.query_pairs_mut()
            .append_pair("reserves", &reserve.canonical())
            .append_pair("limit", &PAGE_LIMIT.to_string())
            .append_pair("order", "asc");
        Ok(url.into())
    }

    /// URL of the asset record for a credit asset; `None` for native.
    ///
    /// # Errors
    /// Returns an error if the base URL is invalid.
    pub fn asset_url(&self, asset: &Asset) -> Result<Option<String>, DataError> {
        let (Some(code), Some(issuer)) = (asset.code(), asset.issuer()) else {
            return Ok(None);
        };
        let mut url = self.endpoint("assets")?;
        url.query_pairs_mut()
            .append_pair("asset_code", code)
            .append_pair("asset_issuer", issuer)
            .append_pair("limit", "1");
        Ok(Some(url.into()))
    }

    /// Most recent trade-aggregation bucket, if any trades happened.
    ///
    /// # Errors
    /// Returns an error if the request fails and nothing is cached.
    pub async fn latest_trade_aggregation(
        &self,
        base: &Asset,
        counter: &Asset,
        resolution_ms: i64,
    ) -> Result<Option<TradeAggregationRecord>, DataError> {
        let url = self.latest_aggregation_url(base, counter, resolution_ms)?;
        let page: Page<TradeAggregationRecord> = self
            .client
            .get(&url, CacheOptions::with_ttl(self.ttls.price))
            .await?;
        Ok(page.into_records().into_iter().next())
    }

    /// Trade-aggregation buckets within `window`.
    ///
    /// # Errors
    /// Returns an error if the request fails and nothing is cached.
    pub async fn trade_aggregations(
        &self,
        base: &Asset,
        counter: &Asset,
        window: &AggregationWindow,
    ) -> Result<Vec<TradeAggregationRecord>, DataError> {
        let url = self.aggregations_url(base, counter, window)?;
        let page: Page<TradeAggregationRecord> = self
            .client
            .get(&url, CacheOptions::with_ttl(self.ttls.volume))
            .await?;
        Ok(page.into_records())
    }

    /// Liquidity pools that hold `reserve`, ordered by pool id.
    ///
    /// # Errors
    /// Returns an error if the request fails and nothing is cached.
    pub async fn liquidity_pools(
        &self,
        reserve: &Asset,
    ) -> Result<Vec<LiquidityPoolRecord>, DataError> {
        let url = self.liquidity_pools_url(reserve)?;
        let page: Page<LiquidityPoolRecord> = self
            .client
            .get(&url, CacheOptions::with_ttl(self.ttls.pools))
            .await?;
        Ok(page.into_records())
    }

    /// The asset's record, if Horizon knows it.
    ///
    /// # Errors
    /// Returns an error if the request fails and nothing is cached.
    pub async fn asset_record(&self, asset: &Asset) -> Result<Option<AssetRecord>, DataError> {
        let Some(url) = self.asset_url(asset)? else {
            return Ok(None);
        };
        let page: Page<AssetRecord> = self
            .client
            .get(&url, CacheOptions::with_ttl(self.ttls.asset))
            .await?;
        Ok(page.into_records().into_iter().next())
    }
}

fn push_asset(
    query: &mut url::form_urlencoded::Serializer<'_, url::UrlQuery<'_>>,
    side: &str,
    asset: &Asset,
) {
    query.append_pair(&format!("{side}_asset_type"), asset.asset_type().as_str());
    if let (Some(code), Some(issuer)) = (asset.code(), asset.issuer()) {
        query
            .append_pair(&format!("{side}_asset_code"), code)
            .append_pair(&format!("{side}_asset_issuer"), issuer);
    }
}
