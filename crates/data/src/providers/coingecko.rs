//! CoinGecko simple-price client.

use super::CacheTtls;
use crate::cache::CacheOptions;
use crate::coerce;
use crate::error::DataError;
use crate::http::CachedClient;
use rust_decimal::Decimal;
use url::Url;

/// Public CoinGecko API root.
pub const COINGECKO_URL: &str = "https://api.coingecko.com/api/v3";

/// USD prices by CoinGecko coin id.
#[derive(Clone)]
pub struct CoinGeckoClient {
    base_url: String,
    client: CachedClient,
    ttls: CacheTtls,
}

impl CoinGeckoClient {
    pub fn new(base_url: impl Into<String>, client: CachedClient, ttls: CacheTtls) -> Self {
        Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            client,
            ttls,
        }
    }

    /// URL of the simple-price query for `coin_id` in USD.
    ///
    /// # Errors
    /// Returns an error if the base URL is invalid.
    pub fn simple_price_url(&self, coin_id: &str) -> Result<String, DataError> {
        let mut url = Url::parse(&format!("{}/simple/price", self.base_url))?;
        url.query_pairs_mut()
            .append_pair("ids", coin_id)
            .append_pair("vs_currencies", "usd");
        Ok(url.into())
    }

    /// USD price of `coin_id`; `None` when the response does not list it.
    ///
    /// # Errors
    /// Returns an error if the request fails and nothing is cached.
    pub async fn usd_price(&self, coin_id: &str) -> Result<Option<Decimal>, DataError> {
        let url = self.simple_price_url(coin_id)?;
        let body = self
            .client
            .get_json(&url, CacheOptions::with_ttl(self.ttls.oracle))
            .await?;

        Ok(body
            .get(coin_id)
            .and_then(|coin| coin.get("usd"))
            .filter(|usd| !usd.is_null())
            .map(coerce::to_decimal))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cache::JsonCache;
    use crate::testing::FixtureSource;
    use rust_decimal_macros::dec;
    use serde_json::json;
    use std::sync::Arc;

    fn client(source: FixtureSource) -> CoinGeckoClient {
        CoinGeckoClient::new(
            "https://coingecko.test/api/v3",
            CachedClient::new(Arc::new(source), JsonCache::in_memory()),
            CacheTtls::default(),
        )
    }

    #[test]
    fn test_simple_price_url() {
        let gecko = client(FixtureSource::new());
        assert_eq!(
            gecko.simple_price_url("stellar").unwrap(),
            "https://coingecko.test/api/v3/simple/price?ids=stellar&vs_currencies=usd"
        );
    }

    #[tokio::test]
    async fn test_usd_price() {
        let gecko = client(FixtureSource::new().with_json("simple/price", json!({"stellar": {"usd": 0.2731}})));
        assert_eq!(gecko.usd_price("stellar").await.unwrap(), Some(dec!(0.2731)));
    }

    #[tokio::test]
    async fn test_missing_coin_is_none() {
        let gecko = client(FixtureSource::new().with_json("simple/price", json!({})));
        assert_eq!(gecko.usd_price("stellar").await.unwrap(), None);

        let gecko = client(FixtureSource::new().with_json("simple/price", json!({"stellar": {"usd": null}})));
        assert_eq!(gecko.usd_price("stellar").await.unwrap(), None);
    }
}
