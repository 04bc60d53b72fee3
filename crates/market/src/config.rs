//! Runtime configuration.

use crate::error::MarketError;
use rust_decimal::Decimal;
use std::env;
use std::path::PathBuf;
use std::str::FromStr;
use xlmfish_data::CacheTtls;
use xlmfish_data::providers::{COINGECKO_URL, HORIZON_URL};
use xlmfish_domain::asset::Asset;
use xlmfish_domain::market::DEFAULT_TOTAL_SUPPLY;

pub const DEFAULT_ASSET_CODE: &str = "XLMFISH";
pub const DEFAULT_ASSET_ISSUER: &str = "GAX3YQC26LTS6NLW2QGRQC4MK24XKL5JLZ7KFHNERWPC3HKCT2ABTEMT";
/// CoinGecko id of XLM.
pub const DEFAULT_ORACLE_COIN: &str = "stellar";
pub const DEFAULT_CACHE_PATH: &str = ".xlmfish-cache.json";
/// Size limit of the cache file in bytes. Writes past it are dropped.
pub const DEFAULT_CACHE_QUOTA: usize = 5 * 1024 * 1024;

/// Configuration of the aggregation pipeline.
#[derive(Debug, Clone, PartialEq)]
pub struct MarketConfig {
    pub horizon_url: String,
    pub coingecko_url: String,
    /// Asset whose market is reported.
    pub asset: Asset,
    /// CoinGecko id of the network asset the tracked asset is quoted in.
    pub oracle_coin: String,
    /// Supply used when Horizon does not report one.
    pub total_supply: Decimal,
    pub cache_path: PathBuf,
    pub cache_quota: usize,
    pub ttls: CacheTtls,
}

impl Default for MarketConfig {
    fn default() -> Self {
        Self {
            horizon_url: HORIZON_URL.to_string(),
            coingecko_url: COINGECKO_URL.to_string(),
            asset: Asset::credit(DEFAULT_ASSET_CODE, DEFAULT_ASSET_ISSUER),
            oracle_coin: DEFAULT_ORACLE_COIN.to_string(),
            total_supply: DEFAULT_TOTAL_SUPPLY,
            cache_path: PathBuf::from(DEFAULT_CACHE_PATH),
            cache_quota: DEFAULT_CACHE_QUOTA,
            ttls: CacheTtls::default(),
        }
    }
}

impl MarketConfig {
    /// Reads `XLMFISH_*` environment variables over the defaults.
    ///
    /// # Errors
    /// Returns an error if a numeric variable does not parse.
    pub fn from_env() -> Result<Self, MarketError> {
        let defaults = Self::default();

        let code = env::var("XLMFISH_ASSET_CODE").unwrap_or_else(|_| DEFAULT_ASSET_CODE.to_string());
        let issuer =
            env::var("XLMFISH_ASSET_ISSUER").unwrap_or_else(|_| DEFAULT_ASSET_ISSUER.to_string());

        let total_supply = match env::var("XLMFISH_TOTAL_SUPPLY") {
            Ok(raw) => Decimal::from_str(raw.trim()).map_err(|e| {
                MarketError::Config(format!("XLMFISH_TOTAL_SUPPLY={raw}: {e}"))
            })?,
            Err(_) => defaults.total_supply,
        };

        let cache_quota = match env::var("XLMFISH_CACHE_QUOTA") {
            Ok(raw) => parse_quota(&raw)?,
            Err(_) => defaults.cache_quota,
        };

        Ok(Self {
            horizon_url: env::var("XLMFISH_HORIZON_URL").unwrap_or(defaults.horizon_url),
            coingecko_url: env::var("XLMFISH_COINGECKO_URL").unwrap_or(defaults.coingecko_url),
            asset: Asset::credit(code, issuer),
            oracle_coin: env::var("XLMFISH_ORACLE_COIN").unwrap_or(defaults.oracle_coin),
            total_supply,
            cache_path: env::var("XLMFISH_CACHE_PATH")
                .map(PathBuf::from)
                .unwrap_or(defaults.cache_path),
            cache_quota,
            ttls: defaults.ttls,
        })
    }
}

fn parse_quota(raw: &str) -> Result<usize, MarketError> {
    match raw.trim().parse::<usize>() {
        Ok(0) => Err(MarketError::Config(
            "XLMFISH_CACHE_QUOTA must be positive".to_string(),
        )),
        Ok(bytes) => Ok(bytes),
        Err(e) => Err(MarketError::Config(format!("XLMFISH_CACHE_QUOTA={raw}: {e}"))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_defaults() {
        let config = MarketConfig::default();
        assert_eq!(config.horizon_url, "https://horizon.stellar.org");
        assert_eq!(
            config.asset.canonical(),
            format!("XLMFISH:{DEFAULT_ASSET_ISSUER}")
        );
        assert_eq!(config.total_supply, dec!(1000000000));
        assert_eq!(config.oracle_coin, "stellar");
        assert_eq!(config.cache_quota, 5_242_880);
    }

    #[test]
    fn test_parse_quota() {
        assert_eq!(parse_quota(" 1024 ").unwrap(), 1024);
        assert!(matches!(parse_quota("0"), Err(MarketError::Config(_))));
        assert!(matches!(parse_quota("lots"), Err(MarketError::Config(_))));
    }
}
