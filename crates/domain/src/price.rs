//! USD price composition for the tracked asset.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Price of the tracked asset, expressed through a counter asset.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Quote {
    /// Tracked asset priced in the counter asset.
    pub price_in_counter: Option<Decimal>,
    /// Counter asset priced in USD.
    pub counter_usd: Option<Decimal>,
}

impl Quote {
    #[must_use]
    pub fn new(price_in_counter: Option<Decimal>, counter_usd: Option<Decimal>) -> Self {
        Self {
            price_in_counter,
            counter_usd,
        }
    }

    /// Tracked asset priced in USD; unknown unless both legs are known.
    #[must_use]
    pub fn price_usd(&self) -> Option<Decimal> {
        match (self.price_in_counter, self.counter_usd) {
            (Some(rate), Some(usd)) => rate.checked_mul(usd),
            _ => None,
        }
    }
}

/// Rate carried by a trade-aggregation bucket: `close`, else `avg`.
///
/// Zero counts as missing for both fields.
#[must_use]
pub fn bucket_rate(close: Option<Decimal>, avg: Option<Decimal>) -> Option<Decimal> {
    close
        .filter(|c| !c.is_zero())
        .or_else(|| avg.filter(|a| !a.is_zero()))
}
