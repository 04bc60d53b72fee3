//! Market summary shown on the overview cards.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Supply used when Horizon does not report an asset amount.
pub const DEFAULT_TOTAL_SUPPLY: Decimal = Decimal::from_parts(1_000_000_000, 0, 0, false, 0);

/// Price, volume and market capitalisation of the tracked asset.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MarketSnapshot {
    pub price_usd: Option<Decimal>,
    /// Trailing 24h volume in tracked-asset units.
    pub volume_24h: Decimal,
    pub volume_24h_usd: Option<Decimal>,
    pub supply: Decimal,
    pub market_cap_usd: Option<Decimal>,
}

impl MarketSnapshot {
    /// Combines the fetched figures.
    ///
    /// `issued_amount` replaces `fallback_supply` only when it is positive.
    #[must_use]
    pub fn compose(
        price_usd: Option<Decimal>,
        volume_24h: Decimal,
        issued_amount: Option<Decimal>,
        fallback_supply: Decimal,
    ) -> Self {
        let supply = issued_amount
            .filter(|a| *a > Decimal::ZERO)
            .unwrap_or(fallback_supply);

        Self {
            price_usd,
            volume_24h,
            volume_24h_usd: price_usd.and_then(|p| volume_24h.checked_mul(p)),
            supply,
            market_cap_usd: price_usd.and_then(|p| supply.checked_mul(p)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_default_supply_constant() {
        assert_eq!(DEFAULT_TOTAL_SUPPLY, dec!(1000000000));
    }

    #[test]
    fn test_compose_with_price() {
        let snapshot = MarketSnapshot::compose(
            Some(dec!(0.001)),
            dec!(5000),
            Some(dec!(900000000)),
            DEFAULT_TOTAL_SUPPLY,
        );
        assert_eq!(snapshot.volume_24h_usd, Some(dec!(5)));
        assert_eq!(snapshot.supply, dec!(900000000));
        assert_eq!(snapshot.market_cap_usd, Some(dec!(900000)));
    }

    #[test]
    fn test_compose_without_price_or_supply() {
        let snapshot = MarketSnapshot::compose(None, dec!(5000), Some(Decimal::ZERO), DEFAULT_TOTAL_SUPPLY);
        assert_eq!(snapshot.volume_24h_usd, None);
        assert_eq!(snapshot.market_cap_usd, None);
        assert_eq!(snapshot.supply, DEFAULT_TOTAL_SUPPLY);

        let snapshot = MarketSnapshot::compose(None, Decimal::ZERO, None, dec!(42));
        assert_eq!(snapshot.supply, dec!(42));
    }
}
