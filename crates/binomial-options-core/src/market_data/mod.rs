//! Boundary to market-data collaborators.
//!
//! The engine never fetches anything itself. Whatever supplies closes, option
//! chains and reference yields implements [`MarketDataSource`]; failures there
//! surface as [`PricingError::Retrieval`](crate::error::PricingError::Retrieval),
//! never as pricing errors.

pub mod chain;
pub mod risk_free;
pub mod snapshot;
pub mod workflow;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::error::PricingError;
use crate::market_data::chain::OptionChain;
use crate::volatility::series::PriceSeries;
use crate::PricingResult;

/// How much daily history to request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Lookback {
    #[default]
    OneYear,
    FiveYears,
    TradingDays(u32),
}

impl Lookback {
    pub fn trading_days(self) -> u32 {
        match self {
            Lookback::OneYear => 252,
            Lookback::FiveYears => 5 * 252,
            Lookback::TradingDays(n) => n,
        }
    }

    pub fn validate(self) -> PricingResult<()> {
        if self.trading_days() == 0 {
            return Err(PricingError::invalid(
                "lookback",
                "must cover at least one trading day",
            ));
        }
        Ok(())
    }
}

pub trait MarketDataSource {
    /// Short name used in retrieval errors.
    fn name(&self) -> &str;

    /// Chronological daily closes covering `lookback`.
    fn historical_closes(&self, ticker: &str, lookback: Lookback) -> PricingResult<PriceSeries>;

    /// Latest close and the listed strikes for the nearest expiration.
    fn option_chain(&self, ticker: &str) -> PricingResult<OptionChain>;

    /// Latest yield of a reference instrument, in percent (5.25 = 5.25%).
    fn latest_yield_percent(&self, instrument: &str) -> PricingResult<Decimal>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lookback_days() {
        assert_eq!(Lookback::default().trading_days(), 252);
        assert_eq!(Lookback::FiveYears.trading_days(), 1260);
        assert_eq!(Lookback::TradingDays(30).trading_days(), 30);
    }

    #[test]
    fn test_zero_day_lookback_rejected() {
        assert!(Lookback::TradingDays(1).validate().is_ok());
        assert!(matches!(
            Lookback::TradingDays(0).validate(),
            Err(PricingError::InvalidInput { ref field, .. }) if field == "lookback"
        ));
    }
}
