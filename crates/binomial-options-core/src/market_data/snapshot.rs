use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::error::PricingError;
use crate::market_data::chain::OptionChain;
use crate::market_data::{Lookback, MarketDataSource};
use crate::types::Money;
use crate::volatility::series::{PriceObservation, PriceSeries};
use crate::PricingResult;

const SOURCE_NAME: &str = "snapshot";

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TickerSnapshot {
    /// Daily closes, oldest first.
    #[serde(default)]
    pub closes: Vec<PriceObservation>,
    /// Defaults to the last entry of `closes`.
    #[serde(default)]
    pub last_close: Option<Money>,
    #[serde(default)]
    pub expiration: Option<NaiveDate>,
    #[serde(default)]
    pub strikes: Vec<Money>,
}

/// Market data captured ahead of time, e.g. exported from a data vendor.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct MarketSnapshot {
    #[serde(default)]
    pub tickers: BTreeMap<String, TickerSnapshot>,
    /// Instrument -> latest yield in percent.
    #[serde(default)]
    pub yields: BTreeMap<String, Money>,
}

/// [`MarketDataSource`] answering from an in-memory [`MarketSnapshot`].
#[derive(Debug, Clone, Default)]
pub struct SnapshotSource {
    snapshot: MarketSnapshot,
}

impl SnapshotSource {
    pub fn new(snapshot: MarketSnapshot) -> Self {
        SnapshotSource { snapshot }
    }

    pub fn from_json(json: &str) -> PricingResult<Self> {
        Ok(SnapshotSource::new(serde_json::from_str(json)?))
    }

    fn ticker(&self, ticker: &str) -> PricingResult<&TickerSnapshot> {
        self.snapshot
            .tickers
            .get(&ticker.to_uppercase())
            .or_else(|| self.snapshot.tickers.get(ticker))
            .ok_or_else(|| PricingError::retrieval(SOURCE_NAME, format!("unknown ticker {ticker}")))
    }
}

impl MarketDataSource for SnapshotSource {
    fn name(&self) -> &str {
        SOURCE_NAME
    }

    fn historical_closes(&self, ticker: &str, lookback: Lookback) -> PricingResult<PriceSeries> {
        let entry = self.ticker(ticker)?;
        if entry.closes.is_empty() {
            return Err(PricingError::retrieval(
                SOURCE_NAME,
                format!("no price history for {ticker}"),
            ));
        }
        // n trading days of returns need n + 1 closes
        let wanted = lookback.trading_days() as usize + 1;
        let skip = entry.closes.len().saturating_sub(wanted);
        let window = &entry.closes[skip..];
        if window.len() < 2 {
            return Err(PricingError::retrieval(
                SOURCE_NAME,
                format!(
                    "lookback window for {ticker} holds {} close(s), need at least 2",
                    window.len()
                ),
            ));
        }
        Ok(PriceSeries::new(window.to_vec()))
    }

    fn option_chain(&self, ticker: &str) -> PricingResult<OptionChain> {
        let entry = self.ticker(ticker)?;
        if entry.strikes.is_empty() {
            return Err(PricingError::retrieval(
                SOURCE_NAME,
                format!("no options listed for {ticker}"),
            ));
        }
        let last_close = match entry.last_close {
            Some(close) => close,
            None => entry
                .closes
                .last()
                .and_then(|o| Decimal::try_from(o.close).ok())
                .ok_or_else(|| {
                    PricingError::retrieval(SOURCE_NAME, format!("no latest price for {ticker}"))
                })?,
        };
        let mut strikes = entry.strikes.clone();
        strikes.sort();
        strikes.dedup();
        Ok(OptionChain {
            underlying: ticker.to_uppercase(),
            last_close,
            expiration: entry.expiration,
            strikes,
        })
    }

    fn latest_yield_percent(&self, instrument: &str) -> PricingResult<Decimal> {
        self.snapshot
            .yields
            .get(instrument)
            .copied()
            .ok_or_else(|| {
                PricingError::retrieval(SOURCE_NAME, format!("no yield quoted for {instrument}"))
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal::prelude::ToPrimitive;
    use rust_decimal_macros::dec;

    const SNAPSHOT: &str = r#"{
        "tickers": {
            "AMZN": {
                "closes": [
                    {"date": "2024-05-28", "close": 182.15},
                    {"date": "2024-05-29", "close": 182.02},
                    {"date": "2024-05-30", "close": 179.32},
                    {"date": "2024-05-31", "close": 176.44}
                ],
                "strikes": ["180", "170", "175", "175"]
            },
            "NOOPT": { "closes": [{"close": 10.0}, {"close": 10.5}] },
            "IPO": { "closes": [{"close": 38.0}], "strikes": ["40"] }
        },
        "yields": { "^IRX": "5.25" }
    }"#;

    fn source() -> SnapshotSource {
        SnapshotSource::from_json(SNAPSHOT).unwrap()
    }

    #[test]
    fn test_lookback_trims_history() {
        let s = source()
            .historical_closes("AMZN", Lookback::TradingDays(2))
            .unwrap();
        assert_eq!(s.closes(), vec![182.02, 179.32, 176.44]);
        let all = source().historical_closes("amzn", Lookback::OneYear).unwrap();
        assert_eq!(all.len(), 4);
    }

    #[test]
    fn test_short_window_is_retrieval_error() {
        let err = source()
            .historical_closes("AMZN", Lookback::TradingDays(0))
            .unwrap_err();
        assert!(err.is_retrieval());
        assert!(source()
            .historical_closes("IPO", Lookback::OneYear)
            .unwrap_err()
            .is_retrieval());
    }

    #[test]
    fn test_chain_defaults_last_close_and_sorts() {
        let chain = source().option_chain("AMZN").unwrap();
        assert_eq!(chain.last_close.to_f64(), Some(176.44));
        assert_eq!(chain.strikes, vec![dec!(170), dec!(175), dec!(180)]);
    }

    #[test]
    fn test_missing_options_is_retrieval_error() {
        let err = source().option_chain("NOOPT").unwrap_err();
        assert!(err.is_retrieval());
        assert!(err.to_string().contains("no options listed"));
    }

    #[test]
    fn test_unknown_ticker_is_retrieval_error() {
        assert!(source()
            .historical_closes("XYZ", Lookback::OneYear)
            .unwrap_err()
            .is_retrieval());
    }

    #[test]
    fn test_yield_lookup() {
        assert_eq!(source().latest_yield_percent("^IRX").unwrap(), dec!(5.25));
        assert!(source().latest_yield_percent("^TNX").unwrap_err().is_retrieval());
    }
}
