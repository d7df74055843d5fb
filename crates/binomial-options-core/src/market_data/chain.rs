use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::error::PricingError;
use crate::types::Money;
use crate::PricingResult;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OptionChain {
    pub underlying: String,
    pub last_close: Money,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expiration: Option<NaiveDate>,
    pub strikes: Vec<Money>,
}

impl OptionChain {
    /// Listed strike closest to `spot`; the lower strike wins a tie.
    pub fn nearest_strike(&self, spot: Money) -> Option<Money> {
        self.strikes
            .iter()
            .copied()
            .min_by(|a, b| {
                let da = (*a - spot).abs();
                let db = (*b - spot).abs();
                da.cmp(&db).then(a.cmp(b))
            })
    }

    pub fn lists_strike(&self, strike: Money) -> bool {
        self.strikes.contains(&strike)
    }

    /// Days from `today` to expiration, if the chain carries one.
    pub fn days_to_expiration(&self, today: NaiveDate) -> Option<i64> {
        self.expiration.map(|e| (e - today).num_days())
    }

    /// Quotes fit to price against. An empty chain is a retrieval failure of
    /// `source`; a non-positive price is bad data.
    pub fn validate(&self, source: &str) -> PricingResult<()> {
        if self.strikes.is_empty() {
            return Err(PricingError::retrieval(
                source,
                format!("no options listed for {}", self.underlying),
            ));
        }
        if self.last_close <= Decimal::ZERO {
            return Err(PricingError::data_quality(
                "last_close",
                format!("latest close for {} is {}", self.underlying, self.last_close),
            ));
        }
        if let Some(bad) = self.strikes.iter().find(|k| **k <= Decimal::ZERO) {
            return Err(PricingError::data_quality(
                "strike",
                format!("listed strike for {} is {bad}", self.underlying),
            ));
        }
        Ok(())
    }
}
