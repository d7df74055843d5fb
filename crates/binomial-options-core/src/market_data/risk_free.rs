use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};

use crate::error::PricingError;
use crate::types::{Rate, Years};
use crate::PricingResult;

/// 13-week Treasury bill yield index.
pub const DEFAULT_RATE_INSTRUMENT: &str = "^IRX";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RateScaling {
    /// Use the quoted annual yield as is.
    #[default]
    Annual,
    /// Multiply by the horizon when it is shorter than a year.
    ProRata,
}

/// Convert a quoted yield in percent into a decimal rate.
pub fn risk_free_rate_from_yield(
    yield_percent: Decimal,
    expiration: Years,
    scaling: RateScaling,
) -> PricingResult<Rate> {
    if yield_percent.abs() > dec!(100) {
        return Err(PricingError::data_quality(
            "yield_percent",
            format!("{yield_percent}% is not a plausible reference yield"),
        ));
    }
    let rate = (yield_percent / dec!(100))
        .to_f64()
        .ok_or_else(|| PricingError::numeric("risk-free rate", "yield not representable"))?;
    Ok(match scaling {
        RateScaling::ProRata if expiration < 1.0 => rate * expiration,
        _ => rate,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_percent_to_decimal() {
        let r = risk_free_rate_from_yield(dec!(5.25), 0.25, RateScaling::Annual).unwrap();
        assert!((r - 0.0525).abs() < 1e-15);
    }

    #[test]
    fn test_pro_rata_under_one_year() {
        let r = risk_free_rate_from_yield(dec!(5), 0.5, RateScaling::ProRata).unwrap();
        assert!((r - 0.025).abs() < 1e-15);
        let r = risk_free_rate_from_yield(dec!(5), 2.0, RateScaling::ProRata).unwrap();
        assert!((r - 0.05).abs() < 1e-15);
    }

    #[test]
    fn test_negative_yield_allowed() {
        let r = risk_free_rate_from_yield(dec!(-0.4), 1.0, RateScaling::Annual).unwrap();
        assert!((r + 0.004).abs() < 1e-15);
    }

    #[test]
    fn test_implausible_yield_rejected() {
        assert!(matches!(
            risk_free_rate_from_yield(dec!(525), 1.0, RateScaling::Annual),
            Err(PricingError::DataQuality { .. })
        ));
    }
}
