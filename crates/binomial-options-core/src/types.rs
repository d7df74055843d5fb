use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Exchange-quoted amounts (strikes, closes). Converted to f64 at the engine boundary.
pub type Money = Decimal;

/// Rates expressed as decimals (0.05 = 5%). Never as percentages.
pub type Rate = f64;

/// Year fractions
pub type Years = f64;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OptionType {
    Call,
    Put,
}

impl OptionType {
    /// Value of the option exercised at `price`: `max(S - K, 0)` or `max(K - S, 0)`.
    pub fn payoff(self, price: f64, strike: f64) -> f64 {
        match self {
            OptionType::Call => (price - strike).max(0.0),
            OptionType::Put => (strike - price).max(0.0),
        }
    }
}

/// Expiration presets offered to users picking a horizon.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Tenor {
    TwoWeeks,
    OneMonth,
    ThreeMonths,
    SixMonths,
    OneYear,
    TwoYears,
    ThreeYears,
    FiveYears,
}

impl Tenor {
    pub fn years(self) -> Years {
        match self {
            Tenor::TwoWeeks => 2.0 / 52.0,
            Tenor::OneMonth => 1.0 / 12.0,
            Tenor::ThreeMonths => 3.0 / 12.0,
            Tenor::SixMonths => 0.5,
            Tenor::OneYear => 1.0,
            Tenor::TwoYears => 2.0,
            Tenor::ThreeYears => 3.0,
            Tenor::FiveYears => 5.0,
        }
    }
}

/// Standard computation output envelope
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ComputationOutput<T: Serialize> {
    pub result: T,
    pub methodology: String,
    pub assumptions: serde_json::Value,
    pub warnings: Vec<String>,
    pub metadata: ComputationMetadata,
}

/// Metadata for every computation
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ComputationMetadata {
    pub version: String,
    pub computation_time_us: u64,
    pub precision: String,
}

/// Helper to wrap computation results with metadata
pub fn with_metadata<T: Serialize>(
    methodology: &str,
    assumptions: &impl Serialize,
    warnings: Vec<String>,
    elapsed_us: u64,
    result: T,
) -> ComputationOutput<T> {
    ComputationOutput {
        result,
        methodology: methodology.to_string(),
        assumptions: serde_json::to_value(assumptions).unwrap_or_default(),
        warnings,
        metadata: ComputationMetadata {
            version: env!("CARGO_PKG_VERSION").to_string(),
            computation_time_us: elapsed_us,
            precision: "ieee754_f64".to_string(),
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_payoffs_never_negative() {
        assert_eq!(OptionType::Call.payoff(90.0, 100.0), 0.0);
        assert_eq!(OptionType::Call.payoff(132.5, 100.0), 32.5);
        assert_eq!(OptionType::Put.payoff(110.0, 100.0), 0.0);
        assert_eq!(OptionType::Put.payoff(75.0, 100.0), 25.0);
    }

    #[test]
    fn test_tenor_years() {
        assert!((Tenor::TwoWeeks.years() - 0.038461538).abs() < 1e-8);
        assert!((Tenor::OneMonth.years() - 1.0 / 12.0).abs() < 1e-12);
        assert_eq!(Tenor::FiveYears.years(), 5.0);
    }

    #[test]
    fn test_tenor_serde_snake_case() {
        let t: Tenor = serde_json::from_str("\"three_months\"").unwrap();
        assert_eq!(t, Tenor::ThreeMonths);
        assert_eq!(serde_json::to_string(&OptionType::Put).unwrap(), "\"put\"");
    }

    #[test]
    fn test_metadata_precision() {
        let out = with_metadata("test", &serde_json::json!({}), vec![], 3, 1.5_f64);
        assert_eq!(out.metadata.precision, "ieee754_f64");
        assert!(!out.metadata.version.is_empty());
    }
}
