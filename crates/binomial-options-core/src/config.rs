use serde::{Deserialize, Serialize};

use crate::error::PricingError;
use crate::PricingResult;

/// Assumed trading days per year for annualizing daily volatility.
pub const TRADING_DAYS_PER_YEAR: u32 = 252;

/// How each branch of the lattice is weighted during backward induction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProbabilityWeighting {
    /// Flat 0.5 / 0.5 split between the up and down child.
    #[default]
    Equal,
    /// Cox-Ross-Rubinstein `p = (e^{r dt} - d) / (u - d)`.
    RiskNeutral,
}

/// Divisor used for the standard deviation of log returns.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StdDevConvention {
    /// n - 1
    #[default]
    Sample,
    /// n
    Population,
}

/// Engine-wide knobs. Passed explicitly into each call; nothing is cached per process.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    pub trading_days_per_year: u32,
    /// Requests above this step count are rejected.
    pub max_steps: u32,
    /// Requests above this step count price fine but carry a cost warning.
    pub large_step_warning: u32,
    /// Lattices with at least this many steps are left out of the output unless asked for.
    pub render_step_limit: u32,
    pub weighting: ProbabilityWeighting,
    pub std_dev_convention: StdDevConvention,
}

impl Default for EngineConfig {
    fn default() -> Self {
        EngineConfig {
            trading_days_per_year: TRADING_DAYS_PER_YEAR,
            max_steps: 10_000,
            large_step_warning: 1_000,
            render_step_limit: 100,
            weighting: ProbabilityWeighting::Equal,
            std_dev_convention: StdDevConvention::Sample,
        }
    }
}

impl EngineConfig {
    pub fn validate(&self) -> PricingResult<()> {
        if self.trading_days_per_year == 0 {
            return Err(PricingError::invalid(
                "trading_days_per_year",
                "must be positive",
            ));
        }
        if self.max_steps == 0 {
            return Err(PricingError::invalid("max_steps", "must be positive"));
        }
        if self.large_step_warning > self.max_steps {
            return Err(PricingError::invalid(
                "large_step_warning",
                format!("must not exceed max_steps ({})", self.max_steps),
            ));
        }
        Ok(())
    }

    /// Parse a partial JSON config; absent fields keep their defaults.
    pub fn from_json(json: &str) -> PricingResult<Self> {
        let config: EngineConfig = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let cfg = EngineConfig::default();
        assert_eq!(cfg.trading_days_per_year, 252);
        assert_eq!(cfg.max_steps, 10_000);
        assert_eq!(cfg.weighting, ProbabilityWeighting::Equal);
        assert_eq!(cfg.std_dev_convention, StdDevConvention::Sample);
        assert!(cfg.validate().is_ok());
    }

    #[test]
    fn test_partial_json_keeps_defaults() {
        let cfg = EngineConfig::from_json(
            r#"{"max_steps": 500, "large_step_warning": 200, "weighting": "risk_neutral"}"#,
        )
        .unwrap();
        assert_eq!(cfg.max_steps, 500);
        assert_eq!(cfg.large_step_warning, 200);
        assert_eq!(cfg.weighting, ProbabilityWeighting::RiskNeutral);
        assert_eq!(cfg.render_step_limit, 100);
        assert_eq!(cfg.trading_days_per_year, 252);
    }

    #[test]
    fn test_warning_above_limit_rejected() {
        let err = EngineConfig::from_json(r#"{"max_steps": 50}"#).unwrap_err();
        match err {
            PricingError::InvalidInput { field, .. } => assert_eq!(field, "large_step_warning"),
            other => panic!("Expected InvalidInput, got {other:?}"),
        }
    }

    #[test]
    fn test_zero_trading_days_rejected() {
        let cfg = EngineConfig {
            trading_days_per_year: 0,
            ..EngineConfig::default()
        };
        assert!(cfg.validate().is_err());
    }
}
