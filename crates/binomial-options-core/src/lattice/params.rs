use serde::{Deserialize, Serialize};

use crate::config::EngineConfig;
use crate::error::PricingError;
use crate::types::{Rate, Years};
use crate::PricingResult;

/// Everything the lattice builder and valuer need, resolved up front.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PricingParameters {
    pub current_price: f64,
    pub strike: f64,
    /// Annualized sigma.
    pub volatility: Rate,
    pub risk_free_rate: Rate,
    pub expiration: Years,
    pub steps: u32,
}

impl PricingParameters {
    pub fn t_step(&self) -> Years {
        self.expiration / self.steps as f64
    }

    /// Reject configuration errors before any lattice is built.
    pub fn validate(&self, config: &EngineConfig) -> PricingResult<()> {
        positive("current_price", self.current_price)?;
        positive("strike", self.strike)?;
        positive("expiration", self.expiration)?;
        if !self.volatility.is_finite() || self.volatility < 0.0 {
            return Err(PricingError::invalid(
                "volatility",
                format!("must be finite and non-negative, got {}", self.volatility),
            ));
        }
        if !self.risk_free_rate.is_finite() {
            return Err(PricingError::invalid("risk_free_rate", "must be finite"));
        }
        if self.steps == 0 {
            return Err(PricingError::invalid("steps", "must be at least 1"));
        }
        if self.steps > config.max_steps {
            return Err(PricingError::invalid(
                "steps",
                format!(
                    "{} exceeds the limit of {}; lattice cost grows with steps squared",
                    self.steps, config.max_steps
                ),
            ));
        }
        Ok(())
    }

    /// Non-fatal observations about the request.
    pub fn warnings(&self, config: &EngineConfig) -> Vec<String> {
        let mut warnings = Vec::new();
        if self.steps > config.large_step_warning {
            warnings.push(format!(
                "{} steps builds {} lattice nodes; expect noticeable latency",
                self.steps,
                node_count(self.steps)
            ));
        }
        if self.volatility == 0.0 {
            warnings.push("zero volatility: every node equals the current price".into());
        }
        warnings
    }
}

/// Populated nodes in a recombining lattice of `steps` steps.
pub fn node_count(steps: u32) -> u64 {
    let n = steps as u64;
    (n + 1) * (n + 2) / 2
}

fn positive(field: &str, value: f64) -> PricingResult<()> {
    if !value.is_finite() || value <= 0.0 {
        return Err(PricingError::invalid(
            field,
            format!("must be positive, got {value}"),
        ));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn reference() -> PricingParameters {
        PricingParameters {
            current_price: 100.0,
            strike: 100.0,
            volatility: 0.2,
            risk_free_rate: 0.05,
            expiration: 1.0,
            steps: 2,
        }
    }

    fn field_of(err: PricingError) -> String {
        match err {
            PricingError::InvalidInput { field, .. } => field,
            other => panic!("Expected InvalidInput, got {other:?}"),
        }
    }

    #[test]
    fn test_t_step() {
        assert_eq!(reference().t_step(), 0.5);
    }

    #[test]
    fn test_reference_is_valid() {
        assert!(reference().validate(&EngineConfig::default()).is_ok());
    }

    #[test]
    fn test_zero_steps_rejected() {
        let p = PricingParameters { steps: 0, ..reference() };
        assert_eq!(field_of(p.validate(&EngineConfig::default()).unwrap_err()), "steps");
    }

    #[test]
    fn test_step_limit() {
        let cfg = EngineConfig::default();
        let p = PricingParameters { steps: 10_001, ..reference() };
        assert_eq!(field_of(p.validate(&cfg).unwrap_err()), "steps");
        let p = PricingParameters { steps: 10_000, ..reference() };
        assert!(p.validate(&cfg).is_ok());
    }

    #[test]
    fn test_non_positive_inputs_rejected() {
        let cfg = EngineConfig::default();
        for (p, field) in [
            (PricingParameters { current_price: 0.0, ..reference() }, "current_price"),
            (PricingParameters { strike: -5.0, ..reference() }, "strike"),
            (PricingParameters { expiration: 0.0, ..reference() }, "expiration"),
            (PricingParameters { volatility: -0.1, ..reference() }, "volatility"),
            (PricingParameters { volatility: f64::NAN, ..reference() }, "volatility"),
            (PricingParameters { risk_free_rate: f64::INFINITY, ..reference() }, "risk_free_rate"),
        ] {
            assert_eq!(field_of(p.validate(&cfg).unwrap_err()), field);
        }
    }

    #[test]
    fn test_negative_rate_allowed() {
        let p = PricingParameters { risk_free_rate: -0.005, ..reference() };
        assert!(p.validate(&EngineConfig::default()).is_ok());
    }

    #[test]
    fn test_large_step_warning() {
        let cfg = EngineConfig::default();
        assert!(reference().warnings(&cfg).is_empty());
        let p = PricingParameters { steps: 2_000, ..reference() };
        let w = p.warnings(&cfg);
        assert_eq!(w.len(), 1);
        assert!(w[0].contains("2003001"));
    }

    #[test]
    fn test_node_count() {
        assert_eq!(node_count(1), 3);
        assert_eq!(node_count(2), 6);
        assert_eq!(node_count(10_000), 50_015_001);
    }
}
