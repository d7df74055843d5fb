use serde::{Deserialize, Serialize};
use std::time::Instant;

use crate::config::EngineConfig;
use crate::error::PricingError;
use crate::lattice::params::PricingParameters;
use crate::lattice::tree::LatticeFactors;
use crate::types::*;
use crate::PricingResult;

// ---------------------------------------------------------------------------
// Public types
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReplicationInput {
    pub current_price: f64,
    pub strike: f64,
    pub volatility: Rate,
    pub risk_free_rate: Rate,
    /// Length of the single period in years.
    pub period: Years,
    pub option_type: OptionType,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReplicationOutput {
    pub up_price: f64,
    pub down_price: f64,
    pub up_payoff: f64,
    pub down_payoff: f64,
    /// Shares of the underlying held.
    pub delta: f64,
    /// Cash lent (positive) or borrowed (negative) today.
    pub bond: f64,
    pub value: f64,
    /// Portfolio worth at the end of the period in each state; equals the payoffs.
    pub portfolio_up: f64,
    pub portfolio_down: f64,
}

// ---------------------------------------------------------------------------
// Public API: replicate_one_period
// ---------------------------------------------------------------------------

/// Price one up/down period by building the share-plus-bond portfolio that
/// reproduces the option payoff in both states. Cash grows at simple interest
/// `1 + r dt` over the period.
pub fn replicate_one_period(
    input: &ReplicationInput,
) -> PricingResult<ComputationOutput<ReplicationOutput>> {
    let start = Instant::now();

    let params = PricingParameters {
        current_price: input.current_price,
        strike: input.strike,
        volatility: input.volatility,
        risk_free_rate: input.risk_free_rate,
        expiration: input.period,
        steps: 1,
    };
    params.validate(&EngineConfig::default())?;
    if input.volatility == 0.0 {
        return Err(PricingError::invalid(
            "volatility",
            "must be positive to separate the up and down states",
        ));
    }
    let growth = 1.0 + input.risk_free_rate * input.period;
    if growth <= 0.0 {
        return Err(PricingError::invalid(
            "risk_free_rate",
            format!("simple-interest growth {growth} over the period must be positive"),
        ));
    }

    let factors = LatticeFactors::from_params(&params);
    let s = input.current_price;
    let up_price = s * factors.up;
    let down_price = s * factors.down;
    let up_payoff = input.option_type.payoff(up_price, input.strike);
    let down_payoff = input.option_type.payoff(down_price, input.strike);

    let delta = (up_payoff - down_payoff) / (up_price - down_price);
    let bond = (up_payoff - delta * up_price) / growth;
    let value = delta * s + bond;

    let output = ReplicationOutput {
        up_price,
        down_price,
        up_payoff,
        down_payoff,
        delta,
        bond,
        value,
        portfolio_up: delta * up_price + bond * growth,
        portfolio_down: delta * down_price + bond * growth,
    };

    let assumptions = serde_json::json!({
        "up_factor": factors.up,
        "down_factor": factors.down,
        "period_years": input.period,
        "cash_growth": growth,
        "option_type": input.option_type,
    });

    let elapsed = start.elapsed().as_micros() as u64;
    Ok(with_metadata(
        "One-period replicating portfolio (delta hedge)",
        &assumptions,
        vec![],
        elapsed,
        output,
    ))
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
