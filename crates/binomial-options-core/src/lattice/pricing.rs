use serde::{Deserialize, Serialize};
use std::time::Instant;

use crate::config::{EngineConfig, ProbabilityWeighting};
use crate::error::PricingError;
use crate::lattice::params::PricingParameters;
use crate::lattice::tree::{LatticeFactors, PriceLattice};
use crate::lattice::valuation::{root_delta, root_value, BranchWeights, RootValue};
use crate::types::*;
use crate::PricingResult;

// ---------------------------------------------------------------------------
// Public types
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BinomialInput {
    #[serde(flatten)]
    pub params: PricingParameters,
    /// Overrides `EngineConfig::weighting` when set.
    #[serde(default)]
    pub weighting: Option<ProbabilityWeighting>,
    /// Force the price lattice in or out of the output; by default it is
    /// included below `EngineConfig::render_step_limit` steps.
    #[serde(default)]
    pub include_lattice: Option<bool>,
}

/// Call and put values priced off one shared lattice.
#[derive(Debug, Clone)]
pub struct LatticePrices {
    pub call: RootValue,
    pub put: RootValue,
    pub factors: LatticeFactors,
    pub weights: BranchWeights,
    pub lattice: PriceLattice,
}

impl LatticePrices {
    pub fn call_price(&self) -> f64 {
        self.call.value
    }

    pub fn put_price(&self) -> f64 {
        self.put.value
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BinomialOutput {
    pub call_price: f64,
    pub put_price: f64,
    pub call_delta: Option<f64>,
    pub put_delta: Option<f64>,
    pub up_factor: f64,
    pub down_factor: f64,
    pub t_step: f64,
    pub discount_per_step: f64,
    pub up_probability: f64,
    pub weighting: ProbabilityWeighting,
    pub call_intrinsic: f64,
    pub put_intrinsic: f64,
    /// `C - P - (S - K e^{-rT})`; zero only under risk-neutral weighting in the limit.
    pub parity_gap: f64,
    pub lattice_nodes: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub lattice: Option<Vec<Vec<f64>>>,
}

// ---------------------------------------------------------------------------
// Core engine
// ---------------------------------------------------------------------------

/// Build the lattice once and value the call and the put off it.
pub fn price_lattice(
    params: &PricingParameters,
    weighting: ProbabilityWeighting,
    config: &EngineConfig,
) -> PricingResult<LatticePrices> {
    config.validate()?;
    params.validate(config)?;

    let (factors, lattice) = PriceLattice::from_params(params)?;
    let weights = BranchWeights::new(weighting, &factors, params.risk_free_rate)?;

    let call = root_value(&lattice, OptionType::Call, params.strike, &weights);
    let put = root_value(&lattice, OptionType::Put, params.strike, &weights);

    for (label, value) in [("call", call.value), ("put", put.value)] {
        if !value.is_finite() {
            return Err(PricingError::numeric(
                "backward induction",
                format!("{label} value is {value}"),
            ));
        }
    }

    Ok(LatticePrices {
        call,
        put,
        factors,
        weights,
        lattice,
    })
}

/// `(call_price, put_price, lattice)` for the given inputs under the configured weighting.
pub fn price(
    current_price: f64,
    strike: f64,
    volatility: f64,
    risk_free_rate: f64,
    expiration: f64,
    steps: u32,
) -> PricingResult<(f64, f64, PriceLattice)> {
    let params = PricingParameters {
        current_price,
        strike,
        volatility,
        risk_free_rate,
        expiration,
        steps,
    };
    let config = EngineConfig::default();
    let prices = price_lattice(&params, config.weighting, &config)?;
    Ok((prices.call.value, prices.put.value, prices.lattice))
}

// ---------------------------------------------------------------------------
// Public API: price_european_option
// ---------------------------------------------------------------------------

pub fn price_european_option(
    input: &BinomialInput,
    config: &EngineConfig,
) -> PricingResult<ComputationOutput<BinomialOutput>> {
    let start = Instant::now();
    let params = &input.params;
    let weighting = input.weighting.unwrap_or(config.weighting);

    let prices = price_lattice(params, weighting, config)?;

    let mut warnings = params.warnings(config);
    if weighting == ProbabilityWeighting::Equal && params.risk_free_rate != 0.0 {
        warnings.push(
            "equal 0.5/0.5 branch weighting is not arbitrage-free for a nonzero rate".into(),
        );
    }
    for w in &warnings {
        tracing::warn!("{w}");
    }

    let include_lattice = input
        .include_lattice
        .unwrap_or(params.steps < config.render_step_limit);

    let s = params.current_price;
    let k = params.strike;
    let parity_gap = prices.call.value
        - prices.put.value
        - (s - k * (-params.risk_free_rate * params.expiration).exp());

    let output = BinomialOutput {
        call_price: prices.call.value,
        put_price: prices.put.value,
        call_delta: root_delta(&prices.lattice, &prices.call),
        put_delta: root_delta(&prices.lattice, &prices.put),
        up_factor: prices.factors.up,
        down_factor: prices.factors.down,
        t_step: prices.factors.t_step,
        discount_per_step: prices.weights.discount,
        up_probability: prices.weights.up_probability,
        weighting,
        call_intrinsic: OptionType::Call.payoff(s, k),
        put_intrinsic: OptionType::Put.payoff(s, k),
        parity_gap,
        lattice_nodes: prices.lattice.populated_cells(),
        lattice: include_lattice.then(|| prices.lattice.rows()),
    };

    let methodology = match weighting {
        ProbabilityWeighting::Equal => "Binomial lattice, equal branch weights (European)",
        ProbabilityWeighting::RiskNeutral => "Cox-Ross-Rubinstein binomial lattice (European)",
    };

    let assumptions = serde_json::json!({
        "model": methodology,
        "current_price": s,
        "strike": k,
        "volatility": params.volatility,
        "risk_free_rate": params.risk_free_rate,
        "expiration_years": params.expiration,
        "steps": params.steps,
    });

    let elapsed = start.elapsed().as_micros() as u64;
    Ok(with_metadata(
        methodology,
        &assumptions,
        warnings,
        elapsed,
        output,
    ))
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    fn approx_eq(a: f64, b: f64, tol: f64) -> bool {
        (a - b).abs() < tol
    }

    fn reference_input() -> BinomialInput {
        BinomialInput {
            params: PricingParameters {
                current_price: 100.0,
                strike: 100.0,
                volatility: 0.2,
                risk_free_rate: 0.05,
                expiration: 1.0,
                steps: 2,
            },
            weighting: None,
            include_lattice: None,
        }
    }

    #[test]
    fn test_reference_regression_fixture() {
        let (call, put, lattice) = price(100.0, 100.0, 0.2, 0.05, 1.0, 2).unwrap();
        assert!(approx_eq(call, 7.773837839550424, 1e-12), "call {call}");
        assert!(approx_eq(put, 5.858662061705616, 1e-12), "put {put}");
        assert_eq!(lattice.populated_cells(), 6);
    }

    #[test]
    fn test_risk_neutral_reference() {
        let input = BinomialInput {
            weighting: Some(ProbabilityWeighting::RiskNeutral),
            ..reference_input()
        };
        let out = price_european_option(&input, &EngineConfig::default()).unwrap();
        assert!(approx_eq(out.result.call_price, 9.540501338582947, 1e-12));
        assert!(approx_eq(out.result.put_price, 4.6634437886543445, 1e-12));
        // CRR satisfies put-call parity exactly at any step count
        assert!(out.result.parity_gap.abs() < 1e-10);
        assert!(out.warnings.is_empty());
    }

    #[test]
    fn test_equal_weighting_warns_for_nonzero_rate() {
        let out = price_european_option(&reference_input(), &EngineConfig::default()).unwrap();
        assert_eq!(out.result.weighting, ProbabilityWeighting::Equal);
        assert!(out.warnings.iter().any(|w| w.contains("0.5/0.5")));
    }

    #[test]
    fn test_lattice_included_for_small_trees() {
        let out = price_european_option(&reference_input(), &EngineConfig::default()).unwrap();
        let rows = out.result.lattice.unwrap();
        assert_eq!(rows.len(), 3);
        assert_eq!(rows[2].len(), 3);
        assert_eq!(out.result.lattice_nodes, 6);
    }

    #[test]
    fn test_lattice_omitted_for_large_trees_unless_requested() {
        let mut input = reference_input();
        input.params.steps = 150;
        let out = price_european_option(&input, &EngineConfig::default()).unwrap();
        assert!(out.result.lattice.is_none());

        input.include_lattice = Some(true);
        let out = price_european_option(&input, &EngineConfig::default()).unwrap();
        assert_eq!(out.result.lattice.map(|rows| rows.len()), Some(151));
    }

    #[test]
    fn test_zero_steps_is_configuration_error() {
        let err = price(100.0, 100.0, 0.2, 0.05, 1.0, 0).unwrap_err();
        match err {
            PricingError::InvalidInput { field, .. } => assert_eq!(field, "steps"),
            other => panic!("Expected InvalidInput, got {other:?}"),
        }
    }

    #[test]
    fn test_risk_neutral_converges_towards_black_scholes() {
        let input = BinomialInput {
            params: PricingParameters {
                steps: 500,
                ..reference_input().params
            },
            weighting: Some(ProbabilityWeighting::RiskNeutral),
            include_lattice: None,
        };
        let out = price_european_option(&input, &EngineConfig::default()).unwrap();
        // Black-Scholes ATM call is 10.4506
        assert!(approx_eq(out.result.call_price, 10.4506, 0.01));
        assert!(approx_eq(out.result.put_price, 5.5735, 0.01));
    }

    #[test]
    fn test_input_json_shape() {
        let json = r#"{
            "current_price": 100, "strike": 100, "volatility": 0.2,
            "risk_free_rate": 0.05, "expiration": 1, "steps": 2,
            "weighting": "risk_neutral"
        }"#;
        let input: BinomialInput = serde_json::from_str(json).unwrap();
        assert_eq!(input.params.steps, 2);
        assert_eq!(input.weighting, Some(ProbabilityWeighting::RiskNeutral));
        assert_eq!(input.include_lattice, None);
    }
}
