use rust_decimal::prelude::ToPrimitive;
use serde::{Deserialize, Serialize};
use std::time::Instant;

use crate::config::{EngineConfig, ProbabilityWeighting};
use crate::error::PricingError;
use crate::lattice::params::PricingParameters;
use crate::lattice::pricing::{price_european_option, BinomialInput, BinomialOutput};
use crate::market_data::risk_free::{risk_free_rate_from_yield, RateScaling, DEFAULT_RATE_INSTRUMENT};
use crate::market_data::{Lookback, MarketDataSource};
use crate::types::*;
use crate::volatility::historical::{annualized_volatility, SamplingFrequency};
use crate::PricingResult;

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StrikeSelection {
    /// Listed strike closest to the latest close.
    #[default]
    NearestToSpot,
    Explicit(Money),
}

/// One pricing request against a market-data source.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MarketPricingRequest {
    pub ticker: String,
    #[serde(default)]
    pub strike: StrikeSelection,
    /// Preset horizon; mutually exclusive with `expiration`.
    #[serde(default)]
    pub tenor: Option<Tenor>,
    #[serde(default)]
    pub expiration: Option<Years>,
    pub steps: u32,
    #[serde(default = "default_rate_instrument")]
    pub rate_instrument: String,
    #[serde(default)]
    pub rate_scaling: RateScaling,
    #[serde(default)]
    pub lookback: Lookback,
    #[serde(default)]
    pub weighting: Option<ProbabilityWeighting>,
    #[serde(default)]
    pub include_lattice: Option<bool>,
}

fn default_rate_instrument() -> String {
    DEFAULT_RATE_INSTRUMENT.to_string()
}

impl MarketPricingRequest {
    pub fn resolve_expiration(&self) -> PricingResult<Years> {
        match (self.tenor, self.expiration) {
            (Some(tenor), None) => Ok(tenor.years()),
            (None, Some(years)) => Ok(years),
            (Some(_), Some(_)) => Err(PricingError::invalid(
                "expiration",
                "give either a tenor or an expiration in years, not both",
            )),
            (None, None) => Err(PricingError::invalid(
                "expiration",
                "a tenor or an expiration in years is required",
            )),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MarketPricingOutput {
    pub ticker: String,
    pub current_price: f64,
    pub strike: Money,
    pub volatility: f64,
    pub risk_free_rate: f64,
    pub expiration: Years,
    pub history_observations: usize,
    pub pricing: BinomialOutput,
}

fn to_engine(field: &str, value: Money) -> PricingResult<f64> {
    value
        .to_f64()
        .ok_or_else(|| PricingError::data_quality(field, format!("{value} is not representable")))
}

/// Fetch inputs from `source`, then run estimator, lattice builder and valuer in order.
pub fn price_from_market<S: MarketDataSource + ?Sized>(
    source: &S,
    request: &MarketPricingRequest,
    config: &EngineConfig,
) -> PricingResult<ComputationOutput<MarketPricingOutput>> {
    let start = Instant::now();
    config.validate()?;
    let expiration = request.resolve_expiration()?;
    request.lookback.validate()?;

    let chain = source.option_chain(&request.ticker)?;
    chain.validate(source.name())?;
    let history = source.historical_closes(&request.ticker, request.lookback)?;
    let yield_percent = source.latest_yield_percent(&request.rate_instrument)?;

    let mut warnings = Vec::new();
    let strike = match request.strike {
        StrikeSelection::Explicit(strike) => {
            if !chain.lists_strike(strike) {
                warnings.push(format!(
                    "strike {strike} is not listed for {}",
                    chain.underlying
                ));
            }
            strike
        }
        StrikeSelection::NearestToSpot => {
            chain.nearest_strike(chain.last_close).ok_or_else(|| {
                PricingError::retrieval(
                    source.name(),
                    format!("no options listed for {}", request.ticker),
                )
            })?
        }
    };

    let volatility = annualized_volatility(
        &history,
        SamplingFrequency::Daily,
        config.std_dev_convention,
        config,
    )?;
    let risk_free_rate = risk_free_rate_from_yield(yield_percent, expiration, request.rate_scaling)?;

    tracing::debug!(
        ticker = %request.ticker,
        volatility,
        risk_free_rate,
        "resolved market inputs"
    );

    let input = BinomialInput {
        params: PricingParameters {
            current_price: to_engine("current_price", chain.last_close)?,
            strike: to_engine("strike", strike)?,
            volatility,
            risk_free_rate,
            expiration,
            steps: request.steps,
        },
        weighting: request.weighting,
        include_lattice: request.include_lattice,
    };
    let priced = price_european_option(&input, config)?;
    warnings.extend(priced.warnings);

    let output = MarketPricingOutput {
        ticker: chain.underlying.clone(),
        current_price: input.params.current_price,
        strike,
        volatility,
        risk_free_rate,
        expiration,
        history_observations: history.len(),
        pricing: priced.result,
    };

    let assumptions = serde_json::json!({
        "source": source.name(),
        "rate_instrument": request.rate_instrument,
        "yield_percent": yield_percent.to_string(),
        "rate_scaling": request.rate_scaling,
        "lookback_trading_days": request.lookback.trading_days(),
        "std_dev_convention": config.std_dev_convention,
        "steps": request.steps,
    });

    let elapsed = start.elapsed().as_micros() as u64;
    Ok(with_metadata(
        &priced.methodology,
        &assumptions,
        warnings,
        elapsed,
        output,
    ))
}
