use clap::Args;
use rust_decimal::Decimal;
use serde_json::Value;

use binomial_options_core::config::EngineConfig;
use binomial_options_core::market_data::risk_free::{RateScaling, DEFAULT_RATE_INSTRUMENT};
use binomial_options_core::market_data::snapshot::{MarketSnapshot, SnapshotSource};
use binomial_options_core::market_data::workflow::{
    self, MarketPricingRequest, StrikeSelection,
};
use binomial_options_core::market_data::Lookback;
use binomial_options_core::types::Tenor;

use super::{TenorArg, WeightingArg};
use crate::input;

/// Arguments for pricing from a market-data snapshot
#[derive(Args)]
pub struct MarketPriceArgs {
    /// Path to the JSON market snapshot (closes, strikes, yields)
    #[arg(long)]
    pub market_data: String,

    /// Path to a JSON pricing request; replaces the flags below
    #[arg(long)]
    pub input: Option<String>,

    /// Ticker symbol (e.g. AMZN)
    #[arg(long)]
    pub ticker: Option<String>,

    /// Strike; defaults to the listed strike nearest the last close
    #[arg(long)]
    pub strike: Option<Decimal>,

    /// Expiration preset
    #[arg(long, value_enum, default_value = "1m", conflicts_with = "expiration")]
    pub tenor: TenorArg,

    /// Expiration in years
    #[arg(long)]
    pub expiration: Option<f64>,

    /// Number of lattice steps
    #[arg(long, default_value = "6")]
    pub steps: u32,

    /// Reference instrument for the risk-free yield
    #[arg(long, default_value = DEFAULT_RATE_INSTRUMENT)]
    pub rate_instrument: String,

    /// Scale the annual rate by the horizon when it is under a year
    #[arg(long)]
    pub pro_rata_rate: bool,

    /// Trading days of history for volatility (default one year)
    #[arg(long)]
    pub lookback_days: Option<u32>,

    #[arg(long, value_enum)]
    pub weighting: Option<WeightingArg>,

    /// Always include the price lattice in the output
    #[arg(long)]
    pub lattice: bool,
}

fn request_from_flags(
    args: &MarketPriceArgs,
) -> Result<MarketPricingRequest, Box<dyn std::error::Error>> {
    let ticker = args
        .ticker
        .clone()
        .ok_or("--ticker is required without --input")?;
    let (tenor, expiration) = match args.expiration {
        Some(years) => (None, Some(years)),
        None => (Some(Tenor::from(args.tenor)), None),
    };
    Ok(MarketPricingRequest {
        ticker,
        strike: args
            .strike
            .map(StrikeSelection::Explicit)
            .unwrap_or_default(),
        tenor,
        expiration,
        steps: args.steps,
        rate_instrument: args.rate_instrument.clone(),
        rate_scaling: if args.pro_rata_rate {
            RateScaling::ProRata
        } else {
            RateScaling::Annual
        },
        lookback: args
            .lookback_days
            .map(Lookback::TradingDays)
            .unwrap_or_default(),
        weighting: args.weighting.map(Into::into),
        include_lattice: args.lattice.then_some(true),
    })
}

pub fn run_market_price(
    args: MarketPriceArgs,
    config: &EngineConfig,
) -> Result<Value, Box<dyn std::error::Error>> {
    let snapshot: MarketSnapshot = input::file::read_json(&args.market_data)?;
    let source = SnapshotSource::new(snapshot);

    let request: MarketPricingRequest = if let Some(ref path) = args.input {
        input::file::read_json(path)?
    } else {
        request_from_flags(&args)?
    };

    let result = workflow::price_from_market(&source, &request, config).map_err(|e| {
        if e.is_retrieval() {
            format!("market data unavailable: {e}")
        } else {
            e.to_string()
        }
    })?;
    Ok(serde_json::to_value(result)?)
}
