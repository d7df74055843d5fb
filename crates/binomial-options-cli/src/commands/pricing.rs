use clap::Args;
use serde_json::Value;

use binomial_options_core::config::EngineConfig;
use binomial_options_core::lattice::params::PricingParameters;
use binomial_options_core::lattice::pricing::{self, BinomialInput};
use binomial_options_core::types::Tenor;

use super::{TenorArg, WeightingArg};
use crate::input;

/// Arguments for binomial option pricing
#[derive(Args)]
pub struct PriceArgs {
    /// Path to JSON input file
    #[arg(long)]
    pub input: Option<String>,

    /// Current price of the underlying
    #[arg(long)]
    pub spot: Option<f64>,

    /// Strike price
    #[arg(long)]
    pub strike: Option<f64>,

    /// Annualized volatility (e.g. 0.25)
    #[arg(long)]
    pub volatility: Option<f64>,

    /// Risk-free rate as a decimal (e.g. 0.05)
    #[arg(long, default_value = "0.0", allow_hyphen_values = true)]
    pub rate: f64,

    /// Expiration in years
    #[arg(long, conflicts_with = "tenor")]
    pub expiration: Option<f64>,

    /// Expiration preset
    #[arg(long, value_enum)]
    pub tenor: Option<TenorArg>,

    /// Number of lattice steps
    #[arg(long, default_value = "6")]
    pub steps: u32,

    /// Branch weighting (defaults to the engine config)
    #[arg(long, value_enum)]
    pub weighting: Option<WeightingArg>,

    /// Always include the price lattice in the output
    #[arg(long)]
    pub lattice: bool,
}

fn required(value: Option<f64>, flag: &str) -> Result<f64, Box<dyn std::error::Error>> {
    value.ok_or_else(|| format!("--{flag} is required without --input").into())
}

fn input_from_flags(args: &PriceArgs) -> Result<BinomialInput, Box<dyn std::error::Error>> {
    let expiration = match (args.expiration, args.tenor) {
        (Some(years), _) => years,
        (None, Some(tenor)) => Tenor::from(tenor).years(),
        (None, None) => return Err("--expiration or --tenor is required without --input".into()),
    };
    Ok(BinomialInput {
        params: PricingParameters {
            current_price: required(args.spot, "spot")?,
            strike: required(args.strike, "strike")?,
            volatility: required(args.volatility, "volatility")?,
            risk_free_rate: args.rate,
            expiration,
            steps: args.steps,
        },
        weighting: args.weighting.map(Into::into),
        include_lattice: args.lattice.then_some(true),
    })
}

pub fn run_price(
    args: PriceArgs,
    config: &EngineConfig,
) -> Result<Value, Box<dyn std::error::Error>> {
    let price_input: BinomialInput = if let Some(ref path) = args.input {
        input::file::read_json(path)?
    } else if args.spot.is_some() {
        input_from_flags(&args)?
    } else if let Some(data) = input::stdin::read_stdin()? {
        serde_json::from_value(data)?
    } else {
        return Err("--input <file.json>, stdin, or --spot/--strike/--volatility flags required".into());
    };
    let result = pricing::price_european_option(&price_input, config)?;
    Ok(serde_json::to_value(result)?)
}
