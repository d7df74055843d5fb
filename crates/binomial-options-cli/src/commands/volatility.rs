use clap::{Args, ValueEnum};
use serde_json::Value;

use binomial_options_core::config::{EngineConfig, StdDevConvention};
use binomial_options_core::volatility::historical::{
    self, SamplingFrequency, VolatilityInput,
};
use binomial_options_core::volatility::series::PriceSeries;

use crate::input;

#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum FrequencyArg {
    Daily,
    Weekly,
    Monthly,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum ConventionArg {
    /// n - 1 divisor
    Sample,
    /// n divisor
    Population,
}

/// Arguments for historical volatility estimation
#[derive(Args)]
pub struct VolatilityArgs {
    /// Path to JSON input file
    #[arg(long)]
    pub input: Option<String>,

    /// Comma-separated closing prices, oldest first (e.g. "100,101.5,99.8")
    #[arg(long, value_delimiter = ',')]
    pub closes: Option<Vec<f64>>,

    /// Sampling interval of the closes
    #[arg(long, value_enum, default_value = "daily")]
    pub frequency: FrequencyArg,

    /// Standard deviation divisor (defaults to the engine config)
    #[arg(long, value_enum)]
    pub convention: Option<ConventionArg>,
}

pub fn run_volatility(
    args: VolatilityArgs,
    config: &EngineConfig,
) -> Result<Value, Box<dyn std::error::Error>> {
    let vol_input: VolatilityInput = if let Some(ref path) = args.input {
        input::file::read_json(path)?
    } else if let Some(ref closes) = args.closes {
        VolatilityInput {
            series: PriceSeries::from_closes(closes),
            frequency: match args.frequency {
                FrequencyArg::Daily => SamplingFrequency::Daily,
                FrequencyArg::Weekly => SamplingFrequency::Weekly,
                FrequencyArg::Monthly => SamplingFrequency::Monthly,
            },
            convention: args.convention.map(|c| match c {
                ConventionArg::Sample => StdDevConvention::Sample,
                ConventionArg::Population => StdDevConvention::Population,
            }),
        }
    } else if let Some(data) = input::stdin::read_stdin()? {
        serde_json::from_value(data)?
    } else {
        return Err("--input <file.json>, --closes, or stdin required for volatility".into());
    };
    let result = historical::estimate_volatility(&vol_input, config)?;
    Ok(serde_json::to_value(result)?)
}
