use clap::{Args, ValueEnum};
use serde_json::Value;

use binomial_options_core::replication::one_period::{self, ReplicationInput};
use binomial_options_core::types::OptionType;

use crate::input;

#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum OptionTypeArg {
    Call,
    Put,
}

/// Arguments for one-period replication
#[derive(Args)]
pub struct ReplicateArgs {
    /// Path to JSON input file
    #[arg(long)]
    pub input: Option<String>,

    #[arg(long)]
    pub spot: Option<f64>,

    #[arg(long)]
    pub strike: Option<f64>,

    #[arg(long)]
    pub volatility: Option<f64>,

    /// Risk-free rate as a decimal
    #[arg(long, default_value = "0.0", allow_hyphen_values = true)]
    pub rate: f64,

    /// Period length in years (default one month)
    #[arg(long, default_value_t = 1.0 / 12.0)]
    pub period: f64,

    #[arg(long, value_enum, default_value = "call")]
    pub option_type: OptionTypeArg,
}

pub fn run_replicate(args: ReplicateArgs) -> Result<Value, Box<dyn std::error::Error>> {
    let rep_input: ReplicationInput = if let Some(ref path) = args.input {
        input::file::read_json(path)?
    } else if let (Some(spot), Some(strike), Some(volatility)) =
        (args.spot, args.strike, args.volatility)
    {
        ReplicationInput {
            current_price: spot,
            strike,
            volatility,
            risk_free_rate: args.rate,
            period: args.period,
            option_type: match args.option_type {
                OptionTypeArg::Call => OptionType::Call,
                OptionTypeArg::Put => OptionType::Put,
            },
        }
    } else if let Some(data) = input::stdin::read_stdin()? {
        serde_json::from_value(data)?
    } else {
        return Err("--input <file.json>, stdin, or --spot/--strike/--volatility required".into());
    };
    let result = one_period::replicate_one_period(&rep_input)?;
    Ok(serde_json::to_value(result)?)
}
