mod commands;
mod input;
mod output;

use clap::{Parser, Subcommand, ValueEnum};
use colored::Colorize;
use std::process;

use binomial_options_core::config::EngineConfig;

use commands::market::MarketPriceArgs;
use commands::pricing::PriceArgs;
use commands::replication::ReplicateArgs;
use commands::volatility::VolatilityArgs;

/// Binomial lattice option pricing
#[derive(Parser)]
#[command(
    name = "bopm",
    version,
    about = "Binomial lattice option pricing",
    long_about = "Prices European calls and puts on a recombining binomial lattice. \
                  Estimates annualized volatility from closing prices, builds the \
                  price lattice and values both options by backward induction."
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Output format
    #[arg(long, default_value = "json", global = true)]
    output: OutputFormat,

    /// Path to a JSON engine config (step limits, weighting, std dev convention)
    #[arg(long, global = true)]
    config: Option<String>,
}

#[derive(Subcommand)]
enum Commands {
    /// Price a European call and put on a binomial lattice
    Price(PriceArgs),
    /// Estimate annualized volatility from closing prices
    Volatility(VolatilityArgs),
    /// Price from a market-data snapshot (history, option chain, reference yield)
    MarketPrice(MarketPriceArgs),
    /// One-period replicating portfolio for a call or put
    Replicate(ReplicateArgs),
    /// Print version information
    Version,
}

#[derive(Debug, Clone, ValueEnum)]
pub enum OutputFormat {
    Json,
    Table,
    Csv,
    /// Price lattice nodes as step,down_moves,price rows
    LatticeCsv,
    Minimal,
}

fn load_config(path: Option<&str>) -> Result<EngineConfig, Box<dyn std::error::Error>> {
    match path {
        Some(p) => {
            let config: EngineConfig = input::file::read_json(p)?;
            config.validate()?;
            Ok(config)
        }
        None => Ok(EngineConfig::default()),
    }
}

fn main() {
    let cli = Cli::parse();

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
        )
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    let config = match load_config(cli.config.as_deref()) {
        Ok(c) => c,
        Err(e) => {
            eprintln!("{}: {}", "error".red().bold(), e);
            process::exit(1);
        }
    };
    tracing::debug!(?config, "engine config loaded");

    let result: Result<serde_json::Value, Box<dyn std::error::Error>> = match cli.command {
        Commands::Price(args) => commands::pricing::run_price(args, &config),
        Commands::Volatility(args) => commands::volatility::run_volatility(args, &config),
        Commands::MarketPrice(args) => commands::market::run_market_price(args, &config),
        Commands::Replicate(args) => commands::replication::run_replicate(args),
        Commands::Version => {
            println!("bopm {}", env!("CARGO_PKG_VERSION"));
            return;
        }
    };

    match result {
        Ok(value) => {
            output::format_output(&cli.output, &value);
            process::exit(0);
        }
        Err(e) => {
            tracing::debug!("command failed: {e}");
            eprintln!("{}: {}", "error".red().bold(), e);
            process::exit(1);
        }
    }
}
