pub mod market;
pub mod pricing;
pub mod replication;
pub mod volatility;

use clap::ValueEnum;

use binomial_options_core::config::ProbabilityWeighting;
use binomial_options_core::types::Tenor;

/// Expiration presets
#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum TenorArg {
    #[value(name = "2w")]
    TwoWeeks,
    #[value(name = "1m")]
    OneMonth,
    #[value(name = "3m")]
    ThreeMonths,
    #[value(name = "6m")]
    SixMonths,
    #[value(name = "1y")]
    OneYear,
    #[value(name = "2y")]
    TwoYears,
    #[value(name = "3y")]
    ThreeYears,
    #[value(name = "5y")]
    FiveYears,
}

impl From<TenorArg> for Tenor {
    fn from(t: TenorArg) -> Self {
        match t {
            TenorArg::TwoWeeks => Tenor::TwoWeeks,
            TenorArg::OneMonth => Tenor::OneMonth,
            TenorArg::ThreeMonths => Tenor::ThreeMonths,
            TenorArg::SixMonths => Tenor::SixMonths,
            TenorArg::OneYear => Tenor::OneYear,
            TenorArg::TwoYears => Tenor::TwoYears,
            TenorArg::ThreeYears => Tenor::ThreeYears,
            TenorArg::FiveYears => Tenor::FiveYears,
        }
    }
}

/// Branch weighting used in backward induction
#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum WeightingArg {
    /// 0.5 / 0.5
    Equal,
    /// Cox-Ross-Rubinstein risk-neutral probability
    RiskNeutral,
}

impl From<WeightingArg> for ProbabilityWeighting {
    fn from(w: WeightingArg) -> Self {
        match w {
            WeightingArg::Equal => ProbabilityWeighting::Equal,
            WeightingArg::RiskNeutral => ProbabilityWeighting::RiskNeutral,
        }
    }
}
