use serde::{Deserialize, Serialize};
use statrs::statistics::Statistics;
use std::time::Instant;

use crate::config::{EngineConfig, StdDevConvention};
use crate::error::PricingError;
use crate::types::*;
use crate::volatility::series::PriceSeries;
use crate::PricingResult;

/// Median calendar gap above which a "daily" series is probably not daily.
const DAILY_GAP_TOLERANCE_DAYS: i64 = 5;

// ---------------------------------------------------------------------------
// Public types
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SamplingFrequency {
    #[default]
    Daily,
    Weekly,
    Monthly,
}

impl SamplingFrequency {
    pub fn periods_per_year(self, config: &EngineConfig) -> u32 {
        match self {
            SamplingFrequency::Daily => config.trading_days_per_year,
            SamplingFrequency::Weekly => 52,
            SamplingFrequency::Monthly => 12,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VolatilityInput {
    pub series: PriceSeries,
    #[serde(default)]
    pub frequency: SamplingFrequency,
    /// Overrides `EngineConfig::std_dev_convention` when set.
    #[serde(default)]
    pub convention: Option<StdDevConvention>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VolatilityOutput {
    /// Annualized volatility (sigma).
    pub volatility: f64,
    pub periodic_std_dev: f64,
    pub mean_log_return: f64,
    pub observations: usize,
    pub returns: usize,
    pub annualization_factor: f64,
    pub convention: StdDevConvention,
}

// ---------------------------------------------------------------------------
// Estimation
// ---------------------------------------------------------------------------

/// `ln(p[t] / p[t-1])` for each consecutive pair. Callers validate positivity first.
pub fn log_returns(closes: &[f64]) -> Vec<f64> {
    closes.windows(2).map(|w| (w[1] / w[0]).ln()).collect()
}

fn periodic_std_dev(returns: &[f64], convention: StdDevConvention) -> PricingResult<f64> {
    let minimum = match convention {
        StdDevConvention::Sample => 2,
        StdDevConvention::Population => 1,
    };
    if returns.len() < minimum {
        return Err(PricingError::InsufficientData(format!(
            "{:?} standard deviation needs at least {} log returns ({} closes), got {}",
            convention,
            minimum,
            minimum + 1,
            returns.len()
        )));
    }
    let sd = match convention {
        StdDevConvention::Sample => returns.iter().std_dev(),
        StdDevConvention::Population => returns.iter().population_std_dev(),
    };
    if !sd.is_finite() {
        return Err(PricingError::numeric(
            "volatility",
            format!("standard deviation of log returns is {sd}"),
        ));
    }
    Ok(sd)
}

struct Estimate {
    returns: Vec<f64>,
    sd: f64,
    factor: f64,
    volatility: f64,
}

fn estimate(
    series: &PriceSeries,
    frequency: SamplingFrequency,
    convention: StdDevConvention,
    config: &EngineConfig,
) -> PricingResult<Estimate> {
    series.validate()?;
    let returns = log_returns(&series.closes());
    let sd = periodic_std_dev(&returns, convention)?;
    let factor = (frequency.periods_per_year(config) as f64).sqrt();
    Ok(Estimate {
        returns,
        sd,
        factor,
        volatility: sd * factor,
    })
}

/// Annualized volatility of a validated series. The pure core of [`estimate_volatility`].
pub fn annualized_volatility(
    series: &PriceSeries,
    frequency: SamplingFrequency,
    convention: StdDevConvention,
    config: &EngineConfig,
) -> PricingResult<f64> {
    Ok(estimate(series, frequency, convention, config)?.volatility)
}

pub fn estimate_volatility(
    input: &VolatilityInput,
    config: &EngineConfig,
) -> PricingResult<ComputationOutput<VolatilityOutput>> {
    let start = Instant::now();
    config.validate()?;

    let convention = input.convention.unwrap_or(config.std_dev_convention);
    let periods = input.frequency.periods_per_year(config);
    let Estimate {
        returns,
        sd,
        factor,
        volatility,
    } = estimate(&input.series, input.frequency, convention, config)?;

    let mut warnings = Vec::new();
    if input.frequency == SamplingFrequency::Daily {
        if let Some(gap) = input.series.median_gap_days() {
            if gap > DAILY_GAP_TOLERANCE_DAYS {
                let msg = format!(
                    "median gap between closes is {gap} days; daily annualization will mis-scale sigma"
                );
                tracing::warn!("{msg}");
                warnings.push(msg);
            }
        }
    }

    tracing::debug!(
        observations = input.series.len(),
        volatility,
        "estimated annualized volatility"
    );

    let output = VolatilityOutput {
        volatility,
        periodic_std_dev: sd,
        mean_log_return: returns.iter().mean(),
        observations: input.series.len(),
        returns: returns.len(),
        annualization_factor: factor,
        convention,
    };

    let assumptions = serde_json::json!({
        "frequency": input.frequency,
        "periods_per_year": periods,
        "convention": convention,
    });

    let elapsed = start.elapsed().as_micros() as u64;
    Ok(with_metadata(
        "Standard deviation of log returns, annualized by sqrt(periods per year)",
        &assumptions,
        warnings,
        elapsed,
        output,
    ))
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
