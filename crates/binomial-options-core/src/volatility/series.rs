use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::error::PricingError;
use crate::PricingResult;

/// One closing price, optionally stamped with its trading date.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PriceObservation {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub date: Option<NaiveDate>,
    pub close: f64,
}

/// Chronological closing prices for one underlying.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PriceSeries {
    pub observations: Vec<PriceObservation>,
}

impl PriceSeries {
    pub fn new(observations: Vec<PriceObservation>) -> Self {
        PriceSeries { observations }
    }

    /// Undated closes, assumed to be in chronological order.
    pub fn from_closes(closes: &[f64]) -> Self {
        PriceSeries {
            observations: closes
                .iter()
                .map(|&close| PriceObservation { date: None, close })
                .collect(),
        }
    }

    pub fn len(&self) -> usize {
        self.observations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.observations.is_empty()
    }

    pub fn closes(&self) -> Vec<f64> {
        self.observations.iter().map(|o| o.close).collect()
    }

    pub fn last_close(&self) -> Option<f64> {
        self.observations.last().map(|o| o.close)
    }

    /// Reject closes that would poison the log returns, and dates that go backwards.
    pub fn validate(&self) -> PricingResult<()> {
        for (i, obs) in self.observations.iter().enumerate() {
            if !obs.close.is_finite() {
                return Err(PricingError::data_quality(
                    &format!("closes[{i}]"),
                    "must be finite",
                ));
            }
            if obs.close <= 0.0 {
                return Err(PricingError::data_quality(
                    &format!("closes[{i}]"),
                    format!("must be positive, got {}", obs.close),
                ));
            }
        }

        let mut prev: Option<NaiveDate> = None;
        for (i, obs) in self.observations.iter().enumerate() {
            if let (Some(p), Some(d)) = (prev, obs.date) {
                if d <= p {
                    return Err(PricingError::data_quality(
                        &format!("dates[{i}]"),
                        format!("{d} does not follow {p}"),
                    ));
                }
            }
            if obs.date.is_some() {
                prev = obs.date;
            }
        }
        Ok(())
    }

    /// Median calendar-day gap between consecutive dated observations.
    pub fn median_gap_days(&self) -> Option<i64> {
        let dates: Vec<NaiveDate> = self.observations.iter().filter_map(|o| o.date).collect();
        if dates.len() < 2 {
            return None;
        }
        let mut gaps: Vec<i64> = dates
            .windows(2)
            .map(|w| (w[1] - w[0]).num_days())
            .collect();
        gaps.sort_unstable();
        Some(gaps[gaps.len() / 2])
    }
}
