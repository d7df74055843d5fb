#![cfg(all(feature = "market_data", feature = "replication"))]

use binomial_options_core::config::EngineConfig;
use binomial_options_core::market_data::snapshot::SnapshotSource;
use binomial_options_core::market_data::workflow::{
    price_from_market, MarketPricingRequest, StrikeSelection,
};
use binomial_options_core::market_data::{Lookback, MarketDataSource};
use binomial_options_core::replication::one_period::{replicate_one_period, ReplicationInput};
use binomial_options_core::types::{OptionType, Tenor};
use rust_decimal_macros::dec;

fn snapshot_json() -> String {
    let closes: Vec<String> = (0..300)
        .map(|i| {
            let close = 150.0 + 10.0 * ((i as f64) / 9.0).sin() + (i as f64) * 0.05;
            format!(r#"{{"close": {close:.4}}}"#)
        })
        .collect();
    format!(
        r#"{{
            "tickers": {{
                "AMZN": {{
                    "closes": [{}],
                    "last_close": "164.20",
                    "expiration": "2024-07-19",
                    "strikes": ["150", "155", "160", "165", "170", "175"]
                }}
            }},
            "yields": {{ "^IRX": "5.2" }}
        }}"#,
        closes.join(",")
    )
}

#[test]
fn test_price_from_snapshot_uses_one_year_of_history() {
    let source = SnapshotSource::from_json(&snapshot_json()).unwrap();
    let request = MarketPricingRequest {
        ticker: "AMZN".into(),
        strike: StrikeSelection::NearestToSpot,
        tenor: Some(Tenor::ThreeMonths),
        expiration: None,
        steps: 6,
        rate_instrument: "^IRX".into(),
        rate_scaling: Default::default(),
        lookback: Lookback::OneYear,
        weighting: None,
        include_lattice: None,
    };
    let out = price_from_market(&source, &request, &EngineConfig::default()).unwrap();
    let r = out.result;
    assert_eq!(r.strike, dec!(165));
    assert_eq!(r.history_observations, 253);
    assert_eq!(r.expiration, 0.25);
    assert!(r.volatility > 0.0);
    assert!(r.pricing.call_price > 0.0 && r.pricing.put_price > 0.0);
    assert_eq!(r.pricing.lattice.map(|rows| rows.len()), Some(7));
    assert_eq!(out.assumptions["source"], "snapshot");
}

#[test]
fn test_trait_object_source() {
    let source = SnapshotSource::from_json(&snapshot_json()).unwrap();
    let dynamic: &dyn MarketDataSource = &source;
    let request: MarketPricingRequest = serde_json::from_str(
        r#"{"ticker": "amzn", "tenor": "one_month", "steps": 12, "strike": {"explicit": "170"}}"#,
    )
    .unwrap();
    let out = price_from_market(dynamic, &request, &EngineConfig::default()).unwrap();
    assert_eq!(out.result.strike, dec!(170));
    assert_eq!(out.result.ticker, "AMZN");
}

#[test]
fn test_replication_matches_single_step_shape() {
    let out = replicate_one_period(&ReplicationInput {
        current_price: 164.2,
        strike: 165.0,
        volatility: 0.32,
        risk_free_rate: 0.052,
        period: 1.0 / 12.0,
        option_type: OptionType::Call,
    })
    .unwrap();
    let r = out.result;
    assert!(r.up_price > 164.2 && r.down_price < 164.2);
    assert!((r.up_price * r.down_price - 164.2 * 164.2).abs() < 1e-8);
    assert!(r.value > 0.0 && r.value < r.up_payoff);
}
