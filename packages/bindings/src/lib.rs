use napi::Result as NapiResult;
use napi_derive::napi;

use binomial_options_core::config::EngineConfig;

/// Convert any Display error into a napi::Error.
fn to_napi_error(e: impl std::fmt::Display) -> napi::Error {
    napi::Error::from_reason(e.to_string())
}

/// Engine config from optional JSON; defaults when absent.
fn parse_config(config_json: Option<String>) -> NapiResult<EngineConfig> {
    match config_json {
        Some(json) => EngineConfig::from_json(&json).map_err(to_napi_error),
        None => Ok(EngineConfig::default()),
    }
}

// ---------------------------------------------------------------------------
// Pricing
// ---------------------------------------------------------------------------

#[napi]
pub fn price_binomial(input_json: String, config_json: Option<String>) -> NapiResult<String> {
    let input: binomial_options_core::lattice::pricing::BinomialInput =
        serde_json::from_str(&input_json).map_err(to_napi_error)?;
    let config = parse_config(config_json)?;
    let output = binomial_options_core::lattice::pricing::price_european_option(&input, &config)
        .map_err(to_napi_error)?;
    serde_json::to_string(&output).map_err(to_napi_error)
}

#[napi]
pub fn replicate_one_period(input_json: String) -> NapiResult<String> {
    let input: binomial_options_core::replication::one_period::ReplicationInput =
        serde_json::from_str(&input_json).map_err(to_napi_error)?;
    let output = binomial_options_core::replication::one_period::replicate_one_period(&input)
        .map_err(to_napi_error)?;
    serde_json::to_string(&output).map_err(to_napi_error)
}

// ---------------------------------------------------------------------------
// Volatility
// ---------------------------------------------------------------------------

#[napi]
pub fn estimate_volatility(input_json: String, config_json: Option<String>) -> NapiResult<String> {
    let input: binomial_options_core::volatility::historical::VolatilityInput =
        serde_json::from_str(&input_json).map_err(to_napi_error)?;
    let config = parse_config(config_json)?;
    let output = binomial_options_core::volatility::historical::estimate_volatility(&input, &config)
        .map_err(to_napi_error)?;
    serde_json::to_string(&output).map_err(to_napi_error)
}

// ---------------------------------------------------------------------------
// Market data
// ---------------------------------------------------------------------------

#[napi]
pub fn price_from_snapshot(
    snapshot_json: String,
    request_json: String,
    config_json: Option<String>,
) -> NapiResult<String> {
    let source = binomial_options_core::market_data::snapshot::SnapshotSource::from_json(
        &snapshot_json,
    )
    .map_err(to_napi_error)?;
    let request: binomial_options_core::market_data::workflow::MarketPricingRequest =
        serde_json::from_str(&request_json).map_err(to_napi_error)?;
    let config = parse_config(config_json)?;
    let output =
        binomial_options_core::market_data::workflow::price_from_market(&source, &request, &config)
            .map_err(to_napi_error)?;
    serde_json::to_string(&output).map_err(to_napi_error)
}
