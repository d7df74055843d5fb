pub mod config;
pub mod error;
pub mod types;

#[cfg(feature = "volatility")]
pub mod volatility;

#[cfg(feature = "lattice")]
pub mod lattice;

#[cfg(feature = "market_data")]
pub mod market_data;

#[cfg(feature = "replication")]
pub mod replication;

pub use config::EngineConfig;
pub use error::PricingError;
pub use types::*;

/// Standard result type for all pricing operations
pub type PricingResult<T> = Result<T, PricingError>;
