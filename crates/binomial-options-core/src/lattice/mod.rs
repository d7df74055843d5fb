pub mod params;
pub mod pricing;
pub mod tree;
pub mod valuation;
