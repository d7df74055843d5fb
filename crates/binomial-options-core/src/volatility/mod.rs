pub mod historical;
pub mod series;
