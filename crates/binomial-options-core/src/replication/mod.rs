pub mod one_period;
