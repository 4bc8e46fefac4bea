pub mod chart;
pub mod indicators;

#[cfg(test)]
mod indicators_tests;

pub use chart::*;
pub use indicators::*;
