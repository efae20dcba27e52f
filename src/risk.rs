//! # Risk
//!
//! Portfolio beta against a benchmark, hedge sizing toward a target beta and
//! the scenario table built from both.

pub mod beta;
pub mod hedge;
pub mod scenario;

pub use beta::portfolio_beta;
pub use hedge::hedge_sizing;
pub use hedge::HedgeSizing;
pub use scenario::scenario_impacts;
pub use scenario::ScenarioImpact;
