//! # Market Scenarios
//!
//! $$
//! \Delta V = V \, m \, \beta
//! $$
//!
//! First-order P&L of a market move before and after hedging to the target beta.

use serde::Deserialize;
use serde::Serialize;

/// Portfolio P&L for one market move.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScenarioImpact {
  pub market_move: f64,
  pub unhedged_pnl: f64,
  pub hedged_pnl: f64,
  pub unhedged_value: f64,
  pub hedged_value: f64,
}

pub fn scenario_impacts(
  beta: f64,
  target_beta: f64,
  value: f64,
  moves: &[f64],
) -> Vec<ScenarioImpact> {
  moves
    .iter()
    .map(|&market_move| {
      let unhedged_pnl = value * market_move * beta;
      let hedged_pnl = value * market_move * target_beta;
      ScenarioImpact {
        market_move,
        unhedged_pnl,
        hedged_pnl,
        unhedged_value: value + unhedged_pnl,
        hedged_value: value + hedged_pnl,
      }
    })
    .collect()
}
