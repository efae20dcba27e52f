//! # Hedge Sizing
//!
//! $$
//! H = (\beta - \beta^\*) V
//! $$
//!
//! Notional needed to move a portfolio from its beta to a target beta,
//! expressed in benchmark shares and in index future contracts. A positive
//! notional is a short hedge.

use serde::Deserialize;
use serde::Serialize;

use crate::error::AnalyticsError;
use crate::error::Result;

/// Hedge expressed in two instruments.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HedgeSizing {
  pub hedge_notional: f64,
  pub benchmark_shares: i64,
  pub benchmark_notional: f64,
  pub future_contracts: i64,
  pub future_notional: f64,
  pub target_beta: f64,
}

/// Size the hedge moving `current_beta` to `target_beta` on `value` dollars.
///
/// Share and contract counts truncate toward zero.
pub fn hedge_sizing(
  current_beta: f64,
  target_beta: f64,
  value: f64,
  benchmark_price: f64,
  future_price_ratio: f64,
  future_multiplier: f64,
) -> Result<HedgeSizing> {
  if !benchmark_price.is_finite() || benchmark_price <= 0.0 {
    return Err(AnalyticsError::InvalidPrice(benchmark_price));
  }
  for (name, term) in [
    ("future price ratio", future_price_ratio),
    ("future multiplier", future_multiplier),
  ] {
    if !term.is_finite() || term <= 0.0 {
      return Err(AnalyticsError::Validation(format!(
        "{name} must be positive, got {term}"
      )));
    }
  }

  let hedge_notional = (current_beta - target_beta) * value;

  let benchmark_shares = (hedge_notional / benchmark_price).trunc() as i64;
  let contract_value = benchmark_price * future_price_ratio * future_multiplier;
  let future_contracts = (hedge_notional / contract_value).trunc() as i64;

  Ok(HedgeSizing {
    hedge_notional,
    benchmark_shares,
    benchmark_notional: benchmark_shares as f64 * benchmark_price,
    future_contracts,
    future_notional: future_contracts as f64 * contract_value,
    target_beta,
  })
}
