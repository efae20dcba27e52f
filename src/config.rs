//! # Configuration
//!
//! $$
//! \mu^{ann} = \bar r \cdot N_{year}, \qquad \Sigma^{ann} = \hat\Sigma \cdot N_{year}
//! $$
//!
//! Run constants for the analytics engine. Every field has a default, so a
//! request may override any subset of them.

use serde::Deserialize;
use serde::Serialize;
use serde_json::Value;

use crate::error::AnalyticsError;
use crate::error::Result;
use crate::portfolio::types::ReturnEstimator;

/// Runtime configuration for [`crate::engine::PortfolioEngine`].
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct AnalyticsConfig {
  /// Annualization factor for daily statistics.
  pub trading_days_per_year: f64,
  /// Minimum aligned price rows and minimum beta overlap.
  pub min_observations: usize,
  /// Low-volatility asset whose mean return proxies the risk-free rate.
  pub risk_free_ticker: String,
  /// Risk-free rate used when the reference asset is not priced.
  pub default_risk_free_rate: f64,
  /// Benchmark used for beta and hedging.
  pub benchmark_ticker: String,
  /// Expected-return estimator.
  pub return_estimator: ReturnEstimator,
  /// Number of target returns on the frontier grid.
  pub frontier_points: usize,
  /// Grid upper bound as a multiple of the max-Sharpe return.
  pub frontier_upper_multiplier: f64,
  /// Number of Monte Carlo portfolios.
  pub random_portfolios: usize,
  /// Optimized weights below this magnitude are cleaned to zero.
  pub weight_cutoff: f64,
  /// Index future price as a multiple of the benchmark equity price.
  pub future_price_ratio: f64,
  /// Dollar multiplier of one index future contract.
  pub future_multiplier: f64,
  /// Market moves evaluated by the scenario table.
  pub scenario_moves: Vec<f64>,
  /// Seed for the Monte Carlo sampler; entropy-seeded when absent.
  pub seed: Option<u64>,
  /// Interior-point iteration cap.
  pub solver_max_iter: u32,
  /// Interior-point gap and feasibility tolerance.
  pub solver_tolerance: f64,
}

impl Default for AnalyticsConfig {
  fn default() -> Self {
    Self {
      trading_days_per_year: 252.0,
      min_observations: 30,
      risk_free_ticker: "SGOV".to_string(),
      default_risk_free_rate: 0.05,
      benchmark_ticker: "SPY".to_string(),
      return_estimator: ReturnEstimator::Compounded,
      frontier_points: 50,
      frontier_upper_multiplier: 1.2,
      random_portfolios: 10_000,
      weight_cutoff: 1e-4,
      future_price_ratio: 10.0,
      future_multiplier: 50.0,
      scenario_moves: vec![-0.05, 0.0, 0.05],
      seed: None,
      solver_max_iter: 200,
      solver_tolerance: 1e-9,
    }
  }
}

impl AnalyticsConfig {
  /// Copy of `self` with the camelCase fields of `overrides` replaced.
  ///
  /// Fields absent from `overrides` keep their current values, not the defaults.
  pub fn with_overrides(&self, overrides: &Value) -> Result<Self> {
    let invalid = |e: serde_json::Error| AnalyticsError::Validation(format!("Invalid config: {e}"));

    let mut merged = serde_json::to_value(self).map_err(invalid)?;
    match (merged.as_object_mut(), overrides) {
      (_, Value::Null) => {}
      (Some(base), Value::Object(patch)) => {
        for (key, value) in patch {
          base.insert(key.clone(), value.clone());
        }
      }
      _ => {
        return Err(AnalyticsError::Validation(
          "Invalid config: expected a JSON object".into(),
        ))
      }
    }

    let config: Self = serde_json::from_value(merged).map_err(invalid)?;
    config.validate()?;
    Ok(config)
  }

  /// Reject values no run can use.
  pub fn validate(&self) -> Result<()> {
    let positive = [
      ("tradingDaysPerYear", self.trading_days_per_year),
      ("frontierUpperMultiplier", self.frontier_upper_multiplier),
      ("futurePriceRatio", self.future_price_ratio),
      ("futureMultiplier", self.future_multiplier),
      ("solverTolerance", self.solver_tolerance),
    ];
    if let Some((name, value)) = positive.iter().find(|(_, v)| !v.is_finite() || *v <= 0.0) {
      return Err(AnalyticsError::Validation(format!(
        "Invalid config: {name} must be positive, got {value}"
      )));
    }

    if !self.weight_cutoff.is_finite() || self.weight_cutoff < 0.0 {
      return Err(AnalyticsError::Validation(format!(
        "Invalid config: weightCutoff must be non-negative, got {}",
        self.weight_cutoff
      )));
    }
    if self.min_observations < 2 {
      return Err(AnalyticsError::Validation(format!(
        "Invalid config: minObservations must be at least 2, got {}",
        self.min_observations
      )));
    }
    if self.risk_free_ticker.trim().is_empty() || self.benchmark_ticker.trim().is_empty() {
      return Err(AnalyticsError::Validation(
        "Invalid config: reference tickers must be non-empty".into(),
      ));
    }
    Ok(())
  }
}

#[cfg(test)]
mod tests {
  use serde_json::json;

  use super::*;

  #[test]
  fn partial_overrides_keep_defaults() {
    let config: AnalyticsConfig =
      serde_json::from_str(r#"{ "frontierPoints": 20, "seed": 7 }"#).unwrap();

    assert_eq!(config.frontier_points, 20);
    assert_eq!(config.seed, Some(7));
    assert_eq!(config.min_observations, 30);
    assert_eq!(config.risk_free_ticker, "SGOV");
    assert_eq!(config.return_estimator, ReturnEstimator::Compounded);
  }

  #[test]
  fn overrides_merge_over_a_custom_base() {
    let base = AnalyticsConfig {
      random_portfolios: 50,
      benchmark_ticker: "QQQ".into(),
      ..AnalyticsConfig::default()
    };

    let merged = base.with_overrides(&json!({ "seed": 1 })).unwrap();
    assert_eq!(merged.seed, Some(1));
    assert_eq!(merged.random_portfolios, 50);
    assert_eq!(merged.benchmark_ticker, "QQQ");

    assert_eq!(base.with_overrides(&Value::Null).unwrap(), base);
  }

  #[test]
  fn rejects_non_positive_future_terms() {
    let base = AnalyticsConfig::default();

    for bad in [json!({ "futureMultiplier": 0.0 }), json!({ "futurePriceRatio": -10.0 })] {
      let err = base.with_overrides(&bad).unwrap_err();
      assert_eq!(err.kind(), "ValidationError");
      assert!(err.to_string().contains("must be positive"));
    }
  }

  #[test]
  fn rejects_malformed_overrides() {
    let base = AnalyticsConfig::default();

    assert!(base.with_overrides(&json!([1, 2])).is_err());
    assert!(base.with_overrides(&json!({ "frontierPoints": "many" })).is_err());
    assert!(base.with_overrides(&json!({ "returnEstimator": "median" })).is_err());
  }
}
