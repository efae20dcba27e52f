//! # Portfolio Types
//!
//! $$
//! \mathbf{w}^\*=\arg\max_{\mathbf{w}} \frac{\mathbb E[R_p]-r_f}{\sigma_p}
//! $$
//!
//! Shared enums, weight vectors and result containers for portfolio optimization.

use std::str::FromStr;

use ndarray::Array1;
use ndarray::ArrayView1;
use serde::Deserialize;
use serde::Serialize;
use serde::Serializer;
use serde::ser::SerializeMap;

use crate::error::AnalyticsError;

/// Estimator used to annualize historical returns.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReturnEstimator {
  /// Mean daily percentage change times trading days.
  Arithmetic,
  /// Geometric growth rate `prod(1 + r)^(N / T) - 1`.
  #[default]
  Compounded,
}

impl FromStr for ReturnEstimator {
  type Err = AnalyticsError;

  fn from_str(s: &str) -> Result<Self, Self::Err> {
    match s.to_lowercase().as_str() {
      "arithmetic" | "mean" | "simple" => Ok(Self::Arithmetic),
      "compounded" | "cagr" | "geometric" => Ok(Self::Compounded),
      other => Err(AnalyticsError::Validation(format!(
        "Unknown return estimator: {other}"
      ))),
    }
  }
}

/// Return, volatility and Sharpe ratio of one portfolio.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PortfolioStats {
  /// Expected portfolio return (annualized if inputs are annualized).
  #[serde(rename = "return")]
  pub expected_return: f64,
  /// Portfolio volatility `sqrt(w' S w)`.
  pub volatility: f64,
  /// `(expected_return - risk_free) / volatility`, zero when volatility is zero.
  pub sharpe_ratio: f64,
}

/// Ordered ticker to weight mapping.
///
/// Serialized as a JSON object whose keys keep the vector's ticker order.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct WeightVector {
  entries: Vec<(String, f64)>,
}

impl WeightVector {
  pub fn new(entries: Vec<(String, f64)>) -> Self {
    Self { entries }
  }

  /// Pair `tickers` with `weights`, dropping exact zeros.
  pub fn from_dense(tickers: &[String], weights: ArrayView1<f64>) -> Self {
    let entries = tickers
      .iter()
      .zip(weights.iter())
      .filter(|(_, w)| **w != 0.0)
      .map(|(t, &w)| (t.clone(), w))
      .collect();
    Self { entries }
  }

  /// Weight of `ticker`, if present.
  pub fn get(&self, ticker: &str) -> Option<f64> {
    self
      .entries
      .iter()
      .find(|(t, _)| t == ticker)
      .map(|(_, w)| *w)
  }

  pub fn iter(&self) -> impl Iterator<Item = (&str, f64)> {
    self.entries.iter().map(|(t, w)| (t.as_str(), *w))
  }

  pub fn len(&self) -> usize {
    self.entries.len()
  }

  pub fn is_empty(&self) -> bool {
    self.entries.is_empty()
  }

  pub fn sum(&self) -> f64 {
    self.entries.iter().map(|(_, w)| w).sum()
  }

  /// Weights aligned to `tickers`; tickers missing from the vector get zero.
  pub fn to_dense(&self, tickers: &[String]) -> Array1<f64> {
    tickers
      .iter()
      .map(|t| self.get(t).unwrap_or(0.0))
      .collect()
  }
}

impl Serialize for WeightVector {
  fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
    let mut map = serializer.serialize_map(Some(self.entries.len()))?;
    for (ticker, weight) in &self.entries {
      map.serialize_entry(ticker, weight)?;
    }
    map.end()
  }
}

/// Output of a single optimization: cleaned weights and their statistics.
#[derive(Clone, Debug, Default, PartialEq, Serialize)]
pub struct OptimizedPortfolio {
  /// Cleaned long-only weights summing to one.
  pub weights: WeightVector,
  /// Statistics of the cleaned weights.
  pub stats: PortfolioStats,
}
