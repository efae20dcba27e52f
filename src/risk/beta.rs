//! # Beta
//!
//! $$
//! \beta_p = \frac{\operatorname{Cov}(r_p, r_b)}{\operatorname{Var}(r_b)}
//! $$
//!
//! Market beta of a fixed-weight portfolio against a benchmark, measured on
//! the dates where both daily return series exist.

use ndarray::Array1;
use ndarray::Axis;
use ndarray::stack;
use ndarray_stats::CorrelationExt;
use tracing::debug;

use crate::error::AnalyticsError;
use crate::error::Result;
use crate::portfolio::data::PriceMatrix;
use crate::portfolio::data::PriceSeries;
use crate::portfolio::types::WeightVector;

/// Beta of the positively weighted holdings in `weights` against `benchmark`.
///
/// Returns `0.0` when nothing is held or the statistics are degenerate.
pub fn portfolio_beta(
  prices: &PriceMatrix,
  weights: &WeightVector,
  benchmark: &PriceSeries,
  min_obs: usize,
) -> Result<f64> {
  let held: Vec<(&str, f64)> = weights.iter().filter(|(_, w)| *w > 0.0).collect();
  if held.is_empty() {
    return Ok(0.0);
  }

  let mut dense = Array1::<f64>::zeros(prices.tickers().len());
  for (ticker, w) in &held {
    let col = prices
      .column_index(ticker)
      .ok_or_else(|| AnalyticsError::MissingPriceSeries(ticker.to_string()))?;
    dense[col] = *w;
  }

  let portfolio = prices.weighted_returns(dense.view());
  let bench = benchmark.returns();

  let (p, b): (Vec<f64>, Vec<f64>) = prices
    .return_dates()
    .iter()
    .zip(portfolio.iter())
    .filter_map(|(date, &r)| bench.get(date).map(|&rb| (r, rb)))
    .unzip();

  if p.len() < min_obs.max(2) {
    return Err(AnalyticsError::insufficient(
      "overlapping data for beta calculation",
      min_obs.max(2),
      p.len(),
    ));
  }

  let observations = stack![Axis(0), Array1::from(p), Array1::from(b)];
  let cov = observations
    .cov(1.0)
    .map_err(|_| AnalyticsError::insufficient("return", 2, observations.ncols()))?;

  let beta = cov[[0, 1]] / cov[[1, 1]];
  debug!(overlap = observations.ncols(), beta, "portfolio beta estimated");

  if beta.is_finite() {
    Ok(beta)
  } else {
    Ok(0.0)
  }
}

#[cfg(test)]
mod tests {
  use approx::assert_abs_diff_eq;
  use chrono::Duration;
  use chrono::NaiveDate;
  use ndarray::Array2;

  use super::*;

  fn dates(n: usize) -> Vec<NaiveDate> {
    let start = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
    (0..n).map(|i| start + Duration::days(i as i64)).collect()
  }

  fn wiggle(n: usize, scale: f64) -> Vec<f64> {
    let mut level = 100.0;
    (0..n)
      .map(|i| {
        let r = scale * 0.01 * ((i as f64) * 1.7).sin();
        level *= 1.0 + r;
        level
      })
      .collect()
  }

  fn setup(n: usize) -> (PriceMatrix, PriceSeries) {
    let d = dates(n);
    let bench_prices = wiggle(n, 1.0);
    let bench_returns: Vec<f64> = bench_prices.windows(2).map(|w| w[1] / w[0] - 1.0).collect();

    // Asset with exactly twice the benchmark's daily return.
    let mut levered = vec![50.0];
    for r in &bench_returns {
      let last = *levered.last().unwrap();
      levered.push(last * (1.0 + 2.0 * r));
    }

    let mut prices = Array2::zeros((n, 2));
    for i in 0..n {
      prices[[i, 0]] = levered[i];
      prices[[i, 1]] = bench_prices[i];
    }
    let matrix = PriceMatrix::new(d.clone(), vec!["LEV".into(), "SPY".into()], prices).unwrap();
    let bench = PriceSeries::new(d.into_iter().zip(bench_prices).collect()).unwrap();
    (matrix, bench)
  }

  #[test]
  fn scaled_benchmark_has_beta_of_its_scale() {
    let (prices, bench) = setup(60);
    let w = WeightVector::new(vec![("LEV".into(), 1.0)]);

    let beta = portfolio_beta(&prices, &w, &bench, 30).unwrap();
    assert_abs_diff_eq!(beta, 2.0, epsilon = 1e-9);
  }

  #[test]
  fn blended_weights_blend_beta() {
    let (prices, bench) = setup(60);
    let w = WeightVector::new(vec![("LEV".into(), 0.5), ("SPY".into(), 0.5)]);

    let beta = portfolio_beta(&prices, &w, &bench, 30).unwrap();
    assert_abs_diff_eq!(beta, 1.5, epsilon = 1e-9);
  }

  #[test]
  fn flat_benchmark_gives_zero() {
    let (prices, _) = setup(60);
    let flat = PriceSeries::new(dates(60).into_iter().map(|d| (d, 400.0)).collect()).unwrap();
    let w = WeightVector::new(vec![("LEV".into(), 1.0)]);

    assert_eq!(portfolio_beta(&prices, &w, &flat, 30).unwrap(), 0.0);
  }

  #[test]
  fn no_positive_weight_gives_zero() {
    let (prices, bench) = setup(60);
    let w = WeightVector::new(vec![("LEV".into(), 0.0)]);

    assert_eq!(portfolio_beta(&prices, &w, &bench, 30).unwrap(), 0.0);
  }

  #[test]
  fn short_overlap_is_insufficient() {
    let (prices, bench) = setup(20);
    let w = WeightVector::new(vec![("LEV".into(), 1.0)]);

    let err = portfolio_beta(&prices, &w, &bench, 30).unwrap_err();
    assert_eq!(err, AnalyticsError::insufficient("overlapping data for beta calculation", 30, 19));
  }
}
