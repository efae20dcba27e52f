//! # Portfolio Statistics
//!
//! $$
//! \mu_i = \Big(\prod_t (1+r_{t,i})\Big)^{N/T}-1,\qquad
//! \Sigma = \frac{N}{T-1}\sum_t (r_t-\bar r)(r_t-\bar r)^\top
//! $$
//!
//! Annualized expected returns, sample covariance, the risk-free proxy rate and
//! the scoring function shared by every optimizer and sampler.

use impl_new_derive::ImplNew;
use ndarray::Array1;
use ndarray::Array2;
use ndarray::ArrayView1;
use ndarray::Axis;
use ndarray_stats::CorrelationExt;

use super::data::PriceMatrix;
use super::types::PortfolioStats;
use super::types::ReturnEstimator;
use crate::config::AnalyticsConfig;
use crate::error::AnalyticsError;
use crate::error::Result;

fn ensure_rows(prices: &PriceMatrix, min_obs: usize) -> Result<()> {
  if prices.len() < min_obs.max(2) {
    return Err(AnalyticsError::insufficient(
      "price",
      min_obs.max(2),
      prices.len(),
    ));
  }
  Ok(())
}

/// Annualized per-ticker expected returns.
pub fn expected_returns(
  prices: &PriceMatrix,
  estimator: ReturnEstimator,
  trading_days: f64,
  min_obs: usize,
) -> Result<Array1<f64>> {
  ensure_rows(prices, min_obs)?;
  let returns = prices.returns();
  let periods = returns.nrows() as f64;

  let mu = match estimator {
    ReturnEstimator::Arithmetic => returns
      .mean_axis(Axis(0))
      .map(|m| m * trading_days)
      .unwrap_or_else(|| Array1::zeros(prices.tickers().len())),
    ReturnEstimator::Compounded => returns
      .map(|r| 1.0 + r)
      .product_axis(Axis(0))
      .mapv(|growth| growth.powf(trading_days / periods) - 1.0),
  };

  Ok(mu)
}

/// Annualized sample covariance (ddof = 1) of daily returns.
pub fn sample_covariance(
  prices: &PriceMatrix,
  trading_days: f64,
  min_obs: usize,
) -> Result<Array2<f64>> {
  ensure_rows(prices, min_obs)?;
  let returns = prices.returns();
  let cov = returns
    .t()
    .cov(1.0)
    .map_err(|_| AnalyticsError::insufficient("return", 2, returns.nrows()))?;

  Ok(cov * trading_days)
}

/// Annualized mean daily return of `ticker`, or `default` when it is not priced.
pub fn risk_free_rate(prices: &PriceMatrix, ticker: &str, trading_days: f64, default: f64) -> f64 {
  let Some(col) = prices.column_index(ticker) else {
    return default;
  };

  prices
    .returns()
    .column(col)
    .mean()
    .filter(|m| m.is_finite())
    .map(|m| m * trading_days)
    .unwrap_or(default)
}

/// Sharpe ratio with the zero-volatility convention.
pub fn sharpe_ratio(expected_return: f64, volatility: f64, risk_free: f64) -> f64 {
  if volatility > 0.0 {
    (expected_return - risk_free) / volatility
  } else {
    0.0
  }
}

/// Return, volatility and Sharpe ratio of weights `w`.
pub fn portfolio_stats(
  w: ArrayView1<f64>,
  mu: &Array1<f64>,
  cov: &Array2<f64>,
  risk_free: f64,
) -> PortfolioStats {
  let expected_return = w.dot(mu);
  let volatility = w.dot(&cov.dot(&w)).max(0.0).sqrt();

  PortfolioStats {
    expected_return,
    volatility,
    sharpe_ratio: sharpe_ratio(expected_return, volatility, risk_free),
  }
}

/// Expected returns, covariance and risk-free rate over one ticker universe.
#[derive(ImplNew, Clone, Debug, PartialEq)]
pub struct MarketEstimates {
  /// Ticker order shared by `mu` and `cov`.
  pub tickers: Vec<String>,
  /// Annualized expected returns.
  pub mu: Array1<f64>,
  /// Annualized covariance matrix.
  pub cov: Array2<f64>,
  /// Annualized risk-free rate.
  pub risk_free: f64,
}

impl MarketEstimates {
  /// Derive all estimates from a price matrix.
  pub fn from_prices(prices: &PriceMatrix, config: &AnalyticsConfig) -> Result<Self> {
    let days = config.trading_days_per_year;
    let mu = expected_returns(
      prices,
      config.return_estimator,
      days,
      config.min_observations,
    )?;
    let cov = sample_covariance(prices, days, config.min_observations)?;
    let risk_free = risk_free_rate(
      prices,
      &config.risk_free_ticker,
      days,
      config.default_risk_free_rate,
    );

    Ok(Self {
      tickers: prices.tickers().to_vec(),
      mu,
      cov,
      risk_free,
    })
  }

  pub fn n_assets(&self) -> usize {
    self.mu.len()
  }

  /// Score weights aligned to [`MarketEstimates::tickers`].
  pub fn score(&self, w: ArrayView1<f64>) -> PortfolioStats {
    portfolio_stats(w, &self.mu, &self.cov, self.risk_free)
  }
}

#[cfg(test)]
mod tests {
  use approx::assert_abs_diff_eq;
  use approx::assert_relative_eq;
  use chrono::Duration;
  use chrono::NaiveDate;
  use ndarray::array;

  use super::*;

  fn matrix(columns: &[(&str, Vec<f64>)]) -> PriceMatrix {
    let rows = columns[0].1.len();
    let start = NaiveDate::from_ymd_opt(2023, 1, 2).unwrap();
    let dates = (0..rows).map(|i| start + Duration::days(i as i64)).collect();
    let tickers = columns.iter().map(|(t, _)| t.to_string()).collect();
    let mut prices = Array2::zeros((rows, columns.len()));
    for (j, (_, col)) in columns.iter().enumerate() {
      for (i, p) in col.iter().enumerate() {
        prices[[i, j]] = *p;
      }
    }
    PriceMatrix::new(dates, tickers, prices).unwrap()
  }

  fn alternating(rows: usize, base: f64, up: f64, down: f64) -> Vec<f64> {
    let mut out = vec![base];
    for i in 1..rows {
      let r = if i % 2 == 1 { up } else { down };
      out.push(out[i - 1] * (1.0 + r));
    }
    out
  }

  #[test]
  fn too_few_rows_is_insufficient_data() {
    let m = matrix(&[("AAA", alternating(10, 100.0, 0.01, -0.01))]);
    let err = expected_returns(&m, ReturnEstimator::Arithmetic, 252.0, 30).unwrap_err();

    assert_eq!(
      err,
      AnalyticsError::InsufficientData {
        context: "price".into(),
        required: 30,
        actual: 10,
      }
    );
    assert!(sample_covariance(&m, 252.0, 30).is_err());
  }

  #[test]
  fn arithmetic_mean_is_annualized() {
    let m = matrix(&[("AAA", alternating(41, 100.0, 0.02, 0.0))]);
    let mu = expected_returns(&m, ReturnEstimator::Arithmetic, 252.0, 30).unwrap();

    assert_abs_diff_eq!(mu[0], 0.01 * 252.0, epsilon = 1e-10);
  }

  #[test]
  fn compounded_return_matches_growth() {
    let prices: Vec<f64> = (0..253).map(|i| 100.0 * 1.0005_f64.powi(i)).collect();
    let m = matrix(&[("AAA", prices)]);
    let mu = expected_returns(&m, ReturnEstimator::Compounded, 252.0, 30).unwrap();

    assert_relative_eq!(mu[0], 1.0005_f64.powi(252) - 1.0, epsilon = 1e-10);
  }

  #[test]
  fn covariance_is_symmetric_and_annualized() {
    let m = matrix(&[
      ("AAA", alternating(61, 100.0, 0.02, -0.01)),
      ("BBB", alternating(61, 50.0, -0.01, 0.02)),
    ]);
    let cov = sample_covariance(&m, 252.0, 30).unwrap();

    let r = m.returns();
    let a = r.column(0);
    let mean = a.mean().unwrap();
    let var = a.iter().map(|x| (x - mean).powi(2)).sum::<f64>() / (a.len() - 1) as f64;

    assert_relative_eq!(cov[[0, 0]], var * 252.0, epsilon = 1e-12);
    assert_relative_eq!(cov[[0, 1]], cov[[1, 0]], epsilon = 1e-15);
    assert!(cov[[0, 1]] < 0.0);
  }

  #[test]
  fn risk_free_rate_falls_back_to_default() {
    let m = matrix(&[("AAA", alternating(31, 100.0, 0.01, 0.0))]);

    assert_eq!(risk_free_rate(&m, "SGOV", 252.0, 0.05), 0.05);
    assert_abs_diff_eq!(
      risk_free_rate(&m, "AAA", 252.0, 0.05),
      0.005 * 252.0,
      epsilon = 1e-10
    );
  }

  #[test]
  fn zero_volatility_scores_zero_sharpe() {
    let mu = array![0.05, 0.10];
    let cov = array![[0.0, 0.0], [0.0, 0.04]];
    let stats = portfolio_stats(array![1.0, 0.0].view(), &mu, &cov, 0.02);

    assert_eq!(stats.volatility, 0.0);
    assert_eq!(stats.sharpe_ratio, 0.0);
    assert_abs_diff_eq!(stats.expected_return, 0.05, epsilon = 1e-15);
  }

  #[test]
  fn portfolio_stats_matches_closed_form() {
    let mu = array![0.10, 0.05];
    let cov = array![[0.04, 0.0], [0.0, 0.01]];
    let stats = portfolio_stats(array![0.5, 0.5].view(), &mu, &cov, 0.01);

    let vol = (0.25 * 0.04 + 0.25 * 0.01_f64).sqrt();
    assert_abs_diff_eq!(stats.expected_return, 0.075, epsilon = 1e-15);
    assert_abs_diff_eq!(stats.volatility, vol, epsilon = 1e-15);
    assert_abs_diff_eq!(stats.sharpe_ratio, 0.065 / vol, epsilon = 1e-12);
  }
}
