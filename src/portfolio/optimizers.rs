//! # Portfolio Optimizers
//!
//! $$
//! \min_{\mathbf{w}} \ \mathbf{w}^\top \Sigma \mathbf{w}
//! \quad \text{s.t.} \quad \mathbf 1^\top \mathbf w = 1,\ \mathbf w \ge 0
//! $$
//!
//! Long-only minimum-variance, maximum-Sharpe and target-return optimizers.
//!
//! Maximum Sharpe uses the Charnes-Cooper substitution `y = κ w`, which turns
//! the ratio objective into the convex program
//!
//! $$
//! \min_{y \ge 0,\ \kappa \ge 0} y^\top \Sigma y
//! \quad \text{s.t.} \quad (\mu - r_f)^\top y = 1,\ \mathbf 1^\top y = \kappa .
//! $$

use ndarray::Array1;
use ndarray::Array2;
use ndarray::s;
use tracing::debug;

use super::qp::QpOutcome;
use super::qp::SolverSettings;
use super::qp::solve_nonneg_qp;
use super::stats::MarketEstimates;
use super::types::OptimizedPortfolio;
use super::types::WeightVector;
use crate::error::AnalyticsError;
use crate::error::Result;

/// Objective solved by [`optimize`].
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Objective {
  /// Global minimum variance.
  MinVolatility,
  /// Maximum Sharpe ratio against the estimates' risk-free rate.
  MaxSharpe,
  /// Minimum variance at a fixed expected return.
  EfficientReturn(f64),
}

const RETURN_RANGE_TOL: f64 = 1e-9;

/// Zero weights below `cutoff` in magnitude, clamp negatives and renormalize.
///
/// Fails when no weight survives the cut.
pub fn clean_weights(w: &Array1<f64>, cutoff: f64) -> Result<Array1<f64>> {
  let mut cleaned = w.mapv(|x| if x.abs() < cutoff || x < 0.0 { 0.0 } else { x });
  let total = cleaned.sum();
  if !total.is_finite() || total <= 0.0 {
    return Err(AnalyticsError::Optimization(format!(
      "no weight above cutoff {cutoff} in solver output"
    )));
  }
  cleaned /= total;
  Ok(cleaned)
}

fn finish(
  estimates: &MarketEstimates,
  raw: &Array1<f64>,
  cutoff: f64,
) -> Result<OptimizedPortfolio> {
  let w = clean_weights(raw, cutoff)?;
  Ok(OptimizedPortfolio {
    weights: WeightVector::from_dense(&estimates.tickers, w.view()),
    stats: estimates.score(w.view()),
  })
}

fn solved(outcome: QpOutcome, context: &str) -> Result<Array1<f64>> {
  match outcome {
    QpOutcome::Solved(x) => Ok(x),
    QpOutcome::Infeasible => Err(AnalyticsError::Optimization(format!(
      "{context} problem reported infeasible"
    ))),
  }
}

/// Global minimum-variance long-only portfolio.
pub fn min_volatility(
  estimates: &MarketEstimates,
  cutoff: f64,
  settings: &SolverSettings,
) -> Result<OptimizedPortfolio> {
  let n = estimates.n_assets();
  if n == 0 {
    return Err(AnalyticsError::Optimization("empty asset universe".into()));
  }

  let eq = Array2::from_elem((1, n), 1.0);
  let outcome = solve_nonneg_qp(estimates.cov.view(), eq.view(), &[1.0], settings)?;
  let w = solved(outcome, "minimum volatility")?;

  finish(estimates, &w, cutoff)
}

/// Maximum Sharpe ratio long-only portfolio.
pub fn max_sharpe(
  estimates: &MarketEstimates,
  cutoff: f64,
  settings: &SolverSettings,
) -> Result<OptimizedPortfolio> {
  let n = estimates.n_assets();
  if n == 0 {
    return Err(AnalyticsError::Optimization("empty asset universe".into()));
  }

  let excess = estimates.mu.mapv(|m| m - estimates.risk_free);
  if excess.iter().all(|&e| e <= 0.0) {
    return Err(AnalyticsError::Optimization(format!(
      "at least one asset must have an expected return exceeding the risk-free rate {:.6}",
      estimates.risk_free
    )));
  }

  // Variables are [y_0 .. y_{n-1}, kappa].
  let mut p = Array2::<f64>::zeros((n + 1, n + 1));
  p.slice_mut(s![..n, ..n]).assign(&estimates.cov);

  let mut eq = Array2::<f64>::zeros((2, n + 1));
  eq.slice_mut(s![0, ..n]).assign(&excess);
  eq.slice_mut(s![1, ..n]).fill(1.0);
  eq[[1, n]] = -1.0;

  let outcome = solve_nonneg_qp(p.view(), eq.view(), &[1.0, 0.0], settings)?;
  let x = solved(outcome, "maximum Sharpe")?;

  let kappa = x[n];
  if kappa.is_nan() || kappa <= 0.0 {
    return Err(AnalyticsError::Solver(format!(
      "degenerate Sharpe scaling kappa = {kappa}"
    )));
  }
  let w = x.slice(s![..n]).mapv(|y| y / kappa);

  finish(estimates, &w, cutoff)
}

/// Minimum-variance long-only portfolio earning exactly `target`.
///
/// Returns [`AnalyticsError::Infeasible`] when no long-only portfolio reaches
/// `target`, that is when it lies outside `[min mu, max mu]`.
pub fn efficient_return(
  estimates: &MarketEstimates,
  target: f64,
  cutoff: f64,
  settings: &SolverSettings,
) -> Result<OptimizedPortfolio> {
  let n = estimates.n_assets();
  if n == 0 {
    return Err(AnalyticsError::Optimization("empty asset universe".into()));
  }

  let max_mu = estimates.mu.fold(f64::NEG_INFINITY, |a, &b| a.max(b));
  let min_mu = estimates.mu.fold(f64::INFINITY, |a, &b| a.min(b));
  if !target.is_finite() || target > max_mu + RETURN_RANGE_TOL || target < min_mu - RETURN_RANGE_TOL
  {
    debug!(target, min_mu, max_mu, "target return outside achievable range");
    return Err(AnalyticsError::Infeasible { target });
  }

  let mut eq = Array2::<f64>::zeros((2, n));
  eq.row_mut(0).fill(1.0);
  eq.row_mut(1).assign(&estimates.mu);

  match solve_nonneg_qp(estimates.cov.view(), eq.view(), &[1.0, target], settings)? {
    QpOutcome::Solved(w) => finish(estimates, &w, cutoff),
    QpOutcome::Infeasible => Err(AnalyticsError::Infeasible { target }),
  }
}

/// Dispatch to the optimizer for `objective`.
pub fn optimize(
  objective: Objective,
  estimates: &MarketEstimates,
  cutoff: f64,
  settings: &SolverSettings,
) -> Result<OptimizedPortfolio> {
  match objective {
    Objective::MinVolatility => min_volatility(estimates, cutoff, settings),
    Objective::MaxSharpe => max_sharpe(estimates, cutoff, settings),
    Objective::EfficientReturn(target) => efficient_return(estimates, target, cutoff, settings),
  }
}

#[cfg(test)]
mod tests {
  use approx::assert_abs_diff_eq;
  use ndarray::array;
  use rand::Rng;
  use rand::SeedableRng;
  use rand::rngs::StdRng;

  use super::*;

  fn two_asset() -> MarketEstimates {
    MarketEstimates::new(
      vec!["AAA".into(), "BBB".into()],
      array![0.10, 0.05],
      array![[0.04, 0.0], [0.0, 0.01]],
      0.02,
    )
  }

  fn four_asset() -> MarketEstimates {
    MarketEstimates::new(
      vec!["A".into(), "B".into(), "C".into(), "D".into()],
      array![0.12, 0.10, 0.07, 0.05],
      array![
        [0.04, 0.01, 0.00, -0.01],
        [0.01, 0.03, 0.00, 0.00],
        [0.00, 0.00, 0.02, 0.00],
        [-0.01, 0.00, 0.00, 0.01],
      ],
      0.03,
    )
  }

  fn assert_on_simplex(p: &OptimizedPortfolio) {
    assert_abs_diff_eq!(p.weights.sum(), 1.0, epsilon = 1e-6);
    assert!(p.weights.iter().all(|(_, w)| w >= -1e-9));
  }

  #[test]
  fn gmv_matches_two_asset_closed_form() {
    let gmv = min_volatility(&two_asset(), 1e-4, &SolverSettings::default()).unwrap();

    assert_on_simplex(&gmv);
    assert_abs_diff_eq!(gmv.weights.get("AAA").unwrap(), 0.2, epsilon = 1e-3);
    assert_abs_diff_eq!(gmv.stats.expected_return, 0.06, epsilon = 1e-3);
  }

  #[test]
  fn gmv_beats_random_simplex_points() {
    let est = four_asset();
    let gmv = min_volatility(&est, 1e-4, &SolverSettings::default()).unwrap();
    let w_gmv = gmv.weights.to_dense(&est.tickers);
    let var_gmv = w_gmv.dot(&est.cov.dot(&w_gmv));

    let mut rng = StdRng::seed_from_u64(11);
    for _ in 0..1_000 {
      let raw: Array1<f64> = (0..4).map(|_| rng.gen::<f64>()).collect();
      let w = &raw / raw.sum();
      let var = w.dot(&est.cov.dot(&w));
      assert!(var >= var_gmv - 1e-7, "{var} < {var_gmv}");
    }
  }

  #[test]
  fn max_sharpe_dominates_gmv_and_corners() {
    let est = four_asset();
    let settings = SolverSettings::default();
    let ms = max_sharpe(&est, 1e-4, &settings).unwrap();
    let gmv = min_volatility(&est, 1e-4, &settings).unwrap();

    assert_on_simplex(&ms);
    assert!(ms.stats.sharpe_ratio >= gmv.stats.sharpe_ratio - 1e-6);
    for i in 0..4 {
      let mut corner = Array1::zeros(4);
      corner[i] = 1.0;
      assert!(ms.stats.sharpe_ratio >= est.score(corner.view()).sharpe_ratio - 1e-6);
    }
  }

  #[test]
  fn max_sharpe_needs_excess_return() {
    let mut est = two_asset();
    est.risk_free = 0.2;
    let err = max_sharpe(&est, 1e-4, &SolverSettings::default()).unwrap_err();

    assert_eq!(err.kind(), "OptimizationError");
  }

  #[test]
  fn efficient_return_hits_target() {
    let est = four_asset();
    let p = efficient_return(&est, 0.09, 1e-4, &SolverSettings::default()).unwrap();

    assert_on_simplex(&p);
    assert_abs_diff_eq!(p.stats.expected_return, 0.09, epsilon = 1e-4);
  }

  #[test]
  fn efficient_return_above_best_asset_is_infeasible() {
    let err = efficient_return(&four_asset(), 0.2, 1e-4, &SolverSettings::default()).unwrap_err();

    assert_eq!(err, AnalyticsError::Infeasible { target: 0.2 });
  }

  #[test]
  fn clean_weights_drops_noise_and_renormalizes() {
    let w = clean_weights(&array![0.7, 5e-5, -1e-12, 0.29995], 1e-4).unwrap();

    assert_eq!(w[1], 0.0);
    assert_eq!(w[2], 0.0);
    assert_abs_diff_eq!(w.sum(), 1.0, epsilon = 1e-15);
  }

  #[test]
  fn clean_weights_rejects_an_emptied_vector() {
    let err = clean_weights(&array![5e-5, -0.2, 0.0], 1e-4).unwrap_err();
    assert_eq!(err.kind(), "OptimizationError");

    assert!(clean_weights(&array![f64::NAN, 0.5], 1e-4).is_err());
  }

  #[test]
  fn dispatch_routes_objectives() {
    let est = two_asset();
    let settings = SolverSettings::default();

    let via_dispatch = optimize(Objective::MinVolatility, &est, 1e-4, &settings).unwrap();
    let direct = min_volatility(&est, 1e-4, &settings).unwrap();
    assert_abs_diff_eq!(
      via_dispatch.stats.volatility,
      direct.stats.volatility,
      epsilon = 1e-12
    );

    assert!(optimize(Objective::EfficientReturn(0.5), &est, 1e-4, &settings).is_err());
  }
}
