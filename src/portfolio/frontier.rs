//! # Efficient Frontier
//!
//! $$
//! \sigma^\*(r) = \min \{ \sqrt{\mathbf w^\top \Sigma \mathbf w} :
//! \mu^\top \mathbf w = r,\ \mathbf 1^\top \mathbf w = 1,\ \mathbf w \ge 0 \}
//! $$
//!
//! Target-return grid between the GMV and max-Sharpe returns, solved point by
//! point in parallel. Points without a feasible portfolio are dropped.

use ndarray::Array1;
use rayon::prelude::*;
use tracing::debug;
use tracing::warn;

use super::optimizers::efficient_return;
use super::qp::SolverSettings;
use super::stats::MarketEstimates;
use super::types::PortfolioStats;
use crate::error::AnalyticsError;

/// Evenly spaced target returns from `low` to `upper_multiplier * high`.
pub fn target_grid(low: f64, high: f64, upper_multiplier: f64, points: usize) -> Vec<f64> {
  match points {
    0 => Vec::new(),
    1 => vec![low],
    _ => Array1::linspace(low, high * upper_multiplier, points).to_vec(),
  }
}

/// Solve every grid target, keeping successes ordered by ascending target.
pub fn efficient_frontier(
  estimates: &MarketEstimates,
  targets: &[f64],
  cutoff: f64,
  settings: &SolverSettings,
) -> Vec<PortfolioStats> {
  let mut solved: Vec<(f64, PortfolioStats)> = targets
    .par_iter()
    .filter_map(|&target| match efficient_return(estimates, target, cutoff, settings) {
      Ok(portfolio) => Some((target, portfolio.stats)),
      Err(AnalyticsError::Infeasible { .. }) => {
        debug!(target, "skipping infeasible frontier point");
        None
      }
      Err(err) => {
        warn!(target, %err, "skipping frontier point");
        None
      }
    })
    .collect();

  solved.sort_by(|a, b| a.0.total_cmp(&b.0));
  debug!(
    requested = targets.len(),
    kept = solved.len(),
    "efficient frontier solved"
  );

  solved.into_iter().map(|(_, stats)| stats).collect()
}
