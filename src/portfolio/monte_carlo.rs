//! # Monte Carlo Portfolios
//!
//! $$
//! w_i = \frac{u_i}{\sum_j u_j}, \qquad u_i \sim \mathcal U[0, 1)
//! $$
//!
//! Random long-only portfolios for scatter plots around the frontier.
//!
//! Normalizing i.i.d. uniforms does not sample the simplex uniformly: mass
//! concentrates around equal weights. The cloud is a visual reference only.

use ndarray::Array2;
use ndarray::Axis;
use ndarray::parallel::prelude::*;
use ndarray_rand::RandomExt;
use rand::Rng;
use rand_distr::Uniform;

use super::stats::MarketEstimates;
use super::types::PortfolioStats;

/// Draw `count` normalized uniform weight vectors from `rng`.
pub fn random_weights<R: Rng + ?Sized>(n_assets: usize, count: usize, rng: &mut R) -> Array2<f64> {
  let mut draws = Array2::random_using((count, n_assets), Uniform::new(0.0, 1.0), rng);
  for mut row in draws.axis_iter_mut(Axis(0)) {
    let total = row.sum();
    if total > 0.0 {
      row /= total;
    } else {
      row.fill(1.0 / n_assets as f64);
    }
  }
  draws
}

/// Score `count` random portfolios, in draw order.
pub fn sample_random_portfolios<R: Rng + ?Sized>(
  estimates: &MarketEstimates,
  count: usize,
  rng: &mut R,
) -> Vec<PortfolioStats> {
  if estimates.n_assets() == 0 || count == 0 {
    return Vec::new();
  }

  let weights = random_weights(estimates.n_assets(), count, rng);
  let mut cloud = Vec::with_capacity(count);
  weights
    .axis_iter(Axis(0))
    .into_par_iter()
    .map(|w| estimates.score(w))
    .collect_into_vec(&mut cloud);
  cloud
}

#[cfg(test)]
mod tests {
  use approx::assert_abs_diff_eq;
  use ndarray::Array1;
  use ndarray::array;
  use rand::SeedableRng;
  use rand::rngs::StdRng;

  use super::*;

  fn estimates() -> MarketEstimates {
    MarketEstimates::new(
      vec!["A".into(), "B".into(), "C".into()],
      array![0.12, 0.07, 0.03],
      array![
        [0.05, 0.01, 0.0],
        [0.01, 0.02, 0.0],
        [0.0, 0.0, 0.001],
      ],
      0.03,
    )
  }

  #[test]
  fn weights_lie_on_simplex() {
    let mut rng = StdRng::seed_from_u64(3);
    let w = random_weights(5, 200, &mut rng);

    assert_eq!(w.dim(), (200, 5));
    for row in w.rows() {
      assert_abs_diff_eq!(row.sum(), 1.0, epsilon = 1e-12);
      assert!(row.iter().all(|&x| x >= 0.0));
    }
  }

  #[test]
  fn seeded_cloud_is_reproducible() {
    let est = estimates();
    let a = sample_random_portfolios(&est, 500, &mut StdRng::seed_from_u64(42));
    let b = sample_random_portfolios(&est, 500, &mut StdRng::seed_from_u64(42));

    assert_eq!(a.len(), 500);
    assert_eq!(a, b);
  }

  #[test]
  fn cloud_stays_inside_asset_return_range() {
    let est = estimates();
    let cloud = sample_random_portfolios(&est, 1_000, &mut StdRng::seed_from_u64(9));

    assert!(cloud
      .iter()
      .all(|s| s.expected_return >= 0.03 - 1e-12 && s.expected_return <= 0.12 + 1e-12));
    assert!(cloud.iter().all(|s| s.volatility > 0.0));
  }

  #[test]
  fn empty_universe_yields_no_points() {
    let est = MarketEstimates::new(vec![], Array1::zeros(0), Array2::zeros((0, 0)), 0.0);
    assert!(sample_random_portfolios(&est, 10, &mut StdRng::seed_from_u64(1)).is_empty());
  }
}
