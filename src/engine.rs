//! # Portfolio Engine
//!
//! $$
//! (\mu, \Sigma, r_f) \mapsto \big(\mathbf w_{gmv},\ \mathbf w_{sr},\ \sigma^\*(r),\ \beta_p,\ H\big)
//! $$
//!
//! Runs one full analytics batch: validation, estimation, optimization, the
//! frontier, the Monte Carlo cloud, user holdings, beta and hedging.

use chrono::NaiveDate;
use rand::Rng;
use rand::SeedableRng;
use rand::rngs::StdRng;
use serde::Serialize;
use tracing::debug;
use tracing::info;

use crate::config::AnalyticsConfig;
use crate::error::AnalyticsError;
use crate::error::Result;
use crate::portfolio::frontier::efficient_frontier;
use crate::portfolio::frontier::target_grid;
use crate::portfolio::holdings::UserPortfolioReport;
use crate::portfolio::holdings::user_portfolio;
use crate::portfolio::monte_carlo::sample_random_portfolios;
use crate::portfolio::optimizers::Objective;
use crate::portfolio::optimizers::optimize;
use crate::portfolio::qp::SolverSettings;
use crate::portfolio::stats::MarketEstimates;
use crate::portfolio::types::OptimizedPortfolio;
use crate::portfolio::types::PortfolioStats;
use crate::request::AnalysisRequest;
use crate::risk::beta::portfolio_beta;
use crate::risk::hedge::HedgeSizing;
use crate::risk::hedge::hedge_sizing;
use crate::risk::scenario::ScenarioImpact;
use crate::risk::scenario::scenario_impacts;

/// Everything one run produces.
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalysisReport {
  pub gmv: OptimizedPortfolio,
  pub max_sharpe: OptimizedPortfolio,
  pub efficient_frontier: Vec<PortfolioStats>,
  pub random_portfolios: Vec<PortfolioStats>,
  pub risk_free_rate: f64,
  pub my_portfolio: UserPortfolioReport,
  pub portfolio_beta: f64,
  pub hedging: HedgeSizing,
  pub scenarios: Vec<ScenarioImpact>,
  pub analysis_start: NaiveDate,
  pub analysis_end: NaiveDate,
  pub observations: usize,
}

/// Single entry point for portfolio analytics runs.
#[derive(Clone, Debug, Default)]
pub struct PortfolioEngine {
  config: AnalyticsConfig,
}

impl PortfolioEngine {
  /// Construct a new engine with explicit configuration.
  pub fn new(config: AnalyticsConfig) -> Self {
    Self { config }
  }

  /// Borrow engine configuration.
  pub fn config(&self) -> &AnalyticsConfig {
    &self.config
  }

  /// Engine configuration with the request's overrides merged over it.
  pub fn resolve_config(&self, request: &AnalysisRequest) -> Result<AnalyticsConfig> {
    match &request.config {
      Some(overrides) => self.config.with_overrides(overrides),
      None => {
        self.config.validate()?;
        Ok(self.config.clone())
      }
    }
  }

  /// Run `request`, seeding the sampler from the configured seed or from entropy.
  pub fn analyze(&self, request: &AnalysisRequest) -> Result<AnalysisReport> {
    let config = self.resolve_config(request)?;
    let mut rng = match config.seed {
      Some(seed) => StdRng::seed_from_u64(seed),
      None => StdRng::from_entropy(),
    };
    self.run(request, &config, &mut rng)
  }

  /// Run `request`, drawing Monte Carlo portfolios from `rng`.
  pub fn analyze_with_rng<R: Rng + ?Sized>(
    &self,
    request: &AnalysisRequest,
    rng: &mut R,
  ) -> Result<AnalysisReport> {
    let config = self.resolve_config(request)?;
    self.run(request, &config, rng)
  }

  fn run<R: Rng + ?Sized>(
    &self,
    request: &AnalysisRequest,
    config: &AnalyticsConfig,
    rng: &mut R,
  ) -> Result<AnalysisReport> {
    let range = request.validate()?;

    let prices = request.price_matrix(config, range)?;
    let (analysis_start, analysis_end) = match (prices.dates().first(), prices.dates().last()) {
      (Some(first), Some(last)) if prices.len() >= config.min_observations => (*first, *last),
      _ => {
        return Err(AnalyticsError::insufficient(
          "price",
          config.min_observations,
          prices.len(),
        ))
      }
    };
    info!(
      tickers = prices.tickers().len(),
      observations = prices.len(),
      %analysis_start,
      %analysis_end,
      "starting portfolio analysis"
    );

    let estimates = MarketEstimates::from_prices(&prices, config)?;
    debug!(risk_free = estimates.risk_free, "market estimates ready");

    let settings = SolverSettings {
      max_iter: config.solver_max_iter,
      tolerance: config.solver_tolerance,
    };
    let cutoff = config.weight_cutoff;

    let gmv = optimize(Objective::MinVolatility, &estimates, cutoff, &settings)?;
    let max_sharpe = optimize(Objective::MaxSharpe, &estimates, cutoff, &settings)?;

    let targets = target_grid(
      gmv.stats.expected_return,
      max_sharpe.stats.expected_return,
      config.frontier_upper_multiplier,
      config.frontier_points,
    );
    let frontier = efficient_frontier(&estimates, &targets, cutoff, &settings);
    let random_portfolios = sample_random_portfolios(&estimates, config.random_portfolios, rng);

    let holdings = user_portfolio(&request.tickers, &request.quantities, &prices)?;
    let dense = holdings.weights.to_dense(prices.tickers());
    let user_stats = estimates.score(dense.view());

    let benchmark = request.benchmark_series(config, range)?;
    let beta = portfolio_beta(&prices, &holdings.weights, &benchmark, config.min_observations)?;

    let benchmark_price = request
      .benchmark_price
      .or_else(|| benchmark.latest())
      .unwrap_or(f64::NAN);
    let hedging = hedge_sizing(
      beta,
      request.target_beta,
      holdings.value,
      benchmark_price,
      config.future_price_ratio,
      config.future_multiplier,
    )?;
    let scenarios = scenario_impacts(
      beta,
      request.target_beta,
      holdings.value,
      &config.scenario_moves,
    );

    info!(
      frontier_points = frontier.len(),
      random_portfolios = random_portfolios.len(),
      beta,
      value = holdings.value,
      "portfolio analysis finished"
    );

    Ok(AnalysisReport {
      gmv,
      max_sharpe,
      efficient_frontier: frontier,
      random_portfolios,
      risk_free_rate: estimates.risk_free,
      my_portfolio: UserPortfolioReport {
        weights: holdings.weights,
        stats: user_stats,
        value: holdings.value,
      },
      portfolio_beta: beta,
      hedging,
      scenarios,
      analysis_start,
      analysis_end,
      observations: prices.len(),
    })
  }
}
