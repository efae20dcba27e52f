//! # Portfolio
//!
//! $$
//! \min_{\mathbf w \ge 0,\ \mathbf 1^\top \mathbf w = 1} \mathbf w^\top \Sigma \mathbf w
//! $$
//!
//! Price data, statistics, long-only optimizers, the efficient frontier, the
//! Monte Carlo cloud and user holdings.

pub mod data;
pub mod frontier;
pub mod holdings;
pub mod monte_carlo;
pub mod optimizers;
pub mod qp;
pub mod stats;
pub mod types;

pub use data::PriceMatrix;
pub use data::PriceSeries;
pub use frontier::efficient_frontier;
pub use frontier::target_grid;
pub use holdings::user_portfolio;
pub use holdings::UserHoldings;
pub use holdings::UserPortfolioReport;
pub use monte_carlo::sample_random_portfolios;
pub use optimizers::clean_weights;
pub use optimizers::efficient_return;
pub use optimizers::max_sharpe;
pub use optimizers::min_volatility;
pub use optimizers::optimize;
pub use optimizers::Objective;
pub use qp::SolverSettings;
pub use stats::portfolio_stats;
pub use stats::MarketEstimates;
pub use types::OptimizedPortfolio;
pub use types::PortfolioStats;
pub use types::ReturnEstimator;
pub use types::WeightVector;
