//! # Errors
//!
//! Error taxonomy for the analytics engine. Every fatal failure of a run is one
//! [`AnalyticsError`]; infeasible frontier points are the only variant that is
//! recovered internally.

use thiserror::Error;

/// Error type for portfolio analytics.
#[derive(Debug, Clone, Error, PartialEq)]
pub enum AnalyticsError {
  /// Malformed or semantically invalid request parameters.
  #[error("{0}")]
  Validation(String),

  /// Too few observations for a statistical estimate.
  #[error("Insufficient {context} data. Need at least {required} points, got {actual}")]
  InsufficientData {
    context: String,
    required: usize,
    actual: usize,
  },

  /// No long-only portfolio reaches the requested target return.
  #[error("No feasible portfolio for target return {target:.6}")]
  Infeasible { target: f64 },

  /// Non-positive price where hedge sizing needs a positive one.
  #[error("Invalid benchmark price: {0}. Cannot calculate hedge sizing with zero or negative price.")]
  InvalidPrice(f64),

  /// A required price series was not supplied.
  #[error("No price data for {0}")]
  MissingPriceSeries(String),

  /// Price input that cannot form an aligned, positive price matrix.
  #[error("Invalid price data: {0}")]
  InvalidPriceData(String),

  /// Optimization problem that is ill-posed for the given inputs.
  #[error("Optimization error: {0}")]
  Optimization(String),

  /// The solver stopped without an optimal solution.
  #[error("Solver error: {0}")]
  Solver(String),
}

impl AnalyticsError {
  /// Stable error kind reported next to the message at the process boundary.
  pub fn kind(&self) -> &'static str {
    match self {
      Self::Validation(_) => "ValidationError",
      Self::InsufficientData { .. } => "InsufficientDataError",
      Self::Infeasible { .. } => "InfeasibleOptimizationError",
      Self::InvalidPrice(_) => "InvalidPriceError",
      Self::MissingPriceSeries(_) => "MissingDataError",
      Self::InvalidPriceData(_) => "InvalidPriceDataError",
      Self::Optimization(_) | Self::Solver(_) => "OptimizationError",
    }
  }

  pub(crate) fn insufficient(context: &str, required: usize, actual: usize) -> Self {
    Self::InsufficientData {
      context: context.to_string(),
      required,
      actual,
    }
  }
}

/// Result type for portfolio analytics.
pub type Result<T> = std::result::Result<T, AnalyticsError>;
