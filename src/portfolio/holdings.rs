//! # Holdings
//!
//! $$
//! V = \sum_i q_i P_i, \qquad w_i = \frac{q_i P_i}{V}
//! $$
//!
//! Converts share quantities into dollar value and realized weights.

use serde::Serialize;

use super::data::PriceMatrix;
use super::types::PortfolioStats;
use super::types::WeightVector;
use crate::error::AnalyticsError;
use crate::error::Result;

/// Realized weights and value of the user's holdings.
#[derive(Clone, Debug, Default, PartialEq, Serialize)]
pub struct UserHoldings {
  /// Weight per held ticker in request order, including zero quantities.
  pub weights: WeightVector,
  /// Total dollar value at the latest aligned close.
  pub value: f64,
}

/// Value `quantities` of `tickers` at the last row of `prices`.
pub fn user_portfolio(
  tickers: &[String],
  quantities: &[f64],
  prices: &PriceMatrix,
) -> Result<UserHoldings> {
  if tickers.len() != quantities.len() {
    return Err(AnalyticsError::Validation(format!(
      "Tickers and quantities must have same length. Got {} tickers and {} quantities",
      tickers.len(),
      quantities.len()
    )));
  }

  let latest = prices
    .latest()
    .ok_or_else(|| AnalyticsError::insufficient("price", 1, 0))?;

  let dollar_values = tickers
    .iter()
    .zip(quantities)
    .map(|(ticker, &qty)| {
      let col = prices
        .column_index(ticker)
        .ok_or_else(|| AnalyticsError::MissingPriceSeries(ticker.clone()))?;
      Ok((ticker.clone(), qty * latest[col]))
    })
    .collect::<Result<Vec<_>>>()?;

  let value: f64 = dollar_values.iter().map(|(_, v)| v).sum();
  if value <= 0.0 {
    return Err(AnalyticsError::Validation(
      "At least one asset must have positive quantity".into(),
    ));
  }

  let weights = dollar_values
    .into_iter()
    .map(|(ticker, v)| (ticker, v / value))
    .collect();

  Ok(UserHoldings {
    weights: WeightVector::new(weights),
    value,
  })
}

/// User holdings with their risk statistics, as reported.
#[derive(Clone, Debug, Default, PartialEq, Serialize)]
pub struct UserPortfolioReport {
  pub weights: WeightVector,
  pub stats: PortfolioStats,
  pub value: f64,
}
