//! # Analysis Request
//!
//! Boundary type for one analytics run: the user's holdings, the hedge target,
//! an optional analysis window and the already-fetched price series.
//!
//! [`AnalysisRequest::validate`] runs before any numerical work.

use std::collections::BTreeMap;
use std::collections::BTreeSet;

use chrono::Local;
use chrono::NaiveDate;
use serde::Deserialize;
use serde::Serialize;
use serde_json::Value;
use tracing::warn;

use crate::config::AnalyticsConfig;
use crate::error::AnalyticsError;
use crate::error::Result;
use crate::portfolio::data::PriceMatrix;
use crate::portfolio::data::PriceSeries;

/// Holdings, hedge target and price history for one run.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalysisRequest {
  pub tickers: Vec<String>,
  pub quantities: Vec<f64>,
  #[serde(default)]
  pub target_beta: f64,
  /// Benchmark ticker; the configured benchmark when absent.
  #[serde(default)]
  pub benchmark: Option<String>,
  /// Price used for hedge sizing; the latest benchmark close when absent.
  #[serde(default)]
  pub benchmark_price: Option<f64>,
  /// Inclusive `YYYY-MM-DD` lower bound of the analysis window.
  #[serde(default)]
  pub start_date: Option<String>,
  /// Inclusive `YYYY-MM-DD` upper bound of the analysis window.
  #[serde(default)]
  pub end_date: Option<String>,
  /// Ticker to `[date, close]` points.
  #[serde(default)]
  pub prices: BTreeMap<String, Vec<(NaiveDate, f64)>>,
  /// Benchmark closes, when the benchmark is not among `prices`.
  #[serde(default)]
  pub benchmark_prices: Option<Vec<(NaiveDate, f64)>>,
  /// camelCase [`AnalyticsConfig`] fields merged over the engine's configuration.
  #[serde(default)]
  pub config: Option<Value>,
}

/// Inclusive analysis window; open ends are unrestricted.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct DateRange {
  pub start: Option<NaiveDate>,
  pub end: Option<NaiveDate>,
}

impl DateRange {
  pub fn contains(&self, date: NaiveDate) -> bool {
    self.start.map_or(true, |s| date >= s) && self.end.map_or(true, |e| date <= e)
  }
}

fn parse_date(field: &str, value: Option<&str>) -> Result<Option<NaiveDate>> {
  value
    .map(|raw| {
      NaiveDate::parse_from_str(raw.trim(), "%Y-%m-%d").map_err(|_| {
        AnalyticsError::Validation(format!(
          "Invalid {field} '{raw}'. Expected format YYYY-MM-DD"
        ))
      })
    })
    .transpose()
}

impl AnalysisRequest {
  /// Validate holdings and dates against the local calendar date.
  pub fn validate(&self) -> Result<DateRange> {
    self.validate_as_of(Local::now().date_naive())
  }

  /// Validate holdings and dates as if today were `today`.
  pub fn validate_as_of(&self, today: NaiveDate) -> Result<DateRange> {
    self.validate_holdings()?;
    self.validate_dates(today)
  }

  fn validate_holdings(&self) -> Result<()> {
    if self.tickers.is_empty() {
      return Err(AnalyticsError::Validation("No tickers provided".into()));
    }

    if self.tickers.iter().any(|t| t.trim().is_empty()) {
      return Err(AnalyticsError::Validation(
        "Tickers must be non-empty symbols".into(),
      ));
    }

    if self.tickers.len() != self.quantities.len() {
      return Err(AnalyticsError::Validation(format!(
        "Tickers and quantities must have same length. Got {} tickers and {} quantities",
        self.tickers.len(),
        self.quantities.len()
      )));
    }

    let mut seen = BTreeSet::new();
    let duplicates: BTreeSet<&str> = self
      .tickers
      .iter()
      .filter(|t| !seen.insert(t.as_str()))
      .map(String::as_str)
      .collect();
    if !duplicates.is_empty() {
      return Err(AnalyticsError::Validation(format!(
        "Duplicate tickers detected: {}",
        duplicates.into_iter().collect::<Vec<_>>().join(", ")
      )));
    }

    if self.quantities.iter().any(|q| !q.is_finite() || *q < 0.0) {
      return Err(AnalyticsError::Validation(
        "Quantities must be non-negative".into(),
      ));
    }

    if self.quantities.iter().all(|q| *q == 0.0) {
      return Err(AnalyticsError::Validation(
        "At least one asset must have positive quantity".into(),
      ));
    }

    Ok(())
  }

  fn validate_dates(&self, today: NaiveDate) -> Result<DateRange> {
    let start = parse_date("start date", self.start_date.as_deref())?;
    let end = parse_date("end date", self.end_date.as_deref())?;

    if let (Some(s), Some(e)) = (start, end) {
      if s >= e {
        return Err(AnalyticsError::Validation(format!(
          "Start date ({s}) must be before end date ({e})"
        )));
      }
    }
    if let Some(e) = end.filter(|e| *e > today) {
      return Err(AnalyticsError::Validation(format!(
        "End date ({e}) cannot be in the future"
      )));
    }
    if let Some(s) = start.filter(|s| *s > today) {
      return Err(AnalyticsError::Validation(format!(
        "Start date ({s}) cannot be in the future"
      )));
    }
    if end == Some(today) {
      warn!(%today, "end date is today, market data may be incomplete");
    }

    Ok(DateRange { start, end })
  }

  /// Benchmark ticker for this run.
  pub fn benchmark_ticker<'a>(&'a self, config: &'a AnalyticsConfig) -> &'a str {
    self
      .benchmark
      .as_deref()
      .unwrap_or(config.benchmark_ticker.as_str())
  }

  /// Tickers whose prices a run needs: the holdings plus the risk-free proxy.
  pub fn universe(&self, config: &AnalyticsConfig) -> Vec<String> {
    let mut tickers = self.tickers.clone();
    if !tickers.contains(&config.risk_free_ticker) {
      tickers.push(config.risk_free_ticker.clone());
    }
    tickers
  }

  /// Aligned price matrix over the universe, restricted to `range`.
  ///
  /// A missing risk-free series is tolerated; the engine then falls back to
  /// the default rate.
  pub fn price_matrix(
    &self,
    config: &AnalyticsConfig,
    range: DateRange,
  ) -> Result<PriceMatrix> {
    let tickers: Vec<String> = self
      .universe(config)
      .into_iter()
      .filter(|t| {
        let priced = self.prices.contains_key(t);
        if !priced && *t == config.risk_free_ticker && !self.tickers.contains(t) {
          warn!(ticker = %t, "no risk-free price series, using default rate");
          return false;
        }
        true
      })
      .collect();

    let mut series = BTreeMap::new();
    for ticker in &tickers {
      let points = self
        .prices
        .get(ticker)
        .ok_or_else(|| AnalyticsError::MissingPriceSeries(ticker.clone()))?;
      series.insert(ticker.clone(), PriceSeries::new(points.clone())?);
    }

    Ok(PriceMatrix::align(&tickers, &series)?.slice_dates(range.start, range.end))
  }

  /// Benchmark closes restricted to `range`.
  pub fn benchmark_series(
    &self,
    config: &AnalyticsConfig,
    range: DateRange,
  ) -> Result<PriceSeries> {
    let ticker = self.benchmark_ticker(config);
    let points = self
      .prices
      .get(ticker)
      .or(self.benchmark_prices.as_ref())
      .ok_or_else(|| AnalyticsError::MissingPriceSeries(ticker.to_string()))?;

    PriceSeries::new(
      points
        .iter()
        .copied()
        .filter(|(d, _)| range.contains(*d))
        .collect(),
    )
  }
}
