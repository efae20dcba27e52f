//! # Portfolio Data
//!
//! $$
//! r_{t,i} = \frac{P_{t,i}}{P_{t-1,i}} - 1
//! $$
//!
//! Date-aligned price tables and the daily return series derived from them.

use std::collections::BTreeMap;
use std::collections::BTreeSet;
use std::collections::HashSet;

use chrono::NaiveDate;
use ndarray::Array1;
use ndarray::Array2;
use ndarray::ArrayView1;
use ndarray::Axis;
use ndarray::s;

use crate::error::AnalyticsError;
use crate::error::Result;

/// One ticker's closing prices, sorted by date.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct PriceSeries {
  points: Vec<(NaiveDate, f64)>,
}

impl PriceSeries {
  /// Build a series; points are sorted by date and must not repeat a date.
  pub fn new(mut points: Vec<(NaiveDate, f64)>) -> Result<Self> {
    if let Some((date, p)) = points.iter().find(|(_, p)| !p.is_finite() || *p <= 0.0) {
      return Err(AnalyticsError::InvalidPriceData(format!(
        "non-positive price {p} on {date}"
      )));
    }
    points.sort_by_key(|(d, _)| *d);
    if let Some(w) = points.windows(2).find(|w| w[0].0 == w[1].0) {
      return Err(AnalyticsError::InvalidPriceData(format!(
        "duplicate date {}",
        w[0].0
      )));
    }
    Ok(Self { points })
  }

  pub fn points(&self) -> &[(NaiveDate, f64)] {
    &self.points
  }

  pub fn len(&self) -> usize {
    self.points.len()
  }

  pub fn is_empty(&self) -> bool {
    self.points.is_empty()
  }

  /// Most recent close.
  pub fn latest(&self) -> Option<f64> {
    self.points.last().map(|(_, p)| *p)
  }

  /// Daily simple returns keyed by the later date of each pair.
  pub fn returns(&self) -> BTreeMap<NaiveDate, f64> {
    self
      .points
      .windows(2)
      .map(|w| (w[1].0, w[1].1 / w[0].1 - 1.0))
      .collect()
  }
}

/// Date-aligned adjusted closes, one row per date and one column per ticker.
#[derive(Clone, Debug, PartialEq)]
pub struct PriceMatrix {
  dates: Vec<NaiveDate>,
  tickers: Vec<String>,
  prices: Array2<f64>,
}

impl PriceMatrix {
  /// Build a matrix from pre-aligned columns.
  ///
  /// Dates must be strictly ascending, tickers unique and every price positive
  /// and finite.
  pub fn new(dates: Vec<NaiveDate>, tickers: Vec<String>, prices: Array2<f64>) -> Result<Self> {
    if prices.dim() != (dates.len(), tickers.len()) {
      return Err(AnalyticsError::InvalidPriceData(format!(
        "matrix shape {:?} does not match {} dates x {} tickers",
        prices.dim(),
        dates.len(),
        tickers.len()
      )));
    }

    if dates.windows(2).any(|w| w[0] >= w[1]) {
      return Err(AnalyticsError::InvalidPriceData(
        "dates must be strictly ascending".into(),
      ));
    }

    let mut seen = HashSet::new();
    if let Some(dup) = tickers.iter().find(|t| !seen.insert(t.as_str())) {
      return Err(AnalyticsError::InvalidPriceData(format!(
        "duplicate ticker column {dup}"
      )));
    }

    if let Some(((row, col), p)) = prices
      .indexed_iter()
      .find(|(_, p)| !p.is_finite() || **p <= 0.0)
    {
      return Err(AnalyticsError::InvalidPriceData(format!(
        "{} has non-positive price {p} on {}",
        tickers[col], dates[row]
      )));
    }

    Ok(Self {
      dates,
      tickers,
      prices,
    })
  }

  /// Inner-join per-ticker series on date, keeping `tickers` column order.
  pub fn align(tickers: &[String], series: &BTreeMap<String, PriceSeries>) -> Result<Self> {
    let mut common: Option<BTreeSet<NaiveDate>> = None;
    for ticker in tickers {
      let s = series
        .get(ticker)
        .ok_or_else(|| AnalyticsError::MissingPriceSeries(ticker.clone()))?;
      let dates: BTreeSet<NaiveDate> = s.points().iter().map(|(d, _)| *d).collect();
      common = Some(match common {
        Some(c) => c.intersection(&dates).copied().collect(),
        None => dates,
      });
    }

    let dates: Vec<NaiveDate> = common.unwrap_or_default().into_iter().collect();
    let mut prices = Array2::<f64>::zeros((dates.len(), tickers.len()));
    for (col, ticker) in tickers.iter().enumerate() {
      let by_date: BTreeMap<NaiveDate, f64> = series[ticker].points().iter().copied().collect();
      for (row, date) in dates.iter().enumerate() {
        prices[[row, col]] = by_date[date];
      }
    }

    Self::new(dates, tickers.to_vec(), prices)
  }

  pub fn dates(&self) -> &[NaiveDate] {
    &self.dates
  }

  pub fn tickers(&self) -> &[String] {
    &self.tickers
  }

  pub fn prices(&self) -> &Array2<f64> {
    &self.prices
  }

  /// Number of aligned rows.
  pub fn len(&self) -> usize {
    self.dates.len()
  }

  pub fn is_empty(&self) -> bool {
    self.dates.is_empty()
  }

  pub fn column_index(&self, ticker: &str) -> Option<usize> {
    self.tickers.iter().position(|t| t == ticker)
  }

  pub fn column(&self, ticker: &str) -> Option<ArrayView1<f64>> {
    self
      .column_index(ticker)
      .map(|i| self.prices.column(i))
  }

  /// Price column as a standalone series.
  pub fn series(&self, ticker: &str) -> Option<PriceSeries> {
    self.column(ticker).map(|col| PriceSeries {
      points: self.dates.iter().copied().zip(col.iter().copied()).collect(),
    })
  }

  /// Closes of the last aligned row.
  pub fn latest(&self) -> Option<ArrayView1<f64>> {
    (!self.is_empty()).then(|| self.prices.row(self.len() - 1))
  }

  /// Daily simple returns, one row per date after the first.
  pub fn returns(&self) -> Array2<f64> {
    if self.len() < 2 {
      return Array2::zeros((0, self.tickers.len()));
    }
    let prev = self.prices.slice(s![..-1, ..]);
    let next = self.prices.slice(s![1.., ..]);
    &next / &prev - 1.0
  }

  /// Dates the rows of [`PriceMatrix::returns`] belong to.
  pub fn return_dates(&self) -> &[NaiveDate] {
    self.dates.get(1..).unwrap_or(&[])
  }

  /// Daily returns of a fixed-weight portfolio over `weights`' columns.
  pub fn weighted_returns(&self, weights: ArrayView1<f64>) -> Array1<f64> {
    self.returns().dot(&weights)
  }

  /// Rows whose date lies in `[start, end]`; open bounds are unrestricted.
  pub fn slice_dates(&self, start: Option<NaiveDate>, end: Option<NaiveDate>) -> Self {
    let keep: Vec<usize> = self
      .dates
      .iter()
      .enumerate()
      .filter(|(_, d)| start.map_or(true, |s| **d >= s) && end.map_or(true, |e| **d <= e))
      .map(|(i, _)| i)
      .collect();

    Self {
      dates: keep.iter().map(|&i| self.dates[i]).collect(),
      tickers: self.tickers.clone(),
      prices: self.prices.select(Axis(0), &keep),
    }
  }
}
