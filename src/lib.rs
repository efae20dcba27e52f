//! # frontier-rs
//!
//! Mean-variance portfolio analytics over historical prices: minimum-variance
//! and maximum-Sharpe portfolios, the efficient frontier, a Monte Carlo cloud
//! of random portfolios, portfolio beta and hedge sizing.
//!
//! ```ignore
//! use frontier_rs::engine::PortfolioEngine;
//!
//! let request = serde_json::from_str(&input)?;
//! let report = PortfolioEngine::default().analyze(&request)?;
//! ```

pub mod config;
pub mod engine;
pub mod error;
pub mod portfolio;
pub mod request;
pub mod risk;

pub use config::AnalyticsConfig;
pub use engine::AnalysisReport;
pub use engine::PortfolioEngine;
pub use error::AnalyticsError;
pub use request::AnalysisRequest;
