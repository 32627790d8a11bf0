//! Error types for scenario generation
//!
//! Every failure is fatal to a run: there is no retry or partial-success path.
//! Configuration mismatches that callers are expected to probe up front
//! (start date coverage, starting curve) are exposed as `bool` queries instead.

use chrono::NaiveDate;
use thiserror::Error;

/// Errors raised while setting up or running scenario generation
#[derive(Debug, Error)]
pub enum ScenarioError {
    /// A random source was asked for a draw before it was seeded
    #[error("random source used before it was seeded")]
    UninitializedGenerator,

    /// Gaussian quantile requested outside the open interval (0, 1)
    #[error("inverse normal argument {0} is outside (0, 1)")]
    QuantileDomain(f64),

    /// Cholesky factorization hit a negative residual on the diagonal
    #[error("correlation matrix is not positive semidefinite (row {row}, residual {residual})")]
    NotPositiveSemidefinite { row: usize, residual: f64 },

    /// Bounded container accessed outside its inclusive index range
    #[error("index {index} outside inclusive range [{lo}, {hi}]")]
    IndexOutOfRange { index: i64, lo: i64, hi: i64 },

    /// Deterministic shock requested for a scenario outside 1..=16
    #[error("test scenario number {0} is outside 1..=16")]
    InvalidTestScenario(i32),

    /// Deterministic shock requested for a non-positive month
    #[error("test scenario month {0} must be at least 1")]
    InvalidTestMonth(i32),

    /// Fund label that is not part of the fixed taxonomy
    #[error("unknown fund: {0}")]
    UnknownFund(String),

    /// Starting date not covered by the historical archive
    #[error("start date {date} outside historical coverage {first}..={last}")]
    StartDateOutOfRange {
        date: NaiveDate,
        first: NaiveDate,
        last: NaiveDate,
    },

    /// No mean-reversion point configured for the start date
    #[error("no mean reversion point configured for {0}")]
    MissingMeanReversionPoint(NaiveDate),

    /// Malformed or inconsistent historical curve input
    #[error("historical data: {0}")]
    HistoricalData(String),

    /// Inconsistent run configuration or parameter file
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Json(#[from] serde_json::Error),

    #[error(transparent)]
    Csv(#[from] csv::Error),

    #[error(transparent)]
    ThreadPool(#[from] rayon::ThreadPoolBuildError),
}

/// Result alias used throughout the crate
pub type Result<T> = std::result::Result<T, ScenarioError>;
