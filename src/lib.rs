//! Scenario Generator - Monte Carlo economic scenarios for actuarial valuation
//!
//! This library provides:
//! - Reproducible uniform random sources (legacy congruential shuffle and a 64-bit generator)
//! - Gaussian quantiles and Cholesky-correlated shock vectors
//! - Historical yield curve archive and monthly Nelson-Siegel curves with spot-rate bootstrap
//! - Three-factor interest-rate paths and stochastic-volatility fund returns
//! - Deterministic Stochastic Exclusion Test scenarios
//! - Multi-threaded batch generation writing one JSON file per scenario

pub mod bounded;
pub mod curves;
pub mod error;
pub mod generator;
pub mod math;
pub mod output;
pub mod params;
pub mod rng;
pub mod scenario;

// Re-export commonly used types
pub use curves::{HistoricalCurveArchive, YieldCurveState};
pub use error::{Result, ScenarioError};
pub use generator::{GenerationConfig, RunSummary, ScenarioGenerator};
pub use output::{ScenarioDocument, ScenarioFile};
pub use params::ScenarioGeneratorParams;
pub use rng::{GeneratorKind, RandomSource};
pub use scenario::{FundScenario, FundType, InterestRateScenario};
