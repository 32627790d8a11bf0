//! Run configuration for a scenario generation batch

use std::path::PathBuf;
use std::str::FromStr;

use chrono::NaiveDate;
use clap::ValueEnum;
use serde::{Deserialize, Serialize};

use crate::error::{Result, ScenarioError};
use crate::rng::GeneratorKind;
use crate::scenario::TEST_SCENARIO_COUNT;

/// Projection period frequency used to express the horizon
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "snake_case")]
pub enum Frequency {
    #[value(name = "a", alias = "annual")]
    Annual,
    #[value(name = "s", alias = "semiannual")]
    SemiAnnual,
    #[value(name = "q", alias = "quarterly")]
    Quarterly,
    #[value(name = "m", alias = "monthly")]
    Monthly,
}

impl Frequency {
    pub fn periods_per_year(self) -> u32 {
        match self {
            Frequency::Annual => 1,
            Frequency::SemiAnnual => 2,
            Frequency::Quarterly => 4,
            Frequency::Monthly => 12,
        }
    }
}

impl FromStr for Frequency {
    type Err = ScenarioError;

    /// Single-letter codes `a`, `s`, `q`, `m`
    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "a" => Ok(Frequency::Annual),
            "s" => Ok(Frequency::SemiAnnual),
            "q" => Ok(Frequency::Quarterly),
            "m" => Ok(Frequency::Monthly),
            other => Err(ScenarioError::InvalidConfig(format!("unknown frequency code '{}'", other))),
        }
    }
}

/// Whole projection years covered by `periods` periods at `frequency`
pub fn projection_years_from_periods(periods: u32, frequency: Frequency) -> u32 {
    periods / frequency.periods_per_year()
}

/// Settings for one `generate_all` run
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GenerationConfig {
    /// Projection horizon in years (12 months each)
    pub projection_years: u32,
    /// Scenarios `1..=num_scenarios` are generated
    pub num_scenarios: u32,
    /// Worker threads; 1 runs on the calling thread
    pub num_threads: usize,
    /// Valuation date, first of month; selects the starting market curve
    pub start_date: NaiveDate,
    /// Generate the deterministic test scenarios instead of random ones
    pub test_scenarios: bool,
    /// Replace the long-rate mean-reversion target with the NAIC point for the start date
    pub use_naic_mean_reversion_point: bool,
    pub generator: GeneratorKind,
    pub output_dir: PathBuf,
    /// Add the monthly yield curves to each scenario file
    pub include_yield_curves: bool,
}

impl Default for GenerationConfig {
    fn default() -> Self {
        Self {
            projection_years: 30,
            num_scenarios: 1000,
            num_threads: 1,
            start_date: NaiveDate::from_ymd_opt(2022, 1, 1).unwrap_or_default(),
            test_scenarios: false,
            use_naic_mean_reversion_point: false,
            generator: GeneratorKind::default(),
            output_dir: PathBuf::from("scenarios"),
            include_yield_curves: false,
        }
    }
}

impl GenerationConfig {
    pub fn projection_months(&self) -> usize {
        self.projection_years as usize * 12
    }

    /// Reject settings no run can satisfy
    pub fn validate(&self) -> Result<()> {
        if self.num_threads == 0 {
            return Err(ScenarioError::InvalidConfig("thread count must be at least 1".to_string()));
        }
        if self.num_scenarios == 0 {
            return Err(ScenarioError::InvalidConfig("scenario count must be at least 1".to_string()));
        }
        if self.test_scenarios && self.num_scenarios > TEST_SCENARIO_COUNT as u32 {
            return Err(ScenarioError::InvalidConfig(format!(
                "only {} deterministic test scenarios exist, {} requested",
                TEST_SCENARIO_COUNT, self.num_scenarios
            )));
        }
        Ok(())
    }
}
