//! Scenario orchestration
//!
//! `ScenarioGenerator` owns the parameter snapshot and the historical curve
//! archive, both read-only once constructed. A run splits the scenario range
//! into one static partition per worker; each worker builds its own random
//! source and writes its own files, so a scenario's output depends only on its
//! number and never on the worker that produced it.

mod config;
mod partition;

pub use config::{projection_years_from_periods, Frequency, GenerationConfig};
pub use partition::partition_scenarios;

use std::borrow::Cow;
use std::ops::Range;
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

use chrono::NaiveDate;
use rayon::prelude::*;

use crate::curves::{HistoricalCurveArchive, CURVE_POINTS};
use crate::error::Result;
use crate::output::{scenario_path, ScenarioDocument};
use crate::params::ScenarioGeneratorParams;
use crate::rng::RandomSource;
use crate::scenario::{FundScenario, InterestRateScenario};

/// Outcome of a completed run
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RunSummary {
    pub scenarios_written: usize,
    pub elapsed: Duration,
}

/// Rate path and fund table of one scenario
#[derive(Debug, Clone)]
pub struct GeneratedScenario {
    pub rates: InterestRateScenario,
    pub funds: FundScenario,
}

impl GeneratedScenario {
    pub fn document(&self, include_yield_curves: bool) -> ScenarioDocument {
        ScenarioDocument::from_scenario(&self.rates, &self.funds, include_yield_curves)
    }
}

/// Inputs fixed for the whole run
struct RunInputs<'a> {
    params: Cow<'a, ScenarioGeneratorParams>,
    initial_curve: [f64; CURVE_POINTS],
}

/// Batch scenario generator
#[derive(Debug, Clone)]
pub struct ScenarioGenerator {
    params: ScenarioGeneratorParams,
    archive: HistoricalCurveArchive,
}

impl ScenarioGenerator {
    pub fn new(params: ScenarioGeneratorParams, archive: HistoricalCurveArchive) -> Self {
        Self { params, archive }
    }

    /// Load a parameter file and a directory of historical curve files
    pub fn load(param_file: &Path, historical_dir: &Path) -> Result<Self> {
        let params = ScenarioGeneratorParams::from_json_path(param_file)?;
        let archive = HistoricalCurveArchive::load_dir(historical_dir)?;
        Ok(Self::new(params, archive))
    }

    pub fn params(&self) -> &ScenarioGeneratorParams {
        &self.params
    }

    pub fn archive(&self) -> &HistoricalCurveArchive {
        &self.archive
    }

    /// Whether `date` is covered by the archive and `curve` equals the archived
    /// curve for that month
    pub fn starting_curve_ok(&self, date: NaiveDate, curve: &[f64; CURVE_POINTS]) -> bool {
        if !self.archive.covers(date) {
            return false;
        }
        matches!(self.archive.curve_vec_by_date(date), Ok(archived) if archived == *curve)
    }

    fn run_inputs(&self, config: &GenerationConfig) -> Result<RunInputs<'_>> {
        let params = if config.use_naic_mean_reversion_point {
            Cow::Owned(self.params.with_mean_reversion_point(config.start_date)?)
        } else {
            Cow::Borrowed(&self.params)
        };

        Ok(RunInputs {
            params,
            initial_curve: self.archive.curve_vec_by_date(config.start_date)?,
        })
    }

    /// Generate one scenario in memory
    pub fn generate_single<R: RandomSource + ?Sized>(
        &self,
        scenario_number: i32,
        config: &GenerationConfig,
        rng: &mut R,
    ) -> Result<GeneratedScenario> {
        let inputs = self.run_inputs(config)?;
        self.generate_with(scenario_number, config, &inputs, rng)
    }

    /// Generate one scenario and write it to the output directory
    pub fn write_single<R: RandomSource + ?Sized>(
        &self,
        scenario_number: i32,
        config: &GenerationConfig,
        rng: &mut R,
    ) -> Result<PathBuf> {
        let inputs = self.run_inputs(config)?;
        self.write_with(scenario_number, config, &inputs, rng)
    }

    fn generate_with<R: RandomSource + ?Sized>(
        &self,
        scenario_number: i32,
        config: &GenerationConfig,
        inputs: &RunInputs<'_>,
        rng: &mut R,
    ) -> Result<GeneratedScenario> {
        let rates = InterestRateScenario::generate(
            scenario_number,
            config.test_scenarios,
            &inputs.initial_curve,
            config.projection_months(),
            &inputs.params,
            Some(&self.archive),
            rng,
        )?;
        let funds = FundScenario::generate(scenario_number, &rates, config.test_scenarios, &inputs.params, rng)?;
        Ok(GeneratedScenario { rates, funds })
    }

    fn write_with<R: RandomSource + ?Sized>(
        &self,
        scenario_number: i32,
        config: &GenerationConfig,
        inputs: &RunInputs<'_>,
        rng: &mut R,
    ) -> Result<PathBuf> {
        let scenario = self.generate_with(scenario_number, config, inputs, rng)?;
        let path = scenario_path(&config.output_dir, scenario_number);
        scenario.document(config.include_yield_curves).write(&path)?;
        log::debug!("wrote scenario {} to {}", scenario_number, path.display());
        Ok(path)
    }

    /// Generate and write one partition with a worker-local random source
    fn write_range(&self, range: Range<i32>, config: &GenerationConfig, inputs: &RunInputs<'_>) -> Result<usize> {
        log::debug!("worker generating scenarios {}..{}", range.start, range.end);
        let mut rng = config.generator.build();
        let mut written = 0;
        for scenario_number in range {
            self.write_with(scenario_number, config, inputs, rng.as_mut())?;
            written += 1;
        }
        Ok(written)
    }

    /// Generate and write scenarios `1..=num_scenarios`
    ///
    /// The first error from any worker fails the whole run.
    pub fn generate_all(&self, config: &GenerationConfig) -> Result<RunSummary> {
        config.validate()?;
        let start = Instant::now();

        std::fs::create_dir_all(&config.output_dir)?;
        let inputs = self.run_inputs(config)?;

        log::info!(
            "Generating {} {} scenarios over {} months on {} thread(s) from {}",
            config.num_scenarios,
            if config.test_scenarios { "deterministic test" } else { "stochastic" },
            config.projection_months(),
            config.num_threads,
            config.start_date
        );

        let scenarios_written = if config.num_threads == 1 {
            self.write_range(1..config.num_scenarios as i32 + 1, config, &inputs)?
        } else {
            let partitions = partition_scenarios(config.num_scenarios, config.num_threads);
            let pool = rayon::ThreadPoolBuilder::new().num_threads(config.num_threads).build()?;
            let counts = pool.install(|| {
                partitions
                    .into_par_iter()
                    .map(|range| self.write_range(range, config, &inputs))
                    .collect::<Result<Vec<usize>>>()
            })?;
            counts.into_iter().sum()
        };

        let elapsed = start.elapsed();
        log::info!("Wrote {} scenarios to {} in {:?}", scenarios_written, config.output_dir.display(), elapsed);

        Ok(RunSummary {
            scenarios_written,
            elapsed,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::curves::dates::month_start;
    use crate::rng::CongruentialShuffle;
    use approx::assert_abs_diff_eq;

    const CURVE: [f64; CURVE_POINTS] = [0.0005, 0.0019, 0.0039, 0.0073, 0.0097, 0.0126, 0.0144, 0.0152, 0.0194, 0.0190];

    fn generator() -> ScenarioGenerator {
        let archive = HistoricalCurveArchive::from_curves(month_start(2021, 12).unwrap(), vec![CURVE, CURVE]).unwrap();
        ScenarioGenerator::new(ScenarioGeneratorParams::default_calibration(), archive)
    }

    fn config() -> GenerationConfig {
        GenerationConfig {
            projection_years: 2,
            num_scenarios: 4,
            start_date: month_start(2022, 1).unwrap(),
            ..GenerationConfig::default()
        }
    }

    #[test]
    fn test_starting_curve_ok() {
        let gen = generator();
        let date = month_start(2022, 1).unwrap();
        assert!(gen.starting_curve_ok(date, &CURVE));

        let mut shifted = CURVE;
        shifted[4] += 0.0001;
        assert!(!gen.starting_curve_ok(date, &shifted));
        assert!(!gen.starting_curve_ok(month_start(2022, 2).unwrap(), &CURVE));
    }

    #[test]
    fn test_generate_single_starts_from_archived_curve() {
        let gen = generator();
        let mut rng = CongruentialShuffle::new();
        let scenario = gen.generate_single(1, &config(), &mut rng).unwrap();
        assert_eq!(scenario.rates.num_months(), 24);
        assert_eq!(scenario.funds.num_months(), 24);
        assert_abs_diff_eq!(scenario.rates.curve(0).rate_at_index(10), 0.0190, epsilon = 1e-15);
    }

    #[test]
    fn test_uncovered_start_date_fails() {
        let gen = generator();
        let config = GenerationConfig {
            start_date: month_start(2023, 1).unwrap(),
            ..config()
        };
        let mut rng = CongruentialShuffle::new();
        assert!(gen.generate_single(1, &config, &mut rng).is_err());
    }

    #[test]
    fn test_naic_point_required_when_enabled() {
        let gen = generator();
        let config = GenerationConfig {
            use_naic_mean_reversion_point: true,
            ..config()
        };
        let mut rng = CongruentialShuffle::new();
        assert!(gen.generate_single(1, &config, &mut rng).is_err());

        let mut params = ScenarioGeneratorParams::default_calibration();
        params.naic_mean_reversion_points.insert(config.start_date, 0.03);
        let gen = ScenarioGenerator::new(params, gen.archive().clone());
        assert!(gen.generate_single(1, &config, &mut rng).is_ok());
    }
}
