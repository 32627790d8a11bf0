//! Scenario Generator CLI
//!
//! Generates economic scenarios from a parameter file and historical curves,
//! writing one `scenario_<n>.json` per scenario into the output directory.

use std::path::PathBuf;

use anyhow::{bail, Context, Result};
use chrono::NaiveDate;
use clap::{Parser, ValueEnum};

use scenario_generator::curves::dates::first_of_month;
use scenario_generator::generator::{projection_years_from_periods, Frequency};
use scenario_generator::{GenerationConfig, GeneratorKind, ScenarioGenerator};

/// Monte Carlo economic scenario generator
#[derive(Parser, Debug)]
#[command(name = "scenario_generator")]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Directory that receives the scenario files
    #[arg(short, long, default_value = "scenarios")]
    output_dir: PathBuf,

    /// JSON parameter file
    #[arg(short, long, default_value = "params.json")]
    param_file: PathBuf,

    /// Directory holding the historical curve files (0.25.csv ... 30.csv)
    #[arg(long, default_value = "data/historical")]
    historical_dir: PathBuf,

    /// Projection length in periods of `--frequency`
    #[arg(short = 'n', long, default_value_t = 30)]
    num_periods: u32,

    /// Period frequency: a(nnual), s(emiannual), q(uarterly), m(onthly)
    #[arg(short, long, value_enum, ignore_case = true, default_value_t = Frequency::Annual)]
    frequency: Frequency,

    /// Number of scenarios to generate
    #[arg(short = 's', long, default_value_t = 1000)]
    num_scenarios: u32,

    /// Worker threads
    #[arg(short, long, default_value_t = 1)]
    threads: usize,

    /// Valuation date (YYYY-MM-DD); pinned to the first of its month
    #[arg(long, default_value = "2022-01-01")]
    start_date: NaiveDate,

    /// Generate the 16 deterministic test scenarios instead of random ones
    #[arg(long)]
    test_scenarios: bool,

    /// Random number generator
    #[arg(short, long, value_enum, default_value_t = GeneratorArg::Standard)]
    generator: GeneratorArg,

    /// Include monthly yield curves in each scenario file
    #[arg(long)]
    yield_curves: bool,

    /// Use the NAIC long-rate mean reversion point for the start date
    #[arg(long)]
    naic_mean_reversion: bool,
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum GeneratorArg {
    Legacy,
    Standard,
}

impl From<GeneratorArg> for GeneratorKind {
    fn from(arg: GeneratorArg) -> Self {
        match arg {
            GeneratorArg::Legacy => GeneratorKind::Legacy,
            GeneratorArg::Standard => GeneratorKind::Standard,
        }
    }
}

fn main() -> Result<()> {
    env_logger::init();

    let args = Args::parse();
    log::debug!("{:?}", args);

    let projection_years = projection_years_from_periods(args.num_periods, args.frequency);
    if projection_years == 0 {
        bail!(
            "{} periods at frequency {:?} is less than one projection year",
            args.num_periods,
            args.frequency
        );
    }

    let generator = ScenarioGenerator::load(&args.param_file, &args.historical_dir).with_context(|| {
        format!(
            "loading parameters from {} and historical curves from {}",
            args.param_file.display(),
            args.historical_dir.display()
        )
    })?;

    let start_date = first_of_month(args.start_date);
    if !generator.archive().covers(start_date) {
        bail!(
            "start date {} is outside historical coverage {} to {}",
            start_date,
            generator.archive().first_date(),
            generator.archive().last_date()
        );
    }

    let config = GenerationConfig {
        projection_years,
        num_scenarios: args.num_scenarios,
        num_threads: args.threads,
        start_date,
        test_scenarios: args.test_scenarios,
        use_naic_mean_reversion_point: args.naic_mean_reversion,
        generator: args.generator.into(),
        output_dir: args.output_dir,
        include_yield_curves: args.yield_curves,
    };

    let summary = generator
        .generate_all(&config)
        .with_context(|| format!("generating scenarios into {}", config.output_dir.display()))?;

    println!(
        "Generated {} scenarios in {:?} ({})",
        summary.scenarios_written,
        summary.elapsed,
        config.output_dir.display()
    );

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_frequency_flag() {
        let args = Args::try_parse_from(["scenario_generator", "-n", "120", "-f", "Q"]).unwrap();
        assert_eq!(args.frequency, Frequency::Quarterly);
        assert_eq!(projection_years_from_periods(args.num_periods, args.frequency), 30);

        let args = Args::try_parse_from(["scenario_generator"]).unwrap();
        assert_eq!(args.frequency, Frequency::Annual);

        assert!(Args::try_parse_from(["scenario_generator", "-f", "w"]).is_err());
    }
}
