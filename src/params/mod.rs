//! Scenario generator parameters
//!
//! A `ScenarioGeneratorParams` value is the immutable calibration snapshot for
//! one run: interest-rate recursion constants, per-fund return parameters, the
//! 11-variable fund shock correlation matrix and the NAIC mean-reversion
//! points. Worker threads share it read-only.

pub mod loader;

pub use loader::{ParamFile, FUND_MARKETS};

use std::collections::BTreeMap;
use std::path::Path;

use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};

use crate::bounded::BoundedTable;
use crate::curves::CurveInterpolation;
use crate::error::{Result, ScenarioError};

/// Number of correlated shock variables used by fund generation
pub const FUND_SHOCK_VARIABLES: usize = 11;

/// Earliest start year for which a NAIC mean-reversion point can apply
pub const FIRST_MEAN_REVERSION_YEAR: i32 = 1954;

/// Three-factor interest-rate recursion parameters
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InterestRateParams {
    /// Long-rate mean-reversion target
    pub tau1: f64,
    /// Long-rate mean-reversion speed
    pub beta1: f64,
    /// Long/short spread target
    pub tau2: f64,
    /// Spread mean-reversion speed
    pub beta2: f64,
    /// Spread volatility
    pub sigma2: f64,
    /// Long-run volatility target
    pub tau3: f64,
    /// Volatility mean-reversion speed
    pub beta3: f64,
    /// Volatility of log-volatility
    pub sigma3: f64,
    /// Long-rate sensitivity to the prior spread
    pub phi: f64,
    /// Spread-correction weight on the long rate
    pub psi: f64,
    /// Exponent applied to the prior long rate in the spread shock
    pub theta: f64,
    /// Short-to-long rate ratio carried by parameter files; the short-rate
    /// floor is `min_short_rate`, so the recursion never reads it
    #[serde(default)]
    pub kappa: f64,
    /// Correlation of long-rate and spread shocks
    pub correl12: f64,
    /// Correlation of long-rate and volatility shocks
    pub correl13: f64,
    /// Correlation of spread and volatility shocks
    pub correl23: f64,
    #[serde(rename = "init_rate_short")]
    pub initial_short_rate: f64,
    #[serde(rename = "init_rate_long")]
    pub initial_long_rate: f64,
    #[serde(rename = "init_vol")]
    pub initial_volatility: f64,
    pub min_long_rate: f64,
    pub max_long_rate: f64,
    pub min_short_rate: f64,
    /// How each month's anchor points are built from the generated pair
    #[serde(default)]
    pub curve_interpolation: CurveInterpolation,
}

/// Stochastic-volatility equity fund parameters
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EquityFundParams {
    /// Long-run annualized volatility
    pub target_vol: f64,
    /// Monthly pull of log-volatility toward the target
    pub mean_rev_strength: f64,
    /// Scale of the volatility shock
    pub vol_std_dev: f64,
    /// Constant term of the expected annual log return
    pub a: f64,
    /// Linear volatility term of the expected annual log return
    pub b: f64,
    /// Quadratic volatility term of the expected annual log return
    pub c: f64,
    /// Starting annualized volatility
    pub current_vol: f64,
    pub min_vol: f64,
    /// Cap applied before the volatility shock
    pub max_vol_before: f64,
    /// Cap applied after the volatility shock
    pub max_vol_after: f64,
    /// Annual median return used by deterministic test scenarios
    #[serde(rename = "SETmedianReturn")]
    pub set_median_return: f64,
    /// Annual volatility used by deterministic test scenarios
    #[serde(rename = "SETvolatility")]
    pub set_volatility: f64,
}

/// Fixed-income fund parameters
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FixedFundParams {
    /// Curve maturity (years) the fund tracks
    pub maturity: f64,
    pub monthly_factor: f64,
    pub monthly_spread: f64,
    pub duration: f64,
    pub volatility: f64,
}

/// Constants derived from the interest-rate parameters
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DerivedConstants {
    /// `sqrt(1 - c12^2)`
    pub const1: f64,
    /// `(c23 - c12*c13) / sqrt(1 - c12^2)`
    pub const2: f64,
    /// `sqrt(1 - (c23 - c12*c13)^2 / (1 - c12^2) - c13^2)`
    pub const3: f64,
    /// `beta3 * ln(tau3)`
    pub const4: f64,
    /// `beta1 * ln(tau1)`
    pub const5: f64,
}

impl DerivedConstants {
    pub fn from_interest(p: &InterestRateParams) -> Result<Self> {
        let c12_complement = 1.0 - p.correl12 * p.correl12;
        if c12_complement <= 0.0 {
            return Err(ScenarioError::InvalidConfig(format!(
                "correl12 must lie strictly inside (-1, 1), got {}",
                p.correl12
            )));
        }

        let cross = p.correl23 - p.correl12 * p.correl13;
        let radicand = 1.0 - cross * cross / c12_complement - p.correl13 * p.correl13;
        if radicand < 0.0 {
            return Err(ScenarioError::InvalidConfig(format!(
                "interest-rate factor correlations ({}, {}, {}) are inconsistent",
                p.correl12, p.correl13, p.correl23
            )));
        }

        if p.tau1 <= 0.0 || p.tau3 <= 0.0 {
            return Err(ScenarioError::InvalidConfig(format!(
                "tau1 and tau3 must be positive, got {} and {}",
                p.tau1, p.tau3
            )));
        }

        Ok(Self {
            const1: c12_complement.sqrt(),
            const2: cross / c12_complement.sqrt(),
            const3: radicand.sqrt(),
            const4: p.beta3 * p.tau3.ln(),
            const5: p.beta1 * p.tau1.ln(),
        })
    }
}

/// Immutable calibration snapshot for one run
#[derive(Debug, Clone)]
pub struct ScenarioGeneratorParams {
    pub interest: InterestRateParams,
    pub diversified: EquityFundParams,
    pub international: EquityFundParams,
    pub intermediate: EquityFundParams,
    pub aggressive: EquityFundParams,
    pub money_market: FixedFundParams,
    pub intermediate_government: FixedFundParams,
    pub long_corporate: FixedFundParams,
    /// 11x11 zero-based correlation matrix in `FUND_MARKETS` order
    pub fund_correlations: BoundedTable<f64>,
    /// Long-rate mean-reversion points keyed by first-of-month start date
    pub naic_mean_reversion_points: BTreeMap<NaiveDate, f64>,
}

impl ScenarioGeneratorParams {
    /// Assemble a snapshot, validating the correlations and derived constants
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        interest: InterestRateParams,
        diversified: EquityFundParams,
        international: EquityFundParams,
        intermediate: EquityFundParams,
        aggressive: EquityFundParams,
        money_market: FixedFundParams,
        intermediate_government: FixedFundParams,
        long_corporate: FixedFundParams,
        fund_correlations: BoundedTable<f64>,
        naic_mean_reversion_points: BTreeMap<NaiveDate, f64>,
    ) -> Result<Self> {
        validate_correlations(&fund_correlations)?;
        DerivedConstants::from_interest(&interest)?;

        Ok(Self {
            interest,
            diversified,
            international,
            intermediate,
            aggressive,
            money_market,
            intermediate_government,
            long_corporate,
            fund_correlations,
            naic_mean_reversion_points,
        })
    }

    /// Built-in calibration
    pub fn default_calibration() -> Self {
        let interest = InterestRateParams {
            tau1: 0.035,
            beta1: 0.00509,
            tau2: 0.01,
            beta2: 0.02685,
            sigma2: 0.04148,
            tau3: 0.0287,
            beta3: 0.04001,
            sigma3: 0.11489,
            phi: 0.0002,
            psi: 0.25164,
            theta: 1.0,
            kappa: 0.0,
            correl12: -0.19197,
            correl13: 0.0,
            correl23: 0.0,
            initial_short_rate: 0.02,
            initial_long_rate: 0.04,
            initial_volatility: 0.0287,
            min_long_rate: 0.0115,
            max_long_rate: 0.18,
            min_short_rate: 0.0001,
            curve_interpolation: CurveInterpolation::NelsonSiegel,
        };

        let equity = |target_vol: f64, vol_std_dev: f64, min_vol: f64, set_median_return: f64, set_volatility: f64| {
            EquityFundParams {
                target_vol,
                mean_rev_strength: 0.036,
                vol_std_dev,
                a: 0.055,
                b: 0.56,
                c: -0.9,
                current_vol: target_vol,
                min_vol,
                max_vol_before: 0.30,
                max_vol_after: 0.7922,
                set_median_return,
                set_volatility,
            }
        };

        Self {
            interest,
            diversified: equity(0.1476, 0.0753, 0.0326, 0.0875, 0.15),
            international: equity(0.1688, 0.0767, 0.0354, 0.0875, 0.17),
            intermediate: equity(0.1905, 0.0838, 0.0383, 0.0925, 0.19),
            aggressive: equity(0.2413, 0.0976, 0.0422, 0.0975, 0.25),
            money_market: FixedFundParams {
                maturity: 0.25,
                monthly_factor: 1.0 / 12.0,
                monthly_spread: 0.0,
                duration: 0.0,
                volatility: 0.0,
            },
            intermediate_government: FixedFundParams {
                maturity: 5.0,
                monthly_factor: 1.0 / 12.0,
                monthly_spread: 0.0,
                duration: 4.5,
                volatility: 0.012,
            },
            long_corporate: FixedFundParams {
                maturity: 10.0,
                monthly_factor: 1.0 / 12.0,
                monthly_spread: 0.0075,
                duration: 7.5,
                volatility: 0.025,
            },
            fund_correlations: default_fund_correlations(),
            naic_mean_reversion_points: BTreeMap::new(),
        }
    }

    /// Load a parameter file in the JSON layout described by [`ParamFile`]
    pub fn from_json_path(path: &Path) -> Result<Self> {
        ParamFile::load(path)?.into_params()
    }

    /// Parse parameters from JSON text
    pub fn from_json_str(json: &str) -> Result<Self> {
        let file: ParamFile = serde_json::from_str(json)?;
        file.into_params()
    }

    /// Derived recursion constants for the current interest-rate parameters
    ///
    /// Recomputed on every call so edits to `interest` are always reflected.
    pub fn derived(&self) -> Result<DerivedConstants> {
        DerivedConstants::from_interest(&self.interest)
    }

    /// Copy of these parameters with `tau1` replaced by the NAIC
    /// mean-reversion point for `start_date`
    pub fn with_mean_reversion_point(&self, start_date: NaiveDate) -> Result<Self> {
        if start_date.year() < FIRST_MEAN_REVERSION_YEAR {
            return Err(ScenarioError::MissingMeanReversionPoint(start_date));
        }

        let point = self
            .naic_mean_reversion_points
            .get(&start_date)
            .copied()
            .ok_or(ScenarioError::MissingMeanReversionPoint(start_date))?;

        let mut updated = self.clone();
        updated.interest.tau1 = point;
        updated.derived()?;
        log::info!("long-rate mean reversion point for {} set to {}", start_date, point);
        Ok(updated)
    }
}

impl Default for ScenarioGeneratorParams {
    fn default() -> Self {
        Self::default_calibration()
    }
}

/// Correlation matrix must be 11x11, symmetric, with a unit diagonal
fn validate_correlations(corr: &BoundedTable<f64>) -> Result<()> {
    let n = FUND_SHOCK_VARIABLES;
    if corr.x_range().len() != n || corr.y_range().len() != n {
        return Err(ScenarioError::InvalidConfig(format!(
            "fund correlation matrix must be {}x{}, got {}x{}",
            n,
            n,
            corr.x_range().len(),
            corr.y_range().len()
        )));
    }

    let (x0, y0) = (corr.x_range().lo, corr.y_range().lo);
    for i in 0..n as i32 {
        if (corr[(x0 + i, y0 + i)] - 1.0).abs() > 1e-12 {
            return Err(ScenarioError::InvalidConfig(format!(
                "fund correlation diagonal entry {} is {}",
                i,
                corr[(x0 + i, y0 + i)]
            )));
        }
        for j in 0..i {
            if (corr[(x0 + i, y0 + j)] - corr[(x0 + j, y0 + i)]).abs() > 1e-12 {
                return Err(ScenarioError::InvalidConfig(format!(
                    "fund correlation matrix is not symmetric at ({}, {})",
                    i, j
                )));
            }
        }
    }
    Ok(())
}

/// Default fund shock correlations: volatilities co-move, returns co-move,
/// and each volatility moves against returns
fn default_fund_correlations() -> BoundedTable<f64> {
    #[rustfmt::skip]
    const ROWS: [[f64; FUND_SHOCK_VARIABLES]; FUND_SHOCK_VARIABLES] = [
        [ 1.0000, -0.2100,  0.1050, -0.1925,  0.1400, -0.1750,  0.1575, -0.2275,  0.0175,  0.0700,  0.0875],
        [-0.2100,  1.0000, -0.1800,  0.3300, -0.2400,  0.3000, -0.2700,  0.3900, -0.0300, -0.1200, -0.1500],
        [ 0.1050, -0.1800,  1.0000, -0.1650,  0.1200, -0.1500,  0.1350, -0.1950,  0.0150,  0.0600,  0.0750],
        [-0.1925,  0.3300, -0.1650,  1.0000, -0.2200,  0.2750, -0.2475,  0.3575, -0.0275, -0.1100, -0.1375],
        [ 0.1400, -0.2400,  0.1200, -0.2200,  1.0000, -0.2000,  0.1800, -0.2600,  0.0200,  0.0800,  0.1000],
        [-0.1750,  0.3000, -0.1500,  0.2750, -0.2000,  1.0000, -0.2250,  0.3250, -0.0250, -0.1000, -0.1250],
        [ 0.1575, -0.2700,  0.1350, -0.2475,  0.1800, -0.2250,  1.0000, -0.2925,  0.0225,  0.0900,  0.1125],
        [-0.2275,  0.3900, -0.1950,  0.3575, -0.2600,  0.3250, -0.2925,  1.0000, -0.0325, -0.1300, -0.1625],
        [ 0.0175, -0.0300,  0.0150, -0.0275,  0.0200, -0.0250,  0.0225, -0.0325,  1.0000,  0.0100,  0.0125],
        [ 0.0700, -0.1200,  0.0600, -0.1100,  0.0800, -0.1000,  0.0900, -0.1300,  0.0100,  1.0000,  0.0500],
        [ 0.0875, -0.1500,  0.0750, -0.1375,  0.1000, -0.1250,  0.1125, -0.1625,  0.0125,  0.0500,  1.0000],
    ];

    let mut table = BoundedTable::zero_based(FUND_SHOCK_VARIABLES, FUND_SHOCK_VARIABLES);
    for (i, row) in ROWS.iter().enumerate() {
        for (j, v) in row.iter().enumerate() {
            table[(i as i32, j as i32)] = *v;
        }
    }
    table
}
