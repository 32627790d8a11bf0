//! Three-factor mean-reverting interest-rate scenario
//!
//! State per month: log long rate, long/short spread and log volatility of the
//! long rate. Each month draws three correlated shocks (or reads the
//! deterministic test shocks), steps the recursion, and records the resulting
//! `YieldCurveState`. The first 12 months are blended toward the shape of the
//! starting curve.

use crate::bounded::{BoundedTable, BoundedVec, IndexRange};
use crate::curves::{
    CurveInterpolation, HistoricalCurveArchive, YieldCurveState, CURVE_POINTS, LONG_INDEX, SHORT_INDEX,
};
use crate::error::{Result, ScenarioError};
use crate::math::inverse_normal;
use crate::params::ScenarioGeneratorParams;
use crate::rng::{interest_seed, RandomSource};

use super::shocks::{DeterministicShockTable, ShockKind};

/// Months over which the path is blended toward the starting curve
const BLEND_MONTHS: i32 = 12;

/// Horizon (months) of the significance measure
const SIGNIFICANCE_MONTHS: i32 = 360;

/// Shock column for the long rate
const LONG_FACTOR: i32 = 1;
/// Shock column for the long/short spread
const SPREAD_FACTOR: i32 = 2;
/// Shock column for the log volatility
const VOL_FACTOR: i32 = 3;

/// Generated curves for months `0..=N`, month 0 being the starting curve
#[derive(Debug, Clone)]
pub struct InterestRateScenario {
    scenario_number: i32,
    curves: BoundedVec<YieldCurveState>,
    /// Correlated shocks by month (1..=N) and factor (1..=3)
    shocks: BoundedTable<f64>,
}

/// Portion of the starting-curve residual applied in month `month`
fn blend_portion(month: i32) -> f64 {
    if month <= BLEND_MONTHS {
        (BLEND_MONTHS + 1 - month) as f64 / BLEND_MONTHS as f64
    } else {
        0.0
    }
}

impl InterestRateScenario {
    /// Generate `projection_months` monthly curves after the starting curve
    ///
    /// `initial_curve` is the 10-point market curve at the start date. When
    /// `test_scenario` is set, `scenario_number` selects one of the 16
    /// deterministic shock patterns and `rng` is not used.
    pub fn generate<R: RandomSource + ?Sized>(
        scenario_number: i32,
        test_scenario: bool,
        initial_curve: &[f64; CURVE_POINTS],
        projection_months: usize,
        params: &ScenarioGeneratorParams,
        archive: Option<&HistoricalCurveArchive>,
        rng: &mut R,
    ) -> Result<Self> {
        let ip = &params.interest;
        let derived = params.derived()?;
        let months = projection_months as i32;

        let archive = match (ip.curve_interpolation, archive) {
            (CurveInterpolation::Historical, None) => {
                return Err(ScenarioError::InvalidConfig(
                    "historical curve interpolation needs a historical archive".to_string(),
                ))
            }
            (CurveInterpolation::Historical, Some(archive)) => Some(archive),
            (CurveInterpolation::NelsonSiegel, _) => None,
        };

        // Month 0: configured rates, fitted and then moved onto the starting curve
        let mut start = YieldCurveState::fitted(
            ip.initial_short_rate,
            ip.initial_long_rate,
            ip.initial_volatility.ln(),
        );
        let mut residual = [0.0; CURVE_POINTS];
        for (i, r) in residual.iter_mut().enumerate() {
            *r = initial_curve[i] - start.rate_at_index(i as i32 + 1);
        }
        start.perturb(&residual, 1.0);

        let mut shocks = BoundedTable::new(IndexRange::new(1, months), IndexRange::new(1, 3));
        if test_scenario {
            for m in 1..=months {
                let long = DeterministicShockTable::shock(scenario_number, m, ShockKind::LongRate)?;
                let spread = DeterministicShockTable::shock(scenario_number, m, ShockKind::RateSpread)?;
                shocks[(m, LONG_FACTOR)] = long;
                shocks[(m, SPREAD_FACTOR)] = long * ip.correl12 + spread * derived.const1;
                shocks[(m, VOL_FACTOR)] = 0.0;
            }
        } else {
            rng.reseed(interest_seed(scenario_number));
            for m in 1..=months {
                let z0 = inverse_normal(rng.next_uniform()?)?;
                let z1 = inverse_normal(rng.next_uniform()?)?;
                let z2 = inverse_normal(rng.next_uniform()?)?;

                // Volatility factor combines with the raw spread draw before the
                // spread draw is itself correlated with the long rate
                let vol = z0 * ip.correl13 + z1 * derived.const2 + z2 * derived.const3;
                let spread = z0 * ip.correl12 + z1 * derived.const1;

                shocks[(m, LONG_FACTOR)] = z0;
                shocks[(m, SPREAD_FACTOR)] = spread;
                shocks[(m, VOL_FACTOR)] = vol;
            }
        }

        let mut old_log_long = start.rate_at_index(LONG_INDEX).ln();
        let mut old_diff = start.rate_at_index(LONG_INDEX) - start.rate_at_index(SHORT_INDEX);
        let mut old_log_vol = start.log_volatility();

        let min_log_long = ip.min_long_rate.ln();
        let max_log_long = ip.max_long_rate.ln();
        let ln_tau1 = ip.tau1.ln();

        let mut curves = Vec::with_capacity(projection_months + 1);
        curves.push(start);

        for m in 1..=months {
            let new_log_vol =
                (1.0 - ip.beta3) * old_log_vol + derived.const4 + shocks[(m, VOL_FACTOR)] * ip.sigma3;

            let old_long = old_log_long.exp();

            // Soft cap and floor on the mean-reverting part, before the shock
            let reverted = (1.0 - ip.beta1) * old_log_long + derived.const5 + ip.psi * (ip.tau2 - old_diff);
            let new_log_long =
                reverted.min(max_log_long).max(min_log_long) + new_log_vol.exp() * shocks[(m, LONG_FACTOR)];
            let new_long = new_log_long.exp();

            let new_diff = (1.0 - ip.beta2) * old_diff
                + ip.beta2 * ip.tau2
                + ip.phi * (old_log_long - ln_tau1)
                + ip.sigma2 * shocks[(m, SPREAD_FACTOR)] * old_long.powf(ip.theta);
            let new_short = (new_long - new_diff).max(ip.min_short_rate);

            let mut curve = YieldCurveState::fitted(new_short, new_long, new_log_vol);
            if let Some(archive) = archive {
                curve.interpolate_historical(archive);
            }
            // Portion 0 after the first year still re-applies the rate floor
            curve.perturb(&residual, blend_portion(m));
            curves.push(curve);

            old_log_long = new_log_long;
            old_diff = new_diff;
            old_log_vol = new_log_vol;
        }

        log::debug!("generated interest rate scenario {} ({} months)", scenario_number, months);

        Ok(Self {
            scenario_number,
            curves: BoundedVec::from_vec(0, curves),
            shocks,
        })
    }

    pub fn scenario_number(&self) -> i32 {
        self.scenario_number
    }

    /// Number of generated months (excluding the starting curve)
    pub fn num_months(&self) -> i32 {
        self.curves.upper_bound()
    }

    /// Curve for month `month` in `0..=N`
    pub fn curve(&self, month: i32) -> &YieldCurveState {
        &self.curves[month]
    }

    /// `(month, curve)` pairs from month 0
    pub fn curves(&self) -> impl Iterator<Item = (i32, &YieldCurveState)> {
        self.curves.iter_indexed()
    }

    /// Correlated shock for `month` (1..=N) and factor (1 long, 2 spread, 3 volatility)
    pub fn shock(&self, month: i32, factor: i32) -> Result<f64> {
        self.shocks.get(month, factor).copied()
    }

    /// Square root of a 20-year-rate annuity factor over the first 30 years,
    /// used to rank scenarios when picking representative subsets
    pub fn significance(&self) -> f64 {
        let horizon = SIGNIFICANCE_MONTHS.min(self.num_months());
        let mut discount = 1.0;
        let mut annuity = 0.0;
        for m in 1..=horizon {
            let rate = self.curve(m).rate_at_maturity(20.0);
            discount *= (1.0 + rate / 2.0).powf(-1.0 / 6.0);
            annuity += discount;
        }
        annuity.sqrt()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::curves::dates::month_start;
    use crate::curves::RATE_FLOOR;
    use crate::rng::{CongruentialShuffle, StdRandom};
    use approx::assert_abs_diff_eq;

    const START_CURVE: [f64; CURVE_POINTS] = [0.0005, 0.0019, 0.0039, 0.0073, 0.0097, 0.0126, 0.0144, 0.0152, 0.0194, 0.0190];

    fn run(scenario: i32, test: bool, months: usize) -> InterestRateScenario {
        let params = ScenarioGeneratorParams::default_calibration();
        let mut rng = CongruentialShuffle::new();
        InterestRateScenario::generate(scenario, test, &START_CURVE, months, &params, None, &mut rng).unwrap()
    }

    #[test]
    fn test_starting_curve_matches_market() {
        let scenario = run(1, false, 24);
        assert_eq!(scenario.num_months(), 24);
        for i in 1..=CURVE_POINTS as i32 {
            assert_abs_diff_eq!(scenario.curve(0).rate_at_index(i), START_CURVE[(i - 1) as usize], epsilon = 1e-15);
        }
    }

    #[test]
    fn test_blend_portion_ramp() {
        assert_eq!(blend_portion(1), 1.0);
        assert_abs_diff_eq!(blend_portion(12), 1.0 / 12.0, epsilon = 1e-15);
        assert_eq!(blend_portion(13), 0.0);
    }

    #[test]
    fn test_same_seed_same_path() {
        let a = run(7, false, 120);
        let b = run(7, false, 120);
        for m in 0..=120 {
            assert_eq!(a.curve(m).rates(), b.curve(m).rates());
        }
        let c = run(8, false, 120);
        assert_ne!(a.curve(60).rates(), c.curve(60).rates());
    }

    #[test]
    fn test_rates_respect_floors() {
        let params = ScenarioGeneratorParams::default_calibration();
        for scenario in 1..=20 {
            let path = run(scenario, false, 360);
            for (_, curve) in path.curves() {
                assert!(curve.short_rate() >= params.interest.min_short_rate);
                assert!(curve.rates().iter().all(|r| *r >= RATE_FLOOR));
            }
        }
    }

    #[test]
    fn test_edited_correlations_reach_vol_shock() {
        let mut params = ScenarioGeneratorParams::default_calibration();
        params.interest.correl13 = 0.3;
        params.interest.correl23 = 0.2;
        let d = params.derived().unwrap();
        assert!(d.const3 < 1.0);

        let mut rng = StdRandom::new();
        let path = InterestRateScenario::generate(3, false, &START_CURVE, 1, &params, None, &mut rng).unwrap();

        let mut replay = StdRandom::new();
        replay.reseed(interest_seed(3));
        let z0 = inverse_normal(replay.next_uniform().unwrap()).unwrap();
        let z1 = inverse_normal(replay.next_uniform().unwrap()).unwrap();
        let z2 = inverse_normal(replay.next_uniform().unwrap()).unwrap();

        assert_eq!(path.shock(1, 1).unwrap(), z0);
        assert_abs_diff_eq!(path.shock(1, 2).unwrap(), z0 * -0.19197 + z1 * d.const1, epsilon = 1e-15);
        assert_abs_diff_eq!(path.shock(1, 3).unwrap(), z0 * 0.3 + z1 * d.const2 + z2 * d.const3, epsilon = 1e-15);
    }

    #[test]
    fn test_deterministic_base_scenario_is_rng_free() {
        let params = ScenarioGeneratorParams::default_calibration();
        // An unseeded generator fails if drawn from
        let mut rng = CongruentialShuffle::new();
        let path = InterestRateScenario::generate(9, true, &START_CURVE, 36, &params, None, &mut rng).unwrap();
        for m in 1..=36 {
            assert_eq!(path.shock(m, 1).unwrap(), 0.0);
            assert_eq!(path.shock(m, 2).unwrap(), 0.0);
        }
    }

    #[test]
    fn test_pop_up_raises_long_rate() {
        let up = run(1, true, 12);
        let down = run(3, true, 12);
        assert!(up.curve(12).long_rate() > down.curve(12).long_rate());
        assert_abs_diff_eq!(up.shock(1, 1).unwrap(), 1.282, epsilon = 1e-15);
    }

    #[test]
    fn test_invalid_test_scenario_propagates() {
        let params = ScenarioGeneratorParams::default_calibration();
        let mut rng = CongruentialShuffle::new();
        let result = InterestRateScenario::generate(17, true, &START_CURVE, 12, &params, None, &mut rng);
        assert!(matches!(result, Err(ScenarioError::InvalidTestScenario(17))));
    }

    #[test]
    fn test_historical_interpolation_requires_archive() {
        let mut params = ScenarioGeneratorParams::default_calibration();
        params.interest.curve_interpolation = CurveInterpolation::Historical;
        let mut rng = CongruentialShuffle::new();
        assert!(InterestRateScenario::generate(1, false, &START_CURVE, 12, &params, None, &mut rng).is_err());

        let archive = HistoricalCurveArchive::from_curves(
            month_start(2021, 12).unwrap(),
            vec![START_CURVE, [0.02, 0.021, 0.023, 0.026, 0.028, 0.031, 0.033, 0.035, 0.038, 0.037]],
        )
        .unwrap();
        let path = InterestRateScenario::generate(1, false, &START_CURVE, 24, &params, Some(&archive), &mut rng).unwrap();
        assert_eq!(path.num_months(), 24);
    }

    #[test]
    fn test_significance() {
        let path = run(2, false, 12);
        let mut v = 1.0;
        let mut s = 0.0;
        for m in 1..=12 {
            v *= (1.0 + path.curve(m).rate_at_maturity(20.0) / 2.0).powf(-1.0 / 6.0);
            s += v;
        }
        assert_abs_diff_eq!(path.significance(), s.sqrt(), epsilon = 1e-15);
        assert!(path.significance() < 12.0_f64.sqrt());
    }
}
