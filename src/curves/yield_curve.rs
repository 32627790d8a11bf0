//! One projection month's 10-point yield curve
//!
//! A curve is built from a generated (short, long) pair via a two-point
//! Nelson-Siegel fit, optionally reshaped from the best-fitting historical
//! curve, and then perturbed toward the starting curve during the first year.
//! Spot rates are bootstrapped on demand and cached.

use std::cell::OnceCell;

use serde::{Deserialize, Serialize};

use super::history::{FitMethod, HistoricalCurveArchive};
use super::{maturity_at, CURVE_POINTS, LONG_INDEX, MATURITIES, MID_INDEX, SHORT_INDEX};
use crate::bounded::{BoundedVec, IndexRange};

/// Minimum rate anywhere on a curve (1 basis point)
pub const RATE_FLOOR: f64 = 0.0001;

/// Nelson-Siegel decay constant
const NS_DECAY: f64 = 0.4;

/// Maturity of the generated short rate (years)
const NS_SHORT_MATURITY: f64 = 1.0;

/// Maturity of the generated long rate (years)
const NS_LONG_MATURITY: f64 = 20.0;

/// Half-year bond points used by the spot bootstrap (0.25y, then 0.5y..30y)
const BOND_POINTS: i32 = 60;

/// How the 10 anchor points are derived from the generated short/long pair
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CurveInterpolation {
    /// Two-point Nelson-Siegel fit
    #[default]
    NelsonSiegel,
    /// Rescaled shape of the closest historical curve
    Historical,
}

/// Interpolated curve for one month
#[derive(Debug, Clone)]
pub struct YieldCurveState {
    /// Anchor rates, 1-based over the 10 maturities
    rates: BoundedVec<f64>,
    short_rate: f64,
    long_rate: f64,
    log_volatility: f64,
    spot_rates: OnceCell<BoundedVec<f64>>,
}

fn anchor_range() -> IndexRange {
    IndexRange::new(1, CURVE_POINTS as i32)
}

fn ns_loading(t: f64) -> f64 {
    (1.0 - (-NS_DECAY * t).exp()) / (NS_DECAY * t)
}

impl YieldCurveState {
    /// Floor the generated rates and fit the Nelson-Siegel curve through them
    ///
    /// Every anchor point of the result is at least [`RATE_FLOOR`].
    pub fn initialize(short_rate: f64, long_rate: f64, log_volatility: f64) -> Self {
        let mut curve = Self::fitted(short_rate, long_rate, log_volatility);
        curve.apply_floor();
        curve
    }

    /// Nelson-Siegel fit whose extrapolated points are not yet floored
    ///
    /// The rate recursion perturbs this curve before flooring, so the starting
    /// residual is applied to the raw fit.
    pub(crate) fn fitted(short_rate: f64, long_rate: f64, log_volatility: f64) -> Self {
        let mut curve = Self {
            rates: BoundedVec::new(anchor_range()),
            short_rate: short_rate.max(RATE_FLOOR),
            long_rate: long_rate.max(RATE_FLOOR),
            log_volatility,
            spot_rates: OnceCell::new(),
        };
        curve.fit_nelson_siegel();
        curve
    }

    /// Refit the anchors through the 1y and 20y rates and floor them
    pub fn interpolate_nelson_siegel(&mut self) {
        self.fit_nelson_siegel();
        self.apply_floor();
    }

    /// `r(t) = b0 + b1 * (1 - e^{-kt}) / (kt)` through the 1y and 20y rates
    fn fit_nelson_siegel(&mut self) {
        let r1 = self.short_rate;
        let r20 = self.long_rate;

        let const1 = ns_loading(NS_SHORT_MATURITY);
        let const20 = ns_loading(NS_LONG_MATURITY);

        let b1 = (r1 - r20) / (const1 - const20);
        let b0 = r1 - b1 * const1;

        for i in 1..=CURVE_POINTS as i32 {
            self.rates[i] = b0 + b1 * ns_loading(maturity_at(i));
        }
        self.spot_rates = OnceCell::new();
    }

    fn apply_floor(&mut self) {
        for i in 1..=CURVE_POINTS as i32 {
            self.rates[i] = self.rates[i].max(RATE_FLOOR);
        }
        self.spot_rates = OnceCell::new();
    }

    /// Replace the anchor points with the closest historical curve, rescaled so
    /// its 1-year and 20-year points hit the generated rates
    pub fn interpolate_historical(&mut self, archive: &HistoricalCurveArchive) {
        let fit = archive.best_fitting_curve(
            self.short_rate,
            self.rates[MID_INDEX],
            self.long_rate,
            FitMethod::SumOfSquares,
        );

        let hist = |i: i32| archive.rate_by_index(fit.index, i);
        let short_ratio = self.short_rate / hist(SHORT_INDEX).max(RATE_FLOOR);
        let long_ratio = self.long_rate / hist(LONG_INDEX).max(RATE_FLOOR);
        let span = maturity_at(LONG_INDEX) - maturity_at(SHORT_INDEX);

        for i in 1..=SHORT_INDEX {
            self.rates[i] = hist(i) * short_ratio;
        }
        for i in (SHORT_INDEX + 1)..LONG_INDEX {
            let weight = (maturity_at(i) - maturity_at(SHORT_INDEX)) / span;
            self.rates[i] = hist(i) * (short_ratio + (long_ratio - short_ratio) * weight);
        }
        for i in LONG_INDEX..=CURVE_POINTS as i32 {
            self.rates[i] = hist(i) * long_ratio;
        }

        self.apply_floor();
    }

    /// Add `portion * adjustment[i]` to every anchor, then re-apply the floor
    pub fn perturb(&mut self, adjustment: &[f64; CURVE_POINTS], portion: f64) {
        for (i, adj) in adjustment.iter().enumerate() {
            let idx = i as i32 + 1;
            self.rates[idx] = (self.rates[idx] + portion * adj).max(RATE_FLOOR);
        }
        self.spot_rates = OnceCell::new();
    }

    /// Floored generated short rate
    pub fn short_rate(&self) -> f64 {
        self.short_rate
    }

    /// Floored generated long rate
    pub fn long_rate(&self) -> f64 {
        self.long_rate
    }

    pub fn log_volatility(&self) -> f64 {
        self.log_volatility
    }

    /// Anchor rate at a 1-based index
    pub fn rate_at_index(&self, index: i32) -> f64 {
        self.rates[index]
    }

    /// All 10 anchor rates in maturity order
    pub fn rates(&self) -> [f64; CURVE_POINTS] {
        let mut out = [0.0; CURVE_POINTS];
        out.copy_from_slice(self.rates.as_slice());
        out
    }

    /// Linear interpolation between anchors, flat beyond either end
    pub fn rate_at_maturity(&self, years: f64) -> f64 {
        if years < MATURITIES[0] {
            return self.rates[1];
        }

        for i in 2..=CURVE_POINTS as i32 {
            let upper = maturity_at(i);
            if years < upper {
                let lower = maturity_at(i - 1);
                let lo_rate = self.rates[i - 1];
                return lo_rate + ((years - lower) / (upper - lower)) * (self.rates[i] - lo_rate);
            }
        }

        self.rates[CURVE_POINTS as i32]
    }

    /// Annual-effective spot rate at a 1-based anchor index
    pub fn spot_rate_at_index(&self, index: i32) -> f64 {
        self.spot_rates()[index]
    }

    /// Annual-effective spot rates at the 10 anchors, bootstrapped on first use
    pub fn spot_rates(&self) -> &BoundedVec<f64> {
        self.spot_rates.get_or_init(|| self.bootstrap_spot_rates())
    }

    fn bootstrap_spot_rates(&self) -> BoundedVec<f64> {
        let r = &self.rates;
        let mut b: BoundedVec<f64> = BoundedVec::new(IndexRange::new(0, BOND_POINTS));
        let mut s: BoundedVec<f64> = BoundedVec::new(IndexRange::new(0, BOND_POINTS));

        // Bond curve at 0.25y, then every half year out to 30y
        b[0] = r[1];
        b[1] = r[2];
        b[2] = r[3];
        b[3] = 0.5 * (r[3] + r[4]);
        b[4] = r[4];
        b[5] = 0.5 * (r[4] + r[5]);
        b[6] = r[5];
        for i in 1..=4 {
            b[6 + i] = r[5] + i as f64 * 0.25 * (r[6] - r[5]);
            b[10 + i] = r[6] + i as f64 * 0.25 * (r[7] - r[6]);
        }
        for i in 1..=6 {
            b[14 + i] = r[7] + (i as f64 / 6.0) * (r[8] - r[7]);
        }
        for i in 1..=20 {
            b[20 + i] = r[8] + (i as f64 / 20.0) * (r[9] - r[8]);
            b[40 + i] = r[9] + (i as f64 / 20.0) * (r[10] - r[9]);
        }

        // Bond-equivalent to half-year rates
        for i in 0..=BOND_POINTS {
            b[i] /= 2.0;
        }

        s[0] = b[0];
        s[1] = b[1];
        let mut annuity_factor = 1.0 / (1.0 + s[1]);
        for i in 2..=BOND_POINTS {
            let pv_factor = (1.0 - b[i] * annuity_factor) / (1.0 + b[i]);
            if pv_factor > 0.0 {
                s[i] = (1.0 / pv_factor).powf(1.0 / i as f64) - 1.0;
            } else {
                log::warn!("non-positive discount factor at half-year {}; carrying spot rate forward", i);
                s[i] = s[i - 1];
            }
            annuity_factor += pv_factor;
        }

        // Annual-effective (not bond-equivalent) at the 10 anchors
        let mut spots = BoundedVec::new(anchor_range());
        for (anchor, half_years) in [0, 1, 2, 4, 6, 10, 14, 20, 40, 60].iter().enumerate() {
            spots[anchor as i32 + 1] = (1.0 + s[*half_years]).powi(2) - 1.0;
        }
        spots
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::curves::dates::month_start;
    use approx::assert_abs_diff_eq;

    #[test]
    fn test_nelson_siegel_hits_generated_points() {
        let curve = YieldCurveState::initialize(0.02, 0.045, -3.0);
        assert_abs_diff_eq!(curve.rate_at_index(SHORT_INDEX), 0.02, epsilon = 1e-14);
        assert_abs_diff_eq!(curve.rate_at_index(LONG_INDEX), 0.045, epsilon = 1e-14);
        // Upward sloping fit is monotone across the anchors
        let rates = curve.rates();
        assert!(rates.windows(2).all(|w| w[0] <= w[1]));
        assert_eq!(curve.log_volatility(), -3.0);
    }

    #[test]
    fn test_initialize_floors_rates() {
        let curve = YieldCurveState::initialize(-0.01, 0.0, 0.0);
        assert_eq!(curve.short_rate(), RATE_FLOOR);
        assert_eq!(curve.long_rate(), RATE_FLOOR);
        for rate in curve.rates() {
            assert_abs_diff_eq!(rate, RATE_FLOOR, epsilon = 1e-15);
        }
    }

    #[test]
    fn test_inverted_pair_stays_above_floor() {
        let curve = YieldCurveState::initialize(0.03, 0.0001, 0.0);
        assert!(curve.rates().iter().all(|r| *r >= RATE_FLOOR));
        assert_eq!(curve.rate_at_maturity(30.0), RATE_FLOOR);
        assert_abs_diff_eq!(curve.rate_at_index(SHORT_INDEX), 0.03, epsilon = 1e-14);

        // The raw fit extrapolates below the floor at the long end
        let raw = YieldCurveState::fitted(0.03, 0.0001, 0.0);
        assert!(raw.rate_at_index(10) < 0.0);
        let mut refit = raw.clone();
        refit.interpolate_nelson_siegel();
        assert_eq!(refit.rates(), curve.rates());
    }

    #[test]
    fn test_perturb_blends_and_floors() {
        let mut curve = YieldCurveState::initialize(0.02, 0.03, 0.0);
        let before = curve.rates();
        let mut adj = [0.001; CURVE_POINTS];
        adj[0] = -1.0;
        curve.perturb(&adj, 0.5);
        assert_eq!(curve.rate_at_index(1), RATE_FLOOR);
        assert_abs_diff_eq!(curve.rate_at_index(5), before[4] + 0.0005, epsilon = 1e-15);

        let after = curve.rates();
        curve.perturb(&adj, 0.0);
        assert_eq!(curve.rates(), after);
    }

    #[test]
    fn test_rate_at_maturity_continuous_at_anchors() {
        let curve = YieldCurveState::initialize(0.015, 0.05, 0.0);
        for i in 1..=CURVE_POINTS as i32 {
            let m = maturity_at(i);
            let anchor = curve.rate_at_index(i);
            assert_abs_diff_eq!(curve.rate_at_maturity(m), anchor, epsilon = 1e-15);
            assert_abs_diff_eq!(curve.rate_at_maturity(m - 1e-9), anchor, epsilon = 1e-9);
            assert_abs_diff_eq!(curve.rate_at_maturity(m + 1e-9), anchor, epsilon = 1e-9);
        }
    }

    #[test]
    fn test_rate_at_maturity_flat_extrapolation_and_floor() {
        let mut curve = YieldCurveState::initialize(0.03, 0.01, 0.0);
        curve.perturb(&[-0.05; CURVE_POINTS], 1.0);
        assert_eq!(curve.rate_at_maturity(0.0), curve.rate_at_index(1));
        assert_eq!(curve.rate_at_maturity(50.0), curve.rate_at_index(10));
        let mut t = 0.0;
        while t < 35.0 {
            assert!(curve.rate_at_maturity(t) >= RATE_FLOOR);
            t += 0.1;
        }
    }

    #[test]
    fn test_midpoint_interpolation() {
        let curve = YieldCurveState::initialize(0.02, 0.04, 0.0);
        let mid = curve.rate_at_maturity(15.0);
        let expected = 0.5 * (curve.rate_at_index(8) + curve.rate_at_index(9));
        assert_abs_diff_eq!(mid, expected, epsilon = 1e-15);
    }

    #[test]
    fn test_flat_curve_spot_rates() {
        // A flat 4% bond-equivalent curve bootstraps to a flat 4% semiannual spot
        let mut curve = YieldCurveState::initialize(0.04, 0.04, 0.0);
        let flat = curve.rates();
        curve.perturb(&flat.map(|r| 0.04 - r), 1.0);
        let annual = 1.02_f64.powi(2) - 1.0;
        for i in 1..=CURVE_POINTS as i32 {
            assert_abs_diff_eq!(curve.spot_rate_at_index(i), annual, epsilon = 1e-12);
        }
    }

    #[test]
    fn test_spot_cache_invalidated_by_perturb() {
        let mut curve = YieldCurveState::initialize(0.02, 0.04, 0.0);
        let before = curve.spot_rate_at_index(10);
        curve.perturb(&[0.01; CURVE_POINTS], 1.0);
        assert!(curve.spot_rate_at_index(10) > before);
    }

    #[test]
    fn test_historical_interpolation_rescales_shape() {
        let curves = vec![
            [0.010, 0.011, 0.012, 0.014, 0.016, 0.019, 0.021, 0.023, 0.026, 0.027],
            [0.040, 0.041, 0.042, 0.044, 0.046, 0.049, 0.051, 0.053, 0.056, 0.057],
        ];
        let archive = HistoricalCurveArchive::from_curves(month_start(1990, 1).unwrap(), curves).unwrap();

        let mut curve = YieldCurveState::initialize(0.024, 0.052, 0.0);
        curve.interpolate_historical(&archive);

        assert_abs_diff_eq!(curve.rate_at_index(SHORT_INDEX), 0.024, epsilon = 1e-15);
        assert_abs_diff_eq!(curve.rate_at_index(LONG_INDEX), 0.052, epsilon = 1e-15);
        // Second curve is closer on all three fit points; 0.25y uses its short ratio
        assert_abs_diff_eq!(curve.rate_at_index(1), 0.040 * 0.024 / 0.042, epsilon = 1e-15);
        assert_abs_diff_eq!(curve.rate_at_index(10), 0.057 * 0.052 / 0.056, epsilon = 1e-15);
    }
}
