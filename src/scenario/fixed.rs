//! Fixed-income fund returns driven by yield-curve changes

use crate::curves::YieldCurveState;
use crate::params::FixedFundParams;

/// Monthly return generator for one fixed-income fund class
#[derive(Debug, Clone)]
pub struct FixedIncomeReturnModel {
    params: FixedFundParams,
}

impl FixedIncomeReturnModel {
    pub fn new(params: &FixedFundParams) -> Self {
        Self { params: params.clone() }
    }

    pub fn maturity(&self) -> f64 {
        self.params.maturity
    }

    /// Income on the prior yield plus spread, price change from the yield move,
    /// and a shock scaled by the square root of the prior yield
    pub fn next_return(&self, previous: &YieldCurveState, current: &YieldCurveState, shock: f64) -> f64 {
        let p = &self.params;
        let prev_rate = previous.rate_at_maturity(p.maturity);
        let curr_rate = current.rate_at_maturity(p.maturity);

        p.monthly_factor * (prev_rate + p.monthly_spread)
            + p.duration * (prev_rate - curr_rate)
            + shock * prev_rate.sqrt() * p.volatility
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    fn flat(rate: f64) -> YieldCurveState {
        let mut curve = YieldCurveState::initialize(rate, rate, 0.0);
        let fitted = curve.rates();
        curve.perturb(&fitted.map(|r| rate - r), 1.0);
        curve
    }

    fn govt() -> FixedFundParams {
        FixedFundParams {
            maturity: 5.0,
            monthly_factor: 1.0 / 12.0,
            monthly_spread: 0.002,
            duration: 4.5,
            volatility: 0.01,
        }
    }

    #[test]
    fn test_unchanged_curve_earns_income() {
        let model = FixedIncomeReturnModel::new(&govt());
        let curve = flat(0.04);
        assert_abs_diff_eq!(model.next_return(&curve, &curve, 0.0), (0.04 + 0.002) / 12.0, epsilon = 1e-15);
    }

    #[test]
    fn test_rising_rates_lose_duration() {
        let model = FixedIncomeReturnModel::new(&govt());
        let r = model.next_return(&flat(0.04), &flat(0.05), 0.0);
        assert_abs_diff_eq!(r, 0.042 / 12.0 - 4.5 * 0.01, epsilon = 1e-15);
    }

    #[test]
    fn test_shock_scales_with_root_rate() {
        let model = FixedIncomeReturnModel::new(&govt());
        let curve = flat(0.04);
        let base = model.next_return(&curve, &curve, 0.0);
        let shocked = model.next_return(&curve, &curve, 2.0);
        assert_abs_diff_eq!(shocked - base, 2.0 * 0.2 * 0.01, epsilon = 1e-15);
    }
}
