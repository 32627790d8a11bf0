//! Stochastic-volatility equity fund returns

use crate::params::EquityFundParams;

/// Monthly return generator for one equity fund class
///
/// The only mutable state is the current annualized volatility; a fresh
/// model is built for each scenario so every scenario starts from the
/// configured starting volatility.
#[derive(Debug, Clone)]
pub struct EquityReturnModel {
    params: EquityFundParams,
    current_vol: f64,
}

impl EquityReturnModel {
    pub fn new(params: &EquityFundParams) -> Self {
        Self {
            current_vol: params.current_vol,
            params: params.clone(),
        }
    }

    /// Annualized volatility after the most recent step
    pub fn current_vol(&self) -> f64 {
        self.current_vol
    }

    /// Evolve volatility by one month and return the simple monthly return
    pub fn next_return(&mut self, return_shock: f64, vol_shock: f64) -> f64 {
        let p = &self.params;

        // Mean-revert log volatility, cap, then shock
        let log_vol = (1.0 - p.mean_rev_strength) * self.current_vol.ln() + p.mean_rev_strength * p.target_vol.ln();
        let capped = log_vol.exp().min(p.max_vol_before);
        let shocked = (capped.ln() + vol_shock * p.vol_std_dev).exp();
        self.current_vol = shocked.max(p.min_vol).min(p.max_vol_after);

        let vol = self.current_vol;
        let mean_log_return = p.a + p.b * vol + p.c * vol * vol;
        let log_return = mean_log_return / 12.0 + return_shock * vol / 12.0_f64.sqrt();

        log_return.exp() - 1.0
    }

    /// Deterministic test-scenario return: monthly median plus a scaled shock
    pub fn next_return_deterministic(&self, return_shock: f64) -> f64 {
        let p = &self.params;
        ((1.0 + p.set_median_return).powf(1.0 / 12.0) - 1.0) + return_shock * p.set_volatility / 12.0_f64.sqrt()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::params::ScenarioGeneratorParams;
    use approx::assert_abs_diff_eq;

    #[test]
    fn test_zero_drift_return_is_scaled_shock() {
        let mut params = ScenarioGeneratorParams::default_calibration().diversified;
        params.a = 0.0;
        params.b = 0.0;
        params.c = 0.0;
        params.mean_rev_strength = 0.0;
        params.current_vol = 0.16;

        let mut model = EquityReturnModel::new(&params);
        let r = model.next_return(0.8, 0.0);
        assert_abs_diff_eq!(r, (0.8 * 0.16 / 12.0_f64.sqrt()).exp() - 1.0, epsilon = 1e-15);
        assert_abs_diff_eq!(model.current_vol(), 0.16, epsilon = 1e-15);
    }

    #[test]
    fn test_volatility_clamped() {
        let params = ScenarioGeneratorParams::default_calibration().aggressive;

        let mut model = EquityReturnModel::new(&params);
        model.next_return(0.0, 50.0);
        assert_eq!(model.current_vol(), params.max_vol_after);

        let mut model = EquityReturnModel::new(&params);
        model.next_return(0.0, -50.0);
        assert_eq!(model.current_vol(), params.min_vol);
    }

    #[test]
    fn test_volatility_reverts_toward_target() {
        let mut params = ScenarioGeneratorParams::default_calibration().international;
        params.current_vol = 0.28;
        let mut model = EquityReturnModel::new(&params);
        for _ in 0..24 {
            model.next_return(0.0, 0.0);
        }
        assert!(model.current_vol() < 0.28 && model.current_vol() > params.target_vol);
    }

    #[test]
    fn test_deterministic_return() {
        let params = ScenarioGeneratorParams::default_calibration().diversified;
        let model = EquityReturnModel::new(&params);
        let median_monthly = (1.0 + params.set_median_return).powf(1.0 / 12.0) - 1.0;
        assert_abs_diff_eq!(model.next_return_deterministic(0.0), median_monthly, epsilon = 1e-15);
        assert_abs_diff_eq!(
            model.next_return_deterministic(1.282),
            median_monthly + 1.282 * params.set_volatility / 12.0_f64.sqrt(),
            epsilon = 1e-15
        );
    }

    #[test]
    fn test_returns_exceed_minus_one() {
        let params = ScenarioGeneratorParams::default_calibration().aggressive;
        let mut model = EquityReturnModel::new(&params);
        for shock in [-8.0, -3.0, 0.0, 3.0] {
            assert!(model.next_return(shock, shock) > -1.0);
        }
    }
}
