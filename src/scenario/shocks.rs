//! Deterministic shocks for the 16 Stochastic Exclusion Test scenarios
//!
//! Each test scenario replaces the random draws with a closed-form shock
//! sequence: pop-up/pop-down, 60-month up-down cycles, a 240-month ramp, and
//! delayed, more severe variants of the pop patterns.

use crate::error::{Result, ScenarioError};

/// Number of deterministic test scenarios
pub const TEST_SCENARIO_COUNT: i32 = 16;

/// 90th percentile of the standard normal, as used by the test definitions
const PCT_90: f64 = 1.282;

/// Severity multiplier of the delayed pop scenarios
const DELAYED_SEVERITY: f64 = 1.414;

/// Which of the three driving shocks is requested
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShockKind {
    /// Shock to the long (20-year) rate
    LongRate,
    /// Shock to the long/short spread
    RateSpread,
    /// Shock to equity returns
    Equity,
}

/// Closed-form shock table
pub struct DeterministicShockTable;

/// `true` when `n` is odd
fn is_odd(n: i32) -> bool {
    n.rem_euclid(2) == 1
}

/// Shock whose cumulative sum is `1.282 * sqrt(month)`
fn pop(month: i32) -> f64 {
    PCT_90 * ((month as f64).sqrt() - ((month - 1) as f64).sqrt())
}

/// `value`, sign-flipped in every odd block of `period` months
fn cycle(value: f64, month: i32, period: i32) -> f64 {
    if is_odd((month - 1) / period) {
        -value
    } else {
        value
    }
}

/// `-1/sqrt(240)` for the first 20 years, then flat
fn ramp(month: i32) -> f64 {
    if month < 241 {
        -1.0 / 240.0_f64.sqrt()
    } else {
        0.0
    }
}

impl DeterministicShockTable {
    /// Shock for `scenario` (1..=16) in projection month `month` (>= 1)
    pub fn shock(scenario: i32, month: i32, kind: ShockKind) -> Result<f64> {
        if !(1..=TEST_SCENARIO_COUNT).contains(&scenario) {
            return Err(ScenarioError::InvalidTestScenario(scenario));
        }
        if month < 1 {
            return Err(ScenarioError::InvalidTestMonth(month));
        }

        Ok(match kind {
            ShockKind::LongRate => Self::long_rate(scenario, month),
            ShockKind::RateSpread => Self::rate_spread(scenario, month),
            ShockKind::Equity => Self::equity(scenario, month),
        })
    }

    fn long_rate(scenario: i32, month: i32) -> f64 {
        match scenario {
            1 | 2 => pop(month),
            3 | 4 => -pop(month),
            5 | 6 => cycle(PCT_90 / 60.0_f64.sqrt(), month, 60),
            7 | 8 => cycle(-PCT_90 / 60.0_f64.sqrt(), month, 60),
            12 => ramp(month),
            13 | 14 => Self::delayed(1, month),
            15 | 16 => Self::delayed(3, month),
            _ => 0.0,
        }
    }

    /// Quiet for 10 years, a more severe copy of `base` for the next 10, then `base`
    fn delayed(base: i32, month: i32) -> f64 {
        if month < 121 {
            0.0
        } else if month < 241 {
            DELAYED_SEVERITY * Self::long_rate(base, month - 120)
        } else {
            Self::long_rate(base, month)
        }
    }

    /// Equal and opposite to the long-rate shock, except the volatile-slope
    /// scenario (10) which cycles every 36 months
    fn rate_spread(scenario: i32, month: i32) -> f64 {
        if scenario == 10 {
            cycle(-2.0 / 24.0_f64.sqrt(), month, 36)
        } else {
            -Self::long_rate(scenario, month)
        }
    }

    fn equity(scenario: i32, month: i32) -> f64 {
        match scenario {
            1 | 3 | 5 | 7 => pop(month),
            2 | 4 | 6 | 8 => -pop(month),
            11 => cycle(-1.0 / 12.0_f64.sqrt(), month, 24),
            12 => ramp(month),
            13 | 15 => Self::long_rate(13, month),
            14 | 16 => -Self::long_rate(13, month),
            _ => 0.0,
        }
    }
}
