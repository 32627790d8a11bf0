//! Fund wealth-factor table for one scenario
//!
//! Nine series are produced per month: four stochastic-volatility equity
//! funds, three fixed-income funds priced off the interest-rate scenario, and
//! two blends of those. Every series starts at a wealth factor of 1.0.

use std::fmt;
use std::str::FromStr;

use crate::bounded::{BoundedTable, IndexRange};
use crate::error::{Result, ScenarioError};
use crate::math::{inverse_normal, Correlator};
use crate::params::{ScenarioGeneratorParams, FUND_SHOCK_VARIABLES};
use crate::rng::{fund_seed, RandomSource};

use super::equity::EquityReturnModel;
use super::fixed::FixedIncomeReturnModel;
use super::interest::InterestRateScenario;
use super::shocks::{DeterministicShockTable, ShockKind};

/// Number of wealth-factor series
pub const FUND_COUNT: usize = 9;

/// Fixed-fund weight on intermediate government in the blended fixed series
const BLEND_FIXED_GOVT: f64 = 0.65;
const BLEND_FIXED_CORP: f64 = 0.35;
/// Equity weight on US diversified in the balanced series
const BALANCED_EQUITY: f64 = 0.6;
const BALANCED_FIXED: f64 = 0.4;

/// Fund classes, in wealth-table row order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum FundType {
    UsDiversified,
    International,
    Intermediate,
    Aggressive,
    MoneyMarket,
    MediumGovernment,
    LongCorporate,
    /// 65% medium government, 35% long corporate
    BlendedFixed,
    /// 60% US diversified, 40% blended fixed
    Balanced,
}

impl FundType {
    pub const ALL: [FundType; FUND_COUNT] = [
        FundType::UsDiversified,
        FundType::International,
        FundType::Intermediate,
        FundType::Aggressive,
        FundType::MoneyMarket,
        FundType::MediumGovernment,
        FundType::LongCorporate,
        FundType::BlendedFixed,
        FundType::Balanced,
    ];

    /// Funds written to scenario files
    pub const PUBLISHED: [FundType; 7] = [
        FundType::UsDiversified,
        FundType::International,
        FundType::Intermediate,
        FundType::Aggressive,
        FundType::MoneyMarket,
        FundType::MediumGovernment,
        FundType::LongCorporate,
    ];

    pub const EQUITY: [FundType; 4] = [
        FundType::UsDiversified,
        FundType::International,
        FundType::Intermediate,
        FundType::Aggressive,
    ];

    /// Row of this fund in the wealth table
    pub fn row(self) -> i32 {
        self as i32
    }

    /// Label used in scenario files
    pub fn label(self) -> &'static str {
        match self {
            FundType::UsDiversified => "USDiversified",
            FundType::International => "International",
            FundType::Intermediate => "Intermediate",
            FundType::Aggressive => "Aggressive",
            FundType::MoneyMarket => "MoneyMkt",
            FundType::MediumGovernment => "MedGovt",
            FundType::LongCorporate => "LongCorp",
            FundType::BlendedFixed => "BlendedFixed",
            FundType::Balanced => "Balanced",
        }
    }

    /// Correlated shock variable for the return of an equity or fixed fund
    pub fn return_variable(self) -> Option<usize> {
        match self {
            FundType::UsDiversified => Some(1),
            FundType::International => Some(3),
            FundType::Intermediate => Some(5),
            FundType::Aggressive => Some(7),
            FundType::MoneyMarket => Some(8),
            FundType::MediumGovernment => Some(9),
            FundType::LongCorporate => Some(10),
            FundType::BlendedFixed | FundType::Balanced => None,
        }
    }

    /// Correlated shock variable for the volatility of an equity fund
    pub fn volatility_variable(self) -> Option<usize> {
        match self {
            FundType::UsDiversified => Some(0),
            FundType::International => Some(2),
            FundType::Intermediate => Some(4),
            FundType::Aggressive => Some(6),
            _ => None,
        }
    }
}

impl fmt::Display for FundType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for FundType {
    type Err = ScenarioError;

    fn from_str(s: &str) -> Result<Self> {
        FundType::ALL
            .iter()
            .copied()
            .find(|fund| fund.label() == s)
            .ok_or_else(|| ScenarioError::UnknownFund(s.to_string()))
    }
}

/// Monthly returns and cumulative wealth factors of all nine funds
#[derive(Debug, Clone)]
pub struct FundScenario {
    scenario_number: i32,
    /// Fund row (0..=8) by month (0..=N), column 0 fixed at 1.0
    wealth: BoundedTable<f64>,
    correlator: Correlator,
}

impl FundScenario {
    /// Generate the wealth table against an already generated rate path
    pub fn generate<R: RandomSource + ?Sized>(
        scenario_number: i32,
        rates: &InterestRateScenario,
        test_scenario: bool,
        params: &ScenarioGeneratorParams,
        rng: &mut R,
    ) -> Result<Self> {
        let months = rates.num_months();
        let mut correlator = Correlator::setup(FUND_SHOCK_VARIABLES, months as usize, &params.fund_correlations)?;

        if !test_scenario {
            rng.reseed(fund_seed(scenario_number));
            for obs in 0..months as usize {
                for var in 0..FUND_SHOCK_VARIABLES {
                    correlator.set_random(var, obs, inverse_normal(rng.next_uniform()?)?);
                }
            }
            correlator.correlate();
        }

        let mut equity = [
            EquityReturnModel::new(&params.diversified),
            EquityReturnModel::new(&params.international),
            EquityReturnModel::new(&params.intermediate),
            EquityReturnModel::new(&params.aggressive),
        ];
        let fixed = [
            (FundType::MoneyMarket, FixedIncomeReturnModel::new(&params.money_market)),
            (FundType::MediumGovernment, FixedIncomeReturnModel::new(&params.intermediate_government)),
            (FundType::LongCorporate, FixedIncomeReturnModel::new(&params.long_corporate)),
        ];

        let mut wealth = BoundedTable::filled(
            IndexRange::zero_based(FUND_COUNT),
            IndexRange::new(0, months),
            1.0,
        );
        let mut period = [0.0; FUND_COUNT];

        for m in 1..=months {
            let obs = (m - 1) as usize;
            let shock = |var: Option<usize>| var.map_or(0.0, |v| correlator.correlated(v, obs));

            let equity_shock = if test_scenario {
                DeterministicShockTable::shock(scenario_number, m, ShockKind::Equity)?
            } else {
                0.0
            };

            for (fund, model) in FundType::EQUITY.iter().zip(equity.iter_mut()) {
                period[fund.row() as usize] = if test_scenario {
                    model.next_return_deterministic(equity_shock)
                } else {
                    model.next_return(shock(fund.return_variable()), shock(fund.volatility_variable()))
                };
            }

            let previous = rates.curve(m - 1);
            let current = rates.curve(m);
            for (fund, model) in fixed.iter() {
                let fixed_shock = if test_scenario { 0.0 } else { shock(fund.return_variable()) };
                period[fund.row() as usize] = model.next_return(previous, current, fixed_shock);
            }

            let blended = BLEND_FIXED_GOVT * period[FundType::MediumGovernment.row() as usize]
                + BLEND_FIXED_CORP * period[FundType::LongCorporate.row() as usize];
            period[FundType::BlendedFixed.row() as usize] = blended;
            period[FundType::Balanced.row() as usize] =
                BALANCED_EQUITY * period[FundType::UsDiversified.row() as usize] + BALANCED_FIXED * blended;

            for (row, r) in period.iter().enumerate() {
                let row = row as i32;
                wealth[(row, m)] = wealth[(row, m - 1)] * (1.0 + r);
            }
        }

        log::debug!("generated fund scenario {} ({} months)", scenario_number, months);

        Ok(Self {
            scenario_number,
            wealth,
            correlator,
        })
    }

    pub fn scenario_number(&self) -> i32 {
        self.scenario_number
    }

    pub fn num_months(&self) -> i32 {
        self.wealth.y_range().hi
    }

    /// Cumulative wealth factor at `month` (0..=N)
    pub fn wealth_factor(&self, month: i32, fund: FundType) -> f64 {
        self.wealth[(fund.row(), month)]
    }

    /// Return over month `month` (1..=N)
    pub fn total_return(&self, month: i32, fund: FundType) -> f64 {
        self.wealth[(fund.row(), month)] / self.wealth[(fund.row(), month - 1)] - 1.0
    }

    /// Monthly returns for months 1..=N
    pub fn total_returns(&self, fund: FundType) -> Vec<f64> {
        (1..=self.num_months()).map(|m| self.total_return(m, fund)).collect()
    }

    /// Correlated draw used for `month` (1..=N) and shock variable `var` (0..=10);
    /// zero in test scenarios
    pub fn shock(&self, month: i32, var: usize) -> f64 {
        self.correlator.correlated(var, (month - 1) as usize)
    }
}
