//! Scenario models: interest-rate path, fund returns and deterministic test shocks

mod equity;
mod fixed;
mod funds;
mod interest;
mod shocks;

pub use equity::EquityReturnModel;
pub use fixed::FixedIncomeReturnModel;
pub use funds::{FundScenario, FundType, FUND_COUNT};
pub use interest::InterestRateScenario;
pub use shocks::{DeterministicShockTable, ShockKind, TEST_SCENARIO_COUNT};
