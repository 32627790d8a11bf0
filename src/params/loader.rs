//! JSON parameter-file loader
//!
//! The file carries four sections:
//!
//! ```text
//! {
//!   "interest_rate_params": { "tau1": .., "correl12": .., "init_rate_short": .., ... },
//!   "equity_params": {
//!     "diversified": { "target_vol": .., "SETmedianReturn": .., ... },
//!     "international": {..}, "intermediate": {..}, "aggressive": {..},
//!     "diversified_vol": 0.15, ...            (optional starting volatilities)
//!   },
//!   "bond_index_params": { "money_market": {..}, "us_intermed_govt": {..}, "us_long_corporate": {..} },
//!   "equity_correlations": [ { "US_LogVol": [ { "US_LogVol": 1.0 }, { "US_LogRet": -0.2 }, ... ] }, ... ]
//! }
//! ```
//!
//! plus an optional `naic_mean_reversion_points` object keyed by ISO date.

use std::collections::BTreeMap;
use std::fs::File;
use std::io::BufReader;
use std::path::Path;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::{EquityFundParams, FixedFundParams, InterestRateParams, ScenarioGeneratorParams, FUND_SHOCK_VARIABLES};
use crate::bounded::BoundedTable;
use crate::curves::dates::first_of_month;
use crate::error::{Result, ScenarioError};

/// Correlated fund shock variables, in correlation-matrix order
pub const FUND_MARKETS: [&str; FUND_SHOCK_VARIABLES] = [
    "US_LogVol",
    "US_LogRet",
    "Intl_LogVol",
    "Intl_LogRet",
    "Small_LogVol",
    "Small_LogRet",
    "Aggr_LogVol",
    "Aggr_LogRet",
    "Money_Ret",
    "IT_Govt_Ret",
    "LTCorp_Ret",
];

/// `equity_params` section
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EquityParamsSection {
    pub diversified: EquityFundParams,
    pub international: EquityFundParams,
    pub intermediate: EquityFundParams,
    pub aggressive: EquityFundParams,
    /// Starting volatility overrides
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub diversified_vol: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub international_vol: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub intermediate_vol: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub aggressive_vol: Option<f64>,
}

/// `bond_index_params` section
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BondIndexSection {
    pub money_market: FixedFundParams,
    pub us_intermed_govt: FixedFundParams,
    pub us_long_corporate: FixedFundParams,
}

/// One row of `equity_correlations`: market name to an ordered list of
/// single-entry `{ other_market: correlation }` objects
pub type CorrelationRow = BTreeMap<String, Vec<BTreeMap<String, f64>>>;

/// Raw parameter file
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ParamFile {
    pub interest_rate_params: InterestRateParams,
    pub equity_params: EquityParamsSection,
    pub bond_index_params: BondIndexSection,
    pub equity_correlations: Vec<CorrelationRow>,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub naic_mean_reversion_points: BTreeMap<NaiveDate, f64>,
}

impl ParamFile {
    /// Read and parse a parameter file
    pub fn load(path: &Path) -> Result<Self> {
        let reader = BufReader::new(File::open(path)?);
        let file: ParamFile = serde_json::from_reader(reader)?;
        log::info!("Loaded scenario parameters from {}", path.display());
        Ok(file)
    }

    /// Validate and convert into the immutable run snapshot
    pub fn into_params(self) -> Result<ScenarioGeneratorParams> {
        let correlations = parse_correlations(&self.equity_correlations)?;

        let eq = self.equity_params;
        let with_start_vol = |mut fund: EquityFundParams, start: Option<f64>| {
            if let Some(vol) = start {
                fund.current_vol = vol;
            }
            fund
        };

        let naic_points = self
            .naic_mean_reversion_points
            .into_iter()
            .map(|(date, rate)| (first_of_month(date), rate))
            .collect();

        ScenarioGeneratorParams::new(
            self.interest_rate_params,
            with_start_vol(eq.diversified, eq.diversified_vol),
            with_start_vol(eq.international, eq.international_vol),
            with_start_vol(eq.intermediate, eq.intermediate_vol),
            with_start_vol(eq.aggressive, eq.aggressive_vol),
            self.bond_index_params.money_market,
            self.bond_index_params.us_intermed_govt,
            self.bond_index_params.us_long_corporate,
            correlations,
            naic_points,
        )
    }
}

impl From<&ScenarioGeneratorParams> for ParamFile {
    fn from(params: &ScenarioGeneratorParams) -> Self {
        let equity_correlations = FUND_MARKETS
            .iter()
            .enumerate()
            .map(|(i, market)| {
                let row = FUND_MARKETS
                    .iter()
                    .enumerate()
                    .map(|(j, other)| {
                        BTreeMap::from([(other.to_string(), params.fund_correlations[(i as i32, j as i32)])])
                    })
                    .collect();
                BTreeMap::from([(market.to_string(), row)])
            })
            .collect();

        Self {
            interest_rate_params: params.interest.clone(),
            equity_params: EquityParamsSection {
                diversified: params.diversified.clone(),
                international: params.international.clone(),
                intermediate: params.intermediate.clone(),
                aggressive: params.aggressive.clone(),
                diversified_vol: None,
                international_vol: None,
                intermediate_vol: None,
                aggressive_vol: None,
            },
            bond_index_params: BondIndexSection {
                money_market: params.money_market.clone(),
                us_intermed_govt: params.intermediate_government.clone(),
                us_long_corporate: params.long_corporate.clone(),
            },
            equity_correlations,
            naic_mean_reversion_points: params.naic_mean_reversion_points.clone(),
        }
    }
}

/// Build the zero-based 11x11 matrix, looking every entry up by market name
fn parse_correlations(rows: &[CorrelationRow]) -> Result<BoundedTable<f64>> {
    if rows.len() != FUND_SHOCK_VARIABLES {
        return Err(ScenarioError::InvalidConfig(format!(
            "equity_correlations has {} rows, expected {}",
            rows.len(),
            FUND_SHOCK_VARIABLES
        )));
    }

    let mut table = BoundedTable::zero_based(FUND_SHOCK_VARIABLES, FUND_SHOCK_VARIABLES);
    for (i, market) in FUND_MARKETS.iter().enumerate() {
        let entries = rows[i].get(*market).ok_or_else(|| {
            ScenarioError::InvalidConfig(format!("equity_correlations row {} is not keyed by {}", i, market))
        })?;
        if entries.len() != FUND_SHOCK_VARIABLES {
            return Err(ScenarioError::InvalidConfig(format!(
                "equity_correlations row {} has {} entries, expected {}",
                market,
                entries.len(),
                FUND_SHOCK_VARIABLES
            )));
        }

        for (j, other) in FUND_MARKETS.iter().enumerate() {
            let value = entries[j].get(*other).copied().ok_or_else(|| {
                ScenarioError::InvalidConfig(format!("equity_correlations {} entry {} is not keyed by {}", market, j, other))
            })?;
            table[(i as i32, j as i32)] = value;
        }
    }

    Ok(table)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::curves::dates::month_start;
    use serde_json::{json, Value};

    fn sample_json() -> Value {
        let params = ScenarioGeneratorParams::default_calibration();
        serde_json::to_value(ParamFile::from(&params)).unwrap()
    }

    #[test]
    fn test_file_layout_field_names() {
        let value = sample_json();
        assert!(value["interest_rate_params"]["init_rate_short"].is_number());
        assert!(value["equity_params"]["diversified"]["SETmedianReturn"].is_number());
        assert!(value["bond_index_params"]["us_long_corporate"]["monthly_spread"].is_number());
        assert_eq!(value["equity_correlations"][3]["Intl_LogRet"][1]["US_LogRet"], json!(0.33));
    }

    #[test]
    fn test_parse_default_layout() {
        let params = ScenarioGeneratorParams::from_json_str(&sample_json().to_string()).unwrap();
        let reference = ScenarioGeneratorParams::default_calibration();
        assert_eq!(params.interest, reference.interest);
        assert_eq!(params.aggressive, reference.aggressive);
        assert_eq!(params.long_corporate, reference.long_corporate);
        assert_eq!(params.fund_correlations, reference.fund_correlations);
    }

    #[test]
    fn test_starting_volatility_override_and_naic_points() {
        let mut value = sample_json();
        value["equity_params"]["intermediate_vol"] = json!(0.22);
        value["naic_mean_reversion_points"] = json!({ "2022-01-15": 0.0325 });

        let params = ScenarioGeneratorParams::from_json_str(&value.to_string()).unwrap();
        assert_eq!(params.intermediate.current_vol, 0.22);
        assert_eq!(params.international.current_vol, params.international.target_vol);
        assert_eq!(params.naic_mean_reversion_points.get(&month_start(2022, 1).unwrap()), Some(&0.0325));
    }

    #[test]
    fn test_misordered_correlations_rejected() {
        let mut value = sample_json();
        let rows = value["equity_correlations"].as_array_mut().unwrap();
        rows.swap(0, 1);
        let err = ScenarioGeneratorParams::from_json_str(&value.to_string()).unwrap_err();
        assert!(matches!(err, ScenarioError::InvalidConfig(_)), "got {}", err);
    }

    #[test]
    fn test_missing_field_is_json_error() {
        let mut value = sample_json();
        value["interest_rate_params"].as_object_mut().unwrap().remove("tau1");
        assert!(matches!(
            ScenarioGeneratorParams::from_json_str(&value.to_string()),
            Err(ScenarioError::Json(_))
        ));
    }

    #[test]
    fn test_kappa_optional_and_unused() {
        let mut value = sample_json();
        value["interest_rate_params"].as_object_mut().unwrap().remove("kappa");
        let without = ScenarioGeneratorParams::from_json_str(&value.to_string()).unwrap();
        assert_eq!(without.interest.kappa, 0.0);

        value["interest_rate_params"]["kappa"] = json!(0.5);
        let with = ScenarioGeneratorParams::from_json_str(&value.to_string()).unwrap();
        assert_eq!(with.interest.kappa, 0.5);
        assert_eq!(with.derived().unwrap(), without.derived().unwrap());
    }

    #[test]
    fn test_load_from_disk() {
        let dir = std::env::temp_dir().join(format!("scenario_params_{}", std::process::id()));
        std::fs::create_dir_all(&dir).unwrap();
        let path = dir.join("params.json");
        std::fs::write(&path, sample_json().to_string()).unwrap();

        let params = ScenarioGeneratorParams::from_json_path(&path).unwrap();
        assert_eq!(params.money_market.maturity, 0.25);

        std::fs::remove_dir_all(&dir).unwrap();
    }
}
