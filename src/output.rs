//! Per-scenario JSON files
//!
//! Each scenario is written to `scenario_<n>.json`:
//!
//! ```text
//! {
//!   "equities": { "USDiversified": [r1, r2, ...], ..., "LongCorp": [...] },
//!   "yield_curves": { "0": { "0.25": .., "0.5": .., ..., "30": .. }, "1": {..}, ... }
//! }
//! ```
//!
//! `yield_curves` is present only when requested. Returns are monthly total
//! returns for months 1..=N written at full precision.

use std::collections::BTreeMap;
use std::fs::File;
use std::io::{BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};

use serde::de::Error as _;
use serde::ser::SerializeMap;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::curves::{maturity_label, CURVE_POINTS, MATURITIES};
use crate::error::{Result, ScenarioError};
use crate::scenario::{FundScenario, FundType, InterestRateScenario};

/// File name for a scenario number
pub fn scenario_file_name(scenario_number: i32) -> String {
    format!("scenario_{}.json", scenario_number)
}

/// Full path of a scenario file inside `output_dir`
pub fn scenario_path(output_dir: &Path, scenario_number: i32) -> PathBuf {
    output_dir.join(scenario_file_name(scenario_number))
}

/// Monthly returns of the seven published funds
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FundReturns {
    #[serde(rename = "USDiversified")]
    pub us_diversified: Vec<f64>,
    #[serde(rename = "International")]
    pub international: Vec<f64>,
    #[serde(rename = "Intermediate")]
    pub intermediate: Vec<f64>,
    #[serde(rename = "Aggressive")]
    pub aggressive: Vec<f64>,
    #[serde(rename = "MoneyMkt")]
    pub money_market: Vec<f64>,
    #[serde(rename = "MedGovt")]
    pub medium_government: Vec<f64>,
    #[serde(rename = "LongCorp")]
    pub long_corporate: Vec<f64>,
}

impl FundReturns {
    pub fn from_scenario(funds: &FundScenario) -> Self {
        Self {
            us_diversified: funds.total_returns(FundType::UsDiversified),
            international: funds.total_returns(FundType::International),
            intermediate: funds.total_returns(FundType::Intermediate),
            aggressive: funds.total_returns(FundType::Aggressive),
            money_market: funds.total_returns(FundType::MoneyMarket),
            medium_government: funds.total_returns(FundType::MediumGovernment),
            long_corporate: funds.total_returns(FundType::LongCorporate),
        }
    }

    /// Return series of a published fund; blended series are not published
    pub fn series(&self, fund: FundType) -> Result<&[f64]> {
        match fund {
            FundType::UsDiversified => Ok(&self.us_diversified),
            FundType::International => Ok(&self.international),
            FundType::Intermediate => Ok(&self.intermediate),
            FundType::Aggressive => Ok(&self.aggressive),
            FundType::MoneyMarket => Ok(&self.money_market),
            FundType::MediumGovernment => Ok(&self.medium_government),
            FundType::LongCorporate => Ok(&self.long_corporate),
            FundType::BlendedFixed | FundType::Balanced => Err(ScenarioError::UnknownFund(fund.label().to_string())),
        }
    }
}

/// Ten anchor rates, serialized as an object keyed by maturity label in maturity order
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LabeledCurve(pub [f64; CURVE_POINTS]);

impl Serialize for LabeledCurve {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(CURVE_POINTS))?;
        for (maturity, rate) in MATURITIES.iter().zip(self.0.iter()) {
            map.serialize_entry(&maturity_label(*maturity), rate)?;
        }
        map.end()
    }
}

impl<'de> Deserialize<'de> for LabeledCurve {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        let raw = BTreeMap::<String, f64>::deserialize(deserializer)?;
        let mut rates = [0.0; CURVE_POINTS];
        for (rate, maturity) in rates.iter_mut().zip(MATURITIES.iter()) {
            let label = maturity_label(*maturity);
            *rate = *raw
                .get(&label)
                .ok_or_else(|| D::Error::custom(format!("yield curve is missing maturity {}", label)))?;
        }
        Ok(LabeledCurve(rates))
    }
}

/// Serialized form of one scenario
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScenarioDocument {
    pub equities: FundReturns,
    /// Curves keyed by month 0..=N
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub yield_curves: Option<BTreeMap<u32, LabeledCurve>>,
}

impl ScenarioDocument {
    pub fn from_scenario(rates: &InterestRateScenario, funds: &FundScenario, include_yield_curves: bool) -> Self {
        let yield_curves = include_yield_curves.then(|| {
            rates
                .curves()
                .map(|(month, curve)| (month as u32, LabeledCurve(curve.rates())))
                .collect()
        });

        Self {
            equities: FundReturns::from_scenario(funds),
            yield_curves,
        }
    }

    /// Write as JSON to `path`, replacing any existing file
    pub fn write(&self, path: &Path) -> Result<()> {
        let mut writer = BufWriter::new(File::create(path)?);
        serde_json::to_writer(&mut writer, self)?;
        writer.write_all(b"\n")?;
        writer.flush()?;
        Ok(())
    }
}

/// A scenario file as read back by the downstream valuation program
#[derive(Debug, Clone)]
pub struct ScenarioFile {
    document: ScenarioDocument,
}

impl ScenarioFile {
    /// Parse `path`, requiring every fund series to cover exactly `months` months
    pub fn read(path: &Path, months: usize) -> Result<Self> {
        let reader = BufReader::new(File::open(path)?);
        let document: ScenarioDocument = serde_json::from_reader(reader)?;

        for fund in FundType::PUBLISHED {
            let len = document.equities.series(fund)?.len();
            if len != months {
                return Err(ScenarioError::InvalidConfig(format!(
                    "{}: {} has {} months, expected {}",
                    path.display(),
                    fund,
                    len,
                    months
                )));
            }
        }

        Ok(Self { document })
    }

    /// Return of `fund` in 0-based month `month`
    pub fn monthly_return(&self, fund: FundType, month: usize) -> Result<f64> {
        let series = self.document.equities.series(fund)?;
        series.get(month).copied().ok_or(ScenarioError::IndexOutOfRange {
            index: month as i64,
            lo: 0,
            hi: series.len() as i64 - 1,
        })
    }

    pub fn document(&self) -> &ScenarioDocument {
        &self.document
    }
}
