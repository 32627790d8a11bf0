//! Historical yield-curve archive
//!
//! Loads one CSV series per anchor maturity (a single comma-separated line,
//! one value per month starting at the historical epoch) and indexes the
//! resulting 10-point curves by calendar month. Read-only after load.

use std::collections::BTreeMap;
use std::fs::File;
use std::path::Path;

use chrono::NaiveDate;

use super::dates::{add_months, first_of_month, historical_epoch, months_between};
use super::{CURVE_POINTS, LONG_INDEX, MATURITIES, MID_INDEX, SHORT_INDEX};
use crate::bounded::{BoundedTable, IndexRange};
use crate::error::{Result, ScenarioError};

/// File names of the per-maturity series, in anchor order
pub const HISTORICAL_FILE_NAMES: [&str; CURVE_POINTS] = [
    "0.25.csv", "0.5.csv", "1.csv", "2.csv", "3.csv", "5.csv", "7.csv", "10.csv", "20.csv", "30.csv",
];

// Weights given to the short, mid, and long rate in the fitting criteria
const WEIGHT_SHORT: f64 = 40.0;
const WEIGHT_MID: f64 = 20.0;
const WEIGHT_LONG: f64 = 40.0;

/// Distance measure used by [`HistoricalCurveArchive::best_fitting_curve`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FitMethod {
    /// Weighted sum of absolute differences (method 1)
    AbsoluteDifference,
    /// Weighted sum of squared differences (method 2)
    SumOfSquares,
}

impl FitMethod {
    /// Map the numeric method flag (1 or 2)
    pub fn from_code(code: i32) -> Result<Self> {
        match code {
            1 => Ok(FitMethod::AbsoluteDifference),
            2 => Ok(FitMethod::SumOfSquares),
            other => Err(ScenarioError::InvalidConfig(format!("unknown curve fit method {}", other))),
        }
    }
}

/// Result of a best-fit scan
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CurveFit {
    /// 1-based curve index into the archive
    pub index: i32,
    /// Weighted distance of that curve
    pub distance: f64,
}

/// Monthly historical curves, contiguous from `first_date`
#[derive(Debug, Clone)]
pub struct HistoricalCurveArchive {
    first_date: NaiveDate,
    last_date: NaiveDate,
    /// Curves (1..=n) by anchor (1..=10)
    curves: BoundedTable<f64>,
}

impl HistoricalCurveArchive {
    /// Build from consecutive monthly curves starting at `first_date`
    pub fn from_curves(first_date: NaiveDate, curves: Vec<[f64; CURVE_POINTS]>) -> Result<Self> {
        if curves.is_empty() {
            return Err(ScenarioError::HistoricalData("archive needs at least one curve".to_string()));
        }

        let first_date = first_of_month(first_date);
        let num_curves = curves.len() as i32;
        let mut table = BoundedTable::new(
            IndexRange::new(1, num_curves),
            IndexRange::new(1, CURVE_POINTS as i32),
        );
        for (n, curve) in curves.iter().enumerate() {
            for (m, rate) in curve.iter().enumerate() {
                table[(n as i32 + 1, m as i32 + 1)] = *rate;
            }
        }

        Ok(Self {
            first_date,
            last_date: add_months(first_date, (num_curves - 1) as u32)?,
            curves: table,
        })
    }

    /// Build from a date-keyed map; months must be contiguous
    pub fn from_map(data: &BTreeMap<NaiveDate, [f64; CURVE_POINTS]>) -> Result<Self> {
        let first = match data.keys().next() {
            Some(date) => first_of_month(*date),
            None => return Err(ScenarioError::HistoricalData("no historical curves".to_string())),
        };

        for (expected, date) in data.keys().enumerate() {
            if months_between(first, *date) != expected as i32 {
                return Err(ScenarioError::HistoricalData(format!(
                    "historical curves are not contiguous at {}",
                    date
                )));
            }
        }

        Self::from_curves(first, data.values().copied().collect())
    }

    /// Load the ten per-maturity series in `dir`, starting at the historical epoch
    pub fn load_dir(dir: &Path) -> Result<Self> {
        let mut series = Vec::with_capacity(CURVE_POINTS);
        for name in HISTORICAL_FILE_NAMES.iter() {
            series.push(load_series(&dir.join(name))?);
        }

        let months = series[0].len();
        if let Some((i, s)) = series.iter().enumerate().find(|(_, s)| s.len() != months) {
            return Err(ScenarioError::HistoricalData(format!(
                "{} has {} months, expected {}",
                HISTORICAL_FILE_NAMES[i],
                s.len(),
                months
            )));
        }

        let curves = (0..months)
            .map(|month| {
                let mut curve = [0.0; CURVE_POINTS];
                for (point, values) in series.iter().enumerate() {
                    curve[point] = values[month];
                }
                curve
            })
            .collect();

        let archive = Self::from_curves(historical_epoch()?, curves)?;
        log::info!(
            "Loaded {} historical curves ({} to {}) from {}",
            archive.num_curves(),
            archive.first_date,
            archive.last_date,
            dir.display()
        );
        Ok(archive)
    }

    pub fn first_date(&self) -> NaiveDate {
        self.first_date
    }

    pub fn last_date(&self) -> NaiveDate {
        self.last_date
    }

    pub fn num_curves(&self) -> i32 {
        self.curves.x_range().hi
    }

    /// Whether `first_date <= date <= last_date`
    pub fn covers(&self, date: NaiveDate) -> bool {
        let date = first_of_month(date);
        date >= self.first_date && date <= self.last_date
    }

    /// Rate of curve `curve_index` (1-based) at anchor `maturity_index` (1-based)
    pub fn rate_by_index(&self, curve_index: i32, maturity_index: i32) -> f64 {
        self.curves[(curve_index, maturity_index)]
    }

    /// Full curve at a 1-based curve index
    pub fn curve_by_index(&self, curve_index: i32) -> Result<[f64; CURVE_POINTS]> {
        let mut curve = [0.0; CURVE_POINTS];
        for (i, rate) in curve.iter_mut().enumerate() {
            *rate = *self.curves.get(curve_index, i as i32 + 1)?;
        }
        Ok(curve)
    }

    /// Index of the archived curve closest to the given short (1y), mid (7y)
    /// and long (20y) rates under a 40/20/40 weighting
    pub fn best_fitting_curve(&self, short_rate: f64, mid_rate: f64, long_rate: f64, method: FitMethod) -> CurveFit {
        let mut best = CurveFit {
            index: -1,
            distance: f64::MAX,
        };

        for n in 1..=self.num_curves() {
            let diff_s = short_rate - self.curves[(n, SHORT_INDEX)];
            let diff_m = mid_rate - self.curves[(n, MID_INDEX)];
            let diff_l = long_rate - self.curves[(n, LONG_INDEX)];

            let (ds, dm, dl) = match method {
                FitMethod::AbsoluteDifference => (diff_s.abs(), diff_m.abs(), diff_l.abs()),
                FitMethod::SumOfSquares => (diff_s * diff_s, diff_m * diff_m, diff_l * diff_l),
            };

            let distance = WEIGHT_SHORT * ds + WEIGHT_MID * dm + WEIGHT_LONG * dl;
            if distance < best.distance {
                best = CurveFit { index: n, distance };
            }
        }

        best
    }

    /// Archived curve for `date`
    pub fn curve_vec_by_date(&self, date: NaiveDate) -> Result<[f64; CURVE_POINTS]> {
        if !self.covers(date) {
            return Err(ScenarioError::StartDateOutOfRange {
                date,
                first: self.first_date,
                last: self.last_date,
            });
        }
        self.curve_by_index(1 + months_between(self.first_date, first_of_month(date)))
    }

    /// Archived curve for `date` as (maturity, rate) pairs
    pub fn curve_by_date(&self, date: NaiveDate) -> Result<Vec<(f64, f64)>> {
        let curve = self.curve_vec_by_date(date)?;
        Ok(MATURITIES.iter().copied().zip(curve.iter().copied()).collect())
    }
}

/// Read one single-line comma-separated series
fn load_series(path: &Path) -> Result<Vec<f64>> {
    let file = File::open(path)?;
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(file);

    let mut values = Vec::new();
    if let Some(record) = reader.records().next() {
        let record = record?;
        for field in record.iter().filter(|f| !f.is_empty()) {
            let value: f64 = field.parse().map_err(|_| {
                ScenarioError::HistoricalData(format!("{}: bad rate '{}'", path.display(), field))
            })?;
            values.push(value);
        }
    }

    if values.is_empty() {
        return Err(ScenarioError::HistoricalData(format!("{} is empty", path.display())));
    }
    Ok(values)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::curves::dates::month_start;
    use std::fs;

    fn sample_curve(level: f64) -> [f64; CURVE_POINTS] {
        let mut curve = [0.0; CURVE_POINTS];
        for (i, rate) in curve.iter_mut().enumerate() {
            *rate = level + 0.001 * i as f64;
        }
        curve
    }

    fn sample_archive() -> HistoricalCurveArchive {
        let curves = (0..24).map(|m| sample_curve(0.01 + 0.002 * m as f64)).collect();
        HistoricalCurveArchive::from_curves(month_start(2000, 1).unwrap(), curves).unwrap()
    }

    #[test]
    fn test_date_bounds() {
        let archive = sample_archive();
        assert_eq!(archive.first_date(), month_start(2000, 1).unwrap());
        assert_eq!(archive.last_date(), month_start(2001, 12).unwrap());
        assert!(archive.covers(month_start(2001, 12).unwrap()));
        assert!(!archive.covers(month_start(2002, 1).unwrap()));
        assert!(!archive.covers(month_start(1999, 12).unwrap()));
    }

    #[test]
    fn test_curve_by_date() {
        let archive = sample_archive();
        let curve = archive.curve_vec_by_date(month_start(2000, 6).unwrap()).unwrap();
        assert_eq!(curve, sample_curve(0.01 + 0.002 * 5.0));

        let pairs = archive.curve_by_date(month_start(2000, 1).unwrap()).unwrap();
        assert_eq!(pairs[0], (0.25, 0.01));
        assert_eq!(pairs[9].0, 30.0);

        assert!(matches!(
            archive.curve_vec_by_date(month_start(2003, 1).unwrap()),
            Err(ScenarioError::StartDateOutOfRange { .. })
        ));
    }

    #[test]
    fn test_best_fit_on_stored_curve_is_exact() {
        let archive = sample_archive();
        for n in [1, 7, 24] {
            let fit = archive.best_fitting_curve(
                archive.rate_by_index(n, SHORT_INDEX),
                archive.rate_by_index(n, MID_INDEX),
                archive.rate_by_index(n, LONG_INDEX),
                FitMethod::SumOfSquares,
            );
            assert_eq!(fit.index, n);
            assert_eq!(fit.distance, 0.0);
        }
    }

    #[test]
    fn test_best_fit_absolute_picks_nearest() {
        let archive = sample_archive();
        // Curve 11 has 1y rate 0.01 + 0.02 + 0.002 = 0.032
        let target = archive.curve_by_index(11).unwrap();
        let fit = archive.best_fitting_curve(
            target[2] + 0.0004,
            target[6] + 0.0004,
            target[8] + 0.0004,
            FitMethod::AbsoluteDifference,
        );
        assert_eq!(fit.index, 11);
        assert!(fit.distance > 0.0);
    }

    #[test]
    fn test_fit_method_codes() {
        assert_eq!(FitMethod::from_code(1).unwrap(), FitMethod::AbsoluteDifference);
        assert_eq!(FitMethod::from_code(2).unwrap(), FitMethod::SumOfSquares);
        assert!(FitMethod::from_code(3).is_err());
    }

    #[test]
    fn test_from_map_requires_contiguous_months() {
        let mut data = BTreeMap::new();
        data.insert(month_start(2010, 1).unwrap(), sample_curve(0.02));
        data.insert(month_start(2010, 2).unwrap(), sample_curve(0.03));
        let archive = HistoricalCurveArchive::from_map(&data).unwrap();
        assert_eq!(archive.num_curves(), 2);

        data.insert(month_start(2010, 4).unwrap(), sample_curve(0.04));
        assert!(HistoricalCurveArchive::from_map(&data).is_err());
    }

    #[test]
    fn test_load_dir() {
        let dir = std::env::temp_dir().join(format!("hist_curves_{}", std::process::id()));
        fs::create_dir_all(&dir).unwrap();
        for (i, name) in HISTORICAL_FILE_NAMES.iter().enumerate() {
            let line: Vec<String> = (0..3).map(|m| format!("{}", 0.01 * (i + 1) as f64 + 0.001 * m as f64)).collect();
            fs::write(dir.join(name), line.join(",")).unwrap();
        }

        let archive = HistoricalCurveArchive::load_dir(&dir).unwrap();
        assert_eq!(archive.num_curves(), 3);
        assert_eq!(archive.first_date(), month_start(1953, 4).unwrap());
        assert_eq!(archive.last_date(), month_start(1953, 6).unwrap());
        let june = archive.curve_vec_by_date(month_start(1953, 6).unwrap()).unwrap();
        assert!((june[9] - 0.102).abs() < 1e-12);

        // Ragged series are rejected
        fs::write(dir.join("30.csv"), "0.05,0.05").unwrap();
        assert!(matches!(
            HistoricalCurveArchive::load_dir(&dir),
            Err(ScenarioError::HistoricalData(_))
        ));

        fs::remove_dir_all(&dir).ok();
    }
}
