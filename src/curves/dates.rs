//! Calendar-month arithmetic on first-of-month `NaiveDate`s

use chrono::{Datelike, Months, NaiveDate};

use crate::error::{Result, ScenarioError};

/// First month of the historical curve files (April 1953)
pub const HISTORICAL_EPOCH: (i32, u32) = (1953, 4);

/// First-of-month date for `year`/`month`
pub fn month_start(year: i32, month: u32) -> Result<NaiveDate> {
    NaiveDate::from_ymd_opt(year, month, 1)
        .ok_or_else(|| ScenarioError::InvalidConfig(format!("invalid calendar month {}-{}", year, month)))
}

/// The historical epoch as a date
pub fn historical_epoch() -> Result<NaiveDate> {
    month_start(HISTORICAL_EPOCH.0, HISTORICAL_EPOCH.1)
}

/// Pin any date to the first of its month
pub fn first_of_month(date: NaiveDate) -> NaiveDate {
    date.with_day(1).unwrap_or(date)
}

/// Date `months` calendar months after `date`
pub fn add_months(date: NaiveDate, months: u32) -> Result<NaiveDate> {
    date.checked_add_months(Months::new(months))
        .ok_or_else(|| ScenarioError::InvalidConfig(format!("{} + {} months overflows", date, months)))
}

/// Following calendar month
pub fn next_month(date: NaiveDate) -> Result<NaiveDate> {
    add_months(date, 1)
}

/// Whole months from `from` to `to`; negative when `to` precedes `from`
pub fn months_between(from: NaiveDate, to: NaiveDate) -> i32 {
    12 * (to.year() - from.year()) + (to.month() as i32 - from.month() as i32)
}
