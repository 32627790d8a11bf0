//! Yield curves: historical archive, monthly curve state and calendar-month helpers

pub mod dates;
mod history;
mod yield_curve;

pub use history::{CurveFit, FitMethod, HistoricalCurveArchive, HISTORICAL_FILE_NAMES};
pub use yield_curve::{CurveInterpolation, YieldCurveState, RATE_FLOOR};

/// Number of anchor points on every curve
pub const CURVE_POINTS: usize = 10;

/// Anchor maturities in years, 1-based position `i` at `MATURITIES[i - 1]`
pub const MATURITIES: [f64; CURVE_POINTS] = [0.25, 0.5, 1.0, 2.0, 3.0, 5.0, 7.0, 10.0, 20.0, 30.0];

/// 1-based index of the 1-year anchor (generated short rate)
pub const SHORT_INDEX: i32 = 3;

/// 1-based index of the 7-year anchor (fit mid rate)
pub const MID_INDEX: i32 = 7;

/// 1-based index of the 20-year anchor (generated long rate)
pub const LONG_INDEX: i32 = 9;

/// Maturity in years at a 1-based anchor index
pub fn maturity_at(index: i32) -> f64 {
    MATURITIES[(index - 1) as usize]
}

/// Label used for a maturity in serialized curves ("0.25", "1", "30")
pub fn maturity_label(maturity: f64) -> String {
    format!("{}", maturity)
}
