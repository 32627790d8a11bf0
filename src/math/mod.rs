//! Numerical building blocks: Gaussian quantile and Cholesky correlation

mod cholesky;
mod gaussian;

pub use cholesky::{cholesky_factor, Correlator};
pub use gaussian::inverse_normal;
