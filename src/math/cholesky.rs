//! Cholesky-based correlation of independent draws
//!
//! `Correlator::setup` factors a correlation matrix `C` into a lower-triangular
//! `A` with `A * A^T = C`. Independent draws `U` are loaded one at a time
//! (rows = variables, columns = observations), and `correlate` produces
//! `A * U`, whose rows carry the requested correlation.

use crate::bounded::BoundedTable;
use crate::error::{Result, ScenarioError};

/// Residuals down to this magnitude below zero are treated as rounding noise
const PIVOT_TOLERANCE: f64 = 1e-12;

/// Lower-triangular Cholesky factor of a square correlation matrix
pub fn cholesky_factor(corr: &BoundedTable<f64>) -> Result<BoundedTable<f64>> {
    let n = corr.x_range().len();
    if corr.y_range().len() != n {
        return Err(ScenarioError::InvalidConfig(format!(
            "correlation matrix must be square, got {}x{}",
            n,
            corr.y_range().len()
        )));
    }

    let mut a: BoundedTable<f64> = BoundedTable::zero_based(n, n);
    let n = n as i32;

    for i in 0..n {
        for j in 0..i {
            let mut value = corr[(i, j)];
            for k in 0..j {
                value -= a[(i, k)] * a[(j, k)];
            }
            a[(i, j)] = if a[(j, j)] == 0.0 { 0.0 } else { value / a[(j, j)] };
        }

        let mut residual = corr[(i, i)];
        for k in 0..i {
            residual -= a[(i, k)] * a[(i, k)];
        }

        if residual < -PIVOT_TOLERANCE || residual.is_nan() {
            return Err(ScenarioError::NotPositiveSemidefinite {
                row: i as usize,
                residual,
            });
        }
        a[(i, i)] = residual.max(0.0).sqrt();
    }

    Ok(a)
}

/// Turns a matrix of independent draws into correlated draws
#[derive(Debug, Clone)]
pub struct Correlator {
    num_vars: usize,
    num_obs: usize,
    factor: BoundedTable<f64>,
    random: BoundedTable<f64>,
    correlated: BoundedTable<f64>,
}

impl Correlator {
    /// Allocate `num_vars x num_obs` working matrices and factor `corr`
    pub fn setup(num_vars: usize, num_obs: usize, corr: &BoundedTable<f64>) -> Result<Self> {
        if corr.x_range().len() != num_vars {
            return Err(ScenarioError::InvalidConfig(format!(
                "correlation matrix has {} variables, expected {}",
                corr.x_range().len(),
                num_vars
            )));
        }

        Ok(Self {
            num_vars,
            num_obs,
            factor: cholesky_factor(corr)?,
            random: BoundedTable::zero_based(num_vars, num_obs),
            correlated: BoundedTable::zero_based(num_vars, num_obs),
        })
    }

    pub fn num_vars(&self) -> usize {
        self.num_vars
    }

    pub fn num_obs(&self) -> usize {
        self.num_obs
    }

    /// The lower-triangular factor computed at setup
    pub fn factor(&self) -> &BoundedTable<f64> {
        &self.factor
    }

    /// Load one independent draw
    pub fn set_random(&mut self, var: usize, obs: usize, value: f64) {
        self.random[(var as i32, obs as i32)] = value;
    }

    /// Read back an independent draw
    pub fn random(&self, var: usize, obs: usize) -> f64 {
        self.random[(var as i32, obs as i32)]
    }

    /// Compute every correlated draw as row `var` of the factor dotted with column `obs`
    pub fn correlate(&mut self) {
        let n = self.num_vars as i32;
        for obs in 0..self.num_obs as i32 {
            for var in 0..n {
                let mut sum = 0.0;
                for i in 0..=var {
                    sum += self.factor[(var, i)] * self.random[(i, obs)];
                }
                self.correlated[(var, obs)] = sum;
            }
        }
    }

    /// A correlated draw; valid after `correlate`
    pub fn correlated(&self, var: usize, obs: usize) -> f64 {
        self.correlated[(var as i32, obs as i32)]
    }
}
