//! Inverse standard normal CDF
//!
//! Rational-polynomial approximation by Peter Acklam, split into a lower tail,
//! a central region and an upper tail at p = 0.02425. Scenario values are
//! seed-reproducible, so the coefficients must stay exactly as below.

use crate::error::{Result, ScenarioError};

const A: [f64; 6] = [
    -39.6968302866538,
    220.946098424521,
    -275.928510446969,
    138.357751867269,
    -30.6647980661472,
    2.50662827745924,
];

const B: [f64; 5] = [
    -54.4760987982241,
    161.585836858041,
    -155.698979859887,
    66.8013118877197,
    -13.2806815528857,
];

const C: [f64; 6] = [
    -7.78489400243029E-03,
    -0.322396458041136,
    -2.40075827716184,
    -2.54973253934373,
    4.37466414146497,
    2.93816398269878,
];

const D: [f64; 4] = [
    7.78469570904146E-03,
    0.32246712907004,
    2.445134137143,
    3.75440866190742,
];

const P_LOW: f64 = 0.02425;
const P_HIGH: f64 = 1.0 - P_LOW;

/// Standard normal quantile of `p`; `p` must lie strictly inside (0, 1)
pub fn inverse_normal(p: f64) -> Result<f64> {
    if !(p > 0.0 && p < 1.0) {
        return Err(ScenarioError::QuantileDomain(p));
    }

    if p < P_LOW {
        let q = (-2.0 * p.ln()).sqrt();
        Ok(tail(q))
    } else if p <= P_HIGH {
        let q = p - 0.5;
        let r = q * q;
        Ok((((((A[0] * r + A[1]) * r + A[2]) * r + A[3]) * r + A[4]) * r + A[5]) * q
            / (((((B[0] * r + B[1]) * r + B[2]) * r + B[3]) * r + B[4]) * r + 1.0))
    } else {
        let q = (-2.0 * (1.0 - p).ln()).sqrt();
        Ok(-tail(q))
    }
}

fn tail(q: f64) -> f64 {
    (((((C[0] * q + C[1]) * q + C[2]) * q + C[3]) * q + C[4]) * q + C[5])
        / ((((D[0] * q + D[1]) * q + D[2]) * q + D[3]) * q + 1.0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    #[test]
    fn test_median_is_zero() {
        assert_eq!(inverse_normal(0.5).unwrap(), 0.0);
    }

    #[test]
    fn test_known_quantiles() {
        // Acklam's approximation is accurate to about 1.15e-9 relative error
        assert_abs_diff_eq!(inverse_normal(0.975).unwrap(), 1.959963985, epsilon = 1e-8);
        assert_abs_diff_eq!(inverse_normal(0.9).unwrap(), 1.281551566, epsilon = 1e-8);
        assert_abs_diff_eq!(inverse_normal(0.01).unwrap(), -2.326347874, epsilon = 1e-8);
        assert_abs_diff_eq!(inverse_normal(0.999).unwrap(), 3.090232306, epsilon = 1e-8);
    }

    #[test]
    fn test_symmetry_across_regions() {
        for &p in &[0.001, 0.02, 0.02425, 0.1, 0.3, 0.45] {
            let lo = inverse_normal(p).unwrap();
            let hi = inverse_normal(1.0 - p).unwrap();
            assert_abs_diff_eq!(lo, -hi, epsilon = 1e-9);
        }
    }

    #[test]
    fn test_monotone_across_breakpoints() {
        let below = inverse_normal(P_LOW - 1e-9).unwrap();
        let at = inverse_normal(P_LOW).unwrap();
        let above = inverse_normal(P_LOW + 1e-9).unwrap();
        assert!(below < at && at < above);
    }

    #[test]
    fn test_domain_errors() {
        for &p in &[0.0, 1.0, -0.1, 1.5, f64::NAN] {
            assert!(
                matches!(inverse_normal(p), Err(ScenarioError::QuantileDomain(_))),
                "p = {} should be rejected",
                p
            );
        }
    }
}
