//! 64-bit standard generator adapted to the [`RandomSource`] capability

use rand::distributions::Open01;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use super::RandomSource;
use crate::error::{Result, ScenarioError};

/// Seeded `StdRng` producing draws on the open interval (0, 1)
#[derive(Debug, Clone, Default)]
pub struct StdRandom {
    inner: Option<StdRng>,
}

impl StdRandom {
    pub fn new() -> Self {
        Self { inner: None }
    }
}

impl RandomSource for StdRandom {
    fn reseed(&mut self, seed: i64) {
        self.inner = Some(StdRng::seed_from_u64(seed as u64));
    }

    fn next_uniform(&mut self) -> Result<f64> {
        match self.inner.as_mut() {
            Some(rng) => Ok(rng.sample(Open01)),
            None => Err(ScenarioError::UninitializedGenerator),
        }
    }
}
