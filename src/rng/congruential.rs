//! Legacy three-congruential-generator shuffle
//!
//! Two linear congruential sequences combine into a uniform value; a third
//! sequence picks which of 97 shuffle slots to hand out next. The constants
//! and slot arithmetic are fixed so that historical scenario sets reproduce
//! bit for bit.
//!
//! Bit-for-bit agreement with the historical sets holds for seeds up to
//! 54773 (fund streams of scenarios up to 44573). A larger seed makes the
//! truncating remainder of the historical generator negative, and its draws
//! leave (0, 1). Here the state is reduced with a Euclidean remainder instead,
//! so seed `s` produces the same stream as seed `s - 259200`.

use super::RandomSource;
use crate::bounded::{BoundedVec, IndexRange};
use crate::error::{Result, ScenarioError};

const M1: i64 = 259_200;
const IA1: i64 = 7_141;
const IC1: i64 = 54_773;
const RM1: f64 = 0.000_003_858_024_7;
const M2: i64 = 134_456;
const IA2: i64 = 8_121;
const IC2: i64 = 28_411;
const RM2: f64 = 0.000_007_437_377_3;
const M3: i64 = 243_000;
const IA3: i64 = 4_561;
const IC3: i64 = 51_349;

const SHUFFLE_SLOTS: i32 = 97;

/// Three-sequence shuffled congruential generator
#[derive(Debug, Clone)]
pub struct CongruentialShuffle {
    slots: BoundedVec<f64>,
    ix1: i64,
    ix2: i64,
    ix3: i64,
    seed: Option<i64>,
}

impl CongruentialShuffle {
    pub fn new() -> Self {
        Self {
            slots: BoundedVec::new(IndexRange::new(1, SHUFFLE_SLOTS)),
            ix1: 0,
            ix2: 0,
            ix3: 0,
            seed: None,
        }
    }

    /// Seed last passed to `reseed`, if any
    pub fn current_seed(&self) -> Option<i64> {
        self.seed
    }

    fn step1(&mut self) {
        self.ix1 = (IA1 * self.ix1 + IC1).rem_euclid(M1);
    }

    fn step2(&mut self) {
        self.ix2 = (IA2 * self.ix2 + IC2).rem_euclid(M2);
    }

    fn combined(&self) -> f64 {
        (self.ix1 as f64 + self.ix2 as f64 * RM2) * RM1
    }
}

impl Default for CongruentialShuffle {
    fn default() -> Self {
        Self::new()
    }
}

impl RandomSource for CongruentialShuffle {
    fn reseed(&mut self, seed: i64) {
        self.ix1 = (IC1 - seed).rem_euclid(M1);
        self.step1();
        self.ix2 = self.ix1 % M2;
        self.step1();
        self.ix3 = self.ix1 % M3;

        for j in 1..=SHUFFLE_SLOTS {
            self.step1();
            self.step2();
            self.slots[j] = self.combined();
        }

        self.seed = Some(seed);
    }

    fn next_uniform(&mut self) -> Result<f64> {
        if self.seed.is_none() {
            return Err(ScenarioError::UninitializedGenerator);
        }

        self.step1();
        self.step2();
        self.ix3 = (IA3 * self.ix3 + IC3).rem_euclid(M3);

        let j = self.slots.lower_bound() + ((self.slots.upper_bound() as i64 * self.ix3) / M3) as i32;
        let result = self.slots[j];

        let mut u = self.combined();
        if u <= 0.0 || u >= 1.0 {
            u = 1.0 + u.trunc() - u;
        }
        self.slots[j] = u;

        Ok(result)
    }
}
