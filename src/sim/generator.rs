//! Option set generation
//!
//! Each round shows `option_count` distinct values drawn from the target's
//! block pool: targets 1-5 draw from {1..5}, targets 6-10 from {6..10}. The
//! target is always present; the distractors are sampled without replacement
//! and the whole set is shuffled.

use rand::Rng;
use rand::seq::{IndexedRandom, SliceRandom};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::consts::{ROUNDS_PER_BLOCK, ROUNDS_PER_SEQUENCE};

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum GeneratorError {
    #[error("option count must be at least 1")]
    NoOptions,

    #[error("target {target} is outside the pool {low}..={high}")]
    TargetOutsidePool { target: u32, low: u32, high: u32 },

    #[error("pool has {available} distractors but {needed} were requested")]
    NotEnoughDistractors { needed: usize, available: usize },
}

/// An inclusive range of candidate values
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValuePool {
    pub low: u32,
    pub high: u32,
}

impl ValuePool {
    pub fn new(low: u32, high: u32) -> Self {
        Self { low, high }
    }

    /// The block pool a target belongs to ({1..5} or {6..10})
    pub fn for_target(target: u32) -> Result<Self, GeneratorError> {
        if target == 0 || target > ROUNDS_PER_SEQUENCE {
            return Err(GeneratorError::TargetOutsidePool {
                target,
                low: 1,
                high: ROUNDS_PER_SEQUENCE,
            });
        }
        let block = (target - 1) / ROUNDS_PER_BLOCK;
        let low = block * ROUNDS_PER_BLOCK + 1;
        Ok(Self::new(low, low + ROUNDS_PER_BLOCK - 1))
    }

    pub fn len(&self) -> usize {
        if self.high < self.low {
            0
        } else {
            (self.high - self.low + 1) as usize
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn contains(&self, value: u32) -> bool {
        value >= self.low && value <= self.high
    }

    pub fn values(&self) -> impl Iterator<Item = u32> {
        self.low..=self.high
    }
}

/// Builds the candidate values for a round
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RoundGenerator {
    option_count: usize,
}

impl RoundGenerator {
    /// Create a generator, rejecting option counts no block pool can satisfy
    pub fn new(option_count: usize) -> Result<Self, GeneratorError> {
        if option_count == 0 {
            return Err(GeneratorError::NoOptions);
        }
        let available = ROUNDS_PER_BLOCK as usize - 1;
        if option_count - 1 > available {
            return Err(GeneratorError::NotEnoughDistractors {
                needed: option_count - 1,
                available,
            });
        }
        Ok(Self { option_count })
    }

    pub fn option_count(&self) -> usize {
        self.option_count
    }

    /// Generate the option values for `target` from its block pool
    pub fn generate<R: Rng + ?Sized>(
        &self,
        target: u32,
        rng: &mut R,
    ) -> Result<Vec<u32>, GeneratorError> {
        let pool = ValuePool::for_target(target)?;
        generate_from(pool, target, self.option_count, rng)
    }
}

/// Generate `count` distinct values from `pool`, always including `target`
pub fn generate_from<R: Rng + ?Sized>(
    pool: ValuePool,
    target: u32,
    count: usize,
    rng: &mut R,
) -> Result<Vec<u32>, GeneratorError> {
    if count == 0 {
        return Err(GeneratorError::NoOptions);
    }
    if !pool.contains(target) {
        return Err(GeneratorError::TargetOutsidePool {
            target,
            low: pool.low,
            high: pool.high,
        });
    }

    let distractors: Vec<u32> = pool.values().filter(|&v| v != target).collect();
    let needed = count - 1;
    if needed > distractors.len() {
        return Err(GeneratorError::NotEnoughDistractors {
            needed,
            available: distractors.len(),
        });
    }

    let mut values = Vec::with_capacity(count);
    values.push(target);
    values.extend(distractors.choose_multiple(&mut *rng, needed).copied());
    values.shuffle(rng);
    Ok(values)
}
