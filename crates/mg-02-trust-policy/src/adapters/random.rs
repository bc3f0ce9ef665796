//! `RandomSource` implementations backed by `rand`.

use crate::ports::RandomSource;
use parking_lot::Mutex;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::collections::VecDeque;

/// Deterministic `StdRng` seeded from a fixed value.
#[derive(Debug)]
pub struct SeededRandom {
    rng: Mutex<StdRng>,
}

impl SeededRandom {
    /// Create a source seeded with `seed`.
    #[must_use]
    pub fn new(seed: u64) -> Self {
        Self {
            rng: Mutex::new(StdRng::seed_from_u64(seed)),
        }
    }
}

impl RandomSource for SeededRandom {
    fn next_unit(&self) -> f64 {
        self.rng.lock().gen::<f64>()
    }
}

/// Production source: `StdRng` seeded from OS entropy.
#[derive(Debug)]
pub struct EntropyRandom {
    rng: Mutex<StdRng>,
}

impl EntropyRandom {
    /// Create a source seeded from OS entropy.
    #[must_use]
    pub fn new() -> Self {
        Self {
            rng: Mutex::new(StdRng::from_entropy()),
        }
    }
}

impl Default for EntropyRandom {
    fn default() -> Self {
        Self::new()
    }
}

impl RandomSource for EntropyRandom {
    fn next_unit(&self) -> f64 {
        self.rng.lock().gen::<f64>()
    }
}

/// Replays a fixed list of draws, then repeats `fallback`.
#[derive(Debug)]
pub struct ScriptedRandom {
    draws: Mutex<VecDeque<f64>>,
    fallback: f64,
}

impl ScriptedRandom {
    /// Replay `draws` in order; afterwards return `fallback`.
    #[must_use]
    pub fn new(draws: impl IntoIterator<Item = f64>, fallback: f64) -> Self {
        Self {
            draws: Mutex::new(draws.into_iter().collect()),
            fallback,
        }
    }

    /// Always return `value`.
    #[must_use]
    pub fn constant(value: f64) -> Self {
        Self::new([], value)
    }
}

impl RandomSource for ScriptedRandom {
    fn next_unit(&self) -> f64 {
        self.draws.lock().pop_front().unwrap_or(self.fallback)
    }
}
