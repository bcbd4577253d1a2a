//! Injected randomness for card generation and number calls.
//!
//! The engine never reaches for an ambient generator. Hosts pass a
//! [`RandomSource`], so a fixed seed reproduces both the card and the whole
//! call sequence.

use enum_dispatch::enum_dispatch;
use rand::{Rng, SeedableRng, rngs::StdRng, rngs::ThreadRng};

/// Uniform integer source with inclusive bounds.
#[enum_dispatch]
pub trait RandomSource {
    /// A uniformly chosen integer in `min..=max`. Callers guarantee
    /// `min <= max`.
    fn uniform_int(&mut self, min: u32, max: u32) -> u32;
}

/// Deterministic source for tests and replays.
#[derive(Clone, Debug)]
pub struct SeededRandom {
    rng: StdRng,
}

impl SeededRandom {
    #[must_use]
    pub fn new(seed: u64) -> Self {
        Self {
            rng: StdRng::seed_from_u64(seed),
        }
    }
}

impl RandomSource for SeededRandom {
    fn uniform_int(&mut self, min: u32, max: u32) -> u32 {
        self.rng.random_range(min..=max)
    }
}

/// Source backed by the thread-local OS-seeded generator.
#[derive(Clone, Debug)]
pub struct EntropyRandom {
    rng: ThreadRng,
}

impl EntropyRandom {
    #[must_use]
    pub fn new() -> Self {
        Self { rng: rand::rng() }
    }
}

impl Default for EntropyRandom {
    fn default() -> Self {
        Self::new()
    }
}

impl RandomSource for EntropyRandom {
    fn uniform_int(&mut self, min: u32, max: u32) -> u32 {
        self.rng.random_range(min..=max)
    }
}

/// Either kind of source, chosen at startup by the host.
#[enum_dispatch(RandomSource)]
#[derive(Clone, Debug)]
pub enum Randomness {
    SeededRandom,
    EntropyRandom,
}

impl Randomness {
    /// Seeded when a seed is given, entropy-backed otherwise.
    #[must_use]
    pub fn from_seed(seed: Option<u64>) -> Self {
        match seed {
            Some(seed) => SeededRandom::new(seed).into(),
            None => EntropyRandom::new().into(),
        }
    }
}

/// Fisher-Yates shuffle driven by a [`RandomSource`].
pub fn shuffle<T, R: RandomSource + ?Sized>(items: &mut [T], rng: &mut R) {
    for i in (1..items.len()).rev() {
        let j = rng.uniform_int(0, i as u32) as usize;
        items.swap(i, j);
    }
}
