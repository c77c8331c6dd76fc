//! The deterministic random source driving the simulation.
//!
//! Every stochastic decision (arrival draws, velocity classes, lateral
//! tie-breaks, update-order shuffles) flows through one [SimRng] owned by
//! the simulation instance, so a fixed seed reproduces a run bit-for-bit.
//! Independent instances must never share a generator; a batch driver
//! seeds each worker's simulation separately.

use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use rand_distr::{Distribution, Poisson};

/// A seeded pseudo-random source.
///
/// Backed by a ChaCha stream cipher, so the sequence is identical across
/// platforms for a given seed.
#[derive(Clone, Debug)]
pub struct SimRng(ChaCha8Rng);

impl SimRng {
    /// Creates a generator from a seed.
    pub fn seed_from(seed: u64) -> Self {
        SimRng(ChaCha8Rng::seed_from_u64(seed))
    }

    /// A uniform float in `[0, 1)`.
    pub fn random(&mut self) -> f64 {
        self.0.gen()
    }

    /// A value drawn uniformly from `range`.
    pub fn gen_range<T, R>(&mut self, range: R) -> T
    where
        T: rand::distributions::uniform::SampleUniform,
        R: rand::distributions::uniform::SampleRange<T>,
    {
        self.0.gen_range(range)
    }

    /// A uniformly chosen element of a slice, or `None` if it is empty.
    pub fn choose<'a, T>(&mut self, slice: &'a [T]) -> Option<&'a T> {
        slice.choose(&mut self.0)
    }

    /// Shuffles a slice in place (Fisher-Yates).
    pub fn shuffle<T>(&mut self, slice: &mut [T]) {
        slice.shuffle(&mut self.0);
    }

    /// A Poisson-distributed count with the given mean rate per tick.
    ///
    /// A rate of zero draws nothing. Rates are validated at configuration
    /// time to be finite and non-negative.
    pub fn poisson(&mut self, rate: f64) -> u32 {
        if rate <= 0.0 {
            return 0;
        }
        let distr = Poisson::new(rate).expect("arrival rate must be positive and finite");
        distr.sample(&mut self.0) as u32
    }
}
