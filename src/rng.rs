use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

/// Source of randomness injected into the spawner and session so that
/// word picks and speed jitter are reproducible under test
pub trait RandomSource {
    /// Uniform value in [0, 1)
    fn next_f64(&mut self) -> f64;

    /// Uniform index in [0, len)
    fn pick_index(&mut self, len: usize) -> usize;
}

/// Production source backed by the thread-local rng
#[derive(Debug, Default)]
pub struct ThreadRandom;

impl RandomSource for ThreadRandom {
    fn next_f64(&mut self) -> f64 {
        rand::thread_rng().gen::<f64>()
    }

    fn pick_index(&mut self, len: usize) -> usize {
        rand::thread_rng().gen_range(0..len)
    }
}

/// Deterministic source for tests and the --seed flag
#[derive(Debug)]
pub struct SeededRandom {
    rng: StdRng,
}

impl SeededRandom {
    pub fn new(seed: u64) -> Self {
        Self {
            rng: StdRng::seed_from_u64(seed),
        }
    }
}

impl RandomSource for SeededRandom {
    fn next_f64(&mut self) -> f64 {
        self.rng.gen::<f64>()
    }

    fn pick_index(&mut self, len: usize) -> usize {
        self.rng.gen_range(0..len)
    }
}
