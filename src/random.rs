//! Injectable randomness for exam building.
//!
//! Everything random in the builder goes through `RandomSource`, so tests can
//! script the exact draws while production wraps a `rand` generator.

use rand::{rngs::StdRng, Rng, SeedableRng};

/// Uniform integer draws.
pub trait RandomSource {
  /// A uniformly distributed value in `0..bound`. `bound` is always > 0.
  fn below(&mut self, bound: usize) -> usize;
}

/// Adapter for any `rand` generator.
#[derive(Debug)]
pub struct RngSource<R>(pub R);

impl<R: Rng> RandomSource for RngSource<R> {
  fn below(&mut self, bound: usize) -> usize {
    self.0.gen_range(0..bound)
  }
}

impl RngSource<StdRng> {
  /// Deterministic when a seed is given, entropy-seeded otherwise.
  pub fn from_seed_opt(seed: Option<u64>) -> Self {
    match seed {
      Some(s) => RngSource(StdRng::seed_from_u64(s)),
      None => RngSource(StdRng::from_entropy()),
    }
  }
}

/// In-place Fisher–Yates shuffle.
pub fn shuffle<T>(items: &mut [T], rng: &mut dyn RandomSource) {
  for i in (1..items.len()).rev() {
    let j = rng.below(i + 1);
    items.swap(i, j);
  }
}

/// Sample `min(n, pool.len())` items without replacement (partial Fisher–Yates
/// over a copy of the pool). A short pool comes back whole, reordered.
pub fn sample<T: Clone>(pool: &[T], n: usize, rng: &mut dyn RandomSource) -> Vec<T> {
  let mut items = pool.to_vec();
  let take = n.min(items.len());
  for i in 0..take {
    let j = i + rng.below(items.len() - i);
    items.swap(i, j);
  }
  items.truncate(take);
  items
}

/// Replays a fixed list of draws (each reduced modulo the bound), cycling when exhausted.
#[cfg(test)]
pub struct Scripted {
  draws: Vec<usize>,
  next: usize,
}

#[cfg(test)]
impl Scripted {
  pub fn new(draws: Vec<usize>) -> Self { Self { draws, next: 0 } }
  pub fn zeros() -> Self { Self::new(vec![0]) }
}

#[cfg(test)]
impl RandomSource for Scripted {
  fn below(&mut self, bound: usize) -> usize {
    let v = self.draws[self.next % self.draws.len()];
    self.next += 1;
    v % bound
  }
}
