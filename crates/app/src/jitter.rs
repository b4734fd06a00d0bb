//! Jittered delays for periodic tasks.

use std::time::Duration;

use rand::Rng;

/// A mean delay with a uniform ± spread expressed as a fraction of the mean.
///
/// `Jitter::new(Duration::from_secs(2), 0.2)` yields delays uniformly spread
/// over 1.6s..=2.4s.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Jitter {
    mean: Duration,
    spread: f64,
}

impl Jitter {
    /// Build a jitter. `spread` is clamped into `0.0..1.0`.
    #[must_use]
    pub fn new(mean: Duration, spread: f64) -> Self {
        let spread = if spread.is_finite() {
            spread.clamp(0.0, 0.99)
        } else {
            0.0
        };
        Self { mean, spread }
    }

    #[must_use]
    pub fn mean(&self) -> Duration {
        self.mean
    }

    #[must_use]
    pub fn spread(&self) -> f64 {
        self.spread
    }

    /// Draw the next delay from the thread-local RNG.
    #[must_use]
    pub fn next_delay(&self) -> Duration {
        self.sample(&mut rand::thread_rng())
    }

    /// Draw the next delay from `rng`.
    pub fn sample<R: Rng + ?Sized>(&self, rng: &mut R) -> Duration {
        if self.spread <= 0.0 {
            return self.mean;
        }
        let factor = rng.gen_range((1.0 - self.spread)..=(1.0 + self.spread));
        self.mean.mul_f64(factor)
    }
}
