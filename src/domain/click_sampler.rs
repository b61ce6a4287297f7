//! Per-request sampling decision for detailed click analytics.

use parking_lot::Mutex;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

/// Default share of redirects that get a detailed analytics record.
pub const DEFAULT_SAMPLE_RATE: f64 = 0.1;

enum Draw {
    Thread,
    Seeded(Mutex<StdRng>),
}

/// Decides whether a single redirect is recorded in detail.
///
/// Every call is an independent uniform draw in `[0, 1)` compared against the rate,
/// so the decision is per request rather than per code or per visitor. The exact
/// click counter is maintained separately for every hit.
pub struct ClickSampler {
    rate: f64,
    draw: Draw,
}

impl ClickSampler {
    /// Creates a sampler drawing from the thread-local RNG. `rate` is clamped to `0..=1`.
    pub fn new(rate: f64) -> Self {
        Self {
            rate: rate.clamp(0.0, 1.0),
            draw: Draw::Thread,
        }
    }

    /// Creates a sampler with a reproducible draw sequence.
    pub fn seeded(rate: f64, seed: u64) -> Self {
        Self {
            rate: rate.clamp(0.0, 1.0),
            draw: Draw::Seeded(Mutex::new(StdRng::seed_from_u64(seed))),
        }
    }

    pub fn rate(&self) -> f64 {
        self.rate
    }

    pub fn should_sample(&self) -> bool {
        let sample: f64 = match &self.draw {
            Draw::Thread => rand::rng().random(),
            Draw::Seeded(rng) => rng.lock().random(),
        };
        sample < self.rate
    }
}

impl Default for ClickSampler {
    fn default() -> Self {
        Self::new(DEFAULT_SAMPLE_RATE)
    }
}
