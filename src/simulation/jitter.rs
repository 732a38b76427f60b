//! Seeded tie-breaker for exactly coincident points
//!
//! Two points sharing an axis coordinate give the collision pass no direction
//! to push along. `Jitter` supplies a tiny offset in `(-5e-7, 5e-7)` from a
//! seeded generator so the split is reproducible run to run.

use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};

#[derive(Debug, Clone)]
pub struct Jitter {
    rng: SmallRng,
}

impl Jitter {
    pub fn new(seed: u64) -> Self {
        Self { rng: SmallRng::seed_from_u64(seed) }
    }

    pub fn offset(&mut self) -> f64 {
        (self.rng.random::<f64>() - 0.5) * 1e-6
    }
}
