use crate::types::LandmarkPoint;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

/// Produces the decorative dot constellation for one mount of the screen.
pub trait PointGenerator {
    fn generate(&mut self, count: usize) -> Vec<LandmarkPoint>;
}

// Dots stay inside the oval face guide.
const X_RANGE: (f32, f32) = (30.0, 70.0);
const Y_RANGE: (f32, f32) = (25.0, 75.0);

pub struct RandomPoints<R: Rng> {
    rng: R,
    max_reveal_delay: f32,
}

impl RandomPoints<StdRng> {
    pub fn seeded(seed: u64, max_reveal_delay: f32) -> Self {
        Self::with_rng(StdRng::seed_from_u64(seed), max_reveal_delay)
    }

    pub fn from_entropy(max_reveal_delay: f32) -> Self {
        Self::with_rng(StdRng::from_os_rng(), max_reveal_delay)
    }
}

impl<R: Rng> RandomPoints<R> {
    pub fn with_rng(rng: R, max_reveal_delay: f32) -> Self {
        Self {
            rng,
            // NaN and infinity would make the range sampler panic
            max_reveal_delay: if max_reveal_delay.is_finite() { max_reveal_delay.max(0.0) } else { 0.0 },
        }
    }
}

impl<R: Rng> PointGenerator for RandomPoints<R> {
    fn generate(&mut self, count: usize) -> Vec<LandmarkPoint> {
        (0..count)
            .map(|i| LandmarkPoint {
                id: i as u32,
                x: self.rng.random_range(X_RANGE.0..X_RANGE.1),
                y: self.rng.random_range(Y_RANGE.0..Y_RANGE.1),
                reveal_delay: if self.max_reveal_delay > 0.0 {
                    self.rng.random_range(0.0..self.max_reveal_delay)
                } else {
                    0.0
                },
            })
            .collect()
    }
}

/// Always returns the same points. Handy for tests and screenshots.
pub struct FixedPoints(pub Vec<LandmarkPoint>);

impl PointGenerator for FixedPoints {
    fn generate(&mut self, count: usize) -> Vec<LandmarkPoint> {
        self.0.iter().copied().take(count).collect()
    }
}
