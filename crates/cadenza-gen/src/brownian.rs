//! Brownian motion over a bounded continuous range.
//!
//! A momentum-smoothed random walk with optional attraction toward a
//! target value and elastic reflection at the bounds (velocity halves
//! and inverts). Useful for slowly wandering parameters as much as for
//! melody contours.

use cadenza_core::Xorshift32;

/// Momentum random walker.
///
/// ## Parameters
///
/// - `step_size`: acceleration range, default (max − min) · 0.1
/// - `momentum`: velocity smoothing in [0, 1), default 0.5
/// - `attraction`: pull toward `target`, default 0 (off)
///
/// # Example
///
/// ```rust
/// use cadenza_gen::Brownian;
///
/// let mut walker = Brownian::new(0.0, 1.0, 42);
/// let value = walker.next_value();
/// assert!((0.0..=1.0).contains(&value));
/// ```
#[derive(Debug, Clone)]
pub struct Brownian {
    min: f32,
    max: f32,
    position: f32,
    velocity: f32,
    step_size: f32,
    momentum: f32,
    attraction: f32,
    target: f32,
    rng: Xorshift32,
}

impl Brownian {
    /// Create a walker over [min, max], starting at the midpoint.
    pub fn new(min: f32, max: f32, seed: u32) -> Self {
        let (min, max) = if min <= max { (min, max) } else { (max, min) };
        Self {
            min,
            max,
            position: (min + max) * 0.5,
            velocity: 0.0,
            step_size: (max - min) * 0.1,
            momentum: 0.5,
            attraction: 0.0,
            target: (min + max) * 0.5,
            rng: Xorshift32::new(seed),
        }
    }

    /// Set the acceleration range.
    pub fn set_step_size(&mut self, step: f32) {
        self.step_size = step.max(0.0);
    }

    /// Set momentum, clamped to [0, 0.999].
    pub fn set_momentum(&mut self, momentum: f32) {
        self.momentum = momentum.clamp(0.0, 0.999);
    }

    /// Set the attraction strength (0 disables) and its target.
    pub fn set_attraction(&mut self, attraction: f32, target: f32) {
        self.attraction = attraction.max(0.0);
        self.target = target.clamp(self.min, self.max);
    }

    /// Current position without advancing.
    pub fn position(&self) -> f32 {
        self.position
    }

    /// Advance one step and return the new position.
    pub fn next_value(&mut self) -> f32 {
        let mut accel = self.rng.next_bipolar() * self.step_size;

        if self.attraction > 0.0 {
            accel += (self.target - self.position) * self.attraction;
        }

        self.velocity = self.velocity * self.momentum + accel * (1.0 - self.momentum);
        self.position += self.velocity;

        // Elastic reflection: clamp and bounce with half the speed.
        if self.position < self.min {
            self.position = self.min;
            self.velocity = -self.velocity * 0.5;
        }
        if self.position > self.max {
            self.position = self.max;
            self.velocity = -self.velocity * 0.5;
        }

        self.position
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn stays_within_bounds() {
        let mut walker = Brownian::new(-1.0, 1.0, 7);
        walker.set_step_size(0.5);
        for _ in 0..100_000 {
            let v = walker.next_value();
            assert!((-1.0..=1.0).contains(&v), "escaped: {v}");
        }
    }

    #[test]
    fn deterministic_per_seed() {
        let mut a = Brownian::new(0.0, 10.0, 42);
        let mut b = Brownian::new(0.0, 10.0, 42);
        for _ in 0..1000 {
            assert_eq!(a.next_value(), b.next_value());
        }
    }

    #[test]
    fn starts_at_midpoint() {
        let walker = Brownian::new(2.0, 4.0, 1);
        assert_eq!(walker.position(), 3.0);
    }

    #[test]
    fn attraction_pulls_toward_target() {
        let mut walker = Brownian::new(0.0, 100.0, 9);
        walker.set_step_size(0.1);
        walker.set_attraction(0.2, 90.0);
        for _ in 0..2000 {
            walker.next_value();
        }
        assert!(
            (walker.position() - 90.0).abs() < 10.0,
            "position {} should orbit the target",
            walker.position()
        );
    }

    #[test]
    fn momentum_smooths_motion() {
        let roughness = |momentum: f32| {
            let mut walker = Brownian::new(0.0, 1.0, 5);
            walker.set_momentum(momentum);
            let mut prev_v = 0.0f32;
            let mut total = 0.0f32;
            let mut prev = walker.position();
            for _ in 0..5000 {
                let p = walker.next_value();
                let v = p - prev;
                total += (v - prev_v).abs();
                prev_v = v;
                prev = p;
            }
            total
        };
        assert!(roughness(0.95) < roughness(0.0));
    }

    #[test]
    fn inverted_bounds_are_normalized() {
        let walker = Brownian::new(5.0, -5.0, 1);
        assert_eq!(walker.position(), 0.0);
        assert!(walker.min < walker.max);
    }
}
