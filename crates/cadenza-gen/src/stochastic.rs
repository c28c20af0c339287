//! Stochastic step sequencer.
//!
//! A fixed loop of steps, each carrying its own trigger probability,
//! note, velocity, and duration. Every call advances the step cursor;
//! whether the step actually fires is a fresh dice roll scaled by a
//! global density control, and fired velocities get a touch of random
//! variance so nothing machine-guns.

use cadenza_core::Xorshift32;

/// Maximum number of steps.
pub const MAX_STEPS: usize = 64;

/// One sequencer step.
#[derive(Debug, Clone, Copy)]
pub struct Step {
    /// Trigger probability in [0, 1].
    pub prob: f32,
    /// MIDI note emitted when the step fires.
    pub note: i32,
    /// Base velocity in [0, 1].
    pub velocity: f32,
    /// Duration in beats.
    pub duration: f32,
}

impl Default for Step {
    fn default() -> Self {
        Self {
            prob: 0.5,
            note: 60,
            velocity: 0.8,
            duration: 1.0,
        }
    }
}

/// A fired step with its randomized velocity.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StepTrigger {
    /// MIDI note.
    pub note: i32,
    /// Velocity after variance, clamped to [0, 1].
    pub velocity: f32,
    /// Duration in beats.
    pub duration: f32,
}

/// Probabilistic step sequencer.
///
/// ## Parameters
///
/// - `density`: global probability scale in [0, 1], default 1
/// - `velocity_variance`: width of the uniform velocity jitter, default
///   0.1
///
/// # Example
///
/// ```rust
/// use cadenza_gen::StochasticSequencer;
///
/// let mut seq = StochasticSequencer::new(16, 42);
/// if let Some(trigger) = seq.advance() {
///     assert!((0.0..=1.0).contains(&trigger.velocity));
/// }
/// ```
#[derive(Debug, Clone)]
pub struct StochasticSequencer {
    steps: [Step; MAX_STEPS],
    num_steps: usize,
    current_step: usize,
    density: f32,
    velocity_variance: f32,
    rng: Xorshift32,
}

impl StochasticSequencer {
    /// Create a sequencer with `num_steps` default steps (clamped to
    /// [1, 64]).
    pub fn new(num_steps: usize, seed: u32) -> Self {
        Self {
            steps: [Step::default(); MAX_STEPS],
            num_steps: num_steps.clamp(1, MAX_STEPS),
            current_step: 0,
            density: 1.0,
            velocity_variance: 0.1,
            rng: Xorshift32::new(seed),
        }
    }

    /// Number of steps in the loop.
    pub fn num_steps(&self) -> usize {
        self.num_steps
    }

    /// Configure one step; out-of-range indices are ignored.
    pub fn set_step(&mut self, index: usize, step: Step) {
        if index < self.num_steps {
            self.steps[index] = Step {
                prob: step.prob.clamp(0.0, 1.0),
                velocity: step.velocity.clamp(0.0, 1.0),
                ..step
            };
        }
    }

    /// Set the global density scale, clamped to [0, 1].
    pub fn set_density(&mut self, density: f32) {
        self.density = density.clamp(0.0, 1.0);
    }

    /// Set the velocity jitter width, clamped to [0, 1].
    pub fn set_velocity_variance(&mut self, variance: f32) {
        self.velocity_variance = variance.clamp(0.0, 1.0);
    }

    /// The step the next `advance()` call will evaluate.
    pub fn current_step(&self) -> usize {
        self.current_step
    }

    /// Rewind to step zero.
    pub fn reset(&mut self) {
        self.current_step = 0;
    }

    /// Evaluate the current step and move the cursor.
    ///
    /// Returns `Some` iff the dice roll lands under
    /// `step.prob · density`.
    pub fn advance(&mut self) -> Option<StepTrigger> {
        let step = self.steps[self.current_step];
        self.current_step = (self.current_step + 1) % self.num_steps;

        if self.rng.next_f32() > step.prob * self.density {
            return None;
        }

        let velocity = (step.velocity + (self.rng.next_f32() - 0.5) * self.velocity_variance)
            .clamp(0.0, 1.0);

        Some(StepTrigger {
            note: step.note,
            velocity,
            duration: step.duration,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cursor_wraps_around_loop() {
        let mut seq = StochasticSequencer::new(4, 1);
        assert_eq!(seq.current_step(), 0);
        for _ in 0..4 {
            seq.advance();
        }
        assert_eq!(seq.current_step(), 0);
    }

    #[test]
    fn certain_steps_always_fire() {
        let mut seq = StochasticSequencer::new(8, 2);
        for i in 0..8 {
            seq.set_step(
                i,
                Step {
                    prob: 1.0,
                    ..Step::default()
                },
            );
        }
        for _ in 0..64 {
            assert!(seq.advance().is_some());
        }
    }

    #[test]
    fn zero_density_never_fires() {
        let mut seq = StochasticSequencer::new(8, 3);
        seq.set_density(0.0);
        for _ in 0..64 {
            assert!(seq.advance().is_none());
        }
    }

    #[test]
    fn density_scales_trigger_rate() {
        let count = |density: f32| {
            let mut seq = StochasticSequencer::new(16, 77);
            seq.set_density(density);
            (0..10_000).filter(|_| seq.advance().is_some()).count()
        };
        let full = count(1.0);
        let half = count(0.5);
        assert!(half < full);
        // Default step probability is 0.5: roughly 50% and 25% rates.
        assert!((4_500..5_500).contains(&full), "full {full}");
        assert!((2_000..3_000).contains(&half), "half {half}");
    }

    #[test]
    fn velocity_stays_clamped_under_variance() {
        let mut seq = StochasticSequencer::new(4, 5);
        for i in 0..4 {
            seq.set_step(
                i,
                Step {
                    prob: 1.0,
                    velocity: 1.0,
                    ..Step::default()
                },
            );
        }
        seq.set_velocity_variance(1.0);
        for _ in 0..1000 {
            let trigger = seq.advance().unwrap();
            assert!((0.0..=1.0).contains(&trigger.velocity));
        }
    }

    #[test]
    fn deterministic_per_seed() {
        let mut a = StochasticSequencer::new(16, 9);
        let mut b = StochasticSequencer::new(16, 9);
        for _ in 0..500 {
            assert_eq!(a.advance(), b.advance());
        }
    }
}
