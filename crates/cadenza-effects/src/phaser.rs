//! Swept allpass phaser.
//!
//! A cascade of up to twelve first-order allpass stages whose corner
//! frequency is swept by a sine LFO between `min_freq` and `max_freq`.
//! Summing the phase-shifted signal back against the dry input carves the
//! moving notches; global feedback from the last stage deepens them.

use core::f32::consts::{PI, TAU};
use libm::{sinf, tanf};

use cadenza_core::{lerp, Effect};

/// Maximum number of allpass stages.
pub const MAX_STAGES: usize = 12;

/// Multi-stage phaser.
///
/// ## Parameters
///
/// - `num_stages`: 1-12, fixed at construction
/// - `rate`: LFO rate in Hz, default 0.3
/// - `depth`: sweep span scale [0, 1], default 0.6
/// - `feedback`: [0, 0.95], default 0.7
/// - `min_freq` / `max_freq`: sweep bounds in Hz, defaults 200 / 4000
/// - `mix`: [0, 1], default 0.5
///
/// Stage coefficient: `a1 = (1 − tan(πf/sr)) / (1 + tan(πf/sr))`.
///
/// # Example
///
/// ```rust
/// use cadenza_effects::Phaser;
/// use cadenza_core::Effect;
///
/// let mut phaser = Phaser::new(48000.0, 6);
/// phaser.set_rate(0.5);
/// let out = phaser.process(0.5);
/// ```
#[derive(Debug, Clone)]
pub struct Phaser {
    states: [f32; MAX_STAGES],
    last_stage_out: f32,
    num_stages: usize,
    lfo_phase: f32,
    rate: f32,
    depth: f32,
    feedback: f32,
    min_freq: f32,
    max_freq: f32,
    mix: f32,
    sample_rate: f32,
}

impl Phaser {
    /// Create a phaser with `num_stages` stages (clamped to 1-12).
    pub fn new(sample_rate: f32, num_stages: usize) -> Self {
        Self {
            states: [0.0; MAX_STAGES],
            last_stage_out: 0.0,
            num_stages: num_stages.clamp(1, MAX_STAGES),
            lfo_phase: 0.0,
            rate: 0.3,
            depth: 0.6,
            feedback: 0.7,
            min_freq: 200.0,
            max_freq: 4000.0,
            mix: 0.5,
            sample_rate,
        }
    }

    /// Set the LFO rate in Hz, clamped to [0.01, 10].
    pub fn set_rate(&mut self, hz: f32) {
        self.rate = hz.clamp(0.01, 10.0);
    }

    /// Set the sweep depth in [0, 1].
    pub fn set_depth(&mut self, depth: f32) {
        self.depth = depth.clamp(0.0, 1.0);
    }

    /// Set the global feedback, clamped to [0, 0.95].
    pub fn set_feedback(&mut self, feedback: f32) {
        self.feedback = feedback.clamp(0.0, 0.95);
    }

    /// Set the sweep bounds in Hz.
    pub fn set_sweep_range(&mut self, min_hz: f32, max_hz: f32) {
        self.min_freq = min_hz.clamp(20.0, self.sample_rate * 0.45);
        self.max_freq = max_hz.clamp(self.min_freq, self.sample_rate * 0.45);
    }

    /// Set dry/wet mix in [0, 1].
    pub fn set_mix(&mut self, mix: f32) {
        self.mix = mix.clamp(0.0, 1.0);
    }

    /// Current dry/wet mix.
    pub fn mix(&self) -> f32 {
        self.mix
    }

    /// Number of allpass stages.
    pub fn num_stages(&self) -> usize {
        self.num_stages
    }
}

impl Effect for Phaser {
    #[inline]
    fn process(&mut self, input: f32) -> f32 {
        // Sweep the virtual cutoff.
        let lfo = 0.5 + 0.5 * sinf(self.lfo_phase * TAU);
        self.lfo_phase += self.rate / self.sample_rate;
        if self.lfo_phase >= 1.0 {
            self.lfo_phase -= 1.0;
        }

        let freq = self.min_freq + lfo * self.depth * (self.max_freq - self.min_freq);
        let t = tanf(PI * freq / self.sample_rate);
        let a1 = (1.0 - t) / (1.0 + t);

        let mut y = input + self.last_stage_out * self.feedback;
        for state in self.states.iter_mut().take(self.num_stages) {
            // First-order allpass, transposed direct form.
            let out = a1 * y + *state;
            *state = y - a1 * out;
            y = out;
        }
        self.last_stage_out = y;

        lerp(input, y, self.mix)
    }

    fn set_sample_rate(&mut self, sample_rate: f32) {
        self.sample_rate = sample_rate;
    }

    fn reset(&mut self) {
        self.states = [0.0; MAX_STAGES];
        self.last_stage_out = 0.0;
        self.lfo_phase = 0.0;
    }
}
