//! Multi-tap delay.
//!
//! One mono ring fed with the stereo mean, up to eight taps reading at
//! independent times with independent feedback and pan. All taps share a
//! low-pass filter in the feedback path, so repeats darken as they
//! recirculate. Feedback re-injects into the slot just written, before
//! the write position advances — a tap's output after n round trips is
//! its input scaled by feedbackⁿ.

use cadenza_core::{lerp, DelayLine, Effect, StateVariableFilter};
use libm::roundf;

/// Maximum number of taps.
pub const MAX_TAPS: usize = 8;

/// One delay tap.
#[derive(Debug, Clone, Copy)]
struct Tap {
    time_seconds: f32,
    feedback: f32,
    pan: f32,
}

/// Multi-tap stereo delay.
///
/// ## Parameters
///
/// - `max_time`: ring length in seconds, fixed at construction
/// - per tap: `time_seconds`, `feedback` [0, 0.99], `pan` [0, 1]
/// - `feedback_cutoff`: shared feedback low-pass, default 5000 Hz
/// - `mix`: [0, 1], default 0.5
///
/// # Example
///
/// ```rust
/// use cadenza_effects::MultiTapDelay;
/// use cadenza_core::Effect;
///
/// let mut delay = MultiTapDelay::new(48000.0, 2.0);
/// delay.add_tap(0.25, 0.5, 0.3);
/// delay.add_tap(0.375, 0.4, 0.7);
/// let (l, r) = delay.process_stereo(0.5, 0.5);
/// ```
#[derive(Debug, Clone)]
pub struct MultiTapDelay {
    buffer: DelayLine,
    taps: Vec<Tap>,
    feedback_filter: StateVariableFilter,
    mix: f32,
    sample_rate: f32,
}

impl MultiTapDelay {
    /// Create a delay with a ring sized for `max_time` seconds.
    pub fn new(sample_rate: f32, max_time: f32) -> Self {
        let mut feedback_filter = StateVariableFilter::new(sample_rate);
        feedback_filter.set_cutoff(5000.0);

        Self {
            buffer: DelayLine::from_seconds(sample_rate, max_time.max(0.01)),
            taps: Vec::with_capacity(MAX_TAPS),
            feedback_filter,
            mix: 0.5,
            sample_rate,
        }
    }

    /// Add a tap. Silently ignored once [`MAX_TAPS`] are present (the
    /// chain rejects structural overflow; a full tap set is a saturated
    /// parameter, not an error).
    pub fn add_tap(&mut self, time_seconds: f32, feedback: f32, pan: f32) {
        if self.taps.len() < MAX_TAPS {
            self.taps.push(Tap {
                time_seconds: time_seconds.max(0.0),
                feedback: feedback.clamp(0.0, 0.99),
                pan: pan.clamp(0.0, 1.0),
            });
        }
    }

    /// Remove all taps.
    pub fn clear_taps(&mut self) {
        self.taps.clear();
    }

    /// Number of active taps.
    pub fn num_taps(&self) -> usize {
        self.taps.len()
    }

    /// Set the shared feedback-path low-pass cutoff in Hz.
    pub fn set_feedback_cutoff(&mut self, hz: f32) {
        self.feedback_filter.set_cutoff(hz);
    }

    /// Set dry/wet mix in [0, 1].
    pub fn set_mix(&mut self, mix: f32) {
        self.mix = mix.clamp(0.0, 1.0);
    }

    /// Current dry/wet mix.
    pub fn mix(&self) -> f32 {
        self.mix
    }
}

impl Effect for MultiTapDelay {
    #[inline]
    fn process_stereo(&mut self, left: f32, right: f32) -> (f32, f32) {
        let mono_in = (left + right) * 0.5;
        self.buffer.store(mono_in);

        let mut delayed_l = 0.0;
        let mut delayed_r = 0.0;

        for tap in &self.taps {
            let delay_samples = roundf(tap.time_seconds * self.sample_rate) as usize;
            let tap_out = self.buffer.read_back(delay_samples) * tap.feedback;
            let tap_out = self.feedback_filter.process(tap_out);

            delayed_l += tap_out * (1.0 - tap.pan);
            delayed_r += tap_out * tap.pan;
        }

        let out_l = lerp(left, delayed_l, self.mix);
        let out_r = lerp(right, delayed_r, self.mix);

        // Recirculate into the slot written this sample, then advance.
        self.buffer.add((delayed_l + delayed_r) * 0.5);
        self.buffer.advance();

        (out_l, out_r)
    }

    fn is_true_stereo(&self) -> bool {
        true
    }

    fn set_sample_rate(&mut self, sample_rate: f32) {
        self.sample_rate = sample_rate;
        self.feedback_filter.set_sample_rate(sample_rate);
    }

    fn reset(&mut self) {
        self.buffer.clear();
        self.feedback_filter.reset();
    }
}
