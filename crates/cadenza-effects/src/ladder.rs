//! Moog-style ladder filter.
//!
//! Four cascaded one-pole stages with resonance fed back from the last
//! stage to the input sum, and tanh saturation at the input node. The
//! saturation is what gives the ladder its character when the resonance
//! pushes the feedback hot.

use cadenza_core::{fast_tanh, wet_dry_mix, Effect};

/// Four-stage ladder low-pass filter.
///
/// ## Parameters
///
/// - `cutoff`: Hz, clamped to [20, sr × 0.45], default 1000;
///   `tune = 1.16 · cutoff/sr`
/// - `resonance`: [0, 1], default 0; feedback gain
///   `4 · resonance · (1 + 0.22 · tune)`
/// - `saturate`: tanh at the input node, default on
/// - `mix`: [0, 1], default 1.0
///
/// # Example
///
/// ```rust
/// use cadenza_effects::LadderFilter;
/// use cadenza_core::Effect;
///
/// let mut ladder = LadderFilter::new(48000.0);
/// ladder.set_cutoff(900.0);
/// ladder.set_resonance(0.6);
/// let out = ladder.process(0.5);
/// ```
#[derive(Debug, Clone)]
pub struct LadderFilter {
    stage: [f32; 4],
    delay: [f32; 4],
    tune: f32,
    res_quad: f32,
    cutoff: f32,
    resonance: f32,
    saturate: bool,
    mix: f32,
    sample_rate: f32,
}

impl LadderFilter {
    /// Create a ladder filter at the given sample rate.
    pub fn new(sample_rate: f32) -> Self {
        let mut filter = Self {
            stage: [0.0; 4],
            delay: [0.0; 4],
            tune: 0.0,
            res_quad: 0.0,
            cutoff: 1000.0,
            resonance: 0.0,
            saturate: true,
            mix: 1.0,
            sample_rate,
        };
        filter.set_cutoff(filter.cutoff);
        filter
    }

    /// Set cutoff frequency in Hz. Clamped to [20, sr × 0.45].
    pub fn set_cutoff(&mut self, cutoff: f32) {
        self.cutoff = cutoff.clamp(20.0, self.sample_rate * 0.45);
        self.tune = 1.16 * self.cutoff / self.sample_rate;
        // Feedback gain tracks the tuning.
        self.res_quad = 4.0 * self.resonance * (1.0 + 0.22 * self.tune);
    }

    /// Current cutoff in Hz.
    pub fn cutoff(&self) -> f32 {
        self.cutoff
    }

    /// Set resonance in [0, 1].
    pub fn set_resonance(&mut self, resonance: f32) {
        self.resonance = resonance.clamp(0.0, 1.0);
        self.res_quad = 4.0 * self.resonance * (1.0 + 0.22 * self.tune);
    }

    /// Current resonance.
    pub fn resonance(&self) -> f32 {
        self.resonance
    }

    /// Enable or disable input saturation.
    pub fn set_saturate(&mut self, on: bool) {
        self.saturate = on;
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

impl Effect for LadderFilter {
    #[inline]
    fn process(&mut self, input: f32) -> f32 {
        let mut x = input - self.res_quad * self.delay[3];

        if self.saturate {
            x = fast_tanh(x);
        }

        self.stage[0] = x * self.tune + self.delay[0] * (1.0 - self.tune);
        self.delay[0] = self.stage[0];

        for i in 1..4 {
            self.stage[i] = self.stage[i - 1] * self.tune + self.delay[i] * (1.0 - self.tune);
            self.delay[i] = self.stage[i];
        }

        wet_dry_mix(input, self.stage[3], self.mix)
    }

    fn set_sample_rate(&mut self, sample_rate: f32) {
        self.sample_rate = sample_rate;
        self.set_cutoff(self.cutoff);
    }

    fn reset(&mut self) {
        self.stage = [0.0; 4];
        self.delay = [0.0; 4];
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn passes_dc() {
        let mut ladder = LadderFilter::new(48000.0);
        ladder.set_cutoff(2000.0);
        let mut out = 0.0;
        for _ in 0..20_000 {
            out = ladder.process(0.5);
        }
        assert!((out - 0.5).abs() < 0.05, "DC should pass, got {out}");
    }

    #[test]
    fn attenuates_above_cutoff() {
        let sr = 48000.0;
        let mut ladder = LadderFilter::new(sr);
        ladder.set_cutoff(200.0);
        ladder.set_saturate(false);

        let omega = core::f32::consts::TAU * 6000.0 / sr;
        let mut rms_in = 0.0f32;
        let mut rms_out = 0.0f32;
        for i in 0..9600 {
            let x = libm::sinf(i as f32 * omega) * 0.5;
            let y = ladder.process(x);
            if i > 4800 {
                rms_in += x * x;
                rms_out += y * y;
            }
        }
        assert!(
            rms_out < rms_in * 0.001,
            "24 dB/oct should crush 6 kHz, ratio {}",
            rms_out / rms_in
        );
    }

    #[test]
    fn resonance_stays_stable() {
        let mut ladder = LadderFilter::new(48000.0);
        ladder.set_cutoff(1000.0);
        ladder.set_resonance(1.0);
        for i in 0..50_000 {
            let x = libm::sinf(i as f32 * 0.13);
            let out = ladder.process(x);
            assert!(out.is_finite() && out.abs() < 10.0, "unstable at {i}: {out}");
        }
    }

    #[test]
    fn reset_clears_state() {
        let mut ladder = LadderFilter::new(48000.0);
        for _ in 0..100 {
            ladder.process(1.0);
        }
        ladder.reset();
        ladder.set_mix(1.0);
        // First post-reset sample only carries the direct path.
        let out = ladder.process(0.0);
        assert_eq!(out, 0.0);
    }
}
