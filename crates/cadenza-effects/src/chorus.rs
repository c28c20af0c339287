//! Multi-voice chorus.
//!
//! Up to eight delayed copies of the mono-summed input, each modulated by
//! its own LFO phase and placed at its own pan position. Initial phases
//! fan out evenly across the cycle and pans spread evenly across the
//! field, so a single knob turn yields a wide ensemble instead of eight
//! copies of the same wobble.

use core::f32::consts::TAU;
use libm::sinf;

use cadenza_core::{lerp, DelayLine, Effect};

/// Maximum number of chorus voices.
pub const MAX_VOICES: usize = 8;

/// Base delay ahead of modulation, in seconds (5 ms).
const BASE_DELAY: f32 = 0.005;

/// Ring capacity in seconds (100 ms).
const BUFFER_SECONDS: f32 = 0.1;

/// Ensemble chorus.
///
/// ## Parameters
///
/// - `num_voices`: 1-8, fixed at construction
/// - `rate`: LFO rate in Hz, default 0.5
/// - `depth`: modulation depth in seconds, default 0.003 (3 ms)
/// - `mix`: [0, 1], default 0.5
///
/// # Example
///
/// ```rust
/// use cadenza_effects::Chorus;
/// use cadenza_core::Effect;
///
/// let mut chorus = Chorus::new(48000.0, 4);
/// chorus.set_rate(0.8);
/// chorus.set_depth(0.004);
/// let (l, r) = chorus.process_stereo(0.5, 0.5);
/// ```
#[derive(Debug, Clone)]
pub struct Chorus {
    buffer: DelayLine,
    phases: [f32; MAX_VOICES],
    pans: [f32; MAX_VOICES],
    num_voices: usize,
    rate: f32,
    depth: f32,
    mix: f32,
    sample_rate: f32,
}

impl Chorus {
    /// Create a chorus with `num_voices` voices (clamped to 1-8).
    pub fn new(sample_rate: f32, num_voices: usize) -> Self {
        let num_voices = num_voices.clamp(1, MAX_VOICES);
        let mut phases = [0.0f32; MAX_VOICES];
        let mut pans = [0.5f32; MAX_VOICES];
        for i in 0..num_voices {
            phases[i] = i as f32 / num_voices as f32;
            pans[i] = if num_voices > 1 {
                i as f32 / (num_voices - 1) as f32
            } else {
                0.5
            };
        }

        Self {
            buffer: DelayLine::from_seconds(sample_rate, BUFFER_SECONDS),
            phases,
            pans,
            num_voices,
            rate: 0.5,
            depth: 0.003,
            mix: 0.5,
            sample_rate,
        }
    }

    /// Set the LFO rate in Hz, clamped to [0.01, 10].
    pub fn set_rate(&mut self, hz: f32) {
        self.rate = hz.clamp(0.01, 10.0);
    }

    /// Set the modulation depth in seconds, clamped so the longest
    /// modulated delay stays inside the ring.
    pub fn set_depth(&mut self, seconds: f32) {
        self.depth = seconds.clamp(0.0, BUFFER_SECONDS - BASE_DELAY - 0.001);
    }

    /// Set dry/wet mix in [0, 1].
    pub fn set_mix(&mut self, mix: f32) {
        self.mix = mix.clamp(0.0, 1.0);
    }

    /// Current dry/wet mix.
    pub fn mix(&self) -> f32 {
        self.mix
    }

    /// Number of voices.
    pub fn num_voices(&self) -> usize {
        self.num_voices
    }
}

impl Effect for Chorus {
    #[inline]
    fn process_stereo(&mut self, left: f32, right: f32) -> (f32, f32) {
        let mono = (left + right) * 0.5;
        self.buffer.store(mono);

        let phase_inc = self.rate / self.sample_rate;
        let mut out_l = 0.0;
        let mut out_r = 0.0;

        for v in 0..self.num_voices {
            let lfo = 0.5 + 0.5 * sinf(self.phases[v] * TAU);
            let delay_seconds = BASE_DELAY + self.depth * lfo;
            let delayed = self.buffer.read_back_lerp(delay_seconds * self.sample_rate);

            out_l += delayed * (1.0 - self.pans[v]);
            out_r += delayed * self.pans[v];

            self.phases[v] += phase_inc;
            if self.phases[v] >= 1.0 {
                self.phases[v] -= 1.0;
            }
        }

        out_l /= self.num_voices as f32;
        out_r /= self.num_voices as f32;

        self.buffer.advance();

        (lerp(left, out_l, self.mix), lerp(right, out_r, self.mix))
    }

    fn is_true_stereo(&self) -> bool {
        true
    }

    fn set_sample_rate(&mut self, sample_rate: f32) {
        self.sample_rate = sample_rate;
    }

    fn reset(&mut self) {
        self.buffer.clear();
        // Restore the even phase fan.
        for i in 0..self.num_voices {
            self.phases[i] = i as f32 / self.num_voices as f32;
        }
    }
}
