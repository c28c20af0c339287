//! Waveshaping distortion.
//!
//! Eight shaper curves behind one drive control, followed by a low-pass
//! tone filter. The shapers range from polite (soft clip) to destructive
//! (foldback, Chebyshev); the tone filter keeps the added harmonics from
//! turning to fizz.

use cadenza_core::{fast_tanh, lerp, Effect, StateVariableFilter};
use libm::{expf, floorf, powf, roundf};

/// Shaper curve selection.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum ShaperType {
    /// tanh saturation, odd harmonics.
    #[default]
    SoftClip,
    /// Abrupt clamp at ±1.
    HardClip,
    /// Asymmetric exponential with a 10% dry blend.
    Tube,
    /// Triangle-wave reflection around ±1.
    Foldback,
    /// Quantize to `bit_depth` levels.
    Bitcrush,
    /// Full-wave rectification.
    Rectify,
    /// Chebyshev polynomial T₁…T₅ selected by `order`.
    Chebyshev,
    /// `tanh(x + bias) − tanh(bias)`, even harmonics from the offset.
    Asymmetric,
}

/// Chebyshev polynomial of the first kind, orders 1-5.
fn chebyshev(x: f32, order: u32) -> f32 {
    match order {
        1 => x,
        2 => 2.0 * x * x - 1.0,
        3 => 4.0 * x * x * x - 3.0 * x,
        4 => 8.0 * x * x * x * x - 8.0 * x * x + 1.0,
        5 => 16.0 * x * x * x * x * x - 20.0 * x * x * x + 5.0 * x,
        _ => x,
    }
}

/// Closed-form triangle-wave foldback around ±threshold.
///
/// Equivalent to reflecting the input repeatedly at the threshold, in
/// constant time.
fn foldback(input: f32, threshold: f32) -> f32 {
    if input.abs() <= threshold {
        return input;
    }
    let t2 = 2.0 * threshold;
    let normalized = (input + threshold) / t2;
    let folded = (normalized - floorf(normalized)) * t2 - threshold;
    if (floorf(normalized) as i32) % 2 == 0 {
        folded
    } else {
        -folded
    }
}

/// Multi-curve waveshaper with tone control.
///
/// ## Parameters
///
/// - `shaper`: curve selection (default soft clip)
/// - `drive`: input pre-gain, ≥ 0, default 1
/// - `bit_depth`: 1-16 bits for the bitcrush curve, default 8
/// - `order`: 1-5 for the Chebyshev curve, default 3
/// - `bias`: offset for the asymmetric curve, default 0.2
/// - `tone`: output low-pass cutoff in Hz, default 8000
/// - `mix`: [0, 1], default 1.0
///
/// # Example
///
/// ```rust
/// use cadenza_effects::{Distortion, ShaperType};
/// use cadenza_core::Effect;
///
/// let mut dist = Distortion::new(48000.0);
/// dist.set_shaper(ShaperType::Tube);
/// dist.set_drive(4.0);
/// let out = dist.process(0.5);
/// ```
#[derive(Debug, Clone)]
pub struct Distortion {
    shaper: ShaperType,
    drive: f32,
    bit_depth: u32,
    order: u32,
    bias: f32,
    tone_filter: StateVariableFilter,
    mix: f32,
}

impl Distortion {
    /// Create a distortion at the given sample rate.
    pub fn new(sample_rate: f32) -> Self {
        let mut tone_filter = StateVariableFilter::new(sample_rate);
        tone_filter.set_cutoff(8000.0);

        Self {
            shaper: ShaperType::SoftClip,
            drive: 1.0,
            bit_depth: 8,
            order: 3,
            bias: 0.2,
            tone_filter,
            mix: 1.0,
        }
    }

    /// Select the shaper curve.
    pub fn set_shaper(&mut self, shaper: ShaperType) {
        self.shaper = shaper;
    }

    /// Set the input pre-gain (≥ 0).
    pub fn set_drive(&mut self, drive: f32) {
        self.drive = drive.max(0.0);
    }

    /// Set bitcrush depth, clamped to [1, 16] bits.
    pub fn set_bit_depth(&mut self, bits: u32) {
        self.bit_depth = bits.clamp(1, 16);
    }

    /// Set Chebyshev order, clamped to [1, 5].
    pub fn set_order(&mut self, order: u32) {
        self.order = order.clamp(1, 5);
    }

    /// Set the asymmetric-curve bias.
    pub fn set_bias(&mut self, bias: f32) {
        self.bias = bias;
    }

    /// Set the tone low-pass cutoff in Hz.
    pub fn set_tone(&mut self, hz: f32) {
        self.tone_filter.set_cutoff(hz);
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

impl Effect for Distortion {
    #[inline]
    fn process(&mut self, input: f32) -> f32 {
        let driven = input * self.drive;

        let shaped = match self.shaper {
            ShaperType::SoftClip => fast_tanh(driven),
            ShaperType::HardClip => driven.clamp(-1.0, 1.0),
            ShaperType::Tube => {
                let curved = if driven >= 0.0 {
                    1.0 - expf(-driven)
                } else {
                    -1.0 + expf(driven)
                };
                curved * 0.9 + driven * 0.1
            }
            ShaperType::Foldback => foldback(driven, 1.0),
            ShaperType::Bitcrush => {
                let quant = powf(2.0, (self.bit_depth - 1) as f32);
                roundf(driven * quant) / quant
            }
            ShaperType::Rectify => driven.abs(),
            ShaperType::Chebyshev => chebyshev(driven.clamp(-1.0, 1.0), self.order),
            ShaperType::Asymmetric => fast_tanh(driven + self.bias) - fast_tanh(self.bias),
        };

        let toned = self.tone_filter.process(shaped);
        lerp(input, toned, self.mix)
    }

    fn set_sample_rate(&mut self, sample_rate: f32) {
        self.tone_filter.set_sample_rate(sample_rate);
    }

    fn reset(&mut self) {
        self.tone_filter.reset();
    }
}
