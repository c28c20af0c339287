//! Bitcrusher: sample-rate and bit-depth reduction.
//!
//! Two lo-fi stages in series: a sample-and-hold that repeats each held
//! value `reduction` times (dividing the effective sample rate by an
//! integer), then uniform quantization to `bit_depth` bits.

use cadenza_core::{lerp, Effect};
use libm::{powf, roundf};

/// Lo-fi decimator and quantizer.
///
/// ## Parameters
///
/// - `reduction`: integer sample-rate divisor ≥ 1, default 1 (off)
/// - `bit_depth`: 1-16 bits, default 12
/// - `mix`: [0, 1], default 1.0
///
/// # Example
///
/// ```rust
/// use cadenza_effects::Bitcrusher;
/// use cadenza_core::Effect;
///
/// let mut crusher = Bitcrusher::new(48000.0);
/// crusher.set_reduction(4);
/// crusher.set_bit_depth(6);
/// let out = crusher.process(0.5);
/// ```
#[derive(Debug, Clone)]
pub struct Bitcrusher {
    reduction: u32,
    bit_depth: u32,
    mix: f32,
    hold_sample: f32,
    hold_counter: u32,
}

impl Bitcrusher {
    /// Create a bitcrusher. The sample rate is taken for interface
    /// symmetry; nothing here depends on it.
    pub fn new(_sample_rate: f32) -> Self {
        Self {
            reduction: 1,
            bit_depth: 12,
            mix: 1.0,
            hold_sample: 0.0,
            hold_counter: 0,
        }
    }

    /// Set the sample-rate divisor (≥ 1).
    pub fn set_reduction(&mut self, reduction: u32) {
        self.reduction = reduction.max(1);
    }

    /// Current sample-rate divisor.
    pub fn reduction(&self) -> u32 {
        self.reduction
    }

    /// Set the quantization depth, clamped to [1, 16] bits.
    pub fn set_bit_depth(&mut self, bits: u32) {
        self.bit_depth = bits.clamp(1, 16);
    }

    /// Current bit depth.
    pub fn bit_depth(&self) -> u32 {
        self.bit_depth
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

impl Effect for Bitcrusher {
    #[inline]
    fn process(&mut self, input: f32) -> f32 {
        // Sample & hold: refresh every `reduction` samples.
        if self.hold_counter == 0 {
            self.hold_sample = input;
        }
        self.hold_counter += 1;
        if self.hold_counter >= self.reduction {
            self.hold_counter = 0;
        }

        let quant = powf(2.0, (self.bit_depth - 1) as f32);
        let crushed = roundf(self.hold_sample * quant) / quant;

        lerp(input, crushed, self.mix)
    }

    fn set_sample_rate(&mut self, _sample_rate: f32) {}

    fn reset(&mut self) {
        self.hold_sample = 0.0;
        self.hold_counter = 0;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn no_reduction_high_depth_is_nearly_transparent() {
        let mut crusher = Bitcrusher::new(48000.0);
        crusher.set_bit_depth(16);
        for i in 0..1000 {
            let x = libm::sinf(i as f32 * 0.1);
            let out = crusher.process(x);
            assert!((out - x).abs() < 1.0 / 16384.0);
        }
    }

    #[test]
    fn hold_repeats_values() {
        let mut crusher = Bitcrusher::new(48000.0);
        crusher.set_reduction(4);
        crusher.set_bit_depth(16);

        let inputs = [0.1f32, 0.2, 0.3, 0.4, 0.5, 0.6, 0.7, 0.8];
        let outputs: Vec<f32> = inputs.iter().map(|&x| crusher.process(x)).collect();
        // First four samples hold the first input, next four hold the fifth.
        for i in 0..4 {
            assert!((outputs[i] - outputs[0]).abs() < 1e-6);
        }
        for i in 4..8 {
            assert!((outputs[i] - outputs[4]).abs() < 1e-6);
        }
        assert!((outputs[0] - outputs[4]).abs() > 0.1);
    }

    #[test]
    fn quantization_snaps_to_grid() {
        let mut crusher = Bitcrusher::new(48000.0);
        crusher.set_bit_depth(3); // levels of 0.25
        for i in 0..100 {
            let x = (i as f32 / 50.0) - 1.0;
            let out = crusher.process(x);
            let steps = out * 4.0;
            assert!(
                (steps - roundf(steps)).abs() < 1e-5,
                "output {out} not on the 3-bit grid"
            );
        }
    }

    #[test]
    fn reduction_lowers_zero_crossing_rate() {
        let count_crossings = |reduction: u32| {
            let mut crusher = Bitcrusher::new(48000.0);
            crusher.set_reduction(reduction);
            let mut prev = 0.0f32;
            let mut crossings = 0;
            for i in 0..48_000 {
                let out = crusher.process(libm::sinf(i as f32 * 0.9));
                if (out > 0.0) != (prev > 0.0) {
                    crossings += 1;
                }
                prev = out;
            }
            crossings
        };
        assert!(count_crossings(16) < count_crossings(1));
    }
}
