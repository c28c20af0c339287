//! Additive sine-bank oscillator.
//!
//! Sums up to 64 partials, each with a frequency ratio and amplitude and
//! its own phase accumulator. Defaults to an 8-partial harmonic series
//! with 1/n amplitude rolloff.

use core::f32::consts::TAU;
use libm::{powf, sinf};

/// Maximum number of partials.
pub const MAX_PARTIALS: usize = 64;

/// Additive oscillator.
///
/// # Example
///
/// ```rust
/// use cadenza_synth::AdditiveOscillator;
///
/// let mut osc = AdditiveOscillator::new(48000.0);
/// osc.set_harmonic_series(16, 2.0); // 16 partials, 1/n² rolloff
/// osc.set_frequency(220.0);
/// let sample = osc.process();
/// ```
#[derive(Debug, Clone)]
pub struct AdditiveOscillator {
    ratios: [f32; MAX_PARTIALS],
    amplitudes: [f32; MAX_PARTIALS],
    phases: [f32; MAX_PARTIALS],
    num_partials: usize,
    base_frequency: f32,
    sample_rate: f32,
}

impl AdditiveOscillator {
    /// Create an oscillator with the default 8-partial 1/n series.
    pub fn new(sample_rate: f32) -> Self {
        let mut osc = Self {
            ratios: [0.0; MAX_PARTIALS],
            amplitudes: [0.0; MAX_PARTIALS],
            phases: [0.0; MAX_PARTIALS],
            num_partials: 0,
            base_frequency: 440.0,
            sample_rate,
        };
        osc.set_harmonic_series(8, 1.0);
        osc
    }

    /// Set the base frequency in Hz.
    pub fn set_frequency(&mut self, freq: f32) {
        self.base_frequency = freq.max(0.0);
    }

    /// Configure an integer harmonic series: partial `i` gets ratio
    /// `i + 1` and amplitude `(1/(i+1))^rolloff`. Count is clamped to
    /// [`MAX_PARTIALS`].
    pub fn set_harmonic_series(&mut self, num_harmonics: usize, rolloff: f32) {
        self.num_partials = num_harmonics.clamp(1, MAX_PARTIALS);
        for i in 0..self.num_partials {
            self.ratios[i] = (i + 1) as f32;
            self.amplitudes[i] = powf(1.0 / (i + 1) as f32, rolloff);
        }
    }

    /// Set one partial's ratio and amplitude directly. Out-of-range
    /// indices are ignored.
    pub fn set_partial(&mut self, index: usize, ratio: f32, amplitude: f32) {
        if index < self.num_partials {
            self.ratios[index] = ratio;
            self.amplitudes[index] = amplitude;
        }
    }

    /// Number of active partials.
    pub fn num_partials(&self) -> usize {
        self.num_partials
    }

    /// Update the sample rate.
    pub fn set_sample_rate(&mut self, sample_rate: f32) {
        self.sample_rate = sample_rate;
    }

    /// Rewind all partial phases.
    pub fn reset(&mut self) {
        self.phases = [0.0; MAX_PARTIALS];
    }

    /// Generate the next sample.
    #[inline]
    pub fn process(&mut self) -> f32 {
        let mut out = 0.0;
        let base_inc = self.base_frequency / self.sample_rate;

        for i in 0..self.num_partials {
            out += self.amplitudes[i] * sinf(self.phases[i] * TAU);

            self.phases[i] += base_inc * self.ratios[i];
            if self.phases[i] >= 1.0 {
                self.phases[i] -= 1.0;
            }
        }

        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_series_has_eight_partials() {
        let osc = AdditiveOscillator::new(48000.0);
        assert_eq!(osc.num_partials(), 8);
    }

    #[test]
    fn single_partial_is_a_sine() {
        let mut osc = AdditiveOscillator::new(48000.0);
        osc.set_harmonic_series(1, 1.0);
        osc.set_frequency(440.0);
        for i in 0..1000 {
            let expected = sinf(i as f32 * 440.0 / 48000.0 * TAU);
            let got = osc.process();
            assert!((got - expected).abs() < 1e-3, "sample {i}");
        }
    }

    #[test]
    fn rolloff_shapes_amplitudes() {
        let mut osc = AdditiveOscillator::new(48000.0);
        osc.set_harmonic_series(4, 2.0);
        assert!((osc.amplitudes[0] - 1.0).abs() < 1e-6);
        assert!((osc.amplitudes[1] - 0.25).abs() < 1e-6);
        assert!((osc.amplitudes[3] - 0.0625).abs() < 1e-6);
    }

    #[test]
    fn partial_count_clamped() {
        let mut osc = AdditiveOscillator::new(48000.0);
        osc.set_harmonic_series(1000, 1.0);
        assert_eq!(osc.num_partials(), MAX_PARTIALS);
    }

    #[test]
    fn phases_stay_wrapped() {
        let mut osc = AdditiveOscillator::new(48000.0);
        osc.set_harmonic_series(MAX_PARTIALS, 1.0);
        osc.set_frequency(300.0);
        for _ in 0..10_000 {
            osc.process();
        }
        for &p in &osc.phases[..osc.num_partials] {
            assert!((0.0..1.0).contains(&p), "phase {p}");
        }
    }
}
