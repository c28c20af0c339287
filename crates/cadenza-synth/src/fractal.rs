//! Fractal harmonic oscillator.
//!
//! Derives a harmonic amplitude vector from a Julia-set escape-time
//! sampling: for each harmonic, a starting point on the real axis is
//! iterated under z ← z² + c and the normalized escape iteration count
//! becomes that harmonic's weight. Moving `c` around the complex plane
//! reshapes the spectrum in the characteristically lumpy fractal way.

use core::f32::consts::TAU;
use libm::sinf;

/// Maximum number of harmonics.
pub const MAX_HARMONICS: usize = 64;

/// Julia-set additive oscillator.
///
/// ## Parameters
///
/// - `c`: complex constant, default −0.7 + 0.27015i
/// - `num_harmonics`: ≤ 64, default 16
/// - `max_iterations`: escape-time bound, default 32
/// - `frequency`: base Hz, default 220; harmonic `i` runs at `(i+1)·f`
///
/// # Example
///
/// ```rust
/// use cadenza_synth::FractalOscillator;
///
/// let mut osc = FractalOscillator::new(48000.0);
/// osc.set_coordinates(-0.8, 0.156);
/// let sample = osc.process();
/// ```
#[derive(Debug, Clone)]
pub struct FractalOscillator {
    real_c: f64,
    imag_c: f64,
    max_iterations: u32,
    num_harmonics: usize,
    weights: [f32; MAX_HARMONICS],
    phases: [f32; MAX_HARMONICS],
    base_frequency: f32,
    sample_rate: f32,
}

impl FractalOscillator {
    /// Create a fractal oscillator with the default constant.
    pub fn new(sample_rate: f32) -> Self {
        let mut osc = Self {
            real_c: -0.7,
            imag_c: 0.27015,
            max_iterations: 32,
            num_harmonics: 16,
            weights: [0.0; MAX_HARMONICS],
            phases: [0.0; MAX_HARMONICS],
            base_frequency: 220.0,
            sample_rate,
        };
        osc.rebuild();
        osc
    }

    /// Move the Julia constant and rebuild the harmonic weights.
    pub fn set_coordinates(&mut self, real: f64, imag: f64) {
        self.real_c = real;
        self.imag_c = imag;
        self.rebuild();
    }

    /// Set the number of harmonics (clamped to 64) and rebuild.
    pub fn set_num_harmonics(&mut self, n: usize) {
        self.num_harmonics = n.clamp(1, MAX_HARMONICS);
        self.rebuild();
    }

    /// Set the base frequency in Hz.
    pub fn set_frequency(&mut self, freq: f32) {
        self.base_frequency = freq.max(0.0);
    }

    /// Harmonic weights derived from the current constant.
    pub fn weights(&self) -> &[f32] {
        &self.weights[..self.num_harmonics]
    }

    /// Update the sample rate.
    pub fn set_sample_rate(&mut self, sample_rate: f32) {
        self.sample_rate = sample_rate;
    }

    /// Rewind all harmonic phases.
    pub fn reset(&mut self) {
        self.phases = [0.0; MAX_HARMONICS];
    }

    /// Recompute harmonic weights from Julia escape times.
    fn rebuild(&mut self) {
        for i in 0..self.num_harmonics {
            let mut zr = i as f64 / self.num_harmonics as f64 * 2.0 - 1.0;
            let mut zi = 0.0f64;

            let mut iter = 0;
            while zr * zr + zi * zi < 4.0 && iter < self.max_iterations {
                let tmp = zr * zr - zi * zi + self.real_c;
                zi = 2.0 * zr * zi + self.imag_c;
                zr = tmp;
                iter += 1;
            }

            self.weights[i] = iter as f32 / self.max_iterations as f32;
        }
    }

    /// Generate the next sample.
    #[inline]
    pub fn process(&mut self) -> f32 {
        let mut out = 0.0;
        let base_inc = self.base_frequency / self.sample_rate;

        for i in 0..self.num_harmonics {
            out += self.weights[i] * sinf(self.phases[i] * TAU);

            self.phases[i] += base_inc * (i + 1) as f32;
            if self.phases[i] >= 1.0 {
                self.phases[i] -= 1.0;
            }
        }

        out * 0.5
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn weights_are_normalized_escape_ratios() {
        let osc = FractalOscillator::new(48000.0);
        for &w in osc.weights() {
            assert!((0.0..=1.0).contains(&w));
        }
        // The default constant produces a mixed spectrum, not all-zero
        // and not all-saturated.
        let sum: f32 = osc.weights().iter().sum();
        assert!(sum > 1.0 && sum < osc.weights().len() as f32);
    }

    #[test]
    fn moving_c_reshapes_spectrum() {
        let mut osc = FractalOscillator::new(48000.0);
        let before: Vec<f32> = osc.weights().to_vec();
        osc.set_coordinates(0.285, 0.01);
        let after: Vec<f32> = osc.weights().to_vec();
        assert_ne!(before, after);
    }

    #[test]
    fn output_is_finite_and_bounded() {
        let mut osc = FractalOscillator::new(48000.0);
        osc.set_num_harmonics(MAX_HARMONICS);
        osc.set_frequency(110.0);
        for _ in 0..20_000 {
            let s = osc.process();
            assert!(s.is_finite());
            assert!(s.abs() <= 0.5 * MAX_HARMONICS as f32);
        }
    }

    #[test]
    fn deterministic_construction() {
        let mut a = FractalOscillator::new(48000.0);
        let mut b = FractalOscillator::new(48000.0);
        for _ in 0..1000 {
            assert_eq!(a.process(), b.process());
        }
    }
}
