//! Coloured noise generator.
//!
//! Four noise colours from one seeded xorshift source. Pink uses the
//! three-pole Voss-McCartney filter; brown integrates white with a hard
//! bound; velvet emits sparse ±1 impulses.

use cadenza_core::Xorshift32;

/// Noise colour.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum NoiseType {
    /// Flat spectrum, uniform in [-1, 1].
    #[default]
    White,
    /// -3 dB/octave, Voss-McCartney three-pole filter.
    Pink,
    /// -6 dB/octave, integrated white clamped to [-1, 1].
    Brown,
    /// Sparse ±1 impulses, ~1% density.
    Velvet,
}

/// Seeded noise source.
///
/// Two generators with the same seed and type produce identical sample
/// sequences.
///
/// # Example
///
/// ```rust
/// use cadenza_synth::{NoiseGenerator, NoiseType};
///
/// let mut noise = NoiseGenerator::new(NoiseType::Pink, 42);
/// let sample = noise.process();
/// ```
#[derive(Debug, Clone)]
pub struct NoiseGenerator {
    noise_type: NoiseType,
    rng: Xorshift32,
    amplitude: f32,
    // Pink filter poles
    pink_b0: f32,
    pink_b1: f32,
    pink_b2: f32,
    // Brown integrator
    brown_last: f32,
}

impl NoiseGenerator {
    /// Create a noise generator with the given colour and seed.
    pub fn new(noise_type: NoiseType, seed: u32) -> Self {
        Self {
            noise_type,
            rng: Xorshift32::new(seed),
            amplitude: 1.0,
            pink_b0: 0.0,
            pink_b1: 0.0,
            pink_b2: 0.0,
            brown_last: 0.0,
        }
    }

    /// Change the noise colour without reseeding.
    pub fn set_type(&mut self, noise_type: NoiseType) {
        self.noise_type = noise_type;
    }

    /// Current noise colour.
    pub fn noise_type(&self) -> NoiseType {
        self.noise_type
    }

    /// Set the output amplitude.
    pub fn set_amplitude(&mut self, amplitude: f32) {
        self.amplitude = amplitude;
    }

    /// Generate the next sample.
    #[inline]
    pub fn process(&mut self) -> f32 {
        let white = self.rng.next_bipolar();

        match self.noise_type {
            NoiseType::White => white * self.amplitude,

            NoiseType::Pink => {
                self.pink_b0 = 0.99886 * self.pink_b0 + white * 0.0555179;
                self.pink_b1 = 0.99332 * self.pink_b1 + white * 0.0750759;
                self.pink_b2 = 0.96900 * self.pink_b2 + white * 0.1538520;
                let pink = self.pink_b0 + self.pink_b1 + self.pink_b2 + white * 0.5362;
                pink * 0.11 * self.amplitude
            }

            NoiseType::Brown => {
                self.brown_last = (self.brown_last + white * 0.02).clamp(-1.0, 1.0);
                self.brown_last * self.amplitude
            }

            NoiseType::Velvet => {
                if self.rng.next_f32() < 0.01 {
                    let sign = if self.rng.next_f32() < 0.5 { 1.0 } else { -1.0 };
                    sign * self.amplitude
                } else {
                    0.0
                }
            }
        }
    }
}
