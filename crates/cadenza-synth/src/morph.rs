//! Morphing dual-waveform oscillator.
//!
//! The workhorse oscillator of the synth voice: two selectable waveforms
//! evaluated at the same phase and crossfaded by a morph coefficient. Not
//! band-limited — the wavetable oscillator provides the band-limited path
//! when aliasing matters.

use core::f32::consts::TAU;
use libm::{powf, sinf};

use cadenza_core::lerp;

/// Basic waveform shapes.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Waveform {
    /// Pure sine.
    #[default]
    Sine,
    /// Rising ramp, all harmonics.
    Saw,
    /// 50% duty square.
    Square,
    /// Symmetric triangle.
    Triangle,
    /// Variable-width pulse (uses the oscillator's pulse width).
    Pulse,
}

/// Evaluate a waveform at a phase in [0, 1).
#[inline]
fn generate(waveform: Waveform, phase: f32, pulse_width: f32) -> f32 {
    match waveform {
        Waveform::Sine => sinf(phase * TAU),
        Waveform::Saw => 2.0 * phase - 1.0,
        Waveform::Square => {
            if phase < 0.5 {
                1.0
            } else {
                -1.0
            }
        }
        Waveform::Triangle => {
            if phase < 0.5 {
                4.0 * phase - 1.0
            } else {
                3.0 - 4.0 * phase
            }
        }
        Waveform::Pulse => {
            if phase < pulse_width {
                1.0
            } else {
                -1.0
            }
        }
    }
}

/// Dual-waveform morphing oscillator.
///
/// ## Parameters
///
/// - `waveform_a` / `waveform_b`: the two shapes being crossfaded
/// - `morph`: [0, 1], 0 = all A, 1 = all B
/// - `frequency`: Hz; the effective increment includes `detune_cents`
/// - `detune_cents`: ±cents applied as `2^(cents/1200)`
/// - `pulse_width`: duty cycle for [`Waveform::Pulse`], default 0.5
///
/// # Example
///
/// ```rust
/// use cadenza_synth::{MorphOscillator, Waveform};
///
/// let mut osc = MorphOscillator::new(48000.0);
/// osc.set_waveforms(Waveform::Sine, Waveform::Saw);
/// osc.set_morph(0.5);
/// osc.set_frequency(440.0);
/// let sample = osc.process();
/// ```
#[derive(Debug, Clone)]
pub struct MorphOscillator {
    phase: f32,
    phase_increment: f32,
    sample_rate: f32,
    frequency: f32,
    detune_cents: f32,
    waveform_a: Waveform,
    waveform_b: Waveform,
    morph: f32,
    pulse_width: f32,
}

impl Default for MorphOscillator {
    fn default() -> Self {
        Self::new(48000.0)
    }
}

impl MorphOscillator {
    /// Create an oscillator at the given sample rate.
    ///
    /// Defaults: sine → saw, morph 0, 440 Hz, pulse width 0.5.
    pub fn new(sample_rate: f32) -> Self {
        let mut osc = Self {
            phase: 0.0,
            phase_increment: 0.0,
            sample_rate,
            frequency: 440.0,
            detune_cents: 0.0,
            waveform_a: Waveform::Sine,
            waveform_b: Waveform::Saw,
            morph: 0.0,
            pulse_width: 0.5,
        };
        osc.update_increment();
        osc
    }

    /// Set frequency in Hz. Takes effect at the next sample.
    pub fn set_frequency(&mut self, freq: f32) {
        self.frequency = freq.max(0.0);
        self.update_increment();
    }

    /// Current frequency in Hz (before detune).
    pub fn frequency(&self) -> f32 {
        self.frequency
    }

    /// Set detune in cents (100 cents = 1 semitone).
    pub fn set_detune_cents(&mut self, cents: f32) {
        self.detune_cents = cents;
        self.update_increment();
    }

    /// Select both waveforms.
    pub fn set_waveforms(&mut self, a: Waveform, b: Waveform) {
        self.waveform_a = a;
        self.waveform_b = b;
    }

    /// Set the morph coefficient, clamped to [0, 1].
    pub fn set_morph(&mut self, morph: f32) {
        self.morph = morph.clamp(0.0, 1.0);
    }

    /// Current morph coefficient.
    pub fn morph(&self) -> f32 {
        self.morph
    }

    /// Set the pulse duty cycle, clamped to [0.01, 0.99].
    pub fn set_pulse_width(&mut self, width: f32) {
        self.pulse_width = width.clamp(0.01, 0.99);
    }

    /// Update the sample rate.
    pub fn set_sample_rate(&mut self, sample_rate: f32) {
        self.sample_rate = sample_rate;
        self.update_increment();
    }

    /// Current phase in [0, 1).
    pub fn phase(&self) -> f32 {
        self.phase
    }

    /// Rewind the phase to zero.
    pub fn reset(&mut self) {
        self.phase = 0.0;
    }

    fn update_increment(&mut self) {
        let detune_ratio = powf(2.0, self.detune_cents / 1200.0);
        self.phase_increment = self.frequency * detune_ratio / self.sample_rate;
    }

    /// Generate the next sample and advance the phase.
    #[inline]
    pub fn process(&mut self) -> f32 {
        let a = generate(self.waveform_a, self.phase, self.pulse_width);
        let b = generate(self.waveform_b, self.phase, self.pulse_width);
        let out = lerp(a, b, self.morph);

        self.phase += self.phase_increment;
        if self.phase >= 1.0 {
            self.phase -= 1.0;
        }

        out
    }
}
