//! State variable filter.
//!
//! A multi-mode filter producing lowpass, highpass, bandpass, and notch
//! outputs simultaneously from one structure. Used standalone in the synth
//! voice, as a chain effect slot, and as the tone/damping filter inside
//! several other effects.
//!
//! # Topology
//!
//! Zero-delay-feedback (topology-preserving transform) form after
//! Zavalishin, "The Art of VA Filter Design": trapezoidal integrators with
//! states `ic1eq`/`ic2eq`, coefficients `g = tan(π·cutoff/sr)` and
//! `k = 2 − 2·resonance`. The ZDF discretization keeps the filter stable
//! under cutoff modulation, which the voice exercises every sample.

use core::f32::consts::PI;
use libm::tanf;

use crate::Effect;
use crate::flush_denormal;

/// Which of the simultaneous filter outputs is returned by `process()`.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum FilterMode {
    /// Pass frequencies below the cutoff.
    #[default]
    Lowpass,
    /// Pass frequencies above the cutoff.
    Highpass,
    /// Pass frequencies near the cutoff.
    Bandpass,
    /// Reject frequencies near the cutoff.
    Notch,
}

/// Multi-mode state variable filter (2-pole, 12 dB/oct).
///
/// ## Parameters
///
/// - `cutoff`: Hz, clamped to [20, sr × 0.49], default 1000
/// - `resonance`: [0, 1], default 0.5 (higher = more resonant peak)
/// - `mode`: which output `process()` returns (default lowpass)
///
/// # Example
///
/// ```rust
/// use cadenza_core::{StateVariableFilter, FilterMode, Effect};
///
/// let mut svf = StateVariableFilter::new(48000.0);
/// svf.set_cutoff(1000.0);
/// svf.set_resonance(0.7);
/// svf.set_mode(FilterMode::Lowpass);
///
/// let out = svf.process(0.5);
/// ```
#[derive(Debug, Clone)]
pub struct StateVariableFilter {
    // Integrator states
    ic1eq: f32,
    ic2eq: f32,

    // Coefficients
    g: f32,
    k: f32,

    sample_rate: f32,
    cutoff: f32,
    resonance: f32,
    mode: FilterMode,
}

impl Default for StateVariableFilter {
    fn default() -> Self {
        Self::new(48000.0)
    }
}

impl StateVariableFilter {
    /// Create a new filter at the given sample rate.
    ///
    /// Initializes with cutoff = 1000 Hz, resonance = 0.5, lowpass output.
    pub fn new(sample_rate: f32) -> Self {
        let mut svf = Self {
            ic1eq: 0.0,
            ic2eq: 0.0,
            g: 0.0,
            k: 0.0,
            sample_rate,
            cutoff: 1000.0,
            resonance: 0.5,
            mode: FilterMode::Lowpass,
        };
        svf.update_coefficients();
        svf
    }

    /// Set cutoff frequency in Hz. Clamped to [20, sample_rate × 0.49].
    pub fn set_cutoff(&mut self, freq: f32) {
        self.cutoff = freq.clamp(20.0, self.sample_rate * 0.49);
        self.g = tanf(PI * self.cutoff / self.sample_rate);
    }

    /// Current cutoff frequency in Hz.
    pub fn cutoff(&self) -> f32 {
        self.cutoff
    }

    /// Set resonance. Clamped to [0, 1]; maps to `k = 2 − 2·resonance`.
    pub fn set_resonance(&mut self, resonance: f32) {
        self.resonance = resonance.clamp(0.0, 1.0);
        self.k = 2.0 - 2.0 * self.resonance;
    }

    /// Current resonance.
    pub fn resonance(&self) -> f32 {
        self.resonance
    }

    /// Select which output `process()` returns.
    pub fn set_mode(&mut self, mode: FilterMode) {
        self.mode = mode;
    }

    /// Current output mode.
    pub fn mode(&self) -> FilterMode {
        self.mode
    }

    fn update_coefficients(&mut self) {
        self.g = tanf(PI * self.cutoff / self.sample_rate);
        self.k = 2.0 - 2.0 * self.resonance;
    }

    /// Process one sample and return (lowpass, highpass, bandpass, notch).
    #[inline]
    pub fn process_all(&mut self, input: f32) -> (f32, f32, f32, f32) {
        let v3 = input - self.ic2eq;
        let v1 = (self.g * v3 + self.ic1eq) / (1.0 + self.g * (self.g + self.k));
        let v2 = self.ic2eq + self.g * v1;

        self.ic1eq = flush_denormal(2.0 * v1 - self.ic1eq);
        self.ic2eq = flush_denormal(2.0 * v2 - self.ic2eq);

        let lp = v2;
        let bp = v1;
        let hp = input - self.k * v1 - v2;
        let notch = lp + hp;

        (lp, hp, bp, notch)
    }
}

impl Effect for StateVariableFilter {
    fn process(&mut self, input: f32) -> f32 {
        let (lp, hp, bp, notch) = self.process_all(input);
        match self.mode {
            FilterMode::Lowpass => lp,
            FilterMode::Highpass => hp,
            FilterMode::Bandpass => bp,
            FilterMode::Notch => notch,
        }
    }

    fn reset(&mut self) {
        self.ic1eq = 0.0;
        self.ic2eq = 0.0;
    }

    fn set_sample_rate(&mut self, sample_rate: f32) {
        self.sample_rate = sample_rate;
        self.cutoff = self.cutoff.clamp(20.0, sample_rate * 0.49);
        self.update_coefficients();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lowpass_passes_dc() {
        let mut svf = StateVariableFilter::new(48000.0);
        svf.set_cutoff(1000.0);
        let mut out = 0.0;
        for _ in 0..1000 {
            out = svf.process(1.0);
        }
        assert!((out - 1.0).abs() < 0.05, "DC should pass, got {out}");
    }

    #[test]
    fn highpass_blocks_dc() {
        let mut svf = StateVariableFilter::new(48000.0);
        svf.set_cutoff(1000.0);
        svf.set_mode(FilterMode::Highpass);
        let mut out = 0.0;
        for _ in 0..1000 {
            out = svf.process(1.0);
        }
        assert!(out.abs() < 0.1, "DC should be blocked, got {out}");
    }

    #[test]
    fn lowpass_attenuates_above_cutoff() {
        let sr = 48000.0;
        let mut svf = StateVariableFilter::new(sr);
        svf.set_cutoff(500.0);

        // 8 kHz tone, four octaves above cutoff: expect roughly -48 dB.
        let omega = core::f32::consts::TAU * 8000.0 / sr;
        let mut rms_in = 0.0f32;
        let mut rms_out = 0.0f32;
        for i in 0..4800 {
            let x = libm::sinf(i as f32 * omega);
            let y = svf.process(x);
            if i >= 2400 {
                rms_in += x * x;
                rms_out += y * y;
            }
        }
        assert!(
            rms_out < rms_in * 0.01,
            "expected strong attenuation, ratio {}",
            rms_out / rms_in
        );
    }

    #[test]
    fn cutoff_clamped_to_valid_range() {
        let mut svf = StateVariableFilter::new(48000.0);
        svf.set_cutoff(5.0);
        assert_eq!(svf.cutoff(), 20.0);
        svf.set_cutoff(1e9);
        assert_eq!(svf.cutoff(), 48000.0 * 0.49);
    }

    #[test]
    fn resonance_clamped() {
        let mut svf = StateVariableFilter::new(48000.0);
        svf.set_resonance(-1.0);
        assert_eq!(svf.resonance(), 0.0);
        svf.set_resonance(3.0);
        assert_eq!(svf.resonance(), 1.0);
    }

    #[test]
    fn reset_clears_state() {
        let mut svf = StateVariableFilter::new(48000.0);
        for _ in 0..100 {
            svf.process(1.0);
        }
        svf.reset();
        assert_eq!(svf.process(0.0), 0.0);
    }

    #[test]
    fn outputs_finite_at_max_resonance() {
        let mut svf = StateVariableFilter::new(48000.0);
        svf.set_cutoff(2000.0);
        svf.set_resonance(1.0);
        for i in 0..5000 {
            let x = libm::sinf(i as f32 * 0.26) * 2.0;
            let (lp, hp, bp, notch) = svf.process_all(x);
            assert!(lp.is_finite() && hp.is_finite() && bp.is_finite() && notch.is_finite());
        }
    }
}
