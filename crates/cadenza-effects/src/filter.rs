//! State variable filter as a chain effect.
//!
//! Thin wrapper giving the core SVF a dry/wet mix so it can sit in an
//! effect slot like everything else.

use cadenza_core::{wet_dry_mix, Effect, FilterMode, StateVariableFilter};

/// Multi-mode filter effect slot.
///
/// ## Parameters
///
/// - `mode`: lowpass / highpass / bandpass / notch (default lowpass)
/// - `cutoff`: Hz, clamped to [20, sr × 0.49], default 1000
/// - `resonance`: [0, 1], default 0.5
/// - `mix`: [0, 1], default 1.0
///
/// # Example
///
/// ```rust
/// use cadenza_effects::FilterEffect;
/// use cadenza_core::{Effect, FilterMode};
///
/// let mut filter = FilterEffect::new(48000.0);
/// filter.set_mode(FilterMode::Bandpass);
/// filter.set_cutoff(800.0);
/// let out = filter.process(0.5);
/// ```
#[derive(Debug, Clone)]
pub struct FilterEffect {
    svf: StateVariableFilter,
    mix: f32,
}

impl FilterEffect {
    /// Create a filter effect at the given sample rate.
    pub fn new(sample_rate: f32) -> Self {
        Self {
            svf: StateVariableFilter::new(sample_rate),
            mix: 1.0,
        }
    }

    /// Select the filter mode.
    pub fn set_mode(&mut self, mode: FilterMode) {
        self.svf.set_mode(mode);
    }

    /// Set cutoff frequency in Hz.
    pub fn set_cutoff(&mut self, freq: f32) {
        self.svf.set_cutoff(freq);
    }

    /// Current cutoff in Hz.
    pub fn cutoff(&self) -> f32 {
        self.svf.cutoff()
    }

    /// Set resonance in [0, 1].
    pub fn set_resonance(&mut self, resonance: f32) {
        self.svf.set_resonance(resonance);
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

impl Effect for FilterEffect {
    #[inline]
    fn process(&mut self, input: f32) -> f32 {
        let wet = self.svf.process(input);
        wet_dry_mix(input, wet, self.mix)
    }

    fn set_sample_rate(&mut self, sample_rate: f32) {
        self.svf.set_sample_rate(sample_rate);
    }

    fn reset(&mut self) {
        self.svf.reset();
    }
}
