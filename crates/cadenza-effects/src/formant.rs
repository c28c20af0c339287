//! Formant filter: vowel shaping through parallel band-passes.
//!
//! Three band-pass filters tuned to the first three formants of the five
//! cardinal vowels. The vowel position is continuous in [0, 4]; positions
//! between integers interpolate the formant frequencies, morphing smoothly
//! from one vowel to the next (A → E → I → O → U).

use cadenza_core::{lerp, wet_dry_mix, Effect, FilterMode, StateVariableFilter};

/// First three formant frequencies (Hz) for A, E, I, O, U.
const VOWEL_FORMANTS: [[f32; 3]; 5] = [
    [800.0, 1150.0, 2900.0], // A
    [350.0, 2000.0, 2800.0], // E
    [270.0, 2140.0, 2950.0], // I
    [450.0, 800.0, 2830.0],  // O
    [325.0, 700.0, 2700.0],  // U
];

/// Band-pass resonance used for all three formants.
const FORMANT_RESONANCE: f32 = 0.8;

/// Vowel-morphing formant filter.
///
/// ## Parameters
///
/// - `vowel`: continuous position in [0, 4] over A, E, I, O, U (default 0)
/// - `mix`: [0, 1], default 1.0
///
/// # Example
///
/// ```rust
/// use cadenza_effects::FormantFilter;
/// use cadenza_core::Effect;
///
/// let mut formant = FormantFilter::new(48000.0);
/// formant.set_vowel(2.5); // between I and O
/// let out = formant.process(0.5);
/// ```
#[derive(Debug, Clone)]
pub struct FormantFilter {
    filters: [StateVariableFilter; 3],
    vowel: f32,
    mix: f32,
}

impl FormantFilter {
    /// Create a formant filter at the given sample rate, set to vowel A.
    pub fn new(sample_rate: f32) -> Self {
        let filters = core::array::from_fn(|_| {
            let mut svf = StateVariableFilter::new(sample_rate);
            svf.set_mode(FilterMode::Bandpass);
            svf
        });
        let mut formant = Self {
            filters,
            vowel: 0.0,
            mix: 1.0,
        };
        formant.set_vowel(0.0);
        formant
    }

    /// Set the vowel position, clamped to [0, 4].
    pub fn set_vowel(&mut self, vowel: f32) {
        self.vowel = vowel.clamp(0.0, 4.0);

        let v1 = self.vowel as usize;
        let v2 = (v1 + 1).min(4);
        let frac = self.vowel - v1 as f32;

        for (i, filter) in self.filters.iter_mut().enumerate() {
            let freq = lerp(VOWEL_FORMANTS[v1][i], VOWEL_FORMANTS[v2][i], frac);
            filter.set_cutoff(freq);
            filter.set_resonance(FORMANT_RESONANCE);
        }
    }

    /// Current vowel position.
    pub fn vowel(&self) -> f32 {
        self.vowel
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

impl Effect for FormantFilter {
    #[inline]
    fn process(&mut self, input: f32) -> f32 {
        let mut wet = 0.0;
        for filter in &mut self.filters {
            wet += filter.process(input) * (1.0 / 3.0);
        }
        wet_dry_mix(input, wet, self.mix)
    }

    fn set_sample_rate(&mut self, sample_rate: f32) {
        for filter in &mut self.filters {
            filter.set_sample_rate(sample_rate);
        }
        // Re-tune at the new rate.
        self.set_vowel(self.vowel);
    }

    fn reset(&mut self) {
        for filter in &mut self.filters {
            filter.reset();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// RMS response of the filter to a sine at `freq`.
    fn response_at(formant: &mut FormantFilter, freq: f32, sr: f32) -> f32 {
        formant.reset();
        let omega = core::f32::consts::TAU * freq / sr;
        let mut rms = 0.0f32;
        let n = 9600;
        for i in 0..2 * n {
            let out = formant.process(libm::sinf(i as f32 * omega));
            if i >= n {
                rms += out * out;
            }
        }
        (rms / n as f32).sqrt()
    }

    #[test]
    fn vowel_a_peaks_near_first_formant() {
        let sr = 48000.0;
        let mut formant = FormantFilter::new(sr);
        formant.set_vowel(0.0);

        let at_formant = response_at(&mut formant, 800.0, sr);
        let far_below = response_at(&mut formant, 100.0, sr);
        assert!(
            at_formant > far_below * 2.0,
            "800 Hz {at_formant} vs 100 Hz {far_below}"
        );
    }

    #[test]
    fn vowel_position_clamped() {
        let mut formant = FormantFilter::new(48000.0);
        formant.set_vowel(-1.0);
        assert_eq!(formant.vowel(), 0.0);
        formant.set_vowel(9.0);
        assert_eq!(formant.vowel(), 4.0);
    }

    #[test]
    fn interpolated_vowel_tunes_between_tables() {
        let mut formant = FormantFilter::new(48000.0);
        formant.set_vowel(0.5);
        // Halfway A→E: first formant = (800 + 350) / 2 = 575 Hz.
        assert!((formant.filters[0].cutoff() - 575.0).abs() < 1.0);
    }

    #[test]
    fn output_finite_across_vowel_sweep() {
        let mut formant = FormantFilter::new(48000.0);
        for step in 0..=40 {
            formant.set_vowel(step as f32 * 0.1);
            for i in 0..200 {
                let out = formant.process(libm::sinf(i as f32 * 0.2));
                assert!(out.is_finite());
            }
        }
    }
}
