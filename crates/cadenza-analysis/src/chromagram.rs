//! Chromagram: pitch-class projection of a spectrum.
//!
//! Folds FFT magnitude bins into twelve pitch-class buckets by mapping
//! each bin's centre frequency to the nearest equal-tempered semitone
//! relative to A440. Sub-audio bins are skipped.

use libm::{log2f, roundf};

/// Project magnitude bins into a 12-element pitch-class energy vector.
///
/// `bin_hz` is the frequency step per bin (`sample_rate / fft_size`).
/// Index 0 of the result is pitch class C.
///
/// # Example
///
/// ```rust
/// use cadenza_analysis::chromagram;
///
/// let mut magnitudes = vec![0.0f32; 1024];
/// magnitudes[19] = 1.0; // ~445 Hz at 48 kHz / 2048 → lands on A
/// let chroma = chromagram(&magnitudes, 48000.0 / 2048.0);
/// assert!(chroma[9] > 0.9);
/// ```
pub fn chromagram(magnitudes: &[f32], bin_hz: f32) -> [f32; 12] {
    let mut chroma = [0.0f32; 12];

    for (bin, &magnitude) in magnitudes.iter().enumerate() {
        let freq = bin as f32 * bin_hz;
        if freq < 20.0 || magnitude <= 0.0 {
            continue;
        }

        // Semitones above/below A440, folded to a pitch class. A sits at
        // class 9 with C = 0.
        let semitones = roundf(12.0 * log2f(freq / 440.0)) as i32;
        let pitch_class = (semitones + 9).rem_euclid(12) as usize;
        chroma[pitch_class] += magnitude;
    }

    chroma
}
