//! FFT spectrum analyzer with smoothing and peak hold.
//!
//! A 2048-point Hann-windowed FFT over a ring of the most recent input.
//! Magnitudes are normalized by the FFT size, smoothed with a one-pole
//! per bin, and shadowed by a decaying peak-hold vector. Band
//! aggregation supports linear and logarithmic spacing for display.

use libm::{cosf, expf, logf};
use rustfft::{num_complex::Complex, Fft, FftPlanner};
use std::sync::Arc;

/// FFT frame size.
pub const SPECTRUM_FFT_SIZE: usize = 2048;

/// Number of magnitude bins (positive frequencies).
const NUM_BINS: usize = SPECTRUM_FFT_SIZE / 2;

/// Windowed FFT analyzer.
///
/// ## Parameters
///
/// - `smoothing`: one-pole coefficient in [0, 1], default 0.8 (higher =
///   slower display)
/// - `peak_decay`: per-analysis peak multiplier, default 0.99
/// - `logarithmic`: band spacing for [`bands`](SpectrumAnalyzer::bands),
///   default on
///
/// # Example
///
/// ```rust
/// use cadenza_analysis::SpectrumAnalyzer;
///
/// let mut analyzer = SpectrumAnalyzer::new(48000.0);
/// analyzer.write(&[0.0; 512]);
/// analyzer.analyze();
/// let mut bands = [0.0f32; 32];
/// analyzer.bands(&mut bands);
/// ```
pub struct SpectrumAnalyzer {
    fft: Arc<dyn Fft<f32>>,
    input_ring: Box<[f32; SPECTRUM_FFT_SIZE]>,
    write_pos: usize,
    window: Box<[f32; SPECTRUM_FFT_SIZE]>,
    scratch: Vec<Complex<f32>>,
    magnitudes: Box<[f32; NUM_BINS]>,
    smoothed: Box<[f32; NUM_BINS]>,
    peaks: Box<[f32; NUM_BINS]>,
    smoothing: f32,
    peak_decay: f32,
    logarithmic: bool,
    sample_rate: f32,
}

impl SpectrumAnalyzer {
    /// Create an analyzer for the given sample rate.
    pub fn new(sample_rate: f32) -> Self {
        let mut planner = FftPlanner::new();
        let fft = planner.plan_fft_forward(SPECTRUM_FFT_SIZE);

        let mut window = Box::new([0.0f32; SPECTRUM_FFT_SIZE]);
        for (i, w) in window.iter_mut().enumerate() {
            *w = 0.5
                * (1.0
                    - cosf(
                        core::f32::consts::TAU * i as f32 / (SPECTRUM_FFT_SIZE - 1) as f32,
                    ));
        }

        Self {
            fft,
            input_ring: Box::new([0.0; SPECTRUM_FFT_SIZE]),
            write_pos: 0,
            window,
            scratch: vec![Complex::new(0.0, 0.0); SPECTRUM_FFT_SIZE],
            magnitudes: Box::new([0.0; NUM_BINS]),
            smoothed: Box::new([0.0; NUM_BINS]),
            peaks: Box::new([0.0; NUM_BINS]),
            smoothing: 0.8,
            peak_decay: 0.99,
            logarithmic: true,
            sample_rate,
        }
    }

    /// Set the display smoothing coefficient, clamped to [0, 1].
    pub fn set_smoothing(&mut self, smoothing: f32) {
        self.smoothing = smoothing.clamp(0.0, 1.0);
    }

    /// Set the peak decay multiplier, clamped to [0, 1].
    pub fn set_peak_decay(&mut self, decay: f32) {
        self.peak_decay = decay.clamp(0.0, 1.0);
    }

    /// Choose band spacing for [`bands`](SpectrumAnalyzer::bands).
    pub fn set_logarithmic(&mut self, logarithmic: bool) {
        self.logarithmic = logarithmic;
    }

    /// Frequency of magnitude bin `i` in Hz.
    pub fn bin_frequency(&self, bin: usize) -> f32 {
        bin as f32 * self.sample_rate / SPECTRUM_FFT_SIZE as f32
    }

    /// Append mono samples to the input ring.
    pub fn write(&mut self, mono: &[f32]) {
        for &sample in mono {
            self.input_ring[self.write_pos] = sample;
            self.write_pos = (self.write_pos + 1) % SPECTRUM_FFT_SIZE;
        }
    }

    /// Run one analysis pass over the current input window.
    ///
    /// Linearizes the ring (oldest sample first), applies the Hann
    /// window, transforms, then updates the smoothed and peak vectors.
    pub fn analyze(&mut self) {
        for i in 0..SPECTRUM_FFT_SIZE {
            let src = (self.write_pos + i) % SPECTRUM_FFT_SIZE;
            self.scratch[i] = Complex::new(self.input_ring[src] * self.window[i], 0.0);
        }

        self.fft.process(&mut self.scratch);

        for i in 0..NUM_BINS {
            self.magnitudes[i] = self.scratch[i].norm() / SPECTRUM_FFT_SIZE as f32;

            self.smoothed[i] =
                self.smoothing * self.smoothed[i] + (1.0 - self.smoothing) * self.magnitudes[i];

            if self.magnitudes[i] > self.peaks[i] {
                self.peaks[i] = self.magnitudes[i];
            } else {
                self.peaks[i] *= self.peak_decay;
            }
        }
    }

    /// Raw magnitudes from the last analysis.
    pub fn magnitudes(&self) -> &[f32] {
        &self.magnitudes[..]
    }

    /// Smoothed magnitudes.
    pub fn smoothed(&self) -> &[f32] {
        &self.smoothed[..]
    }

    /// Peak-hold magnitudes.
    pub fn peaks(&self) -> &[f32] {
        &self.peaks[..]
    }

    /// Aggregate the smoothed spectrum into `bands.len()` display bands.
    ///
    /// Logarithmic spacing uses boundaries `exp(b · ln(N/2) / K)`.
    pub fn bands(&self, bands: &mut [f32]) {
        let num_bands = bands.len();
        if num_bands == 0 {
            return;
        }

        if self.logarithmic {
            let log_max = logf(NUM_BINS as f32);
            for (b, band) in bands.iter_mut().enumerate() {
                let mut start = expf(b as f32 * log_max / num_bands as f32) as usize;
                let mut end = expf((b + 1) as f32 * log_max / num_bands as f32) as usize;
                start = start.min(NUM_BINS - 1);
                end = end.min(NUM_BINS);
                if end <= start {
                    end = start + 1;
                }

                let sum: f32 = self.smoothed[start..end].iter().sum();
                *band = sum / (end - start) as f32;
            }
        } else {
            let bins_per_band = (NUM_BINS / num_bands).max(1);
            for (b, band) in bands.iter_mut().enumerate() {
                let start = b * bins_per_band;
                let end = (start + bins_per_band).min(NUM_BINS);
                if start >= NUM_BINS {
                    *band = 0.0;
                    continue;
                }
                let sum: f32 = self.smoothed[start..end].iter().sum();
                *band = sum / (end - start) as f32;
            }
        }
    }
}
