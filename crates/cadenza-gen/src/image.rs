//! Image-to-spectrum additive resynthesis.
//!
//! Treats an image as a spectrogram read left to right: each column is
//! one time frame, each row a sine partial whose amplitude is the pixel
//! luminance. The frame cursor crawls across the image over about four
//! seconds, looping by default. RGB input is collapsed to Rec. 601 luma;
//! the core never decodes image files.

use core::f32::consts::TAU;
use libm::sinf;

/// Additive image player.
///
/// ## Parameters
///
/// - `base_freq`: frequency of row 0, default 55 Hz
/// - `freq_scale`: Hz per row above the base
/// - `looping`: restart at the left edge, default on
///
/// Row `r` sounds at `base_freq + r · freq_scale`.
///
/// # Example
///
/// ```rust
/// use cadenza_gen::ImageSpectrum;
///
/// let mut spectrum = ImageSpectrum::new(48000.0);
/// // 4 partials × 2 frames of luminance
/// spectrum.load_luminance(&[255, 0, 128, 64, 0, 255, 64, 128], 4, 2);
/// let sample = spectrum.process();
/// ```
#[derive(Debug, Clone)]
pub struct ImageSpectrum {
    /// Row-major frames: `frames[frame · num_bins + bin]`.
    data: Vec<f32>,
    num_bins: usize,
    num_frames: usize,
    phases: Vec<f32>,
    current_frame: usize,
    frame_accum: f32,
    base_freq: f32,
    freq_scale: f32,
    looping: bool,
    sample_rate: f32,
}

/// Seconds taken to sweep one full image.
const SWEEP_SECONDS: f32 = 4.0;

impl ImageSpectrum {
    /// Create an empty player.
    pub fn new(sample_rate: f32) -> Self {
        Self {
            data: Vec::new(),
            num_bins: 0,
            num_frames: 0,
            phases: Vec::new(),
            current_frame: 0,
            frame_accum: 0.0,
            base_freq: 55.0,
            freq_scale: 0.0,
            looping: true,
            sample_rate,
        }
    }

    /// Load a luminance rectangle: `width` bins (rows of the spectrum)
    /// by `height` frames. Each byte is one amplitude.
    pub fn load_luminance(&mut self, luminance: &[u8], width: usize, height: usize) {
        debug_assert_eq!(luminance.len(), width * height);
        self.num_bins = width;
        self.num_frames = height;
        self.data = luminance.iter().map(|&v| v as f32 / 255.0).collect();
        self.phases = vec![0.0; width];
        self.current_frame = 0;
        self.frame_accum = 0.0;
        self.freq_scale = if width > 0 { 8000.0 / width as f32 } else { 0.0 };
    }

    /// Load an RGB rectangle, collapsing to luma (0.299 R + 0.587 G +
    /// 0.114 B).
    pub fn load_rgb(&mut self, rgb: &[u8], width: usize, height: usize) {
        debug_assert_eq!(rgb.len(), width * height * 3);
        self.num_bins = width;
        self.num_frames = height;
        self.data = rgb
            .chunks_exact(3)
            .map(|px| {
                (0.299 * px[0] as f32 + 0.587 * px[1] as f32 + 0.114 * px[2] as f32) / 255.0
            })
            .collect();
        self.phases = vec![0.0; width];
        self.current_frame = 0;
        self.frame_accum = 0.0;
        self.freq_scale = if width > 0 { 8000.0 / width as f32 } else { 0.0 };
    }

    /// Map the partials onto a frequency range.
    pub fn set_freq_range(&mut self, min_hz: f32, max_hz: f32) {
        self.base_freq = min_hz.max(0.0);
        self.freq_scale = if self.num_bins > 0 {
            (max_hz - self.base_freq).max(0.0) / self.num_bins as f32
        } else {
            0.0
        };
    }

    /// Enable or disable looping at the last frame.
    pub fn set_looping(&mut self, looping: bool) {
        self.looping = looping;
    }

    /// The frame the player is currently sounding.
    pub fn current_frame(&self) -> usize {
        self.current_frame
    }

    /// Rewind to the first frame and zero all phases.
    pub fn reset(&mut self) {
        self.current_frame = 0;
        self.frame_accum = 0.0;
        self.phases.fill(0.0);
    }

    /// Generate the next sample.
    pub fn process(&mut self) -> f32 {
        if self.data.is_empty() || self.num_frames == 0 {
            return 0.0;
        }

        let frame = self.current_frame.min(self.num_frames - 1);
        let row = &self.data[frame * self.num_bins..(frame + 1) * self.num_bins];

        let mut out = 0.0;
        for (bin, phase) in self.phases.iter_mut().enumerate() {
            let amp = row[bin];
            if amp > 0.0 {
                out += amp * sinf(*phase);
            }
            let freq = self.base_freq + bin as f32 * self.freq_scale;
            *phase += TAU * freq / self.sample_rate;
            if *phase > TAU {
                *phase -= TAU;
            }
        }

        // Crawl the frame cursor: the whole image spans ~4 seconds.
        self.frame_accum += self.num_frames as f32 / (self.sample_rate * SWEEP_SECONDS);
        if self.frame_accum >= 1.0 {
            self.frame_accum -= 1.0;
            self.current_frame += 1;
            if self.current_frame >= self.num_frames {
                self.current_frame = if self.looping { 0 } else { self.num_frames - 1 };
            }
        }

        out / self.num_bins as f32
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_player_is_silent() {
        let mut spectrum = ImageSpectrum::new(48000.0);
        for _ in 0..100 {
            assert_eq!(spectrum.process(), 0.0);
        }
    }

    #[test]
    fn single_bright_row_is_a_sine() {
        let sr = 48000.0;
        let mut spectrum = ImageSpectrum::new(sr);
        // One bin, one frame, full brightness.
        spectrum.load_luminance(&[255], 1, 1);
        spectrum.set_freq_range(440.0, 440.0);

        for i in 0..1000 {
            let expected = sinf(i as f32 * TAU * 440.0 / sr);
            let got = spectrum.process();
            assert!(
                (got - expected).abs() < 1e-3,
                "sample {i}: {got} vs {expected}"
            );
        }
    }

    #[test]
    fn dark_pixels_are_silent() {
        let mut spectrum = ImageSpectrum::new(48000.0);
        spectrum.load_luminance(&[0, 0, 0, 0], 4, 1);
        for _ in 0..100 {
            assert_eq!(spectrum.process(), 0.0);
        }
    }

    #[test]
    fn frame_cursor_advances_and_loops() {
        let sr = 1000.0; // tiny rate so frames advance fast
        let mut spectrum = ImageSpectrum::new(sr);
        spectrum.load_luminance(&[255, 255], 1, 2);

        assert_eq!(spectrum.current_frame(), 0);
        // 4 seconds / 2 frames = 2 seconds per frame = 2000 samples.
        for _ in 0..2100 {
            spectrum.process();
        }
        assert_eq!(spectrum.current_frame(), 1);
        for _ in 0..2100 {
            spectrum.process();
        }
        assert_eq!(spectrum.current_frame(), 0, "should loop");
    }

    #[test]
    fn non_looping_holds_last_frame() {
        let sr = 1000.0;
        let mut spectrum = ImageSpectrum::new(sr);
        spectrum.load_luminance(&[255, 255], 1, 2);
        spectrum.set_looping(false);
        for _ in 0..10_000 {
            spectrum.process();
        }
        assert_eq!(spectrum.current_frame(), 1);
    }

    #[test]
    fn rgb_collapses_to_luma() {
        let mut spectrum = ImageSpectrum::new(48000.0);
        spectrum.load_rgb(&[255, 255, 255], 1, 1);
        assert!((spectrum.data[0] - 1.0).abs() < 0.01);

        spectrum.load_rgb(&[0, 255, 0], 1, 1);
        assert!((spectrum.data[0] - 0.587).abs() < 0.01);
    }
}
