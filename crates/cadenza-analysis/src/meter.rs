//! Stereo level meter.
//!
//! Per-block RMS and peak per channel, a smoothed peak that falls at a
//! configurable decay, and a peak-hold that latches new maxima and only
//! starts falling after a hold time has elapsed. Clip flags latch until
//! explicitly cleared.

use libm::sqrtf;

/// Per-channel meter state.
#[derive(Debug, Clone, Copy, Default)]
struct ChannelMeter {
    rms: f32,
    peak: f32,
    peak_hold: f32,
    hold_counter: f32,
    clip: bool,
}

/// Stereo RMS / peak / peak-hold meter.
///
/// ## Parameters
///
/// - `peak_decay`: per-block peak multiplier, default 0.9995
/// - `hold_time`: seconds the peak-hold latches before decaying, default
///   2.0
///
/// # Example
///
/// ```rust
/// use cadenza_analysis::LevelMeter;
///
/// let mut meter = LevelMeter::new(48000.0);
/// meter.analyze(&[0.5; 256], &[0.5; 256]);
/// assert!(meter.peak_left() > 0.0);
/// ```
#[derive(Debug, Clone)]
pub struct LevelMeter {
    left: ChannelMeter,
    right: ChannelMeter,
    peak_decay: f32,
    hold_time: f32,
    sample_rate: f32,
}

impl LevelMeter {
    /// Create a meter for the given sample rate.
    pub fn new(sample_rate: f32) -> Self {
        Self {
            left: ChannelMeter::default(),
            right: ChannelMeter::default(),
            peak_decay: 0.9995,
            hold_time: 2.0,
            sample_rate,
        }
    }

    /// Set the smoothed-peak decay multiplier, clamped to [0, 1].
    pub fn set_peak_decay(&mut self, decay: f32) {
        self.peak_decay = decay.clamp(0.0, 1.0);
    }

    /// Set the peak-hold time in seconds.
    pub fn set_hold_time(&mut self, seconds: f32) {
        self.hold_time = seconds.max(0.0);
    }

    /// Feed one stereo block.
    pub fn analyze(&mut self, left: &[f32], right: &[f32]) {
        debug_assert_eq!(left.len(), right.len());
        let frames = left.len();
        if frames == 0 {
            return;
        }

        Self::analyze_channel(
            &mut self.left,
            left,
            self.peak_decay,
            self.hold_time * self.sample_rate,
        );
        Self::analyze_channel(
            &mut self.right,
            right,
            self.peak_decay,
            self.hold_time * self.sample_rate,
        );
    }

    fn analyze_channel(ch: &mut ChannelMeter, samples: &[f32], decay: f32, hold_samples: f32) {
        let mut sum = 0.0f32;
        let mut block_peak = 0.0f32;

        for &s in samples {
            let a = s.abs();
            sum += s * s;
            if a > block_peak {
                block_peak = a;
            }
            if a >= 1.0 {
                ch.clip = true;
            }
        }

        ch.rms = sqrtf(sum / samples.len() as f32);

        if block_peak > ch.peak {
            ch.peak = block_peak;
        } else {
            ch.peak *= decay;
        }

        if block_peak > ch.peak_hold {
            ch.peak_hold = block_peak;
            ch.hold_counter = hold_samples;
        } else if ch.hold_counter > 0.0 {
            ch.hold_counter -= samples.len() as f32;
        } else {
            ch.peak_hold *= decay;
        }
    }

    /// Most recent block RMS, left channel.
    pub fn rms_left(&self) -> f32 {
        self.left.rms
    }

    /// Most recent block RMS, right channel.
    pub fn rms_right(&self) -> f32 {
        self.right.rms
    }

    /// Smoothed peak, left channel.
    pub fn peak_left(&self) -> f32 {
        self.left.peak
    }

    /// Smoothed peak, right channel.
    pub fn peak_right(&self) -> f32 {
        self.right.peak
    }

    /// Held peak, left channel.
    pub fn peak_hold_left(&self) -> f32 {
        self.left.peak_hold
    }

    /// Held peak, right channel.
    pub fn peak_hold_right(&self) -> f32 {
        self.right.peak_hold
    }

    /// Whether either channel has clipped since the last reset.
    pub fn clipped(&self) -> bool {
        self.left.clip || self.right.clip
    }

    /// Clear the clip latches.
    pub fn reset_clip(&mut self) {
        self.left.clip = false;
        self.right.clip = false;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rms_of_constant_block() {
        let mut meter = LevelMeter::new(48000.0);
        meter.analyze(&[0.5; 1024], &[0.25; 1024]);
        assert!((meter.rms_left() - 0.5).abs() < 1e-6);
        assert!((meter.rms_right() - 0.25).abs() < 1e-6);
    }

    #[test]
    fn rms_of_sine_is_peak_over_sqrt2() {
        let block: Vec<f32> = (0..4800)
            .map(|i| libm::sinf(i as f32 * core::f32::consts::TAU * 100.0 / 48000.0))
            .collect();
        let mut meter = LevelMeter::new(48000.0);
        meter.analyze(&block, &block);
        assert!((meter.rms_left() - core::f32::consts::FRAC_1_SQRT_2).abs() < 0.01);
    }

    #[test]
    fn peak_rises_immediately_and_decays_slowly() {
        let mut meter = LevelMeter::new(48000.0);
        meter.set_peak_decay(0.5);
        meter.analyze(&[0.8; 64], &[0.8; 64]);
        assert!((meter.peak_left() - 0.8).abs() < 1e-6);

        meter.analyze(&[0.0; 64], &[0.0; 64]);
        assert!((meter.peak_left() - 0.4).abs() < 1e-6);
    }

    #[test]
    fn peak_hold_latches_for_hold_time() {
        let sr = 1000.0;
        let mut meter = LevelMeter::new(sr);
        meter.set_hold_time(0.1); // 100 samples
        meter.set_peak_decay(0.5);

        meter.analyze(&[0.9; 50], &[0.9; 50]);
        assert_eq!(meter.peak_hold_left(), 0.9);

        // Within the hold window: still latched.
        meter.analyze(&[0.0; 50], &[0.0; 50]);
        assert_eq!(meter.peak_hold_left(), 0.9);

        // Hold expires; decay begins.
        meter.analyze(&[0.0; 50], &[0.0; 50]);
        meter.analyze(&[0.0; 50], &[0.0; 50]);
        assert!(meter.peak_hold_left() < 0.9);
    }

    #[test]
    fn clip_latches_until_reset() {
        let mut meter = LevelMeter::new(48000.0);
        meter.analyze(&[1.5; 16], &[0.0; 16]);
        assert!(meter.clipped());

        meter.analyze(&[0.0; 16], &[0.0; 16]);
        assert!(meter.clipped(), "clip must latch");

        meter.reset_clip();
        assert!(!meter.clipped());
    }
}
