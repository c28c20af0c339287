//! Feed-forward dynamics compressor.
//!
//! Soft-knee gain computer in the dB domain with a one-pole envelope
//! follower. The detector runs on a side-chain signal — by default the
//! mono sum of the stereo input, which keeps the image stable because
//! both channels get the same gain reduction.

use cadenza_core::{db_to_linear, linear_to_db, Effect};
use libm::expf;

/// Level detector flavour.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum DetectorMode {
    /// Instantaneous absolute value.
    #[default]
    Peak,
    /// Running mean-square with a 10 ms window.
    Rms,
}

/// Soft-knee feed-forward compressor.
///
/// ## Parameters
///
/// - `threshold`: dB, default −20
/// - `ratio`: ≥ 1, default 4
/// - `attack` / `release`: seconds, defaults 0.01 / 0.1; envelope
///   coefficients are `exp(−1/(τ · sr))`
/// - `knee`: dB span of the soft knee, default 6
/// - `makeup`: dB of output gain, default 0
/// - `detector`: peak or RMS side-chain level
/// - `mix`: [0, 1], default 1 (lower for parallel compression)
///
/// # Example
///
/// ```rust
/// use cadenza_effects::Compressor;
/// use cadenza_core::Effect;
///
/// let mut comp = Compressor::new(48000.0);
/// comp.set_threshold(-12.0);
/// comp.set_ratio(3.0);
/// let (l, r) = comp.process_stereo(0.9, 0.9);
/// ```
#[derive(Debug, Clone)]
pub struct Compressor {
    threshold: f32,
    ratio: f32,
    attack: f32,
    release: f32,
    knee: f32,
    makeup: f32,
    detector: DetectorMode,
    mix: f32,

    attack_coef: f32,
    release_coef: f32,
    rms_coef: f32,

    envelope_db: f32,
    mean_square: f32,
    sample_rate: f32,
}

impl Compressor {
    /// Create a compressor at the given sample rate.
    pub fn new(sample_rate: f32) -> Self {
        let mut comp = Self {
            threshold: -20.0,
            ratio: 4.0,
            attack: 0.01,
            release: 0.1,
            knee: 6.0,
            makeup: 0.0,
            detector: DetectorMode::Peak,
            mix: 1.0,
            attack_coef: 0.0,
            release_coef: 0.0,
            rms_coef: 0.0,
            envelope_db: 0.0,
            mean_square: 0.0,
            sample_rate,
        };
        comp.recalculate();
        comp
    }

    /// Set the threshold in dB.
    pub fn set_threshold(&mut self, db: f32) {
        self.threshold = db;
    }

    /// Set the ratio (clamped to ≥ 1).
    pub fn set_ratio(&mut self, ratio: f32) {
        self.ratio = ratio.max(1.0);
    }

    /// Set the attack time in seconds.
    pub fn set_attack(&mut self, seconds: f32) {
        self.attack = seconds.max(0.0001);
        self.attack_coef = expf(-1.0 / (self.attack * self.sample_rate));
    }

    /// Set the release time in seconds.
    pub fn set_release(&mut self, seconds: f32) {
        self.release = seconds.max(0.0001);
        self.release_coef = expf(-1.0 / (self.release * self.sample_rate));
    }

    /// Set the knee width in dB (≥ 0).
    pub fn set_knee(&mut self, db: f32) {
        self.knee = db.max(0.0);
    }

    /// Set the makeup gain in dB.
    pub fn set_makeup(&mut self, db: f32) {
        self.makeup = db;
    }

    /// Select the detector flavour.
    pub fn set_detector(&mut self, mode: DetectorMode) {
        self.detector = mode;
    }

    /// Set dry/wet mix in [0, 1].
    pub fn set_mix(&mut self, mix: f32) {
        self.mix = mix.clamp(0.0, 1.0);
    }

    /// Current dry/wet mix.
    pub fn mix(&self) -> f32 {
        self.mix
    }

    /// Current gain reduction in dB (positive numbers mean reduction).
    pub fn gain_reduction_db(&self) -> f32 {
        self.envelope_db
    }

    fn recalculate(&mut self) {
        self.attack_coef = expf(-1.0 / (self.attack * self.sample_rate));
        self.release_coef = expf(-1.0 / (self.release * self.sample_rate));
        self.rms_coef = expf(-1.0 / (0.010 * self.sample_rate));
    }

    /// Detector level in dB for the side-chain sample.
    #[inline]
    fn detect_db(&mut self, sidechain: f32) -> f32 {
        match self.detector {
            DetectorMode::Peak => linear_to_db(sidechain.abs()),
            DetectorMode::Rms => {
                self.mean_square =
                    self.rms_coef * self.mean_square + (1.0 - self.rms_coef) * sidechain * sidechain;
                linear_to_db(self.mean_square.max(1e-20).sqrt())
            }
        }
    }

    /// Compress `input` against an explicit side-chain sample.
    #[inline]
    pub fn process_sidechain(&mut self, input: f32, sidechain: f32) -> f32 {
        let level_db = self.detect_db(sidechain);

        let mut over_db = level_db - self.threshold;
        let target = if over_db > 0.0 {
            if over_db < self.knee {
                over_db = over_db * over_db / (2.0 * self.knee);
            }
            over_db * (1.0 - 1.0 / self.ratio)
        } else {
            0.0
        };

        // Attack when the reduction target rises, release when it falls.
        let coef = if target > self.envelope_db {
            self.attack_coef
        } else {
            self.release_coef
        };
        self.envelope_db = coef * (self.envelope_db - target) + target;

        let gain = db_to_linear(self.makeup - self.envelope_db);
        let wet = input * gain;
        input + (wet - input) * self.mix
    }
}

impl Effect for Compressor {
    #[inline]
    fn process(&mut self, input: f32) -> f32 {
        self.process_sidechain(input, input)
    }

    #[inline]
    fn process_stereo(&mut self, left: f32, right: f32) -> (f32, f32) {
        // One detector pass on the mono sum, identical gain both sides.
        let sidechain = (left + right) * 0.5;
        let level_db = self.detect_db(sidechain);

        let mut over_db = level_db - self.threshold;
        let target = if over_db > 0.0 {
            if over_db < self.knee {
                over_db = over_db * over_db / (2.0 * self.knee);
            }
            over_db * (1.0 - 1.0 / self.ratio)
        } else {
            0.0
        };

        let coef = if target > self.envelope_db {
            self.attack_coef
        } else {
            self.release_coef
        };
        self.envelope_db = coef * (self.envelope_db - target) + target;

        let gain = db_to_linear(self.makeup - self.envelope_db);
        (
            left + (left * gain - left) * self.mix,
            right + (right * gain - right) * self.mix,
        )
    }

    fn is_true_stereo(&self) -> bool {
        true
    }

    fn set_sample_rate(&mut self, sample_rate: f32) {
        self.sample_rate = sample_rate;
        self.recalculate();
    }

    fn reset(&mut self) {
        self.envelope_db = 0.0;
        self.mean_square = 0.0;
    }
}
