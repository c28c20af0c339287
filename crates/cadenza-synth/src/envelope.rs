//! Gate-driven ADSR envelope.
//!
//! A unipolar one-pole follower chasing a target level. With the gate
//! high the target is 1.0 until the level first reaches 0.99, after which
//! the target becomes the sustain level; with the gate low the target is
//! zero. Each segment uses its own coefficient `exp(-1/(t·sr))`.
//!
//! Raising the gate never resets the level, so retriggering a sounding
//! note rises from wherever the envelope currently sits — legato without
//! clicks.

use libm::expf;

/// One-pole ADSR envelope.
///
/// ## Parameters
///
/// All segment times are in seconds (floored at 0.1 ms to keep the
/// coefficients finite).
///
/// - `attack`: rise time constant toward 1.0 (default 0.01)
/// - `decay`: fall time constant toward `sustain` (default 0.2)
/// - `sustain`: held level in [0, 1] (default 0.7)
/// - `release`: fall time constant toward 0 (default 0.3)
///
/// # Example
///
/// ```rust
/// use cadenza_synth::AdsrEnvelope;
///
/// let mut env = AdsrEnvelope::new(48000.0);
/// env.set_adsr(0.01, 0.2, 0.7, 0.3);
/// env.gate_on();
/// let level = env.process();
/// env.gate_off();
/// ```
#[derive(Debug, Clone)]
pub struct AdsrEnvelope {
    level: f32,
    gate: bool,
    sample_rate: f32,

    attack: f32,
    decay: f32,
    sustain: f32,
    release: f32,

    attack_coef: f32,
    decay_coef: f32,
    release_coef: f32,
}

/// Minimum segment time in seconds.
const MIN_TIME: f32 = 0.0001;

impl AdsrEnvelope {
    /// Create an envelope with defaults A=10ms D=200ms S=0.7 R=300ms.
    pub fn new(sample_rate: f32) -> Self {
        let mut env = Self {
            level: 0.0,
            gate: false,
            sample_rate,
            attack: 0.01,
            decay: 0.2,
            sustain: 0.7,
            release: 0.3,
            attack_coef: 0.0,
            decay_coef: 0.0,
            release_coef: 0.0,
        };
        env.recalculate();
        env
    }

    /// Set all four parameters at once (times in seconds).
    pub fn set_adsr(&mut self, attack: f32, decay: f32, sustain: f32, release: f32) {
        self.attack = attack.max(MIN_TIME);
        self.decay = decay.max(MIN_TIME);
        self.sustain = sustain.clamp(0.0, 1.0);
        self.release = release.max(MIN_TIME);
        self.recalculate();
    }

    /// Set the attack time in seconds.
    pub fn set_attack(&mut self, seconds: f32) {
        self.attack = seconds.max(MIN_TIME);
        self.attack_coef = coef(self.attack, self.sample_rate);
    }

    /// Set the decay time in seconds.
    pub fn set_decay(&mut self, seconds: f32) {
        self.decay = seconds.max(MIN_TIME);
        self.decay_coef = coef(self.decay, self.sample_rate);
    }

    /// Set the sustain level, clamped to [0, 1].
    pub fn set_sustain(&mut self, level: f32) {
        self.sustain = level.clamp(0.0, 1.0);
    }

    /// Set the release time in seconds.
    pub fn set_release(&mut self, seconds: f32) {
        self.release = seconds.max(MIN_TIME);
        self.release_coef = coef(self.release, self.sample_rate);
    }

    /// Sustain level.
    pub fn sustain(&self) -> f32 {
        self.sustain
    }

    /// Update the sample rate and recompute coefficients.
    pub fn set_sample_rate(&mut self, sample_rate: f32) {
        self.sample_rate = sample_rate;
        self.recalculate();
    }

    /// Raise the gate. Does not reset the level (legato).
    pub fn gate_on(&mut self) {
        self.gate = true;
    }

    /// Drop the gate; the envelope releases toward zero.
    pub fn gate_off(&mut self) {
        self.gate = false;
    }

    /// Whether the gate is currently high.
    pub fn gate(&self) -> bool {
        self.gate
    }

    /// Current level without advancing.
    pub fn level(&self) -> f32 {
        self.level
    }

    /// Force the envelope to silence.
    pub fn reset(&mut self) {
        self.level = 0.0;
        self.gate = false;
    }

    fn recalculate(&mut self) {
        self.attack_coef = coef(self.attack, self.sample_rate);
        self.decay_coef = coef(self.decay, self.sample_rate);
        self.release_coef = coef(self.release, self.sample_rate);
    }

    /// Advance one sample and return the new level.
    #[inline]
    pub fn process(&mut self) -> f32 {
        let (target, c) = if self.gate {
            if self.level < 0.99 {
                (1.0, self.attack_coef)
            } else {
                (self.sustain, self.decay_coef)
            }
        } else {
            (0.0, self.release_coef)
        };

        self.level = c * (self.level - target) + target;
        self.level
    }
}

#[inline]
fn coef(seconds: f32, sample_rate: f32) -> f32 {
    expf(-1.0 / (seconds * sample_rate))
}
