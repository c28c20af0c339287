//! Oscillator bank: layered free-running sources with stereo placement.
//!
//! Thirty-two slots, each holding one tagged oscillator with its own gain
//! and pan. The bank renders a full stereo block by accumulating every
//! active slot. Tracks use a [`Voice`](crate::Voice) for note playback;
//! the bank is the drone/texture layer where note gating is not wanted.

use core::fmt;

use crate::additive::AdditiveOscillator;
use crate::chaos::ChaosOscillator;
use crate::fm::FmOscillator;
use crate::fractal::FractalOscillator;
use crate::morph::MorphOscillator;
use crate::noise::{NoiseGenerator, NoiseType};
use crate::wavetable::WavetableOscillator;

/// Maximum number of bank slots.
pub const MAX_SLOTS: usize = 32;

/// Error returned when the bank has no free slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BankFull;

impl fmt::Display for BankFull {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "oscillator bank is full ({MAX_SLOTS} slots)")
    }
}

impl std::error::Error for BankFull {}

/// A tagged oscillator held by a bank slot.
///
/// Closed set of variants dispatched by match; the hot loop stays
/// monomorphic.
pub enum OscillatorKind {
    /// Morphing dual-waveform oscillator.
    Morph(MorphOscillator),
    /// Lorenz attractor.
    Chaos(ChaosOscillator),
    /// Wavetable oscillator.
    Wavetable(WavetableOscillator),
    /// FM operator network.
    Fm(FmOscillator),
    /// Additive partial bank.
    Additive(AdditiveOscillator),
    /// Coloured noise.
    Noise(NoiseGenerator),
    /// Julia-set harmonic oscillator.
    Fractal(FractalOscillator),
}

impl OscillatorKind {
    /// A default oscillator of each family, used by [`OscillatorBank::add`].
    pub fn default_of(tag: OscillatorTag, sample_rate: f32) -> Self {
        match tag {
            OscillatorTag::Morph => Self::Morph(MorphOscillator::new(sample_rate)),
            OscillatorTag::Chaos => Self::Chaos(ChaosOscillator::new(sample_rate)),
            OscillatorTag::Wavetable => Self::Wavetable(WavetableOscillator::new(sample_rate)),
            OscillatorTag::Fm => Self::Fm(FmOscillator::new(sample_rate, 4)),
            OscillatorTag::Additive => Self::Additive(AdditiveOscillator::new(sample_rate)),
            OscillatorTag::Noise => Self::Noise(NoiseGenerator::new(NoiseType::White, 0)),
            OscillatorTag::Fractal => Self::Fractal(FractalOscillator::new(sample_rate)),
        }
    }

    /// Advance one sample.
    #[inline]
    pub fn process(&mut self) -> f32 {
        match self {
            Self::Morph(o) => o.process(),
            Self::Chaos(o) => o.process(),
            Self::Wavetable(o) => o.process(),
            Self::Fm(o) => o.process(),
            Self::Additive(o) => o.process(),
            Self::Noise(o) => o.process(),
            Self::Fractal(o) => o.process(),
        }
    }

    /// Set the oscillator frequency where the family has one (noise and
    /// chaos ignore it).
    pub fn set_frequency(&mut self, freq: f32) {
        match self {
            Self::Morph(o) => o.set_frequency(freq),
            Self::Wavetable(o) => o.set_frequency(freq),
            Self::Fm(o) => o.set_frequency(freq),
            Self::Additive(o) => o.set_frequency(freq),
            Self::Fractal(o) => o.set_frequency(freq),
            Self::Chaos(_) | Self::Noise(_) => {}
        }
    }
}

/// Family selector for [`OscillatorBank::add`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum OscillatorTag {
    Morph,
    Chaos,
    Wavetable,
    Fm,
    Additive,
    Noise,
    Fractal,
}

struct Slot {
    osc: OscillatorKind,
    gain: f32,
    pan: f32,
}

/// Fixed-capacity bank of layered oscillators.
///
/// Pan is in [0, 1]: 0 = hard left, 0.5 = centre, 1 = hard right, applied
/// as `gain_l = gain·(1 − pan)`, `gain_r = gain·pan`.
///
/// # Example
///
/// ```rust
/// use cadenza_synth::bank::{OscillatorBank, OscillatorTag};
///
/// let mut bank = OscillatorBank::new(48000.0);
/// let slot = bank.add(OscillatorTag::Morph).unwrap();
/// bank.set_gain(slot, 0.8);
///
/// let mut left = [0.0f32; 64];
/// let mut right = [0.0f32; 64];
/// bank.process_stereo(&mut left, &mut right);
/// ```
pub struct OscillatorBank {
    slots: Vec<Option<Slot>>,
    sample_rate: f32,
}

impl OscillatorBank {
    /// Create an empty bank.
    pub fn new(sample_rate: f32) -> Self {
        Self {
            slots: (0..MAX_SLOTS).map(|_| None).collect(),
            sample_rate,
        }
    }

    /// Add a default oscillator of the given family into the first free
    /// slot; returns the slot index or [`BankFull`].
    pub fn add(&mut self, tag: OscillatorTag) -> Result<usize, BankFull> {
        let free = self.slots.iter().position(|s| s.is_none()).ok_or(BankFull)?;
        self.slots[free] = Some(Slot {
            osc: OscillatorKind::default_of(tag, self.sample_rate),
            gain: 1.0,
            pan: 0.5,
        });
        Ok(free)
    }

    /// Insert a pre-configured oscillator; returns the slot index.
    pub fn add_oscillator(&mut self, osc: OscillatorKind) -> Result<usize, BankFull> {
        let free = self.slots.iter().position(|s| s.is_none()).ok_or(BankFull)?;
        self.slots[free] = Some(Slot {
            osc,
            gain: 1.0,
            pan: 0.5,
        });
        Ok(free)
    }

    /// Remove the oscillator at `slot`, freeing it.
    pub fn remove(&mut self, slot: usize) {
        if let Some(s) = self.slots.get_mut(slot) {
            *s = None;
        }
    }

    /// Number of occupied slots.
    pub fn active_count(&self) -> usize {
        self.slots.iter().filter(|s| s.is_some()).count()
    }

    /// Set a slot's gain (clamped to [0, 2]).
    pub fn set_gain(&mut self, slot: usize, gain: f32) {
        if let Some(Some(s)) = self.slots.get_mut(slot) {
            s.gain = gain.clamp(0.0, 2.0);
        }
    }

    /// Set a slot's pan (clamped to [0, 1]).
    pub fn set_pan(&mut self, slot: usize, pan: f32) {
        if let Some(Some(s)) = self.slots.get_mut(slot) {
            s.pan = pan.clamp(0.0, 1.0);
        }
    }

    /// Mutable access to a slot's oscillator.
    pub fn oscillator_mut(&mut self, slot: usize) -> Option<&mut OscillatorKind> {
        self.slots.get_mut(slot).and_then(|s| s.as_mut()).map(|s| &mut s.osc)
    }

    /// Render a stereo block, overwriting both buffers.
    pub fn process_stereo(&mut self, left: &mut [f32], right: &mut [f32]) {
        debug_assert_eq!(left.len(), right.len());
        left.fill(0.0);
        right.fill(0.0);

        for slot in self.slots.iter_mut().flatten() {
            let gain_l = slot.gain * (1.0 - slot.pan);
            let gain_r = slot.gain * slot.pan;
            for i in 0..left.len() {
                let sample = slot.osc.process();
                left[i] += sample * gain_l;
                right[i] += sample * gain_r;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn add_until_full() {
        let mut bank = OscillatorBank::new(48000.0);
        for i in 0..MAX_SLOTS {
            assert_eq!(bank.add(OscillatorTag::Morph), Ok(i));
        }
        assert_eq!(bank.add(OscillatorTag::Morph), Err(BankFull));
        assert_eq!(bank.active_count(), MAX_SLOTS);
    }

    #[test]
    fn remove_frees_slot() {
        let mut bank = OscillatorBank::new(48000.0);
        let a = bank.add(OscillatorTag::Morph).unwrap();
        bank.remove(a);
        assert_eq!(bank.active_count(), 0);
        // The freed slot is reused.
        assert_eq!(bank.add(OscillatorTag::Noise), Ok(a));
    }

    #[test]
    fn empty_bank_renders_silence() {
        let mut bank = OscillatorBank::new(48000.0);
        let mut left = [1.0f32; 32];
        let mut right = [1.0f32; 32];
        bank.process_stereo(&mut left, &mut right);
        assert!(left.iter().all(|&s| s == 0.0));
        assert!(right.iter().all(|&s| s == 0.0));
    }

    #[test]
    fn pan_splits_channels() {
        let mut bank = OscillatorBank::new(48000.0);
        let slot = bank.add(OscillatorTag::Morph).unwrap();
        bank.set_pan(slot, 0.0); // hard left

        let mut left = [0.0f32; 256];
        let mut right = [0.0f32; 256];
        bank.process_stereo(&mut left, &mut right);

        assert!(left.iter().any(|&s| s.abs() > 0.01));
        assert!(right.iter().all(|&s| s == 0.0));
    }

    #[test]
    fn centre_pan_is_equal_split() {
        let mut bank = OscillatorBank::new(48000.0);
        bank.add(OscillatorTag::Morph).unwrap();

        let mut left = [0.0f32; 64];
        let mut right = [0.0f32; 64];
        bank.process_stereo(&mut left, &mut right);
        for i in 0..64 {
            assert_eq!(left[i], right[i]);
        }
    }
}
