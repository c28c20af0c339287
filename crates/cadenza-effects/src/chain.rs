//! Effect chain: ordered tagged slots applied in place.
//!
//! Each slot holds one effect as a closed enum variant plus a bypass
//! flag. Dispatch is a value match, so the hot loop stays monomorphic and
//! there is no discriminant-free union to misread. The chain applies
//! slots in insertion order, in place, on the stereo block; bypassed
//! slots leave the block bitwise untouched.
//!
//! Reordering and insertion are structural edits; the engine serializes
//! them against the audio callback.

use core::fmt;

use cadenza_core::Effect;

use crate::bitcrusher::Bitcrusher;
use crate::chorus::Chorus;
use crate::compressor::Compressor;
use crate::delay::MultiTapDelay;
use crate::distortion::Distortion;
use crate::external::ExternalNode;
use crate::filter::FilterEffect;
use crate::formant::FormantFilter;
use crate::ladder::LadderFilter;
use crate::phaser::Phaser;
use crate::reverb::Reverb;

/// Maximum slots per chain.
pub const MAX_CHAIN_SLOTS: usize = 16;

/// Error returned when a chain has no free slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ChainFull;

impl fmt::Display for ChainFull {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "effect chain is full ({MAX_CHAIN_SLOTS} slots)")
    }
}

impl std::error::Error for ChainFull {}

/// A tagged effect held by a chain slot.
pub enum EffectKind {
    /// Multi-mode state variable filter.
    Filter(FilterEffect),
    /// Moog-style ladder filter.
    Ladder(LadderFilter),
    /// Vowel formant filter.
    Formant(FormantFilter),
    /// Multi-tap delay.
    Delay(MultiTapDelay),
    /// Schroeder-Moorer reverb.
    Reverb(Reverb),
    /// Waveshaping distortion.
    Distortion(Distortion),
    /// Soft-knee compressor.
    Compressor(Compressor),
    /// Ensemble chorus.
    Chorus(Chorus),
    /// Swept allpass phaser.
    Phaser(Phaser),
    /// Sample-rate / bit-depth reducer.
    Bitcrusher(Bitcrusher),
    /// Externally implemented processor node.
    External(ExternalNode),
}

impl EffectKind {
    /// Process a stereo block in place.
    #[inline]
    pub fn process_block(&mut self, left: &mut [f32], right: &mut [f32]) {
        match self {
            Self::Filter(e) => e.process_block_stereo_inplace(left, right),
            Self::Ladder(e) => e.process_block_stereo_inplace(left, right),
            Self::Formant(e) => e.process_block_stereo_inplace(left, right),
            Self::Delay(e) => e.process_block_stereo_inplace(left, right),
            Self::Reverb(e) => e.process_block_stereo_inplace(left, right),
            Self::Distortion(e) => e.process_block_stereo_inplace(left, right),
            Self::Compressor(e) => e.process_block_stereo_inplace(left, right),
            Self::Chorus(e) => e.process_block_stereo_inplace(left, right),
            Self::Phaser(e) => e.process_block_stereo_inplace(left, right),
            Self::Bitcrusher(e) => e.process_block_stereo_inplace(left, right),
            Self::External(e) => e.process_block(left, right),
        }
    }

    /// Set the dry/wet mix of the inner effect.
    pub fn set_mix(&mut self, mix: f32) {
        match self {
            Self::Filter(e) => e.set_mix(mix),
            Self::Ladder(e) => e.set_mix(mix),
            Self::Formant(e) => e.set_mix(mix),
            Self::Delay(e) => e.set_mix(mix),
            Self::Reverb(e) => e.set_mix(mix),
            Self::Distortion(e) => e.set_mix(mix),
            Self::Compressor(e) => e.set_mix(mix),
            Self::Chorus(e) => e.set_mix(mix),
            Self::Phaser(e) => e.set_mix(mix),
            Self::Bitcrusher(e) => e.set_mix(mix),
            Self::External(e) => e.set_mix(mix),
        }
    }

    /// Current dry/wet mix of the inner effect.
    pub fn mix(&self) -> f32 {
        match self {
            Self::Filter(e) => e.mix(),
            Self::Ladder(e) => e.mix(),
            Self::Formant(e) => e.mix(),
            Self::Delay(e) => e.mix(),
            Self::Reverb(e) => e.mix(),
            Self::Distortion(e) => e.mix(),
            Self::Compressor(e) => e.mix(),
            Self::Chorus(e) => e.mix(),
            Self::Phaser(e) => e.mix(),
            Self::Bitcrusher(e) => e.mix(),
            Self::External(e) => e.mix(),
        }
    }

    /// Write a single-word parameter by index.
    ///
    /// Index 0 is always the dry/wet mix. The remaining indices follow
    /// each effect's primary controls:
    ///
    /// | Variant | 1 | 2 | 3 | 4 |
    /// |---------|---|---|---|---|
    /// | Filter | cutoff Hz | resonance | | |
    /// | Ladder | cutoff Hz | resonance | | |
    /// | Formant | vowel 0-4 | | | |
    /// | Delay | feedback LPF Hz | | | |
    /// | Reverb | room size | damping | width | predelay s |
    /// | Distortion | drive | tone Hz | bias | |
    /// | Compressor | threshold dB | ratio | attack s | release s |
    /// | Chorus | rate Hz | depth s | | |
    /// | Phaser | rate Hz | depth | feedback | |
    /// | Bitcrusher | reduction | bit depth | | |
    /// | External | forwarded as node parameter `index − 1` | | | |
    ///
    /// Out-of-range indices are ignored; values are clamped by the
    /// receiving setter.
    pub fn set_param(&mut self, index: usize, value: f32) {
        if index == 0 {
            self.set_mix(value);
            return;
        }
        match (self, index) {
            (Self::Filter(e), 1) => e.set_cutoff(value),
            (Self::Filter(e), 2) => e.set_resonance(value),
            (Self::Ladder(e), 1) => e.set_cutoff(value),
            (Self::Ladder(e), 2) => e.set_resonance(value),
            (Self::Formant(e), 1) => e.set_vowel(value),
            (Self::Delay(e), 1) => e.set_feedback_cutoff(value),
            (Self::Reverb(e), 1) => e.set_room_size(value),
            (Self::Reverb(e), 2) => e.set_damping(value),
            (Self::Reverb(e), 3) => e.set_width(value),
            (Self::Reverb(e), 4) => e.set_predelay(value),
            (Self::Distortion(e), 1) => e.set_drive(value),
            (Self::Distortion(e), 2) => e.set_tone(value),
            (Self::Distortion(e), 3) => e.set_bias(value),
            (Self::Compressor(e), 1) => e.set_threshold(value),
            (Self::Compressor(e), 2) => e.set_ratio(value),
            (Self::Compressor(e), 3) => e.set_attack(value),
            (Self::Compressor(e), 4) => e.set_release(value),
            (Self::Chorus(e), 1) => e.set_rate(value),
            (Self::Chorus(e), 2) => e.set_depth(value),
            (Self::Phaser(e), 1) => e.set_rate(value),
            (Self::Phaser(e), 2) => e.set_depth(value),
            (Self::Phaser(e), 3) => e.set_feedback(value),
            (Self::Bitcrusher(e), 1) => e.set_reduction(value.max(1.0) as u32),
            (Self::Bitcrusher(e), 2) => e.set_bit_depth(value.max(1.0) as u32),
            (Self::External(e), i) => e.set_parameter((i - 1) as u32, value),
            _ => {}
        }
    }

    fn set_sample_rate(&mut self, sample_rate: f32) {
        match self {
            Self::Filter(e) => e.set_sample_rate(sample_rate),
            Self::Ladder(e) => e.set_sample_rate(sample_rate),
            Self::Formant(e) => e.set_sample_rate(sample_rate),
            Self::Delay(e) => e.set_sample_rate(sample_rate),
            Self::Reverb(e) => e.set_sample_rate(sample_rate),
            Self::Distortion(e) => e.set_sample_rate(sample_rate),
            Self::Compressor(e) => e.set_sample_rate(sample_rate),
            Self::Chorus(e) => e.set_sample_rate(sample_rate),
            Self::Phaser(e) => e.set_sample_rate(sample_rate),
            Self::Bitcrusher(e) => e.set_sample_rate(sample_rate),
            Self::External(_) => {}
        }
    }

    fn reset(&mut self) {
        match self {
            Self::Filter(e) => e.reset(),
            Self::Ladder(e) => e.reset(),
            Self::Formant(e) => e.reset(),
            Self::Delay(e) => e.reset(),
            Self::Reverb(e) => e.reset(),
            Self::Distortion(e) => e.reset(),
            Self::Compressor(e) => e.reset(),
            Self::Chorus(e) => e.reset(),
            Self::Phaser(e) => e.reset(),
            Self::Bitcrusher(e) => e.reset(),
            Self::External(e) => e.reset(),
        }
    }
}

/// One chain position: a tagged effect plus a bypass flag.
pub struct EffectSlot {
    /// The effect itself.
    pub kind: EffectKind,
    /// When set, the slot is skipped entirely.
    pub bypass: bool,
}

impl EffectSlot {
    /// Wrap an effect in an active slot.
    pub fn new(kind: EffectKind) -> Self {
        Self {
            kind,
            bypass: false,
        }
    }

    /// Set the slot's dry/wet mix (delegates to the inner effect).
    pub fn set_mix(&mut self, mix: f32) {
        self.kind.set_mix(mix);
    }

    /// The slot's dry/wet mix.
    pub fn mix(&self) -> f32 {
        self.kind.mix()
    }
}

/// Ordered list of effect slots applied in place.
///
/// # Example
///
/// ```rust
/// use cadenza_effects::{EffectChain, EffectKind, EffectSlot, Distortion, Reverb};
///
/// let mut chain = EffectChain::new(48000.0);
/// chain
///     .push(EffectSlot::new(EffectKind::Distortion(Distortion::new(48000.0))))
///     .unwrap();
/// chain
///     .push(EffectSlot::new(EffectKind::Reverb(Reverb::new(48000.0))))
///     .unwrap();
///
/// let mut left = [0.5f32; 64];
/// let mut right = [0.5f32; 64];
/// chain.process_block(&mut left, &mut right);
/// ```
pub struct EffectChain {
    slots: Vec<EffectSlot>,
    sample_rate: f32,
}

impl EffectChain {
    /// Create an empty chain.
    pub fn new(sample_rate: f32) -> Self {
        Self {
            slots: Vec::with_capacity(MAX_CHAIN_SLOTS),
            sample_rate,
        }
    }

    /// Append a slot. Fails with [`ChainFull`] past [`MAX_CHAIN_SLOTS`];
    /// the chain is unchanged on failure.
    pub fn push(&mut self, mut slot: EffectSlot) -> Result<usize, ChainFull> {
        if self.slots.len() >= MAX_CHAIN_SLOTS {
            return Err(ChainFull);
        }
        slot.kind.set_sample_rate(self.sample_rate);
        self.slots.push(slot);
        Ok(self.slots.len() - 1)
    }

    /// Remove and return the slot at `index`; `None` when out of range.
    pub fn remove(&mut self, index: usize) -> Option<EffectSlot> {
        if index < self.slots.len() {
            let mut slot = self.slots.remove(index);
            if let EffectKind::External(node) = &mut slot.kind {
                node.shutdown();
            }
            Some(slot)
        } else {
            None
        }
    }

    /// Move the slot at `from` to position `to`. Out-of-range indices
    /// leave the chain unchanged.
    pub fn reorder(&mut self, from: usize, to: usize) {
        if from < self.slots.len() && to < self.slots.len() && from != to {
            let slot = self.slots.remove(from);
            self.slots.insert(to, slot);
        }
    }

    /// Number of slots.
    pub fn len(&self) -> usize {
        self.slots.len()
    }

    /// Whether the chain is empty.
    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    /// Access a slot.
    pub fn slot(&self, index: usize) -> Option<&EffectSlot> {
        self.slots.get(index)
    }

    /// Mutable access to a slot.
    pub fn slot_mut(&mut self, index: usize) -> Option<&mut EffectSlot> {
        self.slots.get_mut(index)
    }

    /// Set a slot's bypass flag.
    pub fn set_bypass(&mut self, index: usize, bypass: bool) {
        if let Some(slot) = self.slots.get_mut(index) {
            slot.bypass = bypass;
        }
    }

    /// Update the sample rate for every slot.
    pub fn set_sample_rate(&mut self, sample_rate: f32) {
        self.sample_rate = sample_rate;
        for slot in &mut self.slots {
            slot.kind.set_sample_rate(sample_rate);
        }
    }

    /// Reset every slot's internal state.
    pub fn reset(&mut self) {
        for slot in &mut self.slots {
            slot.kind.reset();
        }
    }

    /// Apply all non-bypassed slots in order, in place.
    pub fn process_block(&mut self, left: &mut [f32], right: &mut [f32]) {
        for slot in &mut self.slots {
            if slot.bypass {
                continue;
            }
            slot.kind.process_block(left, right);
        }
    }
}
