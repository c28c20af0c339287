//! Cadenza Effects - effect primitives and the per-track effect chain
//!
//! Every effect implements [`Effect`](cadenza_core::Effect), owns a
//! dry/wet `mix`, and clamps parameters silently to their documented
//! ranges. The [`EffectChain`] holds an ordered list of tagged
//! [`EffectSlot`]s and applies them in place on a stereo block, skipping
//! bypassed slots.
//!
//! # Filters
//!
//! - [`FilterEffect`] - multi-mode state variable filter slot
//! - [`LadderFilter`] - four-stage Moog-style ladder with input saturation
//! - [`FormantFilter`] - vowel-morphing triple band-pass
//!
//! # Time-based
//!
//! - [`MultiTapDelay`] - up to 8 taps over one mono ring with a damped
//!   feedback path
//! - [`Reverb`] - Schroeder-Moorer (8 combs + 4 allpasses per channel)
//! - [`Chorus`] - up to 8 LFO-modulated voices fanned across the field
//! - [`Phaser`] - up to 12 swept allpass stages with global feedback
//!
//! # Dynamics & mangling
//!
//! - [`Compressor`] - soft-knee feed-forward compressor
//! - [`Distortion`] - eight waveshapers with a tone filter
//! - [`Bitcrusher`] - sample-rate and bit-depth reduction
//!
//! # External nodes
//!
//! [`ExternalProcessor`] is the abstract contract a plugin host can
//! satisfy; the chain treats such nodes identically to built-in slots.

pub mod bitcrusher;
pub mod chain;
pub mod chorus;
pub mod compressor;
pub mod delay;
pub mod distortion;
pub mod external;
pub mod filter;
pub mod formant;
pub mod ladder;
pub mod phaser;
pub mod reverb;

pub use bitcrusher::Bitcrusher;
pub use chain::{ChainFull, EffectChain, EffectKind, EffectSlot, MAX_CHAIN_SLOTS};
pub use chorus::Chorus;
pub use compressor::{Compressor, DetectorMode};
pub use delay::MultiTapDelay;
pub use distortion::{Distortion, ShaperType};
pub use external::{ExternalNode, ExternalProcessor, MidiEvent};
pub use filter::FilterEffect;
pub use formant::FormantFilter;
pub use ladder::LadderFilter;
pub use phaser::Phaser;
pub use reverb::Reverb;
