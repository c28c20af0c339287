//! Cadenza Engine - the mixing core of the workstation
//!
//! Ties the crates below it into one realtime instrument: a
//! fixed-capacity track list (each track a [`Voice`](cadenza_synth::Voice)
//! plus an [`EffectChain`](cadenza_effects::EffectChain)), a master
//! chain, a sample-accurate [`Transport`](transport::Transport), pattern
//! scheduling, and the visualization analyzers — all driven by a single
//! `process_block` call from the host's audio callback.
//!
//! # Architecture
//!
//! Construction yields a pair: the [`Engine`] (moved into the audio
//! callback) and an [`EngineController`] (kept by the UI). The two share
//! only lock-free state — atomics for single-word parameters, SPSC
//! rings for events, and a try-lock command queue for structural edits
//! whose displaced objects are reclaimed on the control thread.
//!
//! ```text
//! transport → tracks (voice → chain) → pan mix → master chain
//!          → soft clip → analyzers → host buffers
//! ```
//!
//! # Example
//!
//! ```rust
//! use cadenza_engine::{Engine, EngineConfig};
//! use cadenza_engine::pattern::{Pattern, PatternNote};
//!
//! let (mut engine, _controller) = Engine::new(EngineConfig::default());
//! let track = engine.add_track("lead").unwrap();
//!
//! let mut pattern = Pattern::new(4.0);
//! pattern.add(PatternNote::new(69, 1.0, 0.0, 1.0)).unwrap();
//! engine.set_pattern(track, Some(pattern)).unwrap();
//! engine.play();
//!
//! let mut left = [0.0f32; 512];
//! let mut right = [0.0f32; 512];
//! engine.process_block(&mut left, &mut right);
//! ```

pub mod controller;
pub mod engine;
pub mod error;
pub mod pattern;
pub mod shared;
pub mod track;
pub mod transport;

pub use controller::EngineController;
pub use engine::{Engine, EngineConfig};
pub use error::EngineError;
pub use pattern::{Pattern, PatternNote, MAX_PATTERN_NOTES};
pub use shared::{
    EngineCommand, NoteEvent, ParamEvent, ParamTarget, Reclaimed, TrackDescriptor, MASTER_TRACK,
    MAX_TRACKS,
};
pub use track::{Track, VoiceParam};
pub use transport::{Transport, TransportState};

// The engine hosts external processor nodes through the effect chain.
pub use cadenza_effects::{ExternalNode, ExternalProcessor, MidiEvent};
