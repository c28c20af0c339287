//! Engine error types.
//!
//! Errors only surface at the control-thread API boundary; the audio
//! callback never fails a block. Resource-exhaustion errors leave the
//! engine unchanged — no partial mutation.

use thiserror::Error;

/// Errors returned by control-side engine operations.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum EngineError {
    /// The track list is at capacity.
    #[error("track limit reached ({0} tracks)")]
    TrackLimitReached(usize),

    /// A track index did not refer to an existing track.
    #[error("invalid track index {0}")]
    InvalidTrack(usize),

    /// The addressed effect chain has no free slot.
    #[error("effect chain is full")]
    ChainFull,

    /// An effect slot index did not refer to an existing slot.
    #[error("invalid effect slot {0}")]
    InvalidSlot(usize),

    /// The pattern is at its note capacity.
    #[error("pattern is full ({0} notes)")]
    PatternFull(usize),
}
