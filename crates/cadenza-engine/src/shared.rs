//! Lock-free state shared between the control thread and the audio
//! callback.
//!
//! Exactly two scheduling domains touch this module: the realtime audio
//! thread (which may not allocate, block, or wait unboundedly) and
//! everything else. The bridge keeps the audio side wait-free:
//!
//! - **Single-word parameters** (tempo, master gain, loop region, track
//!   faders, meters) are `f32` values bit-cast into `AtomicU32` cells —
//!   a torn read is impossible, a stale read costs one block.
//! - **Events** (notes, effect/voice parameter writes) travel through
//!   SPSC rings; the audio thread drains them at block start.
//! - **Structural edits** (tracks, chain slots, patterns) are built on
//!   the control thread, carried through a command queue the audio
//!   thread drains with `try_lock`, and the displaced objects ride a
//!   reclaim queue back so their destructors run off the audio thread.
//! - **Analysis** samples flow out through an SPSC tap ring; readers
//!   tolerate drops when they fall behind.

use std::collections::VecDeque;
use std::sync::atomic::{AtomicBool, AtomicU32, AtomicU64, AtomicU8, Ordering};
use std::sync::Arc;

use arc_swap::ArcSwap;
use parking_lot::Mutex;

use crate::pattern::Pattern;
use crate::track::{Track, VoiceParam};
use cadenza_effects::EffectSlot;

/// Maximum number of tracks.
pub const MAX_TRACKS: usize = 64;

/// Sentinel track index addressing the master chain.
pub const MASTER_TRACK: u32 = u32::MAX;

/// Transport state encoding for the shared atomic.
pub(crate) const STATE_STOPPED: u8 = 0;
pub(crate) const STATE_PAUSED: u8 = 1;
pub(crate) const STATE_PLAYING: u8 = 2;

/// A note gate event for the audio thread.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct NoteEvent {
    /// Target track index.
    pub track: u32,
    /// MIDI note (ignored for note-off).
    pub note: u8,
    /// Velocity in [0, 1] (ignored for note-off).
    pub velocity: f32,
    /// Frame offset into the next processed block.
    pub frame_offset: u32,
    /// True for note-on, false for note-off.
    pub on: bool,
}

/// Addressing for a single-word parameter write.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ParamTarget {
    /// A voice parameter on a track.
    Voice(VoiceParam),
    /// An effect parameter: slot index within the chain, parameter
    /// index within the effect (0 = mix).
    Effect {
        /// Chain slot.
        slot: u8,
        /// Parameter index.
        index: u8,
    },
    /// A slot bypass flag (value ≥ 0.5 bypasses).
    EffectBypass {
        /// Chain slot.
        slot: u8,
    },
}

/// One parameter write travelling control → audio.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ParamEvent {
    /// Track index, or [`MASTER_TRACK`] for the master chain.
    pub track: u32,
    /// What to write.
    pub target: ParamTarget,
    /// The value.
    pub value: f32,
}

/// Structural edit built on the control thread, applied by the audio
/// thread between blocks.
pub enum EngineCommand {
    /// Append a fully constructed track.
    AddTrack(Box<Track>),
    /// Remove the track at an index (later indices shift down).
    RemoveTrack(usize),
    /// Append an effect slot to a track chain (or the master chain).
    PushEffect {
        /// Target track, or [`MASTER_TRACK`].
        track: u32,
        /// The slot, built control-side.
        slot: Box<EffectSlot>,
    },
    /// Remove an effect slot.
    RemoveEffect {
        /// Target track, or [`MASTER_TRACK`].
        track: u32,
        /// Slot index.
        slot: usize,
    },
    /// Move a slot within a chain.
    ReorderEffect {
        /// Target track, or [`MASTER_TRACK`].
        track: u32,
        /// Source position.
        from: usize,
        /// Destination position.
        to: usize,
    },
    /// Replace (or clear) a track's pattern.
    SetPattern {
        /// Target track.
        track: usize,
        /// New pattern, or `None` to clear.
        pattern: Option<Box<Pattern>>,
    },
}

/// Displaced objects returned to the control thread for dropping.
pub enum Reclaimed {
    /// A removed track.
    Track(Box<Track>),
    /// A removed effect slot.
    Slot(Box<EffectSlot>),
    /// A replaced pattern.
    Pattern(Box<Pattern>),
}

/// UI-facing snapshot of one track's identity.
#[derive(Debug, Clone)]
pub struct TrackDescriptor {
    /// Track name.
    pub name: String,
    /// Whether the track carries a pattern.
    pub has_pattern: bool,
    /// Number of chain slots.
    pub chain_len: usize,
}

const fn zero_cell() -> AtomicU32 {
    AtomicU32::new(0)
}
const fn false_cell() -> AtomicBool {
    AtomicBool::new(false)
}

#[inline]
fn store_f32(cell: &AtomicU32, value: f32) {
    cell.store(value.to_bits(), Ordering::Release);
}

#[inline]
fn load_f32(cell: &AtomicU32) -> f32 {
    f32::from_bits(cell.load(Ordering::Acquire))
}

/// The atomic heart of the bridge.
pub struct SharedState {
    // Transport snapshot (control writes, audio reads)
    pub(crate) bpm: AtomicU32,
    pub(crate) master_gain: AtomicU32,
    pub(crate) transport_state: AtomicU8,
    pub(crate) loop_enabled: AtomicBool,
    pub(crate) loop_start: AtomicU32,
    pub(crate) loop_end: AtomicU32,

    // Position read-back (audio writes, control reads)
    pub(crate) current_beat: AtomicU32,
    pub(crate) current_sample: AtomicU64,

    // Per-track faders (control writes, audio reads)
    pub(crate) track_gain: [AtomicU32; MAX_TRACKS],
    pub(crate) track_pan: [AtomicU32; MAX_TRACKS],
    pub(crate) track_mute: [AtomicBool; MAX_TRACKS],
    pub(crate) track_solo: [AtomicBool; MAX_TRACKS],

    // Meters (audio writes, control reads)
    pub(crate) track_peak: [AtomicU32; MAX_TRACKS],
    pub(crate) master_peak: [AtomicU32; 2],
    pub(crate) master_rms: [AtomicU32; 2],

    // Topology snapshot for the UI
    pub(crate) descriptors: ArcSwap<Vec<TrackDescriptor>>,

    // Structural hand-off
    pub(crate) commands: Mutex<VecDeque<EngineCommand>>,
    pub(crate) reclaim: Mutex<VecDeque<Reclaimed>>,
}

impl SharedState {
    pub(crate) fn new() -> Arc<Self> {
        let shared = Self {
            bpm: AtomicU32::new(120.0f32.to_bits()),
            master_gain: AtomicU32::new(1.0f32.to_bits()),
            transport_state: AtomicU8::new(STATE_STOPPED),
            loop_enabled: AtomicBool::new(false),
            loop_start: AtomicU32::new(0.0f32.to_bits()),
            loop_end: AtomicU32::new(4.0f32.to_bits()),
            current_beat: AtomicU32::new(0),
            current_sample: AtomicU64::new(0),
            track_gain: core::array::from_fn(|_| AtomicU32::new(1.0f32.to_bits())),
            track_pan: core::array::from_fn(|_| zero_cell()),
            track_mute: core::array::from_fn(|_| false_cell()),
            track_solo: core::array::from_fn(|_| false_cell()),
            track_peak: core::array::from_fn(|_| zero_cell()),
            master_peak: core::array::from_fn(|_| zero_cell()),
            master_rms: core::array::from_fn(|_| zero_cell()),
            descriptors: ArcSwap::from_pointee(Vec::new()),
            commands: Mutex::new(VecDeque::new()),
            reclaim: Mutex::new(VecDeque::new()),
        };
        Arc::new(shared)
    }

    // ── Control-side writes ─────────────────────────────────────────────

    pub(crate) fn set_bpm(&self, bpm: f32) {
        store_f32(&self.bpm, bpm.clamp(20.0, 400.0));
    }

    pub(crate) fn set_master_gain(&self, gain: f32) {
        store_f32(&self.master_gain, gain.max(0.0));
    }

    pub(crate) fn set_transport_state(&self, state: u8) {
        self.transport_state.store(state, Ordering::Release);
    }

    pub(crate) fn set_loop(&self, start: f32, end: f32, enabled: bool) {
        store_f32(&self.loop_start, start);
        store_f32(&self.loop_end, end);
        self.loop_enabled.store(enabled, Ordering::Release);
    }

    pub(crate) fn set_track_fader(&self, index: usize, gain: Option<f32>, pan: Option<f32>) {
        if index >= MAX_TRACKS {
            return;
        }
        if let Some(g) = gain {
            store_f32(&self.track_gain[index], g.clamp(0.0, 2.0));
        }
        if let Some(p) = pan {
            store_f32(&self.track_pan[index], p.clamp(-1.0, 1.0));
        }
    }

    // ── Audio-side reads ────────────────────────────────────────────────

    pub(crate) fn bpm(&self) -> f32 {
        load_f32(&self.bpm)
    }

    pub(crate) fn master_gain(&self) -> f32 {
        load_f32(&self.master_gain)
    }

    pub(crate) fn state(&self) -> u8 {
        self.transport_state.load(Ordering::Acquire)
    }

    pub(crate) fn loop_params(&self) -> (f32, f32, bool) {
        (
            load_f32(&self.loop_start),
            load_f32(&self.loop_end),
            self.loop_enabled.load(Ordering::Acquire),
        )
    }

    pub(crate) fn track_gain(&self, index: usize) -> f32 {
        load_f32(&self.track_gain[index])
    }

    pub(crate) fn track_pan(&self, index: usize) -> f32 {
        load_f32(&self.track_pan[index])
    }

    pub(crate) fn track_mute(&self, index: usize) -> bool {
        self.track_mute[index].load(Ordering::Acquire)
    }

    pub(crate) fn track_solo(&self, index: usize) -> bool {
        self.track_solo[index].load(Ordering::Acquire)
    }

    // ── Audio-side publishes ────────────────────────────────────────────

    pub(crate) fn publish_position(&self, beat: f64, sample: u64) {
        store_f32(&self.current_beat, beat as f32);
        self.current_sample.store(sample, Ordering::Release);
    }

    pub(crate) fn publish_track_peak(&self, index: usize, peak: f32) {
        if index < MAX_TRACKS {
            store_f32(&self.track_peak[index], peak);
        }
    }

    pub(crate) fn publish_master_levels(&self, peak: (f32, f32), rms: (f32, f32)) {
        store_f32(&self.master_peak[0], peak.0);
        store_f32(&self.master_peak[1], peak.1);
        store_f32(&self.master_rms[0], rms.0);
        store_f32(&self.master_rms[1], rms.1);
    }

    pub(crate) fn publish_descriptors(&self, descriptors: Vec<TrackDescriptor>) {
        self.descriptors.store(Arc::new(descriptors));
    }

    // ── Control-side reads ──────────────────────────────────────────────

    pub(crate) fn position(&self) -> (f32, u64) {
        (
            load_f32(&self.current_beat),
            self.current_sample.load(Ordering::Acquire),
        )
    }

    pub(crate) fn track_peak(&self, index: usize) -> f32 {
        if index < MAX_TRACKS {
            load_f32(&self.track_peak[index])
        } else {
            0.0
        }
    }

    pub(crate) fn master_levels(&self) -> ((f32, f32), (f32, f32)) {
        (
            (load_f32(&self.master_peak[0]), load_f32(&self.master_peak[1])),
            (load_f32(&self.master_rms[0]), load_f32(&self.master_rms[1])),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn f32_cells_round_trip_exactly() {
        let shared = SharedState::new();
        shared.set_bpm(133.7);
        assert_eq!(shared.bpm(), 133.7);
        shared.set_master_gain(0.12345);
        assert_eq!(shared.master_gain(), 0.12345);
    }

    #[test]
    fn bpm_is_clamped_at_the_boundary() {
        let shared = SharedState::new();
        shared.set_bpm(9999.0);
        assert_eq!(shared.bpm(), 400.0);
        shared.set_bpm(0.0);
        assert_eq!(shared.bpm(), 20.0);
    }

    #[test]
    fn fader_writes_are_bounded() {
        let shared = SharedState::new();
        shared.set_track_fader(3, Some(5.0), Some(-9.0));
        assert_eq!(shared.track_gain(3), 2.0);
        assert_eq!(shared.track_pan(3), -1.0);
        // Out-of-range track index is a no-op, not a panic.
        shared.set_track_fader(MAX_TRACKS + 5, Some(1.0), None);
    }

    #[test]
    fn loop_params_round_trip() {
        let shared = SharedState::new();
        shared.set_loop(1.5, 9.5, true);
        assert_eq!(shared.loop_params(), (1.5, 9.5, true));
    }

    #[test]
    fn descriptors_swap_atomically() {
        let shared = SharedState::new();
        shared.publish_descriptors(vec![TrackDescriptor {
            name: "drums".into(),
            has_pattern: true,
            chain_len: 2,
        }]);
        let snapshot = shared.descriptors.load();
        assert_eq!(snapshot.len(), 1);
        assert_eq!(snapshot[0].name, "drums");
    }
}
