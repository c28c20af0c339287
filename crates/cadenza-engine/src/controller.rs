//! Control-thread handle to a running engine.
//!
//! The [`EngineController`] is the remote control the UI holds while the
//! [`Engine`](crate::Engine) lives inside the audio callback. Everything
//! here is safe to call from a non-realtime thread: single-word
//! parameters land in atomics, events go through SPSC rings, and
//! structural edits are built here (allocations included) and handed to
//! the audio thread fully constructed.

use std::sync::Arc;

use arc_swap::Guard;
use ringbuf::{HeapConsumer, HeapProducer};

use crate::pattern::Pattern;
use crate::shared::{
    EngineCommand, NoteEvent, ParamEvent, ParamTarget, SharedState, TrackDescriptor, MASTER_TRACK,
    MAX_TRACKS, STATE_PAUSED, STATE_PLAYING, STATE_STOPPED,
};
use crate::track::{Track, VoiceParam};
use cadenza_effects::EffectSlot;

/// Remote control for an engine running on the audio thread.
///
/// # Example
///
/// ```rust
/// use cadenza_engine::{Engine, EngineConfig};
///
/// let (mut engine, controller) = Engine::new(EngineConfig::default());
/// controller.add_track("lead");
/// controller.play();
///
/// // ...the audio thread calls engine.process_block(...)
/// # let mut l = [0.0f32; 64];
/// # let mut r = [0.0f32; 64];
/// # engine.process_block(&mut l, &mut r);
/// ```
pub struct EngineController {
    shared: Arc<SharedState>,
    notes: HeapProducer<NoteEvent>,
    params: HeapProducer<ParamEvent>,
    tap: HeapConsumer<(f32, f32)>,
    sample_rate: f32,
}

impl EngineController {
    pub(crate) fn new(
        shared: Arc<SharedState>,
        notes: HeapProducer<NoteEvent>,
        params: HeapProducer<ParamEvent>,
        tap: HeapConsumer<(f32, f32)>,
        sample_rate: f32,
    ) -> Self {
        Self {
            shared,
            notes,
            params,
            tap,
            sample_rate,
        }
    }

    // ── Transport ───────────────────────────────────────────────────────

    /// Start playback.
    pub fn play(&self) {
        self.shared.set_transport_state(STATE_PLAYING);
    }

    /// Pause playback, holding the position.
    pub fn pause(&self) {
        self.shared.set_transport_state(STATE_PAUSED);
    }

    /// Stop playback and rewind.
    pub fn stop(&self) {
        self.shared.set_transport_state(STATE_STOPPED);
    }

    /// Set the tempo (clamped to [20, 400] bpm).
    pub fn set_bpm(&self, bpm: f32) {
        self.shared.set_bpm(bpm);
    }

    /// Set the master gain.
    pub fn set_master_gain(&self, gain: f32) {
        self.shared.set_master_gain(gain);
    }

    /// Configure the loop region in beats.
    pub fn set_loop(&self, start: f32, end: f32, enabled: bool) {
        self.shared.set_loop(start, end, enabled);
    }

    /// Last published (beat, sample) position.
    pub fn position(&self) -> (f32, u64) {
        self.shared.position()
    }

    // ── Faders ──────────────────────────────────────────────────────────

    /// Set a track's gain, clamped to [0, 2].
    pub fn set_track_gain(&self, track: usize, gain: f32) {
        self.shared.set_track_fader(track, Some(gain), None);
    }

    /// Set a track's pan, clamped to [-1, 1].
    pub fn set_track_pan(&self, track: usize, pan: f32) {
        self.shared.set_track_fader(track, None, Some(pan));
    }

    /// Mute or unmute a track.
    pub fn set_track_mute(&self, track: usize, mute: bool) {
        if track < MAX_TRACKS {
            self.shared.track_mute[track].store(mute, std::sync::atomic::Ordering::Release);
        }
    }

    /// Solo or unsolo a track.
    pub fn set_track_solo(&self, track: usize, solo: bool) {
        if track < MAX_TRACKS {
            self.shared.track_solo[track].store(solo, std::sync::atomic::Ordering::Release);
        }
    }

    // ── Events ──────────────────────────────────────────────────────────

    /// Queue a note-on at the start of the next block. Returns `false`
    /// when the event ring is full (the event is dropped, not queued).
    pub fn note_on(&mut self, track: usize, note: u8, velocity: f32) -> bool {
        self.note_on_at(track, note, velocity, 0)
    }

    /// Queue a note-on at a frame offset into the next block.
    pub fn note_on_at(&mut self, track: usize, note: u8, velocity: f32, frame_offset: u32) -> bool {
        self.notes
            .push(NoteEvent {
                track: track as u32,
                note: note.min(127),
                velocity: velocity.clamp(0.0, 1.0),
                frame_offset,
                on: true,
            })
            .is_ok()
    }

    /// Queue a note-off.
    pub fn note_off(&mut self, track: usize) -> bool {
        self.notes
            .push(NoteEvent {
                track: track as u32,
                note: 0,
                velocity: 0.0,
                frame_offset: 0,
                on: false,
            })
            .is_ok()
    }

    /// Queue a voice parameter write.
    pub fn set_voice_param(&mut self, track: usize, param: VoiceParam, value: f32) -> bool {
        self.params
            .push(ParamEvent {
                track: track as u32,
                target: ParamTarget::Voice(param),
                value,
            })
            .is_ok()
    }

    /// Queue an effect parameter write (`track = None` addresses the
    /// master chain; index 0 is the slot mix).
    pub fn set_effect_param(
        &mut self,
        track: Option<usize>,
        slot: u8,
        index: u8,
        value: f32,
    ) -> bool {
        self.params
            .push(ParamEvent {
                track: track.map_or(MASTER_TRACK, |t| t as u32),
                target: ParamTarget::Effect { slot, index },
                value,
            })
            .is_ok()
    }

    /// Queue a bypass toggle for an effect slot.
    pub fn set_effect_bypass(&mut self, track: Option<usize>, slot: u8, bypass: bool) -> bool {
        self.params
            .push(ParamEvent {
                track: track.map_or(MASTER_TRACK, |t| t as u32),
                target: ParamTarget::EffectBypass { slot },
                value: if bypass { 1.0 } else { 0.0 },
            })
            .is_ok()
    }

    // ── Structural edits ────────────────────────────────────────────────

    /// Build and queue a new default track. Applied by the audio thread
    /// between blocks; watch [`descriptors`](Self::descriptors) for the
    /// result.
    pub fn add_track(&self, name: &str) {
        let track = Box::new(Track::new(name, self.sample_rate));
        self.push_command(EngineCommand::AddTrack(track));
    }

    /// Queue a pre-built track.
    pub fn add_track_boxed(&self, track: Box<Track>) {
        self.push_command(EngineCommand::AddTrack(track));
    }

    /// Queue removal of a track.
    pub fn remove_track(&self, track: usize) {
        self.push_command(EngineCommand::RemoveTrack(track));
    }

    /// Queue an effect append on a track (or the master chain).
    pub fn push_effect(&self, track: Option<usize>, slot: EffectSlot) {
        self.push_command(EngineCommand::PushEffect {
            track: track.map_or(MASTER_TRACK, |t| t as u32),
            slot: Box::new(slot),
        });
    }

    /// Queue an effect removal.
    pub fn remove_effect(&self, track: Option<usize>, slot: usize) {
        self.push_command(EngineCommand::RemoveEffect {
            track: track.map_or(MASTER_TRACK, |t| t as u32),
            slot,
        });
    }

    /// Queue an effect reorder within a chain.
    pub fn reorder_effect(&self, track: Option<usize>, from: usize, to: usize) {
        self.push_command(EngineCommand::ReorderEffect {
            track: track.map_or(MASTER_TRACK, |t| t as u32),
            from,
            to,
        });
    }

    /// Queue a pattern swap on a track (`None` clears).
    pub fn set_pattern(&self, track: usize, pattern: Option<Pattern>) {
        self.push_command(EngineCommand::SetPattern {
            track,
            pattern: pattern.map(Box::new),
        });
    }

    /// Queue a raw command.
    pub fn push_command(&self, command: EngineCommand) {
        self.shared.commands.lock().push_back(command);
    }

    // ── Read-back ───────────────────────────────────────────────────────

    /// Wait-free snapshot of the track list.
    pub fn descriptors(&self) -> Guard<Arc<Vec<TrackDescriptor>>> {
        self.shared.descriptors.load()
    }

    /// A track's last published post-chain peak.
    pub fn track_peak(&self, track: usize) -> f32 {
        self.shared.track_peak(track)
    }

    /// Master ((peak_l, peak_r), (rms_l, rms_r)).
    pub fn master_levels(&self) -> ((f32, f32), (f32, f32)) {
        self.shared.master_levels()
    }

    /// Drop every object the audio thread has handed back for
    /// reclamation. Returns how many were dropped. Call periodically
    /// from the control thread.
    pub fn collect_garbage(&self) -> usize {
        let mut queue = self.shared.reclaim.lock();
        let count = queue.len();
        queue.clear();
        count
    }

    /// Drain the stereo analysis tap, feeding each (left, right) pair to
    /// `consume`. The audio thread drops samples when the tap backs up;
    /// visual analyzers tolerate the gap.
    pub fn drain_tap(&mut self, mut consume: impl FnMut(f32, f32)) {
        while let Some((l, r)) = self.tap.pop() {
            consume(l, r);
        }
    }

    /// Engine sample rate.
    pub fn sample_rate(&self) -> f32 {
        self.sample_rate
    }
}
