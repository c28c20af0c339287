//! The mixing engine.
//!
//! One `process_block` call renders one audio-callback invocation:
//! drain control traffic, gate voices from pattern and event material,
//! run every audible track through its chain, mix with equal-gain
//! panning, run the master chain, soft-clip, feed the analyzers, and
//! advance the transport. Work per block is bounded by
//! frames × tracks × chain slots; nothing in here allocates or blocks.

use std::sync::Arc;

use ringbuf::{HeapConsumer, HeapProducer, HeapRb};

use cadenza_analysis::{LevelMeter, SpectrumAnalyzer, WaveformScope};
use cadenza_core::soft_clip;
use cadenza_effects::{EffectChain, EffectSlot};

use crate::controller::EngineController;
use crate::error::EngineError;
use crate::pattern::Pattern;
use crate::shared::{
    EngineCommand, NoteEvent, ParamEvent, ParamTarget, Reclaimed, SharedState, TrackDescriptor,
    MASTER_TRACK, MAX_TRACKS, STATE_PAUSED, STATE_PLAYING, STATE_STOPPED,
};
use crate::track::{apply_voice_param, Track};
use crate::transport::{Transport, TransportState};

/// Engine construction parameters.
#[derive(Debug, Clone, Copy)]
pub struct EngineConfig {
    /// Fixed sample rate for the engine's lifetime.
    pub sample_rate: f32,
    /// Largest block the host will request in one chunk.
    pub max_block: usize,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            sample_rate: 48000.0,
            max_block: 512,
        }
    }
}

/// Capacity of the note and parameter event rings.
const EVENT_RING_CAPACITY: usize = 1024;

/// Capacity of the stereo analysis tap ring (frames).
const TAP_RING_CAPACITY: usize = 16384;

/// Most gate events applied within one block; overflow is dropped.
const MAX_BLOCK_EVENTS: usize = 512;

/// The audio-side engine.
///
/// Owns the track list, the master chain, the transport, the analyzers,
/// and the consuming ends of the control bridge. Structural methods on
/// the engine itself are for single-threaded hosts and tests; a
/// threaded host keeps the [`EngineController`] and moves the engine
/// into the audio callback.
pub struct Engine {
    sample_rate: f32,
    max_block: usize,
    tracks: Vec<Box<Track>>,
    master_chain: EffectChain,
    transport: Transport,

    shared: Arc<SharedState>,
    notes_rx: HeapConsumer<NoteEvent>,
    params_rx: HeapConsumer<ParamEvent>,
    tap_tx: HeapProducer<(f32, f32)>,

    // Preallocated scratch; the callback never allocates.
    track_l: Vec<f32>,
    track_r: Vec<f32>,
    mono: Vec<f32>,
    inter_l: Vec<f32>,
    inter_r: Vec<f32>,
    pending_events: Vec<NoteEvent>,
    track_events: Vec<(u32, bool, u8, f32)>,
    pending_reclaim: Vec<Reclaimed>,

    scope: WaveformScope,
    spectrum: SpectrumAnalyzer,
    meter: LevelMeter,
}

impl Engine {
    /// Create an engine and its control-thread handle.
    pub fn new(config: EngineConfig) -> (Self, EngineController) {
        let shared = SharedState::new();

        let (notes_tx, notes_rx) = HeapRb::<NoteEvent>::new(EVENT_RING_CAPACITY).split();
        let (params_tx, params_rx) = HeapRb::<ParamEvent>::new(EVENT_RING_CAPACITY).split();
        let (tap_tx, tap_rx) = HeapRb::<(f32, f32)>::new(TAP_RING_CAPACITY).split();

        let controller = EngineController::new(
            Arc::clone(&shared),
            notes_tx,
            params_tx,
            tap_rx,
            config.sample_rate,
        );

        let engine = Self {
            sample_rate: config.sample_rate,
            max_block: config.max_block.max(1),
            tracks: Vec::with_capacity(MAX_TRACKS),
            master_chain: EffectChain::new(config.sample_rate),
            transport: Transport::new(config.sample_rate),
            shared,
            notes_rx,
            params_rx,
            tap_tx,
            track_l: vec![0.0; config.max_block.max(1)],
            track_r: vec![0.0; config.max_block.max(1)],
            mono: vec![0.0; config.max_block.max(1)],
            inter_l: vec![0.0; config.max_block.max(1)],
            inter_r: vec![0.0; config.max_block.max(1)],
            pending_events: Vec::with_capacity(MAX_BLOCK_EVENTS),
            track_events: Vec::with_capacity(MAX_BLOCK_EVENTS),
            pending_reclaim: Vec::with_capacity(32),
            scope: WaveformScope::new(),
            spectrum: SpectrumAnalyzer::new(config.sample_rate),
            meter: LevelMeter::new(config.sample_rate),
        };

        (engine, controller)
    }

    /// Engine sample rate.
    pub fn sample_rate(&self) -> f32 {
        self.sample_rate
    }

    /// Number of tracks.
    pub fn num_tracks(&self) -> usize {
        self.tracks.len()
    }

    // ── Direct control (single-threaded hosts and tests) ───────────────

    /// Append a default track. Fails without mutation at the track
    /// limit.
    pub fn add_track(&mut self, name: &str) -> Result<usize, EngineError> {
        self.add_track_boxed(Box::new(Track::new(name, self.sample_rate)))
            .map_err(|_| EngineError::TrackLimitReached(MAX_TRACKS))
    }

    /// Insert a prebuilt track; on failure the box is returned so the
    /// caller decides where it gets dropped.
    fn add_track_boxed(&mut self, track: Box<Track>) -> Result<usize, Box<Track>> {
        if self.tracks.len() >= MAX_TRACKS {
            return Err(track);
        }
        let index = self.tracks.len();
        // Seed the fader cells from the incoming track so the first
        // block doesn't snap the levels.
        self.shared
            .set_track_fader(index, Some(track.gain()), Some(track.pan()));
        self.shared.track_mute[index].store(track.mute, std::sync::atomic::Ordering::Release);
        self.shared.track_solo[index].store(track.solo, std::sync::atomic::Ordering::Release);
        self.tracks.push(track);
        self.publish_descriptors();
        Ok(index)
    }

    /// Remove a track, dropping it in place (single-threaded use).
    pub fn remove_track(&mut self, index: usize) -> Result<(), EngineError> {
        self.take_track(index).map(|_| ())
    }

    /// Detach a track, shifting the fader cells down to match the
    /// compacted indices.
    fn take_track(&mut self, index: usize) -> Result<Box<Track>, EngineError> {
        if index >= self.tracks.len() {
            return Err(EngineError::InvalidTrack(index));
        }
        let removed = self.tracks.remove(index);

        for i in index..self.tracks.len() {
            let gain = self.shared.track_gain(i + 1);
            let pan = self.shared.track_pan(i + 1);
            self.shared.set_track_fader(i, Some(gain), Some(pan));
            self.shared.track_mute[i].store(
                self.shared.track_mute(i + 1),
                std::sync::atomic::Ordering::Release,
            );
            self.shared.track_solo[i].store(
                self.shared.track_solo(i + 1),
                std::sync::atomic::Ordering::Release,
            );
        }
        let top = self.tracks.len();
        self.shared.set_track_fader(top, Some(1.0), Some(0.0));
        self.shared.track_mute[top].store(false, std::sync::atomic::Ordering::Release);
        self.shared.track_solo[top].store(false, std::sync::atomic::Ordering::Release);

        self.publish_descriptors();
        Ok(removed)
    }

    /// Borrow a track.
    pub fn track(&self, index: usize) -> Option<&Track> {
        self.tracks.get(index).map(|t| t.as_ref())
    }

    /// Mutably borrow a track.
    pub fn track_mut(&mut self, index: usize) -> Option<&mut Track> {
        self.tracks.get_mut(index).map(|t| t.as_mut())
    }

    /// Borrow the master chain.
    pub fn master_chain_mut(&mut self) -> &mut EffectChain {
        &mut self.master_chain
    }

    /// Append an effect to a track chain (`None` = master). Fails
    /// without mutation when the chain is full.
    pub fn push_effect(
        &mut self,
        track: Option<usize>,
        slot: EffectSlot,
    ) -> Result<usize, EngineError> {
        let chain = match track {
            None => &mut self.master_chain,
            Some(i) => {
                if i >= self.tracks.len() {
                    return Err(EngineError::InvalidTrack(i));
                }
                &mut self.tracks[i].chain
            }
        };
        let index = chain.push(slot).map_err(|_| EngineError::ChainFull)?;
        self.publish_descriptors();
        Ok(index)
    }

    /// Replace a track's pattern.
    pub fn set_pattern(
        &mut self,
        track: usize,
        pattern: Option<Pattern>,
    ) -> Result<(), EngineError> {
        let slot = self
            .tracks
            .get_mut(track)
            .ok_or(EngineError::InvalidTrack(track))?;
        slot.pattern = pattern;
        slot.note_off_in = None;
        self.publish_descriptors();
        Ok(())
    }

    /// Gate a note on immediately (applies at the next block start).
    pub fn note_on(&mut self, track: usize, note: u8, velocity: f32) -> Result<(), EngineError> {
        let slot = self
            .tracks
            .get_mut(track)
            .ok_or(EngineError::InvalidTrack(track))?;
        slot.voice.note_on(note, velocity);
        Ok(())
    }

    /// Gate a note off immediately.
    pub fn note_off(&mut self, track: usize) -> Result<(), EngineError> {
        let slot = self
            .tracks
            .get_mut(track)
            .ok_or(EngineError::InvalidTrack(track))?;
        slot.voice.note_off();
        Ok(())
    }

    /// Start playback.
    pub fn play(&self) {
        self.shared.set_transport_state(STATE_PLAYING);
    }

    /// Pause playback.
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

    /// Set a track's gain.
    pub fn set_track_gain(&self, track: usize, gain: f32) {
        self.shared.set_track_fader(track, Some(gain), None);
    }

    /// Set a track's pan.
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

    /// The transport (read-only; mutate through the control methods).
    pub fn transport(&self) -> &Transport {
        &self.transport
    }

    /// The waveform scope fed from the mixed output.
    pub fn scope(&self) -> &WaveformScope {
        &self.scope
    }

    /// The spectrum analyzer fed from the mixed output.
    pub fn spectrum_mut(&mut self) -> &mut SpectrumAnalyzer {
        &mut self.spectrum
    }

    /// The master level meter.
    pub fn meter(&self) -> &LevelMeter {
        &self.meter
    }

    fn publish_descriptors(&self) {
        let descriptors: Vec<TrackDescriptor> = self
            .tracks
            .iter()
            .map(|t| TrackDescriptor {
                name: t.name.clone(),
                has_pattern: t.pattern.is_some(),
                chain_len: t.chain.len(),
            })
            .collect();
        self.shared.publish_descriptors(descriptors);
    }

    // ── Audio callback ──────────────────────────────────────────────────

    /// Render one host callback into separate left/right buffers.
    ///
    /// Buffers longer than the configured maximum block are processed in
    /// max-block chunks. Output is guaranteed to be in [-1, 1].
    pub fn process_block(&mut self, out_l: &mut [f32], out_r: &mut [f32]) {
        debug_assert_eq!(out_l.len(), out_r.len());
        let total = out_l.len().min(out_r.len());

        let mut offset = 0;
        while offset < total {
            let frames = (total - offset).min(self.max_block);
            self.process_chunk(offset, out_l, out_r, frames);
            offset += frames;
        }
    }

    /// Render one host callback into an interleaved stereo buffer.
    pub fn process_interleaved(&mut self, out: &mut [f32]) {
        let frames_total = out.len() / 2;
        let mut offset = 0;
        while offset < frames_total {
            let frames = (frames_total - offset).min(self.max_block);

            // Render into scratch, then interleave.
            let mut l = std::mem::take(&mut self.inter_l);
            let mut r = std::mem::take(&mut self.inter_r);
            self.process_chunk(0, &mut l[..frames], &mut r[..frames], frames);

            for i in 0..frames {
                out[(offset + i) * 2] = l[i];
                out[(offset + i) * 2 + 1] = r[i];
            }
            self.inter_l = l;
            self.inter_r = r;

            offset += frames;
        }
    }

    /// Render `frames` samples starting at `offset` in the output
    /// buffers. `frames` never exceeds `max_block`.
    fn process_chunk(&mut self, offset: usize, out_l: &mut [f32], out_r: &mut [f32], frames: usize) {
        let out_l = &mut out_l[offset..offset + frames];
        let out_r = &mut out_r[offset..offset + frames];

        // 1. Control traffic: structure, parameters, events, transport.
        self.apply_commands();
        self.apply_param_events();
        self.sync_transport();
        self.sync_faders();
        self.collect_note_events(frames);

        // 2. Zero the mix.
        out_l.fill(0.0);
        out_r.fill(0.0);

        let playing = self.transport.is_playing();

        if playing {
            self.schedule_patterns(frames);
        }

        // 3. Per-track render and accumulate.
        let any_solo = self.tracks.iter().any(|t| t.solo);

        for i in 0..self.tracks.len() {
            self.track_events.clear();
            for ev in &self.pending_events {
                if ev.track == i as u32 {
                    self.track_events
                        .push((ev.frame_offset, ev.on, ev.note, ev.velocity));
                }
            }
            self.track_events.sort_unstable_by_key(|e| e.0);

            let track = &mut self.tracks[i];
            let audible = playing && !track.mute && (!any_solo || track.solo);

            if !audible {
                // Gate changes still land so voices stay consistent.
                for &(_, on, note, velocity) in &self.track_events {
                    if on {
                        track.voice.note_on(note, velocity);
                    } else {
                        track.voice.note_off();
                    }
                }
                track.peak = 0.0;
                self.shared.publish_track_peak(i, 0.0);
                continue;
            }

            let tl = &mut self.track_l[..frames];
            let tr = &mut self.track_r[..frames];

            let mut next_event = 0;
            for (f, sample) in tl.iter_mut().enumerate() {
                while next_event < self.track_events.len()
                    && self.track_events[next_event].0 as usize <= f
                {
                    let (_, on, note, velocity) = self.track_events[next_event];
                    if on {
                        track.voice.note_on(note, velocity);
                    } else {
                        track.voice.note_off();
                    }
                    next_event += 1;
                }
                *sample = track.voice.process();
            }

            // Mono → stereo promotion, then the insert chain in place.
            tr.copy_from_slice(tl);
            track.chain.process_block(tl, tr);

            // Equal-gain pan split into the mix.
            let gain = track.gain();
            let pan = track.pan();
            let gain_l = gain * (1.0 - pan.max(0.0));
            let gain_r = gain * (1.0 + pan.min(0.0));

            let mut peak = 0.0f32;
            for f in 0..frames {
                let l = tl[f] * gain_l;
                let r = tr[f] * gain_r;
                out_l[f] += l;
                out_r[f] += r;
                peak = peak.max(l.abs().max(r.abs()));
            }
            track.peak = peak;
            self.shared.publish_track_peak(i, peak);
        }

        // 4. Master chain (runs even when stopped so tails decay).
        self.master_chain.process_block(out_l, out_r);

        // 5. Master gain, NaN guard, soft clip.
        let master_gain = self.shared.master_gain();
        for f in 0..frames {
            let mut l = out_l[f] * master_gain;
            let mut r = out_r[f] * master_gain;
            if l.is_nan() {
                l = 0.0;
            }
            if r.is_nan() {
                r = 0.0;
            }
            out_l[f] = soft_clip(l);
            out_r[f] = soft_clip(r);
        }

        // 6. Advance the transport (block-granular loop wrap).
        self.transport.advance(frames);
        self.shared
            .publish_position(self.transport.beat(), self.transport.sample());

        // 7. Feed the analyzers and the control-side tap.
        self.scope.write(out_l, out_r);
        let mono = &mut self.mono[..frames];
        for f in 0..frames {
            mono[f] = (out_l[f] + out_r[f]) * 0.5;
        }
        self.spectrum.write(mono);
        self.meter.analyze(out_l, out_r);
        self.shared.publish_master_levels(
            (self.meter.peak_left(), self.meter.peak_right()),
            (self.meter.rms_left(), self.meter.rms_right()),
        );
        for f in 0..frames {
            // Drop samples when the UI falls behind; the tap tolerates
            // gaps.
            if self.tap_tx.push((out_l[f], out_r[f])).is_err() {
                break;
            }
        }

        self.pending_events.clear();
    }

    /// Drain and apply structural commands without blocking.
    fn apply_commands(&mut self) {
        // Flush any reclaim stash from earlier blocks first.
        if !self.pending_reclaim.is_empty() {
            let shared = Arc::clone(&self.shared);
            if let Some(mut reclaim) = shared.reclaim.try_lock() {
                for item in self.pending_reclaim.drain(..) {
                    reclaim.push_back(item);
                }
            };
        }

        let shared = Arc::clone(&self.shared);
        let Some(mut commands) = shared.commands.try_lock() else {
            return;
        };

        while let Some(command) = commands.pop_front() {
            match command {
                EngineCommand::AddTrack(track) => {
                    if let Err(rejected) = self.add_track_boxed(track) {
                        self.reclaim(Reclaimed::Track(rejected));
                    }
                }
                EngineCommand::RemoveTrack(index) => {
                    if let Ok(track) = self.take_track(index) {
                        self.reclaim(Reclaimed::Track(track));
                    }
                }
                EngineCommand::PushEffect { track, slot } => {
                    let has_room = if track == MASTER_TRACK {
                        self.master_chain.len() < cadenza_effects::MAX_CHAIN_SLOTS
                    } else {
                        self.tracks
                            .get(track as usize)
                            .is_some_and(|t| t.chain.len() < cadenza_effects::MAX_CHAIN_SLOTS)
                    };
                    if has_room {
                        if let Some(chain) = self.resolve_chain(track) {
                            let _ = chain.push(*slot);
                        }
                        self.publish_descriptors();
                    } else {
                        self.reclaim(Reclaimed::Slot(slot));
                    }
                }
                EngineCommand::RemoveEffect { track, slot } => {
                    let removed = self
                        .resolve_chain(track)
                        .and_then(|chain| chain.remove(slot));
                    if let Some(removed) = removed {
                        self.reclaim(Reclaimed::Slot(Box::new(removed)));
                        self.publish_descriptors();
                    }
                }
                EngineCommand::ReorderEffect { track, from, to } => {
                    if let Some(chain) = self.resolve_chain(track) {
                        chain.reorder(from, to);
                    }
                }
                EngineCommand::SetPattern { track, pattern } => {
                    let mut displaced = None;
                    if let Some(slot) = self.tracks.get_mut(track) {
                        displaced = slot.pattern.take();
                        slot.pattern = pattern.map(|p| *p);
                        slot.note_off_in = None;
                    }
                    if let Some(old) = displaced {
                        self.reclaim(Reclaimed::Pattern(Box::new(old)));
                    }
                    self.publish_descriptors();
                }
            }
        }
    }

    fn resolve_chain(&mut self, track: u32) -> Option<&mut EffectChain> {
        if track == MASTER_TRACK {
            Some(&mut self.master_chain)
        } else {
            self.tracks.get_mut(track as usize).map(|t| &mut t.chain)
        }
    }

    /// Hand a displaced object back to the control thread. Falls back to
    /// a local stash when the reclaim queue is contended; only if the
    /// stash is also full does the drop happen here.
    fn reclaim(&mut self, item: Reclaimed) {
        if let Some(mut queue) = self.shared.reclaim.try_lock() {
            queue.push_back(item);
        } else if self.pending_reclaim.len() < self.pending_reclaim.capacity() {
            self.pending_reclaim.push(item);
        }
        // Else: dropped here. A contended queue plus a full stash means
        // the control thread has stopped collecting; correctness over
        // purity.
    }

    fn apply_param_events(&mut self) {
        while let Some(event) = self.params_rx.pop() {
            Self::apply_param(&mut self.tracks, &mut self.master_chain, event);
        }
    }

    fn apply_param(tracks: &mut [Box<Track>], master: &mut EffectChain, event: ParamEvent) {
        match event.target {
            ParamTarget::Voice(param) => {
                if event.track != MASTER_TRACK {
                    if let Some(track) = tracks.get_mut(event.track as usize) {
                        apply_voice_param(&mut track.voice, param, event.value);
                    }
                }
            }
            ParamTarget::Effect { slot, index } => {
                let chain = if event.track == MASTER_TRACK {
                    Some(master)
                } else {
                    tracks.get_mut(event.track as usize).map(|t| &mut t.chain)
                };
                if let Some(chain) = chain {
                    if let Some(slot) = chain.slot_mut(slot as usize) {
                        slot.kind.set_param(index as usize, event.value);
                    }
                }
            }
            ParamTarget::EffectBypass { slot } => {
                let chain = if event.track == MASTER_TRACK {
                    Some(master)
                } else {
                    tracks.get_mut(event.track as usize).map(|t| &mut t.chain)
                };
                if let Some(chain) = chain {
                    chain.set_bypass(slot as usize, event.value >= 0.5);
                }
            }
        }
    }

    fn sync_transport(&mut self) {
        self.transport.set_bpm(self.shared.bpm());

        let (start, end, enabled) = self.shared.loop_params();
        self.transport.set_loop(start as f64, end as f64, enabled);

        let desired = self.shared.state();
        let current = self.transport.state();
        match (desired, current) {
            (STATE_PLAYING, s) if s != TransportState::Playing => self.transport.play(),
            (STATE_PAUSED, TransportState::Playing) => self.transport.pause(),
            (STATE_STOPPED, s) if s != TransportState::Stopped => {
                self.transport.stop();
                // Release everything so a restart begins cleanly.
                for track in &mut self.tracks {
                    track.voice.note_off();
                    track.note_off_in = None;
                }
            }
            _ => {}
        }
    }

    fn sync_faders(&mut self) {
        for (i, track) in self.tracks.iter_mut().enumerate() {
            track.set_gain(self.shared.track_gain(i));
            track.set_pan(self.shared.track_pan(i));
            track.mute = self.shared.track_mute(i);
            track.solo = self.shared.track_solo(i);
        }
    }

    fn collect_note_events(&mut self, frames: usize) {
        while let Some(mut event) = self.notes_rx.pop() {
            event.frame_offset = event.frame_offset.min(frames.saturating_sub(1) as u32);
            if self.pending_events.len() < MAX_BLOCK_EVENTS {
                self.pending_events.push(event);
            }
        }
    }

    /// Turn pattern material into gate events for this block.
    fn schedule_patterns(&mut self, frames: usize) {
        let spb = self.transport.samples_per_beat();
        let block_beats = frames as f64 / spb;
        let block_start = self.transport.beat();

        for (i, track) in self.tracks.iter_mut().enumerate() {
            // Pending release from an earlier note.
            if let Some(remaining) = track.note_off_in {
                if (remaining as usize) < frames {
                    if self.pending_events.len() < MAX_BLOCK_EVENTS {
                        self.pending_events.push(NoteEvent {
                            track: i as u32,
                            note: 0,
                            velocity: 0.0,
                            frame_offset: remaining as u32,
                            on: false,
                        });
                    }
                    track.note_off_in = None;
                } else {
                    track.note_off_in = Some(remaining - frames as u64);
                }
            }

            let Some(pattern) = &track.pattern else {
                continue;
            };
            let pattern_len = pattern.length_beats() as f64;
            let local = block_start.rem_euclid(pattern_len);

            for note in pattern.notes() {
                let start = (note.start_beat as f64).rem_euclid(pattern_len);
                let mut delta = start - local;
                if delta < 0.0 {
                    delta += pattern_len;
                }
                if delta < block_beats {
                    let frame = ((delta * spb) as u64).min(frames as u64 - 1);
                    if self.pending_events.len() < MAX_BLOCK_EVENTS {
                        self.pending_events.push(NoteEvent {
                            track: i as u32,
                            note: note.note,
                            velocity: note.velocity,
                            frame_offset: frame as u32,
                            on: true,
                        });
                    }
                    let duration_samples = (note.duration_beats as f64 * spb) as u64;
                    track.note_off_in = Some(frame + duration_samples);
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pattern::PatternNote;
    use crate::track::VoiceParam;
    use cadenza_effects::{Distortion, EffectKind, ExternalNode, ExternalProcessor};
    use cadenza_synth::Waveform;

    fn render(engine: &mut Engine, blocks: usize) -> (Vec<f32>, Vec<f32>) {
        let mut all_l = Vec::new();
        let mut all_r = Vec::new();
        let mut l = [0.0f32; 512];
        let mut r = [0.0f32; 512];
        for _ in 0..blocks {
            engine.process_block(&mut l, &mut r);
            all_l.extend_from_slice(&l);
            all_r.extend_from_slice(&r);
        }
        (all_l, all_r)
    }

    #[test]
    fn track_limit_is_enforced() {
        let (mut engine, _controller) = Engine::new(EngineConfig::default());
        for i in 0..MAX_TRACKS {
            assert_eq!(engine.add_track(&format!("t{i}")).unwrap(), i);
        }
        assert_eq!(
            engine.add_track("overflow"),
            Err(EngineError::TrackLimitReached(MAX_TRACKS))
        );
        assert_eq!(engine.num_tracks(), MAX_TRACKS);
    }

    #[test]
    fn empty_engine_emits_silence() {
        let (mut engine, _controller) = Engine::new(EngineConfig::default());
        engine.play();
        let (l, r) = render(&mut engine, 8);
        assert!(l.iter().all(|&s| s == 0.0));
        assert!(r.iter().all(|&s| s == 0.0));
    }

    #[test]
    fn stopped_engine_is_silent_but_feeds_analyzers() {
        let (mut engine, _controller) = Engine::new(EngineConfig::default());
        let t = engine.add_track("lead").unwrap();
        engine.note_on(t, 69, 1.0).unwrap();
        // Not playing: the block must stay zero.
        let (l, _) = render(&mut engine, 4);
        assert!(l.iter().all(|&s| s == 0.0));
        // The meter saw the (silent) block.
        assert_eq!(engine.meter().rms_left(), 0.0);
    }

    #[test]
    fn gated_voice_sounds_when_playing() {
        let (mut engine, _controller) = Engine::new(EngineConfig::default());
        let t = engine.add_track("lead").unwrap();
        engine.note_on(t, 69, 1.0).unwrap();
        engine.play();
        let (l, _) = render(&mut engine, 8);
        let energy: f32 = l.iter().map(|s| s.abs()).sum();
        assert!(energy > 1.0, "energy {energy}");
    }

    #[test]
    fn output_is_always_within_unit_range() {
        let (mut engine, _controller) = Engine::new(EngineConfig::default());
        let t = engine.add_track("hot").unwrap();
        engine.track_mut(t).unwrap().voice.set_levels(1.0, 1.0, 1.0);
        engine.set_track_gain(t, 2.0);
        engine.set_master_gain(10.0);
        engine.note_on(t, 40, 1.0).unwrap();
        engine.play();
        let (l, r) = render(&mut engine, 32);
        for (&a, &b) in l.iter().zip(r.iter()) {
            assert!((-1.0..=1.0).contains(&a));
            assert!((-1.0..=1.0).contains(&b));
        }
    }

    #[test]
    fn mute_silences_a_track() {
        let (mut engine, _controller) = Engine::new(EngineConfig::default());
        let t = engine.add_track("lead").unwrap();
        engine.note_on(t, 60, 1.0).unwrap();
        engine.set_track_mute(t, true);
        engine.play();
        let (l, _) = render(&mut engine, 8);
        assert!(l.iter().all(|&s| s == 0.0));
    }

    #[test]
    fn solo_excludes_other_tracks() {
        let build = |solo_only: bool| {
            let (mut engine, _c) = Engine::new(EngineConfig::default());
            let a = engine.add_track("a").unwrap();
            engine.note_on(a, 60, 1.0).unwrap();
            engine.set_track_solo(a, true);
            if !solo_only {
                let b = engine.add_track("b").unwrap();
                engine.note_on(b, 72, 1.0).unwrap();
            }
            engine.play();
            engine
        };
        let (mut with_both, mut alone) = (build(false), build(true));
        let (l1, r1) = render(&mut with_both, 8);
        let (l2, r2) = render(&mut alone, 8);
        assert_eq!(l1, l2, "soloed mix must equal the solo track alone");
        assert_eq!(r1, r2);
    }

    #[test]
    fn pan_law_splits_equal_gain() {
        let run = |pan: f32| {
            let (mut engine, _c) = Engine::new(EngineConfig::default());
            let t = engine.add_track("p").unwrap();
            engine.track_mut(t).unwrap().voice.set_levels(0.2, 0.0, 0.0);
            engine.set_track_pan(t, pan);
            engine.note_on(t, 60, 1.0).unwrap();
            engine.play();
            render(&mut engine, 8)
        };

        // Hard left: right channel silent.
        let (_, r) = run(-1.0);
        assert!(r.iter().all(|&s| s == 0.0));
        // Centre: both channels identical.
        let (l, r) = run(0.0);
        assert_eq!(l, r);
    }

    #[test]
    fn pattern_schedules_notes() {
        let (mut engine, _controller) = Engine::new(EngineConfig::default());
        let t = engine.add_track("seq").unwrap();
        let mut pattern = Pattern::new(4.0);
        pattern.add(PatternNote::new(69, 1.0, 0.0, 1.0)).unwrap();
        engine.set_pattern(t, Some(pattern)).unwrap();
        engine.play();

        let (l, _) = render(&mut engine, 16);
        let energy: f32 = l.iter().map(|s| s.abs()).sum();
        assert!(energy > 1.0, "pattern should trigger the voice");
        assert_eq!(engine.track(t).unwrap().voice.note(), 69);
    }

    #[test]
    fn pattern_note_releases_after_duration() {
        let (mut engine, _controller) = Engine::new(EngineConfig::default());
        let t = engine.add_track("seq").unwrap();
        engine
            .track_mut(t)
            .unwrap()
            .voice
            .amp_env
            .set_adsr(0.001, 0.01, 1.0, 0.01);
        let mut pattern = Pattern::new(8.0);
        // Half-beat note at 120 bpm = 0.25 s.
        pattern.add(PatternNote::new(60, 1.0, 0.0, 0.5)).unwrap();
        engine.set_pattern(t, Some(pattern)).unwrap();
        engine.play();

        // After 1 second the gate must be off again.
        render(&mut engine, 94); // ~48k samples
        assert!(!engine.track(t).unwrap().voice.amp_env.gate());
    }

    #[test]
    fn controller_commands_apply_between_blocks() {
        let (mut engine, controller) = Engine::new(EngineConfig::default());
        controller.add_track("remote");
        assert_eq!(engine.num_tracks(), 0);

        let mut l = [0.0f32; 64];
        let mut r = [0.0f32; 64];
        engine.process_block(&mut l, &mut r);
        assert_eq!(engine.num_tracks(), 1);

        let descriptors = controller.descriptors();
        assert_eq!(descriptors.len(), 1);
        assert_eq!(descriptors[0].name, "remote");
    }

    #[test]
    fn controller_note_and_param_events_apply() {
        let (mut engine, mut controller) = Engine::new(EngineConfig::default());
        let t = engine.add_track("lead").unwrap();
        controller.play();
        assert!(controller.note_on(t, 64, 0.9));
        assert!(controller.set_voice_param(t, VoiceParam::AmpSustain, 0.33));

        let mut l = [0.0f32; 128];
        let mut r = [0.0f32; 128];
        engine.process_block(&mut l, &mut r);

        let track = engine.track(t).unwrap();
        assert_eq!(track.voice.note(), 64);
        assert!((track.voice.amp_env.sustain() - 0.33).abs() < 1e-6);
    }

    #[test]
    fn removed_objects_are_reclaimed_not_dropped_inline() {
        let (mut engine, controller) = Engine::new(EngineConfig::default());
        controller.add_track("doomed");
        let mut l = [0.0f32; 64];
        let mut r = [0.0f32; 64];
        engine.process_block(&mut l, &mut r);
        assert_eq!(engine.num_tracks(), 1);

        controller.remove_track(0);
        engine.process_block(&mut l, &mut r);
        assert_eq!(engine.num_tracks(), 0);
        assert_eq!(controller.collect_garbage(), 1);
    }

    #[test]
    fn master_chain_applies_to_the_mix() {
        let (mut engine, _controller) = Engine::new(EngineConfig::default());
        let t = engine.add_track("lead").unwrap();
        engine.track_mut(t).unwrap().voice.set_levels(0.3, 0.0, 0.0);
        engine
            .track_mut(t)
            .unwrap()
            .voice
            .osc1
            .set_waveforms(Waveform::Sine, Waveform::Sine);

        // A hard-gating distortion on the master bus audibly changes the
        // output against an identical dry engine.
        let mut dist = Distortion::new(48000.0);
        dist.set_drive(8.0);
        engine
            .push_effect(None, EffectSlot::new(EffectKind::Distortion(dist)))
            .unwrap();
        engine.note_on(t, 60, 1.0).unwrap();
        engine.play();
        let (wet, _) = render(&mut engine, 8);

        let (mut dry_engine, _c) = Engine::new(EngineConfig::default());
        let t2 = dry_engine.add_track("lead").unwrap();
        dry_engine.track_mut(t2).unwrap().voice.set_levels(0.3, 0.0, 0.0);
        dry_engine
            .track_mut(t2)
            .unwrap()
            .voice
            .osc1
            .set_waveforms(Waveform::Sine, Waveform::Sine);
        dry_engine.note_on(t2, 60, 1.0).unwrap();
        dry_engine.play();
        let (dry, _) = render(&mut dry_engine, 8);

        assert_ne!(wet, dry);
    }

    #[test]
    fn interleaved_output_matches_split_output() {
        let build = || {
            let (mut engine, _c) = Engine::new(EngineConfig::default());
            let t = engine.add_track("x").unwrap();
            engine.set_track_pan(t, 0.5);
            engine.note_on(t, 57, 1.0).unwrap();
            engine.play();
            engine
        };
        let mut split = build();
        let mut inter = build();

        let mut l = [0.0f32; 256];
        let mut r = [0.0f32; 256];
        split.process_block(&mut l, &mut r);

        let mut buf = [0.0f32; 512];
        inter.process_interleaved(&mut buf);

        for i in 0..256 {
            assert_eq!(buf[i * 2], l[i]);
            assert_eq!(buf[i * 2 + 1], r[i]);
        }
    }

    #[test]
    fn nan_from_a_chain_is_flushed_before_the_clip() {
        struct NanNode;
        impl ExternalProcessor for NanNode {
            fn init(&mut self, _: f32, _: usize) {}
            fn reset(&mut self) {}
            fn process_audio(
                &mut self,
                _inputs: &[&[f32]],
                outputs: &mut [&mut [f32]],
                frames: usize,
            ) {
                for ch in outputs.iter_mut() {
                    for s in ch.iter_mut().take(frames) {
                        *s = f32::NAN;
                    }
                }
            }
            fn get_parameter(&self, _: u32) -> Option<f32> {
                None
            }
            fn set_parameter(&mut self, _: u32, _: f32) {}
        }

        let (mut engine, _controller) = Engine::new(EngineConfig::default());
        let t = engine.add_track("poison").unwrap();
        let node = ExternalNode::new(Box::new(NanNode), 48000.0, 512);
        engine
            .push_effect(Some(t), EffectSlot::new(EffectKind::External(node)))
            .unwrap();
        engine.note_on(t, 60, 1.0).unwrap();
        engine.play();

        let (l, r) = render(&mut engine, 4);
        assert!(l.iter().all(|s| s.is_finite()));
        assert!(r.iter().all(|s| s.is_finite()));
    }
}

