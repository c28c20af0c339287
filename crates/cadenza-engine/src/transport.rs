//! Sample-accurate transport.
//!
//! Owns the relationship between sample time and musical time:
//! `current_sample = round(current_beat · 60 · sample_rate / bpm)` holds
//! after every mutation. Playback advances in whole blocks; the loop
//! check runs at block granularity, wrapping the beat position back to
//! the loop start once it reaches the loop end.

/// Playback state.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum TransportState {
    /// Not playing; position held at zero.
    #[default]
    Stopped,
    /// Not playing; position held where it was.
    Paused,
    /// Advancing.
    Playing,
}

/// Musical clock for the engine.
///
/// ## Parameters
///
/// - `bpm`: clamped to [20, 400], default 120
/// - time signature: numerator/denominator, default 4/4
/// - loop region: `[loop_start, loop_end)` in beats, disabled by default
///
/// # Example
///
/// ```rust
/// use cadenza_engine::transport::Transport;
///
/// let mut transport = Transport::new(48000.0);
/// transport.set_bpm(120.0);
/// transport.play();
/// transport.advance(48000); // one second
/// assert!((transport.beat() - 2.0).abs() < 1e-6);
/// ```
#[derive(Debug, Clone)]
pub struct Transport {
    sample_rate: f32,
    bpm: f32,
    numerator: u8,
    denominator: u8,
    state: TransportState,
    current_sample: u64,
    current_beat: f64,
    loop_start: f64,
    loop_end: f64,
    loop_enabled: bool,
}

impl Transport {
    /// Create a stopped transport at 120 bpm, 4/4.
    pub fn new(sample_rate: f32) -> Self {
        Self {
            sample_rate,
            bpm: 120.0,
            numerator: 4,
            denominator: 4,
            state: TransportState::Stopped,
            current_sample: 0,
            current_beat: 0.0,
            loop_start: 0.0,
            loop_end: 4.0,
            loop_enabled: false,
        }
    }

    /// Samples per beat at the current tempo.
    #[inline]
    pub fn samples_per_beat(&self) -> f64 {
        60.0 * self.sample_rate as f64 / self.bpm as f64
    }

    /// Set the tempo, clamped to [20, 400] bpm.
    ///
    /// The musical position is preserved; the sample position is
    /// recomputed to keep the invariant.
    pub fn set_bpm(&mut self, bpm: f32) {
        let clamped = bpm.clamp(20.0, 400.0);
        if clamped != self.bpm {
            self.bpm = clamped;
            self.current_sample = (self.current_beat * self.samples_per_beat()).round() as u64;
        }
    }

    /// Current tempo in bpm.
    pub fn bpm(&self) -> f32 {
        self.bpm
    }

    /// Set the time signature (zeroes are bumped to 1).
    pub fn set_time_signature(&mut self, numerator: u8, denominator: u8) {
        self.numerator = numerator.max(1);
        self.denominator = denominator.max(1);
    }

    /// Time signature as (numerator, denominator).
    pub fn time_signature(&self) -> (u8, u8) {
        (self.numerator, self.denominator)
    }

    /// Begin playback from the current position.
    pub fn play(&mut self) {
        self.state = TransportState::Playing;
    }

    /// Pause, holding the current position.
    pub fn pause(&mut self) {
        if self.state == TransportState::Playing {
            self.state = TransportState::Paused;
        }
    }

    /// Stop and rewind to zero.
    pub fn stop(&mut self) {
        self.state = TransportState::Stopped;
        self.current_sample = 0;
        self.current_beat = 0.0;
    }

    /// Current playback state.
    pub fn state(&self) -> TransportState {
        self.state
    }

    /// Whether the transport is advancing.
    pub fn is_playing(&self) -> bool {
        self.state == TransportState::Playing
    }

    /// Current beat position.
    pub fn beat(&self) -> f64 {
        self.current_beat
    }

    /// Current sample position.
    pub fn sample(&self) -> u64 {
        self.current_sample
    }

    /// Jump to a beat position (≥ 0).
    pub fn seek_beats(&mut self, beat: f64) {
        self.current_beat = beat.max(0.0);
        self.current_sample = (self.current_beat * self.samples_per_beat()).round() as u64;
    }

    /// Configure the loop region in beats. An empty or inverted region
    /// disables looping.
    pub fn set_loop(&mut self, start: f64, end: f64, enabled: bool) {
        if end > start && start >= 0.0 {
            self.loop_start = start;
            self.loop_end = end;
            self.loop_enabled = enabled;
        } else {
            self.loop_enabled = false;
        }
    }

    /// Loop region as (start, end, enabled).
    pub fn loop_region(&self) -> (f64, f64, bool) {
        (self.loop_start, self.loop_end, self.loop_enabled)
    }

    /// Advance by one block of `frames` samples.
    ///
    /// Returns `true` when the loop wrapped during this block. The wrap
    /// is block-granular: once the beat position reaches the loop end,
    /// the position snaps back to the loop start.
    pub fn advance(&mut self, frames: usize) -> bool {
        if self.state != TransportState::Playing {
            return false;
        }

        self.current_sample += frames as u64;
        self.current_beat = self.current_sample as f64 / self.samples_per_beat();

        if self.loop_enabled && self.current_beat >= self.loop_end {
            self.current_beat = self.loop_start;
            self.current_sample = (self.current_beat * self.samples_per_beat()).round() as u64;
            return true;
        }

        false
    }
}
