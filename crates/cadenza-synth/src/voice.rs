//! Monophonic note-gated synth voice.
//!
//! The unit of sound behind each track: two morph oscillators (the second
//! detuned +0.5% for width), a noise source, a state variable filter, and
//! two ADSR envelopes — one for amplitude, one sweeping the filter cutoff
//! above a base frequency.
//!
//! The voice is strictly monophonic. `note_on` while already sounding
//! retargets the oscillator frequencies and re-arms the envelopes from
//! their current levels, so legato lines glide without clicks.

use cadenza_core::{midi_to_freq, Effect, StateVariableFilter};

use crate::envelope::AdsrEnvelope;
use crate::morph::MorphOscillator;
use crate::noise::{NoiseGenerator, NoiseType};

/// Detune applied to the second oscillator: +0.5%.
const OSC2_DETUNE_RATIO: f32 = 1.005;

/// Note-gated monophonic voice.
///
/// ## Defaults
///
/// - oscillator levels: osc1 0.5, osc2 0.3, noise 0.0
/// - filter: base cutoff 500 Hz, resonance 0.5, envelope amount 2000 Hz
/// - amp envelope: 10 ms / 200 ms / 0.7 / 300 ms
/// - filter envelope: 50 ms / 300 ms / 0.5 / 400 ms
///
/// # Example
///
/// ```rust
/// use cadenza_synth::Voice;
///
/// let mut voice = Voice::new(48000.0);
/// voice.note_on(60, 0.8);
/// for _ in 0..1000 {
///     let _sample = voice.process();
/// }
/// voice.note_off();
/// ```
#[derive(Debug, Clone)]
pub struct Voice {
    /// Primary oscillator.
    pub osc1: MorphOscillator,
    /// Detuned secondary oscillator.
    pub osc2: MorphOscillator,
    /// Noise layer.
    pub noise: NoiseGenerator,
    /// Voice filter.
    pub filter: StateVariableFilter,
    /// Amplitude envelope.
    pub amp_env: AdsrEnvelope,
    /// Filter cutoff envelope.
    pub filter_env: AdsrEnvelope,

    note: u8,
    velocity: f32,

    osc1_level: f32,
    osc2_level: f32,
    noise_level: f32,

    base_cutoff: f32,
    filter_env_amount: f32,
}

impl Default for Voice {
    fn default() -> Self {
        Self::new(48000.0)
    }
}

impl Voice {
    /// Create a voice at the given sample rate.
    pub fn new(sample_rate: f32) -> Self {
        let mut filter = StateVariableFilter::new(sample_rate);
        filter.set_resonance(0.5);

        let mut amp_env = AdsrEnvelope::new(sample_rate);
        amp_env.set_adsr(0.01, 0.2, 0.7, 0.3);
        let mut filter_env = AdsrEnvelope::new(sample_rate);
        filter_env.set_adsr(0.05, 0.3, 0.5, 0.4);

        Self {
            osc1: MorphOscillator::new(sample_rate),
            osc2: MorphOscillator::new(sample_rate),
            noise: NoiseGenerator::new(NoiseType::White, 0),
            filter,
            amp_env,
            filter_env,
            note: 0,
            velocity: 0.0,
            osc1_level: 0.5,
            osc2_level: 0.3,
            noise_level: 0.0,
            base_cutoff: 500.0,
            filter_env_amount: 2000.0,
        }
    }

    /// Start (or retarget) a note. `velocity` is normalized to [0, 1].
    ///
    /// Envelope levels are left untouched: a retrigger while sounding
    /// rises from the current level instead of snapping to zero.
    pub fn note_on(&mut self, note: u8, velocity: f32) {
        self.note = note.min(127);
        self.velocity = velocity.clamp(0.0, 1.0);

        let freq = midi_to_freq(self.note as f32);
        self.osc1.set_frequency(freq);
        self.osc2.set_frequency(freq * OSC2_DETUNE_RATIO);

        self.amp_env.gate_on();
        self.filter_env.gate_on();
    }

    /// Release the current note.
    pub fn note_off(&mut self) {
        self.amp_env.gate_off();
        self.filter_env.gate_off();
    }

    /// Whether the voice is audible (gate high or still releasing).
    pub fn is_active(&self) -> bool {
        self.amp_env.gate() || self.amp_env.level() > 1e-5
    }

    /// Currently sounding MIDI note.
    pub fn note(&self) -> u8 {
        self.note
    }

    /// Set the three source levels.
    pub fn set_levels(&mut self, osc1: f32, osc2: f32, noise: f32) {
        self.osc1_level = osc1;
        self.osc2_level = osc2;
        self.noise_level = noise;
    }

    /// The three source levels as (osc1, osc2, noise).
    pub fn levels(&self) -> (f32, f32, f32) {
        (self.osc1_level, self.osc2_level, self.noise_level)
    }

    /// Set the filter base cutoff in Hz.
    pub fn set_base_cutoff(&mut self, hz: f32) {
        self.base_cutoff = hz;
    }

    /// Set the filter envelope sweep amount in Hz.
    pub fn set_filter_env_amount(&mut self, hz: f32) {
        self.filter_env_amount = hz;
    }

    /// Set the filter resonance.
    pub fn set_filter_resonance(&mut self, resonance: f32) {
        self.filter.set_resonance(resonance);
    }

    /// Update the sample rate for every component.
    pub fn set_sample_rate(&mut self, sample_rate: f32) {
        self.osc1.set_sample_rate(sample_rate);
        self.osc2.set_sample_rate(sample_rate);
        self.filter.set_sample_rate(sample_rate);
        self.amp_env.set_sample_rate(sample_rate);
        self.filter_env.set_sample_rate(sample_rate);
    }

    /// Hard-stop the voice and clear all state.
    pub fn reset(&mut self) {
        self.amp_env.reset();
        self.filter_env.reset();
        self.filter.reset();
        self.osc1.reset();
        self.osc2.reset();
        self.note = 0;
        self.velocity = 0.0;
    }

    /// Generate one mono sample.
    #[inline]
    pub fn process(&mut self) -> f32 {
        let osc = self.osc1_level * self.osc1.process()
            + self.osc2_level * self.osc2.process()
            + self.noise_level * self.noise.process();

        let filter_env = self.filter_env.process();
        let cutoff = self.base_cutoff + filter_env * self.filter_env_amount;
        self.filter.set_cutoff(cutoff);

        let filtered = self.filter.process(osc);
        filtered * self.amp_env.process() * self.velocity
    }
}
