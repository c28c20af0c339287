//! Tracks: one voice, one chain, one fader strip.
//!
//! A track owns its entire signal path exclusively — the voice that
//! makes sound, the effect chain that colors it, and the mixer strip
//! (gain, pan, mute, solo). Identity is the track's index in the
//! engine's list.

use cadenza_effects::EffectChain;
use cadenza_synth::Voice;

use crate::pattern::Pattern;

/// Single-word voice parameters addressable over the control bridge.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VoiceParam {
    /// Amp envelope attack in seconds.
    AmpAttack,
    /// Amp envelope decay in seconds.
    AmpDecay,
    /// Amp envelope sustain level.
    AmpSustain,
    /// Amp envelope release in seconds.
    AmpRelease,
    /// Filter envelope attack in seconds.
    FilterAttack,
    /// Filter envelope decay in seconds.
    FilterDecay,
    /// Filter envelope sustain level.
    FilterSustain,
    /// Filter envelope release in seconds.
    FilterRelease,
    /// Filter base cutoff in Hz.
    BaseCutoff,
    /// Filter resonance.
    Resonance,
    /// Filter envelope sweep amount in Hz.
    FilterEnvAmount,
    /// Oscillator 1 level.
    Osc1Level,
    /// Oscillator 2 level.
    Osc2Level,
    /// Noise level.
    NoiseLevel,
    /// Morph coefficient applied to both oscillators.
    Morph,
    /// Pulse width applied to both oscillators.
    PulseWidth,
}

/// Apply a voice parameter write.
pub(crate) fn apply_voice_param(voice: &mut Voice, param: VoiceParam, value: f32) {
    match param {
        VoiceParam::AmpAttack => voice.amp_env.set_attack(value),
        VoiceParam::AmpDecay => voice.amp_env.set_decay(value),
        VoiceParam::AmpSustain => voice.amp_env.set_sustain(value),
        VoiceParam::AmpRelease => voice.amp_env.set_release(value),
        VoiceParam::FilterAttack => voice.filter_env.set_attack(value),
        VoiceParam::FilterDecay => voice.filter_env.set_decay(value),
        VoiceParam::FilterSustain => voice.filter_env.set_sustain(value),
        VoiceParam::FilterRelease => voice.filter_env.set_release(value),
        VoiceParam::BaseCutoff => voice.set_base_cutoff(value),
        VoiceParam::Resonance => voice.set_filter_resonance(value),
        VoiceParam::FilterEnvAmount => voice.set_filter_env_amount(value),
        VoiceParam::Osc1Level | VoiceParam::Osc2Level | VoiceParam::NoiseLevel => {
            // Levels are stored together; route through the setter with
            // the other two untouched via the voice's current mix.
            set_level(voice, param, value);
        }
        VoiceParam::Morph => {
            voice.osc1.set_morph(value);
            voice.osc2.set_morph(value);
        }
        VoiceParam::PulseWidth => {
            voice.osc1.set_pulse_width(value);
            voice.osc2.set_pulse_width(value);
        }
    }
}

// Voice keeps its three source levels private behind one setter; cache
// the last written values per call site.
fn set_level(voice: &mut Voice, param: VoiceParam, value: f32) {
    let (mut o1, mut o2, mut n) = voice.levels();
    match param {
        VoiceParam::Osc1Level => o1 = value,
        VoiceParam::Osc2Level => o2 = value,
        VoiceParam::NoiseLevel => n = value,
        _ => {}
    }
    voice.set_levels(o1, o2, n);
}

/// One mixer channel.
///
/// ## Fields
///
/// - `gain`: [0, 2], default 1
/// - `pan`: [-1, 1], 0 = centre
/// - `mute` / `solo`
/// - `pattern`: optional compositional material for the scheduler
///
/// The per-block peak meter is written by the engine after the chain.
pub struct Track {
    /// Display name.
    pub name: String,
    /// The track's synth voice.
    pub voice: Voice,
    /// Insert effect chain.
    pub chain: EffectChain,
    gain: f32,
    pan: f32,
    /// Mute flag.
    pub mute: bool,
    /// Solo flag.
    pub solo: bool,
    /// Scheduled material, if any.
    pub pattern: Option<Pattern>,
    /// Post-chain peak of the last block.
    pub peak: f32,
    /// Samples until the sounding pattern note releases, counted from
    /// the current block start. Sample-based so loop wraps cannot strand
    /// a held note.
    pub(crate) note_off_in: Option<u64>,
}

impl Track {
    /// Create a named track at the given sample rate.
    pub fn new(name: &str, sample_rate: f32) -> Self {
        Self {
            name: name.to_owned(),
            voice: Voice::new(sample_rate),
            chain: EffectChain::new(sample_rate),
            gain: 1.0,
            pan: 0.0,
            mute: false,
            solo: false,
            pattern: None,
            peak: 0.0,
            note_off_in: None,
        }
    }

    /// Set the gain, clamped to [0, 2].
    pub fn set_gain(&mut self, gain: f32) {
        self.gain = gain.clamp(0.0, 2.0);
    }

    /// Current gain.
    pub fn gain(&self) -> f32 {
        self.gain
    }

    /// Set the pan, clamped to [-1, 1].
    pub fn set_pan(&mut self, pan: f32) {
        self.pan = pan.clamp(-1.0, 1.0);
    }

    /// Current pan.
    pub fn pan(&self) -> f32 {
        self.pan
    }

    /// Update the sample rate through the whole signal path.
    pub fn set_sample_rate(&mut self, sample_rate: f32) {
        self.voice.set_sample_rate(sample_rate);
        self.chain.set_sample_rate(sample_rate);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn gain_and_pan_are_clamped() {
        let mut track = Track::new("bass", 48000.0);
        track.set_gain(5.0);
        assert_eq!(track.gain(), 2.0);
        track.set_gain(-1.0);
        assert_eq!(track.gain(), 0.0);
        track.set_pan(2.0);
        assert_eq!(track.pan(), 1.0);
        track.set_pan(-2.0);
        assert_eq!(track.pan(), -1.0);
    }

    #[test]
    fn voice_params_route_to_the_voice() {
        let mut track = Track::new("lead", 48000.0);
        apply_voice_param(&mut track.voice, VoiceParam::AmpSustain, 0.25);
        apply_voice_param(&mut track.voice, VoiceParam::Morph, 0.5);
        assert_eq!(track.voice.amp_env.sustain(), 0.25);
        assert_eq!(track.voice.osc1.morph(), 0.5);
        assert_eq!(track.voice.osc2.morph(), 0.5);
    }

    #[test]
    fn level_params_edit_one_source_at_a_time() {
        let mut track = Track::new("keys", 48000.0);
        apply_voice_param(&mut track.voice, VoiceParam::NoiseLevel, 0.9);
        let (o1, o2, n) = track.voice.levels();
        assert_eq!(n, 0.9);
        // The oscillator levels keep their defaults.
        assert_eq!(o1, 0.5);
        assert_eq!(o2, 0.3);
    }

    #[test]
    fn fresh_track_is_silent_and_unsoloed() {
        let track = Track::new("empty", 48000.0);
        assert!(!track.mute);
        assert!(!track.solo);
        assert!(track.pattern.is_none());
        assert_eq!(track.peak, 0.0);
    }
}
