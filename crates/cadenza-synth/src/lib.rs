//! Cadenza Synth - synthesis building blocks for the workstation engine
//!
//! Seven oscillator families, a gate-driven ADSR envelope, a monophonic
//! note-gated [`Voice`], and a tagged [`OscillatorBank`] for free-running
//! stereo layering.
//!
//! # Oscillators
//!
//! Every oscillator advances its own phase/state once per
//! `process()` call and accepts parameter updates between samples;
//! frequency changes take effect at the next sample (parameter smoothing
//! is the UI's job).
//!
//! - [`MorphOscillator`] - two selectable waveforms crossfaded by a morph
//!   coefficient
//! - [`ChaosOscillator`] - Lorenz attractor integrated per sample
//! - [`WavetableOscillator`] - up to 16 band-limited tables with bilinear
//!   interpolation
//! - [`FmOscillator`] - 6-operator phase-modulation network with a free
//!   routing matrix
//! - [`AdditiveOscillator`] - up to 64 sine partials
//! - [`NoiseGenerator`] - white, pink, brown, and velvet noise
//! - [`FractalOscillator`] - Julia-set-derived harmonic weights
//!
//! # Example
//!
//! ```rust
//! use cadenza_synth::Voice;
//!
//! let mut voice = Voice::new(48000.0);
//! voice.note_on(69, 1.0); // A4, full velocity
//! let sample = voice.process();
//! voice.note_off();
//! ```

pub mod additive;
pub mod bank;
pub mod chaos;
pub mod envelope;
pub mod fm;
pub mod fractal;
pub mod granular;
pub mod morph;
pub mod noise;
pub mod voice;
pub mod wavetable;

pub use additive::AdditiveOscillator;
pub use bank::{BankFull, OscillatorBank, OscillatorKind, OscillatorTag};
pub use chaos::{ChaosAxis, ChaosOscillator};
pub use envelope::AdsrEnvelope;
pub use fm::FmOscillator;
pub use fractal::FractalOscillator;
pub use granular::{GrainEnvelope, GranularEngine};
pub use morph::{MorphOscillator, Waveform};
pub use noise::{NoiseGenerator, NoiseType};
pub use voice::Voice;
pub use wavetable::{TableSlotOutOfRange, WavetableOscillator};
