//! Cadenza Analysis - visualization side-channel for the engine
//!
//! Analyzers that read the mixed output and produce the data the UI
//! draws: oscilloscope frames, spectrum bands, level meters, chroma
//! energy, and the pitch-to-color mapping. Everything here is owned
//! state — multiple engines in one process get independent analyzers.
//!
//! - [`WaveformScope`] - triggered stereo oscilloscope rings
//! - [`SpectrumAnalyzer`] - Hann-windowed FFT with smoothing and peak
//!   hold
//! - [`LevelMeter`] - RMS / peak / peak-hold metering per channel
//! - [`chromagram`] - 12-bin pitch-class projection of a spectrum
//! - [`chroma`] - deterministic note → sRGB synesthesia mapping

pub mod chroma;
pub mod chromagram;
pub mod meter;
pub mod scope;
pub mod spectrum;

pub use chroma::{frequency_to_color, note_to_color, Rgb};
pub use chromagram::chromagram;
pub use meter::LevelMeter;
pub use scope::{TriggerEdge, WaveformScope, SCOPE_BUFFER_SIZE};
pub use spectrum::{SpectrumAnalyzer, SPECTRUM_FFT_SIZE};
