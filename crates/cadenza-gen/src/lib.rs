//! Cadenza Gen - generative note and trigger sources
//!
//! The rule-free half of the workstation: algorithms that turn chance,
//! chaos, growth, and arbitrary media into note sequences the pattern
//! layer can play. Every generator owns its own seeded
//! [`Xorshift32`](cadenza_core::Xorshift32), so two instances built with
//! the same seed and driven identically produce identical output — no
//! shared RNG state anywhere.
//!
//! # Probabilistic
//!
//! - [`MarkovMelody`] - pitch-class transition chain with temperature
//! - [`StochasticSequencer`] - per-step trigger probabilities
//! - [`Brownian`] - momentum random walk over a continuous range
//! - [`RandomWalk`] - scale-quantized walk over MIDI notes
//! - [`ChordProgression`] - degree-table progression with chord types
//!
//! # Rule systems
//!
//! - [`CellularAutomaton`] - elementary (Wolfram rule) trigger rows
//! - [`GeneticMelody`] - evolving 16-note genomes under a musical fitness
//! - [`LSystem`] - bounded string rewriting walked into a melody
//!
//! # Media mappers
//!
//! - [`TextMelody`] - characters to scale degrees
//! - [`ColorHarmony`] - RGB to chord structure
//! - [`PixelRhythm`] - luminance grid to drum triggers
//! - [`ImageSpectrum`] - image columns to an additive spectrum

pub mod brownian;
pub mod cellular;
pub mod chords;
pub mod color;
pub mod genetic;
pub mod image;
pub mod lsystem;
pub mod markov;
pub mod pixel;
pub mod stochastic;
pub mod text;
pub mod walk;

pub use brownian::Brownian;
pub use cellular::CellularAutomaton;
pub use chords::{ChordProgression, ChordType};
pub use color::ColorHarmony;
pub use genetic::GeneticMelody;
pub use image::ImageSpectrum;
pub use lsystem::LSystem;
pub use markov::MarkovMelody;
pub use pixel::PixelRhythm;
pub use stochastic::{StochasticSequencer, StepTrigger};
pub use text::TextMelody;
pub use walk::RandomWalk;
