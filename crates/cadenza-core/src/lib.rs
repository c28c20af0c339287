//! Cadenza Core - DSP primitives for the workstation engine
//!
//! This crate provides the foundational building blocks shared by the
//! synthesis, effect, generator, and engine crates:
//!
//! - [`Effect`] trait for per-sample and block processing
//! - [`StateVariableFilter`] zero-delay-feedback multi-mode filter
//! - [`DelayLine`] circular buffer for time-based effects
//! - [`CombFilter`] and [`AllpassFilter`] reverb building blocks
//! - [`Xorshift32`] deterministic seedable RNG
//! - Math helpers: [`soft_clip`], [`db_to_linear`], [`lerp`], …
//!
//! ## no_std Support
//!
//! The crate is `no_std` compatible with `default-features = false`;
//! scalar float math goes through `libm`.

#![cfg_attr(not(feature = "std"), no_std)]

#[cfg(not(feature = "std"))]
extern crate alloc;

pub mod allpass;
pub mod comb;
pub mod delay;
pub mod effect;
pub mod math;
pub mod rng;
pub mod svf;

pub use allpass::AllpassFilter;
pub use comb::CombFilter;
pub use delay::DelayLine;
pub use effect::Effect;
pub use math::{
    db_to_linear, fast_tanh, flush_denormal, lerp, linear_to_db, midi_to_freq, soft_clip,
    wet_dry_mix,
};
pub use rng::Xorshift32;
pub use svf::{FilterMode, StateVariableFilter};
