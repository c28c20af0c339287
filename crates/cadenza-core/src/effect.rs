//! Core Effect trait.
//!
//! Every audio effect in the workstation implements [`Effect`], providing a
//! consistent interface for single-sample and block-based processing. The
//! track and master chains drive effects through the in-place stereo block
//! methods; mono effects only need to implement `process()`.
//!
//! ## Design Decisions
//!
//! - **Stereo-aware**: true stereo effects (reverb, multi-tap delay, chorus)
//!   override `process_stereo()`; mono effects implement `process()` and get
//!   independent per-channel stereo processing for free.
//! - **Object-safe**: `dyn Effect` works for runtime chains, though the
//!   chain in `cadenza-effects` dispatches a closed enum in the hot loop.
//! - **No allocations**: all methods are safe to call from the realtime
//!   audio thread.

/// Core trait for all audio effects.
///
/// # Safety Contract
///
/// Implementors **must** override at least one of `process()` or
/// `process_stereo()`; the default implementations bridge to each other and
/// would otherwise recurse. Mono effects implement `process()`, true stereo
/// effects implement `process_stereo()` and report
/// [`is_true_stereo`](Effect::is_true_stereo).
pub trait Effect {
    /// Process a single mono sample.
    ///
    /// The default derives mono output from `process_stereo(input, input)`
    /// by taking the left channel.
    fn process(&mut self, input: f32) -> f32 {
        self.process_stereo(input, input).0
    }

    /// Process a stereo sample pair.
    ///
    /// The default processes each channel independently through
    /// `process()`, which is correct for mono effects.
    fn process_stereo(&mut self, left: f32, right: f32) -> (f32, f32) {
        (self.process(left), self.process(right))
    }

    /// Process a stereo block in place.
    ///
    /// The caller owns both buffers; the effect borrows them mutably for
    /// the duration of the call. Buffers must have equal length.
    fn process_block_stereo_inplace(&mut self, left: &mut [f32], right: &mut [f32]) {
        debug_assert_eq!(
            left.len(),
            right.len(),
            "left and right buffers must have the same length"
        );
        for i in 0..left.len() {
            let (l, r) = self.process_stereo(left[i], right[i]);
            left[i] = l;
            right[i] = r;
        }
    }

    /// Process a mono block in place.
    fn process_block_inplace(&mut self, buffer: &mut [f32]) {
        for sample in buffer.iter_mut() {
            *sample = self.process(*sample);
        }
    }

    /// Returns whether this effect has cross-channel interaction.
    ///
    /// Default is `false` (channels processed independently).
    fn is_true_stereo(&self) -> bool {
        false
    }

    /// Update the sample rate and recalculate dependent coefficients.
    fn set_sample_rate(&mut self, sample_rate: f32);

    /// Clear internal state (delay lines, filter history) without changing
    /// parameters.
    fn reset(&mut self);
}
