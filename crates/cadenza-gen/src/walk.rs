//! Scale-quantized random walk over MIDI notes.
//!
//! Steps by a bounded random interval, clamps to a note range, and
//! optionally snaps each emitted note to the nearest degree of a scale
//! (pentatonic by default, which makes even a drunken walk sound
//! intentional).

use cadenza_core::Xorshift32;

/// Maximum scale length.
pub const MAX_SCALE: usize = 12;

/// Bounded, optionally quantized note walker.
///
/// ## Parameters
///
/// - `max_step`: largest interval per move, default 5
/// - `step_bias`: [-1, 1] drift, negative falls, positive climbs
/// - `quantize`: snap to the scale, default on
///
/// # Example
///
/// ```rust
/// use cadenza_gen::RandomWalk;
///
/// let mut walk = RandomWalk::new(60, 48, 72, 42);
/// let note = walk.next_note();
/// assert!((48..=72).contains(&note));
/// ```
#[derive(Debug, Clone)]
pub struct RandomWalk {
    current: i32,
    min_note: i32,
    max_note: i32,
    max_step: i32,
    step_bias: f32,
    scale: [i32; MAX_SCALE],
    scale_len: usize,
    quantize: bool,
    rng: Xorshift32,
}

/// Default pentatonic scale degrees.
const PENTATONIC: [i32; 5] = [0, 2, 4, 7, 9];

impl RandomWalk {
    /// Create a walk starting at `start`, bounded to [min, max].
    pub fn new(start: i32, min: i32, max: i32, seed: u32) -> Self {
        let (min, max) = if min <= max { (min, max) } else { (max, min) };
        let mut scale = [0i32; MAX_SCALE];
        scale[..PENTATONIC.len()].copy_from_slice(&PENTATONIC);

        Self {
            current: start.clamp(min, max),
            min_note: min,
            max_note: max,
            max_step: 5,
            step_bias: 0.0,
            scale,
            scale_len: PENTATONIC.len(),
            quantize: true,
            rng: Xorshift32::new(seed),
        }
    }

    /// Set the maximum step interval (≥ 1).
    pub fn set_max_step(&mut self, step: i32) {
        self.max_step = step.max(1);
    }

    /// Set the directional bias, clamped to [-1, 1].
    pub fn set_step_bias(&mut self, bias: f32) {
        self.step_bias = bias.clamp(-1.0, 1.0);
    }

    /// Replace the quantization scale (truncated to 12 degrees).
    pub fn set_scale(&mut self, degrees: &[i32]) {
        self.scale_len = degrees.len().min(MAX_SCALE);
        self.scale[..self.scale_len].copy_from_slice(&degrees[..self.scale_len]);
    }

    /// Enable or disable scale quantization.
    pub fn set_quantize(&mut self, on: bool) {
        self.quantize = on;
    }

    /// Snap a note to the nearest degree of the scale.
    fn quantize_note(&self, note: i32) -> i32 {
        let octave = note.div_euclid(12);
        let degree = note.rem_euclid(12);

        let mut closest = self.scale[0];
        let mut best = 12;
        for &s in &self.scale[..self.scale_len] {
            let dist = (s - degree).abs();
            if dist < best {
                best = dist;
                closest = s;
            }
        }

        octave * 12 + closest
    }

    /// Take one step and return the (possibly quantized) note.
    pub fn next_note(&mut self) -> i32 {
        let r = self.rng.next_f32();
        let step = ((r - 0.5 + self.step_bias * 0.5) * 2.0 * self.max_step as f32) as i32;

        self.current = (self.current + step).clamp(self.min_note, self.max_note);

        if self.quantize && self.scale_len > 0 {
            self.quantize_note(self.current)
        } else {
            self.current
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn stays_in_range() {
        let mut walk = RandomWalk::new(60, 48, 72, 3);
        walk.set_quantize(false);
        for _ in 0..10_000 {
            let note = walk.next_note();
            assert!((48..=72).contains(&note));
        }
    }

    #[test]
    fn quantized_notes_land_on_scale() {
        let mut walk = RandomWalk::new(60, 36, 84, 4);
        for _ in 0..1000 {
            let note = walk.next_note();
            let degree = note.rem_euclid(12);
            assert!(
                PENTATONIC.contains(&degree),
                "note {note} (degree {degree}) off scale"
            );
        }
    }

    #[test]
    fn positive_bias_climbs() {
        let mut walk = RandomWalk::new(60, 0, 127, 8);
        walk.set_step_bias(1.0);
        walk.set_quantize(false);
        let mut last = 60;
        for _ in 0..100 {
            last = walk.next_note();
        }
        assert!(last > 100, "biased walk should climb, ended at {last}");
    }

    #[test]
    fn custom_scale_is_respected() {
        let mut walk = RandomWalk::new(60, 40, 80, 5);
        walk.set_scale(&[0, 6]); // tritone ladder
        for _ in 0..500 {
            let degree = walk.next_note().rem_euclid(12);
            assert!(degree == 0 || degree == 6);
        }
    }

    #[test]
    fn deterministic_per_seed() {
        let mut a = RandomWalk::new(60, 48, 72, 11);
        let mut b = RandomWalk::new(60, 48, 72, 11);
        for _ in 0..500 {
            assert_eq!(a.next_note(), b.next_note());
        }
    }
}
