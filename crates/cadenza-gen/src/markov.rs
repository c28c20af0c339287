//! Markov chain melody generator.
//!
//! A 12-state chain over pitch classes. The default transition matrix
//! favours small intervals inside the major scale: each row weights the
//! in-scale targets by `exp(-interval · 0.3)` and normalizes. A
//! temperature parameter reshapes the distribution at sampling time —
//! low temperatures lock onto the likeliest steps, high temperatures
//! flatten toward a uniform wander.

use cadenza_core::Xorshift32;
use libm::{expf, powf};

/// Major-scale membership mask over the twelve pitch classes.
const MAJOR_SCALE_MASK: [f32; 12] = [
    1.0, 0.0, 1.0, 0.0, 1.0, 1.0, 0.0, 1.0, 0.0, 1.0, 0.0, 1.0,
];

/// Pitch-class transition chain.
///
/// ## Parameters
///
/// - `rest_prob`: chance a step yields a rest, default 0.05
/// - `octave_jump_prob`: chance the octave shifts ±1 first, default 0.1
/// - `temperature`: distribution shaping, clamped to [0.01, 10], default
///   0.5
/// - `octave`: current octave, clamped to [2, 6], default 4
///
/// # Example
///
/// ```rust
/// use cadenza_gen::MarkovMelody;
///
/// let mut markov = MarkovMelody::new(42);
/// match markov.next_note() {
///     -1 => { /* rest */ }
///     note => assert!((0..=127).contains(&note)),
/// }
/// ```
#[derive(Debug, Clone)]
pub struct MarkovMelody {
    transitions: [[f32; 12]; 12],
    current_state: usize,
    octave: i32,
    rest_prob: f32,
    octave_jump_prob: f32,
    temperature: f32,
    rng: Xorshift32,
}

impl MarkovMelody {
    /// Create a generator seeded with `seed`, with the major-scale
    /// default transition matrix.
    pub fn new(seed: u32) -> Self {
        let mut transitions = [[0.0f32; 12]; 12];
        for (from, row) in transitions.iter_mut().enumerate() {
            let mut sum = 0.0;
            for (to, p) in row.iter_mut().enumerate() {
                let interval = (to + 12 - from) % 12;
                *p = MAJOR_SCALE_MASK[to] * expf(-(interval as f32) * 0.3);
                sum += *p;
            }
            for p in row.iter_mut() {
                *p /= sum;
            }
        }

        Self {
            transitions,
            current_state: 0,
            octave: 4,
            rest_prob: 0.05,
            octave_jump_prob: 0.1,
            temperature: 0.5,
            rng: Xorshift32::new(seed),
        }
    }

    /// Set the rest probability, clamped to [0, 1].
    pub fn set_rest_prob(&mut self, p: f32) {
        self.rest_prob = p.clamp(0.0, 1.0);
    }

    /// Set the octave-jump probability, clamped to [0, 1].
    pub fn set_octave_jump_prob(&mut self, p: f32) {
        self.octave_jump_prob = p.clamp(0.0, 1.0);
    }

    /// Set the sampling temperature, clamped to [0.01, 10].
    pub fn set_temperature(&mut self, t: f32) {
        self.temperature = t.clamp(0.01, 10.0);
    }

    /// Set the current octave, clamped to [2, 6].
    pub fn set_octave(&mut self, octave: i32) {
        self.octave = octave.clamp(2, 6);
    }

    /// Current octave.
    pub fn octave(&self) -> i32 {
        self.octave
    }

    /// Overwrite one transition row (renormalized).
    pub fn set_transition_row(&mut self, from: usize, row: [f32; 12]) {
        if from >= 12 {
            return;
        }
        let sum: f32 = row.iter().map(|p| p.max(0.0)).sum();
        if sum <= 0.0 {
            return;
        }
        for (dst, src) in self.transitions[from].iter_mut().zip(row.iter()) {
            *dst = src.max(0.0) / sum;
        }
    }

    /// Sample the next note.
    ///
    /// Returns −1 for a rest, otherwise `octave · 12 + pitch_class`.
    pub fn next_note(&mut self) -> i32 {
        if self.rng.next_f32() < self.rest_prob {
            return -1;
        }

        if self.rng.next_f32() < self.octave_jump_prob {
            self.octave += if self.rng.next_f32() < 0.5 { -1 } else { 1 };
            self.octave = self.octave.clamp(2, 6);
        }

        let r = self.rng.next_f32();

        // Temperature-shaped resampling of the current row.
        let mut probs = [0.0f32; 12];
        let mut sum = 0.0;
        for (i, p) in probs.iter_mut().enumerate() {
            *p = powf(self.transitions[self.current_state][i], 1.0 / self.temperature);
            sum += *p;
        }

        let mut cumulative = 0.0;
        for (i, &p) in probs.iter().enumerate() {
            cumulative += p / sum;
            if r < cumulative {
                self.current_state = i;
                return self.octave * 12 + i as i32;
            }
        }

        self.octave * 12 + self.current_state as i32
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn transition_rows_are_normalized() {
        let markov = MarkovMelody::new(1);
        for row in &markov.transitions {
            let sum: f32 = row.iter().sum();
            assert!((sum - 1.0).abs() < 1e-5, "row sum {sum}");
        }
    }

    #[test]
    fn out_of_scale_targets_have_zero_probability() {
        let markov = MarkovMelody::new(1);
        for row in &markov.transitions {
            for (to, &p) in row.iter().enumerate() {
                if MAJOR_SCALE_MASK[to] == 0.0 {
                    assert_eq!(p, 0.0, "non-scale pitch class {to} reachable");
                }
            }
        }
    }

    #[test]
    fn same_seed_same_sequence() {
        let mut a = MarkovMelody::new(42);
        let mut b = MarkovMelody::new(42);
        a.set_temperature(0.5);
        b.set_temperature(0.5);
        for _ in 0..64 {
            assert_eq!(a.next_note(), b.next_note());
        }
    }

    #[test]
    fn notes_stay_in_octave_range() {
        let mut markov = MarkovMelody::new(7);
        markov.set_octave_jump_prob(0.5);
        for _ in 0..1000 {
            let note = markov.next_note();
            if note >= 0 {
                let octave = note / 12;
                assert!((2..=6).contains(&octave), "octave {octave}");
                assert!((0..=127).contains(&note));
            }
        }
    }

    #[test]
    fn rest_probability_one_always_rests() {
        let mut markov = MarkovMelody::new(3);
        markov.set_rest_prob(1.0);
        for _ in 0..100 {
            assert_eq!(markov.next_note(), -1);
        }
    }

    #[test]
    fn sampled_notes_stay_in_scale() {
        let mut markov = MarkovMelody::new(11);
        markov.set_rest_prob(0.0);
        for _ in 0..500 {
            let note = markov.next_note();
            let pc = (note % 12) as usize;
            assert!(
                MAJOR_SCALE_MASK[pc] > 0.0,
                "note {note} left the major scale"
            );
        }
    }

    #[test]
    fn low_temperature_prefers_small_intervals() {
        let mut cold = MarkovMelody::new(5);
        cold.set_temperature(0.1);
        cold.set_rest_prob(0.0);
        cold.set_octave_jump_prob(0.0);

        let mut hot = MarkovMelody::new(5);
        hot.set_temperature(10.0);
        hot.set_rest_prob(0.0);
        hot.set_octave_jump_prob(0.0);

        let spread = |m: &mut MarkovMelody| {
            let mut prev = m.next_note();
            let mut total = 0i32;
            for _ in 0..500 {
                let n = m.next_note();
                total += (n - prev).abs();
                prev = n;
            }
            total
        };
        assert!(spread(&mut cold) < spread(&mut hot));
    }
}
