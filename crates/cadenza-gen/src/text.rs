//! Text-to-melody mapping.
//!
//! Each character's code point picks a scale degree (`code % scale_len`)
//! and an octave offset (`(code / scale_len) % 3 − 1` around the base),
//! so any string becomes a melody that is stable under repetition —
//! the same text always sings the same line. A raw mode maps code
//! points straight onto a four-octave chromatic span instead.

/// Maximum scale length.
pub const MAX_SCALE: usize = 12;

/// Character-driven melody source.
///
/// ## Parameters
///
/// - `scale`: degree table, default major
/// - `octave_base`: centre octave, default 4
/// - `raw_mode`: chromatic mapping `36 + code % 48` instead of the scale
///
/// # Example
///
/// ```rust
/// use cadenza_gen::TextMelody;
///
/// let mut text = TextMelody::new("hello world");
/// let note = text.next_note();
/// assert!((0..=127).contains(&note));
/// ```
#[derive(Debug, Clone)]
pub struct TextMelody {
    chars: Vec<u32>,
    position: usize,
    scale: [i32; MAX_SCALE],
    scale_len: usize,
    octave_base: i32,
    raw_mode: bool,
}

/// Major scale degrees.
const MAJOR_SCALE: [i32; 7] = [0, 2, 4, 5, 7, 9, 11];

impl TextMelody {
    /// Create a melody source over `text` (empty text yields rests of
    /// note 0 — callers normally check `is_empty` first).
    pub fn new(text: &str) -> Self {
        let mut scale = [0i32; MAX_SCALE];
        scale[..MAJOR_SCALE.len()].copy_from_slice(&MAJOR_SCALE);

        Self {
            chars: text.chars().map(|c| c as u32).collect(),
            position: 0,
            scale,
            scale_len: MAJOR_SCALE.len(),
            octave_base: 4,
            raw_mode: false,
        }
    }

    /// Replace the scale (truncated to 12 degrees; empty input ignored).
    pub fn set_scale(&mut self, degrees: &[i32]) {
        if degrees.is_empty() {
            return;
        }
        self.scale_len = degrees.len().min(MAX_SCALE);
        self.scale[..self.scale_len].copy_from_slice(&degrees[..self.scale_len]);
    }

    /// Set the base octave, clamped to [0, 8].
    pub fn set_octave_base(&mut self, octave: i32) {
        self.octave_base = octave.clamp(0, 8);
    }

    /// Toggle raw chromatic mapping.
    pub fn set_raw_mode(&mut self, raw: bool) {
        self.raw_mode = raw;
    }

    /// Whether the source text was empty.
    pub fn is_empty(&self) -> bool {
        self.chars.is_empty()
    }

    /// Rewind to the first character.
    pub fn reset(&mut self) {
        self.position = 0;
    }

    /// Map the next character to a note; the position wraps at the end
    /// of the text.
    pub fn next_note(&mut self) -> i32 {
        if self.chars.is_empty() {
            return 0;
        }
        if self.position >= self.chars.len() {
            self.position = 0;
        }

        let code = self.chars[self.position] as i32;
        self.position += 1;

        let note = if self.raw_mode {
            36 + code.rem_euclid(48)
        } else {
            let degree = code.rem_euclid(self.scale_len as i32) as usize;
            let octave = self.octave_base + (code / self.scale_len as i32).rem_euclid(3) - 1;
            octave * 12 + self.scale[degree]
        };

        note.clamp(0, 127)
    }

    /// Collect the whole text as one melody (at most `max` notes),
    /// starting from the beginning.
    pub fn to_melody(&mut self, max: usize) -> Vec<i32> {
        self.reset();
        let count = self.chars.len().min(max);
        (0..count).map(|_| self.next_note()).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn same_text_same_melody() {
        let mut a = TextMelody::new("compose me");
        let mut b = TextMelody::new("compose me");
        assert_eq!(a.to_melody(64), b.to_melody(64));
    }

    #[test]
    fn position_wraps() {
        let mut text = TextMelody::new("ab");
        let first = text.next_note();
        let _ = text.next_note();
        let third = text.next_note();
        assert_eq!(first, third);
    }

    #[test]
    fn known_character_mapping() {
        // 'a' = 97: degree 97 % 7 = 6 → scale[6] = 11;
        // octave = 4 + (97/7) % 3 − 1 = 4 + 13 % 3 − 1 = 4 + 1 − 1 = 4.
        let mut text = TextMelody::new("a");
        assert_eq!(text.next_note(), 4 * 12 + 11);
    }

    #[test]
    fn raw_mode_spans_four_octaves() {
        let all: String = (33u8..127).map(|b| b as char).collect();
        let mut text = TextMelody::new(&all);
        text.set_raw_mode(true);
        let melody = text.to_melody(256);
        assert!(melody.iter().all(|&n| (36..36 + 48).contains(&n)));
    }

    #[test]
    fn notes_follow_configured_scale() {
        let mut text = TextMelody::new("the quick brown fox");
        text.set_scale(&[0, 3, 7]);
        for note in text.to_melody(64) {
            let degree = note.rem_euclid(12);
            assert!([0, 3, 7].contains(&degree), "degree {degree}");
        }
    }

    #[test]
    fn empty_text_is_flagged() {
        let text = TextMelody::new("");
        assert!(text.is_empty());
    }
}
