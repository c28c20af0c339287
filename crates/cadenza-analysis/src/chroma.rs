//! Chromasynesthesia: deterministic pitch-to-color mapping.
//!
//! Each pitch class owns a 30° slice of the hue wheel starting at C =
//! red; octaves control brightness, so the same chord always paints the
//! same colors and higher registers glow brighter. Saturation is pinned
//! at 0.8 — full saturation reads as neon, desaturated reads as mud.

use libm::{fabsf, fmodf, roundf};

/// 8-bit sRGB color.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Rgb {
    /// Red channel.
    pub r: u8,
    /// Green channel.
    pub g: u8,
    /// Blue channel.
    pub b: u8,
}

/// Hue per pitch class, C = 0° (red) ascending 30° per semitone.
const HUE_PER_CLASS: f32 = 30.0;

/// Fixed mapping saturation.
const SATURATION: f32 = 0.8;

/// Convert HSB (hue in degrees, s/b in [0, 1]) to 8-bit RGB.
pub fn hsb_to_rgb(hue: f32, saturation: f32, brightness: f32) -> Rgb {
    let mut h = fmodf(hue, 360.0);
    if h < 0.0 {
        h += 360.0;
    }

    let c = brightness * saturation;
    let x = c * (1.0 - fabsf(fmodf(h / 60.0, 2.0) - 1.0));
    let m = brightness - c;

    let (rf, gf, bf) = if h < 60.0 {
        (c, x, 0.0)
    } else if h < 120.0 {
        (x, c, 0.0)
    } else if h < 180.0 {
        (0.0, c, x)
    } else if h < 240.0 {
        (0.0, x, c)
    } else if h < 300.0 {
        (x, 0.0, c)
    } else {
        (c, 0.0, x)
    };

    Rgb {
        r: ((rf + m) * 255.0) as u8,
        g: ((gf + m) * 255.0) as u8,
        b: ((bf + m) * 255.0) as u8,
    }
}

/// Map a MIDI note to its synesthetic color.
///
/// Hue is `pitch_class · 30°`, saturation 0.8, brightness
/// `clamp(0.3 + octave/10 · 0.7, 0, 1)`.
///
/// # Example
///
/// ```rust
/// use cadenza_analysis::note_to_color;
///
/// let c4 = note_to_color(60);
/// // Middle C is dominantly red.
/// assert!(c4.r > c4.g && c4.r > c4.b);
/// ```
pub fn note_to_color(midi_note: i32) -> Rgb {
    let note = midi_note.clamp(0, 127);
    let pitch_class = note.rem_euclid(12);
    let octave = note.div_euclid(12);

    let hue = pitch_class as f32 * HUE_PER_CLASS;
    let brightness = (0.3 + octave as f32 / 10.0 * 0.7).clamp(0.0, 1.0);

    hsb_to_rgb(hue, SATURATION, brightness)
}

/// Map a frequency in Hz to the color of its nearest MIDI note.
pub fn frequency_to_color(freq: f32) -> Rgb {
    if freq <= 0.0 {
        return Rgb { r: 0, g: 0, b: 0 };
    }
    let midi = 69.0 + 12.0 * libm::log2f(freq / 440.0);
    note_to_color(roundf(midi) as i32)
}
