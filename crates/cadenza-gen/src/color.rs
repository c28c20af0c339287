//! Color-to-harmony mapping.
//!
//! RGB converts to hue/saturation/brightness; hue picks the root pitch
//! class (30° per semitone), brightness decides major versus minor, and
//! saturation stacks extensions — past 0.5 a seventh, past 0.75 a ninth.
//! Warm saturated colors come out as rich dominants, washed-out pastels
//! as plain triads.

/// HSB triple derived from RGB.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Hsb {
    /// Hue in degrees [0, 360).
    pub hue: f32,
    /// Saturation in [0, 1].
    pub saturation: f32,
    /// Brightness in [0, 1].
    pub brightness: f32,
}

/// Convert 8-bit RGB to HSB.
pub fn rgb_to_hsb(r: u8, g: u8, b: u8) -> Hsb {
    let rf = r as f32 / 255.0;
    let gf = g as f32 / 255.0;
    let bf = b as f32 / 255.0;

    let max = rf.max(gf).max(bf);
    let min = rf.min(gf).min(bf);
    let delta = max - min;

    let brightness = max;
    let saturation = if max > 0.0 { delta / max } else { 0.0 };

    let mut hue = if delta == 0.0 {
        0.0
    } else if max == rf {
        60.0 * (((gf - bf) / delta) % 6.0)
    } else if max == gf {
        60.0 * ((bf - rf) / delta + 2.0)
    } else {
        60.0 * ((rf - gf) / delta + 4.0)
    };
    if hue < 0.0 {
        hue += 360.0;
    }

    Hsb {
        hue,
        saturation,
        brightness,
    }
}

/// A chord derived from a color.
#[derive(Debug, Clone, PartialEq)]
pub struct ColorHarmony {
    /// The HSB the chord was derived from.
    pub hsb: Hsb,
    /// MIDI root note.
    pub root: i32,
    /// Chord tones as MIDI notes (3 to 5 of them).
    pub notes: Vec<i32>,
}

impl ColorHarmony {
    /// Derive a chord from an RGB color in the given octave.
    ///
    /// - root = `hue / 30° + octave · 12`
    /// - brightness > 0.5 → major third, else minor
    /// - saturation > 0.5 → add the seventh (major or minor to match)
    /// - saturation > 0.75 → add the ninth
    pub fn from_rgb(r: u8, g: u8, b: u8, octave: i32) -> Self {
        let hsb = rgb_to_hsb(r, g, b);
        let octave = octave.clamp(0, 8);
        let root = (hsb.hue / 30.0) as i32 + octave * 12;

        let major = hsb.brightness > 0.5;
        let mut notes = vec![root, root + if major { 4 } else { 3 }, root + 7];

        if hsb.saturation > 0.5 {
            notes.push(root + if major { 11 } else { 10 });
        }
        if hsb.saturation > 0.75 {
            notes.push(root + 14);
        }

        Self { hsb, root, notes }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn primary_colors_have_expected_hues() {
        assert_eq!(rgb_to_hsb(255, 0, 0).hue, 0.0);
        assert_eq!(rgb_to_hsb(0, 255, 0).hue, 120.0);
        assert_eq!(rgb_to_hsb(0, 0, 255).hue, 240.0);
    }

    #[test]
    fn gray_has_zero_saturation() {
        let hsb = rgb_to_hsb(128, 128, 128);
        assert_eq!(hsb.saturation, 0.0);
        assert_eq!(hsb.hue, 0.0);
    }

    #[test]
    fn bright_red_is_a_major_chord_with_extensions() {
        // Pure red: hue 0, saturation 1, brightness 1.
        let harmony = ColorHarmony::from_rgb(255, 0, 0, 4);
        assert_eq!(harmony.root, 48);
        // Major triad + major 7th + 9th.
        assert_eq!(harmony.notes, vec![48, 52, 55, 59, 62]);
    }

    #[test]
    fn dark_color_yields_minor() {
        // Dark desaturated blue-ish gray: brightness below 0.5.
        let harmony = ColorHarmony::from_rgb(40, 40, 60, 4);
        let third = harmony.notes[1] - harmony.root;
        assert_eq!(third, 3, "dark colors should be minor");
    }

    #[test]
    fn pastel_color_is_a_plain_triad() {
        // Washed-out pink: high brightness, low saturation.
        let harmony = ColorHarmony::from_rgb(255, 220, 225, 4);
        assert_eq!(harmony.notes.len(), 3);
    }

    #[test]
    fn moderately_saturated_gets_a_seventh() {
        // Saturation between 0.5 and 0.75.
        let harmony = ColorHarmony::from_rgb(255, 100, 100, 4);
        let hsb = harmony.hsb;
        assert!(hsb.saturation > 0.5 && hsb.saturation <= 0.75);
        assert_eq!(harmony.notes.len(), 4);
        assert_eq!(harmony.notes[3] - harmony.root, 11);
    }

    #[test]
    fn hue_wheel_spans_all_pitch_classes() {
        let mut seen = [false; 12];
        for hue_step in 0..12 {
            // Walk the hue circle via HSB-ish pure colors.
            let angle = hue_step as f32 * 30.0 + 15.0;
            let (r, g, b) = hue_to_rgb_for_test(angle);
            let harmony = ColorHarmony::from_rgb(r, g, b, 0);
            seen[(harmony.root % 12) as usize] = true;
        }
        assert!(seen.iter().filter(|&&s| s).count() >= 10);
    }

    fn hue_to_rgb_for_test(h: f32) -> (u8, u8, u8) {
        let c = 255.0;
        let x = c * (1.0 - ((h / 60.0) % 2.0 - 1.0).abs());
        let (r, g, b) = match (h / 60.0) as u32 {
            0 => (c, x, 0.0),
            1 => (x, c, 0.0),
            2 => (0.0, c, x),
            3 => (0.0, x, c),
            4 => (x, 0.0, c),
            _ => (c, 0.0, x),
        };
        (r as u8, g as u8, b as u8)
    }
}
