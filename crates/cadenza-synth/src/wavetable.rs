//! Wavetable oscillator with band-limited default tables.
//!
//! Holds up to 16 tables of 2048 samples and interpolates bilinearly: once
//! between the two tables adjacent to the continuous table-position
//! parameter, and once between the two samples adjacent to the phase
//! within each table. This is the band-limited oscillator path; the
//! default tables are additive builds truncated at the 16th harmonic.

use core::f32::consts::TAU;
use core::fmt;

use libm::sinf;

use cadenza_core::lerp;

/// Samples per table.
pub const TABLE_SIZE: usize = 2048;

/// Maximum number of tables.
pub const MAX_TABLES: usize = 16;

/// Error returned when loading into a table slot past [`MAX_TABLES`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TableSlotOutOfRange(pub usize);

impl fmt::Display for TableSlotOutOfRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "table slot {} out of range (max {MAX_TABLES})", self.0)
    }
}

impl std::error::Error for TableSlotOutOfRange {}

/// Multi-table interpolating oscillator.
///
/// ## Parameters
///
/// - `frequency`: Hz
/// - `table_position`: continuous index into the table set, clamped to
///   [0, num_tables − 1]
///
/// Default tables: 0 = sine, 1 = saw (16 harmonics, 1/n), 2 = square
/// (odd harmonics, 1/n), 3 = triangle (odd harmonics, 1/n², alternating
/// sign).
///
/// # Example
///
/// ```rust
/// use cadenza_synth::WavetableOscillator;
///
/// let mut osc = WavetableOscillator::new(48000.0);
/// osc.set_frequency(220.0);
/// osc.set_position(0.5); // halfway between sine and saw
/// let sample = osc.process();
/// ```
pub struct WavetableOscillator {
    tables: Vec<[f32; TABLE_SIZE]>,
    phase: f32,
    phase_increment: f32,
    sample_rate: f32,
    frequency: f32,
    table_position: f32,
}

impl WavetableOscillator {
    /// Create an oscillator with the four default band-limited tables.
    pub fn new(sample_rate: f32) -> Self {
        let mut osc = Self {
            tables: Vec::with_capacity(MAX_TABLES),
            phase: 0.0,
            phase_increment: 440.0 / sample_rate,
            sample_rate,
            frequency: 440.0,
            table_position: 0.0,
        };
        osc.build_default_tables();
        osc
    }

    /// Populate tables 0-3 with the default sine / saw / square / triangle
    /// set, each band-limited to 16 harmonics.
    fn build_default_tables(&mut self) {
        self.tables.clear();

        let mut sine = [0.0f32; TABLE_SIZE];
        for (i, s) in sine.iter_mut().enumerate() {
            let phase = i as f32 / TABLE_SIZE as f32;
            *s = sinf(phase * TAU);
        }
        self.tables.push(sine);

        let mut saw = [0.0f32; TABLE_SIZE];
        for (i, s) in saw.iter_mut().enumerate() {
            let phase = i as f32 / TABLE_SIZE as f32;
            let mut acc = 0.0;
            for h in 1..=16 {
                acc += (1.0 / h as f32) * sinf(h as f32 * phase * TAU);
            }
            *s = acc * 0.5;
        }
        self.tables.push(saw);

        let mut square = [0.0f32; TABLE_SIZE];
        for (i, s) in square.iter_mut().enumerate() {
            let phase = i as f32 / TABLE_SIZE as f32;
            let mut acc = 0.0;
            let mut h = 1;
            while h <= 16 {
                acc += (1.0 / h as f32) * sinf(h as f32 * phase * TAU);
                h += 2;
            }
            *s = acc * 0.8;
        }
        self.tables.push(square);

        let mut triangle = [0.0f32; TABLE_SIZE];
        for (i, s) in triangle.iter_mut().enumerate() {
            let phase = i as f32 / TABLE_SIZE as f32;
            let mut acc = 0.0;
            let mut h = 1i32;
            while h <= 16 {
                let sign = if ((h - 1) / 2) % 2 == 1 { -1.0 } else { 1.0 };
                acc += (1.0 / (h * h) as f32) * sinf(h as f32 * phase * TAU) * sign;
                h += 2;
            }
            *s = acc * 0.8;
        }
        self.tables.push(triangle);
    }

    /// Load a custom table into `slot`, replacing or appending.
    ///
    /// `data` shorter than [`TABLE_SIZE`] is zero-padded; longer is
    /// truncated. Slots past [`MAX_TABLES`] are rejected, and a slot more
    /// than one past the current table count is rejected too (tables stay
    /// contiguous).
    pub fn load_table(&mut self, slot: usize, data: &[f32]) -> Result<(), TableSlotOutOfRange> {
        if slot >= MAX_TABLES || slot > self.tables.len() {
            return Err(TableSlotOutOfRange(slot));
        }
        let mut table = [0.0f32; TABLE_SIZE];
        for (dst, src) in table.iter_mut().zip(data.iter()) {
            *dst = *src;
        }
        if slot == self.tables.len() {
            self.tables.push(table);
        } else {
            self.tables[slot] = table;
        }
        Ok(())
    }

    /// Number of tables currently loaded.
    pub fn num_tables(&self) -> usize {
        self.tables.len()
    }

    /// Set frequency in Hz.
    pub fn set_frequency(&mut self, freq: f32) {
        self.frequency = freq.max(0.0);
        self.phase_increment = self.frequency / self.sample_rate;
    }

    /// Set the continuous table position, clamped to the loaded range.
    pub fn set_position(&mut self, position: f32) {
        self.table_position = position.clamp(0.0, (self.tables.len() - 1) as f32);
    }

    /// Current table position.
    pub fn position(&self) -> f32 {
        self.table_position
    }

    /// Update the sample rate.
    pub fn set_sample_rate(&mut self, sample_rate: f32) {
        self.sample_rate = sample_rate;
        self.phase_increment = self.frequency / self.sample_rate;
    }

    /// Rewind the phase.
    pub fn reset(&mut self) {
        self.phase = 0.0;
    }

    /// Generate the next sample with bilinear interpolation.
    #[inline]
    pub fn process(&mut self) -> f32 {
        let table_a = self.table_position as usize;
        let table_b = (table_a + 1).min(self.tables.len() - 1);
        let table_frac = self.table_position - table_a as f32;

        let index = self.phase * TABLE_SIZE as f32;
        let idx_a = index as usize % TABLE_SIZE;
        let idx_b = (idx_a + 1) % TABLE_SIZE;
        let frac = index - (index as usize) as f32;

        let val_a = lerp(self.tables[table_a][idx_a], self.tables[table_a][idx_b], frac);
        let val_b = lerp(self.tables[table_b][idx_a], self.tables[table_b][idx_b], frac);
        let out = lerp(val_a, val_b, table_frac);

        self.phase += self.phase_increment;
        if self.phase >= 1.0 {
            self.phase -= 1.0;
        }

        out
    }
}
