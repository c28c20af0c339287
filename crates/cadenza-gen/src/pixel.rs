//! Pixel rhythm: a luminance grid as a step sequencer.
//!
//! Columns are time steps, rows are rhythm lanes. A cell fires its lane
//! when the normalized luminance clears the threshold, with the
//! luminance itself becoming the hit velocity — brighter pixels hit
//! harder. The core accepts raw luminance bytes; decoding images into
//! them is someone else's job.

/// Luminance-grid step sequencer.
///
/// # Example
///
/// ```rust
/// use cadenza_gen::PixelRhythm;
///
/// let mut rhythm = PixelRhythm::new(8, 4);
/// let pattern = vec![200u8; 8 * 4];
/// rhythm.load(&pattern).unwrap();
/// rhythm.advance();
/// assert!(rhythm.trigger(0).is_some());
/// ```
#[derive(Debug, Clone)]
pub struct PixelRhythm {
    pattern: Vec<u8>,
    width: usize,
    height: usize,
    current_step: usize,
    threshold: f32,
}

impl PixelRhythm {
    /// Create an empty (all-dark) grid of `width` steps × `height` lanes.
    /// Zero dimensions are bumped to 1.
    pub fn new(width: usize, height: usize) -> Self {
        let width = width.max(1);
        let height = height.max(1);
        Self {
            pattern: vec![0; width * height],
            width,
            height,
            current_step: 0,
            threshold: 0.5,
        }
    }

    /// Load a row-major luminance rectangle. The slice length must be
    /// exactly `width × height`.
    pub fn load(&mut self, luminance: &[u8]) -> Result<(), usize> {
        if luminance.len() != self.width * self.height {
            return Err(luminance.len());
        }
        self.pattern.copy_from_slice(luminance);
        Ok(())
    }

    /// Grid width (steps per loop).
    pub fn width(&self) -> usize {
        self.width
    }

    /// Grid height (number of lanes).
    pub fn height(&self) -> usize {
        self.height
    }

    /// Set the trigger threshold, clamped to [0, 1].
    pub fn set_threshold(&mut self, threshold: f32) {
        self.threshold = threshold.clamp(0.0, 1.0);
    }

    /// The column the triggers currently read from.
    pub fn current_step(&self) -> usize {
        self.current_step
    }

    /// Move to the next column, wrapping at the end of the grid.
    pub fn advance(&mut self) {
        self.current_step = (self.current_step + 1) % self.width;
    }

    /// Rewind to the first column.
    pub fn reset(&mut self) {
        self.current_step = 0;
    }

    /// Whether lane `row` fires at the current column, and at what
    /// velocity. `None` when below the threshold or out of range.
    pub fn trigger(&self, row: usize) -> Option<f32> {
        if row >= self.height {
            return None;
        }
        let value = self.pattern[row * self.width + self.current_step];
        let normalized = value as f32 / 255.0;
        (normalized > self.threshold).then_some(normalized)
    }
}
