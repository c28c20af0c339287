//! Triggered waveform oscilloscope.
//!
//! Two 4096-sample rings (left and right) plus an edge trigger on the
//! left channel: the trigger position latches at the most recent index
//! where the signal crossed the trigger level in the configured
//! direction, so successive display frames line up instead of rolling.

/// Ring size in samples.
pub const SCOPE_BUFFER_SIZE: usize = 4096;

/// Trigger slope.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum TriggerEdge {
    /// Latch where the signal crosses the level going up.
    #[default]
    Rising,
    /// Latch where the signal crosses the level going down.
    Falling,
}

/// Stereo oscilloscope with edge triggering.
///
/// ## Parameters
///
/// - `trigger_level`: crossing level, default 0
/// - `trigger_edge`: rising or falling, default rising
/// - `time_scale`: display zoom ≥ 1, default 1 (whole ring)
///
/// # Example
///
/// ```rust
/// use cadenza_analysis::WaveformScope;
///
/// let mut scope = WaveformScope::new();
/// scope.write(&[0.0, 0.5, 1.0], &[0.0, -0.5, -1.0]);
/// let mut left = [0.0f32; 64];
/// let mut right = [0.0f32; 64];
/// scope.display(&mut left, &mut right);
/// ```
pub struct WaveformScope {
    buffer_l: Box<[f32; SCOPE_BUFFER_SIZE]>,
    buffer_r: Box<[f32; SCOPE_BUFFER_SIZE]>,
    write_pos: usize,
    trigger_pos: usize,
    trigger_level: f32,
    trigger_edge: TriggerEdge,
    time_scale: f32,
}

impl Default for WaveformScope {
    fn default() -> Self {
        Self::new()
    }
}

impl WaveformScope {
    /// Create an empty scope.
    pub fn new() -> Self {
        Self {
            buffer_l: Box::new([0.0; SCOPE_BUFFER_SIZE]),
            buffer_r: Box::new([0.0; SCOPE_BUFFER_SIZE]),
            write_pos: 0,
            trigger_pos: 0,
            trigger_level: 0.0,
            trigger_edge: TriggerEdge::Rising,
            time_scale: 1.0,
        }
    }

    /// Set the trigger level.
    pub fn set_trigger_level(&mut self, level: f32) {
        self.trigger_level = level;
    }

    /// Set the trigger slope.
    pub fn set_trigger_edge(&mut self, edge: TriggerEdge) {
        self.trigger_edge = edge;
    }

    /// Set the display zoom (≥ 1; 2 shows half the ring, etc.).
    pub fn set_time_scale(&mut self, scale: f32) {
        self.time_scale = scale.max(1.0);
    }

    /// Latched trigger index.
    pub fn trigger_pos(&self) -> usize {
        self.trigger_pos
    }

    /// Append a stereo block, updating the trigger position.
    pub fn write(&mut self, left: &[f32], right: &[f32]) {
        debug_assert_eq!(left.len(), right.len());

        for i in 0..left.len() {
            let prev =
                self.buffer_l[(self.write_pos + SCOPE_BUFFER_SIZE - 1) % SCOPE_BUFFER_SIZE];
            let sample = left[i];

            self.buffer_l[self.write_pos] = sample;
            self.buffer_r[self.write_pos] = right[i];

            let crossed = match self.trigger_edge {
                TriggerEdge::Rising => prev < self.trigger_level && sample >= self.trigger_level,
                TriggerEdge::Falling => prev > self.trigger_level && sample <= self.trigger_level,
            };
            if crossed {
                self.trigger_pos = self.write_pos;
            }

            self.write_pos = (self.write_pos + 1) % SCOPE_BUFFER_SIZE;
        }
    }

    /// Fill `out_l` / `out_r` with decimated display points starting at
    /// the trigger position, spanning `SCOPE_BUFFER_SIZE / time_scale`
    /// samples.
    pub fn display(&self, out_l: &mut [f32], out_r: &mut [f32]) {
        debug_assert_eq!(out_l.len(), out_r.len());
        if out_l.is_empty() {
            return;
        }

        let span = SCOPE_BUFFER_SIZE as f32 / self.time_scale;
        let step = span / out_l.len() as f32;

        for i in 0..out_l.len() {
            let idx = (self.trigger_pos + (i as f32 * step) as usize) % SCOPE_BUFFER_SIZE;
            out_l[i] = self.buffer_l[idx];
            out_r[i] = self.buffer_r[idx];
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rising_trigger_latches_on_upward_crossing() {
        let mut scope = WaveformScope::new();
        scope.set_trigger_level(0.5);

        // Below, below, crossing, above.
        scope.write(&[0.0, 0.2, 0.7, 0.9], &[0.0; 4]);
        assert_eq!(scope.trigger_pos(), 2);
    }

    #[test]
    fn falling_trigger_latches_on_downward_crossing() {
        let mut scope = WaveformScope::new();
        scope.set_trigger_level(0.0);
        scope.set_trigger_edge(TriggerEdge::Falling);

        scope.write(&[0.5, 0.3, -0.2, -0.5], &[0.0; 4]);
        assert_eq!(scope.trigger_pos(), 2);
    }

    #[test]
    fn display_starts_at_trigger() {
        let mut scope = WaveformScope::new();
        scope.set_trigger_level(0.5);
        scope.write(&[0.0, 0.9, 0.1, 0.2, 0.3], &[0.0; 5]);
        // Trigger latched at index 1 (0.0 → 0.9 crossing).

        let mut left = [0.0f32; 4];
        let mut right = [0.0f32; 4];
        scope.display(&mut left, &mut right);
        assert_eq!(left[0], 0.9);
    }

    #[test]
    fn display_decimates_across_the_ring() {
        let mut scope = WaveformScope::new();
        // Fill the whole ring with a ramp.
        let ramp: Vec<f32> = (0..SCOPE_BUFFER_SIZE)
            .map(|i| i as f32 / SCOPE_BUFFER_SIZE as f32)
            .collect();
        scope.write(&ramp, &ramp);

        let mut left = [0.0f32; 8];
        let mut right = [0.0f32; 8];
        scope.display(&mut left, &mut right);
        // Points step through the ramp by eighths from the trigger.
        for pair in left.windows(2) {
            let diff = (pair[1] - pair[0] + 1.0) % 1.0;
            assert!((diff - 0.125).abs() < 0.01, "step {diff}");
        }
    }

    #[test]
    fn time_scale_zooms_in() {
        let mut scope = WaveformScope::new();
        let ramp: Vec<f32> = (0..SCOPE_BUFFER_SIZE)
            .map(|i| i as f32 / SCOPE_BUFFER_SIZE as f32)
            .collect();
        scope.write(&ramp, &ramp);
        scope.set_time_scale(4.0);

        let mut left = [0.0f32; 8];
        let mut right = [0.0f32; 8];
        scope.display(&mut left, &mut right);
        // A quarter of the ring across 8 points: steps of 1/32.
        let diff = (left[1] - left[0] + 1.0) % 1.0;
        assert!((diff - 1.0 / 32.0).abs() < 0.01, "step {diff}");
    }

    #[test]
    fn stereo_channels_are_independent() {
        let mut scope = WaveformScope::new();
        scope.write(&[1.0; 16], &[-1.0; 16]);
        let mut left = [0.0f32; 4];
        let mut right = [0.0f32; 4];
        scope.display(&mut left, &mut right);
        assert!(left.iter().all(|&s| s == 1.0 || s == 0.0));
        assert!(right.iter().all(|&s| s == -1.0 || s == 0.0));
    }
}
