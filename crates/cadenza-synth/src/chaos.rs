//! Chaotic oscillator driven by the Lorenz attractor.
//!
//! Integrates the Lorenz system with forward Euler at a fixed dt of 0.01
//! per audio sample, independent of sample rate. The result is a dense,
//! never-repeating drone whose character is set by the three classic
//! parameters. State is kept in f64; single precision drifts visibly over
//! long integrations.

/// Which state variable is taken as the audio output.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum ChaosAxis {
    /// The x coordinate (default).
    #[default]
    X,
    /// The y coordinate.
    Y,
    /// The z coordinate.
    Z,
}

/// Lorenz attractor oscillator.
///
/// ## Parameters
///
/// - `sigma`, `rho`, `beta`: Lorenz coefficients, defaults 10, 28, 8/3
/// - `axis`: which coordinate is output
/// - `output_scale`: default 0.05 (raw attractor coordinates span ±~20)
///
/// # Example
///
/// ```rust
/// use cadenza_synth::{ChaosOscillator, ChaosAxis};
///
/// let mut osc = ChaosOscillator::new(48000.0);
/// osc.set_axis(ChaosAxis::Y);
/// let sample = osc.process();
/// ```
#[derive(Debug, Clone)]
pub struct ChaosOscillator {
    sigma: f64,
    rho: f64,
    beta: f64,
    dt: f64,
    x: f64,
    y: f64,
    z: f64,
    axis: ChaosAxis,
    output_scale: f32,
}

impl Default for ChaosOscillator {
    fn default() -> Self {
        Self::new(48000.0)
    }
}

impl ChaosOscillator {
    /// Create a chaos oscillator. The sample rate only identifies the
    /// context; integration runs at fixed dt = 0.01 per sample.
    pub fn new(_sample_rate: f32) -> Self {
        Self {
            sigma: 10.0,
            rho: 28.0,
            beta: 8.0 / 3.0,
            dt: 0.01,
            x: 0.1,
            y: 0.0,
            z: 0.0,
            axis: ChaosAxis::X,
            output_scale: 0.05,
        }
    }

    /// Set the Lorenz coefficients.
    pub fn set_params(&mut self, sigma: f64, rho: f64, beta: f64) {
        self.sigma = sigma;
        self.rho = rho;
        self.beta = beta;
    }

    /// Select the output coordinate.
    pub fn set_axis(&mut self, axis: ChaosAxis) {
        self.axis = axis;
    }

    /// Set the output gain (default 0.05).
    pub fn set_output_scale(&mut self, scale: f32) {
        self.output_scale = scale;
    }

    /// Restore the canonical initial condition (0.1, 0, 0).
    pub fn reset(&mut self) {
        self.x = 0.1;
        self.y = 0.0;
        self.z = 0.0;
    }

    /// Integrate one step and return the scaled output coordinate.
    #[inline]
    pub fn process(&mut self) -> f32 {
        let dx = self.sigma * (self.y - self.x);
        let dy = self.x * (self.rho - self.z) - self.y;
        let dz = self.x * self.y - self.beta * self.z;

        self.x += dx * self.dt;
        self.y += dy * self.dt;
        self.z += dz * self.dt;

        let out = match self.axis {
            ChaosAxis::X => self.x,
            ChaosAxis::Y => self.y,
            ChaosAxis::Z => self.z,
        };

        (out * self.output_scale as f64) as f32
    }
}
