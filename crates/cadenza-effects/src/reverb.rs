//! Schroeder-Moorer algorithmic reverb.
//!
//! Eight parallel comb filters per channel feed four series allpasses per
//! channel. Each channel runs one damping low-pass inside the comb
//! feedback loop, so the tail loses highs as it recirculates the way real
//! rooms do. A pre-delay line ahead of the comb bank separates the dry
//! attack from the onset of the tail.

use cadenza_core::{lerp, AllpassFilter, CombFilter, DelayLine, Effect, StateVariableFilter};
use libm::roundf;

/// Comb delay lengths in samples at the 44.1 kHz reference rate.
const COMB_LENGTHS_44K: [usize; 8] = [1557, 1617, 1491, 1422, 1277, 1356, 1188, 1116];

/// Allpass delay lengths in samples at the 44.1 kHz reference rate.
const ALLPASS_LENGTHS_44K: [usize; 4] = [225, 556, 441, 341];

/// Right-channel offset added to every delay length so the two tanks
/// decorrelate and the width control has something to widen.
const STEREO_SPREAD: usize = 23;

/// Reference rate the length tables were tuned at.
const REFERENCE_RATE: f32 = 44100.0;

/// Maximum pre-delay in seconds.
const MAX_PREDELAY: f32 = 0.1;

fn scale_length(samples: usize, sample_rate: f32) -> usize {
    ((samples as f32 * sample_rate / REFERENCE_RATE) as usize).max(1)
}

/// Schroeder-Moorer stereo reverb.
///
/// ## Parameters
///
/// - `room_size`: [0, 1]; comb feedback = `0.7 + 0.28 · room_size`
/// - `damping`: [0, 1]; comb-loop low-pass cutoff = `8000 · (1 − damping)`
///   Hz (0.5 → 4 kHz)
/// - `width`: [0, 1]; 0 = mono tail, 1 = fully decorrelated
/// - `predelay`: seconds, up to 100 ms, default 0
/// - `mix`: [0, 1], default 0.3
///
/// # Example
///
/// ```rust
/// use cadenza_effects::Reverb;
/// use cadenza_core::Effect;
///
/// let mut reverb = Reverb::new(48000.0);
/// reverb.set_room_size(0.7);
/// reverb.set_damping(0.4);
/// let (l, r) = reverb.process_stereo(0.5, 0.5);
/// ```
#[derive(Debug, Clone)]
pub struct Reverb {
    combs_l: [CombFilter; 8],
    combs_r: [CombFilter; 8],
    allpasses_l: [AllpassFilter; 4],
    allpasses_r: [AllpassFilter; 4],
    damping_filter_l: StateVariableFilter,
    damping_filter_r: StateVariableFilter,
    predelay_line: DelayLine,

    room_size: f32,
    damping: f32,
    width: f32,
    predelay_seconds: f32,
    mix: f32,
    sample_rate: f32,
}

impl Reverb {
    /// Create a reverb at the given sample rate; the comb and allpass
    /// lengths scale linearly from the 44.1 kHz tuning.
    pub fn new(sample_rate: f32) -> Self {
        let combs_l =
            core::array::from_fn(|i| CombFilter::new(scale_length(COMB_LENGTHS_44K[i], sample_rate)));
        let combs_r = core::array::from_fn(|i| {
            CombFilter::new(scale_length(COMB_LENGTHS_44K[i] + STEREO_SPREAD, sample_rate))
        });
        let allpasses_l = core::array::from_fn(|i| {
            AllpassFilter::new(scale_length(ALLPASS_LENGTHS_44K[i], sample_rate))
        });
        let allpasses_r = core::array::from_fn(|i| {
            AllpassFilter::new(scale_length(ALLPASS_LENGTHS_44K[i] + STEREO_SPREAD, sample_rate))
        });

        let mut reverb = Self {
            combs_l,
            combs_r,
            allpasses_l,
            allpasses_r,
            damping_filter_l: StateVariableFilter::new(sample_rate),
            damping_filter_r: StateVariableFilter::new(sample_rate),
            predelay_line: DelayLine::from_seconds(sample_rate, MAX_PREDELAY),
            room_size: 0.5,
            damping: 0.5,
            width: 1.0,
            predelay_seconds: 0.0,
            mix: 0.3,
            sample_rate,
        };
        reverb.update_damping();
        reverb
    }

    /// Set room size in [0, 1].
    pub fn set_room_size(&mut self, size: f32) {
        self.room_size = size.clamp(0.0, 1.0);
    }

    /// Current room size.
    pub fn room_size(&self) -> f32 {
        self.room_size
    }

    /// Set damping in [0, 1].
    pub fn set_damping(&mut self, damping: f32) {
        self.damping = damping.clamp(0.0, 1.0);
        self.update_damping();
    }

    /// Current damping.
    pub fn damping(&self) -> f32 {
        self.damping
    }

    /// Set stereo width in [0, 1].
    pub fn set_width(&mut self, width: f32) {
        self.width = width.clamp(0.0, 1.0);
    }

    /// Set pre-delay in seconds, up to 100 ms.
    pub fn set_predelay(&mut self, seconds: f32) {
        self.predelay_seconds = seconds.clamp(0.0, MAX_PREDELAY);
    }

    /// Set dry/wet mix in [0, 1].
    pub fn set_mix(&mut self, mix: f32) {
        self.mix = mix.clamp(0.0, 1.0);
    }

    /// Current dry/wet mix.
    pub fn mix(&self) -> f32 {
        self.mix
    }

    fn update_damping(&mut self) {
        let cutoff = 8000.0 * (1.0 - self.damping);
        self.damping_filter_l.set_cutoff(cutoff);
        self.damping_filter_r.set_cutoff(cutoff);
    }

    fn comb_feedback(&self) -> f32 {
        0.7 + self.room_size * 0.28
    }
}

impl Effect for Reverb {
    #[inline]
    fn process_stereo(&mut self, left: f32, right: f32) -> (f32, f32) {
        let feedback = self.comb_feedback();
        let mono = (left + right) * 0.5;

        self.predelay_line.store(mono);
        let predelay_samples = roundf(self.predelay_seconds * self.sample_rate) as usize;
        let fed = self.predelay_line.read_back(predelay_samples);
        self.predelay_line.advance();

        let mut comb_out_l = 0.0;
        let mut comb_out_r = 0.0;

        for comb in &mut self.combs_l {
            let delayed = comb.delayed();
            let filtered = self.damping_filter_l.process(delayed);
            comb.write(fed + filtered * feedback);
            comb_out_l += delayed;
        }
        for comb in &mut self.combs_r {
            let delayed = comb.delayed();
            let filtered = self.damping_filter_r.process(delayed);
            comb.write(fed + filtered * feedback);
            comb_out_r += delayed;
        }

        comb_out_l /= 8.0;
        comb_out_r /= 8.0;

        let mut ap_l = comb_out_l;
        let mut ap_r = comb_out_r;
        for ap in &mut self.allpasses_l {
            ap_l = ap.process(ap_l);
        }
        for ap in &mut self.allpasses_r {
            ap_r = ap.process(ap_r);
        }

        // Width: crossfeed the tails toward mono as width falls.
        let wet_l = ap_l + ap_r * (1.0 - self.width);
        let wet_r = ap_r + ap_l * (1.0 - self.width);

        (lerp(left, wet_l, self.mix), lerp(right, wet_r, self.mix))
    }

    fn is_true_stereo(&self) -> bool {
        true
    }

    fn set_sample_rate(&mut self, sample_rate: f32) {
        // Comb lengths are fixed at construction; retune the damping path
        // and pre-delay for the new rate.
        self.sample_rate = sample_rate;
        self.damping_filter_l.set_sample_rate(sample_rate);
        self.damping_filter_r.set_sample_rate(sample_rate);
        self.update_damping();
    }

    fn reset(&mut self) {
        for comb in self.combs_l.iter_mut().chain(self.combs_r.iter_mut()) {
            comb.clear();
        }
        for ap in self.allpasses_l.iter_mut().chain(self.allpasses_r.iter_mut()) {
            ap.clear();
        }
        self.damping_filter_l.reset();
        self.damping_filter_r.reset();
        self.predelay_line.clear();
    }
}
