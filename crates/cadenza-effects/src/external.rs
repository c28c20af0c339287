//! External processor contract.
//!
//! The abstract interface a plugin host adapter satisfies to appear in an
//! effect chain. The chain treats an external node exactly like a
//! built-in slot; the node never learns it is hosted by this engine
//! rather than a DAW.

use cadenza_core::wet_dry_mix;

/// A timestamped MIDI-style event delivered to an external node.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MidiEvent {
    /// Offset in frames from the start of the current block.
    pub frame_offset: u32,
    /// Raw three-byte message (status, data1, data2).
    pub data: [u8; 3],
}

/// Contract for an externally implemented audio processor.
///
/// Lifecycle: [`init`](ExternalProcessor::init) once with the engine's
/// sample rate and maximum block size, [`activate`](ExternalProcessor::activate)
/// before the first process call, [`deactivate`](ExternalProcessor::deactivate)
/// when the slot is bypassed or removed. `process_audio` may be called
/// from a realtime thread and must not block or allocate.
pub trait ExternalProcessor: Send {
    /// One-time setup with the engine's sample rate and maximum block size.
    fn init(&mut self, sample_rate: f32, max_block: usize);

    /// Prepare for processing.
    fn activate(&mut self) {}

    /// Stop processing; may release non-realtime resources.
    fn deactivate(&mut self) {}

    /// Clear internal state without changing parameters.
    fn reset(&mut self);

    /// Process `frames` samples from `inputs` into `outputs`. Channel
    /// counts follow the slice lengths; the chain passes two of each.
    fn process_audio(&mut self, inputs: &[&[f32]], outputs: &mut [&mut [f32]], frames: usize);

    /// Deliver MIDI-style events for the current block.
    fn process_midi(&mut self, _events: &[MidiEvent]) {}

    /// Read a parameter by index; `None` when out of range.
    fn get_parameter(&self, index: u32) -> Option<f32>;

    /// Write a parameter by index; out-of-range writes are ignored.
    fn set_parameter(&mut self, index: u32, value: f32);
}

/// Chain adapter wrapping an external processor.
///
/// Owns the scratch buffers that turn the chain's in-place stereo block
/// into the node's separate input/output arrays, and applies the slot's
/// dry/wet mix around the node.
pub struct ExternalNode {
    processor: Box<dyn ExternalProcessor>,
    in_l: Vec<f32>,
    in_r: Vec<f32>,
    mix: f32,
    max_block: usize,
    active: bool,
}

impl ExternalNode {
    /// Wrap a processor, initializing it for the given engine format.
    pub fn new(mut processor: Box<dyn ExternalProcessor>, sample_rate: f32, max_block: usize) -> Self {
        processor.init(sample_rate, max_block);
        processor.activate();
        Self {
            processor,
            in_l: vec![0.0; max_block],
            in_r: vec![0.0; max_block],
            mix: 1.0,
            max_block,
            active: true,
        }
    }

    /// Set dry/wet mix in [0, 1].
    pub fn set_mix(&mut self, mix: f32) {
        self.mix = mix.clamp(0.0, 1.0);
    }

    /// Current dry/wet mix.
    pub fn mix(&self) -> f32 {
        self.mix
    }

    /// Forward a parameter write to the node.
    pub fn set_parameter(&mut self, index: u32, value: f32) {
        self.processor.set_parameter(index, value);
    }

    /// Forward a parameter read to the node.
    pub fn get_parameter(&self, index: u32) -> Option<f32> {
        self.processor.get_parameter(index)
    }

    /// Forward MIDI events to the node.
    pub fn process_midi(&mut self, events: &[MidiEvent]) {
        self.processor.process_midi(events);
    }

    /// Process a stereo block in place through the node.
    ///
    /// Blocks longer than the negotiated maximum are processed in
    /// max-block chunks.
    pub fn process_block(&mut self, left: &mut [f32], right: &mut [f32]) {
        debug_assert_eq!(left.len(), right.len());
        if !self.active {
            return;
        }

        let mut offset = 0;
        while offset < left.len() {
            let frames = (left.len() - offset).min(self.max_block);
            let l = &mut left[offset..offset + frames];
            let r = &mut right[offset..offset + frames];

            self.in_l[..frames].copy_from_slice(l);
            self.in_r[..frames].copy_from_slice(r);

            {
                let inputs: [&[f32]; 2] = [&self.in_l[..frames], &self.in_r[..frames]];
                let mut outputs: [&mut [f32]; 2] = [l, r];
                self.processor.process_audio(&inputs, &mut outputs, frames);
            }

            for i in 0..frames {
                left[offset + i] = wet_dry_mix(self.in_l[i], left[offset + i], self.mix);
                right[offset + i] = wet_dry_mix(self.in_r[i], right[offset + i], self.mix);
            }

            offset += frames;
        }
    }

    /// Deactivate the node (the chain calls this when the slot is
    /// removed).
    pub fn shutdown(&mut self) {
        if self.active {
            self.processor.deactivate();
            self.active = false;
        }
    }

    /// Clear node state.
    pub fn reset(&mut self) {
        self.processor.reset();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Test double: multiplies by a parameter-controlled gain.
    struct GainNode {
        gain: f32,
    }

    impl ExternalProcessor for GainNode {
        fn init(&mut self, _sample_rate: f32, _max_block: usize) {}
        fn reset(&mut self) {}
        fn process_audio(&mut self, inputs: &[&[f32]], outputs: &mut [&mut [f32]], frames: usize) {
            for ch in 0..2 {
                for i in 0..frames {
                    outputs[ch][i] = inputs[ch][i] * self.gain;
                }
            }
        }
        fn get_parameter(&self, index: u32) -> Option<f32> {
            (index == 0).then_some(self.gain)
        }
        fn set_parameter(&mut self, index: u32, value: f32) {
            if index == 0 {
                self.gain = value;
            }
        }
    }

    #[test]
    fn node_is_initialized_and_processes() {
        let node = Box::new(GainNode { gain: 2.0 });
        let mut external = ExternalNode::new(node, 48000.0, 64);

        let mut left = [0.5f32; 64];
        let mut right = [0.25f32; 64];
        external.process_block(&mut left, &mut right);

        assert!(left.iter().all(|&s| (s - 1.0).abs() < 1e-6));
        assert!(right.iter().all(|&s| (s - 0.5).abs() < 1e-6));
    }

    #[test]
    fn oversized_blocks_are_chunked() {
        let node = Box::new(GainNode { gain: 3.0 });
        let mut external = ExternalNode::new(node, 48000.0, 16);

        let mut left = vec![1.0f32; 100];
        let mut right = vec![1.0f32; 100];
        external.process_block(&mut left, &mut right);
        assert!(left.iter().all(|&s| (s - 3.0).abs() < 1e-6));
    }

    #[test]
    fn mix_blends_node_output() {
        let node = Box::new(GainNode { gain: 0.0 }); // silences everything
        let mut external = ExternalNode::new(node, 48000.0, 32);
        external.set_mix(0.5);

        let mut left = [1.0f32; 32];
        let mut right = [1.0f32; 32];
        external.process_block(&mut left, &mut right);
        assert!(left.iter().all(|&s| (s - 0.5).abs() < 1e-6));
    }

    #[test]
    fn parameters_round_trip() {
        let node = Box::new(GainNode { gain: 1.0 });
        let mut external = ExternalNode::new(node, 48000.0, 32);
        external.set_parameter(0, 0.75);
        assert_eq!(external.get_parameter(0), Some(0.75));
        assert_eq!(external.get_parameter(9), None);
    }
}
