//! Backend trait abstraction for PCM chip implementations
//!
//! Hosts that only push register writes and pull frames can drive any
//! implementation of this trait, whatever ROM type it is bound to.

use crate::multipcm::{MultiPcm, StereoFrame};
use crate::rom::SampleRom;

/// Common interface for MultiPCM-style backends
///
/// # Example
///
/// ```
/// use multipcm::{MultiPcm, PcmChipBackend};
///
/// fn key_on<B: PcmChipBackend>(chip: &mut B, voice_code: u8) {
///     chip.write_port(1, voice_code);
///     chip.write_port(2, 0x04);
///     chip.write_port(0, 0x80);
/// }
///
/// let mut chip = MultiPcm::new(8_000_000, vec![0u8; 0x100]);
/// key_on(&mut chip, 0);
/// let samples = chip.generate_interleaved(64);
/// assert_eq!(samples.len(), 128);
/// ```
pub trait PcmChipBackend: Send {
    /// Reset all voices to their power-on state.
    fn reset(&mut self);

    /// Write to a host port (0 = data, 1 = voice select, 2 = register select).
    fn write_port(&mut self, offset: u8, data: u8);

    /// Read from a host port.
    fn read_port(&self, offset: u8) -> u8;

    /// Produce the next stereo frame.
    fn clock(&mut self) -> StereoFrame;

    /// Last frame produced by [`clock`](Self::clock).
    fn last_frame(&self) -> StereoFrame;

    /// Output sample rate in Hz.
    fn sample_rate(&self) -> f32;

    /// Mute or unmute a voice.
    fn set_voice_mute(&mut self, voice: usize, mute: bool);

    /// Check if a voice is muted.
    fn is_voice_muted(&self, voice: usize) -> bool;

    /// Generate multiple frames.
    fn generate_frames(&mut self, count: usize) -> Vec<StereoFrame> {
        let mut frames = vec![StereoFrame::SILENCE; count];
        self.generate_frames_into(&mut frames);
        frames
    }

    /// Generate frames into a caller-provided buffer.
    ///
    /// This avoids per-call allocations; prefer this in hot paths.
    fn generate_frames_into(&mut self, buffer: &mut [StereoFrame]) {
        for frame in buffer.iter_mut() {
            *frame = self.clock();
        }
    }

    /// Generate `count` frames as interleaved `f32` stereo in `[-1.0, 1.0)`.
    fn generate_interleaved(&mut self, count: usize) -> Vec<f32> {
        let mut samples = vec![0.0; count * 2];
        self.generate_interleaved_into(&mut samples);
        samples
    }

    /// Fill an interleaved `f32` stereo buffer. A trailing odd sample is left untouched.
    fn generate_interleaved_into(&mut self, buffer: &mut [f32]) {
        for pair in buffer.chunks_exact_mut(2) {
            let (left, right) = self.clock().to_f32();
            pair[0] = left;
            pair[1] = right;
        }
    }
}

impl<R: SampleRom + Send> PcmChipBackend for MultiPcm<R> {
    fn reset(&mut self) {
        MultiPcm::reset(self)
    }

    fn write_port(&mut self, offset: u8, data: u8) {
        MultiPcm::write_port(self, offset, data)
    }

    fn read_port(&self, offset: u8) -> u8 {
        MultiPcm::read_port(self, offset)
    }

    fn clock(&mut self) -> StereoFrame {
        MultiPcm::clock(self)
    }

    fn last_frame(&self) -> StereoFrame {
        MultiPcm::last_frame(self)
    }

    fn sample_rate(&self) -> f32 {
        MultiPcm::sample_rate(self)
    }

    fn set_voice_mute(&mut self, voice: usize, mute: bool) {
        MultiPcm::set_voice_mute(self, voice, mute)
    }

    fn is_voice_muted(&self, voice: usize) -> bool {
        MultiPcm::is_voice_muted(self, voice)
    }

    fn generate_frames_into(&mut self, buffer: &mut [StereoFrame]) {
        MultiPcm::generate_frames_into(self, buffer)
    }
}
