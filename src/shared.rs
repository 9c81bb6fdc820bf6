//! Thread-shared chip handle
//!
//! For hosts that write registers from an emulation thread while an audio
//! callback renders on another. Every operation takes the lock for its whole
//! duration, so a register write lands either before or after a rendered
//! block, never inside a tick.

use parking_lot::Mutex;
use std::sync::Arc;

use crate::multipcm::{ChipState, MultiPcm, StereoFrame};
use crate::rom::SampleRom;
use crate::Result;

/// Cloneable handle to one chip behind a mutex.
pub struct SharedChip<R: SampleRom> {
    inner: Arc<Mutex<MultiPcm<R>>>,
}

impl<R: SampleRom> Clone for SharedChip<R> {
    fn clone(&self) -> Self {
        SharedChip {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<R: SampleRom> SharedChip<R> {
    /// Wrap a chip.
    pub fn new(chip: MultiPcm<R>) -> Self {
        SharedChip {
            inner: Arc::new(Mutex::new(chip)),
        }
    }

    /// Write to a host port.
    pub fn write_port(&self, offset: u8, data: u8) {
        self.inner.lock().write_port(offset, data);
    }

    /// Apply a batch of `(offset, data)` port writes under one lock.
    pub fn write_ports(&self, writes: &[(u8, u8)]) {
        let mut chip = self.inner.lock();
        for &(offset, data) in writes {
            chip.write_port(offset, data);
        }
    }

    /// Render a block of frames under one lock.
    pub fn render(&self, frames: &mut [StereoFrame]) {
        self.inner.lock().generate_frames_into(frames);
    }

    /// Render interleaved `f32` stereo under one lock.
    pub fn render_interleaved(&self, buffer: &mut [f32]) {
        let mut chip = self.inner.lock();
        for pair in buffer.chunks_exact_mut(2) {
            let (left, right) = chip.clock().to_f32();
            pair[0] = left;
            pair[1] = right;
        }
    }

    /// Change the input clock.
    pub fn set_clock(&self, clock: u32) {
        self.inner.lock().set_clock(clock);
    }

    /// Snapshot the chip.
    pub fn save_state(&self) -> ChipState {
        self.inner.lock().save_state()
    }

    /// Restore a snapshot.
    pub fn restore_state(&self, state: &ChipState) -> Result<()> {
        self.inner.lock().restore_state(state)
    }

    /// Run a closure with exclusive access to the chip.
    pub fn with_chip<T>(&self, f: impl FnOnce(&mut MultiPcm<R>) -> T) -> T {
        f(&mut self.inner.lock())
    }

    /// Underlying shared mutex, for hosts that manage locking themselves.
    pub fn handle(&self) -> Arc<Mutex<MultiPcm<R>>> {
        Arc::clone(&self.inner)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_handles_share_one_chip() {
        let shared = SharedChip::new(MultiPcm::new(8_000_000, vec![0u8; 0x100]));
        let other = shared.clone();
        other.write_ports(&[(1, 0x09), (2, 4), (0, 0x80)]);
        assert!(shared.with_chip(|chip| chip.voice(8).unwrap().playing));
    }

    #[test]
    fn test_writes_from_another_thread() {
        let shared = SharedChip::new(MultiPcm::new(8_000_000, vec![0u8; 0x100]));
        let writer = shared.clone();
        let handle = std::thread::spawn(move || {
            for code in 0..8u8 {
                writer.write_ports(&[(1, code), (2, 4), (0, 0x80)]);
            }
        });

        let mut frames = [StereoFrame::SILENCE; 32];
        for _ in 0..4 {
            shared.render(&mut frames);
        }
        handle.join().unwrap();

        // Code 7 addresses no voice.
        assert_eq!(shared.with_chip(|chip| chip.bank().active_voices()), 7);
    }

    #[test]
    fn test_state_through_handle() {
        let shared = SharedChip::new(MultiPcm::new(8_000_000, vec![0u8; 0x100]));
        let state = shared.save_state();
        shared.write_port(2, 5);
        shared.restore_state(&state).unwrap();
        assert_eq!(shared.handle().lock().bank().selected_register(), 0);

        let mut buffer = [1.0f32; 4];
        shared.render_interleaved(&mut buffer);
        assert_eq!(buffer, [0.0; 4]);
    }
}
