//! Voice bank and port decoding
//!
//! Holds the 28 voices together with the voice/register selection latched
//! by ports 1 and 2, and routes port 0 data writes to the selected register.

use super::constants::VOICE_COUNT;
use super::registers::{clamp_register_select, decode_voice_select, Port, Register};
use super::tables::Tables;
use super::voice::Voice;
use crate::rom::SampleRom;

/// The chip's voices and its bus-side selection latches.
#[derive(Debug, Clone)]
pub struct VoiceBank {
    voices: [Voice; VOICE_COUNT],
    selected_voice: Option<usize>,
    selected_register: usize,
}

impl Default for VoiceBank {
    fn default() -> Self {
        Self::new()
    }
}

impl VoiceBank {
    /// Create 28 idle voices with voice 0, register 0 selected.
    pub fn new() -> Self {
        VoiceBank {
            voices: [Voice::new(); VOICE_COUNT],
            selected_voice: Some(0),
            selected_register: 0,
        }
    }

    /// Handle one port write.
    ///
    /// Port offsets other than 0-2 are ignored. Data written while the
    /// selected voice code maps to no voice is dropped.
    pub fn write_port<R: SampleRom + ?Sized>(
        &mut self,
        tables: &Tables,
        rom: &R,
        offset: u8,
        data: u8,
    ) {
        match Port::from_offset(offset) {
            Some(Port::Data) => {
                let Some(index) = self.selected_voice else {
                    log::trace!("Data {data:02X} dropped: no voice selected");
                    return;
                };
                // The latch is clamped on write, so this always resolves.
                let Some(reg) = Register::from_index(self.selected_register as u8) else {
                    return;
                };
                log::trace!("Voice {index:2} {reg} <- {data:02X}");
                self.voices[index].write_register(tables, rom, reg, data);
            }
            Some(Port::VoiceSelect) => {
                self.selected_voice = decode_voice_select(data);
                log::trace!("Voice select {:02X} -> {:?}", data & 0x1f, self.selected_voice);
            }
            Some(Port::RegisterSelect) => {
                self.selected_register = clamp_register_select(data);
                log::trace!("Register select {data:02X} -> {}", self.selected_register);
            }
            None => {
                log::trace!("Write to unmapped port {offset} ignored");
            }
        }
    }

    /// Voice currently addressed by port 0, if any.
    pub fn selected_voice(&self) -> Option<usize> {
        self.selected_voice
    }

    /// Register currently addressed by port 0.
    pub fn selected_register(&self) -> usize {
        self.selected_register
    }

    pub(crate) fn set_selection(&mut self, voice: Option<usize>, register: usize) {
        self.selected_voice = voice.filter(|&v| v < VOICE_COUNT);
        self.selected_register = register.min(7);
    }

    /// Access a voice by index.
    pub fn voice(&self, index: usize) -> Option<&Voice> {
        self.voices.get(index)
    }

    /// Mutable access to a voice by index.
    pub fn voice_mut(&mut self, index: usize) -> Option<&mut Voice> {
        self.voices.get_mut(index)
    }

    /// All voices in index order.
    pub fn voices(&self) -> &[Voice; VOICE_COUNT] {
        &self.voices
    }

    /// Mutable access to all voices.
    pub fn voices_mut(&mut self) -> &mut [Voice; VOICE_COUNT] {
        &mut self.voices
    }

    /// Number of voices currently producing output.
    pub fn active_voices(&self) -> usize {
        self.voices.iter().filter(|v| v.playing).count()
    }
}
