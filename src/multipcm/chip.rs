//! MultiPCM chip
//!
//! Ties the voice bank, the shared tables and the attached sample ROM
//! together. One call to [`MultiPcm::clock`] produces one stereo frame at
//! `clock / 224` Hz.

use std::sync::Arc;

use super::bank::VoiceBank;
use super::constants::{CLOCK_DIVIDER, VOICE_COUNT};
use super::mixer::{Mixer, StereoFrame};
use super::tables::Tables;
use super::voice::Voice;
use crate::config::ChipConfig;
use crate::rom::SampleRom;
use crate::Result;

/// Sega Model 1 / System Multi 32 board clock.
pub const DEFAULT_CLOCK: u32 = 8_000_000;

/// Output sample rate for a chip clock.
#[inline]
pub fn output_rate(clock: u32) -> f32 {
    clock as f32 / CLOCK_DIVIDER
}

/// Yamaha YMW-258-F (Sega 315-5560 MultiPCM) emulator.
#[derive(Clone)]
pub struct MultiPcm<R: SampleRom> {
    clock: u32,
    tables: Arc<Tables>,
    bank: VoiceBank,
    rom: R,
    mute_mask: u32,
    last_frame: StereoFrame,
}

impl<R: SampleRom> MultiPcm<R> {
    /// Create a chip running at `clock` Hz reading samples from `rom`.
    pub fn new(clock: u32, rom: R) -> Self {
        let rate = output_rate(clock);
        log::debug!("MultiPCM clock {clock} Hz, output rate {rate} Hz");
        MultiPcm {
            clock,
            tables: Arc::new(Tables::new(rate)),
            bank: VoiceBank::new(),
            rom,
            mute_mask: 0,
            last_frame: StereoFrame::SILENCE,
        }
    }

    /// Create a chip from a validated configuration.
    pub fn from_config(config: &ChipConfig, rom: R) -> Result<Self> {
        config.validate()?;
        let mut chip = Self::new(config.clock_hz, rom);
        chip.mute_mask = config.mute_mask;
        Ok(chip)
    }

    /// Create a chip sharing an already built table bundle.
    ///
    /// Chips on the same clock can share one bundle; a later
    /// [`set_clock`](Self::set_clock) gives this chip its own copy. The
    /// bundle must have been built for `clock`'s output rate.
    pub fn with_tables(clock: u32, tables: Arc<Tables>, rom: R) -> Self {
        debug_assert_eq!(
            output_rate(clock),
            tables.rate(),
            "table bundle built for another clock"
        );
        MultiPcm {
            clock,
            tables,
            bank: VoiceBank::new(),
            rom,
            mute_mask: 0,
            last_frame: StereoFrame::SILENCE,
        }
    }

    /// Return every voice to its power-on state.
    ///
    /// The tables, the ROM and the mute mask are kept.
    pub fn reset(&mut self) {
        self.bank = VoiceBank::new();
        self.last_frame = StereoFrame::SILENCE;
    }

    /// Write to one of the three host ports.
    pub fn write_port(&mut self, offset: u8, data: u8) {
        self.bank.write_port(&self.tables, &self.rom, offset, data);
    }

    /// Port reads have no defined value on this chip and return 0.
    pub fn read_port(&self, _offset: u8) -> u8 {
        0
    }

    /// Convenience: select `voice_code` and `register`, then write `data`.
    pub fn write_voice_register(&mut self, voice_code: u8, register: u8, data: u8) {
        self.write_port(1, voice_code);
        self.write_port(2, register);
        self.write_port(0, data);
    }

    /// Render one output frame.
    pub fn clock(&mut self) -> StereoFrame {
        let mut mixer = Mixer::new();
        for (index, voice) in self.bank.voices_mut().iter_mut().enumerate() {
            let output = voice.render(&self.tables, &self.rom);
            if self.mute_mask & (1 << index) == 0 {
                mixer.accumulate(output);
            }
        }
        self.last_frame = mixer.finish();
        self.last_frame
    }

    /// Fill `frames` with consecutive output frames.
    pub fn generate_frames_into(&mut self, frames: &mut [StereoFrame]) {
        for frame in frames.iter_mut() {
            *frame = self.clock();
        }
    }

    /// Render `count` consecutive output frames.
    pub fn generate_frames(&mut self, count: usize) -> Vec<StereoFrame> {
        let mut frames = vec![StereoFrame::SILENCE; count];
        self.generate_frames_into(&mut frames);
        frames
    }

    /// Change the input clock.
    ///
    /// Only the frequency step table is rebuilt; voice steps and LFO rates
    /// keep their values until their registers are written again.
    pub fn set_clock(&mut self, clock: u32) {
        let rate = output_rate(clock);
        log::debug!("MultiPCM clock change {} -> {clock} Hz, output rate {rate} Hz", self.clock);
        self.clock = clock;
        Arc::make_mut(&mut self.tables).rebuild_frequency_steps(rate);
    }

    /// Input clock in Hz.
    pub fn clock_hz(&self) -> u32 {
        self.clock
    }

    /// Output sample rate in Hz.
    pub fn sample_rate(&self) -> f32 {
        self.tables.rate()
    }

    /// Last frame produced by [`clock`](Self::clock).
    pub fn last_frame(&self) -> StereoFrame {
        self.last_frame
    }

    /// Mute or unmute one voice. Muted voices keep running silently.
    pub fn set_voice_mute(&mut self, voice: usize, mute: bool) {
        if voice >= VOICE_COUNT {
            return;
        }
        if mute {
            self.mute_mask |= 1 << voice;
        } else {
            self.mute_mask &= !(1 << voice);
        }
    }

    /// Whether a voice is muted.
    pub fn is_voice_muted(&self, voice: usize) -> bool {
        voice < VOICE_COUNT && self.mute_mask & (1 << voice) != 0
    }

    /// Mute bitmask, bit `n` for voice `n`.
    pub fn mute_mask(&self) -> u32 {
        self.mute_mask
    }

    /// Access a voice by index.
    pub fn voice(&self, index: usize) -> Option<&Voice> {
        self.bank.voice(index)
    }

    /// Voice bank, including the port selection latches.
    pub fn bank(&self) -> &VoiceBank {
        &self.bank
    }

    pub(crate) fn bank_mut(&mut self) -> &mut VoiceBank {
        &mut self.bank
    }

    /// Shared table bundle.
    pub fn tables(&self) -> &Arc<Tables> {
        &self.tables
    }

    /// Attached sample ROM.
    pub fn rom(&self) -> &R {
        &self.rom
    }

    /// Mutable access to the sample ROM, for banked hosts.
    pub fn rom_mut(&mut self) -> &mut R {
        &mut self.rom
    }

    /// Detach the ROM, consuming the chip.
    pub fn into_rom(self) -> R {
        self.rom
    }
}

impl<R: SampleRom> std::fmt::Debug for MultiPcm<R> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MultiPcm")
            .field("clock", &self.clock)
            .field("rate", &self.tables.rate())
            .field("active_voices", &self.bank.active_voices())
            .field("mute_mask", &format_args!("{:#09x}", self.mute_mask))
            .finish()
    }
}
