//! MultiPCM voice
//!
//! One of the 28 sample playback channels. A voice holds its raw register
//! file and everything derived from it: the decoded sample header, the
//! playback position and step, the total level ramp, the envelope and both
//! LFOs. Register writes update the derived state at once; [`Voice::render`]
//! advances it by one output sample.

use super::constants::{INSTANT_RELEASE, REGISTERS_PER_VOICE, TL_SHIFT};
use super::envelope::{EnvelopeGen, EnvelopeState};
use super::lfo::{LfoKind, LfoUnit};
use super::registers::{KeyControl, LevelControl, Register};
use super::sample::{decode_sample, SampleFormat, SampleMetadata};
use super::tables::Tables;
use crate::rom::SampleRom;

const TL_FRACTION_MASK: u32 = (1 << TL_SHIFT) - 1;

/// Playback state of a single voice.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Voice {
    /// Raw register file.
    pub regs: [u8; REGISTERS_PER_VOICE],
    /// Pan position (0-15), from the top nibble of register 0.
    pub pan: u8,
    /// Header of the selected sample.
    pub sample: SampleMetadata,
    /// ROM address of the sample data.
    pub base: u32,
    /// Storage format of the sample data.
    pub format: SampleFormat,
    /// Playback position in samples, `TL_SHIFT` fractional bits.
    pub offset: u32,
    /// Position increment per output sample, `TL_SHIFT` fractional bits.
    pub step: u32,
    /// Last decoded sample before the current integer position.
    pub prev_sample: i32,
    /// Voice is producing output.
    pub playing: bool,
    /// Current attenuation, `TL_SHIFT` fractional bits (0 = loudest).
    pub total_level: i32,
    /// Attenuation the ramp is heading for (0-0x7f).
    pub dest_total_level: i32,
    /// Ramp increment per output sample.
    pub total_level_step: i32,
    /// Amplitude envelope.
    pub envelope: EnvelopeGen,
    /// Vibrato oscillator.
    pub pitch_lfo: LfoUnit,
    /// Tremolo oscillator.
    pub amplitude_lfo: LfoUnit,
}

impl Default for Voice {
    fn default() -> Self {
        Self::new()
    }
}

impl Voice {
    /// Create a silent voice with all registers cleared.
    pub fn new() -> Self {
        Voice {
            regs: [0; REGISTERS_PER_VOICE],
            pan: 0,
            sample: SampleMetadata::default(),
            base: 0,
            format: SampleFormat::Linear8,
            offset: 0,
            step: 0,
            prev_sample: 0,
            playing: false,
            total_level: 0,
            dest_total_level: 0,
            total_level_step: 0,
            envelope: EnvelopeGen::new(),
            pitch_lfo: LfoUnit::new(LfoKind::Pitch),
            amplitude_lfo: LfoUnit::new(LfoKind::Amplitude),
        }
    }

    /// Sample number selected by registers 1 and 2 (9 bits).
    pub fn sample_index(&self) -> u16 {
        self.regs[1] as u16 | ((self.regs[2] & 1) as u16) << 8
    }

    /// Write one register and apply its side effects.
    pub fn write_register<R: SampleRom + ?Sized>(
        &mut self,
        tables: &Tables,
        rom: &R,
        reg: Register,
        data: u8,
    ) {
        self.regs[reg.index()] = data;

        match reg {
            Register::Pan => {
                self.pan = (data >> 4) & 0xf;
            }
            Register::SampleLow => self.select_sample(tables, rom),
            Register::PitchLow | Register::PitchHigh => {
                self.update_step(tables);
                self.update_envelope_rates(tables);
            }
            Register::KeyControl => {
                if KeyControl::from_bits_truncate(data).contains(KeyControl::KEY_ON) {
                    self.playing = true;
                    self.retrigger(tables);
                } else if self.playing {
                    if self.sample.release_reg != INSTANT_RELEASE {
                        self.envelope.release();
                    } else {
                        self.playing = false;
                    }
                }
            }
            Register::TotalLevel => {
                self.dest_total_level = LevelControl::level(data) as i32;
                if LevelControl::from_bits_truncate(data).contains(LevelControl::DIRECT) {
                    self.total_level = self.dest_total_level << TL_SHIFT;
                } else if (self.total_level >> TL_SHIFT) > self.dest_total_level {
                    self.total_level_step = tables.total_level_lower();
                } else {
                    self.total_level_step = tables.total_level_raise();
                }
            }
            Register::LfoVibrato | Register::LfoAmplitude => self.apply_lfo_register(tables, data),
        }
    }

    /// Decode the header picked by registers 1/2 and load its defaults.
    ///
    /// The header's LFO bytes go through the register 6 and register 7 side
    /// effects in that order.
    fn select_sample<R: SampleRom + ?Sized>(&mut self, tables: &Tables, rom: &R) {
        self.sample = SampleMetadata::read(rom, self.sample_index());

        self.regs[Register::LfoVibrato.index()] = self.sample.lfo_vibrato_reg;
        self.apply_lfo_register(tables, self.sample.lfo_vibrato_reg);
        self.regs[Register::LfoAmplitude.index()] = self.sample.lfo_amplitude_reg;
        self.apply_lfo_register(tables, self.sample.lfo_amplitude_reg);

        self.base = self.sample.start;
        self.format = self.sample.format;
        self.update_envelope_rates(tables);

        if self.playing {
            self.retrigger(tables);
        }
    }

    /// Octave and fraction from registers 2/3 to a playback step.
    fn update_step(&mut self, tables: &Tables) {
        let octave = ((self.regs[3] >> 4).wrapping_sub(1) & 0xf) as u32;
        let fraction = ((self.regs[3] & 0xf) as usize) << 6 | (self.regs[2] >> 2) as usize;

        let mut pitch = tables.freq_step(fraction);
        if octave & 8 != 0 {
            pitch >>= 16 - octave;
        } else {
            pitch <<= octave;
        }
        self.step = (pitch as f32 / tables.rate()) as u32;
    }

    fn update_envelope_rates(&mut self, tables: &Tables) {
        self.envelope.calculate(tables, &self.sample, self.regs[3]);
    }

    /// Registers 6 and 7 reconfigure both LFOs, unless the written byte is zero.
    fn apply_lfo_register(&mut self, tables: &Tables, data: u8) {
        if data == 0 {
            return;
        }
        let frequency = (self.regs[6] >> 3) & 7;
        self.pitch_lfo.configure(tables, frequency, self.regs[6] & 7);
        self.amplitude_lfo.configure(tables, frequency, self.regs[7] & 7);
    }

    /// Restart playback from the first sample with the envelope in attack.
    pub fn retrigger(&mut self, tables: &Tables) {
        self.offset = 0;
        self.prev_sample = 0;
        self.total_level = self.dest_total_level << TL_SHIFT;

        self.update_envelope_rates(tables);
        self.envelope.trigger();
    }

    /// Vibrato enabled by register 6.
    #[inline]
    pub fn vibrato_enabled(&self) -> bool {
        self.regs[6] & 7 != 0
    }

    /// Tremolo enabled by register 7.
    #[inline]
    pub fn tremolo_enabled(&self) -> bool {
        self.regs[7] & 7 != 0
    }

    /// Advance one output sample and return the left/right contributions.
    ///
    /// Returns `(0, 0)` and leaves the voice untouched when it is not playing.
    pub fn render<R: SampleRom + ?Sized>(&mut self, tables: &Tables, rom: &R) -> (i32, i32) {
        if !self.playing {
            return (0, 0);
        }

        let pan_key = (self.total_level >> TL_SHIFT) as usize | (self.pan as usize) << 7;
        let position = self.offset >> TL_SHIFT;
        let fraction = (self.offset & TL_FRACTION_MASK) as i32;

        let current = decode_sample(rom, self.base, self.format, position);
        let mut sample = (current * fraction
            + self.prev_sample * ((1 << TL_SHIFT) - fraction))
            >> TL_SHIFT;

        let mut step = self.step;
        if self.vibrato_enabled() {
            step = step.wrapping_mul(self.pitch_lfo.step(tables) as u32) >> TL_SHIFT;
        }

        self.offset = self.offset.wrapping_add(step);
        if self.offset >= self.sample.end << TL_SHIFT {
            self.offset = self.sample.loop_start << TL_SHIFT;
        }
        if position != self.offset >> TL_SHIFT {
            self.prev_sample = current;
        }

        if (self.total_level >> TL_SHIFT) != self.dest_total_level {
            self.total_level += self.total_level_step;
        }

        if self.tremolo_enabled() {
            sample = (sample * self.amplitude_lfo.step(tables)) >> TL_SHIFT;
        }

        sample = (sample * self.envelope.update(tables)) >> 10;
        if self.envelope.is_finished() {
            self.playing = false;
        }

        let (left, right) = tables.pan_gain(pan_key);
        ((left * sample) >> TL_SHIFT, (right * sample) >> TL_SHIFT)
    }

    /// Current envelope phase.
    pub fn envelope_state(&self) -> EnvelopeState {
        self.envelope.state
    }
}
