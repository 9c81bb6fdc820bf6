//! Save-state snapshots
//!
//! [`ChipState`] is a plain data copy of every mutable quantity of the chip.
//! It derives serde's traits so hosts can persist it in whatever format they
//! use; the chip itself never touches bytes.
//!
//! The decoded sample header is stored as decoded: register 2 doubles as the
//! pitch low byte, so registers 1/2 may no longer name the playing sample.
//! The LFO depth selection is re-derived from registers 6/7 on restore.

use serde::{Deserialize, Serialize};

use super::chip::MultiPcm;
use super::constants::{REGISTERS_PER_VOICE, VOICE_COUNT};
use super::envelope::EnvelopeState;
use super::sample::{SampleFormat, SampleMetadata};
use super::voice::Voice;
use crate::rom::SampleRom;
use crate::{MultiPcmError, Result};

/// Snapshot of one voice.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VoiceState {
    /// Raw register file.
    pub regs: [u8; REGISTERS_PER_VOICE],
    /// Header of the sample being played.
    pub sample: SampleMetadata,
    /// Voice is producing output.
    pub playing: bool,
    /// ROM address of the sample data.
    pub base: u32,
    /// Sample data format.
    pub format: SampleFormat,
    /// Playback position, `TL_SHIFT` fixed point.
    pub offset: u32,
    /// Playback step, `TL_SHIFT` fixed point.
    pub step: u32,
    /// Pan position.
    pub pan: u8,
    /// Current attenuation, `TL_SHIFT` fixed point.
    pub total_level: i32,
    /// Attenuation the ramp is heading for.
    pub dest_total_level: i32,
    /// Ramp increment.
    pub total_level_step: i32,
    /// Previous decoded sample.
    pub prev_sample: i32,
    /// Envelope level, `EG_SHIFT` fixed point.
    pub envelope_volume: i32,
    /// Envelope phase.
    pub envelope_state: EnvelopeState,
    /// Attack step.
    pub attack_rate: u32,
    /// Decay1 step.
    pub decay1_rate: u32,
    /// Decay2 step.
    pub decay2_rate: u32,
    /// Release step.
    pub release_rate: u32,
    /// Decay1 threshold.
    pub decay_level: i32,
    /// Vibrato phase.
    pub pitch_lfo_phase: u32,
    /// Vibrato phase step.
    pub pitch_lfo_step: u32,
    /// Tremolo phase.
    pub amplitude_lfo_phase: u32,
    /// Tremolo phase step.
    pub amplitude_lfo_step: u32,
}

impl From<&Voice> for VoiceState {
    fn from(voice: &Voice) -> Self {
        VoiceState {
            regs: voice.regs,
            sample: voice.sample,
            playing: voice.playing,
            base: voice.base,
            format: voice.format,
            offset: voice.offset,
            step: voice.step,
            pan: voice.pan,
            total_level: voice.total_level,
            dest_total_level: voice.dest_total_level,
            total_level_step: voice.total_level_step,
            prev_sample: voice.prev_sample,
            envelope_volume: voice.envelope.volume,
            envelope_state: voice.envelope.state,
            attack_rate: voice.envelope.attack_rate,
            decay1_rate: voice.envelope.decay1_rate,
            decay2_rate: voice.envelope.decay2_rate,
            release_rate: voice.envelope.release_rate,
            decay_level: voice.envelope.decay_level,
            pitch_lfo_phase: voice.pitch_lfo.phase,
            pitch_lfo_step: voice.pitch_lfo.phase_step,
            amplitude_lfo_phase: voice.amplitude_lfo.phase,
            amplitude_lfo_step: voice.amplitude_lfo.phase_step,
        }
    }
}

impl VoiceState {
    fn apply_to(&self, voice: &mut Voice) {
        voice.regs = self.regs;
        voice.sample = self.sample;
        voice.playing = self.playing;
        voice.base = self.base;
        voice.format = self.format;
        voice.offset = self.offset;
        voice.step = self.step;
        voice.pan = self.pan & 0xf;
        voice.total_level = self.total_level;
        voice.dest_total_level = self.dest_total_level;
        voice.total_level_step = self.total_level_step;
        voice.prev_sample = self.prev_sample;

        voice.envelope.volume = self.envelope_volume;
        voice.envelope.state = self.envelope_state;
        voice.envelope.attack_rate = self.attack_rate;
        voice.envelope.decay1_rate = self.decay1_rate;
        voice.envelope.decay2_rate = self.decay2_rate;
        voice.envelope.release_rate = self.release_rate;
        voice.envelope.decay_level = self.decay_level;

        voice.pitch_lfo.phase = self.pitch_lfo_phase;
        voice.pitch_lfo.phase_step = self.pitch_lfo_step;
        voice.pitch_lfo.select_depth(self.regs[6] & 7);
        voice.amplitude_lfo.phase = self.amplitude_lfo_phase;
        voice.amplitude_lfo.phase_step = self.amplitude_lfo_step;
        voice.amplitude_lfo.select_depth(self.regs[7] & 7);
    }
}

/// Snapshot of the whole chip.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChipState {
    /// Voice latched by port 1, `None` for a code without a voice.
    pub selected_voice: Option<usize>,
    /// Register latched by port 2.
    pub selected_register: usize,
    /// One entry per voice, in index order.
    pub voices: Vec<VoiceState>,
}

impl<R: SampleRom> MultiPcm<R> {
    /// Capture every mutable quantity of the chip.
    pub fn save_state(&self) -> ChipState {
        ChipState {
            selected_voice: self.bank().selected_voice(),
            selected_register: self.bank().selected_register(),
            voices: self.bank().voices().iter().map(VoiceState::from).collect(),
        }
    }

    /// Restore a snapshot taken by [`save_state`](Self::save_state).
    ///
    /// The snapshot is checked before anything is applied, so a rejected
    /// snapshot leaves the chip untouched.
    pub fn restore_state(&mut self, state: &ChipState) -> Result<()> {
        if state.voices.len() != VOICE_COUNT {
            return Err(MultiPcmError::StateError(format!(
                "Expected {VOICE_COUNT} voices, snapshot has {}",
                state.voices.len()
            )));
        }
        if state.selected_voice.is_some_and(|v| v >= VOICE_COUNT) {
            return Err(MultiPcmError::StateError(format!(
                "Selected voice {:?} out of range",
                state.selected_voice
            )));
        }
        if state.selected_register >= REGISTERS_PER_VOICE {
            return Err(MultiPcmError::StateError(format!(
                "Selected register {} out of range",
                state.selected_register
            )));
        }

        let bank = self.bank_mut();
        bank.set_selection(state.selected_voice, state.selected_register);
        for (voice, saved) in bank.voices_mut().iter_mut().zip(&state.voices) {
            saved.apply_to(voice);
        }

        log::debug!(
            "Restored MultiPCM state, {} voices playing",
            self.bank().active_voices()
        );
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn chip() -> MultiPcm<Vec<u8>> {
        let mut rom = vec![0u8; 0x400];
        rom[..12].copy_from_slice(&[
            0x00, 0x01, 0x00, 0x00, 0x20, 0xff, 0x00, 0x2b, 0x88, 0x54, 0x26, 0x03,
        ]);
        for i in 0..0x100 {
            rom[0x100 + i] = (i as u8).wrapping_mul(37);
        }
        let mut chip = MultiPcm::new(9_878_400, rom);
        chip.write_voice_register(2, 0, 0x30);
        chip.write_voice_register(2, 3, 0x14);
        chip.write_voice_register(2, 2, 0x80);
        chip.write_voice_register(2, 1, 0x00);
        chip.write_voice_register(2, 5, 0x10);
        chip.write_voice_register(2, 4, 0x80);
        chip
    }

    #[test]
    fn test_restore_continues_identically() {
        let mut chip = chip();
        chip.generate_frames(300);
        let state = chip.save_state();
        let expected = chip.generate_frames(500);

        let mut other = MultiPcm::new(9_878_400, chip.rom().clone());
        other.restore_state(&state).unwrap();
        assert_eq!(other.generate_frames(500), expected);
    }

    #[test]
    fn test_restore_keeps_sample_after_pitch_write() {
        let mut rom = vec![0u8; 0x2000];
        // Sample 0: long, sample 256: short loop of 16.
        rom[..12].copy_from_slice(&[
            0x00, 0x04, 0x00, 0x00, 0x00, 0x00, 0xf0, 0x00, 0xf0, 0x00, 0x0f, 0x00,
        ]);
        rom[256 * 12..257 * 12].copy_from_slice(&[
            0x00, 0x10, 0x00, 0x00, 0x04, 0xff, 0xeb, 0x00, 0xf0, 0x00, 0x0f, 0x00,
        ]);
        for i in 0..0x100 {
            rom[0x400 + i] = 0x20;
            rom[0x1000 + i] = (i as u8).wrapping_mul(29);
        }

        let mut chip = MultiPcm::new(9_878_400, rom);
        chip.write_voice_register(0, 0, 0x00);
        chip.write_voice_register(0, 3, 0x10);
        chip.write_voice_register(0, 2, 0x01);
        chip.write_voice_register(0, 1, 0x00);
        chip.write_voice_register(0, 5, 0x01);
        chip.write_voice_register(0, 4, 0x80);
        // Pitch low byte clears bit 0, which no longer names sample 256.
        chip.write_voice_register(0, 2, 0x00);
        chip.generate_frames(5);

        let playing = chip.voice(0).unwrap().sample;
        assert_eq!(playing.end, 20);
        assert_eq!(chip.voice(0).unwrap().sample_index(), 0);

        let state = chip.save_state();
        let expected = chip.generate_frames(200);

        let mut other = MultiPcm::new(9_878_400, chip.rom().clone());
        other.restore_state(&state).unwrap();
        assert_eq!(other.voice(0).unwrap().sample, playing);
        assert_eq!(other.generate_frames(200), expected);
    }

    #[test]
    fn test_restore_rederives_lfo_depth() {
        let mut chip = chip();
        chip.generate_frames(10);
        let state = chip.save_state();

        let mut other = MultiPcm::new(9_878_400, chip.rom().clone());
        other.restore_state(&state).unwrap();
        let voice = other.voice(2).unwrap();
        assert_eq!(voice.sample, chip.voice(2).unwrap().sample);
        assert_eq!(voice.pitch_lfo.depth(), 3);
        assert_eq!(voice.amplitude_lfo.depth(), 3);
        assert_eq!(other.bank().selected_voice(), Some(2));
        assert_eq!(other.bank().selected_register(), 4);
    }

    #[test]
    fn test_rejects_wrong_voice_count() {
        let mut chip = chip();
        let mut state = chip.save_state();
        state.voices.pop();
        let before = chip.save_state();
        assert!(matches!(
            chip.restore_state(&state),
            Err(MultiPcmError::StateError(_))
        ));
        assert_eq!(chip.save_state(), before);
    }

    #[test]
    fn test_rejects_bad_selection() {
        let mut chip = chip();
        let mut state = chip.save_state();
        state.selected_voice = Some(28);
        assert!(chip.restore_state(&state).is_err());
        state.selected_voice = None;
        state.selected_register = 8;
        assert!(chip.restore_state(&state).is_err());
    }

    #[test]
    fn test_json_roundtrip() {
        let mut chip = chip();
        chip.generate_frames(50);
        let state = chip.save_state();
        let json = serde_json::to_string(&state).unwrap();
        let decoded: ChipState = serde_json::from_str(&json).unwrap();
        assert_eq!(decoded, state);

        let mut fresh = MultiPcm::new(9_878_400, chip.rom().clone());
        fresh.restore_state(&decoded).unwrap();
        assert_eq!(fresh.generate_frames(64), chip.generate_frames(64));
    }
}
