//! Envelope Generator
//!
//! Four-state amplitude envelope (attack, decay1, decay2, release). The volume
//! is a linear value with `EG_SHIFT` fractional bits between 0 and
//! `0x3ff << EG_SHIFT`; the mixer receives it through the linear to
//! exponential table, which turns the linear ramp into a decibel-like curve.
//!
//! Rates are looked up from 4-bit codes stored in the sample header, shifted
//! by the key rate (octave based scaling) of the voice.

use std::fmt;

use serde::{Deserialize, Serialize};

use super::constants::{EG_DECAY1_SKIP, EG_MAX_VOLUME, EG_SHIFT, KEY_RATE_SCALE_OFF};
use super::sample::SampleMetadata;
use super::tables::{Tables, RATE_ENTRIES};

/// Envelope phase.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum EnvelopeState {
    /// Volume rises towards the ceiling.
    #[default]
    Attack = 0,
    /// Volume falls towards the decay level.
    Decay1 = 1,
    /// Volume keeps falling (sustain slope) until key-off.
    Decay2 = 2,
    /// Volume falls to silence after key-off; the voice stops at zero.
    Release = 3,
}

impl fmt::Display for EnvelopeState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EnvelopeState::Attack => write!(f, "Attack"),
            EnvelopeState::Decay1 => write!(f, "Decay1"),
            EnvelopeState::Decay2 => write!(f, "Decay2"),
            EnvelopeState::Release => write!(f, "Release"),
        }
    }
}

/// Per-voice envelope generator.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct EnvelopeGen {
    /// Current linear volume (`EG_SHIFT` fixed point).
    pub volume: i32,
    /// Current phase.
    pub state: EnvelopeState,
    /// Volume added per sample during attack.
    pub attack_rate: u32,
    /// Volume removed per sample during decay1.
    pub decay1_rate: u32,
    /// Volume removed per sample during decay2.
    pub decay2_rate: u32,
    /// Volume removed per sample during release.
    pub release_rate: u32,
    /// Decay1 ends once `volume >> EG_SHIFT` drops to `decay_level << 6`.
    pub decay_level: i32,
}

impl EnvelopeGen {
    /// Create a silent envelope in the attack state.
    pub fn new() -> Self {
        Self::default()
    }

    /// Restart the envelope from silence.
    pub fn trigger(&mut self) {
        self.state = EnvelopeState::Attack;
        self.volume = 0;
    }

    /// Enter the release phase.
    pub fn release(&mut self) {
        self.state = EnvelopeState::Release;
    }

    /// True once the release phase has reached silence.
    #[inline]
    pub fn is_finished(&self) -> bool {
        self.state == EnvelopeState::Release && self.volume == 0
    }

    /// Derive the four rates and the decay threshold for a sample.
    ///
    /// `pitch_high` is the voice's register 3, whose octave and top fraction
    /// bit feed the key rate.
    pub fn calculate(&mut self, tables: &Tables, sample: &SampleMetadata, pitch_high: u8) {
        let rate = key_rate(pitch_high, sample.key_rate_scale);

        self.attack_rate = get_rate(tables.attack_steps(), rate, sample.attack_reg);
        self.decay1_rate = get_rate(tables.decay_release_steps(), rate, sample.decay1_reg);
        self.decay2_rate = get_rate(tables.decay_release_steps(), rate, sample.decay2_reg);
        self.release_rate = get_rate(tables.decay_release_steps(), rate, sample.release_reg);
        self.decay_level = 0xf - (sample.decay_level & 0xf) as i32;
    }

    /// Advance one sample and return the exponential gain (`TL_SHIFT` fixed point).
    pub fn update(&mut self, tables: &Tables) -> i32 {
        match self.state {
            EnvelopeState::Attack => {
                self.volume = self.volume.saturating_add(self.attack_rate as i32);
                if self.volume >= EG_MAX_VOLUME {
                    self.state = if self.decay1_rate >= EG_DECAY1_SKIP {
                        EnvelopeState::Decay2
                    } else {
                        EnvelopeState::Decay1
                    };
                    self.volume = EG_MAX_VOLUME;
                }
            }
            EnvelopeState::Decay1 => {
                self.volume = (self.volume - self.decay1_rate as i32).max(0);
                if (self.volume >> EG_SHIFT) <= (self.decay_level << 6) {
                    self.state = EnvelopeState::Decay2;
                }
            }
            EnvelopeState::Decay2 => {
                self.volume = (self.volume - self.decay2_rate as i32).max(0);
            }
            EnvelopeState::Release => {
                self.volume = (self.volume - self.release_rate as i32).max(0);
            }
        }

        tables.exp_volume((self.volume >> EG_SHIFT) as usize)
    }
}

/// Octave-derived key rate added to every rate index.
///
/// Returns 0 when the sample disables key rate scaling (code `0xF`).
pub fn key_rate(pitch_high: u8, key_rate_scale: u8) -> i32 {
    if key_rate_scale == KEY_RATE_SCALE_OFF {
        return 0;
    }

    let mut octave = ((pitch_high >> 4).wrapping_sub(1) & 0xf) as i32;
    if octave & 8 != 0 {
        octave -= 16;
    }
    (octave + key_rate_scale as i32) * 2 + ((pitch_high >> 3) & 1) as i32
}

/// Look up the step for a 4-bit rate code.
///
/// Code 0 always maps to the slowest entry and code 15 to the fastest;
/// anything else indexes `4 * code + key_rate`, clamped to the table.
pub fn get_rate(steps: &[u32; RATE_ENTRIES], key_rate: i32, code: u8) -> u32 {
    match code & 0xf {
        0 => steps[0],
        0xf => steps[RATE_ENTRIES - 1],
        code => {
            let index = (4 * code as i32 + key_rate).clamp(0, RATE_ENTRIES as i32 - 1);
            steps[index as usize]
        }
    }
}
