//! MultiPCM register map
//!
//! The host sees three ports. Port 1 picks a voice through a 5-bit code,
//! port 2 picks one of the eight per-voice registers, and port 0 writes data
//! into the selected register of the selected voice.
//!
//! | Reg | Contents |
//! |-----|----------|
//! | 0   | pan (bits 4-7) |
//! | 1   | sample number, low 8 bits |
//! | 2   | sample number bit 8 (bit 0), pitch fraction low 6 bits (bits 2-7) |
//! | 3   | octave (bits 4-7), pitch fraction high 4 bits |
//! | 4   | key on (bit 7) |
//! | 5   | total level (bits 1-7), direct/smoothed flag (bit 0) |
//! | 6   | LFO frequency (bits 3-5), vibrato depth (bits 0-2) |
//! | 7   | tremolo depth (bits 0-2) |

use std::fmt;

use bitflags::bitflags;
use num_derive::FromPrimitive;
use num_traits::FromPrimitive;

use super::constants::{REGISTERS_PER_VOICE, VOICE_SELECT};

/// Host-visible ports.
#[derive(Debug, Clone, Copy, PartialEq, Eq, FromPrimitive)]
pub enum Port {
    /// Data write into the selected register.
    Data = 0,
    /// Voice select.
    VoiceSelect = 1,
    /// Register select.
    RegisterSelect = 2,
}

impl Port {
    /// Decode a port offset; unknown offsets yield `None`.
    pub fn from_offset(offset: u8) -> Option<Self> {
        Port::from_u8(offset)
    }
}

/// Per-voice register slots.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, FromPrimitive)]
pub enum Register {
    /// Pan.
    Pan = 0,
    /// Sample number, low byte.
    SampleLow = 1,
    /// Sample number bit 8 and pitch fraction low bits.
    PitchLow = 2,
    /// Octave and pitch fraction high bits.
    PitchHigh = 3,
    /// Key on/off.
    KeyControl = 4,
    /// Total level.
    TotalLevel = 5,
    /// LFO frequency and vibrato depth.
    LfoVibrato = 6,
    /// Tremolo depth.
    LfoAmplitude = 7,
}

impl Register {
    /// Decode a register index. Indices above 7 do not exist.
    pub fn from_index(index: u8) -> Option<Self> {
        Register::from_u8(index)
    }

    /// Register index.
    pub fn index(self) -> usize {
        self as usize
    }
}

impl fmt::Display for Register {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Register::Pan => "PAN",
            Register::SampleLow => "SAMPLE",
            Register::PitchLow => "PITCH_L",
            Register::PitchHigh => "PITCH_H",
            Register::KeyControl => "KEY",
            Register::TotalLevel => "TL",
            Register::LfoVibrato => "LFO_VIB",
            Register::LfoAmplitude => "LFO_AM",
        };
        write!(f, "R{} ({name})", *self as u8)
    }
}

bitflags! {
    /// Key control register (R4) bits
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct KeyControl: u8 {
        /// Key on; clearing it is a key off
        const KEY_ON = 0x80;
    }
}

bitflags! {
    /// Total level register (R5) bits
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct LevelControl: u8 {
        /// Jump to the new level at once instead of ramping
        const DIRECT = 0x01;
    }
}

impl LevelControl {
    /// Destination level, 0 (loudest) to 0x7f.
    pub fn level(value: u8) -> u8 {
        (value >> 1) & 0x7f
    }
}

/// Map a voice-select code (port 1) to a voice index.
///
/// Only the low 5 bits are used. Codes whose low three bits are all set
/// address no voice.
pub fn decode_voice_select(code: u8) -> Option<usize> {
    VOICE_SELECT[(code & 0x1f) as usize].map(usize::from)
}

/// Clamp a register-select value (port 2) to the last register.
pub fn clamp_register_select(value: u8) -> usize {
    (value as usize).min(REGISTERS_PER_VOICE - 1)
}
