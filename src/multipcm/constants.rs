//! MultiPCM Hardware Constants
//!
//! Fixed-point widths, the clock divider and the measured timing tables that
//! every other component derives its lookup tables from.

/// Number of independent voices (slots) on the chip.
pub const VOICE_COUNT: usize = 28;

/// Number of registers per voice.
pub const REGISTERS_PER_VOICE: usize = 8;

/// Bytes per entry in the sample ROM header table.
pub const SAMPLE_HEADER_SIZE: u32 = 12;

/// Input clock to output sample rate divider.
pub const CLOCK_DIVIDER: f32 = 224.0;

/// Fractional bits of playback offsets, total level and gain tables.
pub const TL_SHIFT: u32 = 12;

/// Fractional bits of the envelope volume.
pub const EG_SHIFT: u32 = 16;

/// Fractional bits of the LFO phase and LFO scale tables.
pub const LFO_SHIFT: u32 = 8;

/// Envelope ceiling, reached at the end of the attack phase.
pub const EG_MAX_VOLUME: i32 = 0x3ff << EG_SHIFT;

/// Decay1 rates at or above this value skip straight to decay2.
pub const EG_DECAY1_SKIP: u32 = 0x400 << EG_SHIFT;

/// Rate code that releases a voice instantly on key-off.
pub const INSTANT_RELEASE: u8 = 0xf;

/// Key-rate-scale code that disables key rate scaling.
pub const KEY_RATE_SCALE_OFF: u8 = 0xf;

/// Envelope timings in milliseconds, measured against a 44.1 kHz timebase.
pub const BASE_TIMES: [f64; 64] = [
    0.0, 0.0, 0.0, 0.0, //
    6222.95, 4978.37, 4148.66, 3556.01, //
    3111.47, 2489.21, 2074.33, 1778.00, //
    1555.74, 1244.63, 1037.19, 889.02, //
    777.87, 622.31, 518.59, 444.54, //
    388.93, 311.16, 259.32, 222.27, //
    194.47, 155.60, 129.66, 111.16, //
    97.23, 77.82, 64.85, 55.60, //
    48.62, 38.91, 32.43, 27.80, //
    24.31, 19.46, 16.24, 13.92, //
    12.15, 9.75, 8.12, 6.98, //
    6.08, 4.90, 4.08, 3.49, //
    3.04, 2.49, 2.13, 1.90, //
    1.72, 1.41, 1.18, 1.04, //
    0.91, 0.73, 0.59, 0.50, //
    0.45, 0.45, 0.45, 0.45,
];

/// Decay and release run this much slower than attack for the same rate index.
pub const ATTACK_RATE_TO_DECAY_RATE: f64 = 14.32833;

/// Timebase the envelope and total level timings were measured against.
pub const TIMEBASE_HZ: f64 = 44_100.0;

/// Total level ramp duration over the full 0x80 range, in milliseconds.
pub const TOTAL_LEVEL_RAMP_MS: f32 = 78.2;

/// LFO frequencies in Hz, selected by register 6 bits 3-5.
pub const LFO_FREQ: [f32; 8] = [0.168, 2.019, 3.196, 4.206, 5.215, 5.888, 6.224, 7.066];

/// Vibrato depth limits in cents, selected by register 6 bits 0-2.
pub const PHASE_SCALE_LIMIT: [f32; 8] = [0.0, 3.378, 5.065, 6.750, 10.114, 20.170, 40.180, 79.307];

/// Tremolo depth limits in decibels, selected by register 7 bits 0-2.
pub const AMPLITUDE_SCALE_LIMIT: [f32; 8] = [0.0, 0.4, 0.8, 1.5, 3.0, 6.0, 12.0, 24.0];

/// Voice-select bus codes mapped to voice indices.
///
/// The chip decodes the 5-bit code as four groups of eight, and the eighth
/// code of every group has no physical voice behind it.
pub const VOICE_SELECT: [Option<u8>; 32] = [
    Some(0), Some(1), Some(2), Some(3), Some(4), Some(5), Some(6), None, //
    Some(7), Some(8), Some(9), Some(10), Some(11), Some(12), Some(13), None, //
    Some(14), Some(15), Some(16), Some(17), Some(18), Some(19), Some(20), None, //
    Some(21), Some(22), Some(23), Some(24), Some(25), Some(26), Some(27), None,
];

/// Convert a float to an unsigned fixed-point value with `bits` fractional bits.
///
/// Truncates toward zero like the hardware reference tables.
#[inline]
pub fn value_to_fixed(bits: u32, value: f32) -> u32 {
    ((1u32 << bits) as f32 * value) as u32
}
