//! Sample headers and PCM decoding
//!
//! The first part of the sample ROM is a table of 12-byte headers, one per
//! instrument sample, closely related to the YMF278B (OPL4) layout:
//!
//! | Bytes | Contents |
//! |-------|----------|
//! | 0-2   | start address, big endian; bit 23 = 12-bit format, bits 21-22 unused |
//! | 3-4   | loop start, in samples |
//! | 5-6   | two's complement negation of the sample count |
//! | 7     | LFO frequency + vibrato depth (copied to register 6) |
//! | 8     | attack (high nibble), decay1 (low nibble) |
//! | 9     | decay level (high nibble), decay2 (low nibble) |
//! | 10    | key rate scale (high nibble), release (low nibble) |
//! | 11    | tremolo depth (copied to register 7) |
//!
//! Sample data is either signed 8-bit or packed 12-bit, where every 6 bytes
//! hold 4 samples sharing nibbles.

use serde::{Deserialize, Serialize};

use super::constants::SAMPLE_HEADER_SIZE;
use crate::rom::SampleRom;
use crate::{MultiPcmError, Result};

/// Storage format of a sample's PCM data.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum SampleFormat {
    /// One signed byte per sample.
    #[default]
    Linear8,
    /// Four 12-bit samples packed into six bytes.
    Linear12,
}

impl SampleFormat {
    /// Format selected by bit 23 of a header start field.
    pub fn from_start_field(start: u32) -> Self {
        if start & 0x80_0000 != 0 {
            SampleFormat::Linear12
        } else {
            SampleFormat::Linear8
        }
    }
}

/// Decoded playback parameters of one ROM sample.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct SampleMetadata {
    /// ROM byte address of the first sample (22 bits).
    pub start: u32,
    /// PCM storage format.
    pub format: SampleFormat,
    /// Header bits 21-22, used by some MU5 samples for unknown purposes.
    pub reserved: u8,
    /// Loop start, in samples.
    pub loop_start: u32,
    /// End of the sample, in samples (exclusive).
    pub end: u32,
    /// Attack rate code.
    pub attack_reg: u8,
    /// Decay1 rate code.
    pub decay1_reg: u8,
    /// Decay2 rate code.
    pub decay2_reg: u8,
    /// Decay level code; decay1 ends at `(0xF - level) << 6`.
    pub decay_level: u8,
    /// Release rate code; `0xF` stops the voice at key-off.
    pub release_reg: u8,
    /// Key rate scale code; `0xF` disables scaling.
    pub key_rate_scale: u8,
    /// LFO frequency and vibrato depth, loaded into register 6.
    pub lfo_vibrato_reg: u8,
    /// Tremolo depth, loaded into register 7.
    pub lfo_amplitude_reg: u8,
}

impl SampleMetadata {
    /// Decode one 12-byte header.
    pub fn from_header(header: &[u8; SAMPLE_HEADER_SIZE as usize]) -> Self {
        let start_field =
            (header[0] as u32) << 16 | (header[1] as u32) << 8 | header[2] as u32;
        let negated_length = (header[5] as u32) << 8 | header[6] as u32;

        SampleMetadata {
            start: start_field & 0x3f_ffff,
            format: SampleFormat::from_start_field(start_field),
            reserved: ((start_field >> 21) & 3) as u8,
            loop_start: (header[3] as u32) << 8 | header[4] as u32,
            end: 0xffff - negated_length,
            attack_reg: (header[8] >> 4) & 0xf,
            decay1_reg: header[8] & 0xf,
            decay2_reg: header[9] & 0xf,
            decay_level: (header[9] >> 4) & 0xf,
            release_reg: header[10] & 0xf,
            key_rate_scale: (header[10] >> 4) & 0xf,
            lfo_vibrato_reg: header[7],
            lfo_amplitude_reg: header[11] & 0xf,
        }
    }

    /// Read and decode header `index` (9 bits) from the sample ROM.
    pub fn read<R: SampleRom + ?Sized>(rom: &R, index: u16) -> Self {
        let address = (index as u32 & 0x1ff) * SAMPLE_HEADER_SIZE;
        let header: [u8; SAMPLE_HEADER_SIZE as usize] =
            std::array::from_fn(|i| rom.read_byte(address + i as u32));
        let sample = Self::from_header(&header);
        log::debug!(
            "Sample {index:03X}: start {:06X} {:?} loop {:04X} end {:04X} AR {:X} D1R {:X} D2R {:X} DL {:X} RR {:X} KRS {:X}",
            sample.start,
            sample.format,
            sample.loop_start,
            sample.end,
            sample.attack_reg,
            sample.decay1_reg,
            sample.decay2_reg,
            sample.decay_level,
            sample.release_reg,
            sample.key_rate_scale,
        );
        sample
    }

    /// Decode a whole header table from an in-memory ROM dump.
    ///
    /// The table must be a whole number of 12-byte entries.
    pub fn parse_table(data: &[u8]) -> Result<Vec<Self>> {
        let entry = SAMPLE_HEADER_SIZE as usize;
        if data.len() % entry != 0 {
            return Err(MultiPcmError::ParseError(format!(
                "Header table length {} is not a multiple of {entry}",
                data.len()
            )));
        }

        let mut samples = Vec::with_capacity(data.len() / entry);
        for chunk in data.chunks_exact(entry) {
            let mut header = [0u8; SAMPLE_HEADER_SIZE as usize];
            header.copy_from_slice(chunk);
            samples.push(Self::from_header(&header));
        }
        Ok(samples)
    }

    /// Number of samples in the loop.
    pub fn loop_length(&self) -> u32 {
        self.end.saturating_sub(self.loop_start)
    }
}

/// Decode the sample at `position` (in samples) of the data starting at `base`.
///
/// The result is a 16-bit value sign-extended to `i32`.
#[inline]
pub fn decode_sample<R: SampleRom + ?Sized>(
    rom: &R,
    base: u32,
    format: SampleFormat,
    position: u32,
) -> i32 {
    match format {
        SampleFormat::Linear8 => decode_linear8(rom, base, position) as i32,
        SampleFormat::Linear12 => decode_linear12(rom, base, position) as i32,
    }
}

/// One signed byte, scaled to the top of a 16-bit word.
#[inline]
pub fn decode_linear8<R: SampleRom + ?Sized>(rom: &R, base: u32, position: u32) -> i16 {
    ((rom.read_byte(base.wrapping_add(position)) as u16) << 8) as i16
}

/// One 12-bit sample out of a 6-byte group of four.
///
/// Byte layout of a group, `H`/`L` being the high byte and low nibble of
/// each sample:
///
/// ```text
/// byte:   0    1        2    3    4        5
///         H0   L1|L0    H1   H2   L3|L2    H3
/// ```
#[inline]
pub fn decode_linear12<R: SampleRom + ?Sized>(rom: &R, base: u32, position: u32) -> i16 {
    let group = base.wrapping_add((position >> 2).wrapping_mul(6));
    let byte = |offset: u32| rom.read_byte(group.wrapping_add(offset));

    match position & 3 {
        0 => pack12(byte(0), (byte(1) & 0x0f) << 4),
        1 => pack12(byte(2), byte(1) & 0xf0),
        2 => pack12(byte(3), (byte(4) & 0x0f) << 4),
        _ => pack12(byte(5), byte(4) & 0xf0),
    }
}

#[inline]
fn pack12(high: u8, low: u8) -> i16 {
    ((high as u16) << 8 | low as u16) as i16
}
