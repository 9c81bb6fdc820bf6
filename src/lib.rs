//! Sega MultiPCM Emulator
//!
//! A sample-accurate emulator of the Yamaha YMW-258-F "GEW8" wavetable chip,
//! sold by Sega as the 315-5560 "MultiPCM" and used on the Model 1, Model 2
//! and System Multi 32 boards.
//!
//! # Features
//! - 28 voices playing 8-bit or packed 12-bit ROM samples
//! - Four-stage envelope with key rate scaling
//! - Per-voice vibrato and tremolo LFOs
//! - Smoothed total level and 16-step pan
//! - Save-state snapshots through serde
//! - Optional WAV rendering
//!
//! # Crate feature flags
//! - `emulator` (default): Core MultiPCM emulator
//! - `export-wav` (optional): WAV file rendering via hound
//!
//! # Backend Trait
//! The `PcmChipBackend` trait lets hosts drive the chip (or a wrapper around
//! it) without naming the ROM type.
//!
//! # Quick start
//! ```
//! use multipcm::MultiPcm;
//!
//! let rom = vec![0u8; 0x1000];
//! let mut chip = MultiPcm::new(8_000_000, rom);
//! chip.write_port(1, 0x00); // Voice 0
//! chip.write_port(2, 0x01); // Sample register
//! chip.write_port(0, 0x00); // Sample 0
//! chip.write_port(2, 0x04); // Key register
//! chip.write_port(0, 0x80); // Key on
//! let frame = chip.clock();
//! assert_eq!(frame.left, 0);
//! ```

#![warn(missing_docs)]

// Domain modules
pub mod backend; // Backend trait abstraction
pub mod config;
pub mod multipcm; // MultiPCM emulation (core)
pub mod rom; // Sample ROM access
pub mod shared; // Thread-shared chip handle

#[cfg(feature = "export-wav")]
pub mod export; // WAV rendering

/// Error types for MultiPCM emulator operations
///
/// The synthesis path itself cannot fail; these cover the host-facing edges
/// (configuration, ROM table parsing, snapshot restore and export).
#[derive(thiserror::Error, Debug)]
pub enum MultiPcmError {
    /// IO error from filesystem
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Invalid configuration
    #[error("Invalid configuration: {0}")]
    ConfigError(String),

    /// Malformed ROM or configuration data
    #[error("Parse error: {0}")]
    ParseError(String),

    /// Snapshot does not fit this chip
    #[error("Invalid state snapshot: {0}")]
    StateError(String),

    /// Audio file writing failed
    #[error("Audio file error: {0}")]
    AudioFileError(String),

    /// Generic error
    #[error("{0}")]
    Other(String),
}

impl From<String> for MultiPcmError {
    /// Converts a String into `MultiPcmError::Other`.
    ///
    /// Prefer the specific variants (`ConfigError`, `StateError`, ...) where
    /// the caller may want to tell failures apart.
    fn from(msg: String) -> Self {
        MultiPcmError::Other(msg)
    }
}

impl From<&str> for MultiPcmError {
    /// Converts a string slice into `MultiPcmError::Other`.
    fn from(msg: &str) -> Self {
        MultiPcmError::Other(msg.to_string())
    }
}

/// Result type for emulator operations
pub type Result<T> = std::result::Result<T, MultiPcmError>;

// Public API exports
pub use backend::PcmChipBackend;
pub use config::ChipConfig;
pub use multipcm::{ChipState, MultiPcm, SampleMetadata, StereoFrame};
pub use rom::{RomFn, SampleRom};
pub use shared::SharedChip;

#[cfg(feature = "export-wav")]
pub use export::{render_to_wav, ExportConfig};
