//! MultiPCM Emulation Domain
//!
//! Yamaha YMW-258-F "GEW8" / Sega 315-5560 emulation: 28 ROM sample voices
//! with per-voice envelope, vibrato, tremolo, level and pan, mixed to stereo.
//!
//! Implementation:
//! - `tables` - fixed-point lookup tables derived from the output rate
//! - `sample` - sample header and PCM decoding
//! - `voice` / `bank` - register file and side effects
//! - `chip` - the per-tick synthesis loop

// Internal modules
pub mod bank;
pub mod chip;
pub mod constants;
pub mod envelope;
pub mod lfo;
pub mod mixer;
pub mod registers;
pub mod sample;
pub mod state;
pub mod tables;
pub mod voice;

// Re-export public API
pub use bank::VoiceBank;
pub use chip::{output_rate, MultiPcm, DEFAULT_CLOCK};
pub use envelope::{EnvelopeGen, EnvelopeState};
pub use lfo::{LfoKind, LfoUnit};
pub use mixer::StereoFrame;
pub use registers::{Port, Register};
pub use sample::{SampleFormat, SampleMetadata};
pub use state::{ChipState, VoiceState};
pub use tables::Tables;
pub use voice::Voice;
