//! Audio export
//!
//! Renders a chip to a 16-bit PCM WAV file, mainly for regression captures
//! and for listening to register logs offline.
//!
//! # Example
//!
//! ```no_run
//! use multipcm::export::{render_to_wav, ExportConfig};
//! use multipcm::MultiPcm;
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let rom = std::fs::read("mpr-14157.bin")?;
//! let mut chip = MultiPcm::new(8_000_000, rom);
//! chip.write_port(1, 0x00);
//! chip.write_port(2, 0x04);
//! chip.write_port(0, 0x80);
//!
//! render_to_wav(&mut chip, 44_100, "capture.wav", ExportConfig::default().fade_out(0.5))?;
//! # Ok(())
//! # }
//! ```

mod wav;
pub use wav::*;

/// Export configuration options
#[derive(Debug, Clone)]
pub struct ExportConfig {
    /// Number of audio channels (1 = mono downmix, 2 = stereo)
    pub channels: u16,
    /// Whether to scale the capture so its peak sits just below full scale
    pub normalize: bool,
    /// Fade out duration in seconds (0 = no fade)
    pub fade_out_duration: f32,
}

impl Default for ExportConfig {
    fn default() -> Self {
        Self {
            channels: 2,
            normalize: false,
            fade_out_duration: 0.0,
        }
    }
}

impl ExportConfig {
    /// Create config for a mono downmix
    pub fn mono() -> Self {
        Self {
            channels: 1,
            ..Default::default()
        }
    }

    /// Enable normalization
    pub fn normalize(mut self, enable: bool) -> Self {
        self.normalize = enable;
        self
    }

    /// Add fade out at the end
    pub fn fade_out(mut self, duration_seconds: f32) -> Self {
        self.fade_out_duration = duration_seconds;
        self
    }
}

/// Scale samples so the peak sits at 0.95 of full scale.
fn normalize_samples(samples: &mut [f32]) {
    let peak = samples.iter().fold(0.0f32, |peak, s| peak.max(s.abs()));
    if peak <= f32::EPSILON {
        return;
    }

    let scale = 0.95 / peak;
    for sample in samples.iter_mut() {
        *sample *= scale;
    }
}

/// Linear fade over the last `fade_duration` seconds of interleaved audio.
fn apply_fade_out(samples: &mut [f32], channels: usize, fade_duration: f32, sample_rate: u32) {
    if fade_duration <= 0.0 || samples.is_empty() || channels == 0 {
        return;
    }

    let frames = samples.len() / channels;
    let fade_frames = ((fade_duration * sample_rate as f32) as usize).clamp(1, frames.max(1));
    let start_fade = frames.saturating_sub(fade_frames);

    for (i, frame) in samples.chunks_exact_mut(channels).enumerate().skip(start_fade) {
        let progress = (i - start_fade + 1) as f32 / fade_frames as f32;
        let fade_factor = 1.0 - progress;
        for sample in frame.iter_mut() {
            *sample *= fade_factor;
        }
    }
}
