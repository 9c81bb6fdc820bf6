//! WAV file export functionality

use super::{apply_fade_out, normalize_samples, ExportConfig};
use crate::backend::PcmChipBackend;
use crate::multipcm::StereoFrame;
use crate::{MultiPcmError, Result};
use std::path::Path;

/// Render `frame_count` frames of a backend into a 16-bit WAV file.
///
/// The file's sample rate is the backend's output rate rounded to the
/// nearest Hz. Without normalization or fade the written samples are the
/// chip's frames bit for bit.
pub fn render_to_wav<B, P>(
    backend: &mut B,
    frame_count: usize,
    output_path: P,
    config: ExportConfig,
) -> Result<()>
where
    B: PcmChipBackend + ?Sized,
    P: AsRef<Path>,
{
    if !(1..=2).contains(&config.channels) {
        return Err(MultiPcmError::ConfigError(format!(
            "Unsupported channel count {}",
            config.channels
        )));
    }

    let sample_rate = backend.sample_rate().round() as u32;
    log::info!(
        "Rendering {frame_count} frames ({:.1}s) at {sample_rate} Hz",
        frame_count as f32 / sample_rate.max(1) as f32
    );
    let frames = backend.generate_frames(frame_count);
    let mut samples = interleave(&frames, config.channels);

    if config.normalize {
        log::debug!("Normalizing capture");
        normalize_samples(&mut samples);
    }

    if config.fade_out_duration > 0.0 {
        log::debug!("Applying {:.1}s fade out", config.fade_out_duration);
        apply_fade_out(
            &mut samples,
            config.channels as usize,
            config.fade_out_duration,
            sample_rate,
        );
    }

    log::info!("Writing WAV file to {}", output_path.as_ref().display());
    write_wav_file(output_path.as_ref(), &samples, sample_rate, config.channels)
}

/// Frames to interleaved floats, averaging both sides for mono.
fn interleave(frames: &[StereoFrame], channels: u16) -> Vec<f32> {
    let mut samples = Vec::with_capacity(frames.len() * channels as usize);
    for frame in frames {
        let (left, right) = frame.to_f32();
        if channels == 1 {
            samples.push((left + right) * 0.5);
        } else {
            samples.push(left);
            samples.push(right);
        }
    }
    samples
}

/// Write samples to WAV file
fn write_wav_file(path: &Path, samples: &[f32], sample_rate: u32, channels: u16) -> Result<()> {
    let spec = hound::WavSpec {
        channels,
        sample_rate,
        bits_per_sample: 16,
        sample_format: hound::SampleFormat::Int,
    };

    let mut writer =
        hound::WavWriter::create(path, spec).map_err(|e| wav_error("create WAV file", e))?;

    for &sample in samples {
        let sample_i16 = (sample * 32768.0).round().clamp(-32768.0, 32767.0) as i16;
        writer
            .write_sample(sample_i16)
            .map_err(|e| wav_error("write sample", e))?;
    }

    writer
        .finalize()
        .map_err(|e| wav_error("finalize WAV file", e))?;

    Ok(())
}

/// Filesystem failures stay I/O errors; everything else is a WAV format error.
fn wav_error(action: &str, error: hound::Error) -> MultiPcmError {
    match error {
        hound::Error::IoError(e) => MultiPcmError::Io(e),
        other => MultiPcmError::AudioFileError(format!("Failed to {action}: {other}")),
    }
}
