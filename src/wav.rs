use std::path::Path;

use crate::error::{MixError, Result};

/// Header fields needed to index and window an utterance.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WavInfo {
    pub sample_rate: u32,
    pub channels: u16,
    /// Samples per channel.
    pub frames: usize,
}

pub fn wav_info(path: &Path) -> Result<WavInfo> {
    let reader = hound::WavReader::open(path)?;
    let spec = reader.spec();
    Ok(WavInfo {
        sample_rate: spec.sample_rate,
        channels: spec.channels,
        frames: reader.duration() as usize,
    })
}

/// Reads `len` frames of a mono file starting at frame `start`, as float32.
///
/// Integer PCM is scaled by `2^(bits - 1)` so full scale maps to [-1, 1).
pub fn read_wav_window(path: &Path, start: usize, len: usize) -> Result<Vec<f32>> {
    let mut reader = hound::WavReader::open(path)?;
    let spec = reader.spec();
    if spec.channels != 1 {
        return Err(MixError::NotMono {
            path: path.to_path_buf(),
            channels: spec.channels,
        });
    }

    let frames = reader.duration() as usize;
    if start.checked_add(len).is_none_or(|end| end > frames) {
        return Err(MixError::ShortRead {
            path: path.to_path_buf(),
            start,
            requested: len,
            read: frames.saturating_sub(start),
        });
    }
    reader.seek(start as u32)?;

    let samples: Vec<f32> = match spec.sample_format {
        hound::SampleFormat::Float => reader
            .samples::<f32>()
            .take(len)
            .collect::<std::result::Result<_, _>>()?,
        hound::SampleFormat::Int => {
            let full_scale = (1u64 << (spec.bits_per_sample - 1)) as f32;
            reader
                .samples::<i32>()
                .take(len)
                .map(|s| s.map(|v| v as f32 / full_scale))
                .collect::<std::result::Result<_, _>>()?
        }
    };

    if samples.len() != len {
        return Err(MixError::ShortRead {
            path: path.to_path_buf(),
            start,
            requested: len,
            read: samples.len(),
        });
    }
    Ok(samples)
}

pub fn save_wav(samples: &[f32], path: &Path, sample_rate: u32) -> Result<()> {
    let spec = hound::WavSpec {
        channels: 1,
        sample_rate,
        bits_per_sample: 32,
        sample_format: hound::SampleFormat::Float,
    };

    let mut writer = hound::WavWriter::create(path, spec)?;
    for &sample in samples {
        writer.write_sample(sample)?;
    }

    writer.finalize()?;
    Ok(())
}
