//! WAV file reading and writing.

use std::path::Path;

use hound::{SampleFormat, WavReader, WavWriter};

use crate::Result;

/// WAV file specification.
#[derive(Debug, Clone, Copy)]
pub struct WavSpec {
    /// Number of audio channels (1 = mono, 2 = stereo).
    pub channels: u16,
    /// Sample rate in Hz (e.g. 44100, 48000).
    pub sample_rate: u32,
    /// Bit depth per sample (16, 24, or 32 = float).
    pub bits_per_sample: u16,
}

impl Default for WavSpec {
    fn default() -> Self {
        Self {
            channels: 2,
            sample_rate: 48000,
            bits_per_sample: 32,
        }
    }
}

impl From<hound::WavSpec> for WavSpec {
    fn from(spec: hound::WavSpec) -> Self {
        Self {
            channels: spec.channels,
            sample_rate: spec.sample_rate,
            bits_per_sample: spec.bits_per_sample,
        }
    }
}

impl From<WavSpec> for hound::WavSpec {
    fn from(spec: WavSpec) -> Self {
        hound::WavSpec {
            channels: spec.channels,
            sample_rate: spec.sample_rate,
            bits_per_sample: spec.bits_per_sample,
            sample_format: if spec.bits_per_sample == 32 {
                SampleFormat::Float
            } else {
                SampleFormat::Int
            },
        }
    }
}

/// Writes planar channels to a WAV file, interleaving them.
///
/// `spec.channels` is taken from `channels.len()`; all channels must share
/// one length.
pub fn write_wav<P: AsRef<Path>>(path: P, channels: &[Vec<f32>], spec: WavSpec) -> Result<()> {
    let spec = WavSpec {
        channels: channels.len() as u16,
        ..spec
    };
    let frames = channels.first().map_or(0, |c| c.len());
    debug_assert!(channels.iter().all(|c| c.len() == frames));

    let mut writer = WavWriter::create(path, hound::WavSpec::from(spec))?;
    if spec.bits_per_sample == 32 {
        for frame in 0..frames {
            for channel in channels {
                writer.write_sample(channel[frame])?;
            }
        }
    } else {
        let max_val = (1i32 << (spec.bits_per_sample - 1)) as f32;
        for frame in 0..frames {
            for channel in channels {
                let int_sample =
                    (channel[frame] * max_val).clamp(-max_val, max_val - 1.0) as i32;
                writer.write_sample(int_sample)?;
            }
        }
    }
    writer.finalize()?;
    Ok(())
}

/// Reads a WAV file as mono f32 samples plus its spec.
///
/// Multi-channel files are mixed down by averaging; useful for loading
/// table contents.
pub fn read_wav<P: AsRef<Path>>(path: P) -> Result<(Vec<f32>, WavSpec)> {
    let reader = WavReader::open(path)?;
    let spec = WavSpec::from(reader.spec());
    let channels = spec.channels as usize;

    let samples: Vec<f32> = match reader.spec().sample_format {
        SampleFormat::Float => reader
            .into_samples::<f32>()
            .collect::<std::result::Result<Vec<_>, _>>()?,
        SampleFormat::Int => {
            let max_val = (1i32 << (spec.bits_per_sample - 1)) as f32;
            reader
                .into_samples::<i32>()
                .map(|s| s.map(|v| v as f32 / max_val))
                .collect::<std::result::Result<Vec<_>, _>>()?
        }
    };

    let mono = if channels > 1 {
        samples
            .chunks(channels)
            .map(|chunk| chunk.iter().sum::<f32>() / channels as f32)
            .collect()
    } else {
        samples
    };

    Ok((mono, spec))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn float_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out.wav");

        let left: Vec<f32> = (0..64).map(|i| i as f32 / 64.0).collect();
        let right: Vec<f32> = left.iter().map(|v| -v).collect();
        write_wav(&path, &[left.clone(), right.clone()], WavSpec::default()).unwrap();

        let (mono, spec) = read_wav(&path).unwrap();
        assert_eq!(spec.channels, 2);
        assert_eq!(spec.sample_rate, 48000);
        // Left and right cancel in the mixdown.
        assert_eq!(mono.len(), 64);
        assert!(mono.iter().all(|&v| v.abs() < 1e-6));
    }

    #[test]
    fn pcm16_round_trip_is_close() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out16.wav");

        let samples: Vec<f32> = (0..32).map(|i| (i as f32 / 32.0) - 0.5).collect();
        let spec = WavSpec {
            bits_per_sample: 16,
            ..WavSpec::default()
        };
        write_wav(&path, &[samples.clone()], spec).unwrap();

        let (read, spec) = read_wav(&path).unwrap();
        assert_eq!(spec.channels, 1);
        assert_eq!(spec.bits_per_sample, 16);
        for (a, b) in read.iter().zip(samples.iter()) {
            assert!((a - b).abs() < 1e-3, "{a} vs {b}");
        }
    }
}
