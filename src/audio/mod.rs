//! Audio capture, clip encoding, and playback.

pub mod capture;
pub mod playback;
pub mod recorder;

use crate::error::{ClientError, Result};

/// Fixed file name used for the clip's multipart part.
pub const CLIP_FILE_NAME: &str = "recording.wav";

/// Mime type of every finalized clip.
pub const CLIP_MIME: &str = "audio/wav";

/// One finalized, WAV-encoded recording produced by a capture session.
#[derive(Debug, Clone)]
pub struct AudioClip {
    /// Complete WAV file bytes (16-bit PCM, mono).
    pub data: Vec<u8>,
    /// Sample rate the clip was encoded at.
    pub sample_rate: u32,
}

impl AudioClip {
    /// Seal raw f32 samples into a WAV clip.
    ///
    /// # Errors
    ///
    /// Returns an error if WAV encoding fails.
    pub fn from_samples(samples: &[f32], sample_rate: u32) -> Result<Self> {
        let data = encode_wav(samples, sample_rate)?;
        Ok(Self { data, sample_rate })
    }
}

/// Encode mono f32 samples as a 16-bit PCM WAV file in memory.
fn encode_wav(samples: &[f32], sample_rate: u32) -> Result<Vec<u8>> {
    let spec = hound::WavSpec {
        channels: 1,
        sample_rate,
        bits_per_sample: 16,
        sample_format: hound::SampleFormat::Int,
    };

    let mut cursor = std::io::Cursor::new(Vec::new());
    let mut writer = hound::WavWriter::new(&mut cursor, spec)
        .map_err(|e| ClientError::Audio(format!("failed to create wav writer: {e}")))?;
    for &s in samples {
        let v = (s.clamp(-1.0, 1.0) * f32::from(i16::MAX)).round() as i16;
        writer
            .write_sample(v)
            .map_err(|e| ClientError::Audio(format!("failed to write wav sample: {e}")))?;
    }
    writer
        .finalize()
        .map_err(|e| ClientError::Audio(format!("failed to finalize wav: {e}")))?;

    Ok(cursor.into_inner())
}

/// Decode a WAV file into mono f32 samples and its sample rate.
///
/// Multi-channel files are averaged down to mono.
pub(crate) fn decode_wav(data: &[u8]) -> Result<(Vec<f32>, u32)> {
    let mut reader = hound::WavReader::new(std::io::Cursor::new(data))
        .map_err(|e| ClientError::Audio(format!("invalid wav data: {e}")))?;
    let spec = reader.spec();

    let interleaved: Vec<f32> = match spec.sample_format {
        hound::SampleFormat::Int => {
            let scale = f32::from(i16::MAX);
            reader
                .samples::<i16>()
                .map(|s| s.map(|v| f32::from(v) / scale))
                .collect::<std::result::Result<_, _>>()
                .map_err(|e| ClientError::Audio(format!("wav read error: {e}")))?
        }
        hound::SampleFormat::Float => reader
            .samples::<f32>()
            .collect::<std::result::Result<_, _>>()
            .map_err(|e| ClientError::Audio(format!("wav read error: {e}")))?,
    };

    let channels = spec.channels.max(1) as usize;
    let samples = if channels > 1 {
        interleaved
            .chunks_exact(channels)
            .map(|frame| frame.iter().sum::<f32>() / channels as f32)
            .collect()
    } else {
        interleaved
    };

    Ok((samples, spec.sample_rate))
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]

    use super::*;

    #[test]
    fn clip_is_a_riff_wave_file() {
        let clip = AudioClip::from_samples(&[0.0, 0.5, -0.5], 16_000).unwrap();
        assert_eq!(&clip.data[0..4], b"RIFF");
        assert_eq!(&clip.data[8..12], b"WAVE");
        assert_eq!(clip.sample_rate, 16_000);
    }

    #[test]
    fn encode_decode_round_trip() {
        let samples = vec![0.0, 0.25, -0.25, 1.0, -1.0];
        let clip = AudioClip::from_samples(&samples, 16_000).unwrap();
        let (decoded, rate) = decode_wav(&clip.data).unwrap();
        assert_eq!(rate, 16_000);
        assert_eq!(decoded.len(), samples.len());
        for (a, b) in decoded.iter().zip(&samples) {
            assert!((a - b).abs() < 1e-3, "{a} vs {b}");
        }
    }

    #[test]
    fn encode_clamps_out_of_range_samples() {
        let clip = AudioClip::from_samples(&[2.0, -2.0], 8_000).unwrap();
        let (decoded, _) = decode_wav(&clip.data).unwrap();
        assert!((decoded[0] - 1.0).abs() < 1e-3);
        assert!((decoded[1] + 1.0).abs() < 1e-3);
    }

    #[test]
    fn decode_rejects_garbage() {
        assert!(decode_wav(b"not a wav file").is_err());
    }

    #[test]
    fn decode_averages_stereo_to_mono() {
        let spec = hound::WavSpec {
            channels: 2,
            sample_rate: 8_000,
            bits_per_sample: 16,
            sample_format: hound::SampleFormat::Int,
        };
        let mut cursor = std::io::Cursor::new(Vec::new());
        let mut writer = hound::WavWriter::new(&mut cursor, spec).unwrap();
        for _ in 0..4 {
            writer.write_sample(i16::MAX).unwrap();
            writer.write_sample(0i16).unwrap();
        }
        writer.finalize().unwrap();

        let (samples, rate) = decode_wav(&cursor.into_inner()).unwrap();
        assert_eq!(rate, 8_000);
        assert_eq!(samples.len(), 4);
        assert!((samples[0] - 0.5).abs() < 1e-3);
    }
}
