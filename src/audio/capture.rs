//! Microphone chunk capture using cpal.
//!
//! Opens the device at its native configuration and converts each callback
//! buffer to mono at the configured recording rate before handing it to the
//! recorder's collector channel.

use crate::config::AudioConfig;
use crate::error::{ClientError, Result};
use cpal::StreamConfig;
use cpal::traits::{DeviceTrait, HostTrait, StreamTrait};
use std::time::Duration;
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info};

/// An opened microphone, ready to stream chunks.
///
/// Device and stream-config resolution happens in [`MicCapture::open`], so a
/// missing or denied microphone surfaces before any recording state changes.
pub struct MicCapture {
    device: cpal::Device,
    stream_config: StreamConfig,
    target_sample_rate: u32,
}

impl MicCapture {
    /// Resolve the input device named in the config (or the system default).
    ///
    /// # Errors
    ///
    /// Returns [`ClientError::Device`] if no usable input device exists.
    pub fn open(config: &AudioConfig) -> Result<Self> {
        let host = cpal::default_host();

        let device = match &config.input_device {
            Some(name) => host
                .input_devices()
                .map_err(|e| ClientError::Device(format!("cannot enumerate devices: {e}")))?
                .find(|d| {
                    d.description()
                        .ok()
                        .map(|desc| desc.name() == name)
                        .unwrap_or(false)
                })
                .ok_or_else(|| ClientError::Device(format!("input device '{name}' not found")))?,
            None => host
                .default_input_device()
                .ok_or_else(|| ClientError::Device("no default input device".into()))?,
        };

        let default_config = device
            .default_input_config()
            .map_err(|e| ClientError::Device(format!("no default input config: {e}")))?;

        let stream_config = StreamConfig {
            channels: default_config.channels(),
            sample_rate: default_config.sample_rate(),
            buffer_size: cpal::BufferSize::Default,
        };

        let device_name = device
            .description()
            .map(|d| d.name().to_owned())
            .unwrap_or_else(|_| "<unknown>".into());
        info!(
            "using input device {device_name}: {}Hz, {} channels",
            stream_config.sample_rate, stream_config.channels
        );

        Ok(Self {
            device,
            stream_config,
            target_sample_rate: config.input_sample_rate,
        })
    }

    /// Stream chunks into `tx` until the token is cancelled.
    ///
    /// Runs on a dedicated thread because the cpal stream handle is not
    /// `Send`. The stream is dropped (device released) on every exit path,
    /// including stream-build failure.
    pub fn run_blocking(self, tx: mpsc::Sender<Vec<f32>>, cancel: CancellationToken) {
        let native_rate = self.stream_config.sample_rate;
        let native_channels = self.stream_config.channels;
        let target_rate = self.target_sample_rate;

        let stream = match self.device.build_input_stream(
            &self.stream_config,
            move |data: &[f32], _info: &cpal::InputCallbackInfo| {
                let mono = to_mono(data, native_channels);
                let chunk = resample(&mono, native_rate, target_rate);
                // try_send: the audio callback must never block.
                if tx.try_send(chunk).is_err() {
                    debug!("chunk channel full, dropping capture buffer");
                }
            },
            move |err| {
                error!("input stream error: {err}");
            },
            None,
        ) {
            Ok(s) => s,
            Err(e) => {
                error!("failed to build input stream: {e}");
                return;
            }
        };

        if let Err(e) = stream.play() {
            error!("failed to start input stream: {e}");
            return;
        }
        info!("capture started: native {native_rate}Hz -> clip {target_rate}Hz");

        while !cancel.is_cancelled() {
            std::thread::sleep(Duration::from_millis(20));
        }

        drop(stream);
        info!("capture stopped, device released");
    }

    /// List available input devices.
    ///
    /// # Errors
    ///
    /// Returns an error if devices cannot be enumerated.
    pub fn list_input_devices() -> Result<Vec<String>> {
        let host = cpal::default_host();
        let devices = host
            .input_devices()
            .map_err(|e| ClientError::Device(format!("cannot enumerate devices: {e}")))?;
        Ok(devices
            .filter_map(|d| d.description().ok().map(|desc| desc.name().to_owned()))
            .collect())
    }
}

/// Average interleaved frames down to mono.
fn to_mono(data: &[f32], channels: u16) -> Vec<f32> {
    if channels <= 1 {
        return data.to_vec();
    }
    let ch = usize::from(channels);
    data.chunks_exact(ch)
        .map(|frame| frame.iter().sum::<f32>() / ch as f32)
        .collect()
}

/// Linear-interpolation resampler.
///
/// Adequate for speech clips; voice energy sits well below the folding
/// frequency at the rates involved here.
fn resample(samples: &[f32], src_rate: u32, dst_rate: u32) -> Vec<f32> {
    if src_rate == dst_rate || samples.is_empty() {
        return samples.to_vec();
    }

    let ratio = f64::from(src_rate) / f64::from(dst_rate);
    let out_len = (samples.len() as f64 / ratio) as usize;
    let mut output = Vec::with_capacity(out_len);
    for i in 0..out_len {
        let pos = i as f64 * ratio;
        let idx = pos as usize;
        let frac = pos - idx as f64;
        let value = if idx + 1 < samples.len() {
            f64::from(samples[idx]) * (1.0 - frac) + f64::from(samples[idx + 1]) * frac
        } else {
            f64::from(samples[idx.min(samples.len() - 1)])
        };
        output.push(value as f32);
    }
    output
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mono_passthrough() {
        let data = vec![0.1, 0.2, 0.3];
        assert_eq!(to_mono(&data, 1), data);
    }

    #[test]
    fn stereo_averages_frames() {
        let data = vec![1.0, 0.0, 0.5, 0.5];
        let mono = to_mono(&data, 2);
        assert_eq!(mono, vec![0.5, 0.5]);
    }

    #[test]
    fn resample_identity_when_rates_match() {
        let data = vec![0.1, 0.2];
        assert_eq!(resample(&data, 16_000, 16_000), data);
    }

    #[test]
    fn resample_halves_length_for_2x_downsample() {
        let data: Vec<f32> = (0..100).map(|i| i as f32 / 100.0).collect();
        let out = resample(&data, 32_000, 16_000);
        assert_eq!(out.len(), 50);
        // Values stay monotonic through linear interpolation.
        assert!(out.windows(2).all(|w| w[0] <= w[1]));
    }

    #[test]
    fn resample_empty_input() {
        assert!(resample(&[], 48_000, 16_000).is_empty());
    }
}
