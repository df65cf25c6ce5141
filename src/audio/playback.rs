//! Playback of server-provided reply audio.
//!
//! The reconciler hands a resolved URL to a [`ReplyAudio`] sink; the
//! production sink fetches the WAV bytes, decodes them, and plays through
//! the default (or configured) output device. Playback runs detached and
//! its failures only log; the transcript never waits on the speaker.

use crate::audio::decode_wav;
use crate::config::AudioConfig;
use crate::error::{ClientError, Result};
use cpal::StreamConfig;
use cpal::traits::{DeviceTrait, HostTrait, StreamTrait};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tracing::{error, info, warn};
use url::Url;

/// Sink for reply audio referenced by the server.
///
/// Implementations must return immediately; playback (if any) happens in
/// the background.
pub trait ReplyAudio: Send + Sync {
    /// Begin playback of the audio at `url`.
    fn play_remote(&self, url: Url);
}

/// Production sink: fetch, decode, and play reply audio.
pub struct RemoteSpeaker {
    client: reqwest::Client,
    config: AudioConfig,
}

impl RemoteSpeaker {
    /// Create a speaker using the given audio settings.
    #[must_use]
    pub fn new(config: AudioConfig) -> Self {
        Self {
            client: reqwest::Client::new(),
            config,
        }
    }
}

impl ReplyAudio for RemoteSpeaker {
    fn play_remote(&self, url: Url) {
        let client = self.client.clone();
        let config = self.config.clone();
        tokio::spawn(async move {
            if let Err(e) = fetch_and_play(&client, &config, url).await {
                warn!("reply audio playback failed: {e}");
            }
        });
    }
}

async fn fetch_and_play(
    client: &reqwest::Client,
    config: &AudioConfig,
    url: Url,
) -> Result<()> {
    info!("fetching reply audio from {url}");
    let response = client
        .get(url)
        .send()
        .await
        .map_err(|e| ClientError::Transport(format!("audio fetch failed: {e}")))?;
    if !response.status().is_success() {
        return Err(ClientError::Transport(format!(
            "audio fetch returned HTTP {}",
            response.status().as_u16()
        )));
    }
    let bytes = response
        .bytes()
        .await
        .map_err(|e| ClientError::Transport(format!("audio body read failed: {e}")))?;

    let (samples, sample_rate) = decode_wav(&bytes)?;
    let output_device = config.output_device.clone();
    tokio::task::spawn_blocking(move || play_samples(&samples, sample_rate, output_device))
        .await
        .map_err(|e| ClientError::Channel(format!("playback task failed: {e}")))?
}

/// Play mono samples through the output device, blocking until done.
fn play_samples(samples: &[f32], sample_rate: u32, output_device: Option<String>) -> Result<()> {
    let host = cpal::default_host();
    let device = match &output_device {
        Some(name) => host
            .output_devices()
            .map_err(|e| ClientError::Device(format!("cannot enumerate devices: {e}")))?
            .find(|d| {
                d.description()
                    .ok()
                    .map(|desc| desc.name() == name)
                    .unwrap_or(false)
            })
            .ok_or_else(|| ClientError::Device(format!("output device '{name}' not found")))?,
        None => host
            .default_output_device()
            .ok_or_else(|| ClientError::Device("no default output device".into()))?,
    };

    let stream_config = StreamConfig {
        channels: 1,
        sample_rate,
        buffer_size: cpal::BufferSize::Default,
    };

    let buffer = Arc::new(Mutex::new(PlaybackBuffer {
        samples: samples.to_vec(),
        position: 0,
        finished: false,
    }));
    let callback_buffer = Arc::clone(&buffer);

    let stream = device
        .build_output_stream(
            &stream_config,
            move |data: &mut [f32], _info: &cpal::OutputCallbackInfo| {
                let Ok(mut buf) = callback_buffer.lock() else {
                    return;
                };
                for sample in data.iter_mut() {
                    if buf.position < buf.samples.len() {
                        *sample = buf.samples[buf.position];
                        buf.position += 1;
                    } else {
                        *sample = 0.0;
                        buf.finished = true;
                    }
                }
            },
            move |err| {
                error!("output stream error: {err}");
            },
            None,
        )
        .map_err(|e| ClientError::Audio(format!("failed to build output stream: {e}")))?;

    stream
        .play()
        .map_err(|e| ClientError::Audio(format!("failed to start output stream: {e}")))?;

    loop {
        std::thread::sleep(Duration::from_millis(10));
        let done = buffer
            .lock()
            .map_err(|e| ClientError::Audio(format!("playback buffer lock poisoned: {e}")))?
            .finished;
        if done {
            break;
        }
    }

    drop(stream);
    Ok(())
}

struct PlaybackBuffer {
    samples: Vec<f32>,
    position: usize,
    finished: bool,
}
