//! Recording lifecycle: a single-flight capture session that seals into one
//! clip.
//!
//! The device stream runs on its own thread and feeds a bounded chunk
//! channel; a collector task accumulates chunks in arrival order. `stop`
//! cancels the stream, drains the collector, and encodes the buffer as one
//! [`AudioClip`].

use crate::audio::capture::MicCapture;
use crate::audio::AudioClip;
use crate::config::AudioConfig;
use crate::error::{ClientError, Result};
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

/// Chunk channel depth; at default buffer sizes this is several seconds of
/// headroom before the callback starts dropping.
const CHUNK_CHANNEL_DEPTH: usize = 64;

/// Owns the microphone recording lifecycle.
///
/// At most one capture session is active at a time: `start` while a session
/// is running is a logged no-op, and `stop` while idle produces no clip.
pub struct Recorder {
    config: AudioConfig,
    active: Option<ActiveSession>,
}

struct ActiveSession {
    cancel: CancellationToken,
    collector: JoinHandle<Vec<f32>>,
    capture_thread: Option<std::thread::JoinHandle<()>>,
}

impl Recorder {
    /// Create an idle recorder.
    #[must_use]
    pub fn new(config: AudioConfig) -> Self {
        Self {
            config,
            active: None,
        }
    }

    /// Returns `true` while a capture session is active.
    #[must_use]
    pub fn is_recording(&self) -> bool {
        self.active.is_some()
    }

    /// Begin recording from the configured input device.
    ///
    /// No-op when already recording (single-flight: the running session is
    /// kept, no second device acquisition happens).
    ///
    /// # Errors
    ///
    /// Returns [`ClientError::Device`] when the microphone is unavailable;
    /// the recorder stays idle in that case.
    pub fn start(&mut self) -> Result<()> {
        if self.active.is_some() {
            debug!("start ignored: already recording");
            return Ok(());
        }

        let capture = MicCapture::open(&self.config)?;
        let (tx, rx) = mpsc::channel::<Vec<f32>>(CHUNK_CHANNEL_DEPTH);
        let cancel = CancellationToken::new();

        let collector = spawn_collector(rx);
        let thread_cancel = cancel.clone();
        let capture_thread = std::thread::spawn(move || capture.run_blocking(tx, thread_cancel));

        self.install_session(cancel, collector, Some(capture_thread));
        info!("recording started");
        Ok(())
    }

    /// Stop recording and seal the accumulated audio into one clip.
    ///
    /// No-op returning `None` when idle. Returns `None` (with a warning)
    /// when the session captured no audio. The device is released before
    /// this returns, on every path.
    ///
    /// # Errors
    ///
    /// Returns an error if the collector task fails or WAV encoding fails.
    pub async fn stop(&mut self) -> Result<Option<AudioClip>> {
        let Some(session) = self.active.take() else {
            debug!("stop ignored: not recording");
            return Ok(None);
        };

        session.cancel.cancel();
        if let Some(thread) = session.capture_thread {
            // The capture thread exits within one poll interval of the
            // cancel; join off the async runtime.
            tokio::task::spawn_blocking(move || {
                if thread.join().is_err() {
                    warn!("capture thread panicked");
                }
            })
            .await
            .map_err(|e| ClientError::Channel(format!("capture join failed: {e}")))?;
        }

        let samples = session
            .collector
            .await
            .map_err(|e| ClientError::Channel(format!("collector task failed: {e}")))?;

        if samples.is_empty() {
            warn!("recording produced no audio, discarding");
            return Ok(None);
        }

        let clip = AudioClip::from_samples(&samples, self.config.input_sample_rate)?;
        info!(
            "recording finalized: {} samples, {} bytes",
            samples.len(),
            clip.data.len()
        );
        Ok(Some(clip))
    }

    fn install_session(
        &mut self,
        cancel: CancellationToken,
        collector: JoinHandle<Vec<f32>>,
        capture_thread: Option<std::thread::JoinHandle<()>>,
    ) {
        self.active = Some(ActiveSession {
            cancel,
            collector,
            capture_thread,
        });
    }
}

impl Drop for Recorder {
    fn drop(&mut self) {
        // Release the device if the session is abandoned mid-recording.
        if let Some(session) = self.active.take() {
            session.cancel.cancel();
        }
    }
}

/// Accumulate chunks in arrival order until the channel closes.
fn spawn_collector(mut rx: mpsc::Receiver<Vec<f32>>) -> JoinHandle<Vec<f32>> {
    tokio::spawn(async move {
        let mut buffer = Vec::new();
        while let Some(chunk) = rx.recv().await {
            buffer.extend_from_slice(&chunk);
        }
        buffer
    })
}
