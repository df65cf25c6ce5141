//! The send pipeline: composition, dispatch, and reconciliation around one
//! chat session.

pub mod composer;
pub mod reconciler;

use crate::api::{BackendClient, UploadFile};
use crate::attachment::{AttachmentStaging, ImageAttachment};
use crate::audio::playback::{RemoteSpeaker, ReplyAudio};
use crate::audio::recorder::Recorder;
use crate::audio::AudioClip;
use crate::config::ClientConfig;
use crate::error::{ClientError, Result};
use crate::pipeline::composer::{human_entries, select_operation, Operation, PendingInput};
use crate::pipeline::reconciler::{reconcile_failure, reconcile_success, RemoteReply};
use crate::transcript::{Origin, Transcript};
use std::sync::Arc;
use tracing::{debug, warn};

/// One chat session: transcript, transient input state, and the remote
/// collaborator.
///
/// Each transient concern (input text, staged image, recorder) lives in an
/// explicit field and is reset at a defined lifecycle point: input and
/// attachment at send time, the recorder at stop. Sends are two-phase:
/// the optimistic human-side append always happens synchronously, the reply
/// (or the fixed error entry) lands when the network settles. `submit`
/// takes `&mut self`, so sends never run in parallel within one session.
pub struct ChatSession {
    transcript: Transcript,
    staging: AttachmentStaging,
    input: String,
    recorder: Recorder,
    api: BackendClient,
    speaker: Arc<dyn ReplyAudio>,
}

impl ChatSession {
    /// Create a session that plays reply audio through the system output.
    ///
    /// # Errors
    ///
    /// Returns an error if the backend base URL is invalid.
    pub fn new(config: &ClientConfig) -> Result<Self> {
        let speaker = Arc::new(RemoteSpeaker::new(config.audio.clone()));
        Self::with_audio_sink(config, speaker)
    }

    /// Create a session with a custom reply-audio sink.
    ///
    /// # Errors
    ///
    /// Returns an error if the backend base URL is invalid.
    pub fn with_audio_sink(config: &ClientConfig, speaker: Arc<dyn ReplyAudio>) -> Result<Self> {
        Ok(Self {
            transcript: Transcript::new(),
            staging: AttachmentStaging::new(),
            input: String::new(),
            recorder: Recorder::new(config.audio.clone()),
            api: BackendClient::new(&config.backend)?,
            speaker,
        })
    }

    /// The session transcript.
    #[must_use]
    pub fn transcript(&self) -> &Transcript {
        &self.transcript
    }

    /// Replace the current input text.
    pub fn set_input(&mut self, text: impl Into<String>) {
        self.input = text.into();
    }

    /// The current input text.
    #[must_use]
    pub fn input(&self) -> &str {
        &self.input
    }

    /// Stage an image for the next send, replacing any previous one.
    pub fn stage_image(&mut self, image: ImageAttachment) {
        self.staging.stage(image);
    }

    /// The currently staged image, if any.
    #[must_use]
    pub fn staged_image(&self) -> Option<&ImageAttachment> {
        self.staging.current()
    }

    /// Returns `true` while a recording is in progress.
    #[must_use]
    pub fn is_recording(&self) -> bool {
        self.recorder.is_recording()
    }

    /// Start recording from the microphone.
    ///
    /// A second start while recording is a no-op.
    ///
    /// # Errors
    ///
    /// Returns a device error when the microphone is unavailable; the
    /// transcript is untouched in that case.
    pub fn start_recording(&mut self) -> Result<()> {
        self.recorder.start()
    }

    /// Stop recording and submit the clip (together with any pending text
    /// or staged image). A stop with no active recording, or a recording
    /// that captured nothing, submits nothing.
    pub async fn finish_recording(&mut self) {
        match self.recorder.stop().await {
            Ok(Some(clip)) => self.submit(Some(clip)).await,
            Ok(None) => {}
            Err(e) => warn!("failed to finalize recording: {e}"),
        }
    }

    /// Send the pending text and staged image.
    pub async fn send(&mut self) {
        self.submit(None).await;
    }

    /// Two-phase send of whatever input is pending plus the given clip.
    ///
    /// Phase 1 (synchronous, always succeeds): input is taken — clearing
    /// the text box and the staging slot regardless of what follows — and
    /// one human entry per input kind is appended. Phase 2: the selected
    /// operation is dispatched and its reply (or the fixed error entry)
    /// is reconciled into the transcript. Empty submissions no-op silently.
    pub async fn submit(&mut self, clip: Option<AudioClip>) {
        let text = std::mem::take(&mut self.input);
        let image = self.staging.take();
        let input = PendingInput::new(text, image, clip);

        let Some(operation) = select_operation(&input) else {
            debug!("empty submission, nothing sent");
            return;
        };

        for entry in human_entries(&input) {
            self.transcript.append(Origin::Human, entry);
        }

        match self.dispatch(operation, input).await {
            Ok(reply) => reconcile_success(
                &mut self.transcript,
                reply,
                &self.api,
                self.speaker.as_ref(),
            ),
            Err(e) => reconcile_failure(&mut self.transcript, &e),
        }
    }

    async fn dispatch(&self, operation: Operation, input: PendingInput) -> Result<RemoteReply> {
        match operation {
            Operation::Text => {
                let message = input.text.unwrap_or_default();
                self.api.chat(&message).await.map(RemoteReply::Chat)
            }
            Operation::Voice => {
                // select_operation only yields Voice when a clip is present.
                let Some(clip) = input.clip else {
                    return Err(ClientError::Audio("voice send without a clip".into()));
                };
                self.api.voice_chat(clip).await.map(RemoteReply::Voice)
            }
            Operation::MultiModal => {
                let file: Option<UploadFile> = input
                    .image
                    .map(UploadFile::from)
                    .or_else(|| input.clip.map(UploadFile::from));
                self.api
                    .multimodal_chat(input.text.as_deref(), file)
                    .await
                    .map(RemoteReply::Chat)
            }
        }
    }
}
