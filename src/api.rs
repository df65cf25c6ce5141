//! HTTP client for the advisory backend.
//!
//! Three operations are consumed: text chat (JSON), voice chat (multipart
//! audio), and multi-modal chat (multipart text/image/audio). Server-side
//! behavior is the collaborator's business; this module only owns the wire
//! contract and transport-error classification.

use crate::attachment::ImageAttachment;
use crate::audio::{AudioClip, CLIP_FILE_NAME, CLIP_MIME};
use crate::config::BackendConfig;
use crate::error::{ClientError, Result};
use serde::Deserialize;
use serde::de::DeserializeOwned;
use std::time::Duration;
use tracing::debug;
use url::Url;

/// Reply from the text and multi-modal chat operations.
///
/// The text endpoint also returns a `chat_history` array; the client keeps
/// its own transcript and ignores it.
#[derive(Debug, Clone, Deserialize)]
pub struct ChatReply {
    /// The advisory reply text.
    #[serde(default)]
    pub response: Option<String>,
}

/// Reply from the voice chat operation.
#[derive(Debug, Clone, Deserialize)]
pub struct VoiceReply {
    /// Server-side transcription of the uploaded clip.
    #[serde(default)]
    pub original_text: Option<String>,
    /// The advisory reply text.
    #[serde(default)]
    pub chatbot_response_local: Option<String>,
    /// Server-relative path of a spoken reply, when available.
    #[serde(default)]
    pub audio_file: Option<String>,
}

/// One file carried by a multipart request.
#[derive(Debug, Clone)]
pub struct UploadFile {
    pub file_name: String,
    pub mime: String,
    pub data: Vec<u8>,
}

impl From<ImageAttachment> for UploadFile {
    fn from(image: ImageAttachment) -> Self {
        Self {
            file_name: image.file_name,
            mime: image.mime,
            data: image.data,
        }
    }
}

impl From<AudioClip> for UploadFile {
    fn from(clip: AudioClip) -> Self {
        Self {
            file_name: CLIP_FILE_NAME.to_owned(),
            mime: CLIP_MIME.to_owned(),
            data: clip.data,
        }
    }
}

/// Client for the advisory backend endpoints.
pub struct BackendClient {
    base: String,
    user_id: String,
    client: reqwest::Client,
}

impl BackendClient {
    /// Create a client for the configured backend.
    ///
    /// # Errors
    ///
    /// Returns an error if the base address is not a valid URL.
    pub fn new(config: &BackendConfig) -> Result<Self> {
        let base = config.base_url.trim_end_matches('/').to_owned();
        Url::parse(&base)
            .map_err(|e| ClientError::Config(format!("invalid backend base URL '{base}': {e}")))?;

        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| ClientError::Config(format!("failed to build HTTP client: {e}")))?;

        Ok(Self {
            base,
            user_id: config.user_id.clone(),
            client,
        })
    }

    /// The configured user identifier.
    #[must_use]
    pub fn user_id(&self) -> &str {
        &self.user_id
    }

    /// Text chat: structured JSON request.
    ///
    /// # Errors
    ///
    /// Returns a transport error on network failure or non-success status,
    /// and a decode error on a malformed body.
    pub async fn chat(&self, message: &str) -> Result<ChatReply> {
        let url = format!("{}/chat", self.base);
        debug!("POST {url}");
        let body = serde_json::json!({
            "user_id": self.user_id,
            "message": message,
        });
        let response = self
            .client
            .post(&url)
            .json(&body)
            .send()
            .await
            .map_err(classify_transport)?;
        parse_reply(response).await
    }

    /// Voice chat: multipart request carrying one WAV clip.
    ///
    /// # Errors
    ///
    /// Same failure classification as [`chat`](Self::chat).
    pub async fn voice_chat(&self, clip: AudioClip) -> Result<VoiceReply> {
        let url = format!("{}/voice-chat", self.base);
        debug!("POST {url} ({} byte clip)", clip.data.len());
        let form = reqwest::multipart::Form::new()
            .text("user_id", self.user_id.clone())
            .part("file", file_part(UploadFile::from(clip))?);
        let response = self
            .client
            .post(&url)
            .multipart(form)
            .send()
            .await
            .map_err(classify_transport)?;
        parse_reply(response).await
    }

    /// Multi-modal chat: multipart request carrying whichever of message
    /// and file are present.
    ///
    /// # Errors
    ///
    /// Same failure classification as [`chat`](Self::chat).
    pub async fn multimodal_chat(
        &self,
        message: Option<&str>,
        file: Option<UploadFile>,
    ) -> Result<ChatReply> {
        let url = format!("{}/dynamic-chat", self.base);
        debug!("POST {url}");
        let mut form = reqwest::multipart::Form::new().text("user_id", self.user_id.clone());
        if let Some(message) = message {
            form = form.text("message", message.to_owned());
        }
        if let Some(file) = file {
            form = form.part("file", file_part(file)?);
        }
        let response = self
            .client
            .post(&url)
            .multipart(form)
            .send()
            .await
            .map_err(classify_transport)?;
        parse_reply(response).await
    }

    /// Resolve a server-relative audio path against the base address.
    ///
    /// # Errors
    ///
    /// Returns an error if the combination is not a valid URL.
    pub fn resolve_audio(&self, relative: &str) -> Result<Url> {
        let joined = format!("{}/{}", self.base, relative.trim_start_matches('/'));
        Url::parse(&joined)
            .map_err(|e| ClientError::Decode(format!("invalid audio path '{relative}': {e}")))
    }
}

/// Build a multipart file part.
fn file_part(file: UploadFile) -> Result<reqwest::multipart::Part> {
    let mime = file.mime;
    reqwest::multipart::Part::bytes(file.data)
        .file_name(file.file_name)
        .mime_str(&mime)
        .map_err(|e| ClientError::Config(format!("invalid mime type '{mime}': {e}")))
}

/// Map non-success statuses and body decode failures into client errors.
async fn parse_reply<T: DeserializeOwned>(response: reqwest::Response) -> Result<T> {
    let status = response.status();
    if !status.is_success() {
        let body = response.text().await.unwrap_or_default();
        let message: String = body.chars().take(200).collect();
        return Err(ClientError::Transport(format!(
            "backend returned HTTP {}: {message}",
            status.as_u16()
        )));
    }
    response
        .json::<T>()
        .await
        .map_err(|e| ClientError::Decode(format!("reply body did not parse: {e}")))
}

/// Classify a reqwest transport failure.
fn classify_transport(err: reqwest::Error) -> ClientError {
    if err.is_timeout() {
        ClientError::Transport("request timed out".to_owned())
    } else if err.is_connect() {
        ClientError::Transport(format!("backend unreachable: {err}"))
    } else {
        ClientError::Transport(format!("request failed: {err}"))
    }
}
