//! Outbound request composition.
//!
//! One decision function maps the presence triple {text, image, clip} to
//! the remote operation, replacing the three ad hoc call sites of the
//! original client. The same module owns the optimistic human-side
//! transcript entries written before the network call.

use crate::attachment::ImageAttachment;
use crate::audio::AudioClip;
use tracing::warn;

/// Optimistic transcript line for a sent recording.
pub const VOICE_SUMMARY: &str = "🎤 Sent a voice message";

/// Optimistic transcript line for a sent image.
#[must_use]
pub fn image_summary(file_name: &str) -> String {
    format!("🖼️ Sent an image: {file_name}")
}

/// The inputs pending for one send, normalized.
///
/// Text is whitespace-trimmed; blank text counts as absent. The wire shape
/// has a single file slot, so when both an image and a clip are present the
/// image wins and the clip is dropped (with a warning) at composition.
#[derive(Debug, Default)]
pub struct PendingInput {
    pub text: Option<String>,
    pub image: Option<ImageAttachment>,
    pub clip: Option<AudioClip>,
}

impl PendingInput {
    /// Normalize raw inputs into a pending-send value.
    #[must_use]
    pub fn new(text: String, image: Option<ImageAttachment>, clip: Option<AudioClip>) -> Self {
        let trimmed = text.trim();
        let text = (!trimmed.is_empty()).then(|| trimmed.to_owned());

        let clip = if image.is_some() && clip.is_some() {
            warn!("image and audio clip both staged; sending the image only");
            None
        } else {
            clip
        };

        Self { text, image, clip }
    }

    /// Returns `true` when there is nothing to send.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.text.is_none() && self.image.is_none() && self.clip.is_none()
    }
}

/// Which remote operation a send maps to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operation {
    /// Text-only send, structured JSON body.
    Text,
    /// Clip-only send from the recording flow, multipart.
    Voice,
    /// Any other combination, multipart.
    MultiModal,
}

/// Select the operation for the pending input.
///
/// Returns `None` for an empty submission: no network call may be issued
/// and the transcript must not change. This is the hard precondition, not
/// a UI nicety — an empty multipart request would be indistinguishable
/// from a real one on the wire.
#[must_use]
pub fn select_operation(input: &PendingInput) -> Option<Operation> {
    match (&input.text, &input.image, &input.clip) {
        (None, None, None) => None,
        (Some(_), None, None) => Some(Operation::Text),
        (None, None, Some(_)) => Some(Operation::Voice),
        _ => Some(Operation::MultiModal),
    }
}

/// Human-side transcript lines for the optimistic append, one per present
/// input kind, in the order text, image, audio.
#[must_use]
pub fn human_entries(input: &PendingInput) -> Vec<String> {
    let mut entries = Vec::new();
    if let Some(text) = &input.text {
        entries.push(text.clone());
    }
    if let Some(image) = &input.image {
        entries.push(image_summary(&image.file_name));
    }
    if input.clip.is_some() {
        entries.push(VOICE_SUMMARY.to_owned());
    }
    entries
}
