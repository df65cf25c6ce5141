//! Reply reconciliation: converting a remote reply payload into transcript
//! entries.
//!
//! Phase 2 of the two-phase send. Success and failure both end with the
//! transcript holding a reply entry for the dispatched turn; nothing here
//! returns an error to the caller.

use crate::api::{BackendClient, ChatReply, VoiceReply};
use crate::audio::playback::ReplyAudio;
use crate::error::ClientError;
use crate::transcript::{Origin, Transcript};
use tracing::warn;

/// Agent entry when a reply field is absent or empty. Keeps the 1:1
/// human-turn to agent-turn pairing visible.
pub const EMPTY_REPLY_PLACEHOLDER: &str = "No response";

/// Agent entry appended for any transport or decode failure.
pub const TRANSPORT_ERROR_TEXT: &str = "⚠️ Error connecting to backend";

/// A reply payload, discriminated by the operation that produced it.
///
/// Owned transiently here and fully consumed into transcript entries.
#[derive(Debug)]
pub enum RemoteReply {
    /// From the text or multi-modal operation.
    Chat(ChatReply),
    /// From the voice operation.
    Voice(VoiceReply),
}

/// Append the transcript entries for a successful reply.
///
/// A voice reply appends the server's transcription as a Human entry, then
/// the advisory reply as an Agent entry, and (when referenced) starts
/// playback of the reply audio without blocking the transcript. The
/// optimistic voice placeholder stays in place; the transcription is
/// appended after it.
pub fn reconcile_success(
    transcript: &mut Transcript,
    reply: RemoteReply,
    api: &BackendClient,
    speaker: &dyn ReplyAudio,
) {
    match reply {
        RemoteReply::Chat(chat) => {
            transcript.append(Origin::Agent, reply_or_placeholder(chat.response));
        }
        RemoteReply::Voice(voice) => {
            if let Some(text) = voice.original_text.as_deref().map(str::trim)
                && !text.is_empty()
            {
                transcript.append(Origin::Human, text);
            } else {
                warn!("voice reply carried no transcription");
            }
            transcript.append(
                Origin::Agent,
                reply_or_placeholder(voice.chatbot_response_local),
            );
            if let Some(path) = &voice.audio_file {
                match api.resolve_audio(path) {
                    Ok(url) => speaker.play_remote(url),
                    Err(e) => warn!("ignoring unplayable audio reference: {e}"),
                }
            }
        }
    }
}

/// Append the fixed error entry for a failed send.
pub fn reconcile_failure(transcript: &mut Transcript, err: &ClientError) {
    warn!("send failed: {err}");
    transcript.append(Origin::Agent, TRANSPORT_ERROR_TEXT);
}

fn reply_or_placeholder(text: Option<String>) -> String {
    match text {
        Some(t) if !t.trim().is_empty() => t,
        _ => EMPTY_REPLY_PLACEHOLDER.to_owned(),
    }
}
