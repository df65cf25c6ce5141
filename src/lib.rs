//! krishi-chat: multi-modal chat client for an agricultural-advisory
//! service.
//!
//! The client captures typed text, picked images, and recorded audio,
//! composes them into requests against the advisory backend, and keeps an
//! ordered transcript of the exchange.
//!
//! # Architecture
//!
//! The pipeline is a set of small components around one [`ChatSession`]:
//! - **Recorder**: microphone capture via `cpal`, sealed into WAV clips
//! - **Attachment staging**: at most one pending image per send
//! - **Composer**: maps the {text, image, clip} presence triple to one of
//!   three remote operations and writes the optimistic human-side entries
//! - **Backend client**: the three HTTP operations via `reqwest`
//! - **Reconciler**: converts replies (and failures) into transcript
//!   entries and starts reply-audio playback

pub mod api;
pub mod attachment;
pub mod audio;
pub mod config;
pub mod error;
pub mod pipeline;
pub mod transcript;

pub use api::BackendClient;
pub use attachment::{AttachmentStaging, ImageAttachment};
pub use audio::recorder::Recorder;
pub use audio::AudioClip;
pub use config::ClientConfig;
pub use error::{ClientError, Result};
pub use pipeline::ChatSession;
pub use transcript::{Message, Origin, Transcript};
