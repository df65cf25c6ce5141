//! Error types for the chat client.

/// Top-level error type for the multi-modal chat pipeline.
#[derive(Debug, thiserror::Error)]
pub enum ClientError {
    /// Input device unavailable (no microphone, or permission denied).
    #[error("device error: {0}")]
    Device(String),

    /// Audio stream, encode, or decode error.
    #[error("audio error: {0}")]
    Audio(String),

    /// Network unreachable, timed out, or non-success HTTP status.
    #[error("transport error: {0}")]
    Transport(String),

    /// Reply body did not match the expected shape.
    #[error("malformed reply: {0}")]
    Decode(String),

    /// Configuration error.
    #[error("config error: {0}")]
    Config(String),

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Channel send/receive or task-join error.
    #[error("channel error: {0}")]
    Channel(String),
}

/// Convenience result type.
pub type Result<T> = std::result::Result<T, ClientError>;
