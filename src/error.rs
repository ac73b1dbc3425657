//! Error types for the session core.
//!
//! Session-start failures (device, channel) surface to the caller; per-segment
//! pipeline failures are logged and skipped and never propagate past the
//! orchestrator.

use thiserror::Error;

/// Errors from the audio capture layer.
#[derive(Debug, Error)]
pub enum CaptureError {
    /// Microphone access was denied or no capture device exists.
    #[error("capture device unavailable: {0}")]
    DeviceUnavailable(String),

    /// The backend failed after capture had started.
    #[error("capture backend failure: {0}")]
    Backend(String),
}

/// Errors from chat channel attachment.
#[derive(Debug, Error)]
pub enum ChannelError {
    /// No channel can be derived from an empty call id.
    #[error("invalid call id: must be non-empty")]
    InvalidCallId,

    /// The chat collaborator refused or failed the watch request.
    #[error("failed to watch channel {channel_id}: {message}")]
    Watch { channel_id: String, message: String },
}

/// Per-segment failures from the transcription and summarization
/// collaborators.
#[derive(Debug, Error)]
pub enum PipelineError {
    /// Collaborator unreachable or returned a non-success status.
    #[error("remote collaborator unavailable: {0}")]
    RemoteUnavailable(String),

    /// Collaborator rejected the request due to rate limiting.
    #[error("remote collaborator rate limited the request")]
    RateLimited,

    /// Collaborator response could not be interpreted.
    #[error("could not interpret collaborator response: {0}")]
    MalformedResponse(String),
}

/// Session-level failures surfaced to the caller.
#[derive(Debug, Error)]
pub enum SessionError {
    #[error(transparent)]
    Capture(#[from] CaptureError),

    #[error(transparent)]
    Channel(#[from] ChannelError),

    #[error("session already started")]
    AlreadyStarted,

    #[error("no transcript accumulated yet")]
    EmptyTranscript,

    #[error("summarization failed: {0}")]
    Summarize(#[from] PipelineError),
}
