pub mod audio;
pub mod call;
pub mod chat;
pub mod config;
pub mod error;
pub mod http;
pub mod nats;
pub mod pipeline;
pub mod session;

pub use audio::{
    AudioFile, AudioFrame, AudioSegment, CaptureBackend, CaptureConfig, CaptureHandle,
    ChunkCapturer, FileCaptureBackend,
};
pub use call::{is_ready, CallState, CallTransport};
pub use chat::{ChannelBinding, ChannelGuard, ChannelLifecycleManager, ChatClient, ChatMessage};
pub use config::Config;
pub use error::{CaptureError, ChannelError, PipelineError, SessionError};
pub use http::{create_router, AppState, CollaboratorFactory};
pub use nats::{CallStateMessage, ChatMessageEnvelope, NatsClient};
pub use pipeline::{
    HttpSummarizationClient, HttpTranscriptionClient, StageStatus, SummarizationBackend,
    SummarizationConfig, SummaryAccumulator, SummaryFragment, TranscriptResult,
    TranscriptionBackend, TranscriptionConfig,
};
pub use session::{SessionConfig, SessionOrchestrator, SessionState, SessionStats, SummaryTrigger};
