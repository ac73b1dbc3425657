use crate::audio::CaptureBackend;
use crate::call::CallTransport;
use crate::chat::ChatClient;
use crate::config::Config;
use crate::pipeline::{SummarizationBackend, TranscriptionBackend};
use crate::session::SessionOrchestrator;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;

/// Builds collaborator handles for a joining call.
///
/// The transport engine and capture device are host-owned; the server only
/// knows how to request them.
#[async_trait::async_trait]
pub trait CollaboratorFactory: Send + Sync {
    /// Connect the transport and chat collaborators for one call.
    async fn connect(
        &self,
        call_id: &str,
    ) -> anyhow::Result<(Arc<dyn CallTransport>, Arc<dyn ChatClient>)>;

    /// Request a capture device handle.
    fn capture_backend(&self) -> anyhow::Result<Box<dyn CaptureBackend>>;
}

/// Shared application state for HTTP handlers
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    pub factory: Arc<dyn CollaboratorFactory>,
    pub transcriber: Arc<dyn TranscriptionBackend>,
    pub summarizer: Arc<dyn SummarizationBackend>,

    /// Live sessions (call_id → orchestrator)
    pub sessions: Arc<RwLock<HashMap<String, Arc<SessionOrchestrator>>>>,
}

impl AppState {
    pub fn new(
        config: Config,
        factory: Arc<dyn CollaboratorFactory>,
        transcriber: Arc<dyn TranscriptionBackend>,
        summarizer: Arc<dyn SummarizationBackend>,
    ) -> Self {
        Self {
            config: Arc::new(config),
            factory,
            transcriber,
            summarizer,
            sessions: Arc::new(RwLock::new(HashMap::new())),
        }
    }
}
