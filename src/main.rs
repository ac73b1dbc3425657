use anyhow::Result;
use huddle::audio::{CaptureBackend, FileCaptureBackend};
use huddle::call::CallTransport;
use huddle::chat::ChatClient;
use huddle::http::{create_router, AppState, CollaboratorFactory};
use huddle::nats::NatsClient;
use huddle::pipeline::{HttpSummarizationClient, HttpTranscriptionClient};
use huddle::Config;
use std::sync::Arc;
use tracing::info;

/// Wires collaborators from the service configuration: NATS for call state
/// and chat, a replay file standing in for the capture device.
struct ConfiguredCollaborators {
    nats_url: String,
    replay_file: Option<String>,
}

#[async_trait::async_trait]
impl CollaboratorFactory for ConfiguredCollaborators {
    async fn connect(
        &self,
        call_id: &str,
    ) -> Result<(Arc<dyn CallTransport>, Arc<dyn ChatClient>)> {
        let client = Arc::new(NatsClient::connect(&self.nats_url, call_id.to_string()).await?);
        let transport = client.clone() as Arc<dyn CallTransport>;
        let chat = client as Arc<dyn ChatClient>;
        Ok((transport, chat))
    }

    fn capture_backend(&self) -> Result<Box<dyn CaptureBackend>> {
        let path = self
            .replay_file
            .as_ref()
            .ok_or_else(|| anyhow::anyhow!("no capture device configured (audio.replay_file)"))?;
        Ok(Box::new(FileCaptureBackend::new(path.clone())))
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt::init();

    let cfg = Config::load("config/huddle")?;

    info!("{} v0.1.0", cfg.service.name);
    info!(
        "HTTP server will bind to {}:{}",
        cfg.service.http.bind, cfg.service.http.port
    );
    info!("NATS at {}", cfg.nats.url);

    let factory = Arc::new(ConfiguredCollaborators {
        nats_url: cfg.nats.url.clone(),
        replay_file: cfg.audio.replay_file.clone(),
    });
    let transcriber = Arc::new(HttpTranscriptionClient::new(cfg.transcription.clone()));
    let summarizer = Arc::new(HttpSummarizationClient::new(cfg.summarization.clone()));

    let addr = format!("{}:{}", cfg.service.http.bind, cfg.service.http.port);
    let state = AppState::new(cfg, factory, transcriber, summarizer);
    let router = create_router(state);

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    info!("Listening on {}", addr);

    axum::serve(listener, router).await?;

    Ok(())
}
