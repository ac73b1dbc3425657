use crate::audio::AudioSegment;
use crate::error::PipelineError;
use base64::Engine;
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Speech-to-text collaborator.
///
/// One logical remote call per segment, no automatic retry: the design
/// accepts lossy transcription over added latency, so a failed segment's
/// audio is discarded rather than replayed.
#[async_trait::async_trait]
pub trait TranscriptionBackend: Send + Sync {
    async fn transcribe(&self, segment: &AudioSegment) -> Result<String, PipelineError>;
}

/// Configuration for the transcription HTTP adapter.
#[derive(Debug, Clone, Deserialize)]
pub struct TranscriptionConfig {
    pub base_url: String,
    pub api_key: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct TranscribeRequest<'a> {
    audio_base64: &'a str,
    format: &'a str,
}

#[derive(Debug, Deserialize)]
struct TranscribeResponse {
    transcript: String,
}

/// HTTP adapter for the transcription collaborator.
pub struct HttpTranscriptionClient {
    config: TranscriptionConfig,
    client: reqwest::Client,
}

impl HttpTranscriptionClient {
    pub fn new(config: TranscriptionConfig) -> Self {
        Self {
            config,
            client: reqwest::Client::new(),
        }
    }
}

#[async_trait::async_trait]
impl TranscriptionBackend for HttpTranscriptionClient {
    async fn transcribe(&self, segment: &AudioSegment) -> Result<String, PipelineError> {
        let audio_base64 = base64::engine::general_purpose::STANDARD.encode(&segment.payload);

        let request = TranscribeRequest {
            audio_base64: &audio_base64,
            format: "wav",
        };

        let mut req = self.client.post(&self.config.base_url).json(&request);
        if let Some(key) = &self.config.api_key {
            req = req.bearer_auth(key);
        }

        let response = req
            .send()
            .await
            .map_err(|e| PipelineError::RemoteUnavailable(e.to_string()))?;

        if !response.status().is_success() {
            return Err(PipelineError::RemoteUnavailable(format!(
                "transcription service returned {}",
                response.status()
            )));
        }

        let body = response
            .text()
            .await
            .map_err(|e| PipelineError::MalformedResponse(e.to_string()))?;

        let text = parse_transcript_response(&body)?;
        debug!(
            "Segment {} transcribed ({} chars)",
            segment.sequence,
            text.len()
        );

        Ok(text)
    }
}

fn parse_transcript_response(body: &str) -> Result<String, PipelineError> {
    let parsed: TranscribeResponse =
        serde_json::from_str(body).map_err(|e| PipelineError::MalformedResponse(e.to_string()))?;
    Ok(parsed.transcript)
}
