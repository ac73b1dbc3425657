use crate::error::PipelineError;
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Text-summarization collaborator.
///
/// Callers must pass text that is non-empty after trimming; empty input is
/// short-circuited upstream without a remote call. Failures are per-call and
/// final: the design favors forward progress over completeness.
#[async_trait::async_trait]
pub trait SummarizationBackend: Send + Sync {
    async fn summarize(&self, text: &str) -> Result<String, PipelineError>;
}

/// Configuration for the summarization HTTP adapter.
#[derive(Debug, Clone, Deserialize)]
pub struct SummarizationConfig {
    pub base_url: String,
    pub api_key: Option<String>,
}

#[derive(Debug, Serialize)]
struct SummarizeRequest<'a> {
    inputs: &'a str,
}

#[derive(Debug, Deserialize)]
struct SummaryEntry {
    summary_text: String,
}

/// HTTP adapter for the summarization collaborator.
///
/// The service answers with a one-element array of candidate summaries; only
/// the first is used.
pub struct HttpSummarizationClient {
    config: SummarizationConfig,
    client: reqwest::Client,
}

impl HttpSummarizationClient {
    pub fn new(config: SummarizationConfig) -> Self {
        Self {
            config,
            client: reqwest::Client::new(),
        }
    }
}

#[async_trait::async_trait]
impl SummarizationBackend for HttpSummarizationClient {
    async fn summarize(&self, text: &str) -> Result<String, PipelineError> {
        let request = SummarizeRequest { inputs: text };

        let mut req = self.client.post(&self.config.base_url).json(&request);
        if let Some(key) = &self.config.api_key {
            req = req.bearer_auth(key);
        }

        let response = req
            .send()
            .await
            .map_err(|e| PipelineError::RemoteUnavailable(e.to_string()))?;

        let status = response.status();
        if status == reqwest::StatusCode::TOO_MANY_REQUESTS {
            return Err(PipelineError::RateLimited);
        }
        if !status.is_success() {
            return Err(PipelineError::RemoteUnavailable(format!(
                "summarization service returned {}",
                status
            )));
        }

        let body = response
            .text()
            .await
            .map_err(|e| PipelineError::MalformedResponse(e.to_string()))?;

        let summary = parse_summary_response(&body)?;
        debug!("Summarized {} chars into {}", text.len(), summary.len());

        Ok(summary)
    }
}

fn parse_summary_response(body: &str) -> Result<String, PipelineError> {
    let entries: Vec<SummaryEntry> =
        serde_json::from_str(body).map_err(|e| PipelineError::MalformedResponse(e.to_string()))?;

    entries
        .into_iter()
        .next()
        .map(|entry| entry.summary_text)
        .ok_or_else(|| PipelineError::MalformedResponse("empty summary array".to_string()))
}
