use super::orchestrator::SessionState;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Point-in-time view of a session, as served by the status endpoint.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionStats {
    /// Where the session is in its lifecycle.
    pub state: SessionState,

    /// When the orchestrator was created.
    pub started_at: DateTime<Utc>,

    /// Total duration in seconds.
    pub duration_secs: f64,

    /// Number of audio segments captured so far.
    pub segments_captured: usize,

    /// Transcripts that came back usable.
    pub transcripts_ok: usize,

    /// Transcripts that failed or were dropped.
    pub transcripts_failed: usize,

    /// Fragments merged into the running summary.
    pub summary_fragments: usize,
}
