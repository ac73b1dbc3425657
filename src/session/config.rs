use serde::{Deserialize, Serialize};
use std::time::Duration;

/// How summarization is driven.
///
/// Continuous mode feeds every transcribed segment to the summarizer as it
/// arrives; on-demand leaves the transcript to accumulate until the user
/// explicitly asks for a summary.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SummaryTrigger {
    #[default]
    Continuous,
    OnDemand,
}

/// Configuration for one live meeting session.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionConfig {
    /// Call identifier from the transport engine; also keys the chat channel.
    pub call_id: String,

    /// Fixed duration of each captured audio segment.
    pub segment_duration: Duration,

    /// Sample rate for capture (STT collaborators expect 16kHz).
    pub sample_rate: u32,

    /// Number of audio channels (1 = mono).
    pub channels: u16,

    /// When to run summarization.
    pub summary_trigger: SummaryTrigger,

    /// How long teardown waits for in-flight segment work before abandoning
    /// it.
    pub drain_grace: Duration,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            call_id: format!("meeting-{}", uuid::Uuid::new_v4()),
            segment_duration: Duration::from_secs(10),
            sample_rate: 16_000,
            channels: 1,
            summary_trigger: SummaryTrigger::default(),
            drain_grace: Duration::from_secs(5),
        }
    }
}
