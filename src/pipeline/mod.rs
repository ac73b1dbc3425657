//! Per-segment transcription and summarization stages
//!
//! Each captured segment flows through transcribe → (if substantive)
//! summarize → merge. Stages are remote collaborator calls with no automatic
//! retry: a failed segment contributes nothing and the pipeline moves on.

mod accumulator;
mod summarize;
mod transcribe;

pub use accumulator::SummaryAccumulator;
pub use summarize::{HttpSummarizationClient, SummarizationBackend, SummarizationConfig};
pub use transcribe::{HttpTranscriptionClient, TranscriptionBackend, TranscriptionConfig};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Outcome status shared by pipeline records.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StageStatus {
    Ok,
    Failed,
}

/// Transcription outcome for one audio segment.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TranscriptResult {
    pub sequence: u64,
    pub text: String,
    pub status: StageStatus,
    pub received_at: DateTime<Utc>,
}

impl TranscriptResult {
    pub fn ok(sequence: u64, text: String) -> Self {
        Self {
            sequence,
            text,
            status: StageStatus::Ok,
            received_at: Utc::now(),
        }
    }

    pub fn failed(sequence: u64) -> Self {
        Self {
            sequence,
            text: String::new(),
            status: StageStatus::Failed,
            received_at: Utc::now(),
        }
    }

    /// Whether this transcript should reach summarization. Empty or
    /// whitespace-only text short-circuits that stage.
    pub fn is_substantive(&self) -> bool {
        self.status == StageStatus::Ok && !self.text.trim().is_empty()
    }
}

/// Summarization outcome for one transcript.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SummaryFragment {
    pub sequence: u64,
    pub text: String,
    pub status: StageStatus,
}

impl SummaryFragment {
    pub fn ok(sequence: u64, text: String) -> Self {
        Self {
            sequence,
            text,
            status: StageStatus::Ok,
        }
    }

    pub fn failed(sequence: u64) -> Self {
        Self {
            sequence,
            text: String::new(),
            status: StageStatus::Failed,
        }
    }
}
