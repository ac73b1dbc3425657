//! Live session orchestration
//!
//! This module provides the `SessionOrchestrator` abstraction that manages:
//! - Call-state gating (nothing runs until the call is joined)
//! - Chat channel attach/detach bound to the call lifecycle
//! - Audio segment capture and the per-segment pipeline
//! - Running summary accumulation and transcript collection
//! - Drain-then-stop teardown and session statistics

mod config;
mod orchestrator;
mod stats;

pub use config::{SessionConfig, SummaryTrigger};
pub use orchestrator::{SessionOrchestrator, SessionState};
pub use stats::SessionStats;
