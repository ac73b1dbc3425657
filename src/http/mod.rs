//! HTTP API for the meeting client shell
//!
//! This module provides a REST API for driving live sessions:
//! - POST /meetings/join - Join a call and start its session
//! - POST /meetings/:call_id/leave - Leave the call and stop the session
//! - GET /meetings/:call_id/status - Query session status
//! - GET /meetings/:call_id/transcript - Get accumulated transcript
//! - GET /meetings/:call_id/summary - Get the running summary
//! - POST /meetings/:call_id/summarize - Summarize the transcript on demand
//! - GET /health - Health check

mod handlers;
mod routes;
mod state;

pub use routes::create_router;
pub use state::{AppState, CollaboratorFactory};
