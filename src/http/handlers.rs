use super::state::AppState;
use crate::error::SessionError;
use crate::pipeline::TranscriptResult;
use crate::session::{SessionConfig, SessionOrchestrator, SessionStats, SummaryTrigger};
use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Json},
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Duration;
use tracing::{error, info, warn};

// ============================================================================
// Request/Response Types
// ============================================================================

#[derive(Debug, Deserialize)]
pub struct JoinMeetingRequest {
    /// Optional call ID (if not provided, generate UUID)
    pub call_id: Option<String>,

    /// Segment duration in seconds (default from config)
    pub segment_duration_secs: Option<u64>,

    /// Summarization trigger mode (default from config)
    pub summary_trigger: Option<SummaryTrigger>,
}

#[derive(Debug, Serialize)]
pub struct JoinMeetingResponse {
    pub call_id: String,
    pub invite_link: String,
    pub status: String,
}

#[derive(Debug, Serialize)]
pub struct LeaveMeetingResponse {
    pub call_id: String,
    pub status: String,
    pub stats: SessionStats,
}

#[derive(Debug, Serialize)]
pub struct StatusResponse {
    pub call_id: String,
    pub stats: SessionStats,
    pub error: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct TranscriptResponse {
    pub call_id: String,
    pub segments: Vec<TranscriptResult>,
}

#[derive(Debug, Serialize)]
pub struct SummaryResponse {
    pub call_id: String,
    pub summary: String,
}

#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
}

// ============================================================================
// Handlers
// ============================================================================

/// POST /meetings/join
/// Join a call and start supervising its session
pub async fn join_meeting(
    State(state): State<AppState>,
    Json(req): Json<JoinMeetingRequest>,
) -> impl IntoResponse {
    let call_id = req
        .call_id
        .unwrap_or_else(|| format!("meeting-{}", uuid::Uuid::new_v4()));

    info!("Joining meeting: {}", call_id);

    // Check for an existing session
    {
        let sessions = state.sessions.read().await;
        if sessions.contains_key(&call_id) {
            return (
                StatusCode::CONFLICT,
                Json(ErrorResponse {
                    error: format!("Meeting {} already has a live session", call_id),
                }),
            )
                .into_response();
        }
    }

    let (transport, chat) = match state.factory.connect(&call_id).await {
        Ok(pair) => pair,
        Err(e) => {
            error!("Failed to connect collaborators: {}", e);
            return (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(ErrorResponse {
                    error: format!("Failed to connect collaborators: {}", e),
                }),
            )
                .into_response();
        }
    };

    let backend = match state.factory.capture_backend() {
        Ok(backend) => backend,
        Err(e) => {
            error!("No capture device available: {}", e);
            return (
                StatusCode::SERVICE_UNAVAILABLE,
                Json(ErrorResponse {
                    error: format!("No capture device available: {}", e),
                }),
            )
                .into_response();
        }
    };

    let config = SessionConfig {
        call_id: call_id.clone(),
        segment_duration: Duration::from_secs(
            req.segment_duration_secs
                .unwrap_or(state.config.audio.segment_duration_secs),
        ),
        sample_rate: state.config.audio.sample_rate,
        channels: state.config.audio.channels,
        summary_trigger: req
            .summary_trigger
            .unwrap_or(state.config.session.summary_trigger),
        drain_grace: Duration::from_secs(state.config.session.drain_grace_secs),
    };

    let session = Arc::new(SessionOrchestrator::new(
        config,
        transport,
        chat,
        backend,
        Arc::clone(&state.transcriber),
        Arc::clone(&state.summarizer),
    ));

    if let Err(e) = session.start().await {
        error!("Failed to start session: {}", e);
        return (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(ErrorResponse {
                error: format!("Failed to start session: {}", e),
            }),
        )
            .into_response();
    }

    {
        let mut sessions = state.sessions.write().await;
        sessions.insert(call_id.clone(), session);
    }

    let invite_link = format!("{}/meeting/{}", state.config.service.base_url, call_id);

    info!("Session created for meeting: {}", call_id);

    (
        StatusCode::OK,
        Json(JoinMeetingResponse {
            call_id,
            invite_link,
            status: "joining".to_string(),
        }),
    )
        .into_response()
}

/// POST /meetings/:call_id/leave
/// Leave the call and stop its session
pub async fn leave_meeting(
    State(state): State<AppState>,
    Path(call_id): Path<String>,
) -> impl IntoResponse {
    let session = {
        let mut sessions = state.sessions.write().await;
        sessions.remove(&call_id)
    };

    let Some(session) = session else {
        return (
            StatusCode::NOT_FOUND,
            Json(ErrorResponse {
                error: format!("No live session for meeting {}", call_id),
            }),
        )
            .into_response();
    };

    if let Err(e) = session.leave().await {
        warn!("Leave request to transport failed: {}", e);
    }

    let stats = session.stop().await;

    info!("Session stopped for meeting: {}", call_id);

    (
        StatusCode::OK,
        Json(LeaveMeetingResponse {
            call_id,
            status: "stopped".to_string(),
            stats,
        }),
    )
        .into_response()
}

/// GET /meetings/:call_id/status
pub async fn get_status(
    State(state): State<AppState>,
    Path(call_id): Path<String>,
) -> impl IntoResponse {
    let session = {
        let sessions = state.sessions.read().await;
        sessions.get(&call_id).cloned()
    };

    match session {
        Some(session) => {
            let stats = session.stats().await;
            let error = session.last_error().await;
            (
                StatusCode::OK,
                Json(StatusResponse {
                    call_id,
                    stats,
                    error,
                }),
            )
                .into_response()
        }
        None => (
            StatusCode::NOT_FOUND,
            Json(ErrorResponse {
                error: format!("No live session for meeting {}", call_id),
            }),
        )
            .into_response(),
    }
}

/// GET /meetings/:call_id/transcript
pub async fn get_transcript(
    State(state): State<AppState>,
    Path(call_id): Path<String>,
) -> impl IntoResponse {
    let session = {
        let sessions = state.sessions.read().await;
        sessions.get(&call_id).cloned()
    };

    match session {
        Some(session) => {
            let segments = session.transcript().await;
            (
                StatusCode::OK,
                Json(TranscriptResponse { call_id, segments }),
            )
                .into_response()
        }
        None => (
            StatusCode::NOT_FOUND,
            Json(ErrorResponse {
                error: format!("No live session for meeting {}", call_id),
            }),
        )
            .into_response(),
    }
}

/// GET /meetings/:call_id/summary
pub async fn get_summary(
    State(state): State<AppState>,
    Path(call_id): Path<String>,
) -> impl IntoResponse {
    let session = {
        let sessions = state.sessions.read().await;
        sessions.get(&call_id).cloned()
    };

    match session {
        Some(session) => {
            let summary = session.current_summary().await;
            (StatusCode::OK, Json(SummaryResponse { call_id, summary })).into_response()
        }
        None => (
            StatusCode::NOT_FOUND,
            Json(ErrorResponse {
                error: format!("No live session for meeting {}", call_id),
            }),
        )
            .into_response(),
    }
}

/// POST /meetings/:call_id/summarize
/// Summarize the accumulated transcript on demand
pub async fn summarize(
    State(state): State<AppState>,
    Path(call_id): Path<String>,
) -> impl IntoResponse {
    let session = {
        let sessions = state.sessions.read().await;
        sessions.get(&call_id).cloned()
    };

    let Some(session) = session else {
        return (
            StatusCode::NOT_FOUND,
            Json(ErrorResponse {
                error: format!("No live session for meeting {}", call_id),
            }),
        )
            .into_response();
    };

    match session.summarize_now().await {
        Ok(summary) => {
            (StatusCode::OK, Json(SummaryResponse { call_id, summary })).into_response()
        }
        Err(SessionError::EmptyTranscript) => (
            StatusCode::UNPROCESSABLE_ENTITY,
            Json(ErrorResponse {
                error: "No transcript to summarize yet".to_string(),
            }),
        )
            .into_response(),
        Err(SessionError::Summarize(e)) => (
            StatusCode::BAD_GATEWAY,
            Json(ErrorResponse {
                error: format!("Summarization failed: {}", e),
            }),
        )
            .into_response(),
        Err(e) => (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(ErrorResponse {
                error: e.to_string(),
            }),
        )
            .into_response(),
    }
}

/// GET /health
pub async fn health_check() -> impl IntoResponse {
    (StatusCode::OK, Json(serde_json::json!({ "status": "ok" })))
}
