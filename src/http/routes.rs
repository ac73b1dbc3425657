use super::handlers;
use super::state::AppState;
use axum::{
    routing::{get, post},
    Router,
};
use tower_http::trace::TraceLayer;

/// Create the HTTP router with all routes
pub fn create_router(state: AppState) -> Router {
    Router::new()
        // Health check
        .route("/health", get(handlers::health_check))
        // Session control
        .route("/meetings/join", post(handlers::join_meeting))
        .route("/meetings/:call_id/leave", post(handlers::leave_meeting))
        // Session queries
        .route("/meetings/:call_id/status", get(handlers::get_status))
        .route(
            "/meetings/:call_id/transcript",
            get(handlers::get_transcript),
        )
        .route("/meetings/:call_id/summary", get(handlers::get_summary))
        .route("/meetings/:call_id/summarize", post(handlers::summarize))
        // Add tracing middleware for request logging
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
