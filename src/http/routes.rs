use super::handlers;
use super::state::AppState;
use axum::{
    routing::{get, post},
    Router,
};
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

/// Create the HTTP router with all routes
pub fn create_router(state: AppState) -> Router {
    Router::new()
        // Health check
        .route("/health", get(handlers::health_check))
        // Meeting control
        .route("/meetings/start", post(handlers::start_meeting))
        .route("/meetings/:meeting_id/stop", post(handlers::stop_meeting))
        // Meeting queries
        .route(
            "/meetings/:meeting_id/status",
            get(handlers::get_meeting_status),
        )
        .route(
            "/meetings/:meeting_id/timeline",
            get(handlers::get_meeting_timeline),
        )
        .route(
            "/meetings/:meeting_id/transcript",
            get(handlers::get_meeting_transcript),
        )
        // Intervention surface
        .route(
            "/meetings/:meeting_id/intervention",
            get(handlers::get_active_intervention),
        )
        .route(
            "/meetings/:meeting_id/intervention/dismiss",
            post(handlers::dismiss_intervention),
        )
        // Audio control
        .route(
            "/meetings/:meeting_id/audio/pause",
            post(handlers::pause_audio),
        )
        .route(
            "/meetings/:meeting_id/audio/resume",
            post(handlers::resume_audio),
        )
        // Request logging + permissive CORS for the local frontend
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}
