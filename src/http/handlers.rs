use super::state::AppState;
use crate::audio::CaptureConfig;
use crate::session::{MeetingSession, SessionConfig, SessionStats};
use crate::transport::messages::Participant;
use crate::transport::WsConnector;
use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Json},
};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tracing::{error, info};

// ============================================================================
// Request/Response Types
// ============================================================================

#[derive(Debug, Deserialize)]
pub struct StartMeetingRequest {
    /// Optional meeting ID (if not provided, generate UUID)
    pub meeting_id: Option<String>,

    pub title: Option<String>,

    pub agenda: Option<String>,

    #[serde(default)]
    pub participants: Vec<Participant>,

    /// Replay the scripted session instead of going live
    #[serde(default)]
    pub demo: bool,
}

#[derive(Debug, Serialize)]
pub struct StartMeetingResponse {
    pub meeting_id: String,
    pub status: String,
    pub message: String,
}

#[derive(Debug, Serialize)]
pub struct StopMeetingResponse {
    pub meeting_id: String,
    pub status: String,
    pub stats: SessionStats,
}

#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
}

// ============================================================================
// Handlers
// ============================================================================

/// POST /meetings/start
/// Start a new meeting session (live or scripted)
pub async fn start_meeting(
    State(state): State<AppState>,
    Json(req): Json<StartMeetingRequest>,
) -> impl IntoResponse {
    let meeting_id = req
        .meeting_id
        .unwrap_or_else(|| format!("meeting-{}", uuid::Uuid::new_v4()));

    info!("starting meeting: {} (demo={})", meeting_id, req.demo);

    {
        let sessions = state.sessions.read().await;
        if sessions.contains_key(&meeting_id) {
            return (
                StatusCode::CONFLICT,
                Json(ErrorResponse {
                    error: format!("Meeting {} is already running", meeting_id),
                }),
            )
                .into_response();
        }
    }

    let session_config = SessionConfig {
        session_id: meeting_id.clone(),
        title: req.title.unwrap_or_default(),
        agenda: req.agenda.unwrap_or_default(),
        participants: req.participants,
        ws_endpoint: state.config.backend.ws_endpoint.clone(),
        api_endpoint: state.config.backend.api_endpoint.clone(),
        demo: req.demo,
    };

    let audio = &state.config.audio;
    let capture_config = CaptureConfig {
        sample_rate: audio.sample_rate,
        block_size: audio.block_size,
        flush_interval: Duration::from_millis(audio.flush_interval_ms),
        archive_path: audio
            .archive_dir
            .as_ref()
            .map(|dir| PathBuf::from(dir).join(format!("{}.wav", meeting_id))),
    };

    let session = Arc::new(MeetingSession::new(
        session_config,
        capture_config,
        Arc::new(WsConnector),
    ));

    if let Err(e) = session.start().await {
        error!("failed to start meeting: {:#}", e);
        return (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(ErrorResponse {
                error: format!("Failed to start meeting: {}", e),
            }),
        )
            .into_response();
    }

    {
        let mut sessions = state.sessions.write().await;
        sessions.insert(meeting_id.clone(), session);
    }

    info!("meeting started: {}", meeting_id);

    (
        StatusCode::OK,
        Json(StartMeetingResponse {
            meeting_id: meeting_id.clone(),
            status: "in_progress".to_string(),
            message: format!("Meeting {} started", meeting_id),
        }),
    )
        .into_response()
}

/// POST /meetings/:meeting_id/stop
/// Stop a meeting, save it, and release its resources
pub async fn stop_meeting(
    State(state): State<AppState>,
    Path(meeting_id): Path<String>,
) -> impl IntoResponse {
    let session = {
        let mut sessions = state.sessions.write().await;
        sessions.remove(&meeting_id)
    };

    match session {
        Some(session) => {
            let stats = session.stop().await;
            info!("meeting stopped: {}", meeting_id);
            (
                StatusCode::OK,
                Json(StopMeetingResponse {
                    meeting_id,
                    status: "completed".to_string(),
                    stats,
                }),
            )
                .into_response()
        }
        None => not_found(&meeting_id),
    }
}

/// GET /meetings/:meeting_id/status
pub async fn get_meeting_status(
    State(state): State<AppState>,
    Path(meeting_id): Path<String>,
) -> impl IntoResponse {
    let sessions = state.sessions.read().await;

    match sessions.get(&meeting_id) {
        Some(session) => (StatusCode::OK, Json(session.stats().await)).into_response(),
        None => not_found(&meeting_id),
    }
}

/// GET /meetings/:meeting_id/timeline
/// Transcript and interventions merged, ascending by timestamp
pub async fn get_meeting_timeline(
    State(state): State<AppState>,
    Path(meeting_id): Path<String>,
) -> impl IntoResponse {
    let sessions = state.sessions.read().await;

    match sessions.get(&meeting_id) {
        Some(session) => (StatusCode::OK, Json(session.merged_timeline().await)).into_response(),
        None => not_found(&meeting_id),
    }
}

/// GET /meetings/:meeting_id/transcript
pub async fn get_meeting_transcript(
    State(state): State<AppState>,
    Path(meeting_id): Path<String>,
) -> impl IntoResponse {
    let sessions = state.sessions.read().await;

    match sessions.get(&meeting_id) {
        Some(session) => (StatusCode::OK, Json(session.transcript().await)).into_response(),
        None => not_found(&meeting_id),
    }
}

/// GET /meetings/:meeting_id/intervention
/// The currently surfaced intervention, if any
pub async fn get_active_intervention(
    State(state): State<AppState>,
    Path(meeting_id): Path<String>,
) -> impl IntoResponse {
    let sessions = state.sessions.read().await;

    match sessions.get(&meeting_id) {
        Some(session) => {
            (StatusCode::OK, Json(session.active_intervention().await)).into_response()
        }
        None => not_found(&meeting_id),
    }
}

/// POST /meetings/:meeting_id/intervention/dismiss
pub async fn dismiss_intervention(
    State(state): State<AppState>,
    Path(meeting_id): Path<String>,
) -> impl IntoResponse {
    let sessions = state.sessions.read().await;

    match sessions.get(&meeting_id) {
        Some(session) => {
            session.dismiss_intervention().await;
            StatusCode::NO_CONTENT.into_response()
        }
        None => not_found(&meeting_id),
    }
}

/// POST /meetings/:meeting_id/audio/pause
pub async fn pause_audio(
    State(state): State<AppState>,
    Path(meeting_id): Path<String>,
) -> impl IntoResponse {
    let sessions = state.sessions.read().await;

    match sessions.get(&meeting_id) {
        Some(session) => {
            session.pause_audio().await;
            StatusCode::NO_CONTENT.into_response()
        }
        None => not_found(&meeting_id),
    }
}

/// POST /meetings/:meeting_id/audio/resume
pub async fn resume_audio(
    State(state): State<AppState>,
    Path(meeting_id): Path<String>,
) -> impl IntoResponse {
    let sessions = state.sessions.read().await;

    match sessions.get(&meeting_id) {
        Some(session) => {
            session.resume_audio().await;
            StatusCode::NO_CONTENT.into_response()
        }
        None => not_found(&meeting_id),
    }
}

/// GET /health
pub async fn health_check() -> impl IntoResponse {
    (StatusCode::OK, "OK")
}

fn not_found(meeting_id: &str) -> axum::response::Response {
    (
        StatusCode::NOT_FOUND,
        Json(ErrorResponse {
            error: format!("Meeting {} not found", meeting_id),
        }),
    )
        .into_response()
}
