//! HTTP API server for external control (frontend, tooling)
//!
//! This module provides a REST API for driving meeting sessions:
//! - POST /meetings/start - Start a meeting (live or scripted)
//! - POST /meetings/:id/stop - Stop a meeting and save it
//! - GET /meetings/:id/status - Query session statistics
//! - GET /meetings/:id/timeline - Merged transcript + interventions
//! - GET /meetings/:id/transcript - Transcript only
//! - GET /meetings/:id/intervention - Currently surfaced intervention
//! - POST /meetings/:id/intervention/dismiss - Clear the surfaced one
//! - POST /meetings/:id/audio/pause|resume - Suspend/resume capture
//! - GET /health - Health check

mod handlers;
mod routes;
mod state;

pub use routes::create_router;
pub use state::AppState;
