use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::transport::ConnectionState;

/// Statistics about a meeting session
#[derive(Debug, Clone, Serialize)]
pub struct SessionStats {
    /// Whether the session is currently running
    pub is_live: bool,

    /// When the session was created
    pub started_at: DateTime<Utc>,

    /// Total duration in seconds
    pub duration_secs: f64,

    /// Number of audio frames flushed from capture so far
    pub frames_captured: usize,

    /// Number of transcript entries accumulated
    pub transcript_count: usize,

    /// Number of interventions accumulated
    pub intervention_count: usize,

    /// Current state of the session socket
    pub connection: ConnectionState,
}
