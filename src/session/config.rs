use serde::{Deserialize, Serialize};

use crate::transport::messages::Participant;

/// Configuration for one meeting session
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionConfig {
    /// Unique meeting identifier, also the socket path segment
    pub session_id: String,

    pub title: String,

    pub agenda: String,

    pub participants: Vec<Participant>,

    /// WebSocket base endpoint of the moderator backend
    pub ws_endpoint: String,

    /// REST base endpoint for the end-of-meeting save.
    /// None skips the save entirely (offline operation).
    pub api_endpoint: Option<String>,

    /// Replay the scripted session instead of capturing live audio
    pub demo: bool,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            session_id: format!("meeting-{}", uuid::Uuid::new_v4()),
            title: String::new(),
            agenda: String::new(),
            participants: Vec::new(),
            ws_endpoint: "ws://localhost:8000".to_string(),
            api_endpoint: None,
            demo: false,
        }
    }
}
