use crate::config::Config;
use crate::session::MeetingSession;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;

/// Shared application state for HTTP handlers
#[derive(Clone)]
pub struct AppState {
    /// Active meeting sessions (meeting_id → session)
    pub sessions: Arc<RwLock<HashMap<String, Arc<MeetingSession>>>>,

    /// Service configuration
    pub config: Arc<Config>,
}

impl AppState {
    pub fn new(config: Arc<Config>) -> Self {
        Self {
            sessions: Arc::new(RwLock::new(HashMap::new())),
            config,
        }
    }
}
