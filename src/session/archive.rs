use anyhow::{Context, Result};
use serde::Serialize;
use std::collections::HashMap;
use tracing::info;

use crate::transport::messages::{Intervention, Participant, SpeakerStat, TranscriptEntry};

/// Full accumulated session state, shipped to the backend once at
/// session end. Field names follow the backend's save contract.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SavedMeeting {
    pub title: String,
    pub agenda: String,
    pub participants: Vec<Participant>,
    pub transcript: Vec<TranscriptEntry>,
    pub interventions: Vec<Intervention>,
    pub speaker_stats: HashMap<String, SpeakerStat>,
}

/// Issues the single end-of-meeting save call
pub struct MeetingArchiver {
    client: reqwest::Client,
    api_endpoint: String,
}

impl MeetingArchiver {
    pub fn new(api_endpoint: String) -> Self {
        Self {
            client: reqwest::Client::new(),
            api_endpoint,
        }
    }

    pub async fn save(&self, meeting_id: &str, meeting: &SavedMeeting) -> Result<()> {
        let url = format!(
            "{}/meetings/{}/save",
            self.api_endpoint.trim_end_matches('/'),
            meeting_id
        );

        self.client
            .post(&url)
            .json(meeting)
            .send()
            .await
            .context("Failed to send meeting save request")?
            .error_for_status()
            .context("Meeting save request rejected")?;

        info!("meeting saved: {}", meeting_id);
        Ok(())
    }
}
