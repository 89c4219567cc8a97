use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Outbound audio envelope sent over the session socket
#[derive(Debug, Serialize)]
pub struct AudioEnvelope<'a> {
    #[serde(rename = "type")]
    pub kind: &'static str,
    /// Base64-encoded PCM16 LE bytes
    pub data: &'a str,
    /// Epoch milliseconds
    pub timestamp: i64,
}

/// One line of live transcript
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TranscriptEntry {
    pub id: String,
    /// Epoch milliseconds
    pub timestamp: i64,
    pub speaker: String,
    pub text: String,
}

/// Kind-specific payload of a moderator intervention
///
/// Tagged union so a payload field can never appear under the wrong
/// kind. Wire form is the `type` discriminator plus camelCase fields.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum InterventionKind {
    #[serde(rename = "TOPIC_DRIFT")]
    TopicDrift {
        #[serde(
            rename = "parkingLotItem",
            default,
            skip_serializing_if = "Option::is_none"
        )]
        parking_lot_item: Option<String>,
    },
    #[serde(rename = "PRINCIPLE_VIOLATION")]
    PrincipleViolation {
        #[serde(
            rename = "violatedPrinciple",
            default,
            skip_serializing_if = "Option::is_none"
        )]
        violated_principle: Option<String>,
    },
    #[serde(rename = "PARTICIPATION_IMBALANCE")]
    ParticipationImbalance {
        #[serde(
            rename = "suggestedSpeaker",
            default,
            skip_serializing_if = "Option::is_none"
        )]
        suggested_speaker: Option<String>,
    },
    #[serde(rename = "DECISION_STYLE")]
    DecisionStyle,
}

/// A moderator intervention surfaced during the meeting
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Intervention {
    pub id: String,
    pub message: String,
    /// Epoch milliseconds
    pub timestamp: i64,
    #[serde(flatten)]
    pub kind: InterventionKind,
}

/// Per-participant speaking statistics, keyed by name in the stats map
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SpeakerStat {
    pub percentage: f64,
    pub speaking_time: f64,
    pub count: u32,
}

/// A meeting participant
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Participant {
    pub id: String,
    pub name: String,
    pub role: String,
}

/// `speaker_stats` payload: the whole mapping, replaced wholesale
#[derive(Debug, Deserialize)]
pub struct SpeakerStatsPayload {
    pub stats: HashMap<String, SpeakerStat>,
}

/// `stt_status` payload (diagnostic only)
#[derive(Debug, Deserialize)]
pub struct SttStatusPayload {
    pub status: String,
}

/// Typed inbound event, dispatched from the session socket (or the
/// scripted session) to the single consumer loop.
#[derive(Debug, Clone)]
pub enum SessionEvent {
    Transcript(TranscriptEntry),
    Intervention(Intervention),
    /// Full replacement for the speaker-stat mapping, not a merge
    SpeakerStats(HashMap<String, SpeakerStat>),
    SttStatus(String),
    ServerError(serde_json::Value),
}
