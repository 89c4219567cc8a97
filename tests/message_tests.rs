// Wire format tests for the session envelope types

use meetmod::session::SavedMeeting;
use meetmod::transport::messages::{AudioEnvelope, SpeakerStat, TranscriptEntry};
use meetmod::transport::{Intervention, InterventionKind};
use std::collections::HashMap;

#[test]
fn test_audio_envelope_shape() {
    let envelope = AudioEnvelope {
        kind: "audio",
        data: "AAAA",
        timestamp: 1_700_000_000_123,
    };

    let json: serde_json::Value = serde_json::to_value(&envelope).unwrap();
    assert_eq!(json["type"], "audio");
    assert_eq!(json["data"], "AAAA");
    assert_eq!(json["timestamp"], 1_700_000_000_123i64);
}

#[test]
fn test_transcript_entry_round_trip() {
    let json = r#"{
        "id": "tr_ab12cd34",
        "timestamp": 1700000000000,
        "speaker": "Dana",
        "text": "We closed eight tasks last sprint."
    }"#;

    let entry: TranscriptEntry = serde_json::from_str(json).unwrap();
    assert_eq!(entry.id, "tr_ab12cd34");
    assert_eq!(entry.speaker, "Dana");
    assert_eq!(entry.timestamp, 1_700_000_000_000);

    let back = serde_json::to_value(&entry).unwrap();
    assert_eq!(back["text"], "We closed eight tasks last sprint.");
}

#[test]
fn test_intervention_topic_drift() {
    let json = r#"{
        "id": "int_001",
        "type": "TOPIC_DRIFT",
        "message": "Back to the agenda, please.",
        "timestamp": 1700000001000,
        "parkingLotItem": "Lunch plans"
    }"#;

    let intervention: Intervention = serde_json::from_str(json).unwrap();
    assert_eq!(
        intervention.kind,
        InterventionKind::TopicDrift {
            parking_lot_item: Some("Lunch plans".to_string())
        }
    );
}

#[test]
fn test_intervention_principle_violation() {
    let json = r#"{
        "id": "int_002",
        "type": "PRINCIPLE_VIOLATION",
        "message": "Decisions here are made together.",
        "timestamp": 1700000002000,
        "violatedPrinciple": "Shared decision-making"
    }"#;

    let intervention: Intervention = serde_json::from_str(json).unwrap();
    assert_eq!(
        intervention.kind,
        InterventionKind::PrincipleViolation {
            violated_principle: Some("Shared decision-making".to_string())
        }
    );
}

#[test]
fn test_intervention_participation_imbalance() {
    let json = r#"{
        "id": "int_003",
        "type": "PARTICIPATION_IMBALANCE",
        "message": "Priya has not spoken yet.",
        "timestamp": 1700000003000,
        "suggestedSpeaker": "Priya"
    }"#;

    let intervention: Intervention = serde_json::from_str(json).unwrap();
    assert_eq!(
        intervention.kind,
        InterventionKind::ParticipationImbalance {
            suggested_speaker: Some("Priya".to_string())
        }
    );
}

#[test]
fn test_intervention_decision_style() {
    let json = r#"{
        "id": "int_004",
        "type": "DECISION_STYLE",
        "message": "Consider a quick round of votes.",
        "timestamp": 1700000004000
    }"#;

    let intervention: Intervention = serde_json::from_str(json).unwrap();
    assert_eq!(intervention.kind, InterventionKind::DecisionStyle);
}

#[test]
fn test_intervention_optional_fields_may_be_absent() {
    let json = r#"{
        "id": "int_005",
        "type": "TOPIC_DRIFT",
        "message": "Drifting again.",
        "timestamp": 1700000005000
    }"#;

    let intervention: Intervention = serde_json::from_str(json).unwrap();
    assert_eq!(
        intervention.kind,
        InterventionKind::TopicDrift {
            parking_lot_item: None
        }
    );
}

#[test]
fn test_intervention_serializes_with_wire_tag() {
    let intervention = Intervention {
        id: "int_006".to_string(),
        message: "One at a time.".to_string(),
        timestamp: 1_700_000_006_000,
        kind: InterventionKind::ParticipationImbalance {
            suggested_speaker: Some("Marcus".to_string()),
        },
    };

    let json = serde_json::to_value(&intervention).unwrap();
    assert_eq!(json["type"], "PARTICIPATION_IMBALANCE");
    assert_eq!(json["suggestedSpeaker"], "Marcus");
    // Fields from other kinds never appear
    assert!(json.get("parkingLotItem").is_none());
    assert!(json.get("violatedPrinciple").is_none());
}

#[test]
fn test_speaker_stat_camel_case() {
    let json = r#"{"percentage": 60.0, "speakingTime": 30.5, "count": 6}"#;
    let stat: SpeakerStat = serde_json::from_str(json).unwrap();
    assert_eq!(stat.percentage, 60.0);
    assert_eq!(stat.speaking_time, 30.5);
    assert_eq!(stat.count, 6);

    let back = serde_json::to_value(&stat).unwrap();
    assert!(back.get("speakingTime").is_some());
    assert!(back.get("speaking_time").is_none());
}

#[test]
fn test_saved_meeting_uses_backend_field_names() {
    let saved = SavedMeeting {
        title: "Sprint review".to_string(),
        agenda: "Velocity, next sprint".to_string(),
        participants: Vec::new(),
        transcript: Vec::new(),
        interventions: Vec::new(),
        speaker_stats: HashMap::new(),
    };

    let json = serde_json::to_value(&saved).unwrap();
    assert!(json.get("speakerStats").is_some());
    assert!(json.get("speaker_stats").is_none());
    assert_eq!(json["title"], "Sprint review");
}
