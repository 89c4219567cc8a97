// Tests for the scripted session: timed replay, nested intervention
// timers, and cancellation of everything on stop. All tests run on the
// paused tokio clock.

use meetmod::simulator::{default_script, ScriptEntry, ScriptedIntervention, ScriptedSession};
use meetmod::transport::{InterventionKind, SessionEvent};
use std::time::Duration;
use tokio::sync::mpsc;

fn line(speaker: &str, text: &str, delay_ms: u64) -> ScriptEntry {
    ScriptEntry {
        speaker: speaker.to_string(),
        text: text.to_string(),
        delay: Duration::from_millis(delay_ms),
        intervention: None,
    }
}

fn line_with_intervention(speaker: &str, text: &str, delay_ms: u64, id: &str) -> ScriptEntry {
    ScriptEntry {
        intervention: Some(ScriptedIntervention {
            id: id.to_string(),
            message: "Back to the agenda.".to_string(),
            kind: InterventionKind::TopicDrift {
                parking_lot_item: None,
            },
        }),
        ..line(speaker, text, delay_ms)
    }
}

#[tokio::test(start_paused = true)]
async fn test_start_then_immediate_stop_produces_no_events() {
    let (tx, mut rx) = mpsc::channel(100);
    let session = ScriptedSession::new(vec![line("A", "hello", 0)], tx);

    session.start();
    session.stop();

    for _ in 0..20 {
        tokio::task::yield_now().await;
    }
    assert!(rx.try_recv().is_err(), "no events may fire after stop");
}

#[tokio::test(start_paused = true)]
async fn test_script_replays_in_order() {
    let (tx, mut rx) = mpsc::channel(100);
    let session = ScriptedSession::new(
        vec![
            line("A", "first", 0),
            line("B", "second", 100),
            line("A", "third", 200),
        ],
        tx,
    );

    session.start();

    let mut texts = Vec::new();
    for _ in 0..3 {
        match rx.recv().await.unwrap() {
            SessionEvent::Transcript(entry) => texts.push(entry.text),
            other => panic!("unexpected event: {:?}", other),
        }
    }
    assert_eq!(texts, vec!["first", "second", "third"]);
}

#[tokio::test(start_paused = true)]
async fn test_flagged_entry_triggers_intervention_after_delay() {
    let (tx, mut rx) = mpsc::channel(100);
    let session = ScriptedSession::new(
        vec![line_with_intervention("A", "I decided for everyone", 50, "int_1")],
        tx,
    );

    session.start();

    match rx.recv().await.unwrap() {
        SessionEvent::Transcript(entry) => assert_eq!(entry.text, "I decided for everyone"),
        other => panic!("unexpected event: {:?}", other),
    }

    match rx.recv().await.unwrap() {
        SessionEvent::Intervention(intervention) => {
            assert_eq!(intervention.id, "int_1");
        }
        other => panic!("unexpected event: {:?}", other),
    }
}

#[tokio::test(start_paused = true)]
async fn test_stop_after_entry_cancels_nested_intervention() {
    let (tx, mut rx) = mpsc::channel(100);
    let session = ScriptedSession::new(
        vec![line_with_intervention("A", "railroading", 0, "int_1")],
        tx,
    );

    session.start();

    // The transcript fires, its intervention is now pending
    match rx.recv().await.unwrap() {
        SessionEvent::Transcript(_) => {}
        other => panic!("unexpected event: {:?}", other),
    }

    session.stop();

    // Well past the nested delay: nothing else may arrive
    let result = tokio::time::timeout(Duration::from_secs(5), rx.recv()).await;
    assert!(result.is_err(), "nested intervention must be cancelled");
}

#[tokio::test(start_paused = true)]
async fn test_stop_is_idempotent_from_any_state() {
    let (tx, mut rx) = mpsc::channel(100);
    let session = ScriptedSession::new(vec![line("A", "hello", 0)], tx);

    // Never started
    session.stop();
    session.stop();
    assert!(!session.is_running());

    // Started, then stopped twice
    session.start();
    session.stop();
    session.stop();

    for _ in 0..20 {
        tokio::task::yield_now().await;
    }
    assert!(rx.try_recv().is_err());
}

#[tokio::test(start_paused = true)]
async fn test_double_start_does_not_duplicate_events() {
    let (tx, mut rx) = mpsc::channel(100);
    let session = ScriptedSession::new(vec![line("A", "only once", 10)], tx);

    session.start();
    session.start();

    match rx.recv().await.unwrap() {
        SessionEvent::Transcript(entry) => assert_eq!(entry.text, "only once"),
        other => panic!("unexpected event: {:?}", other),
    }

    let result = tokio::time::timeout(Duration::from_secs(1), rx.recv()).await;
    assert!(result.is_err(), "second start must be a no-op");
}

#[tokio::test(start_paused = true)]
async fn test_restart_after_stop_replays_again() {
    let (tx, mut rx) = mpsc::channel(100);
    let session = ScriptedSession::new(vec![line("A", "take two", 10)], tx);

    session.start();
    session.stop();
    session.start();

    match rx.recv().await.unwrap() {
        SessionEvent::Transcript(entry) => assert_eq!(entry.text, "take two"),
        other => panic!("unexpected event: {:?}", other),
    }
}

#[tokio::test(start_paused = true)]
async fn test_default_script_full_replay() {
    let script = default_script();
    let expected_transcripts = script.len();
    let expected_interventions = script.iter().filter(|e| e.intervention.is_some()).count();
    assert!(expected_interventions > 0);

    let (tx, mut rx) = mpsc::channel(100);
    let session = ScriptedSession::new(script, tx);
    session.start();

    let mut transcripts = 0;
    let mut interventions = 0;
    while transcripts < expected_transcripts || interventions < expected_interventions {
        match rx.recv().await.unwrap() {
            SessionEvent::Transcript(_) => transcripts += 1,
            SessionEvent::Intervention(_) => interventions += 1,
            other => panic!("unexpected event: {:?}", other),
        }
    }

    assert_eq!(transcripts, expected_transcripts);
    assert_eq!(interventions, expected_interventions);
    session.stop();
}
