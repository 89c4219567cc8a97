// End-to-end tests for the meeting session: one consumer loop applying
// events from either source to the timeline.
//
// Live-mode tests use an in-memory connector. Capture falls back to
// running without audio when no device exists, so these run anywhere.

use anyhow::Result;
use async_trait::async_trait;
use meetmod::audio::{AudioInput, BlockSender, CaptureConfig, CaptureError};
use meetmod::session::{MeetingSession, SessionConfig};
use meetmod::timeline::TimelineItem;
use meetmod::transport::messages::Participant;
use meetmod::transport::{ConnectionState, Connector, WireSink, WireStream};
use std::sync::{Arc, Mutex as StdMutex};
use std::time::Duration;
use tokio::sync::mpsc;

struct FakeConnector {
    inbound: StdMutex<Option<mpsc::UnboundedReceiver<String>>>,
    keepalive: StdMutex<Option<mpsc::UnboundedSender<String>>>,
}

impl FakeConnector {
    fn new() -> (Arc<Self>, mpsc::UnboundedSender<String>) {
        let (tx, rx) = mpsc::unbounded_channel();
        let connector = Arc::new(Self {
            inbound: StdMutex::new(Some(rx)),
            keepalive: StdMutex::new(None),
        });
        (connector, tx)
    }
}

#[async_trait]
impl Connector for FakeConnector {
    async fn connect(&self, _url: &str) -> Result<(Box<dyn WireSink>, Box<dyn WireStream>)> {
        let rx = self.inbound.lock().unwrap().take().unwrap_or_else(|| {
            let (tx, rx) = mpsc::unbounded_channel();
            *self.keepalive.lock().unwrap() = Some(tx);
            rx
        });
        Ok((Box::new(NullSink), Box::new(FakeStream { rx })))
    }
}

struct NullSink;

#[async_trait]
impl WireSink for NullSink {
    async fn send_text(&mut self, _text: String) -> Result<()> {
        Ok(())
    }
    async fn close(&mut self) -> Result<()> {
        Ok(())
    }
}

struct FakeStream {
    rx: mpsc::UnboundedReceiver<String>,
}

#[async_trait]
impl WireStream for FakeStream {
    async fn next_text(&mut self) -> Option<Result<String>> {
        self.rx.recv().await.map(Ok)
    }
}

/// Input device that is never available; the session must degrade to
/// running without audio.
struct DeadInput;

#[async_trait]
impl AudioInput for DeadInput {
    async fn open(&mut self, _blocks: BlockSender) -> Result<(), CaptureError> {
        Err(CaptureError::DeviceUnavailable(
            "no input device in tests".to_string(),
        ))
    }
    fn pause(&mut self) {}
    fn resume(&mut self) {}
    fn close(&mut self) {}
    fn name(&self) -> &str {
        "dead input"
    }
}

fn session_with(config: SessionConfig, connector: Arc<FakeConnector>) -> Arc<MeetingSession> {
    Arc::new(MeetingSession::with_input(
        config,
        CaptureConfig::default(),
        connector,
        Box::new(DeadInput),
    ))
}

fn participants() -> Vec<Participant> {
    vec![
        Participant {
            id: "p1".to_string(),
            name: "Dana".to_string(),
            role: "PM".to_string(),
        },
        Participant {
            id: "p2".to_string(),
            name: "Priya".to_string(),
            role: "Designer".to_string(),
        },
    ]
}

fn demo_config() -> SessionConfig {
    SessionConfig {
        session_id: "meeting-demo".to_string(),
        title: "Sprint review".to_string(),
        participants: participants(),
        demo: true,
        api_endpoint: None,
        ..SessionConfig::default()
    }
}

fn live_config() -> SessionConfig {
    SessionConfig {
        session_id: "meeting-live".to_string(),
        demo: false,
        api_endpoint: None,
        ..SessionConfig::default()
    }
}

async fn wait_for<F, Fut>(mut probe: F)
where
    F: FnMut() -> Fut,
    Fut: std::future::Future<Output = bool>,
{
    for _ in 0..400 {
        if probe().await {
            return;
        }
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
    panic!("condition not met in time");
}

#[tokio::test(start_paused = true)]
async fn test_demo_session_fills_timeline_from_script() {
    let (connector, _inbound) = FakeConnector::new();
    let session = session_with(demo_config(), connector);

    session.start().await.unwrap();

    // The default script fires its first line immediately
    {
        let session = Arc::clone(&session);
        wait_for(move || {
            let session = Arc::clone(&session);
            async move { !session.transcript().await.is_empty() }
        })
        .await;
    }

    // Demo mode recomputes local stats from the roster on each entry
    let stats = session.speaker_stats().await;
    assert!(stats.contains_key("Dana"));
    assert!(stats.contains_key("Priya"));

    let stopped = session.stop().await;
    assert!(!stopped.is_live);
    assert!(stopped.transcript_count >= 1);
}

#[tokio::test(start_paused = true)]
async fn test_live_session_applies_inbound_events() {
    let (connector, inbound) = FakeConnector::new();
    let session = session_with(live_config(), connector);

    session.start().await.unwrap();
    assert_eq!(session.stats().await.connection, ConnectionState::Open);

    inbound
        .send(
            r#"{"type":"transcript","data":{"id":"tr_1","timestamp":1000,"speaker":"Dana","text":"hello"},"timestamp":1000}"#
                .to_string(),
        )
        .unwrap();
    inbound
        .send(
            r#"{"type":"intervention","data":{"id":"int_1","type":"TOPIC_DRIFT","message":"Focus, please.","timestamp":2000,"parkingLotItem":"Lunch"},"timestamp":2000}"#
                .to_string(),
        )
        .unwrap();

    {
        let session = Arc::clone(&session);
        wait_for(move || {
            let session = Arc::clone(&session);
            async move { session.active_intervention().await.is_some() }
        })
        .await;
    }

    let merged = session.merged_timeline().await;
    assert_eq!(merged.len(), 2);
    assert!(matches!(merged[0], TimelineItem::Transcript(_)));
    assert!(matches!(merged[1], TimelineItem::Intervention(_)));

    // Dismissal clears the slot, history stays
    session.dismiss_intervention().await;
    assert!(session.active_intervention().await.is_none());
    assert_eq!(session.merged_timeline().await.len(), 2);

    session.stop().await;
}

#[tokio::test(start_paused = true)]
async fn test_session_start_and_stop_are_idempotent() {
    let (connector, _inbound) = FakeConnector::new();
    let session = session_with(live_config(), connector);

    session.start().await.unwrap();
    session.start().await.unwrap();
    assert!(session.stats().await.is_live);

    let first = session.stop().await;
    assert!(!first.is_live);
    assert_eq!(first.connection, ConnectionState::Idle);

    let second = session.stop().await;
    assert!(!second.is_live);
}

#[tokio::test(start_paused = true)]
async fn test_stop_before_start_is_safe() {
    let (connector, _inbound) = FakeConnector::new();
    let session = session_with(live_config(), connector);

    let stats = session.stop().await;
    assert!(!stats.is_live);
    assert_eq!(stats.transcript_count, 0);
}
