// Session socket transport
//
// One duplex connection per meeting id. Outbound audio is
// fire-and-forget: frames are enqueued only while the connection is
// open and dropped otherwise, because stale real-time audio is not
// worth buffering. Inbound messages are parsed and dispatched one at a
// time, in arrival order, onto the session's event channel.

use anyhow::{Context, Result};
use serde::Serialize;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex as StdMutex};
use tokio::sync::{mpsc, RwLock};
use tokio::task::JoinHandle;
use tracing::{debug, info, trace, warn};

use super::messages::{
    AudioEnvelope, Intervention, SessionEvent, SpeakerStatsPayload, SttStatusPayload,
    TranscriptEntry,
};
use super::wire::Connector;
use crate::audio::AudioFrame;

/// Connection lifecycle state
///
/// Each episode moves idle → connecting → open → closed, or back to
/// idle when the dial itself fails.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ConnectionState {
    Idle,
    Connecting,
    Open,
    Closed,
}

enum OutboundCommand {
    Text(String),
    Close,
}

/// Client side of the per-meeting session socket
pub struct SessionTransport {
    session_id: String,
    endpoint: String,
    connector: Arc<dyn Connector>,
    state: Arc<RwLock<ConnectionState>>,
    /// Single-flight guard: at most one connection attempt at a time
    connecting: Arc<AtomicBool>,
    outbound: Arc<StdMutex<Option<mpsc::UnboundedSender<OutboundCommand>>>>,
    events: mpsc::Sender<SessionEvent>,
    reader_task: StdMutex<Option<JoinHandle<()>>>,
}

impl SessionTransport {
    pub fn new(
        session_id: String,
        endpoint: String,
        connector: Arc<dyn Connector>,
        events: mpsc::Sender<SessionEvent>,
    ) -> Self {
        Self {
            session_id,
            endpoint,
            connector,
            state: Arc::new(RwLock::new(ConnectionState::Idle)),
            connecting: Arc::new(AtomicBool::new(false)),
            outbound: Arc::new(StdMutex::new(None)),
            events,
            reader_task: StdMutex::new(None),
        }
    }

    pub async fn state(&self) -> ConnectionState {
        *self.state.read().await
    }

    fn session_url(&self) -> String {
        format!(
            "{}/ws/meetings/{}",
            self.endpoint.trim_end_matches('/'),
            self.session_id
        )
    }

    /// Open the session connection. No-op while an attempt is in
    /// flight or the connection is already open. A failed dial resets
    /// to idle; no automatic reconnection is ever attempted.
    pub async fn connect(&self) -> Result<()> {
        if self.connecting.swap(true, Ordering::SeqCst) {
            debug!("connection attempt already in progress");
            return Ok(());
        }
        if *self.state.read().await == ConnectionState::Open {
            self.connecting.store(false, Ordering::SeqCst);
            debug!("already connected");
            return Ok(());
        }

        *self.state.write().await = ConnectionState::Connecting;
        let url = self.session_url();
        info!("connecting session socket: {}", url);

        let (mut sink, mut stream) = match self.connector.connect(&url).await {
            Ok(pair) => pair,
            Err(e) => {
                *self.state.write().await = ConnectionState::Idle;
                self.connecting.store(false, Ordering::SeqCst);
                return Err(e).context("Failed to open session connection");
            }
        };

        *self.state.write().await = ConnectionState::Open;
        self.connecting.store(false, Ordering::SeqCst);
        info!("session connection open: {}", self.session_id);

        let (out_tx, mut out_rx) = mpsc::unbounded_channel();
        *self.outbound.lock().unwrap() = Some(out_tx);

        // Writer drains the outbound queue until closed. Detached: it
        // ends on its own once the queue sender is dropped or a Close
        // goes through.
        tokio::spawn(async move {
            while let Some(cmd) = out_rx.recv().await {
                match cmd {
                    OutboundCommand::Text(text) => {
                        if let Err(e) = sink.send_text(text).await {
                            warn!("failed to send on session socket: {}", e);
                        }
                    }
                    OutboundCommand::Close => {
                        if let Err(e) = sink.close().await {
                            debug!("error closing session socket: {}", e);
                        }
                        break;
                    }
                }
            }
        });

        let state = Arc::clone(&self.state);
        let outbound = Arc::clone(&self.outbound);
        let events = self.events.clone();
        let session_id = self.session_id.clone();

        let reader = tokio::spawn(async move {
            while let Some(message) = stream.next_text().await {
                match message {
                    Ok(text) => dispatch_inbound(&text, &events).await,
                    // The close that follows a socket error is the
                    // authoritative state change.
                    Err(e) => warn!("session socket error: {}", e),
                }
            }

            // Remote close: discard the handle so a later connect()
            // dials a fresh connection.
            let mut st = state.write().await;
            if *st == ConnectionState::Open {
                *st = ConnectionState::Closed;
                info!("session connection closed: {}", session_id);
            }
            *outbound.lock().unwrap() = None;
        });

        *self.reader_task.lock().unwrap() = Some(reader);
        Ok(())
    }

    /// Send one encoded audio frame if the connection is open;
    /// otherwise the frame is dropped silently.
    pub async fn send_audio(&self, frame: &AudioFrame) {
        if *self.state.read().await != ConnectionState::Open {
            trace!("connection not open, dropping audio frame");
            return;
        }

        let envelope = AudioEnvelope {
            kind: "audio",
            data: &frame.data,
            timestamp: frame.timestamp_ms,
        };
        let text = match serde_json::to_string(&envelope) {
            Ok(t) => t,
            Err(e) => {
                warn!("failed to encode audio envelope: {}", e);
                return;
            }
        };

        if let Some(tx) = self.outbound.lock().unwrap().as_ref() {
            let _ = tx.send(OutboundCommand::Text(text));
        }
    }

    /// Close the connection and reset to idle. Safe to call in any
    /// state, any number of times.
    pub async fn disconnect(&self) {
        let sender = self.outbound.lock().unwrap().take();
        if let Some(tx) = sender {
            info!("disconnecting session: {}", self.session_id);
            let _ = tx.send(OutboundCommand::Close);
        }
        if let Some(task) = self.reader_task.lock().unwrap().take() {
            task.abort();
        }
        *self.state.write().await = ConnectionState::Idle;
        self.connecting.store(false, Ordering::SeqCst);
    }
}

/// Parse one inbound message and route it by `type`. Malformed
/// payloads and unrecognized types are logged and dropped; nothing
/// here can take the connection down.
async fn dispatch_inbound(text: &str, events: &mpsc::Sender<SessionEvent>) {
    let mut value: serde_json::Value = match serde_json::from_str(text) {
        Ok(v) => v,
        Err(e) => {
            warn!("failed to parse inbound message: {}", e);
            return;
        }
    };

    let kind = value
        .get("type")
        .and_then(|t| t.as_str())
        .unwrap_or_default()
        .to_string();
    let data = value
        .get_mut("data")
        .map(serde_json::Value::take)
        .unwrap_or(serde_json::Value::Null);

    let event = match kind.as_str() {
        "transcript" => match serde_json::from_value::<TranscriptEntry>(data) {
            Ok(entry) => SessionEvent::Transcript(entry),
            Err(e) => {
                warn!("malformed transcript payload: {}", e);
                return;
            }
        },
        "intervention" => match serde_json::from_value::<Intervention>(data) {
            Ok(intervention) => SessionEvent::Intervention(intervention),
            Err(e) => {
                warn!("malformed intervention payload: {}", e);
                return;
            }
        },
        "speaker_stats" => match serde_json::from_value::<SpeakerStatsPayload>(data) {
            Ok(payload) => SessionEvent::SpeakerStats(payload.stats),
            Err(e) => {
                warn!("malformed speaker_stats payload: {}", e);
                return;
            }
        },
        "stt_status" => match serde_json::from_value::<SttStatusPayload>(data) {
            Ok(payload) => SessionEvent::SttStatus(payload.status),
            Err(e) => {
                warn!("malformed stt_status payload: {}", e);
                return;
            }
        },
        "error" => SessionEvent::ServerError(data),
        other => {
            warn!("unknown message type: {:?}", other);
            return;
        }
    };

    if events.send(event).await.is_err() {
        debug!("event consumer gone, dropping inbound message");
    }
}
