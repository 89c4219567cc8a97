use chrono::{DateTime, Utc};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;
use tokio::sync::{mpsc, Mutex};
use tracing::{error, info, warn};

use super::archive::{MeetingArchiver, SavedMeeting};
use super::config::SessionConfig;
use super::stats::SessionStats;
use crate::audio::{AudioInput, CaptureConfig, CaptureManager, MicInput};
use crate::simulator::ScriptedSession;
use crate::timeline::{compute_speaker_stats, MeetingTimeline, TimelineItem};
use crate::transport::messages::{Intervention, SessionEvent, SpeakerStat, TranscriptEntry};
use crate::transport::{Connector, SessionTransport};
use anyhow::Result;
use std::collections::HashMap;

/// A meeting session that ties live capture, the session socket, the
/// event timeline, and the scripted fallback together
///
/// All inbound events, live or scripted, flow through one channel and
/// one consumer loop that applies them to the timeline in arrival
/// order.
pub struct MeetingSession {
    /// Session configuration
    config: SessionConfig,

    /// Session socket to the moderator backend
    transport: Arc<SessionTransport>,

    /// Accumulated events, shared with read paths
    timeline: Arc<Mutex<MeetingTimeline>>,

    /// Microphone capture pipeline
    capture: Mutex<CaptureManager>,

    /// Scripted fallback event source
    simulator: ScriptedSession,

    /// Whether the session is currently running
    is_live: Arc<AtomicBool>,

    /// Guards the once-only end-of-meeting save
    saved: AtomicBool,

    /// When the session was created
    started_at: DateTime<Utc>,

    /// Frames flushed from capture so far
    frames_captured: Arc<AtomicUsize>,
}

impl MeetingSession {
    /// Session capturing from the default microphone
    pub fn new(
        config: SessionConfig,
        capture_config: CaptureConfig,
        connector: Arc<dyn Connector>,
    ) -> Self {
        let input = Box::new(MicInput::new(
            capture_config.sample_rate,
            capture_config.block_size,
        ));
        Self::with_input(config, capture_config, connector, input)
    }

    /// Session with an explicit audio input device
    pub fn with_input(
        config: SessionConfig,
        capture_config: CaptureConfig,
        connector: Arc<dyn Connector>,
        input: Box<dyn AudioInput>,
    ) -> Self {
        let (events_tx, mut events_rx) = mpsc::channel::<SessionEvent>(100);

        let transport = Arc::new(SessionTransport::new(
            config.session_id.clone(),
            config.ws_endpoint.clone(),
            connector,
            events_tx.clone(),
        ));

        let simulator = ScriptedSession::with_default_script(events_tx);

        let timeline = Arc::new(Mutex::new(MeetingTimeline::new()));

        // Single consumer loop: the only writer to the timeline. Ends
        // when every event producer is gone.
        {
            let timeline = Arc::clone(&timeline);
            let participants = config.participants.clone();
            let recompute_stats = config.demo;
            tokio::spawn(async move {
                while let Some(event) = events_rx.recv().await {
                    match event {
                        SessionEvent::Transcript(entry) => {
                            let mut tl = timeline.lock().await;
                            tl.add_transcript(entry);
                            // Scripted sessions have no backend
                            // aggregator; recompute locally.
                            if recompute_stats {
                                let stats =
                                    compute_speaker_stats(tl.transcript(), &participants);
                                tl.set_speaker_stats(stats);
                            }
                        }
                        SessionEvent::Intervention(intervention) => {
                            info!("intervention: {}", intervention.message);
                            timeline.lock().await.add_intervention(intervention);
                        }
                        SessionEvent::SpeakerStats(stats) => {
                            timeline.lock().await.set_speaker_stats(stats);
                        }
                        SessionEvent::SttStatus(status) => {
                            info!("stt status: {}", status);
                        }
                        SessionEvent::ServerError(payload) => {
                            error!("server error: {}", payload);
                        }
                    }
                }
            });
        }

        // Audio pump: capture frames go straight to the socket.
        // Frames arriving while the connection is not open are dropped
        // by the transport.
        let (frame_tx, mut frame_rx) = mpsc::channel(16);
        let capture = CaptureManager::new(capture_config, input, frame_tx);
        let frames_captured = Arc::new(AtomicUsize::new(0));
        {
            let transport = Arc::clone(&transport);
            let frames_captured = Arc::clone(&frames_captured);
            tokio::spawn(async move {
                while let Some(frame) = frame_rx.recv().await {
                    frames_captured.fetch_add(1, Ordering::SeqCst);
                    transport.send_audio(&frame).await;
                }
            });
        }

        Self {
            config,
            transport,
            timeline,
            capture: Mutex::new(capture),
            simulator,
            is_live: Arc::new(AtomicBool::new(false)),
            saved: AtomicBool::new(false),
            started_at: Utc::now(),
            frames_captured,
        }
    }

    pub fn config(&self) -> &SessionConfig {
        &self.config
    }

    /// Start the session. No-op if already running.
    ///
    /// Live mode connects the session socket and starts capture; a
    /// capture failure degrades to a session without audio rather than
    /// failing the meeting. Demo mode replays the script instead.
    pub async fn start(&self) -> Result<()> {
        if self.is_live.swap(true, Ordering::SeqCst) {
            warn!("session already started: {}", self.config.session_id);
            return Ok(());
        }

        info!("starting session: {}", self.config.session_id);

        if self.config.demo {
            self.simulator.start();
            return Ok(());
        }

        if let Err(e) = self.transport.connect().await {
            self.is_live.store(false, Ordering::SeqCst);
            return Err(e);
        }

        match self.capture.lock().await.start().await {
            Ok(()) => {}
            Err(e) => warn!("continuing without audio: {}", e),
        }

        Ok(())
    }

    /// Stop the session on any path: tears down the simulator, the
    /// capture pipeline, and the socket, then issues the end-of-meeting
    /// save exactly once. Safe to call repeatedly.
    pub async fn stop(&self) -> SessionStats {
        let was_live = self.is_live.swap(false, Ordering::SeqCst);
        if was_live {
            info!("stopping session: {}", self.config.session_id);
        }

        self.simulator.stop();
        self.capture.lock().await.stop().await;
        self.transport.disconnect().await;

        if was_live && !self.saved.swap(true, Ordering::SeqCst) {
            if let Some(api_endpoint) = &self.config.api_endpoint {
                let snapshot = self.snapshot().await;
                let archiver = MeetingArchiver::new(api_endpoint.clone());
                if let Err(e) = archiver.save(&self.config.session_id, &snapshot).await {
                    warn!("failed to save meeting: {:#}", e);
                }
            }
        }

        self.stats().await
    }

    /// Suspend microphone capture without releasing the device
    pub async fn pause_audio(&self) {
        self.capture.lock().await.pause();
    }

    /// Resume suspended microphone capture
    pub async fn resume_audio(&self) {
        self.capture.lock().await.resume();
    }

    /// Clear the surfaced intervention
    pub async fn dismiss_intervention(&self) {
        self.timeline.lock().await.dismiss_intervention();
    }

    pub async fn merged_timeline(&self) -> Vec<TimelineItem> {
        self.timeline.lock().await.merged()
    }

    pub async fn transcript(&self) -> Vec<TranscriptEntry> {
        self.timeline.lock().await.transcript().to_vec()
    }

    pub async fn active_intervention(&self) -> Option<Intervention> {
        self.timeline.lock().await.active_intervention().cloned()
    }

    pub async fn speaker_stats(&self) -> HashMap<String, SpeakerStat> {
        self.timeline.lock().await.speaker_stats().clone()
    }

    pub async fn stats(&self) -> SessionStats {
        let duration = Utc::now().signed_duration_since(self.started_at);
        let (transcript_count, intervention_count) = {
            let tl = self.timeline.lock().await;
            (tl.transcript().len(), tl.interventions().len())
        };

        SessionStats {
            is_live: self.is_live.load(Ordering::SeqCst),
            started_at: self.started_at,
            duration_secs: duration.num_milliseconds() as f64 / 1000.0,
            frames_captured: self.frames_captured.load(Ordering::SeqCst),
            transcript_count,
            intervention_count,
            connection: self.transport.state().await,
        }
    }

    async fn snapshot(&self) -> SavedMeeting {
        let tl = self.timeline.lock().await;
        SavedMeeting {
            title: self.config.title.clone(),
            agenda: self.config.agenda.clone(),
            participants: self.config.participants.clone(),
            transcript: tl.transcript().to_vec(),
            interventions: tl.interventions().to_vec(),
            speaker_stats: tl.speaker_stats().clone(),
        }
    }
}
