//! Scripted session replay
//!
//! An offline stand-in for the session socket: replays a fixed meeting
//! script as timed transcript events, some of which trigger a moderator
//! intervention shortly after. Produces exactly the same event shapes
//! as the live transport, so the rest of the pipeline cannot tell the
//! difference.

use chrono::Utc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex as StdMutex};
use std::time::Duration;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::{debug, info};

use crate::transport::messages::{Intervention, InterventionKind, SessionEvent, TranscriptEntry};

/// Delay between a flagged transcript entry and its intervention
const INTERVENTION_DELAY: Duration = Duration::from_millis(1500);

/// One scripted line of the meeting
#[derive(Debug, Clone)]
pub struct ScriptEntry {
    pub speaker: String,
    pub text: String,
    /// Delay from session start
    pub delay: Duration,
    /// Fired `INTERVENTION_DELAY` after this line, when set
    pub intervention: Option<ScriptedIntervention>,
}

/// Canned intervention attached to a script entry
#[derive(Debug, Clone)]
pub struct ScriptedIntervention {
    pub id: String,
    pub message: String,
    pub kind: InterventionKind,
}

/// Replays a script of timed events with safe cancellation
///
/// Every scheduled callback, nested intervention timers included, is
/// tracked in one cancellation set. Stopping flips the running flag
/// before aborting anything, so a callback already past its sleep
/// still refuses to emit.
pub struct ScriptedSession {
    script: Vec<ScriptEntry>,
    events: mpsc::Sender<SessionEvent>,
    running: Arc<AtomicBool>,
    tasks: Arc<StdMutex<Vec<JoinHandle<()>>>>,
}

impl ScriptedSession {
    pub fn new(script: Vec<ScriptEntry>, events: mpsc::Sender<SessionEvent>) -> Self {
        Self {
            script,
            events,
            running: Arc::new(AtomicBool::new(false)),
            tasks: Arc::new(StdMutex::new(Vec::new())),
        }
    }

    /// Replay the built-in sprint-review script
    pub fn with_default_script(events: mpsc::Sender<SessionEvent>) -> Self {
        Self::new(default_script(), events)
    }

    /// Schedule the whole script. No-op if already running.
    pub fn start(&self) {
        if self.running.swap(true, Ordering::SeqCst) {
            debug!("scripted session already running");
            return;
        }

        info!("scripted session started ({} entries)", self.script.len());

        for (index, entry) in self.script.iter().cloned().enumerate() {
            let events = self.events.clone();
            let running = Arc::clone(&self.running);
            let tasks = Arc::clone(&self.tasks);

            let handle = tokio::spawn(async move {
                tokio::time::sleep(entry.delay).await;
                if !running.load(Ordering::SeqCst) {
                    return;
                }

                let transcript = TranscriptEntry {
                    id: format!("tr_script_{:03}", index),
                    timestamp: Utc::now().timestamp_millis(),
                    speaker: entry.speaker,
                    text: entry.text,
                };
                if events
                    .send(SessionEvent::Transcript(transcript))
                    .await
                    .is_err()
                {
                    return;
                }

                if let Some(scripted) = entry.intervention {
                    let nested = tokio::spawn(async move {
                        tokio::time::sleep(INTERVENTION_DELAY).await;
                        if !running.load(Ordering::SeqCst) {
                            return;
                        }
                        let intervention = Intervention {
                            id: scripted.id,
                            message: scripted.message,
                            timestamp: Utc::now().timestamp_millis(),
                            kind: scripted.kind,
                        };
                        let _ = events.send(SessionEvent::Intervention(intervention)).await;
                    });
                    // Same cancellation set as the top-level timers
                    tasks.lock().unwrap().push(nested);
                }
            });

            self.tasks.lock().unwrap().push(handle);
        }
    }

    /// Cancel everything still pending. Safe to call before `start`
    /// or repeatedly.
    pub fn stop(&self) {
        // Flag first: a callback mid-execution re-checks it before
        // emitting even when its abort races.
        let was_running = self.running.swap(false, Ordering::SeqCst);

        let mut tasks = self.tasks.lock().unwrap();
        for task in tasks.drain(..) {
            task.abort();
        }

        if was_running {
            info!("scripted session stopped");
        }
    }

    pub fn is_running(&self) -> bool {
        self.running.load(Ordering::SeqCst)
    }
}

/// A short sprint review that drifts off-topic, gets railroaded, and
/// leaves one participant unheard.
pub fn default_script() -> Vec<ScriptEntry> {
    fn entry(
        speaker: &str,
        text: &str,
        delay_ms: u64,
        intervention: Option<ScriptedIntervention>,
    ) -> ScriptEntry {
        ScriptEntry {
            speaker: speaker.to_string(),
            text: text.to_string(),
            delay: Duration::from_millis(delay_ms),
            intervention,
        }
    }

    vec![
        entry(
            "Dana",
            "We closed eight tasks last sprint.",
            0,
            None,
        ),
        entry(
            "Marcus",
            "Nice work. The login changes made a real difference.",
            3000,
            None,
        ),
        entry(
            "Dana",
            "Next sprint I want to focus on the onboarding flow.",
            6000,
            None,
        ),
        entry(
            "Marcus",
            "By the way, where should we get lunch? The new ramen place is supposed to be great.",
            10_000,
            Some(ScriptedIntervention {
                id: "int_script_001".to_string(),
                message: "Hold on, we've drifted from the agenda. Back to sprint planning; \
                          lunch is on the parking lot."
                    .to_string(),
                kind: InterventionKind::TopicDrift {
                    parking_lot_item: Some("Lunch plans".to_string()),
                },
            }),
        ),
        entry(
            "Dana",
            "Right. Looking at the sprint plan again...",
            18_000,
            None,
        ),
        entry(
            "Dana",
            "This sprint we concentrate on API optimization.",
            22_000,
            None,
        ),
        entry(
            "Dana",
            "I've made the call on this one, so let's everyone proceed as planned.",
            26_000,
            Some(ScriptedIntervention {
                id: "int_script_002".to_string(),
                message: "Please pause. That breaks the shared-decision principle; \
                          decisions here are made together. Does everyone agree?"
                    .to_string(),
                kind: InterventionKind::PrincipleViolation {
                    violated_principle: Some("Shared decision-making".to_string()),
                },
            }),
        ),
        entry("Marcus", "Understood, works for me.", 34_000, None),
        entry(
            "Dana",
            "Good. Then have your tasks written up by next week.",
            38_000,
            Some(ScriptedIntervention {
                id: "int_script_003".to_string(),
                message: "One moment: Priya hasn't spoken yet. Priya, how does this look \
                          from the design side?"
                    .to_string(),
                kind: InterventionKind::ParticipationImbalance {
                    suggested_speaker: Some("Priya".to_string()),
                },
            }),
        ),
    ]
}
