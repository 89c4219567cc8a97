pub mod audio;
pub mod config;
pub mod http;
pub mod session;
pub mod simulator;
pub mod timeline;
pub mod transport;

pub use audio::{
    AudioFrame, AudioInput, CaptureConfig, CaptureError, CaptureManager, MicInput, WavArchive,
};
pub use config::Config;
pub use http::{create_router, AppState};
pub use session::{MeetingSession, SessionConfig, SessionStats};
pub use simulator::{ScriptEntry, ScriptedSession};
pub use timeline::{compute_speaker_stats, MeetingTimeline, TimelineItem};
pub use transport::{
    ConnectionState, Connector, Intervention, InterventionKind, Participant, SessionEvent,
    SessionTransport, SpeakerStat, TranscriptEntry, WsConnector,
};
