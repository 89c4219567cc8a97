//! Meeting session management
//!
//! This module provides the `MeetingSession` abstraction that manages:
//! - Microphone capture and streaming to the moderator backend
//! - The per-meeting session socket
//! - The event timeline fed by one consumer loop
//! - The scripted fallback for disconnected operation
//! - The single end-of-meeting save

mod archive;
mod config;
mod session;
mod stats;

pub use archive::{MeetingArchiver, SavedMeeting};
pub use config::SessionConfig;
pub use session::MeetingSession;
pub use stats::SessionStats;
