//! Session socket transport
//!
//! One duplex connection per meeting: encoded audio frames go out,
//! typed session events (transcript, intervention, speaker stats,
//! status, errors) come back and are dispatched to the session's
//! consumer loop.

pub mod client;
pub mod messages;
pub mod wire;

pub use client::{ConnectionState, SessionTransport};
pub use messages::{
    AudioEnvelope, Intervention, InterventionKind, Participant, SessionEvent, SpeakerStat,
    TranscriptEntry,
};
pub use wire::{Connector, WireSink, WireStream, WsConnector};
