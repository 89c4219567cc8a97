//! Ordered accumulation of meeting events
//!
//! The timeline is the one shared structure written by whichever event
//! source is active (session socket or scripted session) and read by
//! display and save paths. It keeps transcript entries, the durable
//! intervention history, the single active-intervention slot, and the
//! latest speaker-stat mapping.

pub mod stats;

pub use stats::compute_speaker_stats;

use serde::Serialize;
use std::collections::HashMap;

use crate::transport::messages::{Intervention, SpeakerStat, TranscriptEntry};

/// A timestamp-merged view item
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum TimelineItem {
    Transcript(TranscriptEntry),
    Intervention(Intervention),
}

impl TimelineItem {
    pub fn timestamp(&self) -> i64 {
        match self {
            TimelineItem::Transcript(entry) => entry.timestamp,
            TimelineItem::Intervention(intervention) => intervention.timestamp,
        }
    }
}

/// Accumulated meeting events with single-slot notification
#[derive(Debug, Default)]
pub struct MeetingTimeline {
    transcript: Vec<TranscriptEntry>,
    interventions: Vec<Intervention>,
    active_intervention: Option<Intervention>,
    speaker_stats: HashMap<String, SpeakerStat>,
}

impl MeetingTimeline {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a transcript entry. Entries are kept in arrival order;
    /// duplicate ids are tolerated and produce duplicate rows.
    pub fn add_transcript(&mut self, entry: TranscriptEntry) {
        self.transcript.push(entry);
    }

    /// Append an intervention to history and surface it, replacing
    /// whatever occupied the active slot whether or not it was
    /// dismissed. Latest wins.
    pub fn add_intervention(&mut self, intervention: Intervention) {
        self.active_intervention = Some(intervention.clone());
        self.interventions.push(intervention);
    }

    /// Clear the active slot. History is untouched.
    pub fn dismiss_intervention(&mut self) {
        self.active_intervention = None;
    }

    /// Replace the whole speaker-stat mapping. Full replace, not a
    /// merge: keys absent from `stats` disappear.
    pub fn set_speaker_stats(&mut self, stats: HashMap<String, SpeakerStat>) {
        self.speaker_stats = stats;
    }

    pub fn transcript(&self) -> &[TranscriptEntry] {
        &self.transcript
    }

    pub fn interventions(&self) -> &[Intervention] {
        &self.interventions
    }

    pub fn active_intervention(&self) -> Option<&Intervention> {
        self.active_intervention.as_ref()
    }

    pub fn speaker_stats(&self) -> &HashMap<String, SpeakerStat> {
        &self.speaker_stats
    }

    /// Transcript and interventions merged, ascending by timestamp.
    /// The sort is stable over concatenation order, so transcripts
    /// come before interventions on equal timestamps.
    pub fn merged(&self) -> Vec<TimelineItem> {
        let mut items: Vec<TimelineItem> = self
            .transcript
            .iter()
            .cloned()
            .map(TimelineItem::Transcript)
            .chain(
                self.interventions
                    .iter()
                    .cloned()
                    .map(TimelineItem::Intervention),
            )
            .collect();
        items.sort_by_key(TimelineItem::timestamp);
        items
    }
}
