use std::collections::HashMap;

use crate::transport::messages::{Participant, SpeakerStat, TranscriptEntry};

/// Nominal speaking pace used to estimate speaking time from text
/// when no measured duration is available.
const NOMINAL_WORDS_PER_SEC: f64 = 2.5;

/// Recompute the speaker-stat mapping from the transcript and the
/// participant roster. Every participant gets an entry, including
/// those who have not spoken. Entries from speakers outside the
/// roster are ignored.
pub fn compute_speaker_stats(
    transcript: &[TranscriptEntry],
    participants: &[Participant],
) -> HashMap<String, SpeakerStat> {
    let mut counts: HashMap<&str, (u32, f64)> = participants
        .iter()
        .map(|p| (p.name.as_str(), (0u32, 0.0f64)))
        .collect();

    for entry in transcript {
        if let Some((count, time)) = counts.get_mut(entry.speaker.as_str()) {
            *count += 1;
            let words = entry.text.split_whitespace().count();
            *time += words as f64 / NOMINAL_WORDS_PER_SEC;
        }
    }

    let total: u32 = counts.values().map(|(count, _)| count).sum();

    participants
        .iter()
        .map(|p| {
            let (count, time) = counts[p.name.as_str()];
            let percentage = if total > 0 {
                (count as f64 / total as f64 * 1000.0).round() / 10.0
            } else {
                0.0
            };
            (
                p.name.clone(),
                SpeakerStat {
                    percentage,
                    speaking_time: time,
                    count,
                },
            )
        })
        .collect()
}
