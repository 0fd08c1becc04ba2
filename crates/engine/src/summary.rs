use serde::{Deserialize, Serialize};

use crate::timeline::{Timeline, TrackKind};

/// Aggregate counts read by the assistant and status displays.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct TimelineSummary {
    pub total_clips: usize,
    pub video_clips: usize,
    pub audio_clips: usize,
    pub track_count: usize,
    /// End time of the last clip in seconds.
    pub total_duration: f64,
}

/// Derives a [`TimelineSummary`] without touching engine state.
pub fn summarize(timeline: &Timeline) -> TimelineSummary {
    let clips_of = |kind: TrackKind| -> usize {
        timeline
            .tracks
            .iter()
            .filter(|track| track.kind == kind)
            .map(|track| track.clips.len())
            .sum()
    };

    TimelineSummary {
        total_clips: timeline.clip_count(),
        video_clips: clips_of(TrackKind::Video),
        audio_clips: clips_of(TrackKind::Audio),
        track_count: timeline.tracks.len(),
        total_duration: timeline.duration(),
    }
}
