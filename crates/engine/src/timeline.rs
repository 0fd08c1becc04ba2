use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::error::{EngineError, Result};
use crate::properties::ClipProperties;

/// Opaque identifier for timeline clips.
pub type ClipId = u64;
/// Opaque identifier for media assets.
pub type AssetId = u64;
/// Track identifier such as `video-1`.
pub type TrackId = String;

/// Kind of clips a track accepts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TrackKind {
    Video,
    Audio,
}

impl TrackKind {
    pub fn label(self) -> &'static str {
        match self {
            Self::Video => "video",
            Self::Audio => "audio",
        }
    }
}

/// Half-open time range `[start, start + duration)` in seconds.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Interval {
    pub start: f64,
    pub duration: f64,
}

impl Interval {
    pub fn new(start: f64, duration: f64) -> Self {
        Self { start, duration }
    }

    pub fn end(&self) -> f64 {
        self.start + self.duration
    }

    /// Touching endpoints do not count as overlap.
    pub fn overlaps(&self, other: &Interval) -> bool {
        self.start < other.end() && other.start < self.end()
    }

    pub fn contains(&self, t: f64) -> bool {
        self.start <= t && t < self.end()
    }
}

/// Placement of one asset on a track.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Clip {
    pub id: ClipId,
    pub asset_id: AssetId,
    pub start_time: f64,
    pub duration: f64,
    pub trim_start: Option<f64>,
    pub trim_end: Option<f64>,
    pub effects: Vec<String>,
    pub properties: ClipProperties,
}

impl Clip {
    pub fn new(id: ClipId, asset_id: AssetId, start_time: f64, duration: f64) -> Self {
        Self {
            id,
            asset_id,
            start_time,
            duration,
            trim_start: None,
            trim_end: None,
            effects: Vec::new(),
            properties: ClipProperties::default(),
        }
    }

    pub fn interval(&self) -> Interval {
        Interval::new(self.start_time, self.duration)
    }

    pub fn end_time(&self) -> f64 {
        self.start_time + self.duration
    }

    pub fn is_active_at(&self, t: f64) -> bool {
        self.interval().contains(t)
    }
}

/// Partial update merged onto an existing clip by [`Timeline::mutate`].
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ClipPatch {
    pub start_time: Option<f64>,
    pub duration: Option<f64>,
    pub trim_start: Option<Option<f64>>,
    pub trim_end: Option<Option<f64>>,
    pub effects: Option<Vec<String>>,
    pub properties: Option<ClipProperties>,
}

impl ClipPatch {
    fn apply_to(self, clip: &Clip) -> Clip {
        Clip {
            id: clip.id,
            asset_id: clip.asset_id,
            start_time: self.start_time.unwrap_or(clip.start_time),
            duration: self.duration.unwrap_or(clip.duration),
            trim_start: self.trim_start.unwrap_or(clip.trim_start),
            trim_end: self.trim_end.unwrap_or(clip.trim_end),
            effects: self.effects.unwrap_or_else(|| clip.effects.clone()),
            properties: self.properties.unwrap_or(clip.properties),
        }
    }
}

/// One lane of non-overlapping clips.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Track {
    pub id: TrackId,
    pub kind: TrackKind,
    pub clips: Vec<Clip>,
}

impl Track {
    pub fn new(id: impl Into<TrackId>, kind: TrackKind) -> Self {
        Self {
            id: id.into(),
            kind,
            clips: Vec::new(),
        }
    }

    /// Clips sorted by start time.
    pub fn clips_in_order(&self) -> Vec<&Clip> {
        let mut clips: Vec<&Clip> = self.clips.iter().collect();
        clips.sort_by(|a, b| a.start_time.total_cmp(&b.start_time));
        clips
    }
}

/// Tracks, playhead, selection and zoom of one editing session.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Timeline {
    pub tracks: Vec<Track>,
    pub playhead: f64,
    pub selection: Option<ClipId>,
    pub zoom_scale: f64,
}

impl Timeline {
    /// Empty timeline with one video and one audio track.
    pub fn new(zoom_scale: f64) -> Self {
        Self {
            tracks: vec![
                Track::new("video-1", TrackKind::Video),
                Track::new("audio-1", TrackKind::Audio),
            ],
            playhead: 0.0,
            selection: None,
            zoom_scale,
        }
    }

    pub fn track(&self, track_id: &str) -> Option<&Track> {
        self.tracks.iter().find(|track| track.id == track_id)
    }

    fn track_mut(&mut self, track_id: &str) -> Result<&mut Track> {
        self.tracks
            .iter_mut()
            .find(|track| track.id == track_id)
            .ok_or_else(|| EngineError::TrackNotFound {
                track_id: track_id.to_string(),
            })
    }

    /// Locates a clip and the track holding it.
    pub fn find_clip(&self, clip_id: ClipId) -> Option<(&Track, &Clip)> {
        self.tracks.iter().find_map(|track| {
            track
                .clips
                .iter()
                .find(|clip| clip.id == clip_id)
                .map(|clip| (track, clip))
        })
    }

    pub fn contains_clip(&self, clip_id: ClipId) -> bool {
        self.find_clip(clip_id).is_some()
    }

    pub fn clip_count(&self) -> usize {
        self.tracks.iter().map(|track| track.clips.len()).sum()
    }

    pub fn clips(&self) -> impl Iterator<Item = &Clip> {
        self.tracks.iter().flat_map(|track| track.clips.iter())
    }

    /// End of the last clip across all tracks, zero when empty.
    pub fn duration(&self) -> f64 {
        self.clips().map(Clip::end_time).fold(0.0, f64::max)
    }

    /// Clips whose interval contains `t`, paired with their track.
    pub fn active_clips_at(&self, t: f64) -> Vec<(&Track, &Clip)> {
        self.tracks
            .iter()
            .flat_map(|track| {
                track
                    .clips
                    .iter()
                    .filter(move |clip| clip.is_active_at(t))
                    .map(move |clip| (track, clip))
            })
            .collect()
    }

    /// Returns the first clip on `track_id` intersecting `candidate`,
    /// ignoring `exclude`.
    pub fn find_overlap(
        &self,
        track_id: &str,
        candidate: Interval,
        exclude: Option<ClipId>,
    ) -> Option<&Clip> {
        self.track(track_id)?.clips.iter().find(|clip| {
            Some(clip.id) != exclude && clip.interval().overlaps(&candidate)
        })
    }

    /// Adds `clip` to `track_id` unless it overlaps an existing clip.
    pub fn insert(&mut self, track_id: &str, clip: Clip) -> Result<()> {
        validate_interval(clip.start_time, clip.duration)?;
        if self.track(track_id).is_none() {
            return Err(EngineError::TrackNotFound {
                track_id: track_id.to_string(),
            });
        }
        if let Some(existing) = self.find_overlap(track_id, clip.interval(), None) {
            warn!(
                track_id,
                start_time = clip.start_time,
                duration = clip.duration,
                conflicting_clip_id = existing.id,
                "insert rejected: overlap"
            );
            return Err(EngineError::OverlapConflict {
                track_id: track_id.to_string(),
                clip_id: None,
                conflicting_clip_id: existing.id,
            });
        }

        debug!(
            track_id,
            clip_id = clip.id,
            asset_id = clip.asset_id,
            start_time = clip.start_time,
            duration = clip.duration,
            "insert accepted"
        );
        self.track_mut(track_id)?.clips.push(clip);
        Ok(())
    }

    /// Removes a clip from whichever track holds it.
    ///
    /// A selection pointing at the removed clip is cleared.
    pub fn remove(&mut self, clip_id: ClipId) -> Result<Clip> {
        for track in &mut self.tracks {
            if let Some(index) = track.clips.iter().position(|clip| clip.id == clip_id) {
                let removed = track.clips.remove(index);
                debug!(clip_id, track_id = %track.id, "remove accepted");
                if self.selection == Some(clip_id) {
                    self.selection = None;
                }
                return Ok(removed);
            }
        }
        Err(EngineError::ClipNotFound { clip_id })
    }

    /// Merges `patch` onto a clip, re-validating placement first.
    ///
    /// Either the whole patch applies or nothing changes.
    pub fn mutate(&mut self, clip_id: ClipId, patch: ClipPatch) -> Result<Clip> {
        let (track_id, current) = self
            .find_clip(clip_id)
            .map(|(track, clip)| (track.id.clone(), clip.clone()))
            .ok_or(EngineError::ClipNotFound { clip_id })?;

        let candidate = patch.apply_to(&current);
        validate_interval(candidate.start_time, candidate.duration)?;
        if let Some(existing) = self.find_overlap(&track_id, candidate.interval(), Some(clip_id)) {
            warn!(
                clip_id,
                track_id = %track_id,
                start_time = candidate.start_time,
                duration = candidate.duration,
                conflicting_clip_id = existing.id,
                "mutate rejected: overlap"
            );
            return Err(EngineError::OverlapConflict {
                track_id,
                clip_id: Some(clip_id),
                conflicting_clip_id: existing.id,
            });
        }

        let track = self.track_mut(&track_id)?;
        let slot = track
            .clips
            .iter_mut()
            .find(|clip| clip.id == clip_id)
            .ok_or(EngineError::ClipNotFound { clip_id })?;
        *slot = candidate.clone();

        debug!(
            clip_id,
            track_id = %track_id,
            start_time = candidate.start_time,
            duration = candidate.duration,
            "mutate accepted"
        );
        Ok(candidate)
    }

    /// Appends a track named `<kind>-<n>` with the first unused `n`.
    pub fn add_track(&mut self, kind: TrackKind) -> TrackId {
        let id = (1..)
            .map(|n| format!("{}-{n}", kind.label()))
            .find(|candidate| self.track(candidate).is_none())
            .unwrap_or_else(|| format!("{}-{}", kind.label(), self.tracks.len() + 1));
        self.tracks.push(Track::new(id.clone(), kind));
        debug!(track_id = %id, kind = kind.label(), "track added");
        id
    }

    /// Removes a track and every clip on it.
    pub fn remove_track(&mut self, track_id: &str) -> Result<Track> {
        let index = self
            .tracks
            .iter()
            .position(|track| track.id == track_id)
            .ok_or_else(|| EngineError::TrackNotFound {
                track_id: track_id.to_string(),
            })?;
        let removed = self.tracks.remove(index);
        if let Some(selected) = self.selection {
            if removed.clips.iter().any(|clip| clip.id == selected) {
                self.selection = None;
            }
        }
        debug!(
            track_id,
            removed_clips = removed.clips.len(),
            "track removed"
        );
        Ok(removed)
    }
}

fn validate_interval(start_time: f64, duration: f64) -> Result<()> {
    if !start_time.is_finite() || start_time < 0.0 {
        return Err(EngineError::invalid(format!(
            "clip start must be a non-negative time, got {start_time}"
        )));
    }
    if !duration.is_finite() || duration <= 0.0 {
        return Err(EngineError::invalid(format!(
            "clip duration must be positive, got {duration}"
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::{Clip, ClipPatch, Interval, Timeline, TrackKind};
    use crate::error::EngineError;

    fn timeline_with(clips: &[(u64, f64, f64)]) -> Timeline {
        let mut timeline = Timeline::new(50.0);
        for &(id, start, duration) in clips {
            timeline
                .insert("video-1", Clip::new(id, 1, start, duration))
                .expect("seed insert should succeed");
        }
        timeline
    }

    #[test]
    fn touching_intervals_do_not_overlap() {
        let a = Interval::new(0.0, 10.0);
        let b = Interval::new(10.0, 5.0);
        assert!(!a.overlaps(&b));
        assert!(!b.overlaps(&a));
        assert!(a.overlaps(&Interval::new(9.99, 1.0)));
    }

    #[test]
    fn insert_rejects_overlap_and_keeps_track_unchanged() {
        let mut timeline = timeline_with(&[(1, 0.0, 10.0)]);

        let result = timeline.insert("video-1", Clip::new(2, 1, 5.0, 10.0));
        assert!(matches!(
            result,
            Err(EngineError::OverlapConflict {
                conflicting_clip_id: 1,
                clip_id: None,
                ..
            })
        ));
        assert_eq!(timeline.clip_count(), 1);
    }

    #[test]
    fn insert_on_unknown_track_fails() {
        let mut timeline = Timeline::new(50.0);
        let result = timeline.insert("video-9", Clip::new(1, 1, 0.0, 1.0));
        assert!(matches!(result, Err(EngineError::TrackNotFound { .. })));
    }

    #[test]
    fn overlap_is_checked_per_track() {
        let mut timeline = timeline_with(&[(1, 0.0, 10.0)]);
        timeline
            .insert("audio-1", Clip::new(2, 1, 0.0, 10.0))
            .expect("other track is independent");
        assert_eq!(timeline.clip_count(), 2);
    }

    #[test]
    fn find_overlap_ignores_excluded_clip() {
        let timeline = timeline_with(&[(1, 0.0, 10.0)]);
        assert!(timeline
            .find_overlap("video-1", Interval::new(2.0, 3.0), Some(1))
            .is_none());
        assert_eq!(
            timeline
                .find_overlap("video-1", Interval::new(2.0, 3.0), None)
                .map(|clip| clip.id),
            Some(1)
        );
    }

    #[test]
    fn mutate_conflict_leaves_clip_in_place() {
        let mut timeline = timeline_with(&[(1, 0.0, 10.0), (2, 20.0, 5.0)]);

        let result = timeline.mutate(
            2,
            ClipPatch {
                start_time: Some(8.0),
                effects: Some(vec!["blur".to_string()]),
                ..ClipPatch::default()
            },
        );
        assert!(matches!(
            result,
            Err(EngineError::OverlapConflict {
                clip_id: Some(2),
                conflicting_clip_id: 1,
                ..
            })
        ));

        let (_, clip) = timeline.find_clip(2).expect("clip still exists");
        assert_eq!(clip.start_time, 20.0);
        assert!(clip.effects.is_empty());
    }

    #[test]
    fn mutate_rejects_non_positive_duration() {
        let mut timeline = timeline_with(&[(1, 0.0, 10.0)]);
        let result = timeline.mutate(
            1,
            ClipPatch {
                duration: Some(0.0),
                ..ClipPatch::default()
            },
        );
        assert!(matches!(result, Err(EngineError::InvalidArgument { .. })));
    }

    #[test]
    fn remove_clears_selection_of_removed_clip() {
        let mut timeline = timeline_with(&[(1, 0.0, 10.0)]);
        timeline.selection = Some(1);

        let removed = timeline.remove(1).expect("remove should succeed");
        assert_eq!(removed.id, 1);
        assert_eq!(timeline.selection, None);
        assert!(matches!(
            timeline.remove(1),
            Err(EngineError::ClipNotFound { clip_id: 1 })
        ));
    }

    #[test]
    fn active_clips_use_half_open_intervals() {
        let timeline = timeline_with(&[(1, 0.0, 10.0), (2, 10.0, 5.0)]);
        let active: Vec<u64> = timeline
            .active_clips_at(10.0)
            .into_iter()
            .map(|(_, clip)| clip.id)
            .collect();
        assert_eq!(active, vec![2]);
        assert_eq!(timeline.duration(), 15.0);
    }

    #[test]
    fn add_track_picks_first_free_number() {
        let mut timeline = Timeline::new(50.0);
        assert_eq!(timeline.add_track(TrackKind::Video), "video-2");
        assert_eq!(timeline.add_track(TrackKind::Audio), "audio-2");
        timeline.remove_track("video-1").expect("remove track");
        assert_eq!(timeline.add_track(TrackKind::Video), "video-1");
    }

    #[test]
    fn remove_track_drops_clips_and_selection() {
        let mut timeline = timeline_with(&[(1, 0.0, 10.0)]);
        timeline.selection = Some(1);

        let removed = timeline.remove_track("video-1").expect("remove track");
        assert_eq!(removed.clips.len(), 1);
        assert_eq!(timeline.selection, None);
        assert!(!timeline.contains_clip(1));
    }

    #[test]
    fn clips_in_order_sorts_by_start() {
        let timeline = timeline_with(&[(1, 20.0, 1.0), (2, 0.0, 1.0), (3, 5.0, 1.0)]);
        let track = timeline.track("video-1").expect("track");
        let ids: Vec<u64> = track.clips_in_order().iter().map(|clip| clip.id).collect();
        assert_eq!(ids, vec![2, 3, 1]);
    }
}
