use std::sync::Arc;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::catalog::{AssetMetadata, MediaAsset, MediaCatalog};
use crate::config::EngineConfig;
use crate::error::{EngineError, Result};
use crate::playback::{PlaybackClock, PlaybackState};
use crate::properties::{ClipProperties, ColorPreset};
use crate::summary::{TimelineSummary, summarize};
use crate::time::clamp_time;
use crate::timeline::{AssetId, Clip, ClipId, ClipPatch, Timeline, Track, TrackId, TrackKind};

/// Clip edge grabbed by a resize gesture.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResizeEdge {
    Start,
    End,
}

/// Commands accepted by the engine.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Command {
    ImportAsset {
        metadata: AssetMetadata,
    },
    /// Places `asset_id` on `track_id` at `start_time` seconds.
    ///
    /// The clip takes the asset's intrinsic duration, or the configured
    /// default when the asset has none. Rejected with `OverlapConflict` when
    /// the new interval intersects an existing clip; nothing is auto-shifted.
    PlaceClip {
        track_id: TrackId,
        asset_id: AssetId,
        start_time: f64,
    },
    /// Moves one clip so it starts at `new_start_time`, clamped to zero.
    MoveClip {
        clip_id: ClipId,
        new_start_time: f64,
    },
    /// Drags one clip edge by `delta` seconds.
    ///
    /// Moving the start edge keeps the end fixed. The resulting duration is
    /// floored at the configured minimum instead of being rejected.
    ResizeClip {
        clip_id: ClipId,
        edge: ResizeEdge,
        delta: f64,
    },
    /// Deletes a clip. Unknown ids are ignored.
    DeleteClip {
        clip_id: ClipId,
    },
    SelectClip {
        clip_id: Option<ClipId>,
    },
    SetPlayhead {
        time: f64,
    },
    SetZoom {
        scale: f64,
    },
    SetClipTrim {
        clip_id: ClipId,
        trim_start: Option<f64>,
        trim_end: Option<f64>,
    },
    AddClipEffect {
        clip_id: ClipId,
        effect: String,
    },
    RemoveClipEffect {
        clip_id: ClipId,
        effect: String,
    },
    UpdateClipProperties {
        clip_id: ClipId,
        properties: ClipProperties,
    },
    ApplyColorPreset {
        clip_id: ClipId,
        preset: ColorPreset,
    },
    AddTrack {
        kind: TrackKind,
    },
    RemoveTrack {
        track_id: TrackId,
    },
    Play,
    Pause,
    TogglePlayback,
    /// Advances the playhead by `elapsed_us` microseconds of wall time while
    /// playing.
    Tick {
        elapsed_us: u64,
    },
    SkipForward,
    SkipBackward,
}

/// Events emitted by the engine.
#[derive(Debug, Clone, PartialEq)]
pub enum Event {
    /// Published after every successful command.
    TimelineChanged(TimelineSnapshot),
    AssetImported(MediaAsset),
    ClipChanged(Clip),
    ClipRemoved { clip_id: ClipId },
    TrackAdded { track_id: TrackId },
    TrackRemoved { track_id: TrackId },
    PlayheadChanged { time: f64 },
    SelectionChanged { clip_id: Option<ClipId> },
    ZoomChanged { scale: f64 },
    PlaybackChanged { state: PlaybackState },
    Error(EngineErrorEvent),
}

/// Error category carried by [`EngineErrorEvent`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum EngineErrorKind {
    OverlapConflict,
    NotFound,
    InvalidArgument,
    Other,
}

impl From<&EngineError> for EngineErrorKind {
    fn from(value: &EngineError) -> Self {
        match value {
            EngineError::OverlapConflict { .. } => Self::OverlapConflict,
            EngineError::ClipNotFound { .. }
            | EngineError::AssetNotFound { .. }
            | EngineError::TrackNotFound { .. } => Self::NotFound,
            EngineError::InvalidArgument { .. } => Self::InvalidArgument,
            EngineError::ConfigIo { .. } | EngineError::ConfigParse { .. } => Self::Other,
        }
    }
}

/// User-facing error payload emitted as an event.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EngineErrorEvent {
    pub kind: EngineErrorKind,
    pub message: String,
}

impl EngineErrorEvent {
    pub fn from_error(error: &EngineError) -> Self {
        Self {
            kind: EngineErrorKind::from(error),
            message: error.to_string(),
        }
    }
}

/// Immutable view of the session published to consumers.
///
/// Holding a snapshot is cheap and never blocks the engine: later commands
/// build new values instead of editing the shared ones.
#[derive(Debug, Clone, PartialEq)]
pub struct TimelineSnapshot {
    pub timeline: Arc<Timeline>,
    pub catalog: Arc<MediaCatalog>,
    pub playback: PlaybackState,
}

impl TimelineSnapshot {
    pub fn playhead(&self) -> f64 {
        self.timeline.playhead
    }

    pub fn selected_clip(&self) -> Option<&Clip> {
        let clip_id = self.timeline.selection?;
        self.timeline.find_clip(clip_id).map(|(_, clip)| clip)
    }

    /// Asset behind the selected clip, as shown by the properties panel.
    pub fn selected_asset(&self) -> Option<&MediaAsset> {
        self.selected_clip()
            .and_then(|clip| self.catalog.get(clip.asset_id))
    }

    /// Clips under the playhead, as drawn by the preview.
    pub fn active_clips(&self) -> Vec<(&Track, &Clip)> {
        self.timeline.active_clips_at(self.timeline.playhead)
    }

    pub fn summary(&self) -> TimelineSummary {
        summarize(&self.timeline)
    }
}

/// Timeline editing engine. Commands run synchronously and either apply
/// completely or leave the state untouched.
#[derive(Debug)]
pub struct Engine {
    config: EngineConfig,
    catalog: Arc<MediaCatalog>,
    timeline: Arc<Timeline>,
    clock: PlaybackClock,
    next_clip_id: ClipId,
}

impl Default for Engine {
    fn default() -> Self {
        Self::with_valid_config(EngineConfig::default())
    }
}

impl Engine {
    /// Creates an engine for a fresh session.
    ///
    /// # Example
    /// ```
    /// use timeline_engine::{Engine, EngineConfig};
    ///
    /// let engine = Engine::new(EngineConfig::default()).expect("default config is valid");
    /// assert_eq!(engine.timeline().tracks.len(), 2);
    /// ```
    pub fn new(config: EngineConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self::with_valid_config(config))
    }

    fn with_valid_config(config: EngineConfig) -> Self {
        Self {
            catalog: Arc::new(MediaCatalog::new()),
            timeline: Arc::new(Timeline::new(config.initial_scale)),
            clock: PlaybackClock::new(config.playback_rate),
            next_clip_id: 1,
            config,
        }
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn timeline(&self) -> &Timeline {
        &self.timeline
    }

    pub fn catalog(&self) -> &MediaCatalog {
        &self.catalog
    }

    pub fn playback_state(&self) -> PlaybackState {
        self.clock.state()
    }

    pub fn snapshot(&self) -> TimelineSnapshot {
        TimelineSnapshot {
            timeline: Arc::clone(&self.timeline),
            catalog: Arc::clone(&self.catalog),
            playback: self.clock.state(),
        }
    }

    /// Applies one command and returns emitted events.
    ///
    /// The first event of a successful command is always
    /// [`Event::TimelineChanged`].
    pub fn handle_command(&mut self, command: Command) -> Result<Vec<Event>> {
        let event = match command {
            Command::ImportAsset { metadata } => {
                Some(Event::AssetImported(self.import_asset(metadata)?))
            }
            Command::PlaceClip {
                track_id,
                asset_id,
                start_time,
            } => Some(Event::ClipChanged(
                self.place_clip(&track_id, asset_id, start_time)?,
            )),
            Command::MoveClip {
                clip_id,
                new_start_time,
            } => Some(Event::ClipChanged(self.move_clip(clip_id, new_start_time)?)),
            Command::ResizeClip {
                clip_id,
                edge,
                delta,
            } => Some(Event::ClipChanged(self.resize_clip(clip_id, edge, delta)?)),
            Command::DeleteClip { clip_id } => self
                .delete_clip(clip_id)
                .map(|removed| Event::ClipRemoved {
                    clip_id: removed.id,
                }),
            Command::SelectClip { clip_id } => {
                self.select_clip(clip_id)?;
                Some(Event::SelectionChanged { clip_id })
            }
            Command::SetPlayhead { time } => Some(Event::PlayheadChanged {
                time: self.set_playhead(time),
            }),
            Command::SetZoom { scale } => Some(Event::ZoomChanged {
                scale: self.set_zoom(scale),
            }),
            Command::SetClipTrim {
                clip_id,
                trim_start,
                trim_end,
            } => Some(Event::ClipChanged(
                self.set_clip_trim(clip_id, trim_start, trim_end)?,
            )),
            Command::AddClipEffect { clip_id, effect } => {
                Some(Event::ClipChanged(self.add_clip_effect(clip_id, &effect)?))
            }
            Command::RemoveClipEffect { clip_id, effect } => Some(Event::ClipChanged(
                self.remove_clip_effect(clip_id, &effect)?,
            )),
            Command::UpdateClipProperties {
                clip_id,
                properties,
            } => Some(Event::ClipChanged(
                self.update_clip_properties(clip_id, properties)?,
            )),
            Command::ApplyColorPreset { clip_id, preset } => Some(Event::ClipChanged(
                self.apply_color_preset(clip_id, preset)?,
            )),
            Command::AddTrack { kind } => Some(Event::TrackAdded {
                track_id: self.add_track(kind),
            }),
            Command::RemoveTrack { track_id } => Some(Event::TrackRemoved {
                track_id: self.remove_track(&track_id)?.id,
            }),
            Command::Play => Some(Event::PlaybackChanged { state: self.play() }),
            Command::Pause => Some(Event::PlaybackChanged {
                state: self.pause(),
            }),
            Command::TogglePlayback => Some(Event::PlaybackChanged {
                state: self.toggle_playback(),
            }),
            Command::Tick { elapsed_us } => self
                .tick(Duration::from_micros(elapsed_us))
                .map(|time| Event::PlayheadChanged { time }),
            Command::SkipForward => Some(Event::PlayheadChanged {
                time: self.skip(self.config.skip_step),
            }),
            Command::SkipBackward => Some(Event::PlayheadChanged {
                time: self.skip(-self.config.skip_step),
            }),
        };

        let mut events = vec![Event::TimelineChanged(self.snapshot())];
        events.extend(event);
        Ok(events)
    }

    /// Registers imported media metadata.
    pub fn import_asset(&mut self, metadata: AssetMetadata) -> Result<MediaAsset> {
        Arc::make_mut(&mut self.catalog).import(metadata)
    }

    /// Places a new clip for `asset_id` on `track_id`.
    pub fn place_clip(&mut self, track_id: &str, asset_id: AssetId, start_time: f64) -> Result<Clip> {
        if !start_time.is_finite() {
            return Err(EngineError::invalid(format!(
                "start time must be finite, got {start_time}"
            )));
        }
        let start_time = start_time.max(0.0);

        let asset = self.catalog.require(asset_id)?;
        let track = self
            .timeline
            .track(track_id)
            .ok_or_else(|| EngineError::TrackNotFound {
                track_id: track_id.to_string(),
            })?;
        if asset.kind.track_kind() != track.kind {
            warn!(
                track_id,
                asset_id,
                asset_kind = asset.kind.label(),
                track_kind = track.kind.label(),
                "place rejected: incompatible track"
            );
            return Err(EngineError::invalid(format!(
                "{} asset {asset_id} cannot go on {} track {track_id}",
                asset.kind.label(),
                track.kind.label()
            )));
        }
        let duration = asset
            .intrinsic_duration
            .unwrap_or(self.config.default_clip_duration);

        let clip = Clip::new(self.next_clip_id, asset_id, start_time, duration);
        self.commit(|timeline| timeline.insert(track_id, clip.clone()))?;
        self.next_clip_id += 1;

        info!(
            clip_id = clip.id,
            track_id,
            asset_id,
            start_time,
            duration,
            "clip placed"
        );
        Ok(clip)
    }

    /// Moves a clip to `new_start_time` (clamped to zero).
    pub fn move_clip(&mut self, clip_id: ClipId, new_start_time: f64) -> Result<Clip> {
        if !new_start_time.is_finite() {
            return Err(EngineError::invalid(format!(
                "start time must be finite, got {new_start_time}"
            )));
        }
        let patch = ClipPatch {
            start_time: Some(new_start_time.max(0.0)),
            ..ClipPatch::default()
        };
        self.commit(|timeline| timeline.mutate(clip_id, patch))
    }

    /// Drags one edge of a clip by `delta` seconds.
    pub fn resize_clip(&mut self, clip_id: ClipId, edge: ResizeEdge, delta: f64) -> Result<Clip> {
        if !delta.is_finite() {
            return Err(EngineError::invalid(format!(
                "resize delta must be finite, got {delta}"
            )));
        }
        let (_, clip) = self
            .timeline
            .find_clip(clip_id)
            .ok_or(EngineError::ClipNotFound { clip_id })?;
        let min_duration = self.config.min_clip_duration;

        let (start_time, duration) = match edge {
            ResizeEdge::Start => {
                // end stays put; a clip already shorter than the floor keeps its length
                let end = clip.end_time();
                let latest_start = (end - min_duration).max(0.0);
                let start = (clip.start_time + delta).clamp(0.0, latest_start);
                (start, end - start)
            }
            ResizeEdge::End => (clip.start_time, (clip.duration + delta).max(min_duration)),
        };
        debug!(clip_id, ?edge, delta, start_time, duration, "resize requested");

        let patch = ClipPatch {
            start_time: Some(start_time),
            duration: Some(duration),
            ..ClipPatch::default()
        };
        self.commit(|timeline| timeline.mutate(clip_id, patch))
    }

    /// Removes a clip, returning it when it existed.
    ///
    /// Stale ids are a no-op rather than an error.
    pub fn delete_clip(&mut self, clip_id: ClipId) -> Option<Clip> {
        if !self.timeline.contains_clip(clip_id) {
            debug!(clip_id, "delete ignored: clip not found");
            return None;
        }
        self.commit(|timeline| timeline.remove(clip_id)).ok()
    }

    /// Sets or clears the selection. Unknown ids leave it unchanged.
    pub fn select_clip(&mut self, clip_id: Option<ClipId>) -> Result<()> {
        if let Some(clip_id) = clip_id {
            if !self.timeline.contains_clip(clip_id) {
                warn!(clip_id, "select rejected: clip not found");
                return Err(EngineError::ClipNotFound { clip_id });
            }
        }
        self.commit(|timeline| {
            timeline.selection = clip_id;
            Ok(())
        })
    }

    /// Moves the playhead, clamped to zero. Returns the stored time.
    pub fn set_playhead(&mut self, time: f64) -> f64 {
        let time = clamp_time(time);
        if time != self.timeline.playhead {
            Arc::make_mut(&mut self.timeline).playhead = time;
        }
        time
    }

    /// Sets the zoom scale, clamped into the configured range. Returns the
    /// stored scale.
    pub fn set_zoom(&mut self, scale: f64) -> f64 {
        let Some(scale) = self.config.zoom_range().clamp(scale) else {
            debug!(scale, "zoom ignored: not finite");
            return self.timeline.zoom_scale;
        };
        if scale != self.timeline.zoom_scale {
            Arc::make_mut(&mut self.timeline).zoom_scale = scale;
        }
        scale
    }

    /// Sets source trims, bounded by the asset's intrinsic duration.
    pub fn set_clip_trim(
        &mut self,
        clip_id: ClipId,
        trim_start: Option<f64>,
        trim_end: Option<f64>,
    ) -> Result<Clip> {
        for trim in [trim_start, trim_end].into_iter().flatten() {
            if !trim.is_finite() || trim < 0.0 {
                return Err(EngineError::invalid(format!(
                    "trim must be a non-negative time, got {trim}"
                )));
            }
        }
        let (_, clip) = self
            .timeline
            .find_clip(clip_id)
            .ok_or(EngineError::ClipNotFound { clip_id })?;
        let asset = self.catalog.require(clip.asset_id)?;
        if let Some(intrinsic) = asset.intrinsic_duration {
            let total = trim_start.unwrap_or(0.0) + trim_end.unwrap_or(0.0);
            if total > intrinsic {
                warn!(clip_id, total, intrinsic, "trim rejected: exceeds asset");
                return Err(EngineError::invalid(format!(
                    "trims total {total}s but asset {} is {intrinsic}s long",
                    asset.id
                )));
            }
        }

        let patch = ClipPatch {
            trim_start: Some(trim_start),
            trim_end: Some(trim_end),
            ..ClipPatch::default()
        };
        self.commit(|timeline| timeline.mutate(clip_id, patch))
    }

    pub fn add_clip_effect(&mut self, clip_id: ClipId, effect: &str) -> Result<Clip> {
        let effect = effect.trim();
        if effect.is_empty() {
            return Err(EngineError::invalid("effect tag must not be empty"));
        }
        let mut effects = self.clip(clip_id)?.effects.clone();
        effects.push(effect.to_string());
        self.commit(|timeline| {
            timeline.mutate(
                clip_id,
                ClipPatch {
                    effects: Some(effects),
                    ..ClipPatch::default()
                },
            )
        })
    }

    /// Drops every occurrence of `effect` from the clip.
    pub fn remove_clip_effect(&mut self, clip_id: ClipId, effect: &str) -> Result<Clip> {
        let mut effects = self.clip(clip_id)?.effects.clone();
        effects.retain(|existing| existing != effect);
        self.commit(|timeline| {
            timeline.mutate(
                clip_id,
                ClipPatch {
                    effects: Some(effects),
                    ..ClipPatch::default()
                },
            )
        })
    }

    /// Replaces clip properties; out-of-range values are clamped.
    pub fn update_clip_properties(
        &mut self,
        clip_id: ClipId,
        properties: ClipProperties,
    ) -> Result<Clip> {
        let patch = ClipPatch {
            properties: Some(properties.clamped()),
            ..ClipPatch::default()
        };
        self.commit(|timeline| timeline.mutate(clip_id, patch))
    }

    pub fn apply_color_preset(&mut self, clip_id: ClipId, preset: ColorPreset) -> Result<Clip> {
        let mut properties = self.clip(clip_id)?.properties;
        preset.apply(&mut properties);
        self.update_clip_properties(clip_id, properties)
    }

    pub fn add_track(&mut self, kind: TrackKind) -> TrackId {
        let track_id = Arc::make_mut(&mut self.timeline).add_track(kind);
        info!(track_id = %track_id, kind = kind.label(), "track added");
        track_id
    }

    /// Removes a track together with its clips.
    pub fn remove_track(&mut self, track_id: &str) -> Result<Track> {
        let removed = self.commit(|timeline| timeline.remove_track(track_id))?;
        info!(
            track_id,
            removed_clips = removed.clips.len(),
            "track removed"
        );
        Ok(removed)
    }

    pub fn play(&mut self) -> PlaybackState {
        self.clock.play();
        self.clock.state()
    }

    pub fn pause(&mut self) -> PlaybackState {
        self.clock.pause();
        self.clock.state()
    }

    pub fn toggle_playback(&mut self) -> PlaybackState {
        self.clock.toggle();
        self.clock.state()
    }

    /// Advances the playhead by `elapsed` while playing.
    ///
    /// Returns the new playhead, or `None` when the clock is not running.
    pub fn tick(&mut self, elapsed: Duration) -> Option<f64> {
        let next = self.clock.advance(self.timeline.playhead, elapsed)?;
        Some(self.set_playhead(next))
    }

    /// Jumps the playhead by `delta` seconds.
    pub fn skip(&mut self, delta: f64) -> f64 {
        if !delta.is_finite() {
            return self.timeline.playhead;
        }
        self.set_playhead(self.timeline.playhead + delta)
    }

    fn clip(&self, clip_id: ClipId) -> Result<&Clip> {
        self.timeline
            .find_clip(clip_id)
            .map(|(_, clip)| clip)
            .ok_or(EngineError::ClipNotFound { clip_id })
    }

    /// Runs `apply` against a copy of the timeline and publishes the copy
    /// only when it succeeds.
    fn commit<T>(&mut self, apply: impl FnOnce(&mut Timeline) -> Result<T>) -> Result<T> {
        let mut next = Timeline::clone(&self.timeline);
        let output = apply(&mut next)?;
        self.timeline = Arc::new(next);
        Ok(output)
    }
}
