//! UI-agnostic timeline engine: media catalog, tracks and clips, playhead,
//! selection and zoom, driven by synchronous commands.

pub mod api;
pub mod assistant;
pub mod bridge;
pub mod catalog;
pub mod config;
pub mod error;
pub mod playback;
pub mod properties;
pub mod summary;
pub mod time;
pub mod timeline;

pub use api::{
    Command, Engine, EngineErrorEvent, EngineErrorKind, Event, ResizeEdge, TimelineSnapshot,
};
pub use catalog::{AssetMetadata, MediaAsset, MediaCatalog, MediaKind};
pub use config::EngineConfig;
pub use error::{EngineError, Result};
pub use playback::{PlaybackClock, PlaybackState};
pub use properties::{ClipProperties, ColorPreset};
pub use summary::{TimelineSummary, summarize};
pub use time::{ZoomRange, pixel_to_time, time_to_pixel};
pub use timeline::{AssetId, Clip, ClipId, ClipPatch, Interval, Timeline, Track, TrackId, TrackKind};
