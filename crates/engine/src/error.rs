use std::fmt::{Display, Formatter};
use std::path::PathBuf;

/// Result type used by the engine crate.
pub type Result<T> = std::result::Result<T, EngineError>;

/// Errors produced by engine commands and timeline operations.
#[derive(Debug)]
pub enum EngineError {
    /// The candidate interval intersects a clip already on the track.
    OverlapConflict {
        track_id: String,
        clip_id: Option<u64>,
        conflicting_clip_id: u64,
    },
    ClipNotFound {
        clip_id: u64,
    },
    AssetNotFound {
        asset_id: u64,
    },
    TrackNotFound {
        track_id: String,
    },
    InvalidArgument {
        reason: String,
    },
    ConfigIo {
        path: PathBuf,
        source: std::io::Error,
    },
    ConfigParse {
        path: PathBuf,
        source: serde_json::Error,
    },
}

impl EngineError {
    pub(crate) fn invalid(reason: impl Into<String>) -> Self {
        Self::InvalidArgument {
            reason: reason.into(),
        }
    }
}

impl Display for EngineError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::OverlapConflict {
                track_id,
                clip_id: Some(clip_id),
                conflicting_clip_id,
            } => write!(
                f,
                "clip {clip_id} would overlap clip {conflicting_clip_id} on track {track_id}"
            ),
            Self::OverlapConflict {
                track_id,
                clip_id: None,
                conflicting_clip_id,
            } => write!(
                f,
                "placement would overlap clip {conflicting_clip_id} on track {track_id}"
            ),
            Self::ClipNotFound { clip_id } => write!(f, "clip not found: {clip_id}"),
            Self::AssetNotFound { asset_id } => write!(f, "asset not found: {asset_id}"),
            Self::TrackNotFound { track_id } => write!(f, "track not found: {track_id}"),
            Self::InvalidArgument { reason } => write!(f, "invalid argument: {reason}"),
            Self::ConfigIo { path, source } => {
                write!(f, "failed to read config {} ({source})", path.display())
            }
            Self::ConfigParse { path, source } => {
                write!(f, "failed to parse config {} ({source})", path.display())
            }
        }
    }
}

impl std::error::Error for EngineError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::ConfigIo { source, .. } => Some(source),
            Self::ConfigParse { source, .. } => Some(source),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::EngineError;

    #[test]
    fn overlap_message_names_both_clips_and_track() {
        let error = EngineError::OverlapConflict {
            track_id: "video-1".to_string(),
            clip_id: Some(4),
            conflicting_clip_id: 2,
        };
        assert_eq!(
            error.to_string(),
            "clip 4 would overlap clip 2 on track video-1"
        );
    }

    #[test]
    fn parse_error_exposes_source() {
        let source = serde_json::from_str::<u32>("nope").expect_err("must fail");
        let error = EngineError::ConfigParse {
            path: "engine.json".into(),
            source,
        };
        assert!(std::error::Error::source(&error).is_some());
    }
}
