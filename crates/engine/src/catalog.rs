use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::error::{EngineError, Result};
use crate::timeline::{AssetId, TrackKind};

/// Kind of imported media.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MediaKind {
    Video,
    Audio,
    Image,
}

impl MediaKind {
    /// Infers the kind from a MIME-like type string such as `video/mp4`.
    pub fn from_mime(mime_type: &str) -> Self {
        if mime_type.starts_with("video/") {
            Self::Video
        } else if mime_type.starts_with("audio/") {
            Self::Audio
        } else {
            Self::Image
        }
    }

    /// Track kind able to hold clips of this media.
    pub fn track_kind(self) -> TrackKind {
        match self {
            Self::Video | Self::Image => TrackKind::Video,
            Self::Audio => TrackKind::Audio,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Self::Video => "video",
            Self::Audio => "audio",
            Self::Image => "image",
        }
    }
}

/// Metadata recorded when a file is imported. Nothing is decoded.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AssetMetadata {
    pub name: String,
    pub mime_type: String,
    #[serde(default)]
    pub source_ref: Option<String>,
    #[serde(default)]
    pub duration: Option<f64>,
}

/// Imported media tracked by the catalog. Immutable once created.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MediaAsset {
    pub id: AssetId,
    pub name: String,
    pub kind: MediaKind,
    pub source_ref: String,
    pub intrinsic_duration: Option<f64>,
}

/// Registry of imported assets.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MediaCatalog {
    assets: Vec<MediaAsset>,
    next_asset_id: AssetId,
}

impl Default for MediaCatalog {
    fn default() -> Self {
        Self {
            assets: Vec::new(),
            next_asset_id: 1,
        }
    }
}

impl MediaCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Validates `metadata` and registers a new asset under a fresh id.
    pub fn import(&mut self, metadata: AssetMetadata) -> Result<MediaAsset> {
        let name = metadata.name.trim();
        if name.is_empty() {
            warn!(mime_type = %metadata.mime_type, "import rejected: empty name");
            return Err(EngineError::invalid("asset name must not be empty"));
        }
        if let Some(duration) = metadata.duration {
            if !(duration.is_finite() && duration > 0.0) {
                warn!(name, duration, "import rejected: bad duration");
                return Err(EngineError::invalid(format!(
                    "asset duration must be positive, got {duration}"
                )));
            }
        }

        let kind = MediaKind::from_mime(&metadata.mime_type);
        let intrinsic_duration = match kind {
            MediaKind::Video | MediaKind::Audio => metadata.duration,
            MediaKind::Image => None,
        };
        let asset = MediaAsset {
            id: self.next_asset_id,
            name: name.to_string(),
            kind,
            source_ref: metadata.source_ref.unwrap_or_else(|| name.to_string()),
            intrinsic_duration,
        };
        self.next_asset_id += 1;

        info!(
            asset_id = asset.id,
            name = %asset.name,
            kind = asset.kind.label(),
            intrinsic_duration = ?asset.intrinsic_duration,
            "asset imported"
        );
        self.assets.push(asset.clone());
        Ok(asset)
    }

    pub fn get(&self, asset_id: AssetId) -> Option<&MediaAsset> {
        self.assets.iter().find(|asset| asset.id == asset_id)
    }

    pub(crate) fn require(&self, asset_id: AssetId) -> Result<&MediaAsset> {
        self.get(asset_id)
            .ok_or(EngineError::AssetNotFound { asset_id })
    }

    pub fn iter(&self) -> impl Iterator<Item = &MediaAsset> {
        self.assets.iter()
    }

    pub fn len(&self) -> usize {
        self.assets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.assets.is_empty()
    }

    pub fn count_of(&self, kind: MediaKind) -> usize {
        self.assets.iter().filter(|asset| asset.kind == kind).count()
    }
}
