//! Domain models for the playlist

use bridge_traits::source::TRANSIENT_URL_PREFIX;
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

pub const DEFAULT_ARTIST: &str = "Unknown Artist";

/// Artwork shown for tracks without cover art.
pub const PLACEHOLDER_ARTWORK: &str =
    "https://via.placeholder.com/200x200/333333/ffffff?text=%E2%99%AA";

// =============================================================================
// ID Types
// =============================================================================

/// Locally generated track identifier (`track-<uuid>`).
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TrackId(String);

impl TrackId {
    pub fn new() -> Self {
        Self(format!("track-{}", Uuid::new_v4()))
    }

    /// Wrap an existing identifier, e.g. one read back from storage.
    pub fn from_string(s: impl Into<String>) -> Self {
        Self(s.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.trim().is_empty()
    }
}

impl Default for TrackId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for TrackId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Identifier assigned by the remote document store.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RemoteId(String);

impl RemoteId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for RemoteId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

// =============================================================================
// Domain Models
// =============================================================================

/// Playable reference of a track.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "url", rename_all = "lowercase")]
pub enum TrackSource {
    /// Session-scoped object URL; not valid after a reload.
    Transient(String),
    /// Remote URL that survives restarts.
    Durable(String),
}

impl TrackSource {
    /// Classify a reference by its scheme.
    pub fn classify(url: impl Into<String>) -> Self {
        let url = url.into();
        if url.starts_with(TRANSIENT_URL_PREFIX) {
            TrackSource::Transient(url)
        } else {
            TrackSource::Durable(url)
        }
    }

    pub fn url(&self) -> &str {
        match self {
            TrackSource::Transient(url) | TrackSource::Durable(url) => url,
        }
    }

    pub fn is_transient(&self) -> bool {
        matches!(self, TrackSource::Transient(_))
    }

    /// The reference if it survives a restart.
    pub fn durable_url(&self) -> Option<&str> {
        match self {
            TrackSource::Durable(url) => Some(url),
            TrackSource::Transient(_) => None,
        }
    }
}

/// How a track entered the playlist.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum OriginHint {
    ManualUpload,
    DeviceScan,
    RemoteOrigin,
}

/// A playlist entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Track {
    pub id: TrackId,
    /// Set once the track is mirrored remotely.
    pub remote_id: Option<RemoteId>,
    pub title: String,
    pub artist: String,
    pub source: TrackSource,
    pub artwork_ref: String,
    pub saved_by_user: bool,
    pub mirrored: bool,
    pub origin_hint: OriginHint,
}

impl Track {
    /// Track for a freshly ingested local file.
    pub fn from_file(file_name: &str, source: TrackSource, origin: OriginHint) -> Self {
        Self {
            id: TrackId::new(),
            remote_id: None,
            title: title_from_file_name(file_name),
            artist: DEFAULT_ARTIST.to_string(),
            source,
            artwork_ref: PLACEHOLDER_ARTWORK.to_string(),
            saved_by_user: false,
            mirrored: false,
            origin_hint: origin,
        }
        .normalized()
    }

    /// Track materialized from a remote document.
    pub fn from_remote(
        remote_id: RemoteId,
        title: impl Into<String>,
        artist: Option<String>,
        artwork_ref: Option<String>,
        file_url: impl Into<String>,
    ) -> Self {
        Self {
            id: TrackId::new(),
            remote_id: Some(remote_id),
            title: title.into(),
            artist: artist.unwrap_or_default(),
            source: TrackSource::Durable(file_url.into()),
            artwork_ref: artwork_ref.unwrap_or_default(),
            saved_by_user: true,
            mirrored: true,
            origin_hint: OriginHint::RemoteOrigin,
        }
        .normalized()
    }

    /// Replace blank artist/artwork with their defaults.
    pub fn normalized(mut self) -> Self {
        if self.artist.trim().is_empty() {
            self.artist = DEFAULT_ARTIST.to_string();
        }
        if self.artwork_ref.trim().is_empty() {
            self.artwork_ref = PLACEHOLDER_ARTWORK.to_string();
        }
        self
    }

    /// Whether the batch mirror should push this track.
    pub fn needs_mirroring(&self) -> bool {
        !self.mirrored && self.origin_hint != OriginHint::RemoteOrigin
    }
}

/// Display title for a file: the name without its final extension.
///
/// `"song.live.mp3"` becomes `"song.live"`; names without an extension are
/// kept as-is. A name that is only an extension (`".mp3"`) is kept whole so
/// the title is never empty.
pub fn title_from_file_name(file_name: &str) -> String {
    match file_name.rfind('.') {
        Some(pos) if pos > 0 && pos + 1 < file_name.len() => {
            let extension = &file_name[pos + 1..];
            if extension.contains('/') {
                file_name.to_string()
            } else {
                file_name[..pos].to_string()
            }
        }
        _ => file_name.to_string(),
    }
}
