//! Durable playlist snapshot.
//!
//! The playlist is stored in two key-value slots:
//! - the playlist slot holds `{"tracks": [...], "cursorIndex": n}`
//! - the index slot holds the cursor as a bare decimal string
//!
//! Session-scoped (`blob:`) sources cannot survive a reload, so they are
//! written as `null` and tracks without a source are dropped on load.
//!
//! Older data stored the playlist slot as a bare array of tracks using the
//! field names `firebaseId`, `albumArt`, `src`, `saved`, `synced`,
//! `cloudSync` and `autoFetched`, with the cursor only in the index slot.
//! That layout is still read.

use std::sync::Arc;

use bridge_traits::storage::KeyValueStore;
use core_runtime::config::StorageKeys;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{debug, warn};

use crate::error::Result;
use crate::models::{OriginHint, RemoteId, Track, TrackId, TrackSource};

/// One track as written to storage.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PersistedTrack {
    pub id: String,
    #[serde(default, alias = "firebaseId")]
    pub remote_id: Option<String>,
    pub title: String,
    #[serde(default)]
    pub artist: Option<String>,
    /// `None` for session-scoped sources.
    #[serde(default, alias = "src")]
    pub source: Option<String>,
    #[serde(default, alias = "albumArt")]
    pub artwork_ref: Option<String>,
    #[serde(default, alias = "saved")]
    pub saved_by_user: bool,
    #[serde(default, alias = "synced")]
    pub mirrored: bool,
    #[serde(default)]
    pub origin_hint: Option<OriginHint>,
    #[serde(default, skip_serializing)]
    cloud_sync: bool,
    #[serde(default, skip_serializing)]
    auto_fetched: bool,
}

impl PersistedTrack {
    pub fn from_track(track: &Track) -> Self {
        Self {
            id: track.id.to_string(),
            remote_id: track.remote_id.as_ref().map(|id| id.to_string()),
            title: track.title.clone(),
            artist: Some(track.artist.clone()),
            source: track.source.durable_url().map(str::to_string),
            artwork_ref: Some(track.artwork_ref.clone()),
            saved_by_user: track.saved_by_user,
            mirrored: track.mirrored,
            origin_hint: Some(track.origin_hint),
            cloud_sync: false,
            auto_fetched: false,
        }
    }

    /// Convert back into a track. Returns `None` when no playable source
    /// survived the reload.
    pub fn into_track(self) -> Option<Track> {
        let source = match self.source {
            Some(url) if !url.trim().is_empty() => TrackSource::classify(url),
            _ => return None,
        };
        if source.is_transient() {
            return None;
        }

        let origin_hint = self.origin_hint.unwrap_or(if self.cloud_sync {
            OriginHint::RemoteOrigin
        } else if self.auto_fetched {
            OriginHint::DeviceScan
        } else {
            OriginHint::ManualUpload
        });

        Some(
            Track {
                id: TrackId::from_string(self.id),
                remote_id: self.remote_id.filter(|id| !id.is_empty()).map(RemoteId::new),
                title: self.title,
                artist: self.artist.unwrap_or_default(),
                source,
                artwork_ref: self.artwork_ref.unwrap_or_default(),
                saved_by_user: self.saved_by_user,
                mirrored: self.mirrored,
                origin_hint,
            }
            .normalized(),
        )
    }
}

/// The full persisted playlist.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PersistedSnapshot {
    pub tracks: Vec<PersistedTrack>,
    pub cursor_index: Option<usize>,
}

impl PersistedSnapshot {
    pub fn capture(tracks: &[Track], cursor: Option<usize>) -> Self {
        Self {
            tracks: tracks.iter().map(PersistedTrack::from_track).collect(),
            cursor_index: cursor,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.tracks.is_empty()
    }

    /// Restorable tracks in order.
    pub fn into_tracks(self) -> Vec<Track> {
        self.tracks
            .into_iter()
            .filter_map(PersistedTrack::into_track)
            .collect()
    }
}

/// Reads and writes the playlist through a host [`KeyValueStore`].
pub struct PersistenceAdapter {
    store: Arc<dyn KeyValueStore>,
    keys: StorageKeys,
}

impl PersistenceAdapter {
    pub fn new(store: Arc<dyn KeyValueStore>, keys: StorageKeys) -> Self {
        Self { store, keys }
    }

    pub fn keys(&self) -> &StorageKeys {
        &self.keys
    }

    /// Overwrite both slots.
    ///
    /// Any storage failure, including a full store, is reported as
    /// [`PlaylistError::Persistence`](crate::error::PlaylistError::Persistence).
    pub async fn save(&self, snapshot: &PersistedSnapshot) -> Result<()> {
        let json = serde_json::to_string(snapshot)?;
        self.store.set_string(&self.keys.playlist, &json).await?;

        match snapshot.cursor_index {
            Some(index) => {
                self.store
                    .set_string(&self.keys.cursor_index, &index.to_string())
                    .await?
            }
            None => self.store.delete(&self.keys.cursor_index).await?,
        }

        debug!(
            tracks = snapshot.tracks.len(),
            cursor = ?snapshot.cursor_index,
            "Persisted playlist"
        );
        Ok(())
    }

    /// Restore the playlist. Never fails: unreadable or corrupt data yields
    /// an empty snapshot.
    ///
    /// Tracks without a durable source are dropped and the cursor is clamped
    /// into the remaining range.
    pub async fn load(&self) -> PersistedSnapshot {
        let raw = match self.store.get_string(&self.keys.playlist).await {
            Ok(Some(raw)) => raw,
            Ok(None) => return PersistedSnapshot::default(),
            Err(e) => {
                warn!(error = %e, "Could not read saved playlist");
                return PersistedSnapshot::default();
            }
        };

        let (entries, stored_cursor) = match serde_json::from_str::<Value>(&raw) {
            Ok(Value::Object(mut doc)) => {
                let cursor = doc.get("cursorIndex").and_then(Value::as_i64);
                match doc.remove("tracks") {
                    Some(Value::Array(entries)) => (entries, cursor),
                    _ => {
                        warn!("Saved playlist has no track list; starting empty");
                        return PersistedSnapshot::default();
                    }
                }
            }
            Ok(Value::Array(entries)) => (entries, self.load_legacy_cursor().await),
            Ok(_) => {
                warn!("Saved playlist has an unexpected shape; starting empty");
                return PersistedSnapshot::default();
            }
            Err(e) => {
                warn!(error = %e, "Could not parse saved playlist; starting empty");
                return PersistedSnapshot::default();
            }
        };

        let tracks: Vec<PersistedTrack> = entries
            .into_iter()
            .filter_map(|entry| match serde_json::from_value::<PersistedTrack>(entry) {
                Ok(track) => Some(track),
                Err(e) => {
                    warn!(error = %e, "Skipping unreadable saved track");
                    None
                }
            })
            .filter(|track| {
                track
                    .source
                    .as_deref()
                    .map(|src| !src.trim().is_empty() && !TrackSource::classify(src).is_transient())
                    .unwrap_or(false)
            })
            .collect();

        let cursor_index = clamp_cursor(stored_cursor, tracks.len());

        debug!(tracks = tracks.len(), cursor = ?cursor_index, "Loaded saved playlist");
        PersistedSnapshot {
            tracks,
            cursor_index,
        }
    }

    async fn load_legacy_cursor(&self) -> Option<i64> {
        match self.store.get_string(&self.keys.cursor_index).await {
            Ok(Some(raw)) => raw.trim().parse::<i64>().ok(),
            Ok(None) => None,
            Err(e) => {
                warn!(error = %e, "Could not read saved cursor index");
                None
            }
        }
    }
}

fn clamp_cursor(stored: Option<i64>, len: usize) -> Option<usize> {
    let last = len.checked_sub(1)?;
    let index = stored.unwrap_or(0).max(0) as usize;
    Some(index.min(last))
}
