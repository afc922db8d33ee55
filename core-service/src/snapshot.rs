//! Serializable read model of the coordinator.

use core_playback::PlaybackState;
use core_playlist::models::{Track, TrackId};
use serde::{Deserialize, Serialize};

/// Everything a presentation layer needs to render the player.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlaylistSnapshot {
    pub tracks: Vec<Track>,
    /// Index of the current track; `None` iff `tracks` is empty.
    pub cursor: Option<usize>,
    pub current_track_id: Option<TrackId>,
    pub playback: PlaybackState,
    pub repeat_all_enabled: bool,
    pub mirror_enabled: bool,
}

impl PlaylistSnapshot {
    pub(crate) fn empty(playback: PlaybackState, mirror_enabled: bool) -> Self {
        Self {
            tracks: Vec::new(),
            cursor: None,
            current_track_id: None,
            repeat_all_enabled: playback.repeat_all_enabled,
            playback,
            mirror_enabled,
        }
    }

    pub fn current_track(&self) -> Option<&Track> {
        self.cursor.and_then(|index| self.tracks.get(index))
    }

    pub fn is_empty(&self) -> bool {
        self.tracks.is_empty()
    }
}
