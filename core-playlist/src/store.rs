//! Ordered track collection.

use crate::error::{PlaylistError, Result};
use crate::models::{RemoteId, Track, TrackId};
use tracing::debug;

/// In-memory ordered sequence of tracks with unique ids.
///
/// The store performs no locking and knows nothing about the cursor. Callers
/// serialize mutations and adjust the cursor in the same critical section.
#[derive(Debug, Default, Clone)]
pub struct TrackStore {
    tracks: Vec<Track>,
}

impl TrackStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a store from restored tracks, fixing up duplicate ids.
    pub fn from_tracks(tracks: impl IntoIterator<Item = Track>) -> Self {
        let mut store = Self::new();
        for track in tracks {
            store.append(track);
        }
        store
    }

    /// Append a track and return its id.
    ///
    /// A blank id, or one already present in the store, is replaced with a
    /// freshly generated one.
    pub fn append(&mut self, mut track: Track) -> TrackId {
        if track.id.is_empty() || self.contains_id(&track.id) {
            let fresh = TrackId::new();
            debug!(old_id = %track.id, new_id = %fresh, "Reassigned colliding track id");
            track.id = fresh;
        }
        let id = track.id.clone();
        self.tracks.push(track);
        id
    }

    pub fn remove_at(&mut self, index: usize) -> Result<Track> {
        self.check_index(index)?;
        Ok(self.tracks.remove(index))
    }

    pub fn get(&self, index: usize) -> Result<&Track> {
        let len = self.tracks.len();
        self.tracks
            .get(index)
            .ok_or(PlaylistError::IndexOutOfRange { index, len })
    }

    pub fn get_mut(&mut self, index: usize) -> Result<&mut Track> {
        let len = self.tracks.len();
        self.tracks
            .get_mut(index)
            .ok_or(PlaylistError::IndexOutOfRange { index, len })
    }

    /// Index of the first track matching `predicate`.
    pub fn find<P>(&self, predicate: P) -> Option<usize>
    where
        P: FnMut(&Track) -> bool,
    {
        self.tracks.iter().position(predicate)
    }

    pub fn position_of(&self, id: &TrackId) -> Option<usize> {
        self.find(|track| &track.id == id)
    }

    pub fn contains_id(&self, id: &TrackId) -> bool {
        self.position_of(id).is_some()
    }

    pub fn contains_remote(&self, remote_id: &RemoteId) -> bool {
        self.tracks
            .iter()
            .any(|track| track.remote_id.as_ref() == Some(remote_id))
    }

    pub fn contains_title(&self, title: &str) -> bool {
        self.tracks.iter().any(|track| track.title == title)
    }

    pub fn len(&self) -> usize {
        self.tracks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tracks.is_empty()
    }

    pub fn all(&self) -> &[Track] {
        &self.tracks
    }

    pub fn last_index(&self) -> Option<usize> {
        self.tracks.len().checked_sub(1)
    }

    fn check_index(&self, index: usize) -> Result<()> {
        if index < self.tracks.len() {
            Ok(())
        } else {
            Err(PlaylistError::IndexOutOfRange {
                index,
                len: self.tracks.len(),
            })
        }
    }
}
