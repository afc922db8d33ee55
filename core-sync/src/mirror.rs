//! Remote mirror implementations.

use std::sync::Arc;

use bridge_traits::platform::PlatformSendSync;
use bridge_traits::remote::{DocumentCollection, RemoteDocument, SongDocument};
use core_playlist::models::{RemoteId, Track};
use tracing::{debug, info, instrument, warn};

use crate::error::{Result, SyncError};

/// Mirror of the playlist in a remote document store.
#[cfg_attr(target_arch = "wasm32", async_trait::async_trait(?Send))]
#[cfg_attr(not(target_arch = "wasm32"), async_trait::async_trait)]
pub trait RemoteMirror: PlatformSendSync {
    /// Whether remote operations are backed by a real collection.
    fn is_enabled(&self) -> bool;

    /// Fetch all mirrored tracks, newest first.
    ///
    /// Documents without a file URL are skipped.
    async fn pull(&self) -> Result<Vec<Track>>;

    /// Write `track` as a new document and return its remote id.
    async fn push(&self, track: &Track) -> Result<RemoteId>;

    /// Delete a mirrored document.
    async fn remove(&self, remote_id: &RemoteId) -> Result<()>;
}

/// [`RemoteMirror`] backed by a host [`DocumentCollection`].
pub struct DocumentMirror {
    collection: Arc<dyn DocumentCollection>,
    collection_name: String,
}

impl DocumentMirror {
    pub fn new(collection: Arc<dyn DocumentCollection>, collection_name: impl Into<String>) -> Self {
        Self {
            collection,
            collection_name: collection_name.into(),
        }
    }

    pub fn collection_name(&self) -> &str {
        &self.collection_name
    }

    fn track_from_document(document: RemoteDocument) -> Option<Track> {
        let RemoteDocument { id, fields } = document;
        let file_url = fields.file_url.filter(|url| !url.trim().is_empty())?;

        Some(Track::from_remote(
            RemoteId::new(id),
            fields.title,
            fields.artist,
            fields.album_art,
            file_url,
        ))
    }

    fn document_from_track(track: &Track) -> SongDocument {
        SongDocument {
            title: track.title.clone(),
            artist: Some(track.artist.clone()),
            album_art: Some(track.artwork_ref.clone()),
            file_url: track.source.durable_url().map(str::to_string),
            created_at: None,
        }
    }
}

#[cfg_attr(target_arch = "wasm32", async_trait::async_trait(?Send))]
#[cfg_attr(not(target_arch = "wasm32"), async_trait::async_trait)]
impl RemoteMirror for DocumentMirror {
    fn is_enabled(&self) -> bool {
        true
    }

    #[instrument(skip(self), fields(collection = %self.collection_name))]
    async fn pull(&self) -> Result<Vec<Track>> {
        let documents = self.collection.list_by_created_desc().await?;
        let received = documents.len();

        let tracks: Vec<Track> = documents
            .into_iter()
            .filter_map(|doc| {
                let id = doc.id.clone();
                let track = Self::track_from_document(doc);
                if track.is_none() {
                    debug!(remote_id = %id, "Skipping document without file URL");
                }
                track
            })
            .collect();

        info!(received, usable = tracks.len(), "Pulled remote documents");
        Ok(tracks)
    }

    #[instrument(skip(self, track), fields(track_id = %track.id))]
    async fn push(&self, track: &Track) -> Result<RemoteId> {
        let document = Self::document_from_track(track);
        let id = self
            .collection
            .add(document)
            .await
            .map_err(|e| SyncError::mirror_failure(&track.title, e))?;

        debug!(remote_id = %id, "Mirrored track");
        Ok(RemoteId::new(id))
    }

    async fn remove(&self, remote_id: &RemoteId) -> Result<()> {
        self.collection.delete(remote_id.as_str()).await.map_err(|e| {
            warn!(remote_id = %remote_id, error = %e, "Failed to delete remote document");
            SyncError::from(e)
        })
    }
}

/// Stand-in used when mirroring is not configured.
#[derive(Debug, Default, Clone)]
pub struct NoopMirror;

#[cfg_attr(target_arch = "wasm32", async_trait::async_trait(?Send))]
#[cfg_attr(not(target_arch = "wasm32"), async_trait::async_trait)]
impl RemoteMirror for NoopMirror {
    fn is_enabled(&self) -> bool {
        false
    }

    async fn pull(&self) -> Result<Vec<Track>> {
        Ok(Vec::new())
    }

    async fn push(&self, _track: &Track) -> Result<RemoteId> {
        Err(SyncError::NotConfigured)
    }

    async fn remove(&self, _remote_id: &RemoteId) -> Result<()> {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use bridge_traits::error::{BridgeError, Result as BridgeResult};
    use core_playlist::models::{OriginHint, TrackSource};
    use mockall::mock;

    mock! {
        Collection {}

        #[async_trait]
        impl DocumentCollection for Collection {
            async fn list_by_created_desc(&self) -> BridgeResult<Vec<RemoteDocument>>;
            async fn add(&self, document: SongDocument) -> BridgeResult<String>;
            async fn delete(&self, id: &str) -> BridgeResult<()>;
        }
    }

    fn doc(id: &str, title: &str, file_url: Option<&str>) -> RemoteDocument {
        RemoteDocument {
            id: id.to_string(),
            fields: SongDocument {
                title: title.to_string(),
                file_url: file_url.map(str::to_string),
                ..Default::default()
            },
        }
    }

    #[tokio::test]
    async fn test_pull_skips_documents_without_file_url() {
        let mut collection = MockCollection::new();
        collection.expect_list_by_created_desc().returning(|| {
            Ok(vec![
                doc("d3", "Newest", Some("https://cdn/3.mp3")),
                doc("d2", "No file", None),
                doc("d1", "Blank", Some("  ")),
                doc("d0", "Oldest", Some("https://cdn/0.mp3")),
            ])
        });

        let mirror = DocumentMirror::new(Arc::new(collection), "songs");
        let tracks = mirror.pull().await.unwrap();

        let titles: Vec<_> = tracks.iter().map(|t| t.title.as_str()).collect();
        assert_eq!(titles, vec!["Newest", "Oldest"]);
        assert_eq!(tracks[0].remote_id, Some(RemoteId::new("d3")));
        assert_eq!(tracks[0].origin_hint, OriginHint::RemoteOrigin);
        assert!(tracks[0].mirrored && tracks[0].saved_by_user);
        assert_eq!(tracks[0].source.durable_url(), Some("https://cdn/3.mp3"));
    }

    #[tokio::test]
    async fn test_push_omits_transient_source() {
        let mut collection = MockCollection::new();
        collection
            .expect_add()
            .withf(|d| d.title == "local" && d.file_url.is_none() && d.created_at.is_none())
            .times(1)
            .returning(|_| Ok("new-doc".to_string()));

        let mirror = DocumentMirror::new(Arc::new(collection), "songs");
        let track = Track::from_file(
            "local.mp3",
            TrackSource::Transient("blob:x".into()),
            OriginHint::ManualUpload,
        );

        assert_eq!(mirror.push(&track).await.unwrap(), RemoteId::new("new-doc"));
    }

    #[tokio::test]
    async fn test_push_failure_carries_title() {
        let mut collection = MockCollection::new();
        collection
            .expect_add()
            .returning(|_| Err(BridgeError::OperationFailed("permission denied".into())));

        let mirror = DocumentMirror::new(Arc::new(collection), "songs");
        let track = Track::from_file(
            "song.mp3",
            TrackSource::Durable("https://cdn/song.mp3".into()),
            OriginHint::ManualUpload,
        );

        match mirror.push(&track).await {
            Err(SyncError::MirrorFailure { title, message }) => {
                assert_eq!(title, "song");
                assert!(message.contains("permission denied"));
            }
            other => panic!("unexpected result: {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_remove_deletes_by_id() {
        let mut collection = MockCollection::new();
        collection
            .expect_delete()
            .withf(|id| id == "doc-7")
            .times(1)
            .returning(|_| Ok(()));

        let mirror = DocumentMirror::new(Arc::new(collection), "songs");
        mirror.remove(&RemoteId::new("doc-7")).await.unwrap();
    }

    #[tokio::test]
    async fn test_noop_mirror() {
        let mirror = NoopMirror;
        let track = Track::from_file(
            "a.mp3",
            TrackSource::Transient("blob:a".into()),
            OriginHint::ManualUpload,
        );

        assert!(!mirror.is_enabled());
        assert!(mirror.pull().await.unwrap().is_empty());
        assert!(matches!(
            mirror.push(&track).await,
            Err(SyncError::NotConfigured)
        ));
        assert!(mirror.remove(&RemoteId::new("x")).await.is_ok());
    }
}
