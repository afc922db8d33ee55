//! Remote document collection abstraction.
//!
//! The optional cloud mirror stores one document per track in a collection
//! (named `songs` by default). The core treats the store as an opaque
//! document sink: list everything newest first, add a document and receive
//! its server-assigned id, delete by id. Wire protocol, authentication and
//! retries are the host's concern.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::{error::Result, platform::PlatformSendSync};

/// Fields of a song document as stored remotely.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SongDocument {
    pub title: String,
    #[serde(default)]
    pub artist: Option<String>,
    #[serde(default)]
    pub album_art: Option<String>,
    #[serde(default)]
    pub file_url: Option<String>,
    /// Server-assigned on write; ignored when adding.
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
}

/// A document together with its remote identifier.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RemoteDocument {
    pub id: String,
    pub fields: SongDocument,
}

/// Remote collection of song documents.
///
/// # Example
///
/// ```ignore
/// use bridge_traits::remote::{DocumentCollection, SongDocument};
///
/// async fn publish(collection: &dyn DocumentCollection) -> Result<String> {
///     collection
///         .add(SongDocument { title: "Intro".into(), ..Default::default() })
///         .await
/// }
/// ```
#[cfg_attr(target_arch = "wasm32", async_trait::async_trait(?Send))]
#[cfg_attr(not(target_arch = "wasm32"), async_trait::async_trait)]
pub trait DocumentCollection: PlatformSendSync {
    /// List every document ordered by `createdAt`, newest first.
    async fn list_by_created_desc(&self) -> Result<Vec<RemoteDocument>>;

    /// Add a document. The store assigns `createdAt` and returns the new id.
    async fn add(&self, document: SongDocument) -> Result<String>;

    /// Delete the document with the given id.
    async fn delete(&self, id: &str) -> Result<()>;
}
