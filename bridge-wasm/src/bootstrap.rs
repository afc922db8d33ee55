//! Convenience helpers for wiring all browser bridge implementations together.
//!
//! Host shells can use [`build_browser_bridges`] to construct the storage,
//! media, object URL and folder picker adapters in one call. The result plays
//! the role `bridge-desktop` plays for native targets.

use std::sync::Arc;

use bridge_traits::{
    error::Result as BridgeResult,
    media::MediaElement,
    source::{DirectoryPicker, ObjectUrlRegistry},
    storage::KeyValueStore,
};

use crate::{BlobUrlRegistry, BrowserDirectoryPicker, HtmlAudioMedia, LocalStorageStore};

/// Configuration for [`build_browser_bridges`].
#[derive(Debug, Clone, Default)]
pub struct BrowserBridgeConfig {
    /// Id of the `<audio>` element driven by the core. `None` creates a
    /// detached element.
    pub audio_element_id: Option<String>,
    /// Optional `localStorage` key prefix.
    pub storage_namespace: Option<String>,
}

impl BrowserBridgeConfig {
    /// Drive the `<audio>` element with the given id.
    pub fn new(audio_element_id: impl Into<String>) -> Self {
        Self {
            audio_element_id: Some(audio_element_id.into()),
            storage_namespace: None,
        }
    }

    /// Prefix all storage keys with `namespace`.
    pub fn with_storage_namespace(mut self, namespace: impl Into<String>) -> Self {
        self.storage_namespace = Some(namespace.into());
        self
    }
}

/// Fully constructed browser bridge objects ready for injection into the core.
pub struct BrowserBridgeSet {
    /// `localStorage` slots.
    pub storage: Arc<dyn KeyValueStore>,
    /// Concrete media handle, kept for attaching signal listeners.
    pub media: HtmlAudioMedia,
    /// Shared registry for picked files; register `<input type="file">`
    /// selections here.
    pub files: Arc<BlobUrlRegistry>,
    /// `showDirectoryPicker`, when the browser supports it.
    pub directory_picker: Option<Arc<dyn DirectoryPicker>>,
}

impl BrowserBridgeSet {
    /// The media element as a trait object.
    pub fn media_element(&self) -> Arc<dyn MediaElement> {
        Arc::new(self.media.clone())
    }

    /// The file registry as an [`ObjectUrlRegistry`].
    pub fn object_urls(&self) -> Arc<dyn ObjectUrlRegistry> {
        self.files.clone()
    }
}

/// Build the default browser bridge stack.
pub fn build_browser_bridges(config: BrowserBridgeConfig) -> BridgeResult<BrowserBridgeSet> {
    let storage: Arc<dyn KeyValueStore> = match &config.storage_namespace {
        Some(namespace) => Arc::new(LocalStorageStore::namespaced(namespace.clone())?),
        None => Arc::new(LocalStorageStore::new()?),
    };

    let media = match &config.audio_element_id {
        Some(id) => HtmlAudioMedia::from_element_id(id)?,
        None => HtmlAudioMedia::detached()?,
    };

    let files = Arc::new(BlobUrlRegistry::new());
    let directory_picker: Option<Arc<dyn DirectoryPicker>> =
        if BrowserDirectoryPicker::is_supported() {
            Some(Arc::new(BrowserDirectoryPicker::new(files.clone())))
        } else {
            None
        };

    Ok(BrowserBridgeSet {
        storage,
        media,
        files,
        directory_picker,
    })
}
