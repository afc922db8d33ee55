//! Bridge dependencies injected into the coordinator.
//!
//! Hosts either construct [`CoreDependencies`] directly or go through
//! [`CoreDependencies::builder`], which fills storage and object URL slots
//! with the desktop shims when the `desktop-shims` feature is enabled.

use std::sync::Arc;

use bridge_traits::{
    media::MediaElement,
    remote::DocumentCollection,
    source::{DirectoryPicker, ObjectUrlRegistry},
    storage::KeyValueStore,
    time::{Clock, SystemClock},
};

use crate::error::{CoreError, Result};

/// Aggregated handle to all bridge dependencies the core requires.
#[derive(Clone)]
pub struct CoreDependencies {
    pub storage: Arc<dyn KeyValueStore>,
    pub media: Arc<dyn MediaElement>,
    pub object_urls: Arc<dyn ObjectUrlRegistry>,
    pub clock: Arc<dyn Clock>,
    /// Absent on hosts without a folder picker; scans then fail with
    /// `CapabilityMissing`.
    pub directory_picker: Option<Arc<dyn DirectoryPicker>>,
    /// Required only when mirroring is configured.
    pub documents: Option<Arc<dyn DocumentCollection>>,
}

impl CoreDependencies {
    /// Construct a dependency bundle from the mandatory bridge handles.
    pub fn new(
        storage: Arc<dyn KeyValueStore>,
        media: Arc<dyn MediaElement>,
        object_urls: Arc<dyn ObjectUrlRegistry>,
    ) -> Self {
        Self {
            storage,
            media,
            object_urls,
            clock: Arc::new(SystemClock),
            directory_picker: None,
            documents: None,
        }
    }

    pub fn builder() -> CoreDependenciesBuilder {
        CoreDependenciesBuilder::default()
    }

    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    pub fn with_directory_picker(mut self, picker: Arc<dyn DirectoryPicker>) -> Self {
        self.directory_picker = Some(picker);
        self
    }

    pub fn with_documents(mut self, documents: Arc<dyn DocumentCollection>) -> Self {
        self.documents = Some(documents);
        self
    }
}

impl std::fmt::Debug for CoreDependencies {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CoreDependencies")
            .field("directory_picker", &self.directory_picker.is_some())
            .field("documents", &self.documents.is_some())
            .finish_non_exhaustive()
    }
}

#[cfg(all(feature = "wasm", target_arch = "wasm32"))]
impl From<&bridge_wasm::BrowserBridgeSet> for CoreDependencies {
    fn from(set: &bridge_wasm::BrowserBridgeSet) -> Self {
        Self {
            storage: set.storage.clone(),
            media: set.media_element(),
            object_urls: set.object_urls(),
            clock: Arc::new(SystemClock),
            directory_picker: set.directory_picker.clone(),
            documents: None,
        }
    }
}

/// Builder for [`CoreDependencies`].
///
/// The media element is always host-provided. Storage and object URLs fall
/// back to platform defaults when available.
#[derive(Default)]
pub struct CoreDependenciesBuilder {
    storage: Option<Arc<dyn KeyValueStore>>,
    media: Option<Arc<dyn MediaElement>>,
    object_urls: Option<Arc<dyn ObjectUrlRegistry>>,
    clock: Option<Arc<dyn Clock>>,
    directory_picker: Option<Arc<dyn DirectoryPicker>>,
    documents: Option<Arc<dyn DocumentCollection>>,
}

impl CoreDependenciesBuilder {
    pub fn storage(mut self, storage: Arc<dyn KeyValueStore>) -> Self {
        self.storage = Some(storage);
        self
    }

    pub fn media(mut self, media: Arc<dyn MediaElement>) -> Self {
        self.media = Some(media);
        self
    }

    pub fn object_urls(mut self, object_urls: Arc<dyn ObjectUrlRegistry>) -> Self {
        self.object_urls = Some(object_urls);
        self
    }

    pub fn clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = Some(clock);
        self
    }

    pub fn directory_picker(mut self, picker: Arc<dyn DirectoryPicker>) -> Self {
        self.directory_picker = Some(picker);
        self
    }

    pub fn documents(mut self, documents: Arc<dyn DocumentCollection>) -> Self {
        self.documents = Some(documents);
        self
    }

    pub fn build(self) -> Result<CoreDependencies> {
        let media = self.media.ok_or_else(media_missing_error)?;

        let storage = match self.storage {
            Some(storage) => storage,
            None => provide_default_storage()?,
        };

        let object_urls = match self.object_urls {
            Some(object_urls) => object_urls,
            None => provide_default_object_urls()?,
        };

        Ok(CoreDependencies {
            storage,
            media,
            object_urls,
            clock: self.clock.unwrap_or_else(|| Arc::new(SystemClock)),
            directory_picker: self.directory_picker,
            documents: self.documents,
        })
    }
}

fn media_missing_error() -> CoreError {
    CoreError::CapabilityMissing {
        capability: "MediaElement".to_string(),
        message: "MediaElement implementation is required for playback. \
                 Web: pass the page's <audio> element through bridge-wasm. \
                 Desktop: inject a native audio backend."
            .to_string(),
    }
}

#[cfg(not(all(feature = "desktop-shims", not(target_arch = "wasm32"))))]
fn provide_default_storage() -> Result<Arc<dyn KeyValueStore>> {
    Err(CoreError::CapabilityMissing {
        capability: "KeyValueStore".to_string(),
        message: "KeyValueStore implementation is required for playlist persistence. \
                 Desktop: enable the 'desktop-shims' feature to use the default SqliteKeyValueStore. \
                 Web: inject the localStorage-backed store from bridge-wasm."
            .to_string(),
    })
}

#[cfg(not(all(feature = "desktop-shims", not(target_arch = "wasm32"))))]
fn provide_default_object_urls() -> Result<Arc<dyn ObjectUrlRegistry>> {
    Err(CoreError::CapabilityMissing {
        capability: "ObjectUrlRegistry".to_string(),
        message: "ObjectUrlRegistry implementation is required to play picked files. \
                 Web: inject the BlobUrlRegistry from bridge-wasm."
            .to_string(),
    })
}

#[cfg(all(feature = "desktop-shims", not(target_arch = "wasm32")))]
fn provide_default_object_urls() -> Result<Arc<dyn ObjectUrlRegistry>> {
    use bridge_desktop::SessionObjectUrlRegistry;

    let registry: Arc<dyn ObjectUrlRegistry> = Arc::new(SessionObjectUrlRegistry::new());
    Ok(registry)
}

#[cfg(all(feature = "desktop-shims", not(target_arch = "wasm32")))]
fn provide_default_storage() -> Result<Arc<dyn KeyValueStore>> {
    use bridge_desktop::SqliteKeyValueStore;
    use std::path::PathBuf;
    use std::thread;
    use tokio::runtime::{Builder, Handle};

    let path = SqliteKeyValueStore::default_path();

    let init_store = |path: PathBuf| -> Result<SqliteKeyValueStore> {
        let runtime = Builder::new_current_thread()
            .enable_all()
            .build()
            .map_err(|e| {
                CoreError::InitializationFailed(format!(
                    "Failed to create Tokio runtime for default storage: {}",
                    e
                ))
            })?;

        runtime.block_on(SqliteKeyValueStore::new(path)).map_err(|e| {
            CoreError::InitializationFailed(format!("Failed to initialize default storage: {}", e))
        })
    };

    // block_on panics inside a runtime, so initialize on a fresh thread there
    let store = match Handle::try_current() {
        Ok(_) => thread::spawn(move || init_store(path))
            .join()
            .map_err(|_| {
                CoreError::InitializationFailed(
                    "Worker thread panicked while creating default storage".to_string(),
                )
            })??,
        Err(_) => init_store(path)?,
    };

    let store: Arc<dyn KeyValueStore> = Arc::new(store);
    Ok(store)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builder_requires_media() {
        let result = CoreDependencies::builder().build();
        match result {
            Err(CoreError::CapabilityMissing { capability, .. }) => {
                assert_eq!(capability, "MediaElement")
            }
            other => panic!("expected CapabilityMissing, got {:?}", other.map(|_| ())),
        }
    }
}
