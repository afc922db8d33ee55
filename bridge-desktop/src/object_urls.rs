//! Session-scoped object URLs for local files

use bridge_traits::{
    error::{BridgeError, Result},
    source::{FileDescriptor, ObjectUrlRegistry, TRANSIENT_URL_PREFIX},
};
use std::collections::HashMap;
use std::sync::Mutex;
use tracing::debug;
use uuid::Uuid;

/// Maps `blob:` references to local file paths for the lifetime of the
/// process.
#[derive(Debug, Default)]
pub struct SessionObjectUrlRegistry {
    urls: Mutex<HashMap<String, String>>,
}

impl SessionObjectUrlRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Local path behind a reference, if it is still registered.
    pub fn resolve(&self, url: &str) -> Option<String> {
        self.urls.lock().ok()?.get(url).cloned()
    }

    pub fn len(&self) -> usize {
        self.urls.lock().map(|urls| urls.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl ObjectUrlRegistry for SessionObjectUrlRegistry {
    fn create_object_url(&self, file: &FileDescriptor) -> Result<String> {
        let url = format!("{}session/{}", TRANSIENT_URL_PREFIX, Uuid::new_v4());
        self.urls
            .lock()
            .map_err(|_| BridgeError::OperationFailed("Object URL registry poisoned".to_string()))?
            .insert(url.clone(), file.locator.clone());

        debug!(file = %file.name, url = %url, "Created object URL");
        Ok(url)
    }

    fn revoke_object_url(&self, url: &str) {
        if let Ok(mut urls) = self.urls.lock() {
            if urls.remove(url).is_some() {
                debug!(url = %url, "Revoked object URL");
            }
        }
    }
}
