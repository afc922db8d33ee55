//! `URL.createObjectURL` bridge.

use std::cell::{Cell, RefCell};
use std::collections::HashMap;

use bridge_traits::{
    error::{BridgeError, Result as BridgeResult},
    source::{FileDescriptor, ObjectUrlRegistry},
};
use tracing::debug;

use crate::error::js_error;

/// Keeps picked `File` objects until the core accepts them and mints
/// `blob:` references.
///
/// Hosts register the files from an `<input type="file">` with
/// [`register_file`](Self::register_file) and pass the returned descriptors
/// to the core.
#[derive(Default)]
pub struct BlobUrlRegistry {
    pending: RefCell<HashMap<String, web_sys::File>>,
    next_id: Cell<u64>,
}

impl BlobUrlRegistry {
    /// Empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a browser file and describe it for ingestion.
    pub fn register_file(&self, file: web_sys::File) -> FileDescriptor {
        let id = self.next_id.get();
        self.next_id.set(id + 1);

        let locator = format!("file-{id}");
        let descriptor = FileDescriptor::new(file.name(), file.type_(), file.size() as u64, &locator);
        self.pending.borrow_mut().insert(locator, file);
        descriptor
    }

    /// Forget files that were registered but never accepted.
    pub fn clear_pending(&self) {
        self.pending.borrow_mut().clear();
    }
}

impl ObjectUrlRegistry for BlobUrlRegistry {
    fn create_object_url(&self, file: &FileDescriptor) -> BridgeResult<String> {
        let blob = self.pending.borrow_mut().remove(&file.locator).ok_or_else(|| {
            BridgeError::OperationFailed(format!("No registered file for {}", file.name))
        })?;

        let url = web_sys::Url::create_object_url_with_blob(&blob)
            .map_err(|err| js_error("createObjectURL", err))?;
        debug!(file = %file.name, "Created object URL");
        Ok(url)
    }

    fn revoke_object_url(&self, url: &str) {
        if web_sys::Url::revoke_object_url(url).is_ok() {
            debug!(url = %url, "Revoked object URL");
        }
    }
}
