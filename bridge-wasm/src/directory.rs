//! File System Access API (`showDirectoryPicker`) bridge.
//!
//! `web-sys` does not cover the directory handle iteration protocol, so the
//! handles are driven through `js_sys::Reflect`.

use std::sync::Arc;

use async_trait::async_trait;
use bridge_traits::{
    error::{BridgeError, Result as BridgeResult},
    source::{DirectoryEntry, DirectoryHandle, DirectoryPicker},
};
use js_sys::{Array, Function, Object, Promise, Reflect};
use tracing::{debug, warn};
use wasm_bindgen::{JsCast, JsValue};
use wasm_bindgen_futures::JsFuture;

use crate::error::js_error;
use crate::object_urls::BlobUrlRegistry;

fn get(target: &JsValue, key: &str) -> BridgeResult<JsValue> {
    Reflect::get(target, &JsValue::from_str(key)).map_err(|err| js_error(key, err))
}

async fn call_async(target: &JsValue, method: &str, args: &Array) -> BridgeResult<JsValue> {
    let function: Function = get(target, method)?
        .dyn_into()
        .map_err(|_| BridgeError::NotAvailable(method.to_string()))?;
    let result = function
        .apply(target, args)
        .map_err(|err| js_error(method, err))?;

    match result.dyn_into::<Promise>() {
        Ok(promise) => JsFuture::from(promise)
            .await
            .map_err(|err| js_error(method, err)),
        Err(value) => Ok(value),
    }
}

/// Folder picker backed by `window.showDirectoryPicker`.
///
/// Files found while listing are registered with the shared
/// [`BlobUrlRegistry`] so accepted ones can be turned into `blob:` URLs.
pub struct BrowserDirectoryPicker {
    registry: Arc<BlobUrlRegistry>,
}

impl BrowserDirectoryPicker {
    /// Picker registering listed files with `registry`.
    pub fn new(registry: Arc<BlobUrlRegistry>) -> Self {
        Self { registry }
    }

    /// Whether the browser exposes `showDirectoryPicker`.
    pub fn is_supported() -> bool {
        web_sys::window()
            .map(|window| {
                get(&window.into(), "showDirectoryPicker")
                    .map(|f| f.is_function())
                    .unwrap_or(false)
            })
            .unwrap_or(false)
    }
}

#[async_trait(?Send)]
impl DirectoryPicker for BrowserDirectoryPicker {
    async fn pick_directory(&self) -> BridgeResult<Box<dyn DirectoryHandle>> {
        let window: JsValue = web_sys::window()
            .ok_or_else(|| BridgeError::NotAvailable("window".into()))?
            .into();

        let options = Object::new();
        Reflect::set(&options, &"mode".into(), &"read".into())
            .map_err(|err| js_error("picker options", err))?;

        let handle = call_async(&window, "showDirectoryPicker", &Array::of1(&options)).await?;
        Ok(Box::new(BrowserDirectoryHandle {
            handle,
            registry: self.registry.clone(),
        }))
    }
}

/// A `FileSystemDirectoryHandle`.
pub struct BrowserDirectoryHandle {
    handle: JsValue,
    registry: Arc<BlobUrlRegistry>,
}

impl BrowserDirectoryHandle {
    async fn file_entry(&self, entry: &JsValue) -> BridgeResult<DirectoryEntry> {
        let file: web_sys::File = call_async(entry, "getFile", &Array::new())
            .await?
            .dyn_into()
            .map_err(|_| BridgeError::OperationFailed("getFile did not return a File".into()))?;
        Ok(DirectoryEntry::File(self.registry.register_file(file)))
    }
}

#[async_trait(?Send)]
impl DirectoryHandle for BrowserDirectoryHandle {
    fn name(&self) -> String {
        get(&self.handle, "name")
            .ok()
            .and_then(|name| name.as_string())
            .unwrap_or_default()
    }

    async fn entries(&self) -> BridgeResult<Vec<DirectoryEntry>> {
        let iterator = call_async(&self.handle, "values", &Array::new()).await?;
        let mut entries = Vec::new();

        loop {
            let step = call_async(&iterator, "next", &Array::new()).await?;
            if get(&step, "done")?.as_bool().unwrap_or(true) {
                break;
            }

            let entry = get(&step, "value")?;
            match get(&entry, "kind")?.as_string().as_deref() {
                Some("file") => match self.file_entry(&entry).await {
                    Ok(file) => entries.push(file),
                    Err(err) => warn!(error = %err, "Skipping unreadable file"),
                },
                Some("directory") => entries.push(DirectoryEntry::Directory(Box::new(
                    BrowserDirectoryHandle {
                        handle: entry,
                        registry: self.registry.clone(),
                    },
                ))),
                _ => {}
            }
        }

        debug!(directory = %self.name(), count = entries.len(), "Listed directory");
        Ok(entries)
    }
}
