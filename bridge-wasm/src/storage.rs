//! `localStorage`-backed key-value store.
//!
//! Keys are stored verbatim unless a namespace is given, so a default store
//! reads and writes the same slots (`musicPlayerPlaylist`,
//! `musicPlayerCurrentIndex`) as earlier versions of the player.

use async_trait::async_trait;
use bridge_traits::{
    error::{BridgeError, Result as BridgeResult},
    storage::KeyValueStore,
};

use crate::error::js_error;

pub(crate) fn local_storage() -> BridgeResult<web_sys::Storage> {
    let window = web_sys::window().ok_or_else(|| BridgeError::NotAvailable("window".into()))?;
    window
        .local_storage()
        .map_err(|err| js_error("localStorage", err))?
        .ok_or_else(|| BridgeError::NotAvailable("localStorage".into()))
}

#[derive(Clone)]
/// Browser-backed key-value store.
pub struct LocalStorageStore {
    storage: web_sys::Storage,
    namespace: Option<String>,
}

impl LocalStorageStore {
    /// Store writing keys verbatim.
    pub fn new() -> BridgeResult<Self> {
        Ok(Self {
            storage: local_storage()?,
            namespace: None,
        })
    }

    /// Store prefixing every key with `<namespace>::`.
    pub fn namespaced(namespace: impl Into<String>) -> BridgeResult<Self> {
        Ok(Self {
            storage: local_storage()?,
            namespace: Some(namespace.into()),
        })
    }

    fn key_for(&self, key: &str) -> String {
        match &self.namespace {
            Some(namespace) => format!("{namespace}::{key}"),
            None => key.to_string(),
        }
    }
}

#[async_trait(?Send)]
impl KeyValueStore for LocalStorageStore {
    async fn get_string(&self, key: &str) -> BridgeResult<Option<String>> {
        self.storage
            .get_item(&self.key_for(key))
            .map_err(|err| js_error("getItem", err))
    }

    async fn set_string(&self, key: &str, value: &str) -> BridgeResult<()> {
        self.storage
            .set_item(&self.key_for(key), value)
            .map_err(|err| js_error("setItem", err))
    }

    async fn delete(&self, key: &str) -> BridgeResult<()> {
        self.storage
            .remove_item(&self.key_for(key))
            .map_err(|err| js_error("removeItem", err))
    }
}
