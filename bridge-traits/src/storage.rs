//! Local durable key-value storage.
//!
//! The playlist core persists exactly two string slots (the serialized
//! snapshot and the raw cursor index). Hosts map them onto whatever durable
//! storage they have:
//! - Web: `window.localStorage`
//! - Desktop: a SQLite-backed table
//! - Tests: an in-memory map
//!
//! Implementations must report a full store with
//! [`BridgeError::QuotaExceeded`](crate::error::BridgeError::QuotaExceeded)
//! so the core can tell storage exhaustion apart from other failures.

use crate::{error::Result, platform::PlatformSendSync};

/// String-keyed durable storage slots.
///
/// # Example
///
/// ```ignore
/// use bridge_traits::storage::KeyValueStore;
///
/// async fn remember_index(store: &dyn KeyValueStore, index: usize) -> Result<()> {
///     store.set_string("musicPlayerCurrentIndex", &index.to_string()).await
/// }
/// ```
#[cfg_attr(target_arch = "wasm32", async_trait::async_trait(?Send))]
#[cfg_attr(not(target_arch = "wasm32"), async_trait::async_trait)]
pub trait KeyValueStore: PlatformSendSync {
    /// Retrieve the value stored under `key`, or `None` when the slot is empty.
    async fn get_string(&self, key: &str) -> Result<Option<String>>;

    /// Store `value` under `key`, replacing any previous value.
    async fn set_string(&self, key: &str, value: &str) -> Result<()>;

    /// Remove the slot. Removing a missing key is not an error.
    async fn delete(&self, key: &str) -> Result<()>;

    /// Check whether a slot currently holds a value.
    async fn has_key(&self, key: &str) -> Result<bool> {
        Ok(self.get_string(key).await?.is_some())
    }
}
