//! Ingestion sources: file descriptors, transient object URLs and directory
//! traversal.
//!
//! Both manual file selection and folder scans reduce to a stream of
//! [`FileDescriptor`]s. The core decides what to accept; the host only
//! describes what it has and, once a file is accepted, mints a transient
//! playable reference for it through an [`ObjectUrlRegistry`].

use serde::{Deserialize, Serialize};

use crate::{error::Result, platform::PlatformSendSync};

/// Prefix of session-scoped object URLs (`URL.createObjectURL` in browsers).
pub const TRANSIENT_URL_PREFIX: &str = "blob:";

/// Description of a candidate audio file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileDescriptor {
    /// File name including extension.
    pub name: String,
    /// MIME type reported by the host (may be empty when unknown).
    pub mime_type: String,
    /// Size in bytes.
    pub size: u64,
    /// Host-specific handle used to mint an object URL later (a registry key
    /// in the browser, a filesystem path on desktop).
    pub locator: String,
}

impl FileDescriptor {
    pub fn new(
        name: impl Into<String>,
        mime_type: impl Into<String>,
        size: u64,
        locator: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            mime_type: mime_type.into(),
            size,
            locator: locator.into(),
        }
    }

    /// Whether the host reports an `audio/*` MIME type.
    pub fn is_audio(&self) -> bool {
        self.mime_type.starts_with("audio/")
    }
}

/// Mints and releases session-scoped playable references.
pub trait ObjectUrlRegistry: PlatformSendSync {
    /// Create a transient reference (`blob:...`) for an accepted file.
    fn create_object_url(&self, file: &FileDescriptor) -> Result<String>;

    /// Release a reference previously returned by `create_object_url`.
    /// Unknown references are ignored.
    fn revoke_object_url(&self, url: &str);
}

/// Entry yielded while listing a directory.
pub enum DirectoryEntry {
    File(FileDescriptor),
    Directory(Box<dyn DirectoryHandle>),
}

impl std::fmt::Debug for DirectoryEntry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            DirectoryEntry::File(file) => f.debug_tuple("File").field(&file.name).finish(),
            DirectoryEntry::Directory(dir) => f.debug_tuple("Directory").field(&dir.name()).finish(),
        }
    }
}

/// A directory the user granted read access to.
#[cfg_attr(target_arch = "wasm32", async_trait::async_trait(?Send))]
#[cfg_attr(not(target_arch = "wasm32"), async_trait::async_trait)]
pub trait DirectoryHandle: PlatformSendSync {
    /// Display name of the directory.
    fn name(&self) -> String;

    /// List the direct children of this directory.
    async fn entries(&self) -> Result<Vec<DirectoryEntry>>;
}

/// Host folder picker (`showDirectoryPicker` in browsers).
///
/// A dismissed picker must be reported as
/// [`BridgeError::Cancelled`](crate::error::BridgeError::Cancelled).
#[cfg_attr(target_arch = "wasm32", async_trait::async_trait(?Send))]
#[cfg_attr(not(target_arch = "wasm32"), async_trait::async_trait)]
pub trait DirectoryPicker: PlatformSendSync {
    async fn pick_directory(&self) -> Result<Box<dyn DirectoryHandle>>;
}
