//! Directory traversal using Tokio

use async_trait::async_trait;
use bridge_traits::{
    error::{BridgeError, Result},
    source::{DirectoryEntry, DirectoryHandle, DirectoryPicker, FileDescriptor},
};
use std::path::{Path, PathBuf};
use tokio::fs;
use tracing::debug;

/// MIME type for a file path, derived from its extension.
///
/// Unknown extensions map to `application/octet-stream` so the core treats
/// them as non-audio.
pub fn mime_type_for_path(path: &Path) -> &'static str {
    let extension = path
        .extension()
        .and_then(|ext| ext.to_str())
        .map(str::to_ascii_lowercase);

    match extension.as_deref() {
        Some("mp3") => "audio/mpeg",
        Some("flac") => "audio/flac",
        Some("ogg") | Some("oga") => "audio/ogg",
        Some("opus") => "audio/opus",
        Some("wav") => "audio/wav",
        Some("m4a") | Some("mp4a") => "audio/mp4",
        Some("aac") => "audio/aac",
        Some("weba") => "audio/webm",
        _ => "application/octet-stream",
    }
}

/// Picker that always yields the same root directory.
///
/// Desktop hosts resolve the folder through their own dialog and hand the
/// result to the core through this picker. A picker without a root reports
/// a cancelled selection.
#[derive(Debug, Clone, Default)]
pub struct PathDirectoryPicker {
    root: Option<PathBuf>,
}

impl PathDirectoryPicker {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: Some(root.into()),
        }
    }

    /// A picker whose selection was dismissed.
    pub fn dismissed() -> Self {
        Self { root: None }
    }
}

#[async_trait]
impl DirectoryPicker for PathDirectoryPicker {
    async fn pick_directory(&self) -> Result<Box<dyn DirectoryHandle>> {
        let root = self.root.as_ref().ok_or(BridgeError::Cancelled)?;

        let handle = TokioDirectoryHandle::new(root.clone());
        let metadata = fs::metadata(root).await.map_err(BridgeError::Io)?;
        if !metadata.is_dir() {
            return Err(BridgeError::OperationFailed(format!(
                "{} is not a directory",
                handle.name()
            )));
        }

        debug!(directory = %handle.name(), "Picked directory");
        Ok(Box::new(handle))
    }
}

/// A directory on the local filesystem.
#[derive(Debug, Clone)]
pub struct TokioDirectoryHandle {
    path: PathBuf,
}

impl TokioDirectoryHandle {
    pub fn new(path: PathBuf) -> Self {
        Self { path }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

#[async_trait]
impl DirectoryHandle for TokioDirectoryHandle {
    fn name(&self) -> String {
        self.path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_else(|| self.path.to_string_lossy().into_owned())
    }

    async fn entries(&self) -> Result<Vec<DirectoryEntry>> {
        let mut entries = Vec::new();
        let mut read_dir = fs::read_dir(&self.path).await.map_err(BridgeError::Io)?;

        while let Some(entry) = read_dir.next_entry().await.map_err(BridgeError::Io)? {
            let path = entry.path();
            let file_type = entry.file_type().await.map_err(BridgeError::Io)?;

            if file_type.is_dir() {
                entries.push(DirectoryEntry::Directory(Box::new(Self::new(path))));
            } else if file_type.is_file() {
                let size = entry.metadata().await.map_err(BridgeError::Io)?.len();
                let name = entry.file_name().to_string_lossy().into_owned();
                entries.push(DirectoryEntry::File(FileDescriptor::new(
                    name,
                    mime_type_for_path(&path),
                    size,
                    path.to_string_lossy(),
                )));
            }
        }

        // read_dir order is platform-dependent
        entries.sort_by_key(|entry| match entry {
            DirectoryEntry::File(file) => file.name.clone(),
            DirectoryEntry::Directory(dir) => dir.name(),
        });

        debug!(directory = %self.name(), count = entries.len(), "Listed directory");
        Ok(entries)
    }
}
