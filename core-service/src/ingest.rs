//! Input validation and folder traversal for local files.

use bridge_traits::{
    error::BridgeError,
    source::{DirectoryEntry, DirectoryHandle, FileDescriptor},
};
use core_playlist::models::TrackId;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::error::{CoreError, Result};

/// Accept `file` only when it is audio-typed and strictly smaller than
/// `max_bytes`.
pub fn check_file(file: &FileDescriptor, max_bytes: u64) -> Result<()> {
    if !file.is_audio() {
        return Err(CoreError::RejectedInput {
            name: file.name.clone(),
            reason: format!("File \"{}\" is not an audio file.", file.name),
        });
    }

    if file.size >= max_bytes {
        return Err(CoreError::RejectedInput {
            name: file.name.clone(),
            reason: format!(
                "File \"{}\" is too large. Maximum size is {}MB.",
                file.name,
                max_bytes / (1024 * 1024)
            ),
        });
    }

    Ok(())
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RejectedFile {
    pub name: String,
    pub reason: String,
}

/// Result of a manual multi-file upload.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IngestReport {
    pub accepted: Vec<TrackId>,
    pub rejected: Vec<RejectedFile>,
}

impl IngestReport {
    pub fn accepted_count(&self) -> usize {
        self.accepted.len()
    }
}

/// How a folder scan ended.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum ScanOutcome {
    /// `loaded` of the `found` audio files were new and added.
    Loaded { found: usize, loaded: usize },
    /// Audio files were found but all of them were already in the playlist.
    NoNewFiles { found: usize },
    NoAudioFiles,
    /// The user dismissed the picker.
    Cancelled,
    Failed { message: String },
}

impl ScanOutcome {
    pub fn loaded(&self) -> usize {
        match self {
            ScanOutcome::Loaded { loaded, .. } => *loaded,
            _ => 0,
        }
    }
}

/// Collect the audio files below `root`, depth-first in listing order.
///
/// `max_depth` counts the root as level 1. Non-audio and oversize files are
/// skipped silently. Subdirectories that cannot be listed are logged and
/// skipped; failing to list the root is an error.
pub async fn collect_audio_files(
    root: &dyn DirectoryHandle,
    max_depth: usize,
    max_bytes: u64,
) -> std::result::Result<Vec<FileDescriptor>, BridgeError> {
    let mut found = Vec::new();
    if max_depth == 0 {
        return Ok(found);
    }

    let mut stack: Vec<(std::vec::IntoIter<DirectoryEntry>, usize)> =
        vec![(root.entries().await?.into_iter(), 1)];

    while let Some((mut entries, depth)) = stack.pop() {
        let Some(entry) = entries.next() else {
            continue;
        };
        stack.push((entries, depth));

        match entry {
            DirectoryEntry::File(file) => {
                if check_file(&file, max_bytes).is_ok() {
                    found.push(file);
                } else {
                    debug!(file = %file.name, "Skipping non-audio or oversize file");
                }
            }
            DirectoryEntry::Directory(dir) if depth < max_depth => match dir.entries().await {
                Ok(children) => stack.push((children.into_iter(), depth + 1)),
                Err(e) => {
                    warn!(directory = %dir.name(), error = %e, "Skipping unreadable directory")
                }
            },
            DirectoryEntry::Directory(dir) => {
                debug!(directory = %dir.name(), "Directory below scan depth");
            }
        }
    }

    Ok(found)
}
