//! # Playback Error Types

use thiserror::Error;

/// Errors that can occur during playback operations.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum PlaybackError {
    /// Playback could not start: nothing usable is loaded, or the media
    /// element rejected the request (autoplay policy, decode failure).
    #[error("Playback refused: {0}")]
    Refused(String),

    /// The track being loaded has no playable reference.
    #[error("Track has no playable source: {0}")]
    NoSource(String),
}

impl PlaybackError {
    /// Returns `true` if retrying the same command later may succeed.
    pub fn is_transient(&self) -> bool {
        matches!(self, PlaybackError::Refused(_))
    }
}

/// Result type for playback operations.
pub type Result<T> = std::result::Result<T, PlaybackError>;
