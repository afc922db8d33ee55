use bridge_traits::error::BridgeError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum PlaylistError {
    #[error("Index {index} out of range for playlist of {len} tracks")]
    IndexOutOfRange { index: usize, len: usize },

    #[error("Failed to persist playlist: {0}")]
    Persistence(String),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl PlaylistError {
    /// Storage was full. The in-memory playlist is still valid.
    pub fn is_quota_exceeded(&self) -> bool {
        matches!(self, PlaylistError::Persistence(msg) if msg.starts_with("Storage quota exceeded"))
    }
}

impl From<BridgeError> for PlaylistError {
    fn from(err: BridgeError) -> Self {
        match err {
            BridgeError::QuotaExceeded(msg) => {
                PlaylistError::Persistence(format!("Storage quota exceeded: {}", msg))
            }
            other => PlaylistError::Persistence(other.to_string()),
        }
    }
}

pub type Result<T> = std::result::Result<T, PlaylistError>;
