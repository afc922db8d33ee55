use bridge_traits::error::BridgeError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum SyncError {
    /// Mirroring was not configured for this session.
    #[error("Remote mirror is not configured")]
    NotConfigured,

    #[error("Failed to mirror \"{title}\": {message}")]
    MirrorFailure { title: String, message: String },

    #[error("Remote collection error: {0}")]
    Bridge(#[from] BridgeError),
}

impl SyncError {
    pub fn mirror_failure(title: impl Into<String>, message: impl ToString) -> Self {
        SyncError::MirrorFailure {
            title: title.into(),
            message: message.to_string(),
        }
    }
}

pub type Result<T> = std::result::Result<T, SyncError>;
