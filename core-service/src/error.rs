use bridge_traits::error::BridgeError;
use core_playback::PlaybackError;
use core_playlist::PlaylistError;
use core_sync::SyncError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum CoreError {
    #[error("Core initialization failed: {0}")]
    InitializationFailed(String),

    #[error("Capability missing: {capability} - {message}")]
    CapabilityMissing { capability: String, message: String },

    /// An ingested file was refused; `reason` is meant for the user.
    #[error("{reason}")]
    RejectedInput { name: String, reason: String },

    #[error("Persistence failed: {0}")]
    PersistenceFailure(String),

    #[error("Failed to sync \"{title}\" to cloud: {message}")]
    MirrorFailure { title: String, message: String },

    #[error("Remote mirror is not configured")]
    MirrorNotConfigured,

    #[error("Playback refused: {0}")]
    PlaybackRefused(String),

    #[error("Index {index} is out of range for a playlist of {len} tracks")]
    IndexOutOfRange { index: usize, len: usize },

    #[error("Playlist is empty")]
    EmptyPlaylist,

    #[error("Operation cancelled by user")]
    UserCancelled,

    #[error("Bridge error: {0}")]
    Bridge(BridgeError),
}

impl CoreError {
    /// Whether the error carries a message the UI should show as-is.
    pub fn is_user_visible(&self) -> bool {
        matches!(
            self,
            CoreError::RejectedInput { .. }
                | CoreError::MirrorFailure { .. }
                | CoreError::MirrorNotConfigured
                | CoreError::EmptyPlaylist
                | CoreError::PlaybackRefused(_)
        )
    }
}

impl From<BridgeError> for CoreError {
    fn from(err: BridgeError) -> Self {
        match err {
            BridgeError::Cancelled => CoreError::UserCancelled,
            other => CoreError::Bridge(other),
        }
    }
}

impl From<PlaylistError> for CoreError {
    fn from(err: PlaylistError) -> Self {
        match err {
            PlaylistError::IndexOutOfRange { index, len } => {
                CoreError::IndexOutOfRange { index, len }
            }
            other => CoreError::PersistenceFailure(other.to_string()),
        }
    }
}

impl From<PlaybackError> for CoreError {
    fn from(err: PlaybackError) -> Self {
        match err {
            PlaybackError::Refused(reason) | PlaybackError::NoSource(reason) => {
                CoreError::PlaybackRefused(reason)
            }
        }
    }
}

impl From<SyncError> for CoreError {
    fn from(err: SyncError) -> Self {
        match err {
            SyncError::NotConfigured => CoreError::MirrorNotConfigured,
            SyncError::MirrorFailure { title, message } => {
                CoreError::MirrorFailure { title, message }
            }
            SyncError::Bridge(err) => CoreError::from(err),
        }
    }
}

impl From<core_runtime::Error> for CoreError {
    fn from(err: core_runtime::Error) -> Self {
        CoreError::InitializationFailed(err.to_string())
    }
}

pub type Result<T> = std::result::Result<T, CoreError>;
