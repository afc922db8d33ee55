//! # Player Configuration
//!
//! Tunables for the playlist core, assembled with a builder and validated
//! before anything else is constructed.
//!
//! ## Overview
//!
//! [`PlayerConfig`] holds only plain settings. Platform collaborators (storage,
//! media element, remote collection) are injected separately when the
//! coordinator is built, so one config can be reused across hosts.
//!
//! Remote mirroring is an explicit setting: it is enabled exactly when
//! [`MirrorSettings`] are present. The coordinator refuses to start when
//! mirroring is enabled but no remote collection was injected.
//!
//! ## Usage
//!
//! ```
//! use core_runtime::config::{MirrorSettings, PlayerConfig};
//!
//! let config = PlayerConfig::builder()
//!     .initial_volume(70)
//!     .mirror(MirrorSettings::default())
//!     .build()
//!     .expect("valid config");
//!
//! assert!(config.mirror_enabled());
//! assert_eq!(config.max_upload_bytes, 50 * 1024 * 1024);
//! ```
//!
//! ## Error Handling
//!
//! Out-of-range values fail at `build()` with [`Error::Config`]:
//!
//! ```should_panic
//! use core_runtime::config::PlayerConfig;
//!
//! PlayerConfig::builder()
//!     .initial_volume(150)
//!     .build()
//!     .expect("volume above 100 is rejected");
//! ```

use crate::error::{Error, Result};
use crate::events::DEFAULT_EVENT_BUFFER_SIZE;
use serde::{Deserialize, Serialize};

/// Largest file accepted for ingestion (50 MiB).
pub const DEFAULT_MAX_UPLOAD_BYTES: u64 = 50 * 1024 * 1024;

/// Root directory plus one level of subdirectories.
pub const DEFAULT_SCAN_MAX_DEPTH: usize = 2;

pub const DEFAULT_PROGRESS_INTERVAL_MS: u64 = 100;

pub const DEFAULT_INITIAL_VOLUME: u8 = 50;

/// Delay before the empty-playlist hint is shown.
pub const DEFAULT_EMPTY_HINT_DELAY_MS: u64 = 1500;

pub const DEFAULT_PLAYLIST_KEY: &str = "musicPlayerPlaylist";
pub const DEFAULT_CURSOR_INDEX_KEY: &str = "musicPlayerCurrentIndex";
pub const DEFAULT_MIRROR_COLLECTION: &str = "songs";

const MAX_SCAN_DEPTH: usize = 16;
const MAX_PROGRESS_INTERVAL_MS: u64 = 10_000;

/// Names of the two durable storage slots.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StorageKeys {
    /// Slot holding the serialized playlist snapshot.
    pub playlist: String,
    /// Slot holding the raw cursor index.
    pub cursor_index: String,
}

impl Default for StorageKeys {
    fn default() -> Self {
        Self {
            playlist: DEFAULT_PLAYLIST_KEY.to_string(),
            cursor_index: DEFAULT_CURSOR_INDEX_KEY.to_string(),
        }
    }
}

/// Remote mirror settings. Presence enables mirroring.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MirrorSettings {
    /// Name of the remote document collection.
    pub collection: String,
}

impl Default for MirrorSettings {
    fn default() -> Self {
        Self {
            collection: DEFAULT_MIRROR_COLLECTION.to_string(),
        }
    }
}

impl MirrorSettings {
    pub fn new(collection: impl Into<String>) -> Self {
        Self {
            collection: collection.into(),
        }
    }
}

/// Settings for the playlist core. Build with [`PlayerConfig::builder`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlayerConfig {
    /// Files must be strictly smaller than this to be ingested.
    pub max_upload_bytes: u64,

    /// Directory levels visited by a folder scan, counting the picked root.
    pub scan_max_depth: usize,

    /// Minimum spacing between progress reports.
    pub progress_interval_ms: u64,

    /// Volume applied at bootstrap, in percent.
    pub initial_volume: u8,

    /// Deferred-delivery hint attached to the empty-playlist notification.
    pub empty_hint_delay_ms: u64,

    pub storage_keys: StorageKeys,

    /// Per-subscriber buffer of the event bus.
    pub event_buffer_size: usize,

    /// `None` disables remote mirroring.
    pub mirror: Option<MirrorSettings>,
}

impl Default for PlayerConfig {
    fn default() -> Self {
        Self {
            max_upload_bytes: DEFAULT_MAX_UPLOAD_BYTES,
            scan_max_depth: DEFAULT_SCAN_MAX_DEPTH,
            progress_interval_ms: DEFAULT_PROGRESS_INTERVAL_MS,
            initial_volume: DEFAULT_INITIAL_VOLUME,
            empty_hint_delay_ms: DEFAULT_EMPTY_HINT_DELAY_MS,
            storage_keys: StorageKeys::default(),
            event_buffer_size: DEFAULT_EVENT_BUFFER_SIZE,
            mirror: None,
        }
    }
}

impl PlayerConfig {
    pub fn builder() -> PlayerConfigBuilder {
        PlayerConfigBuilder::default()
    }

    /// Whether remote mirroring is configured.
    pub fn mirror_enabled(&self) -> bool {
        self.mirror.is_some()
    }

    /// Validates the configuration.
    ///
    /// This checks:
    /// - Upload ceiling is non-zero
    /// - Scan depth is between 1 and 16
    /// - Progress interval is between 1ms and 10s
    /// - Initial volume is a percentage
    /// - Storage keys are non-empty and distinct
    /// - Event buffer is non-zero
    /// - Mirror collection name is non-empty
    pub fn validate(&self) -> Result<()> {
        if self.max_upload_bytes == 0 {
            return Err(Error::Config(
                "Upload size limit must be greater than 0 bytes".to_string(),
            ));
        }

        if self.scan_max_depth == 0 || self.scan_max_depth > MAX_SCAN_DEPTH {
            return Err(Error::Config(format!(
                "Scan depth must be between 1 and {}, got {}",
                MAX_SCAN_DEPTH, self.scan_max_depth
            )));
        }

        if self.progress_interval_ms == 0 || self.progress_interval_ms > MAX_PROGRESS_INTERVAL_MS
        {
            return Err(Error::Config(format!(
                "Progress interval must be between 1 and {}ms, got {}ms",
                MAX_PROGRESS_INTERVAL_MS, self.progress_interval_ms
            )));
        }

        if self.initial_volume > 100 {
            return Err(Error::Config(format!(
                "Initial volume must be a percentage (0-100), got {}",
                self.initial_volume
            )));
        }

        if self.storage_keys.playlist.trim().is_empty()
            || self.storage_keys.cursor_index.trim().is_empty()
        {
            return Err(Error::Config("Storage keys cannot be empty".to_string()));
        }

        if self.storage_keys.playlist == self.storage_keys.cursor_index {
            return Err(Error::Config(
                "Playlist and cursor index must use different storage keys".to_string(),
            ));
        }

        if self.event_buffer_size == 0 {
            return Err(Error::Config(
                "Event buffer size must be greater than 0".to_string(),
            ));
        }

        if let Some(mirror) = &self.mirror {
            if mirror.collection.trim().is_empty() {
                return Err(Error::Config(
                    "Mirror collection name cannot be empty. \
                     Remove the mirror settings to disable cloud sync."
                        .to_string(),
                ));
            }
        }

        Ok(())
    }
}

/// Builder for [`PlayerConfig`]. Unset values fall back to the defaults.
#[derive(Debug, Default)]
pub struct PlayerConfigBuilder {
    max_upload_bytes: Option<u64>,
    scan_max_depth: Option<usize>,
    progress_interval_ms: Option<u64>,
    initial_volume: Option<u8>,
    empty_hint_delay_ms: Option<u64>,
    storage_keys: Option<StorageKeys>,
    event_buffer_size: Option<usize>,
    mirror: Option<MirrorSettings>,
}

impl PlayerConfigBuilder {
    pub fn max_upload_bytes(mut self, bytes: u64) -> Self {
        self.max_upload_bytes = Some(bytes);
        self
    }

    pub fn scan_max_depth(mut self, depth: usize) -> Self {
        self.scan_max_depth = Some(depth);
        self
    }

    pub fn progress_interval_ms(mut self, interval_ms: u64) -> Self {
        self.progress_interval_ms = Some(interval_ms);
        self
    }

    pub fn initial_volume(mut self, percent: u8) -> Self {
        self.initial_volume = Some(percent);
        self
    }

    pub fn empty_hint_delay_ms(mut self, delay_ms: u64) -> Self {
        self.empty_hint_delay_ms = Some(delay_ms);
        self
    }

    /// Override both storage slot names.
    pub fn storage_keys(
        mut self,
        playlist: impl Into<String>,
        cursor_index: impl Into<String>,
    ) -> Self {
        self.storage_keys = Some(StorageKeys {
            playlist: playlist.into(),
            cursor_index: cursor_index.into(),
        });
        self
    }

    pub fn event_buffer_size(mut self, size: usize) -> Self {
        self.event_buffer_size = Some(size);
        self
    }

    /// Enable remote mirroring.
    pub fn mirror(mut self, settings: MirrorSettings) -> Self {
        self.mirror = Some(settings);
        self
    }

    /// Builds and validates the configuration.
    pub fn build(self) -> Result<PlayerConfig> {
        let defaults = PlayerConfig::default();

        let config = PlayerConfig {
            max_upload_bytes: self.max_upload_bytes.unwrap_or(defaults.max_upload_bytes),
            scan_max_depth: self.scan_max_depth.unwrap_or(defaults.scan_max_depth),
            progress_interval_ms: self
                .progress_interval_ms
                .unwrap_or(defaults.progress_interval_ms),
            initial_volume: self.initial_volume.unwrap_or(defaults.initial_volume),
            empty_hint_delay_ms: self
                .empty_hint_delay_ms
                .unwrap_or(defaults.empty_hint_delay_ms),
            storage_keys: self.storage_keys.unwrap_or(defaults.storage_keys),
            event_buffer_size: self.event_buffer_size.unwrap_or(defaults.event_buffer_size),
            mirror: self.mirror,
        };

        config.validate()?;

        Ok(config)
    }
}
