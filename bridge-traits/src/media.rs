//! Platform media element abstraction.
//!
//! The core never decodes audio. It drives a single host-provided media
//! element (an `HTMLAudioElement` in the browser) through the narrow surface
//! below and reacts to the signals the element emits. Signals are delivered
//! by the host calling back into the core; this module only defines their
//! shape.

use crate::{error::Result, platform::PlatformSendSync};
use serde::{Deserialize, Serialize};

/// Signals emitted by a media element.
///
/// Mirrors the subset of HTML media events the playlist core reacts to:
/// `loadedmetadata`, `timeupdate`, `ended`, `loadstart` and `error`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "signal", rename_all = "snake_case")]
pub enum MediaSignal {
    /// Metadata (including duration) is available for the current source.
    MetadataReady,
    /// Periodic playback position update. May fire many times per second.
    PositionUpdate,
    /// The current source played through to its end.
    Ended,
    /// The element started loading a new source.
    LoadStart,
    /// The element failed to load or decode the current source.
    Error {
        /// Host-provided description of the failure.
        message: String,
    },
}

impl MediaSignal {
    /// Short lowercase name for logging.
    pub fn name(&self) -> &'static str {
        match self {
            MediaSignal::MetadataReady => "metadata_ready",
            MediaSignal::PositionUpdate => "position_update",
            MediaSignal::Ended => "ended",
            MediaSignal::LoadStart => "load_start",
            MediaSignal::Error { .. } => "error",
        }
    }
}

/// Playback primitive owned exclusively by the playback controller.
///
/// Methods take `&self` because browser media handles use interior
/// mutability; native implementations are expected to do the same.
///
/// `play` is the only asynchronous operation: browsers resolve the returned
/// promise once playback actually starts and reject it when an autoplay
/// policy or decode failure prevents it. Implementations map that rejection
/// to an `Err`.
#[cfg_attr(target_arch = "wasm32", async_trait::async_trait(?Send))]
#[cfg_attr(not(target_arch = "wasm32"), async_trait::async_trait)]
pub trait MediaElement: PlatformSendSync {
    /// Assign the playable reference. An empty string detaches the source.
    fn set_src(&self, src: &str);

    /// Currently assigned playable reference.
    fn src(&self) -> String;

    /// Reset the element and begin loading the current source.
    fn load(&self);

    /// Request playback start.
    async fn play(&self) -> Result<()>;

    /// Pause playback. Must be idempotent.
    fn pause(&self);

    /// Current playback position in seconds.
    fn current_time(&self) -> f64;

    /// Move the playback position, in seconds.
    fn set_current_time(&self, seconds: f64);

    /// Duration of the current source in seconds, or `None` before metadata
    /// is available (or for unbounded streams).
    fn duration(&self) -> Option<f64>;

    /// Output volume in the normalized `0.0..=1.0` range.
    fn volume(&self) -> f64;

    /// Set the output volume in the normalized `0.0..=1.0` range.
    fn set_volume(&self, volume: f64);
}
