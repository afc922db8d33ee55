//! Playback state types.

use serde::{Deserialize, Serialize};

/// Status of the media element.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum PlaybackStatus {
    /// Nothing is loaded.
    Stopped,
    Paused,
    Playing,
    /// The current source failed. Cleared by the next load.
    Errored { message: String },
}

impl PlaybackStatus {
    pub fn is_playing(&self) -> bool {
        matches!(self, PlaybackStatus::Playing)
    }

    pub fn is_errored(&self) -> bool {
        matches!(self, PlaybackStatus::Errored { .. })
    }
}

/// Observable playback state.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlaybackState {
    pub status: PlaybackStatus,
    pub position_seconds: f64,
    /// `None` until metadata for the current source arrives.
    pub duration_seconds: Option<f64>,
    pub volume_percent: u8,
    pub repeat_all_enabled: bool,
    pub is_dragging: bool,
}

impl PlaybackState {
    pub fn new(volume_percent: u8) -> Self {
        Self {
            status: PlaybackStatus::Stopped,
            position_seconds: 0.0,
            duration_seconds: None,
            volume_percent: volume_percent.min(100),
            repeat_all_enabled: false,
            is_dragging: false,
        }
    }

    pub(crate) fn reset_progress(&mut self) {
        self.position_seconds = 0.0;
        self.duration_seconds = None;
        self.is_dragging = false;
    }
}

/// Where to seek.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum SeekTarget {
    /// Fraction of the duration, `0.0..=1.0`.
    Fraction(f64),
    /// Absolute position in seconds.
    Seconds(f64),
}

/// A throttled progress report.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProgressUpdate {
    pub position_seconds: f64,
    pub duration_seconds: Option<f64>,
    pub percent: f64,
    /// `m:ss` rendering of the position.
    pub position_label: String,
    /// `m:ss` rendering of the duration (`0:00` when unknown).
    pub duration_label: String,
}

/// What a media signal did to the controller.
#[derive(Debug, Clone, PartialEq)]
pub enum SignalOutcome {
    /// Duration captured (if the element reported a usable one).
    MetadataReady { duration_seconds: Option<f64> },
    /// Position updated; `Some` when a report is due.
    Progress(Option<ProgressUpdate>),
    /// The source played to its end. `was_playing` tells whether playback
    /// was active, i.e. whether the next track should auto-play.
    Ended { was_playing: bool },
    /// A new load began; progress was reset.
    Reset,
    /// The source failed and the controller is now errored.
    Failed { message: String },
}
