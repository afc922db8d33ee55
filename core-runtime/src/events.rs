//! # Event Bus System
//!
//! Typed events broadcast by the playlist core over `tokio::sync::broadcast`.
//!
//! ## Overview
//!
//! The coordinator publishes one event per observable change:
//! - **Playlist**: tracks added/removed, cursor moves, persistence warnings
//! - **Playback**: loads, start/pause, progress, volume
//! - **Mirror**: pull/push results of the optional remote mirror
//! - **Notification**: the single user-visible side channel (toasts)
//!
//! ```text
//! ┌─────────────┐     emit      ┌───────────┐     subscribe    ┌────────────┐
//! │ Coordinator ├──────────────>│ EventBus  ├─────────────────>│     UI     │
//! └─────────────┘               │ (broadcast│                  └────────────┘
//!                               │  channel) │     subscribe    ┌────────────┐
//!                               │           ├─────────────────>│   Logger   │
//!                               └───────────┘                  └────────────┘
//! ```
//!
//! ## Usage
//!
//! ```rust
//! use core_runtime::events::{CoreEvent, EventBus, Notification};
//!
//! # #[tokio::main(flavor = "current_thread")]
//! # async fn main() {
//! let bus = EventBus::new(16);
//! let mut rx = bus.subscribe();
//!
//! bus.emit(CoreEvent::Notification(Notification::info("Hello"))).ok();
//!
//! let event = rx.recv().await.unwrap();
//! assert_eq!(event.description(), "User notification");
//! # }
//! ```
//!
//! ## Error Handling
//!
//! - **`RecvError::Lagged(n)`**: the subscriber missed `n` events and can keep
//!   receiving. Progress events are frequent, so UIs should tolerate this.
//! - **`RecvError::Closed`**: every sender was dropped; the core shut down.
//!
//! `emit` fails when nobody is subscribed. Publishers ignore that error.

use serde::{Deserialize, Serialize};
use std::fmt;
use tokio::sync::broadcast;

pub use tokio::sync::broadcast::error::{RecvError, SendError};
pub use tokio::sync::broadcast::Receiver;

/// Default buffer size for the event bus channel.
pub const DEFAULT_EVENT_BUFFER_SIZE: usize = 100;

// ============================================================================
// Core Event Types
// ============================================================================

/// Top-level event published on the bus.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type", content = "payload")]
pub enum CoreEvent {
    Playlist(PlaylistEvent),
    Playback(PlaybackEvent),
    Mirror(MirrorEvent),
    /// Message the presentation layer should show to the user.
    Notification(Notification),
}

impl CoreEvent {
    /// Returns a human-readable description of the event.
    pub fn description(&self) -> &str {
        match self {
            CoreEvent::Playlist(e) => e.description(),
            CoreEvent::Playback(e) => e.description(),
            CoreEvent::Mirror(e) => e.description(),
            CoreEvent::Notification(_) => "User notification",
        }
    }

    /// Returns the severity level of the event.
    pub fn severity(&self) -> EventSeverity {
        match self {
            CoreEvent::Playback(PlaybackEvent::Error { .. }) => EventSeverity::Error,
            CoreEvent::Mirror(MirrorEvent::SyncFailed { .. }) => EventSeverity::Error,
            CoreEvent::Playlist(PlaylistEvent::PersistFailed { .. }) => EventSeverity::Warning,
            CoreEvent::Mirror(MirrorEvent::RemoteDeleteFailed { .. }) => EventSeverity::Warning,
            CoreEvent::Mirror(MirrorEvent::PullFailed { .. }) => EventSeverity::Warning,
            CoreEvent::Notification(n) => n.level.severity(),
            CoreEvent::Playlist(PlaylistEvent::Restored { .. })
            | CoreEvent::Playlist(PlaylistEvent::TrackAdded { .. })
            | CoreEvent::Playlist(PlaylistEvent::TrackRemoved { .. })
            | CoreEvent::Mirror(MirrorEvent::BatchCompleted { .. }) => EventSeverity::Info,
            _ => EventSeverity::Debug,
        }
    }
}

/// Event severity levels for filtering and logging.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub enum EventSeverity {
    Debug,
    Info,
    Warning,
    Error,
}

// ============================================================================
// Notifications
// ============================================================================

/// Visual weight of a notification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NotificationLevel {
    Info,
    Success,
    Warning,
    Error,
}

impl NotificationLevel {
    fn severity(&self) -> EventSeverity {
        match self {
            NotificationLevel::Info | NotificationLevel::Success => EventSeverity::Info,
            NotificationLevel::Warning => EventSeverity::Warning,
            NotificationLevel::Error => EventSeverity::Error,
        }
    }
}

/// A user-visible message.
///
/// `delay_ms` asks the presentation layer to defer showing the message; the
/// core itself never sleeps.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Notification {
    pub message: String,
    pub level: NotificationLevel,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub delay_ms: Option<u64>,
}

impl Notification {
    pub fn new(level: NotificationLevel, message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            level,
            delay_ms: None,
        }
    }

    pub fn info(message: impl Into<String>) -> Self {
        Self::new(NotificationLevel::Info, message)
    }

    pub fn success(message: impl Into<String>) -> Self {
        Self::new(NotificationLevel::Success, message)
    }

    pub fn warning(message: impl Into<String>) -> Self {
        Self::new(NotificationLevel::Warning, message)
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self::new(NotificationLevel::Error, message)
    }

    pub fn with_delay(mut self, delay_ms: u64) -> Self {
        self.delay_ms = Some(delay_ms);
        self
    }
}

// ============================================================================
// Playlist Events
// ============================================================================

/// Changes to the ordered track collection and its cursor.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "event")]
pub enum PlaylistEvent {
    /// Startup finished restoring the persisted snapshot and remote tracks.
    Restored {
        track_count: usize,
        cursor: Option<usize>,
    },
    TrackAdded {
        track_id: String,
        title: String,
        index: usize,
    },
    TrackRemoved {
        track_id: String,
        title: String,
        index: usize,
    },
    /// The "now playing" cursor moved. `None` means the playlist is empty.
    CursorChanged {
        cursor: Option<usize>,
        track_id: Option<String>,
    },
    SavedToggled {
        track_id: String,
        saved: bool,
    },
    /// Writing the snapshot failed; in-memory state is unaffected.
    PersistFailed {
        message: String,
    },
    ScanCompleted {
        found: usize,
        loaded: usize,
    },
}

impl PlaylistEvent {
    fn description(&self) -> &str {
        match self {
            PlaylistEvent::Restored { .. } => "Playlist restored",
            PlaylistEvent::TrackAdded { .. } => "Track added to playlist",
            PlaylistEvent::TrackRemoved { .. } => "Track removed from playlist",
            PlaylistEvent::CursorChanged { .. } => "Current track changed",
            PlaylistEvent::SavedToggled { .. } => "Track saved flag toggled",
            PlaylistEvent::PersistFailed { .. } => "Failed to persist playlist",
            PlaylistEvent::ScanCompleted { .. } => "Folder scan completed",
        }
    }
}

// ============================================================================
// Playback Events
// ============================================================================

/// Events related to audio playback.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "event")]
pub enum PlaybackEvent {
    /// A track was assigned to the media element (paused at 0).
    TrackLoaded {
        track_id: String,
        title: String,
    },
    Started {
        track_id: String,
    },
    Paused {
        track_id: String,
    },
    /// The media element was detached because the playlist became empty.
    Unloaded,
    Ended {
        track_id: String,
    },
    /// Throttled position report.
    Progress {
        position_seconds: f64,
        duration_seconds: Option<f64>,
        percent: f64,
    },
    VolumeChanged {
        percent: u8,
    },
    RepeatAllChanged {
        enabled: bool,
    },
    Error {
        track_id: Option<String>,
        message: String,
    },
}

impl PlaybackEvent {
    fn description(&self) -> &str {
        match self {
            PlaybackEvent::TrackLoaded { .. } => "Track loaded",
            PlaybackEvent::Started { .. } => "Playback started",
            PlaybackEvent::Paused { .. } => "Playback paused",
            PlaybackEvent::Unloaded => "Playback unloaded",
            PlaybackEvent::Ended { .. } => "Track ended",
            PlaybackEvent::Progress { .. } => "Playback progress",
            PlaybackEvent::VolumeChanged { .. } => "Volume changed",
            PlaybackEvent::RepeatAllChanged { .. } => "Repeat mode changed",
            PlaybackEvent::Error { .. } => "Playback error",
        }
    }
}

// ============================================================================
// Mirror Events
// ============================================================================

/// Results of remote mirror operations.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "event")]
pub enum MirrorEvent {
    /// Remote tracks were fetched; `merged` of `received` were new.
    Pulled {
        received: usize,
        merged: usize,
    },
    PullFailed {
        message: String,
    },
    TrackSynced {
        track_id: String,
        remote_id: String,
    },
    SyncFailed {
        track_id: String,
        message: String,
    },
    BatchCompleted {
        succeeded: usize,
        attempted: usize,
    },
    RemoteDeleteFailed {
        remote_id: String,
        message: String,
    },
}

impl MirrorEvent {
    fn description(&self) -> &str {
        match self {
            MirrorEvent::Pulled { .. } => "Remote tracks pulled",
            MirrorEvent::PullFailed { .. } => "Remote pull failed",
            MirrorEvent::TrackSynced { .. } => "Track synced to remote",
            MirrorEvent::SyncFailed { .. } => "Track sync failed",
            MirrorEvent::BatchCompleted { .. } => "Batch sync completed",
            MirrorEvent::RemoteDeleteFailed { .. } => "Remote delete failed",
        }
    }
}

// ============================================================================
// Event Bus
// ============================================================================

/// Central event bus for publishing and subscribing to events.
///
/// Cloning the bus yields another publisher on the same channel.
#[derive(Clone)]
pub struct EventBus {
    sender: broadcast::Sender<CoreEvent>,
}

impl EventBus {
    /// Creates a new event bus; subscribers falling behind by more than
    /// `capacity` events receive `RecvError::Lagged`.
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity);
        Self { sender }
    }

    /// Publishes an event to all subscribers.
    ///
    /// Returns the number of subscribers that received the event, or an error
    /// if there are none.
    pub fn emit(&self, event: CoreEvent) -> Result<usize, SendError<CoreEvent>> {
        self.sender.send(event)
    }

    /// Creates an independent receiver for all future events.
    pub fn subscribe(&self) -> Receiver<CoreEvent> {
        self.sender.subscribe()
    }

    pub fn subscriber_count(&self) -> usize {
        self.sender.receiver_count()
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new(DEFAULT_EVENT_BUFFER_SIZE)
    }
}

impl fmt::Debug for EventBus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EventBus")
            .field("subscriber_count", &self.subscriber_count())
            .finish()
    }
}

// ============================================================================
// Event Stream Wrapper
// ============================================================================

type EventFilter = Box<dyn Fn(&CoreEvent) -> bool + Send + Sync>;

/// A `broadcast::Receiver` with an optional filter.
///
/// ```rust
/// use core_runtime::events::{CoreEvent, EventBus, EventStream};
///
/// let bus = EventBus::new(16);
/// let notifications = EventStream::new(bus.subscribe())
///     .filter(|event| matches!(event, CoreEvent::Notification(_)));
/// ```
pub struct EventStream {
    receiver: Receiver<CoreEvent>,
    filter: Option<EventFilter>,
}

impl EventStream {
    pub fn new(receiver: Receiver<CoreEvent>) -> Self {
        Self {
            receiver,
            filter: None,
        }
    }

    /// Only events matching `predicate` will be returned.
    pub fn filter<F>(mut self, predicate: F) -> Self
    where
        F: Fn(&CoreEvent) -> bool + Send + Sync + 'static,
    {
        self.filter = Some(Box::new(predicate));
        self
    }

    fn accepts(&self, event: &CoreEvent) -> bool {
        self.filter.as_ref().map_or(true, |filter| filter(event))
    }

    /// Receives the next event that passes the filter.
    pub async fn recv(&mut self) -> Result<CoreEvent, RecvError> {
        loop {
            let event = self.receiver.recv().await?;
            if self.accepts(&event) {
                return Ok(event);
            }
        }
    }

    /// Attempts to receive a matching event without waiting.
    ///
    /// Returns `None` if no matching events are currently buffered.
    pub fn try_recv(&mut self) -> Option<Result<CoreEvent, RecvError>> {
        loop {
            match self.receiver.try_recv() {
                Ok(event) => {
                    if self.accepts(&event) {
                        return Some(Ok(event));
                    }
                }
                Err(broadcast::error::TryRecvError::Empty) => return None,
                Err(broadcast::error::TryRecvError::Lagged(n)) => {
                    return Some(Err(RecvError::Lagged(n)))
                }
                Err(broadcast::error::TryRecvError::Closed) => return Some(Err(RecvError::Closed)),
            }
        }
    }
}

impl fmt::Debug for EventStream {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EventStream")
            .field("has_filter", &self.filter.is_some())
            .finish()
    }
}

// ============================================================================
// Tests
// ============================================================================
