//! # Playback Controller
//!
//! State machine over the platform [`MediaElement`].
//!
//! ```text
//! Stopped --load--> Paused --play--> Playing --pause--> Paused
//! Playing/Paused --load--> Paused
//! any --load(no source)--> Errored      (until the next load)
//! any --unload--> Stopped
//! ```
//!
//! The host reports media events through [`PlaybackController::apply_signal`];
//! commands never wait for them.

use std::sync::Arc;

use bridge_traits::media::{MediaElement, MediaSignal};
use bridge_traits::time::Clock;
use core_playlist::models::{Track, TrackId};
use tracing::{debug, warn};

use crate::error::{PlaybackError, Result};
use crate::format::{format_time, progress_percent};
use crate::state::{PlaybackState, PlaybackStatus, ProgressUpdate, SeekTarget, SignalOutcome};
use crate::throttle::ProgressThrottle;

/// Keyboard volume step in percent.
pub const VOLUME_STEP: i32 = 10;

pub struct PlaybackController {
    media: Arc<dyn MediaElement>,
    clock: Arc<dyn Clock>,
    throttle: ProgressThrottle,
    state: PlaybackState,
    loaded: Option<TrackId>,
}

impl PlaybackController {
    pub fn new(
        media: Arc<dyn MediaElement>,
        clock: Arc<dyn Clock>,
        progress_interval_ms: u64,
        initial_volume: u8,
    ) -> Self {
        let mut controller = Self {
            media,
            clock,
            throttle: ProgressThrottle::new(progress_interval_ms),
            state: PlaybackState::new(initial_volume),
            loaded: None,
        };
        controller.set_volume(i32::from(initial_volume));
        controller
    }

    pub fn state(&self) -> PlaybackState {
        self.state.clone()
    }

    pub fn status(&self) -> &PlaybackStatus {
        &self.state.status
    }

    pub fn is_playing(&self) -> bool {
        self.state.status.is_playing()
    }

    /// Id of the track currently assigned to the media element.
    pub fn loaded_track(&self) -> Option<&TrackId> {
        self.loaded.as_ref()
    }

    /// Assign `track` to the media element, paused at position 0.
    ///
    /// A track without a playable reference leaves the controller errored and
    /// the media element detached.
    pub fn load(&mut self, track: &Track) -> Result<()> {
        self.media.pause();
        self.state.reset_progress();
        self.throttle.reset();
        self.loaded = Some(track.id.clone());

        let src = track.source.url();
        if src.trim().is_empty() {
            self.media.set_src("");
            self.media.load();
            let message = format!("\"{}\" has no playable source", track.title);
            warn!(track_id = %track.id, "Cannot load track without a source");
            self.state.status = PlaybackStatus::Errored {
                message: message.clone(),
            };
            return Err(PlaybackError::NoSource(message));
        }

        self.media.set_src(src);
        self.media.load();
        self.state.status = PlaybackStatus::Paused;
        debug!(track_id = %track.id, "Loaded track");
        Ok(())
    }

    /// Detach the media element; the playlist is empty.
    pub fn unload(&mut self) {
        self.media.pause();
        self.media.set_src("");
        // drops the previously attached resource
        self.media.load();
        self.state.reset_progress();
        self.throttle.reset();
        self.state.status = PlaybackStatus::Stopped;
        self.loaded = None;
        debug!("Unloaded media element");
    }

    /// Start playback of the loaded track.
    ///
    /// Refused when nothing is loaded or the source errored. When the media
    /// element rejects the request the status stays `Paused`.
    pub async fn play(&mut self) -> Result<()> {
        match &self.state.status {
            PlaybackStatus::Playing => return Ok(()),
            PlaybackStatus::Stopped => {
                return Err(PlaybackError::Refused("No track loaded".to_string()))
            }
            PlaybackStatus::Errored { message } => {
                return Err(PlaybackError::Refused(message.clone()))
            }
            PlaybackStatus::Paused => {}
        }

        match self.media.play().await {
            Ok(()) => {
                self.state.status = PlaybackStatus::Playing;
                Ok(())
            }
            Err(e) => {
                warn!(error = %e, "Media element refused to play");
                Err(PlaybackError::Refused(e.to_string()))
            }
        }
    }

    /// Pause playback. Always succeeds.
    pub fn pause(&mut self) {
        self.media.pause();
        if self.state.status.is_playing() {
            self.state.status = PlaybackStatus::Paused;
        }
    }

    /// Move the playback position, clamped to `[0, duration]`.
    ///
    /// Returns `false` without touching the media element while the duration
    /// is unknown.
    pub fn seek(&mut self, target: SeekTarget) -> bool {
        let Some(duration) = self.known_duration() else {
            return false;
        };

        let seconds = match target {
            SeekTarget::Fraction(fraction) if fraction.is_finite() => {
                fraction.clamp(0.0, 1.0) * duration
            }
            SeekTarget::Seconds(seconds) if seconds.is_finite() => seconds.clamp(0.0, duration),
            _ => return false,
        };

        self.media.set_current_time(seconds);
        self.state.position_seconds = seconds;
        true
    }

    /// Start a drag on the progress bar at `fraction`.
    pub fn begin_drag(&mut self, fraction: f64) -> bool {
        self.state.is_dragging = true;
        self.seek(SeekTarget::Fraction(fraction))
    }

    /// Follow the pointer while dragging. Ignored when no drag is active.
    pub fn drag_to(&mut self, fraction: f64) -> bool {
        if !self.state.is_dragging {
            return false;
        }
        self.seek(SeekTarget::Fraction(fraction))
    }

    /// Release the drag; progress reports resume on the next tick.
    pub fn end_drag(&mut self) {
        self.state.is_dragging = false;
        self.throttle.reset();
    }

    /// Sample the media position.
    ///
    /// The position is always recorded. A report is returned at most once per
    /// throttle interval and never while dragging.
    pub fn tick(&mut self) -> Option<ProgressUpdate> {
        let position = self.media.current_time();
        if position.is_finite() && position >= 0.0 {
            self.state.position_seconds = position;
        }

        if self.state.is_dragging {
            return None;
        }
        if !self.throttle.ready(self.clock.unix_timestamp_millis()) {
            return None;
        }

        Some(self.progress())
    }

    /// Current progress, regardless of throttling.
    pub fn progress(&self) -> ProgressUpdate {
        let position = self.state.position_seconds;
        let duration = self.state.duration_seconds;
        ProgressUpdate {
            position_seconds: position,
            duration_seconds: duration,
            percent: progress_percent(position, duration),
            position_label: format_time(position),
            duration_label: duration.map(format_time).unwrap_or_else(|| format_time(0.0)),
        }
    }

    /// Feed a media element signal into the state machine.
    pub fn apply_signal(&mut self, signal: MediaSignal) -> SignalOutcome {
        match signal {
            MediaSignal::MetadataReady => {
                let duration = self
                    .media
                    .duration()
                    .filter(|d| d.is_finite() && *d > 0.0);
                self.state.duration_seconds = duration;
                SignalOutcome::MetadataReady {
                    duration_seconds: duration,
                }
            }
            MediaSignal::PositionUpdate => SignalOutcome::Progress(self.tick()),
            MediaSignal::Ended => {
                let was_playing = self.state.status.is_playing();
                if was_playing {
                    self.state.status = PlaybackStatus::Paused;
                }
                SignalOutcome::Ended { was_playing }
            }
            MediaSignal::LoadStart => {
                self.state.reset_progress();
                self.throttle.reset();
                SignalOutcome::Reset
            }
            MediaSignal::Error { message } => {
                warn!(error = %message, "Media element reported an error");
                self.state.status = PlaybackStatus::Errored {
                    message: message.clone(),
                };
                SignalOutcome::Failed { message }
            }
        }
    }

    /// Set the volume in percent, clamped to `0..=100`. Returns the applied
    /// value.
    pub fn set_volume(&mut self, percent: i32) -> u8 {
        let percent = percent.clamp(0, 100) as u8;
        self.media.set_volume(f64::from(percent) / 100.0);
        self.state.volume_percent = percent;
        percent
    }

    /// Change the volume by `delta` percent (keyboard arrows use
    /// [`VOLUME_STEP`]).
    pub fn adjust_volume(&mut self, delta: i32) -> u8 {
        self.set_volume(i32::from(self.state.volume_percent).saturating_add(delta))
    }

    pub fn set_repeat_all(&mut self, enabled: bool) {
        self.state.repeat_all_enabled = enabled;
    }

    fn known_duration(&self) -> Option<f64> {
        self.state
            .duration_seconds
            .filter(|d| d.is_finite() && *d > 0.0)
    }
}

impl std::fmt::Debug for PlaybackController {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PlaybackController")
            .field("state", &self.state)
            .field("loaded", &self.loaded)
            .finish()
    }
}
