//! # Playback Module
//!
//! Drives the single platform media element for the "now playing" track.
//!
//! ## Overview
//!
//! This module handles:
//! - The playback state machine (`Stopped`, `Paused`, `Playing`, `Errored`)
//! - Seeking, including drag-to-seek with suppressed progress reports
//! - Throttled progress reporting and `m:ss` time labels
//! - Volume in percent, retained across track loads
//!
//! Decoding and audio output are the media element's job. Which track to
//! load, and when to auto-advance, is decided by the coordinator in
//! `core-service`.

pub mod controller;
pub mod error;
pub mod format;
pub mod state;
pub mod throttle;

pub use controller::PlaybackController;
pub use error::{PlaybackError, Result};
pub use format::{format_time, progress_percent};
pub use state::{PlaybackState, PlaybackStatus, ProgressUpdate, SeekTarget, SignalOutcome};
pub use throttle::ProgressThrottle;
