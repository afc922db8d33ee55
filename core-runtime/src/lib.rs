//! # Core Runtime Module
//!
//! Runtime infrastructure shared by the playlist core crates:
//! - Player configuration with fail-fast validation
//! - Logging and tracing setup
//! - Event bus carrying playlist, playback, mirror and notification events
//!
//! Nothing in here knows about tracks or playback state; those live in
//! `core-playlist` and `core-playback`.

pub mod config;
pub mod error;
pub mod events;
pub mod logging;

pub use error::{Error, Result};
