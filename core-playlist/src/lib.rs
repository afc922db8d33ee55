//! # Playlist Model
//!
//! The ordered track collection behind the player and its durable snapshot.
//!
//! ## Overview
//!
//! This crate manages:
//! - The [`Track`](models::Track) model and its identifiers
//! - [`TrackStore`](store::TrackStore), the in-memory ordered collection
//! - [`PersistenceAdapter`](persistence::PersistenceAdapter), which writes and
//!   restores the playlist through a host key-value store
//!
//! Cursor bookkeeping is deliberately absent here; the coordinator in
//! `core-service` owns the cursor and adjusts it together with every store
//! mutation.

pub mod error;
pub mod models;
pub mod persistence;
pub mod store;

pub use error::{PlaylistError, Result};
pub use models::{OriginHint, RemoteId, Track, TrackId, TrackSource};
pub use persistence::{PersistedSnapshot, PersistedTrack, PersistenceAdapter};
pub use store::TrackStore;
