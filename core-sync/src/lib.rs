//! # Remote Mirror Module
//!
//! Optional mirroring of playlist tracks into a remote document collection.
//!
//! ## Overview
//!
//! - `pull` materializes remote documents as tracks (newest first)
//! - `push` writes one track and returns its remote id
//! - `remove` deletes a mirrored document (best effort)
//!
//! Whether mirroring is enabled is decided once at construction: the
//! coordinator holds either a [`DocumentMirror`] or a [`NoopMirror`].
//! Merging pulled tracks into the playlist (dedup by remote id) is the
//! coordinator's job.

pub mod error;
pub mod mirror;

pub use error::{Result, SyncError};
pub use mirror::{DocumentMirror, NoopMirror, RemoteMirror};
