//! # Desktop Bridge Implementations
//!
//! Default implementations of bridge traits for desktop platforms
//! (macOS, Windows, Linux).
//!
//! ## Overview
//!
//! - `KeyValueStore` using an SQLite-backed table (`sqlx`)
//! - `DirectoryPicker` / `DirectoryHandle` over a fixed root using `tokio::fs`
//! - `ObjectUrlRegistry` handing out session-scoped `blob:` references for
//!   local file paths
//!
//! There is no desktop media element here; hosts embedding an audio backend
//! provide their own `MediaElement` and can resolve transient references
//! through [`SessionObjectUrlRegistry::resolve`].
//!
//! ## Usage
//!
//! ```ignore
//! use bridge_desktop::{PathDirectoryPicker, SqliteKeyValueStore};
//!
//! #[tokio::main]
//! async fn main() {
//!     let store = SqliteKeyValueStore::new(SqliteKeyValueStore::default_path())
//!         .await
//!         .unwrap();
//!     let picker = PathDirectoryPicker::new(dirs::audio_dir().unwrap());
//!
//!     // Use in core dependencies
//! }
//! ```

mod directory;
mod kv_store;
mod object_urls;

pub use directory::{mime_type_for_path, PathDirectoryPicker, TokioDirectoryHandle};
pub use kv_store::SqliteKeyValueStore;
pub use object_urls::SessionObjectUrlRegistry;
