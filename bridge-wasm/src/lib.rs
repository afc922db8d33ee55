//! WebAssembly Bridge Implementations
//!
//! Browser implementations of the bridge traits defined in `bridge-traits`,
//! built on `web-sys` and `wasm-bindgen`.
//!
//! # Platform Support
//!
//! This crate is designed exclusively for the `wasm32-unknown-unknown` target.
//! It will not compile for native targets.
//!
//! # Implementations
//!
//! - `LocalStorageStore`: `KeyValueStore` over `window.localStorage`
//! - `HtmlAudioMedia`: `MediaElement` over an `<audio>` element, plus
//!   [`MediaSignalListeners`] forwarding element events as `MediaSignal`s
//! - `BlobUrlRegistry`: `ObjectUrlRegistry` over `URL.createObjectURL`
//! - `BrowserDirectoryPicker`: `DirectoryPicker` over `showDirectoryPicker`
//!
//! # Examples
//!
//! ```ignore
//! use bridge_wasm::{build_browser_bridges, BrowserBridgeConfig};
//!
//! let bridges = build_browser_bridges(BrowserBridgeConfig::new("audio")).unwrap();
//! let listeners = bridges.media.listen(move |signal| {
//!     // forward into PlaylistCoordinator::handle_media_signal
//! });
//! ```

#![cfg(target_arch = "wasm32")]
#![warn(missing_docs)]

pub mod bootstrap;
pub mod directory;
pub mod error;
pub mod media;
pub mod object_urls;
pub mod storage;

// Re-export commonly used types
pub use bootstrap::{build_browser_bridges, BrowserBridgeConfig, BrowserBridgeSet};
pub use directory::{BrowserDirectoryHandle, BrowserDirectoryPicker};
pub use error::{WasmError, WasmResult};
pub use media::{HtmlAudioMedia, MediaSignalListeners};
pub use object_urls::BlobUrlRegistry;
pub use storage::LocalStorageStore;
