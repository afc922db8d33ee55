//! # Host Bridge Traits
//!
//! Platform capabilities the playlist core depends on but cannot provide
//! itself. Each host ships adapters for them:
//!
//! | Platform | Implementation Crate |
//! |----------|---------------------|
//! | Browser  | `bridge-wasm`       |
//! | Desktop  | `bridge-desktop`    |
//! | Tests    | in-memory fakes     |
//!
//! ## Traits
//!
//! ### Storage
//! - [`KeyValueStore`](storage::KeyValueStore) - Durable string slots for the playlist snapshot
//! - [`DocumentCollection`](remote::DocumentCollection) - Optional remote song collection
//!
//! ### Media
//! - [`MediaElement`](media::MediaElement) - The single audio element driven by the core
//! - [`MediaSignal`](media::MediaSignal) - Signals the element reports back
//!
//! ### Ingestion
//! - [`ObjectUrlRegistry`](source::ObjectUrlRegistry) - Session-scoped playable references
//! - [`DirectoryPicker`](source::DirectoryPicker) - User-granted folder access
//!
//! ### Utilities
//! - [`Clock`](time::Clock) - Time source for deterministic testing
//! - [`LoggerSink`](time::LoggerSink) - Forward structured logs to the host
//!
//! ## Error Handling
//!
//! Every trait reports failures through [`BridgeError`](error::BridgeError).
//! Adapters should map storage exhaustion to `QuotaExceeded` and user
//! dismissal of a prompt to `Cancelled`; the core treats both specially.
//!
//! ## Thread Safety
//!
//! Traits require `Send + Sync` on native targets and drop the bound on
//! wasm32 (see [`PlatformSendSync`](platform::PlatformSendSync)).

pub mod error;
pub mod media;
pub mod platform;
pub mod remote;
pub mod source;
pub mod storage;
pub mod time;

pub use error::BridgeError;

pub use media::{MediaElement, MediaSignal};
pub use platform::PlatformSendSync;
pub use remote::{DocumentCollection, RemoteDocument, SongDocument};
pub use source::{
    DirectoryEntry, DirectoryHandle, DirectoryPicker, FileDescriptor, ObjectUrlRegistry,
    TRANSIENT_URL_PREFIX,
};
pub use storage::KeyValueStore;
pub use time::{Clock, ConsoleLogger, LogEntry, LogLevel, LoggerSink, SystemClock};
