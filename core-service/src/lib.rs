//! Playlist core façade and bootstrap helpers.
//!
//! This crate wires host-provided bridge implementations (storage, media
//! element, object URLs, folder picker, remote documents) into the
//! [`PlaylistCoordinator`]. Desktop builds typically enable the
//! `desktop-shims` feature (which depends on `bridge-desktop`), whereas
//! WebAssembly builds enable the `wasm` feature and use the adapters from
//! `bridge-wasm`.

pub mod coordinator;
pub mod dependencies;
pub mod error;
pub mod ingest;
pub mod snapshot;

pub use coordinator::{AdvanceOutcome, Direction, PlaylistCoordinator, SyncSummary};
pub use dependencies::{CoreDependencies, CoreDependenciesBuilder};
pub use error::{CoreError, Result};
pub use ingest::{IngestReport, RejectedFile, ScanOutcome};
pub use snapshot::PlaylistSnapshot;

#[cfg(all(feature = "wasm", target_arch = "wasm32"))]
pub use bridge_wasm::{BrowserBridgeConfig, BrowserBridgeSet};

/// Convenience bootstrapper for browser hosts.
///
/// Returns the restored coordinator together with the bridge set, whose
/// media handle the host uses to forward `<audio>` events.
///
/// ```
/// # #[cfg(all(feature = "wasm", target_arch = "wasm32"))]
/// # async fn example() -> core_service::Result<()> {
/// use core_runtime::config::PlayerConfig;
/// use core_service::{bootstrap_wasm, BrowserBridgeConfig};
///
/// let (core, bridges) =
///     bootstrap_wasm(PlayerConfig::default(), BrowserBridgeConfig::new("audio")).await?;
/// let snapshot = core.snapshot();
/// # Ok(())
/// # }
/// ```
#[cfg(all(feature = "wasm", target_arch = "wasm32"))]
pub async fn bootstrap_wasm(
    config: core_runtime::config::PlayerConfig,
    bridge_config: BrowserBridgeConfig,
) -> Result<(std::sync::Arc<PlaylistCoordinator>, BrowserBridgeSet)> {
    let bridges = bridge_wasm::build_browser_bridges(bridge_config)
        .map_err(|err| CoreError::InitializationFailed(err.to_string()))?;

    let deps = CoreDependencies::from(&bridges);
    let coordinator = std::sync::Arc::new(PlaylistCoordinator::new(config, deps)?);
    coordinator.bootstrap().await?;
    Ok((coordinator, bridges))
}
