//! Conditional thread-safety bounds for bridge traits.
//!
//! Desktop hosts share bridge handles between tokio tasks, so every trait
//! needs `Send + Sync` there. In the browser the same traits are implemented
//! on top of `HTMLAudioElement`, `Storage` and `File` handles, which are
//! `!Send`; a wasm32 build therefore drops the bound entirely. Bridge traits
//! use [`PlatformSendSync`] as their supertrait instead of spelling out the
//! bound twice.

#[cfg(not(target_arch = "wasm32"))]
pub trait PlatformSendSync: Send + Sync {}

#[cfg(not(target_arch = "wasm32"))]
impl<T> PlatformSendSync for T where T: Send + Sync {}

#[cfg(target_arch = "wasm32")]
pub trait PlatformSendSync {}

#[cfg(target_arch = "wasm32")]
impl<T> PlatformSendSync for T {}
