//! # Playlist Coordinator
//!
//! Owns the track store, the cursor and the playback controller, and turns
//! host commands and media signals into state changes, persistence writes,
//! mirror calls and events.
//!
//! ## Concurrency
//!
//! Every mutating command takes the state mutex for its whole duration,
//! awaits included, so commands never interleave. Position ticks use
//! `try_lock` and are dropped while a command is in flight.
//!
//! ## Read side
//!
//! - [`PlaylistCoordinator::snapshot`] / [`PlaylistCoordinator::subscribe_state`]:
//!   the full [`PlaylistSnapshot`], republished after every command
//! - [`PlaylistCoordinator::events`]: fine-grained [`CoreEvent`]s including
//!   user notifications; [`PlaylistCoordinator::notifications`] yields only
//!   the latter

use std::sync::Arc;

use bridge_traits::{
    media::MediaSignal,
    source::{DirectoryPicker, FileDescriptor, ObjectUrlRegistry},
};
use core_playback::{PlaybackController, SeekTarget, SignalOutcome};
use core_playlist::{
    models::{title_from_file_name, OriginHint, RemoteId, Track, TrackId, TrackSource},
    PersistedSnapshot, PersistenceAdapter, TrackStore,
};
use core_runtime::{
    config::PlayerConfig,
    events::{
        CoreEvent, EventBus, EventSeverity, EventStream, MirrorEvent, Notification, PlaybackEvent,
        PlaylistEvent, Receiver,
    },
};
use core_sync::{DocumentMirror, NoopMirror, RemoteMirror};
use serde::{Deserialize, Serialize};
use tokio::sync::{watch, Mutex};
use tracing::{debug, error, info, instrument, trace, warn};

use crate::dependencies::CoreDependencies;
use crate::error::{CoreError, Result};
use crate::ingest::{check_file, collect_audio_files, IngestReport, RejectedFile, ScanOutcome};
use crate::snapshot::PlaylistSnapshot;

const EMPTY_PLAYLIST_MESSAGE: &str = "No songs in playlist. Please add music.";
const SCAN_FAILED_MESSAGE: &str = "Failed to access device folder. Please try again.";
const MIRROR_NOT_CONFIGURED_MESSAGE: &str = "Configure a cloud library to enable cloud sync";
const PLAYBACK_ERROR_MESSAGE: &str = "Error playing audio. Please check the file format.";
const PLAYBACK_REFUSED_MESSAGE: &str = "Playback was blocked. Press play to try again.";

/// Cursor movement requested by next/previous.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    Next,
    Previous,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum AdvanceOutcome {
    /// A new track was loaded. `resume` is set when playback restarts once
    /// its metadata arrives.
    Moved { cursor: usize, resume: bool },
    /// The cursor did not move (end of the list without repeat-all).
    Stayed { cursor: usize },
}

/// Result of a batch mirror run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SyncSummary {
    pub succeeded: usize,
    pub attempted: usize,
}

struct CoordinatorState {
    store: TrackStore,
    /// `None` iff the store is empty.
    cursor: Option<usize>,
    playback: PlaybackController,
    /// Start playback on the next `MetadataReady`.
    resume_on_metadata: bool,
}

/// Central playlist orchestrator.
pub struct PlaylistCoordinator {
    config: PlayerConfig,
    state: Mutex<CoordinatorState>,
    persistence: PersistenceAdapter,
    mirror: Arc<dyn RemoteMirror>,
    object_urls: Arc<dyn ObjectUrlRegistry>,
    directory_picker: Option<Arc<dyn DirectoryPicker>>,
    event_bus: EventBus,
    state_tx: watch::Sender<PlaylistSnapshot>,
}

impl PlaylistCoordinator {
    /// Wire a coordinator from validated configuration and bridges.
    ///
    /// Fails with `CapabilityMissing` when mirroring is configured but no
    /// document collection was injected.
    pub fn new(config: PlayerConfig, deps: CoreDependencies) -> Result<Self> {
        config.validate()?;

        let mirror: Arc<dyn RemoteMirror> = match (&config.mirror, deps.documents) {
            (Some(settings), Some(documents)) => {
                Arc::new(DocumentMirror::new(documents, settings.collection.clone()))
            }
            (Some(settings), None) => {
                return Err(CoreError::CapabilityMissing {
                    capability: "DocumentCollection".to_string(),
                    message: format!(
                        "Mirroring to collection '{}' is configured but no DocumentCollection \
                         was provided. Inject one or remove the mirror settings.",
                        settings.collection
                    ),
                })
            }
            (None, _) => Arc::new(NoopMirror),
        };

        let playback = PlaybackController::new(
            deps.media,
            deps.clock,
            config.progress_interval_ms,
            config.initial_volume,
        );
        let (state_tx, _) = watch::channel(PlaylistSnapshot::empty(
            playback.state(),
            mirror.is_enabled(),
        ));

        info!(
            mirror_enabled = mirror.is_enabled(),
            folder_scan = deps.directory_picker.is_some(),
            "Playlist coordinator created"
        );

        Ok(Self {
            persistence: PersistenceAdapter::new(deps.storage, config.storage_keys.clone()),
            event_bus: EventBus::new(config.event_buffer_size),
            state: Mutex::new(CoordinatorState {
                store: TrackStore::new(),
                cursor: None,
                playback,
                resume_on_metadata: false,
            }),
            mirror,
            object_urls: deps.object_urls,
            directory_picker: deps.directory_picker,
            state_tx,
            config,
        })
    }

    pub fn config(&self) -> &PlayerConfig {
        &self.config
    }

    pub fn mirror_enabled(&self) -> bool {
        self.mirror.is_enabled()
    }

    // ------------------------------------------------------------------
    // Lifecycle
    // ------------------------------------------------------------------

    /// Restore the saved playlist, merge remote tracks and load the current
    /// track without playing it. Call once, before any other command.
    #[instrument(skip(self))]
    pub async fn bootstrap(&self) -> Result<PlaylistSnapshot> {
        let mut state = self.state.lock().await;

        let saved = self.persistence.load().await;
        let restored_cursor = saved.cursor_index;
        state.store = TrackStore::from_tracks(saved.into_tracks());
        debug!(tracks = state.store.len(), "Restored saved playlist");

        let mut merged = 0;
        if self.mirror.is_enabled() {
            match self.mirror.pull().await {
                Ok(remote) => {
                    let received = remote.len();
                    for track in remote {
                        let known = track
                            .remote_id
                            .as_ref()
                            .is_some_and(|id| state.store.contains_remote(id));
                        if !known {
                            state.store.append(track);
                            merged += 1;
                        }
                    }
                    info!(received, merged, "Merged remote tracks");
                    self.emit(CoreEvent::Mirror(MirrorEvent::Pulled { received, merged }));
                }
                Err(e) => {
                    warn!(error = %e, "Failed to load remote tracks");
                    self.emit(CoreEvent::Mirror(MirrorEvent::PullFailed {
                        message: e.to_string(),
                    }));
                }
            }
        }

        let volume = state.playback.set_volume(i32::from(self.config.initial_volume));
        self.emit(CoreEvent::Playback(PlaybackEvent::VolumeChanged { percent: volume }));

        if state.store.is_empty() {
            self.enter_empty_state(&mut state);
            let hint = if self.mirror.is_enabled() {
                "Add music files or sync from your cloud library!"
            } else {
                "Add music files or configure cloud sync to sync your library!"
            };
            self.notify(Notification::info(hint).with_delay(self.config.empty_hint_delay_ms));
        } else {
            let index = restored_cursor
                .filter(|index| *index < state.store.len())
                .unwrap_or(0);
            self.load_index(&mut state, index);
        }

        if merged > 0 {
            self.persist(&state).await;
        }

        self.emit(CoreEvent::Playlist(PlaylistEvent::Restored {
            track_count: state.store.len(),
            cursor: state.cursor,
        }));
        info!(tracks = state.store.len(), cursor = ?state.cursor, "Playlist ready");

        Ok(self.publish(&state))
    }

    // ------------------------------------------------------------------
    // Ingestion
    // ------------------------------------------------------------------

    /// Add one local file. Rejected files are reported as a notification and
    /// as `CoreError::RejectedInput`.
    #[instrument(skip(self, file), fields(file = %file.name))]
    pub async fn ingest(&self, file: FileDescriptor, origin: OriginHint) -> Result<TrackId> {
        let mut state = self.state.lock().await;
        let id = self.ingest_locked(&mut state, &file, origin)?;
        self.persist(&state).await;
        self.publish(&state);
        Ok(id)
    }

    /// Add the files picked by a manual upload.
    #[instrument(skip(self, files), fields(count = files.len()))]
    pub async fn upload_files(&self, files: Vec<FileDescriptor>) -> IngestReport {
        let mut state = self.state.lock().await;
        let mut report = IngestReport::default();

        for file in &files {
            match self.ingest_locked(&mut state, file, OriginHint::ManualUpload) {
                Ok(id) => report.accepted.push(id),
                Err(e) => report.rejected.push(RejectedFile {
                    name: file.name.clone(),
                    reason: e.to_string(),
                }),
            }
        }

        if !report.accepted.is_empty() {
            self.persist(&state).await;
        }
        self.publish(&state);
        report
    }

    /// Let the user pick a folder and add the audio files found in it.
    ///
    /// Files whose title is already in the playlist are skipped. The picker
    /// and traversal run before the state lock is taken.
    #[instrument(skip(self))]
    pub async fn scan_folder(&self) -> Result<ScanOutcome> {
        let picker = self
            .directory_picker
            .clone()
            .ok_or_else(|| CoreError::CapabilityMissing {
                capability: "DirectoryPicker".to_string(),
                message: "Folder scanning needs a DirectoryPicker. \
                         Web: requires a browser with showDirectoryPicker (Chrome, Edge, Opera). \
                         Desktop: inject bridge-desktop's PathDirectoryPicker."
                    .to_string(),
            })?;

        let files = match picker.pick_directory().await {
            Ok(root) => {
                collect_audio_files(
                    root.as_ref(),
                    self.config.scan_max_depth,
                    self.config.max_upload_bytes,
                )
                .await
            }
            Err(e) => Err(e),
        };

        let files = match files {
            Ok(files) => files,
            Err(e) if e.is_cancellation() => {
                debug!("Folder selection cancelled");
                return Ok(ScanOutcome::Cancelled);
            }
            Err(e) => {
                warn!(error = %e, "Folder scan failed");
                self.notify(Notification::error(SCAN_FAILED_MESSAGE));
                return Ok(ScanOutcome::Failed {
                    message: e.to_string(),
                });
            }
        };

        let found = files.len();
        if found == 0 {
            self.emit(CoreEvent::Playlist(PlaylistEvent::ScanCompleted {
                found: 0,
                loaded: 0,
            }));
            self.notify(Notification::info(
                "No audio files found in the selected folder.",
            ));
            return Ok(ScanOutcome::NoAudioFiles);
        }

        let mut state = self.state.lock().await;
        let mut loaded = 0;
        for file in &files {
            if state.store.contains_title(&title_from_file_name(&file.name)) {
                debug!(file = %file.name, "Already in playlist");
                continue;
            }
            match self.ingest_locked(&mut state, file, OriginHint::DeviceScan) {
                Ok(_) => loaded += 1,
                Err(e) => warn!(file = %file.name, error = %e, "Could not add scanned file"),
            }
        }

        if loaded > 0 {
            self.persist(&state).await;
        }
        self.publish(&state);

        self.emit(CoreEvent::Playlist(PlaylistEvent::ScanCompleted { found, loaded }));
        info!(found, loaded, "Folder scan completed");

        if loaded > 0 {
            self.notify(Notification::success(format!(
                "Successfully loaded {} songs from device!",
                loaded
            )));
            Ok(ScanOutcome::Loaded { found, loaded })
        } else {
            self.notify(Notification::info(
                "No new audio files found in the selected folder.",
            ));
            Ok(ScanOutcome::NoNewFiles { found })
        }
    }

    // ------------------------------------------------------------------
    // Navigation
    // ------------------------------------------------------------------

    #[instrument(skip(self))]
    pub async fn advance(&self, direction: Direction) -> Result<AdvanceOutcome> {
        let mut state = self.state.lock().await;
        if state.store.is_empty() {
            self.notify(Notification::info(EMPTY_PLAYLIST_MESSAGE));
            return Err(CoreError::EmptyPlaylist);
        }

        let was_playing = state.playback.is_playing();
        let outcome = self.advance_locked(&mut state, direction, was_playing).await?;
        self.publish(&state);
        Ok(outcome)
    }

    /// Make the track at `index` current (playlist row click). Playback
    /// continues on the new track if it was running.
    #[instrument(skip(self))]
    pub async fn select(&self, index: usize) -> Result<()> {
        let mut state = self.state.lock().await;
        state.store.get(index)?;

        let was_playing = state.playback.is_playing();
        self.load_index(&mut state, index);
        state.resume_on_metadata = was_playing;

        self.persist(&state).await;
        self.publish(&state);
        Ok(())
    }

    // ------------------------------------------------------------------
    // Media signals
    // ------------------------------------------------------------------

    /// Feed a media element signal. Returns `None` when a position tick was
    /// dropped because a command holds the state.
    pub async fn handle_media_signal(&self, signal: MediaSignal) -> Option<SignalOutcome> {
        if matches!(signal, MediaSignal::PositionUpdate) {
            let mut state = self.state.try_lock().ok()?;
            let outcome = state.playback.apply_signal(signal);
            if let SignalOutcome::Progress(Some(update)) = &outcome {
                self.emit(CoreEvent::Playback(PlaybackEvent::Progress {
                    position_seconds: update.position_seconds,
                    duration_seconds: update.duration_seconds,
                    percent: update.percent,
                }));
            }
            let playback = state.playback.state();
            self.state_tx.send_modify(|snapshot| snapshot.playback = playback);
            return Some(outcome);
        }

        let mut state = self.state.lock().await;
        let outcome = state.playback.apply_signal(signal);

        match &outcome {
            SignalOutcome::MetadataReady { .. } => {
                if std::mem::take(&mut state.resume_on_metadata) {
                    self.start_playback(&mut state).await;
                }
            }
            SignalOutcome::Ended { was_playing } => {
                let track_id = Self::loaded_id(&state);
                self.emit(CoreEvent::Playback(PlaybackEvent::Ended { track_id }));
                if let Err(e) = self
                    .advance_locked(&mut state, Direction::Next, *was_playing)
                    .await
                {
                    debug!(error = %e, "No track to continue with");
                }
            }
            SignalOutcome::Failed { message } => {
                state.resume_on_metadata = false;
                let track_id = state.playback.loaded_track().map(|id| id.to_string());
                self.emit(CoreEvent::Playback(PlaybackEvent::Error {
                    track_id,
                    message: message.clone(),
                }));
                self.notify(Notification::error(PLAYBACK_ERROR_MESSAGE));
            }
            SignalOutcome::Progress(_) | SignalOutcome::Reset => {}
        }

        self.publish(&state);
        Some(outcome)
    }

    // ------------------------------------------------------------------
    // Editing
    // ------------------------------------------------------------------

    /// Remove the track at `index`. Callers confirm with the user first.
    #[instrument(skip(self))]
    pub async fn remove_track(&self, index: usize) -> Result<Track> {
        let mut state = self.state.lock().await;
        let track = state.store.get(index)?.clone();

        if track.source.is_transient() {
            self.object_urls.revoke_object_url(track.source.url());
        }

        if let Some(remote_id) = &track.remote_id {
            if self.mirror.is_enabled() {
                if let Err(e) = self.mirror.remove(remote_id).await {
                    warn!(remote_id = %remote_id, error = %e, "Keeping remote copy");
                    self.emit(CoreEvent::Mirror(MirrorEvent::RemoteDeleteFailed {
                        remote_id: remote_id.to_string(),
                        message: e.to_string(),
                    }));
                }
            }
        }

        let removed = state.store.remove_at(index)?;
        self.emit(CoreEvent::Playlist(PlaylistEvent::TrackRemoved {
            track_id: removed.id.to_string(),
            title: removed.title.clone(),
            index,
        }));

        if state.store.is_empty() {
            self.enter_empty_state(&mut state);
        } else if let Some(cursor) = state.cursor {
            if index < cursor {
                state.cursor = Some(cursor - 1);
                self.emit_cursor(&state);
            } else if index == cursor {
                let next = index.min(state.store.len() - 1);
                state.resume_on_metadata = false;
                self.load_index(&mut state, next);
            }
        }

        self.persist(&state).await;
        self.publish(&state);
        info!(track_id = %removed.id, "Removed track");
        Ok(removed)
    }

    /// Flip the "saved" flag of a track. Returns the new value.
    #[instrument(skip(self))]
    pub async fn toggle_saved(&self, index: usize) -> Result<bool> {
        let mut state = self.state.lock().await;
        let track = state.store.get_mut(index)?;
        track.saved_by_user = !track.saved_by_user;
        let saved = track.saved_by_user;
        let track_id = track.id.to_string();

        self.emit(CoreEvent::Playlist(PlaylistEvent::SavedToggled { track_id, saved }));
        self.persist(&state).await;
        self.publish(&state);
        Ok(saved)
    }

    // ------------------------------------------------------------------
    // Mirroring
    // ------------------------------------------------------------------

    /// Mirror one track. An already mirrored track returns its id without a
    /// remote write.
    #[instrument(skip(self))]
    pub async fn sync_one(&self, index: usize) -> Result<RemoteId> {
        if !self.mirror.is_enabled() {
            self.notify(Notification::warning(MIRROR_NOT_CONFIGURED_MESSAGE));
            return Err(CoreError::MirrorNotConfigured);
        }

        let mut state = self.state.lock().await;
        let track = state.store.get(index)?;
        if let (true, Some(remote_id)) = (track.mirrored, &track.remote_id) {
            return Ok(remote_id.clone());
        }

        let title = track.title.clone();
        let result = self.push_locked(&mut state, index).await;
        match &result {
            Ok(_) => {
                self.notify(Notification::success(format!("\"{}\" synced to cloud!", title)));
                self.persist(&state).await;
            }
            Err(_) => {
                self.notify(Notification::error(format!(
                    "Failed to sync \"{}\" to cloud",
                    title
                )));
            }
        }
        self.publish(&state);
        result
    }

    /// Mirror every local track that is not mirrored yet, one at a time.
    #[instrument(skip(self))]
    pub async fn sync_all(&self) -> Result<SyncSummary> {
        if !self.mirror.is_enabled() {
            self.notify(Notification::warning(MIRROR_NOT_CONFIGURED_MESSAGE));
            return Err(CoreError::MirrorNotConfigured);
        }

        let mut state = self.state.lock().await;
        let pending: Vec<usize> = state
            .store
            .all()
            .iter()
            .enumerate()
            .filter(|(_, track)| track.needs_mirroring())
            .map(|(index, _)| index)
            .collect();

        if pending.is_empty() {
            self.notify(Notification::info("All tracks are already synced to cloud!"));
            return Ok(SyncSummary::default());
        }

        self.notify(Notification::info(format!(
            "Syncing {} tracks to cloud...",
            pending.len()
        )));

        let mut summary = SyncSummary {
            succeeded: 0,
            attempted: pending.len(),
        };
        for index in pending {
            if self.push_locked(&mut state, index).await.is_ok() {
                summary.succeeded += 1;
            }
        }

        if summary.succeeded > 0 {
            self.persist(&state).await;
        }
        self.publish(&state);

        self.emit(CoreEvent::Mirror(MirrorEvent::BatchCompleted {
            succeeded: summary.succeeded,
            attempted: summary.attempted,
        }));
        self.notify(Notification::success(format!(
            "Successfully synced {}/{} tracks to cloud!",
            summary.succeeded, summary.attempted
        )));
        info!(
            succeeded = summary.succeeded,
            attempted = summary.attempted,
            "Batch sync finished"
        );
        Ok(summary)
    }

    // ------------------------------------------------------------------
    // Playback commands
    // ------------------------------------------------------------------

    #[instrument(skip(self))]
    pub async fn play(&self) -> Result<()> {
        let mut state = self.state.lock().await;
        if state.store.is_empty() {
            self.notify(Notification::info(EMPTY_PLAYLIST_MESSAGE));
            return Err(CoreError::EmptyPlaylist);
        }
        let result = self.play_locked(&mut state).await;
        self.publish(&state);
        result
    }

    #[instrument(skip(self))]
    pub async fn pause(&self) {
        let mut state = self.state.lock().await;
        self.pause_locked(&mut state);
        self.publish(&state);
    }

    #[instrument(skip(self))]
    pub async fn toggle_play_pause(&self) -> Result<()> {
        let mut state = self.state.lock().await;
        if state.store.is_empty() {
            self.notify(Notification::info(EMPTY_PLAYLIST_MESSAGE));
            return Err(CoreError::EmptyPlaylist);
        }

        let result = if state.playback.is_playing() {
            self.pause_locked(&mut state);
            Ok(())
        } else {
            self.play_locked(&mut state).await
        };
        self.publish(&state);
        result
    }

    /// Returns `false` while the duration is unknown.
    pub async fn seek(&self, target: SeekTarget) -> bool {
        let mut state = self.state.lock().await;
        let moved = state.playback.seek(target);
        self.publish(&state);
        moved
    }

    pub async fn begin_seek_drag(&self, fraction: f64) -> bool {
        let mut state = self.state.lock().await;
        let moved = state.playback.begin_drag(fraction);
        self.publish(&state);
        moved
    }

    pub async fn update_seek_drag(&self, fraction: f64) -> bool {
        let mut state = self.state.lock().await;
        let moved = state.playback.drag_to(fraction);
        self.publish(&state);
        moved
    }

    pub async fn end_seek_drag(&self) {
        let mut state = self.state.lock().await;
        state.playback.end_drag();
        self.publish(&state);
    }

    /// Set the volume in percent; out-of-range values are clamped.
    pub async fn set_volume(&self, percent: i32) -> u8 {
        let mut state = self.state.lock().await;
        let applied = state.playback.set_volume(percent);
        self.emit(CoreEvent::Playback(PlaybackEvent::VolumeChanged { percent: applied }));
        self.publish(&state);
        applied
    }

    pub async fn adjust_volume(&self, delta: i32) -> u8 {
        let mut state = self.state.lock().await;
        let applied = state.playback.adjust_volume(delta);
        self.emit(CoreEvent::Playback(PlaybackEvent::VolumeChanged { percent: applied }));
        self.publish(&state);
        applied
    }

    pub async fn toggle_repeat_all(&self) -> bool {
        let mut state = self.state.lock().await;
        let enabled = !state.playback.state().repeat_all_enabled;
        state.playback.set_repeat_all(enabled);
        self.emit(CoreEvent::Playback(PlaybackEvent::RepeatAllChanged { enabled }));
        self.publish(&state);
        enabled
    }

    // ------------------------------------------------------------------
    // Read side
    // ------------------------------------------------------------------

    /// The most recently published state.
    pub fn snapshot(&self) -> PlaylistSnapshot {
        self.state_tx.borrow().clone()
    }

    pub fn subscribe_state(&self) -> watch::Receiver<PlaylistSnapshot> {
        self.state_tx.subscribe()
    }

    pub fn events(&self) -> Receiver<CoreEvent> {
        self.event_bus.subscribe()
    }

    /// Only the user notifications.
    pub fn notifications(&self) -> EventStream {
        EventStream::new(self.event_bus.subscribe())
            .filter(|event| matches!(event, CoreEvent::Notification(_)))
    }

    pub fn event_bus(&self) -> &EventBus {
        &self.event_bus
    }

    // ------------------------------------------------------------------
    // Internals (callers hold the state lock)
    // ------------------------------------------------------------------

    fn ingest_locked(
        &self,
        state: &mut CoordinatorState,
        file: &FileDescriptor,
        origin: OriginHint,
    ) -> Result<TrackId> {
        if let Err(e) = check_file(file, self.config.max_upload_bytes) {
            debug!(file = %file.name, reason = %e, "Rejected file");
            self.notify(Notification::error(e.to_string()));
            return Err(e);
        }

        let url = self.object_urls.create_object_url(file)?;
        let track = Track::from_file(&file.name, TrackSource::classify(url), origin);
        let title = track.title.clone();

        let was_empty = state.store.is_empty();
        let id = state.store.append(track);
        let index = state.store.len() - 1;
        self.emit(CoreEvent::Playlist(PlaylistEvent::TrackAdded {
            track_id: id.to_string(),
            title,
            index,
        }));

        if was_empty {
            self.load_index(state, 0);
        }
        Ok(id)
    }

    async fn advance_locked(
        &self,
        state: &mut CoordinatorState,
        direction: Direction,
        was_playing: bool,
    ) -> Result<AdvanceOutcome> {
        let len = state.store.len();
        if len == 0 {
            return Err(CoreError::EmptyPlaylist);
        }

        let cursor = state.cursor.unwrap_or(0);
        let repeat_all = state.playback.state().repeat_all_enabled;

        let target = match direction {
            Direction::Next if cursor + 1 < len => Some(cursor + 1),
            Direction::Next if repeat_all => Some(0),
            Direction::Next => {
                self.pause_locked(state);
                None
            }
            Direction::Previous if cursor > 0 => Some(cursor - 1),
            Direction::Previous if repeat_all => Some(len - 1),
            Direction::Previous => None,
        };

        let Some(target) = target else {
            debug!(?direction, cursor, "Cursor stays");
            return Ok(AdvanceOutcome::Stayed { cursor });
        };

        self.load_index(state, target);
        state.resume_on_metadata = was_playing;
        self.persist(state).await;

        Ok(AdvanceOutcome::Moved {
            cursor: target,
            resume: was_playing,
        })
    }

    async fn push_locked(&self, state: &mut CoordinatorState, index: usize) -> Result<RemoteId> {
        let track = state.store.get(index)?.clone();

        match self.mirror.push(&track).await {
            Ok(remote_id) => {
                let entry = state.store.get_mut(index)?;
                entry.remote_id = Some(remote_id.clone());
                entry.mirrored = true;
                self.emit(CoreEvent::Mirror(MirrorEvent::TrackSynced {
                    track_id: track.id.to_string(),
                    remote_id: remote_id.to_string(),
                }));
                Ok(remote_id)
            }
            Err(e) => {
                warn!(track_id = %track.id, error = %e, "Failed to mirror track");
                self.emit(CoreEvent::Mirror(MirrorEvent::SyncFailed {
                    track_id: track.id.to_string(),
                    message: e.to_string(),
                }));
                Err(e.into())
            }
        }
    }

    /// Load the track at `index` (paused) and make it current.
    fn load_index(&self, state: &mut CoordinatorState, index: usize) {
        let Ok(track) = state.store.get(index).cloned() else {
            return;
        };

        state.cursor = Some(index);
        self.emit_cursor(state);

        match state.playback.load(&track) {
            Ok(()) => self.emit(CoreEvent::Playback(PlaybackEvent::TrackLoaded {
                track_id: track.id.to_string(),
                title: track.title.clone(),
            })),
            Err(e) => self.emit(CoreEvent::Playback(PlaybackEvent::Error {
                track_id: Some(track.id.to_string()),
                message: e.to_string(),
            })),
        }
    }

    fn enter_empty_state(&self, state: &mut CoordinatorState) {
        state.playback.unload();
        state.cursor = None;
        state.resume_on_metadata = false;
        self.emit(CoreEvent::Playback(PlaybackEvent::Unloaded));
        self.emit_cursor(state);
    }

    async fn play_locked(&self, state: &mut CoordinatorState) -> Result<()> {
        if state.playback.loaded_track().is_none() {
            let index = state.cursor.unwrap_or(0);
            self.load_index(state, index);
        }
        if let Err(e) = state.playback.play().await {
            self.notify(Notification::error(PLAYBACK_REFUSED_MESSAGE));
            return Err(e.into());
        }
        self.emit(CoreEvent::Playback(PlaybackEvent::Started {
            track_id: Self::loaded_id(state),
        }));
        Ok(())
    }

    async fn start_playback(&self, state: &mut CoordinatorState) {
        if let Err(e) = self.play_locked(state).await {
            warn!(error = %e, "Could not resume playback");
        }
    }

    fn pause_locked(&self, state: &mut CoordinatorState) {
        state.resume_on_metadata = false;
        let was_playing = state.playback.is_playing();
        state.playback.pause();
        if was_playing {
            self.emit(CoreEvent::Playback(PlaybackEvent::Paused {
                track_id: Self::loaded_id(state),
            }));
        }
    }

    fn loaded_id(state: &CoordinatorState) -> String {
        state
            .playback
            .loaded_track()
            .map(|id| id.to_string())
            .unwrap_or_default()
    }

    /// Write the snapshot. Failures leave the in-memory state untouched.
    async fn persist(&self, state: &CoordinatorState) {
        let snapshot = PersistedSnapshot::capture(state.store.all(), state.cursor);
        if let Err(e) = self.persistence.save(&snapshot).await {
            warn!(error = %e, quota = e.is_quota_exceeded(), "Failed to save playlist");
            self.emit(CoreEvent::Playlist(PlaylistEvent::PersistFailed {
                message: e.to_string(),
            }));
        }
    }

    fn publish(&self, state: &CoordinatorState) -> PlaylistSnapshot {
        let playback = state.playback.state();
        let snapshot = PlaylistSnapshot {
            tracks: state.store.all().to_vec(),
            cursor: state.cursor,
            current_track_id: state
                .cursor
                .and_then(|index| state.store.get(index).ok())
                .map(|track| track.id.clone()),
            repeat_all_enabled: playback.repeat_all_enabled,
            playback,
            mirror_enabled: self.mirror.is_enabled(),
        };
        self.state_tx.send_replace(snapshot.clone());
        snapshot
    }

    fn emit_cursor(&self, state: &CoordinatorState) {
        let track_id = state
            .cursor
            .and_then(|index| state.store.get(index).ok())
            .map(|track| track.id.to_string());
        self.emit(CoreEvent::Playlist(PlaylistEvent::CursorChanged {
            cursor: state.cursor,
            track_id,
        }));
    }

    fn notify(&self, notification: Notification) {
        self.emit(CoreEvent::Notification(notification));
    }

    fn emit(&self, event: CoreEvent) {
        let description = event.description();
        match event.severity() {
            EventSeverity::Error => error!(event = ?event, "{}", description),
            EventSeverity::Warning => warn!(event = ?event, "{}", description),
            EventSeverity::Info => info!(event = ?event, "{}", description),
            EventSeverity::Debug => trace!(event = ?event, "{}", description),
        }
        // no subscribers is fine
        let _ = self.event_bus.emit(event);
    }
}

impl std::fmt::Debug for PlaylistCoordinator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PlaylistCoordinator")
            .field("config", &self.config)
            .field("mirror_enabled", &self.mirror.is_enabled())
            .field("event_bus", &self.event_bus)
            .finish_non_exhaustive()
    }
}
