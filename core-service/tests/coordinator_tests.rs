//! Integration tests for the playlist coordinator
//!
//! These tests drive the coordinator through in-memory bridges:
//! - Ingestion, rejection and removal with cursor adjustment
//! - Navigation with and without repeat-all
//! - Media signal handling (auto-advance, resume on metadata, errors)
//! - Persistence round-trips across coordinator instances
//! - Remote mirror pull/merge, single and batch sync
//! - Folder scans (depth, dedup, cancellation, failures)

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use bridge_traits::{
    error::{BridgeError, Result as BridgeResult},
    media::{MediaElement, MediaSignal},
    remote::{DocumentCollection, RemoteDocument, SongDocument},
    source::{DirectoryEntry, DirectoryHandle, DirectoryPicker, FileDescriptor, ObjectUrlRegistry},
    storage::KeyValueStore,
};
use core_playback::{PlaybackStatus, SeekTarget, SignalOutcome};
use core_playlist::{OriginHint, PersistedSnapshot, RemoteId, Track};
use core_runtime::config::{MirrorSettings, PlayerConfig, DEFAULT_PLAYLIST_KEY};
use core_runtime::events::{
    CoreEvent, EventStream, MirrorEvent, Notification, NotificationLevel, PlaylistEvent, Receiver,
    RecvError,
};
use core_service::{
    AdvanceOutcome, CoreDependencies, CoreError, Direction, PlaylistCoordinator, ScanOutcome,
};
use tokio::sync::broadcast::error::TryRecvError;
use tokio::sync::Notify;

const MB: u64 = 1024 * 1024;

// ============================================================================
// Fake Bridges
// ============================================================================

#[derive(Default)]
struct MemoryStore {
    slots: Mutex<HashMap<String, String>>,
    fail_writes: AtomicBool,
}

#[async_trait]
impl KeyValueStore for MemoryStore {
    async fn get_string(&self, key: &str) -> BridgeResult<Option<String>> {
        Ok(self.slots.lock().unwrap().get(key).cloned())
    }

    async fn set_string(&self, key: &str, value: &str) -> BridgeResult<()> {
        if self.fail_writes.load(Ordering::SeqCst) {
            return Err(BridgeError::QuotaExceeded("storage full".into()));
        }
        self.slots
            .lock()
            .unwrap()
            .insert(key.to_string(), value.to_string());
        Ok(())
    }

    async fn delete(&self, key: &str) -> BridgeResult<()> {
        self.slots.lock().unwrap().remove(key);
        Ok(())
    }
}

struct MediaState {
    src: String,
    playing: bool,
    refuse_play: bool,
    position: f64,
    duration: Option<f64>,
    volume: f64,
    play_calls: usize,
}

struct FakeMedia {
    state: Mutex<MediaState>,
}

impl FakeMedia {
    fn new() -> Self {
        Self {
            state: Mutex::new(MediaState {
                src: String::new(),
                playing: false,
                refuse_play: false,
                position: 0.0,
                duration: Some(120.0),
                volume: 1.0,
                play_calls: 0,
            }),
        }
    }

    fn is_playing(&self) -> bool {
        self.state.lock().unwrap().playing
    }

    fn play_calls(&self) -> usize {
        self.state.lock().unwrap().play_calls
    }
}

#[async_trait]
impl MediaElement for FakeMedia {
    fn set_src(&self, src: &str) {
        let mut state = self.state.lock().unwrap();
        state.src = src.to_string();
        state.position = 0.0;
    }

    fn src(&self) -> String {
        self.state.lock().unwrap().src.clone()
    }

    fn load(&self) {}

    async fn play(&self) -> BridgeResult<()> {
        let mut state = self.state.lock().unwrap();
        if state.refuse_play {
            return Err(BridgeError::OperationFailed("NotAllowedError".into()));
        }
        state.playing = true;
        state.play_calls += 1;
        Ok(())
    }

    fn pause(&self) {
        self.state.lock().unwrap().playing = false;
    }

    fn current_time(&self) -> f64 {
        self.state.lock().unwrap().position
    }

    fn set_current_time(&self, seconds: f64) {
        self.state.lock().unwrap().position = seconds;
    }

    fn duration(&self) -> Option<f64> {
        self.state.lock().unwrap().duration
    }

    fn volume(&self) -> f64 {
        self.state.lock().unwrap().volume
    }

    fn set_volume(&self, volume: f64) {
        self.state.lock().unwrap().volume = volume;
    }
}

#[derive(Default)]
struct FakeUrls {
    next: AtomicUsize,
    revoked: Mutex<Vec<String>>,
}

impl ObjectUrlRegistry for FakeUrls {
    fn create_object_url(&self, _file: &FileDescriptor) -> BridgeResult<String> {
        let id = self.next.fetch_add(1, Ordering::SeqCst);
        Ok(format!("blob:test/{}", id))
    }

    fn revoke_object_url(&self, url: &str) {
        self.revoked.lock().unwrap().push(url.to_string());
    }
}

#[derive(Default)]
struct FakeCollection {
    documents: Mutex<Vec<RemoteDocument>>,
    added: Mutex<Vec<SongDocument>>,
    deleted: Mutex<Vec<String>>,
    failing_titles: Mutex<Vec<String>>,
    fail_list: AtomicBool,
    gate: Mutex<Option<Arc<WriteGate>>>,
}

/// Holds the next `add` until released.
#[derive(Default)]
struct WriteGate {
    entered: Notify,
    release: Notify,
}

impl FakeCollection {
    fn with_documents(documents: Vec<RemoteDocument>) -> Self {
        Self {
            documents: Mutex::new(documents),
            ..Self::default()
        }
    }

    fn fail_title(&self, title: &str) {
        self.failing_titles.lock().unwrap().push(title.to_string());
    }

    fn added_count(&self) -> usize {
        self.added.lock().unwrap().len()
    }

    fn hold_next_add(&self) -> Arc<WriteGate> {
        let gate = Arc::new(WriteGate::default());
        *self.gate.lock().unwrap() = Some(gate.clone());
        gate
    }
}

#[async_trait]
impl DocumentCollection for FakeCollection {
    async fn list_by_created_desc(&self) -> BridgeResult<Vec<RemoteDocument>> {
        if self.fail_list.load(Ordering::SeqCst) {
            return Err(BridgeError::OperationFailed("offline".into()));
        }
        Ok(self.documents.lock().unwrap().clone())
    }

    async fn add(&self, document: SongDocument) -> BridgeResult<String> {
        let gate = self.gate.lock().unwrap().take();
        if let Some(gate) = gate {
            gate.entered.notify_one();
            gate.release.notified().await;
        }
        if self.failing_titles.lock().unwrap().contains(&document.title) {
            return Err(BridgeError::OperationFailed("permission denied".into()));
        }
        let mut added = self.added.lock().unwrap();
        added.push(document);
        Ok(format!("doc-{}", added.len()))
    }

    async fn delete(&self, id: &str) -> BridgeResult<()> {
        self.deleted.lock().unwrap().push(id.to_string());
        Ok(())
    }
}

#[derive(Clone)]
enum Node {
    File(&'static str, &'static str, u64),
    Dir(&'static str, Vec<Node>),
}

struct FakeDir {
    name: &'static str,
    children: Vec<Node>,
}

#[async_trait]
impl DirectoryHandle for FakeDir {
    fn name(&self) -> String {
        self.name.to_string()
    }

    async fn entries(&self) -> BridgeResult<Vec<DirectoryEntry>> {
        Ok(self
            .children
            .iter()
            .cloned()
            .map(|node| match node {
                Node::File(name, mime, size) => {
                    DirectoryEntry::File(FileDescriptor::new(name, mime, size, name))
                }
                Node::Dir(name, children) => {
                    DirectoryEntry::Directory(Box::new(FakeDir { name, children }))
                }
            })
            .collect())
    }
}

enum FakePicker {
    Folder(Vec<Node>),
    Dismissed,
    Denied,
}

#[async_trait]
impl DirectoryPicker for FakePicker {
    async fn pick_directory(&self) -> BridgeResult<Box<dyn DirectoryHandle>> {
        match self {
            FakePicker::Folder(children) => Ok(Box::new(FakeDir {
                name: "music",
                children: children.clone(),
            })),
            FakePicker::Dismissed => Err(BridgeError::Cancelled),
            FakePicker::Denied => Err(BridgeError::OperationFailed("SecurityError".into())),
        }
    }
}

// ============================================================================
// Harness
// ============================================================================

struct Harness {
    coordinator: PlaylistCoordinator,
    media: Arc<FakeMedia>,
    urls: Arc<FakeUrls>,
    store: Arc<MemoryStore>,
}

fn build(
    config: PlayerConfig,
    store: Arc<MemoryStore>,
    documents: Option<Arc<FakeCollection>>,
    picker: Option<FakePicker>,
) -> Harness {
    let media = Arc::new(FakeMedia::new());
    let urls = Arc::new(FakeUrls::default());

    let mut deps = CoreDependencies::new(store.clone(), media.clone(), urls.clone());
    if let Some(documents) = documents {
        deps = deps.with_documents(documents);
    }
    if let Some(picker) = picker {
        deps = deps.with_directory_picker(Arc::new(picker));
    }

    Harness {
        coordinator: PlaylistCoordinator::new(config, deps).expect("coordinator"),
        media,
        urls,
        store,
    }
}

async fn local_harness() -> Harness {
    let harness = build(
        PlayerConfig::default(),
        Arc::new(MemoryStore::default()),
        None,
        None,
    );
    harness.coordinator.bootstrap().await.expect("bootstrap");
    harness
}

fn mirror_config() -> PlayerConfig {
    PlayerConfig::builder()
        .mirror(MirrorSettings::default())
        .build()
        .expect("config")
}

fn audio(name: &str) -> FileDescriptor {
    FileDescriptor::new(name, "audio/mpeg", 3 * MB, name)
}

fn remote_doc(id: &str, title: &str) -> RemoteDocument {
    RemoteDocument {
        id: id.to_string(),
        fields: SongDocument {
            title: title.to_string(),
            artist: Some("Remote Artist".to_string()),
            album_art: None,
            file_url: Some(format!("https://cdn.example/{}.mp3", id)),
            created_at: None,
        },
    }
}

async fn ingest_all(coordinator: &PlaylistCoordinator, names: &[&str]) {
    for name in names {
        coordinator
            .ingest(audio(name), OriginHint::ManualUpload)
            .await
            .expect("ingest");
    }
}

fn drain_notifications(stream: &mut EventStream) -> Vec<Notification> {
    let mut notifications = Vec::new();
    while let Some(received) = stream.try_recv() {
        match received {
            Ok(CoreEvent::Notification(notification)) => notifications.push(notification),
            Ok(_) | Err(RecvError::Lagged(_)) => continue,
            Err(RecvError::Closed) => break,
        }
    }
    notifications
}

fn drain_events(rx: &mut Receiver<CoreEvent>) -> Vec<CoreEvent> {
    let mut events = Vec::new();
    loop {
        match rx.try_recv() {
            Ok(event) => events.push(event),
            Err(TryRecvError::Lagged(_)) => continue,
            Err(_) => break,
        }
    }
    events
}

fn titles(coordinator: &PlaylistCoordinator) -> Vec<String> {
    coordinator
        .snapshot()
        .tracks
        .into_iter()
        .map(|track| track.title)
        .collect()
}

// ============================================================================
// Ingestion and removal
// ============================================================================

#[tokio::test]
async fn test_first_ingest_becomes_current_without_playing() {
    let h = local_harness().await;

    h.coordinator
        .ingest(audio("Intro.mp3"), OriginHint::ManualUpload)
        .await
        .unwrap();

    let snapshot = h.coordinator.snapshot();
    assert_eq!(snapshot.cursor, Some(0));
    assert_eq!(snapshot.current_track().unwrap().title, "Intro");
    assert_eq!(snapshot.playback.status, PlaybackStatus::Paused);
    assert!(h.media.src().starts_with("blob:test/"));
    assert_eq!(h.media.play_calls(), 0);

    // later ingests do not move the cursor
    ingest_all(&h.coordinator, &["Second.mp3"]).await;
    assert_eq!(h.coordinator.snapshot().cursor, Some(0));
}

#[tokio::test]
async fn test_size_tracks_ingests_minus_removals_with_unique_ids() {
    let h = local_harness().await;
    ingest_all(&h.coordinator, &["a.mp3", "b.mp3", "c.mp3", "d.mp3", "e.mp3"]).await;

    h.coordinator.remove_track(1).await.unwrap();
    h.coordinator.remove_track(3).await.unwrap();

    let snapshot = h.coordinator.snapshot();
    assert_eq!(snapshot.tracks.len(), 3);
    let mut ids: Vec<_> = snapshot.tracks.iter().map(|t| t.id.clone()).collect();
    ids.sort();
    ids.dedup();
    assert_eq!(ids.len(), 3);
    assert_eq!(titles(&h.coordinator), vec!["a", "c", "d"]);
}

#[tokio::test]
async fn test_oversize_file_is_rejected() {
    let h = local_harness().await;
    let mut rx = h.coordinator.notifications();

    let big = FileDescriptor::new("big.mp3", "audio/mpeg", 60 * MB, "big");
    let err = h
        .coordinator
        .ingest(big, OriginHint::ManualUpload)
        .await
        .unwrap_err();

    assert!(matches!(err, CoreError::RejectedInput { ref name, .. } if name == "big.mp3"));
    assert!(h.coordinator.snapshot().is_empty());

    let notifications = drain_notifications(&mut rx);
    assert!(notifications
        .iter()
        .any(|n| n.message == "File \"big.mp3\" is too large. Maximum size is 50MB."));
}

#[tokio::test]
async fn test_upload_reports_accepted_and_rejected() {
    let h = local_harness().await;

    let report = h
        .coordinator
        .upload_files(vec![
            audio("one.mp3"),
            FileDescriptor::new("cover.png", "image/png", 10, "cover"),
            audio("two.flac"),
        ])
        .await;

    assert_eq!(report.accepted_count(), 2);
    assert_eq!(report.rejected.len(), 1);
    assert_eq!(report.rejected[0].name, "cover.png");
    assert_eq!(titles(&h.coordinator), vec!["one", "two"]);
}

#[tokio::test]
async fn test_removing_only_track_empties_playlist() {
    let h = local_harness().await;
    ingest_all(&h.coordinator, &["solo.mp3"]).await;
    let url = h.media.src();

    let removed = h.coordinator.remove_track(0).await.unwrap();
    assert_eq!(removed.title, "solo");

    let snapshot = h.coordinator.snapshot();
    assert!(snapshot.is_empty());
    assert_eq!(snapshot.cursor, None);
    assert_eq!(snapshot.playback.status, PlaybackStatus::Stopped);
    assert_eq!(h.media.src(), "");
    assert_eq!(h.urls.revoked.lock().unwrap().as_slice(), &[url]);
}

#[tokio::test]
async fn test_remove_adjusts_cursor() {
    let h = local_harness().await;
    ingest_all(&h.coordinator, &["a.mp3", "b.mp3", "c.mp3", "d.mp3"]).await;
    h.coordinator.select(2).await.unwrap();

    // before the cursor: shifts down, same track stays current
    h.coordinator.remove_track(0).await.unwrap();
    let snapshot = h.coordinator.snapshot();
    assert_eq!(snapshot.cursor, Some(1));
    assert_eq!(snapshot.current_track().unwrap().title, "c");

    // after the cursor: unchanged
    h.coordinator.remove_track(2).await.unwrap();
    assert_eq!(h.coordinator.snapshot().cursor, Some(1));

    // the current (last) track: the new last one is loaded
    h.coordinator.remove_track(1).await.unwrap();
    let snapshot = h.coordinator.snapshot();
    assert_eq!(snapshot.cursor, Some(0));
    assert_eq!(snapshot.current_track().unwrap().title, "b");
    assert_eq!(h.media.src(), snapshot.tracks[0].source.url());
}

#[tokio::test]
async fn test_remove_out_of_range() {
    let h = local_harness().await;
    ingest_all(&h.coordinator, &["a.mp3"]).await;

    let err = h.coordinator.remove_track(3).await.unwrap_err();
    assert!(matches!(err, CoreError::IndexOutOfRange { index: 3, len: 1 }));
}

#[tokio::test]
async fn test_toggle_saved() {
    let h = local_harness().await;
    ingest_all(&h.coordinator, &["a.mp3"]).await;

    assert!(h.coordinator.toggle_saved(0).await.unwrap());
    assert!(h.coordinator.snapshot().tracks[0].saved_by_user);
    assert!(!h.coordinator.toggle_saved(0).await.unwrap());
}

// ============================================================================
// Navigation
// ============================================================================

#[tokio::test]
async fn test_repeat_all_cycle_returns_to_start() {
    let h = local_harness().await;
    ingest_all(&h.coordinator, &["a.mp3", "b.mp3", "c.mp3"]).await;
    assert!(h.coordinator.toggle_repeat_all().await);

    for _ in 0..3 {
        h.coordinator.advance(Direction::Next).await.unwrap();
    }
    assert_eq!(h.coordinator.snapshot().cursor, Some(0));

    // previous from the start wraps to the end
    let outcome = h.coordinator.advance(Direction::Previous).await.unwrap();
    assert_eq!(
        outcome,
        AdvanceOutcome::Moved {
            cursor: 2,
            resume: false
        }
    );
}

#[tokio::test]
async fn test_next_at_end_without_repeat_pauses() {
    let h = local_harness().await;
    ingest_all(&h.coordinator, &["A.mp3", "B.mp3", "C.mp3"]).await;
    h.coordinator.select(1).await.unwrap();

    let outcome = h.coordinator.advance(Direction::Next).await.unwrap();
    assert_eq!(
        outcome,
        AdvanceOutcome::Moved {
            cursor: 2,
            resume: false
        }
    );
    let c_url = h.coordinator.snapshot().tracks[2].source.url().to_string();
    assert_eq!(h.media.src(), c_url);

    h.coordinator.play().await.unwrap();
    assert!(h.media.is_playing());

    let outcome = h.coordinator.advance(Direction::Next).await.unwrap();
    assert_eq!(outcome, AdvanceOutcome::Stayed { cursor: 2 });

    let snapshot = h.coordinator.snapshot();
    assert_eq!(snapshot.cursor, Some(2));
    assert_eq!(snapshot.playback.status, PlaybackStatus::Paused);
    assert!(!h.media.is_playing());
}

#[tokio::test]
async fn test_previous_at_start_without_repeat_stays() {
    let h = local_harness().await;
    ingest_all(&h.coordinator, &["a.mp3", "b.mp3"]).await;

    let outcome = h.coordinator.advance(Direction::Previous).await.unwrap();
    assert_eq!(outcome, AdvanceOutcome::Stayed { cursor: 0 });
}

#[tokio::test]
async fn test_commands_on_empty_playlist_notify() {
    let h = local_harness().await;
    let mut rx = h.coordinator.notifications();

    assert!(matches!(
        h.coordinator.advance(Direction::Next).await,
        Err(CoreError::EmptyPlaylist)
    ));
    assert!(matches!(
        h.coordinator.toggle_play_pause().await,
        Err(CoreError::EmptyPlaylist)
    ));
    assert!(matches!(h.coordinator.play().await, Err(CoreError::EmptyPlaylist)));

    let notifications = drain_notifications(&mut rx);
    assert_eq!(notifications.len(), 3);
    assert!(notifications
        .iter()
        .all(|n| n.message == "No songs in playlist. Please add music."));
}

#[tokio::test]
async fn test_select_keeps_playing_after_metadata() {
    let h = local_harness().await;
    ingest_all(&h.coordinator, &["a.mp3", "b.mp3"]).await;
    h.coordinator.toggle_play_pause().await.unwrap();
    assert_eq!(h.media.play_calls(), 1);

    h.coordinator.select(1).await.unwrap();
    assert_eq!(
        h.coordinator.snapshot().playback.status,
        PlaybackStatus::Paused
    );

    h.coordinator
        .handle_media_signal(MediaSignal::MetadataReady)
        .await;
    assert_eq!(
        h.coordinator.snapshot().playback.status,
        PlaybackStatus::Playing
    );
    assert_eq!(h.media.play_calls(), 2);
}

#[tokio::test]
async fn test_refused_play_surfaces_error() {
    let h = local_harness().await;
    ingest_all(&h.coordinator, &["a.mp3"]).await;
    h.media.state.lock().unwrap().refuse_play = true;
    let mut rx = h.coordinator.notifications();

    let err = h.coordinator.play().await.unwrap_err();
    assert!(matches!(err, CoreError::PlaybackRefused(_)));
    assert!(err.is_user_visible());
    assert_eq!(
        h.coordinator.snapshot().playback.status,
        PlaybackStatus::Paused
    );

    assert!(h.coordinator.toggle_play_pause().await.is_err());

    let notifications = drain_notifications(&mut rx);
    assert_eq!(notifications.len(), 2);
    assert!(notifications
        .iter()
        .all(|n| n.level == NotificationLevel::Error && n.message.contains("blocked")));
}

#[tokio::test]
async fn test_refused_resume_after_ended_notifies() {
    let h = local_harness().await;
    ingest_all(&h.coordinator, &["a.mp3", "b.mp3"]).await;
    h.coordinator.play().await.unwrap();
    h.coordinator.handle_media_signal(MediaSignal::Ended).await;
    assert_eq!(h.coordinator.snapshot().cursor, Some(1));

    h.media.state.lock().unwrap().refuse_play = true;
    let mut rx = h.coordinator.notifications();
    h.coordinator
        .handle_media_signal(MediaSignal::MetadataReady)
        .await;

    assert_eq!(
        h.coordinator.snapshot().playback.status,
        PlaybackStatus::Paused
    );
    let notifications = drain_notifications(&mut rx);
    assert_eq!(notifications.len(), 1);
    assert_eq!(notifications[0].level, NotificationLevel::Error);
}

// ============================================================================
// Media signals
// ============================================================================

#[tokio::test]
async fn test_ended_advances_and_resumes_on_metadata() {
    let h = local_harness().await;
    ingest_all(&h.coordinator, &["a.mp3", "b.mp3"]).await;
    h.coordinator.play().await.unwrap();

    let outcome = h.coordinator.handle_media_signal(MediaSignal::Ended).await;
    assert_eq!(outcome, Some(SignalOutcome::Ended { was_playing: true }));
    assert_eq!(h.coordinator.snapshot().cursor, Some(1));
    assert_eq!(h.media.play_calls(), 1);

    h.coordinator
        .handle_media_signal(MediaSignal::MetadataReady)
        .await;
    assert_eq!(h.media.play_calls(), 2);
    assert!(h.coordinator.snapshot().playback.status.is_playing());

    // end of the last track without repeat-all stops
    h.coordinator.handle_media_signal(MediaSignal::Ended).await;
    let snapshot = h.coordinator.snapshot();
    assert_eq!(snapshot.cursor, Some(1));
    assert_eq!(snapshot.playback.status, PlaybackStatus::Paused);
}

#[tokio::test]
async fn test_media_error_notifies_and_cancels_resume() {
    let h = local_harness().await;
    ingest_all(&h.coordinator, &["a.mp3", "b.mp3"]).await;
    h.coordinator.play().await.unwrap();
    h.coordinator.advance(Direction::Next).await.unwrap();

    let mut rx = h.coordinator.notifications();
    h.coordinator
        .handle_media_signal(MediaSignal::Error {
            message: "decode failed".into(),
        })
        .await;
    h.coordinator
        .handle_media_signal(MediaSignal::MetadataReady)
        .await;

    assert_eq!(h.media.play_calls(), 1);
    assert!(h.coordinator.snapshot().playback.status.is_errored());
    let notifications = drain_notifications(&mut rx);
    assert_eq!(
        notifications[0].message,
        "Error playing audio. Please check the file format."
    );
}

#[tokio::test]
async fn test_progress_and_seek() {
    let h = local_harness().await;
    ingest_all(&h.coordinator, &["a.mp3"]).await;
    h.coordinator
        .handle_media_signal(MediaSignal::MetadataReady)
        .await;

    assert!(h.coordinator.seek(SeekTarget::Fraction(0.5)).await);
    assert_eq!(h.media.current_time(), 60.0);

    let outcome = h
        .coordinator
        .handle_media_signal(MediaSignal::PositionUpdate)
        .await;
    match outcome {
        Some(SignalOutcome::Progress(Some(update))) => {
            assert_eq!(update.position_seconds, 60.0);
            assert_eq!(update.position_label, "1:00");
            assert_eq!(update.duration_label, "2:00");
        }
        other => panic!("expected a progress report, got {:?}", other),
    }
    assert_eq!(h.coordinator.snapshot().playback.position_seconds, 60.0);
}

#[tokio::test]
async fn test_volume_commands() {
    let h = local_harness().await;

    assert_eq!(h.coordinator.set_volume(150).await, 100);
    assert_eq!(h.coordinator.adjust_volume(-10).await, 90);
    assert!((h.media.volume() - 0.9).abs() < 1e-9);
    assert_eq!(h.coordinator.snapshot().playback.volume_percent, 90);
}

// ============================================================================
// Bootstrap and persistence
// ============================================================================

#[tokio::test]
async fn test_bootstrap_empty_sends_delayed_hint() {
    let h = build(
        PlayerConfig::default(),
        Arc::new(MemoryStore::default()),
        None,
        None,
    );
    let mut rx = h.coordinator.notifications();

    let snapshot = h.coordinator.bootstrap().await.unwrap();
    assert!(snapshot.is_empty());
    assert_eq!(snapshot.playback.volume_percent, 50);

    let notifications = drain_notifications(&mut rx);
    assert_eq!(notifications.len(), 1);
    assert_eq!(notifications[0].delay_ms, Some(1500));
    assert_eq!(
        notifications[0].message,
        "Add music files or configure cloud sync to sync your library!"
    );
}

#[tokio::test]
async fn test_restart_keeps_durable_tracks_only() {
    let store = Arc::new(MemoryStore::default());
    let collection = Arc::new(FakeCollection::with_documents(vec![remote_doc(
        "r1", "Cloud Song",
    )]));

    let first = build(mirror_config(), store.clone(), Some(collection), None);
    first.coordinator.bootstrap().await.unwrap();
    ingest_all(&first.coordinator, &["local.mp3"]).await;
    first.coordinator.select(1).await.unwrap();
    assert_eq!(titles(&first.coordinator), vec!["Cloud Song", "local"]);

    let second = build(PlayerConfig::default(), store, None, None);
    let snapshot = second.coordinator.bootstrap().await.unwrap();

    assert_eq!(snapshot.tracks.len(), 1);
    assert_eq!(snapshot.tracks[0].title, "Cloud Song");
    assert_eq!(snapshot.tracks[0].remote_id, Some(RemoteId::new("r1")));
    assert_eq!(snapshot.cursor, Some(0));
    assert_eq!(second.media.src(), "https://cdn.example/r1.mp3");
    assert_eq!(second.media.play_calls(), 0);
}

#[tokio::test]
async fn test_persist_failure_keeps_state() {
    let h = local_harness().await;
    h.store.fail_writes.store(true, Ordering::SeqCst);
    let mut rx = h.coordinator.events();

    h.coordinator
        .ingest(audio("a.mp3"), OriginHint::ManualUpload)
        .await
        .unwrap();

    assert_eq!(h.coordinator.snapshot().tracks.len(), 1);
    assert!(drain_events(&mut rx)
        .iter()
        .any(|e| matches!(e, CoreEvent::Playlist(PlaylistEvent::PersistFailed { .. }))));
}

// ============================================================================
// Remote mirror
// ============================================================================

#[tokio::test]
async fn test_pull_does_not_duplicate_known_remote_ids() {
    let store = Arc::new(MemoryStore::default());
    let local = Track::from_remote(
        RemoteId::new("r1"),
        "Known",
        None,
        None,
        "https://cdn.example/r1.mp3",
    );
    let saved = serde_json::to_string(&PersistedSnapshot::capture(&[local], Some(0))).unwrap();
    store
        .slots
        .lock()
        .unwrap()
        .insert(DEFAULT_PLAYLIST_KEY.to_string(), saved);

    let collection = Arc::new(FakeCollection::with_documents(vec![
        remote_doc("r2", "Newer"),
        remote_doc("r1", "Known"),
    ]));
    let h = build(mirror_config(), store, Some(collection), None);
    let mut rx = h.coordinator.events();

    let snapshot = h.coordinator.bootstrap().await.unwrap();
    assert_eq!(titles(&h.coordinator), vec!["Known", "Newer"]);
    assert!(snapshot.mirror_enabled);
    assert!(drain_events(&mut rx).contains(&CoreEvent::Mirror(MirrorEvent::Pulled {
        received: 2,
        merged: 1
    })));
}

#[tokio::test]
async fn test_pull_failure_is_not_fatal() {
    let collection = Arc::new(FakeCollection::default());
    collection.fail_list.store(true, Ordering::SeqCst);
    let h = build(
        mirror_config(),
        Arc::new(MemoryStore::default()),
        Some(collection),
        None,
    );
    let mut rx = h.coordinator.events();

    let snapshot = h.coordinator.bootstrap().await.unwrap();
    assert!(snapshot.is_empty());

    let events = drain_events(&mut rx);
    assert!(events
        .iter()
        .any(|e| matches!(e, CoreEvent::Mirror(MirrorEvent::PullFailed { .. }))));
    assert!(events.iter().any(|e| matches!(
        e,
        CoreEvent::Notification(n) if n.message == "Add music files or sync from your cloud library!"
    )));
}

#[tokio::test]
async fn test_mirror_configuration_requires_collection() {
    let media = Arc::new(FakeMedia::new());
    let deps = CoreDependencies::new(
        Arc::new(MemoryStore::default()),
        media,
        Arc::new(FakeUrls::default()),
    );

    let err = PlaylistCoordinator::new(mirror_config(), deps).unwrap_err();
    assert!(matches!(
        err,
        CoreError::CapabilityMissing { ref capability, .. } if capability == "DocumentCollection"
    ));
}

#[tokio::test]
async fn test_sync_without_mirror_is_not_configured() {
    let h = local_harness().await;
    ingest_all(&h.coordinator, &["a.mp3"]).await;

    assert!(matches!(
        h.coordinator.sync_all().await,
        Err(CoreError::MirrorNotConfigured)
    ));
    assert!(matches!(
        h.coordinator.sync_one(0).await,
        Err(CoreError::MirrorNotConfigured)
    ));
}

#[tokio::test]
async fn test_sync_all_reports_partial_success() {
    let collection = Arc::new(FakeCollection::default());
    collection.fail_title("b");
    let h = build(
        mirror_config(),
        Arc::new(MemoryStore::default()),
        Some(collection.clone()),
        None,
    );
    h.coordinator.bootstrap().await.unwrap();
    ingest_all(&h.coordinator, &["a.mp3", "b.mp3", "c.mp3"]).await;
    let mut rx = h.coordinator.notifications();

    let summary = h.coordinator.sync_all().await.unwrap();
    assert_eq!(summary.succeeded, 2);
    assert_eq!(summary.attempted, 3);

    let snapshot = h.coordinator.snapshot();
    let mirrored: Vec<bool> = snapshot.tracks.iter().map(|t| t.mirrored).collect();
    assert_eq!(mirrored, vec![true, false, true]);

    let messages: Vec<String> = drain_notifications(&mut rx)
        .into_iter()
        .map(|n| n.message)
        .collect();
    assert_eq!(
        messages,
        vec![
            "Syncing 3 tracks to cloud...".to_string(),
            "Successfully synced 2/3 tracks to cloud!".to_string(),
        ]
    );

    // already mirrored: no second write
    let remote_id = h.coordinator.sync_one(0).await.unwrap();
    assert_eq!(remote_id, RemoteId::new("doc-1"));
    assert_eq!(collection.added_count(), 2);
}

#[tokio::test]
async fn test_commands_wait_for_in_flight_batch_sync() {
    let collection = Arc::new(FakeCollection::default());
    let h = build(
        mirror_config(),
        Arc::new(MemoryStore::default()),
        Some(collection.clone()),
        None,
    );
    h.coordinator.bootstrap().await.unwrap();
    ingest_all(&h.coordinator, &["a.mp3", "b.mp3", "c.mp3"]).await;
    let gate = collection.hold_next_add();

    let held = async {
        gate.entered.notified().await;
        // the batch owns the state, so the tick is dropped
        let tick = h
            .coordinator
            .handle_media_signal(MediaSignal::PositionUpdate)
            .await;
        gate.release.notify_one();
        tick
    };
    let (summary, removed, tick) = tokio::join!(
        h.coordinator.sync_all(),
        h.coordinator.remove_track(1),
        held
    );

    assert_eq!(tick, None);
    let summary = summary.unwrap();
    assert_eq!((summary.succeeded, summary.attempted), (3, 3));

    // removal ran after the batch, on the mirrored track it targeted
    let removed = removed.unwrap();
    assert_eq!(removed.title, "b");
    assert_eq!(removed.remote_id, Some(RemoteId::new("doc-2")));
    assert_eq!(*collection.deleted.lock().unwrap(), vec!["doc-2".to_string()]);

    let snapshot = h.coordinator.snapshot();
    assert_eq!(titles(&h.coordinator), vec!["a", "c"]);
    assert_eq!(snapshot.cursor, Some(0));
    let remote_ids: Vec<Option<RemoteId>> = snapshot
        .tracks
        .iter()
        .map(|track| track.remote_id.clone())
        .collect();
    assert_eq!(
        remote_ids,
        vec![Some(RemoteId::new("doc-1")), Some(RemoteId::new("doc-3"))]
    );
}

#[tokio::test]
async fn test_sync_one_failure_notifies() {
    let collection = Arc::new(FakeCollection::default());
    collection.fail_title("a");
    let h = build(
        mirror_config(),
        Arc::new(MemoryStore::default()),
        Some(collection),
        None,
    );
    h.coordinator.bootstrap().await.unwrap();
    ingest_all(&h.coordinator, &["a.mp3"]).await;
    let mut rx = h.coordinator.notifications();

    let err = h.coordinator.sync_one(0).await.unwrap_err();
    assert!(matches!(err, CoreError::MirrorFailure { ref title, .. } if title == "a"));
    assert!(drain_notifications(&mut rx)
        .iter()
        .any(|n| n.message == "Failed to sync \"a\" to cloud"));
}

#[tokio::test]
async fn test_removing_mirrored_track_deletes_remote_copy() {
    let collection = Arc::new(FakeCollection::with_documents(vec![remote_doc(
        "r9", "Remote",
    )]));
    let h = build(
        mirror_config(),
        Arc::new(MemoryStore::default()),
        Some(collection.clone()),
        None,
    );
    h.coordinator.bootstrap().await.unwrap();

    h.coordinator.remove_track(0).await.unwrap();

    assert_eq!(collection.deleted.lock().unwrap().as_slice(), &["r9".to_string()]);
    // durable sources are not object URLs
    assert!(h.urls.revoked.lock().unwrap().is_empty());
}

// ============================================================================
// Folder scan
// ============================================================================

fn scan_tree() -> Vec<Node> {
    vec![
        Node::File("a.mp3", "audio/mpeg", MB),
        Node::File("notes.txt", "text/plain", 10),
        Node::Dir(
            "album",
            vec![
                Node::File("b.mp3", "audio/mpeg", MB),
                Node::Dir("bonus", vec![Node::File("deep.mp3", "audio/mpeg", MB)]),
            ],
        ),
        Node::File("huge.wav", "audio/wav", 60 * MB),
    ]
}

#[tokio::test]
async fn test_scan_adds_new_files_within_depth() {
    let h = build(
        PlayerConfig::default(),
        Arc::new(MemoryStore::default()),
        None,
        Some(FakePicker::Folder(scan_tree())),
    );
    h.coordinator.bootstrap().await.unwrap();
    ingest_all(&h.coordinator, &["a.mp3"]).await;
    let mut rx = h.coordinator.notifications();

    let outcome = h.coordinator.scan_folder().await.unwrap();
    assert_eq!(outcome, ScanOutcome::Loaded { found: 2, loaded: 1 });
    assert_eq!(titles(&h.coordinator), vec!["a", "b"]);
    assert_eq!(
        h.coordinator.snapshot().tracks[1].origin_hint,
        OriginHint::DeviceScan
    );
    assert!(drain_notifications(&mut rx)
        .iter()
        .any(|n| n.message == "Successfully loaded 1 songs from device!"));

    // a second scan finds nothing new
    let outcome = h.coordinator.scan_folder().await.unwrap();
    assert_eq!(outcome, ScanOutcome::NoNewFiles { found: 2 });
}

#[tokio::test]
async fn test_scan_into_empty_playlist_loads_first_track() {
    let h = build(
        PlayerConfig::default(),
        Arc::new(MemoryStore::default()),
        None,
        Some(FakePicker::Folder(scan_tree())),
    );
    h.coordinator.bootstrap().await.unwrap();

    h.coordinator.scan_folder().await.unwrap();
    let snapshot = h.coordinator.snapshot();
    assert_eq!(snapshot.cursor, Some(0));
    assert_eq!(snapshot.current_track().unwrap().title, "a");
    assert_eq!(h.media.play_calls(), 0);
}

#[tokio::test]
async fn test_scan_without_audio_files() {
    let h = build(
        PlayerConfig::default(),
        Arc::new(MemoryStore::default()),
        None,
        Some(FakePicker::Folder(vec![Node::File("readme.md", "text/markdown", 5)])),
    );
    h.coordinator.bootstrap().await.unwrap();
    let mut rx = h.coordinator.notifications();

    assert_eq!(
        h.coordinator.scan_folder().await.unwrap(),
        ScanOutcome::NoAudioFiles
    );
    assert!(drain_notifications(&mut rx)
        .iter()
        .any(|n| n.message == "No audio files found in the selected folder."));
}

#[tokio::test]
async fn test_scan_cancel_is_silent() {
    let h = build(
        PlayerConfig::default(),
        Arc::new(MemoryStore::default()),
        None,
        Some(FakePicker::Dismissed),
    );
    h.coordinator.bootstrap().await.unwrap();
    let mut rx = h.coordinator.notifications();

    assert_eq!(
        h.coordinator.scan_folder().await.unwrap(),
        ScanOutcome::Cancelled
    );
    assert!(drain_notifications(&mut rx).is_empty());
}

#[tokio::test]
async fn test_scan_picker_failure_notifies() {
    let h = build(
        PlayerConfig::default(),
        Arc::new(MemoryStore::default()),
        None,
        Some(FakePicker::Denied),
    );
    h.coordinator.bootstrap().await.unwrap();
    let mut rx = h.coordinator.notifications();

    let outcome = h.coordinator.scan_folder().await.unwrap();
    assert!(matches!(outcome, ScanOutcome::Failed { .. }));
    assert_eq!(
        drain_notifications(&mut rx)[0].message,
        "Failed to access device folder. Please try again."
    );
}

#[tokio::test]
async fn test_scan_without_picker_is_capability_missing() {
    let h = local_harness().await;

    let err = h.coordinator.scan_folder().await.unwrap_err();
    assert!(matches!(
        err,
        CoreError::CapabilityMissing { ref capability, .. } if capability == "DirectoryPicker"
    ));
}
