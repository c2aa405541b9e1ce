//! Playback orchestrator - core state machine
//!
//! Owns the queue, mediates every transport command through the engine and
//! reconciles what it expects against what the engine later reports.
//!
//! Public actions never fail from the caller's point of view: engine errors
//! are logged and the state simply does not change the way it was asked
//! to. The next reconciled status shows what actually happened.

use crate::{
    engine::{AudioEngine, EngineStatus},
    error::{PlaybackError, Result},
    mode::MutationMode,
    reconcile::{resolve, Resolution, TrackSignal},
    shuffle::{shuffle_pinned, shuffle_tracks},
    types::{PlaybackConfig, PlaybackState, PlayerState, QueueState},
};
use lyra_core::{position_of, MediaRef, RepeatMode, Track};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use tokio::sync::watch;
use tracing::{debug, info, warn};

/// Central playback orchestration
///
/// Cheap to clone; clones share the same queue and engine. Locks are never
/// held across an engine call, so actions issued concurrently interleave
/// and the last write to the current index wins.
pub struct PlaybackOrchestrator<E: AudioEngine + ?Sized> {
    engine: Arc<E>,
    shared: Arc<Shared>,
    restart_threshold: f64,
}

impl<E: AudioEngine + ?Sized> Clone for PlaybackOrchestrator<E> {
    fn clone(&self) -> Self {
        Self {
            engine: Arc::clone(&self.engine),
            shared: Arc::clone(&self.shared),
            restart_threshold: self.restart_threshold,
        }
    }
}

struct Shared {
    inner: Mutex<Inner>,
    state_tx: watch::Sender<PlayerState>,
}

struct Inner {
    queue: QueueState,
    /// Insertion order, kept unshuffled for restoring
    original_order: Vec<Track>,
    /// What the user last asked for, until the engine agrees
    optimistic: Option<bool>,
    status: EngineStatus,
    mode: MutationMode,
}

impl Inner {
    fn playback(&self) -> PlaybackState {
        PlaybackState {
            is_playing: self
                .optimistic
                .unwrap_or_else(|| self.status.state.is_playing()),
            is_loaded: self.status.state.is_loaded(),
            is_buffering: self.status.state.is_buffering(),
            current_time: self.status.position,
            duration: self.status.duration,
        }
    }

    fn snapshot(&self) -> PlayerState {
        PlayerState {
            playback: self.playback(),
            queue: self.queue.clone(),
            current_track: self.queue.current_track().cloned(),
        }
    }

    /// Move the current index. A stale play/pause intent is meaningless
    /// across a track boundary, so it is dropped when the track changes.
    fn set_current(&mut self, index: Option<usize>) {
        let before = self.queue.current_track().map(|t| t.id.clone());
        self.queue.current_index = index;
        let after = self.queue.current_track().map(|t| t.id.clone());

        if before != after {
            self.optimistic = None;
        }
    }
}

impl Shared {
    fn lock(&self) -> MutexGuard<'_, Inner> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Mutate the state and publish the new snapshot
    fn update<R>(&self, f: impl FnOnce(&mut Inner) -> R) -> R {
        let mut inner = self.lock();
        let result = f(&mut inner);
        let snapshot = inner.snapshot();
        drop(inner);

        self.state_tx.send_replace(snapshot);
        result
    }
}

impl<E: AudioEngine + ?Sized> PlaybackOrchestrator<E> {
    /// Create an orchestrator with an empty queue
    pub fn new(engine: Arc<E>, config: &PlaybackConfig) -> Self {
        let inner = Inner {
            queue: QueueState {
                shuffle_enabled: config.shuffle,
                repeat_mode: config.repeat,
                ..QueueState::default()
            },
            original_order: Vec::new(),
            optimistic: None,
            status: EngineStatus::default(),
            mode: MutationMode::Idle,
        };
        let (state_tx, _) = watch::channel(inner.snapshot());

        Self {
            engine,
            shared: Arc::new(Shared {
                inner: Mutex::new(inner),
                state_tx,
            }),
            restart_threshold: config.restart_threshold_secs,
        }
    }

    /// The engine this orchestrator drives
    pub fn engine(&self) -> &Arc<E> {
        &self.engine
    }

    // ===== State Queries =====

    /// Current `{playback, queue, current_track}` snapshot
    pub fn state(&self) -> PlayerState {
        self.shared.lock().snapshot()
    }

    /// Watch every published state change
    pub fn subscribe(&self) -> watch::Receiver<PlayerState> {
        self.shared.state_tx.subscribe()
    }

    pub fn queue(&self) -> QueueState {
        self.shared.lock().queue.clone()
    }

    pub fn playback(&self) -> PlaybackState {
        self.shared.lock().playback()
    }

    pub fn current_track(&self) -> Option<Track> {
        self.shared.lock().queue.current_track().cloned()
    }

    /// Pending play/pause intent not yet confirmed by the engine
    pub fn optimistic_playing(&self) -> Option<bool> {
        self.shared.lock().optimistic
    }

    pub fn mutation_mode(&self) -> MutationMode {
        self.shared.lock().mode
    }

    pub fn is_self_mutating(&self) -> bool {
        self.shared.lock().mode.is_self_mutating()
    }

    /// Wait until no self-initiated queue mutation is in flight
    pub async fn settle(&self) {
        while self.is_self_mutating() {
            tokio::task::yield_now().await;
        }
    }

    // ===== Startup =====

    /// Adopt whatever queue the engine already holds
    ///
    /// Covers reattaching to an engine that kept playing in the background.
    /// Failing to read the engine is not an error: the queue stays empty.
    /// Returns whether anything was adopted.
    pub async fn hydrate(&self) -> bool {
        match self.try_hydrate().await {
            Ok(adopted) => adopted,
            Err(e) => {
                warn!(error = %e, "Failed to hydrate player state, starting empty");
                false
            }
        }
    }

    async fn try_hydrate(&self) -> Result<bool> {
        let snapshot = self.engine.get_queue_snapshot().await?;
        if snapshot.is_empty() {
            return Ok(false);
        }

        let active = self.engine.get_active_index().await?;
        let status = self.engine.get_status().await.ok();
        let tracks: Vec<Track> = snapshot.into_iter().map(MediaRef::into_track).collect();
        let index = active.filter(|&i| i < tracks.len()).unwrap_or(0);

        let adopted = self.shared.update(|inner| {
            // An explicit set_queue that raced ahead wins over hydration
            if !inner.queue.tracks.is_empty() {
                return false;
            }

            inner.original_order.clone_from(&tracks);
            inner.queue.tracks = tracks;
            inner.set_current(Some(index));
            if let Some(status) = status {
                inner.status = status;
            }
            true
        });

        if adopted {
            info!(index, "Hydrated queue from engine");
        }
        Ok(adopted)
    }

    // ===== Playback Control =====

    /// Start or resume playback
    ///
    /// The intent is visible in [`state`](Self::state) before the engine
    /// has answered.
    pub async fn play(&self) {
        self.set_optimistic(true);
        if let Err(e) = self.engine.play().await {
            warn!(error = %e, "Engine rejected play");
        }
    }

    /// Pause playback
    pub async fn pause(&self) {
        self.set_optimistic(false);
        if let Err(e) = self.engine.pause().await {
            warn!(error = %e, "Engine rejected pause");
        }
    }

    /// Stop playback, keeping the queue
    pub async fn stop(&self) {
        self.set_optimistic(false);
        if let Err(e) = self.engine.stop().await {
            warn!(error = %e, "Engine rejected stop");
        }
    }

    /// Pause if the engine is playing, play otherwise
    ///
    /// Decides from the engine's reported status, not from any pending
    /// optimistic intent.
    pub async fn toggle_play_pause(&self) {
        if let Err(e) = self.try_toggle_play_pause().await {
            warn!(error = %e, "Error toggling play/pause");
        }
    }

    async fn try_toggle_play_pause(&self) -> Result<()> {
        let status = self.engine.get_status().await?;

        if status.state.is_active() {
            self.set_optimistic(false);
            self.engine.pause().await?;
        } else {
            self.set_optimistic(true);
            self.engine.play().await?;
        }
        Ok(())
    }

    /// Skip to the next track
    ///
    /// At the last track with repeat off this does nothing; otherwise it
    /// wraps to the first track. Repeat-one does not hold an explicit skip.
    pub async fn next(&self) {
        if let Err(e) = self.try_next().await {
            warn!(error = %e, "Failed to skip to next track");
        }
    }

    async fn try_next(&self) -> Result<()> {
        let (len, current, repeat) = self.position();
        if len == 0 {
            return Ok(());
        }

        let is_last = current.is_some_and(|i| i + 1 >= len);
        if is_last && !repeat.wraps() {
            debug!("At last track with repeat off, ignoring next");
            return Ok(());
        }

        let target = match current {
            Some(i) if !is_last => i + 1,
            _ => 0,
        };

        self.engine.skip_to_index(target).await?;
        self.shared.update(|inner| inner.set_current(Some(target)));
        debug!(index = target, "Skipped to next track");
        Ok(())
    }

    /// Go to the previous track
    ///
    /// Past the restart threshold this rewinds the current track instead.
    /// At the first track with repeat off it rewinds as well.
    pub async fn previous(&self) {
        if let Err(e) = self.try_previous().await {
            warn!(error = %e, "Failed to go to previous track");
        }
    }

    async fn try_previous(&self) -> Result<()> {
        let (len, current, repeat) = self.position();
        if len == 0 {
            return Ok(());
        }

        let position = match self.engine.get_status().await {
            Ok(status) => {
                self.apply_status(status);
                status.position
            }
            Err(e) => {
                debug!(error = %e, "Status unavailable, using last known position");
                self.cached_position()
            }
        };

        if position > self.restart_threshold {
            debug!(position, "Restarting current track");
            self.engine.seek_to(0.0).await?;
            return Ok(());
        }

        let is_first = current.map_or(true, |i| i == 0);
        if is_first && !repeat.wraps() {
            self.engine.seek_to(0.0).await?;
            return Ok(());
        }

        let target = match current {
            Some(i) if !is_first => i - 1,
            _ => len - 1,
        };

        self.engine.skip_to_index(target).await?;
        self.shared.update(|inner| inner.set_current(Some(target)));
        debug!(index = target, "Skipped to previous track");
        Ok(())
    }

    /// Seek within the current track. The engine clamps.
    pub async fn seek_to(&self, seconds: f64) {
        if let Err(e) = self.engine.seek_to(seconds).await {
            warn!(error = %e, seconds, "Engine rejected seek");
        }
    }

    // ===== Queue Management =====

    /// Replace the queue and start playing at `start_index`
    ///
    /// With shuffle on, the effective order is a shuffle of `tracks` while
    /// the given order is kept for restoring. An out-of-range start index
    /// starts at the first track.
    pub async fn set_queue(&self, tracks: Vec<Track>, start_index: usize) {
        self.enter_self_mutation();
        let result = self.try_set_queue(tracks, start_index).await;
        self.exit_self_mutation_deferred();

        if let Err(e) = result {
            warn!(error = %e, "Failed to load queue into engine");
        }
    }

    async fn try_set_queue(&self, tracks: Vec<Track>, start_index: usize) -> Result<()> {
        let shuffle = self.shared.lock().queue.shuffle_enabled;
        let ordered = if shuffle {
            shuffle_tracks(&tracks)
        } else {
            tracks.clone()
        };

        let start = if start_index < ordered.len() {
            start_index
        } else {
            if !ordered.is_empty() {
                debug!(start_index, len = ordered.len(), "Start index out of range, using 0");
            }
            0
        };

        self.engine.reset_queue().await?;
        self.engine.load_queue(to_media(&ordered)).await?;

        if !ordered.is_empty() {
            if start > 0 {
                self.engine.skip_to_index(start).await?;
            }
            self.engine.play().await?;
        }

        let len = ordered.len();
        self.shared.update(|inner| {
            inner.original_order = tracks;
            inner.queue.tracks = ordered;
            inner.set_current((len > 0).then_some(start));
        });
        info!(tracks = len, start, shuffle, "Queue replaced");
        Ok(())
    }

    /// Append tracks without touching the transport
    pub async fn add_to_queue(&self, tracks: Vec<Track>) {
        if tracks.is_empty() {
            return;
        }

        self.enter_self_mutation();
        let result = self.try_add_to_queue(tracks).await;
        self.exit_self_mutation_deferred();

        if let Err(e) = result {
            warn!(error = %e, "Failed to append to engine queue");
        }
    }

    async fn try_add_to_queue(&self, tracks: Vec<Track>) -> Result<()> {
        self.engine.load_queue(to_media(&tracks)).await?;

        let added = tracks.len();
        self.shared.update(|inner| {
            inner.original_order.extend(tracks.iter().cloned());
            inner.queue.tracks.extend(tracks);
        });
        debug!(added, "Appended to queue");
        Ok(())
    }

    /// Jump to a queue position and play
    ///
    /// Out-of-range indices are ignored; stale indices from the UI or a
    /// remote control are expected.
    pub async fn select_track(&self, index: usize) {
        let len = self.shared.lock().queue.len();
        if index >= len {
            debug!(index, len, "Ignoring out-of-range track selection");
            return;
        }

        self.enter_self_mutation();
        let result = self.try_select_track(index).await;
        self.exit_self_mutation_deferred();

        if let Err(e) = result {
            warn!(error = %e, index, "Failed to select track");
        }
    }

    async fn try_select_track(&self, index: usize) -> Result<()> {
        self.engine.skip_to_index(index).await?;
        self.engine.play().await?;

        self.shared.update(|inner| {
            if index < inner.queue.len() {
                inner.set_current(Some(index));
                Ok(())
            } else {
                Err(PlaybackError::IndexOutOfBounds {
                    index,
                    len: inner.queue.len(),
                })
            }
        })
    }

    // ===== Shuffle & Repeat =====

    /// Toggle shuffle
    ///
    /// Enabling pins the current track to the front and shuffles the rest
    /// after it. Disabling restores the insertion order and follows the
    /// current track to its original position. Either way the engine queue
    /// is reloaded and playback resumes on the same track.
    pub async fn toggle_shuffle(&self) {
        self.enter_self_mutation();
        let result = self.try_toggle_shuffle().await;
        self.exit_self_mutation_deferred();

        if let Err(e) = result {
            warn!(error = %e, "Failed to sync shuffled queue with engine");
        }
    }

    async fn try_toggle_shuffle(&self) -> Result<()> {
        let (tracks, index, enabled) = self.shared.update(|inner| {
            let enabling = !inner.queue.shuffle_enabled;
            let current = inner.queue.current_track().cloned();

            let tracks = if enabling {
                shuffle_pinned(&inner.queue.tracks, inner.queue.current_index)
            } else {
                inner.original_order.clone()
            };

            let index = match current {
                None => None,
                Some(_) if enabling => Some(0),
                Some(track) => Some(position_of(&tracks, &track.id).unwrap_or(0)),
            };

            inner.queue.shuffle_enabled = enabling;
            inner.queue.tracks.clone_from(&tracks);
            inner.set_current(index.filter(|_| !tracks.is_empty()));
            (tracks, inner.queue.current_index, enabling)
        });

        info!(enabled, "Shuffle toggled");

        if tracks.is_empty() {
            return Ok(());
        }

        self.engine.reset_queue().await?;
        self.engine.load_queue(to_media(&tracks)).await?;
        if let Some(index) = index {
            self.engine.skip_to_index(index).await?;
            self.engine.play().await?;
        }
        Ok(())
    }

    /// Cycle repeat mode `off -> all -> one -> off`
    pub async fn cycle_repeat_mode(&self) {
        let mode = self.shared.update(|inner| {
            inner.queue.repeat_mode = inner.queue.repeat_mode.next();
            inner.queue.repeat_mode
        });
        info!(mode = %mode, "Repeat mode changed");

        if let Err(e) = self.engine.set_repeat_mode(mode).await {
            warn!(error = %e, "Engine rejected repeat mode");
        }
    }

    // ===== Reconciliation =====

    /// Handle a pushed "active track changed" notification
    ///
    /// A notification without a track is ambiguous, so the engine is asked
    /// for its active index instead of assuming playback stopped.
    pub async fn on_active_track_changed(&self, media: Option<&MediaRef>) {
        let signal = TrackSignal::Track(media.map(|m| m.id.clone()));
        if self.reconcile(&signal, "event") != Resolution::Query {
            return;
        }

        match self.engine.get_active_index().await {
            Ok(index) => {
                self.reconcile(&TrackSignal::Index(index), "index");
            }
            Err(e) => warn!(error = %e, "Failed to get active track index"),
        }
    }

    /// Handle an active index read back from the engine
    ///
    /// Returns whether the current index moved.
    pub fn on_active_index(&self, index: Option<usize>) -> bool {
        matches!(
            self.reconcile(&TrackSignal::Index(index), "poll"),
            Resolution::Adopt(_)
        )
    }

    /// Record an engine status update
    ///
    /// Clears the optimistic flag once the engine agrees with it.
    pub fn apply_status(&self, status: EngineStatus) {
        self.shared.update(|inner| {
            inner.status = status;
            if inner.optimistic == Some(status.state.is_playing()) {
                debug!(state = ?status.state, "Engine caught up with optimistic state");
                inner.optimistic = None;
            }
        });
    }

    fn reconcile(&self, signal: &TrackSignal, source: &'static str) -> Resolution {
        let mut inner = self.shared.lock();
        if inner.mode.is_self_mutating() {
            debug!(source, ?signal, "Ignoring track change during own queue update");
            return Resolution::Ignore;
        }

        let resolution = resolve(&inner.queue, signal);
        if let Resolution::Adopt(index) = resolution {
            inner.set_current(Some(index));
            inner.optimistic = None;

            let title = inner
                .queue
                .current_track()
                .map(|t| t.title.clone())
                .unwrap_or_default();
            debug!(source, index, title = %title, "Track changed");

            let snapshot = inner.snapshot();
            drop(inner);
            self.shared.state_tx.send_replace(snapshot);
        }
        resolution
    }

    // ===== Internal helpers =====

    fn position(&self) -> (usize, Option<usize>, RepeatMode) {
        let inner = self.shared.lock();
        (
            inner.queue.len(),
            inner.queue.current_index,
            inner.queue.repeat_mode,
        )
    }

    fn cached_position(&self) -> f64 {
        self.shared.lock().status.position
    }

    fn set_optimistic(&self, playing: bool) {
        self.shared.update(|inner| inner.optimistic = Some(playing));
    }

    fn enter_self_mutation(&self) {
        self.shared.lock().mode.enter();
    }

    /// Lower the guard on the next scheduler turn, so notifications sent in
    /// direct response to the commands just issued are still dropped.
    fn exit_self_mutation_deferred(&self) {
        let shared = Arc::clone(&self.shared);
        match tokio::runtime::Handle::try_current() {
            Ok(handle) => {
                handle.spawn(async move {
                    shared.lock().mode.exit();
                });
            }
            Err(_) => shared.lock().mode.exit(),
        }
    }
}

fn to_media(tracks: &[Track]) -> Vec<MediaRef> {
    tracks.iter().map(MediaRef::from).collect()
}
