//! In-memory audio engine
//!
//! Keeps a queue, an active index and a playhead without producing sound.
//! Time only moves through [`SimulatedEngine::advance`], which makes track
//! boundaries deterministic. Used by the CLI and by tests that need an
//! engine with realistic quirks: notifications can be suppressed and single
//! commands can be made to fail.

use crate::{
    engine::{AudioEngine, EngineEvent, EngineOptions, EngineState, EngineStatus, EngineSubscription},
    remote::RemoteCommand,
};
use async_trait::async_trait;
use lyra_core::{LyraError, MediaRef, RepeatMode, Result, TrackId};
use std::collections::HashSet;
use std::sync::{Mutex, MutexGuard, PoisonError};
use tokio::sync::broadcast;
use tracing::trace;

const EVENT_CAPACITY: usize = 64;

/// Engine operations that can be made to fail
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EngineOp {
    Setup,
    ResetQueue,
    LoadQueue,
    SkipToIndex,
    Play,
    Pause,
    Stop,
    SeekTo,
    SetRepeatMode,
    GetActiveIndex,
    GetActiveTrack,
    GetStatus,
    GetQueueSnapshot,
}

/// Journal entry for a state-changing command the engine accepted
#[derive(Debug, Clone, PartialEq)]
pub enum EngineCommand {
    Setup,
    ResetQueue,
    LoadQueue(Vec<TrackId>),
    SkipToIndex(usize),
    Play,
    Pause,
    Stop,
    SeekTo(f64),
    SetRepeatMode(RepeatMode),
}

#[derive(Default)]
struct SimState {
    initialized: bool,
    queue: Vec<MediaRef>,
    active: Option<usize>,
    state: EngineState,
    position: f64,
    repeat: RepeatMode,
    drop_track_events: bool,
    failures: HashSet<EngineOp>,
    journal: Vec<EngineCommand>,
}

impl SimState {
    fn duration(&self) -> f64 {
        self.active
            .and_then(|i| self.queue.get(i))
            .map_or(0.0, |m| m.duration)
    }

    fn status(&self) -> EngineStatus {
        EngineStatus {
            state: self.state,
            position: self.position,
            duration: self.duration(),
        }
    }

    fn active_media(&self) -> Option<MediaRef> {
        self.active.and_then(|i| self.queue.get(i)).cloned()
    }

    /// Consume a one-shot failure for `op`
    fn check(&mut self, op: EngineOp) -> Result<()> {
        if self.failures.remove(&op) {
            return Err(LyraError::engine(format!("simulated {op:?} failure")));
        }
        Ok(())
    }
}

/// Deterministic engine with no audio output
pub struct SimulatedEngine {
    state: Mutex<SimState>,
    events: broadcast::Sender<EngineEvent>,
}

impl Default for SimulatedEngine {
    fn default() -> Self {
        Self::new()
    }
}

impl SimulatedEngine {
    /// Empty engine, not yet set up
    pub fn new() -> Self {
        let (events, _) = broadcast::channel(EVENT_CAPACITY);
        Self {
            state: Mutex::new(SimState::default()),
            events,
        }
    }

    /// Engine that already holds a queue, as if playback had been running
    /// before the app attached to it
    pub fn with_queue(media: Vec<MediaRef>, active: Option<usize>) -> Self {
        let engine = Self::new();
        {
            let mut state = engine.lock();
            state.initialized = true;
            state.active = active.filter(|&i| i < media.len());
            state.state = if state.active.is_some() {
                EngineState::Paused
            } else {
                EngineState::None
            };
            state.queue = media;
        }
        engine
    }

    fn lock(&self) -> MutexGuard<'_, SimState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn emit(&self, event: EngineEvent) {
        if matches!(event, EngineEvent::ActiveTrackChanged(_)) && self.lock().drop_track_events {
            trace!("Dropping track change notification");
            return;
        }
        // No subscribers is fine
        let _ = self.events.send(event);
    }

    fn emit_track(&self, media: Option<MediaRef>, status: EngineStatus) {
        self.emit(EngineEvent::ActiveTrackChanged(media));
        self.emit(EngineEvent::StatusChanged(status));
    }

    // ===== Test controls =====

    /// Make the next call of `op` fail
    pub fn fail_next(&self, op: EngineOp) {
        self.lock().failures.insert(op);
    }

    /// Suppress pushed track-change notifications, leaving only polling
    pub fn set_drop_track_events(&self, drop: bool) {
        self.lock().drop_track_events = drop;
    }

    /// Simulate a lock-screen or headset button
    pub fn emit_remote(&self, command: RemoteCommand) {
        self.emit(EngineEvent::Remote(command));
    }

    /// Force the transport state
    pub fn set_state(&self, new_state: EngineState) {
        let status = {
            let mut state = self.lock();
            state.state = new_state;
            state.status()
        };
        self.emit(EngineEvent::StatusChanged(status));
    }

    /// Move the playhead without seeking semantics
    pub fn set_position(&self, seconds: f64) {
        self.lock().position = seconds.max(0.0);
    }

    /// Commands accepted so far, oldest first
    pub fn commands(&self) -> Vec<EngineCommand> {
        self.lock().journal.clone()
    }

    pub fn clear_commands(&self) {
        self.lock().journal.clear();
    }

    pub fn active_index(&self) -> Option<usize> {
        self.lock().active
    }

    pub fn queue_ids(&self) -> Vec<TrackId> {
        self.lock().queue.iter().map(|m| m.id.clone()).collect()
    }

    pub fn transport(&self) -> EngineStatus {
        self.lock().status()
    }

    /// Let `seconds` of playback elapse
    ///
    /// Only moves while playing. Crossing the end of a track follows the
    /// repeat mode: `One` restarts it, `All` wraps at the end of the queue,
    /// `Off` advances or ends playback after the last track.
    pub fn advance(&self, seconds: f64) {
        let boundary = {
            let mut state = self.lock();
            if state.state != EngineState::Playing {
                return;
            }

            state.position += seconds;
            let duration = state.duration();
            if duration <= 0.0 || state.position < duration {
                return;
            }

            let current = state.active.unwrap_or(0);
            let is_last = current + 1 >= state.queue.len();

            match state.repeat {
                RepeatMode::One => {
                    state.position = 0.0;
                    Boundary::Restarted
                }
                RepeatMode::Off if is_last => {
                    state.position = duration;
                    state.state = EngineState::Ended;
                    Boundary::Ended
                }
                _ => {
                    state.active = Some(if is_last { 0 } else { current + 1 });
                    state.position = 0.0;
                    Boundary::Advanced(state.active_media())
                }
            }
        };

        let status = self.transport();
        match boundary {
            Boundary::Advanced(media) => {
                trace!(index = ?self.active_index(), "Advanced to next track");
                self.emit_track(media, status);
            }
            Boundary::Ended => self.emit(EngineEvent::StatusChanged(status)),
            Boundary::Restarted => {}
        }
    }
}

/// What happened when the playhead crossed the end of a track
enum Boundary {
    Restarted,
    Ended,
    Advanced(Option<MediaRef>),
}

#[async_trait]
impl AudioEngine for SimulatedEngine {
    async fn setup(&self, _options: &EngineOptions) -> Result<()> {
        let mut state = self.lock();
        state.check(EngineOp::Setup)?;
        if state.initialized {
            return Err(LyraError::engine("player already initialized"));
        }
        state.initialized = true;
        state.journal.push(EngineCommand::Setup);
        Ok(())
    }

    async fn reset_queue(&self) -> Result<()> {
        let status = {
            let mut state = self.lock();
            state.check(EngineOp::ResetQueue)?;
            state.queue.clear();
            state.active = None;
            state.position = 0.0;
            state.state = EngineState::None;
            state.journal.push(EngineCommand::ResetQueue);
            state.status()
        };
        self.emit_track(None, status);
        Ok(())
    }

    async fn load_queue(&self, media: Vec<MediaRef>) -> Result<()> {
        let first = {
            let mut state = self.lock();
            state.check(EngineOp::LoadQueue)?;
            state
                .journal
                .push(EngineCommand::LoadQueue(media.iter().map(|m| m.id.clone()).collect()));
            state.queue.extend(media);

            if state.active.is_none() && !state.queue.is_empty() {
                state.active = Some(0);
                state.position = 0.0;
                state.state = EngineState::Ready;
                Some((state.active_media(), state.status()))
            } else {
                None
            }
        };

        if let Some((media, status)) = first {
            self.emit_track(media, status);
        }
        Ok(())
    }

    async fn skip_to_index(&self, index: usize) -> Result<()> {
        let (media, status) = {
            let mut state = self.lock();
            state.check(EngineOp::SkipToIndex)?;
            if index >= state.queue.len() {
                return Err(LyraError::engine(format!(
                    "index {index} out of bounds for queue of {}",
                    state.queue.len()
                )));
            }
            state.active = Some(index);
            state.position = 0.0;
            if matches!(
                state.state,
                EngineState::None | EngineState::Stopped | EngineState::Ended
            ) {
                state.state = EngineState::Ready;
            }
            state.journal.push(EngineCommand::SkipToIndex(index));
            (state.active_media(), state.status())
        };
        self.emit_track(media, status);
        Ok(())
    }

    async fn play(&self) -> Result<()> {
        let status = {
            let mut state = self.lock();
            state.check(EngineOp::Play)?;
            state.journal.push(EngineCommand::Play);
            if state.active.is_none() {
                return Ok(());
            }
            if state.state == EngineState::Ended {
                state.position = 0.0;
            }
            state.state = EngineState::Playing;
            state.status()
        };
        self.emit(EngineEvent::StatusChanged(status));
        Ok(())
    }

    async fn pause(&self) -> Result<()> {
        let status = {
            let mut state = self.lock();
            state.check(EngineOp::Pause)?;
            state.journal.push(EngineCommand::Pause);
            if state.state.is_active() {
                state.state = EngineState::Paused;
            }
            state.status()
        };
        self.emit(EngineEvent::StatusChanged(status));
        Ok(())
    }

    async fn stop(&self) -> Result<()> {
        let status = {
            let mut state = self.lock();
            state.check(EngineOp::Stop)?;
            state.journal.push(EngineCommand::Stop);
            if state.active.is_some() {
                state.state = EngineState::Stopped;
            }
            state.position = 0.0;
            state.status()
        };
        self.emit(EngineEvent::StatusChanged(status));
        Ok(())
    }

    async fn seek_to(&self, seconds: f64) -> Result<()> {
        let status = {
            let mut state = self.lock();
            state.check(EngineOp::SeekTo)?;
            state.journal.push(EngineCommand::SeekTo(seconds));

            let duration = state.duration();
            let mut position = seconds.max(0.0);
            if duration > 0.0 {
                position = position.min(duration);
            }
            state.position = position;
            state.status()
        };
        self.emit(EngineEvent::StatusChanged(status));
        Ok(())
    }

    async fn set_repeat_mode(&self, mode: RepeatMode) -> Result<()> {
        let mut state = self.lock();
        state.check(EngineOp::SetRepeatMode)?;
        state.repeat = mode;
        state.journal.push(EngineCommand::SetRepeatMode(mode));
        Ok(())
    }

    async fn get_active_index(&self) -> Result<Option<usize>> {
        let mut state = self.lock();
        state.check(EngineOp::GetActiveIndex)?;
        Ok(state.active)
    }

    async fn get_active_track(&self) -> Result<Option<MediaRef>> {
        let mut state = self.lock();
        state.check(EngineOp::GetActiveTrack)?;
        Ok(state.active_media())
    }

    async fn get_status(&self) -> Result<EngineStatus> {
        let mut state = self.lock();
        state.check(EngineOp::GetStatus)?;
        Ok(state.status())
    }

    async fn get_queue_snapshot(&self) -> Result<Vec<MediaRef>> {
        let mut state = self.lock();
        state.check(EngineOp::GetQueueSnapshot)?;
        Ok(state.queue.clone())
    }

    fn subscribe(&self) -> EngineSubscription {
        self.events.subscribe()
    }
}
