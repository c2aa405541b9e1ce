//! Engine synchronization task
//!
//! Keeps the orchestrator aligned with the engine through two redundant
//! channels: pushed engine events and a periodic poll. Engines drop or
//! delay track-change notifications under load, so the poll is what
//! guarantees the queue eventually follows the engine.

use crate::{
    engine::{AudioEngine, EngineEvent, EngineSubscription},
    orchestrator::PlaybackOrchestrator,
    remote::handle_remote,
    types::PlaybackConfig,
};
use std::sync::Arc;
use tokio::sync::broadcast::error::RecvError;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tracing::{debug, info, trace, warn};

/// Running sync task
///
/// Dropping the handle stops the task.
pub struct SyncHandle {
    task: JoinHandle<()>,
}

impl SyncHandle {
    /// Stop the task and wait for it to wind down
    pub async fn shutdown(mut self) {
        self.task.abort();
        let _ = (&mut self.task).await;
    }

    pub fn is_finished(&self) -> bool {
        self.task.is_finished()
    }
}

impl Drop for SyncHandle {
    fn drop(&mut self) {
        self.task.abort();
    }
}

/// Start keeping `orchestrator` in sync with its engine
///
/// Must be called from within a tokio runtime.
pub fn spawn_sync<E>(orchestrator: PlaybackOrchestrator<E>, config: &PlaybackConfig) -> SyncHandle
where
    E: AudioEngine + ?Sized + 'static,
{
    // Subscribe before spawning so nothing emitted from here on is missed
    let events = orchestrator.engine().subscribe();
    let period = config.poll_interval();
    let resume = config.resume_after_advance;

    let task = tokio::spawn(async move {
        let mut events = Some(events);
        let mut ticker = tokio::time::interval(period);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        debug!(period_ms = period.as_millis(), "Engine sync started");

        loop {
            tokio::select! {
                event = next_event(&mut events), if events.is_some() => match event {
                    Ok(event) => handle_event(&orchestrator, event).await,
                    Err(RecvError::Lagged(skipped)) => {
                        warn!(skipped, "Missed engine notifications, polling");
                        poll(&orchestrator, resume).await;
                    }
                    Err(RecvError::Closed) => {
                        debug!("Engine notifications closed, relying on polling");
                        events = None;
                    }
                },
                _ = ticker.tick() => poll(&orchestrator, resume).await,
            }
        }
    });

    SyncHandle { task }
}

/// Build an orchestrator around `engine`, adopt whatever the engine is
/// already playing and start syncing
pub async fn attach<E>(
    engine: Arc<E>,
    config: &PlaybackConfig,
) -> (PlaybackOrchestrator<E>, SyncHandle)
where
    E: AudioEngine + ?Sized + 'static,
{
    let orchestrator = PlaybackOrchestrator::new(engine, config);

    if orchestrator.hydrate().await {
        info!(
            tracks = orchestrator.queue().len(),
            "Resumed existing engine session"
        );
    }

    if let Err(e) = orchestrator.engine().set_repeat_mode(config.repeat).await {
        warn!(error = %e, "Failed to push initial repeat mode");
    }

    let handle = spawn_sync(orchestrator.clone(), config);
    (orchestrator, handle)
}

async fn next_event(events: &mut Option<EngineSubscription>) -> Result<EngineEvent, RecvError> {
    match events {
        Some(rx) => rx.recv().await,
        None => std::future::pending().await,
    }
}

async fn handle_event<E>(orchestrator: &PlaybackOrchestrator<E>, event: EngineEvent)
where
    E: AudioEngine + ?Sized,
{
    match event {
        EngineEvent::ActiveTrackChanged(media) => {
            orchestrator.on_active_track_changed(media.as_ref()).await;
        }
        EngineEvent::StatusChanged(status) => orchestrator.apply_status(status),
        EngineEvent::Remote(command) => handle_remote(orchestrator, command).await,
    }
}

/// One poll cycle
///
/// Skipped entirely while the orchestrator is rewriting the engine queue.
/// When the engine turns out to have moved to another track while audio
/// was sounding, playback is resumed on the new track.
async fn poll<E>(orchestrator: &PlaybackOrchestrator<E>, resume: bool)
where
    E: AudioEngine + ?Sized,
{
    if orchestrator.is_self_mutating() {
        trace!("Skipping poll during queue update");
        return;
    }

    let engine = orchestrator.engine();

    let status = match engine.get_status().await {
        Ok(status) => status,
        Err(e) => {
            debug!(error = %e, "Poll failed to read status");
            return;
        }
    };
    let was_playing = orchestrator.playback().is_playing;
    orchestrator.apply_status(status);

    let index = match engine.get_active_index().await {
        Ok(index) => index,
        Err(e) => {
            debug!(error = %e, "Poll failed to read active index");
            return;
        }
    };

    if orchestrator.on_active_index(index) && resume && (was_playing || status.state.is_active()) {
        debug!(?index, "Engine advanced while playing, resuming");
        if let Err(e) = engine.play().await {
            warn!(error = %e, "Failed to resume after advance");
        }
    }
}
