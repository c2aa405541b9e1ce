//! Remote control commands
//!
//! Lock-screen, notification and headset buttons arrive as engine events and
//! are routed through the same orchestrator actions the UI uses, so the
//! restart-or-previous rule and queue bookkeeping apply to both.

use crate::{engine::AudioEngine, orchestrator::PlaybackOrchestrator};
use serde::{Deserialize, Serialize};
use tracing::debug;

/// A transport button pressed outside the app
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "command", content = "position", rename_all = "lowercase")]
pub enum RemoteCommand {
    Play,
    Pause,
    Stop,
    Next,
    Previous,
    /// Seek to an absolute position in seconds
    Seek(f64),
}

/// Dispatch a remote command to the orchestrator
pub async fn handle_remote<E>(orchestrator: &PlaybackOrchestrator<E>, command: RemoteCommand)
where
    E: AudioEngine + ?Sized,
{
    debug!(?command, "Remote command");

    match command {
        RemoteCommand::Play => orchestrator.play().await,
        RemoteCommand::Pause => orchestrator.pause().await,
        RemoteCommand::Stop => orchestrator.stop().await,
        RemoteCommand::Next => orchestrator.next().await,
        RemoteCommand::Previous => orchestrator.previous().await,
        RemoteCommand::Seek(position) => orchestrator.seek_to(position).await,
    }
}
