//! Lyra - Playback Orchestration
//!
//! Queue and transport management over an asynchronous, event-driven audio
//! engine that is allowed to be unreliable about its notifications.
//!
//! This crate provides:
//! - `PlaybackOrchestrator`: the queue, shuffle, repeat and transport state
//!   machine, observable through a `watch` channel
//! - The `AudioEngine` capability trait the orchestrator drives
//! - Reconciliation of engine-initiated track changes, guarded against
//!   echoes of the orchestrator's own queue rewrites
//! - A sync task combining engine notifications with periodic polling
//! - Remote-control routing (lock screen, headset buttons)
//! - A process-wide engine setup guard
//! - `SimulatedEngine`, an in-memory engine with a deterministic clock
//!
//! # Architecture
//!
//! The orchestrator never produces audio. Engines implement [`AudioEngine`]
//! and are shared behind an `Arc`; the orchestrator is a cheap `Clone`
//! handle so the UI, the sync task and remote controls all act on the same
//! state.
//!
//! # Example
//!
//! ```rust
//! use lyra_core::Track;
//! use lyra_playback::{attach, PlaybackConfig, SimulatedEngine};
//! use std::sync::Arc;
//!
//! # #[tokio::main(flavor = "current_thread")]
//! # async fn main() {
//! let engine = Arc::new(SimulatedEngine::new());
//! let (player, _sync) = attach(engine, &PlaybackConfig::default()).await;
//!
//! let tracks = vec![
//!     Track::new("1", "Intro", "file:///music/01.mp3").with_duration(90.0),
//!     Track::new("2", "Theme", "file:///music/02.mp3").with_duration(240.0),
//! ];
//! player.set_queue(tracks, 1).await;
//!
//! let state = player.state();
//! assert_eq!(state.queue.current_index, Some(1));
//! assert_eq!(state.current_track.map(|t| t.title), Some("Theme".to_string()));
//! # }
//! ```

pub mod engine;
mod error;
mod mode;
mod orchestrator;
pub mod reconcile;
pub mod remote;
pub mod setup;
pub mod shuffle;
pub mod simulated;
mod sync;
pub mod types;

// Public exports
pub use engine::{
    AppKilledBehavior, AudioEngine, Capability, EngineEvent, EngineOptions, EngineState,
    EngineStatus, EngineSubscription,
};
pub use error::{PlaybackError, Result};
pub use mode::MutationMode;
pub use orchestrator::PlaybackOrchestrator;
pub use remote::{handle_remote, RemoteCommand};
pub use setup::{EngineSetup, SetupOutcome};
pub use shuffle::{shuffle_pinned, shuffle_tracks};
pub use simulated::{EngineCommand, EngineOp, SimulatedEngine};
pub use sync::{attach, spawn_sync, SyncHandle};
pub use types::{PlaybackConfig, PlaybackState, PlayerState, QueueState};
