//! Process-wide engine setup guard
//!
//! Platform audio engines can only be set up once per process, and survive
//! a restart of the app layer on top of them. [`EngineSetup`] makes the
//! "exactly once" explicit and treats an engine left initialized by a
//! previous instance as success.

use crate::{
    engine::{AudioEngine, EngineOptions},
    error::{PlaybackError, Result},
};
use tokio::sync::Mutex;
use tracing::{error, info};

/// Result of a setup attempt
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SetupOutcome {
    /// This call performed the setup
    Initialized,
    /// Setup had already happened, here or in a previous instance
    AlreadyInitialized,
}

/// Engine setup state
pub struct EngineSetup {
    ready: Mutex<bool>,
}

/// The guard for the process-wide engine
pub static ENGINE_SETUP: EngineSetup = EngineSetup::new();

/// Shorthand for [`ENGINE_SETUP`]
pub fn global() -> &'static EngineSetup {
    &ENGINE_SETUP
}

impl Default for EngineSetup {
    fn default() -> Self {
        Self::new()
    }
}

impl EngineSetup {
    pub const fn new() -> Self {
        Self {
            ready: Mutex::const_new(false),
        }
    }

    /// Set up `engine` unless that already happened
    ///
    /// Concurrent callers are serialized; only one reaches the engine. When
    /// the engine rejects setup but can report an active track, it was set
    /// up by an earlier instance and the call succeeds.
    pub async fn initialize<E>(&self, engine: &E, options: &EngineOptions) -> Result<SetupOutcome>
    where
        E: AudioEngine + ?Sized,
    {
        let mut ready = self.ready.lock().await;
        if *ready {
            return Ok(SetupOutcome::AlreadyInitialized);
        }

        let Err(setup_error) = engine.setup(options).await else {
            *ready = true;
            info!("Audio engine initialized");
            return Ok(SetupOutcome::Initialized);
        };

        match engine.get_active_track().await {
            Ok(Some(track)) => {
                *ready = true;
                info!(track = %track.id, "Audio engine was already initialized");
                Ok(SetupOutcome::AlreadyInitialized)
            }
            _ => {
                error!(error = %setup_error, "Audio engine setup failed");
                Err(PlaybackError::Setup(setup_error.to_string()))
            }
        }
    }

    pub async fn is_initialized(&self) -> bool {
        *self.ready.lock().await
    }

    /// Forget the setup so the next `initialize` reaches the engine again
    pub async fn teardown(&self) {
        *self.ready.lock().await = false;
    }
}
