//! Audio engine capability
//!
//! The orchestrator never touches audio itself. It drives an engine through
//! this trait and listens to what the engine reports back. Engines are
//! allowed to be unreliable about notifications: track changes may be
//! dropped, delayed or delivered twice.

use crate::remote::RemoteCommand;
use async_trait::async_trait;
use lyra_core::{MediaRef, RepeatMode, Result};
use serde::{Deserialize, Serialize};
use tokio::sync::broadcast;

/// Receiving end of an engine subscription
///
/// Dropping the receiver unsubscribes.
pub type EngineSubscription = broadcast::Receiver<EngineEvent>;

/// Transport state reported by the engine
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum EngineState {
    /// Nothing set up or loaded
    #[default]
    None,
    /// Media loaded, not started
    Ready,
    /// Fetching media
    Loading,
    /// Waiting for enough data to continue
    Buffering,
    /// Audio is sounding
    Playing,
    /// Paused mid-track
    Paused,
    /// Explicitly stopped
    Stopped,
    /// Reached the end of the queue
    Ended,
    /// Engine failed to play the current media
    Error,
}

impl EngineState {
    /// Whether audio is confirmed to be sounding
    pub fn is_playing(self) -> bool {
        self == Self::Playing
    }

    /// Whether the engine is waiting on media
    pub fn is_buffering(self) -> bool {
        matches!(self, Self::Buffering | Self::Loading)
    }

    /// Whether the engine is playing or about to be
    ///
    /// Used to decide between pause and play when toggling.
    pub fn is_active(self) -> bool {
        self.is_playing() || self.is_buffering()
    }

    /// Whether something usable is loaded
    pub fn is_loaded(self) -> bool {
        !matches!(self, Self::None | Self::Error)
    }
}

/// Snapshot of the engine transport
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct EngineStatus {
    pub state: EngineState,
    /// Playhead in seconds
    pub position: f64,
    /// Duration of the active media in seconds (0 when unknown)
    pub duration: f64,
}

/// Notifications pushed by the engine
#[derive(Debug, Clone, PartialEq)]
pub enum EngineEvent {
    /// The active track changed. `None` when the engine could not say which.
    ActiveTrackChanged(Option<MediaRef>),
    /// Transport state or position changed
    StatusChanged(EngineStatus),
    /// A lock-screen or notification button was pressed
    Remote(RemoteCommand),
}

/// Transport capabilities advertised to the platform
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Capability {
    Play,
    Pause,
    Stop,
    SkipToNext,
    SkipToPrevious,
    SeekTo,
}

/// What the platform should do with playback when the app is killed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum AppKilledBehavior {
    ContinuePlayback,
    PausePlayback,
    #[default]
    StopPlaybackAndRemoveNotification,
}

/// One-time engine setup options
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EngineOptions {
    /// Wait for the buffer to fill before starting
    pub wait_for_buffer: bool,
    /// Let the engine pause/resume around audio focus interruptions
    pub auto_handle_interruptions: bool,
    pub capabilities: Vec<Capability>,
    /// Capabilities shown in the compact notification
    pub compact_capabilities: Vec<Capability>,
    pub notification_capabilities: Vec<Capability>,
    pub app_killed: AppKilledBehavior,
}

impl Default for EngineOptions {
    fn default() -> Self {
        use Capability::{Pause, Play, SeekTo, SkipToNext, SkipToPrevious, Stop};

        Self {
            wait_for_buffer: true,
            auto_handle_interruptions: true,
            capabilities: vec![Play, Pause, SkipToNext, SkipToPrevious, SeekTo, Stop],
            compact_capabilities: vec![Play, Pause, SkipToNext],
            notification_capabilities: vec![Play, Pause, SkipToNext, SkipToPrevious],
            app_killed: AppKilledBehavior::default(),
        }
    }
}

/// Audio engine capability
///
/// Implementers own the actual transport. Every command may suspend and
/// may fail; the orchestrator treats failures as non-fatal.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait AudioEngine: Send + Sync {
    /// Initialize the engine. Engines reject a second setup.
    async fn setup(&self, options: &EngineOptions) -> Result<()>;

    /// Clear all loaded media and stop the transport
    async fn reset_queue(&self) -> Result<()>;

    /// Append media to the end of the engine queue
    ///
    /// After [`reset_queue`](Self::reset_queue) this loads a fresh queue.
    async fn load_queue(&self, media: Vec<MediaRef>) -> Result<()>;

    /// Jump to a queue position
    async fn skip_to_index(&self, index: usize) -> Result<()>;

    async fn play(&self) -> Result<()>;

    async fn pause(&self) -> Result<()>;

    async fn stop(&self) -> Result<()>;

    /// Move the playhead. The engine clamps to the valid range.
    async fn seek_to(&self, seconds: f64) -> Result<()>;

    /// Tell the engine how to behave when a track ends on its own
    async fn set_repeat_mode(&self, mode: RepeatMode) -> Result<()>;

    /// Position of the sounding track in the engine queue
    async fn get_active_index(&self) -> Result<Option<usize>>;

    /// The sounding track, if any
    async fn get_active_track(&self) -> Result<Option<MediaRef>>;

    async fn get_status(&self) -> Result<EngineStatus>;

    /// Everything currently loaded, in engine order
    async fn get_queue_snapshot(&self) -> Result<Vec<MediaRef>>;

    /// Subscribe to track-change, status and remote-control notifications
    fn subscribe(&self) -> EngineSubscription;
}
