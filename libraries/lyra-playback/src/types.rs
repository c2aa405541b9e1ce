//! Core types for playback orchestration

use lyra_core::{RepeatMode, Track};
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Queue owned by the orchestrator
///
/// `tracks` is the effective playback order (shuffled or not).
/// `current_index` is `None` until a track is selected.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct QueueState {
    pub tracks: Vec<Track>,
    pub current_index: Option<usize>,
    pub shuffle_enabled: bool,
    pub repeat_mode: RepeatMode,
}

impl QueueState {
    /// Track at the current index
    pub fn current_track(&self) -> Option<&Track> {
        self.current_index.and_then(|i| self.tracks.get(i))
    }

    pub fn len(&self) -> usize {
        self.tracks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tracks.is_empty()
    }
}

/// Playback state as shown to the presentation layer
///
/// Derived from the last engine status plus any pending optimistic
/// play/pause intent. Never stored authoritatively.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct PlaybackState {
    pub is_playing: bool,
    pub is_loaded: bool,
    pub is_buffering: bool,
    /// Seconds
    pub current_time: f64,
    /// Seconds
    pub duration: f64,
}

/// Everything the presentation layer renders
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct PlayerState {
    pub playback: PlaybackState,
    pub queue: QueueState,
    pub current_track: Option<Track>,
}

/// Configuration for the playback orchestrator
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlaybackConfig {
    /// `previous()` restarts the current track past this many seconds (default: 3)
    #[serde(default = "default_restart_threshold")]
    pub restart_threshold_secs: f64,

    /// Engine poll period in milliseconds (default: 500)
    #[serde(default = "default_poll_interval")]
    pub poll_interval_ms: u64,

    /// Resume playback when a poll notices the engine moved on by itself
    /// while playing (default: true)
    #[serde(default = "default_resume_after_advance")]
    pub resume_after_advance: bool,

    /// Initial repeat mode (default: Off)
    #[serde(default)]
    pub repeat: RepeatMode,

    /// Initial shuffle flag (default: false)
    #[serde(default)]
    pub shuffle: bool,
}

impl PlaybackConfig {
    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms.max(1))
    }
}

fn default_restart_threshold() -> f64 {
    3.0
}

fn default_poll_interval() -> u64 {
    500
}

fn default_resume_after_advance() -> bool {
    true
}

impl Default for PlaybackConfig {
    fn default() -> Self {
        Self {
            restart_threshold_secs: default_restart_threshold(),
            poll_interval_ms: default_poll_interval(),
            resume_after_advance: default_resume_after_advance(),
            repeat: RepeatMode::Off,
            shuffle: false,
        }
    }
}
