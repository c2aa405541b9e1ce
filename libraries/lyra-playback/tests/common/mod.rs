#![allow(dead_code)]

use lyra_core::Track;
use lyra_playback::{PlaybackConfig, PlaybackOrchestrator, SimulatedEngine};
use std::sync::{Arc, Once};
use std::time::Duration;

static INIT: Once = Once::new();

pub fn init_tracing() {
    // Initialize logging once
    INIT.call_once(|| {
        let _ = tracing_subscriber::fmt()
            .with_test_writer()
            .with_max_level(tracing::Level::DEBUG)
            .try_init();
    });
}

/// `count` ten-second tracks with ids "0", "1", ...
pub fn create_test_tracks(count: usize) -> Vec<Track> {
    (0..count)
        .map(|i| {
            Track::new(format!("{i}"), format!("Track {i}"), format!("file:///music/{i}.mp3"))
                .with_artist("Test Artist")
                .with_duration(10.0)
        })
        .collect()
}

pub fn ids(tracks: &[Track]) -> Vec<String> {
    tracks.iter().map(|t| t.id.to_string()).collect()
}

pub fn new_player(
    config: &PlaybackConfig,
) -> (Arc<SimulatedEngine>, PlaybackOrchestrator<SimulatedEngine>) {
    init_tracing();
    let engine = Arc::new(SimulatedEngine::new());
    let player = PlaybackOrchestrator::new(Arc::clone(&engine), config);
    (engine, player)
}

/// Orchestrator with `count` tracks loaded, playing at `start`, guard lowered
pub async fn loaded_player(
    count: usize,
    start: usize,
) -> (Arc<SimulatedEngine>, PlaybackOrchestrator<SimulatedEngine>) {
    let (engine, player) = new_player(&PlaybackConfig::default());
    player.set_queue(create_test_tracks(count), start).await;
    player.settle().await;
    engine.clear_commands();
    (engine, player)
}

/// Wait (in virtual time when the clock is paused) until `condition` holds
pub async fn wait_until(mut condition: impl FnMut() -> bool) -> bool {
    for _ in 0..200 {
        if condition() {
            return true;
        }
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
    condition()
}
