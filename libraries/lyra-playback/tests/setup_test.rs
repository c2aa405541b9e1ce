//! Engine setup guard tests against the simulated engine

mod common;

use common::{create_test_tracks, init_tracing};
use lyra_core::MediaRef;
use lyra_playback::{
    setup, EngineOptions, EngineSetup, PlaybackError, SetupOutcome, SimulatedEngine,
};

#[tokio::test]
async fn process_wide_guard_initializes_once() {
    init_tracing();
    let engine = SimulatedEngine::new();
    let options = EngineOptions::default();

    let first = setup::global().initialize(&engine, &options).await.unwrap();
    let second = setup::global().initialize(&engine, &options).await.unwrap();

    assert_eq!(first, SetupOutcome::Initialized);
    assert_eq!(second, SetupOutcome::AlreadyInitialized);
    assert!(setup::ENGINE_SETUP.is_initialized().await);
}

#[tokio::test]
async fn engine_left_playing_by_previous_instance_is_accepted() {
    init_tracing();
    let media: Vec<MediaRef> = create_test_tracks(2).iter().map(MediaRef::from).collect();
    let engine = SimulatedEngine::with_queue(media, Some(0));

    // Fresh guard, as after an app restart; the engine itself kept running
    let guard = EngineSetup::new();
    let outcome = guard
        .initialize(&engine, &EngineOptions::default())
        .await
        .unwrap();

    assert_eq!(outcome, SetupOutcome::AlreadyInitialized);
    assert!(guard.is_initialized().await);
}

#[tokio::test]
async fn engine_set_up_without_a_track_is_an_error() {
    init_tracing();
    let engine = SimulatedEngine::new();
    let options = EngineOptions::default();

    EngineSetup::new().initialize(&engine, &options).await.unwrap();

    let restarted = EngineSetup::new();
    let result = restarted.initialize(&engine, &options).await;

    assert!(matches!(result, Err(PlaybackError::Setup(_))));
    assert!(!restarted.is_initialized().await);
}

#[tokio::test]
async fn concurrent_initialization_reaches_engine_once() {
    init_tracing();
    let engine = SimulatedEngine::new();
    let options = EngineOptions::default();
    let guard = EngineSetup::new();

    let (a, b) = tokio::join!(
        guard.initialize(&engine, &options),
        guard.initialize(&engine, &options)
    );

    let mut outcomes = vec![a.unwrap(), b.unwrap()];
    outcomes.sort_by_key(|o| *o == SetupOutcome::AlreadyInitialized);
    assert_eq!(
        outcomes,
        vec![SetupOutcome::Initialized, SetupOutcome::AlreadyInitialized]
    );
    assert_eq!(
        engine.commands(),
        vec![lyra_playback::EngineCommand::Setup]
    );
}
