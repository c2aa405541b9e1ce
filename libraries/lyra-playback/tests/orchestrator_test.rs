//! Integration tests for the playback orchestrator
//!
//! Drives the orchestrator against the simulated engine and checks both the
//! local queue state and the commands the engine actually received.

mod common;

use common::{create_test_tracks, ids, loaded_player, new_player};
use lyra_core::{MediaRef, RepeatMode, Track};
use lyra_playback::{
    EngineCommand, EngineOp, EngineState, MutationMode, PlaybackConfig, SimulatedEngine,
};
use std::sync::Arc;

// ===== Initial State =====

#[tokio::test]
async fn fresh_player_reports_empty_state() {
    let (_engine, player) = new_player(&PlaybackConfig::default());
    let state = player.state();

    assert!(state.current_track.is_none());
    assert_eq!(state.queue.tracks.len(), 0);
    assert_eq!(state.queue.current_index, None);
    assert!(!state.queue.shuffle_enabled);
    assert_eq!(state.queue.repeat_mode, RepeatMode::Off);
    assert!(!state.playback.is_playing);
    assert!(!state.playback.is_loaded);
}

// ===== set_queue =====

#[tokio::test]
async fn set_queue_resets_engine_and_plays_from_start_index() {
    let (engine, player) = new_player(&PlaybackConfig::default());
    let tracks = create_test_tracks(4);

    player.set_queue(tracks.clone(), 2).await;

    let state = player.state();
    assert_eq!(state.queue.current_index, Some(2));
    assert_eq!(ids(&state.queue.tracks), ids(&tracks));
    assert_eq!(state.current_track.unwrap().id, tracks[2].id);

    let commands = engine.commands();
    assert_eq!(commands[0], EngineCommand::ResetQueue);
    assert!(matches!(&commands[1], EngineCommand::LoadQueue(loaded) if loaded.len() == 4));
    assert_eq!(commands[2], EngineCommand::SkipToIndex(2));
    assert_eq!(commands[3], EngineCommand::Play);
    assert_eq!(engine.active_index(), Some(2));
}

#[tokio::test]
async fn set_queue_at_zero_does_not_skip() {
    let (engine, player) = new_player(&PlaybackConfig::default());
    player.set_queue(create_test_tracks(3), 0).await;

    assert!(!engine
        .commands()
        .iter()
        .any(|c| matches!(c, EngineCommand::SkipToIndex(_))));
    assert_eq!(player.queue().current_index, Some(0));
}

#[tokio::test]
async fn set_queue_with_shuffle_keeps_original_order_for_restore() {
    let config = PlaybackConfig {
        shuffle: true,
        ..PlaybackConfig::default()
    };
    let (_engine, player) = new_player(&config);
    let tracks = create_test_tracks(20);

    player.set_queue(tracks.clone(), 0).await;
    player.settle().await;

    let mut shuffled = ids(&player.queue().tracks);
    shuffled.sort();
    let mut original = ids(&tracks);
    original.sort();
    assert_eq!(shuffled, original);

    let current = player.current_track().unwrap();
    player.toggle_shuffle().await;

    let queue = player.queue();
    assert!(!queue.shuffle_enabled);
    assert_eq!(ids(&queue.tracks), ids(&tracks));
    assert_eq!(queue.current_track().unwrap().id, current.id);
}

#[tokio::test]
async fn set_queue_guard_is_lowered_after_the_call() {
    let (_engine, player) = new_player(&PlaybackConfig::default());

    player.set_queue(create_test_tracks(3), 1).await;
    assert!(player.is_self_mutating());
    assert!(!player.on_active_index(Some(0)));

    player.settle().await;
    assert_eq!(player.mutation_mode(), MutationMode::Idle);
    assert_eq!(player.queue().current_index, Some(1));
}

#[tokio::test]
async fn set_queue_with_empty_list_clears_without_playing() {
    let (engine, player) = loaded_player(3, 1).await;

    player.set_queue(Vec::new(), 0).await;

    assert!(player.queue().tracks.is_empty());
    assert_eq!(player.queue().current_index, None);
    assert!(!engine.commands().contains(&EngineCommand::Play));
}

#[tokio::test]
async fn set_queue_failure_keeps_previous_queue() {
    let (engine, player) = loaded_player(3, 1).await;
    engine.fail_next(EngineOp::ResetQueue);

    player.set_queue(create_test_tracks(5), 0).await;

    assert_eq!(player.queue().len(), 3);
    assert_eq!(player.queue().current_index, Some(1));
}

// ===== add_to_queue =====

#[tokio::test]
async fn append_preserves_playback() {
    let (engine, player) = loaded_player(3, 1).await;
    let extra = vec![
        Track::new("x", "Extra", "file:///x.mp3"),
        Track::new("y", "Extra 2", "file:///y.mp3"),
    ];

    player.add_to_queue(extra).await;

    let queue = player.queue();
    assert_eq!(queue.len(), 5);
    assert_eq!(queue.current_index, Some(1));
    assert_eq!(
        engine.commands(),
        vec![EngineCommand::LoadQueue(vec!["x".into(), "y".into()])]
    );
    assert_eq!(engine.active_index(), Some(1));
}

#[tokio::test]
async fn append_nothing_is_a_noop() {
    let (engine, player) = loaded_player(3, 0).await;

    player.add_to_queue(Vec::new()).await;

    assert!(engine.commands().is_empty());
    assert!(!player.is_self_mutating());
}

#[tokio::test]
async fn appended_tracks_survive_shuffle_round_trip() {
    let (_engine, player) = loaded_player(3, 0).await;
    player
        .add_to_queue(vec![Track::new("x", "Extra", "file:///x.mp3")])
        .await;
    player.settle().await;

    player.toggle_shuffle().await;
    player.settle().await;
    player.toggle_shuffle().await;

    assert_eq!(ids(&player.queue().tracks), vec!["0", "1", "2", "x"]);
}

// ===== select_track =====

#[tokio::test]
async fn select_track_jumps_and_plays() {
    let (engine, player) = loaded_player(5, 0).await;

    player.select_track(3).await;

    assert_eq!(player.queue().current_index, Some(3));
    assert_eq!(
        engine.commands(),
        vec![EngineCommand::SkipToIndex(3), EngineCommand::Play]
    );
}

#[tokio::test]
async fn invalid_select_is_a_noop() {
    let (engine, player) = loaded_player(5, 2).await;

    player.select_track(999).await;

    assert_eq!(player.queue().current_index, Some(2));
    assert!(engine.commands().is_empty());
    assert!(!player.is_self_mutating());
}

// ===== play / pause =====

#[tokio::test]
async fn play_and_pause_are_visible_before_the_engine_confirms() {
    let (engine, player) = loaded_player(2, 0).await;
    engine.set_state(EngineState::Paused);
    player.apply_status(engine.transport());

    engine.fail_next(EngineOp::Play);
    player.play().await;
    assert!(player.playback().is_playing);
    assert_eq!(player.optimistic_playing(), Some(true));

    player.pause().await;
    assert!(!player.playback().is_playing);
    player.apply_status(engine.transport());
    assert_eq!(player.optimistic_playing(), None);
}

#[tokio::test]
async fn toggle_reads_engine_status() {
    let (engine, player) = loaded_player(2, 0).await;
    assert_eq!(engine.transport().state, EngineState::Playing);

    player.toggle_play_pause().await;
    assert_eq!(engine.transport().state, EngineState::Paused);

    player.toggle_play_pause().await;
    assert_eq!(engine.transport().state, EngineState::Playing);
}

#[tokio::test]
async fn toggle_failure_leaves_queue_alone() {
    let (engine, player) = loaded_player(3, 1).await;
    engine.fail_next(EngineOp::GetStatus);

    player.toggle_play_pause().await;

    assert_eq!(player.queue().current_index, Some(1));
    assert!(engine.commands().is_empty());
}

#[tokio::test]
async fn stop_keeps_queue() {
    let (engine, player) = loaded_player(3, 1).await;

    player.stop().await;

    assert_eq!(engine.transport().state, EngineState::Stopped);
    assert_eq!(player.queue().len(), 3);
    assert!(!player.playback().is_playing);
}

// ===== next / previous =====

#[tokio::test]
async fn next_at_last_track_with_repeat_off_stays() {
    let (engine, player) = loaded_player(3, 2).await;

    player.next().await;

    assert_eq!(player.queue().current_index, Some(2));
    assert!(engine.commands().is_empty());
}

#[tokio::test]
async fn next_at_last_track_with_repeat_all_wraps() {
    let (engine, player) = loaded_player(3, 2).await;
    player.cycle_repeat_mode().await;
    assert_eq!(player.queue().repeat_mode, RepeatMode::All);

    player.next().await;

    assert_eq!(player.queue().current_index, Some(0));
    assert_eq!(engine.active_index(), Some(0));
}

#[tokio::test]
async fn explicit_next_advances_under_repeat_one() {
    let (_engine, player) = loaded_player(3, 0).await;
    player.cycle_repeat_mode().await;
    player.cycle_repeat_mode().await;
    assert_eq!(player.queue().repeat_mode, RepeatMode::One);

    player.next().await;
    assert_eq!(player.queue().current_index, Some(1));
}

#[tokio::test]
async fn next_on_empty_queue_is_a_noop() {
    let (engine, player) = new_player(&PlaybackConfig::default());
    player.next().await;
    player.previous().await;

    assert!(engine.commands().is_empty());
    assert_eq!(player.queue().current_index, None);
}

#[tokio::test]
async fn previous_past_threshold_restarts_track() {
    let (engine, player) = loaded_player(3, 2).await;
    engine.set_position(5.0);

    player.previous().await;

    assert_eq!(player.queue().current_index, Some(2));
    assert_eq!(engine.commands(), vec![EngineCommand::SeekTo(0.0)]);
}

#[tokio::test]
async fn previous_near_start_moves_back() {
    let (engine, player) = loaded_player(3, 2).await;
    engine.set_position(0.0);

    player.previous().await;

    assert_eq!(player.queue().current_index, Some(1));
    assert_eq!(engine.commands(), vec![EngineCommand::SkipToIndex(1)]);
}

#[tokio::test]
async fn previous_at_exact_threshold_moves_back() {
    let (engine, player) = loaded_player(3, 1).await;
    engine.set_position(3.0);

    player.previous().await;
    assert_eq!(player.queue().current_index, Some(0));
}

#[tokio::test]
async fn previous_at_first_track_rewinds_unless_repeating() {
    let (engine, player) = loaded_player(3, 0).await;

    player.previous().await;
    assert_eq!(player.queue().current_index, Some(0));
    assert_eq!(engine.commands(), vec![EngineCommand::SeekTo(0.0)]);

    player.cycle_repeat_mode().await;
    player.previous().await;
    assert_eq!(player.queue().current_index, Some(2));
}

#[tokio::test]
async fn previous_falls_back_to_cached_position() {
    let (engine, player) = loaded_player(3, 2).await;
    engine.set_position(8.0);
    player.apply_status(engine.transport());
    engine.fail_next(EngineOp::GetStatus);

    player.previous().await;

    assert_eq!(player.queue().current_index, Some(2));
    assert_eq!(engine.commands(), vec![EngineCommand::SeekTo(0.0)]);
}

#[tokio::test]
async fn seek_is_forwarded_unclamped() {
    let (engine, player) = loaded_player(1, 0).await;

    player.seek_to(500.0).await;

    assert_eq!(engine.commands(), vec![EngineCommand::SeekTo(500.0)]);
    assert_eq!(engine.transport().position, 10.0);
}

// ===== Shuffle =====

#[tokio::test]
async fn enabling_shuffle_pins_current_track() {
    let (engine, player) = loaded_player(10, 4).await;

    player.toggle_shuffle().await;

    let state = player.state();
    assert!(state.queue.shuffle_enabled);
    assert_eq!(state.queue.current_index, Some(0));
    assert_eq!(state.queue.tracks[0].id.as_str(), "4");
    assert_eq!(
        engine.queue_ids(),
        state.queue.tracks.iter().map(|t| t.id.clone()).collect::<Vec<_>>()
    );
    assert_eq!(engine.active_index(), Some(0));
    assert!(engine.commands().contains(&EngineCommand::Play));
}

#[tokio::test]
async fn shuffle_round_trip_restores_order_and_track() {
    let (engine, player) = loaded_player(8, 5).await;
    let before = player.queue();

    player.toggle_shuffle().await;
    player.settle().await;
    player.next().await;
    player.next().await;
    let playing = player.current_track().unwrap();

    player.toggle_shuffle().await;

    let after = player.queue();
    assert_eq!(ids(&after.tracks), ids(&before.tracks));
    assert_eq!(after.current_track().unwrap().id, playing.id);
    assert_eq!(engine.active_index(), after.current_index);
}

#[tokio::test]
async fn shuffle_on_empty_queue_only_flips_flag() {
    let (engine, player) = new_player(&PlaybackConfig::default());

    player.toggle_shuffle().await;

    assert!(player.queue().shuffle_enabled);
    assert!(engine.commands().is_empty());
}

// ===== Repeat =====

#[tokio::test]
async fn repeat_cycles_and_informs_engine() {
    let (engine, player) = new_player(&PlaybackConfig::default());

    let mut seen = Vec::new();
    for _ in 0..3 {
        player.cycle_repeat_mode().await;
        seen.push(player.queue().repeat_mode);
    }

    assert_eq!(seen, vec![RepeatMode::All, RepeatMode::One, RepeatMode::Off]);
    assert_eq!(
        engine.commands(),
        vec![
            EngineCommand::SetRepeatMode(RepeatMode::All),
            EngineCommand::SetRepeatMode(RepeatMode::One),
            EngineCommand::SetRepeatMode(RepeatMode::Off),
        ]
    );
}

// ===== Reconciliation =====

#[tokio::test]
async fn duplicate_track_signal_is_adopted_once() {
    let (_engine, player) = loaded_player(4, 0).await;
    let mut rx = player.subscribe();
    let _ = rx.borrow_and_update();

    let target = MediaRef::from(&player.queue().tracks[2]);
    player.on_active_track_changed(Some(&target)).await;
    assert!(rx.has_changed().unwrap());
    let _ = rx.borrow_and_update();

    player.on_active_track_changed(Some(&target)).await;
    assert!(!rx.has_changed().unwrap());
    assert_eq!(player.queue().current_index, Some(2));

    assert!(!player.on_active_index(Some(2)));
}

#[tokio::test]
async fn ambiguous_signal_asks_engine() {
    use lyra_playback::AudioEngine;

    let (engine, player) = loaded_player(4, 0).await;
    engine.skip_to_index(3).await.unwrap();

    player.on_active_track_changed(None).await;

    assert_eq!(player.queue().current_index, Some(3));
}

#[tokio::test]
async fn unknown_track_signal_is_ignored() {
    let (_engine, player) = loaded_player(3, 1).await;
    let stranger = MediaRef::from(&Track::new("nope", "Stranger", "file:///n.mp3"));

    player.on_active_track_changed(Some(&stranger)).await;

    assert_eq!(player.queue().current_index, Some(1));
}

#[tokio::test]
async fn track_boundary_clears_optimistic_intent() {
    let (_engine, player) = loaded_player(3, 0).await;
    player.pause().await;
    assert_eq!(player.optimistic_playing(), Some(false));

    assert!(player.on_active_index(Some(1)));
    assert_eq!(player.optimistic_playing(), None);
}

// ===== Hydration =====

#[tokio::test]
async fn hydrate_adopts_existing_engine_session() {
    common::init_tracing();
    let media: Vec<MediaRef> = create_test_tracks(3).iter().map(MediaRef::from).collect();
    let engine = Arc::new(SimulatedEngine::with_queue(media, Some(1)));
    let player =
        lyra_playback::PlaybackOrchestrator::new(Arc::clone(&engine), &PlaybackConfig::default());

    assert!(player.hydrate().await);

    let state = player.state();
    assert_eq!(state.queue.len(), 3);
    assert_eq!(state.queue.current_index, Some(1));
    assert!(state.playback.is_loaded);

    // Hydrated order is the restore order
    player.toggle_shuffle().await;
    player.settle().await;
    player.toggle_shuffle().await;
    assert_eq!(ids(&player.queue().tracks), vec!["0", "1", "2"]);
}

#[tokio::test]
async fn hydrate_fills_missing_fields() {
    common::init_tracing();
    let bare = MediaRef {
        id: "".into(),
        url: "file:///x.mp3".to_string(),
        title: String::new(),
        artist: String::new(),
        album: String::new(),
        artwork: None,
        duration: f64::NAN,
    };
    let engine = Arc::new(SimulatedEngine::with_queue(vec![bare], None));
    let player = lyra_playback::PlaybackOrchestrator::new(engine, &PlaybackConfig::default());

    assert!(player.hydrate().await);

    let track = player.current_track().unwrap();
    assert_eq!(track.id.as_str(), "unknown");
    assert_eq!(track.title, "Unknown");
    assert_eq!(track.artist, "Unknown");
    assert_eq!(track.duration, 0.0);
}

#[tokio::test]
async fn hydrate_from_empty_or_failing_engine_starts_empty() {
    let (engine, player) = new_player(&PlaybackConfig::default());
    assert!(!player.hydrate().await);

    let media: Vec<MediaRef> = create_test_tracks(2).iter().map(MediaRef::from).collect();
    let engine2 = Arc::new(SimulatedEngine::with_queue(media, Some(0)));
    engine2.fail_next(EngineOp::GetActiveIndex);
    let player2 = lyra_playback::PlaybackOrchestrator::new(engine2, &PlaybackConfig::default());
    assert!(!player2.hydrate().await);
    assert!(player2.queue().is_empty());

    drop(engine);
    assert!(player.queue().is_empty());
}

// ===== Concurrency =====

#[tokio::test]
async fn racing_actions_leave_consistent_state() {
    let (engine, player) = loaded_player(5, 0).await;
    let other = player.clone();

    tokio::join!(player.select_track(3), other.next());
    player.settle().await;

    let queue = player.queue();
    let index = queue.current_index.unwrap();
    assert!(index < 5);
    assert!(queue.current_track().is_some());
    assert!(engine.active_index().is_some());
}
