/// Lyra - command-line music player
mod commands;
mod config;

use clap::{Parser, Subcommand};
use commands::Command;
use config::PlayerConfig;
use lyra_core::{RepeatMode, Track};
use lyra_media::{DeviceAudio, DirectoryLibrary};
use lyra_playback::{attach, setup, EngineOptions, PlayerState, SimulatedEngine};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::time::MissedTickBehavior;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser)]
#[command(name = "lyra")]
#[command(about = "Lyra music player", long_about = None)]
struct Cli {
    /// Configuration file path
    #[arg(short, long, global = true, env = "LYRA_CONFIG")]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List the audio files in a directory
    Scan {
        /// Music directory (defaults to library.music_dir)
        path: Option<PathBuf>,

        /// Files per page
        #[arg(long)]
        page_size: Option<usize>,
    },
    /// Play a directory on the simulated engine
    Play {
        /// Music directory (defaults to library.music_dir)
        path: Option<PathBuf>,

        /// Start with shuffle enabled
        #[arg(long)]
        shuffle: bool,

        /// Repeat mode: off, all or one
        #[arg(long)]
        repeat: Option<RepeatMode>,

        /// Queue position to start at
        #[arg(long, default_value_t = 0)]
        start: usize,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "lyra=info,lyra_playback=info,lyra_media=info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let cli = Cli::parse();
    let mut config = PlayerConfig::load(cli.config.as_deref())?;

    let result = match cli.command {
        Commands::Scan { path, page_size } => {
            if let Some(size) = page_size {
                config.library.page_size = size;
            }
            scan(&config, path).await
        }
        Commands::Play {
            path,
            shuffle,
            repeat,
            start,
        } => {
            config.playback.shuffle |= shuffle;
            if let Some(mode) = repeat {
                config.playback.repeat = mode;
            }
            play(&config, path, start).await
        }
    };

    if let Err(e) = &result {
        tracing::error!("{:#}", e);
    }
    result
}

/// Load every page of the directory into a track list
async fn load_library(config: &PlayerConfig, path: PathBuf) -> anyhow::Result<Vec<Track>> {
    let library = Arc::new(DirectoryLibrary::new(&path));
    let audio = DeviceAudio::with_page_size(library, config.library.page_size);

    audio.init().await;
    if !audio.permission_status().is_granted() {
        anyhow::bail!("Cannot read music directory {}", path.display());
    }

    let mut page = 1;
    loop {
        let state = audio.state();
        tracing::debug!(page, loaded = state.tracks.len(), total = state.total_count, "Library page");
        if !state.has_more {
            break;
        }
        audio.load_more().await;
        page += 1;

        if !audio.permission_status().is_granted() {
            anyhow::bail!("Lost access to {} while listing", path.display());
        }
    }

    Ok(audio.tracks())
}

async fn scan(config: &PlayerConfig, path: Option<PathBuf>) -> anyhow::Result<()> {
    let path = config.music_dir(path)?;
    let tracks = load_library(config, path.clone()).await?;

    println!("{} audio files in {}", tracks.len(), path.display());
    for (i, track) in tracks.iter().enumerate() {
        println!(
            "{:>4}  {:>6}  {}",
            i,
            format_time(track.duration),
            track.title
        );
    }

    Ok(())
}

async fn play(config: &PlayerConfig, path: Option<PathBuf>, start: usize) -> anyhow::Result<()> {
    let path = config.music_dir(path)?;
    let tracks = load_library(config, path.clone()).await?;
    if tracks.is_empty() {
        anyhow::bail!("No audio files in {}", path.display());
    }

    let engine = Arc::new(SimulatedEngine::new());
    setup::global()
        .initialize(engine.as_ref(), &EngineOptions::default())
        .await?;

    let (player, sync) = attach(Arc::clone(&engine), &config.playback).await;
    tracing::info!(
        tracks = tracks.len(),
        shuffle = config.playback.shuffle,
        repeat = %config.playback.repeat,
        "Starting playback"
    );
    player.set_queue(tracks, start).await;

    println!("{}", commands::HELP);

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    let mut states = player.subscribe();
    let mut clock = tokio::time::interval(Duration::from_millis(config.clock.tick_ms.max(1)));
    clock.set_missed_tick_behavior(MissedTickBehavior::Skip);
    let mut now_playing = None;

    loop {
        tokio::select! {
            line = lines.next_line() => {
                let Some(line) = line? else { break };
                match commands::parse(&line) {
                    Some(Command::Quit) => break,
                    Some(Command::Help) => println!("{}", commands::HELP),
                    Some(Command::Status) => print_status(&player.state()),
                    Some(command) => commands::apply(&player, command).await,
                    None if line.trim().is_empty() => {}
                    None => println!("Unknown command: {} (h for help)", line.trim()),
                }
            }
            _ = clock.tick() => engine.advance(config.clock.seconds_per_tick),
            changed = states.changed() => {
                if changed.is_err() {
                    break;
                }
                let state = states.borrow_and_update().clone();
                let current = state.current_track.as_ref().map(|t| t.id.clone());
                if current != now_playing {
                    now_playing = current;
                    print_status(&state);
                }
            }
            _ = tokio::signal::ctrl_c() => break,
        }
    }

    player.stop().await;
    sync.shutdown().await;
    setup::global().teardown().await;
    tracing::info!("Player stopped");

    Ok(())
}

fn print_status(state: &PlayerState) {
    let Some(track) = &state.current_track else {
        println!("Nothing playing");
        return;
    };

    let index = state.queue.current_index.map_or(0, |i| i + 1);
    println!(
        "{} [{}/{}] {} - {}  {}/{}  shuffle:{} repeat:{}",
        if state.playback.is_playing { ">" } else { "||" },
        index,
        state.queue.len(),
        track.artist,
        track.title,
        format_time(state.playback.current_time),
        format_time(track.duration),
        if state.queue.shuffle_enabled { "on" } else { "off" },
        state.queue.repeat_mode,
    );
}

fn format_time(seconds: f64) -> String {
    let total = seconds.max(0.0).round() as u64;
    format!("{}:{:02}", total / 60, total % 60)
}
