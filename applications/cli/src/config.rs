/// Player configuration
use anyhow::Context;
use lyra_media::DEFAULT_PAGE_SIZE;
use lyra_playback::PlaybackConfig;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

const DEFAULT_CONFIG_FILE: &str = "lyra.toml";

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct PlayerConfig {
    #[serde(default)]
    pub playback: PlaybackConfig,

    #[serde(default = "default_library")]
    pub library: LibrarySettings,

    #[serde(default = "default_clock")]
    pub clock: ClockSettings,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct LibrarySettings {
    /// Directory used when no path is given on the command line
    #[serde(default)]
    pub music_dir: Option<PathBuf>,

    #[serde(default = "default_page_size")]
    pub page_size: usize,
}

/// Simulated playback clock
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ClockSettings {
    /// Wall-clock milliseconds between ticks
    #[serde(default = "default_tick_ms")]
    pub tick_ms: u64,

    /// Playback seconds that elapse per tick
    #[serde(default = "default_speed")]
    pub seconds_per_tick: f64,
}

impl PlayerConfig {
    /// Load configuration from file and environment
    ///
    /// Reads `path` when given (it must exist), otherwise `lyra.toml` in the
    /// working directory if present. `LYRA_*` variables override the file,
    /// with `__` between section and key: `LYRA_PLAYBACK__POLL_INTERVAL_MS`.
    pub fn load(path: Option<&Path>) -> anyhow::Result<Self> {
        let mut settings = config::Config::builder();

        match path {
            Some(path) => {
                settings = settings.add_source(config::File::from(path.to_path_buf()));
            }
            None => {
                let default_path = PathBuf::from(DEFAULT_CONFIG_FILE);
                if default_path.exists() {
                    settings = settings.add_source(config::File::from(default_path));
                }
            }
        }

        // Override with environment variables (prefixed with LYRA_)
        settings = settings.add_source(
            config::Environment::with_prefix("LYRA")
                .prefix_separator("_")
                .separator("__")
                .try_parsing(true),
        );

        let config = settings.build().context("Failed to read configuration")?;
        config
            .try_deserialize()
            .context("Invalid configuration")
    }

    /// Directory to use: the command-line path wins over the configured one
    pub fn music_dir(&self, cli_path: Option<PathBuf>) -> anyhow::Result<PathBuf> {
        cli_path
            .or_else(|| self.library.music_dir.clone())
            .context("No music directory given (pass a path or set library.music_dir)")
    }
}

// Default values
fn default_library() -> LibrarySettings {
    LibrarySettings {
        music_dir: None,
        page_size: default_page_size(),
    }
}

fn default_page_size() -> usize {
    DEFAULT_PAGE_SIZE
}

fn default_clock() -> ClockSettings {
    ClockSettings {
        tick_ms: default_tick_ms(),
        seconds_per_tick: default_speed(),
    }
}

fn default_tick_ms() -> u64 {
    250
}

fn default_speed() -> f64 {
    0.25
}

impl Default for PlayerConfig {
    fn default() -> Self {
        Self {
            playback: PlaybackConfig::default(),
            library: default_library(),
            clock: default_clock(),
        }
    }
}
