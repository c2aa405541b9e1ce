//! Media library capability and asset types

use crate::error::Result;
use async_trait::async_trait;
use lyra_core::Track;
use serde::{Deserialize, Serialize};

/// Number of assets fetched per page
pub const DEFAULT_PAGE_SIZE: usize = 50;

pub const UNKNOWN_ARTIST: &str = "Unknown Artist";
pub const UNKNOWN_ALBUM: &str = "Unknown Album";

/// Access to the device's audio files
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PermissionStatus {
    /// Not asked yet
    #[default]
    Undetermined,
    Granted,
    Denied,
}

impl PermissionStatus {
    pub fn is_granted(self) -> bool {
        self == Self::Granted
    }
}

/// One page request
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageRequest {
    pub page_size: usize,
    /// Where the previous page ended; `None` for the first page
    pub cursor: Option<String>,
}

impl PageRequest {
    pub fn first(page_size: usize) -> Self {
        Self {
            page_size,
            cursor: None,
        }
    }

    pub fn after(page_size: usize, cursor: impl Into<String>) -> Self {
        Self {
            page_size,
            cursor: Some(cursor.into()),
        }
    }
}

/// An audio file as the media source reports it
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AudioAsset {
    pub id: String,
    pub filename: String,
    pub uri: String,
    /// Seconds, 0 when unknown
    pub duration: f64,
}

/// One page of assets
#[derive(Debug, Clone, PartialEq, Default)]
pub struct AudioPage {
    pub items: Vec<AudioAsset>,
    pub next_cursor: Option<String>,
    pub has_more: bool,
    /// Assets available across all pages
    pub total_count: usize,
}

/// A source of device audio files
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait MediaLibrary: Send + Sync {
    /// Current permission, without prompting
    async fn check_permission(&self) -> Result<PermissionStatus>;

    /// Prompt for permission where the platform supports it
    async fn request_permission(&self) -> Result<PermissionStatus>;

    /// List audio assets, one page at a time
    async fn list_audio(&self, request: PageRequest) -> Result<AudioPage>;
}

/// Drop the last extension from a filename
///
/// `"song.mp3"` becomes `"song"`, `"a.b.flac"` becomes `"a.b"`. A name
/// without an extension is returned unchanged.
pub fn strip_extension(filename: &str) -> &str {
    match filename.rfind('.') {
        Some(dot) if dot + 1 < filename.len() => &filename[..dot],
        _ => filename,
    }
}

/// Project an asset onto a playable track
///
/// Device assets carry no tags, so the title comes from the filename and
/// artist and album get placeholders.
pub fn asset_to_track(asset: &AudioAsset) -> Track {
    Track::new(
        asset.id.as_str(),
        strip_extension(&asset.filename),
        asset.uri.as_str(),
    )
    .with_artist(UNKNOWN_ARTIST)
    .with_album(UNKNOWN_ALBUM)
    .with_duration(asset.duration)
}
