/// Media references handed to the audio engine
use crate::types::{Track, TrackId, UNKNOWN};
use serde::{Deserialize, Serialize};

/// Engine-facing projection of a [`Track`]
///
/// This is what gets loaded into the engine's queue and what the engine
/// reports back in snapshots and track-change notifications. Fields coming
/// back from an engine may be empty when the engine lost them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MediaRef {
    pub id: TrackId,
    pub url: String,
    pub title: String,
    pub artist: String,
    pub album: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub artwork: Option<String>,
    #[serde(default)]
    pub duration: f64,
}

impl MediaRef {
    /// Rebuild a track from an engine-held reference
    ///
    /// Missing fields fall back to placeholders: an empty id becomes
    /// `"unknown"`, empty text fields become `"Unknown"`.
    pub fn into_track(self) -> Track {
        let or_unknown = |s: String| if s.is_empty() { UNKNOWN.to_string() } else { s };

        Track {
            id: if self.id.is_empty() {
                TrackId::new("unknown")
            } else {
                self.id
            },
            title: or_unknown(self.title),
            artist: or_unknown(self.artist),
            album: or_unknown(self.album),
            artwork: self.artwork.filter(|a| !a.is_empty()),
            uri: self.url,
            duration: if self.duration.is_finite() && self.duration > 0.0 {
                self.duration
            } else {
                0.0
            },
        }
    }
}

impl From<&Track> for MediaRef {
    fn from(track: &Track) -> Self {
        Self {
            id: track.id.clone(),
            url: track.uri.clone(),
            title: track.title.clone(),
            artist: track.artist.clone(),
            album: track.album.clone(),
            artwork: track.artwork.clone(),
            duration: track.duration,
        }
    }
}
