/// Track domain type
use crate::types::TrackId;
use serde::{Deserialize, Serialize};
use std::hash::{Hash, Hasher};

/// Placeholder used when a metadata field is unknown
pub const UNKNOWN: &str = "Unknown";

/// Playable audio track
///
/// Immutable once built. Two tracks are equal when their IDs match,
/// regardless of the remaining metadata.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Track {
    /// Unique track identifier
    pub id: TrackId,

    /// Track title
    pub title: String,

    /// Artist name
    pub artist: String,

    /// Album name
    pub album: String,

    /// Artwork location, if any
    pub artwork: Option<String>,

    /// Playable source locator
    pub uri: String,

    /// Track duration in seconds (0 when unknown)
    pub duration: f64,
}

impl Track {
    /// Create a new track with minimal metadata
    pub fn new(id: impl Into<TrackId>, title: impl Into<String>, uri: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            title: title.into(),
            artist: UNKNOWN.to_string(),
            album: UNKNOWN.to_string(),
            artwork: None,
            uri: uri.into(),
            duration: 0.0,
        }
    }

    /// Set the artist
    #[must_use]
    pub fn with_artist(mut self, artist: impl Into<String>) -> Self {
        self.artist = artist.into();
        self
    }

    /// Set the album
    #[must_use]
    pub fn with_album(mut self, album: impl Into<String>) -> Self {
        self.album = album.into();
        self
    }

    /// Set the artwork location
    #[must_use]
    pub fn with_artwork(mut self, artwork: impl Into<String>) -> Self {
        self.artwork = Some(artwork.into());
        self
    }

    /// Set the duration in seconds
    #[must_use]
    pub fn with_duration(mut self, seconds: f64) -> Self {
        self.duration = if seconds.is_finite() && seconds > 0.0 {
            seconds
        } else {
            0.0
        };
        self
    }

    /// Whether both tracks share an identity
    pub fn same_identity(&self, other: &Track) -> bool {
        self.id == other.id
    }
}

impl PartialEq for Track {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for Track {}

impl Hash for Track {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.id.hash(state);
    }
}

/// Find the position of a track identity within an ordered list
pub fn position_of(tracks: &[Track], id: &TrackId) -> Option<usize> {
    tracks.iter().position(|t| &t.id == id)
}
