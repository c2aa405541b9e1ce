//! Domain types for Lyra

mod ids;
mod media;
mod repeat;
mod track;

pub use ids::TrackId;
pub use media::MediaRef;
pub use repeat::RepeatMode;
pub use track::{position_of, Track, UNKNOWN};
