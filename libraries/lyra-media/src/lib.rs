//! Lyra - Device Media
//!
//! Browsing the audio files available on the device, one page at a time,
//! and turning them into playable [`lyra_core::Track`]s.
//!
//! - [`MediaLibrary`]: the permission-gated, paginated media source
//! - [`DeviceAudio`]: track picker state over any media source
//! - [`DirectoryLibrary`]: a media source backed by a music directory

mod device;
mod directory;
mod error;
mod library;

pub use device::{DeviceAudio, DeviceAudioState};
pub use directory::{is_audio_file, DirectoryLibrary};
pub use error::{MediaError, Result};
pub use library::{
    asset_to_track, strip_extension, AudioAsset, AudioPage, MediaLibrary, PageRequest,
    PermissionStatus, DEFAULT_PAGE_SIZE, UNKNOWN_ALBUM, UNKNOWN_ARTIST,
};
