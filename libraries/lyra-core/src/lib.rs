//! Lyra Core
//!
//! Platform-agnostic domain types and error handling shared by every Lyra crate.
//!
//! The core crate defines:
//! - **Domain Types**: `Track`, `TrackId`, `MediaRef`, `RepeatMode`
//! - **Error Handling**: Unified `LyraError` and `Result` types
//!
//! # Example
//!
//! ```rust
//! use lyra_core::{MediaRef, RepeatMode, Track};
//!
//! let track = Track::new("t1", "Intro", "file:///music/intro.mp3").with_duration(182.0);
//! let media = MediaRef::from(&track);
//! assert_eq!(media.url, "file:///music/intro.mp3");
//!
//! assert_eq!(RepeatMode::Off.next(), RepeatMode::All);
//! ```

#![forbid(unsafe_code)]

pub mod error;
pub mod types;

pub use error::{LyraError, Result};
pub use types::{position_of, MediaRef, RepeatMode, Track, TrackId, UNKNOWN};
