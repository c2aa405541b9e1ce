//! Shuffle utilities for queue randomization
//!
//! Pure functions over track slices. Nothing here remembers the order it
//! came from; restoring the original order is the caller's job.

use lyra_core::Track;
use rand::seq::SliceRandom;
use rand::Rng;

/// Uniformly shuffle a list of tracks (Fisher-Yates)
///
/// Returns a new vector; the input is left untouched.
pub fn shuffle_tracks(tracks: &[Track]) -> Vec<Track> {
    shuffle_tracks_with(tracks, &mut rand::thread_rng())
}

/// [`shuffle_tracks`] with a caller-provided random source
pub fn shuffle_tracks_with<R: Rng + ?Sized>(tracks: &[Track], rng: &mut R) -> Vec<Track> {
    let mut shuffled = tracks.to_vec();
    shuffled.shuffle(rng);
    shuffled
}

/// Shuffle while pinning the current track to the front
///
/// The track at `current` becomes position 0 and every other track is
/// shuffled after it. With no current track (or a stale index) the whole
/// list is shuffled.
pub fn shuffle_pinned(tracks: &[Track], current: Option<usize>) -> Vec<Track> {
    shuffle_pinned_with(tracks, current, &mut rand::thread_rng())
}

/// [`shuffle_pinned`] with a caller-provided random source
pub fn shuffle_pinned_with<R: Rng + ?Sized>(
    tracks: &[Track],
    current: Option<usize>,
    rng: &mut R,
) -> Vec<Track> {
    let Some(pinned) = current.filter(|&i| i < tracks.len()) else {
        return shuffle_tracks_with(tracks, rng);
    };

    let mut others: Vec<Track> = tracks
        .iter()
        .enumerate()
        .filter(|&(i, _)| i != pinned)
        .map(|(_, t)| t.clone())
        .collect();
    others.shuffle(rng);

    let mut result = Vec::with_capacity(tracks.len());
    result.push(tracks[pinned].clone());
    result.extend(others);
    result
}
