//! Reconciliation of engine track-change signals
//!
//! The engine is the source of truth for which track is sounding once it
//! advances on its own. Two redundant signals report that: a pushed event
//! carrying the new track, and the active index read back from the engine.
//! Both are resolved against the local queue here.

use crate::types::QueueState;
use lyra_core::{position_of, TrackId};

/// A track-change observation from the engine
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TrackSignal {
    /// Pushed notification. `None` means the engine did not say which track.
    Track(Option<TrackId>),
    /// Active index read back from the engine
    Index(Option<usize>),
}

/// What the orchestrator should do with a signal
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Resolution {
    /// Move the current index here
    Adopt(usize),
    /// Ambiguous; ask the engine for its active index
    Query,
    /// Nothing to do
    Ignore,
}

/// Resolve a signal against the local queue
///
/// Adoption is idempotent: a signal that points at the current index
/// resolves to `Ignore`.
pub fn resolve(queue: &QueueState, signal: &TrackSignal) -> Resolution {
    let target = match signal {
        TrackSignal::Track(None) => return Resolution::Query,
        TrackSignal::Track(Some(id)) => position_of(&queue.tracks, id),
        TrackSignal::Index(index) => index.filter(|&i| i < queue.tracks.len()),
    };

    match target {
        Some(index) if Some(index) != queue.current_index => Resolution::Adopt(index),
        _ => Resolution::Ignore,
    }
}
