//! Self-mutation guard
//!
//! While the orchestrator is rewriting the engine queue itself, the engine
//! echoes track changes back. Those echoes must not be mistaken for the
//! engine advancing on its own, so external signals are ignored while the
//! guard is up.

/// Whether the orchestrator is in the middle of its own queue mutation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum MutationMode {
    /// External track-change signals are reconciled
    #[default]
    Idle,

    /// External track-change signals are echoes and get dropped.
    /// `depth` counts overlapping mutations still in flight.
    SelfMutating { depth: u32 },
}

impl MutationMode {
    /// Raise the guard (nests)
    pub fn enter(&mut self) {
        *self = match *self {
            Self::Idle => Self::SelfMutating { depth: 1 },
            Self::SelfMutating { depth } => Self::SelfMutating { depth: depth + 1 },
        };
    }

    /// Lower one level of the guard
    pub fn exit(&mut self) {
        *self = match *self {
            Self::Idle | Self::SelfMutating { depth: 0 | 1 } => Self::Idle,
            Self::SelfMutating { depth } => Self::SelfMutating { depth: depth - 1 },
        };
    }

    pub fn is_self_mutating(&self) -> bool {
        matches!(self, Self::SelfMutating { .. })
    }
}
