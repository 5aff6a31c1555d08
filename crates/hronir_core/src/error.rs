//! crates/hronir_core/src/error.rs
//! The engine's complete error taxonomy (one variant per testable cause).
//! Every operation in `hronir_engine` returns `Result<_, EngineError>`; no
//! out-of-band failure channel, no hidden unwinding.

use thiserror::Error;
use uuid::Uuid;

/// Why a proposed path edge was rejected.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InvalidEdgeReason {
    /// The `current` hrönir does not exist in the store.
    CurrentMissing,
    /// `position > 0` but `predecessor` is nil, or `predecessor` does not exist.
    PredecessorMissing,
    /// `position == 0` but `predecessor` is not nil.
    PredecessorMismatch,
    /// A path with the same `(position, predecessor, current)` already exists
    /// under a *different* derived identity check (defensive — should not
    /// happen given content-addressed ids, but checked explicitly).
    DuplicateEdge,
    /// Adding the edge would make `predecessor` reachable from `current`.
    WouldCycle,
}

impl core::fmt::Display for InvalidEdgeReason {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        let s = match self {
            InvalidEdgeReason::CurrentMissing => "current hrönir does not exist",
            InvalidEdgeReason::PredecessorMissing => "predecessor missing or does not exist",
            InvalidEdgeReason::PredecessorMismatch => "position 0 requires an empty predecessor",
            InvalidEdgeReason::DuplicateEdge => "duplicate (position, predecessor, current) edge",
            InvalidEdgeReason::WouldCycle => "edge would introduce a cycle",
        };
        f.write_str(s)
    }
}

/// Complete error taxonomy for the protocol engine.
#[derive(Debug, Error)]
pub enum EngineError {
    #[error("not found: {0}")]
    NotFound(NotFoundKind),

    #[error("invalid edge: {0}")]
    InvalidEdge(InvalidEdgeReason),

    #[error("duplicate vote: {0}")]
    DuplicateVote(&'static str),

    #[error("mandate error: {0}")]
    Mandate(MandateError),

    #[error("duel mismatch: verdict for position {position} does not match the active duel")]
    DuelMismatch { position: u64 },

    #[error("over capacity: {0}")]
    OverCapacity(&'static str),

    #[error("conflict: a concurrent writer committed sequence {observed}; caller observed {expected}")]
    Conflict { expected: i64, observed: i64 },

    #[error("integrity error: {0}")]
    Integrity(String),

    #[error("storage error: {0}")]
    Storage(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NotFoundKind {
    Hronir(Uuid),
    Path(Uuid),
}

impl core::fmt::Display for NotFoundKind {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            NotFoundKind::Hronir(id) => write!(f, "hrönir {id} not found"),
            NotFoundKind::Path(id) => write!(f, "path {id} not found"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MandateError {
    NotQualified,
    AlreadySpent,
    ZeroVotingPower,
    UnknownToken,
}

impl core::fmt::Display for MandateError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        let s = match self {
            MandateError::NotQualified => "voting token path is not QUALIFIED",
            MandateError::AlreadySpent => "voting token already SPENT",
            MandateError::ZeroVotingPower => "voting token has zero voting power (position 0)",
            MandateError::UnknownToken => "voting token does not identify an existing path",
        };
        f.write_str(s)
    }
}

/// `hronir_core` is I/O-free and knows nothing about `rusqlite`. Storage
/// layers convert their own errors with `.map_err(storage_error)` instead of
/// each re-deriving an ad-hoc `String` conversion.
pub fn storage_error<E: core::fmt::Display>(e: E) -> EngineError {
    EngineError::Storage(e.to_string())
}

pub type EngineResult<T> = Result<T, EngineError>;
