// src/error.rs
//
// Error taxonomy for the learning core.
//
// All variants are unrecoverable at the point of detection: a tabular
// learner has no safe way to "skip" a corrupted update, so callers abort
// the current step rather than substitute a default.

use thiserror::Error;

/// Errors surfaced by the learning core.
#[derive(Debug, Error)]
pub enum RlError {
    /// Invalid configuration detected at construction or startup:
    /// non-monotonic boundary tables, zero-sized tables, shape mismatches,
    /// or an action mask with no permitted entries.
    #[error("configuration error: {0}")]
    Configuration(String),

    /// Table index outside the configured shape. Always an integration bug;
    /// never clamped.
    #[error(
        "index out of range: state {state}, action {action} \
         (table is {state_count} x {action_count})"
    )]
    OutOfRange {
        state: usize,
        action: usize,
        state_count: usize,
        action_count: usize,
    },

    /// NaN or infinite observation fed to the discretizer. Rejected rather
    /// than silently bucketed, since it would alias to the overflow bucket
    /// and corrupt learning.
    #[error("degenerate observation for dimension `{dimension}`: {value}")]
    DegenerateInput { dimension: String, value: f64 },

    /// Snapshot payload inconsistent with its declared dimensions.
    #[error("snapshot format error: {0}")]
    SnapshotFormat(String),

    /// I/O failure while persisting or loading a snapshot.
    #[error("snapshot io error: {0}")]
    SnapshotIo(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, RlError>;
