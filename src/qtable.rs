// src/qtable.rs
//
// Dense action-value table: rows = discretized states, columns = discrete
// actions. Zero-initialized (or restored from a snapshot), rectangular for
// the lifetime of a run, mutated only by the learner's update step.
//
// The core is single-threaded; concurrent readers (reporting, dashboards)
// must take `snapshot()` copies rather than aliasing the live table.

use crate::error::{Result, RlError};
use crate::snapshot::QTableSnapshot;

#[derive(Debug, Clone)]
pub struct QTable {
    /// Row-major values, `state_count * action_count` entries.
    values: Vec<f64>,
    state_count: usize,
    action_count: usize,
}

impl QTable {
    /// Create a zero-initialized table of the given shape.
    pub fn new(state_count: usize, action_count: usize) -> Result<Self> {
        if state_count == 0 || action_count == 0 {
            return Err(RlError::Configuration(format!(
                "q-table shape must be non-zero, got {} x {}",
                state_count, action_count
            )));
        }
        Ok(Self {
            values: vec![0.0; state_count * action_count],
            state_count,
            action_count,
        })
    }

    /// Restore a table from a persisted snapshot.
    pub fn from_snapshot(snapshot: &QTableSnapshot) -> Result<Self> {
        snapshot.check_consistency()?;
        Ok(Self {
            values: snapshot.values.clone(),
            state_count: snapshot.state_count,
            action_count: snapshot.action_count,
        })
    }

    pub fn state_count(&self) -> usize {
        self.state_count
    }

    pub fn action_count(&self) -> usize {
        self.action_count
    }

    fn offset(&self, state: usize, action: usize) -> Result<usize> {
        if state >= self.state_count || action >= self.action_count {
            return Err(RlError::OutOfRange {
                state,
                action,
                state_count: self.state_count,
                action_count: self.action_count,
            });
        }
        Ok(state * self.action_count + action)
    }

    /// Current estimate for (state, action).
    pub fn get(&self, state: usize, action: usize) -> Result<f64> {
        Ok(self.values[self.offset(state, action)?])
    }

    /// In-place overwrite of one estimate.
    pub fn set(&mut self, state: usize, action: usize, value: f64) -> Result<()> {
        let off = self.offset(state, action)?;
        self.values[off] = value;
        Ok(())
    }

    /// Add `delta` to one estimate, returning the new value.
    pub fn add(&mut self, state: usize, action: usize, delta: f64) -> Result<f64> {
        let off = self.offset(state, action)?;
        self.values[off] += delta;
        Ok(self.values[off])
    }

    /// Read-only view of all action values for a state.
    pub fn row(&self, state: usize) -> Result<&[f64]> {
        if state >= self.state_count {
            return Err(RlError::OutOfRange {
                state,
                action: 0,
                state_count: self.state_count,
                action_count: self.action_count,
            });
        }
        let start = state * self.action_count;
        Ok(&self.values[start..start + self.action_count])
    }

    /// Greedy action for a state, first-index tie-break.
    pub fn best_action(&self, state: usize) -> Result<usize> {
        Ok(argmax(self.row(state)?))
    }

    /// Consistent copy for persistence or reporting.
    pub fn snapshot(&self) -> QTableSnapshot {
        QTableSnapshot {
            state_count: self.state_count,
            action_count: self.action_count,
            values: self.values.clone(),
        }
    }
}

/// Index of the maximum value in `row`; among ties, the lowest index wins.
///
/// This tie-break is part of the policy's determinism contract and must not
/// change.
pub fn argmax(row: &[f64]) -> usize {
    let mut best_idx = 0usize;
    let mut best = f64::NEG_INFINITY;
    for (idx, &v) in row.iter().enumerate() {
        if v > best {
            best = v;
            best_idx = idx;
        }
    }
    best_idx
}
