// src/snapshot.rs
//
// Persisted Q-table layout: a rectangular numeric table, row-major, with
// no header beyond the two dimensions. Loaded once at startup to resume
// learning.
//
// Two encodings:
// - JSON on disk (serde), for the harness's save/load flags.
// - A flat f64 wire vector `[state_count, action_count, values...]` for
//   transports that carry plain numeric arrays. The payload length must
//   equal `2 + state_count * action_count`; anything else is rejected.

use std::fs::File;
use std::io::{BufReader, BufWriter};
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{Result, RlError};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QTableSnapshot {
    pub state_count: usize,
    pub action_count: usize,
    /// Row-major: `values[state * action_count + action]`.
    pub values: Vec<f64>,
}

impl QTableSnapshot {
    /// Verify the value buffer matches the declared dimensions.
    pub fn check_consistency(&self) -> Result<()> {
        if self.state_count == 0 || self.action_count == 0 {
            return Err(RlError::SnapshotFormat(format!(
                "snapshot shape must be non-zero, got {} x {}",
                self.state_count, self.action_count
            )));
        }
        // Dimensions come straight off the wire; the product must not be
        // trusted to fit.
        let expected = self
            .state_count
            .checked_mul(self.action_count)
            .ok_or_else(|| {
                RlError::SnapshotFormat(format!(
                    "snapshot shape {} x {} overflows",
                    self.state_count, self.action_count
                ))
            })?;
        if self.values.len() != expected {
            return Err(RlError::SnapshotFormat(format!(
                "snapshot declares {} x {} = {} values but carries {}",
                self.state_count,
                self.action_count,
                expected,
                self.values.len()
            )));
        }
        Ok(())
    }

    /// Encode to the flat wire vector.
    pub fn to_wire(&self) -> Vec<f64> {
        let mut out = Vec::with_capacity(2 + self.values.len());
        out.push(self.state_count as f64);
        out.push(self.action_count as f64);
        out.extend_from_slice(&self.values);
        out
    }

    /// Decode from the flat wire vector, validating the field count.
    pub fn from_wire(payload: &[f64]) -> Result<Self> {
        if payload.len() < 2 {
            return Err(RlError::SnapshotFormat(
                "wire payload shorter than the two dimension fields".into(),
            ));
        }
        let state_count = payload[0] as usize;
        let action_count = payload[1] as usize;
        let snapshot = Self {
            state_count,
            action_count,
            values: payload[2..].to_vec(),
        };
        snapshot.check_consistency()?;
        Ok(snapshot)
    }

    /// Write the snapshot as JSON.
    pub fn save(&self, path: &Path) -> Result<()> {
        let file = File::create(path)?;
        let writer = BufWriter::new(file);
        serde_json::to_writer(writer, self)
            .map_err(|e| RlError::SnapshotFormat(e.to_string()))?;
        Ok(())
    }

    /// Load a snapshot from JSON and validate it.
    pub fn load(path: &Path) -> Result<Self> {
        let file = File::open(path)?;
        let reader = BufReader::new(file);
        let snapshot: QTableSnapshot = serde_json::from_reader(reader)
            .map_err(|e| RlError::SnapshotFormat(e.to_string()))?;
        snapshot.check_consistency()?;
        Ok(snapshot)
    }
}
