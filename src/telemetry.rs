// src/telemetry.rs
//
// JSONL telemetry for per-step diagnostics and episode boundaries.
//
// Observational only: nothing written here may feed back into control
// decisions. Controlled by environment variables:
// - TABQ_TELEMETRY_MODE: "off" (default) or "jsonl"
// - TABQ_TELEMETRY_PATH: path to the JSONL file

use std::env;
use std::fs::{File, OpenOptions};
use std::io::{BufWriter, Write};
use std::path::PathBuf;

use serde::{Deserialize, Serialize};
use serde_json::{self, Value as JsonValue};

use crate::learner::TdUpdate;
use crate::reward::Outcome;

/// Per-step diagnostic record.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StepRecord {
    /// Episode number.
    pub episode: u64,
    /// Time step within the episode.
    pub time_step: u64,
    /// Flat state index the action was chosen from.
    pub state: usize,
    /// Chosen action index.
    pub action: usize,
    /// State the environment transitioned to.
    pub next_state: usize,
    /// Reward received for the transition.
    pub reward: f64,
    /// Exploration rate at selection time.
    pub epsilon: f64,
    /// TD update diagnostics. The training loop fills this on every step;
    /// it is optional so evaluation-only (frozen-table) runs can log the
    /// same record shape without fabricating an update.
    pub update: Option<TdUpdate>,
}

/// Episode boundary marker.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EpisodeMarker {
    pub episode: u64,
    pub marker_type: EpisodeMarkerType,
    /// Terminal outcome (end markers; None for truncated episodes).
    pub outcome: Option<Outcome>,
    /// Cumulative reward over the episode (end markers).
    pub episode_reward: Option<f64>,
    /// Steps taken (end markers).
    pub time_steps: Option<u64>,
    /// Exploration rate at the boundary.
    pub epsilon: f64,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub enum EpisodeMarkerType {
    Start,
    End,
}

/// JSONL telemetry sink, disabled by default.
pub struct Telemetry {
    enabled: bool,
    path: Option<PathBuf>,
    writer: Option<BufWriter<File>>,
}

impl Default for Telemetry {
    fn default() -> Self {
        Self::new()
    }
}

impl Telemetry {
    /// Disabled sink.
    pub fn new() -> Self {
        Self {
            enabled: false,
            path: None,
            writer: None,
        }
    }

    /// Configure from TABQ_TELEMETRY_MODE / TABQ_TELEMETRY_PATH.
    pub fn from_env() -> Self {
        let enabled = env::var("TABQ_TELEMETRY_MODE")
            .map(|s| s.to_lowercase() == "jsonl")
            .unwrap_or(false);
        let path = env::var("TABQ_TELEMETRY_PATH").ok().map(PathBuf::from);
        Self {
            enabled,
            path,
            writer: None,
        }
    }

    /// Enable with an explicit path.
    pub fn enable(path: PathBuf) -> Self {
        Self {
            enabled: true,
            path: Some(path),
            writer: None,
        }
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    fn ensure_writer(&mut self) -> Option<&mut BufWriter<File>> {
        if !self.enabled {
            return None;
        }
        if self.writer.is_none() {
            let path = self.path.as_ref()?;
            if let Some(parent) = path.parent() {
                let _ = std::fs::create_dir_all(parent);
            }
            let file = OpenOptions::new()
                .create(true)
                .append(true)
                .open(path)
                .ok()?;
            self.writer = Some(BufWriter::new(file));
        }
        self.writer.as_mut()
    }

    fn write_json(&mut self, value: &JsonValue) {
        let Some(writer) = self.ensure_writer() else {
            return;
        };
        let line = match serde_json::to_string(value) {
            Ok(s) => s,
            Err(_) => return,
        };
        if writeln!(writer, "{}", line).is_err() {
            self.enabled = false;
            self.writer = None;
        }
    }

    pub fn log_step(&mut self, record: &StepRecord) {
        if !self.enabled {
            return;
        }
        let value = serde_json::to_value(record).unwrap_or_default();
        self.write_json(&value);
    }

    pub fn log_episode_start(&mut self, episode: u64, epsilon: f64) {
        if !self.enabled {
            return;
        }
        let marker = EpisodeMarker {
            episode,
            marker_type: EpisodeMarkerType::Start,
            outcome: None,
            episode_reward: None,
            time_steps: None,
            epsilon,
        };
        let value = serde_json::to_value(&marker).unwrap_or_default();
        self.write_json(&value);
    }

    pub fn log_episode_end(
        &mut self,
        episode: u64,
        outcome: Option<Outcome>,
        episode_reward: f64,
        time_steps: u64,
        epsilon: f64,
    ) {
        if !self.enabled {
            return;
        }
        let marker = EpisodeMarker {
            episode,
            marker_type: EpisodeMarkerType::End,
            outcome,
            episode_reward: Some(episode_reward),
            time_steps: Some(time_steps),
            epsilon,
        };
        let value = serde_json::to_value(&marker).unwrap_or_default();
        self.write_json(&value);
    }

    pub fn flush(&mut self) {
        if let Some(writer) = &mut self.writer {
            let _ = writer.flush();
        }
    }
}

impl Drop for Telemetry {
    fn drop(&mut self) {
        self.flush();
    }
}
