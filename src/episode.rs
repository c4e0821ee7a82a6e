// src/episode.rs
//
// Episodic bookkeeping: the run-phase state machine, win/loss/episode
// counters, the loss settle-time filter, and the win-driven exploration
// decay.
//
// The Q-table and the exploration rate survive episode resets; everything
// else (time step, per-episode reward, settle streak) is cleared.

use serde::{Deserialize, Serialize};

use crate::config::{DecayConfig, EpisodeLimits, LearningConfig};
use crate::error::Result;
use crate::reward::Outcome;

/// Phase of the interaction loop.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RunPhase {
    Running,
    TerminalWin,
    TerminalLoss,
    EpisodeReset,
}

/// Counters tracked across and within episodes.
///
/// `episode`, `wins` and `losses` are monotone across the run;
/// `time_steps` and `episode_reward` reset with each episode.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct EpisodeCounters {
    pub episode: u64,
    pub time_steps: u64,
    pub wins: u64,
    pub losses: u64,
    pub episode_reward: f64,
}

/// Win-driven epsilon decay with floor-then-zero snap.
///
/// `wins_prev` is the cumulative win count recorded at the previous
/// cadence check; it starts at zero, so the first qualifying check fires
/// whenever any win has occurred.
#[derive(Debug, Clone)]
pub struct EpsilonSchedule {
    cfg: DecayConfig,
    wins_prev: u64,
}

impl EpsilonSchedule {
    pub fn new(cfg: DecayConfig) -> Self {
        Self { cfg, wins_prev: 0 }
    }

    /// Run the cadence check for a completed episode and return the
    /// (possibly decayed) epsilon. Never returns a negative value.
    pub fn on_episode_end(&mut self, episode: u64, wins: u64, epsilon: f64) -> f64 {
        if episode == 0 || episode % self.cfg.cadence != 0 {
            return epsilon;
        }
        let improving = wins as f64 > self.wins_prev as f64 * self.cfg.improvement_ratio;
        self.wins_prev = wins;
        if !improving {
            return epsilon;
        }
        if epsilon > self.cfg.floor {
            (epsilon - self.cfg.step).max(0.0)
        } else {
            0.0
        }
    }
}

/// Drives the interaction loop's bookkeeping.
#[derive(Debug, Clone)]
pub struct EpisodeController {
    phase: RunPhase,
    counters: EpisodeCounters,
    epsilon: f64,
    schedule: EpsilonSchedule,
    limits: EpisodeLimits,
    loss_streak: u64,
}

impl EpisodeController {
    pub fn new(learning: &LearningConfig, limits: EpisodeLimits) -> Result<Self> {
        learning.validate()?;
        limits.validate()?;
        Ok(Self {
            phase: RunPhase::Running,
            counters: EpisodeCounters::default(),
            epsilon: learning.epsilon_initial,
            schedule: EpsilonSchedule::new(learning.decay.clone()),
            limits,
            loss_streak: 0,
        })
    }

    pub fn phase(&self) -> RunPhase {
        self.phase
    }

    pub fn epsilon(&self) -> f64 {
        self.epsilon
    }

    pub fn counters(&self) -> &EpisodeCounters {
        &self.counters
    }

    pub fn limits(&self) -> &EpisodeLimits {
        &self.limits
    }

    /// Record one completed step's reward.
    pub fn record_step(&mut self, reward: f64) {
        self.counters.time_steps += 1;
        self.counters.episode_reward += reward;
    }

    /// Whether the per-episode step cap (if any) has been reached.
    pub fn step_budget_exhausted(&self) -> bool {
        self.limits.max_steps_per_episode > 0
            && self.counters.time_steps >= self.limits.max_steps_per_episode
    }

    /// Whether the run has used its full episode budget.
    pub fn run_complete(&self) -> bool {
        self.counters.episode >= self.limits.max_episodes
    }

    /// Feed the environment's terminal report for the step just taken.
    ///
    /// A win is terminal immediately. A loss condition must persist for
    /// `loss_settle_steps` consecutive steps before the episode ends, so a
    /// transient spike does not abort an otherwise healthy episode.
    pub fn observe(&mut self, terminal: Option<Outcome>) -> RunPhase {
        match terminal {
            Some(Outcome::Win) => {
                self.loss_streak = 0;
                self.counters.wins += 1;
                self.phase = RunPhase::TerminalWin;
            }
            Some(Outcome::Loss) => {
                self.loss_streak += 1;
                if self.loss_streak >= self.limits.loss_settle_steps {
                    self.counters.losses += 1;
                    self.phase = RunPhase::TerminalLoss;
                }
            }
            None => {
                self.loss_streak = 0;
            }
        }
        self.phase
    }

    /// TERMINAL_* (or truncation) -> EPISODE_RESET -> RUNNING.
    ///
    /// Resets per-episode counters and the settle streak, increments the
    /// episode number, runs the decay check, and leaves the Q-table and
    /// accumulated win/loss counts untouched. The caller clears any
    /// smoothing buffers and previous-value tracking of its own.
    pub fn advance_episode(&mut self) -> RunPhase {
        self.phase = RunPhase::EpisodeReset;
        self.counters.episode += 1;
        self.counters.time_steps = 0;
        self.counters.episode_reward = 0.0;
        self.loss_streak = 0;

        self.epsilon =
            self.schedule
                .on_episode_end(self.counters.episode, self.counters.wins, self.epsilon);

        self.phase = RunPhase::Running;
        self.phase
    }
}
