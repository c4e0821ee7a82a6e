// src/runner.rs
//
// Episodic training loop.
//
// Drives Environment -> Policy -> Learner -> EpisodeController for a full
// run: action selection on the current Q-row, environment transition, TD
// update (on- or off-policy), terminal detection, telemetry, and episode
// reset. The Q-table and exploration rate persist across episodes; the
// loop is single-threaded and deterministic for a fixed seed.

use serde::{Deserialize, Serialize};

use crate::config::{EpisodeLimits, LearningConfig};
use crate::env::Environment;
use crate::episode::{EpisodeController, EpisodeCounters, RunPhase};
use crate::error::{Result, RlError};
use crate::learner::{Learner, TdMode};
use crate::policy::{ActionContext, Policy};
use crate::qtable::QTable;
use crate::reward::Outcome;
use crate::snapshot::QTableSnapshot;
use crate::telemetry::{StepRecord, Telemetry};

/// TD algorithm for the run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Algorithm {
    /// On-policy: bootstrap from the action actually chosen next.
    Sarsa,
    /// Off-policy: bootstrap from the greedy next action.
    QLearning,
}

/// Full trainer configuration.
#[derive(Debug, Clone)]
pub struct TrainerConfig {
    pub algorithm: Algorithm,
    pub learning: LearningConfig,
    pub limits: EpisodeLimits,
}

impl Default for TrainerConfig {
    fn default() -> Self {
        Self {
            algorithm: Algorithm::QLearning,
            learning: LearningConfig::default(),
            limits: EpisodeLimits::default(),
        }
    }
}

/// Summary of one completed (or truncated) episode.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EpisodeSummary {
    pub episode: u64,
    pub time_steps: u64,
    /// Terminal outcome; None when the step budget truncated the episode.
    pub outcome: Option<Outcome>,
    pub episode_reward: f64,
    /// Exploration rate when the episode ended (before any decay).
    pub epsilon: f64,
    pub cumulative_wins: u64,
    pub cumulative_losses: u64,
}

/// Owns the Q-table and wires the core components into the interaction
/// loop.
///
/// The trainer drives discrete environments and presents a neutral
/// (zero) bias signal on every choice, so it is meant for unbiased
/// policies. A direction-biased policy needs a live plant signal per
/// step; drive it directly against the pipeline instead of through
/// `Trainer`.
pub struct Trainer<E, P>
where
    E: Environment,
    P: Policy,
{
    env: E,
    policy: P,
    learner: Learner,
    controller: EpisodeController,
    q: QTable,
    algorithm: Algorithm,
    telemetry: Telemetry,
}

impl<E, P> Trainer<E, P>
where
    E: Environment,
    P: Policy,
{
    /// Create a trainer with a zero-initialized Q-table.
    pub fn new(env: E, policy: P, config: TrainerConfig) -> Result<Self> {
        let q = QTable::new(env.state_count(), env.action_count())?;
        Self::with_qtable(env, policy, config, q)
    }

    /// Resume a trainer from a persisted snapshot.
    pub fn resume(
        env: E,
        policy: P,
        config: TrainerConfig,
        snapshot: &QTableSnapshot,
    ) -> Result<Self> {
        let q = QTable::from_snapshot(snapshot)?;
        Self::with_qtable(env, policy, config, q)
    }

    fn with_qtable(env: E, policy: P, config: TrainerConfig, q: QTable) -> Result<Self> {
        if q.state_count() != env.state_count() || q.action_count() != env.action_count() {
            return Err(RlError::Configuration(format!(
                "q-table shape {} x {} does not match environment {} x {}",
                q.state_count(),
                q.action_count(),
                env.state_count(),
                env.action_count()
            )));
        }
        let controller = EpisodeController::new(&config.learning, config.limits.clone())?;
        let learner = Learner::new(config.learning.alpha, config.learning.discount);
        Ok(Self {
            env,
            policy,
            learner,
            controller,
            q,
            algorithm: config.algorithm,
            telemetry: Telemetry::new(),
        })
    }

    pub fn with_telemetry(mut self, telemetry: Telemetry) -> Self {
        self.telemetry = telemetry;
        self
    }

    pub fn qtable(&self) -> &QTable {
        &self.q
    }

    /// Consistent copy of the table for persistence or reporting.
    pub fn snapshot(&self) -> QTableSnapshot {
        self.q.snapshot()
    }

    pub fn epsilon(&self) -> f64 {
        self.controller.epsilon()
    }

    pub fn counters(&self) -> &EpisodeCounters {
        self.controller.counters()
    }

    pub fn env(&self) -> &E {
        &self.env
    }

    fn choose(&mut self, state: usize, legal: &[bool]) -> Result<usize> {
        // Neutral bias: discrete environments carry no plant signal.
        let ctx = ActionContext {
            q_row: self.q.row(state)?,
            legal,
            epsilon: self.controller.epsilon(),
            bias_signal: 0.0,
        };
        self.policy.choose_action(&ctx)
    }

    /// Run one episode to termination or truncation.
    pub fn run_episode(&mut self) -> Result<EpisodeSummary> {
        let episode = self.controller.counters().episode;
        self.telemetry
            .log_episode_start(episode, self.controller.epsilon());

        let mut state = self.env.initial_state();
        let mut legal = self.env.legal_actions(state);
        let mut action = self.choose(state, &legal)?;
        let mut outcome: Option<Outcome> = None;

        loop {
            let next = self.env.next_state(action, state, &legal);
            let next_legal = self.env.legal_actions(next);
            let step = self.env.reward(next);

            // The next action is selected before the update so the
            // on-policy target stays on the sampled trajectory.
            let next_action = self.choose(next, &next_legal)?;
            let mode = match self.algorithm {
                Algorithm::Sarsa => TdMode::Sarsa { next_action },
                Algorithm::QLearning => TdMode::QLearning,
            };
            let update = self
                .learner
                .update(&mut self.q, state, action, next, step.value, mode)?;

            self.controller.record_step(step.value);
            self.telemetry.log_step(&StepRecord {
                episode,
                time_step: self.controller.counters().time_steps,
                state,
                action,
                next_state: next,
                reward: step.value,
                epsilon: self.controller.epsilon(),
                update: Some(update),
            });

            match self.controller.observe(step.terminal) {
                RunPhase::TerminalWin => {
                    outcome = Some(Outcome::Win);
                    break;
                }
                RunPhase::TerminalLoss => {
                    outcome = Some(Outcome::Loss);
                    break;
                }
                _ => {}
            }
            if self.controller.step_budget_exhausted() {
                break;
            }

            state = next;
            legal = next_legal;
            action = next_action;
        }

        let counters = *self.controller.counters();
        let summary = EpisodeSummary {
            episode,
            time_steps: counters.time_steps,
            outcome,
            episode_reward: counters.episode_reward,
            epsilon: self.controller.epsilon(),
            cumulative_wins: counters.wins,
            cumulative_losses: counters.losses,
        };

        self.telemetry.log_episode_end(
            episode,
            outcome,
            counters.episode_reward,
            counters.time_steps,
            self.controller.epsilon(),
        );

        self.controller.advance_episode();
        Ok(summary)
    }

    /// Run the full episode budget.
    pub fn run(&mut self) -> Result<Vec<EpisodeSummary>> {
        let mut summaries = Vec::new();
        while !self.controller.run_complete() {
            summaries.push(self.run_episode()?);
        }
        self.telemetry.flush();
        Ok(summaries)
    }

    /// Greedy action per state (for reporting the learned policy).
    pub fn greedy_action(&self, state: usize) -> Result<usize> {
        self.q.best_action(state)
    }
}
