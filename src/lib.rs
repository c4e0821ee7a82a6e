// src/lib.rs
//
// Tabular reinforcement-learning control core.
//
// The crate factors a discrete control learner into small composable
// pieces: a boundary-table discretizer that maps continuous observations
// to state indices, a fixed-window signal smoother, a dense Q-table with
// JSON persistence, epsilon-greedy action selection (plain and
// direction-biased), a TD learner supporting SARSA and Q-learning
// targets, and an episode controller with win-driven exploration decay.
// The `runner` module ties them into a deterministic training loop over
// any `Environment`, and `grid_world` supplies reference environments
// for study and testing.

pub mod config;
pub mod discretizer;
pub mod env;
pub mod episode;
pub mod error;
pub mod grid_world;
pub mod learner;
pub mod pipeline;
pub mod policy;
pub mod qtable;
pub mod reward;
pub mod runner;
pub mod smoother;
pub mod snapshot;
pub mod telemetry;

pub use config::{DecayConfig, EpisodeLimits, LearningConfig};
pub use discretizer::{Dimension, Discretizer};
pub use env::Environment;
pub use episode::{EpisodeController, EpisodeCounters, EpsilonSchedule, RunPhase};
pub use error::{Result, RlError};
pub use grid_world::GridWorld;
pub use learner::{Learner, TdMode, TdUpdate};
pub use pipeline::{EncodedObservation, StatePipeline};
pub use policy::{ActionContext, EpsilonGreedy, EpsilonGreedyBiased, Policy};
pub use qtable::QTable;
pub use reward::{Outcome, ShapedReward, StepReward};
pub use runner::{Algorithm, EpisodeSummary, Trainer, TrainerConfig};
pub use smoother::RunningAverage;
pub use snapshot::QTableSnapshot;
pub use telemetry::Telemetry;
