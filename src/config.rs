// src/config.rs
//
// Central configuration for the learning core.
//
// These are immutable value structs passed explicitly into the components
// at construction; there is no process-wide mutable state. Defaults mirror
// the tuned constants of the balancing controller this core was extracted
// from.

use crate::error::{Result, RlError};

/// TD-update hyperparameters.
#[derive(Debug, Clone)]
pub struct LearningConfig {
    /// Learning rate applied to the TD error. Fixed for the run.
    pub alpha: f64,
    /// Discount factor on the bootstrapped target.
    pub discount: f64,
    /// Initial exploration rate in [0, 1].
    pub epsilon_initial: f64,
    /// Exploration decay schedule.
    pub decay: DecayConfig,
}

impl Default for LearningConfig {
    fn default() -> Self {
        Self {
            alpha: 0.6,
            discount: 0.6,
            epsilon_initial: 0.3,
            decay: DecayConfig::default(),
        }
    }
}

impl LearningConfig {
    /// Validate hyperparameters. Fatal at startup; never caught and ignored.
    pub fn validate(&self) -> Result<()> {
        if !(self.alpha > 0.0) || !self.alpha.is_finite() {
            return Err(RlError::Configuration(format!(
                "alpha must be a positive finite scalar, got {}",
                self.alpha
            )));
        }
        if !(self.discount > 0.0) || !self.discount.is_finite() {
            return Err(RlError::Configuration(format!(
                "discount must be a positive finite scalar, got {}",
                self.discount
            )));
        }
        if !(0.0..=1.0).contains(&self.epsilon_initial) {
            return Err(RlError::Configuration(format!(
                "epsilon_initial must be in [0, 1], got {}",
                self.epsilon_initial
            )));
        }
        self.decay.validate()
    }
}

/// Win-driven exploration decay schedule.
///
/// Every `cadence` episodes, if cumulative wins exceed
/// `improvement_ratio x` the wins recorded at the previous check, epsilon
/// is reduced by `step` while above `floor`; once at or below `floor`, the
/// next qualifying event snaps it to exactly 0.
///
/// The very first check compares against a zero baseline and therefore
/// fires whenever any win has occurred.
#[derive(Debug, Clone)]
pub struct DecayConfig {
    /// Episode-count cadence between decay checks.
    pub cadence: u64,
    /// Amount subtracted from epsilon per qualifying check.
    pub step: f64,
    /// Threshold below which epsilon snaps to zero instead of decaying.
    pub floor: f64,
    /// Required ratio of current wins to previous-check wins.
    pub improvement_ratio: f64,
}

impl Default for DecayConfig {
    fn default() -> Self {
        Self {
            cadence: 10,
            step: 0.05,
            floor: 0.06,
            improvement_ratio: 1.75,
        }
    }
}

impl DecayConfig {
    pub fn validate(&self) -> Result<()> {
        if self.cadence == 0 {
            return Err(RlError::Configuration(
                "decay cadence must be at least 1 episode".into(),
            ));
        }
        if !(self.step > 0.0) || !self.step.is_finite() {
            return Err(RlError::Configuration(format!(
                "decay step must be positive, got {}",
                self.step
            )));
        }
        if !(self.floor >= 0.0) || !self.floor.is_finite() {
            return Err(RlError::Configuration(format!(
                "decay floor must be non-negative, got {}",
                self.floor
            )));
        }
        if !(self.improvement_ratio > 0.0) || !self.improvement_ratio.is_finite() {
            return Err(RlError::Configuration(format!(
                "improvement ratio must be positive, got {}",
                self.improvement_ratio
            )));
        }
        Ok(())
    }
}

/// Episode-level limits and terminal filtering.
#[derive(Debug, Clone)]
pub struct EpisodeLimits {
    /// Maximum episodes for a training run.
    pub max_episodes: u64,
    /// Hard cap on time steps within one episode (0 = unlimited).
    pub max_steps_per_episode: u64,
    /// Number of consecutive steps a loss condition must persist before the
    /// episode terminates (filters transient spikes). 1 = immediate.
    pub loss_settle_steps: u64,
}

impl Default for EpisodeLimits {
    fn default() -> Self {
        Self {
            max_episodes: 150,
            max_steps_per_episode: 0,
            loss_settle_steps: 1,
        }
    }
}

impl EpisodeLimits {
    pub fn validate(&self) -> Result<()> {
        if self.max_episodes == 0 {
            return Err(RlError::Configuration(
                "max_episodes must be at least 1".into(),
            ));
        }
        if self.loss_settle_steps == 0 {
            return Err(RlError::Configuration(
                "loss_settle_steps must be at least 1".into(),
            ));
        }
        Ok(())
    }
}
