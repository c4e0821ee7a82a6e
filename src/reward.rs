// src/reward.rs
//
// Reward computation and the explicit terminal signal.
//
// The environment returns a `StepReward` carrying the numeric reward and
// an optional terminal outcome. Terminality is a typed field, not a
// sentinel magnitude, so shaped rewards and terminal rewards can never
// collide.

use serde::{Deserialize, Serialize};

/// Terminal outcome of an episode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Outcome {
    Win,
    Loss,
}

/// Reward for one step, with an explicit terminal flag.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct StepReward {
    /// Numeric reward fed to the TD update.
    pub value: f64,
    /// Set when the step reaches a terminal state.
    pub terminal: Option<Outcome>,
}

impl StepReward {
    /// A shaped (non-terminal) reward.
    pub fn shaped(value: f64) -> Self {
        Self {
            value,
            terminal: None,
        }
    }

    /// A terminal reward with its outcome.
    pub fn terminal(value: f64, outcome: Outcome) -> Self {
        Self {
            value,
            terminal: Some(outcome),
        }
    }

    pub fn is_terminal(&self) -> bool {
        self.terminal.is_some()
    }
}

/// Shaped tracking reward for a continuous regulator.
///
/// `-(position - reference)^2 + s * derivative^2`, where the sign `s` of
/// the derivative term flips to -1 when the motion is carrying the system
/// away from the reference (derivative and tracking error pointing the
/// same way out), so corrective motion is rewarded and divergent motion is
/// penalized twice over.
#[derive(Debug, Clone, Copy)]
pub struct ShapedReward {
    /// Reference value the controller regulates toward.
    pub reference: f64,
}

impl ShapedReward {
    pub fn new(reference: f64) -> Self {
        Self { reference }
    }

    pub fn compute(&self, position: f64, derivative: f64) -> f64 {
        let tracking_err_sq = (position - self.reference).powi(2);
        let mut derivative_sq = derivative.powi(2);
        let moving_away = (derivative < 0.0 && position < self.reference)
            || (derivative > 0.0 && position > self.reference);
        if moving_away {
            derivative_sq = -derivative_sq;
        }
        -tracking_err_sq + derivative_sq
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn corrective_motion_is_rewarded() {
        let r = ShapedReward::new(0.0);
        // Below reference, moving up: derivative term positive.
        let toward = r.compute(-2.0, 1.0);
        // Below reference, moving further down: derivative term negative.
        let away = r.compute(-2.0, -1.0);
        assert_eq!(toward, -4.0 + 1.0);
        assert_eq!(away, -4.0 - 1.0);
        assert!(toward > away);
    }

    #[test]
    fn symmetric_above_reference() {
        let r = ShapedReward::new(-1.0);
        // Above reference, moving up = away.
        assert_eq!(r.compute(1.0, 2.0), -4.0 - 4.0);
        // Above reference, moving down = toward.
        assert_eq!(r.compute(1.0, -2.0), -4.0 + 4.0);
    }

    #[test]
    fn at_reference_with_no_motion_is_zero() {
        let r = ShapedReward::new(0.5);
        assert_eq!(r.compute(0.5, 0.0), 0.0);
    }

    #[test]
    fn terminal_flag_is_explicit() {
        let shaped = StepReward::shaped(-3.0);
        assert!(!shaped.is_terminal());
        let won = StepReward::terminal(10.0, Outcome::Win);
        assert_eq!(won.terminal, Some(Outcome::Win));
    }
}
