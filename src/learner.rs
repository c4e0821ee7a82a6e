// src/learner.rs
//
// Temporal-difference update against the Q-table.
//
// Supports both update modes per invocation:
// - On-policy (SARSA): bootstrap from the next action the policy actually
//   chose, so the update stays on the sampled trajectory.
// - Off-policy (Q-learning): bootstrap from the greedy next action
//   (first-index tie-break), regardless of what will be taken.
//
// Every update returns a diagnostics record; those fields feed telemetry
// only and never control decisions.

use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::qtable::{argmax, QTable};

/// Which TD target to bootstrap from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TdMode {
    /// On-policy: the next action was already selected by the policy
    /// before this update.
    Sarsa { next_action: usize },
    /// Off-policy: greedy over the next state's row.
    QLearning,
}

/// Diagnostics for one applied update.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TdUpdate {
    /// Bootstrapped target `reward + discount * Q(next, bootstrap)`.
    pub td_target: f64,
    /// `td_target - Q(current, action)` before the write.
    pub td_error: f64,
    /// `alpha * td_error`, the delta actually written.
    pub applied_delta: f64,
    /// Value of `Q(current, action)` after the write.
    pub new_value: f64,
    /// Next-state action the target bootstrapped from.
    pub bootstrap_action: usize,
}

/// Applies TD updates with fixed hyperparameters.
#[derive(Debug, Clone, Copy)]
pub struct Learner {
    alpha: f64,
    discount: f64,
}

impl Learner {
    pub fn new(alpha: f64, discount: f64) -> Self {
        Self { alpha, discount }
    }

    pub fn alpha(&self) -> f64 {
        self.alpha
    }

    pub fn discount(&self) -> f64 {
        self.discount
    }

    /// Apply one TD update to `q` and return its diagnostics.
    pub fn update(
        &self,
        q: &mut QTable,
        current_state: usize,
        action: usize,
        next_state: usize,
        reward: f64,
        mode: TdMode,
    ) -> Result<TdUpdate> {
        let bootstrap_action = match mode {
            TdMode::Sarsa { next_action } => next_action,
            TdMode::QLearning => argmax(q.row(next_state)?),
        };

        let bootstrap_value = q.get(next_state, bootstrap_action)?;
        let td_target = reward + self.discount * bootstrap_value;
        let td_error = td_target - q.get(current_state, action)?;
        let applied_delta = self.alpha * td_error;
        let new_value = q.add(current_state, action, applied_delta)?;

        Ok(TdUpdate {
            td_target,
            td_error,
            applied_delta,
            new_value,
            bootstrap_action,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn off_policy_update_matches_hand_computation() {
        // Q(s,a)=0, Q(s',argmax)=5, reward=10, alpha=0.5, discount=0.3
        // => Q(s,a) = 0.5 * (10 + 0.3*5 - 0) = 5.75
        let mut q = QTable::new(2, 2).unwrap();
        q.set(1, 0, 5.0).unwrap();
        q.set(1, 1, 2.0).unwrap();

        let learner = Learner::new(0.5, 0.3);
        let upd = learner
            .update(&mut q, 0, 0, 1, 10.0, TdMode::QLearning)
            .unwrap();

        assert_eq!(upd.bootstrap_action, 0);
        assert!((upd.td_target - 11.5).abs() < 1e-12);
        assert!((upd.td_error - 11.5).abs() < 1e-12);
        assert!((upd.applied_delta - 5.75).abs() < 1e-12);
        assert!((q.get(0, 0).unwrap() - 5.75).abs() < 1e-12);
    }

    #[test]
    fn on_policy_bootstraps_from_chosen_action() {
        let mut q = QTable::new(2, 2).unwrap();
        q.set(1, 0, 5.0).unwrap(); // greedy choice
        q.set(1, 1, 2.0).unwrap(); // the action actually chosen

        let learner = Learner::new(0.5, 0.3);
        let upd = learner
            .update(&mut q, 0, 0, 1, 10.0, TdMode::Sarsa { next_action: 1 })
            .unwrap();

        // target = 10 + 0.3*2 = 10.6, distinct from the Q-learning target.
        assert_eq!(upd.bootstrap_action, 1);
        assert!((upd.td_target - 10.6).abs() < 1e-12);
        assert!((q.get(0, 0).unwrap() - 5.3).abs() < 1e-12);
    }

    #[test]
    fn q_learning_tie_break_is_first_index() {
        let mut q = QTable::new(2, 3).unwrap();
        q.set(1, 0, 4.0).unwrap();
        q.set(1, 1, 4.0).unwrap();
        q.set(1, 2, 1.0).unwrap();

        let learner = Learner::new(1.0, 1.0);
        let upd = learner
            .update(&mut q, 0, 2, 1, 0.0, TdMode::QLearning)
            .unwrap();
        assert_eq!(upd.bootstrap_action, 0);
    }

    #[test]
    fn out_of_range_indices_propagate() {
        let mut q = QTable::new(2, 2).unwrap();
        let learner = Learner::new(0.5, 0.5);
        assert!(learner
            .update(&mut q, 5, 0, 1, 0.0, TdMode::QLearning)
            .is_err());
        assert!(learner
            .update(&mut q, 0, 0, 1, 0.0, TdMode::Sarsa { next_action: 9 })
            .is_err());
    }
}
