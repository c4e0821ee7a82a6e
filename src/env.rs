// src/env.rs
//
// The Environment collaborator interface.
//
// The learning core depends on its environment only through this narrow
// contract: legal actions for a state, the (possibly stochastic) next
// state for an action, and the reward with its explicit terminal flag.
// Environment-level stochastic failures are just state, never core errors.

use crate::reward::StepReward;

pub trait Environment {
    /// Number of discrete actions. Must equal the Q-table column count.
    fn action_count(&self) -> usize;

    /// Number of discrete states. Must equal the Q-table row count.
    fn state_count(&self) -> usize;

    /// State an episode starts from.
    fn initial_state(&self) -> usize;

    /// Per-action legality mask for `state` (length `action_count`).
    fn legal_actions(&self, state: usize) -> Vec<bool>;

    /// Execute `action` from `state` and return the next state. May be
    /// stochastic; `legal` is the mask previously returned for `state`.
    fn next_state(&mut self, action: usize, state: usize, legal: &[bool]) -> usize;

    /// Reward for arriving in `state`, with the terminal outcome if this
    /// state ends the episode.
    fn reward(&self, state: usize) -> StepReward;
}
