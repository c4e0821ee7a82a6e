// src/grid_world.rs
//
// Rectangular grid-world environment for training and tests.
//
// States are cells (`row * width + col`), four movement actions, legality
// masks at the edges, optional slip probability for stochastic
// transitions, and pit/goal cells with explicit terminal outcomes.

use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

use crate::env::Environment;
use crate::error::{Result, RlError};
use crate::reward::{Outcome, StepReward};

/// Movement actions, in mask order.
pub const ACTION_UP: usize = 0;
pub const ACTION_DOWN: usize = 1;
pub const ACTION_LEFT: usize = 2;
pub const ACTION_RIGHT: usize = 3;
pub const GRID_ACTIONS: usize = 4;

#[derive(Debug, Clone)]
pub struct GridWorld {
    width: usize,
    height: usize,
    start: usize,
    goal: usize,
    pits: Vec<usize>,
    step_reward: f64,
    win_reward: f64,
    loss_reward: f64,
    /// Probability of slipping to a uniformly random legal move instead of
    /// the commanded one.
    slip_prob: f64,
    rng: ChaCha8Rng,
}

impl GridWorld {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        width: usize,
        height: usize,
        start: usize,
        goal: usize,
        pits: Vec<usize>,
        step_reward: f64,
        win_reward: f64,
        loss_reward: f64,
        slip_prob: f64,
        seed: u64,
    ) -> Result<Self> {
        let cells = width * height;
        if cells == 0 {
            return Err(RlError::Configuration(
                "grid dimensions must be non-zero".into(),
            ));
        }
        if start >= cells || goal >= cells {
            return Err(RlError::Configuration(format!(
                "start {} / goal {} outside {} cells",
                start, goal, cells
            )));
        }
        if pits.iter().any(|&p| p >= cells) {
            return Err(RlError::Configuration("pit cell outside the grid".into()));
        }
        if !(0.0..=1.0).contains(&slip_prob) {
            return Err(RlError::Configuration(format!(
                "slip probability must be in [0, 1], got {}",
                slip_prob
            )));
        }
        Ok(Self {
            width,
            height,
            start,
            goal,
            pits,
            step_reward,
            win_reward,
            loss_reward,
            slip_prob,
            rng: ChaCha8Rng::seed_from_u64(seed),
        })
    }

    /// The 4x4 episodic grid: start top-left, goal bottom-right, two pits
    /// on the way.
    pub fn four_by_four(seed: u64) -> Self {
        GridWorld::new(4, 4, 0, 15, vec![5, 7, 11], 0.0, 10.0, -10.0, 0.0, seed)
            .expect("static grid config is valid")
    }

    /// Classic cliff walk: 4 rows x 12 columns, start bottom-left, goal
    /// bottom-right, the cells between them are the cliff. Step reward -1,
    /// falling costs -100, reaching the goal ends the episode at 0.
    ///
    /// On-policy and off-policy learners converge to different routes
    /// here, which is exactly what the convergence tests rely on.
    pub fn cliff_walk(seed: u64) -> Self {
        let width = 12;
        let height = 4;
        let start = (height - 1) * width; // bottom-left
        let goal = height * width - 1; // bottom-right
        let pits: Vec<usize> = (start + 1..goal).collect(); // bottom row interior
        GridWorld::new(width, height, start, goal, pits, -1.0, 0.0, -100.0, 0.0, seed)
            .expect("static grid config is valid")
    }

    fn is_pit(&self, state: usize) -> bool {
        self.pits.contains(&state)
    }

    /// Destination of a move, or `None` when it would leave the grid.
    fn destination(&self, state: usize, action: usize) -> Option<usize> {
        let row = state / self.width;
        let col = state % self.width;
        match action {
            ACTION_UP => (row > 0).then(|| state - self.width),
            ACTION_DOWN => (row + 1 < self.height).then(|| state + self.width),
            ACTION_LEFT => (col > 0).then(|| state - 1),
            ACTION_RIGHT => (col + 1 < self.width).then(|| state + 1),
            _ => None,
        }
    }
}

impl Environment for GridWorld {
    fn action_count(&self) -> usize {
        GRID_ACTIONS
    }

    fn state_count(&self) -> usize {
        self.width * self.height
    }

    fn initial_state(&self) -> usize {
        self.start
    }

    fn legal_actions(&self, state: usize) -> Vec<bool> {
        (0..GRID_ACTIONS)
            .map(|a| self.destination(state, a).is_some())
            .collect()
    }

    fn next_state(&mut self, action: usize, state: usize, legal: &[bool]) -> usize {
        let chosen = if self.slip_prob > 0.0 && self.rng.gen_range(0.0..1.0) < self.slip_prob {
            let legal_moves: Vec<usize> = (0..GRID_ACTIONS).filter(|&a| legal[a]).collect();
            if legal_moves.is_empty() {
                return state;
            }
            legal_moves[self.rng.gen_range(0..legal_moves.len())]
        } else {
            action
        };
        self.destination(state, chosen).unwrap_or(state)
    }

    fn reward(&self, state: usize) -> StepReward {
        if state == self.goal {
            StepReward::terminal(self.win_reward, Outcome::Win)
        } else if self.is_pit(state) {
            StepReward::terminal(self.loss_reward, Outcome::Loss)
        } else {
            StepReward::shaped(self.step_reward)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn corner_masks_forbid_leaving_the_grid() {
        let env = GridWorld::four_by_four(0);
        // Top-left corner: no up, no left.
        assert_eq!(env.legal_actions(0), vec![false, true, false, true]);
        // Bottom-right corner: no down, no right.
        assert_eq!(env.legal_actions(15), vec![true, false, true, false]);
        // Interior cell: everything legal.
        assert_eq!(env.legal_actions(6), vec![true, true, true, true]);
    }

    #[test]
    fn deterministic_moves_without_slip() {
        let mut env = GridWorld::four_by_four(0);
        let legal = env.legal_actions(6);
        assert_eq!(env.next_state(ACTION_UP, 6, &legal), 2);
        assert_eq!(env.next_state(ACTION_DOWN, 6, &legal), 10);
        assert_eq!(env.next_state(ACTION_LEFT, 6, &legal), 5);
        assert_eq!(env.next_state(ACTION_RIGHT, 6, &legal), 7);
    }

    #[test]
    fn rewards_carry_explicit_outcomes() {
        let env = GridWorld::four_by_four(0);
        assert_eq!(env.reward(15).terminal, Some(Outcome::Win));
        assert_eq!(env.reward(5).terminal, Some(Outcome::Loss));
        assert_eq!(env.reward(1).terminal, None);
    }

    #[test]
    fn cliff_walk_layout() {
        let env = GridWorld::cliff_walk(0);
        assert_eq!(env.state_count(), 48);
        assert_eq!(env.initial_state(), 36);
        assert_eq!(env.reward(47).terminal, Some(Outcome::Win));
        for cliff_cell in 37..47 {
            assert_eq!(env.reward(cliff_cell).terminal, Some(Outcome::Loss));
        }
        assert_eq!(env.reward(24).terminal, None);
    }

    #[test]
    fn slip_keeps_transitions_on_grid() {
        let mut env =
            GridWorld::new(4, 4, 0, 15, vec![], 0.0, 1.0, -1.0, 1.0, 99).unwrap();
        for state in 0..16 {
            let legal = env.legal_actions(state);
            for _ in 0..100 {
                let next = env.next_state(ACTION_UP, state, &legal);
                assert!(next < 16);
            }
        }
    }
}
