// src/policy.rs
//
// Epsilon-greedy action selection.
//
// Two variants behind one trait, selected at construction:
// - EpsilonGreedy: explore uniformly over the legal actions, exploit via
//   argmax over the legal actions.
// - EpsilonGreedyBiased: additionally restricts both explore and exploit
//   to the contiguous half of the action range selected by the sign of an
//   external bias signal (e.g. current pitch), so exploration favours
//   actions plausible for the system's state.
//
// All draws come from a seeded ChaCha8Rng so runs replay deterministically.

use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

use crate::error::{Result, RlError};

/// Per-step inputs to action selection.
#[derive(Debug, Clone, Copy)]
pub struct ActionContext<'a> {
    /// Q-table row for the current state.
    pub q_row: &'a [f64],
    /// Per-action legality mask from the environment.
    pub legal: &'a [bool],
    /// Current exploration rate in [0, 1].
    pub epsilon: f64,
    /// External bias signal; its sign selects the action half for the
    /// biased variant. Ignored by the unbiased variant.
    pub bias_signal: f64,
}

/// Action-selection seam. Implementations must only return actions that
/// are legal (and bias-permitted, for the biased variant).
pub trait Policy {
    fn choose_action(&mut self, ctx: &ActionContext<'_>) -> Result<usize>;
}

fn check_shape(ctx: &ActionContext<'_>) -> Result<()> {
    if ctx.q_row.len() != ctx.legal.len() {
        return Err(RlError::Configuration(format!(
            "q-row has {} actions but legal mask has {}",
            ctx.q_row.len(),
            ctx.legal.len()
        )));
    }
    Ok(())
}

/// Pick from the candidate actions in `range` that the mask permits.
/// Explores with probability `epsilon`, otherwise exploits with the
/// first-index argmax tie-break.
fn choose_in_range(
    rng: &mut ChaCha8Rng,
    ctx: &ActionContext<'_>,
    range: std::ops::Range<usize>,
) -> Result<usize> {
    let candidates: Vec<usize> = range.filter(|&a| ctx.legal[a]).collect();
    if candidates.is_empty() {
        return Err(RlError::Configuration(
            "no legal action available for the current state".into(),
        ));
    }

    let sample: f64 = rng.gen_range(0.0..1.0);
    if sample < ctx.epsilon {
        // Explore: uniform over the permitted candidates.
        let pick = rng.gen_range(0..candidates.len());
        return Ok(candidates[pick]);
    }

    // Exploit: first-index tie-break over the permitted candidates.
    let mut best = candidates[0];
    let mut best_value = f64::NEG_INFINITY;
    for &a in &candidates {
        if ctx.q_row[a] > best_value {
            best_value = ctx.q_row[a];
            best = a;
        }
    }
    Ok(best)
}

/// Plain epsilon-greedy over the legal-action mask.
#[derive(Debug, Clone)]
pub struct EpsilonGreedy {
    rng: ChaCha8Rng,
}

impl EpsilonGreedy {
    pub fn new(seed: u64) -> Self {
        Self {
            rng: ChaCha8Rng::seed_from_u64(seed),
        }
    }
}

impl Policy for EpsilonGreedy {
    fn choose_action(&mut self, ctx: &ActionContext<'_>) -> Result<usize> {
        check_shape(ctx)?;
        choose_in_range(&mut self.rng, ctx, 0..ctx.legal.len())
    }
}

/// Direction-biased epsilon-greedy.
///
/// `split` is the action index where the upper half begins. A non-negative
/// bias signal selects `split..action_count`; a negative signal selects
/// `0..=split` (the neutral action belongs to both halves).
#[derive(Debug, Clone)]
pub struct EpsilonGreedyBiased {
    rng: ChaCha8Rng,
    split: usize,
}

impl EpsilonGreedyBiased {
    pub fn new(seed: u64, split: usize) -> Self {
        Self {
            rng: ChaCha8Rng::seed_from_u64(seed),
            split,
        }
    }
}

impl Policy for EpsilonGreedyBiased {
    fn choose_action(&mut self, ctx: &ActionContext<'_>) -> Result<usize> {
        check_shape(ctx)?;
        let n = ctx.legal.len();
        if self.split >= n {
            return Err(RlError::Configuration(format!(
                "bias split {} outside action range 0..{}",
                self.split, n
            )));
        }
        let range = if ctx.bias_signal >= 0.0 {
            self.split..n
        } else {
            0..self.split + 1
        };
        choose_in_range(&mut self.rng, ctx, range)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ctx<'a>(
        q_row: &'a [f64],
        legal: &'a [bool],
        epsilon: f64,
        bias_signal: f64,
    ) -> ActionContext<'a> {
        ActionContext {
            q_row,
            legal,
            epsilon,
            bias_signal,
        }
    }

    #[test]
    fn pure_exploitation_takes_first_max() {
        let mut policy = EpsilonGreedy::new(7);
        let q = [2.0, 2.0, 1.0];
        let legal = [true, true, true];
        for _ in 0..50 {
            assert_eq!(policy.choose_action(&ctx(&q, &legal, 0.0, 0.0)).unwrap(), 0);
        }
    }

    #[test]
    fn exploitation_skips_illegal_maximum() {
        let mut policy = EpsilonGreedy::new(7);
        let q = [9.0, 1.0, 5.0];
        let legal = [false, true, true];
        assert_eq!(policy.choose_action(&ctx(&q, &legal, 0.0, 0.0)).unwrap(), 2);
    }

    #[test]
    fn exploration_respects_legal_mask() {
        let mut policy = EpsilonGreedy::new(42);
        let q = [0.0, 0.0, 0.0, 0.0];
        let legal = [true, false, true, false];
        for _ in 0..10_000 {
            let a = policy.choose_action(&ctx(&q, &legal, 1.0, 0.0)).unwrap();
            assert!(a == 0 || a == 2, "illegal action {a} chosen");
        }
    }

    #[test]
    fn empty_mask_is_surfaced() {
        let mut policy = EpsilonGreedy::new(1);
        let q = [0.0, 0.0];
        let legal = [false, false];
        assert!(matches!(
            policy.choose_action(&ctx(&q, &legal, 0.5, 0.0)),
            Err(RlError::Configuration(_))
        ));
    }

    #[test]
    fn biased_explore_stays_in_signed_half() {
        // 7 actions, split at 3, like the balancing controller.
        let mut policy = EpsilonGreedyBiased::new(9, 3);
        let q = [0.0; 7];
        let legal = [true; 7];

        for _ in 0..2_000 {
            let a = policy.choose_action(&ctx(&q, &legal, 1.0, 2.5)).unwrap();
            assert!((3..7).contains(&a), "upper-half violation: {a}");
        }
        for _ in 0..2_000 {
            let a = policy.choose_action(&ctx(&q, &legal, 1.0, -2.5)).unwrap();
            assert!((0..4).contains(&a), "lower-half violation: {a}");
        }
    }

    #[test]
    fn biased_exploit_maps_back_to_global_index() {
        let mut policy = EpsilonGreedyBiased::new(3, 3);
        // Global maximum sits in the lower half; upper half's best is 5.
        let q = [9.0, 0.0, 0.0, 1.0, 2.0, 8.0, 3.0];
        let legal = [true; 7];
        assert_eq!(policy.choose_action(&ctx(&q, &legal, 0.0, 1.0)).unwrap(), 5);
        assert_eq!(
            policy.choose_action(&ctx(&q, &legal, 0.0, -1.0)).unwrap(),
            0
        );
    }

    #[test]
    fn biased_empty_intersection_is_surfaced() {
        let mut policy = EpsilonGreedyBiased::new(3, 2);
        let q = [0.0; 4];
        // Upper half {2, 3} entirely illegal.
        let legal = [true, true, false, false];
        assert!(policy.choose_action(&ctx(&q, &legal, 0.0, 1.0)).is_err());
        // Lower half still fine.
        assert!(policy.choose_action(&ctx(&q, &legal, 0.0, -1.0)).is_ok());
    }

    #[test]
    fn mismatched_row_and_mask_is_an_error() {
        let mut policy = EpsilonGreedy::new(0);
        let q = [0.0, 1.0, 2.0];
        let legal = [true, true];
        assert!(policy.choose_action(&ctx(&q, &legal, 0.0, 0.0)).is_err());
    }

    #[test]
    fn same_seed_same_choices() {
        let q = [0.3, 0.1, 0.9, 0.4];
        let legal = [true; 4];
        let mut a = EpsilonGreedy::new(1234);
        let mut b = EpsilonGreedy::new(1234);
        for _ in 0..200 {
            let ca = a.choose_action(&ctx(&q, &legal, 0.5, 0.0)).unwrap();
            let cb = b.choose_action(&ctx(&q, &legal, 0.5, 0.0)).unwrap();
            assert_eq!(ca, cb);
        }
    }
}
