use rand::Rng;
use rand::rngs::SmallRng;

/// Which selection rule a decision point uses.
///
/// Modeled as an enum rather than a trait object so the hot path (one selection per
/// recursion frame, many times per rollout) stays inlinable — the same tradeoff the
/// teacher crate makes for its policy/regret schedules.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Policy {
    /// Exploration-exploitation selection used while descending an expanded node.
    Ucb {
        exploration_const: f64,
        normalize: bool,
    },
    /// Greedy extraction by accumulated value, no exploration term. Used to read
    /// off the planner's chosen action/method at the top of `plan`.
    Max,
    /// Uniform random selection. Used for unexpanded leaves and inside rollouts.
    Default,
    /// Greedy extraction by visit count rather than value. Carried over from the
    /// original planner as an alternative top-level extraction rule; `plan` does
    /// not use it unless explicitly configured to.
    Robust,
}

/// Returns the index attaining the maximum score, chosen uniformly at random among
/// ties.
///
/// # Panics
///
/// Panics if `scores` is empty.
pub fn argmax_tie_break(rng: &mut SmallRng, scores: &[f64]) -> usize {
    debug_assert!(!scores.is_empty());
    let best = scores.iter().copied().fold(f64::NEG_INFINITY, f64::max);
    let winners: Vec<usize> = scores
        .iter()
        .enumerate()
        .filter(|(_, &s)| s == best)
        .map(|(i, _)| i)
        .collect();
    winners[rng.random_range(0..winners.len())]
}

/// Picks one index uniformly at random out of `len` candidates.
///
/// # Panics
///
/// Panics if `len` is zero.
pub fn uniform_index(rng: &mut SmallRng, len: usize) -> usize {
    debug_assert!(len > 0);
    rng.random_range(0..len)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;

    #[test]
    fn argmax_picks_unique_max() {
        let mut rng = SmallRng::seed_from_u64(0);
        assert_eq!(argmax_tie_break(&mut rng, &[1.0, 5.0, 2.0]), 1);
    }

    #[test]
    fn argmax_breaks_ties_among_winners_only() {
        let mut rng = SmallRng::seed_from_u64(1);
        for _ in 0..50 {
            let i = argmax_tie_break(&mut rng, &[3.0, 1.0, 3.0]);
            assert!(i == 0 || i == 2);
        }
    }
}
