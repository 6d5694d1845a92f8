/// Hyperparameters for a single planner run.
///
/// Generic over the simulator's `State` type only because of the two heuristic
/// hooks, which take a state reference. A plain `#[derive(Default)]` doesn't apply
/// here because function pointers aren't derivable, so `Default` is hand-written to
/// mirror the defaults below.
pub struct Config<S> {
    /// Rollouts performed per outer-loop decision.
    pub n_rollouts: usize,
    /// Maximum recursion depth within a single `simulate`/`rollout` call.
    pub horizon: usize,
    /// Maximum real actions applied before the run reports `FAILURE_BUDGET`.
    pub budget: u32,
    /// UCB exploration constant `c`.
    pub exploration_const: f64,
    /// Multiply `exploration_const` by the node's current max-Q before use.
    pub normalize_exploration_const: bool,
    /// Reserved initial visit count. Not read by `update`; carried for forward
    /// compatibility with a virtual-prior extension.
    pub n_init: f64,
    /// `λ` in the GUBS utility `exp(λ · cost)`. Negative values favor shorter plans.
    pub risk_factor: f64,
    /// Additive utility bonus applied on reaching a goal during backup.
    pub goal_utility: f64,
    /// Reserved heuristic hook over state utility. Not read by `update`; carried
    /// alongside `q_init` for a future informed-prior extension.
    pub h_util: fn(&S) -> f64,
    /// Reserved heuristic hook over probability-to-goal. Not read by `update`.
    pub h_ptg: fn(&S) -> f64,
    /// Fixed RNG seed. `None` seeds from system entropy.
    pub seed: Option<u64>,
    /// Emit a human-readable trace of each outer-loop decision to stdout.
    pub show_progress: bool,
}

fn inert_heuristic<S>(_state: &S) -> f64 {
    1.0
}

impl<S> Config<S> {
    pub fn utility(&self, cost: f64) -> f64 {
        (self.risk_factor * cost).exp()
    }
}

impl<S> Clone for Config<S> {
    fn clone(&self) -> Self {
        Self {
            n_rollouts: self.n_rollouts,
            horizon: self.horizon,
            budget: self.budget,
            exploration_const: self.exploration_const,
            normalize_exploration_const: self.normalize_exploration_const,
            n_init: self.n_init,
            risk_factor: self.risk_factor,
            goal_utility: self.goal_utility,
            h_util: self.h_util,
            h_ptg: self.h_ptg,
            seed: self.seed,
            show_progress: self.show_progress,
        }
    }
}

impl<S> std::fmt::Debug for Config<S> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Config")
            .field("n_rollouts", &self.n_rollouts)
            .field("horizon", &self.horizon)
            .field("budget", &self.budget)
            .field("exploration_const", &self.exploration_const)
            .field("normalize_exploration_const", &self.normalize_exploration_const)
            .field("n_init", &self.n_init)
            .field("risk_factor", &self.risk_factor)
            .field("goal_utility", &self.goal_utility)
            .field("seed", &self.seed)
            .field("show_progress", &self.show_progress)
            .finish_non_exhaustive()
    }
}

impl<S> Default for Config<S> {
    fn default() -> Self {
        Self {
            n_rollouts: 100,
            horizon: 20,
            budget: 100,
            exploration_const: std::f64::consts::SQRT_2,
            normalize_exploration_const: true,
            n_init: 0.0,
            risk_factor: -0.1,
            goal_utility: 1.0,
            h_util: inert_heuristic,
            h_ptg: inert_heuristic,
            seed: None,
            show_progress: false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn utility_is_one_at_zero_cost() {
        let cfg: Config<()> = Config::default();
        assert_eq!(cfg.utility(0.0), 1.0);
    }

    #[test]
    fn utility_decays_with_negative_risk_factor() {
        let cfg: Config<()> = Config::default();
        assert!(cfg.utility(10.0) < cfg.utility(1.0));
    }
}
