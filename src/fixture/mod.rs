//! Minimal in-crate [`crate::Simulator`] implementations used only by this crate's
//! own tests: small, self-contained domains exercising one facet of the engine each.

pub mod chain;
pub mod decomposition;
pub mod probabilistic;

/// `Infallible` stands in for "this domain has no methods" — it already satisfies
/// every [`crate::Choosable`] bound, and an empty match on it is exhaustive.
impl crate::choosable::Choosable for std::convert::Infallible {}

#[cfg(test)]
mod tests {
    use super::chain::AtPosition;
    use super::chain::ChainWorld;
    use super::decomposition::DecompGoal;
    use super::decomposition::DecompositionWorld;
    use super::probabilistic::ProbabilisticWorld;
    use super::probabilistic::Reached;
    use crate::config::Config;
    use crate::engine::factored::FactoredContext;
    use crate::engine::unfactored::UnfactoredContext;
    use crate::goal_network::GoalNetwork;
    use crate::outcome::Outcome;

    #[test]
    fn trivially_satisfied_goal_succeeds_with_no_rollouts() {
        let world = ChainWorld { max_position: 10 };
        let mut gtn = GoalNetwork::new();
        gtn.insert(AtPosition(0));
        let cfg = Config {
            seed: Some(0),
            ..Default::default()
        };
        let result = FactoredContext::new(world, cfg).run(gtn).unwrap();
        assert_eq!(result.outcome, Outcome::Success);
        assert_eq!(result.cost, 0);
        assert_eq!(result.num_nodes, 1);
    }

    #[test]
    fn one_step_deterministic_plan_succeeds() {
        let world = ChainWorld { max_position: 10 };
        let mut gtn = GoalNetwork::new();
        gtn.insert(AtPosition(1));
        let cfg = Config {
            n_rollouts: 10,
            horizon: 5,
            budget: 10,
            seed: Some(0),
            ..Default::default()
        };
        let result = FactoredContext::new(world, cfg).run(gtn).unwrap();
        assert_eq!(result.outcome, Outcome::Success);
        assert_eq!(result.cost, 1);
        assert_eq!(result.num_nodes, 2);
    }

    #[test]
    fn method_decomposition_reaches_both_subgoals() {
        let world = DecompositionWorld;
        let mut gtn = GoalNetwork::new();
        gtn.insert(DecompGoal::G);
        let cfg = Config {
            n_rollouts: 50,
            horizon: 10,
            budget: 10,
            seed: Some(0),
            ..Default::default()
        };
        let result = FactoredContext::new(world, cfg).run(gtn).unwrap();
        assert_eq!(result.outcome, Outcome::Success);
        assert_eq!(result.cost, 2);
        assert!(result.num_nodes >= 3);
    }

    #[test]
    fn probabilistic_action_succeeds_within_generous_budget() {
        let cfg = Config {
            n_rollouts: 20,
            horizon: 5,
            budget: 20,
            seed: Some(0),
            ..Default::default()
        };
        let mut failures = 0;
        for seed in 0..100u64 {
            let mut gtn = GoalNetwork::new();
            gtn.insert(Reached);
            let mut run_cfg = cfg.clone();
            run_cfg.seed = Some(seed);
            let result = FactoredContext::new(ProbabilisticWorld, run_cfg).run(gtn).unwrap();
            if result.outcome != Outcome::Success {
                failures += 1;
            }
        }
        assert!(failures < 5, "{failures} of 100 seeded runs failed to reach the goal");
    }

    #[test]
    fn budget_exhaustion_reports_failure_budget() {
        let world = ChainWorld { max_position: 10 };
        let mut gtn = GoalNetwork::new();
        gtn.insert(AtPosition(5));
        let cfg = Config {
            budget: 2,
            seed: Some(0),
            ..Default::default()
        };
        let result = FactoredContext::new(world, cfg).run(gtn).unwrap();
        assert_eq!(result.outcome, Outcome::FailureBudget);
        assert_eq!(result.cost, 2);
    }

    #[test]
    fn factored_and_unfactored_agree_on_trivial_chain() {
        let mut factored_gtn = GoalNetwork::new();
        factored_gtn.insert(AtPosition(1));
        let mut unfactored_gtn = GoalNetwork::new();
        unfactored_gtn.insert(AtPosition(1));
        let cfg = Config {
            n_rollouts: 10,
            horizon: 5,
            budget: 10,
            seed: Some(0),
            ..Default::default()
        };

        let factored = FactoredContext::new(
            ChainWorld { max_position: 10 },
            cfg.clone(),
        )
        .run(factored_gtn)
        .unwrap();
        let unfactored = UnfactoredContext::new(
            ChainWorld { max_position: 10 },
            cfg,
        )
        .run(unfactored_gtn)
        .unwrap();

        assert_eq!(factored.outcome, Outcome::Success);
        assert_eq!(unfactored.outcome, Outcome::Success);
        assert_eq!(factored.cost, unfactored.cost);
        assert!(unfactored.num_nodes >= factored.num_nodes);
    }
}
