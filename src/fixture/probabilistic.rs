use crate::error::PlannerError;
use crate::goal_network::GoalNetwork;
use crate::simulator::Simulator;
use crate::state::StateKey;
use crate::subgoal::Subgoal;
use petgraph::stable_graph::NodeIndex;
use rand::Rng;
use rand::rngs::SmallRng;
use std::convert::Infallible;

#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
pub struct ProbState {
    pub reached: bool,
}

impl StateKey for ProbState {}

/// The sole subgoal: have reached the target state.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Debug)]
pub struct Reached;

impl Subgoal for Reached {}

#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
pub enum ProbAction {
    Flip,
}

impl crate::choosable::Choosable for ProbAction {}

/// A domain with a single coin-flip action: each application succeeds with
/// probability 1/2, and failure leaves the state unchanged (so the same action
/// stays applicable on the next step).
pub struct ProbabilisticWorld;

impl Simulator for ProbabilisticWorld {
    type State = ProbState;
    type Goal = Reached;
    type Action = ProbAction;
    type Method = Infallible;

    fn initial_state(&self) -> ProbState {
        ProbState { reached: false }
    }

    fn apply(&self, state: &ProbState, action: ProbAction, rng: &mut SmallRng) -> ProbState {
        match action {
            ProbAction::Flip => ProbState {
                reached: state.reached || rng.random_bool(0.5),
            },
        }
    }

    fn applicable_actions(&self, _state: &ProbState) -> Vec<ProbAction> {
        // Stays applicable once reached: a realistic domain does not usually
        // exhaust its own action set exactly at the moment a goal is satisfied,
        // and the outer loop checks for a dead-end before it notices an empty
        // goal network (see `engine::factored::FactoredContext::run`).
        vec![ProbAction::Flip]
    }

    fn applicable_methods(&self, _state: &ProbState) -> Vec<Infallible> {
        vec![]
    }

    fn satisfies(&self, state: &ProbState, _goal: &Reached) -> bool {
        state.reached
    }

    fn relevant(&self, method: Infallible, _gtn: &GoalNetwork<Reached>) -> Vec<NodeIndex> {
        match method {}
    }

    fn ground_method(&self, method: Infallible) -> Result<GoalNetwork<Reached>, PlannerError> {
        match method {}
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;

    #[test]
    fn reached_state_is_never_undone_by_a_further_flip() {
        let world = ProbabilisticWorld;
        let mut rng = SmallRng::seed_from_u64(2);
        let reached = ProbState { reached: true };
        let still = world.apply(&reached, ProbAction::Flip, &mut rng);
        assert!(still.reached);
    }

    #[test]
    fn flip_stays_applicable_once_reached() {
        let world = ProbabilisticWorld;
        let state = ProbState { reached: true };
        assert_eq!(world.applicable_actions(&state), vec![ProbAction::Flip]);
    }
}
