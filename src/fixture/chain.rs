use crate::error::PlannerError;
use crate::goal_network::GoalNetwork;
use crate::simulator::Simulator;
use crate::state::StateKey;
use crate::subgoal::Subgoal;
use petgraph::stable_graph::NodeIndex;
use rand::rngs::SmallRng;
use std::convert::Infallible;

/// A position on a one-directional chain of integer positions, advanced one step
/// at a time by [`ChainAction::Step`].
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
pub struct ChainState {
    pub position: u32,
}

impl StateKey for ChainState {}

/// The subgoal "be at this position".
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Debug)]
pub struct AtPosition(pub u32);

impl Subgoal for AtPosition {}

#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
pub enum ChainAction {
    Step,
}

impl crate::choosable::Choosable for ChainAction {}

/// A deterministic domain with no methods: a single `Step` action advances the
/// position by one, up to `max_position`.
pub struct ChainWorld {
    pub max_position: u32,
}

impl Simulator for ChainWorld {
    type State = ChainState;
    type Goal = AtPosition;
    type Action = ChainAction;
    type Method = Infallible;

    fn initial_state(&self) -> ChainState {
        ChainState { position: 0 }
    }

    fn apply(&self, state: &ChainState, action: ChainAction, _rng: &mut SmallRng) -> ChainState {
        match action {
            ChainAction::Step => ChainState {
                position: state.position + 1,
            },
        }
    }

    fn applicable_actions(&self, state: &ChainState) -> Vec<ChainAction> {
        if state.position < self.max_position {
            vec![ChainAction::Step]
        } else {
            vec![]
        }
    }

    fn applicable_methods(&self, _state: &ChainState) -> Vec<Infallible> {
        vec![]
    }

    fn satisfies(&self, state: &ChainState, goal: &AtPosition) -> bool {
        state.position == goal.0
    }

    fn relevant(&self, method: Infallible, _gtn: &GoalNetwork<AtPosition>) -> Vec<NodeIndex> {
        match method {}
    }

    fn ground_method(&self, method: Infallible) -> Result<GoalNetwork<AtPosition>, PlannerError> {
        match method {}
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;

    #[test]
    fn step_advances_position_by_one() {
        let world = ChainWorld { max_position: 10 };
        let mut rng = rand::rngs::SmallRng::seed_from_u64(0);
        let next = world.apply(&ChainState { position: 0 }, ChainAction::Step, &mut rng);
        assert_eq!(next.position, 1);
    }

    #[test]
    fn no_actions_applicable_past_max_position() {
        let world = ChainWorld { max_position: 1 };
        let state = ChainState { position: 1 };
        assert!(world.applicable_actions(&state).is_empty());
    }
}
