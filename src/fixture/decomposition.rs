use crate::error::PlannerError;
use crate::goal_network::GoalNetwork;
use crate::simulator::Simulator;
use crate::state::StateKey;
use crate::subgoal::Subgoal;
use petgraph::stable_graph::NodeIndex;
use rand::rngs::SmallRng;

/// An abstract goal `G` plus the two concrete subgoals it decomposes into.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Debug)]
pub enum DecompGoal {
    G,
    A,
    B,
}

impl Subgoal for DecompGoal {}

#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
pub struct DecompState {
    pub done_a: bool,
    pub done_b: bool,
}

impl StateKey for DecompState {}

#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
pub enum DecompAction {
    DoA,
    DoB,
}

impl crate::choosable::Choosable for DecompAction {}

#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
pub enum DecompMethod {
    DecomposeG,
}

impl crate::choosable::Choosable for DecompMethod {}

/// A domain whose only subgoal, `G`, is never directly achievable — it must first
/// be decomposed (via `DecomposeG`) into an ordered pair `A` then `B`, each
/// achievable by a dedicated action. `DoB` is only ever applicable once `A` is
/// already done, so the domain itself enforces the ordering `decompose` imposes on
/// the goal network.
pub struct DecompositionWorld;

impl Simulator for DecompositionWorld {
    type State = DecompState;
    type Goal = DecompGoal;
    type Action = DecompAction;
    type Method = DecompMethod;

    fn initial_state(&self) -> DecompState {
        DecompState {
            done_a: false,
            done_b: false,
        }
    }

    fn apply(&self, state: &DecompState, action: DecompAction, _rng: &mut SmallRng) -> DecompState {
        match action {
            DecompAction::DoA => DecompState {
                done_a: true,
                ..*state
            },
            DecompAction::DoB => DecompState {
                done_b: true,
                ..*state
            },
        }
    }

    fn applicable_actions(&self, state: &DecompState) -> Vec<DecompAction> {
        // `DoB` stays applicable (idempotently) once `done_a`, including after
        // `done_b` — a realistic domain does not usually exhaust its own action
        // set exactly at the moment a goal is satisfied, and the outer loop
        // checks for a dead-end before it notices an empty goal network (see
        // `engine::factored::FactoredContext::run`).
        if !state.done_a {
            vec![DecompAction::DoA]
        } else {
            vec![DecompAction::DoB]
        }
    }

    fn applicable_methods(&self, _state: &DecompState) -> Vec<DecompMethod> {
        vec![DecompMethod::DecomposeG]
    }

    fn satisfies(&self, state: &DecompState, goal: &DecompGoal) -> bool {
        match goal {
            DecompGoal::G => false,
            DecompGoal::A => state.done_a,
            DecompGoal::B => state.done_b,
        }
    }

    fn relevant(&self, _method: DecompMethod, gtn: &GoalNetwork<DecompGoal>) -> Vec<NodeIndex> {
        gtn.get_unconstrained()
            .into_iter()
            .filter(|&v| *gtn.goal(v) == DecompGoal::G)
            .collect()
    }

    fn ground_method(&self, _method: DecompMethod) -> Result<GoalNetwork<DecompGoal>, PlannerError> {
        let mut sub = GoalNetwork::new();
        let a = sub.insert(DecompGoal::A);
        let b = sub.insert(DecompGoal::B);
        sub.order(a, b);
        Ok(sub)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn do_b_is_not_applicable_before_do_a() {
        let world = DecompositionWorld;
        let state = DecompState {
            done_a: false,
            done_b: false,
        };
        assert_eq!(world.applicable_actions(&state), vec![DecompAction::DoA]);
    }

    #[test]
    fn decompose_g_splits_into_ordered_a_then_b() {
        let world = DecompositionWorld;
        let sub = world.ground_method(DecompMethod::DecomposeG).unwrap();
        let roots = sub.get_unconstrained();
        assert_eq!(roots.len(), 1);
        assert_eq!(*sub.goal(roots[0]), DecompGoal::A);
    }
}
