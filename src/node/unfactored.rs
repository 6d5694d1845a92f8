use crate::choice::Choice;
use crate::choosable::Choosable;
use crate::goal_network::GoalNetwork;
use crate::node::eager_release;
use crate::policy::Policy;
use crate::policy::argmax_tie_break;
use crate::policy::uniform_index;
use crate::simulator::Simulator;
use crate::state::StateKey;
use crate::subgoal::Subgoal;
use rand::rngs::SmallRng;
use std::cell::Cell;
use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;

/// Local canonical form of a goal network, used as (part of) the unfactored memo
/// key: each vertex's content paired with the sorted contents of its direct
/// successors, the whole multiset sorted. Collapses two networks that differ only
/// in decomposition history but agree on shape and content.
pub type GtnKey<G> = Vec<(G, Vec<G>)>;

/// A scalar rollout summary: accumulated cost and whether the goal was reached,
/// from the vantage of the single node that produced it.
#[derive(Debug, Clone, Copy)]
pub struct RolloutResult {
    pub cost: f64,
    pub reached: bool,
}

impl RolloutResult {
    pub fn new(cost: f64, reached: bool) -> Self {
        Self { cost, reached }
    }

    pub fn increment(&mut self, delta: f64) {
        self.cost += delta;
    }
}

/// A search-tree node in the unfactored UCT variant: keyed by `(state, goal
/// network)`. Q, N and a single visit count are indexed by choice alone — the node
/// already carries the full progress state in its key, so there is no need to
/// factor statistics per subgoal, at the cost of a key space that grows with every
/// distinct network shape reachable from a state.
pub struct UnfactoredNode<S: StateKey, G: Subgoal, A: Choosable, M: Choosable> {
    gtn: GoalNetwork<G>,
    expanded: Cell<bool>,
    applicable_actions: RefCell<Option<Vec<A>>>,
    applicable_methods: RefCell<Option<Vec<M>>>,
    stats: RefCell<HashMap<Choice<A, M>, (f64, u64)>>,
    visits: Cell<u64>,
    _state: std::marker::PhantomData<S>,
}

impl<S: StateKey, G: Subgoal, A: Choosable, M: Choosable> UnfactoredNode<S, G, A, M> {
    fn new(gtn: GoalNetwork<G>) -> Self {
        Self {
            gtn,
            expanded: Cell::new(false),
            applicable_actions: RefCell::new(None),
            applicable_methods: RefCell::new(None),
            stats: RefCell::new(HashMap::new()),
            visits: Cell::new(0),
            _state: std::marker::PhantomData,
        }
    }

    /// The goal network this node owns. Safe for a caller to reuse directly (rather
    /// than copying) when recursing into the same node's own rollouts, since the
    /// node's key already captures this exact network shape.
    pub fn gtn(&self) -> &GoalNetwork<G> {
        &self.gtn
    }

    pub fn is_expanded(&self) -> bool {
        self.expanded.get()
    }

    pub fn expand(&self) {
        self.expanded.set(true);
    }

    pub fn candidates<Sim>(&self, sim: &Sim, state: &S) -> Vec<Choice<A, M>>
    where
        Sim: Simulator<State = S, Goal = G, Action = A, Method = M>,
    {
        let mut actions = self.applicable_actions.borrow_mut();
        if actions.is_none() {
            *actions = Some(sim.applicable_actions(state));
        }
        let mut methods = self.applicable_methods.borrow_mut();
        if methods.is_none() {
            *methods = Some(sim.applicable_methods(state));
        }

        let mut out: Vec<Choice<A, M>> = actions
            .as_ref()
            .unwrap()
            .iter()
            .map(|&a| Choice::Action(a))
            .collect();
        for &m in methods.as_ref().unwrap() {
            for target in sim.relevant(m, &self.gtn) {
                out.push(Choice::Method(m, target));
            }
        }
        out
    }

    /// Whether this node has no applicable actions at all — the engine's notion of
    /// a dead-end. Deliberately narrower than "no candidates": a node with zero
    /// actions but a relevant method is still reported as a dead-end, since a method
    /// decomposition alone never moves the world state forward.
    pub fn is_deadend<Sim>(&self, sim: &Sim, state: &S) -> bool
    where
        Sim: Simulator<State = S, Goal = G, Action = A, Method = M>,
    {
        let mut actions = self.applicable_actions.borrow_mut();
        if actions.is_none() {
            *actions = Some(sim.applicable_actions(state));
        }
        actions.as_ref().unwrap().is_empty()
    }

    fn q(&self, choice: &Choice<A, M>) -> f64 {
        self.stats.borrow().get(choice).map(|&(q, _)| q).unwrap_or(0.0)
    }

    fn n(&self, choice: &Choice<A, M>) -> u64 {
        self.stats.borrow().get(choice).map(|&(_, n)| n).unwrap_or(0)
    }

    pub fn select(&self, policy: Policy, candidates: &[Choice<A, M>], rng: &mut SmallRng) -> Choice<A, M> {
        debug_assert!(!candidates.is_empty());
        if candidates.len() == 1 {
            return candidates[0];
        }
        if let Policy::Default = policy {
            return candidates[uniform_index(rng, candidates.len())];
        }

        let visits = self.visits.get().max(1) as f64;
        let scores: Vec<f64> = match policy {
            Policy::Robust => candidates.iter().map(|c| self.n(c) as f64).collect(),
            Policy::Max => candidates.iter().map(|c| self.q(c)).collect(),
            Policy::Ucb {
                exploration_const,
                normalize,
            } => {
                let max_q = candidates
                    .iter()
                    .map(|c| self.q(c))
                    .fold(f64::MIN, f64::max)
                    .max(0.0);
                let c_eff = if normalize {
                    exploration_const * max_q
                } else {
                    exploration_const
                };
                candidates
                    .iter()
                    .map(|c| {
                        let n = self.n(c);
                        if n == 0 {
                            f64::INFINITY
                        } else {
                            self.q(c) + c_eff * ((visits.ln()) / n as f64).sqrt()
                        }
                    })
                    .collect()
            }
            Policy::Default => unreachable!("handled above"),
        };
        candidates[argmax_tie_break(rng, &scores)]
    }

    pub fn update(
        &self,
        choice: Choice<A, M>,
        result: RolloutResult,
        cumulative_cost: f64,
        goal_utility: f64,
        risk_factor: f64,
    ) {
        let bonus = if result.reached { goal_utility } else { 0.0 };
        let utility = (risk_factor * (result.cost + cumulative_cost)).exp();
        let mut stats = self.stats.borrow_mut();
        let (q, n) = stats.entry(choice).or_insert((0.0, 0));
        *q = (*n as f64 * *q + utility + bonus) / (*n as f64 + 1.0);
        *n += 1;
        self.visits.set(self.visits.get() + 1);
    }
}

/// Memoizes [`UnfactoredNode`]s by `(state, canonical goal-network shape)`.
pub struct UnfactoredNodeFactory<S: StateKey, G: Subgoal, A: Choosable, M: Choosable> {
    nodes: RefCell<HashMap<(S, GtnKey<G>), Rc<UnfactoredNode<S, G, A, M>>>>,
}

impl<S: StateKey, G: Subgoal, A: Choosable, M: Choosable> Default
    for UnfactoredNodeFactory<S, G, A, M>
{
    fn default() -> Self {
        Self {
            nodes: RefCell::new(HashMap::new()),
        }
    }
}

impl<S: StateKey, G: Subgoal, A: Choosable, M: Choosable> UnfactoredNodeFactory<S, G, A, M> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn num_nodes(&self) -> usize {
        self.nodes.borrow().len()
    }

    /// Eager-releases `gtn` against `state` before keying — for the unfactored
    /// variant the release happens here, prior to the lookup, rather than as a
    /// side effect observed by the caller afterward.
    pub fn new_node<Sim>(
        &self,
        sim: &Sim,
        state: &S,
        mut gtn: GoalNetwork<G>,
    ) -> Result<Rc<UnfactoredNode<S, G, A, M>>, crate::error::PlannerError>
    where
        Sim: Simulator<State = S, Goal = G, Action = A, Method = M>,
    {
        eager_release(sim, state, &mut gtn)?;
        let key = (state.clone(), gtn.canonical_key());
        if let Some(node) = self.nodes.borrow().get(&key) {
            return Ok(Rc::clone(node));
        }
        let node = Rc::new(UnfactoredNode::new(gtn));
        self.nodes.borrow_mut().insert(key, Rc::clone(&node));
        Ok(node)
    }
}
