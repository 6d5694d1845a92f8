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

/// Per-subgoal rollout summary: for every subgoal still active at the recursion
/// frame that produced it, the cost accumulated since and whether it was reached.
///
/// Built bottom-up during recursion unwinding and extended at each release point —
/// see the factored engine's `simulate`/`rollout`.
#[derive(Debug, Clone, Default)]
pub struct RolloutResult<G: Subgoal> {
    entries: HashMap<G, (f64, bool)>,
}

impl<G: Subgoal> RolloutResult<G> {
    pub fn new() -> Self {
        Self {
            entries: HashMap::new(),
        }
    }

    pub fn set(&mut self, goal: G, cost: f64, reached: bool) {
        self.entries.insert(goal, (cost, reached));
    }

    pub fn merge(&mut self, other: RolloutResult<G>) {
        self.entries.extend(other.entries);
    }

    pub fn increment(&mut self, delta: f64) {
        for (cost, _) in self.entries.values_mut() {
            *cost += delta;
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = (&G, &(f64, bool))> {
        self.entries.iter()
    }
}

/// A search-tree node in the factored UCT variant: keyed by world state alone. Q, N
/// and visit counts are indexed by `(subgoal, choice)` rather than by choice alone,
/// so statistics accumulated from one goal-network fragment are shared with every
/// other fragment that reaches the same state with the same active subgoal.
pub struct FactoredNode<S: StateKey, G: Subgoal, A: Choosable, M: Choosable> {
    _state: std::marker::PhantomData<S>,
    expanded: Cell<bool>,
    applicable_actions: RefCell<Option<Vec<A>>>,
    applicable_methods: RefCell<Option<Vec<M>>>,
    stats: RefCell<HashMap<G, HashMap<Choice<A, M>, (f64, u64)>>>,
    visits: RefCell<HashMap<G, u64>>,
}

impl<S: StateKey, G: Subgoal, A: Choosable, M: Choosable> Default for FactoredNode<S, G, A, M> {
    fn default() -> Self {
        Self {
            _state: std::marker::PhantomData,
            expanded: Cell::new(false),
            applicable_actions: RefCell::new(None),
            applicable_methods: RefCell::new(None),
            stats: RefCell::new(HashMap::new()),
            visits: RefCell::new(HashMap::new()),
        }
    }
}

impl<S: StateKey, G: Subgoal, A: Choosable, M: Choosable> FactoredNode<S, G, A, M> {
    pub fn is_expanded(&self) -> bool {
        self.expanded.get()
    }

    pub fn expand(&self) {
        self.expanded.set(true);
    }

    /// The candidate set: every applicable action, plus one `Method(m, target)`
    /// candidate per (applicable method, relevant target) pair. Queried fresh
    /// against `gtn` every call — only the raw applicable-action/method lists are
    /// cached, since relevance depends on the caller's current goal network.
    pub fn candidates<Sim>(&self, sim: &Sim, state: &S, gtn: &GoalNetwork<G>) -> Vec<Choice<A, M>>
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
            for target in sim.relevant(m, gtn) {
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

    fn q(&self, g: &G, choice: &Choice<A, M>) -> f64 {
        self.stats
            .borrow()
            .get(g)
            .and_then(|m| m.get(choice))
            .map(|&(q, _)| q)
            .unwrap_or(0.0)
    }

    fn n(&self, g: &G, choice: &Choice<A, M>) -> u64 {
        self.stats
            .borrow()
            .get(g)
            .and_then(|m| m.get(choice))
            .map(|&(_, n)| n)
            .unwrap_or(0)
    }

    fn visits(&self, g: &G) -> u64 {
        self.visits.borrow().get(g).copied().unwrap_or(0)
    }

    /// Selects one candidate according to `policy`, restricted to the subgoals
    /// currently unconstrained in `gtn` — see the crate-level design notes on the
    /// factored UCB formula.
    pub fn select(
        &self,
        policy: Policy,
        candidates: &[Choice<A, M>],
        gtn: &GoalNetwork<G>,
        rng: &mut SmallRng,
    ) -> Choice<A, M> {
        debug_assert!(!candidates.is_empty());
        if candidates.len() == 1 {
            return candidates[0];
        }
        if let Policy::Default = policy {
            return candidates[uniform_index(rng, candidates.len())];
        }

        let active: Vec<G> = gtn
            .get_unconstrained()
            .into_iter()
            .map(|v| gtn.goal(v).clone())
            .collect();

        let scores: Vec<f64> = match policy {
            Policy::Robust => candidates
                .iter()
                .map(|c| active.iter().map(|g| self.n(g, c) as f64).sum())
                .collect(),
            Policy::Max => candidates
                .iter()
                .map(|c| active.iter().map(|g| self.q(g, c)).sum())
                .collect(),
            Policy::Ucb {
                exploration_const,
                normalize,
            } => {
                let q_sums: Vec<f64> = candidates
                    .iter()
                    .map(|c| active.iter().map(|g| self.q(g, c)).sum())
                    .collect();
                let c_eff = if normalize {
                    exploration_const * q_sums.iter().copied().fold(f64::MIN, f64::max).max(0.0)
                } else {
                    exploration_const
                };
                candidates
                    .iter()
                    .zip(q_sums.iter())
                    .map(|(c, &q_sum)| {
                        let mut total = q_sum;
                        for g in &active {
                            let n = self.n(g, c);
                            if n == 0 {
                                return f64::INFINITY;
                            }
                            let v = self.visits(g).max(1) as f64;
                            total += c_eff * ((v.ln()) / n as f64).sqrt();
                        }
                        total
                    })
                    .collect()
            }
            Policy::Default => unreachable!("handled above"),
        };
        candidates[argmax_tie_break(rng, &scores)]
    }

    /// Backs up a rollout/simulate result against every subgoal it reports on.
    pub fn update(
        &self,
        choice: Choice<A, M>,
        result: &RolloutResult<G>,
        cumulative_cost: f64,
        goal_utility: f64,
        risk_factor: f64,
    ) {
        let mut stats = self.stats.borrow_mut();
        let mut visits = self.visits.borrow_mut();
        for (g, &(cost, reached)) in result.iter() {
            let bonus = if reached { goal_utility } else { 0.0 };
            let utility = (risk_factor * (cost + cumulative_cost)).exp();
            let table = stats.entry(g.clone()).or_default();
            let (q, n) = table.entry(choice).or_insert((0.0, 0));
            *q = (*n as f64 * *q + utility + bonus) / (*n as f64 + 1.0);
            *n += 1;
            *visits.entry(g.clone()).or_insert(0) += 1;
        }
    }
}

/// Memoizes [`FactoredNode`]s by world state so that every search path reaching the
/// same state shares the same statistics tables.
pub struct FactoredNodeFactory<S: StateKey, G: Subgoal, A: Choosable, M: Choosable> {
    nodes: RefCell<HashMap<S, Rc<FactoredNode<S, G, A, M>>>>,
}

impl<S: StateKey, G: Subgoal, A: Choosable, M: Choosable> Default
    for FactoredNodeFactory<S, G, A, M>
{
    fn default() -> Self {
        Self {
            nodes: RefCell::new(HashMap::new()),
        }
    }
}

impl<S: StateKey, G: Subgoal, A: Choosable, M: Choosable> FactoredNodeFactory<S, G, A, M> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn num_nodes(&self) -> usize {
        self.nodes.borrow().len()
    }

    /// Returns the unique node for `state`, creating it on first request. Before
    /// returning, releases every unconstrained vertex of `gtn` that `state` already
    /// satisfies, repeating until a fixed point — the eager-release contract shared
    /// by both UCT variants.
    pub fn new_node<Sim>(
        &self,
        sim: &Sim,
        state: &S,
        gtn: &mut GoalNetwork<G>,
    ) -> Result<Rc<FactoredNode<S, G, A, M>>, crate::error::PlannerError>
    where
        Sim: Simulator<State = S, Goal = G, Action = A, Method = M>,
    {
        eager_release(sim, state, gtn)?;
        if let Some(node) = self.nodes.borrow().get(state) {
            return Ok(Rc::clone(node));
        }
        let node = Rc::new(FactoredNode::default());
        self.nodes.borrow_mut().insert(state.clone(), Rc::clone(&node));
        Ok(node)
    }
}
