use crate::choice::Choice;
use crate::config::Config;
use crate::error::PlannerError;
use crate::goal_network::GoalNetwork;
use crate::node::eager_release;
use crate::node::factored::FactoredNode;
use crate::node::factored::FactoredNodeFactory;
use crate::node::factored::RolloutResult;
use crate::outcome::Outcome;
use crate::outcome::RunResult;
use crate::policy::Policy;
use crate::progress::Progress;
use crate::simulator::Simulator;
use rand::Rng;
use rand::SeedableRng;
use rand::rngs::SmallRng;
use std::cell::RefCell;
use std::rc::Rc;

/// Immutable per-run bundle for the factored UCT variant: the simulator handle,
/// hyperparameters, the shared RNG stream, the node factory, and run counters.
///
/// "Immutable" describes the field set, not the interior state — the RNG and
/// factory are mutated in place through `RefCell`, exposing counter mutation through
/// a handle callers otherwise treat as shared and append-only.
pub struct FactoredContext<Sim: Simulator> {
    sim: Sim,
    config: Config<Sim::State>,
    rng: RefCell<SmallRng>,
    factory: FactoredNodeFactory<Sim::State, Sim::Goal, Sim::Action, Sim::Method>,
    progress: Progress,
}

impl<Sim: Simulator> FactoredContext<Sim> {
    pub fn new(sim: Sim, config: Config<Sim::State>) -> Self {
        let rng = match config.seed {
            Some(seed) => SmallRng::seed_from_u64(seed),
            None => SmallRng::seed_from_u64(rand::rng().random()),
        };
        Self {
            sim,
            config,
            rng: RefCell::new(rng),
            factory: FactoredNodeFactory::new(),
            progress: Progress::new(),
        }
    }

    pub fn progress(&self) -> &Progress {
        &self.progress
    }

    /// Runs the outer decision loop to completion: seed → decide → apply,
    /// repeating until budget exhaustion, a dead-end, or an empty goal network.
    /// See `crate`-level design notes (§4.6) for the full control flow.
    ///
    /// Returns `Err` only for construction errors (an unknown method id handed
    /// back by the simulator, a release attempted out of order) — conditions the
    /// engine itself never triggers by construction but that `ground_method` and
    /// `GoalNetwork::release` are typed to report rather than assume away.
    pub fn run(&self, initial_gtn: GoalNetwork<Sim::Goal>) -> Result<RunResult, PlannerError> {
        let mut state = self.sim.initial_state();
        let mut gtn = initial_gtn.copy();
        let mut node = self.factory.new_node(&self.sim, &state, &mut gtn)?;
        let mut cumulative_cost: u32 = 0;
        log::info!("factored run starting, budget={}", self.config.budget);

        loop {
            if cumulative_cost >= self.config.budget {
                return Ok(self.finish(Outcome::FailureBudget, cumulative_cost));
            }
            if node.is_deadend(&self.sim, &state) {
                return Ok(self.finish(Outcome::FailureDeadlocked, cumulative_cost));
            }
            // Method decompositions don't change world state, so no node lookup
            // happens on that path; re-run eager release here so a subgoal newly
            // satisfied by decomposition alone is stripped before checking for an
            // empty network.
            eager_release(&self.sim, &state, &mut gtn)?;
            if gtn.is_empty() {
                return Ok(self.finish(Outcome::Success, cumulative_cost));
            }

            let choice = self.plan(&node, &state, &gtn, cumulative_cost as f64)?;
            if self.config.show_progress {
                println!("[{cumulative_cost}] {choice:?}");
            }
            log::debug!("decision {}: selected {:?}", cumulative_cost, choice);
            self.progress.inc_decisions();

            match choice {
                Choice::Method(m, target) => {
                    let sub = self.sim.ground_method(m)?;
                    gtn.decompose(target, sub);
                }
                Choice::Action(a) => {
                    state = self.sim.apply(&state, a, &mut self.rng.borrow_mut());
                    cumulative_cost += 1;
                    node = self.factory.new_node(&self.sim, &state, &mut gtn)?;
                }
            }
        }
    }

    fn finish(&self, outcome: Outcome, cost: u32) -> RunResult {
        log::info!(
            "factored run finished: {:?} cost={} nodes={}",
            outcome,
            cost,
            self.factory.num_nodes()
        );
        RunResult {
            outcome,
            cost,
            num_nodes: self.factory.num_nodes(),
        }
    }

    /// Fires `n_rollouts` simulations from `node`, each against a fresh copy of the
    /// live goal network, then reads off the greedy (`Max`-policy) choice.
    fn plan(
        &self,
        node: &Rc<FactoredNode<Sim::State, Sim::Goal, Sim::Action, Sim::Method>>,
        state: &Sim::State,
        gtn: &GoalNetwork<Sim::Goal>,
        cumulative_cost: f64,
    ) -> Result<Choice<Sim::Action, Sim::Method>, PlannerError> {
        for _ in 0..self.config.n_rollouts {
            let mut branch = gtn.copy();
            self.simulate(node, state, &mut branch, 0, cumulative_cost)?;
        }
        let candidates = node.candidates(&self.sim, state, gtn);
        let mut rng = self.rng.borrow_mut();
        Ok(node.select(Policy::Max, &candidates, gtn, &mut rng))
    }

    /// One UCB-guided descent with statistics backup. See §4.6 for the base cases
    /// and the exact recursion this mirrors.
    fn simulate(
        &self,
        node: &Rc<FactoredNode<Sim::State, Sim::Goal, Sim::Action, Sim::Method>>,
        state: &Sim::State,
        gtn: &mut GoalNetwork<Sim::Goal>,
        depth: usize,
        cum: f64,
    ) -> Result<RolloutResult<Sim::Goal>, PlannerError> {
        if gtn.is_empty() {
            return Ok(RolloutResult::new());
        }
        for v in gtn.get_unconstrained() {
            let goal = gtn.goal(v).clone();
            if self.sim.satisfies(state, &goal) {
                gtn.release(v)?;
                let mut result = self.simulate(node, state, gtn, depth, cum)?;
                result.set(goal, 0.0, true);
                return Ok(result);
            }
        }
        if node.is_deadend(&self.sim, state) {
            let mut result = RolloutResult::new();
            let cost = self.config.horizon as f64 - 1.0 - depth as f64;
            for v in gtn.get_unconstrained() {
                result.set(gtn.goal(v).clone(), cost, false);
            }
            return Ok(result);
        }
        if depth == self.config.horizon - 1 {
            let mut result = RolloutResult::new();
            for v in gtn.get_unconstrained() {
                result.set(gtn.goal(v).clone(), 0.0, false);
            }
            return Ok(result);
        }

        let candidates = node.candidates(&self.sim, state, gtn);
        let (choice, mut result) = if !node.is_expanded() {
            node.expand();
            let choice = {
                let mut rng = self.rng.borrow_mut();
                node.select(Policy::Default, &candidates, gtn, &mut rng)
            };
            let result = match choice {
                Choice::Action(a) => {
                    let next_state = self.sim.apply(state, a, &mut self.rng.borrow_mut());
                    let next_node = self.factory.new_node(&self.sim, &next_state, gtn)?;
                    self.rollout(&next_node, &next_state, gtn, depth + 1)?
                }
                Choice::Method(m, target) => {
                    let sub = self.sim.ground_method(m)?;
                    gtn.decompose(target, sub);
                    self.rollout(node, state, gtn, depth + 1)?
                }
            };
            (choice, result)
        } else {
            let policy = Policy::Ucb {
                exploration_const: self.config.exploration_const,
                normalize: self.config.normalize_exploration_const,
            };
            let choice = {
                let mut rng = self.rng.borrow_mut();
                node.select(policy, &candidates, gtn, &mut rng)
            };
            let result = match choice {
                Choice::Action(a) => {
                    let next_state = self.sim.apply(state, a, &mut self.rng.borrow_mut());
                    let next_node = self.factory.new_node(&self.sim, &next_state, gtn)?;
                    self.simulate(&next_node, &next_state, gtn, depth + 1, cum + 1.0)?
                }
                Choice::Method(m, target) => {
                    let sub = self.sim.ground_method(m)?;
                    gtn.decompose(target, sub);
                    self.simulate(node, state, gtn, depth + 1, cum)?
                }
            };
            (choice, result)
        };

        let u_cost = choice.cost() as f64;
        node.update(choice, &result, cum + u_cost, self.config.goal_utility, self.config.risk_factor);
        result.increment(u_cost);
        Ok(result)
    }

    /// Identical control flow to [`Self::simulate`] but with no statistics update and
    /// always the default (uniform random) policy — a single simulated trajectory
    /// used to seed a freshly-expanded leaf's first backup.
    fn rollout(
        &self,
        node: &Rc<FactoredNode<Sim::State, Sim::Goal, Sim::Action, Sim::Method>>,
        state: &Sim::State,
        gtn: &mut GoalNetwork<Sim::Goal>,
        depth: usize,
    ) -> Result<RolloutResult<Sim::Goal>, PlannerError> {
        if gtn.is_empty() {
            return Ok(RolloutResult::new());
        }
        for v in gtn.get_unconstrained() {
            let goal = gtn.goal(v).clone();
            if self.sim.satisfies(state, &goal) {
                gtn.release(v)?;
                let mut result = self.rollout(node, state, gtn, depth)?;
                result.set(goal, 0.0, true);
                return Ok(result);
            }
        }
        if node.is_deadend(&self.sim, state) {
            let mut result = RolloutResult::new();
            let cost = self.config.horizon as f64 - 1.0 - depth as f64;
            for v in gtn.get_unconstrained() {
                result.set(gtn.goal(v).clone(), cost, false);
            }
            return Ok(result);
        }
        if depth == self.config.horizon - 1 {
            let mut result = RolloutResult::new();
            for v in gtn.get_unconstrained() {
                result.set(gtn.goal(v).clone(), 0.0, false);
            }
            return Ok(result);
        }

        // Touches every node the rollout passes through, not just the one leaf that
        // triggered expansion from `simulate` — a node the factory later hands back
        // to a `simulate` call is already `expanded` if any prior rollout visited it.
        node.expand();
        let candidates = node.candidates(&self.sim, state, gtn);
        let choice = {
            let mut rng = self.rng.borrow_mut();
            node.select(Policy::Default, &candidates, gtn, &mut rng)
        };
        let mut result = match choice {
            Choice::Action(a) => {
                let next_state = self.sim.apply(state, a, &mut self.rng.borrow_mut());
                let next_node = self.factory.new_node(&self.sim, &next_state, gtn)?;
                self.rollout(&next_node, &next_state, gtn, depth + 1)?
            }
            Choice::Method(m, target) => {
                let sub = self.sim.ground_method(m)?;
                gtn.decompose(target, sub);
                self.rollout(node, state, gtn, depth + 1)?
            }
        };
        result.increment(choice.cost() as f64);
        Ok(result)
    }
}
