use crate::choice::Choice;
use crate::config::Config;
use crate::error::PlannerError;
use crate::node::unfactored::RolloutResult;
use crate::node::unfactored::UnfactoredNode;
use crate::node::unfactored::UnfactoredNodeFactory;
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

/// Immutable per-run bundle for the unfactored UCT variant — same shape as
/// [`crate::engine::factored::FactoredContext`], but the node factory keys on
/// `(state, goal network)` rather than state alone, so no goal network ever needs
/// threading back out of a node lookup the way the factored variant's does.
pub struct UnfactoredContext<Sim: Simulator> {
    sim: Sim,
    config: Config<Sim::State>,
    rng: RefCell<SmallRng>,
    factory: UnfactoredNodeFactory<Sim::State, Sim::Goal, Sim::Action, Sim::Method>,
    progress: Progress,
}

impl<Sim: Simulator> UnfactoredContext<Sim> {
    pub fn new(sim: Sim, config: Config<Sim::State>) -> Self {
        let rng = match config.seed {
            Some(seed) => SmallRng::seed_from_u64(seed),
            None => SmallRng::seed_from_u64(rand::rng().random()),
        };
        Self {
            sim,
            config,
            rng: RefCell::new(rng),
            factory: UnfactoredNodeFactory::new(),
            progress: Progress::new(),
        }
    }

    pub fn progress(&self) -> &Progress {
        &self.progress
    }

    /// Runs the outer decision loop to completion. Unlike the factored variant,
    /// there is no separate manual eager-release step here: every node the factory
    /// hands back has already been released against its own `gtn` by construction.
    ///
    /// Returns `Err` only for construction errors (an unknown method id, a release
    /// attempted out of order) — see [`crate::engine::factored::FactoredContext::run`].
    pub fn run(
        &self,
        initial_gtn: crate::goal_network::GoalNetwork<Sim::Goal>,
    ) -> Result<RunResult, PlannerError> {
        let mut state = self.sim.initial_state();
        let mut node = self.factory.new_node(&self.sim, &state, initial_gtn)?;
        let mut cumulative_cost: u32 = 0;
        log::info!("unfactored run starting, budget={}", self.config.budget);

        loop {
            if cumulative_cost >= self.config.budget {
                return Ok(self.finish(Outcome::FailureBudget, cumulative_cost));
            }
            if node.is_deadend(&self.sim, &state) {
                return Ok(self.finish(Outcome::FailureDeadlocked, cumulative_cost));
            }
            if node.gtn().is_empty() {
                return Ok(self.finish(Outcome::Success, cumulative_cost));
            }

            let choice = self.plan(&node, &state, cumulative_cost as f64)?;
            if self.config.show_progress {
                println!("[{cumulative_cost}] {choice:?}");
            }
            log::debug!("decision {}: selected {:?}", cumulative_cost, choice);
            self.progress.inc_decisions();

            match choice {
                Choice::Method(m, target) => {
                    let sub = self.sim.ground_method(m)?;
                    let mut gtn = node.gtn().copy();
                    gtn.decompose(target, sub);
                    node = self.factory.new_node(&self.sim, &state, gtn)?;
                }
                Choice::Action(a) => {
                    let next_state = self.sim.apply(&state, a, &mut self.rng.borrow_mut());
                    cumulative_cost += 1;
                    let gtn = node.gtn().copy();
                    state = next_state;
                    node = self.factory.new_node(&self.sim, &state, gtn)?;
                }
            }
        }
    }

    fn finish(&self, outcome: Outcome, cost: u32) -> RunResult {
        log::info!(
            "unfactored run finished: {:?} cost={} nodes={}",
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

    /// Fires `n_rollouts` simulations from `node`, then reads off the greedy
    /// (`Max`-policy) choice.
    fn plan(
        &self,
        node: &Rc<UnfactoredNode<Sim::State, Sim::Goal, Sim::Action, Sim::Method>>,
        state: &Sim::State,
        cumulative_cost: f64,
    ) -> Result<Choice<Sim::Action, Sim::Method>, PlannerError> {
        for _ in 0..self.config.n_rollouts {
            self.simulate(node, state, 0, cumulative_cost)?;
        }
        let candidates = node.candidates(&self.sim, state);
        let mut rng = self.rng.borrow_mut();
        Ok(node.select(Policy::Max, &candidates, &mut rng))
    }

    /// One UCB-guided descent with statistics backup.
    fn simulate(
        &self,
        node: &Rc<UnfactoredNode<Sim::State, Sim::Goal, Sim::Action, Sim::Method>>,
        state: &Sim::State,
        depth: usize,
        cum: f64,
    ) -> Result<RolloutResult, PlannerError> {
        if node.gtn().is_empty() {
            return Ok(RolloutResult::new(0.0, true));
        }
        if node.is_deadend(&self.sim, state) {
            let cost = self.config.horizon as f64 - 1.0 - depth as f64;
            return Ok(RolloutResult::new(cost, false));
        }
        if depth == self.config.horizon - 1 {
            return Ok(RolloutResult::new(1.0, false));
        }

        let candidates = node.candidates(&self.sim, state);
        let (choice, mut result) = if !node.is_expanded() {
            node.expand();
            let choice = {
                let mut rng = self.rng.borrow_mut();
                node.select(Policy::Default, &candidates, &mut rng)
            };
            let result = match choice {
                Choice::Action(a) => {
                    let next_state = self.sim.apply(state, a, &mut self.rng.borrow_mut());
                    let gtn = node.gtn().copy();
                    let next_node = self.factory.new_node(&self.sim, &next_state, gtn)?;
                    self.rollout(&next_node, &next_state, depth + 1)?
                }
                Choice::Method(m, target) => {
                    let sub = self.sim.ground_method(m)?;
                    let mut gtn = node.gtn().copy();
                    gtn.decompose(target, sub);
                    let next_node = self.factory.new_node(&self.sim, state, gtn)?;
                    self.rollout(&next_node, state, depth + 1)?
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
                node.select(policy, &candidates, &mut rng)
            };
            let result = match choice {
                Choice::Action(a) => {
                    let next_state = self.sim.apply(state, a, &mut self.rng.borrow_mut());
                    let gtn = node.gtn().copy();
                    let next_node = self.factory.new_node(&self.sim, &next_state, gtn)?;
                    self.simulate(&next_node, &next_state, depth + 1, cum + 1.0)?
                }
                Choice::Method(m, target) => {
                    let sub = self.sim.ground_method(m)?;
                    let mut gtn = node.gtn().copy();
                    gtn.decompose(target, sub);
                    let next_node = self.factory.new_node(&self.sim, state, gtn)?;
                    self.simulate(&next_node, state, depth + 1, cum)?
                }
            };
            (choice, result)
        };

        let u_cost = choice.cost() as f64;
        node.update(choice, result, cum + u_cost, self.config.goal_utility, self.config.risk_factor);
        result.increment(u_cost);
        Ok(result)
    }

    /// Identical control flow to [`Self::simulate`] but with no statistics update
    /// and always the default (uniform random) policy.
    fn rollout(
        &self,
        node: &Rc<UnfactoredNode<Sim::State, Sim::Goal, Sim::Action, Sim::Method>>,
        state: &Sim::State,
        depth: usize,
    ) -> Result<RolloutResult, PlannerError> {
        if node.gtn().is_empty() {
            return Ok(RolloutResult::new(0.0, true));
        }
        if node.is_deadend(&self.sim, state) {
            let cost = self.config.horizon as f64 - 1.0 - depth as f64;
            return Ok(RolloutResult::new(cost, false));
        }
        if depth == self.config.horizon - 1 {
            return Ok(RolloutResult::new(0.0, false));
        }

        // Touches every node the rollout passes through, not just the one leaf that
        // triggered expansion from `simulate` — mirrors the factored variant's
        // `rollout` for the same reason: a node the factory later hands back to a
        // `simulate` call is already `expanded` if any prior rollout visited it.
        node.expand();
        let candidates = node.candidates(&self.sim, state);
        let choice = {
            let mut rng = self.rng.borrow_mut();
            node.select(Policy::Default, &candidates, &mut rng)
        };
        let mut result = match choice {
            Choice::Action(a) => {
                let next_state = self.sim.apply(state, a, &mut self.rng.borrow_mut());
                let gtn = node.gtn().copy();
                let next_node = self.factory.new_node(&self.sim, &next_state, gtn)?;
                self.rollout(&next_node, &next_state, depth + 1)?
            }
            Choice::Method(m, target) => {
                let sub = self.sim.ground_method(m)?;
                let mut gtn = node.gtn().copy();
                gtn.decompose(target, sub);
                let next_node = self.factory.new_node(&self.sim, state, gtn)?;
                self.rollout(&next_node, state, depth + 1)?
            }
        };
        result.increment(choice.cost() as f64);
        Ok(result)
    }
}
