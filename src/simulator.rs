use crate::choosable::Choosable;
use crate::error::PlannerError;
use crate::goal_network::GoalNetwork;
use crate::state::StateKey;
use crate::subgoal::Subgoal;
use petgraph::stable_graph::NodeIndex;
use rand::rngs::SmallRng;

/// The symbolic planning substrate, consumed by the engine only through this fixed
/// interface.
///
/// A `Simulator` owns everything the engine treats as opaque: the object/type
/// hierarchy, fluent evaluation, and predicate state representation. The engine
/// never inspects a `State` directly and never applies an action the simulator did
/// not just report as applicable — implementations are free to `panic!` on a
/// contract violation rather than return a `Result`, since the engine guarantees by
/// construction that it will never attempt one.
///
/// `ground_method` is the one operation that does return a `Result`: a method id can
/// legitimately arrive from caller- or author-supplied data the engine does not
/// control (a goal network literal built from an unfamiliar method library), so a
/// lookup failure here is not a programmer error.
pub trait Simulator {
    type State: StateKey;
    type Goal: Subgoal;
    type Action: Choosable;
    type Method: Choosable;

    /// The world state the problem instance starts in.
    fn initial_state(&self) -> Self::State;

    /// Advances `state` by applying `action`. For probabilistic actions, samples one
    /// outcome per call from `rng` — the engine never calls this twice expecting the
    /// same result.
    ///
    /// # Panics
    ///
    /// Implementations may panic if `action` was not returned by a prior call to
    /// [`Self::applicable_actions`] on this exact `state`.
    fn apply(&self, state: &Self::State, action: Self::Action, rng: &mut SmallRng) -> Self::State;

    /// All actions applicable in `state`.
    fn applicable_actions(&self, state: &Self::State) -> Vec<Self::Action>;

    /// All methods applicable in `state`, before relevance filtering against a goal
    /// network.
    fn applicable_methods(&self, state: &Self::State) -> Vec<Self::Method>;

    /// Whether `state` already satisfies `goal`.
    fn satisfies(&self, state: &Self::State, goal: &Self::Goal) -> bool;

    /// The subset of `gtn`'s vertices that applying `method` would make progress on.
    /// Empty iff `method` is not relevant to any currently active subgoal — the
    /// engine prunes irrelevant methods from the candidate set entirely.
    fn relevant(
        &self,
        method: Self::Method,
        gtn: &GoalNetwork<Self::Goal>,
    ) -> Vec<NodeIndex>;

    /// Grounds `method`'s decomposition: the sub-network that replaces the method's
    /// chosen decomposition target once the engine selects it.
    ///
    /// # Errors
    ///
    /// Returns [`PlannerError::UnknownMethod`] if `method` names no registered
    /// decomposition rule.
    fn ground_method(
        &self,
        method: Self::Method,
    ) -> Result<GoalNetwork<Self::Goal>, PlannerError>;
}
