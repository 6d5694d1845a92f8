use crate::choosable::Choosable;
use petgraph::stable_graph::NodeIndex;

/// A single decision a [`crate::Simulator`]-driven node can make: apply a grounded
/// action, or apply a grounded method against a chosen decomposition target.
///
/// `Choice` is the statistics key for both UCT variants: `Eq`/`Hash` compare the
/// method's decomposition target too, so decomposing the same method against two
/// different subgoals is tracked as two distinct arms.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Choice<A: Choosable, M: Choosable> {
    Action(A),
    Method(M, NodeIndex),
}

impl<A: Choosable, M: Choosable> Choice<A, M> {
    /// The cost the engine charges for taking this choice: 1 for an action, 0 for a
    /// method (decomposition is free; only real actions consume budget).
    pub fn cost(&self) -> u32 {
        match self {
            Choice::Action(_) => 1,
            Choice::Method(..) => 0,
        }
    }

    pub fn is_method(&self) -> bool {
        matches!(self, Choice::Method(..))
    }
}
