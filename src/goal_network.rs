use crate::error::PlannerError;
use crate::subgoal::Subgoal;
use petgraph::Direction;
use petgraph::stable_graph::NodeIndex;
use petgraph::stable_graph::StableDiGraph;

/// A partial-order DAG of [`Subgoal`]s: the goal-task network the planner is working
/// to discharge.
///
/// Edges point from a subgoal to the subgoals that must follow it — `release`ing a
/// vertex promotes its successors whenever their last remaining predecessor is gone.
/// Vertices are never reused across a `decompose` splice: every inserted subgoal gets
/// a fresh [`NodeIndex`], even one whose content duplicates an existing vertex, so
/// `StableDiGraph` (rather than the plain `DiGraph` a freshly-rebuilt tree can get
/// away with) is required here — vertices are removed and re-spliced in place across
/// the lifetime of a single planning run, and indices held by in-flight recursion
/// frames must stay valid across those removals.
#[derive(Clone, Debug)]
pub struct GoalNetwork<G: Subgoal> {
    graph: StableDiGraph<G, ()>,
}

impl<G: Subgoal> Default for GoalNetwork<G> {
    fn default() -> Self {
        Self {
            graph: StableDiGraph::new(),
        }
    }
}

impl<G: Subgoal> GoalNetwork<G> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts a fresh vertex with no edges, returning its index.
    pub fn insert(&mut self, goal: G) -> NodeIndex {
        self.graph.add_node(goal)
    }

    /// Orders `before` strictly ahead of `after`.
    pub fn order(&mut self, before: NodeIndex, after: NodeIndex) {
        self.graph.add_edge(before, after, ());
    }

    pub fn is_empty(&self) -> bool {
        self.graph.node_count() == 0
    }

    pub fn goal(&self, v: NodeIndex) -> &G {
        &self.graph[v]
    }

    /// Vertices with no remaining predecessor: the frontier currently eligible for
    /// release or decomposition.
    pub fn get_unconstrained(&self) -> Vec<NodeIndex> {
        self.graph
            .node_indices()
            .filter(|&v| {
                self.graph
                    .neighbors_directed(v, Direction::Incoming)
                    .next()
                    .is_none()
            })
            .collect()
    }

    pub fn successors(&self, v: NodeIndex) -> Vec<NodeIndex> {
        self.graph
            .neighbors_directed(v, Direction::Outgoing)
            .collect()
    }

    fn predecessors(&self, v: NodeIndex) -> Vec<NodeIndex> {
        self.graph
            .neighbors_directed(v, Direction::Incoming)
            .collect()
    }

    fn sinks(&self) -> Vec<NodeIndex> {
        self.graph
            .node_indices()
            .filter(|&v| {
                self.graph
                    .neighbors_directed(v, Direction::Outgoing)
                    .next()
                    .is_none()
            })
            .collect()
    }

    /// Removes an unconstrained vertex. Fails if `v` still has a predecessor — callers
    /// are expected to only release vertices drawn from [`Self::get_unconstrained`].
    pub fn release(&mut self, v: NodeIndex) -> Result<(), PlannerError> {
        if !self.predecessors(v).is_empty() {
            return Err(PlannerError::ReleaseConstrained);
        }
        self.graph.remove_node(v);
        Ok(())
    }

    /// Splices `sub` in place of `v`: predecessors of `v` now point at `sub`'s
    /// unconstrained roots, `sub`'s sinks inherit `v`'s successors, and `v` is
    /// removed. Returns the indices `sub`'s vertices were inserted under, in the same
    /// order as `sub`'s own iteration.
    pub fn decompose(&mut self, v: NodeIndex, sub: GoalNetwork<G>) -> Vec<NodeIndex> {
        let predecessors = self.predecessors(v);
        let successors = self.successors(v);

        let mut remap = std::collections::HashMap::new();
        for old in sub.graph.node_indices() {
            let new = self.graph.add_node(sub.graph[old].clone());
            remap.insert(old, new);
        }
        for edge in sub.graph.edge_indices() {
            let (a, b) = sub.graph.edge_endpoints(edge).expect("dangling edge index");
            self.graph.add_edge(remap[&a], remap[&b], ());
        }

        let sub_roots = sub.get_unconstrained();
        let sub_sinks = sub.sinks();
        for root in &sub_roots {
            for &p in &predecessors {
                self.graph.add_edge(p, remap[root], ());
            }
        }
        for sink in &sub_sinks {
            for &s in &successors {
                self.graph.add_edge(remap[sink], s, ());
            }
        }

        self.graph.remove_node(v);
        sub.graph.node_indices().map(|old| remap[&old]).collect()
    }

    /// Deep clone; an independent network that shares no subsequent mutation with
    /// the original.
    pub fn copy(&self) -> Self {
        self.clone()
    }

    /// A canonical form used to memoize statistics for structurally identical
    /// networks regardless of the decomposition history that produced them: each
    /// vertex's content paired with the sorted contents of its direct successors,
    /// the whole multiset sorted. Collisions here only ever merge two networks with
    /// identical subgoal content and shape.
    pub fn canonical_key(&self) -> Vec<(G, Vec<G>)> {
        let mut items: Vec<(G, Vec<G>)> = self
            .graph
            .node_indices()
            .map(|v| {
                let content = self.graph[v].clone();
                let mut succs: Vec<G> = self
                    .graph
                    .neighbors_directed(v, Direction::Outgoing)
                    .map(|s| self.graph[s].clone())
                    .collect();
                succs.sort();
                (content, succs)
            })
            .collect();
        items.sort();
        items
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unconstrained_starts_as_roots() {
        let mut gtn = GoalNetwork::new();
        let a = gtn.insert("a");
        let b = gtn.insert("b");
        gtn.order(a, b);
        assert_eq!(gtn.get_unconstrained(), vec![a]);
    }

    #[test]
    fn release_promotes_successor() {
        let mut gtn = GoalNetwork::new();
        let a = gtn.insert("a");
        let b = gtn.insert("b");
        gtn.order(a, b);
        gtn.release(a).unwrap();
        assert_eq!(gtn.get_unconstrained(), vec![b]);
    }

    #[test]
    fn release_constrained_fails() {
        let mut gtn = GoalNetwork::new();
        let a = gtn.insert("a");
        let b = gtn.insert("b");
        gtn.order(a, b);
        assert!(matches!(gtn.release(b), Err(PlannerError::ReleaseConstrained)));
    }

    #[test]
    fn decompose_splices_predecessors_and_successors() {
        let mut gtn = GoalNetwork::new();
        let a = gtn.insert("a");
        let g = gtn.insert("g");
        let c = gtn.insert("c");
        gtn.order(a, g);
        gtn.order(g, c);

        let mut sub = GoalNetwork::new();
        let x = sub.insert("x");
        let y = sub.insert("y");
        sub.order(x, y);

        gtn.decompose(g, sub);

        assert_eq!(gtn.graph.node_count(), 4);
        let roots = gtn.get_unconstrained();
        assert_eq!(roots, vec![a]);
    }

    #[test]
    fn copy_is_independent() {
        let mut gtn = GoalNetwork::new();
        let a = gtn.insert("a");
        let copy = gtn.copy();
        gtn.release(a).unwrap();
        assert!(gtn.is_empty());
        assert!(!copy.is_empty());
    }

    #[test]
    fn canonical_key_ignores_insertion_order() {
        let mut one = GoalNetwork::new();
        let a1 = one.insert("a");
        let b1 = one.insert("b");
        one.order(a1, b1);

        let mut two = GoalNetwork::new();
        let b2 = two.insert("b");
        let a2 = two.insert("a");
        two.order(a2, b2);

        assert_eq!(one.canonical_key(), two.canonical_key());
    }
}
