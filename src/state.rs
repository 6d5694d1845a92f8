/// The world state a [`crate::Simulator`] transitions between.
///
/// States are opaque to the engine: it never inspects their contents, only asks the
/// simulator to produce, query, and advance them. The engine does require that states
/// be cheap to key a memo table with — implementations backed by a predicate-valuation
/// map are responsible for canonicalizing themselves (sorting fluents, normalizing
/// value encodings) before deriving `Hash`/`Ord`, so that two semantically equal states
/// collide in the [`crate::node::NodeFactory`].
///
/// # Requirements
///
/// - `Clone` — successor states are produced fresh, predecessors retained
/// - `Hash` + `Eq` — node-factory memoization key
/// - `Debug` — printable in progress traces
pub trait StateKey
where
    Self: Clone,
    Self: PartialEq + Eq,
    Self: std::hash::Hash,
    Self: std::fmt::Debug,
{
}
