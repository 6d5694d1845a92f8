/// A single vertex of a [`crate::GoalNetwork`]: a ground logical expression that the
/// planner is trying to achieve.
///
/// Subgoal identity is structural — two subgoals are the same goal iff they compare
/// equal. Implementations are typically thin wrappers around a predicate application
/// (`on(a, b)`, `clear(a)`, ...) supplied by the symbolic planning substrate.
///
/// # Requirements
///
/// - `Clone` — goal networks are copied wholesale at branch points
/// - `Hash` + `Eq` — used as keys in factored Q-tables and memoization
/// - `Ord` — sorted when canonicalizing a network for the unfactored node key
/// - `Debug` — printable in progress traces
pub trait Subgoal
where
    Self: Clone,
    Self: PartialEq + Eq,
    Self: PartialOrd + Ord,
    Self: std::hash::Hash,
    Self: std::fmt::Debug,
{
}
