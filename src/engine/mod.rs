//! The UCT search engine: outer decision loop plus recursive `simulate`/`rollout`,
//! one variant per statistics-indexing scheme.
//!
//! [`factored`] and [`unfactored`] share every algorithmic idea in this crate
//! (goal-network progression, UCB selection, GUBS backup) and differ only in what a
//! [`crate::node`] is keyed by and therefore how the engine threads a goal network
//! through recursion — see each module's doc comment for the split.

pub mod factored;
pub mod unfactored;
