//! Search-tree nodes and their memoizing factories, one pair per UCT variant.
//!
//! Both variants share the same eager-release contract at node-creation time (see
//! [`eager_release`]) and differ only in what they key statistics by — see
//! [`factored`] and [`unfactored`].

pub mod factored;
pub mod unfactored;

use crate::error::PlannerError;
use crate::simulator::Simulator;

/// Releases every currently-unconstrained, already-satisfied subgoal of `gtn`
/// against `state`, repeating until no further release applies. Shared by both node
/// factories; the only difference between variants is *when* each calls this
/// relative to computing its memo key (see `factored::FactoredNodeFactory::new_node`
/// and `unfactored::UnfactoredNodeFactory::new_node`).
///
/// `gtn.release` only ever fails on a constrained vertex, which cannot happen here
/// since every candidate is drawn fresh from `get_unconstrained`; the `?` is
/// defensive plumbing back to `run`'s `Result`, not a reachable error path.
pub fn eager_release<Sim>(
    sim: &Sim,
    state: &Sim::State,
    gtn: &mut crate::goal_network::GoalNetwork<Sim::Goal>,
) -> Result<(), PlannerError>
where
    Sim: Simulator,
{
    loop {
        let frontier = gtn.get_unconstrained();
        let mut changed = false;
        for v in frontier {
            if sim.satisfies(state, gtn.goal(v)) {
                gtn.release(v)?;
                changed = true;
            }
        }
        if !changed {
            break;
        }
    }
    Ok(())
}
