/// Fatal, caller-reachable error conditions.
///
/// This is deliberately a small set. Most contract violations (selecting an action
/// the simulator never declared applicable, querying a state that doesn't exist) are
/// programmer errors the engine guarantees it will never trigger by construction —
/// those are modeled as panics at the boundary, matching the rest of this crate's
/// idiom, not as variants here. `PlannerError` exists for conditions that can
/// legitimately be reached by caller- or author-supplied data: an out-of-order
/// release, or an unknown method id handed to the grounder.
#[derive(Debug, thiserror::Error)]
pub enum PlannerError {
    #[error("release attempted on a goal network vertex with unresolved predecessors")]
    ReleaseConstrained,

    #[error("no method registered for id {0:?}")]
    UnknownMethod(String),
}
