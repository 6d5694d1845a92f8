/// The terminal classification of a planner run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    Success,
    FailureDeadlocked,
    FailureBudget,
}

/// What a completed run reports: how it ended, how much budget it spent, and how
/// many distinct search-tree nodes the factory ended up holding.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RunResult {
    pub outcome: Outcome,
    pub cost: u32,
    pub num_nodes: usize,
}
