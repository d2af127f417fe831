use std::path::PathBuf;

use thread_harvest_core::{Conversation, HarvestView, Target, Termination};

/// Result of one harvest run. Runs never fail past this boundary; problems
/// are reported through `termination` and the counters.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HarvestOutcome {
    pub target: Target,
    pub termination: Termination,
    pub view: HarvestView,
    pub conversation: Conversation,
    pub checkpoint_path: Option<PathBuf>,
    pub checkpoint_failures: usize,
}

impl HarvestOutcome {
    pub fn is_completed(&self) -> bool {
        self.termination.is_completion()
    }

    pub fn total_comments(&self) -> usize {
        self.conversation.total_comments()
    }
}

/// Per-URL tally of a batch.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct BatchReport {
    pub completed: Vec<String>,
    pub abandoned: Vec<String>,
    pub skipped: Vec<String>,
    pub invalid: Vec<String>,
    pub cancelled: bool,
}
