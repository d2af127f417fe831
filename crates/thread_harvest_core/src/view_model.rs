use crate::{Phase, Termination};

/// Read-only snapshot of the loop counters, for logs and progress reports.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct HarvestView {
    pub phase: Phase,
    pub attempt: u32,
    pub max_attempts: u32,
    pub error_streak: u32,
    pub total_errors: u32,
    pub same_extent_streak: u32,
    pub no_new_streak: u32,
    pub obstacles_cleared: u32,
    pub termination: Option<Termination>,
}
