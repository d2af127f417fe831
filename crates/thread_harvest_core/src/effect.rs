use std::time::Duration;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Effect {
    /// Wait for the page to settle and capture the root post.
    Prime,
    ExtractPass,
    /// Scroll forward, wait `pause`, then measure the scroll extent.
    Advance { pause: Duration },
    ClearObstacle,
    Checkpoint { reason: CheckpointReason },
    RefreshSession,
    Sleep(Duration),
    /// Terminal: write the final checkpoint and stop.
    Finish(Termination),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CheckpointReason {
    Pass,
    Milestone,
    Error,
    Final,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StallSignal {
    ExtentUnchanged,
    NoNewComments,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Termination {
    Stalled(StallSignal),
    AttemptsExhausted,
    SessionLost,
    Cancelled,
}

impl Termination {
    /// Stagnation and the attempt ceiling are normal ends of a run; the
    /// target counts as processed.
    pub fn is_completion(self) -> bool {
        matches!(self, Termination::Stalled(_) | Termination::AttemptsExhausted)
    }
}

impl std::fmt::Display for Termination {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Termination::Stalled(StallSignal::ExtentUnchanged) => {
                write!(f, "stalled: scroll extent unchanged")
            }
            Termination::Stalled(StallSignal::NoNewComments) => {
                write!(f, "stalled: no new comments")
            }
            Termination::AttemptsExhausted => write!(f, "attempt ceiling reached"),
            Termination::SessionLost => write!(f, "session lost"),
            Termination::Cancelled => write!(f, "cancelled"),
        }
    }
}
