#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Msg {
    /// A harvest run begins.
    Start,
    /// Initial page settle finished. `ready` is false when the readiness
    /// signal never showed up before the timeout.
    Primed { ready: bool, extent: Option<u64> },
    /// One extraction pass over the visible units finished.
    PassCompleted { admitted: usize, held: usize },
    /// The viewport was advanced and the scroll extent measured again.
    Advanced { extent: u64 },
    /// The probe failed during the current step.
    ProbeFailed { held: usize },
    /// The obstacle handler ran.
    ObstacleChecked { cleared: bool },
    SessionRefreshed,
    RefreshFailed,
    /// External cancellation flag was observed.
    CancelRequested,
}
