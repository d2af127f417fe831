use std::time::Duration;

use crate::backoff::BackoffPolicy;
use crate::dedupe::IdentityPolicy;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HarvestSettings {
    /// Hard ceiling on scroll attempts per target.
    pub max_attempts: u32,
    /// Consecutive stagnant observations that end a run.
    pub stall_threshold: u32,
    /// Extra checkpoint every time this many comments have been admitted.
    pub checkpoint_every: usize,
    /// Consecutive errors after which the session is refreshed.
    pub refresh_after_errors: u32,
    pub identity: IdentityPolicy,
    pub redact_handles: bool,
    pub priming_timeout: Duration,
    pub priming_poll: Duration,
    pub priming_settle: Duration,
    pub obstacle_settle: Duration,
    /// Pause between two targets of a batch.
    pub target_pause: Duration,
    pub backoff: BackoffPolicy,
}

impl Default for HarvestSettings {
    fn default() -> Self {
        Self {
            max_attempts: 100,
            stall_threshold: 3,
            checkpoint_every: 20,
            refresh_after_errors: 3,
            identity: IdentityPolicy::default(),
            redact_handles: false,
            priming_timeout: Duration::from_secs(30),
            priming_poll: Duration::from_secs(1),
            priming_settle: Duration::from_secs(15),
            obstacle_settle: Duration::from_secs(10),
            target_pause: Duration::from_secs(10),
            backoff: BackoffPolicy::default(),
        }
    }
}
