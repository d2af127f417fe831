use std::time::Duration;

/// Pacing constants. Kept apart from the state machine so they can be tuned
/// or replaced without touching it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BackoffPolicy {
    pub base: Duration,
    pub pacing_ceiling: Duration,
    pub pacing_double_every: u32,
    pub long_pause_every: u32,
    pub long_pause: Duration,
    pub error_ceiling: Duration,
}

impl Default for BackoffPolicy {
    fn default() -> Self {
        let base = Duration::from_secs(5);
        Self {
            base,
            pacing_ceiling: base * 6,
            pacing_double_every: 10,
            long_pause_every: 20,
            long_pause: Duration::from_secs(120),
            error_ceiling: Duration::from_secs(60),
        }
    }
}

/// Computes how long to wait before the next attempt.
///
/// Two independent schedules: milestone pacing for sustained polling, and
/// exponential backoff (cycle of four) while errors keep coming.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BackoffScheduler {
    policy: BackoffPolicy,
    pacing: Duration,
    last_paced: u32,
}

impl BackoffScheduler {
    pub fn new(policy: BackoffPolicy) -> Self {
        let pacing = policy.base;
        Self {
            policy,
            pacing,
            last_paced: 0,
        }
    }

    /// Current pacing delay, without advancing the schedule.
    pub fn pacing(&self) -> Duration {
        self.pacing
    }

    /// Milestones are counted over every attempt since the previous pacing
    /// call, so attempts consumed by errors cannot skip a long pause or a
    /// doubling.
    pub fn next_delay(&mut self, attempt: u32, error_streak: u32) -> Duration {
        if error_streak > 0 {
            return self.error_delay(error_streak);
        }
        let since = self.last_paced;
        self.last_paced = self.last_paced.max(attempt);
        if milestones_between(since, attempt, self.policy.long_pause_every) > 0 {
            self.pacing = self.policy.base;
            return self.policy.long_pause;
        }
        for _ in 0..milestones_between(since, attempt, self.policy.pacing_double_every) {
            self.pacing = self.pacing.saturating_mul(2).min(self.policy.pacing_ceiling);
        }
        self.pacing
    }

    fn error_delay(&self, error_streak: u32) -> Duration {
        let exponent = (error_streak - 1) % 4;
        self.policy
            .base
            .saturating_mul(1u32 << exponent)
            .min(self.policy.error_ceiling)
    }
}

/// Multiples of `every` in `(since, attempt]`.
fn milestones_between(since: u32, attempt: u32, every: u32) -> u32 {
    if every == 0 || attempt <= since {
        return 0;
    }
    attempt / every - since / every
}
