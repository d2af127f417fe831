use crate::backoff::BackoffScheduler;
use crate::effect::Termination;
use crate::settings::HarvestSettings;
use crate::view_model::HarvestView;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Phase {
    #[default]
    Priming,
    Extracting,
    Advancing,
    /// Terminal. A stall is reported through `Termination::Stalled`.
    Done,
}

/// Counters and phase of one harvest run. Mutated only through `update`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HarvestState {
    pub(crate) phase: Phase,
    pub(crate) attempt: u32,
    pub(crate) max_attempts: u32,
    pub(crate) stall_threshold: u32,
    pub(crate) refresh_after_errors: u32,
    pub(crate) last_extent: Option<u64>,
    pub(crate) same_extent_streak: u32,
    pub(crate) no_new_streak: u32,
    pub(crate) error_streak: u32,
    pub(crate) total_errors: u32,
    pub(crate) obstacles_cleared: u32,
    pub(crate) scheduler: BackoffScheduler,
    pub(crate) termination: Option<Termination>,
}

impl HarvestState {
    pub fn new(settings: &HarvestSettings) -> Self {
        Self {
            phase: Phase::Priming,
            attempt: 0,
            max_attempts: settings.max_attempts,
            stall_threshold: settings.stall_threshold.max(1),
            refresh_after_errors: settings.refresh_after_errors,
            last_extent: None,
            same_extent_streak: 0,
            no_new_streak: 0,
            error_streak: 0,
            total_errors: 0,
            obstacles_cleared: 0,
            scheduler: BackoffScheduler::new(settings.backoff.clone()),
            termination: None,
        }
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn attempt(&self) -> u32 {
        self.attempt
    }

    pub fn last_extent(&self) -> Option<u64> {
        self.last_extent
    }

    pub fn termination(&self) -> Option<Termination> {
        self.termination
    }

    pub fn is_done(&self) -> bool {
        self.phase == Phase::Done
    }

    pub fn view(&self) -> HarvestView {
        HarvestView {
            phase: self.phase,
            attempt: self.attempt,
            max_attempts: self.max_attempts,
            error_streak: self.error_streak,
            total_errors: self.total_errors,
            same_extent_streak: self.same_extent_streak,
            no_new_streak: self.no_new_streak,
            obstacles_cleared: self.obstacles_cleared,
            termination: self.termination,
        }
    }

    pub(crate) fn finish(&mut self, termination: Termination) {
        self.phase = Phase::Done;
        self.termination = Some(termination);
    }
}

impl Default for HarvestState {
    fn default() -> Self {
        Self::new(&HarvestSettings::default())
    }
}
