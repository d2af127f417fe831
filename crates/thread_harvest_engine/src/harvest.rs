use std::collections::VecDeque;
use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use harvest_logging::{harvest_debug, harvest_error, harvest_info, harvest_warn};
use thread_harvest_core::{
    update, CheckpointMetadata, CheckpointReason, Conversation, DedupStore, Effect,
    HarvestSettings, HarvestState, Msg, Post, Target, Termination,
};

use crate::checkpoint::CheckpointWriter;
use crate::extract::RecordExtractor;
use crate::obstacle::{default_obstacle_patterns, ObstacleHandler};
use crate::pacing::{local_clock, Clock, Sleeper, ThreadSleeper};
use crate::probe::{ContentProbe, ObstaclePattern, ProbeError, RawUnit};
use crate::HarvestOutcome;

/// Collaborators shared by every run of a batch.
#[derive(Clone)]
pub struct HarvestContext {
    pub settings: HarvestSettings,
    pub writer: Arc<dyn CheckpointWriter>,
    pub sleeper: Arc<dyn Sleeper>,
    pub clock: Clock,
    pub obstacle_patterns: Vec<ObstaclePattern>,
    /// Checked once per iteration; setting it ends the run after a final checkpoint.
    pub cancel: Arc<AtomicBool>,
}

impl HarvestContext {
    pub fn new(settings: HarvestSettings, writer: Arc<dyn CheckpointWriter>) -> Self {
        Self {
            settings,
            writer,
            sleeper: Arc::new(ThreadSleeper),
            clock: local_clock(),
            obstacle_patterns: default_obstacle_patterns(),
            cancel: Arc::new(AtomicBool::new(false)),
        }
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancel.load(Ordering::Relaxed)
    }
}

/// Drives one target: executes the effects requested by the core state
/// machine against the probe and feeds the observations back.
pub struct HarvestLoop<P: ContentProbe> {
    probe: P,
    target: Target,
    settings: HarvestSettings,
    writer: Arc<dyn CheckpointWriter>,
    sleeper: Arc<dyn Sleeper>,
    clock: Clock,
    cancel: Arc<AtomicBool>,
    extractor: RecordExtractor,
    obstacles: ObstacleHandler,
    store: DedupStore,
    post: Option<Post>,
    scrape_start_time: String,
    last_extent: u64,
    last_checkpoint: Option<PathBuf>,
    checkpoint_failures: usize,
}

impl<P: ContentProbe> HarvestLoop<P> {
    pub fn new(target: Target, probe: P, ctx: &HarvestContext) -> Self {
        let settings = ctx.settings.clone();
        let obstacles = ObstacleHandler::new(
            ctx.obstacle_patterns.clone(),
            settings.obstacle_settle,
            ctx.sleeper.clone(),
        );
        Self {
            probe,
            target,
            store: DedupStore::new(settings.identity),
            settings,
            writer: ctx.writer.clone(),
            sleeper: ctx.sleeper.clone(),
            clock: ctx.clock.clone(),
            cancel: ctx.cancel.clone(),
            extractor: RecordExtractor::new(ctx.clock.clone()),
            obstacles,
            post: None,
            scrape_start_time: (ctx.clock)(),
            last_extent: 0,
            last_checkpoint: None,
            checkpoint_failures: 0,
        }
    }

    /// Continues from a saved checkpoint of the same conversation, so comments
    /// captured before a crash are neither lost nor admitted twice.
    pub fn resume(mut self, saved: Conversation) -> Self {
        if saved.conversation_id != self.target.conversation_id() {
            harvest_warn!(
                "ignoring checkpoint of conversation {} for target {}",
                saved.conversation_id,
                self.target.conversation_id()
            );
            return self;
        }
        self.store = DedupStore::rehydrate(self.settings.identity, saved.comments);
        self.post = saved.post;
        if !saved.scrape_start_time.is_empty() {
            self.scrape_start_time = saved.scrape_start_time;
        }
        self.last_extent = saved.metadata.last_scroll_position;
        harvest_info!(
            "resuming {} with {} known comments",
            self.target.url(),
            self.store.len()
        );
        self
    }

    pub fn run(mut self) -> HarvestOutcome {
        harvest_info!("harvesting {}", self.target.url());
        let mut state = HarvestState::new(&self.settings);
        let mut pending = VecDeque::new();
        let (next, effects) = update(state, Msg::Start);
        state = next;
        push_front(&mut pending, effects);

        while let Some(effect) = pending.pop_front() {
            harvest_logging::set_attempt(state.attempt());
            let msg = match effect {
                Effect::Finish(termination) => return self.finish(termination, &state),
                _ if self.is_cancelled() => {
                    harvest_info!("cancellation requested");
                    Some(Msg::CancelRequested)
                }
                other => self.execute(other),
            };
            if let Some(msg) = msg {
                let (next, effects) = update(state, msg);
                state = next;
                // Reactions run before queued work so a terminal effect preempts it.
                push_front(&mut pending, effects);
            }
        }

        harvest_warn!("effect queue drained without a terminal effect");
        let termination = state.termination().unwrap_or(Termination::Cancelled);
        self.finish(termination, &state)
    }

    fn is_cancelled(&self) -> bool {
        self.cancel.load(Ordering::Relaxed)
    }

    fn execute(&mut self, effect: Effect) -> Option<Msg> {
        match effect {
            Effect::Prime => Some(self.prime()),
            Effect::ExtractPass => Some(self.extract_pass()),
            Effect::Advance { pause } => Some(self.advance(pause)),
            Effect::ClearObstacle => Some(Msg::ObstacleChecked {
                cleared: self.obstacles.try_clear(&mut self.probe),
            }),
            Effect::Checkpoint { reason } => {
                self.checkpoint(reason);
                None
            }
            Effect::RefreshSession => Some(self.refresh()),
            Effect::Sleep(duration) => {
                self.sleeper.sleep(duration);
                None
            }
            Effect::Finish(_) => None,
        }
    }

    fn prime(&mut self) -> Msg {
        let poll = self.settings.priming_poll.max(Duration::from_millis(1));
        let mut waited = Duration::ZERO;
        let ready = loop {
            match self.probe.current_units() {
                Ok(units) if !units.is_empty() => break true,
                Ok(_) => {}
                Err(err) => harvest_debug!("readiness probe failed: {}", err),
            }
            if waited >= self.settings.priming_timeout {
                break false;
            }
            self.sleeper.sleep(poll);
            waited += poll;
        };
        if !ready {
            harvest_warn!(
                "no content after {:?}; continuing anyway",
                self.settings.priming_timeout
            );
        }
        self.sleeper.sleep(self.settings.priming_settle);

        match self.probe.focal_unit() {
            Ok(Some(unit)) => match self.extractor.extract_post(unit) {
                Ok(post) => self.post = Some(post),
                Err(err) => harvest_warn!("root post unreadable: {}", err),
            },
            Ok(None) => harvest_warn!("root post not found"),
            Err(err) => harvest_warn!("root post lookup failed: {}", err),
        }

        let extent = match self.probe.scroll_extent() {
            Ok(extent) => {
                self.last_extent = extent;
                Some(extent)
            }
            Err(err) => {
                harvest_warn!("initial scroll extent unavailable: {}", err);
                None
            }
        };
        Msg::Primed { ready, extent }
    }

    fn extract_pass(&mut self) -> Msg {
        let units = match self.read_units() {
            Ok(units) => units,
            Err(err) => {
                harvest_warn!("extraction failed: {}", err);
                return Msg::ProbeFailed {
                    held: self.store.len(),
                };
            }
        };

        let policy = self.store.policy();
        let post_key = self.post.as_ref().map(|post| policy.key_for_post(post));
        let seen = units.len();
        let mut admitted = 0;
        let mut incomplete = 0;
        for unit in units {
            let comment = match self.extractor.extract(unit) {
                Ok(comment) => comment,
                Err(_) => {
                    incomplete += 1;
                    continue;
                }
            };
            if post_key.as_ref() == Some(&policy.key_for(&comment)) {
                continue;
            }
            if self.store.admit(comment) {
                admitted += 1;
                let every = self.settings.checkpoint_every;
                if every > 0 && self.store.len() % every == 0 {
                    self.checkpoint(CheckpointReason::Milestone);
                }
            }
        }

        harvest_info!(
            "pass saw {} units: {} new, {} incomplete, {} held",
            seen,
            admitted,
            incomplete,
            self.store.len()
        );
        Msg::PassCompleted {
            admitted,
            held: self.store.len(),
        }
    }

    // Transient failures get one immediate retry within the same pass.
    fn read_units(&mut self) -> Result<Vec<RawUnit>, ProbeError> {
        match self.probe.current_units() {
            Err(err) if err.is_transient() => {
                harvest_debug!("retrying after transient error: {}", err);
                self.probe.current_units()
            }
            other => other,
        }
    }

    fn advance(&mut self, pause: Duration) -> Msg {
        if let Err(err) = self.probe.advance(None) {
            harvest_warn!("scroll failed: {}", err);
            return Msg::ProbeFailed {
                held: self.store.len(),
            };
        }
        self.sleeper.sleep(pause);
        match self.probe.scroll_extent() {
            Ok(extent) => {
                harvest_debug!("scroll extent {} -> {}", self.last_extent, extent);
                self.last_extent = extent;
                Msg::Advanced { extent }
            }
            Err(err) => {
                harvest_warn!("scroll extent unavailable: {}", err);
                Msg::ProbeFailed {
                    held: self.store.len(),
                }
            }
        }
    }

    fn refresh(&mut self) -> Msg {
        match self.probe.refresh() {
            Ok(()) => {
                harvest_info!("session refreshed after repeated errors");
                Msg::SessionRefreshed
            }
            Err(err) => {
                harvest_error!("session refresh failed: {}", err);
                Msg::RefreshFailed
            }
        }
    }

    fn snapshot(&self) -> Conversation {
        let mut conversation = Conversation {
            channel_name: self.target.channel_name().to_string(),
            conversation_id: self.target.conversation_id().to_string(),
            url: self.target.url().to_string(),
            post: self.post.clone(),
            comments: self.store.comments().to_vec(),
            scrape_start_time: self.scrape_start_time.clone(),
            metadata: CheckpointMetadata {
                last_scroll_position: self.last_extent,
                last_save_time: (self.clock)(),
                raw_comment_count: self.store.len(),
            },
        };
        if self.settings.redact_handles {
            conversation.redact_handles();
        }
        conversation
    }

    fn checkpoint(&mut self, reason: CheckpointReason) -> Conversation {
        let snapshot = self.snapshot();
        match self.writer.save(&snapshot) {
            Ok(path) => {
                harvest_debug!(
                    "checkpoint {:?}: {} comments -> {:?}",
                    reason,
                    snapshot.total_comments(),
                    path
                );
                self.last_checkpoint = Some(path);
            }
            Err(err) => {
                self.checkpoint_failures += 1;
                harvest_error!("checkpoint {:?} failed, keeping data in memory: {}", reason, err);
            }
        }
        snapshot
    }

    fn finish(mut self, termination: Termination, state: &HarvestState) -> HarvestOutcome {
        let conversation = self.checkpoint(CheckpointReason::Final);
        harvest_info!(
            "finished {}: {} ({} comments after {} attempts)",
            self.target.url(),
            termination,
            conversation.total_comments(),
            state.attempt()
        );
        harvest_logging::set_attempt(0);
        HarvestOutcome {
            target: self.target,
            termination,
            view: state.view(),
            conversation,
            checkpoint_path: self.last_checkpoint,
            checkpoint_failures: self.checkpoint_failures,
        }
    }
}

fn push_front(pending: &mut VecDeque<Effect>, effects: Vec<Effect>) {
    for effect in effects.into_iter().rev() {
        pending.push_front(effect);
    }
}
