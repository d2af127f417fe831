#![allow(dead_code)]

use std::collections::{HashMap, VecDeque};
use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, Once};
use std::time::Duration;

use thread_harvest_core::{Conversation, HarvestSettings, Target};
use thread_harvest_engine::{
    CheckpointWriter, Clock, ContentProbe, HarvestContext, ObstacleHandle, ObstaclePattern,
    PersistError, ProbeError, RawUnit, Sleeper,
};

pub fn init_logging() {
    static INIT: Once = Once::new();
    INIT.call_once(harvest_logging::initialize_for_tests);
}

pub fn unit(text: &str, name: &str, handle: &str, time: &str) -> RawUnit {
    RawUnit {
        text: Some(text.to_string()),
        user_name: Some(name.to_string()),
        user_handle: Some(handle.to_string()),
        time: Some(time.to_string()),
    }
}

/// `count` distinct replies numbered from `first`.
pub fn replies(first: usize, count: usize) -> Vec<RawUnit> {
    (first..first + count)
        .map(|n| {
            unit(
                &format!("reply {n}"),
                &format!("User {n}"),
                &format!("@user{n}"),
                &format!("2026-03-01T10:{:02}:00.000Z", n % 60),
            )
        })
        .collect()
}

/// Ticks one second per call, starting at 2026-03-01 12:00:00.
pub fn counting_clock() -> Clock {
    let ticks = Arc::new(AtomicUsize::new(0));
    Arc::new(move || {
        let n = ticks.fetch_add(1, Ordering::SeqCst);
        format!("2026-03-01 12:{:02}:{:02}", (n / 60) % 60, n % 60)
    })
}

#[derive(Default)]
pub struct RecordingSleeper {
    calls: Mutex<Vec<Duration>>,
}

impl RecordingSleeper {
    pub fn calls(&self) -> Vec<Duration> {
        self.calls.lock().unwrap().clone()
    }
}

impl Sleeper for RecordingSleeper {
    fn sleep(&self, duration: Duration) {
        self.calls.lock().unwrap().push(duration);
    }
}

/// Keeps every saved snapshot; `load` returns the seeded conversation.
#[derive(Default)]
pub struct MemoryWriter {
    saves: Mutex<Vec<Conversation>>,
    seeded: Mutex<Option<Conversation>>,
    fail: AtomicBool,
}

impl MemoryWriter {
    pub fn failing() -> Self {
        let writer = Self::default();
        writer.fail.store(true, Ordering::SeqCst);
        writer
    }

    pub fn seeded(conversation: Conversation) -> Self {
        let writer = Self::default();
        *writer.seeded.lock().unwrap() = Some(conversation);
        writer
    }

    pub fn saves(&self) -> Vec<Conversation> {
        self.saves.lock().unwrap().clone()
    }

    pub fn saved_totals(&self) -> Vec<usize> {
        self.saves().iter().map(Conversation::total_comments).collect()
    }
}

impl CheckpointWriter for MemoryWriter {
    fn save(&self, conversation: &Conversation) -> Result<PathBuf, PersistError> {
        if self.fail.load(Ordering::SeqCst) {
            return Err(PersistError::OutputDir("disk full".to_string()));
        }
        self.saves.lock().unwrap().push(conversation.clone());
        Ok(PathBuf::from(format!(
            "{}_comments_{}.json",
            conversation.channel_name, conversation.conversation_id
        )))
    }

    fn load(&self, target: &Target) -> Result<Option<Conversation>, PersistError> {
        Ok(self
            .seeded
            .lock()
            .unwrap()
            .clone()
            .filter(|saved| saved.conversation_id == target.conversation_id()))
    }
}

/// One scroll position of a scripted page.
#[derive(Debug, Clone)]
pub struct Page {
    pub units: Vec<RawUnit>,
    pub extent: u64,
}

pub fn page(units: Vec<RawUnit>, extent: u64) -> Page {
    Page { units, extent }
}

pub type ProbeLog = Arc<Mutex<Vec<String>>>;

/// Replays a fixed sequence of pages; each successful `advance` moves to the
/// next page and the last one repeats forever.
pub struct ScriptedProbe {
    pages: Vec<Page>,
    index: usize,
    focal: Option<RawUnit>,
    unit_errors: HashMap<usize, VecDeque<ProbeError>>,
    advance_errors: VecDeque<ProbeError>,
    obstacles: VecDeque<String>,
    refresh_error: Option<ProbeError>,
    cancel_on_advance: Option<(usize, Arc<AtomicBool>)>,
    cancel_on_advance_error: Option<Arc<AtomicBool>>,
    advances: usize,
    log: ProbeLog,
}

impl ScriptedProbe {
    pub fn new(pages: Vec<Page>) -> Self {
        assert!(!pages.is_empty());
        Self {
            pages,
            index: 0,
            focal: None,
            unit_errors: HashMap::new(),
            advance_errors: VecDeque::new(),
            obstacles: VecDeque::new(),
            refresh_error: None,
            cancel_on_advance: None,
            cancel_on_advance_error: None,
            advances: 0,
            log: Arc::default(),
        }
    }

    pub fn with_focal(mut self, focal: RawUnit) -> Self {
        self.focal = Some(focal);
        self
    }

    pub fn with_unit_error(mut self, page: usize, err: ProbeError) -> Self {
        self.unit_errors.entry(page).or_default().push_back(err);
        self
    }

    pub fn with_advance_errors(mut self, errors: impl IntoIterator<Item = ProbeError>) -> Self {
        self.advance_errors.extend(errors);
        self
    }

    pub fn with_obstacle(mut self, label: &str) -> Self {
        self.obstacles.push_back(label.to_string());
        self
    }

    pub fn with_refresh_error(mut self, err: ProbeError) -> Self {
        self.refresh_error = Some(err);
        self
    }

    pub fn cancel_after_advances(mut self, advances: usize, flag: Arc<AtomicBool>) -> Self {
        self.cancel_on_advance = Some((advances, flag));
        self
    }

    /// Raises `flag` the first time a scripted advance error is returned.
    pub fn cancel_on_advance_error(mut self, flag: Arc<AtomicBool>) -> Self {
        self.cancel_on_advance_error = Some(flag);
        self
    }

    pub fn log(&self) -> ProbeLog {
        self.log.clone()
    }

    fn record(&self, event: impl Into<String>) {
        self.log.lock().unwrap().push(event.into());
    }

    fn current(&self) -> &Page {
        &self.pages[self.index]
    }
}

impl ContentProbe for ScriptedProbe {
    fn current_units(&mut self) -> Result<Vec<RawUnit>, ProbeError> {
        if let Some(err) = self
            .unit_errors
            .get_mut(&self.index)
            .and_then(VecDeque::pop_front)
        {
            self.record("units:error");
            return Err(err);
        }
        self.record("units");
        Ok(self.current().units.clone())
    }

    fn focal_unit(&mut self) -> Result<Option<RawUnit>, ProbeError> {
        Ok(self.focal.clone())
    }

    fn scroll_extent(&mut self) -> Result<u64, ProbeError> {
        Ok(self.current().extent)
    }

    fn advance(&mut self, _amount: Option<u64>) -> Result<(), ProbeError> {
        if let Some(err) = self.advance_errors.pop_front() {
            self.record("advance:error");
            if let Some(flag) = &self.cancel_on_advance_error {
                flag.store(true, Ordering::SeqCst);
            }
            return Err(err);
        }
        self.record("advance");
        self.advances += 1;
        self.index = (self.index + 1).min(self.pages.len() - 1);
        if let Some((after, flag)) = &self.cancel_on_advance {
            if self.advances >= *after {
                flag.store(true, Ordering::SeqCst);
            }
        }
        Ok(())
    }

    fn find_transient_obstacle(
        &mut self,
        patterns: &[ObstaclePattern],
    ) -> Result<Option<ObstacleHandle>, ProbeError> {
        let Some(present) = self.obstacles.front() else {
            return Ok(None);
        };
        Ok(patterns
            .iter()
            .find(|pattern| &pattern.label == present)
            .map(|pattern| ObstacleHandle {
                label: pattern.label.clone(),
                token: format!("token-{}", pattern.label),
            }))
    }

    fn dismiss(&mut self, handle: &ObstacleHandle) -> Result<bool, ProbeError> {
        if self.obstacles.front() == Some(&handle.label) {
            self.obstacles.pop_front();
            self.record(format!("dismiss:{}", handle.label));
            return Ok(true);
        }
        Ok(false)
    }

    fn refresh(&mut self) -> Result<(), ProbeError> {
        self.record("refresh");
        match self.refresh_error.clone() {
            Some(err) => Err(err),
            None => Ok(()),
        }
    }
}

/// Settings with the waits that do not matter to the loop logic zeroed out.
pub fn quick_settings() -> HarvestSettings {
    HarvestSettings {
        priming_settle: Duration::ZERO,
        obstacle_settle: Duration::ZERO,
        target_pause: Duration::ZERO,
        ..HarvestSettings::default()
    }
}

pub fn context(
    settings: HarvestSettings,
    writer: Arc<dyn CheckpointWriter>,
    sleeper: Arc<RecordingSleeper>,
) -> HarvestContext {
    let sleeper: Arc<dyn Sleeper> = sleeper;
    let mut ctx = HarvestContext::new(settings, writer);
    ctx.sleeper = sleeper;
    ctx.clock = counting_clock();
    ctx
}

pub fn target() -> Target {
    Target::parse("https://x.com/the_hindu/status/1790000000000000000").unwrap()
}
