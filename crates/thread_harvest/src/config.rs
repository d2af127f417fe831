//! Optional RON configuration file.
//!
//! Every field is optional; present fields override the built-in defaults and
//! command-line flags override the file. Durations are whole seconds.

use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::Context;
use serde::Deserialize;
use thread_harvest_core::{HarvestSettings, IdentityPolicy};
use thread_harvest_engine::WebDriverSettings;

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct FileConfig {
    pub webdriver_url: Option<String>,
    pub session_id: Option<String>,
    pub output_dir: Option<PathBuf>,
    pub ledger: Option<PathBuf>,

    pub max_attempts: Option<u32>,
    pub stall_threshold: Option<u32>,
    pub checkpoint_every: Option<usize>,
    pub refresh_after_errors: Option<u32>,
    pub identity: Option<IdentityPolicy>,
    pub redact_handles: Option<bool>,

    pub priming_timeout_secs: Option<u64>,
    pub priming_settle_secs: Option<u64>,
    pub obstacle_settle_secs: Option<u64>,
    pub target_pause_secs: Option<u64>,

    pub backoff_base_secs: Option<u64>,
    pub pacing_ceiling_secs: Option<u64>,
    pub long_pause_secs: Option<u64>,
    pub error_ceiling_secs: Option<u64>,

    pub request_timeout_secs: Option<u64>,
    pub unit_selector: Option<String>,
    pub text_selector: Option<String>,
    pub author_selector: Option<String>,
    pub time_selector: Option<String>,
}

impl FileConfig {
    /// Reads `path`, or returns an empty configuration when no path is given.
    pub fn load(path: Option<&Path>) -> anyhow::Result<Self> {
        let Some(path) = path else {
            return Ok(Self::default());
        };
        let text = fs::read_to_string(path)
            .with_context(|| format!("reading config file {}", path.display()))?;
        Self::parse(&text).with_context(|| format!("parsing config file {}", path.display()))
    }

    pub fn parse(text: &str) -> anyhow::Result<Self> {
        Ok(ron::from_str(text)?)
    }

    pub fn apply_to_settings(&self, settings: &mut HarvestSettings) {
        set(&mut settings.max_attempts, self.max_attempts);
        set(&mut settings.stall_threshold, self.stall_threshold);
        set(&mut settings.checkpoint_every, self.checkpoint_every);
        set(&mut settings.refresh_after_errors, self.refresh_after_errors);
        set(&mut settings.identity, self.identity);
        set(&mut settings.redact_handles, self.redact_handles);

        set(&mut settings.priming_timeout, secs(self.priming_timeout_secs));
        set(&mut settings.priming_settle, secs(self.priming_settle_secs));
        set(&mut settings.obstacle_settle, secs(self.obstacle_settle_secs));
        set(&mut settings.target_pause, secs(self.target_pause_secs));

        let backoff = &mut settings.backoff;
        set(&mut backoff.base, secs(self.backoff_base_secs));
        set(&mut backoff.pacing_ceiling, secs(self.pacing_ceiling_secs));
        set(&mut backoff.long_pause, secs(self.long_pause_secs));
        set(&mut backoff.error_ceiling, secs(self.error_ceiling_secs));
    }

    pub fn apply_to_webdriver(&self, settings: &mut WebDriverSettings) {
        set(&mut settings.request_timeout, secs(self.request_timeout_secs));
        let selectors = &mut settings.selectors;
        set(&mut selectors.unit, self.unit_selector.clone());
        set(&mut selectors.text, self.text_selector.clone());
        set(&mut selectors.author, self.author_selector.clone());
        set(&mut selectors.time, self.time_selector.clone());
    }
}

fn set<T>(slot: &mut T, value: Option<T>) {
    if let Some(value) = value {
        *slot = value;
    }
}

fn secs(value: Option<u64>) -> Option<Duration> {
    value.map(Duration::from_secs)
}
