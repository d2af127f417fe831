use std::sync::Arc;
use std::time::Duration;

use harvest_logging::{harvest_debug, harvest_info};

use crate::pacing::Sleeper;
use crate::probe::{ContentProbe, ObstaclePattern};

/// Dismissal strategies in priority order.
pub fn default_obstacle_patterns() -> Vec<ObstaclePattern> {
    vec![
        ObstaclePattern::new("probable spam", "span", "Show probable spam"),
        ObstaclePattern::new(
            "probable spam button",
            r#"div[role="button"]"#,
            "Show probable spam",
        ),
        ObstaclePattern::new("probable spam r-button", "div.r-button", "Show probable spam"),
        ObstaclePattern::new("more replies", "span", "Show more replies"),
    ]
}

pub struct ObstacleHandler {
    patterns: Vec<ObstaclePattern>,
    settle: Duration,
    sleeper: Arc<dyn Sleeper>,
}

impl ObstacleHandler {
    pub fn new(patterns: Vec<ObstaclePattern>, settle: Duration, sleeper: Arc<dyn Sleeper>) -> Self {
        Self {
            patterns,
            settle,
            sleeper,
        }
    }

    /// Returns false when nothing was dismissed; that is the normal case.
    pub fn try_clear(&self, probe: &mut dyn ContentProbe) -> bool {
        for pattern in &self.patterns {
            let handle = match probe.find_transient_obstacle(std::slice::from_ref(pattern)) {
                Ok(Some(handle)) => handle,
                Ok(None) => continue,
                Err(err) => {
                    harvest_debug!("obstacle lookup '{}' failed: {}", pattern.label, err);
                    continue;
                }
            };
            match probe.dismiss(&handle) {
                Ok(true) => {
                    harvest_info!("dismissed obstacle '{}'", handle.label);
                    self.sleeper.sleep(self.settle);
                    return true;
                }
                Ok(false) => harvest_debug!("obstacle '{}' vanished before click", handle.label),
                Err(err) => harvest_debug!("dismissing '{}' failed: {}", handle.label, err),
            }
        }
        false
    }
}
