use thiserror::Error;
use thread_harvest_core::{Comment, Post};

use crate::pacing::Clock;
use crate::probe::RawUnit;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ExtractError {
    #[error("unit has no readable text")]
    IncompleteUnit,
}

/// Turns probe output into normalized records.
///
/// Text is mandatory; the other fields are optional and blank values become
/// `None`. Scrape times never go backwards within one extractor.
pub struct RecordExtractor {
    clock: Clock,
    last_scrape_time: Option<String>,
}

impl RecordExtractor {
    pub fn new(clock: Clock) -> Self {
        Self {
            clock,
            last_scrape_time: None,
        }
    }

    pub fn extract(&mut self, unit: RawUnit) -> Result<Comment, ExtractError> {
        let text = mandatory_text(unit.text)?;
        Ok(Comment {
            text,
            user_name: optional(unit.user_name),
            user_handle: optional(unit.user_handle),
            comment_time: optional(unit.time),
            scrape_time: self.scrape_time(),
        })
    }

    pub fn extract_post(&mut self, unit: RawUnit) -> Result<Post, ExtractError> {
        let text = mandatory_text(unit.text)?;
        Ok(Post {
            text,
            user_name: optional(unit.user_name),
            user_handle: optional(unit.user_handle),
            post_time: optional(unit.time),
            scrape_time: self.scrape_time(),
        })
    }

    /// Timestamp for a capture happening now.
    pub fn scrape_time(&mut self) -> String {
        let now = (self.clock)();
        // Fixed-width timestamps order lexically.
        let stamp = match self.last_scrape_time.take() {
            Some(last) if last > now => last,
            _ => now,
        };
        self.last_scrape_time = Some(stamp.clone());
        stamp
    }
}

fn mandatory_text(text: Option<String>) -> Result<String, ExtractError> {
    optional(text).ok_or(ExtractError::IncompleteUnit)
}

fn optional(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}
