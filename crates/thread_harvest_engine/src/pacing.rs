use std::sync::Arc;
use std::time::Duration;

use thread_harvest_core::TIMESTAMP_FORMAT;

/// Source of capture timestamps, formatted `YYYY-MM-DD HH:MM:SS`.
pub type Clock = Arc<dyn Fn() -> String + Send + Sync>;

pub fn local_clock() -> Clock {
    Arc::new(|| chrono::Local::now().format(TIMESTAMP_FORMAT).to_string())
}

/// Every wait of the harvest loop goes through this, so tests never sleep.
pub trait Sleeper: Send + Sync {
    fn sleep(&self, duration: Duration);
}

#[derive(Debug, Default, Clone, Copy)]
pub struct ThreadSleeper;

impl Sleeper for ThreadSleeper {
    fn sleep(&self, duration: Duration) {
        if !duration.is_zero() {
            std::thread::sleep(duration);
        }
    }
}
