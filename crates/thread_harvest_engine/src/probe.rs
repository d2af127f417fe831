use thiserror::Error;

/// Fields read from one rendered reply, before normalization.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct RawUnit {
    pub text: Option<String>,
    pub user_name: Option<String>,
    pub user_handle: Option<String>,
    pub time: Option<String>,
}

/// A known transient blocker, looked up by CSS selector and visible text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ObstaclePattern {
    pub label: String,
    pub selector: String,
    pub text: String,
}

impl ObstaclePattern {
    pub fn new(label: impl Into<String>, selector: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            selector: selector.into(),
            text: text.into(),
        }
    }
}

/// Opaque reference to an obstacle found on the page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ObstacleHandle {
    pub label: String,
    pub token: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ProbeError {
    /// Lookup failed or a reference went stale; the same call may succeed again.
    #[error("transient probe error: {0}")]
    Transient(String),
    /// The session does not answer.
    #[error("probe unavailable: {0}")]
    Unavailable(String),
}

impl ProbeError {
    pub fn is_transient(&self) -> bool {
        matches!(self, ProbeError::Transient(_))
    }
}

/// Capability boundary over a live, authenticated browsing session already
/// positioned at the target. Implementations neither retry nor sleep.
pub trait ContentProbe {
    /// Every reply unit currently rendered.
    fn current_units(&mut self) -> Result<Vec<RawUnit>, ProbeError>;

    /// The thread's root post, if rendered.
    fn focal_unit(&mut self) -> Result<Option<RawUnit>, ProbeError>;

    fn scroll_extent(&mut self) -> Result<u64, ProbeError>;

    /// Scrolls forward by `amount`, or to the current maximum extent when `None`.
    fn advance(&mut self, amount: Option<u64>) -> Result<(), ProbeError>;

    /// Returns the first pattern that matches something on the page.
    fn find_transient_obstacle(
        &mut self,
        patterns: &[ObstaclePattern],
    ) -> Result<Option<ObstacleHandle>, ProbeError>;

    fn dismiss(&mut self, handle: &ObstacleHandle) -> Result<bool, ProbeError>;

    /// Reloads the page in the same session.
    fn refresh(&mut self) -> Result<(), ProbeError>;
}
