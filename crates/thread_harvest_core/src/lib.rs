//! Harvest core: data model, deduplication, pacing and the pure harvest state machine.
mod backoff;
mod dedupe;
mod effect;
mod model;
mod msg;
mod settings;
mod state;
mod target;
mod update;
mod view_model;

pub use backoff::{BackoffPolicy, BackoffScheduler};
pub use dedupe::{DedupStore, IdentityKey, IdentityPolicy};
pub use effect::{CheckpointReason, Effect, StallSignal, Termination};
pub use model::{CheckpointMetadata, Comment, Conversation, Post, TIMESTAMP_FORMAT};
pub use msg::Msg;
pub use settings::HarvestSettings;
pub use state::{HarvestState, Phase};
pub use target::{normalize_target_url, ProcessedUrls, Target, TargetError};
pub use update::update;
pub use view_model::HarvestView;
