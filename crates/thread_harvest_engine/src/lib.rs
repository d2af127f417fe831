//! Harvest engine: browser probe, record extraction, checkpoints and the
//! effect executor that drives the core state machine.
mod batch;
mod checkpoint;
mod dom;
mod extract;
mod harvest;
mod ledger;
mod obstacle;
mod pacing;
mod persist;
mod probe;
mod types;
mod webdriver;

pub use batch::run_batch;
pub use checkpoint::{checkpoint_filename, CheckpointWriter, JsonCheckpointWriter};
pub use dom::{DomUnitParser, InvalidSelector, UnitSelectors};
pub use extract::{ExtractError, RecordExtractor};
pub use harvest::{HarvestContext, HarvestLoop};
pub use ledger::ProcessedLedger;
pub use obstacle::{default_obstacle_patterns, ObstacleHandler};
pub use pacing::{local_clock, Clock, Sleeper, ThreadSleeper};
pub use persist::{ensure_output_dir, AtomicFileWriter, PersistError};
pub use probe::{ContentProbe, ObstacleHandle, ObstaclePattern, ProbeError, RawUnit};
pub use types::{BatchReport, HarvestOutcome};
pub use webdriver::{WebDriverProbe, WebDriverSettings};
