use harvest_logging::{harvest_error, harvest_info, harvest_warn};
use thread_harvest_core::{Target, Termination};

use crate::harvest::{HarvestContext, HarvestLoop};
use crate::ledger::ProcessedLedger;
use crate::probe::{ContentProbe, ProbeError};
use crate::BatchReport;

/// Harvests each URL in order, one session at a time.
///
/// `open` hands back a probe positioned at the target. Completed targets are
/// recorded in `ledger` and skipped on later runs; a saved checkpoint for a
/// target is resumed rather than started over.
pub fn run_batch<P, F>(
    urls: &[String],
    ctx: &HarvestContext,
    ledger: &mut ProcessedLedger,
    mut open: F,
) -> BatchReport
where
    P: ContentProbe,
    F: FnMut(&Target) -> Result<P, ProbeError>,
{
    let mut report = BatchReport::default();
    let mut harvested_any = false;

    for raw in urls {
        if ctx.is_cancelled() {
            report.cancelled = true;
            break;
        }

        let target = match Target::parse(raw) {
            Ok(target) => target,
            Err(err) => {
                harvest_warn!("skipping {}: {}", raw, err);
                report.invalid.push(raw.clone());
                continue;
            }
        };
        if ledger.contains(target.url()) {
            harvest_info!("already processed {}", target.url());
            report.skipped.push(target.url().to_string());
            continue;
        }

        if harvested_any {
            ctx.sleeper.sleep(ctx.settings.target_pause);
        }
        harvested_any = true;

        let probe = match open(&target) {
            Ok(probe) => probe,
            Err(err) => {
                harvest_error!("could not open {}: {}", target.url(), err);
                report.abandoned.push(target.url().to_string());
                continue;
            }
        };

        let mut run = HarvestLoop::new(target.clone(), probe, ctx);
        match ctx.writer.load(&target) {
            Ok(Some(saved)) => run = run.resume(saved),
            Ok(None) => {}
            Err(err) => harvest_warn!("starting fresh, checkpoint unreadable: {}", err),
        }
        let outcome = run.run();

        match outcome.termination {
            Termination::Cancelled => {
                report.abandoned.push(target.url().to_string());
                report.cancelled = true;
                break;
            }
            _ if outcome.is_completed() => {
                if let Err(err) = ledger.record(target.url()) {
                    harvest_error!("could not record {} as processed: {}", target.url(), err);
                }
                report.completed.push(target.url().to_string());
            }
            _ => report.abandoned.push(target.url().to_string()),
        }
    }

    harvest_info!(
        "batch done: {} completed, {} abandoned, {} skipped, {} invalid",
        report.completed.len(),
        report.abandoned.len(),
        report.skipped.len(),
        report.invalid.len()
    );
    report
}
