mod common;

use std::sync::Arc;
use std::time::Duration;

use common::{
    context, init_logging, page, quick_settings, replies, MemoryWriter, RecordingSleeper,
    ScriptedProbe,
};
use pretty_assertions::assert_eq;
use tempfile::TempDir;
use thread_harvest_core::HarvestSettings;
use thread_harvest_engine::{run_batch, ProbeError, ProcessedLedger};

const FIRST: &str = "https://x.com/alpha/status/101";
const SECOND: &str = "https://x.com/beta/status/202";

fn stalling_probe() -> ScriptedProbe {
    ScriptedProbe::new(vec![page(replies(0, 3), 1000)])
}

fn urls(raw: &[&str]) -> Vec<String> {
    raw.iter().map(|u| u.to_string()).collect()
}

#[test]
fn completed_targets_are_recorded_and_skipped_next_time() {
    init_logging();
    let temp = TempDir::new().unwrap();
    let ledger_path = temp.path().join("processed_urls.json");
    let sleeper = Arc::new(RecordingSleeper::default());
    let ctx = context(quick_settings(), Arc::new(MemoryWriter::default()), sleeper);

    let mut ledger = ProcessedLedger::load(&ledger_path);
    let mut opened = Vec::new();
    let report = run_batch(
        &urls(&[FIRST, "https://example.com/nope", SECOND]),
        &ctx,
        &mut ledger,
        |target| {
            opened.push(target.url().to_string());
            Ok::<_, ProbeError>(stalling_probe())
        },
    );

    assert_eq!(report.completed, urls(&[FIRST, SECOND]));
    assert_eq!(report.invalid, urls(&["https://example.com/nope"]));
    assert!(report.abandoned.is_empty());
    assert!(!report.cancelled);
    assert_eq!(opened, urls(&[FIRST, SECOND]));

    let mut ledger = ProcessedLedger::load(&ledger_path);
    let report = run_batch(
        &urls(&["twitter.com/alpha/status/101/", SECOND]),
        &ctx,
        &mut ledger,
        |_| -> Result<ScriptedProbe, ProbeError> { panic!("nothing left to open") },
    );
    assert_eq!(report.skipped, urls(&[FIRST, SECOND]));
    assert!(report.completed.is_empty());
}

#[test]
fn unopenable_target_is_abandoned_and_batch_continues() {
    init_logging();
    let temp = TempDir::new().unwrap();
    let sleeper = Arc::new(RecordingSleeper::default());
    let ctx = context(quick_settings(), Arc::new(MemoryWriter::default()), sleeper);
    let mut ledger = ProcessedLedger::load(temp.path().join("processed_urls.json"));

    let report = run_batch(&urls(&[FIRST, SECOND]), &ctx, &mut ledger, |target| {
        if target.channel_name() == "alpha" {
            Err(ProbeError::Unavailable("no session".into()))
        } else {
            Ok(stalling_probe())
        }
    });

    assert_eq!(report.abandoned, urls(&[FIRST]));
    assert_eq!(report.completed, urls(&[SECOND]));
    assert!(!ledger.contains(FIRST));
    assert!(ledger.contains(SECOND));
}

#[test]
fn cancellation_stops_the_batch() {
    init_logging();
    let temp = TempDir::new().unwrap();
    let sleeper = Arc::new(RecordingSleeper::default());
    let ctx = context(quick_settings(), Arc::new(MemoryWriter::default()), sleeper);
    let mut ledger = ProcessedLedger::load(temp.path().join("processed_urls.json"));

    let cancel = ctx.cancel.clone();
    let report = run_batch(&urls(&[FIRST, SECOND]), &ctx, &mut ledger, |_| {
        Ok::<_, ProbeError>(
            ScriptedProbe::new(vec![page(replies(0, 3), 1000), page(replies(3, 3), 2000)])
                .cancel_after_advances(1, cancel.clone()),
        )
    });

    assert!(report.cancelled);
    assert_eq!(report.abandoned, urls(&[FIRST]));
    assert!(report.completed.is_empty());
    assert!(ledger.urls().is_empty());
}

#[test]
fn saved_checkpoint_is_resumed() {
    init_logging();
    let temp = TempDir::new().unwrap();
    let sleeper = Arc::new(RecordingSleeper::default());
    let first_run = Arc::new(MemoryWriter::default());
    let ctx = context(quick_settings(), first_run.clone(), sleeper.clone());
    let mut ledger = ProcessedLedger::load(temp.path().join("first.json"));
    run_batch(&urls(&[FIRST]), &ctx, &mut ledger, |_| {
        Ok::<_, ProbeError>(stalling_probe())
    });
    let saved = first_run.saves().pop().unwrap();
    assert_eq!(saved.total_comments(), 3);

    // A later run over a page showing two more replies keeps the first three.
    let resumed = Arc::new(MemoryWriter::seeded(saved.clone()));
    let ctx = context(quick_settings(), resumed.clone(), sleeper);
    let mut ledger = ProcessedLedger::load(temp.path().join("second.json"));
    run_batch(&urls(&[FIRST]), &ctx, &mut ledger, |_| {
        Ok::<_, ProbeError>(ScriptedProbe::new(vec![page(replies(0, 5), 1000)]))
    });

    let last = resumed.saves().pop().unwrap();
    assert_eq!(last.total_comments(), 5);
    assert_eq!(last.comments[..3].to_vec(), saved.comments);
    assert_eq!(last.scrape_start_time, saved.scrape_start_time);
}

#[test]
fn targets_are_spaced_by_the_configured_pause() {
    init_logging();
    let temp = TempDir::new().unwrap();
    let sleeper = Arc::new(RecordingSleeper::default());
    let settings = HarvestSettings {
        target_pause: Duration::from_secs(42),
        ..quick_settings()
    };
    let ctx = context(settings, Arc::new(MemoryWriter::default()), sleeper.clone());
    let mut ledger = ProcessedLedger::load(temp.path().join("processed_urls.json"));

    run_batch(&urls(&[FIRST, SECOND]), &ctx, &mut ledger, |_| {
        Ok::<_, ProbeError>(stalling_probe())
    });

    let pauses = sleeper
        .calls()
        .into_iter()
        .filter(|d| *d == Duration::from_secs(42))
        .count();
    assert_eq!(pauses, 1);
}

#[test]
fn cancelled_while_scrolling_fails_is_not_recorded() {
    init_logging();
    let temp = TempDir::new().unwrap();
    let sleeper = Arc::new(RecordingSleeper::default());
    let ctx = context(quick_settings(), Arc::new(MemoryWriter::default()), sleeper);
    let mut ledger = ProcessedLedger::load(temp.path().join("processed_urls.json"));

    let cancel = ctx.cancel.clone();
    let report = run_batch(&urls(&[FIRST, SECOND]), &ctx, &mut ledger, |_| {
        Ok::<_, ProbeError>(
            stalling_probe()
                .with_advance_errors(vec![ProbeError::Transient("timeout".into()); 200])
                .cancel_on_advance_error(cancel.clone()),
        )
    });

    assert!(report.cancelled);
    assert_eq!(report.abandoned, urls(&[FIRST]));
    assert!(!ledger.contains(FIRST));
}
