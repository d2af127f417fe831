//! thread_harvest - collects the comment thread under social-media posts.
//!
//! Attaches to an already logged-in WebDriver session, walks each thread URL
//! and writes one JSON checkpoint per thread.

mod cli;
mod config;
mod logging;

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{bail, Context};
use clap::Parser;
use harvest_logging::{harvest_info, harvest_warn};
use thread_harvest_core::HarvestSettings;
use thread_harvest_engine::{
    ensure_output_dir, run_batch, HarvestContext, JsonCheckpointWriter, ProcessedLedger,
    WebDriverProbe, WebDriverSettings,
};

use crate::cli::Args;
use crate::config::FileConfig;

const DEFAULT_WEBDRIVER_URL: &str = "http://localhost:4444";
const DEFAULT_OUTPUT_DIR: &str = "output";
const LEDGER_FILENAME: &str = "processed_urls.json";

fn main() -> anyhow::Result<()> {
    let args = Args::parse();
    logging::initialize(args.log, args.verbose);

    let file = FileConfig::load(args.config.as_deref())?;
    let mut settings = HarvestSettings::default();
    file.apply_to_settings(&mut settings);
    if args.redact_handles {
        settings.redact_handles = true;
    }
    let mut driver_settings = WebDriverSettings::default();
    file.apply_to_webdriver(&mut driver_settings);

    let urls = args.collect_urls()?;
    if urls.is_empty() {
        bail!("no thread URLs given");
    }
    let webdriver_url = args
        .webdriver_url
        .clone()
        .or(file.webdriver_url.clone())
        .unwrap_or_else(|| DEFAULT_WEBDRIVER_URL.to_string());
    let session_id = args
        .session_id
        .clone()
        .or(file.session_id.clone())
        .context("no WebDriver session id; pass --session-id or set session_id in the config")?;
    let output_dir = args
        .output_dir
        .clone()
        .or(file.output_dir.clone())
        .unwrap_or_else(|| PathBuf::from(DEFAULT_OUTPUT_DIR));
    ensure_output_dir(&output_dir)
        .with_context(|| format!("preparing output directory {}", output_dir.display()))?;
    let ledger_path = args
        .ledger
        .clone()
        .or(file.ledger.clone())
        .unwrap_or_else(|| output_dir.join(LEDGER_FILENAME));

    harvest_info!(
        "harvesting {} urls into {:?} through {}",
        urls.len(),
        output_dir,
        webdriver_url
    );
    let ctx = HarvestContext::new(settings, Arc::new(JsonCheckpointWriter::new(output_dir)));
    let mut ledger = ProcessedLedger::load(ledger_path);

    let report = run_batch(&urls, &ctx, &mut ledger, |target| {
        let mut probe =
            WebDriverProbe::connect(&webdriver_url, &session_id, driver_settings.clone())?;
        probe.navigate(target.url())?;
        Ok(probe)
    });

    for url in &report.invalid {
        harvest_warn!("not a thread url: {}", url);
    }
    println!(
        "completed {}, abandoned {}, skipped {}, invalid {}{}",
        report.completed.len(),
        report.abandoned.len(),
        report.skipped.len(),
        report.invalid.len(),
        if report.cancelled { " (cancelled)" } else { "" }
    );
    if !report.abandoned.is_empty() {
        bail!("{} thread(s) abandoned: {}", report.abandoned.len(), report.abandoned.join(", "));
    }
    Ok(())
}
