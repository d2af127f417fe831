use std::fs;
use std::path::{Path, PathBuf};

use anyhow::Context;
use clap::Parser;

use crate::logging::LogDestination;

#[derive(Debug, Parser)]
#[command(name = "thread_harvest")]
#[command(about = "Collects the replies of social-media threads through a live WebDriver session")]
#[command(version)]
pub struct Args {
    /// Thread URLs to harvest, in order
    pub urls: Vec<String>,

    /// File with one thread URL per line (blank lines and # comments ignored)
    #[arg(long)]
    pub urls_file: Option<PathBuf>,

    /// WebDriver endpoint of the browser session [default: http://localhost:4444]
    #[arg(long)]
    pub webdriver_url: Option<String>,

    /// Id of an existing, logged-in WebDriver session
    #[arg(long)]
    pub session_id: Option<String>,

    /// Directory receiving one checkpoint file per thread [default: output]
    #[arg(long)]
    pub output_dir: Option<PathBuf>,

    /// Processed-URL ledger [default: <output-dir>/processed_urls.json]
    #[arg(long)]
    pub ledger: Option<PathBuf>,

    /// RON configuration file
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Where log output goes
    #[arg(long, value_enum, default_value_t = LogDestination::Terminal)]
    pub log: LogDestination,

    /// Leave user handles out of every saved record
    #[arg(long)]
    pub redact_handles: bool,

    /// Enable debug logging
    #[arg(short, long)]
    pub verbose: bool,
}

impl Args {
    /// Positional URLs followed by those read from `--urls-file`.
    pub fn collect_urls(&self) -> anyhow::Result<Vec<String>> {
        let mut urls: Vec<String> = self
            .urls
            .iter()
            .map(|u| u.trim().to_string())
            .filter(|u| !u.is_empty())
            .collect();
        if let Some(path) = &self.urls_file {
            urls.extend(read_url_file(path)?);
        }
        Ok(urls)
    }
}

fn read_url_file(path: &Path) -> anyhow::Result<Vec<String>> {
    let text = fs::read_to_string(path)
        .with_context(|| format!("reading url file {}", path.display()))?;
    Ok(text
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty() && !line.starts_with('#'))
        .map(str::to_string)
        .collect())
}
