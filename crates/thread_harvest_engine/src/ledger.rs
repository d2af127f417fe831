use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use harvest_logging::{harvest_info, harvest_warn};
use thread_harvest_core::ProcessedUrls;

use crate::persist::{AtomicFileWriter, PersistError};

/// Targets finished in earlier runs, stored as a JSON array of URLs.
#[derive(Debug, Clone)]
pub struct ProcessedLedger {
    path: PathBuf,
    urls: ProcessedUrls,
}

impl ProcessedLedger {
    /// A missing file is an empty ledger; an unreadable one is logged and
    /// treated as empty so a damaged ledger never blocks a batch.
    pub fn load(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let urls = match read_urls(&path) {
            Ok(urls) => {
                harvest_info!("loaded {} processed urls from {:?}", urls.len(), path);
                ProcessedUrls::from_urls(urls)
            }
            Err(LoadError::Missing) => ProcessedUrls::new(),
            Err(LoadError::Unreadable(reason)) => {
                harvest_warn!("ignoring processed-url ledger {:?}: {}", path, reason);
                ProcessedUrls::new()
            }
        };
        Self { path, urls }
    }

    pub fn contains(&self, url: &str) -> bool {
        self.urls.contains(url)
    }

    /// Records a completed target and rewrites the ledger file.
    pub fn record(&mut self, url: &str) -> Result<(), PersistError> {
        if !self.urls.insert(url) {
            return Ok(());
        }
        self.save()
    }

    pub fn urls(&self) -> &[String] {
        self.urls.urls()
    }

    fn save(&self) -> Result<(), PersistError> {
        let json = serde_json::to_vec(self.urls.urls())?;
        let (dir, filename) = split_path(&self.path)?;
        AtomicFileWriter::new(dir).write(&filename, &json)?;
        Ok(())
    }
}

enum LoadError {
    Missing,
    Unreadable(String),
}

fn read_urls(path: &Path) -> Result<Vec<String>, LoadError> {
    let content = match fs::read_to_string(path) {
        Ok(text) => text,
        Err(err) if err.kind() == io::ErrorKind::NotFound => return Err(LoadError::Missing),
        Err(err) => return Err(LoadError::Unreadable(err.to_string())),
    };
    serde_json::from_str(&content).map_err(|err| LoadError::Unreadable(err.to_string()))
}

fn split_path(path: &Path) -> Result<(PathBuf, String), PersistError> {
    let filename = path
        .file_name()
        .and_then(|name| name.to_str())
        .ok_or_else(|| PersistError::OutputDir(format!("invalid ledger path {}", path.display())))?
        .to_string();
    let dir = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
        _ => PathBuf::from("."),
    };
    Ok((dir, filename))
}
